//! CLI argument parsing and command dispatch

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use log::LevelFilter;

use ossfuzz_kit::config::Settings;
use ossfuzz_kit::output::OutputConfig;
use ossfuzz_kit::suggestions;

use crate::commands;

/// ossfuzz-kit - Browse OSS-Fuzz projects from a sparse local clone
#[derive(Parser, Debug)]
#[command(name = "ossfuzz-kit")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    global: GlobalArgs,
}

/// Options shared by every subcommand.
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Colorize output (always, never, auto)
    #[arg(long, global = true, value_name = "WHEN", default_value = "auto")]
    pub color: String,

    /// Set log level (error, warn, info, debug, trace)
    #[arg(long, global = true, value_name = "LEVEL", default_value = "warn")]
    pub log_level: LevelFilter,

    /// Settings file (YAML)
    #[arg(long, global = true, value_name = "FILE", env = "OSSFUZZ_KIT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Directory holding the local clone.
    ///
    /// Defaults to the system cache directory (`~/.cache/ossfuzz-kit` on
    /// Linux, `~/Library/Caches/ossfuzz-kit` on macOS).
    #[arg(long, global = true, value_name = "DIR", env = "OSSFUZZ_KIT_DATA")]
    pub data_dir: Option<PathBuf>,
}

impl GlobalArgs {
    /// Load settings, then apply command-line overrides.
    pub fn settings(&self) -> Result<Settings> {
        if let Some(path) = &self.config {
            if !path.exists() {
                return Err(suggestions::config_not_found(path));
            }
        }
        let mut settings =
            Settings::load(self.config.as_deref()).map_err(suggestions::from_error)?;
        if let Some(data_dir) = &self.data_dir {
            settings.data_dir = data_dir.clone();
        }
        Ok(settings)
    }

    pub fn output(&self) -> OutputConfig {
        OutputConfig::from_env_and_flag(&self.color)
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List project names
    ListProjects(commands::list_projects::ListProjectsArgs),

    /// Show a project's project.yaml
    ProjectInfo(commands::project_info::ProjectInfoArgs),

    /// Clone or refresh the local repository and report its state
    Status(commands::status::StatusArgs),

    /// Generate shell completion scripts
    Completions(commands::completions::CompletionsArgs),
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> Result<()> {
        init_logging(self.global.log_level);
        self.global.output().apply();

        match self.command {
            Commands::ListProjects(args) => commands::list_projects::execute(args, &self.global),
            Commands::ProjectInfo(args) => commands::project_info::execute(args, &self.global),
            Commands::Status(args) => commands::status::execute(args, &self.global),
            Commands::Completions(args) => commands::completions::execute(args),
        }
    }
}

fn init_logging(level: LevelFilter) {
    env_logger::Builder::new()
        .filter_level(level)
        .format_timestamp(None)
        .format_target(false)
        .init();
}
