//! # Project Info Command Implementation
//!
//! Prints the descriptor of one project, either the fixed projection or every
//! field of its `project.yaml` with `--raw`.

use anyhow::Result;
use clap::Args;
use console::style;

use ossfuzz_kit::client::OssFuzzClient;
use ossfuzz_kit::descriptor::ProjectDescriptor;
use ossfuzz_kit::error::Error;
use ossfuzz_kit::output::format_value;
use ossfuzz_kit::suggestions;

use crate::cli::GlobalArgs;

/// Show a project's project.yaml
#[derive(Args, Debug)]
pub struct ProjectInfoArgs {
    /// Project name, e.g. libpng
    #[arg(value_name = "PROJECT")]
    pub project: String,

    /// Print every field of project.yaml instead of the standard set
    #[arg(long)]
    pub raw: bool,

    /// Fail instead of querying the raw content host when the local clone is unusable
    #[arg(long)]
    pub no_fallback: bool,

    /// Print the descriptor as a JSON object
    #[arg(long)]
    pub json: bool,
}

/// Execute the `project-info` command.
pub fn execute(args: ProjectInfoArgs, global: &GlobalArgs) -> Result<()> {
    let client = super::client(global)?;
    let use_fallback = !args.no_fallback;

    let info = match client.project_info(&args.project, args.raw, use_fallback) {
        Ok(info) => info,
        Err(error @ Error::DescriptorUnavailable { .. }) => {
            return Err(not_found(&client, &args.project, &error));
        }
        Err(error) => return Err(suggestions::from_error(error)),
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&info)?);
        return Ok(());
    }

    println!(
        "{}",
        style(format!("Details for project: {}", args.project)).bold()
    );
    println!();
    for line in render(&info) {
        println!("{}", line);
    }
    Ok(())
}

/// Suggest a close name from the local clone, if one is available.
fn not_found(client: &OssFuzzClient, project: &str, error: &Error) -> anyhow::Error {
    suggestions::project_not_found(project, error, &known_projects(client))
}

/// Project names for suggestions. Never starts a clone.
fn known_projects(client: &OssFuzzClient) -> Vec<String> {
    if !client.repository().status().cloned {
        return Vec::new();
    }
    client.list_projects(false).unwrap_or_default()
}

fn render(info: &ProjectDescriptor) -> Vec<String> {
    info.iter()
        .map(|(key, value)| format!("{}: {}", key, format_value(value)))
        .collect()
}
