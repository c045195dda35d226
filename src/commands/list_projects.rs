//! # List Projects Command Implementation
//!
//! Prints the names of all projects, one per line, followed by a count of
//! how many were shown.

use anyhow::Result;
use clap::Args;

use ossfuzz_kit::suggestions;

use crate::cli::GlobalArgs;

/// List project names
#[derive(Args, Debug)]
pub struct ListProjectsArgs {
    /// Show at most this many projects
    #[arg(long, value_name = "N")]
    pub limit: Option<usize>,

    /// Fail instead of querying the GitHub API when the local clone is unusable
    #[arg(long)]
    pub no_fallback: bool,

    /// Print the shown names as a JSON array
    #[arg(long)]
    pub json: bool,
}

/// Execute the `list-projects` command.
pub fn execute(args: ListProjectsArgs, global: &GlobalArgs) -> Result<()> {
    let client = super::client(global)?;
    let projects = client
        .list_projects(!args.no_fallback)
        .map_err(suggestions::from_error)?;

    let shown = limited(&projects, args.limit);
    if args.json {
        println!("{}", serde_json::to_string_pretty(shown)?);
        return Ok(());
    }

    for project in shown {
        println!("{}", project);
    }
    println!();
    println!("{}", summary(shown.len(), projects.len()));
    Ok(())
}

fn limited(projects: &[String], limit: Option<usize>) -> &[String] {
    let count = limit.unwrap_or(projects.len()).min(projects.len());
    &projects[..count]
}

fn summary(shown: usize, total: usize) -> String {
    format!("Total projects listed: {} / {}", shown, total)
}
