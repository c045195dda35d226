//! # Status Command Implementation
//!
//! Makes sure the local clone exists (cloning it on first use, pulling it
//! when stale) and reports where it lives and which commit it is at.

use anyhow::Result;
use clap::Args;
use console::style;

use ossfuzz_kit::output::emoji;
use ossfuzz_kit::suggestions;

use crate::cli::GlobalArgs;

/// Clone or refresh the local repository and report its state
#[derive(Args, Debug)]
pub struct StatusArgs {}

/// Execute the `status` command.
pub fn execute(_args: StatusArgs, global: &GlobalArgs) -> Result<()> {
    let output = global.output();
    let client = super::client(global)?;
    let (status, up_to_date) = client.status().map_err(suggestions::from_error)?;

    println!("{}", style("Local clone").bold());
    println!("  root:     {}", status.root.display());
    println!("  projects: {}", status.projects_path.display());
    println!(
        "  head:     {}",
        status.head.as_deref().unwrap_or("unknown")
    );

    if up_to_date {
        println!(
            "{} Up to date with {}",
            emoji(&output, "✅", "[OK]"),
            client.settings().branch
        );
    } else {
        println!(
            "{} Could not confirm the clone matches {}",
            emoji(&output, "⚠️", "[WARN]"),
            client.settings().branch
        );
    }
    Ok(())
}
