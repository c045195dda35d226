//! # ossfuzz-kit CLI
//!
//! Binary entry point for the `ossfuzz-kit` command-line tool. Parses the
//! arguments with `clap` and dispatches to a subcommand; the library crate
//! holds all of the logic.

mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    cli.execute()
}
