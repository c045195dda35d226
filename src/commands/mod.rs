//! # CLI Command Implementations
//!
//! This module contains the implementation for each subcommand of the
//! `ossfuzz-kit` command-line tool. Each subcommand is defined in its own file.
//!
//! ## Structure
//!
//! Each command module typically contains:
//! - An `Args` struct that defines the command-specific arguments and options,
//!   derived using `clap`.
//! - An `execute` function that takes the parsed `Args` and the global options
//!   and calls into the `ossfuzz_kit` library.

pub mod completions;
pub mod list_projects;
pub mod project_info;
pub mod status;

use std::sync::Arc;

use anyhow::Result;

use ossfuzz_kit::client::OssFuzzClient;
use ossfuzz_kit::fetch::HttpFetcher;
use ossfuzz_kit::output::ProgressReporter;
use ossfuzz_kit::repository::DefaultGitOperations;
use ossfuzz_kit::suggestions;

use crate::cli::GlobalArgs;

/// Build a client from the global options, rendering clone progress.
pub fn client(global: &GlobalArgs) -> Result<OssFuzzClient> {
    let settings = global.settings()?;
    OssFuzzClient::with_components(
        settings,
        Arc::new(DefaultGitOperations),
        Arc::new(HttpFetcher::new()),
        Some(Arc::new(ProgressReporter::new())),
    )
    .map_err(suggestions::from_error)
}
