//! # Error Handling
//!
//! This module defines the centralized error type for `ossfuzz-kit`. It uses
//! `thiserror` to build a single `Error` enum covering every failure the
//! library can surface, each variant carrying enough context (URL, project
//! name, path) to produce a useful message on its own.
//!
//! ## Propagation Policy
//!
//! Not every failure reaches the caller:
//!
//! - Staleness checks never fail. Any error while comparing the local and
//!   remote heads is logged and read as "not up to date".
//! - Pulling a stale clone is best-effort. Failures are logged and the
//!   existing checkout is used.
//! - The first clone, and the terminal failure of both sources of the project
//!   catalog or a descriptor, are always returned.
//!
//! The `Result` alias is used throughout the library.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for ossfuzz-kit operations
#[derive(Error, Debug)]
pub enum Error {
    /// An HTTP request kept failing until the retry budget was exhausted.
    ///
    /// Wraps the failure of the last attempt.
    #[error("Failed to fetch {url} after {attempts} attempt(s): {source}")]
    FetchFailed {
        url: String,
        attempts: u32,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A response format name other than `text`, `json` or `bytes`.
    #[error("Unsupported response format '{format}' (expected text, json or bytes)")]
    UnsupportedFormat { format: String },

    /// A response body could not be decoded in the requested format.
    #[error("Could not decode response from {url}: {message}")]
    Decode { url: String, message: String },

    /// The initial sparse clone (or its sparse-checkout step) failed.
    #[error("Git clone error for {url}: {message}{}", hint.as_ref().map(|h| format!("\n  hint: {}", h)).unwrap_or_default())]
    CloneFailed {
        url: String,
        message: String,
        /// Optional hint for how to resolve the clone issue
        hint: Option<String>,
    },

    /// A git command other than clone exited unsuccessfully.
    #[error("Git command failed in {dir}: {command} - {stderr}")]
    GitCommand {
        command: String,
        dir: String,
        stderr: String,
    },

    /// The projects directory was not present after ensuring the clone.
    #[error("Projects directory not found at {}", path.display())]
    ProjectsDirMissing { path: PathBuf },

    /// Neither the local clone nor the remote tree could produce a project list.
    ///
    /// `fallback_error` is `None` when the remote fallback was not attempted.
    #[error("{}", describe_sources("Project list", local_error, fallback_error.as_deref()))]
    ProjectListUnavailable {
        local_error: String,
        fallback_error: Option<String>,
    },

    /// A descriptor was found but is not a YAML mapping.
    #[error("Malformed project.yaml for {project}: {message}")]
    MalformedDescriptor { project: String, message: String },

    /// Neither the local clone nor the raw content host had the descriptor.
    ///
    /// `fallback_error` is `None` when the remote fallback was not attempted.
    #[error("{}", describe_sources(&format!("project.yaml for {}", project), local_error, fallback_error.as_deref()))]
    DescriptorUnavailable {
        project: String,
        local_error: String,
        fallback_error: Option<String>,
    },

    /// A project name that cannot be a single directory under the subtree.
    #[error("Invalid project name '{name}': {reason}")]
    InvalidProjectName { name: String, reason: String },

    /// The configured repository URL does not name a GitHub repository.
    #[error("Invalid repository URL {url}: {message}")]
    InvalidRepoUrl { url: String, message: String },

    /// A JSON response was missing a field the client relies on.
    #[error("Unexpected response from {url}: {message}")]
    MalformedResponse { url: String, message: String },

    /// An error occurred while loading the settings file.
    #[error("Configuration error: {message}{}", hint.as_ref().map(|h| format!("\n  hint: {}", h)).unwrap_or_default())]
    ConfigParse {
        message: String,
        /// Optional hint for how to fix the configuration issue
        hint: Option<String>,
    },

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A JSON decoding error, wrapped from `serde_json::Error`.
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    /// A YAML parsing error, wrapped from `serde_yaml::Error`.
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A URL parsing error, wrapped from `url::ParseError`.
    #[error("URL parsing error: {0}")]
    UrlParse(#[from] url::ParseError),

    /// An error indicating that a mutex has been poisoned.
    #[error("Lock poisoned: {context}")]
    LockPoisoned { context: String },
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;

fn describe_sources(what: &str, local_error: &str, fallback_error: Option<&str>) -> String {
    match fallback_error {
        None => format!(
            "{} unavailable from the local clone ({}); remote fallback disabled",
            what, local_error
        ),
        Some(remote) => format!(
            "{} unavailable: local clone failed ({}); remote fallback failed ({})",
            what, local_error, remote
        ),
    }
}
