//! Default values for ossfuzz-kit configuration.
//!
//! This module provides centralized default values used by `Settings` and
//! the CLI, ensuring consistency and avoiding duplication.

use std::path::PathBuf;
use std::time::Duration;

/// Upstream OSS-Fuzz repository.
pub const OSS_FUZZ_REPO_URL: &str = "https://github.com/google/oss-fuzz.git";

/// Branch compared against the local clone and used for remote lookups.
pub const DEFAULT_BRANCH: &str = "master";

/// Directory of the monorepo that holds one subdirectory per project.
pub const DEFAULT_SUBTREE: &str = "projects";

/// History depth for clones and pulls.
pub const CLONE_DEPTH: u32 = 1;

pub const GITHUB_API_URL: &str = "https://api.github.com";
pub const GITHUB_RAW_URL: &str = "https://raw.githubusercontent.com";

/// Per-request HTTP timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Total attempts for a remote request, first attempt included.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// How long a positive staleness check is trusted.
pub const STALENESS_CHECK_INTERVAL: Duration = Duration::from_secs(10 * 60);

/// First backoff delay; doubled after every failed attempt.
pub const RETRY_BASE_DELAY: Duration = Duration::from_millis(500);

pub const ACCEPT_HEADER: &str = "application/vnd.github.v3+json";
pub const USER_AGENT: &str = "ossfuzz-kit";

/// Name of each project's metadata file.
pub const DESCRIPTOR_FILENAME: &str = "project.yaml";

/// Returns the default data directory holding the local clone.
///
/// Uses the platform-appropriate cache directory:
/// - Linux: `~/.cache/ossfuzz-kit` (XDG Base Directory)
/// - macOS: `~/Library/Caches/ossfuzz-kit`
/// - Windows: `{FOLDERID_LocalAppData}\ossfuzz-kit`
///
/// Falls back to `.ossfuzz-kit` in the current directory if the platform
/// cache directory cannot be determined.
///
/// This can be overridden by the `--data-dir` CLI flag, the
/// `OSSFUZZ_KIT_DATA` environment variable, or `data_dir` in a settings file.
pub fn default_data_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from(".ossfuzz-kit"))
        .join("ossfuzz-kit")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_data_dir_returns_path() {
        let data_dir = default_data_dir();
        assert!(data_dir.ends_with("ossfuzz-kit"));
    }

    #[test]
    fn test_default_data_dir_is_absolute_or_fallback() {
        let data_dir = default_data_dir();
        assert!(
            data_dir.is_absolute() || data_dir.starts_with(".ossfuzz-kit"),
            "Expected absolute path or fallback, got: {:?}",
            data_dir
        );
    }
}
