//! # Settings
//!
//! This module defines `Settings`, the runtime configuration shared by every
//! component: which repository to mirror, where the local clone lives, and how
//! patient remote requests should be. Settings can be loaded from an optional
//! YAML file; every field has a default, so an empty file (or no file at all)
//! yields the stock OSS-Fuzz configuration.
//!
//! ```yaml
//! # ossfuzz-kit.yaml
//! branch: master
//! clone_depth: 1
//! data_dir: /var/cache/ossfuzz-kit
//! timeout_secs: 20
//! ```
//!
//! The settings also know how to derive every remote URL the client needs
//! from the repository URL, via [`GithubSlug`].

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::defaults;
use crate::error::{Error, Result};
use crate::fetch::FetchOptions;

/// Runtime configuration for the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Git URL of the upstream monorepo.
    pub repo_url: String,
    /// Branch used for staleness checks and remote lookups.
    pub branch: String,
    /// Directory of the monorepo holding one subdirectory per project.
    pub subtree: String,
    /// History depth for clones and pulls.
    pub clone_depth: u32,
    /// Directory under which the local clone is kept.
    pub data_dir: PathBuf,
    /// Per-request HTTP timeout in seconds.
    pub timeout_secs: u64,
    /// Total attempts for remote catalog and descriptor requests.
    pub max_retries: u32,
    /// How long a positive staleness check is trusted, in seconds.
    pub check_interval_secs: u64,
    /// Base URL of the GitHub REST API.
    pub api_base_url: String,
    /// Base URL of the raw content host.
    pub raw_base_url: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            repo_url: defaults::OSS_FUZZ_REPO_URL.to_string(),
            branch: defaults::DEFAULT_BRANCH.to_string(),
            subtree: defaults::DEFAULT_SUBTREE.to_string(),
            clone_depth: defaults::CLONE_DEPTH,
            data_dir: defaults::default_data_dir(),
            timeout_secs: defaults::DEFAULT_TIMEOUT.as_secs(),
            max_retries: defaults::DEFAULT_MAX_RETRIES,
            check_interval_secs: defaults::STALENESS_CHECK_INTERVAL.as_secs(),
            api_base_url: defaults::GITHUB_API_URL.to_string(),
            raw_base_url: defaults::GITHUB_RAW_URL.to_string(),
        }
    }
}

impl Settings {
    /// Parse settings from YAML text and validate them.
    pub fn parse(yaml_content: &str) -> Result<Self> {
        // serde_yaml reads an empty document as null, which a struct rejects
        if yaml_content.trim().is_empty() {
            return Ok(Self::default());
        }
        let settings: Settings =
            serde_yaml::from_str(yaml_content).map_err(|e| Error::ConfigParse {
                message: e.to_string(),
                hint: Some(
                    "Known keys: repo_url, branch, subtree, clone_depth, data_dir, \
                     timeout_secs, max_retries, check_interval_secs, api_base_url, raw_base_url"
                        .to_string(),
                ),
            })?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| Error::ConfigParse {
            message: format!("cannot read {}: {}", path.display(), e),
            hint: Some("Use --config to point at an existing settings file".to_string()),
        })?;
        Self::parse(&content)
    }

    /// Load settings from `path` if given, otherwise use the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    /// Check the invariants the rest of the crate relies on.
    pub fn validate(&self) -> Result<()> {
        if self.clone_depth == 0 {
            return Err(Error::ConfigParse {
                message: "clone_depth must be a positive integer".to_string(),
                hint: None,
            });
        }
        if self.subtree.trim_matches('/').is_empty() {
            return Err(Error::ConfigParse {
                message: "subtree must not be empty".to_string(),
                hint: None,
            });
        }
        if self.branch.is_empty() {
            return Err(Error::ConfigParse {
                message: "branch must not be empty".to_string(),
                hint: None,
            });
        }
        self.github_slug()?;
        Ok(())
    }

    /// The owner and repository name behind `repo_url`.
    pub fn github_slug(&self) -> Result<GithubSlug> {
        GithubSlug::from_url(&self.repo_url)
    }

    /// Subtree with surrounding slashes removed.
    pub fn subtree(&self) -> &str {
        self.subtree.trim_matches('/')
    }

    /// Root of the local clone, e.g. `~/.cache/ossfuzz-kit/oss-fuzz`.
    pub fn clone_root(&self) -> PathBuf {
        let name = self
            .github_slug()
            .map(|slug| slug.repo)
            .unwrap_or_else(|_| "repository".to_string());
        self.data_dir.join(name)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn check_interval(&self) -> Duration {
        Duration::from_secs(self.check_interval_secs)
    }

    /// Request options shared by catalog and descriptor lookups.
    pub fn fetch_options(&self) -> FetchOptions {
        FetchOptions::default()
            .with_timeout(self.timeout())
            .with_max_retries(self.max_retries)
    }

    /// `GET /repos/<owner>/<repo>/branches/<branch>`
    pub fn branch_api_url(&self) -> Result<String> {
        let slug = self.github_slug()?;
        Ok(format!(
            "{}/repos/{}/{}/branches/{}",
            self.api_base_url.trim_end_matches('/'),
            slug.owner,
            slug.repo,
            self.branch
        ))
    }

    /// `GET /repos/<owner>/<repo>/git/trees/<branch>?recursive=1`
    pub fn tree_api_url(&self) -> Result<String> {
        let slug = self.github_slug()?;
        Ok(format!(
            "{}/repos/{}/{}/git/trees/{}?recursive=1",
            self.api_base_url.trim_end_matches('/'),
            slug.owner,
            slug.repo,
            self.branch
        ))
    }

    /// Raw URL of a project's descriptor on the configured branch.
    pub fn raw_descriptor_url(&self, project: &str) -> Result<String> {
        let slug = self.github_slug()?;
        Ok(format!(
            "{}/{}/{}/{}/{}/{}/{}",
            self.raw_base_url.trim_end_matches('/'),
            slug.owner,
            slug.repo,
            self.branch,
            self.subtree(),
            project,
            defaults::DESCRIPTOR_FILENAME
        ))
    }
}

/// `<owner>/<repo>` of a GitHub-hosted repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GithubSlug {
    pub owner: String,
    pub repo: String,
}

impl GithubSlug {
    /// Derive the slug from a clone URL such as
    /// `https://github.com/google/oss-fuzz.git`.
    pub fn from_url(repo_url: &str) -> Result<Self> {
        let invalid = |message: &str| Error::InvalidRepoUrl {
            url: repo_url.to_string(),
            message: message.to_string(),
        };

        let parsed = Url::parse(repo_url)?;
        match parsed.host_str() {
            Some("github.com") | Some("www.github.com") => {}
            _ => return Err(invalid("only github.com repositories are supported")),
        }

        let segments: Vec<&str> = parsed
            .path_segments()
            .map(|segments| segments.filter(|s| !s.is_empty()).collect())
            .unwrap_or_default();
        let [owner, repo] = segments.as_slice() else {
            return Err(invalid("expected a path of the form /<owner>/<repo>"));
        };

        let repo = repo.strip_suffix(".git").unwrap_or(*repo);
        if repo.is_empty() {
            return Err(invalid("repository name is empty"));
        }

        Ok(Self {
            owner: owner.to_string(),
            repo: repo.to_string(),
        })
    }
}

impl std::fmt::Display for GithubSlug {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}
