//! # Local Clone Management
//!
//! This module owns the single on-disk sparse clone of the upstream monorepo
//! and decides when it is usable, when it needs refreshing, and when a
//! failure must reach the caller.
//!
//! ## Design
//!
//! - **`GitOperations`**: the git commands the manager needs. The default
//!   implementation shells out through [`crate::git`]; tests substitute a
//!   recording mock.
//!
//! - **`LocalStore`**: performs the two-step sparse clone into a fixed root,
//!   and skips it entirely when the subtree is already on disk.
//!
//! - **`RepositoryManager`**: wraps the store with a staleness check against
//!   the remote branch head, cached by a [`StalenessCache`]. Refreshing is
//!   best-effort: a failed check reads as "stale" and a failed pull keeps the
//!   existing checkout. Only the first clone is mandatory.
//!
//! Consumers depend on the [`ProjectsDirProvider`] trait rather than on the
//! manager itself.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;

use log::{debug, info, warn};

use crate::cache::StalenessCache;
use crate::config::Settings;
use crate::error::{Error, Result};
use crate::fetch::RemoteFetcher;

/// Trait for git operations - allows mocking in tests
pub trait GitOperations: Send + Sync {
    /// Shallow, blob-filtered, sparse-enabled clone into `target_dir`.
    fn clone_sparse(&self, url: &str, depth: u32, target_dir: &Path) -> Result<()>;

    /// Restrict the working tree of `repo_dir` to `subtree`.
    fn sparse_checkout_set(&self, url: &str, repo_dir: &Path, subtree: &str) -> Result<()>;

    /// Commit hash of `HEAD`.
    fn head_commit(&self, repo_dir: &Path) -> Result<String>;

    /// Pull the configured branch, keeping history at `depth`.
    fn pull(&self, repo_dir: &Path, depth: u32) -> Result<()>;
}

/// The default implementation of `GitOperations`, which uses the system's
/// `git` command.
pub struct DefaultGitOperations;

impl GitOperations for DefaultGitOperations {
    fn clone_sparse(&self, url: &str, depth: u32, target_dir: &Path) -> Result<()> {
        crate::git::clone_sparse(url, depth, target_dir)
    }

    fn sparse_checkout_set(&self, url: &str, repo_dir: &Path, subtree: &str) -> Result<()> {
        crate::git::sparse_checkout_set(url, repo_dir, subtree)
    }

    fn head_commit(&self, repo_dir: &Path) -> Result<String> {
        crate::git::rev_parse_head(repo_dir)
    }

    fn pull(&self, repo_dir: &Path, depth: u32) -> Result<()> {
        crate::git::pull(repo_dir, depth)
    }
}

/// The two steps of a fresh sparse clone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloneStep {
    Clone,
    SparseCheckout,
}

impl CloneStep {
    pub const COUNT: u64 = 2;

    /// 1-based position of the step.
    pub fn number(self) -> u64 {
        match self {
            Self::Clone => 1,
            Self::SparseCheckout => 2,
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::Clone => "Cloning repository",
            Self::SparseCheckout => "Configuring sparse checkout",
        }
    }
}

/// Observer for clone progress. Both methods default to doing nothing.
pub trait CloneProgress: Send + Sync {
    fn step_started(&self, _step: CloneStep) {}
    fn step_finished(&self, _step: CloneStep) {}
}

#[derive(Default)]
pub struct NoopProgress;

impl CloneProgress for NoopProgress {}

/// The one local clone a process manages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryHandle {
    pub url: String,
    pub subtree: String,
    pub depth: u32,
    pub root: PathBuf,
}

impl RepositoryHandle {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            url: settings.repo_url.clone(),
            subtree: settings.subtree().to_string(),
            depth: settings.clone_depth,
            root: settings.clone_root(),
        }
    }

    /// `<root>/<subtree>`
    pub fn projects_path(&self) -> PathBuf {
        self.root.join(&self.subtree)
    }
}

/// Creates and reuses the sparse clone under a fixed root.
pub struct LocalStore {
    root: PathBuf,
    git: Arc<dyn GitOperations>,
    progress: Arc<dyn CloneProgress>,
}

impl LocalStore {
    pub fn new(root: PathBuf, git: Arc<dyn GitOperations>) -> Self {
        Self {
            root,
            git,
            progress: Arc::new(NoopProgress),
        }
    }

    pub fn with_progress(mut self, progress: Arc<dyn CloneProgress>) -> Self {
        self.progress = progress;
        self
    }

    /// Make sure `<root>/<subtree>` exists, cloning it if necessary.
    ///
    /// An existing subtree directory is returned without running git. A
    /// partial clone left without the subtree is discarded and cloned again.
    pub fn ensure_sparse_clone(&self, url: &str, depth: u32, subtree: &str) -> Result<PathBuf> {
        let target = self.root.join(subtree);
        if target.is_dir() {
            return Ok(target);
        }

        info!(
            "Cloning {} (depth {}, sparse: {}) into {}",
            url,
            depth,
            subtree,
            self.root.display()
        );

        self.progress.step_started(CloneStep::Clone);
        self.git
            .clone_sparse(url, depth, &self.root)
            .map_err(|e| as_clone_failure(url, e))?;
        self.progress.step_finished(CloneStep::Clone);

        self.progress.step_started(CloneStep::SparseCheckout);
        self.git
            .sparse_checkout_set(url, &self.root, subtree)
            .map_err(|e| as_clone_failure(url, e))?;
        self.progress.step_finished(CloneStep::SparseCheckout);

        Ok(target)
    }
}

fn as_clone_failure(url: &str, error: Error) -> Error {
    match error {
        Error::CloneFailed { .. } => error,
        other => Error::CloneFailed {
            url: url.to_string(),
            message: other.to_string(),
            hint: None,
        },
    }
}

/// Source of the local projects directory.
///
/// Implemented by [`RepositoryManager`]; the catalog and descriptor reader
/// only see this trait, so tests can hand them any directory.
pub trait ProjectsDirProvider: Send + Sync {
    fn projects_dir(&self) -> Result<PathBuf>;
}

/// Snapshot of the local clone, for reporting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryStatus {
    pub root: PathBuf,
    pub projects_path: PathBuf,
    pub cloned: bool,
    pub head: Option<String>,
}

/// Keeps the local clone present and reasonably fresh.
pub struct RepositoryManager {
    settings: Settings,
    handle: RepositoryHandle,
    git: Arc<dyn GitOperations>,
    fetcher: Arc<dyn RemoteFetcher>,
    store: LocalStore,
    staleness: Mutex<StalenessCache>,
    clone_lock: Mutex<()>,
}

impl RepositoryManager {
    /// Creates a manager that runs the system `git`.
    pub fn new(settings: &Settings, fetcher: Arc<dyn RemoteFetcher>) -> Self {
        Self::with_operations(settings, Arc::new(DefaultGitOperations), fetcher)
    }

    /// Creates a manager with a custom `GitOperations` implementation.
    pub fn with_operations(
        settings: &Settings,
        git: Arc<dyn GitOperations>,
        fetcher: Arc<dyn RemoteFetcher>,
    ) -> Self {
        let handle = RepositoryHandle::from_settings(settings);
        Self {
            store: LocalStore::new(handle.root.clone(), Arc::clone(&git)),
            settings: settings.clone(),
            handle,
            git,
            fetcher,
            staleness: Mutex::new(StalenessCache::new(settings.check_interval())),
            clone_lock: Mutex::new(()),
        }
    }

    /// Report clone progress to `progress`.
    pub fn with_progress(mut self, progress: Arc<dyn CloneProgress>) -> Self {
        self.store = self.store.with_progress(progress);
        self
    }

    /// Whether the local head matches the remote branch head.
    ///
    /// A positive answer is reused for the check interval. Every other path
    /// performs a real check: git for the local head, then one single-attempt
    /// request for the remote one. Errors are logged and read as `false`.
    pub fn is_up_to_date(&self) -> bool {
        let mut cache = self
            .staleness
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let now = Instant::now();
        if cache.is_fresh(now) {
            debug!("Local clone checked recently, skipping staleness check");
            return true;
        }
        cache.begin_check(now);

        match self.compare_heads() {
            Ok(up_to_date) => {
                cache.record(up_to_date);
                up_to_date
            }
            Err(e) => {
                warn!("Could not check whether the local clone is up to date: {}", e);
                false
            }
        }
    }

    fn compare_heads(&self) -> Result<bool> {
        let local = self.git.head_commit(&self.handle.root)?;

        let url = self.settings.branch_api_url()?;
        let options = self.settings.fetch_options().with_max_retries(1);
        let branch = self.fetcher.fetch_json(&url, &options)?;
        let remote = branch
            .pointer("/commit/sha")
            .and_then(serde_json::Value::as_str)
            .ok_or_else(|| Error::MalformedResponse {
                url: url.clone(),
                message: "missing commit.sha".to_string(),
            })?;

        debug!("Local head {}, remote head {}", local, remote);
        Ok(local == remote)
    }

    /// Return the projects path, cloning on first use and pulling when stale.
    ///
    /// Pull failures are logged and the existing checkout is returned. Clone
    /// failures are returned as `CloneFailed`.
    pub fn ensure_repo(&self) -> Result<PathBuf> {
        let _guard = self.clone_lock.lock().map_err(|_| Error::LockPoisoned {
            context: "repository clone lock".to_string(),
        })?;

        let projects_path = self.handle.projects_path();
        if projects_path.is_dir() {
            if !self.is_up_to_date() {
                info!("Updating local clone at {}", self.handle.root.display());
                if let Err(e) = self.git.pull(&self.handle.root, self.handle.depth) {
                    warn!("Failed to update local clone, using existing checkout: {}", e);
                }
            }
            return Ok(projects_path);
        }

        self.store
            .ensure_sparse_clone(&self.handle.url, self.handle.depth, &self.handle.subtree)
    }

    /// Current state of the clone, without touching the network.
    pub fn status(&self) -> RepositoryStatus {
        let projects_path = self.handle.projects_path();
        let cloned = projects_path.is_dir();
        let head = if cloned {
            self.git.head_commit(&self.handle.root).ok()
        } else {
            None
        };
        RepositoryStatus {
            root: self.handle.root.clone(),
            projects_path,
            cloned,
            head,
        }
    }
}

impl ProjectsDirProvider for RepositoryManager {
    /// `ensure_repo`, then verify the directory really exists.
    fn projects_dir(&self) -> Result<PathBuf> {
        let path = self.ensure_repo()?;
        if !path.is_dir() {
            return Err(Error::ProjectsDirMissing { path });
        }
        Ok(path)
    }
}
