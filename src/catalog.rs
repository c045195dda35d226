//! # Project Catalog
//!
//! Lists the projects of the monorepo. The local clone is the primary source:
//! every immediate subdirectory of the projects directory is a project. When
//! the clone cannot be produced, the catalog falls back to the recursive tree
//! endpoint of the GitHub API.
//!
//! The first successful listing is memoized for the life of the catalog. The
//! memo has no key, so a later call with a different `use_fallback` value
//! still receives the stored list.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use log::{debug, info, warn};
use serde::Deserialize;

use crate::cache::Memo;
use crate::config::Settings;
use crate::error::{Error, Result};
use crate::fetch::RemoteFetcher;
use crate::repository::ProjectsDirProvider;

/// Response of `GET /repos/<owner>/<repo>/git/trees/<branch>?recursive=1`.
#[derive(Debug, Deserialize)]
pub struct TreeResponse {
    #[serde(default)]
    pub tree: Vec<TreeEntry>,
    #[serde(default)]
    pub truncated: bool,
}

#[derive(Debug, Deserialize)]
pub struct TreeEntry {
    pub path: String,
    #[serde(rename = "type")]
    pub kind: String,
}

pub struct ProjectCatalog {
    provider: Arc<dyn ProjectsDirProvider>,
    fetcher: Arc<dyn RemoteFetcher>,
    settings: Settings,
    memo: Memo<Vec<String>>,
}

impl ProjectCatalog {
    pub fn new(
        provider: Arc<dyn ProjectsDirProvider>,
        fetcher: Arc<dyn RemoteFetcher>,
        settings: &Settings,
    ) -> Self {
        Self {
            provider,
            fetcher,
            settings: settings.clone(),
            memo: Memo::new(),
        }
    }

    /// Sorted, de-duplicated project names.
    ///
    /// With `use_fallback` false a local failure is returned without any
    /// network request.
    pub fn list_all_projects(&self, use_fallback: bool) -> Result<Vec<String>> {
        self.memo.get_or_compute(|| self.compute(use_fallback))
    }

    fn compute(&self, use_fallback: bool) -> Result<Vec<String>> {
        let local_error = match self.list_local() {
            Ok(names) => return Ok(names),
            Err(e) => e,
        };

        if !use_fallback {
            return Err(Error::ProjectListUnavailable {
                local_error: local_error.to_string(),
                fallback_error: None,
            });
        }

        warn!(
            "Listing projects from the local clone failed, using the GitHub API: {}",
            local_error
        );
        match self.list_remote() {
            Ok(names) => Ok(names),
            Err(fallback_error) => Err(Error::ProjectListUnavailable {
                local_error: local_error.to_string(),
                fallback_error: Some(fallback_error.to_string()),
            }),
        }
    }

    fn list_local(&self) -> Result<Vec<String>> {
        let projects_dir = self.provider.projects_dir()?;
        let names = list_subdirectories(&projects_dir)?;
        debug!(
            "Found {} projects in {}",
            names.len(),
            projects_dir.display()
        );
        Ok(names)
    }

    fn list_remote(&self) -> Result<Vec<String>> {
        let url = self.settings.tree_api_url()?;
        let body = self
            .fetcher
            .fetch_json(&url, &self.settings.fetch_options())?;
        let response: TreeResponse =
            serde_json::from_value(body).map_err(|e| Error::MalformedResponse {
                url: url.clone(),
                message: e.to_string(),
            })?;

        if response.truncated {
            warn!("Tree listing from {} was truncated by the API", url);
        }

        let names = select_projects(&response.tree, self.settings.subtree());
        info!("Listed {} projects from the GitHub API", names.len());
        Ok(names)
    }
}

/// Names of the immediate subdirectories of `dir`, sorted.
fn list_subdirectories(dir: &Path) -> Result<Vec<String>> {
    let mut names = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if entry.path().is_dir() {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
    }
    names.sort();
    Ok(names)
}

/// Project names among the tree entries: directories exactly one level below
/// `subtree`.
pub fn select_projects(entries: &[TreeEntry], subtree: &str) -> Vec<String> {
    let prefix = format!("{}/", subtree.trim_matches('/'));
    entries
        .iter()
        .filter(|entry| entry.kind == "tree")
        .filter_map(|entry| entry.path.strip_prefix(&prefix))
        .filter(|rest| !rest.is_empty() && !rest.contains('/'))
        .map(str::to_string)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
