//! # Client
//!
//! `OssFuzzClient` wires the repository manager, project catalog and
//! descriptor reader together from one [`Settings`] value. All three share a
//! single HTTP fetcher and a single local clone.
//!
//! ```no_run
//! use ossfuzz_kit::client::OssFuzzClient;
//! use ossfuzz_kit::config::Settings;
//!
//! let client = OssFuzzClient::new(Settings::default()).unwrap();
//! let projects = client.list_projects(true).unwrap();
//! let info = client.project_info(&projects[0], false, true).unwrap();
//! println!("{}: {:?}", info.name(), info.get("language"));
//! ```

use std::sync::Arc;

use crate::catalog::ProjectCatalog;
use crate::config::Settings;
use crate::descriptor::{DescriptorReader, ProjectDescriptor};
use crate::error::Result;
use crate::fetch::{HttpFetcher, RemoteFetcher};
use crate::repository::{
    CloneProgress, GitOperations, ProjectsDirProvider, RepositoryManager, RepositoryStatus,
};

pub struct OssFuzzClient {
    settings: Settings,
    repository: Arc<RepositoryManager>,
    catalog: ProjectCatalog,
    reader: DescriptorReader,
}

impl OssFuzzClient {
    /// Build a client that uses the system `git` and a blocking HTTP client.
    pub fn new(settings: Settings) -> Result<Self> {
        settings.validate()?;
        let fetcher: Arc<dyn RemoteFetcher> = Arc::new(HttpFetcher::new());
        let repository = RepositoryManager::new(&settings, Arc::clone(&fetcher));
        Ok(Self::assemble(settings, repository, fetcher))
    }

    /// Build a client from custom git and HTTP implementations.
    pub fn with_components(
        settings: Settings,
        git: Arc<dyn GitOperations>,
        fetcher: Arc<dyn RemoteFetcher>,
        progress: Option<Arc<dyn CloneProgress>>,
    ) -> Result<Self> {
        settings.validate()?;
        let mut repository =
            RepositoryManager::with_operations(&settings, git, Arc::clone(&fetcher));
        if let Some(progress) = progress {
            repository = repository.with_progress(progress);
        }
        Ok(Self::assemble(settings, repository, fetcher))
    }

    fn assemble(
        settings: Settings,
        repository: RepositoryManager,
        fetcher: Arc<dyn RemoteFetcher>,
    ) -> Self {
        let repository = Arc::new(repository);
        let provider: Arc<dyn ProjectsDirProvider> = repository.clone();
        Self {
            catalog: ProjectCatalog::new(Arc::clone(&provider), Arc::clone(&fetcher), &settings),
            reader: DescriptorReader::new(provider, fetcher, &settings),
            repository,
            settings,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn repository(&self) -> &RepositoryManager {
        &self.repository
    }

    /// Sorted project names. See [`ProjectCatalog::list_all_projects`].
    pub fn list_projects(&self, use_fallback: bool) -> Result<Vec<String>> {
        self.catalog.list_all_projects(use_fallback)
    }

    /// See [`DescriptorReader::get_project_info`].
    pub fn project_info(
        &self,
        name: &str,
        raw: bool,
        use_fallback: bool,
    ) -> Result<ProjectDescriptor> {
        self.reader.get_project_info(name, raw, use_fallback)
    }

    /// Ensure the clone exists, then report its state and freshness.
    pub fn status(&self) -> Result<(RepositoryStatus, bool)> {
        self.repository.projects_dir()?;
        let status = self.repository.status();
        let up_to_date = self.repository.is_up_to_date();
        Ok((status, up_to_date))
    }
}
