//! Shared test utilities for E2E tests.
//!
//! The fixture lays out a data directory that already holds a "clone" of the
//! projects subtree, so commands run against it without git or network
//! access.
//!
//! ## Usage
//!
//! ```rust,ignore
//! mod common;
//! use common::prelude::*;
//!
//! #[test]
//! fn test_example() {
//!     let fixture = TestFixture::new().with_project("libpng", projects::LIBPNG);
//!     fixture.command().arg("list-projects").assert().success();
//! }
//! ```

use assert_cmd::Command;
use assert_fs::prelude::*;
use std::path::{Path, PathBuf};

/// Re-export commonly used test dependencies for convenience.
pub mod prelude {
    pub use assert_cmd::cargo::cargo_bin_cmd;
    pub use assert_fs::prelude::*;
    #[allow(unused_imports)]
    pub use assert_fs::TempDir;
    pub use predicates::prelude::*;

    #[allow(unused_imports)]
    pub use super::projects;
    pub use super::TestFixture;
}

/// Descriptor snippets for testing.
#[allow(dead_code)]
pub mod projects {
    pub const LIBPNG: &str = r#"homepage: "http://www.libpng.org/pub/png/libpng.html"
language: c++
primary_contact: "maintainer@example.com"
sanitizers:
  - address
  - memory
  - undefined
fuzzing_engines:
  - libfuzzer
  - afl
main_repo: "https://github.com/pnggroup/libpng.git"
"#;

    pub const ZLIB: &str = r#"language: c
build: make
custom_field: 7
"#;

    pub const MINIMAL: &str = "language: go\n";

    pub const INVALID_YAML: &str = "language: [unclosed\n";
}

/// A data directory holding a pre-populated projects subtree.
pub struct TestFixture {
    temp_dir: assert_fs::TempDir,
}

impl TestFixture {
    /// Create a fixture with an empty projects directory.
    pub fn new() -> Self {
        let temp_dir = assert_fs::TempDir::new().expect("Failed to create temp directory");
        temp_dir
            .child("data/oss-fuzz/projects")
            .create_dir_all()
            .expect("Failed to create projects directory");
        Self { temp_dir }
    }

    /// Add a project directory with a `project.yaml`.
    pub fn with_project(self, name: &str, descriptor: &str) -> Self {
        self.temp_dir
            .child(format!("data/oss-fuzz/projects/{}/project.yaml", name))
            .write_str(descriptor)
            .expect("Failed to write project.yaml");
        self
    }

    /// Add a project directory without a descriptor.
    #[allow(dead_code)]
    pub fn with_empty_project(self, name: &str) -> Self {
        self.temp_dir
            .child(format!("data/oss-fuzz/projects/{}", name))
            .create_dir_all()
            .expect("Failed to create project directory");
        self
    }

    /// Add a file with the given path and content.
    #[allow(dead_code)]
    pub fn with_file(self, path: &str, content: &str) -> Self {
        self.temp_dir
            .child(path)
            .write_str(content)
            .expect("Failed to write file");
        self
    }

    /// Add a settings file with the given content.
    #[allow(dead_code)]
    pub fn with_settings(self, content: &str) -> Self {
        self.temp_dir
            .child("ossfuzz-kit.yaml")
            .write_str(content)
            .expect("Failed to write settings file");
        self
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn data_dir(&self) -> PathBuf {
        self.temp_dir.path().join("data")
    }

    #[allow(dead_code)]
    pub fn settings_path(&self) -> PathBuf {
        self.temp_dir.path().join("ossfuzz-kit.yaml")
    }

    /// A command pointed at the fixture's data directory.
    ///
    /// Git is stopped from discovering any repository above the fixture, so
    /// the staleness check fails fast without touching the network.
    pub fn command(&self) -> Command {
        let mut cmd = bare_command();
        cmd.current_dir(self.path())
            .env("GIT_CEILING_DIRECTORIES", self.path())
            .arg("--data-dir")
            .arg(self.data_dir())
            .arg("--color")
            .arg("never");
        cmd
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// The binary with the environment variables it reads cleared.
pub fn bare_command() -> Command {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("ossfuzz-kit");
    cmd.env_remove("OSSFUZZ_KIT_CONFIG")
        .env_remove("OSSFUZZ_KIT_DATA")
        .env_remove("RUST_LOG");
    cmd
}
