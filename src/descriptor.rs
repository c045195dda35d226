//! # Project Descriptors
//!
//! Every project directory holds a `project.yaml` describing how the project
//! is built and fuzzed. [`DescriptorReader`] locates that file, in the local
//! clone first and on the raw content host otherwise, and projects it into a
//! [`ProjectDescriptor`].
//!
//! ## Projection
//!
//! By default a descriptor has exactly these keys, in this order:
//!
//! | key               | YAML key          | when missing |
//! |-------------------|-------------------|--------------|
//! | `name`            | (project name)    |              |
//! | `language`        | `language`        | null         |
//! | `build_system`    | `build`           | null         |
//! | `fuzzing_engines` | `fuzzing_engines` | `[]`         |
//! | `sanitizers`      | `sanitizers`      | `[]`         |
//! | `architectures`   | `architectures`   | `[]`         |
//! | `homepage`        | `homepage`        | null         |
//! | `repo`            | `main_repo`       | null         |
//! | `primary_contact` | `primary_contact` | null         |
//! | `vendor_ccs`      | `vendor_ccs`      | null         |
//!
//! Raw mode keeps every field of the document and puts `name` first.

use std::fs;
use std::io;
use std::sync::Arc;

use log::{debug, warn};
use serde::Serialize;
use serde_yaml::{Mapping, Value};

use crate::config::Settings;
use crate::defaults;
use crate::error::{Error, Result};
use crate::fetch::RemoteFetcher;
use crate::repository::ProjectsDirProvider;

#[derive(Debug, Clone, Copy)]
enum Missing {
    Null,
    EmptyList,
}

const PROJECTED_FIELDS: &[(&str, &str, Missing)] = &[
    ("language", "language", Missing::Null),
    ("build_system", "build", Missing::Null),
    ("fuzzing_engines", "fuzzing_engines", Missing::EmptyList),
    ("sanitizers", "sanitizers", Missing::EmptyList),
    ("architectures", "architectures", Missing::EmptyList),
    ("homepage", "homepage", Missing::Null),
    ("repo", "main_repo", Missing::Null),
    ("primary_contact", "primary_contact", Missing::Null),
    ("vendor_ccs", "vendor_ccs", Missing::Null),
];

/// An ordered mapping describing one project. `name` is always the first key.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ProjectDescriptor(Mapping);

impl ProjectDescriptor {
    /// Project the parsed document onto the fixed set of fields.
    pub fn project(name: &str, document: &Mapping) -> Self {
        let mut fields = Mapping::new();
        fields.insert(Value::from("name"), Value::from(name));
        for (key, source, missing) in PROJECTED_FIELDS {
            let value = match (document.get(*source), missing) {
                (Some(value), _) if !value.is_null() => value.clone(),
                (_, Missing::EmptyList) => Value::Sequence(Vec::new()),
                (_, Missing::Null) => Value::Null,
            };
            fields.insert(Value::from(*key), value);
        }
        Self(fields)
    }

    /// Keep every field of the document, with the given `name` first.
    pub fn raw(name: &str, document: &Mapping) -> Self {
        let mut fields = Mapping::new();
        fields.insert(Value::from("name"), Value::from(name));
        for (key, value) in document {
            if key.as_str() == Some("name") {
                continue;
            }
            fields.insert(key.clone(), value.clone());
        }
        Self(fields)
    }

    pub fn name(&self) -> &str {
        self.0.get("name").and_then(Value::as_str).unwrap_or_default()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Keys as strings, in order.
    pub fn keys(&self) -> Vec<String> {
        self.0.keys().map(key_to_string).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (String, &Value)> {
        self.0.iter().map(|(key, value)| (key_to_string(key), value))
    }
}

fn key_to_string(key: &Value) -> String {
    match key {
        Value::String(s) => s.clone(),
        other => serde_yaml::to_string(other)
            .map(|s| s.trim_end().to_string())
            .unwrap_or_default(),
    }
}

/// Reject names that are not a single directory component.
pub fn validate_project_name(name: &str) -> Result<()> {
    let reason = if name.is_empty() {
        "name is empty"
    } else if name.contains('/') || name.contains('\\') {
        "name contains a path separator"
    } else if name == "." || name == ".." {
        "name refers to a relative directory"
    } else {
        return Ok(());
    };
    Err(Error::InvalidProjectName {
        name: name.to_string(),
        reason: reason.to_string(),
    })
}

/// Parse descriptor text into a mapping.
pub fn parse_descriptor(project: &str, text: &str) -> Result<Mapping> {
    let malformed = |message: String| Error::MalformedDescriptor {
        project: project.to_string(),
        message,
    };
    match serde_yaml::from_str::<Value>(text).map_err(|e| malformed(e.to_string()))? {
        Value::Mapping(mapping) => Ok(mapping),
        Value::Null => Err(malformed("document is empty".to_string())),
        _ => Err(malformed("top level is not a mapping".to_string())),
    }
}

/// Reads `project.yaml` files from the local clone or the raw content host.
pub struct DescriptorReader {
    provider: Arc<dyn ProjectsDirProvider>,
    fetcher: Arc<dyn RemoteFetcher>,
    settings: Settings,
}

impl DescriptorReader {
    pub fn new(
        provider: Arc<dyn ProjectsDirProvider>,
        fetcher: Arc<dyn RemoteFetcher>,
        settings: &Settings,
    ) -> Self {
        Self {
            provider,
            fetcher,
            settings: settings.clone(),
        }
    }

    /// Load and project the descriptor of `name`.
    pub fn get_project_info(
        &self,
        name: &str,
        raw: bool,
        use_fallback: bool,
    ) -> Result<ProjectDescriptor> {
        validate_project_name(name)?;

        let text = self.read_text(name, use_fallback)?;
        let document = parse_descriptor(name, &text)?;

        Ok(if raw {
            ProjectDescriptor::raw(name, &document)
        } else {
            ProjectDescriptor::project(name, &document)
        })
    }

    fn read_text(&self, name: &str, use_fallback: bool) -> Result<String> {
        let local_error = match self.read_local(name) {
            Ok(text) => return Ok(text),
            Err(e) => e,
        };

        if !use_fallback {
            return Err(Error::DescriptorUnavailable {
                project: name.to_string(),
                local_error: local_error.to_string(),
                fallback_error: None,
            });
        }

        warn!(
            "Reading {} for {} from the local clone failed, using raw content: {}",
            defaults::DESCRIPTOR_FILENAME,
            name,
            local_error
        );
        self.read_remote(name)
            .map_err(|fallback_error| Error::DescriptorUnavailable {
                project: name.to_string(),
                local_error: local_error.to_string(),
                fallback_error: Some(fallback_error.to_string()),
            })
    }

    fn read_local(&self, name: &str) -> Result<String> {
        let path = self
            .provider
            .projects_dir()?
            .join(name)
            .join(defaults::DESCRIPTOR_FILENAME);
        debug!("Reading {}", path.display());
        fs::read_to_string(&path)
            .map_err(|e| Error::Io(io::Error::new(e.kind(), format!("{}: {}", path.display(), e))))
    }

    fn read_remote(&self, name: &str) -> Result<String> {
        let url = self.settings.raw_descriptor_url(name)?;
        self.fetcher.fetch_text(&url, &self.settings.fetch_options())
    }
}
