//! Fakes shared by the unit tests.

use std::collections::HashMap;
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;

use crate::error::{Error, Result};
use crate::fetch::{FetchOptions, Payload, RemoteFetcher, ResponseFormat};
use crate::repository::ProjectsDirProvider;

/// Serves canned bodies by URL and records every request.
///
/// Unknown URLs fail like a 404 after the configured number of attempts.
#[derive(Default)]
pub struct RecordingFetcher {
    responses: HashMap<String, String>,
    calls: Mutex<Vec<(String, FetchOptions)>>,
}

impl RecordingFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_json(mut self, url: &str, value: serde_json::Value) -> Self {
        self.responses.insert(url.to_string(), value.to_string());
        self
    }

    pub fn with_text(mut self, url: &str, body: &str) -> Self {
        self.responses.insert(url.to_string(), body.to_string());
        self
    }

    pub fn calls(&self) -> Vec<(String, FetchOptions)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

impl RemoteFetcher for RecordingFetcher {
    fn fetch(&self, url: &str, options: &FetchOptions) -> Result<Payload> {
        self.calls
            .lock()
            .unwrap()
            .push((url.to_string(), options.clone()));

        let Some(body) = self.responses.get(url) else {
            return Err(Error::FetchFailed {
                url: url.to_string(),
                attempts: options.max_retries.max(1),
                source: Box::new(io::Error::new(io::ErrorKind::NotFound, "404 Not Found")),
            });
        };

        match options.format {
            ResponseFormat::Text => Ok(Payload::Text(body.clone())),
            ResponseFormat::Bytes => Ok(Payload::Bytes(body.clone().into_bytes())),
            ResponseFormat::Json => serde_json::from_str(body)
                .map(Payload::Json)
                .map_err(|e| Error::Decode {
                    url: url.to_string(),
                    message: e.to_string(),
                }),
        }
    }
}

/// Hands out a fixed directory, or fails as if the clone could not be made.
pub struct StaticProjectsDir {
    path: Option<PathBuf>,
    calls: Mutex<usize>,
}

impl StaticProjectsDir {
    pub fn at(path: PathBuf) -> Self {
        Self {
            path: Some(path),
            calls: Mutex::new(0),
        }
    }

    pub fn unavailable() -> Self {
        Self {
            path: None,
            calls: Mutex::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

impl ProjectsDirProvider for StaticProjectsDir {
    fn projects_dir(&self) -> Result<PathBuf> {
        *self.calls.lock().unwrap() += 1;
        match &self.path {
            Some(path) => Ok(path.clone()),
            None => Err(Error::CloneFailed {
                url: "https://github.com/google/oss-fuzz.git".to_string(),
                message: "Could not resolve host: github.com".to_string(),
                hint: None,
            }),
        }
    }
}
