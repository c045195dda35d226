//! # ossfuzz-kit
//!
//! Metadata about the fuzzing projects hosted in the OSS-Fuzz monorepo: the
//! list of project names and each project's `project.yaml` descriptor.
//!
//! The library keeps a shallow, sparse clone of the monorepo's `projects`
//! directory on disk and reads from it. When the clone cannot be made, it
//! falls back to the GitHub tree API and the raw content host.
//!
//! ## Quick Example
//!
//! ```
//! use ossfuzz_kit::descriptor::{parse_descriptor, ProjectDescriptor};
//!
//! let document = parse_descriptor("libpng", "language: c++\nbuild: cmake\n").unwrap();
//! let info = ProjectDescriptor::project("libpng", &document);
//!
//! assert_eq!(info.name(), "libpng");
//! assert_eq!(info.len(), 10);
//! assert!(info.get("sanitizers").unwrap().as_sequence().unwrap().is_empty());
//! ```
//!
//! ## Core Concepts
//!
//! - **Fetching (`fetch`)**: Blocking HTTP GET with retry and exponential
//!   backoff behind the `RemoteFetcher` trait.
//! - **Repository Management (`repository`, `git`, `cache`)**: Creates the
//!   sparse clone, checks it against the remote branch head, and refreshes it
//!   when stale.
//! - **Catalog (`catalog`)**: Lists project names, locally or from the tree
//!   API.
//! - **Descriptors (`descriptor`)**: Reads and projects `project.yaml`.
//! - **Client (`client`)**: Wires everything together from `Settings`.

pub mod cache;
pub mod catalog;
mod catalog_proptest;
pub mod client;
pub mod config;
pub mod defaults;
pub mod descriptor;
pub mod error;
pub mod fetch;
pub mod git;
pub mod output;
pub mod repository;
pub mod suggestions;

#[cfg(test)]
mod test_support;
