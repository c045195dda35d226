//! Thin wrappers around the system `git` command.
//!
//! Using the system binary means SSH keys, credential helpers and proxy
//! settings from `~/.gitconfig` apply without any configuration here. A
//! non-zero exit status is the only failure signal; stdout is read only for
//! `rev-parse HEAD`.

use std::ffi::OsStr;
use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use log::debug;

use crate::error::Error;

/// Shallow, blob-filtered, sparse-enabled clone of `url` into `target_dir`.
///
/// Only the repository's top-level files are checked out until
/// [`sparse_checkout_set`] narrows the working tree.
pub fn clone_sparse(url: &str, depth: u32, target_dir: &Path) -> Result<(), Error> {
    clear_previous_clone(url, target_dir)?;

    if let Some(parent) = target_dir.parent() {
        fs::create_dir_all(parent)?;
    }

    let depth = depth.to_string();
    let output = run_git(
        None,
        [
            OsStr::new("clone"),
            OsStr::new("--depth"),
            OsStr::new(&depth),
            OsStr::new("--filter=blob:none"),
            OsStr::new("--sparse"),
            OsStr::new(url),
            target_dir.as_os_str(),
        ],
    )
    .map_err(|e| Error::CloneFailed {
        url: url.to_string(),
        message: e.to_string(),
        hint: Some("Make sure git is installed and on PATH".to_string()),
    })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(Error::CloneFailed {
            url: url.to_string(),
            message: stderr.trim().to_string(),
            hint: clone_hint(&stderr),
        });
    }

    Ok(())
}

/// Remove a leftover clone of `url` at `target_dir`.
///
/// git refuses to clone into a non-empty directory. Only a work tree whose
/// `origin` is `url` is removed; anything else at that path is left alone and
/// reported as a clone failure.
fn clear_previous_clone(url: &str, target_dir: &Path) -> Result<(), Error> {
    if !target_dir.exists() || fs::read_dir(target_dir)?.next().is_none() {
        return Ok(());
    }

    match origin_url(target_dir) {
        Some(origin) if origin == url => {
            debug!("Removing incomplete clone at {}", target_dir.display());
            fs::remove_dir_all(target_dir)?;
            Ok(())
        }
        _ => Err(Error::CloneFailed {
            url: url.to_string(),
            message: format!(
                "{} already exists and is not a clone of this repository",
                target_dir.display()
            ),
            hint: Some(
                "Choose another --data-dir, or move the existing directory aside".to_string(),
            ),
        }),
    }
}

/// `remote.origin.url` of the work tree rooted at `repo_dir`, if it is one.
fn origin_url(repo_dir: &Path) -> Option<String> {
    // Without this check git would answer for an enclosing repository
    if !repo_dir.join(".git").exists() {
        return None;
    }
    let output = run_git(Some(repo_dir), ["config", "--get", "remote.origin.url"]).ok()?;
    if !output.status.success() {
        return None;
    }
    Some(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

/// Restrict the working tree of `repo_dir` to `subtree`.
pub fn sparse_checkout_set(url: &str, repo_dir: &Path, subtree: &str) -> Result<(), Error> {
    let output = run_git(Some(repo_dir), ["sparse-checkout", "set", subtree]).map_err(|e| {
        Error::CloneFailed {
            url: url.to_string(),
            message: format!("sparse-checkout set {}: {}", subtree, e),
            hint: None,
        }
    })?;

    if !output.status.success() {
        return Err(Error::CloneFailed {
            url: url.to_string(),
            message: format!(
                "sparse-checkout set {}: {}",
                subtree,
                String::from_utf8_lossy(&output.stderr).trim()
            ),
            hint: None,
        });
    }

    Ok(())
}

/// Commit hash of `HEAD` in `repo_dir`.
pub fn rev_parse_head(repo_dir: &Path) -> Result<String, Error> {
    let output = checked(repo_dir, "rev-parse HEAD", ["rev-parse", "HEAD"])?;
    let hash = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if hash.is_empty() {
        return Err(Error::GitCommand {
            command: "rev-parse HEAD".to_string(),
            dir: repo_dir.display().to_string(),
            stderr: "empty output".to_string(),
        });
    }
    Ok(hash)
}

/// Fast-forward `repo_dir` keeping the history truncated to `depth`.
pub fn pull(repo_dir: &Path, depth: u32) -> Result<(), Error> {
    let depth = depth.to_string();
    checked(repo_dir, "pull", ["pull", "--depth", depth.as_str()])?;
    Ok(())
}

fn checked<I, S>(repo_dir: &Path, command: &str, args: I) -> Result<Output, Error>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let failure = |stderr: String| Error::GitCommand {
        command: command.to_string(),
        dir: repo_dir.display().to_string(),
        stderr,
    };

    let output = run_git(Some(repo_dir), args).map_err(|e| failure(e.to_string()))?;
    if !output.status.success() {
        return Err(failure(
            String::from_utf8_lossy(&output.stderr).trim().to_string(),
        ));
    }
    Ok(output)
}

fn run_git<I, S>(repo_dir: Option<&Path>, args: I) -> std::io::Result<Output>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let mut command = Command::new("git");
    if let Some(dir) = repo_dir {
        command.arg("-C").arg(dir);
    }
    command.args(args);
    debug!("Running {:?}", command);
    command.output()
}

/// Helpful hint for common clone failures.
fn clone_hint(stderr: &str) -> Option<String> {
    if stderr.contains("Authentication failed")
        || stderr.contains("Permission denied")
        || stderr.contains("Could not read from remote repository")
    {
        Some(
            "Make sure you have access to the repository. For private repos, ensure \
             your SSH key or git credentials are configured"
                .to_string(),
        )
    } else if stderr.contains("Could not resolve host") {
        Some("Check your network connection, or rely on the remote API fallback".to_string())
    } else if stderr.contains("unknown option") || stderr.contains("sparse") {
        Some("Sparse clones need git 2.25 or newer".to_string())
    } else {
        None
    }
}
