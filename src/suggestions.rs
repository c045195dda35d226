//! # Error Suggestions
//!
//! This module turns library errors into messages that say what went wrong
//! AND how to fix it. Each helper returns an `anyhow::Error` whose message
//! ends with one or more `hint:` lines.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use ossfuzz_kit::suggestions;
//!
//! let names = client.list_projects(true).map_err(suggestions::from_error)?;
//! ```

use std::path::Path;

use crate::error::Error;

/// Generate an error for when the settings file is not found.
pub fn config_not_found(path: &Path) -> anyhow::Error {
    anyhow::anyhow!(
        "Settings file not found: {path}\n\n\
         hint: Use --config to specify a different path\n\
         hint: Unset OSSFUZZ_KIT_CONFIG to run with the built-in defaults",
        path = path.display()
    )
}

/// Generate an error for a project whose descriptor could not be read.
///
/// Suggests the closest known project name when there is one.
pub fn project_not_found(project: &str, error: &Error, known_projects: &[String]) -> anyhow::Error {
    let candidates: Vec<&str> = known_projects.iter().map(String::as_str).collect();
    let did_you_mean = find_similar(project, &candidates)
        .map(|s| format!("\nhint: Did you mean '{s}'?"))
        .unwrap_or_default();

    anyhow::anyhow!(
        "{error}{did_you_mean}\n\n\
         hint: Run 'ossfuzz-kit list-projects' to see available projects"
    )
}

/// Generate an error for when no source could produce data.
pub fn sources_unavailable(error: &Error, fallback_attempted: bool) -> anyhow::Error {
    let fallback_hint = if fallback_attempted {
        "hint: Check your network connection; the GitHub API may also be rate limiting you"
    } else {
        "hint: Drop --no-fallback to try the GitHub API when the local clone fails"
    };

    anyhow::anyhow!(
        "{error}\n\n\
         hint: Make sure git 2.25 or newer is installed and on PATH\n\
         {fallback_hint}\n\
         hint: Use --data-dir to keep the clone in a writable location"
    )
}

/// Generate an error for a clone that could not be created.
pub fn clone_failed(error: &Error) -> anyhow::Error {
    anyhow::anyhow!(
        "{error}\n\n\
         hint: Remove the data directory and retry if a previous clone was interrupted\n\
         hint: Use --data-dir to keep the clone in a writable location"
    )
}

/// Attach hints to any library error.
pub fn from_error(error: Error) -> anyhow::Error {
    match &error {
        Error::ProjectListUnavailable { fallback_error, .. } => {
            sources_unavailable(&error, fallback_error.is_some())
        }
        Error::DescriptorUnavailable { fallback_error, .. } => {
            sources_unavailable(&error, fallback_error.is_some())
        }
        Error::CloneFailed { .. } | Error::ProjectsDirMissing { .. } => clone_failed(&error),
        Error::InvalidProjectName { .. } => anyhow::anyhow!(
            "{error}\n\n\
             hint: Project names are single directory names such as 'libpng'"
        ),
        Error::InvalidRepoUrl { .. } => anyhow::anyhow!(
            "{error}\n\n\
             hint: repo_url must look like https://github.com/<owner>/<repo>.git"
        ),
        _ => anyhow::Error::new(error),
    }
}

/// Find a similar string from a list of candidates using edit distance.
///
/// Returns Some(candidate) if a close match is found (edit distance <= 2).
fn find_similar<'a>(input: &str, candidates: &[&'a str]) -> Option<&'a str> {
    candidates
        .iter()
        .filter_map(|&candidate| {
            let distance = edit_distance(input, candidate);
            if distance <= 2 && distance < input.len() {
                Some((candidate, distance))
            } else {
                None
            }
        })
        .min_by_key(|(_, distance)| *distance)
        .map(|(candidate, _)| candidate)
}

/// Calculate the Levenshtein edit distance between two strings.
fn edit_distance(a: &str, b: &str) -> usize {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();

    if a_chars.is_empty() {
        return b_chars.len();
    }
    if b_chars.is_empty() {
        return a_chars.len();
    }

    // Single rolling row
    let mut previous: Vec<usize> = (0..=b_chars.len()).collect();
    for (i, a_char) in a_chars.iter().enumerate() {
        let mut current = vec![i + 1; b_chars.len() + 1];
        for (j, b_char) in b_chars.iter().enumerate() {
            let cost = usize::from(a_char != b_char);
            current[j + 1] = (previous[j + 1] + 1)
                .min(current[j] + 1)
                .min(previous[j] + cost);
        }
        previous = current;
    }

    previous[b_chars.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unavailable(project: &str) -> Error {
        Error::DescriptorUnavailable {
            project: project.to_string(),
            local_error: "missing".to_string(),
            fallback_error: Some("404".to_string()),
        }
    }

    #[test]
    fn test_config_not_found_includes_hints() {
        let message = config_not_found(Path::new("/etc/ossfuzz-kit.yaml")).to_string();

        assert!(message.contains("Settings file not found"));
        assert!(message.contains("/etc/ossfuzz-kit.yaml"));
        assert!(message.contains("--config"));
        assert!(message.contains("OSSFUZZ_KIT_CONFIG"));
    }

    #[test]
    fn test_project_not_found_suggests_similar() {
        let known = vec!["libpng".to_string(), "libxml2".to_string()];
        let message = project_not_found("libpgn", &unavailable("libpgn"), &known).to_string();

        assert!(message.contains("project.yaml for libpgn"));
        assert!(message.contains("Did you mean 'libpng'?"));
        assert!(message.contains("list-projects"));
    }

    #[test]
    fn test_project_not_found_no_suggestion_for_very_different() {
        let known = vec!["libpng".to_string()];
        let message = project_not_found("openssl", &unavailable("openssl"), &known).to_string();
        assert!(!message.contains("Did you mean"));
    }

    #[test]
    fn test_no_fallback_hint() {
        let error = Error::ProjectListUnavailable {
            local_error: "clone failed".to_string(),
            fallback_error: None,
        };
        let message = from_error(error).to_string();
        assert!(message.contains("Drop --no-fallback"));
    }

    #[test]
    fn test_fallback_attempted_hint() {
        let error = Error::ProjectListUnavailable {
            local_error: "clone failed".to_string(),
            fallback_error: Some("HTTP 403".to_string()),
        };
        let message = from_error(error).to_string();
        assert!(message.contains("rate limiting"));
        assert!(message.contains("hint: Make sure git"));
    }

    #[test]
    fn test_invalid_project_name_hint() {
        let error = Error::InvalidProjectName {
            name: "a/b".to_string(),
            reason: "name contains a path separator".to_string(),
        };
        assert!(from_error(error).to_string().contains("single directory names"));
    }

    #[test]
    fn test_edit_distance() {
        assert_eq!(edit_distance("libpng", "libpng"), 0);
        assert_eq!(edit_distance("libpgn", "libpng"), 2);
        assert_eq!(edit_distance("curl", "curls"), 1);
        assert_eq!(edit_distance("", "zlib"), 4);
        assert_eq!(edit_distance("kitten", "sitting"), 3);
    }

    #[test]
    fn test_find_similar() {
        let candidates = ["libpng", "libxml2", "zlib"];

        assert_eq!(find_similar("libpn", &candidates), Some("libpng"));
        assert_eq!(find_similar("zlb", &candidates), Some("zlib"));
        assert_eq!(find_similar("openssl", &candidates), None);
    }
}
