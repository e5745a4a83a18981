//! Implementation artifact discovery.
//!
//! Scans one flat directory for files named
//! `<prefix>-<backend>-<abi>-<engine version>.<ext>`. Files that do not fit
//! the pattern are skipped silently; the directory may hold anything else.

mod parser;

pub use parser::{parse_candidates, CandidateArtifact, CandidateSet};

use std::fs;
use std::path::{Path, PathBuf};

use regex::{Regex, RegexBuilder};
use tracing::{debug, info};

use crate::error::ResolveError;

/// A file whose name fits the artifact pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredFile {
    pub path: PathBuf,
    pub file_name: String,
}

/// Fixed-field filename convention for implementation artifacts.
#[derive(Debug, Clone)]
pub struct ArtifactPattern {
    prefix: String,
    extension: String,
    regex: Regex,
}

impl ArtifactPattern {
    /// Build the pattern for a prefix and extension (without the dot).
    pub fn new(prefix: &str, extension: &str) -> Result<Self, ResolveError> {
        let extension = extension.trim_start_matches('.');
        if prefix.is_empty() || prefix.contains('-') {
            return Err(ResolveError::Config(format!(
                "artifact prefix '{}' must be non-empty and contain no '-'",
                prefix
            )));
        }
        if extension.is_empty() {
            return Err(ResolveError::Config("artifact extension cannot be empty".into()));
        }

        let source = format!(
            r"^{}-([^-]+)-([^-]+)-([^-]+)\.{}$",
            regex::escape(prefix),
            regex::escape(extension)
        );
        let regex = RegexBuilder::new(&source)
            .case_insensitive(true)
            .build()
            .map_err(|e| ResolveError::Config(format!("invalid artifact pattern: {}", e)))?;

        Ok(Self {
            prefix: prefix.to_string(),
            extension: extension.to_string(),
            regex,
        })
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    pub fn matches(&self, file_name: &str) -> bool {
        self.regex.is_match(file_name)
    }

    /// Split a matching file name into `(backend, abi, version token)`.
    pub fn fields<'a>(&self, file_name: &'a str) -> Option<(&'a str, &'a str, &'a str)> {
        let caps = self.regex.captures(file_name)?;
        Some((caps.get(1)?.as_str(), caps.get(2)?.as_str(), caps.get(3)?.as_str()))
    }

    /// Render the file name a candidate would be published under.
    pub fn file_name(&self, backend: &str, abi: &str, version_token: &str) -> String {
        format!("{}-{}-{}-{}.{}", self.prefix, backend, abi, version_token, self.extension)
    }
}

impl Default for ArtifactPattern {
    fn default() -> Self {
        Self::new("UUVR", std::env::consts::DLL_EXTENSION)
            .expect("default artifact pattern is valid")
    }
}

/// List artifact files in `directory`, sorted by file name.
///
/// A missing directory is a hard error: without candidates the loader
/// cannot run.
pub fn discover(directory: &Path, pattern: &ArtifactPattern) -> Result<Vec<DiscoveredFile>, ResolveError> {
    if !directory.is_dir() {
        return Err(ResolveError::DirectoryNotFound(directory.to_path_buf()));
    }

    info!(directory = %directory.display(), "searching for implementations");

    let mut found = Vec::new();
    for entry in fs::read_dir(directory)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let Some(file_name) = entry.file_name().to_str().map(str::to_string) else {
            continue;
        };
        if !pattern.matches(&file_name) {
            debug!(file = %file_name, "ignoring file outside the artifact pattern");
            continue;
        }
        found.push(DiscoveredFile {
            path: entry.path(),
            file_name,
        });
    }

    found.sort_by(|a, b| a.file_name.cmp(&b.file_name));
    info!(count = found.len(), "implementation files found");
    Ok(found)
}
