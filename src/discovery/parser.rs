//! Filename metadata parsing.

use std::path::PathBuf;

use serde::Serialize;
use tracing::{info, warn};

use super::{ArtifactPattern, DiscoveredFile};
use crate::error::ResolveError;
use crate::version::VersionTriple;

/// One implementation library offering a backend/ABI/engine variant.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CandidateArtifact {
    pub path: PathBuf,
    pub backend_tag: String,
    pub abi_tag: String,
    pub engine_version: VersionTriple,
    pub raw_file_name: String,
}

impl CandidateArtifact {
    /// Parse a discovered file. Returns `None` when the name does not fit
    /// the pattern; an unusable version token yields the sentinel version.
    pub fn parse(file: &DiscoveredFile, pattern: &ArtifactPattern) -> Option<Self> {
        let (backend, abi, token) = pattern.fields(&file.file_name)?;
        Some(Self {
            path: file.path.clone(),
            backend_tag: backend.to_string(),
            abi_tag: abi.to_string(),
            engine_version: VersionTriple::parse(token),
            raw_file_name: file.file_name.clone(),
        })
    }

    pub fn is_parseable(&self) -> bool {
        !self.engine_version.is_unparseable()
    }
}

/// Candidates of one resolution pass, in discovery order.
#[derive(Debug, Default)]
pub struct CandidateSet {
    pub candidates: Vec<CandidateArtifact>,
    /// Files skipped because their version token could not be parsed.
    pub unparseable: Vec<ResolveError>,
}

impl CandidateSet {
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }
}

/// Parse every discovered file, dropping the unparseable ones with a warning.
pub fn parse_candidates(files: &[DiscoveredFile], pattern: &ArtifactPattern) -> CandidateSet {
    let mut set = CandidateSet::default();

    for file in files {
        let Some(candidate) = CandidateArtifact::parse(file, pattern) else {
            continue;
        };
        if !candidate.is_parseable() {
            let err = ResolveError::UnparseableArtifact {
                file_name: candidate.raw_file_name,
            };
            warn!("{}", err);
            set.unparseable.push(err);
            continue;
        }
        info!(
            file = %candidate.raw_file_name,
            backend = %candidate.backend_tag,
            abi = %candidate.abi_tag,
            version = %candidate.engine_version,
            "found implementation"
        );
        set.candidates.push(candidate);
    }

    set
}
