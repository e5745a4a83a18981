//! Implementation resolver: discovery, scoring and selection.
//!
//! A resolution pass rebuilds its candidate set from disk every time and
//! keeps nothing between passes.

mod score;
mod select;

pub use score::{score, score_versions, MatchScore};
pub use select::{is_compatible, score_all, select, ScoredCandidate, Selection, Tier};

use std::path::Path;

use crate::discovery::{discover, parse_candidates, ArtifactPattern, CandidateSet};
use crate::error::ResolveError;
use crate::probe::HostFingerprint;

/// Everything one resolution pass produced.
#[derive(Debug)]
pub struct Resolution {
    pub candidates: CandidateSet,
    pub selection: Selection,
}

/// Discover, parse and select in `directory` for `host`.
pub fn resolve(
    host: &HostFingerprint,
    directory: &Path,
    pattern: &ArtifactPattern,
) -> Result<Resolution, ResolveError> {
    let files = discover(directory, pattern)?;
    let candidates = parse_candidates(&files, pattern);
    let selection = select(host, &candidates.candidates)?;
    Ok(Resolution { candidates, selection })
}
