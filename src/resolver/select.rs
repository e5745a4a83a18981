//! Candidate selection with a one-major fallback tier.

use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;
use tracing::{info, warn};

use super::score::{score, MatchScore};
use crate::discovery::CandidateArtifact;
use crate::error::ResolveError;
use crate::probe::{HostFingerprint, UNKNOWN_ABI};

/// Major-version bucket a selection came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    /// Same major version as the host.
    Exact,
    /// Exactly one major version below the host.
    OneMajorOlder,
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact => f.write_str("exact"),
            Self::OneMajorOlder => f.write_str("one-major-older"),
        }
    }
}

/// A candidate with its score for the current host.
#[derive(Debug, Clone, Serialize)]
pub struct ScoredCandidate {
    pub artifact: CandidateArtifact,
    pub score: MatchScore,
}

/// Outcome of a successful selection.
#[derive(Debug, Clone, Serialize)]
pub struct Selection {
    pub artifact: CandidateArtifact,
    pub score: MatchScore,
    pub tier: Tier,
    /// Candidates in the winning tier sharing the winning score (>= 1).
    pub tied: usize,
}

/// True if the candidate satisfies the hard backend/ABI requirements.
///
/// A host whose backend or ABI could not be probed matches nothing, even a
/// file tagged `unknown`.
pub fn is_compatible(host: &HostFingerprint, candidate: &CandidateArtifact) -> bool {
    if !host.backend.is_known() || host.abi_tag == UNKNOWN_ABI {
        return false;
    }
    candidate.backend_tag.eq_ignore_ascii_case(host.backend.label()) && candidate.abi_tag == host.abi_tag
}

/// Score every backend/ABI-compatible candidate, keeping discovery order.
pub fn score_all(host: &HostFingerprint, candidates: &[CandidateArtifact]) -> Vec<ScoredCandidate> {
    candidates
        .iter()
        .filter(|c| c.is_parseable() && is_compatible(host, c))
        .map(|c| ScoredCandidate {
            artifact: c.clone(),
            score: score(host, c),
        })
        .collect()
}

/// Pick the implementation for `host` out of `candidates` (discovery order).
pub fn select(host: &HostFingerprint, candidates: &[CandidateArtifact]) -> Result<Selection, ResolveError> {
    info!(
        backend = %host.backend,
        abi = %host.abi_tag,
        engine_version = %host.engine_version,
        "looking for matching implementation"
    );

    let survivors = score_all(host, candidates);
    if survivors.is_empty() {
        let parseable = candidates.iter().filter(|c| c.is_parseable());
        return Err(ResolveError::NoBackendOrAbiMatch {
            backend: host.backend.label().to_string(),
            abi: host.abi_tag.clone(),
            available_backends: distinct(parseable.clone().map(|c| c.backend_tag.clone())),
            available_abis: distinct(parseable.map(|c| c.abi_tag.clone())),
        });
    }

    for scored in &survivors {
        info!(
            file = %scored.artifact.raw_file_name,
            version = %scored.artifact.engine_version,
            score = %scored.score,
            "implementation scored"
        );
    }

    let attempted = attempted_tiers(host);
    for &(tier, major) in &attempted {
        let in_tier: Vec<&ScoredCandidate> = survivors
            .iter()
            .filter(|s| s.artifact.engine_version.major == major)
            .collect();
        if let Some(selection) = best_in_tier(tier, &in_tier) {
            info!(
                file = %selection.artifact.raw_file_name,
                version = %selection.artifact.engine_version,
                score = %selection.score,
                tier = %selection.tier,
                "selected implementation"
            );
            return Ok(selection);
        }
        if tier == Tier::Exact {
            info!(major, "no implementation for the host major version, trying one major older");
        }
    }

    let available: BTreeSet<u32> = survivors
        .iter()
        .map(|s| s.artifact.engine_version.major)
        .collect();
    Err(ResolveError::NoCompatibleVersion {
        engine_version: host.engine_version.to_string(),
        attempted_majors: attempted.iter().map(|&(_, major)| major).collect(),
        available_majors: available.into_iter().collect(),
    })
}

/// Majors to try, in order. Empty when the host version is unknown.
fn attempted_tiers(host: &HostFingerprint) -> Vec<(Tier, u32)> {
    let major = host.engine_version.major;
    if host.engine_version.is_unparseable() {
        return Vec::new();
    }
    let mut tiers = vec![(Tier::Exact, major)];
    if major > 1 {
        tiers.push((Tier::OneMajorOlder, major - 1));
    }
    tiers
}

/// Highest score wins; the first one in discovery order wins a tie.
fn best_in_tier(tier: Tier, in_tier: &[&ScoredCandidate]) -> Option<Selection> {
    let mut best: Option<&ScoredCandidate> = None;
    for &candidate in in_tier {
        if best.map_or(true, |b| candidate.score > b.score) {
            best = Some(candidate);
        }
    }
    let best = best?;

    let tied = in_tier.iter().filter(|c| c.score == best.score).count();
    if tied > 1 {
        warn!(
            count = tied,
            score = %best.score,
            chosen = %best.artifact.raw_file_name,
            "multiple equally good implementations; using the first discovered"
        );
    }

    Some(Selection {
        artifact: best.artifact.clone(),
        score: best.score,
        tier,
        tied,
    })
}

fn distinct(tags: impl Iterator<Item = String>) -> Vec<String> {
    tags.collect::<BTreeSet<_>>().into_iter().collect()
}
