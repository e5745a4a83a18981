//! Compatibility scoring between the host and one candidate.
//!
//! Scores order candidates for a single host fingerprint only; they are not
//! comparable across hosts and are never persisted.
//!
//! Tiers, highest first:
//! 1. exact triple match: `MatchScore::EXACT`
//! 2. same major: `+100000`, `+10000` more when the minor also matches,
//!    otherwise `-100/step` for an older minor and `-500/step` for a newer one;
//!    with equal minors a differing patch costs `10` (older) or `50` (newer)
//! 3. other major: `-100000 - 10000/step` when older,
//!    `-500000 - 10000/step` when newer

use std::cmp::Ordering;
use std::fmt;

use serde::Serialize;

use crate::discovery::CandidateArtifact;
use crate::probe::HostFingerprint;
use crate::version::VersionTriple;

const OLDER_MAJOR_BASE: i64 = -100_000;
const NEWER_MAJOR_BASE: i64 = -500_000;
const MAJOR_STEP: i64 = 10_000;

const SAME_MAJOR_BASE: i64 = 100_000;
const SAME_MINOR_BONUS: i64 = 10_000;
const OLDER_MINOR_STEP: i64 = 100;
const NEWER_MINOR_STEP: i64 = 500;

const OLDER_PATCH_PENALTY: i64 = 10;
const NEWER_PATCH_PENALTY: i64 = 50;

/// Fitness of a candidate for a host. Higher is better.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct MatchScore(i64);

impl MatchScore {
    /// Reserved for an exact `(major, minor, patch)` match.
    pub const EXACT: Self = Self(i64::MAX);

    /// Given to sentinel versions so they can never win.
    pub const UNMATCHABLE: Self = Self(i64::MIN);

    pub fn value(self) -> i64 {
        self.0
    }

    pub fn is_exact(self) -> bool {
        self == Self::EXACT
    }
}

impl fmt::Display for MatchScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::EXACT => f.write_str("exact"),
            Self::UNMATCHABLE => f.write_str("unmatchable"),
            Self(value) => write!(f, "{}", value),
        }
    }
}

/// Score a candidate against the host fingerprint.
pub fn score(host: &HostFingerprint, candidate: &CandidateArtifact) -> MatchScore {
    score_versions(&host.engine_version, &candidate.engine_version)
}

/// Score a candidate engine version against the host engine version.
pub fn score_versions(host: &VersionTriple, candidate: &VersionTriple) -> MatchScore {
    if host.is_unparseable() || candidate.is_unparseable() {
        return MatchScore::UNMATCHABLE;
    }
    if host.exactly_matches(candidate) {
        return MatchScore::EXACT;
    }

    if candidate.major != host.major {
        let diff = i64::from(host.major.abs_diff(candidate.major));
        let base = if candidate.major < host.major {
            OLDER_MAJOR_BASE
        } else {
            NEWER_MAJOR_BASE
        };
        return MatchScore(base - diff * MAJOR_STEP);
    }

    let mut score = SAME_MAJOR_BASE;
    if candidate.minor == host.minor {
        score += SAME_MINOR_BONUS;
        score -= match candidate.cmp_patch(host) {
            Ordering::Less => OLDER_PATCH_PENALTY,
            _ => NEWER_PATCH_PENALTY,
        };
    } else {
        let diff = i64::from(host.minor.abs_diff(candidate.minor));
        score -= if candidate.minor < host.minor {
            diff * OLDER_MINOR_STEP
        } else {
            diff * NEWER_MINOR_STEP
        };
    }

    MatchScore(score)
}
