//! Engine version model and grammar.
//!
//! Implementation artifacts have been published with two version spellings
//! over time, so parsing dispatches on the detected format:
//!
//! - dotted: `MAJOR.MINOR[.PATCH]` (`2020.3.47f1`), the engine's own form
//! - underscored: `MAJOR[_MINOR[_PATCH]]` (`2018_4_9p1`), used in filenames
//!
//! A triple with `major == 0` is the unparseable sentinel. It never
//! compares equal to anything and is never selected.

use std::cmp::Ordering;
use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Engine version as `(major, minor, patch)`.
///
/// `patch` is free-form (`""`, `"9"`, `"47f1"`) because engine release
/// identifiers are not strictly numeric.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VersionTriple {
    pub major: u32,
    pub minor: u32,
    pub patch: String,
}

/// Version spelling detected in a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionFormat {
    Dotted,
    Underscored,
}

impl VersionFormat {
    /// Detect the grammar a token is written in.
    pub fn detect(token: &str) -> Self {
        if token.contains('.') {
            Self::Dotted
        } else {
            Self::Underscored
        }
    }

    fn pattern(self) -> &'static Regex {
        static DOTTED: OnceLock<Regex> = OnceLock::new();
        static UNDERSCORED: OnceLock<Regex> = OnceLock::new();
        match self {
            Self::Dotted => DOTTED.get_or_init(|| {
                Regex::new(r"^(\d+)\.(\d+)(?:\.([0-9A-Za-z]+))?$").expect("static regex")
            }),
            Self::Underscored => UNDERSCORED.get_or_init(|| {
                Regex::new(r"^(\d+)(?:_(\d+)(?:_([0-9A-Za-z]+))?)?$").expect("static regex")
            }),
        }
    }

    /// Parse `token` with this grammar. Returns the sentinel on mismatch.
    pub fn parse(self, token: &str) -> VersionTriple {
        let Some(caps) = self.pattern().captures(token) else {
            return VersionTriple::unparseable();
        };

        let major = match caps.get(1).map(|m| m.as_str().parse::<u32>()) {
            Some(Ok(major)) => major,
            _ => return VersionTriple::unparseable(),
        };
        let minor = match caps.get(2).map(|m| m.as_str().parse::<u32>()) {
            Some(Ok(minor)) => minor,
            Some(Err(_)) => return VersionTriple::unparseable(),
            None => 0,
        };
        let patch = caps.get(3).map(|m| m.as_str().to_string()).unwrap_or_default();

        if major == 0 {
            return VersionTriple::unparseable();
        }
        VersionTriple { major, minor, patch }
    }
}

impl VersionTriple {
    pub fn new(major: u32, minor: u32, patch: impl Into<String>) -> Self {
        Self {
            major,
            minor,
            patch: patch.into(),
        }
    }

    /// The canonical sentinel for "could not be parsed".
    pub fn unparseable() -> Self {
        Self::default()
    }

    /// Parse a version token in either supported grammar.
    pub fn parse(token: &str) -> Self {
        let token = token.trim();
        VersionFormat::detect(token).parse(token)
    }

    pub fn is_unparseable(&self) -> bool {
        self.major == 0
    }

    /// Case-insensitive ordinal comparison of the patch tokens.
    pub fn cmp_patch(&self, other: &Self) -> Ordering {
        let lhs = self.patch.bytes().map(|b| b.to_ascii_uppercase());
        let rhs = other.patch.bytes().map(|b| b.to_ascii_uppercase());
        lhs.cmp(rhs)
    }

    /// True iff all three fields are equal and neither side is the sentinel.
    pub fn exactly_matches(&self, other: &Self) -> bool {
        !self.is_unparseable()
            && self.major == other.major
            && self.minor == other.minor
            && self.cmp_patch(other) == Ordering::Equal
    }

    /// Render in the filename spelling, e.g. `2018_4_9p1`.
    pub fn to_underscored(&self) -> String {
        if self.patch.is_empty() {
            format!("{}_{}", self.major, self.minor)
        } else {
            format!("{}_{}_{}", self.major, self.minor, self.patch)
        }
    }
}

impl PartialEq for VersionTriple {
    fn eq(&self, other: &Self) -> bool {
        self.exactly_matches(other)
    }
}

impl fmt::Display for VersionTriple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_unparseable() {
            return write!(f, "unknown");
        }
        if self.patch.is_empty() {
            write!(f, "{}.{}", self.major, self.minor)
        } else {
            write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
        }
    }
}
