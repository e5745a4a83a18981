//! Host environment probe.
//!
//! Produces the `HostFingerprint` the resolver matches candidates against.
//! Probing never fails: each fact has a fallback (`BackendKind::Unknown`,
//! `"unknown"`, the sentinel version) and downstream stages treat those
//! values as unmatchable.

mod game_dir;

pub use game_dir::GameDirIntrospector;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::version::VersionTriple;

/// ABI tag used when the managed runtime could not be identified.
pub const UNKNOWN_ABI: &str = "unknown";

/// Managed-runtime execution mode of the host process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BackendKind {
    /// JIT/interpreted managed runtime (Mono).
    ManagedInterpreted,
    /// Ahead-of-time compiled managed code (IL2CPP).
    AheadOfTimeCompiled,
    /// Could not be determined. Matches no candidate.
    Unknown,
}

impl BackendKind {
    /// Tag used in artifact filenames.
    pub fn label(self) -> &'static str {
        match self {
            Self::ManagedInterpreted => "Mono",
            Self::AheadOfTimeCompiled => "IL2CPP",
            Self::Unknown => UNKNOWN_ABI,
        }
    }

    pub fn is_known(self) -> bool {
        self != Self::Unknown
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("mono") || s.eq_ignore_ascii_case("managed_interpreted") {
            Ok(Self::ManagedInterpreted)
        } else if s.eq_ignore_ascii_case("il2cpp") || s.eq_ignore_ascii_case("ahead_of_time") {
            Ok(Self::AheadOfTimeCompiled)
        } else {
            Err(format!("unknown backend '{}', expected Mono or IL2CPP", s))
        }
    }
}

/// Facts about the running host, captured once and passed by value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostFingerprint {
    pub backend: BackendKind,
    pub abi_tag: String,
    pub is_64_bit: bool,
    pub engine_version: VersionTriple,
}

impl HostFingerprint {
    pub fn new(backend: BackendKind, abi_tag: impl Into<String>, engine_version: VersionTriple) -> Self {
        Self {
            backend,
            abi_tag: abi_tag.into(),
            is_64_bit: cfg!(target_pointer_width = "64"),
            engine_version,
        }
    }

    /// True when some fact could not be probed.
    pub fn is_degraded(&self) -> bool {
        !self.backend.is_known() || self.abi_tag == UNKNOWN_ABI || self.engine_version.is_unparseable()
    }
}

impl fmt::Display for HostFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{} engine {} ({})",
            self.backend,
            self.abi_tag,
            self.engine_version,
            if self.is_64_bit { "x64" } else { "x86" }
        )
    }
}

/// Source of raw host facts. `None` means "could not be determined".
pub trait HostIntrospector {
    fn backend(&self) -> Option<BackendKind>;

    fn abi_tag(&self) -> Option<String>;

    /// Raw engine version string as reported by the host, e.g. `2020.3.47f1`.
    fn engine_version(&self) -> Option<String>;

    fn is_64_bit(&self) -> bool {
        cfg!(target_pointer_width = "64")
    }
}

/// Operator-supplied values that take precedence over introspection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProbeOverrides {
    pub backend: Option<BackendKind>,
    pub abi_tag: Option<String>,
    pub engine_version: Option<String>,
}

/// Build the host fingerprint. Infallible.
pub fn probe(introspector: &dyn HostIntrospector, overrides: &ProbeOverrides) -> HostFingerprint {
    let backend = match overrides.backend {
        Some(backend) => {
            info!(%backend, "backend overridden by configuration");
            backend
        }
        None => introspector.backend().unwrap_or(BackendKind::Unknown),
    };

    let abi_tag = match &overrides.abi_tag {
        Some(abi) => {
            info!(abi = %abi, "ABI tag overridden by configuration");
            abi.clone()
        }
        None => introspector.abi_tag().unwrap_or_else(|| UNKNOWN_ABI.to_string()),
    };

    let raw_version = match &overrides.engine_version {
        Some(version) => {
            info!(engine_version = %version, "engine version overridden by configuration");
            Some(version.clone())
        }
        None => introspector.engine_version(),
    };
    let engine_version = raw_version
        .as_deref()
        .map(VersionTriple::parse)
        .unwrap_or_else(VersionTriple::unparseable);

    let fingerprint = HostFingerprint {
        backend,
        abi_tag,
        is_64_bit: introspector.is_64_bit(),
        engine_version,
    };

    info!(
        backend = %fingerprint.backend,
        abi = %fingerprint.abi_tag,
        is_64_bit = fingerprint.is_64_bit,
        engine_version = %fingerprint.engine_version,
        "host environment probed"
    );
    if fingerprint.engine_version.is_unparseable() {
        warn!(raw = ?raw_version, "engine version unknown; no candidate will match");
    }
    if !fingerprint.backend.is_known() {
        warn!("scripting backend unknown; no candidate will match");
    }
    if fingerprint.abi_tag == UNKNOWN_ABI {
        warn!("managed runtime ABI unknown; no candidate will match");
    }

    fingerprint
}
