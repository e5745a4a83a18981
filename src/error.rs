//! Resolution error types for the UUVR loader.
//!
//! Every variant except `UnparseableArtifact` aborts the bootstrap attempt.
//! Messages carry enough context (directory, host tags, available
//! candidates) for an operator to fix the deployment without the source.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while resolving or activating an implementation.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("Implementation directory not found: {0}")]
    DirectoryNotFound(PathBuf),

    #[error("Implementation {file_name} couldn't be parsed for loading")]
    UnparseableArtifact { file_name: String },

    #[error(
        "No implementation for backend {backend} / ABI {abi} \
         (available backends: [{}], available ABIs: [{}])",
        .available_backends.join(", "),
        .available_abis.join(", ")
    )]
    NoBackendOrAbiMatch {
        backend: String,
        abi: String,
        available_backends: Vec<String>,
        available_abis: Vec<String>,
    },

    #[error(
        "No implementation compatible with engine {engine_version} \
         (tried majors [{}], available majors: [{}])",
        join_majors(.attempted_majors),
        join_majors(.available_majors)
    )]
    NoCompatibleVersion {
        engine_version: String,
        attempted_majors: Vec<u32>,
        available_majors: Vec<u32>,
    },

    #[error("Failed to load implementation {path}: {reason}")]
    LoadFailure { path: PathBuf, reason: String },

    #[error("Implementation {path} does not export a usable entry point '{symbol}': {reason}")]
    EntryPointMissing {
        path: PathBuf,
        symbol: String,
        reason: String,
    },

    #[error("Implementation {path} entry point returned status {code}")]
    ActivationFailed { path: PathBuf, code: i32 },

    #[error("Invalid loader configuration: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ResolveError {
    /// Returns false only for per-candidate problems the pipeline skips.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::UnparseableArtifact { .. })
    }

    /// Returns true if this error is a deployment problem (wrong or missing
    /// implementation files) rather than a broken library.
    pub fn is_deployment_issue(&self) -> bool {
        matches!(
            self,
            Self::DirectoryNotFound(_)
                | Self::NoBackendOrAbiMatch { .. }
                | Self::NoCompatibleVersion { .. }
        )
    }
}

fn join_majors(majors: &[u32]) -> String {
    majors
        .iter()
        .map(|m| m.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
