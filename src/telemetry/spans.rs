//! Span utilities for resolution tracing.

use std::path::Path;

use tracing::{info_span, Span};

use crate::probe::HostFingerprint;

/// Extension trait for adding context to spans.
pub trait SpanExt {
    /// Record the result of an operation into the span.
    fn record_result<T, E>(&self, result: &Result<T, E>)
    where
        E: std::fmt::Display;
}

impl SpanExt for Span {
    fn record_result<T, E>(&self, result: &Result<T, E>)
    where
        E: std::fmt::Display,
    {
        match result {
            Ok(_) => {
                self.record("status", "ok");
            }
            Err(e) => {
                self.record("status", "error");
                self.record("error.message", e.to_string().as_str());
            }
        }
    }
}

/// Factory for the span wrapping one resolution pass.
pub struct ResolutionSpan;

impl ResolutionSpan {
    /// Fields included:
    /// - `directory`, `backend`, `abi`, `engine_version`
    /// - `status`, `error.message`: filled in by `SpanExt::record_result`
    /// - `selected`: file name of the chosen implementation
    pub fn new(directory: &Path, host: &HostFingerprint) -> Span {
        info_span!(
            "resolution",
            directory = %directory.display(),
            backend = %host.backend,
            abi = %host.abi_tag,
            engine_version = %host.engine_version,
            status = tracing::field::Empty,
            error.message = tracing::field::Empty,
            selected = tracing::field::Empty,
        )
    }
}
