//! Telemetry for the loader: subscriber setup and resolution spans.
//!
//! The log sink belongs to the host; the loader only emits `tracing` events.

mod logging;
mod spans;

pub use logging::{init_logging, LogConfig, LogError, LogFormat};
pub use spans::{ResolutionSpan, SpanExt};
