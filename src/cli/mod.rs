//! Operator diagnostics for the `uuvr-loader` binary.
//!
//! Every command is a dry run: nothing is loaded and the activation marker
//! is never touched.
//!
//! ## Usage
//!
//! ```bash
//! uuvr-loader probe            # Show the host fingerprint
//! uuvr-loader scan [DIR]       # List implementation files
//! uuvr-loader resolve [DIR]    # Score candidates and show the selection
//! uuvr-loader config show      # Effective configuration
//! ```

pub mod config_cmd;
pub mod resolve_cmd;

pub use resolve_cmd::{run_probe, run_resolve, run_scan};

use std::path::PathBuf;

use crate::config::{self, LoaderConfig};
use crate::error::ResolveError;

/// Command succeeded.
pub const EXIT_OK: i32 = 0;
/// No implementation could be resolved.
pub const EXIT_RESOLUTION_FAILED: i32 = 1;
/// Configuration is invalid.
pub const EXIT_CONFIG_ERROR: i32 = 2;

/// Directory the loader is installed in: next to this binary, falling back
/// to the working directory.
pub fn loader_dir() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(PathBuf::from))
        .or_else(|| std::env::current_dir().ok())
        .unwrap_or_default()
}

/// Exit code for a resolution error.
pub fn exit_code(err: &ResolveError) -> i32 {
    match err {
        ResolveError::Config(_) => EXIT_CONFIG_ERROR,
        _ => EXIT_RESOLUTION_FAILED,
    }
}

/// Load configuration for the installed loader, reporting failures on stderr.
pub(crate) fn load_config() -> Result<(PathBuf, LoaderConfig), i32> {
    let dir = loader_dir();
    match config::load(&dir) {
        Ok(cfg) => Ok((dir, cfg)),
        Err(e) => {
            eprintln!("Error: {}", e);
            Err(EXIT_CONFIG_ERROR)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(exit_code(&ResolveError::Config("x".into())), EXIT_CONFIG_ERROR);
        assert_eq!(
            exit_code(&ResolveError::DirectoryNotFound(PathBuf::from("/missing"))),
            EXIT_RESOLUTION_FAILED
        );
    }

    #[test]
    fn test_loader_dir_is_a_directory() {
        assert!(loader_dir().is_dir());
    }
}
