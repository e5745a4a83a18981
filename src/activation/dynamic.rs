//! Native library activation via `libloading`.

use std::fs::File;
use std::io;
use std::path::Path;

use libloading::{Library, Symbol};
use sha2::{Digest, Sha256};
use tracing::{error, info, warn};

use super::{Activator, ConfigHandle, EntryPointFn, ABI_SYMBOL, ENTRY_ABI_VERSION, ENTRY_SYMBOL};
use crate::discovery::CandidateArtifact;
use crate::error::ResolveError;

/// SHA-256 and size of an artifact on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactDigest {
    pub sha256: String,
    pub size_bytes: u64,
}

/// Hash an artifact for the activation log.
pub fn artifact_digest(path: &Path) -> io::Result<ArtifactDigest> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    let size_bytes = io::copy(&mut file, &mut hasher)?;
    Ok(ArtifactDigest {
        sha256: hex::encode(hasher.finalize()),
        size_bytes,
    })
}

/// Loads implementations as native shared libraries.
///
/// The loaded library is never unloaded: the implementation keeps running
/// for the lifetime of the host process.
#[derive(Debug, Clone)]
pub struct LibraryActivator {
    entry_symbol: String,
}

impl LibraryActivator {
    pub fn new(entry_symbol: impl Into<String>) -> Self {
        Self {
            entry_symbol: entry_symbol.into(),
        }
    }

    pub fn entry_symbol(&self) -> &str {
        &self.entry_symbol
    }

    fn load(&self, path: &Path) -> Result<Library, ResolveError> {
        // SAFETY: loading runs the library's initializers. Implementations are
        // trusted code shipped alongside the loader.
        unsafe { Library::new(path) }.map_err(|e| ResolveError::LoadFailure {
            path: path.to_path_buf(),
            reason: format!(
                "{} (host process is {}-bit)",
                e,
                if cfg!(target_pointer_width = "64") { 64 } else { 32 }
            ),
        })
    }

    fn check_abi(&self, library: &Library, path: &Path) -> Result<(), ResolveError> {
        // SAFETY: the symbol, when exported, is a `u32` static per the
        // implementation contract.
        let declared = unsafe {
            match library.get::<*const u32>(ABI_SYMBOL.as_bytes()) {
                Ok(symbol) if !symbol.is_null() => Some(**symbol),
                _ => None,
            }
        };

        match declared {
            Some(version) if version != ENTRY_ABI_VERSION => Err(ResolveError::EntryPointMissing {
                path: path.to_path_buf(),
                symbol: self.entry_symbol.clone(),
                reason: format!(
                    "implementation entry ABI {} is incompatible with loader ABI {}",
                    version, ENTRY_ABI_VERSION
                ),
            }),
            Some(_) => Ok(()),
            None => {
                warn!(path = %path.display(), "implementation does not declare {}", ABI_SYMBOL);
                Ok(())
            }
        }
    }

    fn start(&self, library: &Library, path: &Path, config: ConfigHandle) -> Result<(), ResolveError> {
        self.check_abi(library, path)?;

        // SAFETY: the entry point signature is fixed by the implementation
        // contract and guarded by the ABI check above.
        let entry: Symbol<EntryPointFn> = unsafe { library.get(self.entry_symbol.as_bytes()) }
            .map_err(|e| ResolveError::EntryPointMissing {
                path: path.to_path_buf(),
                symbol: self.entry_symbol.clone(),
                reason: e.to_string(),
            })?;

        info!(path = %path.display(), symbol = %self.entry_symbol, "invoking implementation entry point");
        // SAFETY: `config` is the host's opaque handle, passed through as-is.
        let code = unsafe { entry(config.as_ptr()) };
        if code != 0 {
            return Err(ResolveError::ActivationFailed {
                path: path.to_path_buf(),
                code,
            });
        }
        Ok(())
    }
}

impl Default for LibraryActivator {
    fn default() -> Self {
        Self::new(ENTRY_SYMBOL)
    }
}

impl Activator for LibraryActivator {
    fn activate(&self, artifact: &CandidateArtifact, config: ConfigHandle) -> Result<(), ResolveError> {
        let path = artifact.path.as_path();
        match artifact_digest(path) {
            Ok(digest) => info!(
                path = %path.display(),
                sha256 = %digest.sha256,
                size_bytes = digest.size_bytes,
                "loading implementation"
            ),
            Err(e) => warn!(path = %path.display(), error = %e, "could not hash implementation"),
        }

        let library = self.load(path)?;
        let result = self.start(&library, path, config);
        // Entry code may have registered callbacks; keep the library mapped.
        std::mem::forget(library);

        if let Err(e) = &result {
            error!(path = %path.display(), error = %e, "implementation activation failed");
        }
        result
    }
}
