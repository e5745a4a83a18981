//! Activation of the selected implementation.
//!
//! The implementation contract is one exported C function:
//!
//! ```c
//! int32_t uuvr_implementation_start(void *config);
//! ```
//!
//! returning 0 on success. An implementation may also export
//! `UUVR_IMPLEMENTATION_ABI` (`uint32_t`); when present it must equal
//! [`ENTRY_ABI_VERSION`].

mod dynamic;

pub use dynamic::{artifact_digest, ArtifactDigest, LibraryActivator};

use std::ffi::{c_void, OsString};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::discovery::CandidateArtifact;
use crate::error::ResolveError;

/// Default entry point symbol.
pub const ENTRY_SYMBOL: &str = "uuvr_implementation_start";

/// Optional data symbol carrying the implementation's entry ABI version.
pub const ABI_SYMBOL: &str = "UUVR_IMPLEMENTATION_ABI";

/// Entry ABI version this loader calls.
pub const ENTRY_ABI_VERSION: u32 = 1;

/// Default name of the process environment marker set after activation.
pub const DEFAULT_MARKER_VAR: &str = "UUVR_LOADER_ACTIVE";

/// Signature of the implementation entry point.
pub type EntryPointFn = unsafe extern "C" fn(config: *mut c_void) -> i32;

/// Opaque host configuration handle, forwarded untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfigHandle(*mut c_void);

impl ConfigHandle {
    pub fn from_raw(ptr: *mut c_void) -> Self {
        Self(ptr)
    }

    pub fn null() -> Self {
        Self(std::ptr::null_mut())
    }

    pub fn as_ptr(self) -> *mut c_void {
        self.0
    }

    pub fn is_null(self) -> bool {
        self.0.is_null()
    }
}

impl Default for ConfigHandle {
    fn default() -> Self {
        Self::null()
    }
}

/// Loads an artifact and hands it the host configuration.
pub trait Activator {
    /// Load `artifact` and invoke its entry point. Errors are fatal for the
    /// attempt; callers must not retry with another candidate.
    fn activate(&self, artifact: &CandidateArtifact, config: ConfigHandle) -> Result<(), ResolveError>;
}

/// Process-wide record that an implementation has been activated.
///
/// Stored in the process environment so that a second loader instance in
/// the same process (a double registration) sees it too. The value is
/// `<pid>:<path>`; child processes inherit the variable but carry another
/// pid, so for them the marker reads as unset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivationMarker {
    var: String,
}

impl ActivationMarker {
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }

    pub fn var(&self) -> &str {
        &self.var
    }

    /// Path of the implementation already active in this process, if any.
    pub fn active(&self) -> Option<PathBuf> {
        let value = std::env::var_os(&self.var)?;
        let value = value.to_string_lossy();
        let (owner, path) = value.split_once(':')?;
        if owner.parse::<u32>().ok()? != std::process::id() {
            debug!(marker = %self.var, owner, "ignoring activation marker inherited from another process");
            return None;
        }
        Some(PathBuf::from(path)).filter(|p| !p.as_os_str().is_empty())
    }

    pub fn mark(&self, artifact: &CandidateArtifact) {
        self.mark_path(&artifact.path);
    }

    /// Record `path` as active in this process.
    pub fn mark_path(&self, path: &Path) {
        debug!(marker = %self.var, path = %path.display(), "recording activation");
        let mut value = OsString::from(format!("{}:", std::process::id()));
        value.push(path.as_os_str());
        std::env::set_var(&self.var, value);
    }

    pub fn clear(&self) {
        std::env::remove_var(&self.var);
    }
}

impl Default for ActivationMarker {
    fn default() -> Self {
        Self::new(DEFAULT_MARKER_VAR)
    }
}
