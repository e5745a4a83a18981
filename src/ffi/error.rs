//! Status codes and per-thread last-error storage for the C ABI.

use std::cell::RefCell;
use std::ffi::c_char;

use crate::error::ResolveError;

/// Status returned by `uuvr_loader_bootstrap`. Values are stable.
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoaderStatus {
    Ok = 0,
    AlreadyActive = 1,
    InvalidArgument = -1,
    DirectoryNotFound = -2,
    UnparseableArtifact = -3,
    NoBackendOrAbiMatch = -4,
    NoCompatibleVersion = -5,
    LoadFailure = -6,
    EntryPointMissing = -7,
    ActivationFailed = -8,
    Config = -9,
    Io = -10,
    Panic = -99,
}

impl From<&ResolveError> for LoaderStatus {
    fn from(err: &ResolveError) -> Self {
        match err {
            ResolveError::DirectoryNotFound(_) => Self::DirectoryNotFound,
            ResolveError::UnparseableArtifact { .. } => Self::UnparseableArtifact,
            ResolveError::NoBackendOrAbiMatch { .. } => Self::NoBackendOrAbiMatch,
            ResolveError::NoCompatibleVersion { .. } => Self::NoCompatibleVersion,
            ResolveError::LoadFailure { .. } => Self::LoadFailure,
            ResolveError::EntryPointMissing { .. } => Self::EntryPointMissing,
            ResolveError::ActivationFailed { .. } => Self::ActivationFailed,
            ResolveError::Config(_) => Self::Config,
            ResolveError::Io(_) => Self::Io,
        }
    }
}

thread_local! {
    static LAST_ERROR: RefCell<Option<String>> = const { RefCell::new(None) };
}

pub fn set_last_error(msg: impl Into<String>) {
    LAST_ERROR.with(|e| *e.borrow_mut() = Some(msg.into()));
}

pub(crate) fn clear_last_error() {
    LAST_ERROR.with(|e| *e.borrow_mut() = None);
}

/// Last error recorded on this thread.
pub fn last_error() -> Option<String> {
    LAST_ERROR.with(|e| e.borrow().clone())
}

/// Copy the calling thread's last error message into `buf`.
///
/// Writes at most `len - 1` bytes plus a NUL terminator and returns the
/// full message length in bytes (0 when there is no error). A return value
/// of `len` or more means the message was truncated.
///
/// # Safety
/// `buf` must be null or valid for writes of `len` bytes.
#[no_mangle]
pub unsafe extern "C" fn uuvr_loader_last_error(buf: *mut c_char, len: usize) -> usize {
    let Some(msg) = last_error() else {
        if !buf.is_null() && len > 0 {
            *buf = 0;
        }
        return 0;
    };

    let bytes = msg.as_bytes();
    if !buf.is_null() && len > 0 {
        let n = bytes.len().min(len - 1);
        std::ptr::copy_nonoverlapping(bytes.as_ptr(), buf as *mut u8, n);
        *buf.add(n) = 0;
    }
    bytes.len()
}
