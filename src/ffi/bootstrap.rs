//! Host entry point.

use std::ffi::{c_char, c_void, CStr};
use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;

use super::error::{clear_last_error, set_last_error, LoaderStatus};
use crate::activation::ConfigHandle;
use crate::Outcome;

/// Resolve and activate the matching implementation.
///
/// `plugin_dir` is the loader's installation directory (UTF-8, NUL
/// terminated); null means the process working directory. `config` is
/// forwarded untouched to the implementation entry point.
///
/// Returns a [`LoaderStatus`] code. On failure the message is available
/// from `uuvr_loader_last_error`.
///
/// # Safety
/// `plugin_dir` must be null or point to a valid NUL-terminated string.
#[no_mangle]
pub unsafe extern "C" fn uuvr_loader_bootstrap(plugin_dir: *const c_char, config: *mut c_void) -> i32 {
    clear_last_error();

    let loader_dir = if plugin_dir.is_null() {
        match std::env::current_dir() {
            Ok(dir) => dir,
            Err(e) => {
                set_last_error(format!("cannot determine working directory: {}", e));
                return LoaderStatus::InvalidArgument as i32;
            }
        }
    } else {
        match CStr::from_ptr(plugin_dir).to_str() {
            Ok(s) => PathBuf::from(s),
            Err(_) => {
                set_last_error("invalid UTF-8 in plugin_dir");
                return LoaderStatus::InvalidArgument as i32;
            }
        }
    };

    let handle = ConfigHandle::from_raw(config);
    // Unwinding across the C boundary is undefined behavior.
    let result = panic::catch_unwind(AssertUnwindSafe(|| crate::bootstrap(&loader_dir, handle)));

    let status = match result {
        Ok(Ok(Outcome::Activated(_))) => LoaderStatus::Ok,
        Ok(Ok(Outcome::AlreadyActive(_))) => LoaderStatus::AlreadyActive,
        Ok(Err(e)) => {
            set_last_error(e.to_string());
            LoaderStatus::from(&e)
        }
        Err(_) => {
            set_last_error("loader panicked during bootstrap");
            LoaderStatus::Panic
        }
    };
    status as i32
}
