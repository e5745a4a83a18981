//! Minimal implementation library for activation tests.
//!
//! `uuvr_implementation_start` writes [`STARTED`] through the host handle
//! (a `*mut u64`) and returns 0, or returns 2 when the handle is null.

use std::ffi::c_void;

/// Value written through the host handle on a successful start.
pub const STARTED: u64 = 0x5555_0001;

#[cfg(not(feature = "abi-mismatch"))]
#[no_mangle]
pub static UUVR_IMPLEMENTATION_ABI: u32 = 1;

#[cfg(feature = "abi-mismatch")]
#[no_mangle]
pub static UUVR_IMPLEMENTATION_ABI: u32 = 2;

/// # Safety
///
/// `config` is null or points to a writable `u64`.
#[no_mangle]
pub unsafe extern "C" fn uuvr_implementation_start(config: *mut c_void) -> i32 {
    if config.is_null() {
        return 2;
    }
    *(config as *mut u64) = STARTED;
    0
}
