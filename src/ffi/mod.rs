//! C ABI for hosts that load the loader as a native plugin.
//!
//! ```c
//! int32_t uuvr_loader_bootstrap(const char *plugin_dir, void *config);
//! size_t  uuvr_loader_last_error(char *buf, size_t len);
//! ```

mod bootstrap;
mod error;

pub use bootstrap::uuvr_loader_bootstrap;
pub use error::{last_error, set_last_error, uuvr_loader_last_error, LoaderStatus};
