//! Internal logging setup for neighbor-tree.
//!
//! Logging is controlled by the `DEBUG_NEIGHBOR_TREE` environment variable. If it is not set,
//! or set to a falsy value (`"0"`, `"false"`, or empty), logging stays disabled. Otherwise a
//! debug-level `tracing_subscriber` is installed at process start. Only compiled in with the
//! `setup_tracing` feature.

#[cfg(feature = "setup_tracing")]
use ctor::ctor;
#[cfg(feature = "setup_tracing")]
use tracing::Level;

#[cfg(feature = "setup_tracing")]
#[ctor]
fn set_debug_level() {
    if std::env::var("DEBUG_NEIGHBOR_TREE").map_or(true, |v| v == "0" || v == "false" || v.is_empty())
    {
        // Disable logging
    } else {
        tracing_subscriber::fmt()
            .with_max_level(Level::DEBUG)
            .init();
    }
}
