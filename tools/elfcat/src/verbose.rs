//! Stderr tracing for `--verbose`.
//!
//! Extraction output owns stdout, so every human-readable line — traces and
//! diagnostics alike — goes to stderr.

use std::sync::atomic::{AtomicBool, Ordering};

/// Global verbosity flag, set once at startup.
static VERBOSE: AtomicBool = AtomicBool::new(false);

/// Initialize the verbosity for the current process.
pub fn init(verbose: bool) {
    VERBOSE.store(verbose, Ordering::Relaxed);
}

/// Returns `true` if verbose tracing is active.
pub fn is_verbose() -> bool {
    VERBOSE.load(Ordering::Relaxed)
}

/// Print a trace line to stderr when `--verbose` is active.
///
/// Usage mirrors `eprintln!`:
/// ```ignore
/// vprintln!("  section {index}: offset {offset:#x}, size {size:#x}");
/// ```
macro_rules! vprintln {
    ($($arg:tt)*) => {
        if $crate::verbose::is_verbose() {
            eprintln!($($arg)*);
        }
    };
}

pub(crate) use vprintln;
