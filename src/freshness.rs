//! Modification-time freshness guard.
//!
//! A derived file is *fresh* when it exists and was modified no earlier than
//! its source. Fresh outputs are skipped. This is purely an optimization:
//! deleting any derived file forces it to be rebuilt on the next run.
//!
//! Times are compared with `>=`, so filesystems with coarse timestamps treat
//! an output written in the same tick as its source as fresh.

use std::path::Path;
use std::time::SystemTime;

fn modified(path: &Path) -> Option<SystemTime> {
    std::fs::metadata(path).ok()?.modified().ok()
}

/// Returns `true` when `dest` exists and is at least as new as `source`.
///
/// A missing or unreadable source is never fresh, so the caller will try to
/// process it and surface the real error.
pub fn is_fresh(source: &Path, dest: &Path) -> bool {
    match (modified(source), modified(dest)) {
        (Some(src), Some(dst)) => dst >= src,
        _ => false,
    }
}
