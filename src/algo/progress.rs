//! Progress reporting and cancellation for long-running algorithms.
//!
//! Algorithms accept a [`Progress`] for advisory percent updates and a
//! [`Cancel`] they poll at fixed iteration boundaries. Both are plain
//! callbacks; the defaults do nothing.
//!
//! # Example
//!
//! ```
//! use whittle::algo::{Cancel, Progress};
//!
//! let progress = Progress::new(|percent| {
//!     eprintln!("{percent}%");
//! });
//! progress.report(42);
//!
//! let cancel = Cancel::never();
//! assert!(!cancel.is_requested());
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A progress callback that receives percent updates (0 to 100) during
/// long-running operations.
pub struct Progress {
    callback: Box<dyn Fn(u32) + Send + Sync>,
}

impl Progress {
    /// Create a new progress reporter with the given callback.
    pub fn new<F>(callback: F) -> Self
    where
        F: Fn(u32) + Send + Sync + 'static,
    {
        Self {
            callback: Box::new(callback),
        }
    }

    /// Report progress as a percentage.
    #[inline]
    pub fn report(&self, percent: u32) {
        (self.callback)(percent);
    }

    /// Create a no-op progress reporter that discards all updates.
    pub fn none() -> Self {
        Self::new(|_| {})
    }
}

impl Default for Progress {
    fn default() -> Self {
        Self::none()
    }
}

impl std::fmt::Debug for Progress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Progress").finish_non_exhaustive()
    }
}

/// A cancellation poll.
///
/// Algorithms call [`is_requested`](Self::is_requested) at safe points and
/// stop cleanly when it returns `true`: data structures stay consistent
/// and the partially processed result is still finalized and returned.
pub struct Cancel {
    poll: Box<dyn Fn() -> bool + Send + Sync>,
}

impl Cancel {
    /// Create a cancellation poll from a callback.
    pub fn new<F>(poll: F) -> Self
    where
        F: Fn() -> bool + Send + Sync + 'static,
    {
        Self {
            poll: Box::new(poll),
        }
    }

    /// Create a poll that never requests cancellation.
    pub fn never() -> Self {
        Self::new(|| false)
    }

    /// Create a poll backed by a shared flag.
    ///
    /// Store `true` with [`AtomicBool::store`] from another thread (or a
    /// progress callback) to request cancellation.
    pub fn from_flag(flag: Arc<AtomicBool>) -> Self {
        Self::new(move || flag.load(Ordering::Relaxed))
    }

    /// Check whether cancellation has been requested.
    #[inline]
    pub fn is_requested(&self) -> bool {
        (self.poll)()
    }
}

impl Default for Cancel {
    fn default() -> Self {
        Self::never()
    }
}

impl std::fmt::Debug for Cancel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cancel").finish_non_exhaustive()
    }
}
