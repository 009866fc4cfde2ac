//! Mesh processing algorithms.
//!
//! Currently this module provides:
//!
//! - **Decimation**: quadric-error-metric edge collapse ([`decimate`])
//! - **Progress & cancellation**: callback plumbing shared by
//!   long-running algorithms ([`Progress`], [`Cancel`])

pub mod decimate;
pub mod progress;

pub use progress::{Cancel, Progress};
