//! Mesh decimation (simplification).
//!
//! Reduces the number of triangles in a mesh while preserving its shape
//! as much as possible, by greedily collapsing the edges that introduce
//! the least geometric error.
//!
//! # Quadric Error Metrics (QEM)
//!
//! The decimator follows Garland & Heckbert (1997): every vertex
//! accumulates a quadric measuring the squared distance to the planes of
//! its original neighborhood, and each edge collapse places the merged
//! vertex where the combined quadric is smallest. Candidates are held in
//! a mutable priority queue keyed by triangle, and adjacency lives in a
//! flat slab array rather than a pointer graph.
//!
//! # Example
//!
//! ```
//! use whittle::algo::decimate::{qem_decimate, DecimateOptions};
//! use whittle::mesh::primitives::sphere;
//!
//! let mut mesh = sphere(1.0, 32, 16);
//!
//! // reduce to 10% of the original triangles
//! let summary = qem_decimate(&mut mesh, &DecimateOptions::with_target_ratio(0.1));
//! println!("kept {} of {} triangles", summary.triangles_after, summary.triangles_before);
//! ```
//!
//! # References
//!
//! - Garland, M. & Heckbert, P. (1997). "Surface Simplification Using
//!   Quadric Error Metrics." SIGGRAPH '97.

mod adjacency;
mod heap;
mod qem;
mod quadric;

pub use qem::{qem_decimate, qem_decimate_with_progress};

/// Options for mesh decimation.
#[derive(Debug, Clone)]
pub struct DecimateOptions {
    /// Target number of triangles after decimation.
    /// If None, uses target_ratio instead.
    pub target_triangles: Option<usize>,

    /// Target ratio of triangles to keep (0.0 to 1.0).
    /// Only used if target_triangles is None.
    pub target_ratio: f64,

    /// Maximum tolerated error for a single edge collapse. Decimation
    /// stops early once the cheapest remaining collapse would exceed
    /// this. A non-positive value disables decimation entirely.
    pub max_error: Option<f32>,

    /// Whether to use parallel initialization (default: true).
    pub parallel: bool,
}

impl DecimateOptions {
    /// Create options to reduce to a target number of triangles.
    pub fn with_target_triangles(target: usize) -> Self {
        Self {
            target_triangles: Some(target),
            target_ratio: 0.5,
            max_error: None,
            parallel: true,
        }
    }

    /// Create options to reduce to a ratio of the original triangle count.
    pub fn with_target_ratio(ratio: f64) -> Self {
        Self {
            target_triangles: None,
            target_ratio: ratio.clamp(0.0, 1.0),
            max_error: None,
            parallel: true,
        }
    }

    /// Set the maximum tolerated collapse error.
    pub fn with_max_error(mut self, max_error: f32) -> Self {
        self.max_error = Some(max_error);
        self
    }

    /// Create options for single-threaded initialization.
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }

    /// Compute the target number of triangles given the original count.
    pub fn compute_target(&self, original_triangles: usize) -> usize {
        if let Some(target) = self.target_triangles {
            target.min(original_triangles)
        } else {
            ((original_triangles as f64) * self.target_ratio).round() as usize
        }
    }
}

/// What a decimation run did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecimateSummary {
    /// Triangles before decimation.
    pub triangles_before: usize,

    /// Triangles in the returned mesh.
    pub triangles_after: usize,

    /// Error of the last collapse actually committed, 0 if none was.
    pub last_error: f32,

    /// Whether the run was stopped by the cancellation poll.
    pub cancelled: bool,
}
