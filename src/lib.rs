//! # Whittle
//!
//! A quadric-error-metric (QEM) mesh decimator with a compact,
//! cache-friendly core.
//!
//! Whittle reduces the triangle count of a mesh by repeatedly collapsing
//! the edge that introduces the least geometric error, until a target
//! count or an error bound is reached. Connectivity lives in flat index
//! arrays (a global incidence array split into per-vertex slabs), so
//! the collapse loop touches contiguous memory and owns no pointer
//! graphs.
//!
//! ## Features
//!
//! - **QEM edge collapse**: greedy decimation with optimal vertex
//!   placement, fold-back rejection and boundary-edge handling
//! - **Parallel initialization**: per-triangle passes run on rayon
//! - **Progress & cancellation**: advisory percent callbacks and a
//!   cancellation poll that always returns a valid mesh
//! - **File formats**: OBJ and STL
//! - **Measurement**: signed volume, surface sampling, nearest-surface
//!   distance
//!
//! ## Quick Start
//!
//! ```no_run
//! use whittle::prelude::*;
//!
//! // Load a mesh
//! let mut mesh = whittle::io::load("model.stl").unwrap();
//!
//! // Reduce to 10% of the original triangle count
//! let summary = qem_decimate(&mut mesh, &DecimateOptions::with_target_ratio(0.1));
//! println!(
//!     "{} -> {} triangles (last collapse error {})",
//!     summary.triangles_before, summary.triangles_after, summary.last_error,
//! );
//!
//! // Save the result
//! whittle::io::save(&mesh, "model_low.stl").unwrap();
//! ```
//!
//! ## Working In Memory
//!
//! ```
//! use whittle::prelude::*;
//! use whittle::mesh::primitives::sphere;
//! use whittle::mesh::measure::volume;
//!
//! let mut mesh = sphere(1.0, 48, 24);
//! let original_volume = volume(&mesh);
//!
//! qem_decimate(&mut mesh, &DecimateOptions::with_target_triangles(200));
//!
//! assert!(mesh.num_triangles() <= 200);
//! // decimation barely moves the enclosed volume
//! assert!((volume(&mesh) - original_volume).abs() < original_volume * 0.05);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod algo;
pub mod error;
pub mod io;
pub mod mesh;

/// Prelude module for convenient imports.
///
/// This module re-exports the most commonly used types and functions:
///
/// ```
/// use whittle::prelude::*;
/// ```
pub mod prelude {
    pub use crate::algo::decimate::{
        qem_decimate, qem_decimate_with_progress, DecimateOptions, DecimateSummary,
    };
    pub use crate::algo::{Cancel, Progress};
    pub use crate::error::{MeshError, Result};
    pub use crate::mesh::TriMesh;
}

// Re-export nalgebra types for convenience
pub use nalgebra;

#[cfg(test)]
mod tests {
    use super::prelude::*;
    use nalgebra::Point3;

    #[test]
    fn test_tetrahedron_at_target_is_untouched() {
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.5, 1.0, 0.0),
            Point3::new(0.5, 0.5, 1.0),
        ];
        let triangles = vec![[0, 2, 1], [0, 1, 3], [1, 2, 3], [2, 0, 3]];
        let mut mesh = TriMesh::from_parts(vertices, triangles).unwrap();
        let original = mesh.clone();

        let summary = qem_decimate(
            &mut mesh,
            &DecimateOptions::with_target_triangles(original.num_triangles()),
        );
        assert_eq!(mesh, original);
        assert_eq!(summary.last_error, 0.0);
    }
}
