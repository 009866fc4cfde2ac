//! Core mesh data structures and measurements.
//!
//! The primary type is [`TriMesh`], a flat indexed triangle set: vertex
//! positions plus `u32` index triples. The representation is deliberately
//! minimal; adjacency is not stored on the mesh itself but built by the
//! algorithms that need it, in the layout that suits them.
//!
//! # Construction
//!
//! Meshes come from file I/O, from the [`primitives`] generators, or from
//! raw parts:
//!
//! ```
//! use whittle::mesh::TriMesh;
//! use nalgebra::Point3;
//!
//! let mesh = TriMesh::from_parts(
//!     vec![
//!         Point3::new(0.0, 0.0, 0.0),
//!         Point3::new(1.0, 0.0, 0.0),
//!         Point3::new(0.5, 1.0, 0.0),
//!     ],
//!     vec![[0, 1, 2]],
//! ).unwrap();
//! assert_eq!(mesh.num_triangles(), 1);
//! ```

pub mod measure;
pub mod primitives;
mod trimesh;

pub use trimesh::TriMesh;
