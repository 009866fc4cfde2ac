//! Indexed triangle mesh.
//!
//! This module provides [`TriMesh`], a flat face-vertex representation:
//! an array of vertex positions plus an array of triangles, each triangle
//! being three `u32` indices into the position array. The arrays own
//! everything; every other structure in the library refers to mesh
//! elements by index.
//!
//! Triangle winding defines the front face: corners are listed
//! counter-clockwise when viewed from outside.

use nalgebra::{Point3, Vector3};

use crate::error::{MeshError, Result};

/// An indexed triangle mesh.
///
/// Positions are stored in 32-bit floats; all geometric processing in the
/// library upcasts to `f64` internally and writes results back as `f32`.
///
/// # Example
///
/// ```
/// use whittle::mesh::TriMesh;
/// use nalgebra::Point3;
///
/// let mesh = TriMesh::from_parts(
///     vec![
///         Point3::new(0.0, 0.0, 0.0),
///         Point3::new(1.0, 0.0, 0.0),
///         Point3::new(0.5, 1.0, 0.0),
///     ],
///     vec![[0, 1, 2]],
/// ).unwrap();
///
/// assert_eq!(mesh.num_vertices(), 3);
/// assert_eq!(mesh.num_triangles(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TriMesh {
    /// Vertex positions.
    pub positions: Vec<Point3<f32>>,

    /// Triangles as triples of indices into [`positions`](Self::positions).
    pub triangles: Vec<[u32; 3]>,
}

impl TriMesh {
    /// Create an empty mesh.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty mesh with pre-allocated capacity.
    pub fn with_capacity(num_vertices: usize, num_triangles: usize) -> Self {
        Self {
            positions: Vec::with_capacity(num_vertices),
            triangles: Vec::with_capacity(num_triangles),
        }
    }

    /// Build a mesh from positions and triangles, validating the input.
    ///
    /// Rejects triangles that reference out-of-range vertices or repeat a
    /// corner index. Use the public fields directly when the input is
    /// known to be well-formed.
    pub fn from_parts(positions: Vec<Point3<f32>>, triangles: Vec<[u32; 3]>) -> Result<Self> {
        let mesh = Self {
            positions,
            triangles,
        };
        mesh.validate()?;
        Ok(mesh)
    }

    /// Get the number of vertices.
    #[inline]
    pub fn num_vertices(&self) -> usize {
        self.positions.len()
    }

    /// Get the number of triangles.
    #[inline]
    pub fn num_triangles(&self) -> usize {
        self.triangles.len()
    }

    /// Check whether the mesh has no triangles.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// Check that every triangle references valid, distinct vertices.
    pub fn validate(&self) -> Result<()> {
        let num_vertices = self.positions.len();
        for (ti, t) in self.triangles.iter().enumerate() {
            for &vi in t {
                if vi as usize >= num_vertices {
                    return Err(MeshError::InvalidVertexIndex {
                        triangle: ti,
                        vertex: vi,
                    });
                }
            }
            if t[0] == t[1] || t[1] == t[2] || t[0] == t[2] {
                return Err(MeshError::DegenerateTriangle { triangle: ti });
            }
        }
        Ok(())
    }

    /// Compute the unit normal of a triangle in `f64`.
    ///
    /// The result has NaN components for zero-area triangles.
    pub fn triangle_normal(&self, ti: usize) -> Vector3<f64> {
        let [a, b, c] = self.triangles[ti];
        let v0: Vector3<f64> = self.positions[a as usize].coords.cast();
        let v1: Vector3<f64> = self.positions[b as usize].coords.cast();
        let v2: Vector3<f64> = self.positions[c as usize].coords.cast();
        (v1 - v0).cross(&(v2 - v0)).normalize()
    }

    /// Compute the area of a triangle.
    pub fn triangle_area(&self, ti: usize) -> f64 {
        let [a, b, c] = self.triangles[ti];
        let v0: Vector3<f64> = self.positions[a as usize].coords.cast();
        let v1: Vector3<f64> = self.positions[b as usize].coords.cast();
        let v2: Vector3<f64> = self.positions[c as usize].coords.cast();
        (v1 - v0).cross(&(v2 - v0)).norm() / 2.0
    }

    /// Compute the axis-aligned bounding box, or `None` for a mesh with no
    /// vertices.
    pub fn bounding_box(&self) -> Option<(Point3<f32>, Point3<f32>)> {
        let first = *self.positions.first()?;
        let mut min = first;
        let mut max = first;
        for p in &self.positions[1..] {
            for i in 0..3 {
                min[i] = min[i].min(p[i]);
                max[i] = max[i].max(p[i]);
            }
        }
        Some((min, max))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> TriMesh {
        TriMesh {
            positions: vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(2.0, 0.0, 0.0),
                Point3::new(0.0, 2.0, 0.0),
            ],
            triangles: vec![[0, 1, 2]],
        }
    }

    #[test]
    fn test_from_parts_validates_indices() {
        let err = TriMesh::from_parts(
            vec![Point3::origin(), Point3::new(1.0, 0.0, 0.0)],
            vec![[0, 1, 2]],
        );
        assert!(matches!(
            err,
            Err(MeshError::InvalidVertexIndex {
                triangle: 0,
                vertex: 2
            })
        ));
    }

    #[test]
    fn test_from_parts_rejects_degenerate() {
        let err = TriMesh::from_parts(
            vec![
                Point3::origin(),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
            ],
            vec![[0, 1, 1]],
        );
        assert!(matches!(
            err,
            Err(MeshError::DegenerateTriangle { triangle: 0 })
        ));
    }

    #[test]
    fn test_normal_and_area() {
        let mesh = triangle();
        let n = mesh.triangle_normal(0);
        assert!((n - Vector3::new(0.0, 0.0, 1.0)).norm() < 1e-12);
        assert!((mesh.triangle_area(0) - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_bounding_box() {
        let mesh = triangle();
        let (min, max) = mesh.bounding_box().unwrap();
        assert_eq!(min, Point3::new(0.0, 0.0, 0.0));
        assert_eq!(max, Point3::new(2.0, 2.0, 0.0));

        assert!(TriMesh::new().bounding_box().is_none());
    }
}
