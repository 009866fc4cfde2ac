//! STL (stereolithography) format support.
//!
//! This module provides loading and saving of meshes in the STL format,
//! commonly used for 3D printing. Both binary and ASCII formats are
//! supported on load; saving always writes binary.

use std::collections::HashMap;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use nalgebra::Point3;

use crate::error::{MeshError, Result};
use crate::mesh::TriMesh;

/// Load a mesh from an STL file.
///
/// STL stores three corner positions per facet with no shared indexing,
/// so bit-identical corners are merged back into shared vertices.
/// Degenerate facets are dropped; a file left with no triangles is
/// rejected with [`MeshError::EmptyMesh`].
///
/// # Example
///
/// ```no_run
/// use whittle::io::stl;
///
/// let mesh = stl::load("model.stl").unwrap();
/// ```
pub fn load<P: AsRef<Path>>(path: P) -> Result<TriMesh> {
    let path = path.as_ref();
    let mut file = File::open(path)?;

    let stl = stl_io::read_stl(&mut file).map_err(|e| MeshError::LoadError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let mut mesh = TriMesh::with_capacity(stl.vertices.len(), stl.faces.len());
    let mut merged: HashMap<[u32; 3], u32> = HashMap::with_capacity(stl.vertices.len());
    let mut merged_index = |p: [f32; 3], mesh: &mut TriMesh| -> u32 {
        *merged
            .entry([p[0].to_bits(), p[1].to_bits(), p[2].to_bits()])
            .or_insert_with(|| {
                let vi = mesh.positions.len() as u32;
                mesh.positions.push(Point3::new(p[0], p[1], p[2]));
                vi
            })
    };

    for tri in &stl.faces {
        let corner = |i: usize| {
            let v = &stl.vertices[tri.vertices[i]];
            [v[0], v[1], v[2]]
        };
        let i0 = merged_index(corner(0), &mut mesh);
        let i1 = merged_index(corner(1), &mut mesh);
        let i2 = merged_index(corner(2), &mut mesh);

        if i0 != i1 && i1 != i2 && i0 != i2 {
            mesh.triangles.push([i0, i1, i2]);
        }
    }

    if mesh.triangles.is_empty() {
        return Err(MeshError::EmptyMesh);
    }

    Ok(mesh)
}

/// Save a mesh to a binary STL file.
///
/// # Example
///
/// ```no_run
/// use whittle::io::stl;
/// use whittle::mesh::primitives::cube;
///
/// stl::save(&cube(1.0, 1.0, 1.0), "cube.stl").unwrap();
/// ```
pub fn save<P: AsRef<Path>>(mesh: &TriMesh, path: P) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);

    let triangles: Vec<stl_io::Triangle> = mesh
        .triangles
        .iter()
        .enumerate()
        .map(|(ti, t)| {
            let n = mesh.triangle_normal(ti);
            let p = |vi: u32| {
                let p = mesh.positions[vi as usize];
                stl_io::Vertex::new([p.x, p.y, p.z])
            };
            stl_io::Triangle {
                normal: stl_io::Normal::new([n.x as f32, n.y as f32, n.z as f32]),
                vertices: [p(t[0]), p(t[1]), p(t[2])],
            }
        })
        .collect();

    stl_io::write_stl(&mut writer, triangles.iter()).map_err(|e| MeshError::SaveError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    Ok(())
}
