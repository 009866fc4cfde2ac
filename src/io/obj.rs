//! Wavefront OBJ format support.
//!
//! Only geometry is read: `v` and `f` statements. Texture coordinates,
//! normals, materials and grouping statements are skipped. Faces with
//! more than three corners are fan-triangulated.

use std::fs;
use std::path::Path;

use nalgebra::Point3;

use crate::error::{MeshError, Result};
use crate::mesh::TriMesh;

/// Load a mesh from an OBJ file.
///
/// A file with no `f` statements is rejected with
/// [`MeshError::EmptyMesh`], matching the STL loader.
///
/// # Example
///
/// ```no_run
/// use whittle::io::obj;
///
/// let mesh = obj::load("model.obj").unwrap();
/// ```
pub fn load<P: AsRef<Path>>(path: P) -> Result<TriMesh> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)?;
    let mesh = parse(&text).map_err(|message| MeshError::LoadError {
        path: path.to_path_buf(),
        message,
    })?;
    if mesh.triangles.is_empty() {
        return Err(MeshError::EmptyMesh);
    }
    Ok(mesh)
}

/// Save a mesh to an OBJ file.
///
/// # Example
///
/// ```no_run
/// use whittle::io::obj;
/// use whittle::mesh::primitives::cube;
///
/// obj::save(&cube(1.0, 1.0, 1.0), "cube.obj").unwrap();
/// ```
pub fn save<P: AsRef<Path>>(mesh: &TriMesh, path: P) -> Result<()> {
    fs::write(path.as_ref(), format(mesh))?;
    Ok(())
}

fn parse(text: &str) -> std::result::Result<TriMesh, String> {
    let mut mesh = TriMesh::new();

    for (line_no, line) in text.lines().enumerate() {
        let line = line.split('#').next().unwrap_or("").trim();
        let mut tokens = line.split_whitespace();
        match tokens.next() {
            Some("v") => {
                let mut coord = |axis: &str| -> std::result::Result<f32, String> {
                    tokens
                        .next()
                        .ok_or_else(|| format!("line {}: missing {axis} coordinate", line_no + 1))?
                        .parse::<f32>()
                        .map_err(|e| format!("line {}: {e}", line_no + 1))
                };
                let (x, y, z) = (coord("x")?, coord("y")?, coord("z")?);
                mesh.positions.push(Point3::new(x, y, z));
            }
            Some("f") => {
                let mut corners = Vec::with_capacity(4);
                for token in tokens {
                    corners.push(parse_face_index(token, mesh.positions.len(), line_no)?);
                }
                if corners.len() < 3 {
                    return Err(format!("line {}: face with fewer than 3 corners", line_no + 1));
                }
                for i in 1..corners.len() - 1 {
                    mesh.triangles
                        .push([corners[0], corners[i], corners[i + 1]]);
                }
            }
            _ => {}
        }
    }

    mesh.validate().map_err(|e| e.to_string())?;
    Ok(mesh)
}

/// Parse one corner of an `f` statement (`7`, `7/1`, `7//3`, `-2`, ...)
/// into a zero-based vertex index.
fn parse_face_index(
    token: &str,
    num_vertices: usize,
    line_no: usize,
) -> std::result::Result<u32, String> {
    let index: i64 = token
        .split('/')
        .next()
        .unwrap_or("")
        .parse()
        .map_err(|e| format!("line {}: {e}", line_no + 1))?;

    // OBJ indices are 1-based; negative values count back from the end
    let resolved = if index > 0 {
        index - 1
    } else if index < 0 {
        num_vertices as i64 + index
    } else {
        return Err(format!("line {}: face index 0 is not valid", line_no + 1));
    };
    if resolved < 0 || resolved >= num_vertices as i64 {
        return Err(format!(
            "line {}: face references vertex {index} of {num_vertices}",
            line_no + 1
        ));
    }
    Ok(resolved as u32)
}

fn format(mesh: &TriMesh) -> String {
    let mut out = String::with_capacity(mesh.num_vertices() * 24 + mesh.num_triangles() * 12);
    for p in &mesh.positions {
        out.push_str(&format!("v {} {} {}\n", p.x, p.y, p.z));
    }
    for t in &mesh.triangles {
        out.push_str(&format!("f {} {} {}\n", t[0] + 1, t[1] + 1, t[2] + 1));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_vertices_and_faces() {
        let mesh = parse(
            "# a triangle\n\
             v 0 0 0\n\
             v 1 0 0\n\
             v 0 1 0\n\
             f 1 2 3\n",
        )
        .unwrap();
        assert_eq!(mesh.num_vertices(), 3);
        assert_eq!(mesh.triangles, vec![[0, 1, 2]]);
    }

    #[test]
    fn test_parse_slashed_and_negative_indices() {
        let mesh = parse(
            "v 0 0 0\n\
             v 1 0 0\n\
             v 0 1 0\n\
             vn 0 0 1\n\
             f 1/1/1 2/2/1 -1\n",
        )
        .unwrap();
        assert_eq!(mesh.triangles, vec![[0, 1, 2]]);
    }

    #[test]
    fn test_parse_fan_triangulates_quads() {
        let mesh = parse(
            "v 0 0 0\n\
             v 1 0 0\n\
             v 1 1 0\n\
             v 0 1 0\n\
             f 1 2 3 4\n",
        )
        .unwrap();
        assert_eq!(mesh.triangles, vec![[0, 1, 2], [0, 2, 3]]);
    }

    #[test]
    fn test_parse_rejects_bad_index() {
        assert!(parse("v 0 0 0\nf 1 2 3\n").is_err());
        assert!(parse("v 0 0 0\nv 1 0 0\nv 0 1 0\nf 0 1 2\n").is_err());
    }

    #[test]
    fn test_load_rejects_mesh_without_faces() {
        let path = std::env::temp_dir().join("whittle_vertices_only.obj");
        fs::write(&path, "v 0 0 0\nv 1 0 0\nv 0 1 0\n").unwrap();
        let result = load(&path);
        fs::remove_file(&path).ok();
        assert!(matches!(result, Err(MeshError::EmptyMesh)));
    }

    #[test]
    fn test_format_round_trip() {
        let mesh = crate::mesh::primitives::cube(1.0, 2.0, 3.0);
        let parsed = parse(&format(&mesh)).unwrap();
        assert_eq!(parsed, mesh);
    }
}
