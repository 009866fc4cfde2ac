//! Procedural mesh primitives.
//!
//! Closed and open fixture meshes used by tests, benchmarks and the
//! examples in the documentation. All primitives produce counter-clockwise
//! (outward-facing) winding.

use std::collections::HashMap;

use nalgebra::Point3;

use super::TriMesh;

/// Build an axis-aligned box with one corner at the origin.
///
/// # Example
///
/// ```
/// use whittle::mesh::primitives::cube;
///
/// let mesh = cube(1.0, 2.0, 3.0);
/// assert_eq!(mesh.num_vertices(), 8);
/// assert_eq!(mesh.num_triangles(), 12);
/// ```
pub fn cube(w: f32, h: f32, d: f32) -> TriMesh {
    let positions = vec![
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(w, 0.0, 0.0),
        Point3::new(w, h, 0.0),
        Point3::new(0.0, h, 0.0),
        Point3::new(0.0, 0.0, d),
        Point3::new(w, 0.0, d),
        Point3::new(w, h, d),
        Point3::new(0.0, h, d),
    ];
    let triangles = vec![
        [0, 2, 1],
        [0, 3, 2],
        [4, 5, 6],
        [4, 6, 7],
        [0, 1, 5],
        [0, 5, 4],
        [1, 2, 6],
        [1, 6, 5],
        [2, 3, 7],
        [2, 7, 6],
        [3, 0, 4],
        [3, 4, 7],
    ];
    TriMesh {
        positions,
        triangles,
    }
}

/// Build a closed UV sphere centered at the origin.
///
/// `slices` is the number of segments around the axis (≥ 3), `stacks` the
/// number of segments from pole to pole (≥ 2). The result has
/// `slices * (stacks - 1) + 2` vertices and `2 * slices * (stacks - 1)`
/// triangles.
pub fn sphere(radius: f32, slices: u32, stacks: u32) -> TriMesh {
    assert!(slices >= 3 && stacks >= 2);

    let mut mesh = TriMesh::with_capacity(
        (slices * (stacks - 1) + 2) as usize,
        (2 * slices * (stacks - 1)) as usize,
    );

    mesh.positions.push(Point3::new(0.0, 0.0, radius));
    for j in 1..stacks {
        let polar = std::f64::consts::PI * j as f64 / stacks as f64;
        let (ring_r, z) = (
            radius as f64 * polar.sin(),
            radius as f64 * polar.cos(),
        );
        for i in 0..slices {
            let azimuth = std::f64::consts::TAU * i as f64 / slices as f64;
            mesh.positions.push(Point3::new(
                (ring_r * azimuth.cos()) as f32,
                (ring_r * azimuth.sin()) as f32,
                z as f32,
            ));
        }
    }
    mesh.positions.push(Point3::new(0.0, 0.0, -radius));
    let bottom = (mesh.positions.len() - 1) as u32;

    let ring = |j: u32, i: u32| 1 + (j - 1) * slices + (i % slices);

    // top cap
    for i in 0..slices {
        mesh.triangles.push([0, ring(1, i), ring(1, i + 1)]);
    }
    // bands between rings
    for j in 1..stacks - 1 {
        for i in 0..slices {
            let (a, b) = (ring(j, i), ring(j, i + 1));
            let (c, d) = (ring(j + 1, i), ring(j + 1, i + 1));
            mesh.triangles.push([a, c, d]);
            mesh.triangles.push([a, d, b]);
        }
    }
    // bottom cap
    for i in 0..slices {
        mesh.triangles
            .push([bottom, ring(stacks - 1, i + 1), ring(stacks - 1, i)]);
    }

    mesh
}

/// Build a flat grid of `n × n` cells in the z = 0 plane with unit
/// spacing. The result is an open mesh with `(n+1)²` vertices and `2n²`
/// triangles.
pub fn plane_grid(n: u32) -> TriMesh {
    let mut mesh = TriMesh::with_capacity(((n + 1) * (n + 1)) as usize, (2 * n * n) as usize);

    for j in 0..=n {
        for i in 0..=n {
            mesh.positions.push(Point3::new(i as f32, j as f32, 0.0));
        }
    }
    for j in 0..n {
        for i in 0..n {
            let v00 = j * (n + 1) + i;
            let v10 = v00 + 1;
            let v01 = v00 + (n + 1);
            let v11 = v01 + 1;
            mesh.triangles.push([v00, v10, v11]);
            mesh.triangles.push([v00, v11, v01]);
        }
    }

    mesh
}

/// Build a closed cube of side `size` with each face subdivided into
/// `n × n` cells. Shared edge and corner lattice points are deduplicated,
/// so the result is watertight.
pub fn subdivided_cube(size: f32, n: u32) -> TriMesh {
    assert!(n >= 1);

    let step = size / n as f32;
    let mut mesh = TriMesh::with_capacity((6 * n * n + 2) as usize, (12 * n * n) as usize);
    let mut lattice: HashMap<(u32, u32, u32), u32> = HashMap::new();

    // Each face maps grid coordinates (u, v) to lattice coordinates;
    // `flip` reverses the winding for faces whose natural orientation
    // points inward.
    let faces: [(fn(u32, u32, u32) -> (u32, u32, u32), bool); 6] = [
        (|u, v, n| (u, v, n), false), // +z
        (|u, v, _| (u, v, 0), true),  // -z
        (|u, v, n| (n, u, v), false), // +x
        (|u, v, _| (0, u, v), true),  // -x
        (|u, v, _| (u, 0, v), false), // -y
        (|u, v, n| (u, n, v), true),  // +y
    ];

    for (map, flip) in faces {
        for v in 0..n {
            for u in 0..n {
                let mut corner = |du: u32, dv: u32| {
                    lattice_vertex(&mut lattice, &mut mesh.positions, map(u + du, v + dv, n), step)
                };
                let (a, b) = (corner(0, 0), corner(1, 0));
                let (c, d) = (corner(1, 1), corner(0, 1));
                if flip {
                    mesh.triangles.push([a, c, b]);
                    mesh.triangles.push([a, d, c]);
                } else {
                    mesh.triangles.push([a, b, c]);
                    mesh.triangles.push([a, c, d]);
                }
            }
        }
    }

    mesh
}

fn lattice_vertex(
    lattice: &mut HashMap<(u32, u32, u32), u32>,
    positions: &mut Vec<Point3<f32>>,
    coords: (u32, u32, u32),
    step: f32,
) -> u32 {
    *lattice.entry(coords).or_insert_with(|| {
        let vi = positions.len() as u32;
        positions.push(Point3::new(
            coords.0 as f32 * step,
            coords.1 as f32 * step,
            coords.2 as f32 * step,
        ));
        vi
    })
}
