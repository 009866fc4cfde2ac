//! Mesh measurement utilities.
//!
//! Signed volume, surface area, surface sampling and nearest-surface
//! distance. The sampling and distance helpers exist mainly to judge the
//! fidelity of a simplified mesh against the mesh it was derived from.

use nalgebra::{Point3, Vector3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;

use super::TriMesh;

/// Compute the signed volume enclosed by the mesh.
///
/// Sums the signed volumes of the tetrahedra spanned by the origin and
/// each triangle. The result is only meaningful for closed meshes; with
/// counter-clockwise (outward) winding it is positive.
pub fn volume(mesh: &TriMesh) -> f64 {
    let mut total = 0.0;
    for t in &mesh.triangles {
        let v0: Vector3<f64> = mesh.positions[t[0] as usize].coords.cast();
        let v1: Vector3<f64> = mesh.positions[t[1] as usize].coords.cast();
        let v2: Vector3<f64> = mesh.positions[t[2] as usize].coords.cast();
        total += v0.dot(&v1.cross(&v2));
    }
    total / 6.0
}

/// Compute the total surface area of the mesh.
pub fn surface_area(mesh: &TriMesh) -> f64 {
    (0..mesh.num_triangles())
        .map(|ti| mesh.triangle_area(ti))
        .sum()
}

/// Draw points uniformly from the mesh surface.
///
/// Each triangle receives samples in proportion to its area at the given
/// density (samples per squared unit); the fractional remainder is
/// resolved by a coin flip so the expected density is exact. Sampling is
/// deterministic for a given `seed`.
pub fn sample_surface(mesh: &TriMesh, samples_per_area: f64, seed: u64) -> Vec<Point3<f32>> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut samples = Vec::new();

    for (ti, t) in mesh.triangles.iter().enumerate() {
        let expected = mesh.triangle_area(ti) * samples_per_area;
        let mut count = expected.trunc() as usize;
        if rng.gen::<f64>() < expected.fract() {
            count += 1;
        }
        if count == 0 {
            continue;
        }

        let v0 = mesh.positions[t[0] as usize];
        let v1 = mesh.positions[t[1] as usize];
        let v2 = mesh.positions[t[2] as usize];
        for _ in 0..count {
            // uniform barycentric coordinates: fold the unit square onto
            // the triangle
            let mut b0 = rng.gen::<f32>();
            let mut b1 = rng.gen::<f32>();
            if b0 + b1 > 1.0 {
                b0 = 1.0 - b0;
                b1 = 1.0 - b1;
            }
            let b2 = 1.0 - b0 - b1;
            samples.push(Point3::from(
                v0.coords * b0 + v1.coords * b1 + v2.coords * b2,
            ));
        }
    }

    samples
}

/// Average distance from points sampled on `simplified` to the nearest
/// point on the surface of `reference`.
///
/// Runs a brute-force nearest-triangle search per sample, parallelized
/// with rayon. Returns 0 when either mesh is empty.
pub fn mean_surface_distance(
    reference: &TriMesh,
    simplified: &TriMesh,
    samples_per_area: f64,
    seed: u64,
) -> f64 {
    if reference.is_empty() || simplified.is_empty() {
        return 0.0;
    }

    let samples = sample_surface(simplified, samples_per_area, seed);
    if samples.is_empty() {
        return 0.0;
    }

    let corners: Vec<[Vector3<f64>; 3]> = reference
        .triangles
        .iter()
        .map(|t| {
            [
                reference.positions[t[0] as usize].coords.cast(),
                reference.positions[t[1] as usize].coords.cast(),
                reference.positions[t[2] as usize].coords.cast(),
            ]
        })
        .collect();

    let total: f64 = samples
        .par_iter()
        .map(|sample| {
            let p: Vector3<f64> = sample.coords.cast();
            corners
                .iter()
                .map(|[a, b, c]| (closest_point_on_triangle(&p, a, b, c) - p).norm_squared())
                .fold(f64::INFINITY, f64::min)
                .sqrt()
        })
        .sum();

    total / samples.len() as f64
}

/// Closest point to `p` on the triangle `(a, b, c)`.
///
/// Voronoi-region walk over the triangle's vertices, edges and interior.
fn closest_point_on_triangle(
    p: &Vector3<f64>,
    a: &Vector3<f64>,
    b: &Vector3<f64>,
    c: &Vector3<f64>,
) -> Vector3<f64> {
    let ab = b - a;
    let ac = c - a;
    let ap = p - a;

    let d1 = ab.dot(&ap);
    let d2 = ac.dot(&ap);
    if d1 <= 0.0 && d2 <= 0.0 {
        return *a;
    }

    let bp = p - b;
    let d3 = ab.dot(&bp);
    let d4 = ac.dot(&bp);
    if d3 >= 0.0 && d4 <= d3 {
        return *b;
    }

    let vc = d1 * d4 - d3 * d2;
    if vc <= 0.0 && d1 >= 0.0 && d3 <= 0.0 {
        return a + ab * (d1 / (d1 - d3));
    }

    let cp = p - c;
    let d5 = ab.dot(&cp);
    let d6 = ac.dot(&cp);
    if d6 >= 0.0 && d5 <= d6 {
        return *c;
    }

    let vb = d5 * d2 - d1 * d6;
    if vb <= 0.0 && d2 >= 0.0 && d6 <= 0.0 {
        return a + ac * (d2 / (d2 - d6));
    }

    let va = d3 * d6 - d5 * d4;
    if va <= 0.0 && (d4 - d3) >= 0.0 && (d5 - d6) >= 0.0 {
        return b + (c - b) * ((d4 - d3) / ((d4 - d3) + (d5 - d6)));
    }

    let denom = 1.0 / (va + vb + vc);
    a + ab * (vb * denom) + ac * (vc * denom)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::primitives::{cube, sphere};

    #[test]
    fn test_cube_volume_and_area() {
        let mesh = cube(2.0, 2.0, 2.0);
        assert!((volume(&mesh) - 8.0).abs() < 1e-9);
        assert!((surface_area(&mesh) - 24.0).abs() < 1e-9);
    }

    #[test]
    fn test_sample_surface_density() {
        let mesh = cube(2.0, 2.0, 2.0);
        let samples = sample_surface(&mesh, 10.0, 7);
        // 24 area units at 10 samples per unit, +-20%
        assert!(samples.len() > 190 && samples.len() < 290);
    }

    #[test]
    fn test_sample_surface_deterministic() {
        let mesh = cube(1.0, 1.0, 1.0);
        assert_eq!(
            sample_surface(&mesh, 50.0, 3),
            sample_surface(&mesh, 50.0, 3)
        );
    }

    #[test]
    fn test_closest_point_regions() {
        let a = Vector3::new(0.0, 0.0, 0.0);
        let b = Vector3::new(1.0, 0.0, 0.0);
        let c = Vector3::new(0.0, 1.0, 0.0);

        // above the interior
        let q = closest_point_on_triangle(&Vector3::new(0.25, 0.25, 1.0), &a, &b, &c);
        assert!((q - Vector3::new(0.25, 0.25, 0.0)).norm() < 1e-12);
        // vertex region
        let q = closest_point_on_triangle(&Vector3::new(-1.0, -1.0, 0.0), &a, &b, &c);
        assert!((q - a).norm() < 1e-12);
        // edge region
        let q = closest_point_on_triangle(&Vector3::new(0.5, -1.0, 0.0), &a, &b, &c);
        assert!((q - Vector3::new(0.5, 0.0, 0.0)).norm() < 1e-12);
    }

    #[test]
    fn test_identical_meshes_have_zero_distance() {
        let mesh = sphere(1.0, 12, 6);
        let d = mean_surface_distance(&mesh, &mesh, 20.0, 11);
        assert!(d < 1e-6);
    }

    #[test]
    fn test_distance_between_nested_spheres() {
        let outer = sphere(1.1, 24, 12);
        let inner = sphere(1.0, 24, 12);
        let d = mean_surface_distance(&inner, &outer, 20.0, 11);
        assert!(d > 0.05 && d < 0.15);
    }
}
