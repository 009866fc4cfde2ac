//! Quadric edge-collapse decimation engine.
//!
//! The engine keeps four structures in lockstep while it rewrites the
//! mesh: per-triangle state (normal + minimum-error edge), per-vertex
//! state (accumulated quadric + incidence slab), the flat incidence
//! array, and a mutable min-heap holding one error entry per live
//! triangle. Initialization is data-parallel where passes write disjoint
//! slots; the collapse loop itself is strictly sequential, so results
//! are reproducible for a given input and target.

use nalgebra::{Point3, Vector3};
use rayon::prelude::*;

use crate::algo::progress::{Cancel, Progress};
use crate::mesh::TriMesh;

use super::adjacency::{
    merge_fans, Incidence, TriangleState, VertexState, STALE_EDGE,
};
use super::heap::{ErrorEntry, MutableHeap};
use super::quadric::{optimal_placement, Quadric};
use super::{DecimateOptions, DecimateSummary};

/// Percent reported once initialization finishes.
const STATUS_INIT_PERCENT: u32 = 10;
/// Collapse iterations between cancellation polls.
const CANCEL_POLL_PERIOD: u32 = 16;
/// Typical upper bound on fan size; relocation buffers start here and
/// grow on demand.
const TYPICAL_FAN_SIZE: usize = 50;

/// A triangle normal must stay within ~80 degrees of its pre-collapse
/// direction, or the collapse is rejected as a fold-back.
const NORMAL_DOT_MIN: f32 = 0.2;

/// Decimate a mesh by collapsing its cheapest edges.
///
/// Repeatedly contracts the edge whose collapse introduces the least
/// quadric error until the triangle count reaches the target computed
/// from `options`, the error bound is hit, or no collapsible edge
/// remains. The mesh is compacted before returning: surviving vertices
/// and triangles are densely renumbered.
///
/// Returns without changes when the target is not below the current
/// triangle count or `options.max_error` is non-positive.
///
/// # Example
///
/// ```
/// use whittle::algo::decimate::{qem_decimate, DecimateOptions};
/// use whittle::mesh::primitives::sphere;
///
/// let mut mesh = sphere(1.0, 24, 12);
///
/// let summary = qem_decimate(&mut mesh, &DecimateOptions::with_target_triangles(100));
/// assert!(mesh.num_triangles() <= 100);
/// assert_eq!(summary.triangles_after, mesh.num_triangles());
/// ```
pub fn qem_decimate(mesh: &mut TriMesh, options: &DecimateOptions) -> DecimateSummary {
    qem_decimate_with_progress(mesh, options, &Progress::none(), &Cancel::never())
}

/// [`qem_decimate`] with progress reporting and cancellation.
///
/// `progress` receives advisory percent values; `cancel` is polled every
/// few collapses, and when it reports `true` the loop stops at the next
/// boundary. A cancelled run still compacts and returns a valid,
/// partially decimated mesh, with [`DecimateSummary::cancelled`] set.
pub fn qem_decimate_with_progress(
    mesh: &mut TriMesh,
    options: &DecimateOptions,
    progress: &Progress,
    cancel: &Cancel,
) -> DecimateSummary {
    let initial = mesh.num_triangles();
    let mut summary = DecimateSummary {
        triangles_before: initial,
        triangles_after: initial,
        last_error: 0.0,
        cancelled: false,
    };

    let target = options.compute_target(initial);
    if target >= initial {
        return summary;
    }
    let max_error = options.max_error.unwrap_or(f32::MAX);
    if max_error <= 0.0 {
        return summary;
    }

    let (mut triangle_states, mut vertex_states, mut incidences, errors) =
        init(mesh, options.parallel);
    progress.report(STATUS_INIT_PERCENT);

    let mut heap_pos = vec![0usize; initial];
    let mut heap = MutableHeap::with_capacity(initial);
    for e in errors {
        heap.push(e, &mut |t, p| heap_pos[t as usize] = p);
    }

    let mut runs = Vec::with_capacity(TYPICAL_FAN_SIZE);
    let mut scratch = Vec::with_capacity(TYPICAL_FAN_SIZE);
    let mut changed: Vec<u32> = Vec::with_capacity(2 * TYPICAL_FAN_SIZE);

    let mut live = initial;
    let to_reduce = (initial - target) as u32;
    let status_period = 16.max(to_reduce / 100);

    let mut iteration: u32 = 0;
    if cancel.is_requested() {
        summary.cancelled = true;
    }
    while !summary.cancelled && live > target && !heap.is_empty() {
        iteration += 1;
        if iteration % status_period == 0 {
            let remaining = (live - target) as f64 / to_reduce as f64;
            let span = (100 - STATUS_INIT_PERCENT) as f64;
            progress.report((STATUS_INIT_PERCENT as f64 + span * (1.0 - remaining)).round() as u32);
        }
        if iteration % CANCEL_POLL_PERIOD == 0 && cancel.is_requested() {
            summary.cancelled = true;
            break;
        }

        let Some(mut e) = heap.pop(&mut |t, p| heap_pos[t as usize] = p) else {
            break;
        };
        if e.value >= max_error {
            break;
        }
        let ti0 = e.triangle;
        if triangle_states[ti0 as usize].is_deleted() {
            continue;
        }
        if triangle_states[ti0 as usize].min_edge == STALE_EDGE {
            // error unknown since a neighbor collapsed; defer until a
            // later collapse refreshes the entry
            e.value = max_error;
            heap.push(e, &mut |t, p| heap_pos[t as usize] = p);
            continue;
        }

        let t0 = mesh.triangles[ti0 as usize];
        let min_edge = triangle_states[ti0 as usize].min_edge as usize;
        let mut vi0 = t0[min_edge];
        let mut vi1 = t0[(min_edge + 1) % 3];
        // fan merging moves entries from the higher slab into the lower
        if vi0 > vi1 {
            std::mem::swap(&mut vi0, &mut vi1);
        }
        debug_assert!(!vertex_states[vi0 as usize].is_deleted());
        debug_assert!(!vertex_states[vi1 as usize].is_deleted());

        let mut q = vertex_states[vi0 as usize].quadric;
        q += &vertex_states[vi1 as usize].quadric;
        let p0: Vector3<f64> = mesh.positions[vi0 as usize].coords.cast();
        let p1: Vector3<f64> = mesh.positions[vi1 as usize].coords.cast();
        let placement = optimal_placement(&q, &p0, &p1);
        let new_pos = Point3::new(
            placement.position.x as f32,
            placement.position.y as f32,
            placement.position.z as f32,
        );

        // the other triangle sharing the collapsing edge, found by
        // scanning the smaller fan
        let opposite = if vertex_states[vi0 as usize].count < vertex_states[vi1 as usize].count {
            find_opposite(vi1, &vertex_states[vi0 as usize], ti0, &incidences, &mesh.triangles)
        } else {
            find_opposite(vi0, &vertex_states[vi1 as usize], ti0, &incidences, &mesh.triangles)
        };

        let ti1 = match opposite {
            Some(ti1)
                if !is_flipped(
                    &new_pos,
                    ti0,
                    ti1,
                    &vertex_states[vi0 as usize],
                    &triangle_states,
                    &incidences,
                    mesh,
                ) && !is_flipped(
                    &new_pos,
                    ti0,
                    ti1,
                    &vertex_states[vi1 as usize],
                    &triangle_states,
                    &incidences,
                    mesh,
                ) =>
            {
                ti1
            }
            _ => {
                // boundary edge or fold-back: fall through to the
                // triangle's next-cheapest edge
                let errors3 = edge_errors(&t0, &mesh.positions, &vertex_states);
                let ord = ascending3(&errors3);
                let state = &mut triangle_states[ti0 as usize];
                if state.min_edge == ord[0] {
                    state.min_edge = ord[1];
                    e.value = errors3[ord[1] as usize] as f32;
                } else if state.min_edge == ord[1] {
                    state.min_edge = ord[2];
                    e.value = errors3[ord[2] as usize] as f32;
                } else {
                    state.min_edge = STALE_EDGE;
                    e.value = max_error;
                }
                heap.push(e, &mut |t, p| heap_pos[t as usize] = p);
                continue;
            }
        };

        summary.last_error = e.value;
        changed.clear();

        // vi0's other triangles survive untouched but need new errors
        {
            let v0s = &vertex_states[vi0 as usize];
            for ei in v0s.start..v0s.end() {
                let ti = incidences[ei as usize].triangle;
                if ti == ti0 || ti == ti1 {
                    continue;
                }
                changed.push(ti);
            }
        }
        // vi1's other triangles are rewired onto vi0
        {
            let v1s = &vertex_states[vi1 as usize];
            for ei in v1s.start..v1s.end() {
                let inc = incidences[ei as usize];
                if inc.triangle == ti0 || inc.triangle == ti1 {
                    continue;
                }
                mesh.triangles[inc.triangle as usize][inc.corner as usize] = vi0;
                changed.push(inc.triangle);
            }
        }
        vertex_states[vi0 as usize].quadric = q;

        let vi_top0 = t0[(min_edge + 2) % 3];
        let t1 = mesh.triangles[ti1 as usize];
        merge_fans(
            &mut incidences,
            &mut vertex_states,
            ti0,
            ti1,
            vi0,
            vi1,
            vi_top0,
            t1,
            &mut runs,
            &mut scratch,
        );

        mesh.positions[vi0 as usize] = new_pos;

        // reprioritize: drop ti1's entry, refresh every surviving
        // neighbor (must come after the fans are merged)
        heap.remove(heap_pos[ti1 as usize], &mut |t, p| heap_pos[t as usize] = p);
        for &ti in &changed {
            let t = mesh.triangles[ti as usize];
            let state = &mut triangle_states[ti as usize];
            state.normal = mesh.triangle_normal(ti as usize).cast();
            let errors3 = edge_errors(&t, &mesh.positions, &vertex_states);
            let (min_edge, value) = min_edge_of(&errors3);
            state.min_edge = min_edge;
            let pos = heap_pos[ti as usize];
            heap.set_value(pos, value);
            heap.update(pos, &mut |t, p| heap_pos[t as usize] = p);
        }

        triangle_states[ti0 as usize].mark_deleted();
        triangle_states[ti1 as usize].mark_deleted();
        live -= 2;
    }

    compact(&vertex_states, &triangle_states, &incidences, mesh);
    summary.triangles_after = mesh.num_triangles();
    if !summary.cancelled {
        progress.report(100);
    }
    summary
}

type InitOutput = (
    Vec<TriangleState>,
    Vec<VertexState>,
    Vec<Incidence>,
    Vec<ErrorEntry>,
);

/// Build the decimation state from the input mesh.
///
/// The per-triangle passes (normals + plane quadrics, then initial edge
/// errors) write disjoint slots and run in parallel; quadric
/// accumulation and slab layout are sequential.
fn init(mesh: &TriMesh, parallel: bool) -> InitOutput {
    let num_triangles = mesh.num_triangles();
    let mut triangle_states = vec![TriangleState::default(); num_triangles];
    let mut vertex_states = vec![VertexState::default(); mesh.num_vertices()];

    let triangle_quadrics: Vec<Quadric> = if parallel {
        triangle_states
            .par_iter_mut()
            .zip(mesh.triangles.par_iter())
            .map(|(state, t)| triangle_plane(state, t, &mesh.positions))
            .collect()
    } else {
        triangle_states
            .iter_mut()
            .zip(mesh.triangles.iter())
            .map(|(state, t)| triangle_plane(state, t, &mesh.positions))
            .collect()
    };

    for (t, q) in mesh.triangles.iter().zip(&triangle_quadrics) {
        for &vi in t {
            let state = &mut vertex_states[vi as usize];
            state.quadric += q;
            state.count += 1;
        }
    }
    drop(triangle_quadrics);

    // slab layout: prefix-sum of fan sizes, counts recycled as cursors
    let mut start = 0u32;
    for state in &mut vertex_states {
        state.start = start;
        start += state.count;
        state.count = 0;
    }
    debug_assert_eq!(start as usize, num_triangles * 3);

    let errors: Vec<ErrorEntry> = if parallel {
        triangle_states
            .par_iter_mut()
            .zip(mesh.triangles.par_iter())
            .enumerate()
            .map(|(ti, (state, t))| initial_error(ti, state, t, mesh, &vertex_states))
            .collect()
    } else {
        triangle_states
            .iter_mut()
            .zip(mesh.triangles.iter())
            .enumerate()
            .map(|(ti, (state, t))| initial_error(ti, state, t, mesh, &vertex_states))
            .collect()
    };

    let mut incidences = vec![Incidence::default(); num_triangles * 3];
    for (ti, t) in mesh.triangles.iter().enumerate() {
        for (corner, &vi) in t.iter().enumerate() {
            let state = &mut vertex_states[vi as usize];
            incidences[state.end() as usize] = Incidence {
                triangle: ti as u32,
                corner: corner as u8,
            };
            state.count += 1;
        }
    }

    (triangle_states, vertex_states, incidences, errors)
}

/// Compute a triangle's unit normal, store it, and return the plane
/// quadric through its first corner.
fn triangle_plane(
    state: &mut TriangleState,
    t: &[u32; 3],
    positions: &[Point3<f32>],
) -> Quadric {
    let v0: Vector3<f64> = positions[t[0] as usize].coords.cast();
    let v1: Vector3<f64> = positions[t[1] as usize].coords.cast();
    let v2: Vector3<f64> = positions[t[2] as usize].coords.cast();
    let n = (v1 - v0).cross(&(v2 - v0)).normalize();
    state.normal = n.cast();
    Quadric::from_plane(&n, -n.dot(&v0))
}

fn initial_error(
    ti: usize,
    state: &mut TriangleState,
    t: &[u32; 3],
    mesh: &TriMesh,
    vertex_states: &[VertexState],
) -> ErrorEntry {
    let errors3 = edge_errors(t, &mesh.positions, vertex_states);
    let (min_edge, value) = min_edge_of(&errors3);
    state.min_edge = min_edge;
    ErrorEntry::new(value, ti as u32)
}

/// Collapse errors of a triangle's three directed edges.
fn edge_errors(
    t: &[u32; 3],
    positions: &[Point3<f32>],
    vertex_states: &[VertexState],
) -> [f64; 3] {
    let mut errors = [0.0; 3];
    for (j, error) in errors.iter_mut().enumerate() {
        let vi0 = t[j];
        let vi1 = t[(j + 1) % 3];
        let mut q = vertex_states[vi0 as usize].quadric;
        q += &vertex_states[vi1 as usize].quadric;
        let p0: Vector3<f64> = positions[vi0 as usize].coords.cast();
        let p1: Vector3<f64> = positions[vi1 as usize].coords.cast();
        *error = optimal_placement(&q, &p0, &p1).error;
    }
    errors
}

/// Index of the minimum edge error and its value for the heap.
fn min_edge_of(errors: &[f64; 3]) -> (u8, f32) {
    let min_edge = if errors[0] < errors[1] {
        if errors[0] < errors[2] {
            0
        } else {
            2
        }
    } else if errors[1] < errors[2] {
        1
    } else {
        2
    };
    (min_edge, errors[min_edge as usize] as f32)
}

/// Indices `{0, 1, 2}` ordered by ascending error.
fn ascending3(errors: &[f64; 3]) -> [u8; 3] {
    if errors[0] < errors[1] {
        if errors[0] < errors[2] {
            if errors[1] < errors[2] {
                [0, 1, 2]
            } else {
                [0, 2, 1]
            }
        } else {
            [2, 0, 1]
        }
    } else if errors[1] < errors[2] {
        if errors[0] < errors[2] {
            [1, 0, 2]
        } else {
            [1, 2, 0]
        }
    } else {
        [2, 1, 0]
    }
}

/// Scan `scanned`'s fan for a triangle other than `ti0` that also
/// references `vi`. `None` means the collapsing edge lies on a boundary.
fn find_opposite(
    vi: u32,
    scanned: &VertexState,
    ti0: u32,
    incidences: &[Incidence],
    triangles: &[[u32; 3]],
) -> Option<u32> {
    for ei in scanned.start..scanned.end() {
        let inc = incidences[ei as usize];
        if inc.triangle == ti0 {
            continue;
        }
        let t = triangles[inc.triangle as usize];
        if t[(inc.corner as usize + 1) % 3] == vi || t[(inc.corner as usize + 2) % 3] == vi {
            return Some(inc.triangle);
        }
    }
    None
}

/// Would moving this fan's shared corner to `new_pos` fold any triangle
/// over (or squash it flat)?
fn is_flipped(
    new_pos: &Point3<f32>,
    ti0: u32,
    ti1: u32,
    fan: &VertexState,
    triangle_states: &[TriangleState],
    incidences: &[Incidence],
    mesh: &TriMesh,
) -> bool {
    let collinear = 1.0f32 - f32::EPSILON;

    for ei in fan.start..fan.end() {
        let inc = incidences[ei as usize];
        if inc.triangle == ti0 || inc.triangle == ti1 {
            continue;
        }
        let t = mesh.triangles[inc.triangle as usize];
        let normal = triangle_states[inc.triangle as usize].normal;
        let vf = mesh.positions[t[(inc.corner as usize + 1) % 3] as usize];
        let vs = mesh.positions[t[(inc.corner as usize + 2) % 3] as usize];

        let d1 = (vf - new_pos).normalize();
        let d2 = (vs - new_pos).normalize();

        let dot = d1.dot(&d2);
        if dot > collinear || dot < -collinear {
            return true;
        }
        let n = d1.cross(&d2).normalize();
        if n.dot(&normal) < NORMAL_DOT_MIN {
            return true;
        }
    }
    false
}

/// Drop tombstoned vertices and triangles and renumber the survivors
/// densely.
fn compact(
    vertex_states: &[VertexState],
    triangle_states: &[TriangleState],
    incidences: &[Incidence],
    mesh: &mut TriMesh,
) {
    let mut vi_new = 0usize;
    for (vi, state) in vertex_states.iter().enumerate() {
        if state.is_deleted() {
            continue;
        }
        for ei in state.start..state.end() {
            let inc = incidences[ei as usize];
            mesh.triangles[inc.triangle as usize][inc.corner as usize] = vi_new as u32;
        }
        mesh.positions[vi_new] = mesh.positions[vi];
        vi_new += 1;
    }
    mesh.positions.truncate(vi_new);

    let mut ti_new = 0usize;
    for (ti, state) in triangle_states.iter().enumerate() {
        if state.is_deleted() {
            continue;
        }
        mesh.triangles[ti_new] = mesh.triangles[ti];
        ti_new += 1;
    }
    mesh.triangles.truncate(ti_new);
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    use super::*;
    use crate::mesh::measure::{mean_surface_distance, volume};
    use crate::mesh::primitives::{plane_grid, sphere, subdivided_cube};

    /// Compactness (invariant checks after a run): indices in range, no
    /// degenerate triangle, every surviving vertex still referenced.
    fn assert_compact(mesh: &TriMesh) {
        mesh.validate().unwrap();
        let mut referenced = vec![false; mesh.num_vertices()];
        for t in &mesh.triangles {
            for &vi in t {
                referenced[vi as usize] = true;
            }
        }
        assert!(referenced.iter().all(|&r| r), "compacted mesh has unreferenced vertices");
    }

    #[test]
    fn test_empty_mesh_unchanged() {
        let mut mesh = TriMesh::new();
        let summary = qem_decimate(&mut mesh, &DecimateOptions::with_target_triangles(0));
        assert_eq!(mesh, TriMesh::new());
        assert_eq!(summary.triangles_after, 0);
        assert_eq!(summary.last_error, 0.0);
    }

    #[test]
    fn test_single_triangle_unchanged() {
        let mut mesh = TriMesh {
            positions: vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
            ],
            triangles: vec![[0, 1, 2]],
        };
        let original = mesh.clone();

        // the only edge candidates are boundary edges, which cannot
        // collapse; the mesh must come back intact
        let summary = qem_decimate(&mut mesh, &DecimateOptions::with_target_triangles(0));
        assert_eq!(mesh, original);
        assert_eq!(summary.last_error, 0.0);
    }

    // Two tetrahedra sharing a base: vertex 4 sits just off vertex 2, so
    // the edge between them is by far the cheapest. Collapsing it must
    // keep the far tetrahedron untouched and slide vertex 2 toward the
    // removed vertex.
    #[test]
    fn test_apex_removal_collapses_cheapest_edge() {
        let mut mesh = TriMesh {
            positions: vec![
                Point3::new(-1.0, 0.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(0.0, 0.0, 1.0),
                Point3::new(0.9, 0.1, -0.1),
            ],
            triangles: vec![
                [1, 0, 3],
                [2, 1, 3],
                [0, 2, 3],
                [0, 1, 4],
                [1, 2, 4],
                [2, 0, 4],
            ],
        };
        let original = mesh.clone();

        let summary = qem_decimate(&mut mesh, &DecimateOptions::with_target_triangles(4));

        assert_eq!(mesh.num_triangles(), 4);
        assert_eq!(mesh.num_vertices(), 4);
        assert!(summary.last_error >= 0.0);

        for i in 0..3 {
            assert_eq!(mesh.triangles[i], original.triangles[i]);
        }
        for i in [0usize, 1, 3] {
            assert_eq!(mesh.positions[i], original.positions[i]);
        }

        // the merged vertex lies strictly between the two it replaced
        let merged = mesh.positions[2];
        let kept = original.positions[2];
        let removed = original.positions[4];
        for i in 0..3 {
            let between = (merged[i] < removed[i] && merged[i] > kept[i])
                || (merged[i] > removed[i] && merged[i] < kept[i]);
            assert!(between, "coordinate {i} of {merged:?} not between {kept:?} and {removed:?}");
        }

        assert_compact(&mesh);
    }

    #[test]
    fn test_idempotent_at_target() {
        let mut mesh = sphere(1.0, 12, 6);
        let original = mesh.clone();
        let summary = qem_decimate(
            &mut mesh,
            &DecimateOptions::with_target_triangles(original.num_triangles()),
        );
        assert_eq!(mesh, original);
        assert_eq!(summary.last_error, 0.0);
    }

    #[test]
    fn test_max_error_cap_blocks_collapses() {
        // every collapse on a coarse sphere costs well over 1e-6
        let mut mesh = sphere(1.0, 8, 4);
        let original = mesh.clone();

        let options = DecimateOptions::with_target_triangles(2).with_max_error(1e-6);
        let summary = qem_decimate(&mut mesh, &options);

        assert_eq!(mesh, original);
        assert_eq!(summary.last_error, 0.0);
        assert_eq!(summary.triangles_after, original.num_triangles());
    }

    #[test]
    fn test_sphere_to_five_percent() {
        let mut mesh = sphere(5.0, 48, 24);
        let original = mesh.clone();
        let target = original.num_triangles() / 20;

        let summary = qem_decimate(&mut mesh, &DecimateOptions::with_target_triangles(target));

        assert!(mesh.num_triangles() <= target);
        assert_eq!(summary.triangles_after, mesh.num_triangles());
        assert!(summary.last_error > 0.0);
        assert_compact(&mesh);

        // the decimated surface stays close to the original in both
        // volume and distance
        let (vol_in, vol_out) = (volume(&original), volume(&mesh));
        assert!(
            (vol_in - vol_out).abs() < vol_in * 0.06,
            "volume drifted from {vol_in} to {vol_out}"
        );
        let distance = mean_surface_distance(&original, &mesh, 10.0, 0);
        assert!(distance < 0.2, "mean surface distance {distance} too large");

        // orientation survives: normals still point away from the center
        for ti in 0..mesh.num_triangles() {
            let t = mesh.triangles[ti];
            let centroid = (mesh.positions[t[0] as usize].coords
                + mesh.positions[t[1] as usize].coords
                + mesh.positions[t[2] as usize].coords)
                / 3.0;
            assert!(mesh.triangle_normal(ti).dot(&centroid.cast()) > 0.0);
        }
    }

    #[test]
    fn test_flat_faces_preserve_volume() {
        let mut mesh = subdivided_cube(3.0, 6);
        let original = mesh.clone();
        let target = original.num_triangles() / 4;

        qem_decimate(&mut mesh, &DecimateOptions::with_target_triangles(target));

        assert!(mesh.num_triangles() <= target);
        assert_compact(&mesh);
        // collapses on flat faces and straight edges cannot move volume
        assert!((volume(&mesh) - volume(&original)).abs() < 0.01);
    }

    #[test]
    fn test_open_grid_keeps_boundary() {
        let mut mesh = plane_grid(4);
        let before = mesh.num_triangles();

        qem_decimate(&mut mesh, &DecimateOptions::with_target_ratio(0.25));

        assert!(mesh.num_triangles() < before);
        assert_compact(&mesh);
        // on a flat grid every placement falls back to an endpoint or a
        // midpoint, so the result stays in the plane and inside the hull
        for p in &mesh.positions {
            assert_eq!(p.z, 0.0);
            assert!((0.0..=4.0).contains(&p.x));
            assert!((0.0..=4.0).contains(&p.y));
        }
    }

    #[test]
    fn test_cancellation_keeps_mesh_valid() {
        let mut mesh = sphere(5.0, 32, 16);
        let initial = mesh.num_triangles();
        let target = initial / 20;

        let flag = Arc::new(AtomicBool::new(false));
        let trip = Arc::clone(&flag);
        let progress = Progress::new(move |percent| {
            if percent >= 50 {
                trip.store(true, Ordering::Relaxed);
            }
        });
        let cancel = Cancel::from_flag(flag);

        let summary = qem_decimate_with_progress(
            &mut mesh,
            &DecimateOptions::with_target_triangles(target),
            &progress,
            &cancel,
        );

        assert!(summary.cancelled);
        assert!(mesh.num_triangles() > target);
        assert!(mesh.num_triangles() < initial);
        assert_compact(&mesh);
    }

    #[test]
    fn test_sequential_matches_parallel() {
        let make = || sphere(2.0, 24, 12);

        let mut parallel = make();
        qem_decimate(&mut parallel, &DecimateOptions::with_target_ratio(0.1));

        let mut sequential = make();
        qem_decimate(
            &mut sequential,
            &DecimateOptions::with_target_ratio(0.1).sequential(),
        );

        assert_eq!(parallel, sequential);
    }

    #[test]
    fn test_init_builds_closed_adjacency() {
        let mesh = sphere(1.0, 8, 4);
        let (_, vertex_states, incidences, errors) = init(&mesh, true);

        assert_eq!(errors.len(), mesh.num_triangles());
        assert_eq!(incidences.len(), mesh.num_triangles() * 3);

        // slabs are contiguous and in vertex order
        let mut expected_start = 0u32;
        for state in &vertex_states {
            assert_eq!(state.start, expected_start);
            expected_start = state.end();
        }
        assert_eq!(expected_start as usize, incidences.len());

        // every corner of every triangle appears exactly once, in the
        // right slab, with the right corner number
        for (ti, t) in mesh.triangles.iter().enumerate() {
            for (corner, &vi) in t.iter().enumerate() {
                let state = &vertex_states[vi as usize];
                let matches = (state.start..state.end())
                    .filter(|&ei| {
                        let inc = incidences[ei as usize];
                        inc.triangle == ti as u32 && inc.corner == corner as u8
                    })
                    .count();
                assert_eq!(matches, 1);
            }
        }
    }

    #[test]
    fn test_summary_reports_last_error() {
        let mut mesh = sphere(1.0, 16, 8);
        let summary = qem_decimate(&mut mesh, &DecimateOptions::with_target_ratio(0.5));
        assert!(summary.last_error > 0.0);
        assert!(summary.triangles_before > summary.triangles_after);
        assert!(!summary.cancelled);
    }
}
