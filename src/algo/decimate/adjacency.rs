//! Flat vertex-to-triangle incidence storage.
//!
//! Every vertex owns a contiguous slab (`start .. start + count`) of the
//! global incidence array. Slabs are laid out in ascending vertex order;
//! collapses punch gaps between them but never let them overlap. Keeping
//! the whole adjacency in one flat array and addressing everything by
//! index avoids pointer graphs entirely and keeps per-vertex fans on as
//! few cache lines as possible.

use nalgebra::Vector3;

use super::quadric::Quadric;

/// Edge index marking a stale collapse candidate: the entry's error no
/// longer reflects any real edge and must be deferred when it surfaces.
pub const STALE_EDGE: u8 = 3;

/// Per-triangle decimation state: the unit normal doubles as the
/// deletion tombstone so the whole record stays small.
#[derive(Debug, Clone, Copy)]
pub struct TriangleState {
    /// Unit normal; `x > 2` marks the triangle deleted.
    pub normal: Vector3<f32>,
    /// Which edge (0..=2) currently carries the triangle's minimum
    /// collapse error, or [`STALE_EDGE`].
    pub min_edge: u8,
}

impl Default for TriangleState {
    fn default() -> Self {
        Self {
            normal: Vector3::zeros(),
            min_edge: 0,
        }
    }
}

impl TriangleState {
    /// Check the tombstone.
    #[inline]
    pub fn is_deleted(&self) -> bool {
        self.normal.x > 2.0
    }

    /// Set the tombstone. A unit normal can never reach this value.
    #[inline]
    pub fn mark_deleted(&mut self) {
        self.normal.x = 3.0;
    }
}

/// Per-vertex decimation state: accumulated quadric plus the vertex's
/// incidence slab. `count == 0` marks the vertex deleted.
#[derive(Debug, Clone, Copy)]
pub struct VertexState {
    /// Sum of the plane quadrics of all incident triangles.
    pub quadric: Quadric,
    /// First slot of this vertex's slab in the incidence array.
    pub start: u32,
    /// Number of live entries in the slab.
    pub count: u32,
}

impl Default for VertexState {
    fn default() -> Self {
        Self {
            quadric: Quadric::ZERO,
            start: 0,
            count: 0,
        }
    }
}

impl VertexState {
    /// Check whether the vertex has been collapsed away.
    #[inline]
    pub fn is_deleted(&self) -> bool {
        self.count == 0
    }

    /// One past the last slot of the slab.
    #[inline]
    pub fn end(&self) -> u32 {
        self.start + self.count
    }
}

/// One incidence record: "triangle `triangle` references the owning
/// vertex as its corner number `corner`".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Incidence {
    /// The referencing triangle.
    pub triangle: u32,
    /// Which corner (0..=2) of that triangle is the owning vertex.
    pub corner: u8,
}

/// A scheduled right-shift of a contiguous range of incidence slots.
#[derive(Debug, Clone, Copy)]
pub struct ShiftRun {
    start: u32,
    count: u32,
    shift: u32,
}

/// Remove the entry for `ti` from a vertex's slab by swapping in the
/// last entry. The triangle must be present.
pub fn remove_incidence(entries: &mut [Incidence], v: &mut VertexState, ti: u32) {
    let start = v.start as usize;
    let last = start + v.count as usize - 1;
    for ei in start..last {
        if entries[ei].triangle == ti {
            entries[ei] = entries[last];
            v.count -= 1;
            return;
        }
    }
    debug_assert_eq!(entries[last].triangle, ti);
    v.count -= 1;
}

/// Fold `vi1`'s fan into `vi0`'s slab after the edge `(vi0, vi1)` has
/// collapsed, deleting `ti0` and `ti1` (the two triangles sharing the
/// edge) from every fan that holds them.
///
/// Requires `vi0 < vi1`: surviving entries only ever move toward lower
/// slots or stay put, so shifting later slabs right can always make room
/// at `vi0`. The merged fan has `count0 + count1 - 4` entries (each
/// doomed triangle leaves both endpoint fans).
///
/// `runs` and `scratch` are caller-owned buffers reused across
/// collapses.
#[allow(clippy::too_many_arguments)]
pub fn merge_fans(
    entries: &mut [Incidence],
    vertex_states: &mut [VertexState],
    ti0: u32,
    ti1: u32,
    vi0: u32,
    vi1: u32,
    vi_top0: u32,
    t1: [u32; 3],
    runs: &mut Vec<ShiftRun>,
    scratch: &mut Vec<Incidence>,
) {
    debug_assert!(vi0 < vi1);

    // apex of ti1: the corner that is neither vi0 nor vi1
    let mut vi_top1 = t1[0];
    if vi_top1 == vi0 || vi_top1 == vi1 {
        vi_top1 = t1[1];
        if vi_top1 == vi0 || vi_top1 == vi1 {
            vi_top1 = t1[2];
        }
    }

    remove_incidence(entries, &mut vertex_states[vi_top0 as usize], ti0);
    remove_incidence(entries, &mut vertex_states[vi_top1 as usize], ti1);

    let merged_count =
        vertex_states[vi0 as usize].count + vertex_states[vi1 as usize].count - 4;
    remove_incidence(entries, &mut vertex_states[vi0 as usize], ti0);
    remove_incidence(entries, &mut vertex_states[vi0 as usize], ti1);

    // move the surviving half of vi1's fan out of the array so its slots
    // count as free space
    scratch.clear();
    {
        let v1 = &vertex_states[vi1 as usize];
        for ei in v1.start..v1.end() {
            let e = entries[ei as usize];
            if e.triangle == ti0 || e.triangle == ti1 {
                continue;
            }
            scratch.push(e);
        }
    }
    vertex_states[vi1 as usize].count = 0;

    let mut need = merged_count.saturating_sub(vertex_states[vi0 as usize].count);

    // walk the later slabs, collecting inter-slab gaps until `need`
    // slots are free right after vi0's slab; every slab passed over is
    // scheduled to move right by the still-missing amount
    let mut last_end = vertex_states[vi0 as usize].end();
    let mut act_vi = vi0 as usize + 1;
    runs.clear();
    loop {
        let act_start = if act_vi < vertex_states.len() {
            vertex_states[act_vi].start
        } else {
            entries.len() as u32
        };
        let free = act_start - last_end;
        if free > 0 {
            if free >= need {
                break;
            }
            need -= free;
            runs.push(ShiftRun {
                start: vertex_states[act_vi].start,
                count: vertex_states[act_vi].count,
                shift: need,
            });
        } else if let Some(run) = runs.last_mut() {
            run.count += vertex_states[act_vi].count;
        }
        last_end = vertex_states[act_vi].end();
        vertex_states[act_vi].start += need;
        act_vi += 1;
    }

    // apply in reverse slab order so no live entry is overwritten
    for run in runs.iter().rev() {
        let start = run.start as usize;
        for ei in (start..start + run.count as usize).rev() {
            entries[ei + run.shift as usize] = entries[ei];
        }
    }

    let v0 = &mut vertex_states[vi0 as usize];
    for &e in scratch.iter() {
        entries[v0.end() as usize] = e;
        v0.count += 1;
    }
}
