//! Quadric error matrices.
//!
//! A quadric represents the sum of squared distances to a set of planes
//! as the quadratic form `v^T Q v` with `v = [x, y, z, 1]`. Since the
//! 4x4 matrix is symmetric only the 10 upper-triangle elements are
//! stored.

use std::ops::{Add, AddAssign};

use nalgebra::Vector3;

/// A quadric error matrix (symmetric 4x4, 10 unique elements).
///
/// Element layout:
///
/// ```text
/// | 0 1 2 3 |
/// | 1 4 5 6 |
/// | 2 5 7 8 |
/// | 3 6 8 9 |
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quadric {
    data: [f64; 10],
}

impl Quadric {
    /// The zero quadric.
    pub const ZERO: Self = Self { data: [0.0; 10] };

    /// Create a quadric from a plane `n.x*x + n.y*y + n.z*z + d = 0`
    /// with `n` normalized.
    pub fn from_plane(n: &Vector3<f64>, d: f64) -> Self {
        let (a, b, c) = (n.x, n.y, n.z);
        Self {
            data: [
                a * a,
                a * b,
                a * c,
                a * d,
                b * b,
                b * c,
                b * d,
                c * c,
                c * d,
                d * d,
            ],
        }
    }

    /// Evaluate the squared-distance form at a point.
    ///
    /// Always non-negative for quadrics accumulated from planes.
    pub fn error(&self, v: &Vector3<f64>) -> f64 {
        let q = &self.data;
        let (x, y, z) = (v.x, v.y, v.z);
        q[0] * x * x
            + 2.0 * q[1] * x * y
            + 2.0 * q[2] * x * z
            + 2.0 * q[3] * x
            + q[4] * y * y
            + 2.0 * q[5] * y * z
            + 2.0 * q[6] * y
            + q[7] * z * z
            + 2.0 * q[8] * z
            + q[9]
    }

    /// Determinant of the 3x3 submatrix selected by element indices.
    fn minor(&self, m: [usize; 9]) -> f64 {
        let q = &self.data;
        q[m[0]] * q[m[4]] * q[m[8]] + q[m[2]] * q[m[3]] * q[m[7]] + q[m[1]] * q[m[5]] * q[m[6]]
            - q[m[2]] * q[m[4]] * q[m[6]]
            - q[m[0]] * q[m[5]] * q[m[7]]
            - q[m[1]] * q[m[3]] * q[m[8]]
    }

    /// Determinant of the upper-left 3x3 block.
    pub fn det_3x3(&self) -> f64 {
        self.minor([0, 1, 2, 1, 4, 5, 2, 5, 7])
    }

    /// Solve for the position minimizing the form, by Cramer's rule.
    ///
    /// `det` must be the (non-negligible) value of [`det_3x3`](Self::det_3x3).
    fn solve(&self, det: f64) -> Vector3<f64> {
        let det_1 = -1.0 / det;
        let det_x = self.minor([1, 2, 3, 4, 5, 6, 5, 7, 8]);
        let det_y = self.minor([0, 2, 3, 1, 5, 6, 2, 7, 8]);
        let det_z = self.minor([0, 1, 3, 1, 4, 6, 2, 5, 8]);
        Vector3::new(det_1 * det_x, -det_1 * det_y, det_1 * det_z)
    }
}

impl AddAssign<&Quadric> for Quadric {
    fn add_assign(&mut self, other: &Quadric) {
        for (a, b) in self.data.iter_mut().zip(other.data.iter()) {
            *a += b;
        }
    }
}

impl Add for Quadric {
    type Output = Quadric;

    fn add(mut self, other: Quadric) -> Quadric {
        self += &other;
        self
    }
}

/// Position and error of a candidate edge collapse.
#[derive(Debug, Clone, Copy)]
pub struct Placement {
    /// Where the merged vertex goes.
    pub position: Vector3<f64>,
    /// The quadric error at that position.
    pub error: f64,
}

/// Find the merged-vertex placement minimizing the combined quadric of an
/// edge's endpoints.
///
/// When the 3x3 block is invertible the minimizer is unique. Otherwise
/// the endpoints and the midpoint are evaluated and the lowest-error
/// candidate is used for both the position and the error, so the two can
/// never disagree.
pub fn optimal_placement(q: &Quadric, v0: &Vector3<f64>, v1: &Vector3<f64>) -> Placement {
    let det = q.det_3x3();
    if det.abs() >= f64::EPSILON {
        let position = q.solve(det);
        return Placement {
            position,
            error: q.error(&position),
        };
    }

    // singular: the planes do not pin down a unique point
    let mid = (v0 + v1) / 2.0;
    let mut best = Placement {
        position: *v0,
        error: q.error(v0),
    };
    for candidate in [v1, &mid] {
        let error = q.error(candidate);
        if error < best.error {
            best = Placement {
                position: *candidate,
                error,
            };
        }
    }
    best
}
