#![warn(missing_docs)]

//! Math types for the offedge engine.
//!
//! Thin wrappers around nalgebra providing the points, vectors and transforms
//! used by the topology and offset crates, plus a handful of vector helpers
//! whose zero-vector behavior the offset solver depends on.

use nalgebra::{Matrix3, Matrix4, Vector3};
use serde::{Deserialize, Serialize};

/// A point in 3D space.
pub type Point3 = nalgebra::Point3<f64>;

/// A vector in 3D space.
pub type Vec3 = Vector3<f64>;

/// Vectors shorter than this are treated as the zero vector.
pub const ZERO_LENGTH: f64 = 1e-12;

/// A 4x4 affine transformation matrix.
///
/// Serialized as four rows of four numbers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "[[f64; 4]; 4]", into = "[[f64; 4]; 4]")]
pub struct Transform {
    /// The underlying 4x4 matrix.
    pub matrix: Matrix4<f64>,
}

impl Transform {
    /// Identity transform.
    pub fn identity() -> Self {
        Self {
            matrix: Matrix4::identity(),
        }
    }

    /// Compose: `self` then `other` (self * other).
    pub fn then(&self, other: &Transform) -> Self {
        Self {
            matrix: self.matrix * other.matrix,
        }
    }

    /// The translation column.
    pub fn translation_part(&self) -> Point3 {
        Point3::new(
            self.matrix[(0, 3)],
            self.matrix[(1, 3)],
            self.matrix[(2, 3)],
        )
    }

    /// Normals of the three coordinate planes of this frame.
    ///
    /// Row `i` of the inverse linear part is orthogonal to the two frame axes
    /// other than `i`, so it is the normal of the plane the mirror across
    /// axis `i` reflects through. Returns `None` for a singular frame.
    pub fn plane_normals(&self) -> Option<[Vec3; 3]> {
        let m3: Matrix3<f64> = self.matrix.fixed_view::<3, 3>(0, 0).into_owned();
        let inv = m3.try_inverse()?;
        let row = |i: usize| normalize_or_zero(&inv.row(i).transpose());
        Some([row(0), row(1), row(2)])
    }

    /// Inverse of this transform, if it exists.
    pub fn inverse(&self) -> Option<Self> {
        self.matrix.try_inverse().map(|matrix| Self { matrix })
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

impl From<[[f64; 4]; 4]> for Transform {
    fn from(rows: [[f64; 4]; 4]) -> Self {
        let mut m = Matrix4::zeros();
        for (r, row) in rows.iter().enumerate() {
            for (c, value) in row.iter().enumerate() {
                m[(r, c)] = *value;
            }
        }
        Self { matrix: m }
    }
}

impl From<Transform> for [[f64; 4]; 4] {
    fn from(t: Transform) -> Self {
        let mut rows = [[0.0; 4]; 4];
        for (r, row) in rows.iter_mut().enumerate() {
            for (c, value) in row.iter_mut().enumerate() {
                *value = t.matrix[(r, c)];
            }
        }
        rows
    }
}

// =============================================================================
// Vector helpers
// =============================================================================

/// Whether `v` is (numerically) the zero vector.
pub fn is_zero_vec(v: &Vec3) -> bool {
    v.norm() < ZERO_LENGTH
}

/// Unit vector along `v`, or exactly zero when `v` is too short to normalize.
pub fn normalize_or_zero(v: &Vec3) -> Vec3 {
    let len = v.norm();
    if len < ZERO_LENGTH {
        Vec3::zeros()
    } else {
        v / len
    }
}

/// Component of `v` along `onto`. Zero when `onto` is zero.
pub fn project(v: &Vec3, onto: &Vec3) -> Vec3 {
    let denom = onto.norm_squared();
    if denom < ZERO_LENGTH * ZERO_LENGTH {
        return Vec3::zeros();
    }
    onto * (v.dot(onto) / denom)
}

/// Component of `v` orthogonal to `from`.
pub fn reject(v: &Vec3, from: &Vec3) -> Vec3 {
    v - project(v, from)
}

/// Unsigned angle between two vectors in `[0, π]`.
///
/// Returns 0 when either vector is zero.
pub fn angle_between(a: &Vec3, b: &Vec3) -> f64 {
    let la = a.norm();
    let lb = b.norm();
    if la < ZERO_LENGTH || lb < ZERO_LENGTH {
        return 0.0;
    }
    (a.dot(b) / (la * lb)).clamp(-1.0, 1.0).acos()
}

/// Unnormalized polygon normal by Newell's method.
///
/// The ring is treated as cyclic: the last point connects back to the first.
pub fn newell_normal(points: &[Point3]) -> Vec3 {
    let n = points.len();
    let mut normal = Vec3::zeros();
    for i in 0..n {
        let curr = points[i];
        let next = points[(i + 1) % n];
        normal.x += (curr.y - next.y) * (curr.z + next.z);
        normal.y += (curr.z - next.z) * (curr.x + next.x);
        normal.z += (curr.x - next.x) * (curr.y + next.y);
    }
    normal
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    fn rotation_z(angle: f64) -> Transform {
        let (s, c) = angle.sin_cos();
        Transform::from([
            [c, -s, 0.0, 0.0],
            [s, c, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    fn translation(dx: f64, dy: f64, dz: f64) -> Transform {
        Transform::from([
            [1.0, 0.0, 0.0, dx],
            [0.0, 1.0, 0.0, dy],
            [0.0, 0.0, 1.0, dz],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    #[test]
    fn test_translation_part() {
        let t = translation(10.0, 20.0, 30.0).then(&rotation_z(0.7));
        assert_eq!(t.translation_part(), Point3::new(10.0, 20.0, 30.0));
        assert_eq!(Transform::identity().translation_part(), Point3::origin());
    }

    #[test]
    fn test_inverse() {
        let t = rotation_z(0.4).then(&translation(1.0, 2.0, 3.0));
        let inv = t.inverse().unwrap();
        assert_relative_eq!(t.then(&inv).matrix, Matrix4::identity(), epsilon = 1e-12);

        let flat = Transform::from([
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 0.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ]);
        assert!(flat.inverse().is_none());
    }

    #[test]
    fn test_rows_roundtrip() {
        let t = rotation_z(0.3).then(&translation(1.0, -2.0, 4.0));
        let rows: [[f64; 4]; 4] = t.clone().into();
        assert_eq!(rows[1][3], t.matrix[(1, 3)]);
        assert_eq!(Transform::from(rows), t);
    }

    #[test]
    fn test_plane_normals_rotated_frame() {
        let t = rotation_z(PI / 2.0);
        let [nx, ny, nz] = t.plane_normals().unwrap();
        // Local X axis now points along world +Y.
        assert_relative_eq!(nx, Vec3::new(0.0, 1.0, 0.0), epsilon = 1e-12);
        assert_relative_eq!(ny, Vec3::new(-1.0, 0.0, 0.0), epsilon = 1e-12);
        assert_relative_eq!(nz, Vec3::z(), epsilon = 1e-12);
    }

    #[test]
    fn test_plane_normals_singular() {
        let mut t = Transform::identity();
        t.matrix[(1, 1)] = 0.0;
        assert!(t.plane_normals().is_none());
    }

    #[test]
    fn test_normalize_or_zero() {
        assert_eq!(normalize_or_zero(&Vec3::zeros()), Vec3::zeros());
        assert_eq!(normalize_or_zero(&Vec3::new(1e-14, 0.0, 0.0)), Vec3::zeros());
        assert_relative_eq!(normalize_or_zero(&Vec3::new(0.0, 3.0, 4.0)).norm(), 1.0);
    }

    #[test]
    fn test_project_reject() {
        let v = Vec3::new(1.0, 2.0, 3.0);
        let axis = Vec3::new(0.0, 0.0, 2.0);
        assert_relative_eq!(project(&v, &axis), Vec3::new(0.0, 0.0, 3.0));
        assert_relative_eq!(reject(&v, &axis), Vec3::new(1.0, 2.0, 0.0));
        assert_eq!(project(&v, &Vec3::zeros()), Vec3::zeros());
        assert_eq!(reject(&v, &Vec3::zeros()), v);
    }

    #[test]
    fn test_angle_between() {
        assert_relative_eq!(angle_between(&Vec3::x(), &Vec3::y()), PI / 2.0);
        assert_relative_eq!(angle_between(&Vec3::x(), &-Vec3::x()), PI);
        assert_eq!(angle_between(&Vec3::x(), &Vec3::x()), 0.0);
        assert_eq!(angle_between(&Vec3::zeros(), &Vec3::x()), 0.0);
    }

    #[test]
    fn test_newell_square() {
        let pts = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ];
        let n = newell_normal(&pts);
        assert_relative_eq!(normalize_or_zero(&n), Vec3::z());
    }

    #[test]
    fn test_newell_collinear_is_zero() {
        let pts = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
        ];
        assert!(is_zero_vec(&newell_normal(&pts)));
    }
}
