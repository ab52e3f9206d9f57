//! Corner classification, tangent derivation and magnitude scaling.

use std::f64::consts::PI;

use offedge_math::{angle_between, is_zero_vec, normalize_or_zero, reject, Vec3};

/// Local shape of a loop vertex seen from its up vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CornerType {
    /// The two edges fold back onto each other; no lateral direction exists.
    Folding,
    /// The edges continue in a (near) straight line.
    Straight,
    /// The corner turns left around `up`.
    Convex,
    /// The corner turns right around `up`.
    Concave,
}

/// Classify a corner.
///
/// `right2d` and `left2d` must be perpendicular to `up` and either unit
/// length or zero.
pub fn get_corner_type(up: &Vec3, right2d: &Vec3, left2d: &Vec3, threshold: f64) -> CornerType {
    match (is_zero_vec(right2d), is_zero_vec(left2d)) {
        (true, true) => return CornerType::Folding,
        (true, false) | (false, true) => return CornerType::Straight,
        (false, false) => {}
    }

    let angle = angle_between(right2d, left2d);
    if angle < threshold {
        CornerType::Folding
    } else if angle > PI - threshold {
        CornerType::Straight
    } else if right2d.cross(left2d).dot(up) > threshold {
        CornerType::Convex
    } else {
        CornerType::Concave
    }
}

/// Unit lateral direction at a vertex, or zero for a folding corner.
///
/// `right` points from the vertex along its next edge, `left` along its
/// previous edge.
pub fn calc_tangent(up: &Vec3, right: &Vec3, left: &Vec3, threshold: f64) -> Vec3 {
    let right2d = normalize_or_zero(&reject(right, up));
    let left2d = normalize_or_zero(&reject(left, up));

    let tangent = match get_corner_type(up, &right2d, &left2d, threshold) {
        CornerType::Folding => Vec3::zeros(),
        CornerType::Straight => {
            let longer = if right2d.norm() >= left2d.norm() {
                right2d
            } else {
                -left2d
            };
            longer.cross(up)
        }
        CornerType::Convex => -(right2d + left2d),
        CornerType::Concave => right2d + left2d,
    };

    normalize_or_zero(&tangent)
}

/// Scale that keeps the perpendicular offset distance uniform.
///
/// `1 / max(sin∠(direction, right), sin∠(direction, left))`, or zero for a
/// zero direction or a zero denominator.
pub fn get_factor(direction: &Vec3, right: &Vec3, left: &Vec3) -> f64 {
    if is_zero_vec(direction) {
        return 0.0;
    }
    let denominator = angle_between(direction, right)
        .sin()
        .max(angle_between(direction, left).sin());
    if denominator != 0.0 {
        1.0 / denominator
    } else {
        0.0
    }
}
