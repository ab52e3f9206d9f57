//! Operator options and the width/depth amounts derived from them.

use serde::{Deserialize, Serialize};

/// What happens to the geometry once directions are known.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeometryMode {
    /// Extrude, move the copies, then drop the connecting strip.
    #[default]
    Offset,
    /// Extrude and move the copies, keeping the connecting strip.
    Extrude,
    /// Move the selected edges themselves.
    Move,
}

/// How the depth component is specified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DepthMode {
    /// Width is a magnitude tilted by `angle` out of the surface.
    #[default]
    Angle,
    /// Width and depth are independent distances.
    Depth,
}

/// Full option set of the offset operator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OffsetOptions {
    /// Geometry mode.
    pub geometry_mode: GeometryMode,
    /// Offset width.
    pub width: f64,
    /// Flip the width direction.
    pub flip_width: bool,
    /// Offset depth (depth mode only).
    pub depth: f64,
    /// Flip the depth direction.
    pub flip_depth: bool,
    /// How depth is specified.
    pub depth_mode: DepthMode,
    /// Tilt angle in radians (angle mode only).
    pub angle: f64,
    /// Flip the angle.
    pub flip_angle: bool,
    /// Orient loops and up vectors by the adjacent faces.
    pub follow_face: bool,
    /// Honor merge-enabled mirror modifiers.
    pub mirror_modifier: bool,
    /// Align vertices along inner edges.
    pub edge_rail: bool,
    /// Apply the edge rail to loop end vertices only.
    pub edge_rail_only_end: bool,
    /// Angle threshold (radians) separating straight/folding corners.
    pub threshold: f64,
}

impl Default for OffsetOptions {
    fn default() -> Self {
        Self {
            geometry_mode: GeometryMode::Offset,
            width: 0.2,
            flip_width: false,
            depth: 0.0,
            flip_depth: false,
            depth_mode: DepthMode::Angle,
            angle: 0.0,
            flip_angle: false,
            follow_face: false,
            mirror_modifier: false,
            edge_rail: false,
            edge_rail_only_end: false,
            threshold: 1.0e-4,
        }
    }
}

impl OffsetOptions {
    /// Options consumed by the direction solver.
    pub fn solver(&self) -> SolverOptions {
        SolverOptions {
            follow_face: self.follow_face,
            edge_rail: self.edge_rail,
            edge_rail_only_end: self.edge_rail_only_end,
            threshold: self.threshold,
        }
    }

    /// Signed width/depth pair for these options.
    pub fn amount(&self) -> OffsetAmount {
        let w = if self.flip_width { -self.width } else { self.width };
        match self.depth_mode {
            DepthMode::Angle => {
                let angle = if self.flip_angle { -self.angle } else { self.angle };
                let (s, c) = angle.sin_cos();
                OffsetAmount {
                    width: w * c,
                    depth: w * s,
                }
            }
            DepthMode::Depth => OffsetAmount {
                width: w,
                depth: if self.flip_depth { -self.depth } else { self.depth },
            },
        }
    }

    /// Whether `other` yields the same loops and directions as `self`.
    ///
    /// Only width/depth/angle fields may differ.
    pub fn same_directions(&self, other: &OffsetOptions) -> bool {
        self.geometry_mode == other.geometry_mode
            && self.mirror_modifier == other.mirror_modifier
            && self.solver() == other.solver()
    }
}

/// Options that shape the per-vertex directions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolverOptions {
    /// Follow adjacent faces.
    pub follow_face: bool,
    /// Use inner edges as rails.
    pub edge_rail: bool,
    /// Restrict edge rails to loop ends.
    pub edge_rail_only_end: bool,
    /// Angle threshold in radians.
    pub threshold: f64,
}

impl Default for SolverOptions {
    fn default() -> Self {
        OffsetOptions::default().solver()
    }
}

/// Scalars applied along the tangent and up directions.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct OffsetAmount {
    /// Distance along the tangent.
    pub width: f64,
    /// Distance along the up vector.
    pub depth: f64,
}

impl OffsetAmount {
    /// Construct from explicit values.
    pub fn new(width: f64, depth: f64) -> Self {
        Self { width, depth }
    }
}
