#![warn(missing_docs)]

//! Edge-loop offset engine.
//!
//! Takes the boundary of the current edge selection, chains it into loops,
//! solves a lateral (width) and perpendicular (depth) direction for every
//! loop vertex, and moves, extrudes or offsets the loops by those
//! directions. Corners are scaled so the perpendicular distance of each
//! offset edge stays equal to the requested width.
//!
//! The one-shot entry point is [`offset_edges`]. Interactive callers keep an
//! [`OffsetSession`] (or the pointer-driven [`Interaction`]) alive so the
//! direction solve is cached while only the amount changes.
//!
//! # Example
//!
//! ```
//! use offedge_kernel::{offset_edges, EditObject, GeometryMode, OffsetOptions};
//! use offedge_topo::MeshData;
//!
//! let json = r#"{
//!     "vertices": [
//!         {"co": [0, 0, 0]}, {"co": [1, 0, 0]}, {"co": [1, 1, 0]}, {"co": [0, 1, 0]}
//!     ],
//!     "edges": [
//!         {"verts": [0, 1], "select": true}, {"verts": [1, 2], "select": true},
//!         {"verts": [2, 3], "select": true}, {"verts": [3, 0], "select": true}
//!     ]
//! }"#;
//! let mut mesh = MeshData::from_json(json).unwrap();
//! let options = OffsetOptions {
//!     geometry_mode: GeometryMode::Move,
//!     width: 0.1,
//!     ..Default::default()
//! };
//! let report = offset_edges(&mut mesh, &EditObject::default(), &options).unwrap();
//! assert_eq!(report.loops, 1);
//! assert!((mesh.vertices[0].co[0] + 0.1).abs() < 1e-12);
//! ```

pub mod apply;
pub mod corner;
pub mod directions;
mod error;
pub mod loops;
pub mod mirror;
pub mod options;
pub mod rail;
mod session;

pub use apply::{apply_offset, AppliedOffset};
pub use corner::CornerType;
pub use directions::{LoopDirections, OffsetDirection, SolverContext};
pub use error::{OffsetError, Result};
pub use loops::EdgeLoop;
pub use mirror::{EditObject, MirrorModifier, MirrorPlane};
pub use options::{DepthMode, GeometryMode, OffsetAmount, OffsetOptions, SolverOptions};
pub use session::{Interaction, InteractionStatus, OffsetSession, PointerEvent};

use std::time::Instant;

use offedge_topo::{EdgeId, EditMesh, MeshData};
use tracing::info;

/// Loops and directions solved for one selection, ready to be applied to
/// any clone of the mesh they were solved on.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OffsetPlan {
    /// Solved loops; degenerate loops are already dropped.
    pub loops: Vec<LoopDirections>,
    /// Boundary edges the loops were built from.
    pub edges_orig: Vec<EdgeId>,
}

/// Counts describing an applied offset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OffsetReport {
    /// Loops offset.
    pub loops: usize,
    /// Vertices displaced.
    pub moved_verts: usize,
    /// Edges created.
    pub new_edges: usize,
    /// Faces created.
    pub new_faces: usize,
}

/// Collect the boundary loops of the selection and solve their directions.
///
/// The mesh is only read.
///
/// # Errors
///
/// - [`OffsetError::NoEdgesSelected`] when no selected edge is on the
///   selection boundary.
/// - [`OffsetError::AllEdgesMirrored`] when mirror handling removes every edge.
/// - [`OffsetError::OverlapDetected`] when the edges branch.
pub fn plan_offset(
    mesh: &EditMesh,
    object: &EditObject,
    options: &OffsetOptions,
) -> Result<OffsetPlan> {
    let start = Instant::now();

    let mut edges = loops::collect_edges(mesh).ok_or(OffsetError::NoEdgesSelected)?;

    let mut mirror_verts = None;
    if options.mirror_modifier {
        let planes = mirror::collect_mirror_planes(object);
        if !planes.is_empty() {
            let resolution = mirror::resolve_mirror(mesh, &edges, &planes)?;
            edges = resolution.edges;
            mirror_verts = Some(resolution.mirror_verts);
        }
    }

    let edge_loops = loops::collect_loops(mesh, &edges)?;

    let mut ctx = SolverContext::new(options.solver());
    if let Some(map) = &mirror_verts {
        ctx = ctx.with_mirror_verts(map);
    }
    let solved = directions::solve_directions(mesh, &edge_loops, &ctx);

    info!(
        "Offset prepare: {} loops from {} edges in {:?}",
        solved.len(),
        edges.len(),
        start.elapsed()
    );

    Ok(OffsetPlan {
        loops: solved,
        edges_orig: edges.into_iter().collect(),
    })
}

impl OffsetPlan {
    /// Apply this plan to `mesh` with the given mode and amount.
    pub fn apply(
        &self,
        mesh: &mut EditMesh,
        mode: GeometryMode,
        amount: OffsetAmount,
    ) -> Result<OffsetReport> {
        let start = Instant::now();
        let applied = apply_offset(mesh, mode, amount, &self.loops, &self.edges_orig)?;
        info!(
            "Offset apply: {:?} width {:.4} depth {:.4} in {:?}",
            mode,
            amount.width,
            amount.depth,
            start.elapsed()
        );
        Ok(OffsetReport {
            loops: self.loops.len(),
            moved_verts: applied.moved_verts.len(),
            new_edges: applied.new_edges.len(),
            new_faces: applied.new_faces.len(),
        })
    }
}

/// Offset the selected edge loops of `host` in one shot.
///
/// `host` is only replaced when the whole operation succeeds.
pub fn offset_edges(
    host: &mut MeshData,
    object: &EditObject,
    options: &OffsetOptions,
) -> Result<OffsetReport> {
    let mut mesh = EditMesh::from_data(host)?;
    let plan = plan_offset(&mesh, object, options)?;
    let report = plan.apply(&mut mesh, options.geometry_mode, options.amount())?;
    *host = mesh.to_data();
    Ok(report)
}
