//! Per-vertex offset directions for edge loops.
//!
//! For every loop vertex the solver derives a tangent (the width axis) and
//! an up vector (the depth axis), both pre-scaled so that moving the vertex
//! by `width * tangent + depth * up` keeps the perpendicular offset distance
//! uniform around corners.

use std::collections::{HashMap, HashSet};

use offedge_math::{is_zero_vec, newell_normal, normalize_or_zero, project, reject, Point3, Vec3};
use offedge_topo::{EdgeId, EditMesh, FaceId, VertexId};
use tracing::debug;

use crate::corner::{calc_tangent, get_factor};
use crate::loops::EdgeLoop;
use crate::mirror::MirrorPlane;
use crate::options::SolverOptions;
use crate::rail::{select_rail, RailSite};

/// Scaled displacement axes of one vertex.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OffsetDirection {
    /// Width axis, scaled by the corner factor. Zero at folding corners.
    pub tangent: Vec3,
    /// Depth axis, scaled by the corner factor.
    pub up: Vec3,
}

impl OffsetDirection {
    /// Displacement for the given width and depth.
    pub fn displacement(&self, width: f64, depth: f64) -> Vec3 {
        self.tangent * width + self.up * depth
    }
}

/// Directions for every vertex of one loop.
///
/// Closed loops list each vertex once.
#[derive(Debug, Clone, PartialEq)]
pub struct LoopDirections {
    /// Loop vertices in solved order.
    pub verts: Vec<VertexId>,
    /// `directions[i]` belongs to `verts[i]`.
    pub directions: Vec<OffsetDirection>,
}

/// Inputs shared by all loops of one offset.
#[derive(Debug, Clone)]
pub struct SolverContext<'a> {
    /// Reference used to give disconnected loops a consistent winding.
    pub upward: Vec3,
    /// Normal used when a loop's own normal is degenerate.
    pub normal_fallback: Vec3,
    /// Loop-end vertices pinned to a mirror plane.
    pub mirror_verts: Option<&'a HashMap<VertexId, MirrorPlane>>,
    /// Solver options.
    pub options: SolverOptions,
}

impl<'a> SolverContext<'a> {
    /// Context with the default upward reference `(1, 1, 1)` and `+Z`
    /// fallback normal.
    pub fn new(options: SolverOptions) -> Self {
        Self {
            upward: Vec3::new(1.0, 1.0, 1.0).normalize(),
            normal_fallback: Vec3::z(),
            mirror_verts: None,
            options,
        }
    }

    /// Attach the mirror vertex map.
    pub fn with_mirror_verts(mut self, mirror_verts: &'a HashMap<VertexId, MirrorPlane>) -> Self {
        self.mirror_verts = Some(mirror_verts);
        self
    }
}

/// Solve every loop, silently dropping loops of zero length.
pub fn solve_directions(
    mesh: &EditMesh,
    loops: &[EdgeLoop],
    ctx: &SolverContext<'_>,
) -> Vec<LoopDirections> {
    loops
        .iter()
        .filter_map(|lp| {
            let solved = solve_loop(mesh, lp, ctx);
            if solved.is_none() {
                debug!("Dropping zero-length loop of {} edges", lp.edges.len());
            }
            solved
        })
        .collect()
}

/// Solve one loop. Returns `None` when every edge has zero length.
pub fn solve_loop(mesh: &EditMesh, lp: &EdgeLoop, ctx: &SolverContext<'_>) -> Option<LoopDirections> {
    let opts = ctx.options;
    let mut lp = lp.clone();
    let mut normal = loop_normal(mesh, &lp, &ctx.normal_fallback);

    if normal.dot(&ctx.upward) < 0.0 {
        lp.reverse();
        normal = -normal;
    }

    let faces = if opts.follow_face {
        adjacent_faces(mesh, &lp.edges).map(|mut faces| {
            align_to_faces(mesh, &mut lp, &mut normal, &mut faces);
            faces
        })
    } else {
        None
    };

    let vec_edges: Vec<Vec3> = lp
        .edges
        .iter()
        .zip(&lp.verts)
        .map(|(&e, &v)| normalize_or_zero(&mesh.edge_vector_from(e, v)))
        .collect();

    let half_loop = !lp.is_closed();
    let loop_edges: HashSet<EdgeId> = lp.edges.iter().copied().collect();
    let mut verts = lp.verts;
    if !half_loop {
        verts.pop();
    }

    let n = verts.len();
    let mut directions = Vec::with_capacity(n);
    for (i, &v) in verts.iter().enumerate() {
        let is_end = half_loop && (i == 0 || i == n - 1);
        let (ix_r, ix_l) = adjacent_indices(i, &vec_edges, half_loop)?;
        let edge_r = vec_edges[ix_r];
        let edge_l = -vec_edges[ix_l];

        let face_normal = |ix: usize| {
            faces
                .as_ref()
                .and_then(|faces| faces[ix])
                .map(|f| mesh.face_normal(f))
        };
        let normal_r = face_normal(ix_r);
        let normal_l = face_normal(ix_l);
        let mut up = up_vector(&normal, normal_r, normal_l);
        let mut tangent = calc_tangent(&up, &edge_r, &edge_l, opts.threshold);

        if !is_zero_vec(&tangent) {
            let site = RailSite {
                mesh,
                vertex: v,
                is_end,
                tangent,
                up,
                edge_right: edge_r,
                edge_left: edge_l,
                normal_right: normal_r,
                normal_left: normal_l,
                loop_edges: &loop_edges,
                mirror_plane: ctx.mirror_verts.and_then(|m| m.get(&v)),
                options: opts,
            };
            if let Some(rail) = select_rail(&site) {
                if let Some(corrected) = rail.up {
                    up = corrected;
                }
                tangent = normalize_or_zero(&project(&tangent, &rail.direction));
                up = normalize_or_zero(&reject(&up, &rail.direction));
            }
        }

        directions.push(OffsetDirection {
            tangent: tangent * get_factor(&tangent, &edge_r, &edge_l),
            up: up * get_factor(&up, &edge_r, &edge_l),
        });
    }

    Some(LoopDirections { verts, directions })
}

/// Unit loop normal by Newell's method, or `fallback` for a degenerate loop.
///
/// Half loops are closed implicitly from their last vertex to their first.
pub fn loop_normal(mesh: &EditMesh, lp: &EdgeLoop, fallback: &Vec3) -> Vec3 {
    let ring = if lp.is_closed() {
        &lp.verts[..lp.verts.len() - 1]
    } else {
        &lp.verts[..]
    };
    let points: Vec<Point3> = ring.iter().map(|&v| mesh.vertices[v].point).collect();
    let normal = normalize_or_zero(&newell_normal(&points));
    if is_zero_vec(&normal) {
        *fallback
    } else {
        normal
    }
}

/// Indices of the nearest non-zero edges to the right and left of vertex `i`.
///
/// Closed loops wrap around; half loops stop at their ends, where the
/// missing side reuses the other. `None` means every edge is zero.
pub fn adjacent_indices(i: usize, vec_edges: &[Vec3], half_loop: bool) -> Option<(usize, usize)> {
    let len = vec_edges.len();
    let nonzero = |ix: &usize| !is_zero_vec(&vec_edges[*ix]);

    let (right, left) = if half_loop {
        (
            (i..len).find(nonzero),
            (0..i.min(len)).rev().find(nonzero),
        )
    } else {
        (
            (0..len).map(|k| (i + k) % len).find(nonzero),
            (1..=len).map(|k| (i + len - k % len) % len).find(nonzero),
        )
    };

    match (right, left) {
        (Some(r), Some(l)) => Some((r, l)),
        (Some(r), None) if half_loop => Some((r, r)),
        (None, Some(l)) if half_loop => Some((l, l)),
        _ => None,
    }
}

/// One usable face per loop edge, preferring selected faces.
///
/// `None` when no loop edge has a visible, non-degenerate face.
fn adjacent_faces(mesh: &EditMesh, edges: &[EdgeId]) -> Option<Vec<Option<FaceId>>> {
    let faces: Vec<Option<FaceId>> = edges
        .iter()
        .map(|&e| {
            let usable = mesh
                .edge_faces(e)
                .iter()
                .copied()
                .filter(|&f| !mesh.faces[f].hide && !is_zero_vec(&mesh.face_normal(f)));
            let mut chosen = None;
            for f in usable {
                chosen = Some(f);
                if mesh.faces[f].select {
                    break;
                }
            }
            chosen
        })
        .collect();

    if faces.iter().any(Option::is_some) {
        Some(faces)
    } else {
        None
    }
}

/// Walk the loop in the winding of its first adjacent face and give the loop
/// normal that face's side.
fn align_to_faces(
    mesh: &EditMesh,
    lp: &mut EdgeLoop,
    normal: &mut Vec3,
    faces: &mut [Option<FaceId>],
) {
    let Some((i, f)) = faces
        .iter()
        .enumerate()
        .find_map(|(i, f)| f.map(|f| (i, f)))
    else {
        return;
    };

    let (v1, v2) = (lp.verts[i], lp.verts[i + 1]);
    if mesh.faces[f].prev_vertex(v1) == Some(v2) {
        lp.reverse();
        faces.reverse();
    }
    if normal.dot(&mesh.face_normal(f)) < 0.0 {
        *normal = -*normal;
    }
}

fn up_vector(loop_normal: &Vec3, normal_r: Option<Vec3>, normal_l: Option<Vec3>) -> Vec3 {
    match (normal_r, normal_l) {
        (Some(r), Some(l)) => {
            let up = normalize_or_zero(&(r + l));
            if is_zero_vec(&up) {
                *loop_normal
            } else {
                up
            }
        }
        (Some(n), None) | (None, Some(n)) => n,
        (None, None) => *loop_normal,
    }
}
