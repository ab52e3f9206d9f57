//! Applying solved directions to the mesh.

use offedge_topo::{EdgeId, EditMesh, FaceId, VertexId};

use crate::directions::LoopDirections;
use crate::options::{GeometryMode, OffsetAmount};
use crate::Result;

/// Elements touched by [`apply_offset`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppliedOffset {
    /// Vertices that were displaced.
    pub moved_verts: Vec<VertexId>,
    /// Edges created (copies, plus side edges in extrude mode).
    pub new_edges: Vec<EdgeId>,
    /// Faces created (extrude mode only).
    pub new_faces: Vec<FaceId>,
}

/// Displace loop vertices, extruding first unless `mode` is
/// [`GeometryMode::Move`].
///
/// `edges_orig` are the boundary edges the loops were built from; they are
/// the ones extruded. Afterwards no face is selected, the displaced boundary
/// is the edge selection and vertex selection follows the edges.
pub fn apply_offset(
    mesh: &mut EditMesh,
    mode: GeometryMode,
    amount: OffsetAmount,
    loops: &[LoopDirections],
    edges_orig: &[EdgeId],
) -> Result<AppliedOffset> {
    let mut applied = AppliedOffset::default();

    let geom = match mode {
        GeometryMode::Move => None,
        GeometryMode::Offset | GeometryMode::Extrude => Some(mesh.extrude_edges(edges_orig)?),
    };

    for lp in loops {
        for (&v, dir) in lp.verts.iter().zip(&lp.directions) {
            let target = match &geom {
                Some(geom) => match geom.vertex_map.get(&v) {
                    Some(&copy) => copy,
                    None => continue,
                },
                None => v,
            };
            let origin = mesh.vertices[v].point;
            mesh.vertices[target].point = origin + dir.displacement(amount.width, amount.depth);
            applied.moved_verts.push(target);
        }
    }

    mesh.deselect_all_faces();

    match geom {
        None => {
            for &e in edges_orig {
                mesh.edges[e].select = true;
            }
        }
        Some(geom) => {
            for &e in edges_orig {
                mesh.edges[e].select = false;
            }
            for &e in &geom.edges {
                mesh.edges[e].select = true;
            }
            applied.new_edges.extend_from_slice(&geom.edges);

            if mode == GeometryMode::Offset {
                mesh.delete_edges_and_faces(&geom.side_edges, &geom.faces);
            } else {
                applied.new_edges.extend_from_slice(&geom.side_edges);
                applied.new_faces = geom.faces;
            }
        }
    }

    mesh.flush_vertex_selection();
    Ok(applied)
}
