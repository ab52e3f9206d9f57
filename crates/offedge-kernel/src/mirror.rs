//! Mirror-plane resolution for merge-enabled mirror modifiers.

use std::collections::{BTreeSet, HashMap};

use offedge_math::{Point3, Transform, Vec3};
use offedge_topo::{EdgeId, EditMesh, VertexId};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{OffsetError, Result};

/// A mirror modifier as configured on the edited object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MirrorModifier {
    /// Vertices within `merge_threshold` of the plane are welded.
    pub use_mirror_merge: bool,
    /// Weld distance.
    pub merge_threshold: f64,
    /// Mirror across the local X axis.
    pub use_x: bool,
    /// Mirror across the local Y axis.
    pub use_y: bool,
    /// Mirror across the local Z axis.
    pub use_z: bool,
    /// World matrix of the object whose frame defines the mirror planes.
    /// `None` mirrors about the edited object's own origin.
    pub mirror_object: Option<Transform>,
}

impl Default for MirrorModifier {
    fn default() -> Self {
        Self {
            use_mirror_merge: true,
            merge_threshold: 0.001,
            use_x: true,
            use_y: false,
            use_z: false,
            mirror_object: None,
        }
    }
}

/// The object being edited: its world matrix and modifier stack.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditObject {
    /// Object world matrix.
    pub matrix_world: Transform,
    /// Mirror modifiers, in stack order.
    pub modifiers: Vec<MirrorModifier>,
}

/// A symmetry plane in object space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MirrorPlane {
    /// A point on the plane.
    pub point: Point3,
    /// Unit plane normal.
    pub normal: Vec3,
    /// Vertices closer than this are on the plane.
    pub merge_limit: f64,
}

impl MirrorPlane {
    /// Unsigned distance from `p` to the plane.
    pub fn distance(&self, p: &Point3) -> f64 {
        self.normal.dot(&(p - self.point)).abs()
    }

    /// Whether `p` lies on the plane within the merge limit.
    pub fn contains(&self, p: &Point3) -> bool {
        self.distance(p) <= self.merge_limit
    }
}

/// Mirror planes of every merge-enabled modifier, in object space.
pub fn collect_mirror_planes(object: &EditObject) -> Vec<MirrorPlane> {
    let mut planes = Vec::new();

    for modifier in object.modifiers.iter().filter(|m| m.use_mirror_merge) {
        let (point, normals) = match &modifier.mirror_object {
            None => (Point3::origin(), [Vec3::x(), Vec3::y(), Vec3::z()]),
            Some(mirror_world) => {
                let Some(world_inv) = object.matrix_world.inverse() else {
                    warn!("Object matrix is singular; skipping mirror modifier");
                    continue;
                };
                let local = world_inv.then(mirror_world);
                let Some(normals) = local.plane_normals() else {
                    warn!("Mirror object matrix is singular; skipping mirror modifier");
                    continue;
                };
                (local.translation_part(), normals)
            }
        };

        let axes = [modifier.use_x, modifier.use_y, modifier.use_z];
        for (normal, _) in normals.iter().zip(axes).filter(|(_, used)| *used) {
            planes.push(MirrorPlane {
                point,
                normal: *normal,
                merge_limit: modifier.merge_threshold,
            });
        }
    }

    debug!("Collected {} mirror planes", planes.len());
    planes
}

/// Boundary edges after mirror filtering, plus the vertices pinned to a plane.
#[derive(Debug, Clone, Default)]
pub struct MirrorResolution {
    /// Edges still to be offset.
    pub edges: BTreeSet<EdgeId>,
    /// Vertices lying on exactly one mirror plane.
    pub mirror_verts: HashMap<VertexId, MirrorPlane>,
}

/// Drop edges lying on a mirror plane and record vertices that touch one.
///
/// An edge is dropped when both endpoints are on the same plane. A vertex is
/// recorded when it is on exactly one plane; vertices on two or more planes
/// (on the intersection line) are left free.
///
/// # Errors
///
/// [`OffsetError::AllEdgesMirrored`] when no edge survives.
pub fn resolve_mirror(
    mesh: &EditMesh,
    edges: &BTreeSet<EdgeId>,
    planes: &[MirrorPlane],
) -> Result<MirrorResolution> {
    let planes_of = |v: VertexId| -> Vec<usize> {
        let p = mesh.vertices[v].point;
        (0..planes.len()).filter(|&i| planes[i].contains(&p)).collect()
    };

    let mut resolution = MirrorResolution::default();
    for &e in edges {
        let [a, b] = mesh.edges[e].verts;
        let on_a = planes_of(a);
        let on_b = planes_of(b);

        for (v, on) in [(a, &on_a), (b, &on_b)] {
            if let [only] = on.as_slice() {
                resolution.mirror_verts.insert(v, planes[*only]);
            }
        }

        if !on_a.iter().any(|i| on_b.contains(i)) {
            resolution.edges.insert(e);
        }
    }

    if resolution.edges.is_empty() {
        return Err(OffsetError::AllEdgesMirrored);
    }

    debug!(
        "Mirror filter kept {} of {} edges, {} vertices pinned",
        resolution.edges.len(),
        edges.len(),
        resolution.mirror_verts.len()
    );
    Ok(resolution)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_planes_without_mirror_object() {
        let object = EditObject {
            modifiers: vec![MirrorModifier {
                use_y: true,
                ..Default::default()
            }],
            ..Default::default()
        };
        let planes = collect_mirror_planes(&object);
        assert_eq!(planes.len(), 2);
        assert_eq!(planes[0].normal, Vec3::x());
        assert_eq!(planes[1].normal, Vec3::y());
        assert_eq!(planes[0].point, Point3::origin());
    }

    #[test]
    fn test_merge_disabled_skipped() {
        let object = EditObject {
            modifiers: vec![MirrorModifier {
                use_mirror_merge: false,
                ..Default::default()
            }],
            ..Default::default()
        };
        assert!(collect_mirror_planes(&object).is_empty());
    }

    #[test]
    fn test_planes_with_mirror_object() {
        let object = EditObject {
            matrix_world: Transform::from([
                [1.0, 0.0, 0.0, 1.0],
                [0.0, 1.0, 0.0, 0.0],
                [0.0, 0.0, 1.0, 0.0],
                [0.0, 0.0, 0.0, 1.0],
            ]),
            modifiers: vec![MirrorModifier {
                // Quarter turn about Z, placed at (3, 2, 0).
                mirror_object: Some(Transform::from([
                    [0.0, -1.0, 0.0, 3.0],
                    [1.0, 0.0, 0.0, 2.0],
                    [0.0, 0.0, 1.0, 0.0],
                    [0.0, 0.0, 0.0, 1.0],
                ])),
                ..Default::default()
            }],
        };
        let planes = collect_mirror_planes(&object);
        assert_eq!(planes.len(), 1);
        assert_relative_eq!(planes[0].point, Point3::new(2.0, 2.0, 0.0), epsilon = 1e-12);
        assert_relative_eq!(planes[0].normal, Vec3::y(), epsilon = 1e-12);
    }

    fn strip() -> (EditMesh, Vec<VertexId>, BTreeSet<EdgeId>) {
        // (0,1) - (1,1) - (1,0) - (0,0), with the last edge on the X plane.
        let mut mesh = EditMesh::new();
        let v: Vec<VertexId> = [[0.0, 1.0], [1.0, 1.0], [1.0, 0.0], [0.0, 0.0]]
            .iter()
            .map(|c| mesh.add_vertex(Point3::new(c[0], c[1], 0.0)))
            .collect();
        let mut edges = BTreeSet::new();
        for i in 0..3 {
            edges.insert(mesh.add_edge(v[i], v[i + 1]).unwrap());
        }
        (mesh, v, edges)
    }

    fn x_plane() -> MirrorPlane {
        MirrorPlane {
            point: Point3::origin(),
            normal: Vec3::x(),
            merge_limit: 0.001,
        }
    }

    #[test]
    fn test_endpoints_pinned() {
        let (mesh, v, edges) = strip();
        let res = resolve_mirror(&mesh, &edges, &[x_plane()]).unwrap();
        assert_eq!(res.edges.len(), 3);
        assert_eq!(res.mirror_verts.len(), 2);
        assert!(res.mirror_verts.contains_key(&v[0]));
        assert!(res.mirror_verts.contains_key(&v[3]));
    }

    #[test]
    fn test_edge_on_plane_removed() {
        let (mut mesh, v, mut edges) = strip();
        let seam = mesh.add_edge(v[3], v[0]).unwrap();
        edges.insert(seam);
        let res = resolve_mirror(&mesh, &edges, &[x_plane()]).unwrap();
        assert!(!res.edges.contains(&seam));
        assert_eq!(res.edges.len(), 3);
    }

    #[test]
    fn test_vertex_on_two_planes_is_free() {
        let (mesh, v, edges) = strip();
        let y_plane = MirrorPlane {
            normal: Vec3::y(),
            ..x_plane()
        };
        let res = resolve_mirror(&mesh, &edges, &[x_plane(), y_plane]).unwrap();
        // (0,0) sits on both planes, (0,1) only on X.
        assert!(!res.mirror_verts.contains_key(&v[3]));
        assert_eq!(res.mirror_verts[&v[0]].normal, Vec3::x());
        // (1,0)-(0,0) lies on the Y plane.
        assert_eq!(res.edges.len(), 2);
    }

    #[test]
    fn test_all_edges_mirrored() {
        let mut mesh = EditMesh::new();
        let a = mesh.add_vertex(Point3::new(0.0, 0.0, 0.0));
        let b = mesh.add_vertex(Point3::new(0.0, 1.0, 0.0));
        let edges: BTreeSet<EdgeId> = [mesh.add_edge(a, b).unwrap()].into_iter().collect();
        assert_eq!(
            resolve_mirror(&mesh, &edges, &[x_plane()]).unwrap_err(),
            OffsetError::AllEdgesMirrored
        );
    }
}
