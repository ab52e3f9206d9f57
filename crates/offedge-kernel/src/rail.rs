//! Rail strategies that constrain a vertex's tangent.
//!
//! A rail is a direction the tangent is projected onto (and the up vector
//! made perpendicular to) so offset vertices slide along existing geometry
//! or stay on a symmetry plane. Sources are tried in a fixed order and the
//! first one that yields a rail wins.

use std::collections::HashSet;

use offedge_math::{angle_between, is_zero_vec, normalize_or_zero, reject, Vec3};
use offedge_topo::{EdgeId, EditMesh, VertexId};

use crate::mirror::MirrorPlane;
use crate::options::SolverOptions;

/// Where a rail can come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RailSource {
    /// Loop end on a mirror plane: slide within the plane.
    Mirror,
    /// The single inner edge leaving the vertex.
    Edge,
    /// Crease line between the two adjacent faces.
    Cross,
}

impl RailSource {
    /// Precedence order; the first source producing a rail is used.
    pub const ORDER: [RailSource; 3] = [RailSource::Mirror, RailSource::Edge, RailSource::Cross];

    /// Try this source for one vertex.
    pub fn find(self, site: &RailSite<'_>) -> Option<Rail> {
        match self {
            RailSource::Mirror => {
                if !site.is_end {
                    return None;
                }
                get_mirror_rail(site.mirror_plane?, &site.up)
            }
            RailSource::Edge => {
                let opts = site.options;
                if !opts.edge_rail || (opts.edge_rail_only_end && !site.is_end) {
                    return None;
                }
                get_edge_rail(site.mesh, site.vertex, site.loop_edges).map(Rail::new)
            }
            RailSource::Cross => {
                let (normal_r, normal_l) = (site.normal_right?, site.normal_left?);
                get_cross_rail(
                    &site.tangent,
                    &site.edge_right,
                    &site.edge_left,
                    &normal_r,
                    &normal_l,
                    site.options.threshold,
                )
                .map(Rail::new)
            }
        }
    }
}

/// Everything a rail source may look at for one loop vertex.
#[derive(Debug, Clone)]
pub struct RailSite<'a> {
    /// Mesh being offset.
    pub mesh: &'a EditMesh,
    /// The loop vertex.
    pub vertex: VertexId,
    /// Whether the vertex ends a half loop.
    pub is_end: bool,
    /// Unscaled unit tangent.
    pub tangent: Vec3,
    /// Unscaled unit up vector.
    pub up: Vec3,
    /// Unit direction along the next edge.
    pub edge_right: Vec3,
    /// Unit direction along the previous edge.
    pub edge_left: Vec3,
    /// Normal of the face beside the next edge.
    pub normal_right: Option<Vec3>,
    /// Normal of the face beside the previous edge.
    pub normal_left: Option<Vec3>,
    /// Edges of the loop itself (never rails).
    pub loop_edges: &'a HashSet<EdgeId>,
    /// Mirror plane this vertex is pinned to.
    pub mirror_plane: Option<&'a MirrorPlane>,
    /// Solver options.
    pub options: SolverOptions,
}

/// A chosen rail.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rail {
    /// Rail direction (not necessarily unit length).
    pub direction: Vec3,
    /// Replacement up vector, when the source already corrected it.
    pub up: Option<Vec3>,
}

impl Rail {
    fn new(direction: Vec3) -> Self {
        Self {
            direction,
            up: None,
        }
    }
}

/// First rail produced by [`RailSource::ORDER`].
pub fn select_rail(site: &RailSite<'_>) -> Option<Rail> {
    RailSource::ORDER.iter().find_map(|source| source.find(site))
}

/// Rail within a mirror plane: `up × normal`, with `up` flattened into the
/// plane.
pub fn get_mirror_rail(plane: &MirrorPlane, up: &Vec3) -> Option<Rail> {
    let direction = up.cross(&plane.normal);
    if is_zero_vec(&direction) {
        return None;
    }
    Some(Rail {
        direction,
        up: Some(normalize_or_zero(&reject(up, &plane.normal))),
    })
}

/// Vector of the only visible, non-loop, non-zero-length edge at `vertex`.
///
/// Two or more candidates are ambiguous and yield no rail.
pub fn get_edge_rail(
    mesh: &EditMesh,
    vertex: VertexId,
    loop_edges: &HashSet<EdgeId>,
) -> Option<Vec3> {
    let mut candidates = mesh
        .vertex_edges(vertex)
        .iter()
        .filter(|&&e| !mesh.edges[e].hide && !loop_edges.contains(&e))
        .map(|&e| mesh.edge_vector_from(e, vertex))
        .filter(|vec| !is_zero_vec(vec));
    let rail = candidates.next()?;
    if candidates.next().is_some() {
        return None;
    }
    Some(rail)
}

/// Crease direction between two face normals.
///
/// Accepted only if the faces actually differ and the crease lies within the
/// cone the tangent makes with the two edges.
pub fn get_cross_rail(
    tangent: &Vec3,
    edge_right: &Vec3,
    edge_left: &Vec3,
    normal_right: &Vec3,
    normal_left: &Vec3,
    threshold: f64,
) -> Option<Vec3> {
    if angle_between(normal_right, normal_left) < threshold {
        return None;
    }

    let mut cross = normalize_or_zero(&normal_right.cross(normal_left));
    if cross.dot(tangent) < 0.0 {
        cross = -cross;
    }
    let cos_min = tangent.dot(edge_right).min(tangent.dot(edge_left));
    if tangent.dot(&cross) >= cos_min {
        Some(cross)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use offedge_math::Point3;

    fn x_plane() -> MirrorPlane {
        MirrorPlane {
            point: Point3::origin(),
            normal: Vec3::x(),
            merge_limit: 0.001,
        }
    }

    #[test]
    fn test_mirror_rail() {
        let up = Vec3::new(1.0, 0.0, 1.0).normalize();
        let rail = get_mirror_rail(&x_plane(), &up).unwrap();
        assert_relative_eq!(rail.direction.normalize(), Vec3::y(), epsilon = 1e-12);
        assert_relative_eq!(rail.up.unwrap(), Vec3::z(), epsilon = 1e-12);
    }

    #[test]
    fn test_mirror_rail_parallel_up() {
        assert!(get_mirror_rail(&x_plane(), &Vec3::x()).is_none());
    }

    #[test]
    fn test_edge_rail_single_and_ambiguous() {
        let mut mesh = EditMesh::new();
        let center = mesh.add_vertex(Point3::origin());
        let a = mesh.add_vertex(Point3::new(1.0, 0.0, 0.0));
        let b = mesh.add_vertex(Point3::new(-1.0, 0.0, 0.0));
        let inner = mesh.add_vertex(Point3::new(0.0, -2.0, 0.0));
        let ea = mesh.add_edge(center, a).unwrap();
        let eb = mesh.add_edge(center, b).unwrap();
        mesh.add_edge(center, inner).unwrap();
        let loop_edges: HashSet<EdgeId> = [ea, eb].into_iter().collect();

        assert_eq!(
            get_edge_rail(&mesh, center, &loop_edges),
            Some(Vec3::new(0.0, -2.0, 0.0))
        );

        let second = mesh.add_vertex(Point3::new(0.0, -1.0, 1.0));
        let es = mesh.add_edge(center, second).unwrap();
        assert_eq!(get_edge_rail(&mesh, center, &loop_edges), None);

        mesh.edges[es].hide = true;
        assert!(get_edge_rail(&mesh, center, &loop_edges).is_some());
    }

    #[test]
    fn test_edge_rail_skips_zero_length() {
        let mut mesh = EditMesh::new();
        let center = mesh.add_vertex(Point3::origin());
        let twin = mesh.add_vertex(Point3::origin());
        let inner = mesh.add_vertex(Point3::new(0.0, 0.0, -1.0));
        mesh.add_edge(center, twin).unwrap();
        mesh.add_edge(center, inner).unwrap();
        assert_eq!(
            get_edge_rail(&mesh, center, &HashSet::new()),
            Some(Vec3::new(0.0, 0.0, -1.0))
        );
    }

    #[test]
    fn test_cross_rail_on_crease() {
        // Boundary vertex on the crease between a top face (+Z) and a front
        // face (-Y); the straight tangent already runs along the crease.
        let rail = get_cross_rail(
            &Vec3::x(),
            &Vec3::y(),
            &-Vec3::z(),
            &Vec3::z(),
            &-Vec3::y(),
            1e-4,
        );
        assert_relative_eq!(rail.unwrap(), Vec3::x(), epsilon = 1e-12);

        // Same crease walked the other way: the rail flips to follow.
        let rail = get_cross_rail(
            &-Vec3::x(),
            &-Vec3::z(),
            &Vec3::y(),
            &-Vec3::y(),
            &Vec3::z(),
            1e-4,
        );
        assert_relative_eq!(rail.unwrap(), -Vec3::x(), epsilon = 1e-12);
    }

    #[test]
    fn test_cross_rail_flat_faces() {
        let rail = get_cross_rail(
            &-Vec3::y(),
            &Vec3::x(),
            &-Vec3::x(),
            &Vec3::z(),
            &Vec3::z(),
            1e-4,
        );
        assert!(rail.is_none());
    }

    #[test]
    fn test_cross_rail_outside_cone() {
        // Corner at the origin between edges +X and +Y on a crease whose line
        // is +Z; the tangent bisects the edges, far from the crease.
        let tangent = Vec3::new(1.0, 1.0, 0.0).normalize();
        let rail = get_cross_rail(
            &tangent,
            &Vec3::x(),
            &Vec3::y(),
            &Vec3::x(),
            &Vec3::y(),
            1e-4,
        );
        assert!(rail.is_none());
    }

    #[test]
    fn test_precedence_mirror_first() {
        let mut mesh = EditMesh::new();
        let v = mesh.add_vertex(Point3::origin());
        let inner = mesh.add_vertex(Point3::new(0.0, 0.0, -1.0));
        mesh.add_edge(v, inner).unwrap();
        let loop_edges = HashSet::new();
        let plane = x_plane();
        let site = RailSite {
            mesh: &mesh,
            vertex: v,
            is_end: true,
            tangent: Vec3::new(1.0, 1.0, 0.0).normalize(),
            up: Vec3::z(),
            edge_right: Vec3::y(),
            edge_left: -Vec3::y(),
            normal_right: None,
            normal_left: None,
            loop_edges: &loop_edges,
            mirror_plane: Some(&plane),
            options: SolverOptions {
                edge_rail: true,
                ..Default::default()
            },
        };
        let rail = select_rail(&site).unwrap();
        assert_relative_eq!(rail.direction, Vec3::y(), epsilon = 1e-12);

        let interior = RailSite {
            is_end: false,
            ..site.clone()
        };
        let rail = select_rail(&interior).unwrap();
        assert_eq!(rail.direction, Vec3::new(0.0, 0.0, -1.0));

        let only_end = RailSite {
            options: SolverOptions {
                edge_rail: true,
                edge_rail_only_end: true,
                ..Default::default()
            },
            ..interior
        };
        assert!(select_rail(&only_end).is_none());
    }
}
