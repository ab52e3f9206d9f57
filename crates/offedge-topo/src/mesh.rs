//! The editable mesh and its adjacency queries.

use offedge_math::{newell_normal, normalize_or_zero, Point3, Vec3};
use slotmap::SlotMap;

use crate::{EdgeId, FaceId, Result, TopoError, VertexId};

/// A mesh vertex.
#[derive(Debug, Clone, PartialEq)]
pub struct Vertex {
    /// Position in object space.
    pub point: Point3,
    /// Selection flag.
    pub select: bool,
    /// Hidden flag.
    pub hide: bool,
    edges: Vec<EdgeId>,
}

/// An undirected mesh edge.
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    /// The two endpoints, in creation order.
    pub verts: [VertexId; 2],
    /// Selection flag.
    pub select: bool,
    /// Hidden flag.
    pub hide: bool,
    faces: Vec<FaceId>,
}

/// A polygon face.
#[derive(Debug, Clone, PartialEq)]
pub struct Face {
    /// Vertex ring in winding order.
    pub verts: Vec<VertexId>,
    /// `edges[i]` joins `verts[i]` and `verts[i + 1]` (cyclic).
    pub edges: Vec<EdgeId>,
    /// Selection flag.
    pub select: bool,
    /// Hidden flag.
    pub hide: bool,
}

impl Face {
    /// Vertex preceding `v` in the face ring.
    pub fn prev_vertex(&self, v: VertexId) -> Option<VertexId> {
        let n = self.verts.len();
        let i = self.verts.iter().position(|&x| x == v)?;
        Some(self.verts[(i + n - 1) % n])
    }
}

/// Editable vertex/edge/face topology.
///
/// Cloning is a plain data copy and keeps every element id valid in the
/// clone, which is what lets cached per-vertex results be replayed against a
/// fresh copy.
#[derive(Debug, Clone, Default)]
pub struct EditMesh {
    /// All vertices.
    pub vertices: SlotMap<VertexId, Vertex>,
    /// All edges.
    pub edges: SlotMap<EdgeId, Edge>,
    /// All faces.
    pub faces: SlotMap<FaceId, Face>,
}

impl EditMesh {
    /// Create an empty mesh.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an isolated vertex.
    pub fn add_vertex(&mut self, point: Point3) -> VertexId {
        self.vertices.insert(Vertex {
            point,
            select: false,
            hide: false,
            edges: Vec::new(),
        })
    }

    /// Add an edge between `a` and `b`, or return the existing one.
    pub fn add_edge(&mut self, a: VertexId, b: VertexId) -> Result<EdgeId> {
        if !self.vertices.contains_key(a) || !self.vertices.contains_key(b) {
            return Err(TopoError::UnknownVertex);
        }
        if a == b {
            return Err(TopoError::DegenerateEdge);
        }
        if let Some(e) = self.edge_between(a, b) {
            return Ok(e);
        }
        let e = self.edges.insert(Edge {
            verts: [a, b],
            select: false,
            hide: false,
            faces: Vec::new(),
        });
        self.vertices[a].edges.push(e);
        self.vertices[b].edges.push(e);
        Ok(e)
    }

    /// Add a face over a vertex ring, creating any missing boundary edges.
    pub fn add_face(&mut self, verts: &[VertexId]) -> Result<FaceId> {
        let n = verts.len();
        if n < 3 {
            return Err(TopoError::DegenerateFace);
        }
        let mut edges = Vec::with_capacity(n);
        for i in 0..n {
            edges.push(self.add_edge(verts[i], verts[(i + 1) % n])?);
        }
        let f = self.faces.insert(Face {
            verts: verts.to_vec(),
            edges: edges.clone(),
            select: false,
            hide: false,
        });
        for e in edges {
            self.edges[e].faces.push(f);
        }
        Ok(f)
    }

    /// The edge joining `a` and `b`, if any.
    pub fn edge_between(&self, a: VertexId, b: VertexId) -> Option<EdgeId> {
        self.vertices.get(a)?.edges.iter().copied().find(|&e| {
            let [x, y] = self.edges[e].verts;
            (x == a && y == b) || (x == b && y == a)
        })
    }

    /// Edges incident to `v`.
    pub fn vertex_edges(&self, v: VertexId) -> &[EdgeId] {
        self.vertices
            .get(v)
            .map(|vert| vert.edges.as_slice())
            .unwrap_or(&[])
    }

    /// Faces using edge `e`.
    pub fn edge_faces(&self, e: EdgeId) -> &[FaceId] {
        self.edges
            .get(e)
            .map(|edge| edge.faces.as_slice())
            .unwrap_or(&[])
    }

    /// Endpoint of `e` opposite to `v`.
    pub fn other_vertex(&self, e: EdgeId, v: VertexId) -> VertexId {
        let [a, b] = self.edges[e].verts;
        if a == v {
            b
        } else {
            a
        }
    }

    /// Vector from `v` to the other endpoint of `e`.
    pub fn edge_vector_from(&self, e: EdgeId, v: VertexId) -> Vec3 {
        let other = self.other_vertex(e, v);
        self.vertices[other].point - self.vertices[v].point
    }

    /// Unit face normal from the current vertex positions.
    ///
    /// Zero for collapsed faces.
    pub fn face_normal(&self, f: FaceId) -> Vec3 {
        let points: Vec<Point3> = self.faces[f]
            .verts
            .iter()
            .map(|&v| self.vertices[v].point)
            .collect();
        normalize_or_zero(&newell_normal(&points))
    }

    /// Clear the selection flag on every face.
    pub fn deselect_all_faces(&mut self) {
        for face in self.faces.values_mut() {
            face.select = false;
        }
    }

    /// Set each vertex's selection from its incident edges.
    pub fn flush_vertex_selection(&mut self) {
        let selected: Vec<(VertexId, bool)> = self
            .vertices
            .iter()
            .map(|(v, vert)| (v, vert.edges.iter().any(|&e| self.edges[e].select)))
            .collect();
        for (v, select) in selected {
            self.vertices[v].select = select;
        }
    }

    /// Remove `faces`, every face using one of `edges`, then `edges`
    /// themselves. Endpoints of removed edges that are left without any edge
    /// are removed as well.
    pub fn delete_edges_and_faces(&mut self, edges: &[EdgeId], faces: &[FaceId]) {
        let mut doomed_faces: Vec<FaceId> = faces.to_vec();
        for &e in edges {
            doomed_faces.extend(self.edge_faces(e).iter().copied());
        }
        doomed_faces.sort();
        doomed_faces.dedup();

        for f in doomed_faces {
            if let Some(face) = self.faces.remove(f) {
                for e in face.edges {
                    if let Some(edge) = self.edges.get_mut(e) {
                        edge.faces.retain(|&x| x != f);
                    }
                }
            }
        }

        let mut touched = Vec::new();
        for &e in edges {
            if let Some(edge) = self.edges.remove(e) {
                for v in edge.verts {
                    if let Some(vert) = self.vertices.get_mut(v) {
                        vert.edges.retain(|&x| x != e);
                        touched.push(v);
                    }
                }
            }
        }

        for v in touched {
            if self.vertices.get(v).is_some_and(|vert| vert.edges.is_empty()) {
                self.vertices.remove(v);
            }
        }
    }
}
