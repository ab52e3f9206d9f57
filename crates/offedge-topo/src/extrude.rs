//! Edge-only extrusion.

use std::collections::HashMap;

use crate::{EdgeId, EditMesh, FaceId, Result, TopoError, VertexId};

/// Geometry created by [`EditMesh::extrude_edges`].
#[derive(Debug, Clone, Default)]
pub struct ExtrudedGeometry {
    /// New vertices, one per distinct endpoint of the input edges.
    pub verts: Vec<VertexId>,
    /// New edges, one per input edge, joining the new vertices.
    pub edges: Vec<EdgeId>,
    /// New quad faces, one per input edge.
    pub faces: Vec<FaceId>,
    /// Edges joining each original vertex to its copy.
    pub side_edges: Vec<EdgeId>,
    /// Original vertex → its copy.
    pub vertex_map: HashMap<VertexId, VertexId>,
}

impl EditMesh {
    /// Extrude `edges` into a strip of quads.
    ///
    /// Each endpoint is duplicated once, each edge gets a parallel copy, and
    /// each original/copy pair is bridged by a quad. The quad winding runs
    /// against the edge's first adjacent face so the strip continues that
    /// face's orientation. The copies sit exactly on the originals; callers
    /// move them afterwards.
    pub fn extrude_edges(&mut self, edges: &[EdgeId]) -> Result<ExtrudedGeometry> {
        if edges.iter().any(|&e| !self.edges.contains_key(e)) {
            return Err(TopoError::UnknownEdge);
        }

        let mut geom = ExtrudedGeometry::default();

        for &e in edges {
            let [mut a, mut b] = self.edges[e].verts;
            if let Some(&f) = self.edge_faces(e).first() {
                // The face walks a -> b; the new quad must walk b -> a.
                if self.faces[f].prev_vertex(b) == Some(a) {
                    std::mem::swap(&mut a, &mut b);
                }
            }

            let a_new = self.duplicate_vertex(a, &mut geom)?;
            let b_new = self.duplicate_vertex(b, &mut geom)?;

            geom.edges.push(self.add_edge(a_new, b_new)?);
            geom.faces.push(self.add_face(&[a, b, b_new, a_new])?);
        }

        Ok(geom)
    }

    fn duplicate_vertex(&mut self, v: VertexId, geom: &mut ExtrudedGeometry) -> Result<VertexId> {
        if let Some(&copy) = geom.vertex_map.get(&v) {
            return Ok(copy);
        }
        let copy = self.add_vertex(self.vertices[v].point);
        geom.verts.push(copy);
        geom.vertex_map.insert(v, copy);
        geom.side_edges.push(self.add_edge(v, copy)?);
        Ok(copy)
    }
}
