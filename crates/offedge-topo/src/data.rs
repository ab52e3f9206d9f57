//! Flat, index-based mesh storage and conversion to/from [`EditMesh`].

use offedge_math::Point3;
use serde::{Deserialize, Serialize};
use slotmap::SecondaryMap;
use tracing::debug;

use crate::{EditMesh, Result, TopoError, VertexId};

/// A vertex record in [`MeshData`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VertexData {
    /// Position.
    pub co: [f64; 3],
    /// Selection flag.
    #[serde(default)]
    pub select: bool,
    /// Hidden flag.
    #[serde(default)]
    pub hide: bool,
}

/// An edge record in [`MeshData`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeData {
    /// Indices into [`MeshData::vertices`].
    pub verts: [usize; 2],
    /// Selection flag.
    #[serde(default)]
    pub select: bool,
    /// Hidden flag.
    #[serde(default)]
    pub hide: bool,
}

/// A face record in [`MeshData`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaceData {
    /// Vertex ring, indices into [`MeshData::vertices`].
    pub verts: Vec<usize>,
    /// Selection flag.
    #[serde(default)]
    pub select: bool,
    /// Hidden flag.
    #[serde(default)]
    pub hide: bool,
}

/// Persistent mesh as a host application stores it.
///
/// Face boundary edges do not need to be listed in `edges`; missing ones are
/// created unselected on load and written out on commit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MeshData {
    /// Vertex records.
    pub vertices: Vec<VertexData>,
    /// Edge records.
    #[serde(default)]
    pub edges: Vec<EdgeData>,
    /// Face records.
    #[serde(default)]
    pub faces: Vec<FaceData>,
}

impl MeshData {
    /// Parse mesh data from a JSON string.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Serialize to pretty-printed JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl EditMesh {
    /// Build an editable mesh from persistent data.
    ///
    /// Element ids are assigned in record order, so loading the same data
    /// twice yields identical ids.
    pub fn from_data(data: &MeshData) -> Result<Self> {
        let count = data.vertices.len();
        let mut mesh = EditMesh::new();
        let ids: Vec<VertexId> = data
            .vertices
            .iter()
            .map(|v| {
                let id = mesh.add_vertex(Point3::new(v.co[0], v.co[1], v.co[2]));
                mesh.vertices[id].select = v.select;
                mesh.vertices[id].hide = v.hide;
                id
            })
            .collect();
        let lookup = |index: usize| -> Result<VertexId> {
            ids.get(index)
                .copied()
                .ok_or(TopoError::VertexOutOfRange { index, count })
        };

        for edge in &data.edges {
            let e = mesh.add_edge(lookup(edge.verts[0])?, lookup(edge.verts[1])?)?;
            mesh.edges[e].select = edge.select;
            mesh.edges[e].hide = edge.hide;
        }

        for face in &data.faces {
            let ring = face
                .verts
                .iter()
                .map(|&i| lookup(i))
                .collect::<Result<Vec<_>>>()?;
            let f = mesh.add_face(&ring)?;
            mesh.faces[f].select = face.select;
            mesh.faces[f].hide = face.hide;
        }

        debug!(
            "Loaded mesh: {} vertices, {} edges, {} faces",
            mesh.vertices.len(),
            mesh.edges.len(),
            mesh.faces.len()
        );
        Ok(mesh)
    }

    /// Flatten into persistent data, renumbering elements in id order.
    pub fn to_data(&self) -> MeshData {
        let mut index: SecondaryMap<VertexId, usize> = SecondaryMap::new();
        let vertices = self
            .vertices
            .iter()
            .enumerate()
            .map(|(i, (id, v))| {
                index.insert(id, i);
                VertexData {
                    co: [v.point.x, v.point.y, v.point.z],
                    select: v.select,
                    hide: v.hide,
                }
            })
            .collect();
        let edges = self
            .edges
            .values()
            .map(|e| EdgeData {
                verts: [index[e.verts[0]], index[e.verts[1]]],
                select: e.select,
                hide: e.hide,
            })
            .collect();
        let faces = self
            .faces
            .values()
            .map(|f| FaceData {
                verts: f.verts.iter().map(|&v| index[v]).collect(),
                select: f.select,
                hide: f.hide,
            })
            .collect();
        MeshData {
            vertices,
            edges,
            faces,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square_data() -> MeshData {
        MeshData {
            vertices: [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]]
                .iter()
                .map(|c| VertexData {
                    co: [c[0], c[1], 0.0],
                    select: true,
                    hide: false,
                })
                .collect(),
            edges: vec![EdgeData {
                verts: [0, 1],
                select: true,
                hide: false,
            }],
            faces: vec![FaceData {
                verts: vec![0, 1, 2, 3],
                select: true,
                hide: false,
            }],
        }
    }

    #[test]
    fn test_from_data_builds_missing_edges() {
        let mesh = EditMesh::from_data(&square_data()).unwrap();
        assert_eq!(mesh.vertices.len(), 4);
        assert_eq!(mesh.edges.len(), 4);
        assert_eq!(mesh.faces.len(), 1);
        assert_eq!(mesh.edges.values().filter(|e| e.select).count(), 1);
    }

    #[test]
    fn test_roundtrip_is_stable() {
        let mesh = EditMesh::from_data(&square_data()).unwrap();
        let data = mesh.to_data();
        assert_eq!(data.edges.len(), 4);
        let again = EditMesh::from_data(&data).unwrap().to_data();
        assert_eq!(data, again);
    }

    #[test]
    fn test_vertex_out_of_range() {
        let mut data = square_data();
        data.edges.push(EdgeData {
            verts: [0, 9],
            select: false,
            hide: false,
        });
        assert_eq!(
            EditMesh::from_data(&data).unwrap_err(),
            TopoError::VertexOutOfRange { index: 9, count: 4 }
        );
    }

    #[test]
    fn test_short_face_rejected() {
        let mut data = square_data();
        data.faces.push(FaceData {
            verts: vec![0, 1],
            select: false,
            hide: false,
        });
        assert_eq!(
            EditMesh::from_data(&data).unwrap_err(),
            TopoError::DegenerateFace
        );
    }

    #[test]
    fn test_json_defaults() {
        let json = r#"{
            "vertices": [{"co": [0, 0, 0]}, {"co": [1, 0, 0], "select": true}],
            "edges": [{"verts": [0, 1], "select": true}]
        }"#;
        let data = MeshData::from_json(json).unwrap();
        assert!(data.faces.is_empty());
        assert!(!data.vertices[0].select);
        assert!(data.edges[0].select);
        let text = data.to_json().unwrap();
        assert_eq!(MeshData::from_json(&text).unwrap(), data);
    }
}
