#![warn(missing_docs)]

//! Editable mesh topology for the offedge engine.
//!
//! Stores vertices, edges and faces in slot maps so element ids stay valid
//! across clones of the mesh. Adjacency (vertex → edges, edge → faces) is
//! maintained by the mutating methods and can be queried cheaply.
//!
//! [`MeshData`] is the flat, index-based form a host application persists;
//! [`EditMesh::from_data`] and [`EditMesh::to_data`] convert between the two.
//!
//! # Example
//!
//! ```
//! use offedge_math::Point3;
//! use offedge_topo::EditMesh;
//!
//! let mut mesh = EditMesh::new();
//! let a = mesh.add_vertex(Point3::new(0.0, 0.0, 0.0));
//! let b = mesh.add_vertex(Point3::new(1.0, 0.0, 0.0));
//! let c = mesh.add_vertex(Point3::new(0.0, 1.0, 0.0));
//! let f = mesh.add_face(&[a, b, c]).unwrap();
//! assert_eq!(mesh.edges.len(), 3);
//! assert!((mesh.face_normal(f).z - 1.0).abs() < 1e-12);
//! ```

mod data;
mod extrude;
mod mesh;

pub use data::{EdgeData, FaceData, MeshData, VertexData};
pub use extrude::ExtrudedGeometry;
pub use mesh::{Edge, EditMesh, Face, Vertex};

use thiserror::Error;

slotmap::new_key_type! {
    /// Identifier of a vertex in an [`EditMesh`].
    pub struct VertexId;
    /// Identifier of an edge in an [`EditMesh`].
    pub struct EdgeId;
    /// Identifier of a face in an [`EditMesh`].
    pub struct FaceId;
}

/// Errors from building or converting topology.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TopoError {
    /// An edge or face refers to a vertex index that does not exist.
    #[error("vertex index {index} out of range ({count} vertices)")]
    VertexOutOfRange {
        /// The offending index.
        index: usize,
        /// Number of vertices in the mesh.
        count: usize,
    },

    /// An edge connects a vertex to itself.
    #[error("edge connects a vertex to itself")]
    DegenerateEdge,

    /// A face has fewer than three vertices.
    #[error("face has fewer than three vertices")]
    DegenerateFace,

    /// A vertex id is not present in the mesh.
    #[error("unknown vertex id")]
    UnknownVertex,

    /// An edge id is not present in the mesh.
    #[error("unknown edge id")]
    UnknownEdge,
}

/// Result type for topology operations.
pub type Result<T> = std::result::Result<T, TopoError>;
