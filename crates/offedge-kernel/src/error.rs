//! Error types for offset operations.

use offedge_topo::TopoError;
use thiserror::Error;

/// Reasons an offset cannot be applied.
///
/// All of these are detected before the mesh is touched, so the caller's
/// mesh is unchanged whenever one is returned.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OffsetError {
    /// No selected edge lies on the boundary of the selection.
    #[error("no edges selected")]
    NoEdgesSelected,

    /// A vertex joins three or more selected boundary edges.
    #[error("overlap detected; select non-overlapping edge loops")]
    OverlapDetected,

    /// Every selected boundary edge lies on a mirror plane.
    #[error("all selected edges are on mirror planes")]
    AllEdgesMirrored,

    /// The host mesh could not be loaded into editable topology.
    #[error("invalid mesh: {0}")]
    Topology(#[from] TopoError),

    /// The interactive session was already cancelled.
    #[error("offset session is no longer active")]
    SessionClosed,
}

/// Result type for offset operations.
pub type Result<T> = std::result::Result<T, OffsetError>;
