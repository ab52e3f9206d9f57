//! Boundary edge collection and loop extraction.

use std::collections::{BTreeSet, HashMap};

use offedge_topo::{EdgeId, EditMesh, VertexId};
use tracing::debug;

use crate::{OffsetError, Result};

/// An ordered chain of boundary edges.
///
/// `verts[i]` and `verts[i + 1]` are the endpoints of `edges[i]`. A closed
/// loop repeats its first vertex at the end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgeLoop {
    /// Vertices in loop order, `edges.len() + 1` of them.
    pub verts: Vec<VertexId>,
    /// Edges in loop order.
    pub edges: Vec<EdgeId>,
}

impl EdgeLoop {
    /// Whether the chain returns to its start vertex.
    pub fn is_closed(&self) -> bool {
        self.verts.len() > 1 && self.verts.first() == self.verts.last()
    }

    /// Reverse the walking direction in place.
    pub fn reverse(&mut self) {
        self.verts.reverse();
        self.edges.reverse();
    }
}

/// Collect the selected edges on the boundary of the selection.
///
/// An edge qualifies if it is selected, visible, and not bordered by exactly
/// two selected faces. Returns `None` when nothing qualifies.
pub fn collect_edges(mesh: &EditMesh) -> Option<BTreeSet<EdgeId>> {
    let edges: BTreeSet<EdgeId> = mesh
        .edges
        .iter()
        .filter(|(_, edge)| edge.select && !edge.hide)
        .filter(|&(e, _)| {
            let selected_faces = mesh
                .edge_faces(e)
                .iter()
                .filter(|&&f| mesh.faces[f].select)
                .count();
            selected_faces != 2
        })
        .map(|(e, _)| e)
        .collect();

    if edges.is_empty() {
        None
    } else {
        Some(edges)
    }
}

/// Chain `edges` into closed loops and half loops.
///
/// # Errors
///
/// [`OffsetError::OverlapDetected`] when a vertex joins three or more of the
/// edges.
pub fn collect_loops(mesh: &EditMesh, edges: &BTreeSet<EdgeId>) -> Result<Vec<EdgeLoop>> {
    let mut degree: HashMap<VertexId, usize> = HashMap::new();
    for &e in edges {
        for v in mesh.edges[e].verts {
            *degree.entry(v).or_default() += 1;
        }
    }
    if degree.values().any(|&d| d >= 3) {
        return Err(OffsetError::OverlapDetected);
    }

    let mut remaining = edges.clone();
    let mut loops = Vec::new();

    while let Some(start) = remaining.pop_first() {
        let [mut v_left, mut v_right] = mesh.edges[start].verts;
        let mut lp = EdgeLoop {
            verts: vec![v_left, v_right],
            edges: vec![start],
        };
        let mut reversed = false;

        loop {
            let mut candidates = mesh
                .vertex_edges(v_right)
                .iter()
                .copied()
                .filter(|e| remaining.contains(e));
            let next = candidates.next();
            if candidates.next().is_some() {
                return Err(OffsetError::OverlapDetected);
            }

            if let Some(e) = next {
                remaining.remove(&e);
                v_right = mesh.other_vertex(e, v_right);
                lp.edges.push(e);
                lp.verts.push(v_right);
            } else if v_right == v_left {
                break;
            } else if !reversed {
                // Grow the other end of the half loop.
                lp.reverse();
                std::mem::swap(&mut v_left, &mut v_right);
                reversed = true;
            } else {
                break;
            }
        }

        debug!(
            "Collected {} loop with {} edges",
            if lp.is_closed() { "closed" } else { "half" },
            lp.edges.len()
        );
        loops.push(lp);
    }

    Ok(loops)
}
