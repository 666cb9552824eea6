//! Loop cut: split every edge of a ring at its midpoint, join the midpoints
//! into a ring of new edges, and open the ring by removing its quads.
//!
//! Quads are not rebuilt across the cut; edges left without any quad are
//! flagged as boundary.

use std::collections::HashSet;

use tracing::{debug, trace};

use super::EditError;
use crate::mesh::{EdgeId, MeshError, MeshGeometry, QuadId, VertexId};

/// Result of [`cut_loop`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoopCut {
    /// One midpoint vertex per loop edge, in loop order
    pub centers: Vec<VertexId>,
    /// Far half of each split edge (center to old end)
    pub split_edges: Vec<EdgeId>,
    /// Edges joining consecutive centers, closing edge last
    pub ring_edges: Vec<EdgeId>,
    pub removed_quads: Vec<QuadId>,
    /// Touched edges flagged as boundary after the cut
    pub boundary_edges: Vec<EdgeId>,
}

/// Cut along `loop_edges`, removing `traversed` quads.
///
/// Every loop edge and traversed quad must be live, and no quad outside
/// `traversed` may use a loop edge. The centers are named `cut_<i>`.
pub fn cut_loop(
    geometry: &mut MeshGeometry,
    loop_edges: &[EdgeId],
    traversed: &[QuadId],
) -> Result<LoopCut, EditError> {
    // ===== PHASE 1: VALIDATE (read-only) =====
    let traversed_set: HashSet<QuadId> = traversed.iter().copied().collect();
    let mut endpoints = Vec::with_capacity(loop_edges.len());
    for &e in loop_edges {
        let edge = geometry.edge(e).ok_or(EditError::EdgeNotFound(e))?;
        if let Some(&quad) = edge.shared_quads.iter().find(|&&q| !traversed_set.contains(&q)) {
            return Err(EditError::UntraversedQuad { edge: e, quad });
        }
        let start = geometry
            .vertex(edge.start)
            .ok_or(MeshError::VertexNotFound(edge.start))?
            .local_position;
        let end = geometry
            .vertex(edge.end)
            .ok_or(MeshError::VertexNotFound(edge.end))?
            .local_position;
        endpoints.push((start, end));
    }
    for &q in traversed {
        if geometry.quad(q).is_none() {
            return Err(EditError::QuadNotFound(q));
        }
    }

    let mut cut = LoopCut::default();
    let mut touched: Vec<EdgeId> = loop_edges.to_vec();
    for &q in traversed {
        if let Some(quad) = geometry.quad(q) {
            touched.extend(quad.edges);
        }
    }

    // ===== PHASE 2: SPLIT =====
    for (i, (&e, (start, end))) in loop_edges.iter().zip(endpoints).enumerate() {
        let center = geometry.add_vertex((start + end) * 0.5, Some(&format!("cut_{i}")))?;
        let far = geometry.split_edge(e, center)?;
        trace!("cut_loop: split {:?} at {:?}", e, center);
        cut.centers.push(center);
        cut.split_edges.push(far);
    }

    // ===== PHASE 3: RING =====
    for pair in cut.centers.windows(2) {
        cut.ring_edges.push(geometry.add_edge(pair[0], pair[1])?);
    }
    if cut.centers.len() >= 2 {
        let first = cut.centers[0];
        let last = cut.centers[cut.centers.len() - 1];
        cut.ring_edges.push(geometry.add_edge(last, first)?);
    }

    // ===== PHASE 4: OPEN =====
    let mut removed = HashSet::new();
    for &q in traversed {
        if removed.insert(q) {
            geometry.remove_quad(q)?;
            cut.removed_quads.push(q);
        }
    }

    touched.extend(&cut.split_edges);
    touched.extend(&cut.ring_edges);
    let mut seen = HashSet::new();
    for e in touched {
        if !seen.insert(e) {
            continue;
        }
        if geometry.edge(e).is_some_and(|edge| edge.shared_quads.is_empty()) {
            geometry.set_boundary(e, true)?;
            cut.boundary_edges.push(e);
        }
    }

    debug!(
        "cut_loop: {} centers, {} quads removed, {} boundary edges",
        cut.centers.len(),
        cut.removed_quads.len(),
        cut.boundary_edges.len()
    );
    Ok(cut)
}
