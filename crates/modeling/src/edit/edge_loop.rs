//! Quad-ring traversal.
//!
//! Entering a quad through one edge, the walk leaves through the opposite
//! edge (`edges[(i + 2) % 4]`) and records the two side edges as rungs.

use std::collections::HashSet;

use tracing::trace;

use super::EditError;
use crate::mesh::{EdgeId, MeshGeometry, QuadId};

/// A ring of quads found by [`walk_edge_loop`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EdgeLoop {
    /// The two side edges of every traversed quad, in walk order
    pub rungs: Vec<EdgeId>,
    /// Edges the walk passed through, starting with the start edge.
    ///
    /// For an open ring this ends with the boundary edge where the walk
    /// stopped. Together with `quads` this is what [`super::cut_loop`] takes.
    pub crossed: Vec<EdgeId>,
    /// Traversed quads, in walk order
    pub quads: Vec<QuadId>,
    /// Whether the walk came back to an edge it already crossed
    pub closed: bool,
}

/// Walk the quad ring through `start`.
///
/// The walk enters the oldest quad sharing `start` and goes in one direction
/// only. It stops when it reaches an edge it already crossed (closed ring),
/// an edge with no further quad, or a quad it already traversed.
pub fn walk_edge_loop(geometry: &MeshGeometry, start: EdgeId) -> Result<EdgeLoop, EditError> {
    if geometry.edge(start).is_none() {
        return Err(EditError::EdgeNotFound(start));
    }

    let mut ring = EdgeLoop::default();
    let mut seen_edges = HashSet::from([start]);
    let mut seen_quads = HashSet::new();
    let mut current = start;
    let mut previous: Option<QuadId> = None;
    ring.crossed.push(start);

    loop {
        let next = geometry
            .quads_of_edge(current)
            .iter()
            .copied()
            .find(|&q| Some(q) != previous && geometry.quad(q).is_some());
        let Some(quad_id) = next else {
            break;
        };
        if !seen_quads.insert(quad_id) {
            break;
        }
        let Some(quad) = geometry.quad(quad_id) else {
            break;
        };
        let Some(i) = quad.edge_index(current) else {
            break;
        };

        ring.quads.push(quad_id);
        ring.rungs.push(quad.edges[(i + 1) % 4]);
        ring.rungs.push(quad.edges[(i + 3) % 4]);

        let opposite = quad.edges[(i + 2) % 4];
        if !seen_edges.insert(opposite) {
            ring.closed = true;
            break;
        }
        ring.crossed.push(opposite);
        previous = Some(quad_id);
        current = opposite;
    }

    trace!(
        "walk_edge_loop: from {:?}, {} quads, closed={}",
        start,
        ring.quads.len(),
        ring.closed
    );
    Ok(ring)
}
