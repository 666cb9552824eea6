//! Topological operators on the geometry store.
//!
//! - [`extrude_face`]: push a quad out along its normal, building four side
//!   quads and a cap
//! - [`walk_edge_loop`]: follow a quad ring through opposite edges
//! - [`cut_loop`]: split a ring of edges at their midpoints and open the ring

mod cut_loop;
mod edge_loop;
mod extrude;

pub use cut_loop::{LoopCut, cut_loop};
pub use edge_loop::{EdgeLoop, walk_edge_loop};
pub use extrude::{ExtrudeRecord, ExtrudeRevert, Extrusion, extrude_face, revert_extrude};

use crate::mesh::{EdgeId, MeshError, QuadId};

/// Precondition failures of the topological operators.
///
/// Operators check every precondition before mutating, so an `Err` always
/// means the mesh is unchanged.
#[derive(Debug, thiserror::Error)]
pub enum EditError {
    #[error("Quad not found: {0:?}")]
    QuadNotFound(QuadId),

    #[error("Quad {0:?} has no owning mesh")]
    NoOwner(QuadId),

    #[error("Quad {0:?} references removed vertices or edges")]
    StaleQuad(QuadId),

    #[error("Extrusion distance must be finite, got {0}")]
    InvalidDistance(f32),

    #[error("Edge not found: {0:?}")]
    EdgeNotFound(EdgeId),

    #[error("Edge {edge:?} is used by quad {quad:?} outside the cut ring")]
    UntraversedQuad { edge: EdgeId, quad: QuadId },

    #[error("No edge at store index {0}")]
    EdgeIndexOutOfRange(usize),

    #[error("No edge loop is selected")]
    NoLoopSelected,

    #[error("Mesh error: {0}")]
    Mesh(#[from] MeshError),
}
