//! Mesh editing command types.

use serde::{Deserialize, Serialize};

/// Sub-object selection mode for mesh editing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MeshSelectionMode {
    /// Select individual vertices
    #[default]
    Vertex,
    /// Select edges
    Edge,
    /// Select faces
    Face,
}

/// Active tool in mesh edit mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MeshEditTool {
    /// Selection tool (default)
    #[default]
    Select,
    /// Extrude faces
    Extrude,
    /// Loop cut
    LoopCut,
}

/// Commands for controlling mesh edit mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MeshEditCommand {
    /// Set the selection mode (vertex/edge/face)
    SetSelectionMode(MeshSelectionMode),
    /// Set the active tool
    SetTool(MeshEditTool),
    /// Select all elements of the current mode
    SelectAll,
    /// Deselect all elements
    DeselectAll,
    /// Invert the selection within the current mode
    InvertSelection,
    /// Extrude every selected face; `None` uses the configured distance
    ExtrudeSelectedFace { distance: Option<f32> },
    /// Select the edge ring through the edge at `edge_index` (store order)
    SelectEdgeLoop { edge_index: usize },
    /// Cut along the ring found by the last `SelectEdgeLoop`
    CutSelectedLoop,
    /// Jump back to history entry `index`, undoing everything after it
    RewindHistory { index: usize },
    /// Apply a column-major object transform
    TransformMesh { matrix: [f32; 16], tag: String },
}
