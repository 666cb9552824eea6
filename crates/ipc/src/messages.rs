//! Main IPC message enums for communication between the modeler and UI.

use serde::{Deserialize, Serialize};

use crate::commands::{MeshEditCommand, MeshEditTool, MeshSelectionMode};
use crate::history::HistoryEntry;

/// Messages from the modeler to the UI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum ModelerToUi {
    /// Mesh edit mode state changed
    MeshEditModeChanged {
        /// Current selection mode (vertex/edge/face)
        selection_mode: MeshSelectionMode,
        /// Current active tool
        tool: MeshEditTool,
    },

    /// Sub-object selection changed in mesh edit mode
    MeshEditSelectionChanged {
        /// Number of selected vertices
        vertex_count: usize,
        /// Number of selected edges
        edge_count: usize,
        /// Number of selected faces
        face_count: usize,
    },

    /// The mesh history changed; full list for the history panel
    HistoryChanged { entries: Vec<HistoryEntry> },

    /// Non-fatal problems met while running a command
    Warnings { messages: Vec<String> },

    /// Error notification
    Error { code: String, message: String },
}

/// Messages from the UI to the modeler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum UiToModeler {
    /// Mesh edit mode commands
    MeshEditCommand(MeshEditCommand),

    /// Request the current history list
    RequestHistory,
}
