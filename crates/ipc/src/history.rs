//! History panel types.

use serde::{Deserialize, Serialize};

/// What kind of edit a history entry records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HistoryEntryKind {
    /// Baseline recorded when the mesh was finalized
    Init,
    /// Whole-object transform
    Transform,
    /// Vertex, edge, or face gizmo edit
    Component,
    /// Topological edit such as an extrusion
    Topology,
}

/// One row of the history panel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Position in the log, the value to pass back when rewinding
    pub index: usize,
    pub tick: u64,
    pub tag: String,
    pub kind: HistoryEntryKind,
}
