//! Quadsmith modeling core - quad mesh topology and edit history
//!
//! This crate provides the editable mesh and everything that changes it:
//! - [`mesh`] - Generational vertex/edge/quad store with manifold enforcement
//! - [`edit`] - Face extrusion, edge-loop walks and loop cuts
//! - [`history`] - Per-mesh edit log (`MeshDna`) with geometry-aware rewinds
//! - [`primitives`] - Cube, single quad and grid builders
//! - [`selection`] - Sub-object selection kept valid across edits
//! - [`commands`] - Dispatch of UI mesh-edit commands
//! - [`diagnostics`] - Non-fatal conditions reported alongside results

pub mod commands;
pub mod diagnostics;
pub mod edit;
pub mod history;
pub mod mesh;
pub mod primitives;
pub mod selection;

pub use commands::{CommandOutcome, execute, handle_message, updates};
pub use diagnostics::Diagnostic;
pub use edit::{EdgeLoop, EditError, ExtrudeRecord, Extrusion, LoopCut};
pub use history::{ComponentKind, EditEvent, MeshDna, RewindReport};
pub use mesh::{
    DnaHandle, Edge, EdgeId, Mesh, MeshError, MeshGeometry, MeshId, Quad, QuadId, Vertex, VertexId,
};
pub use primitives::{create_cube_mesh, create_default_cube, create_grid_mesh, create_quad_mesh};
pub use selection::MeshSelection;
