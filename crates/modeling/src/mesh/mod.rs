//! Quad mesh geometry store.
//!
//! Every vertex, edge, and quad lives in a per-mesh `SlotMap` and is
//! addressed by a generational key. Elements refer to each other only
//! through keys, so removing an element can never leave a dangling pointer
//! behind: stale keys simply stop resolving.

mod object;
mod store;
mod topology;
mod types;
mod validation;

use glam::Mat4;
use quadsmith_config::EditConfig;
use slotmap::SlotMap;

use crate::diagnostics::Diagnostic;

pub use object::{DnaHandle, Mesh};
pub use types::{Edge, EdgeId, MeshError, MeshId, Quad, QuadId, Vertex, VertexId};

/// Owner of all vertices, edges, and quads of one mesh
#[derive(Debug, Clone)]
pub struct MeshGeometry {
    pub(crate) mesh_id: MeshId,
    pub(crate) vertices: SlotMap<VertexId, Vertex>,
    pub(crate) edges: SlotMap<EdgeId, Edge>,
    pub(crate) quads: SlotMap<QuadId, Quad>,
    /// World transform of the owning object
    pub(crate) model: Mat4,
    pub(crate) config: EditConfig,
    pub(crate) finalized: bool,
    /// Diagnostics recorded by store primitives, drained by operators
    pub(crate) pending: Vec<Diagnostic>,
}

impl MeshGeometry {
    /// Create an empty store for the mesh `mesh_id`
    pub fn new(mesh_id: MeshId) -> Self {
        Self::with_config(mesh_id, EditConfig::default())
    }

    pub fn with_config(mesh_id: MeshId, config: EditConfig) -> Self {
        Self {
            mesh_id,
            vertices: SlotMap::with_key(),
            edges: SlotMap::with_key(),
            quads: SlotMap::with_key(),
            model: Mat4::IDENTITY,
            config,
            finalized: false,
            pending: Vec::new(),
        }
    }

    pub fn mesh_id(&self) -> MeshId {
        self.mesh_id
    }

    pub fn config(&self) -> &EditConfig {
        &self.config
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    /// Drain the diagnostics recorded since the last call
    pub fn take_diagnostics(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.pending)
    }
}
