//! Type definitions for the quad mesh geometry store.

use std::sync::atomic::{AtomicU32, Ordering};

use glam::{Vec3, Vec4};

slotmap::new_key_type! {
    /// Generational vertex handle; stops resolving once the vertex is removed
    pub struct VertexId;

    /// Generational edge handle
    pub struct EdgeId;

    /// Generational quad handle
    pub struct QuadId;
}

/// Identity of a mesh, used as a non-owning back-reference from its elements
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MeshId(pub u32);

static NEXT_MESH_ID: AtomicU32 = AtomicU32::new(1);

impl MeshId {
    /// Allocate a process-unique mesh id
    pub fn fresh() -> Self {
        MeshId(NEXT_MESH_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// A vertex in the quad mesh
#[derive(Debug, Clone)]
pub struct Vertex {
    pub id: VertexId,
    /// Position relative to the owning mesh transform
    pub local_position: Vec3,
    /// Cached `model * local_position`
    pub world_position: Vec3,
    pub color: Vec4,
    pub name: String,
    pub owner: MeshId,
    /// Edges that use this vertex as an endpoint
    pub edges: Vec<EdgeId>,
}

/// An edge between two vertices
#[derive(Debug, Clone)]
pub struct Edge {
    pub id: EdgeId,
    pub start: VertexId,
    pub end: VertexId,
    /// Quads currently using this edge, oldest first (at most 2 on a manifold)
    pub shared_quads: Vec<QuadId>,
    /// Set by loop cuts on edges left without any quad
    pub boundary: bool,
}

impl Edge {
    /// Check whether this edge joins `a` and `b`, in either direction
    pub fn connects(&self, a: VertexId, b: VertexId) -> bool {
        (self.start == a && self.end == b) || (self.start == b && self.end == a)
    }
}

/// A quad face.
///
/// `edges[i]` joins `vertices[i]` and `vertices[(i + 1) % 4]`.
#[derive(Debug, Clone)]
pub struct Quad {
    pub id: QuadId,
    pub vertices: [VertexId; 4],
    pub edges: [EdgeId; 4],
    pub owner: Option<MeshId>,
}

impl Quad {
    /// Position of `edge` in the cyclic edge order
    pub fn edge_index(&self, edge: EdgeId) -> Option<usize> {
        self.edges.iter().position(|&e| e == edge)
    }
}

/// Errors raised by the geometry store when a caller breaks its contract
#[derive(Debug, thiserror::Error)]
pub enum MeshError {
    #[error("Vertex position is not finite: {0}")]
    NonFinitePosition(Vec3),
    #[error("Vertex not found: {0:?}")]
    VertexNotFound(VertexId),
    #[error("Edge not found: {0:?}")]
    EdgeNotFound(EdgeId),
    #[error("Quad not found: {0:?}")]
    QuadNotFound(QuadId),
    #[error("Edge endpoints must be distinct: {0:?}")]
    DegenerateEdge(VertexId),
    #[error("Invalid quad: {0}")]
    InvalidQuad(String),
    #[error("Element still in use: {0}")]
    InUse(String),
    #[error("Mesh is already finalized")]
    AlreadyFinalized,
    #[error("Invalid mesh topology: {0}")]
    InvalidTopology(String),
}
