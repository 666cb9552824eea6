//! Mutating primitives of the geometry store.
//!
//! Every primitive validates its inputs before touching any slot map, so a
//! rejected call leaves the store unchanged.

use glam::{Mat4, Vec3, Vec4};
use tracing::trace;

use super::types::{Edge, EdgeId, MeshError, MeshId, Quad, QuadId, Vertex, VertexId};
use super::MeshGeometry;
use crate::diagnostics::Diagnostic;

impl MeshGeometry {
    /// Add a vertex at a local-space position.
    ///
    /// Unnamed vertices are called `vertex_<n>`, where `n` is the vertex count
    /// before insertion.
    pub fn add_vertex(&mut self, local: Vec3, name: Option<&str>) -> Result<VertexId, MeshError> {
        let color = Vec4::from_array(self.config.default_vertex_color);
        self.add_vertex_colored(local, name, color)
    }

    /// Add a vertex with an explicit color
    pub fn add_vertex_colored(
        &mut self,
        local: Vec3,
        name: Option<&str>,
        color: Vec4,
    ) -> Result<VertexId, MeshError> {
        if !local.is_finite() {
            return Err(MeshError::NonFinitePosition(local));
        }

        let name = match name {
            Some(name) => name.to_string(),
            None => format!("vertex_{}", self.vertices.len()),
        };
        let world_position = self.model.transform_point3(local);
        let owner = self.mesh_id;
        Ok(self.vertices.insert_with_key(|id| Vertex {
            id,
            local_position: local,
            world_position,
            color,
            name,
            owner,
            edges: Vec::new(),
        }))
    }

    /// Add an edge between two distinct live vertices
    pub fn add_edge(&mut self, start: VertexId, end: VertexId) -> Result<EdgeId, MeshError> {
        if start == end {
            return Err(MeshError::DegenerateEdge(start));
        }
        if !self.vertices.contains_key(start) {
            return Err(MeshError::VertexNotFound(start));
        }
        if !self.vertices.contains_key(end) {
            return Err(MeshError::VertexNotFound(end));
        }

        let id = self.edges.insert_with_key(|id| Edge {
            id,
            start,
            end,
            shared_quads: Vec::new(),
            boundary: false,
        });
        for v in [start, end] {
            if let Some(vertex) = self.vertices.get_mut(v) {
                vertex.edges.push(id);
            }
        }
        Ok(id)
    }

    /// Add a quad from four vertices and the four edges joining them.
    ///
    /// `edges[i]` must join `vertices[i]` and `vertices[(i + 1) % 4]`, in
    /// either direction. The quad is appended to every edge's shared list; an
    /// edge already at the manifold cap drops its oldest quad and records a
    /// [`Diagnostic::ManifoldTruncated`].
    pub fn add_quad(
        &mut self,
        vertices: [VertexId; 4],
        edges: [EdgeId; 4],
    ) -> Result<QuadId, MeshError> {
        self.check_quad(&vertices, &edges)?;

        let id = self.quads.insert_with_key(|id| Quad {
            id,
            vertices,
            edges,
            owner: None,
        });

        let limit = self.config.shared_quad_limit();
        for edge_id in edges {
            let Some(edge) = self.edges.get_mut(edge_id) else {
                continue;
            };
            while edge.shared_quads.len() >= limit {
                let dropped = edge.shared_quads.remove(0);
                self.pending.push(
                    Diagnostic::ManifoldTruncated {
                        edge: edge_id,
                        dropped,
                    }
                    .emit(),
                );
            }
            edge.shared_quads.push(id);
        }

        trace!("add_quad: {:?} with vertices {:?}", id, vertices);
        Ok(id)
    }

    /// Re-insert a quad at recorded positions of its edges' shared lists.
    ///
    /// Used to restore a quad removed by an extrusion. The restored quad gets
    /// a fresh handle. Positions past the end of a list append.
    pub fn restore_quad(
        &mut self,
        vertices: [VertexId; 4],
        edges: [EdgeId; 4],
        slots: [usize; 4],
        owner: Option<MeshId>,
    ) -> Result<QuadId, MeshError> {
        self.check_quad(&vertices, &edges)?;

        let id = self.quads.insert_with_key(|id| Quad {
            id,
            vertices,
            edges,
            owner,
        });
        for (edge_id, slot) in edges.into_iter().zip(slots) {
            if let Some(edge) = self.edges.get_mut(edge_id) {
                let slot = slot.min(edge.shared_quads.len());
                edge.shared_quads.insert(slot, id);
            }
        }
        self.enforce_manifold(&edges);

        trace!("restore_quad: {:?} at slots {:?}", id, slots);
        Ok(id)
    }

    /// Detach a quad from its edges and free it
    pub fn remove_quad(&mut self, id: QuadId) -> Result<Quad, MeshError> {
        let quad = self.quads.remove(id).ok_or(MeshError::QuadNotFound(id))?;
        for edge_id in quad.edges {
            if let Some(edge) = self.edges.get_mut(edge_id) {
                edge.shared_quads.retain(|&q| q != id);
            }
        }
        Ok(quad)
    }

    /// Remove an edge no quad uses anymore
    pub fn remove_edge(&mut self, id: EdgeId) -> Result<Edge, MeshError> {
        let edge = self.edges.get(id).ok_or(MeshError::EdgeNotFound(id))?;
        if !edge.shared_quads.is_empty() {
            return Err(MeshError::InUse(format!(
                "edge {:?} is shared by {} quad(s)",
                id,
                edge.shared_quads.len()
            )));
        }

        let edge = self.edges.remove(id).ok_or(MeshError::EdgeNotFound(id))?;
        for v in [edge.start, edge.end] {
            if let Some(vertex) = self.vertices.get_mut(v) {
                vertex.edges.retain(|&e| e != id);
            }
        }
        Ok(edge)
    }

    /// Remove a vertex no edge uses anymore
    pub fn remove_vertex(&mut self, id: VertexId) -> Result<Vertex, MeshError> {
        let vertex = self.vertices.get(id).ok_or(MeshError::VertexNotFound(id))?;
        if !vertex.edges.is_empty() {
            return Err(MeshError::InUse(format!(
                "vertex {:?} has {} incident edge(s)",
                id,
                vertex.edges.len()
            )));
        }
        self.vertices.remove(id).ok_or(MeshError::VertexNotFound(id))
    }

    /// Split `edge` at the live vertex `center`.
    ///
    /// The edge keeps its start and shared quads and now ends at `center`.
    /// A new edge runs from `center` to the old end and is returned. Quads
    /// listing the edge are not rewritten; callers replace or remove them.
    pub fn split_edge(&mut self, edge_id: EdgeId, center: VertexId) -> Result<EdgeId, MeshError> {
        let edge = self.edges.get(edge_id).ok_or(MeshError::EdgeNotFound(edge_id))?;
        if !self.vertices.contains_key(center) {
            return Err(MeshError::VertexNotFound(center));
        }
        if edge.start == center || edge.end == center {
            return Err(MeshError::DegenerateEdge(center));
        }
        let old_end = edge.end;

        if let Some(edge) = self.edges.get_mut(edge_id) {
            edge.end = center;
        }
        if let Some(vertex) = self.vertices.get_mut(old_end) {
            vertex.edges.retain(|&e| e != edge_id);
        }
        if let Some(vertex) = self.vertices.get_mut(center) {
            vertex.edges.push(edge_id);
        }

        let far = self.add_edge(center, old_end)?;
        trace!("split_edge: {:?} at {:?}, far half {:?}", edge_id, center, far);
        Ok(far)
    }

    /// Trim shared lists of `edges` down to the manifold cap, oldest first
    pub fn enforce_manifold(&mut self, edges: &[EdgeId]) {
        let limit = self.config.shared_quad_limit();
        for &edge_id in edges {
            let Some(edge) = self.edges.get_mut(edge_id) else {
                continue;
            };
            while edge.shared_quads.len() > limit {
                let dropped = edge.shared_quads.remove(0);
                self.pending.push(
                    Diagnostic::ManifoldTruncated {
                        edge: edge_id,
                        dropped,
                    }
                    .emit(),
                );
            }
        }
    }

    pub fn set_boundary(&mut self, edge_id: EdgeId, boundary: bool) -> Result<(), MeshError> {
        let edge = self
            .edges
            .get_mut(edge_id)
            .ok_or(MeshError::EdgeNotFound(edge_id))?;
        edge.boundary = boundary;
        Ok(())
    }

    pub fn set_quad_owner(&mut self, id: QuadId, owner: Option<MeshId>) -> Result<(), MeshError> {
        let quad = self.quads.get_mut(id).ok_or(MeshError::QuadNotFound(id))?;
        quad.owner = owner;
        Ok(())
    }

    /// Move a vertex in local space and refresh its world position
    pub fn set_vertex_local_position(&mut self, id: VertexId, local: Vec3) -> Result<(), MeshError> {
        if !local.is_finite() {
            return Err(MeshError::NonFinitePosition(local));
        }
        let model = self.model;
        let vertex = self
            .vertices
            .get_mut(id)
            .ok_or(MeshError::VertexNotFound(id))?;
        vertex.local_position = local;
        vertex.world_position = model.transform_point3(local);
        Ok(())
    }

    /// Replace the model matrix and refresh every cached world position
    pub fn set_model_matrix(&mut self, model: Mat4) {
        self.model = model;
        self.refresh_world_positions();
    }

    pub(crate) fn refresh_world_positions(&mut self) {
        let model = self.model;
        for vertex in self.vertices.values_mut() {
            vertex.world_position = model.transform_point3(vertex.local_position);
        }
    }

    /// Drop every vertex, edge, and quad. Handles issued before stay dead.
    pub fn clear(&mut self) {
        // Cleared slots get new versions; issued keys stay dead
        self.quads.clear();
        self.edges.clear();
        self.vertices.clear();
        self.pending.clear();
    }

    /// Stamp this mesh as the owner of every vertex and quad
    pub(crate) fn stamp_owners(&mut self) {
        let mesh_id = self.mesh_id;
        for vertex in self.vertices.values_mut() {
            vertex.owner = mesh_id;
        }
        for quad in self.quads.values_mut() {
            quad.owner = Some(mesh_id);
        }
    }

    /// Check the quad contract without mutating anything
    fn check_quad(&self, vertices: &[VertexId; 4], edges: &[EdgeId; 4]) -> Result<(), MeshError> {
        for (i, &v) in vertices.iter().enumerate() {
            if !self.vertices.contains_key(v) {
                return Err(MeshError::VertexNotFound(v));
            }
            if vertices[..i].contains(&v) {
                return Err(MeshError::InvalidQuad(format!(
                    "vertex {:?} appears more than once",
                    v
                )));
            }
        }

        for (i, &edge_id) in edges.iter().enumerate() {
            let edge = self
                .edges
                .get(edge_id)
                .ok_or(MeshError::EdgeNotFound(edge_id))?;
            let a = vertices[i];
            let b = vertices[(i + 1) % 4];
            if !edge.connects(a, b) {
                return Err(MeshError::InvalidQuad(format!(
                    "edge {} ({:?}) does not join {:?} and {:?}",
                    i, edge_id, a, b
                )));
            }
        }
        Ok(())
    }
}
