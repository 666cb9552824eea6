//! Read-only queries on the geometry store.

use glam::{Mat4, Vec3};

use super::types::{Edge, EdgeId, Quad, QuadId, Vertex, VertexId};
use super::MeshGeometry;

impl MeshGeometry {
    // ========================================================================
    // Accessors
    // ========================================================================

    /// Get vertex by handle, `None` once it has been removed
    pub fn vertex(&self, id: VertexId) -> Option<&Vertex> {
        self.vertices.get(id)
    }

    /// Get edge by handle
    pub fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.get(id)
    }

    /// Get quad by handle
    pub fn quad(&self, id: QuadId) -> Option<&Quad> {
        self.quads.get(id)
    }

    pub fn vertices(&self) -> impl Iterator<Item = &Vertex> {
        self.vertices.values()
    }

    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.values()
    }

    pub fn quads(&self) -> impl Iterator<Item = &Quad> {
        self.quads.values()
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn quad_count(&self) -> usize {
        self.quads.len()
    }

    pub fn model_matrix(&self) -> Mat4 {
        self.model
    }

    // ========================================================================
    // Topology Queries
    // ========================================================================

    /// Find the edge joining `a` and `b` in either direction
    pub fn find_edge(&self, a: VertexId, b: VertexId) -> Option<EdgeId> {
        let vertex = self.vertex(a)?;
        vertex
            .edges
            .iter()
            .copied()
            .find(|&e| self.edge(e).is_some_and(|edge| edge.connects(a, b)))
    }

    /// Quads sharing `edge`, oldest first. Empty for a removed edge.
    pub fn quads_of_edge(&self, edge: EdgeId) -> &[QuadId] {
        self.edge(edge)
            .map(|e| e.shared_quads.as_slice())
            .unwrap_or(&[])
    }

    /// Edges currently flagged as boundary
    pub fn boundary_edges(&self) -> Vec<EdgeId> {
        self.edges()
            .filter(|e| e.boundary)
            .map(|e| e.id)
            .collect()
    }

    // ========================================================================
    // Geometric Queries
    // ========================================================================

    /// Average local position of all vertices, origin for an empty mesh
    pub fn vertex_centroid(&self) -> Vec3 {
        let count = self.vertex_count();
        if count == 0 {
            return Vec3::ZERO;
        }
        let sum: Vec3 = self.vertices().map(|v| v.local_position).sum();
        sum / count as f32
    }

    /// Average local position of a quad's corners
    pub fn quad_centroid(&self, id: QuadId) -> Option<Vec3> {
        let positions = self.quad_positions(id)?;
        Some(positions.iter().copied().sum::<Vec3>() / 4.0)
    }

    /// Unnormalized normal `(p1 - p0) x (p2 - p0)` of a quad in local space
    pub fn quad_normal(&self, id: QuadId) -> Option<Vec3> {
        let [p0, p1, p2, _] = self.quad_positions(id)?;
        Some((p1 - p0).cross(p2 - p0))
    }

    /// Local positions of a quad's corners, `None` if any corner is gone
    pub fn quad_positions(&self, id: QuadId) -> Option<[Vec3; 4]> {
        let quad = self.quad(id)?;
        let mut positions = [Vec3::ZERO; 4];
        for (slot, &v) in positions.iter_mut().zip(&quad.vertices) {
            *slot = self.vertex(v)?.local_position;
        }
        Some(positions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::MeshId;

    fn unit_quad() -> (MeshGeometry, [VertexId; 4], [EdgeId; 4], QuadId) {
        let mut geometry = MeshGeometry::new(MeshId(0));
        let v = [
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(1.0, 1.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
        ]
        .map(|p| geometry.add_vertex(p, None).unwrap());
        let e = [0, 1, 2, 3].map(|i| geometry.add_edge(v[i], v[(i + 1) % 4]).unwrap());
        let q = geometry.add_quad(v, e).unwrap();
        (geometry, v, e, q)
    }

    #[test]
    fn test_find_edge_either_direction() {
        let (geometry, v, e, _) = unit_quad();
        assert_eq!(geometry.find_edge(v[0], v[1]), Some(e[0]));
        assert_eq!(geometry.find_edge(v[1], v[0]), Some(e[0]));
        assert_eq!(geometry.find_edge(v[0], v[2]), None);
    }

    #[test]
    fn test_centroids_and_normal() {
        let (geometry, _, _, q) = unit_quad();
        assert_eq!(geometry.vertex_centroid(), Vec3::new(0.5, 0.5, 0.0));
        assert_eq!(geometry.quad_centroid(q), Some(Vec3::new(0.5, 0.5, 0.0)));
        assert_eq!(geometry.quad_normal(q), Some(Vec3::Z));
    }

    #[test]
    fn test_queries_on_removed_quad() {
        let (mut geometry, _, e, q) = unit_quad();
        geometry.remove_quad(q).unwrap();
        assert!(geometry.quad_normal(q).is_none());
        assert!(geometry.quad_centroid(q).is_none());
        assert!(geometry.quads_of_edge(e[0]).is_empty());
    }

    #[test]
    fn test_empty_centroid_is_origin() {
        let geometry = MeshGeometry::new(MeshId(0));
        assert_eq!(geometry.vertex_centroid(), Vec3::ZERO);
    }
}
