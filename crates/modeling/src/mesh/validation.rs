//! Consistency checks for the geometry store.
//!
//! Checks:
//! - every quad's edges join its vertices in cyclic order
//! - shared lists and quad edge lists agree in both directions
//! - no edge exceeds the manifold cap
//! - vertex incidence lists match edge endpoints

use super::types::MeshError;
use super::MeshGeometry;

impl MeshGeometry {
    /// Validate the whole store, reporting the first problem found
    pub fn validate(&self) -> Result<(), MeshError> {
        let limit = self.config.shared_quad_limit();

        for quad in self.quads() {
            for i in 0..4 {
                let a = quad.vertices[i];
                let b = quad.vertices[(i + 1) % 4];
                if self.vertex(a).is_none() {
                    return Err(MeshError::InvalidTopology(format!(
                        "quad {:?} references missing vertex {:?}",
                        quad.id, a
                    )));
                }
                let edge = self.edge(quad.edges[i]).ok_or_else(|| {
                    MeshError::InvalidTopology(format!(
                        "quad {:?} references missing edge {:?}",
                        quad.id, quad.edges[i]
                    ))
                })?;
                if !edge.connects(a, b) {
                    return Err(MeshError::InvalidTopology(format!(
                        "quad {:?} edge {} does not join {:?} and {:?}",
                        quad.id, i, a, b
                    )));
                }
                if !edge.shared_quads.contains(&quad.id) {
                    return Err(MeshError::InvalidTopology(format!(
                        "edge {:?} does not list quad {:?}",
                        edge.id, quad.id
                    )));
                }
            }
        }

        for edge in self.edges() {
            if edge.shared_quads.len() > limit {
                return Err(MeshError::InvalidTopology(format!(
                    "edge {:?} is shared by {} quads",
                    edge.id,
                    edge.shared_quads.len()
                )));
            }
            for &q in &edge.shared_quads {
                let listed = self.quad(q).is_some_and(|quad| quad.edges.contains(&edge.id));
                if !listed {
                    return Err(MeshError::InvalidTopology(format!(
                        "edge {:?} lists quad {:?} which does not use it",
                        edge.id, q
                    )));
                }
            }
            for v in [edge.start, edge.end] {
                let incident = self.vertex(v).is_some_and(|vertex| vertex.edges.contains(&edge.id));
                if !incident {
                    return Err(MeshError::InvalidTopology(format!(
                        "vertex {:?} does not list incident edge {:?}",
                        v, edge.id
                    )));
                }
            }
        }

        for vertex in self.vertices() {
            for &e in &vertex.edges {
                let touches = self
                    .edge(e)
                    .is_some_and(|edge| edge.start == vertex.id || edge.end == vertex.id);
                if !touches {
                    return Err(MeshError::InvalidTopology(format!(
                        "vertex {:?} lists edge {:?} which does not touch it",
                        vertex.id, e
                    )));
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use crate::mesh::{MeshError, MeshGeometry, MeshId};

    #[test]
    fn test_truncated_edge_fails_validation() {
        let mut geometry = MeshGeometry::new(MeshId(0));
        let v = [Vec3::ZERO, Vec3::X, Vec3::ONE, Vec3::Y].map(|p| geometry.add_vertex(p, None).unwrap());
        let e = [0, 1, 2, 3].map(|i| geometry.add_edge(v[i], v[(i + 1) % 4]).unwrap());
        geometry.add_quad(v, e).unwrap();
        assert!(geometry.validate().is_ok());

        geometry.add_quad(v, e).unwrap();
        geometry.add_quad(v, e).unwrap();
        // The oldest quad still lists edges that no longer list it
        assert!(matches!(geometry.validate(), Err(MeshError::InvalidTopology(_))));
    }
}
