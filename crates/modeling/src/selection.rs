//! Sub-object selection for mesh edit mode
//!
//! Selections hold generational handles. Anything that can destroy elements
//! (extrusion, cuts, rewinds) is followed by [`MeshSelection::retain_live`]
//! or [`MeshSelection::apply_rewind`] so no dead handle survives.

use std::collections::BTreeSet;

use quadsmith_ipc::{MeshEditTool, MeshSelectionMode};
use tracing::trace;

use crate::edit::EdgeLoop;
use crate::history::RewindReport;
use crate::mesh::{EdgeId, MeshGeometry, QuadId, VertexId};

/// Selected vertices, edges and quads of the mesh being edited
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshSelection {
    /// Current sub-object selection mode (vertex/edge/face)
    pub mode: MeshSelectionMode,
    /// Current active tool
    pub tool: MeshEditTool,
    pub vertices: BTreeSet<VertexId>,
    pub edges: BTreeSet<EdgeId>,
    pub quads: BTreeSet<QuadId>,
    /// Ring found by the last loop selection, consumed by a loop cut
    pub edge_loop: Option<EdgeLoop>,
}

impl MeshSelection {
    pub fn new(mode: MeshSelectionMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    pub fn select_vertex(&mut self, id: VertexId) {
        self.vertices.insert(id);
    }

    pub fn select_edge(&mut self, id: EdgeId) {
        self.edges.insert(id);
    }

    pub fn select_quad(&mut self, id: QuadId) {
        self.quads.insert(id);
    }

    /// Clear all selections
    pub fn clear(&mut self) {
        self.vertices.clear();
        self.edges.clear();
        self.quads.clear();
        self.edge_loop = None;
    }

    /// Get the total count of selected elements
    pub fn selection_count(&self) -> usize {
        self.vertices.len() + self.edges.len() + self.quads.len()
    }

    /// Check if anything is selected
    pub fn has_selection(&self) -> bool {
        !self.vertices.is_empty() || !self.edges.is_empty() || !self.quads.is_empty()
    }

    /// Select every element of the current mode
    pub fn select_all(&mut self, geometry: &MeshGeometry) {
        match self.mode {
            MeshSelectionMode::Vertex => {
                self.vertices = geometry.vertices().map(|v| v.id).collect();
            }
            MeshSelectionMode::Edge => {
                self.edges = geometry.edges().map(|e| e.id).collect();
            }
            MeshSelectionMode::Face => {
                self.quads = geometry.quads().map(|q| q.id).collect();
            }
        }
    }

    /// Invert the selection within the current mode
    pub fn invert(&mut self, geometry: &MeshGeometry) {
        match self.mode {
            MeshSelectionMode::Vertex => {
                self.vertices = geometry
                    .vertices()
                    .map(|v| v.id)
                    .filter(|id| !self.vertices.contains(id))
                    .collect();
            }
            MeshSelectionMode::Edge => {
                self.edges = geometry
                    .edges()
                    .map(|e| e.id)
                    .filter(|id| !self.edges.contains(id))
                    .collect();
            }
            MeshSelectionMode::Face => {
                self.quads = geometry
                    .quads()
                    .map(|q| q.id)
                    .filter(|id| !self.quads.contains(id))
                    .collect();
            }
        }
    }

    /// Swap `old` for `new` if `old` is selected
    pub fn replace_quad(&mut self, old: QuadId, new: QuadId) {
        if self.quads.remove(&old) {
            self.quads.insert(new);
        }
    }

    /// Drop every handle that no longer resolves in `geometry`.
    ///
    /// A stored loop is dropped as soon as one of its edges or quads is gone.
    /// Returns the number of handles dropped, a dropped loop counting as one.
    pub fn retain_live(&mut self, geometry: &MeshGeometry) -> usize {
        let before = self.selection_count();
        self.vertices.retain(|&v| geometry.vertex(v).is_some());
        self.edges.retain(|&e| geometry.edge(e).is_some());
        self.quads.retain(|&q| geometry.quad(q).is_some());
        let mut dropped = before - self.selection_count();

        let loop_stale = self.edge_loop.as_ref().is_some_and(|ring| {
            !ring.crossed.iter().all(|&e| geometry.edge(e).is_some())
                || !ring.quads.iter().all(|&q| geometry.quad(q).is_some())
        });
        if loop_stale {
            self.edge_loop = None;
            dropped += 1;
        }

        if dropped > 0 {
            trace!("retain_live: dropped {} stale handle(s)", dropped);
        }
        dropped
    }

    /// Follow the quads restored by a rewind, then drop dead handles
    pub fn apply_rewind(&mut self, report: &RewindReport, geometry: &MeshGeometry) -> usize {
        for &(old, new) in &report.restored_quads {
            self.replace_quad(old, new);
        }
        self.retain_live(geometry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives::{create_cube_mesh, create_quad_mesh};
    use glam::Vec3;

    #[test]
    fn test_select_all_follows_mode() {
        let cube = create_cube_mesh(1.0, Vec3::ZERO, "cube").unwrap();
        let mut selection = MeshSelection::new(MeshSelectionMode::Edge);
        selection.select_all(cube.geometry());
        assert_eq!(selection.edges.len(), 12);
        assert!(selection.vertices.is_empty());

        selection.mode = MeshSelectionMode::Face;
        selection.select_all(cube.geometry());
        assert_eq!(selection.selection_count(), 18);

        selection.clear();
        assert!(!selection.has_selection());
    }

    #[test]
    fn test_invert_within_mode() {
        let cube = create_cube_mesh(1.0, Vec3::ZERO, "cube").unwrap();
        let first = cube.geometry().quads().next().unwrap().id;
        let mut selection = MeshSelection::new(MeshSelectionMode::Face);
        selection.select_quad(first);

        selection.invert(cube.geometry());
        assert_eq!(selection.quads.len(), 5);
        assert!(!selection.quads.contains(&first));
    }

    #[test]
    fn test_retain_live_drops_dead_handles() {
        let mut mesh = create_quad_mesh("quad").unwrap();
        let quad = mesh.geometry().quads().next().unwrap().id;
        let mut selection = MeshSelection::new(MeshSelectionMode::Face);
        selection.select_quad(quad);
        selection.select_vertex(mesh.geometry().vertices().next().unwrap().id);

        let extrusion = mesh.extrude_face(quad, 0.2).unwrap();
        assert_eq!(selection.retain_live(mesh.geometry()), 1);
        assert!(selection.quads.is_empty());
        assert_eq!(selection.vertices.len(), 1);

        selection.select_quad(extrusion.cap_quad());
        assert_eq!(selection.retain_live(mesh.geometry()), 0);
    }

    #[test]
    fn test_apply_rewind_follows_restored_quad() {
        let mut mesh = create_quad_mesh("quad").unwrap();
        let quad = mesh.geometry().quads().next().unwrap().id;
        let extrusion = mesh.extrude_face(quad, 0.2).unwrap();

        let mut selection = MeshSelection::new(MeshSelectionMode::Face);
        selection.select_quad(quad);
        selection.select_quad(extrusion.cap_quad());

        let report = mesh.rewind(0);
        selection.apply_rewind(&report, mesh.geometry());
        let restored = report.resolve_quad(quad);
        assert_eq!(selection.quads.iter().copied().collect::<Vec<_>>(), vec![restored]);
    }

    #[test]
    fn test_stored_loop_dropped_after_cut() {
        let mut cube = create_cube_mesh(1.0, Vec3::ZERO, "cube").unwrap();
        let start = cube.geometry().edges().next().unwrap().id;
        let ring = cube.walk_edge_loop(start).unwrap();
        let mut selection = MeshSelection::default();
        selection.edge_loop = Some(ring.clone());

        assert_eq!(selection.retain_live(cube.geometry()), 0);
        assert!(selection.edge_loop.is_some());

        cube.cut_loop(&ring.crossed, &ring.quads).unwrap();
        assert_eq!(selection.retain_live(cube.geometry()), 1);
        assert!(selection.edge_loop.is_none());
        assert_eq!(selection.retain_live(cube.geometry()), 0);
    }
}
