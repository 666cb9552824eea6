//! Mesh object: geometry store plus edit history.

use std::cell::RefCell;
use std::rc::Rc;

use glam::{Mat4, Vec3};
use quadsmith_config::EditConfig;
use tracing::debug;

use super::types::{EdgeId, MeshError, MeshId, QuadId, VertexId};
use super::MeshGeometry;
use crate::diagnostics::Diagnostic;
use crate::edit::{self, EdgeLoop, EditError, Extrusion, LoopCut};
use crate::history::{ComponentKind, MeshDna, RewindReport};

/// Where a mesh keeps its history
#[derive(Debug, Clone)]
pub enum DnaHandle {
    /// Owned by the mesh
    Owned(MeshDna),
    /// Shared with other holders, e.g. a scene-level history
    Shared(Rc<RefCell<MeshDna>>),
}

impl DnaHandle {
    pub fn is_owned(&self) -> bool {
        matches!(self, DnaHandle::Owned(_))
    }

    pub fn with<R>(&self, f: impl FnOnce(&MeshDna) -> R) -> R {
        match self {
            DnaHandle::Owned(dna) => f(dna),
            DnaHandle::Shared(dna) => f(&*dna.borrow()),
        }
    }

    pub fn with_mut<R>(&mut self, f: impl FnOnce(&mut MeshDna) -> R) -> R {
        match self {
            DnaHandle::Owned(dna) => f(dna),
            DnaHandle::Shared(dna) => f(&mut *dna.borrow_mut()),
        }
    }
}

/// A named quad mesh with its edit history
#[derive(Debug, Clone)]
pub struct Mesh {
    name: String,
    pub(crate) geometry: MeshGeometry,
    dna: DnaHandle,
}

impl Mesh {
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_config(name, EditConfig::default())
    }

    pub fn with_config(name: impl Into<String>, config: EditConfig) -> Self {
        let name = name.into();
        Self {
            dna: DnaHandle::Owned(MeshDna::new(name.clone())),
            geometry: MeshGeometry::with_config(MeshId::fresh(), config),
            name,
        }
    }

    /// Create a mesh recording into an existing shared history
    pub fn with_shared_dna(name: impl Into<String>, dna: Rc<RefCell<MeshDna>>) -> Self {
        let mut mesh = Self::new(name);
        mesh.dna = DnaHandle::Shared(dna);
        mesh
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn id(&self) -> MeshId {
        self.geometry.mesh_id()
    }

    pub fn geometry(&self) -> &MeshGeometry {
        &self.geometry
    }

    pub fn geometry_mut(&mut self) -> &mut MeshGeometry {
        &mut self.geometry
    }

    pub fn dna(&self) -> &DnaHandle {
        &self.dna
    }

    /// Replace the history, returning the previous one
    pub fn set_dna(&mut self, dna: DnaHandle) -> DnaHandle {
        std::mem::replace(&mut self.dna, dna)
    }

    pub fn owns_dna(&self) -> bool {
        self.dna.is_owned()
    }

    pub fn with_dna<R>(&self, f: impl FnOnce(&MeshDna) -> R) -> R {
        self.dna.with(f)
    }

    pub fn with_dna_mut<R>(&mut self, f: impl FnOnce(&mut MeshDna) -> R) -> R {
        self.dna.with_mut(f)
    }

    /// Append to the history with the events attributed to this mesh
    fn record<R>(&mut self, f: impl FnOnce(&mut MeshDna) -> R) -> R {
        let id = self.id();
        self.dna.with_mut(|dna| dna.record_as(id, f))
    }

    // ========================================================================
    // Building
    // ========================================================================

    pub fn add_vertex(&mut self, local: Vec3, name: Option<&str>) -> Result<VertexId, MeshError> {
        self.geometry.add_vertex(local, name)
    }

    pub fn add_edge(&mut self, a: VertexId, b: VertexId) -> Result<EdgeId, MeshError> {
        self.geometry.add_edge(a, b)
    }

    pub fn add_quad(
        &mut self,
        vertices: [VertexId; 4],
        edges: [EdgeId; 4],
    ) -> Result<QuadId, MeshError> {
        self.geometry.add_quad(vertices, edges)
    }

    pub fn remove_quad(&mut self, id: QuadId) -> Result<(), MeshError> {
        self.geometry.remove_quad(id).map(|_| ())
    }

    pub fn has_topology(&self) -> bool {
        self.geometry.vertex_count() > 0
            || self.geometry.edge_count() > 0
            || self.geometry.quad_count() > 0
    }

    pub fn clear_geometry(&mut self) {
        self.geometry.clear();
    }

    /// Complete construction.
    ///
    /// Stamps ownership on every element, refreshes world positions, records
    /// the `"init"` event with the current model matrix, and freezes the
    /// initial state. Runs once.
    pub fn finalize(&mut self) -> Result<(), MeshError> {
        if self.geometry.finalized {
            return Err(MeshError::AlreadyFinalized);
        }
        self.geometry.stamp_owners();
        self.geometry.refresh_world_positions();

        let id = self.id();
        let model = self.geometry.model_matrix();
        let geometry = &self.geometry;
        self.dna.with_mut(|dna| {
            dna.record_as(id, |dna| dna.ensure_init(model));
            dna.freeze_from(geometry);
        });
        self.geometry.finalized = true;

        debug!(
            "Finalized mesh '{}': {} vertices, {} edges, {} quads",
            self.name,
            self.geometry.vertex_count(),
            self.geometry.edge_count(),
            self.geometry.quad_count()
        );
        Ok(())
    }

    // ========================================================================
    // Transforms
    // ========================================================================

    pub fn model_matrix(&self) -> Mat4 {
        self.geometry.model_matrix()
    }

    /// Apply an object delta in world space and record it
    pub fn apply_transform(&mut self, delta: Mat4, tag: &str) -> u64 {
        let model = delta * self.geometry.model_matrix();
        self.geometry.set_model_matrix(model);
        self.record(|dna| dna.track_transform(delta, tag))
    }

    /// Move `vertices` by a world-space delta and record it as a component
    /// edit. Fails without moving anything if a vertex is gone.
    pub fn transform_vertices(
        &mut self,
        kind: ComponentKind,
        delta_world: Mat4,
        vertices: &[VertexId],
    ) -> Result<u64, MeshError> {
        if let Some(&missing) = vertices.iter().find(|&&v| self.geometry.vertex(v).is_none()) {
            return Err(MeshError::VertexNotFound(missing));
        }

        let model = self.geometry.model_matrix();
        let local_delta = model.inverse() * delta_world * model;
        for &v in vertices {
            if let Some(vertex) = self.geometry.vertex(v) {
                let moved = local_delta.transform_point3(vertex.local_position);
                self.geometry.set_vertex_local_position(v, moved)?;
            }
        }
        Ok(self.record(|dna| dna.track_component_edit(kind, delta_world, vertices.to_vec())))
    }

    // ========================================================================
    // Topology
    // ========================================================================

    /// Extrude a quad and record the extrusion
    pub fn extrude_face(&mut self, quad: QuadId, distance: f32) -> Result<Extrusion, EditError> {
        let extrusion = edit::extrude_face(&mut self.geometry, quad, distance)?;
        let record = extrusion.record.clone();
        self.record(|dna| dna.track_extrude(record));
        Ok(extrusion)
    }

    pub fn walk_edge_loop(&self, start: EdgeId) -> Result<EdgeLoop, EditError> {
        edit::walk_edge_loop(&self.geometry, start)
    }

    /// Cut along a ring. Cuts are not recorded in the history.
    pub fn cut_loop(&mut self, edges: &[EdgeId], quads: &[QuadId]) -> Result<LoopCut, EditError> {
        edit::cut_loop(&mut self.geometry, edges, quads)
    }

    // ========================================================================
    // History
    // ========================================================================

    /// Transform-only rewind; the model matrix follows this mesh's refolded
    /// history. Refused when a shared history holds another mesh's events
    /// after `index`.
    pub fn rewind_to(&mut self, index: usize) -> Vec<Diagnostic> {
        let id = self.id();
        let outcome = self.dna.with_mut(|dna| {
            if let Some(other) = dna.foreign_recorder_after(index, id) {
                return Err(Diagnostic::ForeignHistory { mesh: other }.emit());
            }
            dna.rewind_to(index);
            Ok(dna.accumulated_for(id))
        });
        match outcome {
            Ok(Some(model)) => {
                self.geometry.set_model_matrix(model);
                Vec::new()
            }
            Ok(None) => Vec::new(),
            Err(diagnostic) => vec![diagnostic],
        }
    }

    pub fn rewind_extrude_history(&mut self, index: usize) -> RewindReport {
        let geometry = &mut self.geometry;
        self.dna.with_mut(|dna| dna.rewind_extrude_history(index, geometry))
    }

    /// Undo every event after `index` and restore the refolded model matrix
    pub fn rewind(&mut self, index: usize) -> RewindReport {
        let id = self.id();
        let geometry = &mut self.geometry;
        let (report, model) = self.dna.with_mut(|dna| {
            let report = dna.rewind(index, geometry);
            let model = if report.removed > 0 {
                dna.accumulated_for(id)
            } else {
                None
            };
            (report, model)
        });
        if let Some(model) = model {
            self.geometry.set_model_matrix(model);
        }
        report
    }

    /// Restore the geometry frozen at finalize
    pub fn reset_to_freeze(&mut self) -> Vec<Diagnostic> {
        let geometry = &mut self.geometry;
        self.dna.with(|dna| dna.reset_to_freeze(geometry))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::INIT_TAG;

    fn unit_quad_mesh() -> (Mesh, [VertexId; 4], QuadId) {
        build_unit_quad(Mesh::new("quad"))
    }

    fn build_unit_quad(mut mesh: Mesh) -> (Mesh, [VertexId; 4], QuadId) {
        let v = [
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(1.0, 1.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
        ]
        .map(|p| mesh.add_vertex(p, None).unwrap());
        let e = [0, 1, 2, 3].map(|i| mesh.add_edge(v[i], v[(i + 1) % 4]).unwrap());
        let q = mesh.add_quad(v, e).unwrap();
        (mesh, v, q)
    }

    #[test]
    fn test_finalize_once() {
        let (mut mesh, v, q) = unit_quad_mesh();
        assert!(mesh.geometry().quad(q).unwrap().owner.is_none());

        mesh.finalize().unwrap();
        assert!(matches!(mesh.finalize(), Err(MeshError::AlreadyFinalized)));

        assert_eq!(mesh.geometry().quad(q).unwrap().owner, Some(mesh.id()));
        assert_eq!(mesh.geometry().vertex(v[0]).unwrap().owner, mesh.id());
        mesh.with_dna(|dna| {
            assert_eq!(dna.len(), 1);
            assert_eq!(dna.history()[0].tag, INIT_TAG);
            assert!(dna.has_freeze());
        });
    }

    #[test]
    fn test_apply_transform_and_rewind() {
        let (mut mesh, v, _) = unit_quad_mesh();
        mesh.finalize().unwrap();

        mesh.apply_transform(Mat4::from_translation(Vec3::X), "translate");
        assert_eq!(
            mesh.geometry().vertex(v[0]).unwrap().world_position,
            Vec3::X
        );

        mesh.rewind_to(0);
        assert_eq!(mesh.model_matrix(), Mat4::IDENTITY);
        assert_eq!(mesh.geometry().vertex(v[0]).unwrap().world_position, Vec3::ZERO);
    }

    #[test]
    fn test_transform_vertices_and_rewind() {
        let (mut mesh, v, _) = unit_quad_mesh();
        mesh.finalize().unwrap();

        mesh.transform_vertices(ComponentKind::Edge, Mat4::from_translation(Vec3::Z), &[v[0], v[1]])
            .unwrap();
        assert_eq!(mesh.geometry().vertex(v[1]).unwrap().local_position, Vec3::new(1.0, 0.0, 1.0));
        assert_eq!(mesh.with_dna(|dna| dna.accumulated()), Mat4::IDENTITY);

        let report = mesh.rewind(0);
        assert_eq!(report.undone, 1);
        let local = mesh.geometry().vertex(v[1]).unwrap().local_position;
        assert!((local - Vec3::X).length() < 1e-6);
    }

    #[test]
    fn test_extrude_records_history() {
        let (mut mesh, _, q) = unit_quad_mesh();
        mesh.finalize().unwrap();

        let extrusion = mesh.extrude_face(q, 0.2).unwrap();
        assert!(mesh.geometry().quad(extrusion.cap_quad()).is_some());
        assert_eq!(mesh.with_dna(|dna| dna.len()), 2);

        let report = mesh.rewind_extrude_history(0);
        assert_eq!(report.restored_quads.len(), 1);
        assert_eq!(mesh.geometry().quad_count(), 1);
    }

    #[test]
    fn test_shared_dna_sees_both_meshes() {
        let dna = Rc::new(RefCell::new(MeshDna::new("scene")));
        let mut a = Mesh::with_shared_dna("a", Rc::clone(&dna));
        let mut b = Mesh::with_shared_dna("b", Rc::clone(&dna));
        assert!(!a.owns_dna());

        a.apply_transform(Mat4::from_translation(Vec3::X), "translate");
        b.apply_transform(Mat4::from_translation(Vec3::Y), "translate");
        assert_eq!(dna.borrow().len(), 2);

        let previous = a.set_dna(DnaHandle::Owned(MeshDna::new("a")));
        assert!(!previous.is_owned());
        assert!(a.owns_dna());
    }

    #[test]
    fn test_shared_dna_rewind_leaves_other_mesh_alone() {
        let dna = Rc::new(RefCell::new(MeshDna::new("scene")));
        let (mut a, _, _) = build_unit_quad(Mesh::with_shared_dna("a", Rc::clone(&dna)));
        let (mut b, _, qb) = build_unit_quad(Mesh::with_shared_dna("b", Rc::clone(&dna)));
        a.finalize().unwrap();
        b.finalize().unwrap();
        assert_eq!(dna.borrow().len(), 2);

        let cap = b.extrude_face(qb, 0.2).unwrap().cap_quad();

        // b's extrusion sits after index 0, so a must not replay it
        let report = a.rewind_extrude_history(0);
        assert_eq!(report.removed, 0);
        assert_eq!(report.diagnostics, vec![Diagnostic::ForeignHistory { mesh: b.id() }]);
        assert_eq!(a.geometry().quad_count(), 1);
        assert_eq!(b.geometry().quad_count(), 5);
        assert_eq!(dna.borrow().len(), 3);

        let report = b.rewind(1);
        assert_eq!(report.undone, 1);
        assert!(report.diagnostics.is_empty());
        assert!(b.geometry().quad(cap).is_none());
        assert_eq!(b.geometry().quad_count(), 1);
        assert_eq!(a.geometry().quad_count(), 1);
        assert!(a.geometry().validate().is_ok());
        assert!(b.geometry().validate().is_ok());
        assert_eq!(dna.borrow().len(), 2);
    }

    #[test]
    fn test_shared_dna_transform_rewind_uses_own_events() {
        let dna = Rc::new(RefCell::new(MeshDna::new("scene")));
        let (mut a, _, _) = build_unit_quad(Mesh::with_shared_dna("a", Rc::clone(&dna)));
        let (mut b, _, _) = build_unit_quad(Mesh::with_shared_dna("b", Rc::clone(&dna)));
        a.finalize().unwrap();
        b.finalize().unwrap();
        let along_x = Mat4::from_translation(Vec3::X);
        a.apply_transform(along_x, "translate");
        b.apply_transform(Mat4::from_translation(Vec3::Y), "translate");

        assert_eq!(a.rewind_to(1), vec![Diagnostic::ForeignHistory { mesh: b.id() }]);
        assert_eq!(a.model_matrix(), along_x);
        assert_eq!(dna.borrow().len(), 4);

        // Only b's own deltas fold into b's model
        assert!(b.rewind_to(2).is_empty());
        assert_eq!(b.model_matrix(), Mat4::IDENTITY);
        assert_eq!(a.model_matrix(), along_x);
        assert_eq!(dna.borrow().len(), 3);

        // The shared snapshot was taken from a
        assert_eq!(b.reset_to_freeze(), vec![Diagnostic::ForeignHistory { mesh: a.id() }]);
    }

    #[test]
    fn test_reset_to_freeze() {
        let (mut mesh, v, _) = unit_quad_mesh();
        mesh.finalize().unwrap();
        mesh.geometry_mut()
            .set_vertex_local_position(v[2], Vec3::splat(5.0))
            .unwrap();

        assert!(mesh.reset_to_freeze().is_empty());
        assert_eq!(mesh.geometry().vertex(v[2]).unwrap().local_position, Vec3::new(1.0, 1.0, 0.0));
    }

    #[test]
    fn test_clear_geometry() {
        let (mut mesh, _, _) = unit_quad_mesh();
        assert!(mesh.has_topology());
        mesh.clear_geometry();
        assert!(!mesh.has_topology());
    }
}
