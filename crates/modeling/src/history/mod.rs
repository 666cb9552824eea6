//! Per-mesh edit history ("DNA").
//!
//! An append-only log of transform deltas and topology edits. Object-scope
//! deltas fold into a running accumulated transform (`delta * accumulated`,
//! newest on the left). Rewinding truncates the log; the geometry-aware
//! rewinds also physically undo the removed edits.
//!
//! ```text
//!   [init] [translate] [extrude_face] [vertex_modify] [extrude_face]
//!     0         1             2               3              4
//!                             ^ rewind(2) undoes 4 then 3, keeps 0..=2
//! ```

mod events;
mod rewind;

pub use events::{
    ComponentKind, DeltaScope, EXTRUDE_TAG, EditEvent, EditPayload, INIT_TAG, ROTATE_TAG,
    SCALE_TAG, TRANSLATE_TAG, TopologyEdit, TransformDelta,
};
pub use rewind::RewindReport;

use glam::{Mat4, Vec3};
use quadsmith_ipc::{HistoryEntry, HistoryEntryKind};
use tracing::debug;

use crate::diagnostics::Diagnostic;
use crate::edit::ExtrudeRecord;
use crate::mesh::{MeshGeometry, MeshId, VertexId};

/// Snapshot of the geometry taken at finalize
#[derive(Debug, Clone, PartialEq)]
struct FreezeSnapshot {
    mesh: MeshId,
    model: Mat4,
    positions: Vec<(VertexId, Vec3)>,
}

/// Edit history of one mesh
#[derive(Debug, Clone)]
pub struct MeshDna {
    name: String,
    events: Vec<EditEvent>,
    accumulated: Mat4,
    next_tick: u64,
    /// Mesh new events are attributed to, set by [`MeshDna::record_as`]
    recorder: Option<MeshId>,
    freeze: Option<FreezeSnapshot>,
}

impl Default for MeshDna {
    fn default() -> Self {
        Self::new("mesh")
    }
}

impl MeshDna {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            events: Vec::new(),
            accumulated: Mat4::IDENTITY,
            next_tick: 0,
            recorder: None,
            freeze: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    // ========================================================================
    // Tracking
    // ========================================================================

    /// Append an object transform with the next tick
    pub fn track_transform(&mut self, delta: Mat4, tag: &str) -> u64 {
        let tick = self.next_tick;
        self.push_object(delta, tick, tag, None)
    }

    /// Append an object transform at an explicit tick.
    ///
    /// A tick below the log's next tick is raised to it, so ticks stay
    /// monotonic.
    pub fn track_transform_at(&mut self, delta: Mat4, tick: u64, tag: &str) -> u64 {
        let tick = tick.max(self.next_tick);
        self.push_object(delta, tick, tag, None)
    }

    /// Append an object transform carrying a caller-chosen transform id
    pub fn track_transform_with_id(&mut self, delta: Mat4, tag: &str, transform_id: u64) -> u64 {
        let tick = self.next_tick;
        self.push_object(delta, tick, tag, Some(transform_id))
    }

    pub fn track_translate(&mut self, delta: Mat4) -> u64 {
        self.track_transform(delta, TRANSLATE_TAG)
    }

    pub fn track_rotate(&mut self, delta: Mat4) -> u64 {
        self.track_transform(delta, ROTATE_TAG)
    }

    pub fn track_scale(&mut self, delta: Mat4) -> u64 {
        self.track_transform(delta, SCALE_TAG)
    }

    /// Run `f` with every event it appends attributed to `mesh`.
    ///
    /// A log shared by several meshes relies on this to keep each mesh's
    /// rewinds away from the others' events.
    pub fn record_as<R>(&mut self, mesh: MeshId, f: impl FnOnce(&mut Self) -> R) -> R {
        let previous = self.recorder.replace(mesh);
        let result = f(self);
        self.recorder = previous;
        result
    }

    /// Record the baseline `"init"` event once per recording mesh
    pub fn ensure_init(&mut self, model: Mat4) {
        if self.is_initialized() {
            return;
        }
        self.track_transform(model, INIT_TAG);
    }

    /// Whether the current recorder already has its `"init"` event
    pub fn is_initialized(&self) -> bool {
        self.events
            .iter()
            .any(|event| event.tag == INIT_TAG && event.mesh == self.recorder)
    }

    /// Record a world-space delta applied directly to `vertices`.
    ///
    /// Component edits never fold into [`Self::accumulated`].
    pub fn track_component_edit(
        &mut self,
        kind: ComponentKind,
        delta_world: Mat4,
        vertices: Vec<VertexId>,
    ) -> u64 {
        let tick = self.next_tick;
        self.push(
            tick,
            kind.tag(),
            EditPayload::Transform(TransformDelta {
                delta: delta_world,
                scope: DeltaScope::Component { kind, vertices },
                transform_id: None,
            }),
        )
    }

    /// Record an extrusion so it can be undone later
    pub fn track_extrude(&mut self, record: ExtrudeRecord) -> u64 {
        let tick = self.next_tick;
        self.push(
            tick,
            EXTRUDE_TAG,
            EditPayload::Topology(TopologyEdit::Extrude(record)),
        )
    }

    fn push_object(&mut self, delta: Mat4, tick: u64, tag: &str, transform_id: Option<u64>) -> u64 {
        self.accumulated = delta * self.accumulated;
        self.push(
            tick,
            tag,
            EditPayload::Transform(TransformDelta {
                delta,
                scope: DeltaScope::Object,
                transform_id,
            }),
        )
    }

    fn push(&mut self, tick: u64, tag: &str, payload: EditPayload) -> u64 {
        debug!("{}: tracked '{}' at tick {}", self.name, tag, tick);
        self.events.push(EditEvent {
            tick,
            tag: tag.to_string(),
            mesh: self.recorder,
            payload,
        });
        self.next_tick = tick + 1;
        tick
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Fold of every object delta in the log
    pub fn accumulated(&self) -> Mat4 {
        self.accumulated
    }

    /// Fold of the object deltas among the first `n` events
    pub fn accumulated_up_to(&self, n: usize) -> Mat4 {
        self.events
            .iter()
            .take(n)
            .filter_map(EditEvent::object_delta)
            .fold(Mat4::IDENTITY, |acc, delta| delta * acc)
    }

    /// Fold of the object deltas recorded by `mesh` or by no mesh.
    ///
    /// `None` when none of those events is left in the log.
    pub fn accumulated_for(&self, mesh: MeshId) -> Option<Mat4> {
        let mut own = self
            .events
            .iter()
            .filter(|event| event.recorded_by().is_none_or(|owner| owner == mesh))
            .peekable();
        own.peek()?;
        Some(
            own.filter_map(EditEvent::object_delta)
                .fold(Mat4::IDENTITY, |acc, delta| delta * acc),
        )
    }

    /// First mesh other than `mesh` that recorded an event after `index`
    pub fn foreign_recorder_after(&self, index: usize, mesh: MeshId) -> Option<MeshId> {
        self.events
            .iter()
            .skip(index.saturating_add(1))
            .filter_map(EditEvent::recorded_by)
            .find(|&owner| owner != mesh)
    }

    pub fn history(&self) -> &[EditEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Tick the next appended event will get
    pub fn next_tick(&self) -> u64 {
        self.next_tick
    }

    /// Drop the whole log and the baseline; the freeze snapshot is kept
    pub fn clear(&mut self) {
        self.events.clear();
        self.accumulated = Mat4::IDENTITY;
        self.next_tick = 0;
    }

    /// History panel view of the log
    pub fn entries(&self) -> Vec<HistoryEntry> {
        self.events
            .iter()
            .enumerate()
            .map(|(index, event)| {
                let kind = if event.is_component() {
                    HistoryEntryKind::Component
                } else if event.is_topology() {
                    HistoryEntryKind::Topology
                } else if event.tag == INIT_TAG {
                    HistoryEntryKind::Init
                } else {
                    HistoryEntryKind::Transform
                };
                HistoryEntry {
                    index,
                    tick: event.tick,
                    tag: event.tag.clone(),
                    kind,
                }
            })
            .collect()
    }

    /// Truncate to `index + 1` events and refold the accumulated transform.
    ///
    /// Only the log changes; geometry is left alone. An empty log resets the
    /// accumulated transform to identity. Out-of-range indices are a no-op.
    pub fn rewind_to(&mut self, index: usize) {
        if self.events.is_empty() {
            self.accumulated = Mat4::IDENTITY;
            return;
        }
        if index >= self.events.len() {
            return;
        }
        self.truncate(index + 1);
    }

    fn truncate(&mut self, len: usize) {
        self.events.truncate(len);
        self.accumulated = self.accumulated_up_to(len);
        self.next_tick = self.events.last().map_or(0, |event| event.tick + 1);
        debug!(
            "{}: rewound to {} event(s), next tick {}",
            self.name,
            self.events.len(),
            self.next_tick
        );
    }

    // ========================================================================
    // Freeze
    // ========================================================================

    /// Snapshot vertex positions and the model matrix, unless one exists
    pub fn freeze_from(&mut self, geometry: &MeshGeometry) {
        if self.freeze.is_none() {
            self.refreeze_from(geometry);
        }
    }

    /// Replace the snapshot with the current geometry
    pub fn refreeze_from(&mut self, geometry: &MeshGeometry) {
        self.freeze = Some(FreezeSnapshot {
            mesh: geometry.mesh_id(),
            model: geometry.model_matrix(),
            positions: geometry
                .vertices()
                .map(|v| (v.id, v.local_position))
                .collect(),
        });
    }

    pub fn has_freeze(&self) -> bool {
        self.freeze.is_some()
    }

    pub fn frozen_model(&self) -> Option<Mat4> {
        self.freeze.as_ref().map(|snapshot| snapshot.model)
    }

    /// Move frozen vertices back to their snapshot positions and restore
    /// the frozen model matrix. Vertices removed since are skipped. A
    /// snapshot taken from another mesh is left unapplied.
    pub fn reset_to_freeze(&self, geometry: &mut MeshGeometry) -> Vec<Diagnostic> {
        let mut diagnostics = Vec::new();
        let Some(snapshot) = &self.freeze else {
            return diagnostics;
        };
        if snapshot.mesh != geometry.mesh_id() {
            diagnostics.push(Diagnostic::ForeignHistory { mesh: snapshot.mesh }.emit());
            return diagnostics;
        }
        for &(vertex, position) in &snapshot.positions {
            if geometry.set_vertex_local_position(vertex, position).is_err() {
                diagnostics.push(Diagnostic::StaleHandle { element: "vertex" }.emit());
            }
        }
        geometry.set_model_matrix(snapshot.model);
        diagnostics
    }
}
