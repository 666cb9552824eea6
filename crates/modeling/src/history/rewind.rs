//! Geometry-aware rewinds.
//!
//! Removed events are undone newest first. Component deltas are inverted on
//! their vertices; extrusions are reverted through the store. The log is
//! truncated in every case, whether or not an event kind was undone.

use glam::Mat4;
use tracing::{debug, trace};

use super::events::{DeltaScope, EditPayload, TopologyEdit, TransformDelta};
use super::MeshDna;
use crate::diagnostics::Diagnostic;
use crate::edit::revert_extrude;
use crate::mesh::{MeshGeometry, QuadId, VertexId};

/// Outcome of a geometry-aware rewind
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RewindReport {
    /// Number of events removed from the log
    pub removed: usize,
    /// Number of removed events whose effect was undone on the geometry
    pub undone: usize,
    /// `(old, new)` handles of quads restored by reverting extrusions
    pub restored_quads: Vec<(QuadId, QuadId)>,
    pub diagnostics: Vec<Diagnostic>,
}

impl RewindReport {
    /// Current handle for `quad` after the restorations in this report
    pub fn resolve_quad(&self, quad: QuadId) -> QuadId {
        self.restored_quads
            .iter()
            .rev()
            .find(|(old, _)| *old == quad)
            .map_or(quad, |&(_, new)| new)
    }
}

#[derive(Clone, Copy)]
struct Undo {
    components: bool,
    topology: bool,
}

impl MeshDna {
    /// Truncate to `index + 1` events, inverting every removed component edit
    /// on `geometry`. Out-of-range indices are a no-op.
    pub fn rewind_component_history(
        &mut self,
        index: usize,
        geometry: &mut MeshGeometry,
    ) -> RewindReport {
        self.rewind_with(
            index,
            geometry,
            Undo {
                components: true,
                topology: false,
            },
        )
    }

    /// Truncate to `index + 1` events, reverting every removed extrusion on
    /// `geometry`. Out-of-range indices are a no-op.
    pub fn rewind_extrude_history(
        &mut self,
        index: usize,
        geometry: &mut MeshGeometry,
    ) -> RewindReport {
        self.rewind_with(
            index,
            geometry,
            Undo {
                components: false,
                topology: true,
            },
        )
    }

    /// Truncate to `index + 1` events and undo every removed event.
    ///
    /// Every geometry-aware rewind is refused with
    /// [`Diagnostic::ForeignHistory`] when an event after `index` belongs to
    /// a mesh other than the one `geometry` stores.
    pub fn rewind(&mut self, index: usize, geometry: &mut MeshGeometry) -> RewindReport {
        self.rewind_with(
            index,
            geometry,
            Undo {
                components: true,
                topology: true,
            },
        )
    }

    fn rewind_with(&mut self, index: usize, geometry: &mut MeshGeometry, undo: Undo) -> RewindReport {
        let mut report = RewindReport::default();
        if index >= self.events.len() {
            return report;
        }

        // Another mesh's records would resolve against the wrong store
        if let Some(other) = self.foreign_recorder_after(index, geometry.mesh_id()) {
            report
                .diagnostics
                .push(Diagnostic::ForeignHistory { mesh: other }.emit());
            return report;
        }

        let keep = index + 1;
        report.removed = self.events.len() - keep;
        for position in (keep..self.events.len()).rev() {
            let payload = self.events[position].payload.clone();
            match payload {
                EditPayload::Transform(TransformDelta {
                    delta,
                    scope: DeltaScope::Component { vertices, .. },
                    ..
                }) if undo.components => {
                    invert_component_delta(geometry, delta, &vertices, &mut report.diagnostics);
                    report.undone += 1;
                }
                EditPayload::Topology(TopologyEdit::Extrude(record)) if undo.topology => {
                    let revert = revert_extrude(geometry, &record);
                    report.diagnostics.extend(revert.diagnostics);
                    if let Some(restored) = revert.restored {
                        // Older records may still name the removed target
                        for event in &mut self.events[..position] {
                            if let EditPayload::Topology(edit) = &mut event.payload {
                                edit.remap_quad(record.target, restored);
                            }
                        }
                        report.restored_quads.push((record.target, restored));
                    }
                    report.undone += 1;
                }
                _ => {}
            }
        }

        self.truncate(keep);
        debug!(
            "{}: rewind removed {} event(s), undid {}, {} diagnostic(s)",
            self.name,
            report.removed,
            report.undone,
            report.diagnostics.len()
        );
        report
    }
}

/// Undo a world-space `delta` on `vertices`.
///
/// With model `P`: `world = P * local`, `world' = delta^-1 * world`,
/// `local' = P^-1 * world'`.
fn invert_component_delta(
    geometry: &mut MeshGeometry,
    delta: Mat4,
    vertices: &[VertexId],
    diagnostics: &mut Vec<Diagnostic>,
) {
    let model = geometry.model_matrix();
    let undo = model.inverse() * delta.inverse() * model;
    for &v in vertices {
        let Some(vertex) = geometry.vertex(v) else {
            diagnostics.push(Diagnostic::StaleHandle { element: "vertex" }.emit());
            continue;
        };
        let local = undo.transform_point3(vertex.local_position);
        if geometry.set_vertex_local_position(v, local).is_err() {
            diagnostics.push(Diagnostic::StaleHandle { element: "vertex" }.emit());
        }
    }
    trace!("invert_component_delta: {} vertex(es)", vertices.len());
}
