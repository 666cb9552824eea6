//! Mesh edit command dispatch
//!
//! Maps [`MeshEditCommand`]s coming over the UI boundary onto the mesh and
//! its selection, and builds the [`ModelerToUi`] updates that follow.

use glam::Mat4;
use quadsmith_config::EditConfig;
use quadsmith_ipc::{MeshEditCommand, ModelerToUi, UiToModeler};
use tracing::{debug, info};

use crate::diagnostics::Diagnostic;
use crate::edit::{EditError, LoopCut};
use crate::history::RewindReport;
use crate::mesh::{Mesh, QuadId};
use crate::selection::MeshSelection;

/// What a command changed
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommandOutcome {
    pub mode_changed: bool,
    pub selection_changed: bool,
    pub history_changed: bool,
    /// Cap quads of the extrusions run by the command
    pub caps: Vec<QuadId>,
    pub cut: Option<LoopCut>,
    pub rewind: Option<RewindReport>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Run one command against `mesh` and `selection`.
///
/// On `Err` nothing was mutated by the failing step; a multi-face extrusion
/// keeps the faces it extruded before the failure.
pub fn execute(
    mesh: &mut Mesh,
    selection: &mut MeshSelection,
    config: &EditConfig,
    command: MeshEditCommand,
) -> Result<CommandOutcome, EditError> {
    let mut outcome = CommandOutcome::default();

    match command {
        MeshEditCommand::SetSelectionMode(mode) => {
            selection.mode = mode;
            info!("Set selection mode to {:?}", mode);
            outcome.mode_changed = true;
        }
        MeshEditCommand::SetTool(tool) => {
            selection.tool = tool;
            info!("Set tool to {:?}", tool);
            outcome.mode_changed = true;
        }
        MeshEditCommand::SelectAll => {
            selection.select_all(mesh.geometry());
            outcome.selection_changed = true;
        }
        MeshEditCommand::DeselectAll => {
            selection.clear();
            outcome.selection_changed = true;
        }
        MeshEditCommand::InvertSelection => {
            selection.invert(mesh.geometry());
            outcome.selection_changed = true;
        }
        MeshEditCommand::ExtrudeSelectedFace { distance } => {
            let distance = distance.unwrap_or(config.extrude_distance);
            selection.retain_live(mesh.geometry());
            let targets: Vec<QuadId> = selection.quads.iter().copied().collect();

            for quad in targets {
                let extrusion = mesh.extrude_face(quad, distance)?;
                selection.replace_quad(quad, extrusion.cap_quad());
                outcome.caps.push(extrusion.cap_quad());
                outcome.diagnostics.extend(extrusion.diagnostics);
                outcome.history_changed = true;
            }
            selection.retain_live(mesh.geometry());
            outcome.selection_changed = !outcome.caps.is_empty();
            debug!("Extruded {} face(s) by {}", outcome.caps.len(), distance);
        }
        MeshEditCommand::SelectEdgeLoop { edge_index } => {
            let start = mesh
                .geometry()
                .edges()
                .nth(edge_index)
                .map(|edge| edge.id)
                .ok_or(EditError::EdgeIndexOutOfRange(edge_index))?;
            let ring = mesh.walk_edge_loop(start)?;

            selection.edges = ring.crossed.iter().copied().collect();
            selection.quads = ring.quads.iter().copied().collect();
            selection.edge_loop = Some(ring);
            outcome.selection_changed = true;
        }
        MeshEditCommand::CutSelectedLoop => {
            selection.retain_live(mesh.geometry());
            let ring = selection.edge_loop.take().ok_or(EditError::NoLoopSelected)?;
            let cut = match mesh.cut_loop(&ring.crossed, &ring.quads) {
                Ok(cut) => cut,
                Err(err) => {
                    selection.edge_loop = Some(ring);
                    return Err(err);
                }
            };

            selection.clear();
            selection.edges = cut.ring_edges.iter().copied().collect();
            outcome.cut = Some(cut);
            outcome.selection_changed = true;
        }
        MeshEditCommand::RewindHistory { index } => {
            let report = mesh.rewind(index);
            selection.apply_rewind(&report, mesh.geometry());
            outcome.diagnostics.extend(report.diagnostics.iter().cloned());
            outcome.history_changed = report.removed > 0;
            outcome.selection_changed = true;
            outcome.rewind = Some(report);
        }
        MeshEditCommand::TransformMesh { matrix, tag } => {
            mesh.apply_transform(Mat4::from_cols_array(&matrix), &tag);
            outcome.history_changed = true;
        }
    }

    Ok(outcome)
}

/// UI updates describing `outcome`
pub fn updates(outcome: &CommandOutcome, mesh: &Mesh, selection: &MeshSelection) -> Vec<ModelerToUi> {
    let mut messages = Vec::new();
    if outcome.mode_changed {
        messages.push(ModelerToUi::MeshEditModeChanged {
            selection_mode: selection.mode,
            tool: selection.tool,
        });
    }
    if outcome.selection_changed {
        messages.push(selection_changed(selection));
    }
    if outcome.history_changed {
        messages.push(ModelerToUi::HistoryChanged {
            entries: mesh.with_dna(|dna| dna.entries()),
        });
    }
    if !outcome.diagnostics.is_empty() {
        messages.push(ModelerToUi::Warnings {
            messages: outcome.diagnostics.iter().map(ToString::to_string).collect(),
        });
    }
    messages
}

/// Handle one message from the UI. Failures become an `Error` update.
pub fn handle_message(
    mesh: &mut Mesh,
    selection: &mut MeshSelection,
    config: &EditConfig,
    message: UiToModeler,
) -> Vec<ModelerToUi> {
    match message {
        UiToModeler::MeshEditCommand(command) => {
            match execute(mesh, selection, config, command) {
                Ok(outcome) => updates(&outcome, mesh, selection),
                Err(err) => vec![ModelerToUi::Error {
                    code: "edit_failed".to_string(),
                    message: err.to_string(),
                }],
            }
        }
        UiToModeler::RequestHistory => vec![ModelerToUi::HistoryChanged {
            entries: mesh.with_dna(|dna| dna.entries()),
        }],
    }
}

fn selection_changed(selection: &MeshSelection) -> ModelerToUi {
    ModelerToUi::MeshEditSelectionChanged {
        vertex_count: selection.vertices.len(),
        edge_count: selection.edges.len(),
        face_count: selection.quads.len(),
    }
}
