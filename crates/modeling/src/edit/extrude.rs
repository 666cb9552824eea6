//! Face extrusion.
//!
//! ```text
//!   nv3 ---- nv2          cap quad on top,
//!    |        |           side quad i joins old[i], old[i+1], nv[i+1], nv[i]
//!   nv0 ---- nv1
//!    :        :   <- up edges
//!   v3 ----- v2
//!    |        |
//!   v0 ----- v1           target quad, removed
//! ```

use glam::{Vec3, Vec4};
use tracing::trace;

use super::EditError;
use crate::diagnostics::Diagnostic;
use crate::mesh::{EdgeId, MeshError, MeshGeometry, MeshId, QuadId, VertexId};

/// Everything needed to undo one extrusion
#[derive(Debug, Clone, PartialEq)]
pub struct ExtrudeRecord {
    pub new_vertices: [VertexId; 4],
    pub cap_edges: [EdgeId; 4],
    /// Whether each cap edge was created by the extrusion rather than reused
    pub cap_edge_created: [bool; 4],
    pub up_edges: [EdgeId; 4],
    pub side_quads: [QuadId; 4],
    pub cap_quad: QuadId,
    pub old_vertices: [VertexId; 4],
    pub old_edges: [EdgeId; 4],
    /// The removed target quad
    pub target: QuadId,
    pub target_owner: Option<MeshId>,
    /// Position of the target in each old edge's shared list
    pub target_slots: [usize; 4],
    pub distance: f32,
    pub normal: Vec3,
}

impl ExtrudeRecord {
    /// Substitute `new` for every occurrence of the quad handle `old`
    pub(crate) fn remap_quad(&mut self, old: QuadId, new: QuadId) {
        let swap = |q: &mut QuadId| {
            if *q == old {
                *q = new;
            }
        };
        swap(&mut self.target);
        swap(&mut self.cap_quad);
        self.side_quads.iter_mut().for_each(swap);
    }
}

/// Result of [`extrude_face`]
#[derive(Debug, Clone)]
pub struct Extrusion {
    pub record: ExtrudeRecord,
    pub diagnostics: Vec<Diagnostic>,
}

impl Extrusion {
    /// The new quad replacing the target at the top of the extrusion
    pub fn cap_quad(&self) -> QuadId {
        self.record.cap_quad
    }
}

/// Result of [`revert_extrude`]
#[derive(Debug, Clone, Default)]
pub struct ExtrudeRevert {
    /// Fresh handle of the restored target, if it could be restored
    pub restored: Option<QuadId>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Extrude `target` along its normal by `distance`.
///
/// The normal is `(p1 - p0) x (p2 - p0)`, flipped when it points toward the
/// mesh centroid. The target is replaced by four side quads and a cap quad;
/// new vertices copy the color of their source and carry its name plus the
/// configured suffix.
pub fn extrude_face(
    geometry: &mut MeshGeometry,
    target: QuadId,
    distance: f32,
) -> Result<Extrusion, EditError> {
    // ===== PHASE 1: GATHER (read-only, fail early) =====
    let quad = geometry
        .quad(target)
        .cloned()
        .ok_or(EditError::QuadNotFound(target))?;
    let owner = quad.owner.ok_or(EditError::NoOwner(target))?;
    if !distance.is_finite() {
        return Err(EditError::InvalidDistance(distance));
    }

    let old_vertices = quad.vertices;
    let old_edges = quad.edges;
    let mut sources: Vec<(Vec3, Vec4, String)> = Vec::with_capacity(4);
    for v in old_vertices {
        let vertex = geometry.vertex(v).ok_or(EditError::StaleQuad(target))?;
        sources.push((vertex.local_position, vertex.color, vertex.name.clone()));
    }
    let mut target_slots = [0usize; 4];
    for (slot, e) in target_slots.iter_mut().zip(old_edges) {
        let edge = geometry.edge(e).ok_or(EditError::StaleQuad(target))?;
        *slot = edge
            .shared_quads
            .iter()
            .position(|&q| q == target)
            .unwrap_or(edge.shared_quads.len());
    }

    let mut diagnostics = Vec::new();

    // ===== PHASE 2: NORMAL =====
    let raw = geometry.quad_normal(target).unwrap_or(Vec3::ZERO);
    let mut normal = if raw.length_squared() < geometry.config().degenerate_normal_epsilon {
        diagnostics.push(Diagnostic::DegenerateNormal { quad: target }.emit());
        Vec3::Z
    } else {
        raw.normalize()
    };
    let face_center = geometry.quad_centroid(target).unwrap_or(Vec3::ZERO);
    if normal.dot(geometry.vertex_centroid() - face_center) > 0.0 {
        normal = -normal;
    }
    let offset = normal * distance;
    let mut new_positions = [Vec3::ZERO; 4];
    for (slot, (position, _, _)) in new_positions.iter_mut().zip(&sources) {
        *slot = *position + offset;
    }
    // A finite distance can still overflow far from the origin
    if !new_positions.iter().all(|p| p.is_finite()) {
        return Err(EditError::InvalidDistance(distance));
    }
    diagnostics.splice(0..0, geometry.take_diagnostics());
    trace!(
        "extrude_face: {:?} normal={:?} distance={}",
        target, normal, distance
    );

    // ===== PHASE 3: REMOVE TARGET =====
    // Must happen before the side quads register on the old edges, otherwise
    // those edges would briefly carry three quads.
    geometry.remove_quad(target)?;

    // ===== PHASE 4: BUILD =====
    let suffix = geometry.config().extruded_name_suffix.clone();
    let mut new_vertices = [VertexId::default(); 4];
    for ((slot, position), (_, color, name)) in
        new_vertices.iter_mut().zip(new_positions).zip(&sources)
    {
        let name = format!("{name}{suffix}");
        *slot = geometry.add_vertex_colored(position, Some(&name), *color)?;
    }

    let mut cap_edges = [EdgeId::default(); 4];
    let mut cap_edge_created = [false; 4];
    for i in 0..4 {
        let (a, b) = (new_vertices[i], new_vertices[(i + 1) % 4]);
        cap_edges[i] = match geometry.find_edge(a, b) {
            Some(existing) => existing,
            None => {
                cap_edge_created[i] = true;
                geometry.add_edge(a, b)?
            }
        };
    }

    let mut up_edges = [EdgeId::default(); 4];
    for i in 0..4 {
        up_edges[i] = geometry.add_edge(old_vertices[i], new_vertices[i])?;
    }

    let mut side_quads = [QuadId::default(); 4];
    for i in 0..4 {
        let i1 = (i + 1) % 4;
        side_quads[i] = geometry.add_quad(
            [old_vertices[i], old_vertices[i1], new_vertices[i1], new_vertices[i]],
            [old_edges[i], up_edges[i1], cap_edges[i], up_edges[i]],
        )?;
        geometry.set_quad_owner(side_quads[i], Some(owner))?;
    }

    let cap_quad = geometry.add_quad(new_vertices, cap_edges)?;
    geometry.set_quad_owner(cap_quad, Some(owner))?;

    // ===== PHASE 5: MANIFOLD PASS =====
    let touched: Vec<EdgeId> = old_edges
        .iter()
        .chain(&cap_edges)
        .chain(&up_edges)
        .copied()
        .collect();
    geometry.enforce_manifold(&touched);
    diagnostics.extend(geometry.take_diagnostics());

    trace!("extrude_face: cap quad {:?}", cap_quad);

    Ok(Extrusion {
        record: ExtrudeRecord {
            new_vertices,
            cap_edges,
            cap_edge_created,
            up_edges,
            side_quads,
            cap_quad,
            old_vertices,
            old_edges,
            target,
            target_owner: Some(owner),
            target_slots,
            distance,
            normal,
        },
        diagnostics,
    })
}

/// Undo an extrusion described by `record`.
///
/// Removes the cap and side quads, the up edges, the cap edges the extrusion
/// created, and the new vertices, then restores the target quad at its
/// recorded shared-list positions. Handles that no longer resolve are
/// skipped with a [`Diagnostic::StaleHandle`].
pub fn revert_extrude(geometry: &mut MeshGeometry, record: &ExtrudeRecord) -> ExtrudeRevert {
    let mut revert = ExtrudeRevert::default();

    for q in std::iter::once(record.cap_quad).chain(record.side_quads) {
        if geometry.remove_quad(q).is_err() {
            revert
                .diagnostics
                .push(Diagnostic::StaleHandle { element: "quad" }.emit());
        }
    }

    let created_caps = record
        .cap_edges
        .iter()
        .zip(record.cap_edge_created)
        .filter(|(_, created)| *created)
        .map(|(&e, _)| e);
    let edges: Vec<EdgeId> = record.up_edges.iter().copied().chain(created_caps).collect();
    for e in edges {
        match geometry.remove_edge(e) {
            Ok(_) => {}
            Err(MeshError::InUse(_)) => {
                revert.diagnostics.push(Diagnostic::EdgeInUse { edge: e }.emit());
            }
            Err(_) => {
                revert
                    .diagnostics
                    .push(Diagnostic::StaleHandle { element: "edge" }.emit());
            }
        }
    }

    for v in record.new_vertices {
        match geometry.remove_vertex(v) {
            Ok(_) => {}
            Err(MeshError::InUse(_)) => {
                revert.diagnostics.push(Diagnostic::VertexInUse { vertex: v }.emit());
            }
            Err(_) => {
                revert
                    .diagnostics
                    .push(Diagnostic::StaleHandle { element: "vertex" }.emit());
            }
        }
    }

    match geometry.restore_quad(
        record.old_vertices,
        record.old_edges,
        record.target_slots,
        record.target_owner,
    ) {
        Ok(restored) => {
            trace!("revert_extrude: restored {:?} as {:?}", record.target, restored);
            revert.restored = Some(restored);
        }
        Err(_) => {
            revert
                .diagnostics
                .push(Diagnostic::StaleHandle { element: "quad" }.emit());
        }
    }
    revert.diagnostics.extend(geometry.take_diagnostics());

    revert
}
