//! Entries of the mesh edit history.

use glam::Mat4;

use crate::edit::ExtrudeRecord;
use crate::mesh::{MeshId, QuadId, VertexId};

/// Tag of the event appended by the first finalize
pub const INIT_TAG: &str = "init";
pub const TRANSLATE_TAG: &str = "translate";
pub const ROTATE_TAG: &str = "rotate";
pub const SCALE_TAG: &str = "scale";
pub const EXTRUDE_TAG: &str = "extrude_face";

/// Which kind of component a gizmo edit moved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentKind {
    Vertex,
    Edge,
    Face,
}

impl ComponentKind {
    pub fn tag(self) -> &'static str {
        match self {
            ComponentKind::Vertex => "vertex_modify",
            ComponentKind::Edge => "edge_modify",
            ComponentKind::Face => "face_modify",
        }
    }
}

/// What a transform delta applies to
#[derive(Debug, Clone, PartialEq)]
pub enum DeltaScope {
    /// The whole object; folds into the accumulated transform
    Object,
    /// A world-space delta applied directly to a set of vertices
    Component {
        kind: ComponentKind,
        vertices: Vec<VertexId>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct TransformDelta {
    pub delta: Mat4,
    pub scope: DeltaScope,
    /// Caller-chosen identity of the transform, if any
    pub transform_id: Option<u64>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TopologyEdit {
    Extrude(ExtrudeRecord),
}

impl TopologyEdit {
    pub(crate) fn remap_quad(&mut self, old: QuadId, new: QuadId) {
        match self {
            TopologyEdit::Extrude(record) => record.remap_quad(old, new),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum EditPayload {
    Transform(TransformDelta),
    Topology(TopologyEdit),
}

/// One entry of the append-only history log
#[derive(Debug, Clone, PartialEq)]
pub struct EditEvent {
    /// Monotonic within the log
    pub tick: u64,
    pub tag: String,
    /// Mesh that recorded the event, if it went through a mesh
    pub mesh: Option<MeshId>,
    pub payload: EditPayload,
}

impl EditEvent {
    /// The object delta this event contributes to the accumulated transform
    pub fn object_delta(&self) -> Option<Mat4> {
        match &self.payload {
            EditPayload::Transform(TransformDelta {
                delta,
                scope: DeltaScope::Object,
                ..
            }) => Some(*delta),
            _ => None,
        }
    }

    /// The mesh this event belongs to.
    ///
    /// Falls back to the target owner of an extrusion tracked directly on
    /// the log.
    pub fn recorded_by(&self) -> Option<MeshId> {
        match &self.payload {
            EditPayload::Topology(TopologyEdit::Extrude(record)) => {
                self.mesh.or(record.target_owner)
            }
            EditPayload::Transform(_) => self.mesh,
        }
    }

    pub fn is_component(&self) -> bool {
        matches!(
            self.payload,
            EditPayload::Transform(TransformDelta {
                scope: DeltaScope::Component { .. },
                ..
            })
        )
    }

    pub fn is_topology(&self) -> bool {
        matches!(self.payload, EditPayload::Topology(_))
    }
}
