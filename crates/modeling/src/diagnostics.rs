//! Non-fatal conditions reported by the store, the operators, and rewinds.
//!
//! Operators degrade and continue on these instead of failing; every
//! diagnostic is also logged at `warn` level when it is recorded.

use std::fmt;

use tracing::warn;

use crate::mesh::{EdgeId, MeshId, QuadId, VertexId};

/// A recoverable problem met while editing
#[derive(Debug, Clone, PartialEq)]
pub enum Diagnostic {
    /// An edge gained a quad past the manifold cap; the oldest was dropped
    ManifoldTruncated { edge: EdgeId, dropped: QuadId },
    /// The face normal was too short, +Z was used instead
    DegenerateNormal { quad: QuadId },
    /// A handle recorded earlier no longer resolves
    StaleHandle { element: &'static str },
    /// An edge could not be removed because quads still use it
    EdgeInUse { edge: EdgeId },
    /// A vertex could not be removed because edges still use it
    VertexInUse { vertex: VertexId },
    /// A shared history holds events of another mesh in the rewind range;
    /// nothing was undone
    ForeignHistory { mesh: MeshId },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::ManifoldTruncated { edge, dropped } => write!(
                f,
                "Edge {:?} exceeds the manifold limit, dropping oldest quad {:?}",
                edge, dropped
            ),
            Diagnostic::DegenerateNormal { quad } => {
                write!(f, "Quad {:?} has a degenerate normal, using +Z", quad)
            }
            Diagnostic::StaleHandle { element } => write!(f, "Skipping stale {} handle", element),
            Diagnostic::EdgeInUse { edge } => {
                write!(f, "Edge {:?} is still used by quads, not removed", edge)
            }
            Diagnostic::VertexInUse { vertex } => {
                write!(f, "Vertex {:?} is still used by edges, not removed", vertex)
            }
            Diagnostic::ForeignHistory { mesh } => write!(
                f,
                "History after the rewind point holds events of mesh {:?}, rewind refused",
                mesh
            ),
        }
    }
}

impl Diagnostic {
    /// Log this diagnostic and return it
    pub(crate) fn emit(self) -> Self {
        warn!("{}", self);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_names_element() {
        let diagnostic = Diagnostic::StaleHandle { element: "quad" }.emit();
        assert_eq!(diagnostic.to_string(), "Skipping stale quad handle");
    }
}
