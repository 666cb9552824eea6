//! Shared configuration for Quadsmith
//!
//! This crate provides the single source of truth for mesh editing defaults
//! (extrusion distance, manifold limits, naming) shared by the modeling core
//! and the UI boundary.

use serde::{Deserialize, Serialize};

/// Default extrusion distance in local units
pub const DEFAULT_EXTRUDE_DISTANCE: f32 = 0.2;

/// Squared-length threshold below which a face normal is treated as degenerate
pub const DEFAULT_DEGENERATE_NORMAL_EPSILON: f32 = 1e-12;

/// Maximum number of quads an edge may share on a manifold surface
pub const DEFAULT_MAX_SHARED_QUADS: usize = 2;

/// Default vertex color (opaque green)
pub const DEFAULT_VERTEX_COLOR: [f32; 4] = [0.0, 1.0, 0.0, 1.0];

/// Suffix appended to vertex names created by extrusion
pub const DEFAULT_EXTRUDED_NAME_SUFFIX: &str = "_extruded";

/// Default edge length of the cube primitive
pub const DEFAULT_CUBE_SIZE: f32 = 1.0;

/// Editing configuration for a mesh
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditConfig {
    /// Distance used when an extrusion request does not carry one
    pub extrude_distance: f32,
    /// Squared normal length below which the +Z fallback is used
    pub degenerate_normal_epsilon: f32,
    /// Manifold cap on quads sharing one edge
    pub max_shared_quads: usize,
    /// Color given to vertices created without a source vertex
    pub default_vertex_color: [f32; 4],
    /// Suffix for the names of extruded vertices
    pub extruded_name_suffix: String,
    /// Edge length of the cube primitive
    pub cube_size: f32,
}

impl Default for EditConfig {
    fn default() -> Self {
        Self {
            extrude_distance: DEFAULT_EXTRUDE_DISTANCE,
            degenerate_normal_epsilon: DEFAULT_DEGENERATE_NORMAL_EPSILON,
            max_shared_quads: DEFAULT_MAX_SHARED_QUADS,
            default_vertex_color: DEFAULT_VERTEX_COLOR,
            extruded_name_suffix: DEFAULT_EXTRUDED_NAME_SUFFIX.to_string(),
            cube_size: DEFAULT_CUBE_SIZE,
        }
    }
}

impl EditConfig {
    /// Create a config with a custom extrusion distance
    pub fn with_extrude_distance(distance: f32) -> Self {
        Self {
            extrude_distance: distance,
            ..Self::default()
        }
    }

    /// Manifold cap, never below one
    pub fn shared_quad_limit(&self) -> usize {
        self.max_shared_quads.max(1)
    }
}
