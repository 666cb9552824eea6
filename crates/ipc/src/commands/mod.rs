//! Command types for IPC messages.

mod mesh_edit;

pub use mesh_edit::*;
