//! Primitive mesh builders.
//!
//! Every builder returns a finalized mesh whose history starts with the
//! `"init"` event.

use glam::{Mat4, Vec3};
use quadsmith_config::EditConfig;

use crate::mesh::{EdgeId, Mesh, MeshError, VertexId};

/// Unit cube corners, centered on the origin
const CUBE_POSITIONS: [[f32; 3]; 8] = [
    [-0.5, -0.5, -0.5],
    [0.5, -0.5, -0.5],
    [0.5, 0.5, -0.5],
    [-0.5, 0.5, -0.5],
    [-0.5, -0.5, 0.5],
    [0.5, -0.5, 0.5],
    [0.5, 0.5, 0.5],
    [-0.5, 0.5, 0.5],
];

const CUBE_EDGES: [[usize; 2]; 12] = [
    [0, 1],
    [1, 2],
    [2, 3],
    [3, 0],
    [4, 5],
    [5, 6],
    [6, 7],
    [7, 4],
    [0, 4],
    [1, 5],
    [2, 6],
    [3, 7],
];

const CUBE_FACE_VERTICES: [[usize; 4]; 6] = [
    [0, 1, 2, 3],
    [4, 5, 6, 7],
    [0, 4, 5, 1],
    [3, 2, 6, 7],
    [0, 3, 7, 4],
    [1, 5, 6, 2],
];

/// Indices into [`CUBE_EDGES`]; entry `i` joins face vertices `i` and `i + 1`
const CUBE_FACE_EDGES: [[usize; 4]; 6] = [
    [0, 1, 2, 3],
    [4, 5, 6, 7],
    [8, 4, 9, 0],
    [2, 10, 6, 11],
    [3, 11, 7, 8],
    [9, 5, 10, 1],
];

/// Build a cube of edge length `size` centered on `center`.
///
/// Vertices stay on the unit cube in local space; size and position live in
/// the model matrix `translate(center) * scale(size)`.
pub fn create_cube_mesh(size: f32, center: Vec3, name: &str) -> Result<Mesh, MeshError> {
    create_cube_mesh_with_config(size, center, name, EditConfig::default())
}

/// Build a cube with the configured default size at the origin
pub fn create_default_cube(name: &str, config: &EditConfig) -> Result<Mesh, MeshError> {
    create_cube_mesh_with_config(config.cube_size, Vec3::ZERO, name, config.clone())
}

fn create_cube_mesh_with_config(
    size: f32,
    center: Vec3,
    name: &str,
    config: EditConfig,
) -> Result<Mesh, MeshError> {
    let mut mesh = Mesh::with_config(name, config);
    mesh.geometry_mut()
        .set_model_matrix(Mat4::from_translation(center) * Mat4::from_scale(Vec3::splat(size)));

    let mut vertices: Vec<VertexId> = Vec::with_capacity(CUBE_POSITIONS.len());
    for (i, position) in CUBE_POSITIONS.iter().enumerate() {
        let name = format!("{name}_v{i}");
        vertices.push(mesh.add_vertex(Vec3::from_array(*position), Some(&name))?);
    }

    let mut edges: Vec<EdgeId> = Vec::with_capacity(CUBE_EDGES.len());
    for [a, b] in CUBE_EDGES {
        edges.push(mesh.add_edge(vertices[a], vertices[b])?);
    }

    for (face_vertices, face_edges) in CUBE_FACE_VERTICES.iter().zip(&CUBE_FACE_EDGES) {
        mesh.add_quad(face_vertices.map(|i| vertices[i]), face_edges.map(|i| edges[i]))?;
    }

    mesh.finalize()?;
    Ok(mesh)
}

/// Build the unit quad (0,0,0) (1,0,0) (1,1,0) (0,1,0) with vertices `v0..v3`
pub fn create_quad_mesh(name: &str) -> Result<Mesh, MeshError> {
    let mut mesh = Mesh::new(name);
    let positions = [
        Vec3::new(0.0, 0.0, 0.0),
        Vec3::new(1.0, 0.0, 0.0),
        Vec3::new(1.0, 1.0, 0.0),
        Vec3::new(0.0, 1.0, 0.0),
    ];
    let mut v = [VertexId::default(); 4];
    for (i, position) in positions.into_iter().enumerate() {
        v[i] = mesh.add_vertex(position, Some(&format!("v{i}")))?;
    }
    let mut e = [EdgeId::default(); 4];
    for i in 0..4 {
        e[i] = mesh.add_edge(v[i], v[(i + 1) % 4])?;
    }
    mesh.add_quad(v, e)?;
    mesh.finalize()?;
    Ok(mesh)
}

/// Build an open grid of `columns * rows` unit quads in the XY plane
pub fn create_grid_mesh(columns: usize, rows: usize, name: &str) -> Result<Mesh, MeshError> {
    let mut mesh = Mesh::new(name);
    let stride = columns + 1;

    let mut vertices = Vec::with_capacity(stride * (rows + 1));
    for r in 0..=rows {
        for c in 0..=columns {
            vertices.push(mesh.add_vertex(Vec3::new(c as f32, r as f32, 0.0), None)?);
        }
    }
    let at = |c: usize, r: usize| vertices[r * stride + c];

    // horizontal[r][c] joins (c, r) -> (c + 1, r); vertical[r][c] joins (c, r) -> (c, r + 1)
    let mut horizontal = Vec::with_capacity(rows + 1);
    for r in 0..=rows {
        let mut row = Vec::with_capacity(columns);
        for c in 0..columns {
            row.push(mesh.add_edge(at(c, r), at(c + 1, r))?);
        }
        horizontal.push(row);
    }
    let mut vertical = Vec::with_capacity(rows);
    for r in 0..rows {
        let mut row = Vec::with_capacity(stride);
        for c in 0..=columns {
            row.push(mesh.add_edge(at(c, r), at(c, r + 1))?);
        }
        vertical.push(row);
    }

    for r in 0..rows {
        for c in 0..columns {
            mesh.add_quad(
                [at(c, r), at(c + 1, r), at(c + 1, r + 1), at(c, r + 1)],
                [
                    horizontal[r][c],
                    vertical[r][c + 1],
                    horizontal[r + 1][c],
                    vertical[r][c],
                ],
            )?;
        }
    }

    mesh.finalize()?;
    Ok(mesh)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edit::ExtrudeRecord;
    use crate::history::INIT_TAG;
    use crate::mesh::QuadId;

    fn cube_edges(mesh: &Mesh) -> Vec<EdgeId> {
        mesh.geometry().edges().map(|e| e.id).collect()
    }

    fn cube_quads(mesh: &Mesh) -> Vec<QuadId> {
        mesh.geometry().quads().map(|q| q.id).collect()
    }

    #[test]
    fn test_cube_counts() {
        let cube = create_cube_mesh(1.0, Vec3::ZERO, "cube").unwrap();
        let geometry = cube.geometry();
        assert_eq!(geometry.vertex_count(), 8);
        assert_eq!(geometry.edge_count(), 12);
        assert_eq!(geometry.quad_count(), 6);
        assert!(geometry.validate().is_ok());
        assert!(geometry.edges().all(|e| e.shared_quads.len() == 2));
        assert!(geometry.quads().all(|q| q.owner == Some(cube.id())));
        cube.with_dna(|dna| assert_eq!(dna.history()[0].tag, INIT_TAG));
    }

    #[test]
    fn test_cube_model_matrix() {
        let cube = create_cube_mesh(2.0, Vec3::new(0.0, 0.0, 5.0), "cube").unwrap();
        assert_eq!(
            cube.model_matrix(),
            Mat4::from_translation(Vec3::new(0.0, 0.0, 5.0)) * Mat4::from_scale(Vec3::splat(2.0))
        );
        let corner = cube.geometry().vertices().last().unwrap();
        assert_eq!(corner.local_position, Vec3::new(-0.5, 0.5, 0.5));
        assert_eq!(corner.world_position, Vec3::new(-1.0, 1.0, 6.0));
        cube.with_dna(|dna| assert_eq!(dna.accumulated(), cube.model_matrix()));
    }

    #[test]
    fn test_default_cube_uses_config_size() {
        let config = EditConfig {
            cube_size: 3.0,
            ..EditConfig::default()
        };
        let cube = create_default_cube("cube", &config).unwrap();
        assert_eq!(cube.model_matrix(), Mat4::from_scale(Vec3::splat(3.0)));
        assert_eq!(cube.geometry().config().cube_size, 3.0);
    }

    #[test]
    fn test_cube_walk_is_closed_ring() {
        let cube = create_cube_mesh(1.0, Vec3::ZERO, "cube").unwrap();
        let edges = cube_edges(&cube);
        let quads = cube_quads(&cube);

        let ring = cube.walk_edge_loop(edges[0]).unwrap();
        assert!(ring.closed);
        assert_eq!(ring.quads, vec![quads[0], quads[3], quads[1], quads[2]]);
        let expected: Vec<EdgeId> = [1, 3, 10, 11, 7, 5, 9, 8].iter().map(|&i| edges[i]).collect();
        assert_eq!(ring.rungs, expected);
        assert_eq!(ring.crossed, vec![edges[0], edges[2], edges[6], edges[4]]);
    }

    #[test]
    fn test_cube_cut_opens_ring() {
        let mut cube = create_cube_mesh(1.0, Vec3::ZERO, "cube").unwrap();
        let edges = cube_edges(&cube);
        let ring = cube.walk_edge_loop(edges[0]).unwrap();

        let cut = cube.cut_loop(&ring.crossed, &ring.quads).unwrap();
        assert_eq!(cut.centers.len(), 4);
        assert_eq!(cut.ring_edges.len(), 4);

        let geometry = cube.geometry();
        assert_eq!(geometry.vertex_count(), 12);
        assert_eq!(geometry.edge_count(), 20);
        assert_eq!(geometry.quad_count(), 2);
        assert_eq!(geometry.boundary_edges().len(), 12);
        assert!(geometry.edges().all(|e| e.shared_quads.len() <= 2));

        let center = geometry.vertex(cut.centers[0]).unwrap();
        assert_eq!(center.local_position, Vec3::new(0.0, -0.5, -0.5));
    }

    #[test]
    fn test_cube_extrude_points_outward() {
        let mut cube = create_cube_mesh(1.0, Vec3::ZERO, "cube").unwrap();
        let quads = cube_quads(&cube);

        let bottom = cube.extrude_face(quads[0], 0.5).unwrap();
        assert_eq!(bottom.record.normal, Vec3::NEG_Z);
        let top = cube.extrude_face(quads[1], 0.5).unwrap();
        assert_eq!(top.record.normal, Vec3::Z);

        let geometry = cube.geometry();
        assert_eq!(geometry.vertex_count(), 16);
        assert_eq!(geometry.edge_count(), 28);
        assert_eq!(geometry.quad_count(), 14);
        assert!(geometry.validate().is_ok());
    }

    #[test]
    fn test_cube_double_extrusion_rewind() {
        let mut cube = create_cube_mesh(1.0, Vec3::ZERO, "cube").unwrap();
        let quads = cube_quads(&cube);
        let shared_before: Vec<Vec<QuadId>> = cube
            .geometry()
            .edges()
            .map(|e| e.shared_quads.clone())
            .collect();

        let first = cube.extrude_face(quads[1], 0.3).unwrap();
        let second = cube.extrude_face(first.cap_quad(), 0.3).unwrap();
        assert_eq!(cube.geometry().quad_count(), 14);
        let records: Vec<ExtrudeRecord> = vec![first.record, second.record];

        let report = cube.rewind_extrude_history(0);
        assert_eq!(report.undone, 2);
        assert!(report.diagnostics.is_empty());

        let geometry = cube.geometry();
        assert_eq!(geometry.vertex_count(), 8);
        assert_eq!(geometry.edge_count(), 12);
        assert_eq!(geometry.quad_count(), 6);
        assert!(geometry.validate().is_ok());
        for record in &records {
            assert!(record.new_vertices.iter().all(|&v| geometry.vertex(v).is_none()));
        }

        // Shared lists come back in their original order, with the top face
        // under its fresh handle
        let top = report.resolve_quad(quads[1]);
        let shared_after: Vec<Vec<QuadId>> = geometry
            .edges()
            .map(|e| e.shared_quads.clone())
            .collect();
        let expected: Vec<Vec<QuadId>> = shared_before
            .into_iter()
            .map(|list| {
                list.into_iter()
                    .map(|q| if q == quads[1] { top } else { q })
                    .collect()
            })
            .collect();
        assert_eq!(shared_after, expected);
    }

    #[test]
    fn test_quad_mesh_round_trip() {
        let mut mesh = create_quad_mesh("quad").unwrap();
        let quad = mesh.geometry().quads().next().unwrap().id;

        mesh.extrude_face(quad, 0.2).unwrap();
        assert_eq!(mesh.geometry().vertex_count(), 8);
        assert_eq!(mesh.geometry().edge_count(), 12);
        assert_eq!(mesh.geometry().quad_count(), 5);

        let extrude_index = mesh.with_dna(|dna| dna.len() - 1);
        mesh.rewind_extrude_history(extrude_index - 1);
        assert_eq!(mesh.geometry().vertex_count(), 4);
        assert_eq!(mesh.geometry().edge_count(), 4);
        assert_eq!(mesh.geometry().quad_count(), 1);

        let restored = mesh.geometry().quads().next().unwrap();
        let names: Vec<&str> = restored
            .vertices
            .iter()
            .map(|&v| mesh.geometry().vertex(v).unwrap().name.as_str())
            .collect();
        assert_eq!(names, vec!["v0", "v1", "v2", "v3"]);
        mesh.with_dna(|dna| assert_ne!(dna.history().last().unwrap().tag, "extrude_face"));
    }

    #[test]
    fn test_grid_walk_is_open() {
        let grid = create_grid_mesh(3, 2, "grid").unwrap();
        let geometry = grid.geometry();
        assert_eq!(geometry.vertex_count(), 12);
        assert_eq!(geometry.edge_count(), 17);
        assert_eq!(geometry.quad_count(), 6);
        assert!(geometry.validate().is_ok());

        // First vertical edge of the bottom row, at (0,0) -> (0,1)
        let start = geometry
            .find_edge(geometry.vertices().next().unwrap().id, geometry.vertices().nth(4).unwrap().id)
            .unwrap();
        let ring = grid.walk_edge_loop(start).unwrap();
        assert!(!ring.closed);
        assert_eq!(ring.quads.len(), 3);
        assert_eq!(ring.rungs.len(), 6);
        assert_eq!(ring.crossed.len(), 4);
    }
}
