//! Shared mesh fixtures for unit and integration tests.

use crate::mesh::{GrobArray, GrobKind, Mesh, RealArrayAnnex, keys};

fn build_mesh(coords: Vec<f64>, blocks: Vec<(GrobKind, Vec<usize>)>) -> Mesh {
    let num_vertices = coords.len() / 3;
    let mut mesh = Mesh::new();
    mesh.resize_vertices(num_vertices).unwrap();
    mesh.set_annex(
        keys::vertex_coords(),
        RealArrayAnnex::from_flat(3, coords).unwrap(),
    );
    for (kind, inds) in blocks {
        mesh.set_grobs(GrobArray::from_flat(kind, inds).unwrap())
            .unwrap();
    }
    mesh
}

/// Two triangles sharing the edge (1, 2) on the unit square.
pub fn make_two_tris() -> Mesh {
    build_mesh(
        vec![
            0.0, 0.0, 0.0, //
            1.0, 0.0, 0.0, //
            0.0, 1.0, 0.0, //
            1.0, 1.0, 0.0,
        ],
        vec![(GrobKind::TRI, vec![0, 1, 2, 2, 1, 3])],
    )
}

/// A triangulated circle: 12 faces forming a fan around the center vertex.
///
/// Every face touches every other face through the center vertex
/// (vertex-valence 11) and exactly two faces through its edges
/// (edge-valence 2).
pub fn make_circle_12() -> Mesh {
    let mut coords = vec![0.0, 0.0, 0.0];
    for k in 0..12 {
        let angle = 2.0 * std::f64::consts::PI * f64::from(k) / 12.0;
        coords.extend_from_slice(&[angle.cos(), angle.sin(), 0.0]);
    }

    let mut tris = Vec::with_capacity(12 * 3);
    for k in 0..12 {
        tris.extend_from_slice(&[0, 1 + k, 1 + (k + 1) % 12]);
    }

    build_mesh(coords, vec![(GrobKind::TRI, tris)])
}

/// The unit tetrahedron, regularly refined once into 8 child tets.
///
/// Vertices 0..4 are the corners, 4..10 the edge midpoints in the edge order
/// of the TET descriptor. Of the 24 unique faces, 16 lie on the boundary
/// (cell-valence 1) and 8 between the children (cell-valence 2).
pub fn make_refined_tet() -> Mesh {
    let corners = [
        [0.0, 0.0, 0.0],
        [1.0, 0.0, 0.0],
        [0.0, 1.0, 0.0],
        [0.0, 0.0, 1.0],
    ];
    let edges = [(0, 1), (1, 2), (2, 0), (0, 3), (1, 3), (2, 3)];

    let mut coords = Vec::with_capacity(10 * 3);
    for corner in corners {
        coords.extend_from_slice(&corner);
    }
    for (a, b) in edges {
        for c in 0..3 {
            coords.push(0.5 * (corners[a][c] + corners[b][c]));
        }
    }

    // corner children plus the octahedron split around the (6, 8) diagonal
    let tets = vec![
        0, 4, 6, 7, //
        4, 1, 5, 8, //
        6, 5, 2, 9, //
        7, 8, 9, 3, //
        4, 6, 7, 8, //
        4, 5, 6, 8, //
        6, 7, 8, 9, //
        5, 6, 8, 9,
    ];

    build_mesh(coords, vec![(GrobKind::TET, tets)])
}

/// A mixed surface: a strip of four quads with four triangles on top.
///
/// Its 19 unique edges split into 10 boundary edges (face-valence 1) and 9
/// interior edges (face-valence 2).
pub fn make_tri_quad_surface() -> Mesh {
    let mut coords = Vec::new();
    for i in 0..5 {
        coords.extend_from_slice(&[f64::from(i), 0.0, 0.0]);
    }
    for i in 0..5 {
        coords.extend_from_slice(&[f64::from(i), 1.0, 0.0]);
    }
    coords.extend_from_slice(&[0.5, 2.0, 0.0]);
    coords.extend_from_slice(&[2.5, 2.0, 0.0]);

    let quads = vec![
        0, 1, 6, 5, //
        1, 2, 7, 6, //
        2, 3, 8, 7, //
        3, 4, 9, 8,
    ];
    let tris = vec![
        5, 6, 10, //
        6, 11, 10, //
        6, 7, 11, //
        7, 8, 11,
    ];

    build_mesh(
        coords,
        vec![(GrobKind::TRI, tris), (GrobKind::QUAD, quads)],
    )
}

/// A hybrid volume mesh with one cell of every 3D kind.
///
/// A pyramid sits on the top face of a hexahedron, a tetrahedron leans
/// against one pyramid face and a prism against one tetrahedron face, so
/// three of the 17 unique faces are interior (cell-valence 2).
pub fn make_hybrid_mesh() -> Mesh {
    let coords = vec![
        0.0, 0.0, 0.0, //
        1.0, 0.0, 0.0, //
        1.0, 1.0, 0.0, //
        0.0, 1.0, 0.0, //
        0.0, 0.0, 1.0, //
        1.0, 0.0, 1.0, //
        1.0, 1.0, 1.0, //
        0.0, 1.0, 1.0, //
        0.5, 0.5, 2.0, //
        0.5, -1.0, 1.5, //
        3.0, 0.0, 1.0, //
        2.5, 0.5, 2.0, //
        2.5, -1.0, 1.5,
    ];

    build_mesh(
        coords,
        vec![
            (GrobKind::TET, vec![4, 5, 8, 9]),
            (GrobKind::HEX, vec![0, 1, 2, 3, 4, 5, 6, 7]),
            (GrobKind::PYRA, vec![4, 5, 6, 7, 8]),
            (GrobKind::PRISM, vec![5, 8, 9, 10, 11, 12]),
        ],
    )
}
