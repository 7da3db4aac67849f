use serde::{Deserialize, Serialize};

use crate::mesh::grob_set::GrobSetKind;

/// Number of grob kinds in the closed taxonomy.
pub const NUM_GROB_KINDS: usize = 8;

/// Highest topological dimension of any grob.
pub const MAX_GROB_DIM: usize = 3;

/// All kinds of grid objects (grobs) supported in gromesh.
///
/// A grob consists of a list of corners (indices referring to a vertex table)
/// and is classified by its topological dimension: VERTEX is 0D, EDGE is 1D,
/// TRI and QUAD are 2D, the remaining kinds are 3D. The integer ordering of
/// the variants is part of the public contract: packed arrays, base-index
/// tables and flat element numberings all iterate kinds in this order.
#[derive(Debug, Eq, Hash, Copy, Clone, PartialEq, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum GrobKind {
    // 0d
    VERTEX,

    // 1d
    EDGE,

    // 2d
    TRI,
    QUAD,

    // 3d
    TET,
    HEX,
    PYRA,
    PRISM,
}

impl GrobKind {
    /// All kinds in their invariant order.
    pub const ALL: [GrobKind; NUM_GROB_KINDS] = [
        GrobKind::VERTEX,
        GrobKind::EDGE,
        GrobKind::TRI,
        GrobKind::QUAD,
        GrobKind::TET,
        GrobKind::HEX,
        GrobKind::PYRA,
        GrobKind::PRISM,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<GrobKind> {
        GrobKind::ALL.get(index).copied()
    }

    /// Topological dimension of the kind.
    pub fn dim(self) -> usize {
        self.desc().dim()
    }

    pub fn corner_count(self) -> usize {
        self.desc().corner_count()
    }

    pub fn name(self) -> &'static str {
        match self {
            GrobKind::VERTEX => "vertex",
            GrobKind::EDGE => "edge",
            GrobKind::TRI => "tri",
            GrobKind::QUAD => "quad",
            GrobKind::TET => "tet",
            GrobKind::HEX => "hex",
            GrobKind::PYRA => "pyra",
            GrobKind::PRISM => "prism",
        }
    }

    pub fn desc(self) -> &'static GrobDesc {
        &GROB_DESCS[self.index()]
    }
}

/// One side of a grob: its kind plus the local corner indices which select
/// the side's corners from the parent's corner list.
#[derive(Debug)]
pub struct SideDesc {
    pub kind: GrobKind,
    pub corners: &'static [usize],
}

/// Static descriptor of one grob kind.
///
/// A `GrobDesc` describes the *class* of grobs of a kind, not an individual
/// grob: its dimension, its corner count, and for each side dimension
/// `d < dim` the full list of sides with their local corner tuples. The
/// recursion is non-reflexive; a kind never lists sides of its own dimension.
///
/// All descriptors are hard-coded constants. No allocation happens in this
/// layer and all queries are constant-time lookups.
#[derive(Debug)]
pub struct GrobDesc {
    kind: GrobKind,
    dim: usize,
    corner_count: usize,
    side_sets: [GrobSetKind; MAX_GROB_DIM],
    sides: [&'static [SideDesc]; MAX_GROB_DIM],
}

impl GrobDesc {
    pub fn kind(&self) -> GrobKind {
        self.kind
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn corner_count(&self) -> usize {
        self.corner_count
    }

    /// Aggregate kind of the sides of dimension `side_dim`.
    ///
    /// Returns `GrobSetKind::NONE` for `side_dim >= dim`.
    pub fn side_set_kind(&self, side_dim: usize) -> GrobSetKind {
        if side_dim >= self.dim {
            return GrobSetKind::NONE;
        }
        self.side_sets[side_dim]
    }

    /// Number of sides of dimension `side_dim`; 0 for `side_dim >= dim`.
    pub fn num_sides(&self, side_dim: usize) -> usize {
        if side_dim >= self.dim {
            return 0;
        }
        self.sides[side_dim].len()
    }

    /// Descriptor of one side. Panics if `side_index >= num_sides(side_dim)`.
    pub fn side(&self, side_dim: usize, side_index: usize) -> &'static SideDesc {
        &self.sides[side_dim][side_index]
    }

    pub fn side_kind(&self, side_dim: usize, side_index: usize) -> GrobKind {
        self.side(side_dim, side_index).kind
    }

    /// Local corner indices of one side, each in `[0, corner_count)`.
    pub fn side_local_corners(&self, side_dim: usize, side_index: usize) -> &'static [usize] {
        self.side(side_dim, side_index).corners
    }
}

const NO_SIDES: &[SideDesc] = &[];

macro_rules! vertex_sides {
    ($($i:literal),+) => {
        &[$(SideDesc { kind: GrobKind::VERTEX, corners: &[$i] }),+]
    };
}

macro_rules! edge_sides {
    ($(($a:literal, $b:literal)),+) => {
        &[$(SideDesc { kind: GrobKind::EDGE, corners: &[$a, $b] }),+]
    };
}

const VERTEX_DESC: GrobDesc = GrobDesc {
    kind: GrobKind::VERTEX,
    dim: 0,
    corner_count: 1,
    side_sets: [GrobSetKind::NONE; MAX_GROB_DIM],
    sides: [NO_SIDES; MAX_GROB_DIM],
};

const EDGE_DESC: GrobDesc = GrobDesc {
    kind: GrobKind::EDGE,
    dim: 1,
    corner_count: 2,
    side_sets: [GrobSetKind::VERTICES, GrobSetKind::NONE, GrobSetKind::NONE],
    sides: [vertex_sides!(0, 1), NO_SIDES, NO_SIDES],
};

const TRI_DESC: GrobDesc = GrobDesc {
    kind: GrobKind::TRI,
    dim: 2,
    corner_count: 3,
    side_sets: [GrobSetKind::VERTICES, GrobSetKind::EDGES, GrobSetKind::NONE],
    sides: [
        vertex_sides!(0, 1, 2),
        edge_sides!((0, 1), (1, 2), (2, 0)),
        NO_SIDES,
    ],
};

const QUAD_DESC: GrobDesc = GrobDesc {
    kind: GrobKind::QUAD,
    dim: 2,
    corner_count: 4,
    side_sets: [GrobSetKind::VERTICES, GrobSetKind::EDGES, GrobSetKind::NONE],
    sides: [
        vertex_sides!(0, 1, 2, 3),
        edge_sides!((0, 1), (1, 2), (2, 3), (3, 0)),
        NO_SIDES,
    ],
};

const TET_DESC: GrobDesc = GrobDesc {
    kind: GrobKind::TET,
    dim: 3,
    corner_count: 4,
    side_sets: [GrobSetKind::VERTICES, GrobSetKind::EDGES, GrobSetKind::TRIS],
    sides: [
        vertex_sides!(0, 1, 2, 3),
        edge_sides!((0, 1), (1, 2), (2, 0), (0, 3), (1, 3), (2, 3)),
        &[
            SideDesc { kind: GrobKind::TRI, corners: &[0, 2, 1] },
            SideDesc { kind: GrobKind::TRI, corners: &[0, 1, 3] },
            SideDesc { kind: GrobKind::TRI, corners: &[1, 2, 3] },
            SideDesc { kind: GrobKind::TRI, corners: &[2, 0, 3] },
        ],
    ],
};

const HEX_DESC: GrobDesc = GrobDesc {
    kind: GrobKind::HEX,
    dim: 3,
    corner_count: 8,
    side_sets: [
        GrobSetKind::VERTICES,
        GrobSetKind::EDGES,
        GrobSetKind::QUADS,
    ],
    sides: [
        vertex_sides!(0, 1, 2, 3, 4, 5, 6, 7),
        edge_sides!(
            (0, 1),
            (1, 2),
            (2, 3),
            (3, 0),
            (0, 4),
            (1, 5),
            (2, 6),
            (3, 7),
            (4, 5),
            (5, 6),
            (6, 7),
            (7, 4)
        ),
        &[
            SideDesc { kind: GrobKind::QUAD, corners: &[0, 3, 2, 1] },
            SideDesc { kind: GrobKind::QUAD, corners: &[0, 1, 5, 4] },
            SideDesc { kind: GrobKind::QUAD, corners: &[1, 2, 6, 5] },
            SideDesc { kind: GrobKind::QUAD, corners: &[2, 3, 7, 6] },
            SideDesc { kind: GrobKind::QUAD, corners: &[3, 0, 4, 7] },
            SideDesc { kind: GrobKind::QUAD, corners: &[4, 5, 6, 7] },
        ],
    ],
};

const PYRA_DESC: GrobDesc = GrobDesc {
    kind: GrobKind::PYRA,
    dim: 3,
    corner_count: 5,
    side_sets: [
        GrobSetKind::VERTICES,
        GrobSetKind::EDGES,
        GrobSetKind::FACES,
    ],
    sides: [
        vertex_sides!(0, 1, 2, 3, 4),
        edge_sides!(
            (0, 1),
            (1, 2),
            (2, 3),
            (3, 0),
            (0, 4),
            (1, 4),
            (2, 4),
            (3, 4)
        ),
        &[
            SideDesc { kind: GrobKind::QUAD, corners: &[0, 3, 2, 1] },
            SideDesc { kind: GrobKind::TRI, corners: &[0, 1, 4] },
            SideDesc { kind: GrobKind::TRI, corners: &[1, 2, 4] },
            SideDesc { kind: GrobKind::TRI, corners: &[2, 3, 4] },
            SideDesc { kind: GrobKind::TRI, corners: &[3, 0, 4] },
        ],
    ],
};

const PRISM_DESC: GrobDesc = GrobDesc {
    kind: GrobKind::PRISM,
    dim: 3,
    corner_count: 6,
    side_sets: [
        GrobSetKind::VERTICES,
        GrobSetKind::EDGES,
        GrobSetKind::FACES,
    ],
    sides: [
        vertex_sides!(0, 1, 2, 3, 4, 5),
        edge_sides!(
            (0, 1),
            (1, 2),
            (2, 0),
            (0, 3),
            (1, 4),
            (2, 5),
            (3, 4),
            (4, 5),
            (5, 3)
        ),
        &[
            SideDesc { kind: GrobKind::TRI, corners: &[0, 2, 1] },
            SideDesc { kind: GrobKind::QUAD, corners: &[0, 1, 4, 3] },
            SideDesc { kind: GrobKind::QUAD, corners: &[1, 2, 5, 4] },
            SideDesc { kind: GrobKind::QUAD, corners: &[2, 0, 3, 5] },
            SideDesc { kind: GrobKind::TRI, corners: &[3, 4, 5] },
        ],
    ],
};

static GROB_DESCS: [GrobDesc; NUM_GROB_KINDS] = [
    VERTEX_DESC,
    EDGE_DESC,
    TRI_DESC,
    QUAD_DESC,
    TET_DESC,
    HEX_DESC,
    PYRA_DESC,
    PRISM_DESC,
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_order_and_dimensions() {
        let dims = [0, 1, 2, 2, 3, 3, 3, 3];
        for (i, kind) in GrobKind::ALL.into_iter().enumerate() {
            assert_eq!(kind.index(), i);
            assert_eq!(GrobKind::from_index(i), Some(kind));
            assert_eq!(kind.dim(), dims[i]);
        }
        assert_eq!(GrobKind::from_index(NUM_GROB_KINDS), None);
    }

    #[test]
    fn test_corner_counts() {
        assert_eq!(GrobKind::VERTEX.corner_count(), 1);
        assert_eq!(GrobKind::EDGE.corner_count(), 2);
        assert_eq!(GrobKind::TRI.corner_count(), 3);
        assert_eq!(GrobKind::QUAD.corner_count(), 4);
        assert_eq!(GrobKind::TET.corner_count(), 4);
        assert_eq!(GrobKind::HEX.corner_count(), 8);
        assert_eq!(GrobKind::PYRA.corner_count(), 5);
        assert_eq!(GrobKind::PRISM.corner_count(), 6);
    }

    #[test]
    fn test_side_counts() {
        let desc = GrobKind::TET.desc();
        assert_eq!(desc.num_sides(0), 4);
        assert_eq!(desc.num_sides(1), 6);
        assert_eq!(desc.num_sides(2), 4);
        assert_eq!(desc.num_sides(3), 0);

        let desc = GrobKind::HEX.desc();
        assert_eq!(desc.num_sides(0), 8);
        assert_eq!(desc.num_sides(1), 12);
        assert_eq!(desc.num_sides(2), 6);

        let desc = GrobKind::PYRA.desc();
        assert_eq!(desc.num_sides(1), 8);
        assert_eq!(desc.num_sides(2), 5);

        let desc = GrobKind::PRISM.desc();
        assert_eq!(desc.num_sides(1), 9);
        assert_eq!(desc.num_sides(2), 5);

        // the recursion is non-reflexive
        assert_eq!(GrobKind::VERTEX.desc().num_sides(0), 0);
    }

    #[test]
    fn test_side_tables_are_consistent() {
        for kind in GrobKind::ALL {
            let desc = kind.desc();
            for side_dim in 0..desc.dim() {
                assert!(desc.num_sides(side_dim) > 0);
                for iside in 0..desc.num_sides(side_dim) {
                    let side = desc.side(side_dim, iside);
                    assert_eq!(side.kind.dim(), side_dim);
                    assert_eq!(side.corners.len(), side.kind.corner_count());
                    for &corner in side.corners {
                        assert!(corner < desc.corner_count());
                    }
                }
            }
        }
    }

    #[test]
    fn test_face_side_sets() {
        assert_eq!(GrobKind::TET.desc().side_set_kind(2), GrobSetKind::TRIS);
        assert_eq!(GrobKind::HEX.desc().side_set_kind(2), GrobSetKind::QUADS);
        assert_eq!(GrobKind::PYRA.desc().side_set_kind(2), GrobSetKind::FACES);
        assert_eq!(GrobKind::PRISM.desc().side_set_kind(2), GrobSetKind::FACES);
        assert_eq!(GrobKind::TRI.desc().side_set_kind(1), GrobSetKind::EDGES);
        assert_eq!(GrobKind::TRI.desc().side_set_kind(2), GrobSetKind::NONE);
    }
}
