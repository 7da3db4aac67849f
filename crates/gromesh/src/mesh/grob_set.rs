use serde::{Deserialize, Serialize};

use crate::mesh::grob_desc::{GrobKind, MAX_GROB_DIM};

/// Kinds of grob sets: one singleton per grob kind plus three aggregates.
///
/// `FACES` groups all 2D kinds, `CELLS` all 3D kinds. Aggregates are used
/// wherever an algorithm operates uniformly across all kinds of a dimension.
#[derive(Debug, Eq, Hash, Copy, Clone, PartialEq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum GrobSetKind {
    NONE,
    VERTICES,
    EDGES,
    TRIS,
    QUADS,
    TETS,
    HEXS,
    PYRAS,
    PRISMS,
    FACES,
    CELLS,
}

#[derive(Debug)]
struct GrobSetDesc {
    kind: GrobSetKind,
    dim: usize,
    grob_kinds: &'static [GrobKind],
    side_sets: [GrobSetKind; MAX_GROB_DIM],
}

const NONE_DESC: GrobSetDesc = GrobSetDesc {
    kind: GrobSetKind::NONE,
    dim: 0,
    grob_kinds: &[],
    side_sets: [GrobSetKind::NONE; MAX_GROB_DIM],
};

const VERTICES_DESC: GrobSetDesc = GrobSetDesc {
    kind: GrobSetKind::VERTICES,
    dim: 0,
    grob_kinds: &[GrobKind::VERTEX],
    side_sets: [GrobSetKind::NONE; MAX_GROB_DIM],
};

const EDGES_DESC: GrobSetDesc = GrobSetDesc {
    kind: GrobSetKind::EDGES,
    dim: 1,
    grob_kinds: &[GrobKind::EDGE],
    side_sets: [GrobSetKind::VERTICES, GrobSetKind::NONE, GrobSetKind::NONE],
};

const TRIS_DESC: GrobSetDesc = GrobSetDesc {
    kind: GrobSetKind::TRIS,
    dim: 2,
    grob_kinds: &[GrobKind::TRI],
    side_sets: [GrobSetKind::VERTICES, GrobSetKind::EDGES, GrobSetKind::NONE],
};

const QUADS_DESC: GrobSetDesc = GrobSetDesc {
    kind: GrobSetKind::QUADS,
    dim: 2,
    grob_kinds: &[GrobKind::QUAD],
    side_sets: [GrobSetKind::VERTICES, GrobSetKind::EDGES, GrobSetKind::NONE],
};

const TETS_DESC: GrobSetDesc = GrobSetDesc {
    kind: GrobSetKind::TETS,
    dim: 3,
    grob_kinds: &[GrobKind::TET],
    side_sets: [GrobSetKind::VERTICES, GrobSetKind::EDGES, GrobSetKind::TRIS],
};

const HEXS_DESC: GrobSetDesc = GrobSetDesc {
    kind: GrobSetKind::HEXS,
    dim: 3,
    grob_kinds: &[GrobKind::HEX],
    side_sets: [
        GrobSetKind::VERTICES,
        GrobSetKind::EDGES,
        GrobSetKind::QUADS,
    ],
};

const PYRAS_DESC: GrobSetDesc = GrobSetDesc {
    kind: GrobSetKind::PYRAS,
    dim: 3,
    grob_kinds: &[GrobKind::PYRA],
    side_sets: [
        GrobSetKind::VERTICES,
        GrobSetKind::EDGES,
        GrobSetKind::FACES,
    ],
};

const PRISMS_DESC: GrobSetDesc = GrobSetDesc {
    kind: GrobSetKind::PRISMS,
    dim: 3,
    grob_kinds: &[GrobKind::PRISM],
    side_sets: [
        GrobSetKind::VERTICES,
        GrobSetKind::EDGES,
        GrobSetKind::FACES,
    ],
};

const FACES_DESC: GrobSetDesc = GrobSetDesc {
    kind: GrobSetKind::FACES,
    dim: 2,
    grob_kinds: &[GrobKind::TRI, GrobKind::QUAD],
    side_sets: [GrobSetKind::VERTICES, GrobSetKind::EDGES, GrobSetKind::NONE],
};

const CELLS_DESC: GrobSetDesc = GrobSetDesc {
    kind: GrobSetKind::CELLS,
    dim: 3,
    grob_kinds: &[GrobKind::TET, GrobKind::HEX, GrobKind::PYRA, GrobKind::PRISM],
    side_sets: [
        GrobSetKind::VERTICES,
        GrobSetKind::EDGES,
        GrobSetKind::FACES,
    ],
};

/// A fixed aggregate of grob kinds, iterated in their invariant order.
#[derive(Copy, Clone)]
pub struct GrobSet(&'static GrobSetDesc);

impl GrobSet {
    pub fn new(kind: GrobSetKind) -> GrobSet {
        let desc = match kind {
            GrobSetKind::NONE => &NONE_DESC,
            GrobSetKind::VERTICES => &VERTICES_DESC,
            GrobSetKind::EDGES => &EDGES_DESC,
            GrobSetKind::TRIS => &TRIS_DESC,
            GrobSetKind::QUADS => &QUADS_DESC,
            GrobSetKind::TETS => &TETS_DESC,
            GrobSetKind::HEXS => &HEXS_DESC,
            GrobSetKind::PYRAS => &PYRAS_DESC,
            GrobSetKind::PRISMS => &PRISMS_DESC,
            GrobSetKind::FACES => &FACES_DESC,
            GrobSetKind::CELLS => &CELLS_DESC,
        };
        GrobSet(desc)
    }

    pub fn kind(&self) -> GrobSetKind {
        self.0.kind
    }

    /// Topological dimension shared by all member kinds.
    pub fn dim(&self) -> usize {
        self.0.dim
    }

    pub fn size(&self) -> usize {
        self.0.grob_kinds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.grob_kinds.is_empty()
    }

    pub fn grob_kinds(&self) -> &'static [GrobKind] {
        self.0.grob_kinds
    }

    pub fn contains(&self, kind: GrobKind) -> bool {
        self.0.grob_kinds.contains(&kind)
    }

    /// Aggregate kind of the member grobs' sides of dimension `side_dim`.
    pub fn side_set_at(&self, side_dim: usize) -> GrobSetKind {
        if side_dim >= self.dim() {
            return GrobSetKind::NONE;
        }
        self.0.side_sets[side_dim]
    }

    /// The set of sides one dimension below, e.g. `CELLS -> FACES`.
    pub fn side_set(&self) -> GrobSet {
        if self.dim() == 0 {
            return GrobSet::new(GrobSetKind::NONE);
        }
        GrobSet::new(self.side_set_at(self.dim() - 1))
    }

    pub fn iter(&self) -> impl Iterator<Item = GrobKind> {
        self.0.grob_kinds.iter().copied()
    }

    pub fn name(&self) -> &'static str {
        match self.kind() {
            GrobSetKind::NONE => "none",
            GrobSetKind::VERTICES => "vertices",
            GrobSetKind::EDGES => "edges",
            GrobSetKind::TRIS => "tris",
            GrobSetKind::QUADS => "quads",
            GrobSetKind::TETS => "tets",
            GrobSetKind::HEXS => "hexs",
            GrobSetKind::PYRAS => "pyras",
            GrobSetKind::PRISMS => "prisms",
            GrobSetKind::FACES => "faces",
            GrobSetKind::CELLS => "cells",
        }
    }
}

impl std::fmt::Debug for GrobSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "GrobSet({:?})", self.kind())
    }
}

impl PartialEq for GrobSet {
    fn eq(&self, other: &Self) -> bool {
        self.kind() == other.kind()
    }
}

impl Eq for GrobSet {}

impl From<GrobSetKind> for GrobSet {
    fn from(kind: GrobSetKind) -> Self {
        GrobSet::new(kind)
    }
}

impl From<GrobKind> for GrobSet {
    fn from(kind: GrobKind) -> Self {
        let set_kind = match kind {
            GrobKind::VERTEX => GrobSetKind::VERTICES,
            GrobKind::EDGE => GrobSetKind::EDGES,
            GrobKind::TRI => GrobSetKind::TRIS,
            GrobKind::QUAD => GrobSetKind::QUADS,
            GrobKind::TET => GrobSetKind::TETS,
            GrobKind::HEX => GrobSetKind::HEXS,
            GrobKind::PYRA => GrobSetKind::PYRAS,
            GrobKind::PRISM => GrobSetKind::PRISMS,
        };
        GrobSet::new(set_kind)
    }
}

impl IntoIterator for GrobSet {
    type Item = GrobKind;
    type IntoIter = std::iter::Copied<std::slice::Iter<'static, GrobKind>>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.grob_kinds.iter().copied()
    }
}

/// The grob set covering all kinds of dimension `dim`: VERTICES, EDGES,
/// FACES or CELLS. `None` for `dim > 3`.
pub fn grob_set_by_dim(dim: usize) -> Option<GrobSet> {
    let kind = match dim {
        0 => GrobSetKind::VERTICES,
        1 => GrobSetKind::EDGES,
        2 => GrobSetKind::FACES,
        3 => GrobSetKind::CELLS,
        _ => return None,
    };
    Some(GrobSet::new(kind))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aggregates() {
        let faces = GrobSet::new(GrobSetKind::FACES);
        assert_eq!(faces.dim(), 2);
        assert_eq!(faces.size(), 2);
        assert_eq!(
            faces.grob_kinds(),
            &[GrobKind::TRI, GrobKind::QUAD]
        );

        let cells = GrobSet::new(GrobSetKind::CELLS);
        assert_eq!(cells.dim(), 3);
        assert_eq!(cells.size(), 4);
        assert!(cells.contains(GrobKind::PYRA));
        assert!(!cells.contains(GrobKind::QUAD));
    }

    #[test]
    fn test_side_sets() {
        let cells = GrobSet::new(GrobSetKind::CELLS);
        assert_eq!(cells.side_set_at(0), GrobSetKind::VERTICES);
        assert_eq!(cells.side_set_at(1), GrobSetKind::EDGES);
        assert_eq!(cells.side_set_at(2), GrobSetKind::FACES);
        assert_eq!(cells.side_set().kind(), GrobSetKind::FACES);

        let tris = GrobSet::new(GrobSetKind::TRIS);
        assert_eq!(tris.side_set().kind(), GrobSetKind::EDGES);

        let vertices = GrobSet::new(GrobSetKind::VERTICES);
        assert_eq!(vertices.side_set().kind(), GrobSetKind::NONE);
    }

    #[test]
    fn test_by_dim() {
        assert_eq!(grob_set_by_dim(0).unwrap().kind(), GrobSetKind::VERTICES);
        assert_eq!(grob_set_by_dim(1).unwrap().kind(), GrobSetKind::EDGES);
        assert_eq!(grob_set_by_dim(2).unwrap().kind(), GrobSetKind::FACES);
        assert_eq!(grob_set_by_dim(3).unwrap().kind(), GrobSetKind::CELLS);
        assert!(grob_set_by_dim(4).is_none());
    }

    #[test]
    fn test_singleton_from_kind() {
        let set: GrobSet = GrobKind::TET.into();
        assert_eq!(set.kind(), GrobSetKind::TETS);
        assert_eq!(set.grob_kinds(), &[GrobKind::TET]);
    }
}
