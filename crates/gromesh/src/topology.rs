//! Pure functions over [`Mesh`] that derive topological relations: index
//! maps, unique side extraction, valences, neighborhood tables, rim meshes
//! and connected components.

mod components;
mod neighborhoods;
mod rim;

pub use self::components::connected_components;
pub use self::neighborhoods::Neighborhoods;
pub use self::rim::{create_rim_mesh, create_rim_mesh_with};

use log::debug;

use crate::error::{MeshError, Result};
use crate::mesh::{
    GrobHashMap, GrobHashSet, GrobIndex, GrobKind, GrobSet, Mesh, NUM_GROB_KINDS, grob_set_by_dim,
};

/// Sentinel for "no entry" in base-index tables.
pub const NO_INDEX: usize = usize::MAX;

/// Maps a flat, concatenated element numbering back to grob indices.
///
/// Grobs of a set are numbered consecutively in kind order: first all grobs
/// of the first kind, then all of the second, and so on. External element
/// numbering schemes (e.g. subset tables of file formats) use such flat
/// indices; this map converts them back to per-kind indices through a table
/// of base offsets.
#[derive(Debug, Clone)]
pub struct TotalToGrobIndexMap {
    kinds: Vec<GrobKind>,
    base: Vec<usize>,
}

impl TotalToGrobIndexMap {
    pub fn new(mesh: &Mesh, set: impl Into<GrobSet>) -> TotalToGrobIndexMap {
        Self::from_kinds(mesh, set.into().iter().collect())
    }

    pub fn from_kinds(mesh: &Mesh, kinds: Vec<GrobKind>) -> TotalToGrobIndexMap {
        let mut base = vec![0; kinds.len() + 1];
        for (i, &kind) in kinds.iter().enumerate() {
            base[i + 1] = base[i] + mesh.count(kind);
        }
        TotalToGrobIndexMap { kinds, base }
    }

    /// Converts the flat index `index` to a grob index.
    pub fn grob_index(&self, index: usize) -> Result<GrobIndex> {
        for i in 0..self.kinds.len() {
            if index >= self.base[i] && index < self.base[i + 1] {
                return Ok(GrobIndex::new(self.kinds[i], index - self.base[i]));
            }
        }
        Err(MeshError::ValueError(format!(
            "flat grob index {index} is out of range"
        )))
    }
}

/// Numbers the grobs of `set` consecutively in kind order.
///
/// Returns the map from grob to flat index plus a base table such that
/// `index == base[kind] + position_within_kind`. Kinds outside `set` carry
/// [`NO_INDEX`] in the base table.
pub fn grob_to_index_map(
    mesh: &Mesh,
    set: impl Into<GrobSet>,
) -> (GrobHashMap<usize>, [usize; NUM_GROB_KINDS]) {
    let set = set.into();
    let mut map = GrobHashMap::default();
    map.reserve(mesh.count(set));
    let mut base = [NO_INDEX; NUM_GROB_KINDS];

    let mut counter = 0;
    for kind in set {
        base[kind.index()] = counter;
        for grob in mesh.grobs(kind).iter() {
            map.insert(grob.owned(), counter);
            counter += 1;
        }
    }
    (map, base)
}

/// Numbers the grobs of `set` per kind, mapping each grob to its
/// (kind, position) pair.
pub fn grob_to_grob_index_map(mesh: &Mesh, set: impl Into<GrobSet>) -> GrobHashMap<GrobIndex> {
    let set = set.into();
    let mut map = GrobHashMap::default();
    map.reserve(mesh.count(set));

    for kind in set {
        for (pos, grob) in mesh.grobs(kind).iter().enumerate() {
            map.insert(grob.owned(), GrobIndex::new(kind, pos));
        }
    }
    map
}

/// Collects the unique sides of dimension `side_dim` of all grobs in `set`.
///
/// `sides` is not cleared; repeated calls on different sets accumulate the
/// sides of a hybrid mesh. Returns the number of newly inserted sides.
pub fn find_unique_sides(
    sides: &mut GrobHashSet,
    mesh: &Mesh,
    set: impl Into<GrobSet>,
    side_dim: usize,
) -> usize {
    let mut num_insertions = 0;
    for kind in set.into() {
        let num_sides = kind.desc().num_sides(side_dim);
        for grob in mesh.grobs(kind).iter() {
            for iside in 0..num_sides {
                if sides.insert(grob.side(side_dim, iside).owned()) {
                    num_insertions += 1;
                }
            }
        }
    }
    num_insertions
}

/// Like [`find_unique_sides`], but numbers each newly inserted side
/// consecutively, starting at `map.len() + index_offset`.
pub fn find_unique_sides_numbered(
    map: &mut GrobHashMap<usize>,
    mesh: &Mesh,
    set: impl Into<GrobSet>,
    side_dim: usize,
    index_offset: usize,
) -> usize {
    let start_index = map.len() + index_offset;
    let mut num_insertions = 0;
    for kind in set.into() {
        let num_sides = kind.desc().num_sides(side_dim);
        for grob in mesh.grobs(kind).iter() {
            for iside in 0..num_sides {
                let side = grob.side(side_dim, iside).owned();
                if let std::collections::hash_map::Entry::Vacant(e) = map.entry(side) {
                    e.insert(start_index + num_insertions);
                    num_insertions += 1;
                }
            }
        }
    }
    num_insertions
}

/// Numbers the grobs of `set` themselves consecutively, starting at
/// `map.len() + index_offset`. Building block for flat element numbering
/// schemes of external file formats.
pub fn insert_grobs_numbered(
    map: &mut GrobHashMap<usize>,
    mesh: &Mesh,
    set: impl Into<GrobSet>,
    index_offset: usize,
) -> usize {
    let start_index = map.len() + index_offset;
    let mut num_insertions = 0;
    for kind in set.into() {
        for grob in mesh.grobs(kind).iter() {
            if let std::collections::hash_map::Entry::Vacant(e) = map.entry(grob.owned()) {
                e.insert(start_index + num_insertions);
                num_insertions += 1;
            }
        }
    }
    num_insertions
}

/// Replaces all grobs of dimension `side_dim` with the unique sides of the
/// mesh's higher-dimensional grobs.
pub fn create_side_grobs(mesh: &mut Mesh, side_dim: usize) -> Result<()> {
    let Some(side_set) = grob_set_by_dim(side_dim) else {
        return Err(MeshError::InvalidOperation(format!(
            "cannot create side grobs of dimension {side_dim}"
        )));
    };

    let mut sides = GrobHashSet::default();
    for kind in mesh.grob_kinds() {
        if kind.dim() > side_dim {
            find_unique_sides(&mut sides, mesh, kind, side_dim);
        }
    }

    debug!(
        "replacing {} grobs of dim {side_dim} with {} unique sides",
        mesh.count(side_set),
        sides.len()
    );

    mesh.clear(side_set)?;
    mesh.insert_grobs(sides)
}

/// Counts, for every grob of `center_set`, its neighbors in `neighbor_set`.
///
/// With higher-dimensional neighbors the valence counts the neighbor grobs
/// which contain the center grob as a side; with lower-dimensional neighbors
/// it is the purely structural side count. Equal dimensions are rejected.
pub fn compute_grob_valences(
    mesh: &Mesh,
    center_set: impl Into<GrobSet>,
    neighbor_set: impl Into<GrobSet>,
) -> Result<GrobHashMap<usize>> {
    let center_set = center_set.into();
    let neighbor_set = neighbor_set.into();
    let center_dim = center_set.dim();
    let neighbor_dim = neighbor_set.dim();

    let mut valences = GrobHashMap::default();

    if center_dim < neighbor_dim {
        for kind in center_set {
            for grob in mesh.grobs(kind).iter() {
                valences.insert(grob.owned(), 0);
            }
        }
        for nbr_kind in neighbor_set {
            for nbr in mesh.grobs(nbr_kind).iter() {
                for iside in 0..nbr.num_sides(center_dim) {
                    *valences.entry(nbr.side(center_dim, iside).owned()).or_insert(0) += 1;
                }
            }
        }
    } else if center_dim > neighbor_dim {
        for kind in center_set {
            for grob in mesh.grobs(kind).iter() {
                let num_sides = grob.num_sides(neighbor_dim);
                valences.insert(grob.owned(), num_sides);
            }
        }
    } else {
        return Err(MeshError::InvalidOperation(
            "valences are not defined for center and neighbor sets of equal dimension".into(),
        ));
    }

    Ok(valences)
}

/// Histogram over [`compute_grob_valences`]: entry `v` counts the grobs of
/// valence `v`.
pub fn valence_histogram(
    mesh: &Mesh,
    center_set: impl Into<GrobSet>,
    neighbor_set: impl Into<GrobSet>,
) -> Result<Vec<usize>> {
    let valences = compute_grob_valences(mesh, center_set, neighbor_set)?;

    let mut histogram = Vec::new();
    for (_, valence) in valences {
        if valence >= histogram.len() {
            histogram.resize(valence + 1, 0);
        }
        histogram[valence] += 1;
    }
    Ok(histogram)
}
