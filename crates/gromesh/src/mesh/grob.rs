use std::hash::{Hash, Hasher};

use arrayvec::ArrayVec;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::error::{MeshError, Result};
use crate::mesh::grob_desc::{GrobDesc, GrobKind};

/// Maximum number of corners any grob may have.
///
/// The limit arises from [`CornerOffsets`], which packs one 4-bit offset per
/// corner into 16 slots.
pub const MAX_GROB_CORNERS: usize = 16;

/// Fixed-capacity container for the corners of a single grob.
pub type CornerIndices = ArrayVec<usize, MAX_GROB_CORNERS>;

/// A packed permutation of 16 4-bit offsets into a corner-index buffer.
///
/// Slot `i` tells which entry of the underlying buffer serves as corner `i`
/// of a grob. Freshly created grobs use the ascending permutation; side views
/// remap the parent's slots through the static local corner tables.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct CornerOffsets(u64);

impl CornerOffsets {
    /// The identity permutation 0, 1, ..., 15.
    pub fn ascending() -> CornerOffsets {
        CornerOffsets(0xFEDC_BA98_7654_3210)
    }

    pub fn get(self, i: usize) -> usize {
        debug_assert!(i < MAX_GROB_CORNERS);
        ((self.0 >> (4 * i)) & 0xF) as usize
    }

    pub fn set(&mut self, i: usize, offset: usize) {
        debug_assert!(i < MAX_GROB_CORNERS);
        debug_assert!(offset < MAX_GROB_CORNERS);
        let shift = 4 * i;
        self.0 = (self.0 & !(0xF << shift)) | ((offset as u64) << shift);
    }
}

impl Default for CornerOffsets {
    fn default() -> Self {
        CornerOffsets::ascending()
    }
}

/// A non-owning reference to a single grid object.
///
/// A `Grob` is a grob kind, a borrow of a corner-index buffer and a
/// [`CornerOffsets`] permutation selecting the buffer slots that serve as the
/// grob's corners. It is an iteration cursor: the borrow ties its lifetime to
/// the underlying [`GrobArray`](crate::mesh::GrobArray), so any mutation of
/// the array ends all outstanding grob references. Use [`Grob::owned`] when a
/// grob has to outlive the array it was read from.
///
/// Equality compares the *set* of global corner indices of two grobs of the
/// same kind, ignoring order and orientation. A tetrahedron's face therefore
/// compares equal to the matching face of its neighbor even though the two
/// traversals wind in opposite directions.
#[derive(Copy, Clone, Debug)]
pub struct Grob<'a> {
    kind: GrobKind,
    corners: &'a [usize],
    offsets: CornerOffsets,
}

impl<'a> Grob<'a> {
    /// Grob over the first `kind.corner_count()` entries of `corners`.
    pub fn new(kind: GrobKind, corners: &'a [usize]) -> Grob<'a> {
        debug_assert!(corners.len() >= kind.corner_count());
        Grob {
            kind,
            corners,
            offsets: CornerOffsets::ascending(),
        }
    }

    pub fn with_offsets(kind: GrobKind, corners: &'a [usize], offsets: CornerOffsets) -> Grob<'a> {
        Grob {
            kind,
            corners,
            offsets,
        }
    }

    pub fn kind(&self) -> GrobKind {
        self.kind
    }

    pub fn desc(&self) -> &'static GrobDesc {
        self.kind.desc()
    }

    pub fn dim(&self) -> usize {
        self.desc().dim()
    }

    pub fn num_corners(&self) -> usize {
        self.desc().corner_count()
    }

    /// Global index of the i-th corner.
    pub fn corner(&self, i: usize) -> usize {
        self.corners[self.offsets.get(i)]
    }

    pub fn corners(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.num_corners()).map(|i| self.corner(i))
    }

    pub fn min_corner(&self) -> usize {
        self.corners().min().unwrap_or(0)
    }

    pub fn corner_offsets(&self) -> CornerOffsets {
        self.offsets
    }

    pub fn num_sides(&self, side_dim: usize) -> usize {
        self.desc().num_sides(side_dim)
    }

    /// The side grob of dimension `side_dim` with the given index.
    ///
    /// The returned grob shares the underlying buffer; only the offsets are
    /// remapped through the static local corner table.
    pub fn side(&self, side_dim: usize, side_index: usize) -> Grob<'a> {
        let side = self.desc().side(side_dim, side_index);
        let mut offsets = CornerOffsets::ascending();
        for (i, &local) in side.corners.iter().enumerate() {
            offsets.set(i, self.offsets.get(local));
        }
        Grob {
            kind: side.kind,
            corners: self.corners,
            offsets,
        }
    }

    /// Index of the side which equals `side_grob`, scanning the sides of
    /// `side_grob.dim()`.
    pub fn find_side(&self, side_grob: &Grob) -> Option<usize> {
        let side_dim = side_grob.dim();
        (0..self.num_sides(side_dim)).find(|&i| self.side(side_dim, i) == *side_grob)
    }

    /// Copies the corners into an owned grob which survives array resizes.
    pub fn owned(&self) -> OwnedGrob {
        OwnedGrob {
            kind: self.kind,
            corners: self.corners().collect(),
        }
    }
}

/// A mutable reference to a single grid object.
///
/// Unlike [`Grob`] it borrows the corner buffer mutably, so corners can be
/// rewired in place (e.g. when renumbering vertices). The borrow is
/// exclusive: while a `GrobMut` exists, no other grob reference into the
/// same array can be alive.
#[derive(Debug)]
pub struct GrobMut<'a> {
    kind: GrobKind,
    corners: &'a mut [usize],
    offsets: CornerOffsets,
}

impl<'a> GrobMut<'a> {
    pub fn new(kind: GrobKind, corners: &'a mut [usize]) -> GrobMut<'a> {
        debug_assert!(corners.len() >= kind.corner_count());
        GrobMut {
            kind,
            corners,
            offsets: CornerOffsets::ascending(),
        }
    }

    pub fn kind(&self) -> GrobKind {
        self.kind
    }

    pub fn num_corners(&self) -> usize {
        self.kind.corner_count()
    }

    pub fn corner(&self, i: usize) -> usize {
        self.corners[self.offsets.get(i)]
    }

    /// Rewires corner `i` to the given global index.
    pub fn set_corner(&mut self, i: usize, global_index: usize) {
        self.corners[self.offsets.get(i)] = global_index;
    }

    /// Reborrows as a read-only grob for queries and comparisons.
    pub fn as_grob(&self) -> Grob<'_> {
        Grob::with_offsets(self.kind, self.corners, self.offsets)
    }
}

fn corner_sets_equal(a: &Grob, b: &Grob) -> bool {
    if a.kind() != b.kind() {
        return false;
    }
    let n = a.num_corners();
    for i in 0..n {
        let c = a.corner(i);
        if !(0..n).any(|j| b.corner(j) == c) {
            return false;
        }
    }
    true
}

/// The collision-tolerant grob hash: `10^8 * (kind_index + 1) + min_corner`.
/// All grobs of one kind sharing a minimum corner collide; equality resolves
/// those collisions.
fn grob_hash_value(kind: GrobKind, min_corner: usize) -> u64 {
    100_000_000 * (kind.index() as u64 + 1) + min_corner as u64
}

impl PartialEq for Grob<'_> {
    fn eq(&self, other: &Self) -> bool {
        corner_sets_equal(self, other)
    }
}

impl Eq for Grob<'_> {}

/// An owning grob: kind plus an inline corner array.
///
/// Used wherever a grob has to outlive the corner buffer it was read from:
/// hash-map keys, hierarchy relations, collected side sets.
#[derive(Clone, Debug)]
pub struct OwnedGrob {
    kind: GrobKind,
    corners: CornerIndices,
}

impl OwnedGrob {
    pub fn new(kind: GrobKind, corners: &[usize]) -> Result<OwnedGrob> {
        if corners.len() != kind.corner_count() {
            return Err(MeshError::BadIndexCount {
                kind,
                expected: kind.corner_count(),
                got: corners.len(),
            });
        }
        Ok(OwnedGrob {
            kind,
            corners: corners.iter().copied().collect(),
        })
    }

    pub fn kind(&self) -> GrobKind {
        self.kind
    }

    pub fn corners(&self) -> &[usize] {
        &self.corners
    }

    pub fn as_grob(&self) -> Grob<'_> {
        Grob::new(self.kind, &self.corners)
    }
}

impl From<Grob<'_>> for OwnedGrob {
    fn from(grob: Grob<'_>) -> Self {
        grob.owned()
    }
}

impl PartialEq for OwnedGrob {
    fn eq(&self, other: &Self) -> bool {
        corner_sets_equal(&self.as_grob(), &other.as_grob())
    }
}

impl Eq for OwnedGrob {}

impl Hash for OwnedGrob {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(grob_hash_value(self.kind, self.as_grob().min_corner()));
    }
}

/// Hash set of grobs using the order-insensitive grob identity.
pub type GrobHashSet = FxHashSet<OwnedGrob>;

/// Hash map keyed by grobs using the order-insensitive grob identity.
pub type GrobHashMap<T> = FxHashMap<OwnedGrob, T>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_corner_offsets_pack() {
        let mut offsets = CornerOffsets::ascending();
        for i in 0..MAX_GROB_CORNERS {
            assert_eq!(offsets.get(i), i);
        }
        offsets.set(0, 7);
        offsets.set(15, 3);
        assert_eq!(offsets.get(0), 7);
        assert_eq!(offsets.get(15), 3);
        assert_eq!(offsets.get(1), 1);
    }

    #[test]
    fn test_corner_access() {
        let inds = [10, 11, 12, 13];
        let tet = Grob::new(GrobKind::TET, &inds);
        assert_eq!(tet.num_corners(), 4);
        assert_eq!(tet.corners().collect::<Vec<_>>(), vec![10, 11, 12, 13]);
        assert_eq!(tet.min_corner(), 10);
    }

    #[test]
    fn test_sides() {
        let inds = [10, 11, 12, 13];
        let tet = Grob::new(GrobKind::TET, &inds);

        let first_edge = tet.side(1, 0);
        assert_eq!(first_edge.kind(), GrobKind::EDGE);
        assert_eq!(first_edge.corners().collect::<Vec<_>>(), vec![10, 11]);

        let first_face = tet.side(2, 0);
        assert_eq!(first_face.kind(), GrobKind::TRI);
        assert_eq!(first_face.corners().collect::<Vec<_>>(), vec![10, 12, 11]);

        // sides of sides resolve through the same buffer
        let face_edge = first_face.side(1, 0);
        assert_eq!(face_edge.corners().collect::<Vec<_>>(), vec![10, 12]);
    }

    #[test]
    fn test_equality_ignores_order_and_orientation() {
        let a = [0, 1, 2];
        let b = [2, 0, 1];
        let c = [2, 1, 0];
        let d = [0, 1, 3];
        assert_eq!(Grob::new(GrobKind::TRI, &a), Grob::new(GrobKind::TRI, &b));
        assert_eq!(Grob::new(GrobKind::TRI, &a), Grob::new(GrobKind::TRI, &c));
        assert_ne!(Grob::new(GrobKind::TRI, &a), Grob::new(GrobKind::TRI, &d));
        // same corners, different kind
        let edge_inds = [0, 1];
        assert_ne!(
            Grob::new(GrobKind::EDGE, &edge_inds).owned(),
            OwnedGrob::new(GrobKind::VERTEX, &[0]).unwrap()
        );
    }

    #[test]
    fn test_find_side() {
        let inds = [4, 5, 6, 7];
        let tet = Grob::new(GrobKind::TET, &inds);
        let face = [7, 5, 6];
        let probe = Grob::new(GrobKind::TRI, &face);
        // TET 2D side 2 is (1, 2, 3) -> {5, 6, 7}
        assert_eq!(tet.find_side(&probe), Some(2));

        let missing = [4, 5, 8];
        assert_eq!(tet.find_side(&Grob::new(GrobKind::TRI, &missing)), None);
    }

    #[test]
    fn test_hash_set_collapses_shared_sides() {
        let left = [0, 1, 2];
        let right = [2, 1, 3];
        let tri_a = Grob::new(GrobKind::TRI, &left);
        let tri_b = Grob::new(GrobKind::TRI, &right);

        let mut sides = GrobHashSet::default();
        for iside in 0..3 {
            sides.insert(tri_a.side(1, iside).owned());
            sides.insert(tri_b.side(1, iside).owned());
        }
        // 6 side visits, 5 unique edges: (1, 2) is shared
        assert_eq!(sides.len(), 5);
    }

    #[test]
    fn test_owned_round_trip() {
        let inds = [3, 1, 2];
        let grob = Grob::new(GrobKind::TRI, &inds);
        let owned = grob.owned();
        assert_eq!(owned.as_grob(), grob);
        assert_eq!(owned.corners(), &[3, 1, 2]);
        assert!(OwnedGrob::new(GrobKind::TRI, &[0, 1]).is_err());
    }
}
