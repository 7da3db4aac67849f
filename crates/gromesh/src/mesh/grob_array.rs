use serde::{Deserialize, Serialize};

use crate::error::{MeshError, Result};
use crate::mesh::grob::{Grob, GrobMut, OwnedGrob};
use crate::mesh::grob_desc::GrobKind;

/// A packed array of grobs of one kind.
///
/// Corner indices are stored in one flat buffer with a fixed tuple size equal
/// to the kind's corner count, so `underlying().len() == len() *
/// corner_count`. Iteration yields ephemeral [`Grob`] references into the
/// buffer; any mutation of the array invalidates them (the borrow checker
/// enforces this).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrobArray {
    kind: GrobKind,
    inds: Vec<usize>,
}

impl GrobArray {
    pub fn new(kind: GrobKind) -> GrobArray {
        GrobArray {
            kind,
            inds: Vec::new(),
        }
    }

    /// Builds an array from a flat corner-index buffer.
    ///
    /// The buffer length has to be a multiple of the kind's corner count.
    pub fn from_flat(kind: GrobKind, inds: Vec<usize>) -> Result<GrobArray> {
        let tuple_size = kind.corner_count();
        if inds.len() % tuple_size != 0 {
            return Err(MeshError::BadIndexCount {
                kind,
                expected: tuple_size,
                got: inds.len() % tuple_size,
            });
        }
        Ok(GrobArray { kind, inds })
    }

    pub fn kind(&self) -> GrobKind {
        self.kind
    }

    pub fn tuple_size(&self) -> usize {
        self.kind.corner_count()
    }

    /// Number of grobs.
    pub fn len(&self) -> usize {
        self.inds.len() / self.tuple_size()
    }

    pub fn is_empty(&self) -> bool {
        self.inds.is_empty()
    }

    /// Total number of stored corner indices (`len() * corner_count`).
    pub fn num_indices(&self) -> usize {
        self.inds.len()
    }

    pub fn underlying(&self) -> &[usize] {
        &self.inds
    }

    pub fn grob(&self, index: usize) -> Grob<'_> {
        let ts = self.tuple_size();
        Grob::new(self.kind, &self.inds[index * ts..(index + 1) * ts])
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = Grob<'_>> {
        self.inds
            .chunks_exact(self.tuple_size())
            .map(|chunk| Grob::new(self.kind, chunk))
    }

    pub fn grob_mut(&mut self, index: usize) -> GrobMut<'_> {
        let ts = self.tuple_size();
        GrobMut::new(self.kind, &mut self.inds[index * ts..(index + 1) * ts])
    }

    pub fn iter_mut(&mut self) -> impl ExactSizeIterator<Item = GrobMut<'_>> {
        let kind = self.kind;
        self.inds
            .chunks_exact_mut(kind.corner_count())
            .map(move |chunk| GrobMut::new(kind, chunk))
    }

    /// Appends one grob given by its corner indices.
    pub fn push(&mut self, corners: &[usize]) -> Result<()> {
        if corners.len() != self.tuple_size() {
            return Err(MeshError::BadIndexCount {
                kind: self.kind,
                expected: self.tuple_size(),
                got: corners.len(),
            });
        }
        self.inds.extend_from_slice(corners);
        Ok(())
    }

    /// Appends a grob read from another buffer.
    pub fn push_grob(&mut self, grob: Grob<'_>) -> Result<()> {
        if grob.kind() != self.kind {
            return Err(MeshError::InvalidOperation(format!(
                "cannot push a {} grob into a {} array",
                grob.kind().name(),
                self.kind.name()
            )));
        }
        self.inds.extend(grob.corners());
        Ok(())
    }

    pub fn push_owned(&mut self, grob: &OwnedGrob) -> Result<()> {
        self.push_grob(grob.as_grob())
    }

    pub fn reserve(&mut self, additional: usize) {
        self.inds.reserve(additional * self.tuple_size());
    }

    pub fn truncate(&mut self, len: usize) {
        let ts = self.tuple_size();
        self.inds.truncate(len * ts);
    }

    pub fn clear(&mut self) {
        self.inds.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_and_iterate() {
        let mut tris = GrobArray::new(GrobKind::TRI);
        tris.push(&[0, 1, 2]).unwrap();
        tris.push(&[2, 1, 3]).unwrap();

        assert_eq!(tris.len(), 2);
        assert_eq!(tris.num_indices(), 6);
        assert_eq!(tris.underlying(), &[0, 1, 2, 2, 1, 3]);

        let collected: Vec<Vec<usize>> = tris.iter().map(|g| g.corners().collect()).collect();
        assert_eq!(collected, vec![vec![0, 1, 2], vec![2, 1, 3]]);
        assert_eq!(tris.grob(1).corners().collect::<Vec<_>>(), vec![2, 1, 3]);
    }

    #[test]
    fn test_bad_index_count() {
        let mut tris = GrobArray::new(GrobKind::TRI);
        assert!(matches!(
            tris.push(&[0, 1]),
            Err(MeshError::BadIndexCount { .. })
        ));
        assert!(GrobArray::from_flat(GrobKind::QUAD, vec![0, 1, 2]).is_err());
    }

    #[test]
    fn test_kind_mismatch() {
        let mut quads = GrobArray::new(GrobKind::QUAD);
        let inds = [0, 1, 2];
        let tri = Grob::new(GrobKind::TRI, &inds);
        assert!(quads.push_grob(tri).is_err());
    }

    #[test]
    fn test_set_corner() {
        let mut tris = GrobArray::from_flat(GrobKind::TRI, vec![0, 1, 2, 2, 1, 3]).unwrap();

        let mut tri = tris.grob_mut(0);
        assert_eq!(tri.corner(2), 2);
        tri.set_corner(2, 7);
        assert_eq!(tri.as_grob().corners().collect::<Vec<_>>(), vec![0, 1, 7]);
        assert_eq!(tris.underlying(), &[0, 1, 7, 2, 1, 3]);

        // apply a vertex renumbering across the whole array
        let permutation = [3, 2, 1, 0, 4, 5, 6, 7];
        for mut grob in tris.iter_mut() {
            for i in 0..grob.num_corners() {
                grob.set_corner(i, permutation[grob.corner(i)]);
            }
        }
        assert_eq!(tris.underlying(), &[3, 2, 7, 1, 2, 0]);
    }

    #[test]
    fn test_from_flat() {
        let tris = GrobArray::from_flat(GrobKind::TRI, vec![0, 1, 2, 0, 2, 3]).unwrap();
        assert_eq!(tris.len(), 2);
        assert_eq!(tris.num_indices(), 2 * tris.tuple_size());
    }

    #[test]
    fn test_truncate_and_clear() {
        let mut edges = GrobArray::from_flat(GrobKind::EDGE, vec![0, 1, 1, 2, 2, 3]).unwrap();
        edges.truncate(1);
        assert_eq!(edges.len(), 1);
        assert_eq!(edges.underlying(), &[0, 1]);
        edges.clear();
        assert!(edges.is_empty());
    }
}
