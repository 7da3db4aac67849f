use std::sync::Arc;

use log::trace;

use crate::error::{MeshError, Result};
use crate::mesh::{Grob, GrobHashSet, GrobIndex, GrobKind, GrobSet, Mesh, NUM_GROB_KINDS};
use crate::topology::{NO_INDEX, grob_to_grob_index_map, grob_to_index_map};

/// Precomputed neighbor table between two grob sets of a mesh.
///
/// A `Neighborhoods` instance answers, for every grob of the center set,
/// which grobs of the neighbor set touch it. The table is laid out CSR-style:
/// one offset row per center grob (rows of all center kinds concatenated in
/// kind order, located through a per-kind base table) and one flat vector of
/// neighbor grob indices. Construction is single-threaded; the finished table
/// is read-only and safe to share across threads.
///
/// Three constructions exist:
/// - higher-dimensional neighbors: a center grob's neighbors are the grobs
///   which contain it as a side, in source order;
/// - lower-dimensional neighbors: a center grob's neighbors are its own
///   sides, in side order;
/// - equal dimension through a link set ([`Neighborhoods::with_links`]):
///   two grobs are neighbors if they share a link-side, in discovery order.
#[derive(Debug)]
pub struct Neighborhoods {
    mesh: Arc<Mesh>,
    center_set: GrobSet,
    neighbor_set: GrobSet,
    offsets: Vec<usize>,
    nbrs: Vec<GrobIndex>,
    base: [usize; NUM_GROB_KINDS],
}

impl Neighborhoods {
    /// Builds the neighborhood between grob sets of different dimension.
    pub fn new(mesh: Arc<Mesh>, center_set: GrobSet, neighbor_set: GrobSet) -> Result<Self> {
        let center_dim = center_set.dim();
        let neighbor_dim = neighbor_set.dim();

        if center_dim == neighbor_dim {
            return Err(MeshError::InvalidOperation(
                "equal-dimension neighborhoods require a link grob set".into(),
            ));
        }

        let mut nbrhds = Neighborhoods {
            mesh,
            center_set,
            neighbor_set,
            offsets: Vec::new(),
            nbrs: Vec::new(),
            base: [NO_INDEX; NUM_GROB_KINDS],
        };

        if neighbor_dim > center_dim {
            nbrhds.fill_higher_dim()?;
        } else {
            nbrhds.fill_lower_dim()?;
        }

        trace!(
            "neighborhoods {} -> {}: {} rows, {} entries",
            nbrhds.center_set.name(),
            nbrhds.neighbor_set.name(),
            nbrhds.offsets.len().saturating_sub(1),
            nbrhds.nbrs.len()
        );
        Ok(nbrhds)
    }

    /// Builds the neighborhood between grobs of `grob_set` which are
    /// connected through the center grobs of `links`.
    ///
    /// `links` has to be a neighborhood whose neighbor set equals `grob_set`
    /// and whose center set is of strictly lower dimension, e.g.
    /// `Neighborhoods::new(mesh, VERTICES, FACES)` to connect faces over
    /// shared vertices.
    pub fn with_links(mesh: Arc<Mesh>, grob_set: GrobSet, links: &Neighborhoods) -> Result<Self> {
        if links.center_set() == grob_set {
            return Err(MeshError::InvalidOperation(format!(
                "link neighborhoods must be centered on another set than {}",
                grob_set.name()
            )));
        }
        if links.neighbor_set() != grob_set {
            return Err(MeshError::InvalidOperation(format!(
                "link neighborhoods must have {} neighbors, found {}",
                grob_set.name(),
                links.neighbor_set().name()
            )));
        }
        let link_set = links.center_set();
        let link_dim = link_set.dim();
        if link_dim >= grob_set.dim() {
            return Err(MeshError::InvalidOperation(
                "link grob sets of higher dimension than the linked grobs are not supported"
                    .into(),
            ));
        }

        let side_map = grob_to_grob_index_map(&mesh, link_set);

        let n = mesh.count(grob_set);
        let mut offsets = vec![0; n + 1];
        let mut nbrs = Vec::new();
        let mut base = [NO_INDEX; NUM_GROB_KINDS];
        let mut seen = GrobHashSet::default();

        let mut row = 0;
        for kind in grob_set {
            base[kind.index()] = row;
            for grob in mesh.grobs(kind).iter() {
                offsets[row] = nbrs.len();
                seen.clear();

                for iside in 0..grob.num_sides(link_dim) {
                    let side = grob.side(link_dim, iside);
                    let side_index = *side_map.get(&side.owned()).ok_or_else(|| {
                        MeshError::InvalidOperation(format!(
                            "mesh does not store the {} sides of its {} grobs",
                            link_set.name(),
                            kind.name()
                        ))
                    })?;

                    for &nbr_index in links.neighbor_grob_indices(side_index)? {
                        let nbr = mesh.grob(nbr_index);
                        if nbr == grob {
                            continue;
                        }
                        if seen.insert(nbr.owned()) {
                            nbrs.push(nbr_index);
                        }
                    }
                }
                row += 1;
            }
        }
        offsets[row] = nbrs.len();

        Ok(Neighborhoods {
            mesh,
            center_set: grob_set,
            neighbor_set: grob_set,
            offsets,
            nbrs,
            base,
        })
    }

    fn fill_higher_dim(&mut self) -> Result<()> {
        let center_dim = self.center_set.dim();
        let (map, base) = grob_to_index_map(&self.mesh, self.center_set);
        self.base = base;

        let n = self.mesh.count(self.center_set);
        let mut counts = vec![0; n];
        for nbr_kind in self.neighbor_set {
            for nbr in self.mesh.grobs(nbr_kind).iter() {
                for iside in 0..nbr.num_sides(center_dim) {
                    let row = self.lookup(&map, nbr.side(center_dim, iside), nbr_kind)?;
                    counts[row] += 1;
                }
            }
        }

        self.offsets = vec![0; n + 1];
        for (i, &count) in counts.iter().enumerate() {
            self.offsets[i + 1] = self.offsets[i] + count;
        }

        self.nbrs = vec![GrobIndex::new(GrobKind::VERTEX, NO_INDEX); self.offsets[n]];
        let mut cursor = self.offsets.clone();
        for nbr_kind in self.neighbor_set {
            for (pos, nbr) in self.mesh.grobs(nbr_kind).iter().enumerate() {
                for iside in 0..nbr.num_sides(center_dim) {
                    let row = self.lookup(&map, nbr.side(center_dim, iside), nbr_kind)?;
                    self.nbrs[cursor[row]] = GrobIndex::new(nbr_kind, pos);
                    cursor[row] += 1;
                }
            }
        }
        Ok(())
    }

    fn fill_lower_dim(&mut self) -> Result<()> {
        let neighbor_dim = self.neighbor_set.dim();

        let n = self.mesh.count(self.center_set);
        self.offsets = vec![0; n + 1];

        let mut row = 0;
        for kind in self.center_set {
            self.base[kind.index()] = row;
            for grob in self.mesh.grobs(kind).iter() {
                self.offsets[row + 1] = self.offsets[row] + grob.num_sides(neighbor_dim);
                row += 1;
            }
        }

        let nbr_map = grob_to_grob_index_map(&self.mesh, self.neighbor_set);
        self.nbrs = Vec::with_capacity(self.offsets[n]);
        for kind in self.center_set {
            for grob in self.mesh.grobs(kind).iter() {
                for iside in 0..grob.num_sides(neighbor_dim) {
                    let side = grob.side(neighbor_dim, iside);
                    let nbr_index = *nbr_map.get(&side.owned()).ok_or_else(|| {
                        MeshError::InvalidOperation(format!(
                            "mesh does not store the {} sides of its {} grobs",
                            self.neighbor_set.name(),
                            kind.name()
                        ))
                    })?;
                    self.nbrs.push(nbr_index);
                }
            }
        }
        Ok(())
    }

    fn lookup(
        &self,
        map: &crate::mesh::GrobHashMap<usize>,
        side: Grob<'_>,
        nbr_kind: GrobKind,
    ) -> Result<usize> {
        map.get(&side.owned()).copied().ok_or_else(|| {
            MeshError::InvalidOperation(format!(
                "mesh does not store the {} sides of its {} grobs",
                self.center_set.name(),
                nbr_kind.name()
            ))
        })
    }

    pub fn mesh(&self) -> &Arc<Mesh> {
        &self.mesh
    }

    pub fn center_set(&self) -> GrobSet {
        self.center_set
    }

    pub fn neighbor_set(&self) -> GrobSet {
        self.neighbor_set
    }

    pub fn num_neighbors(&self, index: GrobIndex) -> Result<usize> {
        Ok(self.neighbor_grob_indices(index)?.len())
    }

    /// The neighbor grob indices of one center grob.
    pub fn neighbor_grob_indices(&self, index: GrobIndex) -> Result<&[GrobIndex]> {
        let row = self.row(index)?;
        Ok(&self.nbrs[self.offsets[row]..self.offsets[row + 1]])
    }

    /// Derived view resolving the neighbor indices to grob references.
    pub fn neighbor_grobs(
        &self,
        index: GrobIndex,
    ) -> Result<impl Iterator<Item = Grob<'_>> + '_> {
        Ok(self
            .neighbor_grob_indices(index)?
            .iter()
            .map(|&gi| self.mesh.grob(gi)))
    }

    fn row(&self, index: GrobIndex) -> Result<usize> {
        let base = self.base[index.kind.index()];
        if base == NO_INDEX {
            return Err(MeshError::InvalidOperation(format!(
                "this neighborhoods instance stores no neighbors for {} grobs",
                index.kind.name()
            )));
        }
        let row = base + index.index;
        if row + 1 >= self.offsets.len() {
            return Err(MeshError::ValueError(format!(
                "grob index {index} is out of range"
            )));
        }
        Ok(row)
    }
}
