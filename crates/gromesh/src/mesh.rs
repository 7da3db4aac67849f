mod annex;
mod grob;
mod grob_array;
mod grob_desc;
mod grob_index;
mod grob_set;

pub use self::annex::{
    Annex, AnnexKey, AnnexStorage, ArrayAnnex, IndexArrayAnnex, RealArrayAnnex, TypedAnnex,
    UserAnnex, keys,
};
pub use self::grob::{
    CornerIndices, CornerOffsets, Grob, GrobHashMap, GrobHashSet, GrobMut, MAX_GROB_CORNERS,
    OwnedGrob,
};
pub use self::grob_array::GrobArray;
pub use self::grob_desc::{GrobDesc, GrobKind, MAX_GROB_DIM, NUM_GROB_KINDS, SideDesc};
pub use self::grob_index::GrobIndex;
pub use self::grob_set::{GrobSet, GrobSetKind, grob_set_by_dim};

use std::sync::Arc;

use once_cell::sync::OnceCell;

use crate::error::{MeshError, Result};

/// The central container: one packed [`GrobArray`] per grob kind plus a keyed
/// [`AnnexStorage`] for per-element data.
///
/// The shared (`&self`) interface is thread safe: read-only queries on kinds
/// that were never written lazily allocate an empty array under internal
/// synchronization, so concurrent readers always observe a pure interface.
/// All mutation goes through `&mut self` and is serialized by the caller.
///
/// A mesh can *link* individual grob kinds (or its mesh-global annexes) to
/// another, shared mesh. Grob and annex reads for a linked kind are served
/// from the link target, which lets derived meshes (rims, refinements) share
/// vertex data with their source instead of copying it. Links are a read
/// fallback; mutating a linked kind is rejected.
#[derive(Debug, Default)]
pub struct Mesh {
    grob_arrays: [OnceCell<GrobArray>; NUM_GROB_KINDS],
    annexes: AnnexStorage,
    // one slot per kind plus the mesh-global slot
    links: [Option<Arc<Mesh>>; NUM_GROB_KINDS + 1],
}

impl Mesh {
    pub fn new() -> Mesh {
        Mesh::default()
    }

    // ----- grob access ---------------------------------------------------

    /// The grob array of `kind`, lazily allocating an empty array on first
    /// access.
    pub fn grobs(&self, kind: GrobKind) -> &GrobArray {
        if let Some(linked) = &self.links[kind.index()] {
            return linked.grobs(kind);
        }
        self.grob_arrays[kind.index()].get_or_init(|| GrobArray::new(kind))
    }

    /// Mutable access to the grob array of `kind`.
    ///
    /// Fails with `InvalidOperation` if the kind is linked to another mesh;
    /// links are read-only.
    pub fn grobs_mut(&mut self, kind: GrobKind) -> Result<&mut GrobArray> {
        if self.links[kind.index()].is_some() {
            return Err(MeshError::InvalidOperation(format!(
                "{} grobs are linked to another mesh and cannot be mutated here",
                kind.name()
            )));
        }
        let cell = &mut self.grob_arrays[kind.index()];
        if cell.get().is_none() {
            let _ = cell.set(GrobArray::new(kind));
        }
        cell.get_mut()
            .ok_or_else(|| MeshError::Internal("grob array allocation failed".into()))
    }

    /// The grob referenced by `index`. Panics if the index is out of range.
    pub fn grob(&self, index: GrobIndex) -> Grob<'_> {
        self.grobs(index.kind).grob(index.index)
    }

    pub fn has(&self, set: impl Into<GrobSet>) -> bool {
        set.into().iter().any(|kind| self.count_of(kind) > 0)
    }

    /// Number of grobs over all kinds of `set`.
    pub fn count(&self, set: impl Into<GrobSet>) -> usize {
        set.into().iter().map(|kind| self.count_of(kind)).sum()
    }

    /// Number of stored corner indices over all kinds of `set`.
    pub fn num_indices(&self, set: impl Into<GrobSet>) -> usize {
        set.into()
            .iter()
            .map(|kind| self.count_of(kind) * kind.corner_count())
            .sum()
    }

    /// All non-empty kinds, in the invariant kind order.
    pub fn grob_kinds(&self) -> Vec<GrobKind> {
        GrobKind::ALL
            .into_iter()
            .filter(|&kind| self.count_of(kind) > 0)
            .collect()
    }

    /// FACES, CELLS (or VERTICES/EDGES) according to the highest dimension
    /// present; NONE for an empty mesh.
    pub fn highest_grob_set_kind(&self) -> GrobSetKind {
        for dim in (0..=MAX_GROB_DIM).rev() {
            if let Some(set) = grob_set_by_dim(dim)
                && self.has(set)
            {
                return set.kind();
            }
        }
        GrobSetKind::NONE
    }

    fn count_of(&self, kind: GrobKind) -> usize {
        if let Some(linked) = &self.links[kind.index()] {
            return linked.count_of(kind);
        }
        self.grob_arrays[kind.index()]
            .get()
            .map_or(0, GrobArray::len)
    }

    // ----- mutation ------------------------------------------------------

    /// Grows or shrinks the VERTEX array so it contains the identity indices
    /// `0..n`, then updates all VERTEX annexes.
    pub fn resize_vertices(&mut self, n: usize) -> Result<()> {
        let vertices = self.grobs_mut(GrobKind::VERTEX)?;
        if n == vertices.len() {
            return Ok(());
        }
        if n < vertices.len() {
            vertices.truncate(n);
        } else {
            vertices.reserve(n - vertices.len());
            while vertices.len() < n {
                let next = vertices.len();
                vertices.push(&[next])?;
            }
        }
        self.annex_update(GrobKind::VERTEX);
        Ok(())
    }

    /// Appends one grob (typically read from another mesh or buffer) and
    /// updates the annexes of its kind.
    pub fn insert_grob(&mut self, grob: Grob<'_>) -> Result<()> {
        let kind = grob.kind();
        self.grobs_mut(kind)?.push_grob(grob)?;
        self.annex_update(kind);
        Ok(())
    }

    /// Appends a sequence of owned grobs; annexes are updated once per kind
    /// that received grobs.
    pub fn insert_grobs<I>(&mut self, grobs: I) -> Result<()>
    where
        I: IntoIterator<Item = OwnedGrob>,
    {
        let mut inserted = [false; NUM_GROB_KINDS];
        for grob in grobs {
            self.grobs_mut(grob.kind())?.push_owned(&grob)?;
            inserted[grob.kind().index()] = true;
        }
        for kind in GrobKind::ALL {
            if inserted[kind.index()] {
                self.annex_update(kind);
            }
        }
        Ok(())
    }

    /// Replaces the full array of the grobs' kind and updates its annexes.
    pub fn set_grobs(&mut self, grobs: GrobArray) -> Result<()> {
        let kind = grobs.kind();
        *self.grobs_mut(kind)? = grobs;
        self.annex_update(kind);
        Ok(())
    }

    /// Empties the arrays of all kinds in `set` and updates their annexes.
    pub fn clear(&mut self, set: impl Into<GrobSet>) -> Result<()> {
        for kind in set.into() {
            if self.count_of(kind) > 0 {
                self.grobs_mut(kind)?.clear();
                self.annex_update(kind);
            }
        }
        Ok(())
    }

    pub fn clear_grobs(&mut self) -> Result<()> {
        for kind in GrobKind::ALL {
            if self.count_of(kind) > 0 {
                self.grobs_mut(kind)?.clear();
                self.annex_update(kind);
            }
        }
        Ok(())
    }

    // ----- annexes -------------------------------------------------------

    /// Inserts or replaces the annex stored under `key`. Per-kind annexes are
    /// immediately resized to the current grob count of their kind.
    pub fn set_annex(&mut self, key: AnnexKey, annex: impl Into<Annex>) {
        let mut annex = annex.into();
        if let Some(kind) = key.kind() {
            annex.update(self.count_of(kind));
        }
        self.annexes.insert(key, annex);
    }

    /// Typed annex lookup, consulting the linked mesh for the key's kind when
    /// the key is absent locally.
    pub fn annex<T: TypedAnnex>(&self, key: &AnnexKey) -> Result<&T> {
        let annex = self
            .find_annex(key)
            .ok_or_else(|| MeshError::AnnexMissing(key.clone()))?;
        T::from_annex(annex).ok_or_else(|| MeshError::AnnexType {
            key: key.clone(),
            requested: T::LABEL,
        })
    }

    /// Typed mutable annex lookup; local annexes only.
    pub fn annex_mut<T: TypedAnnex>(&mut self, key: &AnnexKey) -> Result<&mut T> {
        let annex = self
            .annexes
            .get_mut(key)
            .ok_or_else(|| MeshError::AnnexMissing(key.clone()))?;
        T::from_annex_mut(annex).ok_or_else(|| MeshError::AnnexType {
            key: key.clone(),
            requested: T::LABEL,
        })
    }

    /// Lookup of a user-defined annex type stored through the escape hatch.
    pub fn user_annex<T: UserAnnex>(&self, key: &AnnexKey) -> Result<&T> {
        let annex = self
            .find_annex(key)
            .ok_or_else(|| MeshError::AnnexMissing(key.clone()))?;
        match annex {
            Annex::User(user) => user.as_any().downcast_ref::<T>(),
            _ => None,
        }
        .ok_or_else(|| MeshError::AnnexType {
            key: key.clone(),
            requested: std::any::type_name::<T>(),
        })
    }

    pub fn has_annex(&self, key: &AnnexKey) -> bool {
        self.find_annex(key).is_some()
    }

    /// Removes a local annex; linked meshes are never touched.
    pub fn remove_annex(&mut self, key: &AnnexKey) -> Option<Annex> {
        self.annexes.remove(key)
    }

    pub fn annex_keys(&self) -> Vec<AnnexKey> {
        self.annexes.keys()
    }

    fn find_annex(&self, key: &AnnexKey) -> Option<&Annex> {
        if let Some(annex) = self.annexes.get(key) {
            return Some(annex);
        }
        self.linked_mesh(key.kind())
            .and_then(|linked| linked.annexes.get(key))
    }

    fn annex_update(&mut self, kind: GrobKind) {
        let count = self.count_of(kind);
        for (key, annex) in self.annexes.iter_mut() {
            if key.kind() == Some(kind) {
                annex.update(count);
            }
        }
    }

    // ----- linked meshes -------------------------------------------------

    /// Links grob and annex lookups for `kind` to `target`; with `None` the
    /// mesh-global annex slot is linked instead.
    pub fn link_mesh(&mut self, target: Arc<Mesh>, kind: impl Into<Option<GrobKind>>) {
        let slot = kind.into().map_or(NUM_GROB_KINDS, GrobKind::index);
        self.links[slot] = Some(target);
    }

    /// Links every kind of `set` to `target`.
    pub fn link_mesh_set(&mut self, target: &Arc<Mesh>, set: impl Into<GrobSet>) {
        for kind in set.into() {
            self.links[kind.index()] = Some(Arc::clone(target));
        }
    }

    pub fn remove_all_links(&mut self) {
        for link in &mut self.links {
            *link = None;
        }
    }

    pub fn linked_mesh(&self, kind: Option<GrobKind>) -> Option<&Arc<Mesh>> {
        let slot = kind.map_or(NUM_GROB_KINDS, GrobKind::index);
        self.links[slot].as_ref()
    }
}
