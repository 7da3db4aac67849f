use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;

use ndarray::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{MeshError, Result};
use crate::mesh::grob_desc::GrobKind;

/// A dense per-element array with a fixed tuple size.
///
/// Data is stored as an `ndarray` of shape `(num_tuples, tuple_size)`, so the
/// invariant `len % tuple_size == 0` holds by construction. This is the
/// standard annex used for vertex coordinates (tuple size 3), normals and
/// subset ids.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ArrayAnnex<T> {
    data: Array2<T>,
}

pub type RealArrayAnnex = ArrayAnnex<f64>;
pub type IndexArrayAnnex = ArrayAnnex<usize>;

impl<T: Copy + Default> ArrayAnnex<T> {
    pub fn new(tuple_size: usize) -> ArrayAnnex<T> {
        assert!(tuple_size > 0, "tuple size has to be positive");
        ArrayAnnex {
            data: Array2::default((0, tuple_size)),
        }
    }

    pub fn with_tuples(tuple_size: usize, num_tuples: usize) -> ArrayAnnex<T> {
        assert!(tuple_size > 0, "tuple size has to be positive");
        ArrayAnnex {
            data: Array2::default((num_tuples, tuple_size)),
        }
    }

    pub fn from_array(data: Array2<T>) -> ArrayAnnex<T> {
        ArrayAnnex { data }
    }

    /// Builds an annex from a flat buffer; `data.len()` has to be a multiple
    /// of `tuple_size`.
    pub fn from_flat(tuple_size: usize, data: Vec<T>) -> Result<ArrayAnnex<T>> {
        if tuple_size == 0 || data.len() % tuple_size != 0 {
            return Err(MeshError::BadTupleSize {
                expected: tuple_size,
                got: data.len(),
            });
        }
        let num_tuples = data.len() / tuple_size;
        let data = Array2::from_shape_vec((num_tuples, tuple_size), data)
            .map_err(|e| MeshError::Internal(e.to_string()))?;
        Ok(ArrayAnnex { data })
    }

    pub fn tuple_size(&self) -> usize {
        self.data.ncols()
    }

    pub fn num_tuples(&self) -> usize {
        self.data.nrows()
    }

    /// Total number of entries, counting individual components.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn tuple(&self, i: usize) -> ArrayView1<'_, T> {
        self.data.row(i)
    }

    pub fn tuple_mut(&mut self, i: usize) -> ArrayViewMut1<'_, T> {
        self.data.row_mut(i)
    }

    pub fn tuples(&self) -> impl Iterator<Item = ArrayView1<'_, T>> {
        self.data.rows().into_iter()
    }

    pub fn data(&self) -> ArrayView2<'_, T> {
        self.data.view()
    }

    pub fn data_mut(&mut self) -> ArrayViewMut2<'_, T> {
        self.data.view_mut()
    }

    pub fn push(&mut self, tuple: &[T]) -> Result<()> {
        if tuple.len() != self.tuple_size() {
            return Err(MeshError::BadTupleSize {
                expected: self.tuple_size(),
                got: tuple.len(),
            });
        }
        self.data
            .push_row(ArrayView1::from(tuple))
            .map_err(|e| MeshError::Internal(e.to_string()))
    }

    /// Resizes to `num_tuples` tuples, keeping the common prefix and filling
    /// new tuples with the default value. Never fails.
    pub fn resize(&mut self, num_tuples: usize) {
        self.resize_with(num_tuples, T::default());
    }

    /// Like [`ArrayAnnex::resize`], filling new tuples with `value`.
    pub fn resize_with(&mut self, num_tuples: usize, value: T) {
        if num_tuples == self.num_tuples() {
            return;
        }
        let ts = self.tuple_size();
        let mut data = Array2::from_elem((num_tuples, ts), value);
        let keep = num_tuples.min(self.num_tuples());
        data.slice_mut(s![..keep, ..])
            .assign(&self.data.slice(s![..keep, ..]));
        self.data = data;
    }
}

/// Escape hatch for user-defined annex kinds stored alongside the standard
/// dense arrays.
pub trait UserAnnex: Any + Send + Sync + fmt::Debug {
    /// Called whenever the grobs of the annexed kind changed; `grob_count` is
    /// the new grob count. Implementations resize unconditionally and never
    /// fail.
    fn update(&mut self, grob_count: usize);

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// A polymorphic annex value tagged by its runtime kind.
#[derive(Debug)]
pub enum Annex {
    Real(RealArrayAnnex),
    Index(IndexArrayAnnex),
    User(Box<dyn UserAnnex>),
}

impl Annex {
    /// The update every per-kind annex receives when its grobs change.
    pub fn update(&mut self, grob_count: usize) {
        match self {
            Annex::Real(a) => a.resize(grob_count),
            Annex::Index(a) => a.resize(grob_count),
            Annex::User(a) => a.update(grob_count),
        }
    }

    pub fn type_label(&self) -> &'static str {
        match self {
            Annex::Real(_) => "ArrayAnnex<f64>",
            Annex::Index(_) => "ArrayAnnex<usize>",
            Annex::User(_) => "user annex",
        }
    }
}

impl From<RealArrayAnnex> for Annex {
    fn from(a: RealArrayAnnex) -> Self {
        Annex::Real(a)
    }
}

impl From<IndexArrayAnnex> for Annex {
    fn from(a: IndexArrayAnnex) -> Self {
        Annex::Index(a)
    }
}

impl From<Box<dyn UserAnnex>> for Annex {
    fn from(a: Box<dyn UserAnnex>) -> Self {
        Annex::User(a)
    }
}

/// Narrows the polymorphic [`Annex`] to a concrete annex type.
///
/// Implemented for the standard dense arrays; the mesh's typed accessors use
/// it to turn a tag mismatch into [`MeshError::AnnexType`].
pub trait TypedAnnex: Sized {
    const LABEL: &'static str;

    fn from_annex(annex: &Annex) -> Option<&Self>;

    fn from_annex_mut(annex: &mut Annex) -> Option<&mut Self>;
}

impl TypedAnnex for RealArrayAnnex {
    const LABEL: &'static str = "ArrayAnnex<f64>";

    fn from_annex(annex: &Annex) -> Option<&Self> {
        match annex {
            Annex::Real(a) => Some(a),
            _ => None,
        }
    }

    fn from_annex_mut(annex: &mut Annex) -> Option<&mut Self> {
        match annex {
            Annex::Real(a) => Some(a),
            _ => None,
        }
    }
}

impl TypedAnnex for IndexArrayAnnex {
    const LABEL: &'static str = "ArrayAnnex<usize>";

    fn from_annex(annex: &Annex) -> Option<&Self> {
        match annex {
            Annex::Index(a) => Some(a),
            _ => None,
        }
    }

    fn from_annex_mut(annex: &mut Annex) -> Option<&mut Self> {
        match annex {
            Annex::Index(a) => Some(a),
            _ => None,
        }
    }
}

/// Key of an annex: an optional grob kind plus a name.
///
/// Without a kind the annex is mesh-global; with a kind it stores one tuple
/// per grob of that kind. Keys order by (kind, name) so iteration over an
/// [`AnnexStorage`] is deterministic.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AnnexKey {
    kind: Option<GrobKind>,
    name: String,
}

impl AnnexKey {
    pub fn new(kind: impl Into<Option<GrobKind>>, name: impl Into<String>) -> AnnexKey {
        AnnexKey {
            kind: kind.into(),
            name: name.into(),
        }
    }

    pub fn kind(&self) -> Option<GrobKind> {
        self.kind
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for AnnexKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            Some(kind) => write!(f, "{}:{}", kind.name(), self.name),
            None => write!(f, "{}", self.name),
        }
    }
}

/// The standard annex keys shared between the core and its collaborators.
pub mod keys {
    use super::AnnexKey;
    use crate::mesh::grob_desc::GrobKind;

    /// Vertex coordinates, tuple size = space dimension (usually 3).
    pub fn vertex_coords() -> AnnexKey {
        AnnexKey::new(GrobKind::VERTEX, "coords")
    }

    /// Per-vertex normals, tuple size 3.
    pub fn vertex_normals() -> AnnexKey {
        AnnexKey::new(GrobKind::VERTEX, "normal")
    }

    /// Per-grob subset ids of one kind, tuple size 1.
    pub fn subset_ids(kind: GrobKind) -> AnnexKey {
        AnnexKey::new(kind, "subset_ids")
    }
}

/// A keyed, heterogeneous store of annexes with deterministic iteration
/// order.
#[derive(Debug, Default)]
pub struct AnnexStorage {
    map: BTreeMap<AnnexKey, Annex>,
}

impl AnnexStorage {
    pub fn new() -> AnnexStorage {
        AnnexStorage::default()
    }

    /// Inserts or replaces; a replaced annex is dropped.
    pub fn insert(&mut self, key: AnnexKey, annex: Annex) {
        self.map.insert(key, annex);
    }

    pub fn remove(&mut self, key: &AnnexKey) -> Option<Annex> {
        self.map.remove(key)
    }

    pub fn get(&self, key: &AnnexKey) -> Option<&Annex> {
        self.map.get(key)
    }

    pub fn get_mut(&mut self, key: &AnnexKey) -> Option<&mut Annex> {
        self.map.get_mut(key)
    }

    pub fn has(&self, key: &AnnexKey) -> bool {
        self.map.contains_key(key)
    }

    pub fn keys(&self) -> Vec<AnnexKey> {
        self.map.keys().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&AnnexKey, &Annex)> {
        self.map.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&AnnexKey, &mut Annex)> {
        self.map.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}
