use serde::{Deserialize, Serialize};

use crate::mesh::grob_desc::GrobKind;

/// A stable handle to a grob: its kind plus its position within that kind's
/// array. Valid across non-mutating operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GrobIndex {
    pub kind: GrobKind,
    pub index: usize,
}

impl GrobIndex {
    pub fn new(kind: GrobKind, index: usize) -> GrobIndex {
        GrobIndex { kind, index }
    }
}

impl std::fmt::Display for GrobIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}[{}]", self.kind.name(), self.index)
    }
}
