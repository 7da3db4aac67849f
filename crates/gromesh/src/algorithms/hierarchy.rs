use std::ops::Range;
use std::sync::{Arc, Weak};

use crate::mesh::{GrobKind, Mesh, NUM_GROB_KINDS, OwnedGrob};

/// One parent-to-children relation of a refinement step.
///
/// The children of a parent occupy contiguous indices in the child mesh's
/// grob array of the relation's kind.
#[derive(Debug, Clone)]
pub struct Relation {
    pub parent: OwnedGrob,
    pub first_child: usize,
    pub num_children: usize,
}

impl Relation {
    pub fn children(&self) -> Range<usize> {
        self.first_child..self.first_child + self.num_children
    }
}

/// The parent-to-child record of one refinement step.
///
/// A hierarchy stores, per child grob kind, the list of [`Relation`]s which
/// connect parent grobs to their consecutive children. It holds the child
/// mesh with shared ownership and the parent mesh weakly, so dropping the
/// hierarchy affects neither mesh and a dropped parent is observable through
/// [`Hierarchy::parent_mesh`] returning `None`.
#[derive(Debug)]
pub struct Hierarchy {
    parent: Weak<Mesh>,
    child: Arc<Mesh>,
    relations: [Vec<Relation>; NUM_GROB_KINDS],
}

impl Hierarchy {
    pub fn new(parent: &Arc<Mesh>, child: Arc<Mesh>) -> Hierarchy {
        Hierarchy {
            parent: Arc::downgrade(parent),
            child,
            relations: std::array::from_fn(|_| Vec::new()),
        }
    }

    pub(crate) fn from_parts(
        parent: &Arc<Mesh>,
        child: Arc<Mesh>,
        relations: [Vec<Relation>; NUM_GROB_KINDS],
    ) -> Hierarchy {
        Hierarchy {
            parent: Arc::downgrade(parent),
            child,
            relations,
        }
    }

    pub fn parent_mesh(&self) -> Option<Arc<Mesh>> {
        self.parent.upgrade()
    }

    pub fn child_mesh(&self) -> &Arc<Mesh> {
        &self.child
    }

    pub fn reserve(&mut self, child_kind: GrobKind, num_parents: usize) {
        self.relations[child_kind.index()].reserve(num_parents);
    }

    pub fn add_relation(
        &mut self,
        parent: OwnedGrob,
        child_kind: GrobKind,
        first_child: usize,
        num_children: usize,
    ) {
        self.relations[child_kind.index()].push(Relation {
            parent,
            first_child,
            num_children,
        });
    }

    /// The relations between parents and their children of `child_kind`.
    pub fn relations(&self, child_kind: GrobKind) -> &[Relation] {
        &self.relations[child_kind.index()]
    }
}
