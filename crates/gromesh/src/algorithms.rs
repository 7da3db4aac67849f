//! Algorithms operating on whole meshes, currently the refinement engine.

mod hierarchy;
mod refine;

pub use self::hierarchy::{Hierarchy, Relation};
pub use self::refine::refine_triangles;
