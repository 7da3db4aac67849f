//! gromesh: a lightweight in-memory core for mixed-dimension unstructured
//! grids.
//!
//! The crate represents grids through four tightly coupled layers:
//!
//! - the **grob taxonomy**: a closed set of eight grid-object kinds (vertex,
//!   edge, triangle, quadrilateral, tetrahedron, hexahedron, pyramid, prism)
//!   with static descriptors for their dimension, corners and sides;
//! - the **[`Mesh`](mesh::Mesh) container**: one packed corner-index array
//!   per kind plus keyed, heterogeneous per-element data ("annexes") such as
//!   vertex coordinates, normals or subset ids;
//! - the **[`topology`] engine**: unique-side extraction, index maps,
//!   valences, neighborhood tables, rim meshes and connected components;
//! - the **refinement engine** in [`algorithms`]: parent-to-child
//!   hierarchies which subdivide grobs and propagate vertex annexes.
//!
//! File formats, rendering and user interfaces are deliberately external:
//! they populate and consume meshes exclusively through the public interface
//! of this crate.
//!
//! Iteration hands out ephemeral [`Grob`](mesh::Grob) references into the
//! packed arrays; the borrow checker ties their lifetime to the mesh, so no
//! reference survives a mutation of the underlying array. Grobs that must
//! outlive an array (hash keys, hierarchy relations) are copied into
//! [`OwnedGrob`](mesh::OwnedGrob) values.

/// Algorithms operating on whole meshes: hierarchies and refinement.
pub mod algorithms;
mod error;
/// Centroids, triangle normals and per-vertex normal accumulation.
pub mod geometry;
/// The mesh container and everything stored inside it.
pub mod mesh;
#[cfg(test)]
pub mod mesh_examples;
/// Block-parallel iteration used throughout the engines.
pub mod parallel;
/// Topological queries and derived relations over meshes.
pub mod topology;

pub use error::{MeshError, Result};

pub mod prelude {
    pub use crate::algorithms::{Hierarchy, Relation, refine_triangles};
    pub use crate::error::{MeshError, Result};
    pub use crate::geometry::{compute_face_vertex_normals, grob_center, triangle_normal};
    pub use crate::mesh::{
        Annex, AnnexKey, ArrayAnnex, Grob, GrobArray, GrobIndex, GrobKind, GrobMut, GrobSet,
        GrobSetKind, IndexArrayAnnex, Mesh, OwnedGrob, RealArrayAnnex, grob_set_by_dim, keys,
    };
    pub use crate::parallel::{parallel_for, parallel_for_slice_mut, try_parallel_for};
    pub use crate::topology::{
        Neighborhoods, TotalToGrobIndexMap, compute_grob_valences, connected_components,
        create_rim_mesh, create_rim_mesh_with, create_side_grobs, find_unique_sides,
        find_unique_sides_numbered, grob_to_grob_index_map, grob_to_index_map,
        insert_grobs_numbered, valence_histogram,
    };
}
