use itertools::Itertools;
use petgraph::algo::kosaraju_scc;
use petgraph::prelude::UnGraphMap;
use smallvec::SmallVec;

use crate::error::{MeshError, Result};
use crate::mesh::{GrobHashMap, GrobIndex, GrobSet, Mesh};

/// Decomposes the grobs of `grob_set` into connected components.
///
/// Two grobs belong to the same component if a chain of grobs connects them
/// in which consecutive grobs share a side of dimension `link_dim`. Returns
/// one list of grob indices per component.
pub fn connected_components(
    mesh: &Mesh,
    grob_set: GrobSet,
    link_dim: usize,
) -> Result<Vec<Vec<GrobIndex>>> {
    if link_dim >= grob_set.dim() {
        return Err(MeshError::InvalidOperation(format!(
            "components of {} cannot be linked through sides of dimension {link_dim}",
            grob_set.name()
        )));
    }

    let mut side_to_elems: GrobHashMap<SmallVec<[GrobIndex; 2]>> = GrobHashMap::default();
    let mut graph: UnGraphMap<GrobIndex, ()> = UnGraphMap::new();

    for kind in grob_set {
        for (pos, grob) in mesh.grobs(kind).iter().enumerate() {
            let index = GrobIndex::new(kind, pos);
            graph.add_node(index);
            for iside in 0..grob.num_sides(link_dim) {
                side_to_elems
                    .entry(grob.side(link_dim, iside).owned())
                    .or_default()
                    .push(index);
            }
        }
    }

    for (_, elems) in side_to_elems {
        elems.iter().tuple_combinations().for_each(|(a, b)| {
            graph.add_edge(*a, *b, ());
        });
    }

    Ok(kosaraju_scc(&graph))
}
