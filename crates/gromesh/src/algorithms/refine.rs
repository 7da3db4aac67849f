use std::sync::Arc;

use log::debug;

use crate::algorithms::hierarchy::{Hierarchy, Relation};
use crate::error::Result;
use crate::geometry::grob_center;
use crate::mesh::{
    GrobArray, GrobHashMap, GrobKind, GrobSetKind, Mesh, NUM_GROB_KINDS, RealArrayAnnex, keys,
};
use crate::parallel::parallel_for_slice_mut;
use crate::topology::find_unique_sides_numbered;

/// Regular subdivision of all triangles of `parent`.
///
/// Every parent triangle is split into four children: one per corner plus
/// the inner triangle spanned by the three edge midpoints. Each unique
/// parent edge contributes one fresh child vertex, numbered after the parent
/// vertices. The returned hierarchy records the identity relations of the
/// parent vertices, the edge-to-vertex relations and one 1-to-4 relation per
/// parent triangle; the child mesh's vertex coordinates are propagated from
/// the parent through the relation centroids (copies for vertices, midpoints
/// for edges).
pub fn refine_triangles(parent: &Arc<Mesh>) -> Result<(Arc<Mesh>, Hierarchy)> {
    let num_old_vertices = parent.count(GrobKind::VERTEX);

    let mut parent_edges = GrobHashMap::default();
    find_unique_sides_numbered(
        &mut parent_edges,
        parent,
        GrobSetKind::TRIS,
        1,
        num_old_vertices,
    );
    let num_new_vertices = num_old_vertices + parent_edges.len();

    let mut child = Mesh::new();
    child.resize_vertices(num_new_vertices)?;

    let mut relations: [Vec<Relation>; NUM_GROB_KINDS] = std::array::from_fn(|_| Vec::new());

    let vertex_relations = &mut relations[GrobKind::VERTEX.index()];
    vertex_relations.reserve(num_new_vertices);
    for (pos, vertex) in parent.grobs(GrobKind::VERTEX).iter().enumerate() {
        vertex_relations.push(Relation {
            parent: vertex.owned(),
            first_child: pos,
            num_children: 1,
        });
    }
    for (edge, &child_vertex) in &parent_edges {
        vertex_relations.push(Relation {
            parent: edge.clone(),
            first_child: child_vertex,
            num_children: 1,
        });
    }

    let child_tris = create_child_triangles(parent, &parent_edges);
    child.set_grobs(GrobArray::from_flat(GrobKind::TRI, child_tris)?)?;

    let parent_tris = parent.grobs(GrobKind::TRI);
    let tri_relations = &mut relations[GrobKind::TRI.index()];
    tri_relations.reserve(parent_tris.len());
    for (pos, tri) in parent_tris.iter().enumerate() {
        tri_relations.push(Relation {
            parent: tri.owned(),
            first_child: pos * 4,
            num_children: 4,
        });
    }

    propagate_vertex_coords(parent, &mut child, &relations)?;

    debug!(
        "refined {} triangles into {}, {} vertices into {}",
        parent_tris.len(),
        child.count(GrobKind::TRI),
        num_old_vertices,
        num_new_vertices
    );

    let child = Arc::new(child);
    let hierarchy = Hierarchy::from_parts(parent, Arc::clone(&child), relations);
    Ok((child, hierarchy))
}

/// Emits the four child triangles of every parent triangle into one flat
/// index buffer. Parent triangles are processed in parallel; each writes its
/// own 12-index slice.
///
/// With corner labels `(v0, v1, v2)` and mid-edge vertices `(e01, e12, e20)`
/// the children are `(v0, e01, e20) (v1, e12, e01) (v2, e20, e12)` and the
/// inner `(e01, e12, e20)`.
fn create_child_triangles(parent: &Mesh, parent_edges: &GrobHashMap<usize>) -> Vec<usize> {
    let tris = parent.grobs(GrobKind::TRI);
    let mut new_tris = vec![0; tris.num_indices() * 4];

    let mut slots: Vec<(usize, &mut [usize])> = new_tris.chunks_mut(12).enumerate().collect();
    parallel_for_slice_mut(
        &mut slots,
        |(tri_index, out)| {
            let tri = tris.grob(*tri_index);
            let mut edge_vertices = [0; 3];
            for (i, slot) in edge_vertices.iter_mut().enumerate() {
                *slot = parent_edges[&tri.side(1, i).owned()];
            }

            let mut ito = 0;
            for i in 0..3 {
                out[ito] = tri.corner(i);
                out[ito + 1] = edge_vertices[i];
                out[ito + 2] = edge_vertices[(i + 2) % 3];
                ito += 3;
            }
            out[ito] = edge_vertices[0];
            out[ito + 1] = edge_vertices[1];
            out[ito + 2] = edge_vertices[2];
        },
        0,
    );

    new_tris
}

/// The refinement callback: propagates the parent's vertex coordinates to
/// the child mesh through the VERTEX relations. Every child vertex receives
/// the centroid of its relation's parent grob.
fn propagate_vertex_coords(
    parent: &Mesh,
    child: &mut Mesh,
    relations: &[Vec<Relation>; NUM_GROB_KINDS],
) -> Result<()> {
    let parent_coords: &RealArrayAnnex = parent.annex(&keys::vertex_coords())?;
    let tuple_size = parent_coords.tuple_size();

    let mut child_coords =
        RealArrayAnnex::with_tuples(tuple_size, child.count(GrobKind::VERTEX));
    for relation in &relations[GrobKind::VERTEX.index()] {
        let center = grob_center(&relation.parent.as_grob(), parent_coords);
        for child_index in relation.children() {
            child_coords.tuple_mut(child_index).assign(&center);
        }
    }

    child.set_annex(keys::vertex_coords(), child_coords);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    use crate::mesh_examples as me;
    use crate::topology::valence_histogram;

    fn refined_two_tris() -> (Arc<Mesh>, Arc<Mesh>, Hierarchy) {
        let parent = Arc::new(me::make_two_tris());
        let (child, hierarchy) = refine_triangles(&parent).unwrap();
        (parent, child, hierarchy)
    }

    #[test]
    fn test_counts_after_refinement() {
        let (parent, child, _) = refined_two_tris();
        // 4 vertices + 5 unique edges
        assert_eq!(child.count(GrobKind::VERTEX), 9);
        assert_eq!(child.count(GrobKind::TRI), 4 * parent.count(GrobKind::TRI));
    }

    #[test]
    fn test_hierarchy_relations() {
        let (parent, child, hierarchy) = refined_two_tris();

        assert!(Arc::ptr_eq(&hierarchy.parent_mesh().unwrap(), &parent));
        assert!(Arc::ptr_eq(hierarchy.child_mesh(), &child));

        let vertex_relations = hierarchy.relations(GrobKind::VERTEX);
        assert_eq!(vertex_relations.len(), child.count(GrobKind::VERTEX));
        // parent vertices map to themselves
        for (pos, relation) in vertex_relations
            .iter()
            .take(parent.count(GrobKind::VERTEX))
            .enumerate()
        {
            assert_eq!(relation.parent.kind(), GrobKind::VERTEX);
            assert_eq!(relation.children().collect::<Vec<_>>(), vec![pos]);
        }
        // edge children follow the parent vertices
        for relation in &vertex_relations[parent.count(GrobKind::VERTEX)..] {
            assert_eq!(relation.parent.kind(), GrobKind::EDGE);
            assert!(relation.first_child >= parent.count(GrobKind::VERTEX));
            assert_eq!(relation.num_children, 1);
        }

        let tri_relations = hierarchy.relations(GrobKind::TRI);
        assert_eq!(tri_relations.len(), parent.count(GrobKind::TRI));
        for (pos, relation) in tri_relations.iter().enumerate() {
            assert_eq!(relation.first_child, pos * 4);
            assert_eq!(relation.num_children, 4);
        }
    }

    #[test]
    fn test_children_cover_parent_corners() {
        let (parent, child, hierarchy) = refined_two_tris();

        for relation in hierarchy.relations(GrobKind::TRI) {
            let parent_corners: Vec<usize> = relation.parent.corners().to_vec();
            for child_index in relation.children() {
                let child_tri = child.grobs(GrobKind::TRI).grob(child_index);
                // every child corner is either a parent corner or a new
                // edge vertex
                for corner in child_tri.corners() {
                    assert!(
                        parent_corners.contains(&corner)
                            || corner >= parent.count(GrobKind::VERTEX)
                    );
                }
            }
        }
    }

    #[test]
    fn test_edge_children_are_midpoints() {
        let (parent, child, hierarchy) = refined_two_tris();
        let parent_coords: &RealArrayAnnex = parent.annex(&keys::vertex_coords()).unwrap();
        let child_coords: &RealArrayAnnex = child.annex(&keys::vertex_coords()).unwrap();

        for relation in hierarchy.relations(GrobKind::VERTEX) {
            if relation.parent.kind() != GrobKind::EDGE {
                continue;
            }
            let corners = relation.parent.corners();
            let child_tuple = child_coords.tuple(relation.first_child);
            for c in 0..parent_coords.tuple_size() {
                let expected =
                    0.5 * (parent_coords.tuple(corners[0])[c] + parent_coords.tuple(corners[1])[c]);
                assert_abs_diff_eq!(child_tuple[c], expected);
            }
        }
    }

    #[test]
    fn test_parent_vertex_coords_are_copied() {
        let (parent, child, _) = refined_two_tris();
        let parent_coords: &RealArrayAnnex = parent.annex(&keys::vertex_coords()).unwrap();
        let child_coords: &RealArrayAnnex = child.annex(&keys::vertex_coords()).unwrap();

        for pos in 0..parent.count(GrobKind::VERTEX) {
            assert_eq!(parent_coords.tuple(pos), child_coords.tuple(pos));
        }
    }

    #[test]
    fn test_refined_mesh_is_conforming() {
        let (_, child, _) = refined_two_tris();

        let mut rebuilt = Mesh::new();
        rebuilt.resize_vertices(child.count(GrobKind::VERTEX)).unwrap();
        let mut tris = GrobArray::new(GrobKind::TRI);
        for tri in child.grobs(GrobKind::TRI).iter() {
            tris.push_grob(tri).unwrap();
        }
        rebuilt.set_grobs(tris).unwrap();
        crate::topology::create_side_grobs(&mut rebuilt, 1).unwrap();

        // two parent tris refine into 8 children with 16 unique edges: the 6
        // inner edges and the 2 halves of the shared parent edge separate two
        // faces each, the remaining 8 halves stay on the boundary
        let histogram =
            valence_histogram(&rebuilt, GrobSetKind::EDGES, GrobSetKind::FACES).unwrap();
        assert_eq!(histogram, vec![0, 8, 8]);
    }

    #[test]
    fn test_parent_weakness() {
        let parent = Arc::new(me::make_two_tris());
        let (_child, hierarchy) = refine_triangles(&parent).unwrap();
        drop(parent);
        assert!(hierarchy.parent_mesh().is_none());
    }

    #[test]
    fn test_missing_coords_fails() {
        let mut parent = Mesh::new();
        parent.resize_vertices(3).unwrap();
        parent
            .set_grobs(GrobArray::from_flat(GrobKind::TRI, vec![0, 1, 2]).unwrap())
            .unwrap();
        assert!(refine_triangles(&Arc::new(parent)).is_err());
    }
}
