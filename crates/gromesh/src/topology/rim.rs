use std::sync::Arc;

use log::debug;

use crate::error::{MeshError, Result};
use crate::mesh::{GrobIndex, GrobKind, GrobSet, Mesh};
use crate::topology::Neighborhoods;

/// Extracts the rim (boundary) of the grobs in `grob_set`.
///
/// See [`create_rim_mesh_with`]; all neighbors count as visible and rim grobs
/// are not reported back.
pub fn create_rim_mesh(mesh: &Arc<Mesh>, grob_set: GrobSet) -> Result<Mesh> {
    create_rim_mesh_with(mesh, grob_set, |_| true, |_, _| {}, None)
}

/// Extracts the rim (boundary) of the grobs in `grob_set` into a new mesh.
///
/// The rim consists of all side grobs of `grob_set.side_set()` with exactly
/// one *visible* neighbor in `grob_set`, where `visible` defaults to
/// accepting every neighbor. The source mesh has to store those side grobs
/// (e.g. after [`create_side_grobs`](crate::topology::create_side_grobs)).
///
/// `on_rim` is invoked with the index of each inserted rim grob in the
/// output mesh and the index of its unique visible source neighbor.
///
/// Coordinates are not copied: the rim mesh links its VERTEX kind back to
/// the source mesh, so vertex annexes are shared. An already computed
/// `Neighborhoods(side_set -> grob_set)` can be passed to avoid
/// reconstruction; a mismatching instance is rejected.
pub fn create_rim_mesh_with(
    mesh: &Arc<Mesh>,
    grob_set: GrobSet,
    visible: impl Fn(GrobIndex) -> bool,
    mut on_rim: impl FnMut(GrobIndex, GrobIndex),
    nbrhds: Option<&Neighborhoods>,
) -> Result<Mesh> {
    let mut rim_mesh = Mesh::new();
    rim_mesh.link_mesh(Arc::clone(mesh), GrobKind::VERTEX);

    if grob_set.dim() == 0 {
        return Ok(rim_mesh);
    }
    let rim_set = grob_set.side_set();

    let local_nbrhds;
    let nbrhds = match nbrhds {
        Some(provided) => {
            if provided.center_set() != rim_set || provided.neighbor_set() != grob_set {
                return Err(MeshError::InvalidOperation(format!(
                    "rim extraction of {} needs {} -> {} neighborhoods",
                    grob_set.name(),
                    rim_set.name(),
                    grob_set.name()
                )));
            }
            provided
        }
        None => {
            local_nbrhds = Neighborhoods::new(Arc::clone(mesh), rim_set, grob_set)?;
            &local_nbrhds
        }
    };

    for rim_kind in rim_set {
        for (pos, rim_grob) in mesh.grobs(rim_kind).iter().enumerate() {
            let rim_index = GrobIndex::new(rim_kind, pos);

            let mut num_visible = 0;
            let mut visible_nbr = rim_index;
            for &nbr in nbrhds.neighbor_grob_indices(rim_index)? {
                if visible(nbr) {
                    visible_nbr = nbr;
                    num_visible += 1;
                }
            }

            if num_visible == 1 {
                rim_mesh.insert_grob(rim_grob)?;
                on_rim(
                    GrobIndex::new(rim_kind, rim_mesh.count(rim_kind) - 1),
                    visible_nbr,
                );
            }
        }
    }

    debug!(
        "rim of {}: {} grobs",
        grob_set.name(),
        rim_mesh.count(rim_set)
    );
    Ok(rim_mesh)
}
