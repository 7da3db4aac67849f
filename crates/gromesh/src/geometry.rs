//! The small geometric toolbox of the core: corner access, centroids and
//! vertex normals. Anything beyond that (predicates, spatial queries) is out
//! of scope.

use nalgebra as na;
use ndarray::prelude::*;

use crate::error::{MeshError, Result};
use crate::mesh::{Grob, GrobKind, GrobSetKind, Mesh, RealArrayAnnex, keys};

/// The coordinates of corner `i` of `grob` as a 3D point.
///
/// Fails with `BadTupleSize` unless the coordinate annex has tuple size 3.
pub fn corner_point3(grob: &Grob, coords: &RealArrayAnnex, i: usize) -> Result<na::Point3<f64>> {
    if coords.tuple_size() != 3 {
        return Err(MeshError::BadTupleSize {
            expected: 3,
            got: coords.tuple_size(),
        });
    }
    let tuple = coords.tuple(grob.corner(i));
    Ok(na::Point3::new(tuple[0], tuple[1], tuple[2]))
}

/// The centroid of `grob`: the average of its corner coordinate tuples.
///
/// For a vertex this is a copy of its coordinates, for an edge the midpoint.
pub fn grob_center(grob: &Grob, coords: &RealArrayAnnex) -> Array1<f64> {
    let mut center = Array1::zeros(coords.tuple_size());
    for corner in grob.corners() {
        center += &coords.tuple(corner);
    }
    center / grob.num_corners() as f64
}

/// Normal of the triangle spanned by three points, normalized to unit length.
pub fn triangle_normal(
    p0: &na::Point3<f64>,
    p1: &na::Point3<f64>,
    p2: &na::Point3<f64>,
) -> na::Vector3<f64> {
    (p1 - p0).cross(&(p2 - p0)).normalize()
}

/// Accumulates face normals into per-vertex normals and normalizes them.
///
/// Every surface grob (TRI and QUAD) adds the normal of its first three
/// corners to each of its corner vertices. The resulting normals annex is
/// stored under [`keys::vertex_normals`]; an existing one is replaced.
pub fn compute_face_vertex_normals(mesh: &mut Mesh) -> Result<()> {
    let normals = {
        let coords: &RealArrayAnnex = mesh.annex(&keys::vertex_coords())?;
        if coords.tuple_size() != 3 {
            return Err(MeshError::BadTupleSize {
                expected: 3,
                got: coords.tuple_size(),
            });
        }

        let mut normals = Array2::<f64>::zeros((mesh.count(GrobKind::VERTEX), 3));
        for kind in crate::mesh::GrobSet::new(GrobSetKind::FACES) {
            for grob in mesh.grobs(kind).iter() {
                let p0 = corner_point3(&grob, coords, 0)?;
                let p1 = corner_point3(&grob, coords, 1)?;
                let p2 = corner_point3(&grob, coords, 2)?;
                let n = triangle_normal(&p0, &p1, &p2);

                for corner in grob.corners() {
                    let mut row = normals.row_mut(corner);
                    row[0] += n.x;
                    row[1] += n.y;
                    row[2] += n.z;
                }
            }
        }

        for mut row in normals.rows_mut() {
            let len = (row[0] * row[0] + row[1] * row[1] + row[2] * row[2]).sqrt();
            if len > 0.0 {
                row /= len;
            }
        }
        normals
    };

    mesh.set_annex(
        keys::vertex_normals(),
        RealArrayAnnex::from_array(normals),
    );
    Ok(())
}
