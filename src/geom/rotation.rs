use crate::Point;
use crate::Vector;
use crate::geom::IsClose;
use anyhow::{Result, anyhow};
use ndarray as nd;

/// Rodrigues matrix for a turn of `phi` radians about the unit axis `u`.
pub fn rotation_matrix(u: &Vector, phi: f64) -> Result<nd::Array2<f64>> {
    if !u.length().is_close(1.) {
        return Err(anyhow!("Rotation axis {} is not a unit vector", u));
    }
    // Cross-product matrix of u
    let k = nd::arr2(&[[0., -u.dz, u.dy], [u.dz, 0., -u.dx], [-u.dy, u.dx, 0.]]);
    let k2 = k.dot(&k);
    Ok(nd::Array2::eye(3) + phi.sin() * k + (1. - phi.cos()) * k2)
}

pub fn rotate_vector(v: &Vector, rot: &nd::Array2<f64>) -> Vector {
    let r = rot.dot(&nd::arr1(&[v.dx, v.dy, v.dz]));
    Vector::new(r[0], r[1], r[2])
}

/// Turns `pt` by `phi` radians about the line through `centre` along `axis`.
///
/// `axis` is normalized here; a zero axis is an error.
pub fn rotate_point_around_axis(
    pt: Point,
    axis: &Vector,
    centre: Point,
    phi: f64,
) -> Result<Point> {
    if phi.is_close(0.) {
        return Ok(pt);
    }
    let rot = rotation_matrix(&axis.normalize()?, phi)?;
    Ok(centre + rotate_vector(&(pt - centre), &rot))
}
