//! Rotation algebra on SO(3)
//!
//! Conversions between rotation vectors (axis scaled by angle in radians) and
//! 3x3 rotation matrices, plus a few helpers built on them. Everything here is
//! a pure function. Degenerate inputs (zero vectors, parallel axes, half
//! turns) fall back to a fixed answer instead of failing.

use std::f64::consts::PI;

use crate::simulation::states::{NMat3, NVec3};

/// Squared rotation-vector length below which a rotation counts as identity
const ZERO_ROTATION_SQ: f64 = 1e-10;

/// Distance of cos(angle) from +-1 that switches to the special cases
const COS_EPSILON: f64 = 1e-6;

/// Skew-symmetric matrix `[v]x` with `[v]x * x == v.cross(x)`
pub fn cross_product_matrix(v: &NVec3) -> NMat3 {
    NMat3::new(
        0.0, -v.z, v.y,
        v.z, 0.0, -v.x,
        -v.y, v.x, 0.0,
    )
}

/// Rodrigues' formula for a rotation of `angle` radians about `axis`.
///
/// `axis` need not be unit length. A zero axis gives the identity.
pub fn angle_axis_rotation_matrix(angle: f64, axis: &NVec3) -> NMat3 {
    let Some(axis) = axis.try_normalize(0.0) else {
        return NMat3::identity();
    };
    let (sin_angle, cos_angle) = angle.sin_cos();

    // cross product term with the sine folded into the axis
    let mut r = cross_product_matrix(&(axis * sin_angle));
    r[(0, 0)] += cos_angle;
    r[(1, 1)] += cos_angle;
    r[(2, 2)] += cos_angle;
    // outer product term, scalar applied before forming the product
    r += ((1.0 - cos_angle) * axis) * axis.transpose();
    r
}

/// Exponential map: rotation vector to rotation matrix
pub fn rotation_vector_to_matrix(rotvec: &NVec3) -> NMat3 {
    let angle_sq = rotvec.norm_squared();
    if angle_sq < ZERO_ROTATION_SQ {
        return NMat3::identity();
    }
    angle_axis_rotation_matrix(angle_sq.sqrt(), rotvec)
}

/// Logarithm map: rotation matrix to rotation vector.
///
/// Near a half turn the closed form divides by ~0, so the axis is taken from
/// the eigenvector of the symmetric part with eigenvalue +1 instead. Its sign
/// is arbitrary: `v` and `-v` describe the same half turn.
pub fn rotation_matrix_to_vector(r: &NMat3) -> NVec3 {
    let cs = (r.trace() - 1.0) * 0.5;
    if cs > 1.0 - COS_EPSILON {
        NVec3::zeros()
    } else if cs < COS_EPSILON - 1.0 {
        let sym = (r + r.transpose()) * 0.5;
        let eigen = sym.symmetric_eigen();
        let largest = eigen.eigenvalues.imax();
        let axis = eigen.eigenvectors.column(largest).into_owned();
        axis.normalize() * PI
    } else {
        let sn = (1.0 - cs * cs).sqrt();
        let angle = cs.acos();
        let multiplier = angle * 0.5 / sn;
        NVec3::new(
            (r[(2, 1)] - r[(1, 2)]) * multiplier,
            (r[(0, 2)] - r[(2, 0)]) * multiplier,
            (r[(1, 0)] - r[(0, 1)]) * multiplier,
        )
    }
}

/// Rotation taking the direction of `from` onto the direction of `to`.
///
/// Parallel and anti-parallel inputs both give the identity; the half turn
/// between opposite vectors has no unique axis and is not resolved here.
/// A zero-length input also gives the identity.
pub fn rotation_matrix_vector_to_vector(from: &NVec3, to: &NVec3) -> NMat3 {
    let (Some(from), Some(to)) = (from.try_normalize(0.0), to.try_normalize(0.0)) else {
        return NMat3::identity();
    };
    let axis = from.cross(&to);
    if axis.norm_squared() < ZERO_ROTATION_SQ {
        return NMat3::identity();
    }
    // clamp guards acos against dot drifting past 1 in rounding
    let angle = from.dot(&to).clamp(-1.0, 1.0).acos();
    angle_axis_rotation_matrix(angle, &axis.normalize())
}

/// Rotation a fraction `t` of the way from `a0` toward `a1`.
///
/// The interpolated angle wraps modulo pi.
pub fn rotation_matrix_linear_interpolation(a0: &NMat3, a1: &NMat3, t: f64) -> NMat3 {
    let da = rotation_matrix_to_vector(&(a0.transpose() * a1));
    let Some(axis) = da.try_normalize(0.0) else {
        return *a0;
    };
    let angle = (t * da.norm()) % PI;
    a0 * rotation_vector_to_matrix(&(angle * axis))
}

/// Scale the rotation of `a` by `t`: 0 gives identity, 1 gives `a` back
pub fn rotation_matrix_suppress(a: &NMat3, t: f64) -> NMat3 {
    rotation_vector_to_matrix(&(rotation_matrix_to_vector(a) * t))
}
