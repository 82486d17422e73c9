//! Random initial conditions for galaxies and stars
//!
//! All sampling draws from a caller-owned `Rng` so a seeded generator
//! reproduces the same sky.

use rand::Rng;

use super::states::NVec3;

/// Random point inside a ball of `radius` around `center`.
///
/// Candidates are drawn uniformly from the enclosing cube and rejected until
/// one falls inside the ball. The accepted offset is then scaled by
/// `(|dr|^2 / radius^2)^2`, so a sample at distance `r` lands at
/// `r^5 / radius^4` and the result bunches toward the center.
pub fn generate_vector<R: Rng + ?Sized>(rng: &mut R, center: &NVec3, radius: f64) -> NVec3 {
    let r2 = radius * radius;
    let dr = loop {
        let dr = NVec3::new(
            (2.0 * rng.gen::<f64>() - 1.0) * radius,
            (2.0 * rng.gen::<f64>() - 1.0) * radius,
            (2.0 * rng.gen::<f64>() - 1.0) * radius,
        );
        if dr.norm_squared() <= r2 {
            break dr;
        }
    };

    if r2 == 0.0 {
        return *center;
    }
    let bias = dr.norm_squared() / r2;
    center + dr * bias * bias
}

/// Random unit vector, +Z if the sample collapses to zero length
pub fn generate_normal<R: Rng + ?Sized>(rng: &mut R) -> NVec3 {
    generate_vector(rng, &NVec3::zeros(), 1.0)
        .try_normalize(f64::EPSILON)
        .unwrap_or_else(NVec3::z)
}

/// Flatten an offset toward the plane with unit `normal`.
///
/// Subtracts `flattening * atan(height / radius)` along the normal, a soft
/// clamp with no hard cutoff.
pub fn project_to_disc(dr: &NVec3, normal: &NVec3, flattening: f64, radius: f64) -> NVec3 {
    let height = dr.dot(normal);
    dr - flattening * (height / radius).atan() * normal
}

/// Circular-orbit velocity for a star at offset `dr` from a core of `mass`.
///
/// Tangential to the disc (`normal x dr`), magnitude `sqrt(mass / |dr|)`.
/// A star sitting exactly on the core gets no orbital velocity.
pub fn initial_velocity(mass: f64, normal: &NVec3, dr: &NVec3) -> NVec3 {
    let r = dr.norm();
    match normal.cross(dr).try_normalize(f64::EPSILON) {
        Some(dir) if r > 0.0 => (mass / r).sqrt() * dir,
        _ => NVec3::zeros(),
    }
}
