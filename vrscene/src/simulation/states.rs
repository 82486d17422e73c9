//! Core state types for the galaxy simulation.
//!
//! Defines the numeric aliases shared by the whole crate and the two
//! collections the simulator owns:
//! - `Galaxy`    one point-mass core with its disc orientation
//! - `StarField` positions/velocities of every star, structure-of-arrays
//!
//! Stars are grouped by galaxy as contiguous index ranges of equal length.

use std::ops::Range;

use nalgebra::{Matrix3, Matrix4, Vector3};
pub type NVec3 = Vector3<f64>;
pub type NMat3 = Matrix3<f64>;
pub type NMat4 = Matrix4<f64>;

#[derive(Debug, Clone, PartialEq)]
pub struct Galaxy {
    pub x: NVec3, // center position
    pub v: NVec3, // center velocity
    pub m: f64, // mass
    pub normal: NVec3, // unit disc normal
}

/// Star positions and velocities stored as two parallel arrays.
///
/// The length never changes after construction; a reset overwrites entries
/// in place.
#[derive(Debug, Clone)]
pub struct StarField {
    pub x: Vec<NVec3>, // positions
    pub v: Vec<NVec3>, // velocities
    stars_per: usize, // stars owned by each galaxy
}

impl StarField {
    /// Zeroed field for `num_galaxies * stars_per` stars
    pub fn new(num_galaxies: usize, stars_per: usize) -> Self {
        let n = num_galaxies * stars_per;
        Self {
            x: vec![NVec3::zeros(); n],
            v: vec![NVec3::zeros(); n],
            stars_per,
        }
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    pub fn stars_per(&self) -> usize {
        self.stars_per
    }

    /// Galaxy owning star `index`
    pub fn galaxy_of(&self, index: usize) -> usize {
        index / self.stars_per
    }

    /// Contiguous star indices owned by `galaxy`
    pub fn range_of(&self, galaxy: usize) -> Range<usize> {
        let start = galaxy * self.stars_per;
        start..start + self.stars_per
    }
}
