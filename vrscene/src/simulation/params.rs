//! Numerical and visual tuning for the galaxy simulation
//!
//! `GalaxyParameters` holds every constant the sampler, force law and
//! integrator read:
//! - galaxy/star counts and the per-star mass,
//! - softening and strength of galaxy and tip attraction,
//! - predictor/corrector weights and sub-step count,
//! - recycling boundary around the eye,
//! - spawn radii for rejection sampling
//!
//! The values are tuned for how the result looks, not for physical accuracy.

use super::states::NVec3;

#[derive(Debug, Clone)]
pub struct GalaxyParameters {
    pub num_galaxies: usize, // galaxy count
    pub stars_per: usize, // stars per galaxy
    pub mass_per_star: f64, // galaxy mass = stars_per * mass_per_star

    pub galaxy_eps2: f64, // galaxy softening
    pub tip_strength: f64, // tip attraction multiplier
    pub tip_eps2: f64, // tip softening
    pub tip_lead: f64, // velocity lead used when sampling a tip
    pub tip_lead_step: f64, // extra lead per star index

    pub predictor: f64, // fraction of tempV used for the predicted position
    pub blend_predictor: f64, // weight of tempV in the position update
    pub blend_corrector: f64, // weight of v in the position update
    pub substeps: usize, // physics steps per frame

    pub boundary2: f64, // squared distance from the eye that triggers recycling
    pub recycle_lead: f64, // recycled star lands at eye - recycle_lead * v

    pub galaxy_spawn_radius: f64, // radius around spawn_scale * eye
    pub galaxy_spawn_scale: f64,
    pub galaxy_drift: f64, // initial velocity pulls toward drift_scale * eye
    pub galaxy_drift_scale: f64,
    pub galaxy_velocity_radius: f64,
    pub first_galaxy_offset: NVec3, // eye-space offset of galaxy 0
    pub star_spawn_radius: f64,
    pub disc_flattening: f64, // multiplier of the atan pull onto the disc
}

impl Default for GalaxyParameters {
    fn default() -> Self {
        Self {
            num_galaxies: 3,
            stars_per: 30_000,
            mass_per_star: 2e-10,

            galaxy_eps2: 0.3e-3,
            tip_strength: 1.5e-4,
            tip_eps2: 10e-3,
            tip_lead: 0.1,
            tip_lead_step: 0.0001,

            predictor: 0.667,
            blend_predictor: 0.25,
            blend_corrector: 0.75,
            substeps: 2,

            boundary2: 50.0,
            recycle_lead: 10.0,

            galaxy_spawn_radius: 1.0,
            galaxy_spawn_scale: 1.2,
            galaxy_drift: -1e-3,
            galaxy_drift_scale: 1.1,
            galaxy_velocity_radius: 0.0004,
            first_galaxy_offset: NVec3::new(0.0, -0.5, -1.0),
            star_spawn_radius: 0.5,
            disc_flattening: 0.4,
        }
    }
}

impl GalaxyParameters {
    /// Defaults with a different galaxy layout
    pub fn with_counts(num_galaxies: usize, stars_per: usize) -> Self {
        Self {
            num_galaxies,
            stars_per,
            ..Self::default()
        }
    }

    pub fn num_stars(&self) -> usize {
        self.num_galaxies * self.stars_per
    }

    pub fn galaxy_mass(&self) -> f64 {
        self.stars_per as f64 * self.mass_per_star
    }
}
