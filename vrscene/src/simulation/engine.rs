//! Galaxy simulator runtime
//!
//! Owns the galaxies, the star field, the latest attractor tips and the
//! random source used to (re)seed the sky. The host sets the eye pose and
//! tips each frame, calls `update_all_physics`, then reads positions back.

use log::{debug, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::ops::Range;

use super::integrator::predictor_corrector_step;
use super::params::GalaxyParameters;
use super::sampling::{generate_normal, generate_vector, initial_velocity, project_to_disc};
use super::states::{Galaxy, NMat3, NVec3, StarField};

pub struct GalaxySimulator<R: Rng = StdRng> {
    params: GalaxyParameters,
    rng: R,
    galaxies: Vec<Galaxy>,
    stars: StarField,
    tips: Vec<NVec3>, // attractor points, replaced every frame
    eye_pos: NVec3,
    eye_view: NMat3, // world -> eye rotation
    recycled: usize, // stars recycled during the last step
    recycled_total: usize, // stars recycled since construction
}

impl GalaxySimulator<StdRng> {
    /// Simulator drawing from a `StdRng` seeded with `seed`
    pub fn from_seed(params: GalaxyParameters, eye_pos: NVec3, eye_view: NMat3, seed: u64) -> Self {
        Self::new(params, eye_pos, eye_view, StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> GalaxySimulator<R> {
    /// Build and immediately seed the sky around the eye
    pub fn new(params: GalaxyParameters, eye_pos: NVec3, eye_view: NMat3, rng: R) -> Self {
        let mut sim = Self {
            stars: StarField::new(params.num_galaxies, params.stars_per),
            galaxies: Vec::with_capacity(params.num_galaxies),
            params,
            rng,
            tips: Vec::new(),
            eye_pos,
            eye_view,
            recycled: 0,
            recycled_total: 0,
        };
        sim.init_physics();
        sim
    }

    /// Re-sample every galaxy and star around the current eye pose.
    ///
    /// Galaxy 0 is placed just in front of and below the eye; the rest land
    /// in a ball around `1.2 * eye`. Stars are spread over a flattened disc
    /// around their core with circular-orbit velocities.
    pub fn init_physics(&mut self) {
        let p = &self.params;
        let eye = self.eye_pos;
        let mass = p.galaxy_mass();

        self.galaxies.clear();
        for i in 0..p.num_galaxies {
            // galaxy 0 still draws a sample so every galaxy consumes the same randomness
            let sampled = generate_vector(&mut self.rng, &(p.galaxy_spawn_scale * eye), p.galaxy_spawn_radius);
            let x = if i == 0 {
                eye + self.eye_view.transpose() * p.first_galaxy_offset
            } else {
                sampled
            };
            let drift = p.galaxy_drift * (x - p.galaxy_drift_scale * eye);
            let v = generate_vector(&mut self.rng, &drift, p.galaxy_velocity_radius);
            let normal = generate_normal(&mut self.rng);
            let galaxy = Galaxy { x, v, m: mass, normal };

            for j in self.stars.range_of(i) {
                let dr = generate_vector(&mut self.rng, &NVec3::zeros(), p.star_spawn_radius);
                let dr = project_to_disc(&dr, &galaxy.normal, p.disc_flattening, p.star_spawn_radius);
                self.stars.x[j] = galaxy.x + dr;
                self.stars.v[j] = galaxy.v + initial_velocity(galaxy.m, &galaxy.normal, &dr);
            }
            self.galaxies.push(galaxy);
        }
        self.recycled = 0;

        info!(
            "initialized {} galaxies x {} stars around eye ({:.3}, {:.3}, {:.3})",
            p.num_galaxies, p.stars_per, eye.x, eye.y, eye.z
        );
    }

    /// One predictor/corrector step of every star and galaxy
    pub fn update_all_physics(&mut self) {
        self.recycled = predictor_corrector_step(
            &mut self.stars,
            &mut self.galaxies,
            &self.tips,
            &self.eye_pos,
            &self.params,
        );
        self.recycled_total += self.recycled;
        if self.recycled > 0 {
            debug!("recycled {} stars behind the eye", self.recycled);
        }
    }

    /// Per-frame update: a fixed number of steps, independent of frame time
    pub fn update(&mut self) {
        for _ in 0..self.params.substeps {
            self.update_all_physics();
        }
    }

    pub fn set_eye(&mut self, pos: NVec3, view: NMat3) {
        self.eye_pos = pos;
        self.eye_view = view;
    }

    pub fn set_tips(&mut self, tips: &[NVec3]) {
        self.tips.clear();
        self.tips.extend_from_slice(tips);
    }

    pub fn params(&self) -> &GalaxyParameters {
        &self.params
    }

    pub fn galaxies(&self) -> &[Galaxy] {
        &self.galaxies
    }

    pub fn positions(&self) -> &[NVec3] {
        &self.stars.x
    }

    pub fn velocities(&self) -> &[NVec3] {
        &self.stars.v
    }

    /// Direct access for hosts (and tests) that place stars by hand
    pub fn stars_mut(&mut self) -> &mut StarField {
        &mut self.stars
    }

    pub fn tips(&self) -> &[NVec3] {
        &self.tips
    }

    pub fn eye_pos(&self) -> &NVec3 {
        &self.eye_pos
    }

    pub fn num_stars(&self) -> usize {
        self.stars.len()
    }

    pub fn galaxy_of(&self, star: usize) -> usize {
        self.stars.galaxy_of(star)
    }

    pub fn star_range(&self, galaxy: usize) -> Range<usize> {
        self.stars.range_of(galaxy)
    }

    /// Stars recycled during the most recent step
    pub fn recycled(&self) -> usize {
        self.recycled
    }

    /// Stars recycled over the simulator's lifetime, across resets
    pub fn recycled_total(&self) -> usize {
        self.recycled_total
    }

    /// Packed xyz positions for a point-cloud vertex buffer
    pub fn positions_f32(&self) -> Vec<f32> {
        let mut buf = Vec::with_capacity(3 * self.stars.len());
        self.write_positions(&mut buf);
        buf
    }

    /// Refill `buf` with packed xyz positions, reusing its allocation
    pub fn write_positions(&self, buf: &mut Vec<f32>) {
        buf.clear();
        for r in &self.stars.x {
            buf.extend_from_slice(&[r.x as f32, r.y as f32, r.z as f32]);
        }
    }
}
