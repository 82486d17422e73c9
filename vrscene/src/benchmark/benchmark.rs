use std::time::Instant;

use crate::rotation::so3::{rotation_matrix_to_vector, rotation_vector_to_matrix};
use crate::simulation::engine::GalaxySimulator;
use crate::simulation::params::GalaxyParameters;
use crate::simulation::states::{NMat3, NVec3};

/// Helper to build a seeded simulator with `n` stars split over 3 galaxies
fn make_simulator(n: usize) -> GalaxySimulator {
    let params = GalaxyParameters::with_counts(3, n / 3);
    GalaxySimulator::from_seed(params, NVec3::new(0.0, 0.0, 0.5), NMat3::identity(), 42)
}

/// Deterministic tip positions in front of the eye, no rand needed
fn make_tips(count: usize) -> Vec<NVec3> {
    (0..count)
        .map(|i| {
            let i_f = i as f64;
            NVec3::new((i_f * 0.37).sin() * 0.3, (i_f * 0.13).cos() * 0.3 - 0.2, -0.3)
        })
        .collect()
}

/// Time one physics step for a range of star counts, with and without tips
pub fn bench_galaxy_step() {
    let ns = [3_000, 15_000, 30_000, 90_000, 180_000];
    let steps = 4; // steps averaged per row

    for n in ns {
        let mut bare = make_simulator(n);
        let mut with_tips = make_simulator(n);
        with_tips.set_tips(&make_tips(10));

        // Warm up
        bare.update_all_physics();
        with_tips.update_all_physics();

        let t0 = Instant::now();
        for _ in 0..steps {
            bare.update_all_physics();
        }
        let bare_ms = t0.elapsed().as_secs_f64() * 1000.0 / steps as f64;

        let t1 = Instant::now();
        for _ in 0..steps {
            with_tips.update_all_physics();
        }
        let tips_ms = t1.elapsed().as_secs_f64() * 1000.0 / steps as f64;

        println!("N = {n:7}, step = {bare_ms:8.3} ms, step + 10 tips = {tips_ms:8.3} ms");
    }
}

/// Time exp/log map round trips
pub fn bench_rotation() {
    let count = 1_000_000;
    let vectors: Vec<NVec3> = (0..count)
        .map(|i| {
            let i_f = i as f64;
            NVec3::new((i_f * 0.37).sin(), (i_f * 0.13).cos(), (i_f * 0.07).sin()) * 1.5
        })
        .collect();

    let t0 = Instant::now();
    let mut drift = 0.0;
    for v in &vectors {
        let back = rotation_matrix_to_vector(&rotation_vector_to_matrix(v));
        drift += (back - v).norm();
    }
    let ns_per = t0.elapsed().as_secs_f64() * 1e9 / count as f64;

    println!("rotation round trip: {ns_per:8.1} ns each, mean drift = {:.3e}", drift / count as f64);
}
