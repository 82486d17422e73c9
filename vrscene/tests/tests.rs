use std::f64::consts::PI;

use vrscene::{
    angle_axis_rotation_matrix, rotation_matrix_linear_interpolation, rotation_matrix_suppress,
    rotation_matrix_to_vector, rotation_matrix_vector_to_vector, rotation_vector_to_matrix,
};
use vrscene::{EventHandlerAction, FlyingLayer, FlyingParameters, FrameInput, InteractionLayer, Key, KeyEvent};
use vrscene::{
    predictor_corrector_step, ForceField, Galaxy, GalaxyParameters, GalaxySimulator, NMat3, NVec3, Scene, SceneConfig,
    Source, SpaceLayer, StarField,
};

/// Small seeded simulator with the eye at `eye`
pub fn small_simulator(galaxies: usize, stars_per: usize, eye: NVec3) -> GalaxySimulator {
    GalaxySimulator::from_seed(GalaxyParameters::with_counts(galaxies, stars_per), eye, NMat3::identity(), 42)
}

/// Deterministic spread of unit axes, no rand needed
pub fn test_axes(n: usize) -> Vec<NVec3> {
    (0..n)
        .map(|i| {
            let i_f = i as f64 + 1.0;
            NVec3::new((i_f * 0.37).sin(), (i_f * 0.13).cos(), (i_f * 0.71).sin()).normalize()
        })
        .collect()
}

pub fn assert_close(a: &NMat3, b: &NMat3, tol: f64) {
    let err = (a - b).abs().max();
    assert!(err < tol, "max error {err:e} exceeds {tol:e}:\n{a}\n{b}");
}

// ==================================================================================
// Rotation algebra tests
// ==================================================================================

#[test]
fn rodrigues_is_orthonormal() {
    for (i, axis) in test_axes(40).iter().enumerate() {
        let angle = -7.0 + 0.37 * i as f64;
        let r = angle_axis_rotation_matrix(angle, &(axis * (0.1 + i as f64)));
        assert_close(&(r.transpose() * r), &NMat3::identity(), 1e-12);
        assert!((r.determinant() - 1.0).abs() < 1e-12, "det = {}", r.determinant());
    }
}

#[test]
fn log_exp_round_trip() {
    for (i, axis) in test_axes(50).iter().enumerate() {
        let angle = 0.05 + 3.0 * i as f64 / 50.0;
        let r = angle_axis_rotation_matrix(angle, axis);
        let v = rotation_matrix_to_vector(&r);
        assert!((v.norm() - angle).abs() < 1e-6, "angle {angle} came back as {}", v.norm());
        assert_close(&rotation_vector_to_matrix(&v), &r, 1e-6);
    }
}

#[test]
fn near_zero_rotation_maps_to_identity() {
    let r = angle_axis_rotation_matrix(1e-7, &NVec3::new(0.2, 0.3, 0.9));
    let v = rotation_matrix_to_vector(&r);
    assert_eq!(v, NVec3::zeros());
    assert_eq!(rotation_vector_to_matrix(&v), NMat3::identity());
}

#[test]
fn half_turn_axis_sign_is_free() {
    for axis in test_axes(10) {
        let r = angle_axis_rotation_matrix(PI, &axis);
        let v = rotation_matrix_to_vector(&r);
        assert!((v.norm() - PI).abs() < 1e-9);
        // same line as the true axis, either direction
        assert!(v.normalize().dot(&axis).abs() > 1.0 - 1e-6);
        assert_close(&rotation_vector_to_matrix(&v), &r, 1e-6);
    }
}

#[test]
fn vector_to_vector_same_direction_is_identity() {
    for a in test_axes(10) {
        assert_eq!(rotation_matrix_vector_to_vector(&a, &a), NMat3::identity());
        assert_eq!(rotation_matrix_vector_to_vector(&a, &(3.0 * a)), NMat3::identity());
    }
}

#[test]
fn vector_to_vector_maps_from_onto_to() {
    let axes = test_axes(12);
    for pair in axes.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        let r = rotation_matrix_vector_to_vector(&a, &b);
        assert!((r * a - b).norm() < 1e-9, "{} vs {}", r * a, b);
    }
}

#[test]
fn vector_to_vector_opposite_falls_back_to_identity() {
    let a = NVec3::new(0.0, 0.0, 1.0);
    assert_eq!(rotation_matrix_vector_to_vector(&a, &-a), NMat3::identity());
    assert_eq!(rotation_matrix_vector_to_vector(&NVec3::zeros(), &a), NMat3::identity());
}

#[test]
fn suppress_scales_rotation() {
    let r = rotation_vector_to_matrix(&NVec3::new(0.4, -0.9, 0.3));
    assert_close(&rotation_matrix_suppress(&r, 0.0), &NMat3::identity(), 1e-15);
    assert_close(&rotation_matrix_suppress(&r, 1.0), &r, 1e-9);
    let half = rotation_matrix_suppress(&r, 0.5);
    assert_close(&(half * half), &r, 1e-9);
}

#[test]
fn interpolation_halfway_and_wrap() {
    let a0 = NMat3::identity();
    let a1 = rotation_vector_to_matrix(&NVec3::new(0.0, 0.0, 1.2));
    let mid = rotation_matrix_linear_interpolation(&a0, &a1, 0.5);
    assert_close(&mid, &rotation_vector_to_matrix(&NVec3::new(0.0, 0.0, 0.6)), 1e-9);

    // 3 * 1.2 = 3.6 wraps to 3.6 - pi
    let over = rotation_matrix_linear_interpolation(&a0, &a1, 3.0);
    assert_close(&over, &rotation_vector_to_matrix(&NVec3::new(0.0, 0.0, 3.6 - PI)), 1e-9);
}

// ==================================================================================
// Force law tests
// ==================================================================================

fn still_galaxy(x: NVec3, m: f64) -> Galaxy {
    Galaxy { x, v: NVec3::zeros(), m, normal: NVec3::z() }
}

#[test]
fn galaxy_pull_points_at_core() {
    let params = GalaxyParameters::default();
    let galaxies = [still_galaxy(NVec3::new(1.0, 0.0, 0.0), 1e-5)];
    let field = ForceField::new(&params, &galaxies, &[]);

    let mut v = NVec3::zeros();
    field.update_v(0, &NVec3::zeros(), &mut v, Source::Galaxy(0));
    let expected = 1e-5 / (params.galaxy_eps2 + 1.0);
    assert!((v - NVec3::new(expected, 0.0, 0.0)).norm() < 1e-18);

    // at the core there is no direction and no pull
    let mut v = NVec3::zeros();
    field.update_v(0, &galaxies[0].x, &mut v, Source::Galaxy(0));
    assert_eq!(v, NVec3::zeros());
}

#[test]
fn tip_pull_uses_velocity_lead() {
    let params = GalaxyParameters::default();
    let tips = [NVec3::new(0.0, 0.5, 0.0)];
    let field = ForceField::new(&params, &[], &tips);

    let v0 = NVec3::new(1.0, 0.0, 0.0);
    let mut v = v0;
    field.update_v(100, &NVec3::zeros(), &mut v, Source::Tip(0));

    let lead = 0.1 + 100.0 * 0.0001;
    let dr = tips[0] - lead * v0;
    let expected = v0 + 1.5e-4 * dr / (1e-2 + dr.norm_squared());
    assert!((v - expected).norm() < 1e-15);
}

#[test]
fn origin_source_is_inert() {
    let params = GalaxyParameters::default();
    let galaxies = [still_galaxy(NVec3::new(1.0, 0.0, 0.0), 1.0)];
    let field = ForceField::new(&params, &galaxies, &[]);
    let mut v = NVec3::new(0.1, 0.2, 0.3);
    field.update_v(0, &NVec3::zeros(), &mut v, Source::Origin);
    assert_eq!(v, NVec3::new(0.1, 0.2, 0.3));
    assert!(field.sources().all(|s| s != Source::Origin));
}

#[test]
fn accumulate_skips_self() {
    let params = GalaxyParameters::default();
    let galaxies = [still_galaxy(NVec3::new(1.0, 0.0, 0.0), 1e-5), still_galaxy(NVec3::new(-1.0, 0.0, 0.0), 1e-5)];
    let field = ForceField::new(&params, &galaxies, &[]);

    let mut v = NVec3::zeros();
    field.accumulate(0, &NVec3::new(0.9, 0.0, 0.0), &mut v, Some(Source::Galaxy(0)));
    // only galaxy 1 contributes, pulling toward -x
    assert!(v.x < 0.0);
}

// ==================================================================================
// Galaxy simulator tests
// ==================================================================================

#[test]
fn star_partition_is_exact() {
    let sim = small_simulator(3, 7, NVec3::new(0.0, 0.0, 0.5));
    assert_eq!(sim.num_stars(), 21);
    assert_eq!(sim.positions().len(), 21);
    assert_eq!(sim.velocities().len(), 21);
    for i in 0..sim.num_stars() {
        assert_eq!(sim.galaxy_of(i), i / 7);
        assert!(sim.star_range(i / 7).contains(&i));
    }
}

#[test]
fn first_galaxy_sits_in_front_of_eye() {
    let eye = NVec3::new(0.2, 1.5, -0.4);
    let sim = small_simulator(2, 4, eye);
    let expected = eye + NVec3::new(0.0, -0.5, -1.0);
    assert!((sim.galaxies()[0].x - expected).norm() < 1e-12);
    for g in sim.galaxies() {
        assert!((g.normal.norm() - 1.0).abs() < 1e-12);
        assert!((g.m - 4.0 * 2e-10).abs() < 1e-24);
    }
}

#[test]
fn same_seed_same_sky() {
    let a = small_simulator(3, 50, NVec3::new(0.0, 0.0, 0.5));
    let b = small_simulator(3, 50, NVec3::new(0.0, 0.0, 0.5));
    assert_eq!(a.positions(), b.positions());
    assert_eq!(a.velocities(), b.velocities());
}

#[test]
fn small_galaxy_end_to_end() {
    let eye = NVec3::new(0.3, 0.1, 0.5);
    let mut sim = small_simulator(2, 4, eye);
    assert_eq!(sim.num_stars(), 8);

    for (i, x) in sim.positions().iter().enumerate() {
        let center = sim.galaxies()[sim.galaxy_of(i)].x;
        assert!((x - center).norm() <= 0.5 + 1e-12, "star {i} is {} from its core", (x - center).norm());
    }

    sim.set_tips(&[eye + NVec3::new(0.0, -0.2, -0.3)]);
    sim.update_all_physics();

    let finite = |v: &NVec3| v.iter().all(|c| c.is_finite());
    assert!(sim.positions().iter().all(finite));
    assert!(sim.velocities().iter().all(finite));
    assert!(sim.galaxies().iter().all(|g| finite(&g.x) && finite(&g.v)));
}

#[test]
fn strayed_star_is_recycled_behind_eye() {
    let eye = NVec3::new(0.0, 0.0, 0.5);
    let mut params = GalaxyParameters::with_counts(1, 2);
    params.mass_per_star = 0.0; // no pull at all, stars coast
    let mut sim = GalaxySimulator::from_seed(params, eye, NMat3::identity(), 3);

    {
        let stars = sim.stars_mut();
        stars.x[0] = eye + NVec3::new(10.0, 0.0, 0.0); // squared distance 100
        stars.v[0] = NVec3::new(0.5, 0.0, 0.0);
    }
    sim.update_all_physics();

    let target = eye - 10.0 * NVec3::new(0.5, 0.0, 0.0);
    assert!((sim.positions()[0] - target).norm() < 1e-12);
    assert_eq!(sim.velocities()[0], NVec3::zeros());
    assert!(sim.recycled() >= 1);

    // at rest with nothing pulling: stays put
    sim.update_all_physics();
    assert!((sim.positions()[0] - target).norm() < 1e-12);
    assert!((sim.positions()[0] - eye).norm_squared() <= 50.0);
}

#[test]
fn coasting_star_moves_by_its_velocity() {
    let eye = NVec3::zeros();
    let mut params = GalaxyParameters::with_counts(1, 1);
    params.mass_per_star = 0.0;
    let mut sim = GalaxySimulator::from_seed(params, eye, NMat3::identity(), 3);
    {
        let stars = sim.stars_mut();
        stars.x[0] = NVec3::new(1.0, 0.0, 0.0);
        stars.v[0] = NVec3::new(0.0, 0.01, 0.0);
    }
    sim.update_all_physics();
    assert!((sim.positions()[0] - NVec3::new(1.0, 0.01, 0.0)).norm() < 1e-15);
}

#[test]
fn star_step_uses_predictor_and_blend_weights() {
    let params = GalaxyParameters::default();
    let galaxies = vec![Galaxy { x: NVec3::zeros(), v: NVec3::zeros(), m: 1e-3, normal: NVec3::z() }];
    let x0 = NVec3::new(0.1, 0.0, 0.0);
    let v0 = NVec3::new(0.0, 0.05, 0.0);

    // by hand against the starting galaxy
    let field = ForceField::new(&params, &galaxies, &[]);
    let mut temp_v = v0;
    field.update_v(0, &x0, &mut temp_v, Source::Galaxy(0));
    let x_pred = x0 + 0.667 * temp_v;
    let mut v1 = v0;
    field.update_v(0, &x_pred, &mut v1, Source::Galaxy(0));
    let x1 = x0 + 0.25 * temp_v + 0.75 * v1;

    // a different predictor weight lands somewhere else
    let mut v_half = v0;
    field.update_v(0, &(x0 + 0.5 * temp_v), &mut v_half, Source::Galaxy(0));
    assert!((v_half - v1).norm() > 1e-6);

    let mut stars = StarField::new(1, 1);
    stars.x[0] = x0;
    stars.v[0] = v0;
    let mut moved = galaxies.clone();
    let recycled = predictor_corrector_step(&mut stars, &mut moved, &[], &NVec3::zeros(), &params);

    assert_eq!(recycled, 0);
    assert!((stars.v[0] - v1).norm() < 1e-15, "{} vs {}", stars.v[0], v1);
    assert!((stars.x[0] - x1).norm() < 1e-15, "{} vs {}", stars.x[0], x1);
}

#[test]
fn lone_galaxy_ignores_its_own_pull() {
    let eye = NVec3::new(0.0, 0.0, 0.5);
    let mut params = GalaxyParameters::with_counts(1, 4);
    params.mass_per_star = 1e-3;
    let mut sim = GalaxySimulator::from_seed(params, eye, NMat3::identity(), 7);

    let before = sim.galaxies()[0].clone();
    sim.update_all_physics();
    let after = &sim.galaxies()[0];

    assert_eq!(after.v, before.v);
    assert!((after.x - (before.x + before.v)).norm() < 1e-15);
}

// ==================================================================================
// Space layer tests
// ==================================================================================

#[test]
fn space_update_ignores_frame_time() {
    let eye = NVec3::new(0.0, 0.0, 0.5);
    let mut fast = SpaceLayer::new(small_simulator(2, 20, eye));
    let mut slow = SpaceLayer::new(small_simulator(2, 20, eye));

    let mut input = FrameInput::at_eye(eye, NMat3::identity());
    input.tips.push(eye + NVec3::new(0.1, -0.2, -0.3));
    fast.update(0.001, &input);
    slow.update(1.0, &input);

    assert_eq!(fast.simulator().positions(), slow.simulator().positions());
    assert_eq!(fast.star_buffer().len(), 3 * 40);
}

#[test]
fn space_key_resets_sky() {
    let eye = NVec3::new(0.0, 0.0, 0.5);
    let mut layer = SpaceLayer::new(small_simulator(2, 10, eye));
    let input = FrameInput::at_eye(eye, NMat3::identity());
    for _ in 0..5 {
        layer.update(0.01, &input);
    }
    let before = layer.simulator().positions().to_vec();

    assert_eq!(layer.handle_key(&KeyEvent::down(Key::Space)), EventHandlerAction::Consume);
    assert_ne!(layer.simulator().positions(), &before[..]);
    assert_eq!(layer.simulator().num_stars(), 20);
    let g0 = eye + NVec3::new(0.0, -0.5, -1.0);
    assert!((layer.simulator().galaxies()[0].x - g0).norm() < 1e-12);

    assert_eq!(layer.handle_key(&KeyEvent::up(Key::Space)), EventHandlerAction::PassOn);
    assert_eq!(layer.handle_key(&KeyEvent::down(Key::Char('g'))), EventHandlerAction::PassOn);
}

// ==================================================================================
// Flying layer tests
// ==================================================================================

fn rest_offset() -> NVec3 {
    FlyingParameters::default().palm_offset
}

#[test]
fn brightness_and_thickness_clamp() {
    let mut layer = FlyingLayer::new(NVec3::zeros(), FlyingParameters::default());
    assert_eq!(layer.grid_brightness(), 80);
    assert_eq!(layer.line_thickness(), 3.0);

    let g = KeyEvent::down(Key::Char('g'));
    assert_eq!(layer.handle_key(&g), EventHandlerAction::Consume);
    assert_eq!(layer.grid_brightness(), 70);
    for _ in 0..50 {
        layer.handle_key(&g);
    }
    assert_eq!(layer.grid_brightness(), 10);
    for _ in 0..50 {
        layer.handle_key(&g.with_shift());
    }
    assert_eq!(layer.grid_brightness(), 300);

    let l = KeyEvent::down(Key::Char('l'));
    for _ in 0..30 {
        layer.handle_key(&l);
    }
    assert_eq!(layer.line_thickness(), 0.5);
    for _ in 0..30 {
        layer.handle_key(&l.with_shift());
    }
    assert_eq!(layer.line_thickness(), 10.0);

    assert_eq!(layer.handle_key(&KeyEvent::down(Key::Space)), EventHandlerAction::PassOn);
    assert_eq!(layer.handle_key(&KeyEvent::up(Key::Char('g'))), EventHandlerAction::PassOn);
}

#[test]
fn hands_at_rest_keep_grid_still() {
    // eye at the origin so the rest pose cancels exactly
    let eye = NVec3::zeros();
    let mut layer = FlyingLayer::new(eye, FlyingParameters::default());
    let mut input = FrameInput::at_eye(eye, NMat3::identity());
    input.palms.push(eye + rest_offset());

    for _ in 0..10 {
        layer.update(0.011, &input);
    }
    assert_eq!(*layer.velocity(), NVec3::zeros());
    assert_eq!(*layer.rotation_vector(), NVec3::zeros());
    assert_eq!(*layer.grid_center(), eye);
    assert!(!layer.show_popup());
}

#[test]
fn hand_forward_flies_forward() {
    let eye = NVec3::zeros();
    let mut layer = FlyingLayer::new(eye, FlyingParameters::default());
    let mut input = FrameInput::at_eye(eye, NMat3::identity());
    input.palms.push(eye + rest_offset() + NVec3::new(0.0, 0.0, -0.3));

    layer.update(0.01, &input);
    assert!((layer.velocity() - NVec3::new(0.0, 0.0, -0.06)).norm() < 1e-12);
    // grid slides toward the viewer, i.e. the viewer moves forward
    let expected = 0.06 * 0.0036 * (0.01 / 0.0045);
    assert!((layer.grid_center().z - expected).abs() < 1e-12);
    assert_eq!(layer.grid_center().x, 0.0);
    assert_close(layer.grid_orientation(), &NMat3::identity(), 1e-12);
}

#[test]
fn no_hands_decays_motion() {
    let eye = NVec3::zeros();
    let mut layer = FlyingLayer::new(eye, FlyingParameters::default());
    let mut input = FrameInput::at_eye(eye, NMat3::identity());
    input.palms.push(rest_offset() + NVec3::new(0.1, 0.2, -0.3));
    layer.update(0.01, &input);
    let v1 = *layer.velocity();
    let w1 = *layer.rotation_vector();

    input.palms.clear();
    layer.update(0.01, &input);
    assert!((layer.velocity() - 0.94 * v1).norm() < 1e-15);
    assert!((layer.rotation_vector() - 0.94 * w1).norm() < 1e-15);
    assert!(layer.show_popup());
}

#[test]
fn level_hands_do_not_turn() {
    let eye = NVec3::zeros();
    let mut layer = FlyingLayer::new(eye, FlyingParameters::default());
    let mut input = FrameInput::at_eye(eye, NMat3::identity());
    input.palms.push(rest_offset() + NVec3::new(-0.2, 0.0, -0.3));
    input.palms.push(rest_offset() + NVec3::new(0.2, 0.0, -0.3));

    layer.update(0.011, &input);
    assert!(layer.rotation_vector().norm() < 1e-12);
}

#[test]
fn raised_hand_banks_the_grid() {
    let eye = NVec3::new(0.0, 1.6, 0.0);
    let mut layer = FlyingLayer::new(eye, FlyingParameters::default());
    let mut input = FrameInput::at_eye(eye, NMat3::identity());
    input.palms.push(eye + rest_offset() + NVec3::new(-0.25, 0.0, -0.35));
    input.palms.push(eye + rest_offset() + NVec3::new(0.25, 0.15, -0.35));

    for _ in 0..60 {
        layer.update(0.011, &input);
    }
    assert!(layer.rotation_vector().z.abs() > 1e-3);
    let g = layer.grid_orientation();
    assert_close(&(g.transpose() * g), &NMat3::identity(), 1e-9);
    assert_ne!(*g, NMat3::identity());
}

#[test]
fn grid_lines_fade_with_distance() {
    let mut layer = FlyingLayer::new(NVec3::zeros(), FlyingParameters::default());
    let lines = layer.grid_lines();
    assert_eq!(lines.len(), 60 * 6 * 60 * 4);
    assert!(lines.iter().all(|v| (0.0..=1.0).contains(&v.alpha)));

    // nearest vertices are the plane points 10 above and below the eye
    let near = lines.iter().map(|v| v.alpha).fold(0.0_f32, f32::max);
    assert!((near - 80.0 / 120.0).abs() < 1e-6, "near alpha {near}");

    layer.set_alpha(0.5);
    let dimmed = layer.grid_lines();
    assert!(dimmed.iter().all(|v| v.alpha <= 0.5));
}

#[test]
fn grid_model_matrix_rotates_then_translates() {
    let layer = FlyingLayer::new(NVec3::new(1.0, 2.0, 3.0), FlyingParameters::default());
    let m = layer.grid_transform().model_matrix();
    assert_eq!(m[(0, 3)], 1.0);
    assert_eq!(m[(1, 3)], 2.0);
    assert_eq!(m[(2, 3)], 3.0);
    assert_eq!(m[(3, 3)], 1.0);
}

// ==================================================================================
// Scene tests
// ==================================================================================

const SCENE: &str = "
space:
  galaxies: 2
  stars_per: 30
  seed: 5
eye:
  position: [0.0, 0.0, 0.5]
run:
  frames: 20
  dt: 0.011
input:
  tips:
    - center: [0.0, -0.2, 0.2]
      radius: 0.1
      angular_speed: 2.0
  palms:
    - [0.05, -0.1, 0.3]
  key_presses:
    - frame: 5
      key: space
    - frame: 6
      key: g
      shift: true
    - frame: 7
      key: x
";

#[test]
fn scene_runs_from_yaml() {
    let cfg = SceneConfig::from_yaml(SCENE).unwrap();
    let mut scene = Scene::build_scene(cfg).unwrap();
    assert_eq!(scene.space.simulator().num_stars(), 60);
    assert_eq!(scene.frame_input(3).tips.len(), 1);

    let summary = scene.run();
    assert_eq!(summary.frames, 20);
    assert_eq!(summary.consumed_keys, 2);
    assert_eq!(summary.grid_brightness, 90);
    assert!(summary.max_star_distance.is_finite());
    assert!(summary.max_star_distance <= 50.0_f64.sqrt());
}

#[test]
fn scene_build_rejects_unchecked_config() {
    let mut cfg = SceneConfig::from_yaml(SCENE).unwrap();
    cfg.eye.position = vec![0.0, 0.0];
    assert!(Scene::build_scene(cfg).is_err());

    let mut cfg = SceneConfig::from_yaml(SCENE).unwrap();
    cfg.input.tips[0].radius = f64::INFINITY;
    let err = Scene::build_scene(cfg).err().unwrap();
    assert!(err.to_string().contains("radius"));
}
