//! Build runnable scenes from configuration
//!
//! Takes a `SceneConfig` (YAML-facing) and produces a `Scene` containing:
//! - the galaxy layer with its seeded simulator
//! - the flying layer with its grid
//! - the scripted host input (eye pose, tips, palms, key presses)
//!
//! `Scene::run` plays the script headless in update-then-read order, the
//! same order a renderer would drive the layers in.

use anyhow::Result;
use log::info;
use nalgebra::Rotation3;

use crate::configuration::config::{to_vec3, SceneConfig};
use crate::layers::flying::{FlyingLayer, FlyingParameters, GridTransform};
use crate::layers::interaction::{EventHandlerAction, FrameInput, InteractionLayer, KeyEvent};
use crate::layers::space::SpaceLayer;
use crate::simulation::engine::GalaxySimulator;
use crate::simulation::params::GalaxyParameters;
use crate::simulation::states::{NMat3, NVec3};

/// Attractor tip circling a fixed center in the horizontal plane
#[derive(Debug, Clone)]
pub struct OrbitingTip {
    pub center: NVec3,
    pub radius: f64,
    pub angular_speed: f64,
}

impl OrbitingTip {
    pub fn position(&self, t: f64) -> NVec3 {
        let offset = Rotation3::from_axis_angle(&NVec3::y_axis(), self.angular_speed * t) * NVec3::new(self.radius, 0.0, 0.0);
        self.center + offset
    }
}

/// What happened over a whole run
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub frames: usize,
    pub recycled: usize, // stars recycled over all frames
    pub consumed_keys: usize,
    pub max_star_distance: f64, // farthest star from the eye after the last frame, NaN if any star is
    pub grid: GridTransform,
    pub line_thickness: f64,
    pub grid_brightness: i32,
}

pub struct Scene {
    pub space: SpaceLayer,
    pub flying: FlyingLayer,
    pub eye_pos: NVec3,
    pub eye_view: NMat3,
    pub tips: Vec<OrbitingTip>,
    pub palms: Vec<NVec3>,
    pub key_presses: Vec<(usize, KeyEvent)>,
    pub frames: usize,
    pub dt: f64,
}

impl Scene {
    /// Validate `cfg` and map it onto runtime layers
    pub fn build_scene(cfg: SceneConfig) -> Result<Self> {
        cfg.validate()?;
        let eye_pos = to_vec3(&cfg.eye.position);
        let eye_view = NMat3::identity();

        let mut params = GalaxyParameters::with_counts(cfg.space.galaxies, cfg.space.stars_per);
        params.substeps = cfg.space.substeps;
        let sim = GalaxySimulator::from_seed(params, eye_pos, eye_view, cfg.space.seed);

        let flying_params = FlyingParameters {
            line_thickness: cfg.flying.line_thickness,
            grid_brightness: cfg.flying.grid_brightness,
            filter: cfg.flying.filter,
            ..FlyingParameters::default()
        };

        let tips = cfg
            .input
            .tips
            .iter()
            .map(|t| OrbitingTip {
                center: to_vec3(&t.center),
                radius: t.radius,
                angular_speed: t.angular_speed,
            })
            .collect();
        let palms = cfg.input.palms.iter().map(|p| to_vec3(p)).collect();
        let key_presses = cfg.input.key_presses.iter().map(|k| (k.frame, k.to_event())).collect();

        info!(
            "scene: {} stars, {} tips, {} palms, {} frames",
            sim.num_stars(),
            cfg.input.tips.len(),
            cfg.input.palms.len(),
            cfg.run.frames
        );

        Ok(Self {
            space: SpaceLayer::new(sim),
            flying: FlyingLayer::new(eye_pos, flying_params),
            eye_pos,
            eye_view,
            tips,
            palms,
            key_presses,
            frames: cfg.run.frames,
            dt: cfg.run.dt,
        })
    }

    /// Host input for `frame`
    pub fn frame_input(&self, frame: usize) -> FrameInput {
        let t = frame as f64 * self.dt;
        FrameInput {
            eye_pos: self.eye_pos,
            eye_view: self.eye_view,
            palms: self.palms.clone(),
            tips: self.tips.iter().map(|tip| tip.position(t)).collect(),
        }
    }

    /// Route one key event through the layers until one consumes it
    pub fn dispatch_key(&mut self, event: &KeyEvent) -> EventHandlerAction {
        let layers: [&mut dyn InteractionLayer; 2] = [&mut self.space, &mut self.flying];
        for layer in layers {
            if layer.handle_key(event) == EventHandlerAction::Consume {
                return EventHandlerAction::Consume;
            }
        }
        EventHandlerAction::PassOn
    }

    /// Play every frame of the script
    pub fn run(&mut self) -> RunSummary {
        let recycled_before = self.space.simulator().recycled_total();
        let mut consumed_keys = 0;

        for frame in 0..self.frames {
            let events: Vec<KeyEvent> = self
                .key_presses
                .iter()
                .filter(|(f, _)| *f == frame)
                .map(|(_, e)| *e)
                .collect();
            for event in &events {
                if self.dispatch_key(event) == EventHandlerAction::Consume {
                    consumed_keys += 1;
                }
            }

            let input = self.frame_input(frame);
            self.space.update(self.dt, &input);
            self.flying.update(self.dt, &input);
        }

        let max_star_distance = self
            .space
            .simulator()
            .positions()
            .iter()
            .map(|x| (x - self.eye_pos).norm())
            // any NaN distance makes the result NaN
            .fold(0.0, |acc: f64, d| if acc.is_nan() || d.is_nan() { f64::NAN } else { acc.max(d) });

        RunSummary {
            frames: self.frames,
            recycled: self.space.simulator().recycled_total() - recycled_before,
            consumed_keys,
            max_star_distance,
            grid: self.flying.grid_transform(),
            line_thickness: self.flying.line_thickness(),
            grid_brightness: self.flying.grid_brightness(),
        }
    }
}
