//! Galaxy layer: a point cloud of stars the user can pull around with their
//! fingertips. Space re-seeds the sky.

use log::debug;
use rand::rngs::StdRng;
use rand::Rng;

use super::interaction::{EventHandlerAction, FrameInput, InteractionLayer, Key, KeyEvent};
use crate::simulation::engine::GalaxySimulator;

pub struct SpaceLayer<R: Rng = StdRng> {
    sim: GalaxySimulator<R>,
    alpha: f64,
    buf: Vec<f32>, // packed star positions, reused every frame
}

impl<R: Rng> SpaceLayer<R> {
    pub fn new(sim: GalaxySimulator<R>) -> Self {
        let buf = Vec::with_capacity(3 * sim.num_stars());
        Self { sim, alpha: 1.0, buf }
    }

    pub fn simulator(&self) -> &GalaxySimulator<R> {
        &self.sim
    }

    pub fn simulator_mut(&mut self) -> &mut GalaxySimulator<R> {
        &mut self.sim
    }

    /// Star positions packed as xyz `f32`, ready for a vertex buffer
    pub fn star_buffer(&mut self) -> &[f32] {
        self.sim.write_positions(&mut self.buf);
        &self.buf
    }
}

impl<R: Rng> InteractionLayer for SpaceLayer<R> {
    fn name(&self) -> &'static str {
        "space"
    }

    /// Frame time is ignored: the sky always advances a fixed number of steps
    fn update(&mut self, _dt: f64, input: &FrameInput) {
        self.sim.set_eye(input.eye_pos, input.eye_view);
        self.sim.set_tips(&input.tips);
        self.sim.update();
    }

    fn handle_key(&mut self, event: &KeyEvent) -> EventHandlerAction {
        if !event.is_down() {
            return EventHandlerAction::PassOn;
        }
        match event.key {
            Key::Space => {
                debug!("space: reset requested");
                self.sim.init_physics();
                EventHandlerAction::Consume
            }
            _ => EventHandlerAction::PassOn,
        }
    }

    fn alpha(&self) -> f64 {
        self.alpha
    }

    fn set_alpha(&mut self, alpha: f64) {
        self.alpha = alpha.clamp(0.0, 1.0);
    }
}
