//! Flying layer: an endless line grid the user steers through with their
//! hands.
//!
//! Hand offsets from a rest pose in front of the chest become a filtered
//! velocity; the direction the hands point (and, with two hands, the roll of
//! the line between them) becomes a filtered rotation vector. Each frame the
//! grid is translated and rotated against that motion so the viewer appears
//! to fly.

use log::{debug, trace};

use super::interaction::{EventHandlerAction, FrameInput, InteractionLayer, Key, KeyEvent};
use crate::rotation::so3::{rotation_matrix_to_vector, rotation_matrix_vector_to_vector, rotation_vector_to_matrix};
use crate::simulation::states::{NMat3, NMat4, NVec3};

const BRIGHTNESS_MIN: i32 = 10;
const BRIGHTNESS_MAX: i32 = 300;
const BRIGHTNESS_STEP: i32 = 10;
const THICKNESS_MIN: f64 = 0.5;
const THICKNESS_MAX: f64 = 10.0;
const THICKNESS_STEP: f64 = 0.5;

/// Steering and appearance tuning
#[derive(Debug, Clone)]
pub struct FlyingParameters {
    pub period_trans: f64, // seconds per unit of translation gain
    pub period_rot: f64, // seconds per unit of rotation gain
    pub filter: f64, // weight of the newest sample in the running averages
    pub idle_decay: f64, // fraction of `filter` used to bleed off motion with no hands
    pub palm_offset: NVec3, // eye-space rest position of the hands
    pub max_velocity_sq: f64,
    pub max_rotation_sq: f64,
    pub line_thickness: f64, // initial line width
    pub grid_brightness: i32, // initial brightness
}

impl Default for FlyingParameters {
    fn default() -> Self {
        Self {
            period_trans: 0.0045,
            period_rot: 1.0,
            filter: 0.2,
            idle_decay: 0.3,
            palm_offset: NVec3::new(0.0, -0.15, -0.05),
            max_velocity_sq: 0.2,
            max_rotation_sq: 1.0,
            line_thickness: 3.0,
            grid_brightness: 80,
        }
    }
}

/// Placement of the grid in world space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridTransform {
    pub rotation: NMat3,
    pub translation: NVec3,
}

impl GridTransform {
    /// Rotate, then translate in the rotated frame
    pub fn model_matrix(&self) -> NMat4 {
        self.rotation.to_homogeneous() * NMat4::new_translation(&self.translation)
    }
}

/// One end of a grid line. Consecutive pairs form a segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridVertex {
    pub position: [f32; 3],
    pub alpha: f32,
}

pub struct FlyingLayer {
    params: FlyingParameters,
    grid_center: NVec3,
    velocity: NVec3, // filtered hand offset
    rotation_aa: NVec3, // filtered rotation vector
    grid_orientation: NMat3, // accumulated rotation
    line_thickness: f64,
    grid_brightness: i32,
    alpha: f64,
    eye_pos: NVec3,
    eye_view: NMat3,
    palms_seen: usize,
}

impl FlyingLayer {
    pub fn new(initial_eye_pos: NVec3, params: FlyingParameters) -> Self {
        Self {
            line_thickness: params.line_thickness,
            grid_brightness: params.grid_brightness,
            params,
            grid_center: initial_eye_pos,
            velocity: NVec3::zeros(),
            rotation_aa: NVec3::zeros(),
            grid_orientation: NMat3::identity(),
            alpha: 1.0,
            eye_pos: initial_eye_pos,
            eye_view: NMat3::identity(),
            palms_seen: 0,
        }
    }

    /// Fold this frame's hand samples into the running averages
    fn filter_palms(&mut self, input: &FrameInput) {
        let p = &self.params;
        let eye = input.eye_pos;
        let view = input.eye_view;
        let palms = &input.palms;

        if palms.is_empty() {
            let decay = 1.0 - p.idle_decay * p.filter;
            self.velocity *= decay;
            self.rotation_aa *= decay;
            return;
        }

        // hand direction in eye space, relative to the rest pose
        let eye_dir = |palm: &NVec3| view * (palm - eye) - p.palm_offset;

        let mut position_sum = NVec3::zeros();
        let mut rotation_sum = NVec3::zeros();
        for palm in palms {
            position_sum += self.grid_orientation.transpose() * (palm - eye - view.transpose() * p.palm_offset);
            let rot = rotation_matrix_vector_to_vector(&-NVec3::z(), &eye_dir(palm));
            rotation_sum += rotation_matrix_to_vector(&rot);
        }
        if let [first, second] = palms.as_slice() {
            // roll from the line joining the hands, whichever hand is on the left
            let dir0 = eye_dir(first);
            let dir1 = eye_dir(second);
            let side = if dir0.x < dir1.x { 1.0 } else { -1.0 };
            let rot = rotation_matrix_vector_to_vector(&(side * NVec3::x()), &(dir1 - dir0));
            rotation_sum += 2.0 * rotation_matrix_to_vector(&rot);
        }

        let n = palms.len() as f64;
        self.velocity = (1.0 - p.filter) * self.velocity + p.filter * position_sum / n;
        self.rotation_aa = (1.0 - p.filter) * self.rotation_aa + p.filter * rotation_sum / n;
    }

    pub fn grid_transform(&self) -> GridTransform {
        GridTransform {
            rotation: self.grid_orientation,
            translation: self.grid_center,
        }
    }

    pub fn grid_center(&self) -> &NVec3 {
        &self.grid_center
    }

    pub fn grid_orientation(&self) -> &NMat3 {
        &self.grid_orientation
    }

    pub fn velocity(&self) -> &NVec3 {
        &self.velocity
    }

    pub fn rotation_vector(&self) -> &NVec3 {
        &self.rotation_aa
    }

    pub fn line_thickness(&self) -> f64 {
        self.line_thickness
    }

    pub fn grid_brightness(&self) -> i32 {
        self.grid_brightness
    }

    /// The instruction popup shows while no hands are tracked
    pub fn show_popup(&self) -> bool {
        self.palms_seen == 0
    }

    /// Line list for the grid in grid-local coordinates.
    ///
    /// Lines run along x and z with spacing 2 on horizontal planes 20 apart.
    /// The block is re-centred on the eye in whole cells so it never runs
    /// out, and each vertex fades with its squared distance from the eye.
    pub fn grid_lines(&self) -> Vec<GridVertex> {
        let c = self.eye_pos - self.grid_center;
        let x_shift = 2 * ((0.5 * c.x + 0.5) as i32);
        let y_shift = 20 * ((0.05 * c.y + 0.5) as i32);
        let z_shift = 2 * ((0.5 * c.z + 0.5) as i32);

        let brightness = f64::from(self.grid_brightness);
        let vertex = |i: i32, j: i32, k: i32| {
            let a = NVec3::new(f64::from(i), f64::from(j), f64::from(k));
            let fade = (brightness / (20.0 + (a - c).norm_squared())).min(1.0);
            GridVertex {
                position: [a.x as f32, a.y as f32, a.z as f32],
                alpha: (self.alpha * fade) as f32,
            }
        };

        let mut lines = Vec::new();
        for i in (-60 + x_shift..60 + x_shift).step_by(2) {
            for j in (-50 + y_shift..70 + y_shift).step_by(20) {
                for k in (-60 + z_shift..60 + z_shift).step_by(2) {
                    let a = vertex(i, j, k);
                    lines.extend_from_slice(&[a, vertex(i + 2, j, k), a, vertex(i, j, k + 2)]);
                }
            }
        }
        lines
    }
}

impl InteractionLayer for FlyingLayer {
    fn name(&self) -> &'static str {
        "flying"
    }

    fn update(&mut self, dt: f64, input: &FrameInput) {
        self.eye_pos = input.eye_pos;
        self.eye_view = input.eye_view;
        self.palms_seen = input.palms.len();
        self.filter_palms(input);

        let p = &self.params;
        let speed = p.max_velocity_sq.min(self.velocity.norm_squared());
        self.grid_center -= self.velocity * speed * (dt / p.period_trans);

        let turn = p.max_rotation_sq.min(self.rotation_aa.norm_squared());
        let rot = rotation_vector_to_matrix(&((dt / p.period_rot) * self.rotation_aa * turn));
        // rotation is expressed in eye space; conjugate it into world space
        self.grid_orientation = self.eye_view.transpose() * rot.transpose() * self.eye_view * self.grid_orientation;

        trace!(
            "flying: palms={} |v|={:.4} |w|={:.4}",
            self.palms_seen,
            self.velocity.norm(),
            self.rotation_aa.norm()
        );
    }

    fn handle_key(&mut self, event: &KeyEvent) -> EventHandlerAction {
        if !event.is_down() {
            return EventHandlerAction::PassOn;
        }
        let raise = event.modifiers.shift;
        match event.key {
            Key::Char('g') => {
                self.grid_brightness = if raise {
                    (self.grid_brightness + BRIGHTNESS_STEP).min(BRIGHTNESS_MAX)
                } else {
                    (self.grid_brightness - BRIGHTNESS_STEP).max(BRIGHTNESS_MIN)
                };
                debug!("flying: grid brightness {}", self.grid_brightness);
                EventHandlerAction::Consume
            }
            Key::Char('l') => {
                self.line_thickness = if raise {
                    (self.line_thickness + THICKNESS_STEP).min(THICKNESS_MAX)
                } else {
                    (self.line_thickness - THICKNESS_STEP).max(THICKNESS_MIN)
                };
                debug!("flying: line thickness {}", self.line_thickness);
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
