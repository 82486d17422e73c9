//! Host-facing contract shared by the scene layers
//!
//! The host (windowing, tracking, renderer) fills a `FrameInput` each frame,
//! forwards key-down events, calls `update`, then reads whatever render
//! state the concrete layer exposes.

use crate::simulation::states::{NMat3, NVec3};

/// Per-frame samples from the tracking host
#[derive(Debug, Clone)]
pub struct FrameInput {
    pub eye_pos: NVec3, // eye position in world space
    pub eye_view: NMat3, // world -> eye rotation
    pub palms: Vec<NVec3>, // tracked hand positions, world space
    pub tips: Vec<NVec3>, // attractor points (finger/controller tips), world space
}

impl Default for FrameInput {
    fn default() -> Self {
        Self {
            eye_pos: NVec3::zeros(),
            eye_view: NMat3::identity(),
            palms: Vec::new(),
            tips: Vec::new(),
        }
    }
}

impl FrameInput {
    pub fn at_eye(eye_pos: NVec3, eye_view: NMat3) -> Self {
        Self {
            eye_pos,
            eye_view,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyEventKind {
    Down,
    Up,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Space,
    Char(char),
    Other,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub shift: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub kind: KeyEventKind,
    pub key: Key,
    pub modifiers: Modifiers,
}

impl KeyEvent {
    pub fn down(key: Key) -> Self {
        Self {
            kind: KeyEventKind::Down,
            key,
            modifiers: Modifiers::default(),
        }
    }

    pub fn up(key: Key) -> Self {
        Self {
            kind: KeyEventKind::Up,
            ..Self::down(key)
        }
    }

    pub fn with_shift(mut self) -> Self {
        self.modifiers.shift = true;
        self
    }

    pub fn is_down(&self) -> bool {
        self.kind == KeyEventKind::Down
    }
}

/// Whether a layer swallowed an event or the host should keep routing it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventHandlerAction {
    Consume,
    PassOn,
}

/// A scene layer driven once per frame, update before render
pub trait InteractionLayer {
    fn name(&self) -> &'static str;

    /// Advance by `dt` seconds of wall-clock time
    fn update(&mut self, dt: f64, input: &FrameInput);

    fn handle_key(&mut self, event: &KeyEvent) -> EventHandlerAction;

    /// Layer opacity in [0, 1], driven by the host for fades
    fn alpha(&self) -> f64;

    fn set_alpha(&mut self, alpha: f64);
}
