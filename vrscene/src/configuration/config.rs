//! Configuration types for loading scene runs from YAML.
//!
//! A scene file describes both layers plus the scripted input used to drive
//! them headless:
//!
//! - [`SpaceConfig`]  – galaxy layout and random seed
//! - [`FlyingConfig`] – initial grid appearance and steering filter
//! - [`EyeConfig`]    – fixed eye position
//! - [`RunConfig`]    – frame count and frame time
//! - [`InputConfig`]  – orbiting tips, fixed palms and timed key presses
//! - [`SceneConfig`]  – top-level wrapper
//!
//! # YAML format
//!
//! ```yaml
//! space:
//!   galaxies: 3
//!   stars_per: 2000
//!   seed: 42
//!
//! flying:
//!   line_thickness: 3.0
//!   grid_brightness: 80
//!
//! eye:
//!   position: [0.0, 0.0, 0.5]
//!
//! run:
//!   frames: 300
//!   dt: 0.011
//!
//! input:
//!   tips:
//!     - center: [0.0, -0.2, -0.3]
//!       radius: 0.15
//!       angular_speed: 2.0
//!   palms:
//!     - [0.1, -0.1, 0.2]
//!   key_presses:
//!     - frame: 150
//!       key: "space"
//! ```
//!
//! Everything except `space` has defaults. [`SceneConfig::validate`] runs on
//! load and again when a scene is built.

use anyhow::{ensure, Result};
use serde::Deserialize;

use crate::layers::interaction::{Key, KeyEvent};
use crate::simulation::states::NVec3;

/// Galaxy layer setup
#[derive(Deserialize, Debug, Clone)]
pub struct SpaceConfig {
    pub galaxies: usize, // number of galaxies
    pub stars_per: usize, // stars in each galaxy
    pub seed: u64, // seed for the sampling rng, same seed -> same sky
    #[serde(default = "default_substeps")]
    pub substeps: usize, // physics steps per frame
}

fn default_substeps() -> usize {
    2
}

/// Flying layer setup
#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct FlyingConfig {
    pub line_thickness: f64, // initial line width, within [0.5, 10]
    pub grid_brightness: i32, // initial brightness, within [10, 300]
    pub filter: f64, // weight of each new hand sample, within (0, 1]
}

impl Default for FlyingConfig {
    fn default() -> Self {
        Self {
            line_thickness: 3.0,
            grid_brightness: 80,
            filter: 0.2,
        }
    }
}

/// Eye pose for the whole run (view is identity)
#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct EyeConfig {
    pub position: Vec<f64>, // [x, y, z]
}

impl Default for EyeConfig {
    fn default() -> Self {
        Self {
            position: vec![0.0, 0.0, 0.0],
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct RunConfig {
    pub frames: usize, // frames to simulate
    pub dt: f64, // seconds per frame
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            frames: 120,
            dt: 1.0 / 90.0,
        }
    }
}

/// An attractor tip circling `center` in the horizontal plane
#[derive(Deserialize, Debug, Clone)]
pub struct TipConfig {
    pub center: Vec<f64>, // [x, y, z]
    pub radius: f64, // orbit radius
    pub angular_speed: f64, // radians per second
}

/// A key pressed at the start of `frame`
#[derive(Deserialize, Debug, Clone)]
pub struct KeyPressConfig {
    pub frame: usize,
    pub key: String, // "space" or a single character
    #[serde(default)]
    pub shift: bool,
}

impl KeyPressConfig {
    pub fn to_event(&self) -> KeyEvent {
        let key = match self.key.as_str() {
            "space" | " " => Key::Space,
            s => {
                let mut chars = s.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Key::Char(c),
                    _ => Key::Other,
                }
            }
        };
        let event = KeyEvent::down(key);
        if self.shift {
            event.with_shift()
        } else {
            event
        }
    }
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct InputConfig {
    pub tips: Vec<TipConfig>,
    pub palms: Vec<Vec<f64>>, // each [x, y, z]
    pub key_presses: Vec<KeyPressConfig>,
}

/// Top-level scene configuration loaded from YAML.
#[derive(Deserialize, Debug, Clone)]
pub struct SceneConfig {
    pub space: SpaceConfig,
    #[serde(default)]
    pub flying: FlyingConfig,
    #[serde(default)]
    pub eye: EyeConfig,
    #[serde(default)]
    pub run: RunConfig,
    #[serde(default)]
    pub input: InputConfig,
}

/// `[x, y, z]` list as a vector; callers validate the length first
pub fn to_vec3(v: &[f64]) -> NVec3 {
    NVec3::new(v[0], v[1], v[2])
}

fn ensure_vec3(v: &[f64], what: &str) -> Result<()> {
    ensure!(v.len() == 3, "{what} must have 3 components, got {}", v.len());
    ensure!(v.iter().all(|c| c.is_finite()), "{what} must be finite, got {v:?}");
    Ok(())
}

impl SceneConfig {
    pub fn from_yaml(text: &str) -> Result<Self> {
        let cfg: SceneConfig = serde_yaml::from_str(text)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Reject values the layers cannot run with
    pub fn validate(&self) -> Result<()> {
        ensure!(self.space.stars_per > 0, "space.stars_per must be at least 1");
        ensure!(self.space.substeps > 0, "space.substeps must be at least 1");

        let f = &self.flying;
        ensure!(
            (0.5..=10.0).contains(&f.line_thickness),
            "flying.line_thickness must be within [0.5, 10], got {}",
            f.line_thickness
        );
        ensure!(
            (10..=300).contains(&f.grid_brightness),
            "flying.grid_brightness must be within [10, 300], got {}",
            f.grid_brightness
        );
        ensure!(f.filter > 0.0 && f.filter <= 1.0, "flying.filter must be within (0, 1], got {}", f.filter);

        ensure_vec3(&self.eye.position, "eye.position")?;
        ensure!(self.run.dt > 0.0 && self.run.dt.is_finite(), "run.dt must be positive, got {}", self.run.dt);

        for (i, tip) in self.input.tips.iter().enumerate() {
            ensure_vec3(&tip.center, &format!("input.tips[{i}].center"))?;
            ensure!(
                tip.radius.is_finite() && tip.radius >= 0.0,
                "input.tips[{i}].radius must be finite and not negative, got {}",
                tip.radius
            );
            ensure!(
                tip.angular_speed.is_finite(),
                "input.tips[{i}].angular_speed must be finite, got {}",
                tip.angular_speed
            );
        }
        for (i, palm) in self.input.palms.iter().enumerate() {
            ensure_vec3(palm, &format!("input.palms[{i}]"))?;
        }
        for (i, press) in self.input.key_presses.iter().enumerate() {
            ensure!(!press.key.is_empty(), "input.key_presses[{i}].key is empty");
        }
        Ok(())
    }
}
