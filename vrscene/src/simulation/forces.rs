//! Attraction sources for the galaxy simulation
//!
//! Every source adds a velocity increment directly (no separate acceleration
//! buffer, no time step). Two kinds are active:
//! - galaxy cores: softened inverse-square pull along the normalized direction
//! - attractor tips: softened pull along the raw offset, sampled slightly
//!   ahead of the moving point

use super::params::GalaxyParameters;
use super::states::{Galaxy, NVec3};

/// Something that can pull on a point
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    /// Pull toward the viewer. Switched off; contributes nothing.
    Origin,
    Galaxy(usize),
    Tip(usize),
}

/// Read-only view of everything that attracts during one sub-step
pub struct ForceField<'a> {
    pub params: &'a GalaxyParameters,
    pub galaxies: &'a [Galaxy],
    pub tips: &'a [NVec3],
}

impl<'a> ForceField<'a> {
    pub fn new(params: &'a GalaxyParameters, galaxies: &'a [Galaxy], tips: &'a [NVec3]) -> Self {
        Self { params, galaxies, tips }
    }

    /// Active sources in integration order: galaxies, then tips
    pub fn sources(&self) -> impl Iterator<Item = Source> + '_ {
        (0..self.galaxies.len())
            .map(Source::Galaxy)
            .chain((0..self.tips.len()).map(Source::Tip))
    }

    /// Add the pull of `source` on a point at `p` into `v`.
    ///
    /// `kind` detunes the tip lead per star so stars sharing a position
    /// still diverge.
    pub fn update_v(&self, kind: usize, p: &NVec3, v: &mut NVec3, source: Source) {
        match source {
            Source::Origin => {}
            Source::Galaxy(g) => {
                let galaxy = &self.galaxies[g];
                let dr = galaxy.x - p;
                // coincident with the core: direction undefined, no pull
                if let Some(dir) = dr.try_normalize(0.0) {
                    *v += galaxy.m * dir / (self.params.galaxy_eps2 + dr.norm_squared());
                }
            }
            Source::Tip(t) => {
                let lead = self.params.tip_lead + kind as f64 * self.params.tip_lead_step;
                let dr = self.tips[t] - (p + lead * *v);
                *v += self.params.tip_strength * dr / (self.params.tip_eps2 + dr.norm_squared());
            }
        }
    }

    /// Apply every active source to `v`, skipping `skip` (a galaxy never
    /// pulls on itself)
    pub fn accumulate(&self, kind: usize, p: &NVec3, v: &mut NVec3, skip: Option<Source>) {
        for source in self.sources() {
            if Some(source) != skip {
                self.update_v(kind, p, v, source);
            }
        }
    }
}
