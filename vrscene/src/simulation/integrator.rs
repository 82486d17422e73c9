//! Fixed-step predictor/corrector integrator for the galaxy simulation
//!
//! Two force evaluations per body per step, no time step: the force law
//! already returns velocity increments tuned for one frame, so wall-clock
//! time never enters here.

use super::forces::{ForceField, Source};
use super::params::GalaxyParameters;
use super::states::{Galaxy, NVec3, StarField};

/// One predictor/corrector update of a single point.
///
/// - tempV = v + kicks(x)                       (predictor)
/// - x'    = x + predictor * tempV
/// - v    += kicks(x')                          (corrector)
/// - x    += blend_p * tempV + blend_c * v
fn step_point(field: &ForceField, kind: usize, x: &mut NVec3, v: &mut NVec3, skip: Option<Source>) {
    let p = field.params;

    let mut temp_v = *v;
    field.accumulate(kind, x, &mut temp_v, skip);

    let temp_x = *x + p.predictor * temp_v;
    field.accumulate(kind, &temp_x, v, skip);

    *x += p.blend_predictor * temp_v + p.blend_corrector * *v;
}

/// Advance every star, then every galaxy, by one step.
///
/// Stars see the galaxy cores as they were at the start of the step. Galaxies
/// are then updated in index order, in place, so later galaxies see earlier
/// ones already moved. A star that strays more than `boundary2` (squared)
/// from the eye is dropped back behind the eye at rest.
///
/// Returns the number of recycled stars.
pub fn predictor_corrector_step(
    stars: &mut StarField,
    galaxies: &mut [Galaxy],
    tips: &[NVec3],
    eye: &NVec3,
    params: &GalaxyParameters,
) -> usize {
    let mut recycled = 0;

    // Stars
    {
        let field = ForceField::new(params, galaxies, tips);
        for (i, (x, v)) in stars.x.iter_mut().zip(stars.v.iter_mut()).enumerate() {
            step_point(&field, i, x, v, None);

            if (*x - eye).norm_squared() > params.boundary2 {
                *x = eye - params.recycle_lead * *v;
                *v = NVec3::zeros();
                recycled += 1;
            }
        }
    }

    // Galaxies, self-interaction excluded
    for i in 0..galaxies.len() {
        let (mut x, mut v) = (galaxies[i].x, galaxies[i].v);
        {
            let field = ForceField::new(params, galaxies, tips);
            step_point(&field, 0, &mut x, &mut v, Some(Source::Galaxy(i)));
        }
        galaxies[i].x = x;
        galaxies[i].v = v;
    }

    recycled
}
