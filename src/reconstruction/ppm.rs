//! Piecewise parabolic reconstruction, after Colella & Woodward
//! (1984): a parabola is fit through each cell using its two neighbors on
//! either side, then constrained so the resulting profile introduces no new
//! extrema.
//!
//! `Ppmp` applies the construction componentwise; `Ppmc` applies it to
//! `(density, normal_velocity, pressure)` in characteristic variables,
//! reusing the same monotonicity test centered at zero amplitude — see
//! [`super::characteristic`] and the Open Question decision in DESIGN.md.

use super::{characteristic, Reconstructor};
use crate::fields::FieldVector;
use crate::physics::Primitive;
use crate::real::Real;

/// Raw (unconstrained) fourth-order face interpolation from a 5-cell
/// stencil `(a, b, c, d, e)` centered on `c`: returns `c`'s lower and upper
/// face values.
fn ppm_face_scalar(a: Real, b: Real, c: Real, d: Real, e: Real) -> (Real, Real) {
    let face_minus = (7.0 * (b + c) - (a + d)) / 12.0;
    let face_plus = (7.0 * (c + d) - (b + e)) / 12.0;
    (face_minus, face_plus)
}

/// Colella & Woodward's monotonicity constraint (their eq. 1.10): flattens
/// to the cell average at local extrema, otherwise steepens whichever face
/// overshoots so the parabola's interior stays between `face_minus` and
/// `face_plus`.
fn ppm_monotonize_scalar(cell: Real, face_minus: Real, face_plus: Real) -> (Real, Real) {
    if (face_plus - cell) * (cell - face_minus) <= 0.0 {
        return (cell, cell);
    }
    let diff = face_plus - face_minus;
    let curve = 6.0 * (cell - 0.5 * (face_minus + face_plus));
    if diff * curve > diff * diff {
        (3.0 * cell - 2.0 * face_plus, face_plus)
    } else if -(diff * diff) > diff * curve {
        (face_minus, 3.0 * cell - 2.0 * face_minus)
    } else {
        (face_minus, face_plus)
    }
}

fn componentwise_faces<T: FieldVector>(window: &[T]) -> (T, T) {
    let (a, b, c, d, e) = (&window[0], &window[1], &window[2], &window[3], &window[4]);
    let mut face_minus = T::zero();
    let mut face_plus = T::zero();
    for i in 0..T::LEN {
        let (raw_minus, raw_plus) = ppm_face_scalar(a.get(i), b.get(i), c.get(i), d.get(i), e.get(i));
        let (m, p) = ppm_monotonize_scalar(c.get(i), raw_minus, raw_plus);
        face_minus.set(i, m);
        face_plus.set(i, p);
    }
    (face_minus, face_plus)
}

/// Componentwise PPM, generic over any [`FieldVector`].
#[derive(Clone, Copy, Debug)]
pub struct Ppmp {
    /// Unused by the plain componentwise limiter; kept so callers can
    /// select between PLM/PPM families uniformly by a single `theta`.
    pub theta: Real,
}

impl<T: FieldVector> Reconstructor<T> for Ppmp {
    fn stencil_radius(&self) -> usize {
        2
    }

    fn reconstruct_cell(&self, window: &[T]) -> (T, T) {
        let _ = self.theta;
        componentwise_faces(window)
    }
}

/// Characteristic PPM. Builds the same raw parabola as
/// [`Ppmp`] for every component, then replaces the density/normal-velocity/
/// pressure faces with ones constrained in the local 3-wave eigenbasis.
#[derive(Clone, Copy, Debug)]
pub struct Ppmc {
    pub theta: Real,
    pub gamma: Real,
}

impl<T: Primitive> Reconstructor<T> for Ppmc {
    fn stencil_radius(&self) -> usize {
        2
    }

    fn reconstruct_cell(&self, window: &[T]) -> (T, T) {
        let _ = self.theta;
        let (mut face_minus, mut face_plus) = componentwise_faces(window);

        let (a, b, c, d, e) = (&window[0], &window[1], &window[2], &window[3], &window[4]);
        let rho = c.density();
        let sound_speed = (self.gamma * c.pressure() / rho).sqrt();

        let (rho_fm, rho_fp) = ppm_face_scalar(a.density(), b.density(), c.density(), d.density(), e.density());
        let (vn_fm, vn_fp) =
            ppm_face_scalar(a.velocity()[0], b.velocity()[0], c.velocity()[0], d.velocity()[0], e.velocity()[0]);
        let (p_fm, p_fp) = ppm_face_scalar(a.pressure(), b.pressure(), c.pressure(), d.pressure(), e.pressure());

        // Deviations of the raw (unconstrained) faces from the cell average,
        // expressed as characteristic amplitudes.
        let w_minus = characteristic::project(rho, sound_speed, c.density() - rho_fm, c.velocity()[0] - vn_fm, c.pressure() - p_fm);
        let w_plus = characteristic::project(rho, sound_speed, rho_fp - c.density(), vn_fp - c.velocity()[0], p_fp - c.pressure());

        let mut wm_limited = [0.0; 3];
        let mut wp_limited = [0.0; 3];
        for k in 0..3 {
            let (m, p) = ppm_monotonize_scalar(0.0, -w_minus[k], w_plus[k]);
            wm_limited[k] = -m;
            wp_limited[k] = p;
        }

        let (dm_rho, dm_vn, dm_p) = characteristic::unproject(rho, sound_speed, wm_limited);
        let (dp_rho, dp_vn, dp_p) = characteristic::unproject(rho, sound_speed, wp_limited);

        face_minus.set(0, c.density() - dm_rho);
        face_minus.set(1, c.velocity()[0] - dm_vn);
        face_minus.set(4, c.pressure() - dm_p);
        face_plus.set(0, c.density() + dp_rho);
        face_plus.set(1, c.velocity()[0] + dp_vn);
        face_plus.set(4, c.pressure() + dp_p);

        (face_minus, face_plus)
    }
}
