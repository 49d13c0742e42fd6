//! Piecewise linear reconstruction: a one-cell-wide slope is
//! estimated at each cell and used to extrapolate to the cell's two faces.
//!
//! `Plmp` limits every primitive component independently (componentwise);
//! `Plmc` limits the `(density, normal_velocity, pressure)` triple in
//! characteristic variables instead, falling back to componentwise minmod
//! for the transverse velocities, magnetic field, and any passive scalars
//! carried alongside — see [`super::characteristic`] and the Open Question
//! decision recorded in DESIGN.md.

use super::{characteristic, Reconstructor};
use crate::fields::{minmod3, plm_gradient, FieldVector};
use crate::physics::Primitive;
use crate::real::Real;

/// Componentwise PLM, generic over any [`FieldVector`].
#[derive(Clone, Copy, Debug)]
pub struct Plmp {
    pub theta: Real,
}

impl<T: FieldVector> Reconstructor<T> for Plmp {
    fn stencil_radius(&self) -> usize {
        1
    }

    fn reconstruct_cell(&self, window: &[T]) -> (T, T) {
        let (a, b, c) = (&window[0], &window[1], &window[2]);
        let slope = plm_gradient(self.theta, a, b, c);
        (b.sub(&slope.scale(0.5)), b.axpy(0.5, &slope))
    }
}

/// Characteristic PLM: density, normal velocity, and
/// pressure are limited in the local 3-wave eigenbasis; every other
/// component (transverse velocity, magnetic field, passive scalars) is
/// limited componentwise, per the Open Question decision in DESIGN.md.
#[derive(Clone, Copy, Debug)]
pub struct Plmc {
    pub theta: Real,
    pub gamma: Real,
}

impl<T: Primitive> Reconstructor<T> for Plmc {
    fn stencil_radius(&self) -> usize {
        1
    }

    fn reconstruct_cell(&self, window: &[T]) -> (T, T) {
        let (a, b, c) = (&window[0], &window[1], &window[2]);

        // Componentwise base slope; characteristic limiting below overwrites
        // the density/normal-velocity/pressure components only.
        let mut slope = plm_gradient(self.theta, a, b, c);

        let rho = b.density();
        let p = b.pressure();
        let sound_speed = (self.gamma * p / rho).sqrt();

        let left = characteristic::project(
            rho,
            sound_speed,
            self.theta * (b.density() - a.density()),
            self.theta * (b.velocity()[0] - a.velocity()[0]),
            self.theta * (b.pressure() - a.pressure()),
        );
        let center = characteristic::project(
            rho,
            sound_speed,
            0.5 * (c.density() - a.density()),
            0.5 * (c.velocity()[0] - a.velocity()[0]),
            0.5 * (c.pressure() - a.pressure()),
        );
        let right = characteristic::project(
            rho,
            sound_speed,
            self.theta * (c.density() - b.density()),
            self.theta * (c.velocity()[0] - b.velocity()[0]),
            self.theta * (c.pressure() - b.pressure()),
        );

        let w_limited = [
            minmod3(left[0], center[0], right[0]),
            minmod3(left[1], center[1], right[1]),
            minmod3(left[2], center[2], right[2]),
        ];
        let (d_rho, d_vn, d_p) = characteristic::unproject(rho, sound_speed, w_limited);

        slope.set(0, d_rho);
        slope.set(1, d_vn);
        slope.set(4, d_p);

        (b.sub(&slope.scale(0.5)), b.axpy(0.5, &slope))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::physics::hydro::HydroPrimitive;

    #[test]
    fn plmc_zero_slope_on_uniform_state() {
        let cell = HydroPrimitive([1.0, 0.1, 0.0, 0.0, 1.0]);
        let window = [cell, cell, cell];
        let (l, r) = Plmc { theta: 1.5, gamma: 1.4 }.reconstruct_cell(&window);
        assert_eq!(l, cell);
        assert_eq!(r, cell);
    }

    #[test]
    fn plmp_and_plmc_agree_on_linear_density_ramp() {
        let a = HydroPrimitive([1.0, 0.0, 0.0, 0.0, 1.0]);
        let b = HydroPrimitive([1.1, 0.0, 0.0, 0.0, 1.0]);
        let c = HydroPrimitive([1.2, 0.0, 0.0, 0.0, 1.0]);
        let window = [a, b, c];
        let (lp, rp) = Plmp { theta: 1.0 }.reconstruct_cell(&window);
        let (lc, rc) = Plmc { theta: 1.0, gamma: 1.4 }.reconstruct_cell(&window);
        assert!((lp.density() - lc.density()).abs() < 1e-10);
        assert!((rp.density() - rc.density()).abs() < 1e-10);
    }
}
