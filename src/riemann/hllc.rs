//! HLLC Riemann solver for the Euler equations: a three-wave
//! approximate solver (left shock/rarefaction, contact, right
//! shock/rarefaction) that, unlike plain HLL, resolves the contact
//! discontinuity exactly. Wave speed bounds follow Davis/Einfeldt (Toro
//! §10.5).

use super::RiemannSolver;
use crate::physics::hydro::{HydroConserved, HydroPrimitive};
use crate::physics::{Conserved, Physics, Primitive};
use crate::real::Real;

#[derive(Clone, Copy, Debug, Default)]
pub struct Hllc;

impl RiemannSolver<HydroPrimitive, HydroConserved> for Hllc {
    fn solve(&self, left: HydroPrimitive, right: HydroPrimitive, physics: &Physics) -> (HydroConserved, Real) {
        let gamma = physics.gamma;
        let (rho_l, u_l, p_l) = (left.density(), left.velocity()[0], left.pressure());
        let (rho_r, u_r, p_r) = (right.density(), right.velocity()[0], right.pressure());
        let v_t_l = [left.velocity()[1], left.velocity()[2]];
        let v_t_r = [right.velocity()[1], right.velocity()[2]];
        let c_l = (gamma * p_l / rho_l).sqrt();
        let c_r = (gamma * p_r / rho_r).sqrt();

        let u_cons_l = HydroConserved::from_primitive(&left, physics);
        let u_cons_r = HydroConserved::from_primitive(&right, physics);

        // Roe-averaged speed of sound for the Davis/Einfeldt wave-speed
        // bound (Toro eq. 10.59-10.60).
        let sqrt_l = rho_l.sqrt();
        let sqrt_r = rho_r.sqrt();
        let u_hat = (sqrt_l * u_l + sqrt_r * u_r) / (sqrt_l + sqrt_r);
        let h_l = (u_cons_l.energy() + p_l) / rho_l;
        let h_r = (u_cons_r.energy() + p_r) / rho_r;
        let h_hat = (sqrt_l * h_l + sqrt_r * h_r) / (sqrt_l + sqrt_r);
        let c_hat = ((gamma - 1.0) * (h_hat - 0.5 * u_hat * u_hat)).max(0.0).sqrt();

        let s_l = (u_l - c_l).min(u_hat - c_hat);
        let s_r = (u_r + c_r).max(u_hat + c_hat);

        let flux_l = euler_flux_x(rho_l, u_l, v_t_l, p_l, u_cons_l.energy());
        let flux_r = euler_flux_x(rho_r, u_r, v_t_r, p_r, u_cons_r.energy());

        if s_l >= 0.0 {
            let max_speed = s_l.abs().max(s_r.abs());
            return (state_flux(flux_l, u_cons_l.internal_energy() * u_l), max_speed);
        }
        if s_r <= 0.0 {
            let max_speed = s_l.abs().max(s_r.abs());
            return (state_flux(flux_r, u_cons_r.internal_energy() * u_r), max_speed);
        }

        // Contact (star) speed, Toro eq. 10.70/10.58.
        let s_star = (p_r - p_l + rho_l * u_l * (s_l - u_l) - rho_r * u_r * (s_r - u_r)) / (rho_l * (s_l - u_l) - rho_r * (s_r - u_r));

        let max_speed = s_l.abs().max(s_r.abs()).max(s_star.abs());

        if s_star >= 0.0 {
            let u_star = star_state(rho_l, u_l, v_t_l, p_l, u_cons_l.energy(), s_l, s_star);
            let eint_l = u_cons_l.internal_energy();
            let eint_star = eint_l * (s_l - u_l) / (s_l - s_star);
            let flux = map5(flux_l, to_array(&u_cons_l), u_star, |f, u, us| f + s_l * (us - u));
            let eint_flux = u_l * eint_l + s_l * (eint_star - eint_l);
            (state_flux(flux, eint_flux), max_speed)
        } else {
            let u_star = star_state(rho_r, u_r, v_t_r, p_r, u_cons_r.energy(), s_r, s_star);
            let eint_r = u_cons_r.internal_energy();
            let eint_star = eint_r * (s_r - u_r) / (s_r - s_star);
            let flux = map5(flux_r, to_array(&u_cons_r), u_star, |f, u, us| f + s_r * (us - u));
            let eint_flux = u_r * eint_r + s_r * (eint_star - eint_r);
            (state_flux(flux, eint_flux), max_speed)
        }
    }
}

/// `(rho*u, rho*u^2+p, rho*u*v, rho*u*w, u*(E+p))`.
fn euler_flux_x(rho: Real, u: Real, v_t: [Real; 2], p: Real, energy: Real) -> [Real; 5] {
    [rho * u, rho * u * u + p, rho * u * v_t[0], rho * u * v_t[1], u * (energy + p)]
}

/// HLLC star-region conserved state (Toro eq. 10.73), one side at a time.
fn star_state(rho_k: Real, u_k: Real, v_t_k: [Real; 2], p_k: Real, energy_k: Real, s_k: Real, s_star: Real) -> [Real; 5] {
    let factor = rho_k * (s_k - u_k) / (s_k - s_star);
    let density_star = factor;
    let mx_star = factor * s_star;
    let my_star = factor * v_t_k[0];
    let mz_star = factor * v_t_k[1];
    let e_star = factor * (energy_k / rho_k + (s_star - u_k) * (s_star + p_k / (rho_k * (s_k - u_k))));
    [density_star, mx_star, my_star, mz_star, e_star]
}

fn map5(a: [Real; 5], b: [Real; 5], c: [Real; 5], f: impl Fn(Real, Real, Real) -> Real) -> [Real; 5] {
    std::array::from_fn(|i| f(a[i], b[i], c[i]))
}

fn state_flux(flux: [Real; 5], eint_flux: Real) -> HydroConserved {
    HydroConserved::new(flux[0], [flux[1], flux[2], flux[3]], flux[4], eint_flux)
}

fn to_array(u: &HydroConserved) -> [Real; 5] {
    [u.density(), u.momentum()[0], u.momentum()[1], u.momentum()[2], u.energy()]
}

#[cfg(test)]
mod test {
    use super::*;

    fn physics() -> Physics {
        Physics { gamma: 1.4, density_floor: 1e-10, pressure_floor: 1e-10, dual_energy: false, dual_energy_eta: 1e-3, mean_molecular_weight: 0.6 }
    }

    #[test]
    fn identical_states_give_pure_pressure_flux() {
        let phy = physics();
        let p = HydroPrimitive([1.0, 0.0, 0.0, 0.0, 1.0]);
        let (flux, _speed) = Hllc.solve(p, p, &phy);
        assert!(flux.density().abs() < 1e-8);
        assert!((flux.momentum()[0] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn sods_shock_tube_mass_flux_is_positive() {
        let phy = physics();
        let left = HydroPrimitive([1.0, 0.0, 0.0, 0.0, 1.0]);
        let right = HydroPrimitive([0.125, 0.0, 0.0, 0.0, 0.1]);
        let (flux, speed) = Hllc.solve(left, right, &phy);
        assert!(flux.density() > 0.0);
        assert!(flux.is_finite());
        assert!(speed > 0.0);
    }

    #[test]
    fn supersonic_right_moving_flow_gives_left_state_flux() {
        let phy = physics();
        let left = HydroPrimitive([1.0, 5.0, 0.0, 0.0, 1.0]);
        let right = HydroPrimitive([1.0, 5.0, 0.0, 0.0, 1.0]);
        let (flux, _speed) = Hllc.solve(left, right, &phy);
        assert!((flux.density() - 5.0).abs() < 1e-6);
    }
}
