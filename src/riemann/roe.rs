//! Roe-averaged linearized Riemann solver for the Euler equations
//!, with the Harten-Hyman entropy fix applied to the two
//! acoustic eigenvalues to avoid expansion shocks through sonic
//! rarefactions.

use super::RiemannSolver;
use crate::physics::hydro::{HydroConserved, HydroPrimitive};
use crate::physics::{Conserved, Physics, Primitive};
use crate::real::Real;

#[derive(Clone, Copy, Debug, Default)]
pub struct Roe;

impl RiemannSolver<HydroPrimitive, HydroConserved> for Roe {
    fn solve(&self, left: HydroPrimitive, right: HydroPrimitive, physics: &Physics) -> (HydroConserved, Real) {
        let gamma = physics.gamma;
        let (rho_l, u_l, p_l) = (left.density(), left.velocity()[0], left.pressure());
        let (rho_r, u_r, p_r) = (right.density(), right.velocity()[0], right.pressure());
        let v_t_l = [left.velocity()[1], left.velocity()[2]];
        let v_t_r = [right.velocity()[1], right.velocity()[2]];

        let u_cons_l = HydroConserved::from_primitive(&left, physics);
        let u_cons_r = HydroConserved::from_primitive(&right, physics);
        let h_l = (u_cons_l.energy() + p_l) / rho_l;
        let h_r = (u_cons_r.energy() + p_r) / rho_r;

        // Roe averages.
        let sqrt_l = rho_l.sqrt();
        let sqrt_r = rho_r.sqrt();
        let denom = sqrt_l + sqrt_r;
        let u_hat = (sqrt_l * u_l + sqrt_r * u_r) / denom;
        let v1_hat = (sqrt_l * v_t_l[0] + sqrt_r * v_t_r[0]) / denom;
        let v2_hat = (sqrt_l * v_t_l[1] + sqrt_r * v_t_r[1]) / denom;
        let h_hat = (sqrt_l * h_l + sqrt_r * h_r) / denom;
        let q2 = u_hat * u_hat + v1_hat * v1_hat + v2_hat * v2_hat;
        let c_hat = ((gamma - 1.0) * (h_hat - 0.5 * q2)).max(0.0).sqrt();

        // Primitive-variable jumps and the corresponding wave strengths
        // (standard Roe decomposition for 3-D Euler, e.g. Toro §11.3 /
        // table 11.2, extended with the two shear waves that carry the
        // transverse velocity jump).
        let d_rho = rho_r - rho_l;
        let d_u = u_r - u_l;
        let d_v1 = v_t_r[0] - v_t_l[0];
        let d_v2 = v_t_r[1] - v_t_l[1];
        let d_p = p_r - p_l;

        let alpha1 = (d_p - rho_hat(rho_l, rho_r) * c_hat * d_u) / (2.0 * c_hat * c_hat);
        let alpha2 = d_rho - d_p / (c_hat * c_hat);
        let alpha3 = rho_hat(rho_l, rho_r) * d_v1;
        let alpha4 = rho_hat(rho_l, rho_r) * d_v2;
        let alpha5 = (d_p + rho_hat(rho_l, rho_r) * c_hat * d_u) / (2.0 * c_hat * c_hat);

        let lambda1 = u_hat - c_hat;
        let lambda_mid = u_hat;
        let lambda5 = u_hat + c_hat;

        // Harten-Hyman entropy fix on the two acoustic waves: each |lambda|
        // used in the flux below is replaced by a quadratically smoothed
        // magnitude whenever that wave is a transonic rarefaction.
        let c_l = (gamma * p_l / rho_l).sqrt();
        let c_r = (gamma * p_r / rho_r).sqrt();
        let abs_lambda1 = entropy_fix(lambda1, u_l - c_l, u_r - c_r);
        let abs_lambda5 = entropy_fix(lambda5, u_l + c_l, u_r + c_r);
        let abs_lambda_mid = lambda_mid.abs();

        // Right eigenvectors: left acoustic, entropy, two shear waves,
        // right acoustic.
        let r1 = [1.0, u_hat - c_hat, v1_hat, v2_hat, h_hat - u_hat * c_hat];
        let r2 = [1.0, u_hat, v1_hat, v2_hat, 0.5 * q2];
        let r3 = [0.0, 0.0, 1.0, 0.0, v1_hat];
        let r4 = [0.0, 0.0, 0.0, 1.0, v2_hat];
        let r5 = [1.0, u_hat + c_hat, v1_hat, v2_hat, h_hat + u_hat * c_hat];

        let flux_l = euler_flux_x(rho_l, u_l, v_t_l, p_l, u_cons_l.energy());
        let flux_r = euler_flux_x(rho_r, u_r, v_t_r, p_r, u_cons_r.energy());

        let mut flux = [0.0; 5];
        for k in 0..5 {
            flux[k] = 0.5 * (flux_l[k] + flux_r[k])
                - 0.5
                    * (abs_lambda1 * alpha1 * r1[k]
                        + abs_lambda_mid * alpha2 * r2[k]
                        + abs_lambda_mid * alpha3 * r3[k]
                        + abs_lambda_mid * alpha4 * r4[k]
                        + abs_lambda5 * alpha5 * r5[k]);
        }

        // Internal energy is advected passively with the upwind state's
        // specific internal energy.
        let upwind_eint = if u_hat >= 0.0 { u_cons_l.internal_energy() / rho_l } else { u_cons_r.internal_energy() / rho_r };
        let eint_flux = flux[0] * upwind_eint;

        let conserved = HydroConserved::new(flux[0], [flux[1], flux[2], flux[3]], flux[4], eint_flux);
        let max_speed = (u_l.abs() + c_l).max(u_r.abs() + c_r).max(abs_lambda1).max(abs_lambda5);
        (conserved, max_speed)
    }
}

/// Roe-averaged density, `sqrt(rho_l * rho_r)`.
fn rho_hat(rho_l: Real, rho_r: Real) -> Real {
    (rho_l * rho_r).sqrt()
}

/// Harten's entropy fix: returns the magnitude to use for this wave's
/// contribution to the flux, smoothing `|lambda_roe|` near zero whenever
/// the wave is a transonic rarefaction (`lambda_l < 0 < lambda_r`).
fn entropy_fix(lambda_roe: Real, lambda_l: Real, lambda_r: Real) -> Real {
    if lambda_l < 0.0 && lambda_r > 0.0 {
        let delta = (lambda_roe - lambda_l).max(lambda_r - lambda_roe).max(1e-12);
        (lambda_roe * lambda_roe + delta * delta) / (2.0 * delta)
    } else {
        lambda_roe.abs()
    }
}

fn euler_flux_x(rho: Real, u: Real, v_t: [Real; 2], p: Real, energy: Real) -> [Real; 5] {
    [rho * u, rho * u * u + p, rho * u * v_t[0], rho * u * v_t[1], u * (energy + p)]
}
