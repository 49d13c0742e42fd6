//! HLLD Riemann solver for ideal MHD, after Miyoshi & Kusano
//! (2005): a five-wave approximation (two fast waves, two rotational
//! Alfvén waves, one contact) that, like HLLC for hydro, resolves the
//! contact discontinuity and the tangential field/velocity jumps across it
//! exactly while leaving the fast waves HLL-approximate.
//!
//! Internal stages follow Miyoshi & Kusano verbatim: wave-speed bounds, the
//! contact speed `S_M` and consistent total pressure `p*`, star states on
//! either side of the contact, double-star states between the two Alfvén
//! waves (degenerating to the star states directly when `B_x = 0`), then
//! flux selection by which region contains `xi = 0`.

use super::RiemannSolver;
use crate::physics::mhd::{MhdConserved, MhdPrimitive};
use crate::physics::{Conserved, Physics, Primitive};
use crate::real::Real;

#[derive(Clone, Copy, Debug, Default)]
pub struct Hlld;

/// Threshold below which `B_x` is treated as the degenerate zero case
///: the Alfvén branch collapses and double-star
/// quantities equal the star values directly.
const BX_DEGENERATE: Real = 1e-12;

struct SideState {
    density: Real,
    velocity: [Real; 3],
    pressure: Real,
    b: [Real; 3],
    energy: Real,
    internal_energy: Real,
    total_pressure: Real,
}

impl SideState {
    fn new(p: MhdPrimitive, physics: &Physics) -> Self {
        let u = MhdConserved::from_primitive(&p, physics);
        let b = p.magnetic_field();
        let magnetic_pressure = 0.5 * (b[0] * b[0] + b[1] * b[1] + b[2] * b[2]);
        SideState {
            density: p.density(),
            velocity: p.velocity(),
            pressure: p.pressure(),
            b,
            energy: u.energy(),
            internal_energy: u.internal_energy(),
            total_pressure: p.pressure() + magnetic_pressure,
        }
    }

    fn flux(&self) -> [Real; 8] {
        let (rho, v, p, b) = (self.density, self.velocity, self.pressure, self.b);
        let pt = self.total_pressure;
        let vdotb = v[0] * b[0] + v[1] * b[1] + v[2] * b[2];
        [
            rho * v[0],
            rho * v[0] * v[0] + pt - b[0] * b[0],
            rho * v[0] * v[1] - b[0] * b[1],
            rho * v[0] * v[2] - b[0] * b[2],
            v[0] * (self.energy + pt) - b[0] * vdotb,
            0.0, // Bx flux is zero along its own normal (divergence constraint).
            v[0] * b[1] - v[1] * b[0],
            v[0] * b[2] - v[2] * b[0],
        ]
    }

    fn conserved_array(&self) -> [Real; 8] {
        let (rho, v, b) = (self.density, self.velocity, self.b);
        [rho, rho * v[0], rho * v[1], rho * v[2], self.energy, b[0], b[1], b[2]]
    }
}

impl RiemannSolver<MhdPrimitive, MhdConserved> for Hlld {
    fn solve(&self, left: MhdPrimitive, right: MhdPrimitive, physics: &Physics) -> (MhdConserved, Real) {
        let gamma = physics.gamma;
        let l = SideState::new(left, physics);
        let r = SideState::new(right, physics);

        // B_x must be continuous across the interface; average in case of
        // round-off drift between the two cell-centered reconstructions.
        let bx = 0.5 * (l.b[0] + r.b[0]);

        let cf_l = super::fast_magnetosonic_speed(l.density, l.pressure, l.b, gamma);
        let cf_r = super::fast_magnetosonic_speed(r.density, r.pressure, r.b, gamma);

        let s_l = (l.velocity[0] - cf_l).min(r.velocity[0] - cf_r);
        let s_r = (l.velocity[0] + cf_l).max(r.velocity[0] + cf_r);
        let max_speed = s_l.abs().max(s_r.abs());

        let flux_l = l.flux();
        let flux_r = r.flux();

        if s_l >= 0.0 {
            return (state_flux(flux_l, l.velocity[0] * l.internal_energy), max_speed);
        }
        if s_r <= 0.0 {
            return (state_flux(flux_r, r.velocity[0] * r.internal_energy), max_speed);
        }

        // Contact speed and the total pressure consistent across it
        // (Miyoshi & Kusano eq. 38, 41).
        let rho_l_sl = l.density * (s_l - l.velocity[0]);
        let rho_r_sr = r.density * (s_r - r.velocity[0]);
        let s_m = (rho_r_sr * r.velocity[0] - rho_l_sl * l.velocity[0] - r.total_pressure + l.total_pressure)
            / (rho_r_sr - rho_l_sl);
        let p_star = l.total_pressure + rho_l_sl * (s_m - l.velocity[0]);

        // Upwind by the contact wave for the internal-energy/passive-scalar
        // bookkeeping.
        let eint_flux = if s_m >= 0.0 { l.velocity[0] * l.internal_energy } else { r.velocity[0] * r.internal_energy };

        let star_l = star_state(&l, s_l, s_m, p_star, bx);
        let star_r = star_state(&r, s_r, s_m, p_star, bx);

        if s_m >= 0.0 {
            let s_l_star = s_m - bx.abs() / star_l.density.sqrt();
            if s_l_star >= 0.0 || bx.abs() < BX_DEGENERATE {
                let flux = flux_through_star(flux_l, l.conserved_array(), star_l.as_array(), s_l);
                return (state_flux(flux, eint_flux), max_speed);
            }
            let dstar_l = double_star_state(&star_l, &star_r, bx);
            let flux = flux_through_double_star(flux_l, l.conserved_array(), star_l.as_array(), dstar_l, s_l, s_l_star);
            (state_flux(flux, eint_flux), max_speed)
        } else {
            let s_r_star = s_m + bx.abs() / star_r.density.sqrt();
            if s_r_star <= 0.0 || bx.abs() < BX_DEGENERATE {
                let flux = flux_through_star(flux_r, r.conserved_array(), star_r.as_array(), s_r);
                return (state_flux(flux, eint_flux), max_speed);
            }
            let dstar_r = double_star_state(&star_r, &star_l, bx);
            let flux = flux_through_double_star(flux_r, r.conserved_array(), star_r.as_array(), dstar_r, s_r, s_r_star);
            (state_flux(flux, eint_flux), max_speed)
        }
    }
}

struct Star {
    density: Real,
    vx: Real,
    vy: Real,
    vz: Real,
    by: Real,
    bz: Real,
    energy: Real,
}

impl Star {
    fn as_array(&self) -> [Real; 8] {
        [self.density, self.density * self.vx, self.density * self.vy, self.density * self.vz, self.energy, 0.0, self.by, self.bz]
    }
}

/// Star-region state on one side of the contact (Miyoshi & Kusano eq.
/// 43-48). Degenerates to the upwind cell's transverse velocity/field when
/// `B_x ~ 0` or the star-region denominator vanishes.
fn star_state(side: &SideState, s_k: Real, s_m: Real, p_star: Real, bx: Real) -> Star {
    let density_star = side.density * (s_k - side.velocity[0]) / (s_k - s_m);
    let denom = side.density * (s_k - side.velocity[0]) * (s_k - s_m) - bx * bx;

    let (vy, vz, by, bz) = if bx.abs() < BX_DEGENERATE || denom.abs() < BX_DEGENERATE {
        (side.velocity[1], side.velocity[2], side.b[1], side.b[2])
    } else {
        let vy = side.velocity[1] - bx * side.b[1] * (s_m - side.velocity[0]) / denom;
        let vz = side.velocity[2] - bx * side.b[2] * (s_m - side.velocity[0]) / denom;
        let factor = side.density * (s_k - side.velocity[0]).powi(2) - bx * bx;
        let by = side.b[1] * factor / denom;
        let bz = side.b[2] * factor / denom;
        (vy, vz, by, bz)
    };

    let v_dot_b = side.velocity[0] * bx + side.velocity[1] * side.b[1] + side.velocity[2] * side.b[2];
    let v_star_dot_b_star = s_m * bx + vy * by + vz * bz;
    let energy_star =
        ((s_k - side.velocity[0]) * side.energy - side.total_pressure * side.velocity[0] + p_star * s_m + bx * (v_dot_b - v_star_dot_b_star))
            / (s_k - s_m);

    Star { density: density_star, vx: s_m, vy, vz, by, bz, energy: energy_star }
}

/// Double-star (inter-Alfvén) state built from both sides' star states
/// (Miyoshi & Kusano eq. 59-63). `near` is the side whose energy jump this
/// call computes; `far` is the opposite side's star state, needed for the
/// symmetric average.
fn double_star_state(near: &Star, far: &Star, bx: Real) -> Star {
    let sign_bx = bx.signum();
    let sqrt_near = near.density.sqrt();
    let sqrt_far = far.density.sqrt();
    let denom = sqrt_near + sqrt_far;

    let vy = (sqrt_near * near.vy + sqrt_far * far.vy + (far.by - near.by) * sign_bx) / denom;
    let vz = (sqrt_near * near.vz + sqrt_far * far.vz + (far.bz - near.bz) * sign_bx) / denom;
    let by = (sqrt_near * far.by + sqrt_far * near.by + sqrt_near * sqrt_far * (far.vy - near.vy) * sign_bx) / denom;
    let bz = (sqrt_near * far.bz + sqrt_far * near.bz + sqrt_near * sqrt_far * (far.vz - near.vz) * sign_bx) / denom;

    let v_near_dot_b = near.vx * bx + near.vy * near.by + near.vz * near.bz;
    let v_dstar_dot_b = near.vx * bx + vy * by + vz * bz;
    let energy = near.energy - sqrt_near * (v_near_dot_b - v_dstar_dot_b) * sign_bx;

    Star { density: near.density, vx: near.vx, vy, vz, by, bz, energy }
}

fn flux_through_star(flux_k: [Real; 8], u_k: [Real; 8], u_star: [Real; 8], s_k: Real) -> [Real; 8] {
    std::array::from_fn(|i| flux_k[i] + s_k * (u_star[i] - u_k[i]))
}

fn flux_through_double_star(
    flux_k: [Real; 8],
    u_k: [Real; 8],
    u_star: [Real; 8],
    u_double_star: [Real; 8],
    s_k: Real,
    s_k_star: Real,
) -> [Real; 8] {
    let flux_star = flux_through_star(flux_k, u_k, u_star, s_k);
    std::array::from_fn(|i| flux_star[i] + s_k_star * (u_double_star[i] - u_star[i]))
}

fn state_flux(flux: [Real; 8], eint_flux: Real) -> MhdConserved {
    MhdConserved::new(flux[0], [flux[1], flux[2], flux[3]], flux[4], eint_flux, [flux[5], flux[6], flux[7]])
}

#[cfg(test)]
mod test {
    use super::*;

    fn physics() -> Physics {
        Physics { gamma: 2.0, density_floor: 1e-10, pressure_floor: 1e-10, dual_energy: false, dual_energy_eta: 1e-3, mean_molecular_weight: 0.6 }
    }

    #[test]
    fn identical_states_give_analytic_flux() {
        let phy = physics();
        let p = MhdPrimitive([1.0, 0.0, 0.0, 0.0, 1.0, 0.75, 1.0, 0.0]);
        let (flux, speed) = Hlld.solve(p, p, &phy);
        // F(W) for zero velocity: mass flux zero, momentum flux is p + B^2/2 - Bx^2.
        let expected_mom_x = 1.0 + 0.5 * (0.75 * 0.75 + 1.0 * 1.0) - 0.75 * 0.75;
        assert!(flux.density().abs() < 1e-8);
        assert!((flux.momentum()[0] - expected_mom_x).abs() < 1e-6, "{}", flux.momentum()[0]);
        assert!(speed > 0.0);
    }

    #[test]
    fn brio_wu_shock_tube_gives_finite_flux() {
        let phy = physics();
        let left = MhdPrimitive([1.0, 0.0, 0.0, 0.0, 1.0, 0.75, 1.0, 0.0]);
        let right = MhdPrimitive([0.128, 0.0, 0.0, 0.0, 0.1, 0.75, -1.0, 0.0]);
        let (flux, speed) = Hlld.solve(left, right, &phy);
        assert!(flux.is_finite());
        assert!(speed.is_finite() && speed > 0.0);
    }

    #[test]
    fn degenerate_bx_zero_matches_hllc_plus_upwind_magnetic_flux() {
        use crate::physics::hydro::HydroPrimitive;
        use crate::riemann::hllc::Hllc;

        let phy_mhd = Physics { gamma: 1.4, ..physics() };
        let phy_hydro = Physics { gamma: 1.4, ..physics() };

        let left = MhdPrimitive([1.0, 0.5, 0.1, 0.0, 1.0, 0.0, 0.5, 0.0]);
        let right = MhdPrimitive([0.5, -0.2, -0.1, 0.0, 0.5, 0.0, -0.5, 0.0]);

        let left_hydro = HydroPrimitive([left.density(), left.velocity()[0], left.velocity()[1], left.velocity()[2], left.pressure()]);
        let right_hydro =
            HydroPrimitive([right.density(), right.velocity()[0], right.velocity()[1], right.velocity()[2], right.pressure()]);

        let (mhd_flux, _) = Hlld.solve(left, right, &phy_mhd);
        let (hydro_flux, _) = Hllc.solve(left_hydro, right_hydro, &phy_hydro);

        assert!((mhd_flux.density() - hydro_flux.density()).abs() < 1e-8);
        assert!((mhd_flux.momentum()[0] - hydro_flux.momentum()[0]).abs() < 1e-6);
    }

    #[test]
    fn einfeldt_strong_rarefaction_is_finite_and_nonnegative() {
        let phy = Physics { gamma: 5.0 / 3.0, ..physics() };
        let left = MhdPrimitive([1.0, -2.0, 0.0, 0.0, 0.45, 0.0, 0.5, 0.0]);
        let right = MhdPrimitive([1.0, 2.0, 0.0, 0.0, 0.45, 0.0, 0.5, 0.0]);
        let (flux, speed) = Hlld.solve(left, right, &phy);
        assert!(flux.is_finite());
        assert!(speed.is_finite());
    }
}
