//! The Riemann solver family: given left/right interface
//! primitive states (already rotated so "x" is the face normal, per
//! [`crate::geometry::Direction::permute`]), returns the intercell flux and
//! the fastest wave speed crossing the interface.
//!
//! Generalizes a `Hydrodynamics::intercell_flux` precedent (`(pl, pr, sl,
//! sr, direction) -> (Conserved, f64)`) into its own small trait family, one
//! implementor per named scheme, dispatched once from configuration exactly
//! as [`crate::reconstruction::Reconstructor`] is.

pub mod exact;
pub mod hllc;
pub mod roe;

#[cfg(feature = "mhd")]
pub mod hlld;

use crate::physics::{Conserved, Physics, Primitive};
use crate::real::Real;

/// One member of the Riemann solver family.
pub trait RiemannSolver<P: Primitive, C: Conserved>: Send + Sync {
    /// Intercell flux and the fastest signal speed crossing the interface,
    /// given left/right primitive states already rotated to the interface
    /// normal.
    fn solve(&self, left: P, right: P, physics: &Physics) -> (C, Real);
}

/// Named Riemann solvers, selected from configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiemannScheme {
    Exact,
    Roe,
    Hllc,
    #[cfg(feature = "mhd")]
    Hlld,
}

/// Dispatches a hydro-only interface solve to the named scheme. MHD setups
/// use [`solve_mhd`] instead, since only HLLD carries magnetic fields.
pub fn solve_hydro(
    scheme: RiemannScheme,
    left: crate::physics::hydro::HydroPrimitive,
    right: crate::physics::hydro::HydroPrimitive,
    physics: &Physics,
) -> (crate::physics::hydro::HydroConserved, Real) {
    match scheme {
        RiemannScheme::Exact => exact::Exact.solve(left, right, physics),
        RiemannScheme::Roe => roe::Roe.solve(left, right, physics),
        RiemannScheme::Hllc => hllc::Hllc.solve(left, right, physics),
        #[cfg(feature = "mhd")]
        RiemannScheme::Hlld => panic!("HLLD requires MHD primitive/conserved state"),
    }
}

/// Fast magnetosonic speed along the interface normal,
/// shared by the MHD Riemann solvers and the timestep controller.
#[cfg(feature = "mhd")]
pub fn fast_magnetosonic_speed(density: Real, pressure: Real, b: [Real; 3], gamma: Real) -> Real {
    let b2 = b[0] * b[0] + b[1] * b[1] + b[2] * b[2];
    let c_s2 = gamma * pressure / density;
    let c_a2 = b2 / density;
    let bx2 = b[0] * b[0] / density;
    let sum = c_s2 + c_a2;
    (0.5 * (sum + (sum * sum - 4.0 * c_s2 * bx2).max(0.0).sqrt())).sqrt()
}

#[cfg(feature = "mhd")]
pub fn solve_mhd(
    scheme: RiemannScheme,
    left: crate::physics::mhd::MhdPrimitive,
    right: crate::physics::mhd::MhdPrimitive,
    physics: &Physics,
) -> (crate::physics::mhd::MhdConserved, Real) {
    match scheme {
        RiemannScheme::Hlld => hlld::Hlld.solve(left, right, physics),
        _ => panic!("hydro-only Riemann scheme selected for an MHD run"),
    }
}
