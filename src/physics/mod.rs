//! Cell-state conversions: the `Conserved`/`Primitive` traits
//! common to both physics systems, and the `Physics` configuration bundle
//! (adiabatic index, floors, dual-energy threshold) that every conversion
//! needs.
//!
//! Generalizes a `traits::{Conserved, Primitive}` pair (mass/momentum
//! accessors only, tailored to its 2-D SRHD/Euler pair) to the richer
//! 3-D hydro/MHD pair this crate implements in [`hydro`] and [`mhd`].

pub mod hydro;
pub mod mhd;

pub use hydro::{HydroConserved, HydroPrimitive};
pub use mhd::{MhdConserved, MhdPrimitive};

use crate::error::NumericalError;
use crate::fields::FieldVector;
use crate::geometry::Direction;
use crate::real::Real;

/// Conserved-variable accessors common to both physics systems.
pub trait Conserved: FieldVector {
    fn density(&self) -> Real;
    fn momentum(&self) -> [Real; 3];
    fn energy(&self) -> Real;
    fn internal_energy(&self) -> Real;
    fn set_internal_energy(&mut self, e: Real);
    /// `[0, 0, 0]` for pure hydro.
    fn magnetic_field(&self) -> [Real; 3];

    fn kinetic_energy(&self) -> Real {
        let p = self.momentum();
        0.5 * (p[0] * p[0] + p[1] * p[1] + p[2] * p[2]) / self.density()
    }

    fn magnetic_energy(&self) -> Real {
        let b = self.magnetic_field();
        0.5 * (b[0] * b[0] + b[1] * b[1] + b[2] * b[2])
    }

    fn is_finite(&self) -> bool {
        (0..Self::LEN).all(|i| self.get(i).is_finite())
    }
}

/// Primitive-variable accessors common to both physics systems.
pub trait Primitive: FieldVector {
    fn density(&self) -> Real;
    fn velocity(&self) -> [Real; 3];
    fn pressure(&self) -> Real;
    /// `[0, 0, 0]` for pure hydro.
    fn magnetic_field(&self) -> [Real; 3];

    fn is_physical(&self) -> bool {
        self.density() > 0.0 && self.pressure() > 0.0
    }
}

/// Equation-of-state and floor configuration shared by every cell-state
/// conversion. Analogous to a pair of `NewtonianHydro`/`RelativisticHydro`
/// structs, which bundle
/// `gamma_law_index`, `plm_theta`, and `cfl_number` as one config value
/// threaded through every conversion.
#[derive(Clone, Copy, Debug, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Physics {
    /// Ratio of specific heats.
    pub gamma: Real,

    /// Minimum allowed density.
    pub density_floor: Real,

    /// Minimum allowed pressure.
    pub pressure_floor: Real,

    /// Whether the dual-energy formalism is active.
    pub dual_energy: bool,

    /// η₁: total-energy/internal-energy switch threshold.
    pub dual_energy_eta: Real,

    /// Mean molecular weight, for translating `temperature_floor` into an
    /// internal-energy floor.
    pub mean_molecular_weight: Real,
}

/// Boltzmann constant, erg/K.
pub const BOLTZMANN_CONSTANT: Real = 1.380649e-16;
/// Atomic mass unit, g.
pub const ATOMIC_MASS_UNIT: Real = 1.66053906660e-24;

impl Physics {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.gamma <= 1.0 {
            anyhow::bail!("gamma must be > 1.0")
        }
        if self.density_floor <= 0.0 {
            anyhow::bail!("density_floor must be > 0.0")
        }
        if self.pressure_floor <= 0.0 {
            anyhow::bail!("pressure_floor must be > 0.0")
        }
        if self.dual_energy_eta <= 0.0 || self.dual_energy_eta >= 1.0 {
            anyhow::bail!("dual_energy_eta must be in (0, 1)")
        }
        if self.mean_molecular_weight <= 0.0 {
            anyhow::bail!("mean_molecular_weight must be > 0.0")
        }
        Ok(())
    }

    /// The internal-energy-per-volume floor corresponding to
    /// `temperature_floor`, at the given mass density.
    pub fn internal_energy_floor(&self, density: Real, temperature_floor: Real) -> Real {
        density * BOLTZMANN_CONSTANT * temperature_floor
            / (self.mean_molecular_weight * ATOMIC_MASS_UNIT * (self.gamma - 1.0))
    }
}

/// Check a conserved state for non-finite components, the crate's one
/// "fatal" numerical condition: recovery (floors, dual-energy
/// fallback) must have already been attempted by the caller.
pub fn check_finite<C: Conserved>(u: &C, component: &'static str, indices: [usize; 3]) -> Result<(), NumericalError> {
    if !u.is_finite() {
        let field = (0..C::LEN).find(|&i| !u.get(i).is_finite()).unwrap_or(0);
        return Err(NumericalError::NonFinite {
            component,
            indices,
            field: FIELD_NAMES.get(field).copied().unwrap_or("?"),
            value: u.get(field),
        });
    }
    Ok(())
}

const FIELD_NAMES: [&str; 9] =
    ["density", "momentum_x", "momentum_y", "momentum_z", "energy", "internal_energy", "bx", "by", "bz"];

/// Binds a `Conserved`/`Primitive` pair together with the conversions and
/// Riemann dispatch that only make sense in pairs, so that [`crate::mesh`],
/// [`crate::integrator`], [`crate::boundary`], and [`crate::gravity`] can be
/// written once, generically, instead of once per physics system.
///
/// Generalizes a `Hydrodynamics` trait (the seam an
/// `scheme::advance` free function dispatches physics through) to cover
/// both the hydro and MHD field sets this crate implements.
pub trait PhysicsSystem: Send + Sync + 'static {
    type Conserved: Conserved;
    type Primitive: Primitive;

    const NAME: &'static str;

    fn to_primitive(u: &Self::Conserved, physics: &Physics) -> Self::Primitive;
    fn from_primitive(p: &Self::Primitive, physics: &Physics) -> Self::Conserved;
    fn enforce_floors(u: &mut Self::Conserved, physics: &Physics, temperature_floor: Real);

    fn solve_riemann(
        scheme: crate::riemann::RiemannScheme,
        left: Self::Primitive,
        right: Self::Primitive,
        physics: &Physics,
    ) -> (Self::Conserved, Real);

    /// Flip the sign of every field component normal to `axis` (the
    /// reflective boundary rule: flip normal velocity and normal B).
    fn reflect(u: &mut Self::Conserved, axis: usize);

    /// The fastest signal speed supported by this primitive state,
    /// direction-independent: the sound speed for hydro, the
    /// fast magnetosonic speed for MHD. The timestep controller combines
    /// this with the cell's velocity components per axis.
    fn signal_speed(p: &Self::Primitive, physics: &Physics) -> Real;

    /// Rotate a primitive state's velocity (and, for MHD, magnetic field)
    /// into the local frame where `direction` is the interface normal
    ///, so every Riemann solver only ever handles an "x" face.
    fn permute_primitive(p: Self::Primitive, direction: Direction) -> Self::Primitive;

    /// Inverse of [`PhysicsSystem::permute_primitive`], applied to the
    /// intercell flux a Riemann solve returns.
    fn unpermute_flux(flux: Self::Conserved, direction: Direction) -> Self::Conserved;
}

/// Marker type selecting the pure-hydrodynamic field set.
#[derive(Clone, Copy, Debug, Default)]
pub struct Hydro;

impl PhysicsSystem for Hydro {
    type Conserved = hydro::HydroConserved;
    type Primitive = hydro::HydroPrimitive;
    const NAME: &'static str = "hydro";

    fn to_primitive(u: &Self::Conserved, physics: &Physics) -> Self::Primitive {
        u.to_primitive(physics)
    }
    fn from_primitive(p: &Self::Primitive, physics: &Physics) -> Self::Conserved {
        hydro::HydroConserved::from_primitive(p, physics)
    }
    fn enforce_floors(u: &mut Self::Conserved, physics: &Physics, temperature_floor: Real) {
        u.enforce_floors(physics, temperature_floor)
    }
    fn solve_riemann(
        scheme: crate::riemann::RiemannScheme,
        left: Self::Primitive,
        right: Self::Primitive,
        physics: &Physics,
    ) -> (Self::Conserved, Real) {
        crate::riemann::solve_hydro(scheme, left, right, physics)
    }
    fn reflect(u: &mut Self::Conserved, axis: usize) {
        use crate::fields::FieldVector;
        let i = 1 + axis;
        u.set(i, -u.get(i));
    }
    fn signal_speed(p: &Self::Primitive, physics: &Physics) -> Real {
        let c2_floor = physics.gamma * physics.pressure_floor / p.density();
        (physics.gamma * p.pressure() / p.density()).max(c2_floor).sqrt()
    }

    /// Rotate a primitive state's velocity (and, for MHD, magnetic field)
    /// into the local frame where `direction` is the interface normal
    ///, so every Riemann solver only ever handles an "x" face.
    fn permute_primitive(p: Self::Primitive, direction: Direction) -> Self::Primitive {
        let mut out = p;
        let v = direction.permute([p.get(1), p.get(2), p.get(3)]);
        out.set(1, v[0]);
        out.set(2, v[1]);
        out.set(3, v[2]);
        out
    }

    /// Inverse of [`PhysicsSystem::permute_primitive`], applied to the
    /// intercell flux a Riemann solve returns.
    fn unpermute_flux(flux: Self::Conserved, direction: Direction) -> Self::Conserved {
        let mut out = flux;
        let m = direction.unpermute([flux.get(1), flux.get(2), flux.get(3)]);
        out.set(1, m[0]);
        out.set(2, m[1]);
        out.set(3, m[2]);
        out
    }
}

/// Marker type selecting the magneto-hydrodynamic field set. Only compiled
/// when the `mhd` feature is enabled.
#[cfg(feature = "mhd")]
#[derive(Clone, Copy, Debug, Default)]
pub struct Mhd;

#[cfg(feature = "mhd")]
impl PhysicsSystem for Mhd {
    type Conserved = mhd::MhdConserved;
    type Primitive = mhd::MhdPrimitive;
    const NAME: &'static str = "mhd";

    fn to_primitive(u: &Self::Conserved, physics: &Physics) -> Self::Primitive {
        u.to_primitive(physics)
    }
    fn from_primitive(p: &Self::Primitive, physics: &Physics) -> Self::Conserved {
        mhd::MhdConserved::from_primitive(p, physics)
    }
    fn enforce_floors(u: &mut Self::Conserved, physics: &Physics, temperature_floor: Real) {
        u.enforce_floors(physics, temperature_floor)
    }
    fn solve_riemann(
        scheme: crate::riemann::RiemannScheme,
        left: Self::Primitive,
        right: Self::Primitive,
        physics: &Physics,
    ) -> (Self::Conserved, Real) {
        crate::riemann::solve_mhd(scheme, left, right, physics)
    }
    fn reflect(u: &mut Self::Conserved, axis: usize) {
        use crate::fields::FieldVector;
        let mom = 1 + axis;
        let b = 6 + axis;
        u.set(mom, -u.get(mom));
        u.set(b, -u.get(b));
    }
    fn signal_speed(p: &Self::Primitive, physics: &Physics) -> Real {
        let pressure = p.pressure().max(physics.pressure_floor);
        crate::riemann::fast_magnetosonic_speed(p.density(), pressure, p.magnetic_field(), physics.gamma)
    }
    fn permute_primitive(p: Self::Primitive, direction: Direction) -> Self::Primitive {
        let mut out = p;
        let v = direction.permute([p.get(1), p.get(2), p.get(3)]);
        let b = direction.permute([p.get(5), p.get(6), p.get(7)]);
        out.set(1, v[0]);
        out.set(2, v[1]);
        out.set(3, v[2]);
        out.set(5, b[0]);
        out.set(6, b[1]);
        out.set(7, b[2]);
        out
    }
    fn unpermute_flux(flux: Self::Conserved, direction: Direction) -> Self::Conserved {
        let mut out = flux;
        let m = direction.unpermute([flux.get(1), flux.get(2), flux.get(3)]);
        let b = direction.unpermute([flux.get(6), flux.get(7), flux.get(8)]);
        out.set(1, m[0]);
        out.set(2, m[1]);
        out.set(3, m[2]);
        out.set(6, b[0]);
        out.set(7, b[1]);
        out.set(8, b[2]);
        out
    }
}
