//! Pure-hydrodynamic conserved/primitive pair, generalizing a
//! `physics/newtonian_hydro.rs` precedent (`hydro_euler::euler_2d::{Conserved,
//! Primitive}`) from 2-D spherical-polar to 3-D Cartesian, and adding the
//! dual-energy bookkeeping field an internal-energy-aware update requires.

use super::{Conserved, Physics, Primitive};
use crate::fields::FieldVector;
use crate::real::Real;

/// `(ρ, ρv_x, ρv_y, ρv_z, E, e_int)`. `e_int` (internal energy per volume)
/// is always present; it is only trusted/updated when `Physics::dual_energy`
/// is set (see the Open Question decision in DESIGN.md).
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(from = "[Real; 6]", into = "[Real; 6]")]
pub struct HydroConserved(pub [Real; 6]);

/// `(ρ, v_x, v_y, v_z, p)`.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(from = "[Real; 5]", into = "[Real; 5]")]
pub struct HydroPrimitive(pub [Real; 5]);

impl From<[Real; 6]> for HydroConserved {
    fn from(a: [Real; 6]) -> Self {
        Self(a)
    }
}
impl From<HydroConserved> for [Real; 6] {
    fn from(c: HydroConserved) -> Self {
        c.0
    }
}
impl From<[Real; 5]> for HydroPrimitive {
    fn from(a: [Real; 5]) -> Self {
        Self(a)
    }
}
impl From<HydroPrimitive> for [Real; 5] {
    fn from(p: HydroPrimitive) -> Self {
        p.0
    }
}

impl FieldVector for HydroConserved {
    const LEN: usize = 6;
    fn get(&self, i: usize) -> Real {
        self.0[i]
    }
    fn set(&mut self, i: usize, v: Real) {
        self.0[i] = v;
    }
    fn zero() -> Self {
        Self([0.0; 6])
    }
}

impl FieldVector for HydroPrimitive {
    const LEN: usize = 5;
    fn get(&self, i: usize) -> Real {
        self.0[i]
    }
    fn set(&mut self, i: usize, v: Real) {
        self.0[i] = v;
    }
    fn zero() -> Self {
        Self([0.0; 5])
    }
}

impl Conserved for HydroConserved {
    fn density(&self) -> Real {
        self.0[0]
    }
    fn momentum(&self) -> [Real; 3] {
        [self.0[1], self.0[2], self.0[3]]
    }
    fn energy(&self) -> Real {
        self.0[4]
    }
    fn internal_energy(&self) -> Real {
        self.0[5]
    }
    fn set_internal_energy(&mut self, e: Real) {
        self.0[5] = e;
    }
    fn magnetic_field(&self) -> [Real; 3] {
        [0.0, 0.0, 0.0]
    }
}

impl Primitive for HydroPrimitive {
    fn density(&self) -> Real {
        self.0[0]
    }
    fn velocity(&self) -> [Real; 3] {
        [self.0[1], self.0[2], self.0[3]]
    }
    fn pressure(&self) -> Real {
        self.0[4]
    }
    fn magnetic_field(&self) -> [Real; 3] {
        [0.0, 0.0, 0.0]
    }
}

impl HydroConserved {
    pub fn new(density: Real, momentum: [Real; 3], energy: Real, internal_energy: Real) -> Self {
        Self([density, momentum[0], momentum[1], momentum[2], energy, internal_energy])
    }

    /// `p = (γ-1)(E - K)`, with no floor applied.
    pub fn pressure_from_total_energy(&self, physics: &Physics) -> Real {
        (physics.gamma - 1.0) * (self.energy() - self.kinetic_energy())
    }

    /// `p = (γ-1) e_int`.
    pub fn pressure_from_internal_energy(&self, physics: &Physics) -> Real {
        (physics.gamma - 1.0) * self.internal_energy()
    }

    /// Unconditional conversion to primitives: pressure from total energy,
    /// no floors applied. Used once floors have already been enforced.
    pub fn to_primitive(&self, physics: &Physics) -> HydroPrimitive {
        let v = self.momentum().map(|p| p / self.density());
        HydroPrimitive([self.density(), v[0], v[1], v[2], self.pressure_from_total_energy(physics)])
    }

    /// Primitive-to-conserved, initializing `e_int` consistently with the
    /// given pressure.
    pub fn from_primitive(p: &HydroPrimitive, physics: &Physics) -> Self {
        let v = p.velocity();
        let kinetic = 0.5 * p.density() * (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]);
        let internal = p.pressure() / (physics.gamma - 1.0);
        Self::new(p.density(), v.map(|vi| vi * p.density()), kinetic + internal, internal)
    }

    /// Floor enforcement: density floor first (rescaling momentum to
    /// preserve velocity), then the dual-energy-aware pressure floor.
    pub fn enforce_floors(&mut self, physics: &Physics, temperature_floor: Real) {
        if self.density() < physics.density_floor {
            let v = self.momentum().map(|p| p / self.density());
            let new_density = physics.density_floor;
            let new_momentum = v.map(|vi| vi * new_density);
            let kinetic_old = self.kinetic_energy();
            let thermal = self.energy() - kinetic_old;
            self.0[0] = new_density;
            self.0[1] = new_momentum[0];
            self.0[2] = new_momentum[1];
            self.0[3] = new_momentum[2];
            let kinetic_new = 0.5 * new_density * (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]);
            self.0[4] = kinetic_new + thermal;
        }

        let internal_floor = physics.internal_energy_floor(self.density(), temperature_floor);

        if !physics.dual_energy {
            let p_tot = self.pressure_from_total_energy(physics);
            if p_tot < physics.pressure_floor {
                let thermal_floor = physics.pressure_floor / (physics.gamma - 1.0);
                self.0[4] = self.kinetic_energy() + thermal_floor;
            }
            return;
        }

        let p_tot = self.pressure_from_total_energy(physics);
        if p_tot < physics.pressure_floor {
            let mut internal = self.internal_energy();
            if internal < internal_floor {
                internal = internal_floor;
                self.0[5] = internal;
            }
            self.0[4] = self.kinetic_energy() + internal;
        }
        if self.internal_energy() < internal_floor {
            self.0[5] = internal_floor;
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn physics() -> Physics {
        Physics {
            gamma: 1.4,
            density_floor: 1e-6,
            pressure_floor: 1e-8,
            dual_energy: true,
            dual_energy_eta: 1e-3,
            mean_molecular_weight: 0.6,
        }
    }

    #[test]
    fn round_trip_primitive_conserved() {
        let phy = physics();
        let p = HydroPrimitive([1.2, 0.3, -0.1, 0.05, 2.5]);
        let u = HydroConserved::from_primitive(&p, &phy);
        let p2 = u.to_primitive(&phy);
        for i in 0..5 {
            assert!((p.get(i) - p2.get(i)).abs() < 1e-10, "component {i}: {} vs {}", p.get(i), p2.get(i));
        }
    }

    #[test]
    fn density_floor_preserves_velocity() {
        let phy = physics();
        let mut u = HydroConserved::new(1e-10, [2e-10, 0.0, 0.0], 1e-9, 1e-10);
        let v_before = u.momentum()[0] / u.density();
        u.enforce_floors(&phy, 10.0);
        assert!(u.density() >= phy.density_floor);
        let v_after = u.momentum()[0] / u.density();
        assert!((v_before - v_after).abs() < 1e-6);
    }

    #[test]
    fn pressure_floor_restores_positivity() {
        let phy = physics();
        // E so small that p = (gamma-1)(E-K) < 0.
        let mut u = HydroConserved::new(1.0, [0.0, 0.0, 0.0], -1.0, 1e-10);
        u.enforce_floors(&phy, 1.0);
        assert!(u.pressure_from_total_energy(&phy) >= 0.0);
    }
}
