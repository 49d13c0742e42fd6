//! Magneto-hydrodynamic conserved/primitive pair.
//! Only compiled when the `mhd` feature is enabled. Field layout mirrors
//! [`super::hydro`] with three face-centered field components appended,
//! following the same "always carry `e_int`, gate its use with
//! `Physics::dual_energy`" choice recorded in DESIGN.md.

use super::{Conserved, Physics, Primitive};
use crate::fields::FieldVector;
use crate::real::Real;

/// `(ρ, ρv_x, ρv_y, ρv_z, E, e_int, B_x, B_y, B_z)`.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(from = "[Real; 9]", into = "[Real; 9]")]
pub struct MhdConserved(pub [Real; 9]);

/// `(ρ, v_x, v_y, v_z, p, B_x, B_y, B_z)`.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(from = "[Real; 8]", into = "[Real; 8]")]
pub struct MhdPrimitive(pub [Real; 8]);

impl From<[Real; 9]> for MhdConserved {
    fn from(a: [Real; 9]) -> Self {
        Self(a)
    }
}
impl From<MhdConserved> for [Real; 9] {
    fn from(c: MhdConserved) -> Self {
        c.0
    }
}
impl From<[Real; 8]> for MhdPrimitive {
    fn from(a: [Real; 8]) -> Self {
        Self(a)
    }
}
impl From<MhdPrimitive> for [Real; 8] {
    fn from(p: MhdPrimitive) -> Self {
        p.0
    }
}

impl FieldVector for MhdConserved {
    const LEN: usize = 9;
    fn get(&self, i: usize) -> Real {
        self.0[i]
    }
    fn set(&mut self, i: usize, v: Real) {
        self.0[i] = v;
    }
    fn zero() -> Self {
        Self([0.0; 9])
    }
}

impl FieldVector for MhdPrimitive {
    const LEN: usize = 8;
    fn get(&self, i: usize) -> Real {
        self.0[i]
    }
    fn set(&mut self, i: usize, v: Real) {
        self.0[i] = v;
    }
    fn zero() -> Self {
        Self([0.0; 8])
    }
}

impl Conserved for MhdConserved {
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
        [self.0[6], self.0[7], self.0[8]]
    }
}

impl Primitive for MhdPrimitive {
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
        [self.0[5], self.0[6], self.0[7]]
    }
}

impl MhdConserved {
    pub fn new(density: Real, momentum: [Real; 3], energy: Real, internal_energy: Real, b: [Real; 3]) -> Self {
        Self([density, momentum[0], momentum[1], momentum[2], energy, internal_energy, b[0], b[1], b[2]])
    }

    /// `p = (γ-1)(E - K - M)`.
    pub fn pressure_from_total_energy(&self, physics: &Physics) -> Real {
        (physics.gamma - 1.0) * (self.energy() - self.kinetic_energy() - self.magnetic_energy())
    }

    pub fn pressure_from_internal_energy(&self, physics: &Physics) -> Real {
        (physics.gamma - 1.0) * self.internal_energy()
    }

    pub fn to_primitive(&self, physics: &Physics) -> MhdPrimitive {
        let v = self.momentum().map(|p| p / self.density());
        let b = self.magnetic_field();
        MhdPrimitive([self.density(), v[0], v[1], v[2], self.pressure_from_total_energy(physics), b[0], b[1], b[2]])
    }

    pub fn from_primitive(p: &MhdPrimitive, physics: &Physics) -> Self {
        let v = p.velocity();
        let b = p.magnetic_field();
        let kinetic = 0.5 * p.density() * (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]);
        let magnetic = 0.5 * (b[0] * b[0] + b[1] * b[1] + b[2] * b[2]);
        let internal = p.pressure() / (physics.gamma - 1.0);
        Self::new(p.density(), v.map(|vi| vi * p.density()), kinetic + magnetic + internal, internal, b)
    }

    /// Same structure as [`super::hydro::HydroConserved::enforce_floors`],
    /// with kinetic + magnetic energy subtracted from `E` rather than just
    /// kinetic.
    pub fn enforce_floors(&mut self, physics: &Physics, temperature_floor: Real) {
        if self.density() < physics.density_floor {
            let v = self.momentum().map(|p| p / self.density());
            let new_density = physics.density_floor;
            let kinetic_old = self.kinetic_energy();
            let magnetic = self.magnetic_energy();
            let thermal = self.energy() - kinetic_old - magnetic;
            self.0[0] = new_density;
            self.0[1] = v[0] * new_density;
            self.0[2] = v[1] * new_density;
            self.0[3] = v[2] * new_density;
            let kinetic_new = 0.5 * new_density * (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]);
            self.0[4] = kinetic_new + magnetic + thermal;
        }

        let internal_floor = physics.internal_energy_floor(self.density(), temperature_floor);

        if !physics.dual_energy {
            let p_tot = self.pressure_from_total_energy(physics);
            if p_tot < physics.pressure_floor {
                let thermal_floor = physics.pressure_floor / (physics.gamma - 1.0);
                self.0[4] = self.kinetic_energy() + self.magnetic_energy() + thermal_floor;
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
            self.0[4] = self.kinetic_energy() + self.magnetic_energy() + internal;
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
            gamma: 5.0 / 3.0,
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
        let p = MhdPrimitive([1.0, 0.1, -0.2, 0.0, 1.0, 0.75, 1.0, 0.0]);
        let u = MhdConserved::from_primitive(&p, &phy);
        let p2 = u.to_primitive(&phy);
        for i in 0..8 {
            assert!((p.get(i) - p2.get(i)).abs() < 1e-10);
        }
    }

    #[test]
    fn magnetic_energy_lowers_thermal_pressure() {
        let phy = physics();
        let p_weak = MhdPrimitive([1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0]);
        let p_strong = MhdPrimitive([1.0, 0.0, 0.0, 0.0, 1.0, 2.0, 0.0, 0.0]);
        let u_weak = MhdConserved::from_primitive(&p_weak, &phy);
        let u_strong = MhdConserved::from_primitive(&p_strong, &phy);
        assert!(u_strong.energy() > u_weak.energy());
        assert!((u_strong.pressure_from_total_energy(&phy) - 1.0).abs() < 1e-10);
    }
}
