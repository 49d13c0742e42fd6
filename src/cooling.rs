//! Radiative cooling source term. The crate owns the time
//! update `T_new = cool(T, dt)`; the cooling curve itself is a collaborator
//! seam so a tabulated curve (e.g. Cloudy/Grackle-derived) can be swapped
//! in without the integrator changing.

use rayon::prelude::*;

use crate::physics::{Conserved, Physics, PhysicsSystem, ATOMIC_MASS_UNIT, BOLTZMANN_CONSTANT};
use crate::real::Real;

/// A radiative cooling curve: given density, temperature and a timestep,
/// returns the new temperature after `dt` of cooling. Implementors own
/// their own sub-stepping if the cooling time is shorter than `dt`.
pub trait CoolingFunction: Send + Sync {
    fn cool(&self, density: Real, temperature: Real, dt: Real) -> Real;
}

/// No radiative losses: the identity map.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoCooling;

impl CoolingFunction for NoCooling {
    fn cool(&self, _density: Real, temperature: Real, _dt: Real) -> Real {
        temperature
    }
}

/// A power-law cooling curve, `Lambda(rho, T) = lambda_0 * (rho /
/// rho_0)^density_exponent * (T / T_0)^temperature_exponent`, integrated
/// implicitly over `dt` at fixed density. Stands in for a tabulated curve
/// (e.g. a Cloudy/Grackle lookup) that did not survive retrieval; see
/// DESIGN.md.
///
/// The cooling rate per unit volume is `n^2 Lambda(rho, T)`, with `n =
/// rho / (mean_molecular_weight * m_u)`; the energy equation `d(e)/dt =
/// -n^2 Lambda` is solved for temperature at fixed density via one
/// backward-Euler step, floored at `floor_temperature`.
#[derive(Clone, Copy, Debug, serde::Serialize, serde::Deserialize)]
pub struct PowerLawCooling {
    pub lambda_0: Real,
    pub density_0: Real,
    pub temperature_0: Real,
    pub density_exponent: Real,
    pub temperature_exponent: Real,
    pub floor_temperature: Real,
    pub mean_molecular_weight: Real,
}

impl CoolingFunction for PowerLawCooling {
    fn cool(&self, density: Real, temperature: Real, dt: Real) -> Real {
        if temperature <= self.floor_temperature || density <= 0.0 {
            return temperature.max(self.floor_temperature);
        }
        let n = density / (self.mean_molecular_weight * ATOMIC_MASS_UNIT);
        let rate = self.lambda_0
            * (density / self.density_0).powf(self.density_exponent)
            * (temperature / self.temperature_0).powf(self.temperature_exponent - 1.0)
            * n
            * n
            / (1.5 * n * BOLTZMANN_CONSTANT);
        let cooled = temperature / (1.0 + rate * dt);
        cooled.max(self.floor_temperature)
    }
}

/// Apply a cooling curve to every interior cell of a primitive-state array
///: recomputes temperature, cools it, and rebuilds the
/// conserved energy from the new temperature holding density and velocity
/// fixed. `temperature_of`/`pressure_of` close over `physics` so both hydro
/// and MHD primitives (whose pressure-to-temperature relation is the same
/// ideal-gas law) share one code path.
pub fn apply_cooling<S: PhysicsSystem>(
    conserved: &mut ndarray::Array3<S::Conserved>,
    physics: &Physics,
    cooling: &dyn CoolingFunction,
    dt: Real,
) {
    conserved
        .as_slice_mut()
        .expect("conserved array must be contiguous")
        .par_iter_mut()
        .for_each(|u| {
            let density = u.density();
            if density <= 0.0 {
                return;
            }
            let primitive = S::to_primitive(u, physics);
            let temperature = temperature_of(primitive.pressure(), density, physics);
            let cooled_temperature = cooling.cool(density, temperature, dt);
            if cooled_temperature == temperature {
                return;
            }
            let new_pressure = pressure_of(cooled_temperature, density, physics);
            let new_internal_energy = new_pressure / (physics.gamma - 1.0);
            let delta = new_internal_energy - u.internal_energy();
            u.set_internal_energy(new_internal_energy);
            // Total energy only carries the internal-energy component of
            // the cooling loss; kinetic/magnetic energy are untouched.
            let energy_index = 4;
            crate::fields::FieldVector::set(u, energy_index, crate::fields::FieldVector::get(u, energy_index) + delta);
        });
}

fn temperature_of(pressure: Real, density: Real, physics: &Physics) -> Real {
    pressure * physics.mean_molecular_weight * ATOMIC_MASS_UNIT / (density * BOLTZMANN_CONSTANT)
}

fn pressure_of(temperature: Real, density: Real, physics: &Physics) -> Real {
    temperature * density * BOLTZMANN_CONSTANT / (physics.mean_molecular_weight * ATOMIC_MASS_UNIT)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn no_cooling_is_identity() {
        assert_eq!(NoCooling.cool(1.0, 1e4, 1.0), 1e4);
    }

    #[test]
    fn power_law_cooling_reduces_temperature_over_time() {
        let curve = PowerLawCooling {
            lambda_0: 1e-23,
            density_0: 1.0,
            temperature_0: 1e4,
            density_exponent: 2.0,
            temperature_exponent: -0.5,
            floor_temperature: 10.0,
            mean_molecular_weight: 0.6,
        };
        let cooled = curve.cool(1.0, 1e6, 1e12);
        assert!(cooled < 1e6);
        assert!(cooled >= curve.floor_temperature);
    }

    #[test]
    fn power_law_cooling_respects_floor() {
        let curve = PowerLawCooling {
            lambda_0: 1e-20,
            density_0: 1.0,
            temperature_0: 1e4,
            density_exponent: 2.0,
            temperature_exponent: -0.5,
            floor_temperature: 100.0,
            mean_molecular_weight: 0.6,
        };
        let cooled = curve.cool(1.0, 1e6, 1e20);
        assert!(cooled >= curve.floor_temperature);
    }
}
