//! Gravitational source-term coupling and the gravity
//! collaborator interface: the core treats the potential `Phi`
//! as read-only after `solve_potential` returns, and only ever applies its
//! gradient as a momentum/energy source.

use ndarray::Array3;

use crate::error::CollaboratorError;
use crate::fields::FieldVector;
use crate::geometry::GridGeometry;
use crate::mesh::Block;
use crate::physics::{Conserved, Physics, PhysicsSystem};
use crate::real::Real;

/// Domain boundary condition flag passed to the Poisson solve.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BoundaryFlag {
    Periodic = 0,
    Isolated = 1,
}

/// How the gravitational source term updates total energy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GravityEnergyCoupling {
    /// `E += dt * rho * v . g`: couple the work done by gravity directly.
    Work,
    /// `E += (KE_new - KE_old)`: couple the realized change in kinetic
    /// energy after the momentum update, avoiding the need to evaluate
    /// `v . g` at the pre-update velocity.
    DeltaKineticEnergy,
}

/// The gravity collaborator interface: `solve_potential(rho,
/// phi_out, domain_geometry, boundary_flags)`. The Poisson solve itself is
/// out of scope here; [`ZeroPotential`] is the trivial implementor
/// used by hydro-only runs and tests.
pub trait PotentialSolver {
    fn solve_potential(
        &self,
        density: &Array3<Real>,
        phi_out: &mut Array3<Real>,
        geometry: &GridGeometry,
        boundary_flags: [BoundaryFlag; 6],
    ) -> Result<(), CollaboratorError>;
}

/// No gravity: leaves the potential at zero everywhere.
#[derive(Clone, Copy, Debug, Default)]
pub struct ZeroPotential;

impl PotentialSolver for ZeroPotential {
    fn solve_potential(
        &self,
        _density: &Array3<Real>,
        phi_out: &mut Array3<Real>,
        _geometry: &GridGeometry,
        _boundary_flags: [BoundaryFlag; 6],
    ) -> Result<(), CollaboratorError> {
        phi_out.fill(0.0);
        Ok(())
    }
}

/// Centered-difference acceleration `g = -grad(Phi)` at one interior cell,
/// given in padded-array indices. Uses the 5-point stencil when
/// `high_accuracy` is set, else the 3-point stencil; both
/// require `phi` to have at least that many ghost cells populated.
fn acceleration_at(phi: &Array3<Real>, geometry: &GridGeometry, i: usize, j: usize, k: usize, high_accuracy: bool) -> [Real; 3] {
    let idx = [i, j, k];
    std::array::from_fn(|axis| {
        let h = geometry.spacing[axis];
        let mut lo = idx;
        let mut hi = idx;
        lo[axis] -= 1;
        hi[axis] += 1;
        if high_accuracy {
            let mut lo2 = idx;
            let mut hi2 = idx;
            lo2[axis] -= 2;
            hi2[axis] += 2;
            -(-phi[hi2] + 8.0 * phi[hi] - 8.0 * phi[lo] + phi[lo2]) / (12.0 * h)
        } else {
            -(phi[hi] - phi[lo]) / (2.0 * h)
        }
    })
}

/// Apply the gravitational momentum/energy source term to every interior
/// cell of `block`. `phi` must share `block`'s padded shape
/// and have valid ghost values out to the stencil's half-width.
pub fn apply_gravity_source<S: PhysicsSystem>(
    block: &mut Block<S>,
    phi: &Array3<Real>,
    _physics: &Physics,
    dt: Real,
    coupling: GravityEnergyCoupling,
    high_accuracy: bool,
) {
    let (rx, ry, rz) = (block.interior_range(0), block.interior_range(1), block.interior_range(2));
    for i in rx {
        for j in ry.clone() {
            for k in rz.clone() {
                let g = acceleration_at(phi, &block.geometry, i, j, k, high_accuracy);
                let u = &mut block.conserved[[i, j, k]];
                let rho = u.density();
                let v_old = u.momentum().map(|p| p / rho);
                let ke_old = u.kinetic_energy();

                for axis in 0..3 {
                    let idx = 1 + axis;
                    u.set(idx, u.get(idx) + dt * rho * g[axis]);
                }

                match coupling {
                    GravityEnergyCoupling::Work => {
                        let work = dt * rho * (v_old[0] * g[0] + v_old[1] * g[1] + v_old[2] * g[2]);
                        u.set(4, u.get(4) + work);
                    }
                    GravityEnergyCoupling::DeltaKineticEnergy => {
                        let ke_new = u.kinetic_energy();
                        u.set(4, u.get(4) + (ke_new - ke_old));
                    }
                }
            }
        }
    }
}
