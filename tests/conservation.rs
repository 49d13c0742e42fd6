//! A periodic domain with no gravity or cooling source terms must conserve
//! total mass, momentum, and energy exactly (up to floating-point roundoff)
//! across many update steps, whatever the reconstruction/Riemann/integrator
//! choice — the flux-divergence form guarantees this by construction.

use cholla_core::boundary::SingleRankHalo;
use cholla_core::geometry::GridGeometry;
use cholla_core::integrator::{Integrator, IntegratorConfig, VanLeer};
use cholla_core::mesh::Block;
use cholla_core::physics::hydro::HydroPrimitive;
use cholla_core::physics::{Conserved, Hydro, Physics};
use cholla_core::reconstruction::ReconstructionScheme;
use cholla_core::riemann::RiemannScheme;

fn physics() -> Physics {
    Physics { gamma: 1.4, density_floor: 1e-8, pressure_floor: 1e-10, dual_energy: true, dual_energy_eta: 1e-3, mean_molecular_weight: 0.6 }
}

fn config() -> IntegratorConfig {
    IntegratorConfig { reconstruction: ReconstructionScheme::Plmc, riemann: RiemannScheme::Hllc, limiter_theta: 1.5, temperature_floor: 1.0 }
}

#[test]
fn periodic_sod_like_profile_conserves_mass_momentum_and_energy() {
    let geometry = GridGeometry::new([64, 1, 1], [1.0 / 64.0, 1.0, 1.0], [0.0, 0.0, 0.0], 3);
    let mut block = Block::<Hydro>::new(geometry);
    block.fill_interior(&physics(), |x| {
        if x[0] < 0.5 {
            HydroPrimitive([1.0, 0.3, 0.0, 0.0, 1.0])
        } else {
            HydroPrimitive([0.4, 0.3, 0.0, 0.0, 0.3])
        }
    });
    let halo = SingleRankHalo::<Hydro>::periodic();

    let before = block.sum_interior();
    for _ in 0..50 {
        VanLeer.step(&mut block, &physics(), &config(), &halo, 0.0, 5e-4).unwrap();
    }
    let after = block.sum_interior();

    assert!((before.density() - after.density()).abs() < 1e-9, "mass not conserved: {} vs {}", before.density(), after.density());
    for axis in 0..3 {
        assert!(
            (before.momentum()[axis] - after.momentum()[axis]).abs() < 1e-8,
            "momentum[{axis}] not conserved: {} vs {}",
            before.momentum()[axis],
            after.momentum()[axis]
        );
    }
    assert!((before.energy() - after.energy()).abs() < 1e-7, "energy not conserved: {} vs {}", before.energy(), after.energy());
}

#[test]
fn two_dimensional_periodic_vortex_like_state_conserves_mass() {
    let geometry = GridGeometry::new([16, 16, 1], [1.0 / 16.0, 1.0 / 16.0, 1.0], [0.0, 0.0, 0.0], 3);
    let mut block = Block::<Hydro>::new(geometry);
    block.fill_interior(&physics(), |x| {
        let dx = x[0] - 0.5;
        let dy = x[1] - 0.5;
        HydroPrimitive([1.0 + 0.1 * (dx * dx + dy * dy).sin(), -dy, dx, 0.0, 1.0])
    });
    let halo = SingleRankHalo::<Hydro>::periodic();

    let before = block.sum_interior();
    for _ in 0..20 {
        VanLeer.step(&mut block, &physics(), &config(), &halo, 0.0, 2e-4).unwrap();
    }
    let after = block.sum_interior();

    assert!((before.density() - after.density()).abs() < 1e-8);
}
