//! An extreme double rarefaction (an Einfeldt-style "226" configuration)
//! drives the density and pressure in the fan toward vacuum; density and
//! pressure floors plus the dual-energy formalism must keep every cell
//! finite and above the floor values rather than letting the scheme diverge
//! or go negative.

use cholla_core::boundary::SingleRankHalo;
use cholla_core::geometry::GridGeometry;
use cholla_core::integrator::{Integrator, IntegratorConfig, VanLeer};
use cholla_core::mesh::Block;
use cholla_core::physics::hydro::HydroPrimitive;
use cholla_core::physics::{Conserved, Hydro, Physics, PhysicsSystem, Primitive};
use cholla_core::reconstruction::ReconstructionScheme;
use cholla_core::riemann::RiemannScheme;

fn physics() -> Physics {
    Physics { gamma: 1.4, density_floor: 1e-4, pressure_floor: 1e-6, dual_energy: true, dual_energy_eta: 1e-3, mean_molecular_weight: 0.6 }
}

fn config() -> IntegratorConfig {
    IntegratorConfig { reconstruction: ReconstructionScheme::Plmc, riemann: RiemannScheme::Hllc, limiter_theta: 1.5, temperature_floor: 1e-4 }
}

#[test]
fn strong_double_rarefaction_stays_finite_and_above_floors() {
    let geometry = GridGeometry::new([128, 1, 1], [1.0 / 128.0, 1.0, 1.0], [0.0, 0.0, 0.0], 3);
    let mut block = Block::<Hydro>::new(geometry);
    block.fill_interior(&physics(), |x| {
        let velocity = if x[0] < 0.5 { -5.0 } else { 5.0 };
        HydroPrimitive([1.0, velocity, 0.0, 0.0, 0.4])
    });
    let halo = SingleRankHalo::<Hydro>::periodic();

    for _ in 0..60 {
        VanLeer.step(&mut block, &physics(), &config(), &halo, 0.0, 1e-4).unwrap();
        block.enforce_floors(&physics(), config().temperature_floor);
    }

    assert!(block.first_non_finite().is_none(), "non-finite cell after strong rarefaction");

    let ghost = 3;
    for i in 0..128 {
        let u = block.conserved[[i + ghost, 0, 0]];
        assert!(u.density() >= physics().density_floor * (1.0 - 1e-6), "density below floor at {i}: {}", u.density());
        let p = Hydro::to_primitive(&u, &physics());
        assert!(p.pressure() >= physics().pressure_floor * (1.0 - 1e-6), "pressure below floor at {i}: {}", p.pressure());
    }
}
