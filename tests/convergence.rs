//! A smooth, periodic density wave advected at constant velocity should
//! converge under grid refinement: doubling the resolution should roughly
//! quarter the L1 error against the exact advected profile for a
//! piecewise-linear (second-order) reconstruction.

use cholla_core::boundary::SingleRankHalo;
use cholla_core::geometry::GridGeometry;
use cholla_core::integrator::{Integrator, IntegratorConfig, VanLeer};
use cholla_core::mesh::Block;
use cholla_core::physics::hydro::HydroPrimitive;
use cholla_core::physics::{Conserved, Hydro, Physics};
use cholla_core::real::Real;
use cholla_core::reconstruction::ReconstructionScheme;
use cholla_core::riemann::RiemannScheme;

fn physics() -> Physics {
    Physics { gamma: 1.4, density_floor: 1e-8, pressure_floor: 1e-10, dual_energy: false, dual_energy_eta: 1e-3, mean_molecular_weight: 0.6 }
}

fn config() -> IntegratorConfig {
    IntegratorConfig { reconstruction: ReconstructionScheme::Plmc, riemann: RiemannScheme::Hllc, limiter_theta: 1.5, temperature_floor: 1.0 }
}

const VELOCITY: Real = 1.0;
const FINAL_TIME: Real = 0.2;

fn exact_density(x: Real, time: Real) -> Real {
    let shifted = (x - VELOCITY * time).rem_euclid(1.0);
    1.0 + 0.5 * (2.0 * std::f64::consts::PI as Real * shifted).sin()
}

fn l1_error(n: usize) -> Real {
    let dx = 1.0 / n as Real;
    let geometry = GridGeometry::new([n, 1, 1], [dx, 1.0, 1.0], [0.0, 0.0, 0.0], 3);
    let mut block = Block::<Hydro>::new(geometry);
    block.fill_interior(&physics(), |x| HydroPrimitive([exact_density(x[0], 0.0), VELOCITY, 0.0, 0.0, 1.0]));
    let halo = SingleRankHalo::<Hydro>::periodic();

    let cfl_dt = 0.4 * dx / VELOCITY;
    let mut time = 0.0;
    while time < FINAL_TIME {
        let dt = cfl_dt.min(FINAL_TIME - time);
        VanLeer.step(&mut block, &physics(), &config(), &halo, time, dt).unwrap();
        time += dt;
    }

    let ghost = 3;
    let mut error = 0.0;
    for i in 0..n {
        let x = (i as Real + 0.5) * dx;
        let got = block.conserved[[i + ghost, 0, 0]].density();
        error += (got - exact_density(x, FINAL_TIME)).abs();
    }
    error / n as Real
}

#[test]
fn advected_density_wave_error_shrinks_under_refinement() {
    let coarse = l1_error(32);
    let fine = l1_error(64);

    assert!(coarse > 1e-6, "coarse error suspiciously small: {coarse}");
    assert!(fine < coarse, "refinement did not reduce error: coarse={coarse}, fine={fine}");
    assert!(coarse / fine > 1.5, "convergence rate too low: coarse/fine = {}", coarse / fine);
}
