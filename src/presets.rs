//! Built-in named parameter sets,
//! grounded directly in an `App::presets()` precedent (`include_str!`-ed
//! YAML, looked up by name before falling back to treating the input as a
//! file path). The grammar here is [`crate::config::ParameterMap`]'s rather
//! than YAML, so the presets are plain `&'static str` constants instead of
//! `include_str!`-ed files, but the lookup-by-name-then-fall-back-to-file
//! shape is unchanged (see `cli::resolve_parameter_source`).

/// `(name, parameter text)` pairs for every built-in scenario. A caller
/// passing a name that doesn't match any preset should try it as a file
/// path instead.
pub fn presets() -> Vec<(&'static str, &'static str)> {
    vec![("sod_shock_tube", SOD_SHOCK_TUBE), ("brio_wu", BRIO_WU), ("einfeldt_rarefaction", EINFELDT_RAREFACTION)]
}

pub fn lookup(name: &str) -> Option<&'static str> {
    presets().into_iter().find(|&(key, _)| key == name).map(|(_, text)| text)
}

/// The classic Sod shock tube: a single discontinuity at the
/// midpoint of a 1-D domain, high pressure/density to the left. Develops a
/// left rarefaction, a contact discontinuity, and a right shock.
const SOD_SHOCK_TUBE: &str = "
physics_system = hydro

[physics]
gamma = 1.4
density_floor = 1e-8
pressure_floor = 1e-10
dual_energy = true
dual_energy_eta = 1e-3

[mesh]
nx = 256
ny = 1
nz = 1
lx = 1.0
ghost_width = 3

[integrator]
scheme = van_leer
reconstruction = plmc
riemann = hllc
limiter_theta = 1.5
temperature_floor = 1.0

[control]
cfl_number = 0.4
final_time = 0.2
checkpoint_interval = 0.02
output_directory = sod_shock_tube_output

[boundary]
x_low = outflow
x_high = outflow

[initial]
interface_position = 0.5

[initial.left]
density = 1.0
pressure = 1.0

[initial.right]
density = 0.125
pressure = 0.1
";

/// The Brio & Wu MHD shock tube: the canonical seven-wave MHD
/// Riemann problem, requiring the `mhd` feature and the HLLD solver.
const BRIO_WU: &str = "
physics_system = mhd

[physics]
gamma = 2.0
density_floor = 1e-8
pressure_floor = 1e-10
dual_energy = true
dual_energy_eta = 1e-3

[mesh]
nx = 512
ny = 1
nz = 1
lx = 1.0
ghost_width = 3

[integrator]
scheme = van_leer
reconstruction = plmc
riemann = hlld
limiter_theta = 1.5
temperature_floor = 1.0

[control]
cfl_number = 0.4
final_time = 0.1
checkpoint_interval = 0.01
output_directory = brio_wu_output

[boundary]
x_low = outflow
x_high = outflow

[initial]
interface_position = 0.5

[initial.left]
density = 1.0
pressure = 1.0
by = 1.0

[initial.right]
density = 0.125
pressure = 0.1
by = -1.0
";

/// The Einfeldt strong rarefaction: two streams of equal density
/// and pressure moving apart at high Mach number, stressing the positivity
/// floors and the dual-energy switch rather than a shock-capturing test.
const EINFELDT_RAREFACTION: &str = "
physics_system = hydro

[physics]
gamma = 1.4
density_floor = 1e-10
pressure_floor = 1e-12
dual_energy = true
dual_energy_eta = 1e-3

[mesh]
nx = 256
ny = 1
nz = 1
lx = 1.0
ghost_width = 3

[integrator]
scheme = van_leer
reconstruction = ppmc
riemann = hllc
limiter_theta = 1.5
temperature_floor = 1e-4

[control]
cfl_number = 0.3
final_time = 0.1
checkpoint_interval = 0.01
output_directory = einfeldt_rarefaction_output

[boundary]
x_low = outflow
x_high = outflow

[initial]
interface_position = 0.5

[initial.left]
density = 1.0
velocity_x = -2.0
pressure = 0.4

[initial.right]
density = 1.0
velocity_x = 2.0
pressure = 0.4
";
