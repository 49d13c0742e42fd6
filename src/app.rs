//! The simulation driver: turns a [`crate::config::ParameterMap`]
//! into a runnable [`Simulation`], and owns the single-writer step loop that
//! calls the integrator, the optional gravity/cooling source terms, and the
//! snapshot writer in sequence.
//!
//! Generalizes an `app::{Configuration, Control, App}` triad:
//! `Configuration` here plays the same role (validated, immutable run
//! description), and `Simulation` plays `App`'s role (owns the live state
//! and the version banner) but is built from a `ParameterMap` rather than a
//! `serde_yaml` document. [`AnyRunState`] is an enum-of-variants dispatch
//! pattern, added to choose between the hydro and MHD field sets at
//! configuration time.

pub static DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");
pub static VERSION_AND_BUILD: &str = git_version::git_version!(prefix = concat!("v", env!("CARGO_PKG_VERSION"), " "), fallback = "unknown");

use ndarray::Array3;

use crate::boundary::{AxisBoundary, BoundaryCondition, SingleRankHalo};
use crate::config::ParameterMap;
use crate::cooling::{apply_cooling, CoolingFunction, NoCooling, PowerLawCooling};
use crate::error::{ConfigError, CoreError};
use crate::fields::FieldVector;
use crate::geometry::GridGeometry;
use crate::gravity::{apply_gravity_source, BoundaryFlag, GravityEnergyCoupling, PotentialSolver, ZeroPotential};
use crate::integrator::{Integrator, IntegratorConfig, Simple, VanLeer};
use crate::io::{CborSnapshotWriter, NullSnapshotWriter, SnapshotWriter};
use crate::mesh::Block;
use crate::physics::{Physics, PhysicsSystem, Primitive};
use crate::real::Real;
use crate::reconstruction::ReconstructionScheme;
use crate::riemann::RiemannScheme;
use crate::timestep::{timestep, GlobalReduce, SingleRankReduce};

#[cfg(feature = "mhd")]
use crate::physics::Mhd;
use crate::physics::Hydro;

/// One axis's boundary kind, as selected from configuration.
/// `Custom` is not reachable from a parameter file — it's only ever
/// constructed in code, so it has no entry here.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BoundaryKind {
    Periodic,
    Reflective,
    Outflow,
}

impl BoundaryKind {
    fn into_condition<S: PhysicsSystem>(self) -> BoundaryCondition<S> {
        match self {
            BoundaryKind::Periodic => BoundaryCondition::Periodic,
            BoundaryKind::Reflective => BoundaryCondition::Reflective,
            BoundaryKind::Outflow => BoundaryCondition::Outflow,
        }
    }
}

/// Which time integrator a run uses.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IntegratorKind {
    Simple,
    VanLeer,
}

/// Gravity source-term configuration. The Poisson solve
/// itself is out of scope (see [`crate::gravity`]'s docs), so a configured
/// run only ever exercises [`ZeroPotential`]; the knobs are still parsed so
/// a caller embedding this crate can supply a real [`PotentialSolver`] and
/// reuse the rest of the configuration.
#[derive(Clone, Copy, Debug)]
pub struct GravityConfig {
    pub enabled: bool,
    pub coupling: GravityEnergyCoupling,
    pub high_accuracy_gradient: bool,
}

/// Radiative cooling configuration.
#[derive(Clone, Debug)]
pub struct CoolingConfig {
    pub enabled: bool,
    pub power_law: Option<PowerLawCooling>,
}

/// A validated, immutable run description: everything
/// [`Simulation::from_parameters`] needs to build a [`Block`] and the
/// collaborators around it. Read once at startup and never mutated
/// afterward, matching a prior `Configuration` design.
#[derive(Clone, Debug)]
pub struct Configuration {
    pub mhd: bool,
    pub physics: Physics,
    pub geometry: GridGeometry,
    pub integrator_kind: IntegratorKind,
    pub integrator_config: IntegratorConfig,
    pub boundary: [BoundaryKind; 6],
    pub cfl_number: Real,
    pub max_dt: Option<Real>,
    pub final_time: Real,
    pub checkpoint_interval: Real,
    pub output_directory: String,
    pub gravity: GravityConfig,
    pub cooling: CoolingConfig,
    pub initial_interface_position: Real,
    pub initial_left: Vec<Real>,
    pub initial_right: Vec<Real>,
}

fn type_mismatch(key: &str, value: impl Into<String>, expected: &'static str) -> ConfigError {
    ConfigError::TypeMismatch { key: key.into(), value: value.into(), expected }
}

fn parse_reconstruction(s: &str) -> Result<ReconstructionScheme, ConfigError> {
    Ok(match s {
        "pcm" => ReconstructionScheme::Pcm,
        "plmp" => ReconstructionScheme::Plmp,
        "plmc" => ReconstructionScheme::Plmc,
        "ppmp" => ReconstructionScheme::Ppmp,
        "ppmc" => ReconstructionScheme::Ppmc,
        other => return Err(type_mismatch("integrator.reconstruction", other, "one of pcm, plmp, plmc, ppmp, ppmc")),
    })
}

fn parse_riemann(s: &str) -> Result<RiemannScheme, ConfigError> {
    Ok(match s {
        "exact" => RiemannScheme::Exact,
        "roe" => RiemannScheme::Roe,
        "hllc" => RiemannScheme::Hllc,
        #[cfg(feature = "mhd")]
        "hlld" => RiemannScheme::Hlld,
        other => return Err(type_mismatch("integrator.riemann", other, "one of exact, roe, hllc, hlld")),
    })
}

fn parse_integrator_kind(s: &str) -> Result<IntegratorKind, ConfigError> {
    Ok(match s {
        "simple" => IntegratorKind::Simple,
        "van_leer" => IntegratorKind::VanLeer,
        other => return Err(type_mismatch("integrator.scheme", other, "one of simple, van_leer")),
    })
}

fn parse_boundary_kind(key: &str, s: &str) -> Result<BoundaryKind, ConfigError> {
    Ok(match s {
        "periodic" => BoundaryKind::Periodic,
        "reflective" => BoundaryKind::Reflective,
        "outflow" => BoundaryKind::Outflow,
        other => return Err(type_mismatch(key, other, "one of periodic, reflective, outflow")),
    })
}

/// Read the universal `(density, vx, vy, vz, pressure, bx, by, bz)`
/// primitive component list from `{prefix}.*` keys. Hydro runs simply never
/// read the last three components back out; MHD runs do.
fn read_primitive_components(params: &ParameterMap, prefix: &str) -> Result<Vec<Real>, ConfigError> {
    let density = params.require_f64(&format!("{prefix}.density"))?;
    let vx = params.get_f64(&format!("{prefix}.velocity_x"), 0.0)?;
    let vy = params.get_f64(&format!("{prefix}.velocity_y"), 0.0)?;
    let vz = params.get_f64(&format!("{prefix}.velocity_z"), 0.0)?;
    let pressure = params.require_f64(&format!("{prefix}.pressure"))?;
    let bx = params.get_f64(&format!("{prefix}.bx"), 0.0)?;
    let by = params.get_f64(&format!("{prefix}.by"), 0.0)?;
    let bz = params.get_f64(&format!("{prefix}.bz"), 0.0)?;
    Ok([density, vx, vy, vz, pressure, bx, by, bz].into_iter().map(|v| v as Real).collect())
}

fn primitive_from_components<T: Primitive>(components: &[Real]) -> T {
    let mut p = T::zero();
    for (i, &c) in components.iter().enumerate().take(T::LEN) {
        p.set(i, c);
    }
    p
}

impl Configuration {
    pub fn from_parameters(params: &ParameterMap) -> Result<Self, ConfigError> {
        let mhd = match params.get_str("physics_system", "hydro").as_str() {
            "hydro" => false,
            "mhd" => true,
            other => return Err(type_mismatch("physics_system", other, "one of hydro, mhd")),
        };
        #[cfg(not(feature = "mhd"))]
        if mhd {
            return Err(type_mismatch("physics_system", "mhd", "hydro (this build was compiled without the mhd feature)"));
        }

        let physics = Physics {
            gamma: params.get_f64("physics.gamma", 1.4)? as Real,
            density_floor: params.get_f64("physics.density_floor", 1e-10)? as Real,
            pressure_floor: params.get_f64("physics.pressure_floor", 1e-12)? as Real,
            dual_energy: params.get_bool("physics.dual_energy", true)?,
            dual_energy_eta: params.get_f64("physics.dual_energy_eta", 1e-3)? as Real,
            mean_molecular_weight: params.get_f64("physics.mean_molecular_weight", 0.6)? as Real,
        };
        physics.validate().map_err(|e| type_mismatch("physics", e.to_string(), "a physically valid equation-of-state configuration"))?;

        let shape = [
            params.get_i64("mesh.nx", 64)? as usize,
            params.get_i64("mesh.ny", 1)? as usize,
            params.get_i64("mesh.nz", 1)? as usize,
        ];
        let extent = [
            params.get_f64("mesh.lx", 1.0)? as Real,
            params.get_f64("mesh.ly", 1.0)? as Real,
            params.get_f64("mesh.lz", 1.0)? as Real,
        ];
        let spacing = std::array::from_fn(|axis| extent[axis] / shape[axis].max(1) as Real);
        let origin = [
            params.get_f64("mesh.ox", 0.0)? as Real,
            params.get_f64("mesh.oy", 0.0)? as Real,
            params.get_f64("mesh.oz", 0.0)? as Real,
        ];
        let ghost_width = params.get_i64("mesh.ghost_width", 3)? as usize;
        let n_scalars = params.get_i64("mesh.n_scalars", 0)? as usize;
        let geometry = GridGeometry::new(shape, spacing, origin, ghost_width).with_scalars(n_scalars);
        geometry.validate().map_err(|e| type_mismatch("mesh", e.to_string(), "a valid mesh configuration"))?;

        let reconstruction = parse_reconstruction(&params.get_str("integrator.reconstruction", "plmc"))?;
        let riemann = parse_riemann(&params.get_str("integrator.riemann", "hllc"))?;
        if matches!(riemann, RiemannScheme::Roe | RiemannScheme::Exact | RiemannScheme::Hllc) && mhd {
            return Err(type_mismatch("integrator.riemann", "hydro-only scheme selected for an mhd run", "hlld"));
        }
        #[cfg(feature = "mhd")]
        if matches!(riemann, RiemannScheme::Hlld) && !mhd {
            return Err(type_mismatch("integrator.riemann", "hlld", "exact, roe, or hllc for a hydro run"));
        }
        let integrator_config = IntegratorConfig {
            reconstruction,
            riemann,
            limiter_theta: params.get_f64("integrator.limiter_theta", 1.5)? as Real,
            temperature_floor: params.get_f64("integrator.temperature_floor", 1.0)? as Real,
        };
        let integrator_kind = parse_integrator_kind(&params.get_str("integrator.scheme", "van_leer"))?;

        let boundary = [
            parse_boundary_kind("boundary.x_low", &params.get_str("boundary.x_low", "periodic"))?,
            parse_boundary_kind("boundary.x_high", &params.get_str("boundary.x_high", "periodic"))?,
            parse_boundary_kind("boundary.y_low", &params.get_str("boundary.y_low", "periodic"))?,
            parse_boundary_kind("boundary.y_high", &params.get_str("boundary.y_high", "periodic"))?,
            parse_boundary_kind("boundary.z_low", &params.get_str("boundary.z_low", "periodic"))?,
            parse_boundary_kind("boundary.z_high", &params.get_str("boundary.z_high", "periodic"))?,
        ];

        let cfl_number = params.get_f64("control.cfl_number", 0.4)? as Real;
        let max_dt_raw = params.get_f64("control.max_dt", -1.0)?;
        let max_dt = if max_dt_raw > 0.0 { Some(max_dt_raw as Real) } else { None };
        let final_time = params.get_f64("control.final_time", 0.2)? as Real;
        let checkpoint_interval = params.get_f64("control.checkpoint_interval", 0.05)? as Real;
        let output_directory = params.get_str("control.output_directory", ".");

        let gravity = GravityConfig {
            enabled: params.get_bool("gravity.enabled", false)?,
            coupling: match params.get_str("gravity.coupling", "work").as_str() {
                "work" => GravityEnergyCoupling::Work,
                "delta_kinetic_energy" => GravityEnergyCoupling::DeltaKineticEnergy,
                other => return Err(type_mismatch("gravity.coupling", other, "one of work, delta_kinetic_energy")),
            },
            high_accuracy_gradient: params.get_bool("gravity.high_accuracy_gradient", false)?,
        };

        let cooling_enabled = params.get_bool("cooling.enabled", false)?;
        let cooling = CoolingConfig {
            enabled: cooling_enabled,
            power_law: if cooling_enabled {
                Some(PowerLawCooling {
                    lambda_0: params.get_f64("cooling.lambda_0", 1e-23)? as Real,
                    density_0: params.get_f64("cooling.density_0", 1.0)? as Real,
                    temperature_0: params.get_f64("cooling.temperature_0", 1e4)? as Real,
                    density_exponent: params.get_f64("cooling.density_exponent", 2.0)? as Real,
                    temperature_exponent: params.get_f64("cooling.temperature_exponent", -0.5)? as Real,
                    floor_temperature: params.get_f64("cooling.floor_temperature", 10.0)? as Real,
                    mean_molecular_weight: physics.mean_molecular_weight,
                })
            } else {
                None
            },
        };

        let initial_interface_position = params.get_f64("initial.interface_position", 0.5)? as Real;
        let initial_left = read_primitive_components(params, "initial.left")?;
        let initial_right = read_primitive_components(params, "initial.right")?;

        Ok(Self {
            mhd,
            physics,
            geometry,
            integrator_kind,
            integrator_config,
            boundary,
            cfl_number,
            max_dt,
            final_time,
            checkpoint_interval,
            output_directory,
            gravity,
            cooling,
            initial_interface_position,
            initial_left,
            initial_right,
        })
    }

    fn halo<S: PhysicsSystem>(&self) -> SingleRankHalo<S> {
        SingleRankHalo {
            x: AxisBoundary { low: self.boundary[0].into_condition(), high: self.boundary[1].into_condition() },
            y: AxisBoundary { low: self.boundary[2].into_condition(), high: self.boundary[3].into_condition() },
            z: AxisBoundary { low: self.boundary[4].into_condition(), high: self.boundary[5].into_condition() },
        }
    }

    fn integrator<S: PhysicsSystem>(&self) -> Box<dyn Integrator<S>> {
        match self.integrator_kind {
            IntegratorKind::Simple => Box::new(Simple),
            IntegratorKind::VanLeer => Box::new(VanLeer),
        }
    }

    fn cooling_function(&self) -> Box<dyn CoolingFunction> {
        match &self.cooling.power_law {
            Some(curve) => Box::new(*curve),
            None => Box::new(NoCooling),
        }
    }

    fn writer<S: PhysicsSystem>(&self) -> Box<dyn SnapshotWriter<S>>
    where
        S::Conserved: serde::Serialize,
    {
        if self.checkpoint_interval > 0.0 {
            Box::new(CborSnapshotWriter::new(self.output_directory.clone()))
        } else {
            Box::new(NullSnapshotWriter)
        }
    }

    fn build_block<S: PhysicsSystem>(&self) -> Block<S> {
        let mut block = Block::<S>::new(self.geometry.clone());
        let interface = self.initial_interface_position;
        let left: S::Primitive = primitive_from_components(&self.initial_left);
        let right: S::Primitive = primitive_from_components(&self.initial_right);
        block.fill_interior(&self.physics, |center| if center[0] < interface { left } else { right });
        block
    }
}

/// One physics system's complete live state: the block, its halo exchange,
/// the chosen integrator, the source-term collaborators, and the
/// accumulated gravitational potential array.
struct RunState<S: PhysicsSystem> {
    block: Block<S>,
    halo: SingleRankHalo<S>,
    integrator: Box<dyn Integrator<S>>,
    potential: Box<dyn PotentialSolver>,
    cooling: Box<dyn CoolingFunction>,
    writer: Box<dyn SnapshotWriter<S>>,
    phi: Array3<Real>,
}

impl<S: PhysicsSystem> RunState<S>
where
    S::Conserved: serde::Serialize,
{
    fn new(config: &Configuration) -> Self {
        let block = config.build_block::<S>();
        let phi = Array3::zeros(block.geometry.padded_shape());
        Self {
            halo: config.halo(),
            integrator: config.integrator(),
            potential: Box::new(ZeroPotential),
            cooling: config.cooling_function(),
            writer: config.writer(),
            phi,
            block,
        }
    }
}

fn advance<S: PhysicsSystem>(state: &mut RunState<S>, config: &Configuration, time: Real, dt: Real) -> Result<(), CoreError> {
    state.integrator.step(&mut state.block, &config.physics, &config.integrator_config, &state.halo, time, dt)?;

    if config.gravity.enabled {
        let density = state.block.conserved.mapv(|u| crate::physics::Conserved::density(&u));
        let boundary_flags = [BoundaryFlag::Periodic; 6];
        state
            .potential
            .solve_potential(&density, &mut state.phi, &state.block.geometry, boundary_flags)
            .map_err(CoreError::Collaborator)?;
        apply_gravity_source(&mut state.block, &state.phi, &config.physics, dt, config.gravity.coupling, config.gravity.high_accuracy_gradient);
    }

    if config.cooling.enabled {
        apply_cooling(&mut state.block.conserved, &config.physics, state.cooling.as_ref(), dt);
    }

    Ok(())
}

fn current_timestep<S: PhysicsSystem>(state: &RunState<S>, config: &Configuration) -> Result<Real, CoreError> {
    let interior = [state.block.interior_range(0), state.block.interior_range(1), state.block.interior_range(2)];
    Ok(timestep::<S>(
        &state.block.conserved,
        interior,
        &state.block.geometry,
        &config.physics,
        config.cfl_number,
        config.max_dt,
        &SingleRankReduce as &dyn GlobalReduce,
    )?)
}

/// Dispatches between the hydro and MHD field sets chosen at configuration
/// time,
/// generalizing an `AnyHydro`/`AnyState` enum-of-variants precedent.
enum AnyRunState {
    Hydro(RunState<Hydro>),
    #[cfg(feature = "mhd")]
    Mhd(RunState<Mhd>),
}

impl AnyRunState {
    fn new(config: &Configuration) -> Self {
        #[cfg(feature = "mhd")]
        if config.mhd {
            return AnyRunState::Mhd(RunState::new(config));
        }
        AnyRunState::Hydro(RunState::new(config))
    }

    fn timestep(&self, config: &Configuration) -> Result<Real, CoreError> {
        match self {
            AnyRunState::Hydro(s) => current_timestep(s, config),
            #[cfg(feature = "mhd")]
            AnyRunState::Mhd(s) => current_timestep(s, config),
        }
    }

    fn advance(&mut self, config: &Configuration, time: Real, dt: Real) -> Result<(), CoreError> {
        match self {
            AnyRunState::Hydro(s) => advance(s, config, time, dt),
            #[cfg(feature = "mhd")]
            AnyRunState::Mhd(s) => advance(s, config, time, dt),
        }
    }

    fn write_snapshot(&mut self, step: u64, time: Real) -> Result<(), CoreError> {
        match self {
            AnyRunState::Hydro(s) => {
                let phi = active_phi(&s.phi);
                s.writer.write_snapshot(step, time, &s.block, phi).map_err(CoreError::Collaborator)
            }
            #[cfg(feature = "mhd")]
            AnyRunState::Mhd(s) => {
                let phi = active_phi(&s.phi);
                s.writer.write_snapshot(step, time, &s.block, phi).map_err(CoreError::Collaborator)
            }
        }
    }

    fn total_mass(&self) -> Real {
        match self {
            AnyRunState::Hydro(s) => crate::physics::Conserved::density(&s.block.sum_interior()),
            #[cfg(feature = "mhd")]
            AnyRunState::Mhd(s) => crate::physics::Conserved::density(&s.block.sum_interior()),
        }
    }
}

/// `None` until gravity has actually populated the potential array, so a
/// hydro-only run's checkpoints carry no meaningless all-zero field.
fn active_phi(phi: &Array3<Real>) -> Option<&Array3<Real>> {
    if phi.iter().any(|&v| v != 0.0) {
        Some(phi)
    } else {
        None
    }
}

/// The live driver: owns the single-writer step counter and
/// simulation time, and runs the main loop to completion or to the first
/// fatal error.
pub struct Simulation {
    state: AnyRunState,
    config: Configuration,
    step: u64,
    time: Real,
    next_checkpoint: Real,
}

impl Simulation {
    pub fn from_parameters(params: &ParameterMap) -> Result<Self, CoreError> {
        let config = Configuration::from_parameters(params)?;
        let state = AnyRunState::new(&config);
        Ok(Self { state, config, step: 0, time: 0.0, next_checkpoint: 0.0 })
    }

    /// Load a parameter file or preset name plus CLI overrides into a
    /// runnable `Simulation`, mirroring a prior
    /// `App::from_preset_or_file`.
    pub fn from_source(source: &str, overrides: &[String], strict: bool) -> anyhow::Result<Self> {
        let mut params = if let Some(text) = crate::presets::lookup(source) {
            ParameterMap::parse(source, text)?
        } else {
            let text = std::fs::read_to_string(source)?;
            ParameterMap::parse(source, &text)?
        };
        params = params.with_strict(strict);
        params.apply_overrides(overrides)?;
        let sim = Self::from_parameters(&params)?;
        params.warn_unused()?;
        Ok(sim)
    }

    /// Advance until `config.final_time`, writing checkpoints at
    /// `config.checkpoint_interval` and logging progress via `tracing`
    ///.
    pub fn run(&mut self) -> Result<(), CoreError> {
        tracing::info!(version = VERSION_AND_BUILD, final_time = self.config.final_time, "starting run");

        if self.config.checkpoint_interval > 0.0 {
            self.state.write_snapshot(self.step, self.time)?;
        }

        while self.time < self.config.final_time {
            let mut dt = self.state.timestep(&self.config)?;
            if self.time + dt > self.config.final_time {
                dt = self.config.final_time - self.time;
            }

            self.state.advance(&self.config, self.time, dt)?;
            self.time += dt;
            self.step += 1;

            tracing::debug!(step = self.step, time = self.time, dt, mass = self.state.total_mass(), "step complete");

            if self.config.checkpoint_interval > 0.0 && self.time >= self.next_checkpoint {
                self.state.write_snapshot(self.step, self.time)?;
                self.next_checkpoint += self.config.checkpoint_interval;
            }
        }

        tracing::info!(steps = self.step, time = self.time, "run complete");
        Ok(())
    }
}
