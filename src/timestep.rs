//! CFL timestep control: the per-cell signal speed reduction,
//! a global collaborator seam for multi-rank min-reduction, and the
//! `dt = CFL * min(dx / (|v| + c))` controller itself.

use ndarray::Array3;
use rayon::prelude::*;

use crate::error::NumericalError;
use crate::geometry::GridGeometry;
use crate::physics::{Physics, PhysicsSystem};
use crate::real::Real;

/// The cross-rank reduction collaborator: a multi-rank build
/// all-reduces the local minimum timestep to a global one. Generalized as
/// a trait so [`timestep`] doesn't care whether it's running on one rank
/// or many.
pub trait GlobalReduce {
    fn min_reduce(&self, local_min: Real) -> Real;
}

/// Single-rank default: the local minimum is already global.
#[derive(Clone, Copy, Debug, Default)]
pub struct SingleRankReduce;

impl GlobalReduce for SingleRankReduce {
    fn min_reduce(&self, local_min: Real) -> Real {
        local_min
    }
}

/// The largest stable timestep for one interior cell, given its signal
/// speed along each axis: `min_axis(dx_axis / (|v_axis| +
/// c))`.
fn cell_timestep<S: PhysicsSystem>(primitive: &S::Primitive, geometry: &GridGeometry, physics: &Physics) -> Real {
    use crate::physics::Primitive;
    let c = S::signal_speed(primitive, physics);
    let v = primitive.velocity();
    (0..3)
        .map(|axis| geometry.spacing[axis] / (v[axis].abs() + c))
        .fold(Real::INFINITY, Real::min)
}

/// The smallest stable per-cell timestep over the block's interior
///, reduced in parallel via rayon, matching
/// `Block::enforce_floors`'s use of `par_iter_mut` elsewhere in this
/// crate.
pub fn min_cell_timestep<S: PhysicsSystem>(
    conserved: &Array3<S::Conserved>,
    interior: [std::ops::Range<usize>; 3],
    geometry: &GridGeometry,
    physics: &Physics,
) -> Result<Real, NumericalError> {
    let [rx, ry, rz] = interior;
    let cells: Vec<[usize; 3]> =
        rx.flat_map(|i| ry.clone().flat_map(move |j| rz.clone().map(move |k| [i, j, k]))).collect();

    let local_min = cells
        .par_iter()
        .map(|&[i, j, k]| {
            let primitive = S::to_primitive(&conserved[[i, j, k]], physics);
            cell_timestep::<S>(&primitive, geometry, physics)
        })
        .reduce(|| Real::INFINITY, Real::min);

    if !local_min.is_finite() || local_min <= 0.0 {
        return Err(NumericalError::DegenerateTimestep { reason: "timestep reduction produced a non-positive or non-finite value" });
    }
    Ok(local_min)
}

/// The CFL-limited timestep for a full update step:
/// `cfl_number * global_min_cell_timestep`, clamped to `max_dt` if
/// configured.
pub fn timestep<S: PhysicsSystem>(
    conserved: &Array3<S::Conserved>,
    interior: [std::ops::Range<usize>; 3],
    geometry: &GridGeometry,
    physics: &Physics,
    cfl_number: Real,
    max_dt: Option<Real>,
    reduce: &dyn GlobalReduce,
) -> Result<Real, NumericalError> {
    let local_min = min_cell_timestep::<S>(conserved, interior, geometry, physics)?;
    let global_min = reduce.min_reduce(local_min);
    let dt = cfl_number * global_min;
    Ok(match max_dt {
        Some(max) => dt.min(max),
        None => dt,
    })
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::mesh::Block;
    use crate::physics::hydro::HydroPrimitive;
    use crate::physics::Hydro;

    fn physics() -> Physics {
        Physics { gamma: 1.4, density_floor: 1e-6, pressure_floor: 1e-8, dual_energy: false, dual_energy_eta: 1e-3, mean_molecular_weight: 0.6 }
    }

    #[test]
    fn uniform_state_gives_uniform_cfl_timestep() {
        let geometry = GridGeometry::new([8, 8, 8], [0.1, 0.1, 0.1], [0.0, 0.0, 0.0], 2);
        let mut block = Block::<Hydro>::new(geometry.clone());
        block.fill_interior(&physics(), |_| HydroPrimitive([1.0, 0.0, 0.0, 0.0, 1.0]));
        let interior = [block.interior_range(0), block.interior_range(1), block.interior_range(2)];
        let dt = timestep::<Hydro>(&block.conserved, interior, &geometry, &physics(), 0.4, None, &SingleRankReduce).unwrap();
        let c_s = (1.4f32 as Real * 1.0 / 1.0).sqrt();
        let expected = 0.4 * 0.1 / c_s;
        assert!((dt - expected).abs() < 1e-6);
    }

    #[test]
    fn max_dt_clamps_the_cfl_result() {
        let geometry = GridGeometry::new([4, 4, 4], [1.0, 1.0, 1.0], [0.0, 0.0, 0.0], 2);
        let mut block = Block::<Hydro>::new(geometry.clone());
        block.fill_interior(&physics(), |_| HydroPrimitive([1.0, 0.0, 0.0, 0.0, 0.01]));
        let interior = [block.interior_range(0), block.interior_range(1), block.interior_range(2)];
        let dt = timestep::<Hydro>(&block.conserved, interior, &geometry, &physics(), 0.9, Some(1e-3), &SingleRankReduce).unwrap();
        assert!((dt - 1e-3).abs() < 1e-12);
    }

    #[test]
    fn faster_flow_gives_a_smaller_timestep() {
        let geometry = GridGeometry::new([4, 4, 4], [1.0, 1.0, 1.0], [0.0, 0.0, 0.0], 2);
        let mut slow = Block::<Hydro>::new(geometry.clone());
        slow.fill_interior(&physics(), |_| HydroPrimitive([1.0, 0.0, 0.0, 0.0, 1.0]));
        let mut fast = Block::<Hydro>::new(geometry.clone());
        fast.fill_interior(&physics(), |_| HydroPrimitive([1.0, 10.0, 0.0, 0.0, 1.0]));

        let interior = [slow.interior_range(0), slow.interior_range(1), slow.interior_range(2)];
        let dt_slow = timestep::<Hydro>(&slow.conserved, interior.clone(), &geometry, &physics(), 0.4, None, &SingleRankReduce).unwrap();
        let dt_fast = timestep::<Hydro>(&fast.conserved, interior, &geometry, &physics(), 0.4, None, &SingleRankReduce).unwrap();
        assert!(dt_fast < dt_slow);
    }
}
