//! The ghost-cell / boundary model the core consumes: before
//! each reconstruction pass, ghost cells must carry either a neighbor's
//! interior copy (periodic/MPI), a reflected state, a transmissive copy
//! (outflow), or a user-supplied analytic state (custom).
//!
//! The real MPI halo exchange (posting nonblocking sends/receives across
//! ranks) is an external collaborator and is not implemented here.
//! [`SingleRankHalo`] is the concrete single-rank fill this crate supplies
//! so test scenarios can actually run — supplemented, per DESIGN.md, since
//! without it no scenario executes.

use ndarray::Axis;

use crate::error::CollaboratorError;
use crate::mesh::Block;
use crate::physics::{Physics, PhysicsSystem};
use crate::real::Real;

/// One face's fill rule.
pub enum BoundaryCondition<S: PhysicsSystem> {
    /// Ghost cells copy the opposite face's interior cells (used both for
    /// a truly periodic domain and, conceptually, as the local half of an
    /// MPI halo exchange between neighboring ranks).
    Periodic,
    /// Ghost cells mirror the adjacent interior cells with the
    /// face-normal velocity and magnetic-field components negated.
    Reflective,
    /// Ghost cells copy the adjacent boundary-most interior cell
    /// (zero-gradient / transmissive).
    Outflow,
    /// Ghost cells are set from a user-supplied analytic primitive state,
    /// evaluated at the ghost cell's physical coordinate and the current
    /// simulation time.
    Custom(Box<dyn Fn([Real; 3], Real) -> S::Primitive + Send + Sync>),
}

/// Low/high face condition pair for one axis.
pub struct AxisBoundary<S: PhysicsSystem> {
    pub low: BoundaryCondition<S>,
    pub high: BoundaryCondition<S>,
}

impl<S: PhysicsSystem> AxisBoundary<S> {
    pub fn periodic() -> Self {
        Self { low: BoundaryCondition::Periodic, high: BoundaryCondition::Periodic }
    }
    pub fn reflective() -> Self {
        Self { low: BoundaryCondition::Reflective, high: BoundaryCondition::Reflective }
    }
    pub fn outflow() -> Self {
        Self { low: BoundaryCondition::Outflow, high: BoundaryCondition::Outflow }
    }
}

/// The halo-exchange collaborator interface: `fill_ghosts(U,
/// ghost_width)`, generalized to a trait so a real MPI implementation can
/// be swapped in without the integrator changing.
pub trait HaloExchange<S: PhysicsSystem> {
    fn fill_ghosts(&self, block: &mut Block<S>, physics: &Physics, time: Real) -> Result<(), CollaboratorError>;
}

/// The single-rank default: applies each axis's [`AxisBoundary`] directly
/// to the block's own interior cells. Sufficient for periodic/reflective/
/// outflow/custom single-block runs; a multi-rank build replaces this with
/// an implementation that posts sends/receives to neighboring ranks for
/// `Periodic` faces instead of copying locally.
pub struct SingleRankHalo<S: PhysicsSystem> {
    pub x: AxisBoundary<S>,
    pub y: AxisBoundary<S>,
    pub z: AxisBoundary<S>,
}

impl<S: PhysicsSystem> SingleRankHalo<S> {
    pub fn periodic() -> Self {
        Self { x: AxisBoundary::periodic(), y: AxisBoundary::periodic(), z: AxisBoundary::periodic() }
    }
}

impl<S: PhysicsSystem> HaloExchange<S> for SingleRankHalo<S> {
    fn fill_ghosts(&self, block: &mut Block<S>, physics: &Physics, time: Real) -> Result<(), CollaboratorError> {
        for (axis, boundary) in [0, 1, 2].into_iter().zip([&self.x, &self.y, &self.z]) {
            fill_axis(block, physics, time, axis, boundary)?;
        }
        Ok(())
    }
}

fn fill_axis<S: PhysicsSystem>(
    block: &mut Block<S>,
    physics: &Physics,
    time: Real,
    axis: usize,
    boundary: &AxisBoundary<S>,
) -> Result<(), CollaboratorError> {
    let g = block.ghost_width();
    let n = block.geometry.shape[axis];

    for depth in 1..=g {
        let low_dest = g - depth;
        let high_dest = g + n - 1 + depth;

        fill_face(block, physics, time, axis, low_dest, &boundary.low, FaceSource::Low { depth, g, n })?;
        fill_face(block, physics, time, axis, high_dest, &boundary.high, FaceSource::High { depth, g, n })?;
    }
    Ok(())
}

enum FaceSource {
    Low { depth: usize, g: usize, n: usize },
    High { depth: usize, g: usize, n: usize },
}

fn fill_face<S: PhysicsSystem>(
    block: &mut Block<S>,
    physics: &Physics,
    time: Real,
    axis: usize,
    dest: usize,
    condition: &BoundaryCondition<S>,
    source: FaceSource,
) -> Result<(), CollaboratorError> {
    match condition {
        BoundaryCondition::Periodic => {
            let src = match source {
                FaceSource::Low { depth, g, n } => g + n - depth,
                FaceSource::High { depth, g, .. } => g + depth - 1,
            };
            copy_plane::<S>(block, axis, dest, src, false);
        }
        BoundaryCondition::Reflective => {
            let src = match source {
                FaceSource::Low { depth, g, .. } => g + depth - 1,
                FaceSource::High { depth, g, n } => g + n - depth,
            };
            copy_plane::<S>(block, axis, dest, src, true);
        }
        BoundaryCondition::Outflow => {
            let src = match source {
                FaceSource::Low { g, .. } => g,
                FaceSource::High { g, n, .. } => g + n - 1,
            };
            copy_plane::<S>(block, axis, dest, src, false);
        }
        BoundaryCondition::Custom(f) => {
            fill_custom_plane(block, physics, time, axis, dest, f);
        }
    }
    Ok(())
}

/// Copy the entire transverse plane at `src` to `dest` along `axis`,
/// optionally negating the axis-normal velocity/field components
/// (reflective fill). Sweeping the full padded transverse extent (not
/// just the interior) means corner ghost cells get the right value once
/// all three axes have been filled in turn, matching how a prior
/// own multi-axis ghost fills compose.
fn copy_plane<S: PhysicsSystem>(block: &mut Block<S>, axis: usize, dest: usize, src: usize, reflect: bool) {
    let plane = block.conserved.index_axis(Axis(axis), src).to_owned();
    block.conserved.index_axis_mut(Axis(axis), dest).assign(&plane);
    if reflect {
        block.conserved.index_axis_mut(Axis(axis), dest).iter_mut().for_each(|u| S::reflect(u, axis));
    }

    // Passive scalars live one axis over (index 0 is the scalar channel).
    let scalar_plane = block.scalars.index_axis(Axis(axis + 1), src).to_owned();
    block.scalars.index_axis_mut(Axis(axis + 1), dest).assign(&scalar_plane);
}

fn fill_custom_plane<S: PhysicsSystem>(
    block: &mut Block<S>,
    physics: &Physics,
    time: Real,
    axis: usize,
    dest: usize,
    f: &(dyn Fn([Real; 3], Real) -> S::Primitive + Send + Sync),
) {
    let shape = block.conserved.shape().to_vec();
    let (n0, n1) = match axis {
        0 => (shape[1], shape[2]),
        1 => (shape[0], shape[2]),
        _ => (shape[0], shape[1]),
    };
    for a in 0..n0 {
        for b in 0..n1 {
            let idx = match axis {
                0 => [dest, a, b],
                1 => [a, dest, b],
                _ => [a, b, dest],
            };
            let coordinate = block.geometry.cell_center_padded(idx[0], idx[1], idx[2]);
            let primitive = f(coordinate, time);
            block.conserved[idx] = S::from_primitive(&primitive, physics);
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::geometry::GridGeometry;
    use crate::physics::hydro::HydroPrimitive;
    use crate::physics::{Conserved, Hydro};

    fn physics() -> Physics {
        Physics { gamma: 1.4, density_floor: 1e-6, pressure_floor: 1e-8, dual_energy: false, dual_energy_eta: 1e-3, mean_molecular_weight: 0.6 }
    }

    fn ramp_block() -> Block<Hydro> {
        let geometry = GridGeometry::new([4, 1, 1], [0.25, 1.0, 1.0], [0.0, 0.0, 0.0], 2);
        let mut block = Block::<Hydro>::new(geometry);
        block.fill_interior(&physics(), |x| HydroPrimitive([1.0 + x[0], 0.1, 0.0, 0.0, 1.0]));
        block
    }

    #[test]
    fn periodic_ghosts_wrap_around() {
        let mut block = ramp_block();
        let halo = SingleRankHalo::<Hydro>::periodic();
        halo.fill_ghosts(&mut block, &physics(), 0.0).unwrap();
        // Low ghost cells (indices 0, 1) should equal the two rightmost
        // interior cells (indices 4, 5) given ghost_width = 2.
        assert!((block.conserved[[1, 0, 0]].density() - block.conserved[[5, 0, 0]].density()).abs() < 1e-12);
        assert!((block.conserved[[0, 0, 0]].density() - block.conserved[[4, 0, 0]].density()).abs() < 1e-12);
    }

    #[test]
    fn reflective_ghosts_flip_normal_momentum() {
        let mut block = ramp_block();
        let halo = SingleRankHalo { x: AxisBoundary::reflective(), y: AxisBoundary::periodic(), z: AxisBoundary::periodic() };
        halo.fill_ghosts(&mut block, &physics(), 0.0).unwrap();
        let interior_momentum = block.conserved[[2, 0, 0]].momentum()[0];
        let ghost_momentum = block.conserved[[1, 0, 0]].momentum()[0];
        assert!((interior_momentum + ghost_momentum).abs() < 1e-12);
    }

    #[test]
    fn outflow_ghosts_repeat_boundary_cell() {
        let mut block = ramp_block();
        let halo = SingleRankHalo { x: AxisBoundary::outflow(), y: AxisBoundary::periodic(), z: AxisBoundary::periodic() };
        halo.fill_ghosts(&mut block, &physics(), 0.0).unwrap();
        let boundary_density = block.conserved[[2, 0, 0]].density();
        assert!((block.conserved[[0, 0, 0]].density() - boundary_density).abs() < 1e-12);
        assert!((block.conserved[[1, 0, 0]].density() - boundary_density).abs() < 1e-12);
    }
}
