//! `Block<S>`: the top-level owner of a sub-block's persistent arrays
//! — the conserved field array and the
//! passive-scalar side array, together with the block's [`GridGeometry`].
//!
//! Generalizes a `BlockState`/`BlockGeometry` pair (`state.rs`,
//! `mesh.rs`), which cached 2-D spherical-polar cell centers/volumes/face
//! areas for a single hydrodynamics choice, to a 3-D Cartesian block
//! generic over any [`crate::physics::PhysicsSystem`].

use ndarray::{Array3, Array4, Zip};
use rayon::prelude::*;

use crate::fields::FieldVector;
use crate::geometry::GridGeometry;
use crate::physics::{Physics, PhysicsSystem};
use crate::real::Real;

/// A uniform Cartesian sub-block of conserved cell state, owned by exactly
/// one rank. Passive scalars are carried as a side array
/// (`(n_scalars, padded_x, padded_y, padded_z)`), exactly as a prior design
/// carries `scalar_mass` alongside `conserved` rather than folding it into
/// the conserved struct (see the Open Question decision in DESIGN.md).
#[derive(Clone)]
pub struct Block<S: PhysicsSystem> {
    pub conserved: Array3<S::Conserved>,
    pub scalars: Array4<Real>,
    pub geometry: GridGeometry,
}

impl<S: PhysicsSystem> Block<S> {
    /// An all-zero block of the geometry's padded shape. Ghost and interior
    /// cells alike start at `S::Conserved::zero()`; callers fill interior
    /// cells via [`Block::fill_interior`] and ghost cells via a
    /// [`crate::boundary::HaloExchange`] before the first reconstruction
    /// pass.
    pub fn new(geometry: GridGeometry) -> Self {
        let [nx, ny, nz] = geometry.padded_shape();
        let conserved = Array3::from_elem((nx, ny, nz), S::Conserved::zero());
        let scalars = Array4::zeros((geometry.n_scalars, nx, ny, nz));
        Self { conserved, scalars, geometry }
    }

    pub fn ghost_width(&self) -> usize {
        self.geometry.ghost_width
    }

    /// Interior cell-index bounds along one axis, in padded-array
    /// coordinates: `[ghost_width, ghost_width + shape[axis])`.
    pub fn interior_range(&self, axis: usize) -> std::ops::Range<usize> {
        let g = self.ghost_width();
        g..g + self.geometry.shape[axis]
    }

    /// Fill interior cells (ghost cells untouched) from a primitive-state
    /// function of cell-center coordinates.
    pub fn fill_interior(&mut self, physics: &Physics, f: impl Fn([Real; 3]) -> S::Primitive) {
        let g = self.ghost_width();
        let [nx, ny, nz] = self.geometry.shape;
        for i in 0..nx {
            for j in 0..ny {
                for k in 0..nz {
                    let center = self.geometry.cell_center(i, j, k);
                    let primitive = f(center);
                    self.conserved[[i + g, j + g, k + g]] = S::from_primitive(&primitive, physics);
                }
            }
        }
    }

    /// Cell-centered primitive state over the full padded array.
    pub fn primitives(&self, physics: &Physics) -> Array3<S::Primitive> {
        self.conserved.mapv(|u| S::to_primitive(&u, physics))
    }

    /// Enforce density/pressure floors on every cell, the per-cell loop
    /// run data-parallel via `rayon`.
    pub fn enforce_floors(&mut self, physics: &Physics, temperature_floor: Real) {
        self.conserved.as_slice_mut().expect("conserved array must be contiguous").par_iter_mut().for_each(|u| {
            S::enforce_floors(u, physics, temperature_floor);
        });
    }

    /// Componentwise sum of the conserved state over interior cells only
    /// (ghost cells duplicate interior state under periodic boundaries
    /// and must not be double-counted).
    pub fn sum_interior(&self) -> S::Conserved {
        let (rx, ry, rz) = (self.interior_range(0), self.interior_range(1), self.interior_range(2));
        let mut total = S::Conserved::zero();
        for i in rx {
            for j in ry.clone() {
                for k in rz.clone() {
                    total = total.add(&self.conserved[[i, j, k]]);
                }
            }
        }
        total
    }

    /// First interior cell index with a non-finite conserved component, if
    /// any.
    pub fn first_non_finite(&self) -> Option<[usize; 3]> {
        let (rx, ry, rz) = (self.interior_range(0), self.interior_range(1), self.interior_range(2));
        for i in rx {
            for j in ry.clone() {
                for k in rz.clone() {
                    let u = &self.conserved[[i, j, k]];
                    if (0..S::Conserved::LEN).any(|c| !u.get(c).is_finite()) {
                        return Some([i, j, k]);
                    }
                }
            }
        }
        None
    }

    /// Apply a per-cell conserved-state delta (e.g. a flux divergence times
    /// `-dt`, or a gravitational source term) in place, over interior cells
    /// only.
    pub fn add_interior(&mut self, delta: &Array3<S::Conserved>) {
        let (rx, ry, rz) = (self.interior_range(0), self.interior_range(1), self.interior_range(2));
        Zip::from(self.conserved.slice_mut(ndarray::s![rx, ry, rz])).and(delta.view()).for_each(|u, d| {
            *u = u.add(d);
        });
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::physics::hydro::{HydroConserved, HydroPrimitive};
    use crate::physics::{Conserved, Hydro};

    fn physics() -> Physics {
        Physics { gamma: 1.4, density_floor: 1e-6, pressure_floor: 1e-8, dual_energy: false, dual_energy_eta: 1e-3, mean_molecular_weight: 0.6 }
    }

    #[test]
    fn fill_interior_leaves_ghosts_at_zero() {
        let geometry = GridGeometry::new([4, 1, 1], [0.25, 1.0, 1.0], [0.0, 0.0, 0.0], 2);
        let mut block = Block::<Hydro>::new(geometry);
        block.fill_interior(&physics(), |_| HydroPrimitive([1.0, 0.0, 0.0, 0.0, 1.0]));
        assert_eq!(block.conserved[[0, 0, 0]].density(), 0.0);
        assert!((block.conserved[[2, 0, 0]].density() - 1.0).abs() < 1e-10);
    }

    #[test]
    fn sum_interior_excludes_ghosts() {
        let geometry = GridGeometry::new([2, 1, 1], [0.5, 1.0, 1.0], [0.0, 0.0, 0.0], 2);
        let mut block = Block::<Hydro>::new(geometry);
        block.fill_interior(&physics(), |_| HydroPrimitive([1.0, 0.0, 0.0, 0.0, 1.0]));
        // Pollute a ghost cell so the sum would be wrong if it were included.
        block.conserved[[0, 0, 0]] = HydroConserved::new(1000.0, [0.0, 0.0, 0.0], 0.0, 0.0);
        let total = block.sum_interior();
        assert!((total.density() - 2.0).abs() < 1e-10);
    }
}
