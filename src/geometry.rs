//! Cardinal sweep directions and the mesh's cell-size/shape bookkeeping.
//!
//! Generalizes a `physics::Direction` (`Polar` / `Radial`) enum to the
//! three Cartesian axes. Riemann solvers and reconstruction never branch on
//! `Direction` themselves; they ask it to permute a component triple so that
//! "x" is always the face normal, then permute the flux back.

use crate::real::Real;

/// One of the three sweep directions of a Cartesian block.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Direction {
    X,
    Y,
    Z,
}

impl Direction {
    pub const ALL: [Direction; 3] = [Direction::X, Direction::Y, Direction::Z];

    /// Index of this axis into a `(x, y, z)`-ordered triple.
    pub fn index(self) -> usize {
        match self {
            Direction::X => 0,
            Direction::Y => 1,
            Direction::Z => 2,
        }
    }

    /// Permute `(x, y, z)` so that the component along `self` comes first.
    /// Used to rotate velocity/magnetic-field triples into a solver's local
    /// frame, where "x" is always the interface normal.
    pub fn permute<T: Copy>(self, v: [T; 3]) -> [T; 3] {
        match self {
            Direction::X => [v[0], v[1], v[2]],
            Direction::Y => [v[1], v[2], v[0]],
            Direction::Z => [v[2], v[0], v[1]],
        }
    }

    /// Inverse of [`Direction::permute`]: takes a local-frame triple
    /// (normal, tangent1, tangent2) back to `(x, y, z)` order.
    pub fn unpermute<T: Copy>(self, v: [T; 3]) -> [T; 3] {
        match self {
            Direction::X => [v[0], v[1], v[2]],
            Direction::Y => [v[2], v[0], v[1]],
            Direction::Z => [v[1], v[2], v[0]],
        }
    }
}

/// Cached geometric description of a uniform Cartesian sub-block, including
/// its ghost margin. Cell size is uniform per axis but may differ between
/// axes.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct GridGeometry {
    /// Interior cell counts along x, y, z (ghost cells are not included).
    pub shape: [usize; 3],

    /// Cell size along x, y, z.
    pub spacing: [Real; 3],

    /// Coordinate of the lower corner of the interior (non-ghost) domain.
    pub origin: [Real; 3],

    /// Ghost cells per side. Computing the flux at an interior cell's
    /// boundary-facing interface needs one more ghost cell than the
    /// reconstruction stencil's own half-width, since that interface's two
    /// flanking reconstructions each reach `radius` cells further out
    ///: 2 for PCM/PLM, 3 for PPM.
    pub ghost_width: usize,

    /// Number of passive scalar fields carried alongside the conserved
    /// state. Zero if the setup carries no scalars.
    pub n_scalars: usize,
}

impl GridGeometry {
    pub fn new(shape: [usize; 3], spacing: [Real; 3], origin: [Real; 3], ghost_width: usize) -> Self {
        Self { shape, spacing, origin, ghost_width, n_scalars: 0 }
    }

    pub fn with_scalars(mut self, n_scalars: usize) -> Self {
        self.n_scalars = n_scalars;
        self
    }

    /// Total shape, including ghost cells on both sides of each axis.
    pub fn padded_shape(&self) -> [usize; 3] {
        let g = self.ghost_width;
        [self.shape[0] + 2 * g, self.shape[1] + 2 * g, self.shape[2] + 2 * g]
    }

    pub fn spacing(&self, direction: Direction) -> Real {
        self.spacing[direction.index()]
    }

    /// Cell-center coordinate of interior cell `(i, j, k)` (zero-based,
    /// ghost cells excluded from the indexing).
    pub fn cell_center(&self, i: usize, j: usize, k: usize) -> [Real; 3] {
        [
            self.origin[0] + (i as Real + 0.5) * self.spacing[0],
            self.origin[1] + (j as Real + 0.5) * self.spacing[1],
            self.origin[2] + (k as Real + 0.5) * self.spacing[2],
        ]
    }

    /// Cell-center coordinate of a cell given in padded-array indices
    /// (ghost cells included, so indices may index "before" the interior
    /// origin once the ghost margin is subtracted). Used by boundary/
    /// gravity code that must evaluate an analytic function at a ghost
    /// cell's physical location.
    pub fn cell_center_padded(&self, ip: usize, jp: usize, kp: usize) -> [Real; 3] {
        let g = self.ghost_width as isize;
        let signed = |p: usize| p as isize - g;
        [
            self.origin[0] + (signed(ip) as Real + 0.5) * self.spacing[0],
            self.origin[1] + (signed(jp) as Real + 0.5) * self.spacing[1],
            self.origin[2] + (signed(kp) as Real + 0.5) * self.spacing[2],
        ]
    }

    pub fn smallest_spacing(&self) -> Real {
        self.spacing[0].min(self.spacing[1]).min(self.spacing[2])
    }

    pub fn cell_volume(&self) -> Real {
        self.spacing[0] * self.spacing[1] * self.spacing[2]
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.shape.iter().any(|&n| n == 0) {
            anyhow::bail!("grid shape components must be > 0")
        }
        if self.spacing.iter().any(|&h| h <= 0.0) {
            anyhow::bail!("grid spacing components must be > 0.0")
        }
        if self.ghost_width < 3 {
            anyhow::bail!("ghost_width must be >= 3 to support PPM reconstruction at interior boundary interfaces")
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn permute_then_unpermute_is_identity() {
        let v = [1, 2, 3];
        for d in Direction::ALL {
            assert_eq!(d.unpermute(d.permute(v)), v);
        }
    }

    #[test]
    fn x_permute_is_identity() {
        assert_eq!(Direction::X.permute([1, 2, 3]), [1, 2, 3]);
    }
}
