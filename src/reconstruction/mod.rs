//! The reconstruction family: builds left/right interface
//! primitive states from cell-centered primitives along one axis.
//!
//! A "capability interface" (`reconstruct(W[], axis) -> (W_L[], W_R[])`,
//! chosen at startup) dispatched the same way physics is dispatched through
//! a `PhysicsSystem` trait: one small trait,
//! several zero-sized implementors, picked once from configuration into a
//! `Box<dyn Reconstructor<P>>`.

pub mod characteristic;
pub mod pcm;
pub mod plm;
pub mod ppm;

use crate::fields::FieldVector;
use crate::physics::Primitive;

/// One member of the reconstruction family. Operates per-cell: given a
/// window of `2 * stencil_radius() + 1` cells centered on the cell being
/// reconstructed, returns the extrapolated state at that cell's lower
/// (`face_minus`) and upper (`face_plus`) face.
///
/// Interface states are assembled by the caller: the left state at
/// interface `i+1/2` is cell `i`'s `face_plus`, the right state is cell
/// `i+1`'s `face_minus`.
pub trait Reconstructor<T: FieldVector>: Send + Sync {
    /// Cells needed on each side of the cell being reconstructed: 0 for
    /// PCM, 1 for PLM, 2 for PPM.
    fn stencil_radius(&self) -> usize;

    fn reconstruct_cell(&self, window: &[T]) -> (T, T);
}

/// Named reconstruction schemes, selected from configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReconstructionScheme {
    Pcm,
    Plmp,
    Plmc,
    Ppmp,
    Ppmc,
}

impl ReconstructionScheme {
    pub fn stencil_radius(self) -> usize {
        match self {
            ReconstructionScheme::Pcm => 0,
            ReconstructionScheme::Plmp | ReconstructionScheme::Plmc => 1,
            ReconstructionScheme::Ppmp | ReconstructionScheme::Ppmc => 2,
        }
    }
}

/// Reconstruct every fully-stenciled interface along a 1-D pencil of
/// primitive cell states, falling back to PCM at any face where the
/// reconstructed state is unphysical: if either face fails, it falls
/// back to PCM for that face.
///
/// `theta` is the PLM/PPM limiter steepness. Returns `(left, right)`
/// interface-state arrays, one entry per interface between two fully
/// stenciled cells (i.e. length `cells.len() - 2 * radius - 1`).
pub fn reconstruct_pencil<P: Primitive>(
    scheme: ReconstructionScheme,
    theta: crate::real::Real,
    gamma: crate::real::Real,
    cells: &[P],
) -> (Vec<P>, Vec<P>) {
    let radius = effective_radius(scheme, cells.len());
    let pcm = pcm::Pcm;
    let faces: Vec<(P, P)> = (radius..cells.len() - radius)
        .map(|i| {
            let window = &cells[i - radius..=i + radius];
            reconstruct_with_scheme(scheme, theta, gamma, window)
        })
        .collect();

    let n = faces.len();
    let mut left = Vec::with_capacity(n.saturating_sub(1));
    let mut right = Vec::with_capacity(n.saturating_sub(1));

    for k in 0..n.saturating_sub(1) {
        let mut l = faces[k].1;
        let mut r = faces[k + 1].0;
        if !l.is_physical() || !r.is_physical() {
            let i = k + radius;
            let (pl, _) = pcm.reconstruct_cell(&cells[i..=i]);
            let (_, pr) = pcm.reconstruct_cell(&cells[i + 1..=i + 1]);
            l = pl;
            r = pr;
        }
        left.push(l);
        right.push(r);
    }
    (left, right)
}

fn reconstruct_with_scheme<T: Primitive>(
    scheme: ReconstructionScheme,
    theta: crate::real::Real,
    gamma: crate::real::Real,
    window: &[T],
) -> (T, T) {
    match scheme {
        ReconstructionScheme::Pcm => pcm::Pcm.reconstruct_cell(window),
        ReconstructionScheme::Plmp => plm::Plmp { theta }.reconstruct_cell(window),
        ReconstructionScheme::Plmc => plm::Plmc { theta, gamma }.reconstruct_cell(window),
        ReconstructionScheme::Ppmp => ppm::Ppmp { theta }.reconstruct_cell(window),
        ReconstructionScheme::Ppmc => ppm::Ppmc { theta, gamma }.reconstruct_cell(window),
    }
}

/// The largest scheme whose full stencil fits in `len` cells: edge cells
/// without a full stencil use the largest-available lower-order scheme
/// (PLM -> PCM).
fn effective_radius(scheme: ReconstructionScheme, len: usize) -> usize {
    let mut radius = scheme.stencil_radius();
    while len < 2 * radius + 1 && radius > 0 {
        radius -= 1;
    }
    radius
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::physics::hydro::HydroPrimitive;

    fn ramp() -> Vec<HydroPrimitive> {
        (0..9)
            .map(|i| {
                let i = i as crate::real::Real;
                HydroPrimitive([1.0 + 0.1 * i, 0.0, 0.0, 0.0, 1.0 + 0.05 * i])
            })
            .collect()
    }

    #[test]
    fn pcm_interfaces_equal_adjacent_cells() {
        let cells = ramp();
        let (l, r) = reconstruct_pencil(ReconstructionScheme::Pcm, 1.5, 1.4, &cells);
        assert_eq!(l.len(), cells.len() - 1);
        for (k, (left, right)) in l.iter().zip(r.iter()).enumerate() {
            assert_eq!(*left, cells[k]);
            assert_eq!(*right, cells[k + 1]);
        }
    }

    #[test]
    fn plm_stays_within_cell_bounds_on_monotone_ramp() {
        let cells = ramp();
        let (l, r) = reconstruct_pencil(ReconstructionScheme::Plmp, 1.5, 1.4, &cells);
        for (k, (left, right)) in l.iter().zip(r.iter()).enumerate() {
            let i = k + 1; // radius 1
            let lo = cells[i].density().min(cells[i + 1].density());
            let hi = cells[i].density().max(cells[i + 1].density());
            assert!(left.density() >= lo - 1e-12 && left.density() <= hi + 1e-12);
            assert!(right.density() >= lo - 1e-12 && right.density() <= hi + 1e-12);
        }
    }
}
