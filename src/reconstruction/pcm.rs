//! Piecewise constant (first order): the interface state equals the
//! adjacent cell state.

use super::Reconstructor;
use crate::fields::FieldVector;

#[derive(Clone, Copy, Debug)]
pub struct Pcm;

impl<T: FieldVector> Reconstructor<T> for Pcm {
    fn stencil_radius(&self) -> usize {
        0
    }

    fn reconstruct_cell(&self, window: &[T]) -> (T, T) {
        let cell = window[0];
        (cell, cell)
    }
}
