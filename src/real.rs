//! The scalar element type shared by every conserved/primitive field.
//!
//! Built once at compile time, matching the original code's `PRECISION`
//! build macro: enable the `single-precision` feature to store cells as
//! `f32`, otherwise `f64` is used.

#[cfg(feature = "single-precision")]
pub type Real = f32;

#[cfg(not(feature = "single-precision"))]
pub type Real = f64;

#[cfg(feature = "single-precision")]
pub const EPSILON: Real = f32::EPSILON;

#[cfg(not(feature = "single-precision"))]
pub const EPSILON: Real = f64::EPSILON;
