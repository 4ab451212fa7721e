//! Affine transform model and the geometric queries built on it.

mod matrix;
pub mod hit_testing;

pub use matrix::{Matrix, ScaleToFit};
