//! Numerical building blocks shared by the masking functions.

pub mod rounded;
pub mod sphere;

pub use rounded::Rounded;
