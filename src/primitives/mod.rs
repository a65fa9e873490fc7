//! Core compute primitives: refcounted buffers, strided layouts and matrices.
//!
//! These types provide the foundation for the network and optimizer modules.

mod buffer;
mod display;
mod layout;
mod matrix;
mod ops;
mod vector_ops;

pub use buffer::{Buffer, BufferProbe};
pub use layout::Layout;
pub use matrix::{Matrix, TransposeMode};

/// Element type of every matrix. `f32` unless the `f64` feature is enabled.
#[cfg(not(feature = "f64"))]
pub type Scalar = f32;

/// Element type of every matrix. `f32` unless the `f64` feature is enabled.
#[cfg(feature = "f64")]
pub type Scalar = f64;
