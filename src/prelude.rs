//! Convenience re-exports for common usage.
//!
//! # Usage
//!
//! ```
//! use stratamx::prelude::*;
//! ```

pub use crate::data::{load_csv, parse_csv};
pub use crate::error::MatrixError;
pub use crate::nn::{Network, TrainConfig, Trainer, TrainingReport};
pub use crate::optim::GradientDescent;
pub use crate::primitives::{Layout, Matrix, Scalar, TransposeMode};
