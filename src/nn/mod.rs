//! Feed-forward neural networks built on [`crate::primitives::Matrix`].
//!
//! - [`Network`]: fully connected sigmoid layers, finite-difference gradients
//! - [`Trainer`] and [`TrainConfig`]: the descent loop and its hyperparameters
//! - [`functional`]: stateless activations
//!
//! # Example
//!
//! ```
//! use stratamx::nn::{Network, TrainConfig, Trainer};
//! use stratamx::primitives::Matrix;
//!
//! let ti = Matrix::from_slice(4, 2, &[0.0, 0.0, 0.0, 1.0, 1.0, 0.0, 1.0, 1.0]).expect("4x2");
//! let to = Matrix::from_slice(4, 1, &[0.0, 1.0, 1.0, 1.0]).expect("4x1");
//!
//! let mut nn = Network::new(&[2, 1]).expect("valid architecture");
//! let trainer = Trainer::new(TrainConfig::default().with_epochs(100).with_seed(1));
//! let report = trainer.fit(&mut nn, &ti, &to).expect("data fits the network");
//! assert!(report.final_cost < report.initial_cost);
//! ```

pub mod functional;
mod network;
mod train;

pub use network::Network;
pub use train::{TrainConfig, Trainer, TrainingReport};
