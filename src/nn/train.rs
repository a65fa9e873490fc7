//! Training loop configuration and driver.

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::network::Network;
use crate::error::{MatrixError, Result};
use crate::primitives::{Matrix, Scalar};

/// Hyperparameters for finite-difference training.
///
/// Missing fields take their defaults when deserialized, so a JSON document
/// only needs to name what it changes.
///
/// # Example
///
/// ```
/// use stratamx::nn::TrainConfig;
///
/// let config = TrainConfig::from_json(r#"{"epochs": 500, "seed": 7}"#).expect("valid config");
/// assert_eq!(config.epochs, 500);
/// assert_eq!(config.seed, Some(7));
/// assert!((config.learning_rate - 1.0).abs() < 1e-6);
///
/// let config = TrainConfig::default().with_epochs(200).with_learning_rate(0.5);
/// assert_eq!(config.epochs, 200);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainConfig {
    /// Number of descent steps
    pub epochs: usize,
    /// Finite-difference step size
    pub epsilon: Scalar,
    /// Descent step multiplier
    pub learning_rate: Scalar,
    /// Lower bound of the initial parameter range
    pub init_low: Scalar,
    /// Upper bound of the initial parameter range
    pub init_high: Scalar,
    /// RNG seed for reproducible initialization; entropy when `None`
    pub seed: Option<u64>,
    /// Record and log the cost every this many epochs (0 disables)
    pub log_every: usize,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            epochs: 10_000,
            epsilon: 0.1,
            learning_rate: 1.0,
            init_low: 0.0,
            init_high: 1.0,
            seed: None,
            log_every: 1_000,
        }
    }
}

impl TrainConfig {
    /// Parses a JSON document; absent fields keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`MatrixError::Config`] if the document is malformed or fails
    /// [`TrainConfig::validate`].
    pub fn from_json(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Sets the number of epochs.
    #[must_use]
    pub fn with_epochs(mut self, epochs: usize) -> Self {
        self.epochs = epochs;
        self
    }

    /// Sets the finite-difference step.
    #[must_use]
    pub fn with_epsilon(mut self, epsilon: Scalar) -> Self {
        self.epsilon = epsilon;
        self
    }

    /// Sets the learning rate.
    #[must_use]
    pub fn with_learning_rate(mut self, learning_rate: Scalar) -> Self {
        self.learning_rate = learning_rate;
        self
    }

    /// Sets the initial parameter range.
    #[must_use]
    pub fn with_init_range(mut self, low: Scalar, high: Scalar) -> Self {
        self.init_low = low;
        self.init_high = high;
        self
    }

    /// Fixes the RNG seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Sets the logging interval.
    #[must_use]
    pub fn with_log_every(mut self, log_every: usize) -> Self {
        self.log_every = log_every;
        self
    }

    /// Checks that every value is usable.
    ///
    /// # Errors
    ///
    /// Returns [`MatrixError::Config`] for a non-positive (or NaN) epsilon or
    /// learning rate, or an empty or unbounded initial range.
    pub fn validate(&self) -> Result<()> {
        if !(self.epsilon > 0.0) {
            return Err(MatrixError::Config(format!(
                "epsilon must be positive, got {}",
                self.epsilon
            )));
        }
        if !(self.learning_rate > 0.0) {
            return Err(MatrixError::Config(format!(
                "learning_rate must be positive, got {}",
                self.learning_rate
            )));
        }
        if !(self.init_low <= self.init_high) {
            return Err(MatrixError::Config(format!(
                "init range [{}, {}] is empty",
                self.init_low, self.init_high
            )));
        }
        if !(self.init_high - self.init_low).is_finite() {
            return Err(MatrixError::Config(format!(
                "init range [{}, {}] is not finite",
                self.init_low, self.init_high
            )));
        }
        Ok(())
    }

    fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }
}

/// Outcome of [`Trainer::fit`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingReport {
    /// Cost right after initialization
    pub initial_cost: Scalar,
    /// Cost after the last epoch
    pub final_cost: Scalar,
    /// `(epoch, cost)` samples taken every `log_every` epochs and at the end
    pub history: Vec<(usize, Scalar)>,
}

/// Runs finite-difference gradient descent on a [`Network`].
#[derive(Debug, Clone, Default)]
pub struct Trainer {
    config: TrainConfig,
}

impl Trainer {
    /// Creates a trainer with the given configuration.
    #[must_use]
    pub fn new(config: TrainConfig) -> Self {
        Self { config }
    }

    /// The configuration in use.
    #[must_use]
    pub fn config(&self) -> &TrainConfig {
        &self.config
    }

    /// Randomizes `network` from the configured range and trains it on the
    /// samples in the rows of `ti` (inputs) and `to` (targets).
    ///
    /// # Errors
    ///
    /// Returns [`MatrixError::Config`] for an invalid configuration and
    /// [`MatrixError::DimensionMismatch`] if the data does not fit the network.
    pub fn fit(&self, network: &mut Network, ti: &Matrix, to: &Matrix) -> Result<TrainingReport> {
        let cfg = &self.config;
        cfg.validate()?;

        let mut rng = cfg.rng();
        network.randomize(&mut rng, cfg.init_low, cfg.init_high)?;
        let mut grad = network.zeros_like()?;

        let initial_cost = network.cost(ti, to)?;
        info!(
            architecture = ?network.architecture(),
            samples = ti.n_rows(),
            epochs = cfg.epochs,
            cost = f64::from(initial_cost),
            "training started"
        );

        let mut history = Vec::new();
        for epoch in 1..=cfg.epochs {
            let before = network.finite_difference(&mut grad, cfg.epsilon, ti, to)?;
            if !before.is_finite() {
                warn!(epoch, "cost is no longer finite, stopping early");
                history.push((epoch - 1, before));
                return Ok(TrainingReport {
                    initial_cost,
                    final_cost: before,
                    history,
                });
            }
            network.learn(&grad, cfg.learning_rate)?;

            if cfg.log_every > 0 && epoch % cfg.log_every == 0 {
                let cost = network.cost(ti, to)?;
                info!(epoch, cost = f64::from(cost), "training progress");
                history.push((epoch, cost));
            }
        }

        let final_cost = network.cost(ti, to)?;
        if history.last().map(|&(epoch, _)| epoch) != Some(cfg.epochs) {
            history.push((cfg.epochs, final_cost));
        }
        info!(cost = f64::from(final_cost), "training finished");
        Ok(TrainingReport {
            initial_cost,
            final_cost,
            history,
        })
    }
}
