//! Learning rate decay.

pub use burn::config::Config;

use std::ops::Deref;

/// A learning rate decayed exponentially over the iterations.
///
/// `start * decay_rate ^ (iteration / decay_steps)`
#[derive(Clone, Debug)]
pub struct LearningRate {
    /// The learning rate at the latest update.
    pub current: f64,
    /// The factor applied once every `decay_steps` iterations.
    pub decay_rate: f64,
    /// It is infinite if never decayed.
    pub decay_steps: f64,
    /// The initial learning rate.
    pub start: f64,
}

/// A learning rate decayed exponentially over the iterations.
#[derive(Config, Debug, PartialEq)]
pub struct LearningRateConfig {
    /// The factor applied once every `decay_steps` iterations.
    #[config(default = "0.1")]
    pub decay_rate: f64,

    /// The iterations to apply `decay_rate` once.
    /// It is never decayed if zero.
    #[config(default = "250000")]
    pub decay_steps: u64,

    /// The initial learning rate.
    pub start: f64,
}

impl LearningRate {
    /// The learning rate at the iteration.
    pub fn at(
        &self,
        iteration: u64,
    ) -> f64 {
        self.start
            * self
                .decay_rate
                .powf(iteration as f64 / self.decay_steps)
    }

    /// Updating the current learning rate to the iteration.
    pub fn update(
        &mut self,
        iteration: u64,
    ) -> &mut Self {
        self.current = self.at(iteration);
        self
    }
}

impl LearningRateConfig {
    /// Initialize the learning rate at its start.
    pub fn init(&self) -> LearningRate {
        let decay_steps = if self.decay_steps == 0 {
            f64::INFINITY
        } else {
            self.decay_steps as f64
        };
        LearningRate {
            current: self.start,
            decay_rate: self.decay_rate,
            decay_steps,
            start: self.start,
        }
    }
}

impl Default for LearningRate {
    #[inline]
    fn default() -> Self {
        LearningRateConfig::default().init()
    }
}

impl Default for LearningRateConfig {
    #[inline]
    fn default() -> Self {
        Self::new(5e-4)
    }
}

impl Deref for LearningRate {
    type Target = f64;

    #[inline]
    fn deref(&self) -> &Self::Target {
        &self.current
    }
}

impl From<f64> for LearningRateConfig {
    #[inline]
    fn from(start: f64) -> Self {
        Self::new(start)
    }
}

impl From<f64> for LearningRate {
    #[inline]
    fn from(start: f64) -> Self {
        LearningRateConfig::from(start).init()
    }
}
