//! Optimization schedules.

pub mod learning_rate;

pub use learning_rate::*;
