//! Training data.

pub mod video;

pub use video::*;
