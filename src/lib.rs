//! A library to train dynamic radiance fields from monocular videos.
//!
//! The objective combines photometric, depth, flow and scene-flow terms whose
//! activation and weighting follow the iteration [`schedule`].

#![deny(rustdoc::broken_intra_doc_links)]
#![allow(clippy::excessive_precision)]
#![deny(missing_docs)]

pub mod dataset;
pub mod error;
pub mod geometry;
pub mod loss;
pub mod metric;
pub mod optimize;
pub mod range;
pub mod render;
pub mod schedule;
pub mod train;
