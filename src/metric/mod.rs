//! Metrics and the reductions shared by the loss terms.

pub mod entropy;
pub mod mae;
pub mod mse;
pub mod norm;
pub mod psnr;
pub mod reduce;

pub use entropy::*;
pub use mae::*;
pub use mse::*;
pub use norm::*;
pub use psnr::*;
pub use reduce::*;

pub use burn::tensor::{backend::Backend, Tensor};

/// A metric between a value and a target.
pub trait Metric<B: Backend> {
    /// Evaluate the value against the target.
    ///
    /// ## Returns
    ///
    /// The metric value with shape `[1]`.
    fn evaluate<const D: usize>(
        &self,
        value: Tensor<B, D>,
        target: Tensor<B, D>,
    ) -> Tensor<B, 1>;
}

/// A metric between a value and a target restricted by a mask.
pub trait MaskedMetric<B: Backend> {
    /// Evaluate the value against the target where the mask is set.
    ///
    /// ## Arguments
    ///
    /// * `mask` - A `{0, 1}` tensor broadcastable to the shape of `value`.
    ///
    /// ## Returns
    ///
    /// The metric value with shape `[1]`.
    fn evaluate_masked<const D: usize>(
        &self,
        value: Tensor<B, D>,
        target: Tensor<B, D>,
        mask: Tensor<B, D>,
    ) -> Tensor<B, 1>;
}
