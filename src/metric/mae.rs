//! Mean absolute error (MAE) metric.

pub use super::*;

/// Computing the mean absolute error (MAE) between the inputs:
///
/// `mean(abs(value - target))`
///
/// or, with a mask,
///
/// `sum(abs(value - target) * mask) / (sum(mask) + 1e-8) / C`
#[derive(Clone, Copy, Debug, Default)]
pub struct MeanAbsoluteError;

impl MeanAbsoluteError {
    /// Initialize the metric.
    #[inline]
    pub fn init() -> Self {
        Self
    }
}

impl<B: Backend> Metric<B> for MeanAbsoluteError {
    /// ## Returns
    ///
    /// The mean absolute error (MAE) with shape `[1]`.
    #[inline]
    fn evaluate<const D: usize>(
        &self,
        value: Tensor<B, D>,
        target: Tensor<B, D>,
    ) -> Tensor<B, 1> {
        reduce_mean_all(abs_value(value.sub(target)))
    }
}

impl<B: Backend> MaskedMetric<B> for MeanAbsoluteError {
    #[inline]
    fn evaluate_masked<const D: usize>(
        &self,
        value: Tensor<B, D>,
        target: Tensor<B, D>,
        mask: Tensor<B, D>,
    ) -> Tensor<B, 1> {
        reduce_masked_normalized(abs_value(value.sub(target)), mask)
    }
}
