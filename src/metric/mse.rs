//! Mean square error (MSE) metric.

pub use super::*;

/// Computing the mean square error (MSE) between the inputs:
///
/// `mean((value - target) ^ 2)`
///
/// or, with a mask,
///
/// `sum((value - target) ^ 2 * mask) / (sum(mask) + 1e-8) / C`
#[derive(Clone, Copy, Debug, Default)]
pub struct MeanSquareError;

impl MeanSquareError {
    /// Initialize the metric.
    #[inline]
    pub fn init() -> Self {
        Self
    }
}

impl<B: Backend> Metric<B> for MeanSquareError {
    /// ## Returns
    ///
    /// The mean square error (MSE) with shape `[1]`.
    #[inline]
    fn evaluate<const D: usize>(
        &self,
        value: Tensor<B, D>,
        target: Tensor<B, D>,
    ) -> Tensor<B, 1> {
        reduce_mean_all(value.sub(target).powf_scalar(2.0))
    }
}

impl<B: Backend> MaskedMetric<B> for MeanSquareError {
    #[inline]
    fn evaluate_masked<const D: usize>(
        &self,
        value: Tensor<B, D>,
        target: Tensor<B, D>,
        mask: Tensor<B, D>,
    ) -> Tensor<B, 1> {
        reduce_masked_normalized(value.sub(target).powf_scalar(2.0), mask)
    }
}

#[cfg(test)]
mod tests {
    #[test]
    fn evaluate() {
        use super::*;
        use burn::backend::NdArray;

        let device = Default::default();
        let metric = MeanSquareError::init();

        let input_0 = Tensor::<NdArray, 2>::zeros([256, 3], &device);
        let input_1 = Tensor::<NdArray, 2>::zeros([256, 3], &device);
        let score = metric.evaluate(input_0, input_1).into_scalar();
        assert_eq!(score, 0.0);

        let input_0 = Tensor::<NdArray, 2>::ones([256, 3], &device);
        let input_1 = Tensor::<NdArray, 2>::ones([256, 3], &device);
        let score = metric.evaluate(input_0, input_1).into_scalar();
        assert_eq!(score, 0.0);

        let input_0 = Tensor::<NdArray, 2>::zeros([256, 3], &device);
        let input_1 = Tensor::<NdArray, 2>::ones([256, 3], &device);
        let score = metric.evaluate(input_0, input_1).into_scalar();
        assert_eq!(score, 1.0);
    }

    #[test]
    fn evaluate_masked() {
        use super::*;
        use burn::backend::NdArray;

        let device = Default::default();
        let metric = MeanSquareError::init();

        let input_0 = Tensor::<NdArray, 2>::from_floats(
            [[0.0, 0.1, 0.2], [0.5, 0.4, 0.3], [0.9, 0.9, 0.9]],
            &device,
        );
        let score = metric
            .evaluate_masked(
                input_0.to_owned(),
                input_0.to_owned(),
                Tensor::from_floats([[1.0], [0.0], [1.0]], &device),
            )
            .into_scalar();
        assert_eq!(score, 0.0);

        // The unselected row differs everywhere
        let input_1 = Tensor::<NdArray, 2>::from_floats(
            [[0.0, 0.1, 0.4], [0.0, 0.0, 0.0], [0.9, 0.9, 0.9]],
            &device,
        );
        let score = metric
            .evaluate_masked(
                input_0,
                input_1,
                Tensor::from_floats([[1.0], [0.0], [1.0]], &device),
            )
            .into_scalar();
        // 0.2 ^ 2 / 2 / 3
        assert!((score - 0.04 / 6.0).abs() < 1e-6, "score: {score}");
    }
}
