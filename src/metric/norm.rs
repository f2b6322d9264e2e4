//! Regularizing norms of a single tensor.

pub use super::*;

/// `L1`: `mean(abs(value))`, or `sum(abs(value) * mask) / (sum(mask) + 1e-8) / C`.
#[derive(Clone, Copy, Debug, Default)]
pub struct MeanAbsoluteValue;

/// `L2`: `mean(value ^ 2)`, or `sum(value ^ 2 * mask) / (sum(mask) + 1e-8) / C`.
#[derive(Clone, Copy, Debug, Default)]
pub struct MeanSquareValue;

impl MeanAbsoluteValue {
    /// Initialize the norm.
    #[inline]
    pub fn init() -> Self {
        Self
    }

    /// `mean(abs(value))`
    #[inline]
    pub fn evaluate<B: Backend, const D: usize>(
        &self,
        value: Tensor<B, D>,
    ) -> Tensor<B, 1> {
        reduce_mean_all(abs_value(value))
    }

    /// The mean absolute value where the mask is set.
    #[inline]
    pub fn evaluate_masked<B: Backend, const D: usize>(
        &self,
        value: Tensor<B, D>,
        mask: Tensor<B, D>,
    ) -> Tensor<B, 1> {
        reduce_masked_normalized(abs_value(value), mask)
    }
}

impl MeanSquareValue {
    /// Initialize the norm.
    #[inline]
    pub fn init() -> Self {
        Self
    }

    /// `mean(value ^ 2)`
    #[inline]
    pub fn evaluate<B: Backend, const D: usize>(
        &self,
        value: Tensor<B, D>,
    ) -> Tensor<B, 1> {
        reduce_mean_all(value.powf_scalar(2.0))
    }

    /// The mean square value where the mask is set.
    #[inline]
    pub fn evaluate_masked<B: Backend, const D: usize>(
        &self,
        value: Tensor<B, D>,
        mask: Tensor<B, D>,
    ) -> Tensor<B, 1> {
        reduce_masked_normalized(value.powf_scalar(2.0), mask)
    }
}

#[cfg(test)]
mod tests {
    #[test]
    fn mean_absolute_value() {
        use super::*;
        use burn::backend::NdArray;

        let device = Default::default();
        let norm = MeanAbsoluteValue::init();

        let value = Tensor::<NdArray, 3>::from_floats(
            [[[1.0, -2.0, 3.0]], [[-4.0, 0.0, 2.0]]],
            &device,
        );
        let output = norm.evaluate(value.to_owned()).into_scalar();
        assert_eq!(output, 2.0);

        let mask = Tensor::from_floats([[[0.0]], [[1.0]]], &device);
        let output = norm.evaluate_masked(value, mask).into_scalar();
        assert!((output - 2.0).abs() < 1e-6, "output: {output}");
    }

    #[test]
    fn mean_square_value() {
        use super::*;
        use burn::backend::NdArray;

        let device = Default::default();
        let norm = MeanSquareValue::init();

        let value = Tensor::<NdArray, 2>::from_floats(
            [[1.0, -1.0], [2.0, 0.0]],
            &device,
        );
        let output = norm.evaluate(value.to_owned()).into_scalar();
        assert_eq!(output, 1.5);

        let mask = Tensor::from_floats([[1.0], [0.0]], &device);
        let output = norm.evaluate_masked(value, mask).into_scalar();
        assert!((output - 1.0).abs() < 1e-6, "output: {output}");

        let value = Tensor::<NdArray, 2>::zeros([8, 3], &device);
        let output = norm.evaluate(value).into_scalar();
        assert_eq!(output, 0.0);
    }
}
