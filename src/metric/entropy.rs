//! Entropy of non-negative weights.

pub use super::*;

/// Added inside the logarithm.
pub const EPSILON_LOG: f64 = 1e-19;

/// Computing the entropy of the non-negative weights averaged over the first dimension:
///
/// `-sum(value * ln(value + 1e-19)) / value.dims()[0]`
///
/// ## Details
///
/// * It is maximal for uniform weights and approaches `0.0` for one-hot weights.
#[derive(Clone, Copy, Debug, Default)]
pub struct Entropy;

impl Entropy {
    /// Initialize the metric.
    #[inline]
    pub fn init() -> Self {
        Self
    }

    /// ## Arguments
    ///
    /// * `value` - The weights with shape `[N, ...]`.
    ///
    /// ## Returns
    ///
    /// The entropy with shape `[1]`.
    pub fn evaluate<B: Backend, const D: usize>(
        &self,
        value: Tensor<B, D>,
    ) -> Tensor<B, 1> {
        let count = value.dims()[0] as f64;

        value
            .to_owned()
            .mul(value.add_scalar(EPSILON_LOG).log())
            .sum()
            .neg()
            .div_scalar(count)
    }
}
