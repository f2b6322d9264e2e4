//! Reduction policies shared by the metrics.
//!
//! The two policies are not limits of one another. For an all-ones mask of
//! shape `[N, 1]` and a value of shape `[N, C]`, both give the same result,
//! but for a mask with the full shape of the value the masked policy divides
//! by `C` once more.

pub use burn::tensor::{backend::Backend, Tensor};

/// Added to the mask sum before dividing.
pub const EPSILON_MASK: f64 = 1e-8;

/// `abs(value)` with the gradient `sign(value)`, which is `0` at `0`.
///
/// The backward of [`Tensor::abs`] divides by the value itself.
pub fn abs_value<B: Backend, const D: usize>(
    value: Tensor<B, D>
) -> Tensor<B, D> {
    let sign = value.to_owned().sign().detach();
    value.mul(sign)
}

/// `mean(value)`
#[inline]
pub fn reduce_mean_all<B: Backend, const D: usize>(
    value: Tensor<B, D>
) -> Tensor<B, 1> {
    value.mean()
}

/// `sum(value * mask) / (sum(mask) + 1e-8) / value.dims()[D - 1]`
///
/// ## Arguments
///
/// * `value` - The tensor to reduce with shape `[..., C]`.
/// * `mask` - A tensor broadcastable to the shape of `value`, usually `[..., 1]`.
pub fn reduce_masked_normalized<B: Backend, const D: usize>(
    value: Tensor<B, D>,
    mask: Tensor<B, D>,
) -> Tensor<B, 1> {
    let channel_count = value.dims()[D - 1] as f64;

    value
        .mul(mask.to_owned())
        .sum()
        .div(mask.sum().add_scalar(EPSILON_MASK))
        .div_scalar(channel_count)
}
