//! Peak signal-to-noise ratio (PSNR) metric.

pub use super::*;

/// Converting a mean square error (MSE) to the peak signal-to-noise ratio (PSNR):
///
/// `10 * log10(1 / MSE) = -10 / ln(10) * ln(MSE)`
///
/// ## Details
///
/// It is only logged, never optimized.
#[derive(Clone, Debug)]
pub struct Psnr<B: Backend> {
    /// Coefficient for PSNR.
    pub coefficient: Tensor<B, 1>,
}

impl<B: Backend> Psnr<B> {
    /// Initialize the metric on the device.
    pub fn init(device: &B::Device) -> Self {
        let ten = Tensor::<B, 1>::from_floats([10.0], device);
        let coefficient = ten.to_owned().neg().div(ten.log());
        Self { coefficient }
    }

    /// Converting a mean square error with shape `[1]` to PSNR.
    #[inline]
    pub fn evaluate_mse(
        &self,
        mse: Tensor<B, 1>,
    ) -> Tensor<B, 1> {
        self.coefficient.to_owned().mul(mse.log())
    }
}

impl<B: Backend> Default for Psnr<B> {
    fn default() -> Self {
        Self::init(&Default::default())
    }
}
