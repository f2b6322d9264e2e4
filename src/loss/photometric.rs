//! Photometric terms.

pub use super::*;

/// A photometric loss and its peak signal-to-noise ratio.
#[derive(Clone, Debug)]
pub struct PhotometricTerm<B: Backend> {
    /// `img2mse`
    pub loss: Tensor<B, 1>,
    /// Only logged.
    pub psnr: Tensor<B, 1>,
}

impl<B: Backend> DynamicObjective<B> {
    /// Comparing the predicted colors with the target colors.
    ///
    /// ## Arguments
    ///
    /// * `value` - The predicted colors with shape `[N, 3]`.
    /// * `target` - The target colors with shape `[N, 3]`.
    /// * `mask` - The rays to supervise with shape `[N, 1]`, or all rays if `None`.
    pub fn get_photometric_term(
        &self,
        value: Tensor<B, 2>,
        target: Tensor<B, 2>,
        mask: Option<Tensor<B, 2>>,
    ) -> PhotometricTerm<B> {
        let loss = match mask {
            Some(mask) => self.metric_mse.evaluate_masked(value, target, mask),
            None => self.metric_mse.evaluate(value, target),
        };
        let psnr = self.metric_psnr.evaluate_mse(loss.to_owned().detach());

        PhotometricTerm { loss, psnr }
    }
}
