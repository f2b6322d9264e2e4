//! Supervision of the blending with the motion masks.

pub use super::*;

impl<B: Backend> DynamicObjective<B> {
    /// `L1(blending[static]) + img2mae(dynamicness, 1 - static_mask)`
    ///
    /// ## Arguments
    ///
    /// * `blending` - The blending weights with shape `[N, S]` or `[N, 1]`.
    /// * `dynamicness` - The dynamicness of the rays with shape `[N]`.
    /// * `static_mask` - The static rays with shape `[N, 1]`.
    ///
    /// ## Details
    ///
    /// * The first term is the mean over the static rays, or `0.0` if there is none.
    pub fn get_mask_loss(
        &self,
        blending: Tensor<B, 2>,
        dynamicness: Tensor<B, 1>,
        static_mask: Tensor<B, 2>,
    ) -> Tensor<B, 1> {
        let dynamic_mask = static_mask.to_owned().neg().add_scalar(1.0);

        self.metric_l1
            .evaluate_masked(blending, static_mask)
            .add(
                self.metric_mae
                    .evaluate(dynamicness.unsqueeze_dim::<2>(1), dynamic_mask),
            )
    }
}
