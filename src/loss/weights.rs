//! Weighting of the loss terms.

pub use super::*;
pub use burn::config::Config;

/// The weights of the loss terms.
///
/// The depth and flow terms are further multiplied by the temperature.
#[derive(Config, Copy, Debug, PartialEq)]
pub struct LossWeights {
    /// The forward and backward scene flow consistency.
    #[config(default = "1.0")]
    pub consistency_loss_lambda: f64,

    /// The normalized depth against the prior.
    #[config(default = "0.04")]
    pub depth_loss_lambda: f64,

    /// Shared by every photometric term of the dynamic branch.
    #[config(default = "1.0")]
    pub dynamic_loss_lambda: f64,

    /// Both induced optical flows.
    #[config(default = "0.02")]
    pub flow_loss_lambda: f64,

    /// The blended colors.
    #[config(default = "3.0")]
    pub full_loss_lambda: f64,

    /// The blending against the motion masks.
    #[config(default = "0.1")]
    pub mask_loss_lambda: f64,

    /// The dynamic depth against the static depth.
    #[config(default = "0.1")]
    pub order_loss_lambda: f64,

    /// The scene flow magnitudes.
    #[config(default = "0.01")]
    pub slow_loss_lambda: f64,

    /// Shared by the temporal, chained temporal and spatial smoothness.
    #[config(default = "0.1")]
    pub smooth_loss_lambda: f64,

    /// The entropy of the weights and the blending.
    #[config(default = "1e-3")]
    pub sparse_loss_lambda: f64,

    /// Only for pretraining.
    #[config(default = "1.0")]
    pub static_loss_lambda: f64,
}

impl LossWeights {
    /// `sum(weight * loss)` over the present terms, or `0.0` if there is none.
    ///
    /// ## Returns
    ///
    /// The total loss with shape `[1]`.
    pub fn total<B: Backend>(
        &self,
        record: &LossRecord<B>,
        temperature: f64,
        device: &B::Device,
    ) -> Tensor<B, 1> {
        let photometric =
            |term: &Option<PhotometricTerm<B>>| term.as_ref().map(|term| term.loss.to_owned());

        [
            (photometric(&record.img_s), self.static_loss_lambda),
            (record.mask.to_owned(), self.mask_loss_lambda),
            (photometric(&record.img_full), self.full_loss_lambda),
            (photometric(&record.img_obj), self.dynamic_loss_lambda),
            (photometric(&record.img_d_f), self.dynamic_loss_lambda),
            (photometric(&record.img_d_b), self.dynamic_loss_lambda),
            (photometric(&record.img_d_b_b), self.dynamic_loss_lambda),
            (photometric(&record.img_d_f_f), self.dynamic_loss_lambda),
            (record.order.to_owned(), self.order_loss_lambda),
            (record.depth.to_owned(), self.depth_loss_lambda * temperature),
            (record.slow.to_owned(), self.slow_loss_lambda),
            (record.smooth.to_owned(), self.smooth_loss_lambda),
            (record.sf_smooth.to_owned(), self.smooth_loss_lambda),
            (record.sp_smooth.to_owned(), self.smooth_loss_lambda),
            (record.consistency.to_owned(), self.consistency_loss_lambda),
            (record.sparse.to_owned(), self.sparse_loss_lambda),
            (record.flow_f.to_owned(), self.flow_loss_lambda * temperature),
            (record.flow_b.to_owned(), self.flow_loss_lambda * temperature),
        ]
        .into_iter()
        .filter_map(|(loss, weight)| Some(loss?.mul_scalar(weight)))
        .reduce(|total, loss| total.add(loss))
        .unwrap_or_else(|| Tensor::zeros([1], device))
    }
}

impl Default for LossWeights {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}
