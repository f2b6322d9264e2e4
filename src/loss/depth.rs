//! Depth supervision and ordering.

pub use super::*;

impl<B: Backend> DynamicObjective<B> {
    /// The mean square difference between the dynamic depth and the detached
    /// static depth over the static rays.
    ///
    /// ## Arguments
    ///
    /// * `depth_dynamic` - `[N]`
    /// * `depth_static` - `[N]`
    /// * `static_mask` - `[N, 1]`
    ///
    /// ## Returns
    ///
    /// The loss with shape `[1]`. It is `0.0` if no ray is static.
    pub fn get_order_loss(
        &self,
        depth_dynamic: Tensor<B, 1>,
        depth_static: Tensor<B, 1>,
        static_mask: Tensor<B, 2>,
    ) -> Tensor<B, 1> {
        self.metric_mse.evaluate_masked(
            depth_dynamic.unsqueeze_dim::<2>(1),
            depth_static.detach().unsqueeze_dim::<2>(1),
            static_mask,
        )
    }

    /// The mean square difference between the depths normalized by their
    /// medians and mean absolute deviations.
    ///
    /// ## Arguments
    ///
    /// * `depth` - The rendered depth with shape `[N]`.
    /// * `target` - The prior depth with shape `[N]`.
    ///
    /// ## Details
    ///
    /// * It is invariant to positive scaling and shifting of either depth.
    pub fn get_depth_loss(
        &self,
        depth: Tensor<B, 1>,
        target: Tensor<B, 1>,
    ) -> Tensor<B, 1> {
        normalize_depth(depth)
            .sub(normalize_depth(target))
            .powf_scalar(2.0)
            .mean()
    }
}

/// `(depth - median(depth)) / mean(abs(depth - median(depth)))`
///
/// The median is the lower one for an even count.
pub fn normalize_depth<B: Backend>(depth: Tensor<B, 1>) -> Tensor<B, 1> {
    let count = depth.dims()[0];
    let index_median = (count.max(1) - 1) / 2;

    let indices = depth.to_owned().argsort(0);
    let median = depth
        .to_owned()
        .select(0, indices.slice([index_median..index_median + 1]));
    let depth = depth.sub(median);
    let deviation = abs_value(depth.to_owned()).mean();

    depth.div(deviation)
}
