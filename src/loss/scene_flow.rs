//! Regularization of the scene flows.
//!
//! The smoothness terms compare sample positions in world space.

pub use super::*;

/// The leading fraction of samples used by the temporal smoothness.
pub const SAMPLE_RATIO_TEMPORAL: f64 = 0.9;

/// The leading fraction of samples used by the spatial smoothness.
pub const SAMPLE_RATIO_SPATIAL: f64 = 0.95;

impl<B: Backend> DynamicObjective<B> {
    /// `L1(sf_b) + L1(sf_f)`
    pub fn get_slow_loss(
        &self,
        sceneflow_f: Tensor<B, 3>,
        sceneflow_b: Tensor<B, 3>,
    ) -> Tensor<B, 1> {
        self.metric_l1
            .evaluate(sceneflow_b)
            .add(self.metric_l1.evaluate(sceneflow_f))
    }

    /// `L1(sf_f + sf_f_b) + L1(sf_b + sf_b_f)`
    ///
    /// A scene flow followed by its reverse should return to the start.
    pub fn get_consistency_loss(
        &self,
        sceneflow_f: Tensor<B, 3>,
        sceneflow_f_b: Tensor<B, 3>,
        sceneflow_b: Tensor<B, 3>,
        sceneflow_b_f: Tensor<B, 3>,
    ) -> Tensor<B, 1> {
        self.metric_l1
            .evaluate(sceneflow_f.add(sceneflow_f_b))
            .add(self.metric_l1.evaluate(sceneflow_b.add(sceneflow_b_f)))
    }

    /// `L2((w(pts_f) - w(pts)) + (w(pts_b) - w(pts)))` over the leading samples.
    ///
    /// ## Arguments
    ///
    /// * `points` - The sample points in NDC with shape `[N, S, 3]`.
    /// * `points_f` - The points moved forward with shape `[N, S, 3]`.
    /// * `points_b` - The points moved backward with shape `[N, S, 3]`.
    pub fn get_smooth_temporal_loss(
        &self,
        points: Tensor<B, 3>,
        points_f: Tensor<B, 3>,
        points_b: Tensor<B, 3>,
    ) -> Tensor<B, 1> {
        let sample_count = leading_sample_count(&points, SAMPLE_RATIO_TEMPORAL).max(1);

        let points = self.get_points_world(points, sample_count);
        let points_f = self.get_points_world(points_f, sample_count);
        let points_b = self.get_points_world(points_b, sample_count);

        let sceneflow_f = points_f.sub(points.to_owned());
        let sceneflow_b = points_b.sub(points);

        self.metric_l2.evaluate(sceneflow_f.add(sceneflow_b))
    }

    /// `L1(flow[:, :-1] - flow[:, 1:])` where `flow = w(pts_1) - w(pts_2)`
    /// over the leading samples.
    ///
    /// ## Details
    ///
    /// * It is `0.0` if fewer than two samples are used.
    pub fn get_smooth_spatial_loss(
        &self,
        points_1: Tensor<B, 3>,
        points_2: Tensor<B, 3>,
    ) -> Tensor<B, 1> {
        let [ray_count, _, _] = points_1.dims();
        let sample_count = leading_sample_count(&points_1, SAMPLE_RATIO_SPATIAL);

        if sample_count < 2 {
            return Tensor::zeros([1], &points_1.device());
        }

        let sceneflow = self
            .get_points_world(points_1, sample_count)
            .sub(self.get_points_world(points_2, sample_count));
        let sceneflow_head =
            sceneflow.to_owned().slice([0..ray_count, 0..sample_count - 1, 0..3]);
        let sceneflow_tail = sceneflow.slice([0..ray_count, 1..sample_count, 0..3]);

        self.metric_l1.evaluate(sceneflow_head.sub(sceneflow_tail))
    }

    fn get_points_world(
        &self,
        points: Tensor<B, 3>,
        sample_count: usize,
    ) -> Tensor<B, 3> {
        let [ray_count, _, _] = points.dims();
        ndc_to_world(
            points.slice([0..ray_count, 0..sample_count, 0..3]),
            &self.intrinsics,
        )
    }
}

/// `floor(S * ratio)`
#[inline]
fn leading_sample_count<B: Backend>(
    points: &Tensor<B, 3>,
    ratio: f64,
) -> usize {
    (points.dims()[1] as f64 * ratio) as usize
}
