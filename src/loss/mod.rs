//! The training objective of the dynamic radiance field.
//!
//! [`DynamicObjective`] evaluates every active term into a [`LossRecord`],
//! and [`LossWeights`] reduces the record to the total loss.

pub mod depth;
pub mod mask;
pub mod motion;
pub mod photometric;
pub mod record;
pub mod scene_flow;
pub mod sparsity;
pub mod weights;

pub use crate::{
    dataset::{Frame, RayBatch, VideoDataset},
    error::Error,
    geometry::{induce_flow, ndc_to_world, Intrinsics},
    metric::*,
    render::{DynamicRenderOutput, StaticRenderOutput},
    schedule::ScheduleSignals,
};
pub use burn::tensor::{backend::Backend, ElementConversion, Tensor};
pub use depth::*;
pub use motion::*;
pub use photometric::*;
pub use record::*;
pub use scene_flow::*;
pub use weights::*;

/// The evaluator of the loss terms.
#[derive(Clone, Debug)]
pub struct DynamicObjective<B: Backend> {
    /// The intrinsics of the frames.
    pub intrinsics: Intrinsics,
    /// Sparsity.
    pub metric_entropy: Entropy,
    /// Scene flow magnitudes and the blending.
    pub metric_l1: MeanAbsoluteValue,
    /// Temporal smoothness.
    pub metric_l2: MeanSquareValue,
    /// Flows and the dynamicness.
    pub metric_mae: MeanAbsoluteError,
    /// Colors and the depth order.
    pub metric_mse: MeanSquareError,
    /// Logged with every photometric term.
    pub metric_psnr: Psnr<B>,
    /// The weights of the terms.
    pub weights: LossWeights,
}

impl<B: Backend> DynamicObjective<B> {
    /// Initialize the objective on the device.
    pub fn init(
        intrinsics: Intrinsics,
        weights: LossWeights,
        device: &B::Device,
    ) -> Self {
        Self {
            intrinsics,
            metric_entropy: Entropy::init(),
            metric_l1: MeanAbsoluteValue::init(),
            metric_l2: MeanSquareValue::init(),
            metric_mae: MeanAbsoluteError::init(),
            metric_mse: MeanSquareError::init(),
            metric_psnr: Psnr::init(device),
            weights,
        }
    }

    /// Evaluating the photometric term of the static branch.
    pub fn evaluate_static(
        &self,
        output: &StaticRenderOutput<B>,
        batch: &RayBatch<B>,
    ) -> LossRecord<B> {
        LossRecord {
            img_s: Some(self.get_photometric_term(
                output.rgb_map_s.to_owned(),
                batch.target_rgb.to_owned(),
                None,
            )),
            ..Default::default()
        }
    }

    /// Evaluating every term active under the signals.
    ///
    /// ## Details
    ///
    /// * The mask loss is present only if `signals.is_mask_loss_active`.
    /// * The chained photometric terms are present only if the phase is chained
    ///   and the chained colors were rendered.
    /// * A flow loss is present only if the neighbor pose exists.
    pub fn evaluate_dynamic(
        &self,
        output: &DynamicRenderOutput<B>,
        batch: &RayBatch<B>,
        neighbors: &NeighborPoses<B>,
        signals: &ScheduleSignals,
    ) -> LossRecord<B> {
        let mut record = LossRecord::new();
        let dynamic_mask = batch.dynamic_mask();
        let target_rgb = &batch.target_rgb;
        let photometric_dynamic = |value: &Tensor<B, 2>| {
            Some(self.get_photometric_term(
                value.to_owned(),
                target_rgb.to_owned(),
                Some(dynamic_mask.to_owned()),
            ))
        };

        if signals.is_mask_loss_active {
            record.mask = Some(self.get_mask_loss(
                output.blending.to_owned(),
                output.dynamicness_map.to_owned(),
                batch.static_mask.to_owned(),
            ));
        }

        record.img_full = Some(self.get_photometric_term(
            output.rgb_map_full.to_owned(),
            target_rgb.to_owned(),
            None,
        ));
        record.img_obj = photometric_dynamic(&output.rgb_map_obj);
        record.img_d_f = photometric_dynamic(&output.rgb_map_d_f);
        record.img_d_b = photometric_dynamic(&output.rgb_map_d_b);

        if let (true, Some(chained)) = (signals.phase.is_chained(), &output.chained) {
            record.img_d_b_b = photometric_dynamic(&chained.rgb_map_d_b_b);
            record.img_d_f_f = photometric_dynamic(&chained.rgb_map_d_f_f);
        }

        record.order = Some(self.get_order_loss(
            output.depth_map_d.to_owned(),
            output.depth_map_s.to_owned(),
            batch.static_mask.to_owned(),
        ));

        // The depth in NDC is the negative inverse depth.
        record.depth = Some(self.get_depth_loss(
            output.depth_map_obj.to_owned(),
            batch.inverse_depth.to_owned().neg(),
        ));

        record.slow = Some(self.get_slow_loss(
            output.sceneflow_f.to_owned(),
            output.sceneflow_b.to_owned(),
        ));

        record.smooth = Some(self.get_smooth_temporal_loss(
            output.raw_pts.to_owned(),
            output.raw_pts_f.to_owned(),
            output.raw_pts_b.to_owned(),
        ));
        record.sf_smooth = Some(
            self.get_smooth_temporal_loss(
                output.raw_pts_b.to_owned(),
                output.raw_pts.to_owned(),
                output.raw_pts_b_b.to_owned(),
            )
            .add(self.get_smooth_temporal_loss(
                output.raw_pts_f.to_owned(),
                output.raw_pts_f_f.to_owned(),
                output.raw_pts.to_owned(),
            )),
        );
        record.sp_smooth = Some(
            self.get_smooth_spatial_loss(
                output.raw_pts.to_owned(),
                output.raw_pts_f.to_owned(),
            )
            .add(self.get_smooth_spatial_loss(
                output.raw_pts.to_owned(),
                output.raw_pts_b.to_owned(),
            )),
        );

        record.consistency = Some(self.get_consistency_loss(
            output.sceneflow_f.to_owned(),
            output.sceneflow_f_b.to_owned(),
            output.sceneflow_b.to_owned(),
            output.sceneflow_b_f.to_owned(),
        ));

        record.sparse = Some(self.get_sparsity_loss(
            output.weights_d.to_owned(),
            output.blending.to_owned(),
        ));

        // The last frame has no forward flow and the first has no backward flow.
        record.flow_f = neighbors.forward.as_ref().map(|pose| {
            self.get_flow_loss(
                pose.to_owned(),
                output.weights_d.to_owned(),
                output.raw_pts_f.to_owned(),
                batch.grid_pixels(),
                batch.flow_f(),
                batch.confidence_f(),
            )
        });
        record.flow_b = neighbors.backward.as_ref().map(|pose| {
            self.get_flow_loss(
                pose.to_owned(),
                output.weights_d.to_owned(),
                output.raw_pts_b.to_owned(),
                batch.grid_pixels(),
                batch.flow_b(),
                batch.confidence_b(),
            )
        });

        #[cfg(all(debug_assertions, not(test)))]
        log::debug!(
            target: "dynerf::trainer::loss",
            "DynamicObjective::evaluate_dynamic > frame_index ({})",
            batch.frame_index,
        );

        record
    }

    /// The weighted sum of the present terms with shape `[1]`.
    #[inline]
    pub fn total(
        &self,
        record: &LossRecord<B>,
        temperature: f64,
    ) -> Tensor<B, 1> {
        self.weights
            .total(record, temperature, &self.metric_psnr.coefficient.device())
    }
}
