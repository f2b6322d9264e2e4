//! Supervision of the induced optical flows.

pub use super::*;

/// The camera-to-world poses of the adjacent frames.
///
/// A pose is absent at either end of the sequence.
#[derive(Clone, Debug)]
pub struct NeighborPoses<B: Backend> {
    /// The pose of the previous frame with shape `[3, 4]`.
    pub backward: Option<Tensor<B, 2>>,
    /// The pose of the next frame with shape `[3, 4]`.
    pub forward: Option<Tensor<B, 2>>,
}

impl<B: Backend> NeighborPoses<B> {
    /// Looking up the poses adjacent to the frame.
    pub fn init(
        dataset: &VideoDataset<B>,
        frame_index: usize,
    ) -> Result<Self, Error> {
        let frame_count = dataset.frame_count();
        if frame_index >= frame_count {
            return Err(Error::UnknownFrameIndex(frame_index));
        }

        let backward = match frame_index {
            0 => None,
            _ => Some(dataset.pose(frame_index - 1)?),
        };
        let forward = match frame_index + 1 < frame_count {
            true => Some(dataset.pose(frame_index + 1)?),
            false => None,
        };

        Ok(Self { backward, forward })
    }
}

impl<B: Backend> DynamicObjective<B> {
    /// The end-point error between the induced flow and the measured flow,
    /// weighted by the measured confidence.
    ///
    /// ## Arguments
    ///
    /// * `pose_neighbor` - The pose of the adjacent frame with shape `[3, 4]`.
    /// * `weights` - The density weights with shape `[N, S]`.
    /// * `points_neighbor` - The points moved to the adjacent time in NDC with shape `[N, S, 3]`.
    /// * `pixels` - The pixel positions of the rays with shape `[N, 2]`.
    /// * `flow` - The measured flow with shape `[N, 2]`.
    /// * `confidence` - The confidence of the measured flow with shape `[N, 1]`.
    pub fn get_flow_loss(
        &self,
        pose_neighbor: Tensor<B, 2>,
        weights: Tensor<B, 2>,
        points_neighbor: Tensor<B, 3>,
        pixels: Tensor<B, 2>,
        flow: Tensor<B, 2>,
        confidence: Tensor<B, 2>,
    ) -> Tensor<B, 1> {
        let flow_induced = induce_flow(
            &self.intrinsics,
            pose_neighbor,
            weights,
            points_neighbor,
            pixels,
        );

        self.metric_mae.evaluate_masked(flow_induced, flow, confidence)
    }
}

#[cfg(test)]
mod tests {
    #[test]
    fn get_flow_loss() {
        use super::*;
        use burn::backend::NdArray;

        let device = Default::default();
        let intrinsics = Intrinsics::new(2, 2, 1.0);
        let objective =
            DynamicObjective::<NdArray>::init(intrinsics, LossWeights::default(), &device);

        let pose = Tensor::<NdArray, 2>::from_floats(
            [[1.0, 0.0, 0.0, 0.0], [0.0, 1.0, 0.0, 0.0], [0.0, 0.0, 1.0, 0.0]],
            &device,
        );
        // The point at the center of the image: NDC (0, 0, 0) is world (0, 0, -2)
        let weights = Tensor::from_floats([[1.0], [1.0]], &device);
        let points = Tensor::zeros([2, 1, 3], &device);
        let pixels = Tensor::from_floats([[1.0, 1.0], [0.0, 0.0]], &device);

        // Induced flows: [0, 0] and [1, 1]
        let flow = Tensor::from_floats([[0.0, 0.0], [1.0, 3.0]], &device);

        let confidence = Tensor::from_floats([[1.0], [0.0]], &device);
        let output = objective
            .get_flow_loss(
                pose.to_owned(),
                weights.to_owned(),
                points.to_owned(),
                pixels.to_owned(),
                flow.to_owned(),
                confidence,
            )
            .into_scalar();
        assert!(output.abs() < 1e-6, "output: {output}");

        // (0 + 0 + 0 + 2) / 2 / 2
        let confidence = Tensor::from_floats([[1.0], [1.0]], &device);
        let output = objective
            .get_flow_loss(pose, weights, points, pixels, flow, confidence)
            .into_scalar();
        assert!((output - 0.5).abs() < 1e-5, "output: {output}");
    }

    #[test]
    fn neighbor_poses() {
        use super::*;
        use burn::backend::NdArray;

        let device = Default::default();
        let intrinsics = Intrinsics::new(1, 1, 1.0);
        let frames = (0..3)
            .map(|_| Frame {
                flow_grid: vec![0.0; 8],
                image: vec![0.0; 3],
                inverse_depth: vec![1.0],
                motion_mask: vec![0.0],
                pose: Default::default(),
            })
            .collect::<Vec<_>>();
        let dataset = VideoDataset::<NdArray>::init(&frames, intrinsics, &device).unwrap();

        let poses = NeighborPoses::init(&dataset, 0).unwrap();
        assert!(poses.backward.is_none());
        assert!(poses.forward.is_some());

        let poses = NeighborPoses::init(&dataset, 1).unwrap();
        assert!(poses.backward.is_some());
        assert!(poses.forward.is_some());

        let poses = NeighborPoses::init(&dataset, 2).unwrap();
        assert!(poses.backward.is_some());
        assert!(poses.forward.is_none());

        let error = NeighborPoses::init(&dataset, 3).unwrap_err();
        assert!(matches!(error, Error::UnknownFrameIndex(3)), "{error}");
    }
}
