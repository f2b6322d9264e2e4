//! Inducing 2D optical flow from 3D scene flow.

pub use super::*;

/// Inducing the optical flow from the current pixels to the neighbor view.
///
/// ## Arguments
///
/// * `intrinsics` - The camera intrinsics shared by all frames.
/// * `pose_neighbor` - The camera-to-world pose of the neighbor frame with shape `[3, 4]`.
/// * `weights` - The density weights of the samples with shape `[N, S]`.
/// * `points_neighbor` - The sample points moved by the scene flow, in NDC, with shape `[N, S, 3]`.
/// * `pixels` - The pixel positions `(x, y)` of the rays with shape `[N, 2]`.
///
/// ## Returns
///
/// The induced flow `(dx, dy)` with shape `[N, 2]`.
///
/// ## Details
///
/// The expected point along each ray is projected with the OpenGL convention,
/// i.e., the camera looks towards `-z` and `y` points up.
pub fn induce_flow<B: Backend>(
    intrinsics: &Intrinsics,
    pose_neighbor: Tensor<B, 2>,
    weights: Tensor<B, 2>,
    points_neighbor: Tensor<B, 3>,
    pixels: Tensor<B, 2>,
) -> Tensor<B, 2> {
    let [point_count, _, _] = points_neighbor.dims();

    // [N, 3] = sum([N, S, 1] * [N, S, 3], 1)
    let points_ndc = weights
        .unsqueeze_dim::<3>(2)
        .mul(points_neighbor)
        .sum_dim(1)
        .reshape([point_count, 3]);
    let points_world = ndc_to_world(points_ndc, intrinsics);

    // R[3, 3]
    let rotation = pose_neighbor.to_owned().slice([0..3, 0..3]);
    // t[1, 3]
    let translation = pose_neighbor.slice([0..3, 3..4]).transpose();
    // R^T * (p - t) in row form: (p - t)[N, 3] * R[3, 3]
    let points_view = points_world.sub(translation).matmul(rotation);

    let x = points_view.to_owned().slice([0..point_count, 0..1]);
    let y = points_view.to_owned().slice([0..point_count, 1..2]);
    let depth = points_view.slice([0..point_count, 2..3]).neg();

    let focal = intrinsics.focal;
    let u = x
        .mul_scalar(focal)
        .div(depth.to_owned())
        .add_scalar(intrinsics.width as f64 / 2.0);
    let v = y
        .neg()
        .mul_scalar(focal)
        .div(depth)
        .add_scalar(intrinsics.height as f64 / 2.0);

    Tensor::cat(vec![u, v], 1).sub(pixels)
}

#[cfg(test)]
mod tests {
    fn pose_translated<B: super::Backend>(
        x: f32,
        device: &B::Device,
    ) -> super::Tensor<B, 2> {
        super::Tensor::from_floats(
            [[1.0, 0.0, 0.0, x], [0.0, 1.0, 0.0, 0.0], [0.0, 0.0, 1.0, 0.0]],
            device,
        )
    }

    #[test]
    fn induce_flow_identity() {
        use super::*;
        use burn::{backend::NdArray, tensor::TensorData};

        let device = Default::default();
        let intrinsics = Intrinsics::new(4, 8, 2.0);

        // The second sample carries all the weight.
        let weights =
            Tensor::<NdArray, 2>::from_floats([[0.0, 1.0], [0.0, 1.0]], &device);
        let points = Tensor::<NdArray, 3>::from_floats(
            [
                [[0.9, 0.9, 0.5], [0.0, 0.0, 0.0]],
                [[0.9, 0.9, 0.5], [0.5, -0.5, 0.0]],
            ],
            &device,
        );
        // u = (x' + 1) * W / 2, v = (1 - y') * H / 2
        let pixels = Tensor::from_floats([[4.0, 2.0], [5.0, 2.0]], &device);

        let output = induce_flow(
            &intrinsics,
            pose_translated(0.0, &device),
            weights,
            points,
            pixels,
        );

        assert_eq!(output.dims(), [2, 2]);
        output
            .into_data()
            .assert_approx_eq(&TensorData::from([[0.0_f32, 0.0], [1.0, 1.0]]), 5);
    }

    #[test]
    fn induce_flow_translated() {
        use super::*;
        use burn::{backend::NdArray, tensor::TensorData};

        let device = Default::default();
        let intrinsics = Intrinsics::new(4, 8, 2.0);

        let weights = Tensor::<NdArray, 2>::from_floats([[0.5, 0.5]], &device);
        let points = Tensor::<NdArray, 3>::from_floats(
            [[[0.0, 0.0, 0.0], [0.0, 0.0, 0.0]]],
            &device,
        );
        let pixels = Tensor::from_floats([[4.0, 2.0]], &device);

        // The camera moves right by 1, so the point at depth 2 moves left by f / 2.
        let output = induce_flow(
            &intrinsics,
            pose_translated(1.0, &device),
            weights,
            points,
            pixels,
        );

        output
            .into_data()
            .assert_approx_eq(&TensorData::from([[-1.0_f32, 0.0]]), 5);
    }
}
