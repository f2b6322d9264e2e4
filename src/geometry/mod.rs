//! Geometric conversions between normalized device coordinates and world space.

pub mod flow;

pub use burn::{
    config::Config,
    tensor::{backend::Backend, Tensor},
};
pub use flow::*;

/// The upper bound of the NDC depth before converting to world space.
pub const NDC_DEPTH_MAX: f64 = 1.0 - 1e-3;

/// Image dimensions and focal length of the (pinhole) camera.
#[derive(Config, Copy, Debug, PartialEq)]
pub struct Intrinsics {
    /// Image height.
    pub height: u32,
    /// Image width.
    pub width: u32,
    /// Focal length in pixels.
    pub focal: f64,
}

impl Intrinsics {
    /// `height * width`
    #[inline]
    pub const fn pixel_count(&self) -> usize {
        self.height as usize * self.width as usize
    }
}

/// Converting the points in normalized device coordinates to world space.
///
/// `z = 2 / (clamp(z', -1, 1 - 1e-3) - 1)`
///
/// `x = -x' * z * W / 2f`
///
/// `y = -y' * z * H / 2f`
///
/// ## Arguments
///
/// * `points` - The points in NDC with shape `[..., 3]`.
///
/// ## Returns
///
/// The points in world space with shape `[..., 3]`.
pub fn ndc_to_world<B: Backend, const D: usize>(
    points: Tensor<B, D>,
    intrinsics: &Intrinsics,
) -> Tensor<B, D> {
    let dims = points.dims();
    let mut ranges = dims.map(|dim| 0..dim);

    ranges[D - 1] = 0..1;
    let x = points.to_owned().slice(ranges.to_owned());
    ranges[D - 1] = 1..2;
    let y = points.to_owned().slice(ranges.to_owned());
    ranges[D - 1] = 2..3;
    let z = points.slice(ranges);

    let focal_2 = 2.0 * intrinsics.focal;
    let z = z.clamp(-1.0, NDC_DEPTH_MAX).sub_scalar(1.0).recip().mul_scalar(2.0);
    let x = x
        .neg()
        .mul(z.to_owned())
        .mul_scalar(intrinsics.width as f64 / focal_2);
    let y = y
        .neg()
        .mul(z.to_owned())
        .mul_scalar(intrinsics.height as f64 / focal_2);

    Tensor::cat(vec![x, y, z], D - 1)
}
