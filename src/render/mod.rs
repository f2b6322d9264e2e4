//! The contract of the external renderer.
//!
//! The radiance fields and the volumetric integration live outside of this crate.
//! A model implements [`DynamicSceneModel`] and returns typed outputs for the rays
//! it was asked to render.

pub use crate::{
    error::Error,
    geometry::Intrinsics,
    schedule::TrainingPhase,
};
pub use burn::{
    module::AutodiffModule,
    tensor::{
        backend::{AutodiffBackend, Backend},
        Tensor,
    },
};

use std::fmt;

/// A model with a static and a time-varying radiance field.
pub trait DynamicSceneModel<AB: AutodiffBackend>: AutodiffModule<AB> {
    /// Rendering the static branch only.
    fn render_static(
        &self,
        request: &RenderRequest<AB>,
    ) -> StaticRenderOutput<AB>;

    /// Rendering both branches at the current and the adjacent times.
    ///
    /// The frames at `t - 2` and `t + 2` are rendered only if `chained` is set.
    fn render_dynamic(
        &self,
        request: &RenderRequest<AB>,
        chained: bool,
    ) -> DynamicRenderOutput<AB>;

    /// Excluding the parameters of the static branch from the gradients.
    fn freeze_static(self) -> Self;
}

/// The rays to render.
#[derive(Clone)]
pub struct RenderRequest<B: Backend> {
    /// The maximum count of rays rendered at once.
    pub chunk: usize,
    /// The frame index.
    pub frame_index: usize,
    /// The intrinsics of the frame.
    pub intrinsics: Intrinsics,
    /// The pixel positions `(x, y)` of the rays with shape `[N, 2]`.
    pub pixels: Tensor<B, 2>,
    /// The camera-to-world pose with shape `[3, 4]`.
    pub pose: Tensor<B, 2>,
    /// The normalized time in `[-1, 1)`.
    pub time: f64,
}

/// `[N, 3]`
#[derive(Clone, Debug)]
pub struct StaticRenderOutput<B: Backend> {
    /// The colors of the static branch.
    pub rgb_map_s: Tensor<B, 2>,
}

/// The colors of the frames at `t - 2` and `t + 2`, each with shape `[N, 3]`.
#[derive(Clone, Debug)]
pub struct ChainedRenderOutput<B: Backend> {
    /// The dynamic colors at `t - 2`.
    pub rgb_map_d_b_b: Tensor<B, 2>,
    /// The dynamic colors at `t + 2`.
    pub rgb_map_d_f_f: Tensor<B, 2>,
}

/// The outputs of both branches.
///
/// `N` is the count of rays and `S` is the count of samples per ray.
/// The sample points are in normalized device coordinates.
#[derive(Clone, Debug)]
pub struct DynamicRenderOutput<B: Backend> {
    /// The dynamic share of each sample. `[N, S]`, or `[N, 1]` per ray.
    pub blending: Tensor<B, 2>,
    /// `None` unless chaining 5 frames.
    pub chained: Option<ChainedRenderOutput<B>>,
    /// `[N]`
    pub depth_map_d: Tensor<B, 1>,
    /// `[N]`
    pub depth_map_obj: Tensor<B, 1>,
    /// `[N]`
    pub depth_map_s: Tensor<B, 1>,
    /// `[N]`
    pub dynamicness_map: Tensor<B, 1>,
    /// `[N, S, 3]`
    pub raw_pts: Tensor<B, 3>,
    /// `[N, S, 3]`
    pub raw_pts_b: Tensor<B, 3>,
    /// `[N, S, 3]`
    pub raw_pts_b_b: Tensor<B, 3>,
    /// `[N, S, 3]`
    pub raw_pts_f: Tensor<B, 3>,
    /// `[N, S, 3]`
    pub raw_pts_f_f: Tensor<B, 3>,
    /// `[N, 3]`
    pub rgb_map_d_b: Tensor<B, 2>,
    /// `[N, 3]`
    pub rgb_map_d_f: Tensor<B, 2>,
    /// `[N, 3]`
    pub rgb_map_full: Tensor<B, 2>,
    /// `[N, 3]`
    pub rgb_map_obj: Tensor<B, 2>,
    /// `[N, 3]`
    pub rgb_map_s: Tensor<B, 2>,
    /// `[N, S, 3]`
    pub sceneflow_b: Tensor<B, 3>,
    /// `[N, S, 3]`
    pub sceneflow_b_f: Tensor<B, 3>,
    /// `[N, S, 3]`
    pub sceneflow_f: Tensor<B, 3>,
    /// `[N, S, 3]`
    pub sceneflow_f_b: Tensor<B, 3>,
    /// `[N, S]`
    pub weights_d: Tensor<B, 2>,
}

impl<B: Backend> RenderRequest<B> {
    /// The count of rays.
    #[inline]
    pub fn ray_count(&self) -> usize {
        self.pixels.dims()[0]
    }
}

impl<B: Backend> StaticRenderOutput<B> {
    /// Checking the shape against the count of rays.
    pub fn validate(
        &self,
        ray_count: usize,
    ) -> Result<&Self, Error> {
        validate_dims("rgb_map_s", self.rgb_map_s.dims(), [ray_count, 3])?;
        Ok(self)
    }
}

impl<B: Backend> DynamicRenderOutput<B> {
    /// The count of samples per ray.
    #[inline]
    pub fn sample_count(&self) -> usize {
        self.raw_pts.dims()[1]
    }

    /// Checking the shapes against the count of rays and samples.
    ///
    /// ## Details
    ///
    /// * The chained colors are required if `phase` is chained.
    pub fn validate(
        &self,
        ray_count: usize,
        sample_count: usize,
        phase: TrainingPhase,
    ) -> Result<&Self, Error> {
        let n = ray_count;
        let s = sample_count;
        let blending_dims = self.blending.dims();

        validate_dims("rgb_map_s", self.rgb_map_s.dims(), [n, 3])?;
        validate_dims("rgb_map_full", self.rgb_map_full.dims(), [n, 3])?;
        validate_dims("rgb_map_obj", self.rgb_map_obj.dims(), [n, 3])?;
        validate_dims("rgb_map_d_f", self.rgb_map_d_f.dims(), [n, 3])?;
        validate_dims("rgb_map_d_b", self.rgb_map_d_b.dims(), [n, 3])?;
        if blending_dims != [n, 1] {
            validate_dims("blending", blending_dims, [n, s])?;
        }
        validate_dims("dynamicness_map", self.dynamicness_map.dims(), [n])?;
        validate_dims("weights_d", self.weights_d.dims(), [n, s])?;
        validate_dims("depth_map_d", self.depth_map_d.dims(), [n])?;
        validate_dims("depth_map_s", self.depth_map_s.dims(), [n])?;
        validate_dims("depth_map_obj", self.depth_map_obj.dims(), [n])?;
        validate_dims("sceneflow_f", self.sceneflow_f.dims(), [n, s, 3])?;
        validate_dims("sceneflow_b", self.sceneflow_b.dims(), [n, s, 3])?;
        validate_dims("sceneflow_f_b", self.sceneflow_f_b.dims(), [n, s, 3])?;
        validate_dims("sceneflow_b_f", self.sceneflow_b_f.dims(), [n, s, 3])?;
        validate_dims("raw_pts", self.raw_pts.dims(), [n, s, 3])?;
        validate_dims("raw_pts_f", self.raw_pts_f.dims(), [n, s, 3])?;
        validate_dims("raw_pts_b", self.raw_pts_b.dims(), [n, s, 3])?;
        validate_dims("raw_pts_f_f", self.raw_pts_f_f.dims(), [n, s, 3])?;
        validate_dims("raw_pts_b_b", self.raw_pts_b_b.dims(), [n, s, 3])?;

        match (&self.chained, phase.is_chained()) {
            (Some(chained), true) => {
                validate_dims("rgb_map_d_f_f", chained.rgb_map_d_f_f.dims(), [n, 3])?;
                validate_dims("rgb_map_d_b_b", chained.rgb_map_d_b_b.dims(), [n, 3])?;
            },
            (None, true) => return Err(Error::MissingRenderOutput("rgb_map_d_f_f")),
            _ => {},
        }

        Ok(self)
    }
}

fn validate_dims<const D: usize>(
    name: &str,
    dims: [usize; D],
    target: [usize; D],
) -> Result<(), Error> {
    if dims != target {
        return Err(Error::Validation(
            format!("{name}.dims() ({dims:?})"),
            format!("{target:?}"),
        ));
    }
    Ok(())
}

impl<B: Backend> fmt::Debug for RenderRequest<B> {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.debug_struct("RenderRequest")
            .field("chunk", &self.chunk)
            .field("frame_index", &self.frame_index)
            .field("intrinsics", &self.intrinsics)
            .field("pixels.dims()", &self.pixels.dims())
            .field("time", &self.time)
            .finish()
    }
}

#[cfg(test)]
impl<B: Backend> DynamicRenderOutput<B> {
    /// An output filled with zeros, or ones for the weights.
    pub(crate) fn zeros(
        ray_count: usize,
        sample_count: usize,
        is_chained: bool,
        device: &B::Device,
    ) -> Self {
        let n = ray_count;
        let s = sample_count;
        let rgb = || Tensor::zeros([n, 3], device);
        let depth = || Tensor::zeros([n], device);
        let points = || Tensor::zeros([n, s, 3], device);

        Self {
            blending: Tensor::zeros([n, s], device),
            chained: is_chained.then(|| ChainedRenderOutput {
                rgb_map_d_b_b: rgb(),
                rgb_map_d_f_f: rgb(),
            }),
            depth_map_d: depth(),
            depth_map_obj: depth(),
            depth_map_s: depth(),
            dynamicness_map: depth(),
            raw_pts: points(),
            raw_pts_b: points(),
            raw_pts_b_b: points(),
            raw_pts_f: points(),
            raw_pts_f_f: points(),
            rgb_map_d_b: rgb(),
            rgb_map_d_f: rgb(),
            rgb_map_full: rgb(),
            rgb_map_obj: rgb(),
            rgb_map_s: rgb(),
            sceneflow_b: points(),
            sceneflow_b_f: points(),
            sceneflow_f: points(),
            sceneflow_f_b: points(),
            weights_d: Tensor::ones([n, s], device),
        }
    }
}

#[cfg(test)]
mod tests {
    #[test]
    fn validate() {
        use super::*;
        use burn::backend::NdArray;

        let device = Default::default();
        let phase = TrainingPhase::Main { chained: false };

        let output = DynamicRenderOutput::<NdArray>::zeros(8, 4, false, &device);
        output.validate(8, 4, phase).unwrap();
        output.validate(9, 4, phase).unwrap_err();
        output.validate(8, 5, phase).unwrap_err();

        let mut output = DynamicRenderOutput::<NdArray>::zeros(8, 4, false, &device);
        output.blending = Tensor::zeros([8, 1], &device);
        output.validate(8, 4, phase).unwrap();

        output.depth_map_obj = Tensor::zeros([7], &device);
        let error = output.validate(8, 4, phase).unwrap_err();
        assert!(
            matches!(&error, Error::Validation(name, _) if name.starts_with("depth_map_obj")),
            "{error}"
        );
    }

    #[test]
    fn validate_chained() {
        use super::*;
        use burn::backend::NdArray;

        let device = Default::default();
        let phase = TrainingPhase::Main { chained: true };

        let output = DynamicRenderOutput::<NdArray>::zeros(8, 4, true, &device);
        output.validate(8, 4, phase).unwrap();

        let output = DynamicRenderOutput::<NdArray>::zeros(8, 4, false, &device);
        let error = output.validate(8, 4, phase).unwrap_err();
        assert!(matches!(error, Error::MissingRenderOutput(_)), "{error}");
    }

    #[test]
    fn validate_static() {
        use super::*;
        use burn::backend::NdArray;

        let device = Default::default();
        let output = StaticRenderOutput::<NdArray> {
            rgb_map_s: Tensor::zeros([8, 3], &device),
        };

        output.validate(8).unwrap();
        output.validate(4).unwrap_err();
    }
}
