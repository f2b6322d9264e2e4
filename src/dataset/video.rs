//! A monocular video sequence held in memory.

pub use crate::{error::Error, geometry::Intrinsics};
pub use burn::tensor::{backend::Backend, Int, Tensor, TensorData};

use rand::{seq::index, Rng};
use rayon::iter::{IndexedParallelIterator, IntoParallelRefIterator, ParallelIterator};
use std::fmt;

/// The channels of a flow grid:
/// `x, y, flow_f (2), confidence_f (1), flow_b (2), confidence_b (1)`.
pub const FLOW_GRID_CHANNEL_COUNT: usize = 8;

/// A decoded frame.
///
/// Every image-shaped field is in row-major order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Frame {
    /// `[H, W, 8]`
    pub flow_grid: Vec<f32>,
    /// `[H, W, 3]` ranging from `0.0` to `1.0`.
    pub image: Vec<f32>,
    /// The inverse depth (disparity) estimated by a monocular prior, `[H, W]`.
    pub inverse_depth: Vec<f32>,
    /// `[H, W]`, `1.0` for moving content and `0.0` otherwise.
    pub motion_mask: Vec<f32>,
    /// The camera-to-world pose, `[3, 4]`.
    pub pose: [[f32; 4]; 3],
}

/// The frames of a video stacked into tensors.
///
/// `F` is the count of frames and `P = H * W` is the count of pixels.
#[derive(Clone)]
pub struct VideoDataset<B: Backend> {
    /// `[F, P, 8]`
    pub flow_grids: Tensor<B, 3>,
    /// `[F, P, 3]`
    pub images: Tensor<B, 3>,
    /// The intrinsics shared by the frames.
    pub intrinsics: Intrinsics,
    /// `[F, P, 1]`
    pub inverse_depths: Tensor<B, 3>,
    /// `[F, 3, 4]`
    pub poses: Tensor<B, 3>,
    /// The complement of the motion masks, `[F, P, 1]`.
    pub static_masks: Tensor<B, 3>,
}

/// Rays sampled from one frame.
///
/// `N` is the count of rays.
#[derive(Clone, Debug)]
pub struct RayBatch<B: Backend> {
    /// The flow grid, `[N, 8]`.
    pub grid: Tensor<B, 2>,
    /// The index of the sampled frame.
    pub frame_index: usize,
    /// `[N]`
    pub inverse_depth: Tensor<B, 1>,
    /// The pixel positions `(x, y)`, `[N, 2]`.
    pub pixels: Tensor<B, 2>,
    /// `[N, 1]`, `1.0` for static content.
    pub static_mask: Tensor<B, 2>,
    /// `[N, 3]`
    pub target_rgb: Tensor<B, 2>,
}

impl<B: Backend> VideoDataset<B> {
    /// Stacking the frames after checking their lengths and masks.
    ///
    /// ## Errors
    ///
    /// * [`Error::EmptyDataset`] if there is no frame.
    /// * [`Error::Validation`] if a buffer length disagrees with the intrinsics.
    /// * [`Error::InvalidMaskValue`] if a motion mask value is neither `0` nor `1`.
    pub fn init(
        frames: &[Frame],
        intrinsics: Intrinsics,
        device: &B::Device,
    ) -> Result<Self, Error> {
        if frames.is_empty() {
            return Err(Error::EmptyDataset);
        }

        let frame_count = frames.len();
        let pixel_count = intrinsics.pixel_count();

        frames.par_iter().enumerate().try_for_each(|(index, frame)| {
            validate_len(index, "flow_grid", frame.flow_grid.len(), pixel_count * 8)?;
            validate_len(index, "image", frame.image.len(), pixel_count * 3)?;
            validate_len(index, "inverse_depth", frame.inverse_depth.len(), pixel_count)?;
            validate_len(index, "motion_mask", frame.motion_mask.len(), pixel_count)?;

            match frame.motion_mask.iter().find(|&&m| m != 0.0 && m != 1.0) {
                Some(&value) => Err(Error::InvalidMaskValue(index, value)),
                None => Ok(()),
            }
        })?;

        let stack = |values: Vec<f32>, dims: [usize; 3]| {
            Tensor::<B, 3>::from_data(TensorData::new(values, dims), device)
        };
        let flatten = |field: fn(&Frame) -> &[f32]| {
            frames
                .par_iter()
                .flat_map_iter(|frame| field(frame).iter().copied())
                .collect::<Vec<_>>()
        };

        let flow_grids = stack(
            flatten(|f| f.flow_grid.as_slice()),
            [frame_count, pixel_count, FLOW_GRID_CHANNEL_COUNT],
        );
        let images = stack(flatten(|f| f.image.as_slice()), [frame_count, pixel_count, 3]);
        let inverse_depths =
            stack(flatten(|f| f.inverse_depth.as_slice()), [frame_count, pixel_count, 1]);
        // The stored mask is the complement of the motion mask.
        let static_masks = stack(flatten(|f| f.motion_mask.as_slice()), [frame_count, pixel_count, 1])
            .neg()
            .add_scalar(1.0);
        let poses = stack(
            frames
                .iter()
                .flat_map(|frame| frame.pose.into_iter().flatten())
                .collect(),
            [frame_count, 3, 4],
        );

        #[cfg(all(debug_assertions, not(test)))]
        log::debug!(
            target: "dynerf::trainer::dataset::video",
            "VideoDataset::init > frame_count ({frame_count}) pixel_count ({pixel_count})",
        );

        Ok(Self {
            flow_grids,
            images,
            intrinsics,
            inverse_depths,
            poses,
            static_masks,
        })
    }

    /// The count of frames.
    #[inline]
    pub fn frame_count(&self) -> usize {
        self.poses.dims()[0]
    }

    /// The normalized time of the frame in `[-1, 1)`.
    #[inline]
    pub fn time(
        &self,
        frame_index: usize,
    ) -> f64 {
        frame_index as f64 / self.frame_count() as f64 * 2.0 - 1.0
    }

    /// The camera-to-world pose of the frame with shape `[3, 4]`.
    pub fn pose(
        &self,
        frame_index: usize,
    ) -> Result<Tensor<B, 2>, Error> {
        self.check_frame_index(frame_index)?;

        Ok(self
            .poses
            .to_owned()
            .slice([frame_index..frame_index + 1, 0..3, 0..4])
            .reshape([3, 4]))
    }

    /// Sampling rays from the frame without replacement.
    pub fn select_batch<R: Rng + ?Sized>(
        &self,
        frame_index: usize,
        ray_count: usize,
        rng: &mut R,
    ) -> Result<RayBatch<B>, Error> {
        self.check_frame_index(frame_index)?;

        let pixel_count = self.intrinsics.pixel_count();
        if ray_count > pixel_count {
            return Err(Error::RayBatchTooLarge(ray_count, pixel_count));
        }

        let device = &self.poses.device();
        let width = self.intrinsics.width as usize;
        let pixel_indices = index::sample(rng, pixel_count, ray_count).into_vec();

        // [N, 2]
        let pixels = Tensor::from_data(
            TensorData::new(
                pixel_indices
                    .iter()
                    .flat_map(|&i| [(i % width) as f32, (i / width) as f32])
                    .collect(),
                [ray_count, 2],
            ),
            device,
        );
        // [N]
        let pixel_indices = Tensor::<B, 1, Int>::from_data(
            TensorData::new(
                pixel_indices.into_iter().map(|i| i as i64).collect(),
                [ray_count],
            )
            .convert::<B::IntElem>(),
            device,
        );

        let select = |frames: &Tensor<B, 3>| {
            let channel_count = frames.dims()[2];
            frames
                .to_owned()
                .slice([frame_index..frame_index + 1, 0..pixel_count, 0..channel_count])
                .reshape([pixel_count, channel_count])
                .select(0, pixel_indices.to_owned())
        };

        Ok(RayBatch {
            grid: select(&self.flow_grids),
            frame_index,
            inverse_depth: select(&self.inverse_depths).reshape([ray_count]),
            pixels,
            static_mask: select(&self.static_masks),
            target_rgb: select(&self.images),
        })
    }

    fn check_frame_index(
        &self,
        frame_index: usize,
    ) -> Result<(), Error> {
        if frame_index >= self.frame_count() {
            return Err(Error::UnknownFrameIndex(frame_index));
        }
        Ok(())
    }
}

impl<B: Backend> RayBatch<B> {
    /// The count of rays.
    #[inline]
    pub fn ray_count(&self) -> usize {
        self.pixels.dims()[0]
    }

    /// `1 - static_mask`, `[N, 1]`
    #[inline]
    pub fn dynamic_mask(&self) -> Tensor<B, 2> {
        self.static_mask.to_owned().neg().add_scalar(1.0)
    }

    /// The pixel positions stored in the flow grid, `[N, 2]`.
    #[inline]
    pub fn grid_pixels(&self) -> Tensor<B, 2> {
        self.grid_channels(0..2)
    }

    /// The measured flow to the next frame, `[N, 2]`.
    #[inline]
    pub fn flow_f(&self) -> Tensor<B, 2> {
        self.grid_channels(2..4)
    }

    /// `[N, 1]`
    #[inline]
    pub fn confidence_f(&self) -> Tensor<B, 2> {
        self.grid_channels(4..5)
    }

    /// The measured flow to the previous frame, `[N, 2]`.
    #[inline]
    pub fn flow_b(&self) -> Tensor<B, 2> {
        self.grid_channels(5..7)
    }

    /// `[N, 1]`
    #[inline]
    pub fn confidence_b(&self) -> Tensor<B, 2> {
        self.grid_channels(7..8)
    }

    fn grid_channels(
        &self,
        channels: std::ops::Range<usize>,
    ) -> Tensor<B, 2> {
        self.grid
            .to_owned()
            .slice([0..self.ray_count(), channels])
    }
}

fn validate_len(
    index: usize,
    name: &str,
    len: usize,
    target: usize,
) -> Result<(), Error> {
    if len != target {
        return Err(Error::Validation(
            format!("frames[{index}].{name}.len() ({len})"),
            format!("{target}"),
        ));
    }
    Ok(())
}

impl<B: Backend> fmt::Debug for VideoDataset<B> {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.debug_struct("VideoDataset")
            .field("frame_count", &self.frame_count())
            .field("intrinsics", &self.intrinsics)
            .finish()
    }
}
