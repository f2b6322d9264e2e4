//! The named terms evaluated in one step.

pub use super::*;

/// The loss terms of one step.
///
/// An absent term was inactive and contributes nothing.
#[derive(Clone, Debug)]
pub struct LossRecord<B: Backend> {
    /// `consistency_loss`
    pub consistency: Option<Tensor<B, 1>>,
    /// `depth_loss`
    pub depth: Option<Tensor<B, 1>>,
    /// `flow_b_loss`, absent at the first frame.
    pub flow_b: Option<Tensor<B, 1>>,
    /// `flow_f_loss`, absent at the last frame.
    pub flow_f: Option<Tensor<B, 1>>,
    /// The dynamic colors at `t - 1`.
    pub img_d_b: Option<PhotometricTerm<B>>,
    /// The dynamic colors at `t - 2`, only when chaining.
    pub img_d_b_b: Option<PhotometricTerm<B>>,
    /// The dynamic colors at `t + 1`.
    pub img_d_f: Option<PhotometricTerm<B>>,
    /// The dynamic colors at `t + 2`, only when chaining.
    pub img_d_f_f: Option<PhotometricTerm<B>>,
    /// The blended colors of both branches.
    pub img_full: Option<PhotometricTerm<B>>,
    /// The dynamic colors at `t`.
    pub img_obj: Option<PhotometricTerm<B>>,
    /// The static colors, only when pretraining.
    pub img_s: Option<PhotometricTerm<B>>,
    /// `mask_loss`, only while the mask loss is active.
    pub mask: Option<Tensor<B, 1>>,
    /// `order_loss`
    pub order: Option<Tensor<B, 1>>,
    /// `sf_smooth_loss`
    pub sf_smooth: Option<Tensor<B, 1>>,
    /// `slow_loss`
    pub slow: Option<Tensor<B, 1>>,
    /// `smooth_loss`
    pub smooth: Option<Tensor<B, 1>>,
    /// `sp_smooth_loss`
    pub sp_smooth: Option<Tensor<B, 1>>,
    /// `sparse_loss`
    pub sparse: Option<Tensor<B, 1>>,
}

impl<B: Backend> LossRecord<B> {
    /// A record without any term.
    #[inline]
    pub fn new() -> Self {
        Self {
            consistency: None,
            depth: None,
            flow_b: None,
            flow_f: None,
            img_d_b: None,
            img_d_b_b: None,
            img_d_f: None,
            img_d_f_f: None,
            img_full: None,
            img_obj: None,
            img_s: None,
            mask: None,
            order: None,
            sf_smooth: None,
            slow: None,
            smooth: None,
            sp_smooth: None,
            sparse: None,
        }
    }

    /// The present terms by name in the order of evaluation.
    ///
    /// Each photometric term is preceded by its PSNR.
    pub fn entries(&self) -> Vec<(&'static str, Tensor<B, 1>)> {
        let photometric = |term: &Option<PhotometricTerm<B>>, keys: [&'static str; 2]| {
            term.iter()
                .flat_map(move |term| {
                    [(keys[0], term.psnr.to_owned()), (keys[1], term.loss.to_owned())]
                })
                .collect::<Vec<_>>()
        };
        let scalar = |term: &Option<Tensor<B, 1>>, key: &'static str| {
            term.iter()
                .map(|loss| (key, loss.to_owned()))
                .collect::<Vec<_>>()
        };

        [
            photometric(&self.img_s, ["psnr_s", "img_s_loss"]),
            scalar(&self.mask, "mask_loss"),
            photometric(&self.img_full, ["psnr_full", "img_full_loss"]),
            photometric(&self.img_obj, ["psnr_obj", "img_obj_loss"]),
            photometric(&self.img_d_f, ["psnr_d_f", "img_d_f_loss"]),
            photometric(&self.img_d_b, ["psnr_d_b", "img_d_b_loss"]),
            photometric(&self.img_d_b_b, ["psnr_d_b_b", "img_d_b_b_loss"]),
            photometric(&self.img_d_f_f, ["psnr_d_f_f", "img_d_f_f_loss"]),
            scalar(&self.order, "order_loss"),
            scalar(&self.depth, "depth_loss"),
            scalar(&self.slow, "slow_loss"),
            scalar(&self.smooth, "smooth_loss"),
            scalar(&self.sf_smooth, "sf_smooth_loss"),
            scalar(&self.sp_smooth, "sp_smooth_loss"),
            scalar(&self.consistency, "consistency_loss"),
            scalar(&self.sparse, "sparse_loss"),
            scalar(&self.flow_f, "flow_f_loss"),
            scalar(&self.flow_b, "flow_b_loss"),
        ]
        .into_iter()
        .flatten()
        .collect()
    }

    /// The present terms by name with scalar values.
    pub fn scalars(&self) -> Vec<(&'static str, f32)> {
        self.entries()
            .into_iter()
            .map(|(key, value)| (key, value.into_scalar().elem::<f32>()))
            .collect()
    }
}

impl<B: Backend> Default for LossRecord<B> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}
