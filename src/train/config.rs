//! Configuration of the trainer.

pub use super::*;

/// The configuration of [`DynamicNerfTrainer`].
#[derive(Config, Debug)]
pub struct DynamicNerfTrainerConfig {
    /// The maximum count of rays rendered at once.
    #[config(default = "32768")]
    pub chunk: usize,

    /// The iterations of the main training.
    #[config(default = "300000")]
    pub iteration_count: u64,

    /// The learning rate, restarted after pretraining.
    #[config(default = "5e-4.into()")]
    pub learning_rate: LearningRateConfig,

    /// The weights of the loss terms.
    #[config(default = "Default::default()")]
    pub loss_weights: LossWeights,

    /// The epsilon of the Adam optimizer.
    #[config(default = "1e-8")]
    pub optimizer_epsilon: f32,

    /// The iterations of pretraining the static branch.
    /// It is skipped if zero.
    #[config(default = "0")]
    pub pretrain_iteration_count: u64,

    /// The iterations to call [`TrainingObserver::on_checkpoint`].
    #[config(default = "RangeOptions::default_with_step(10000)")]
    pub range_checkpoint: RangeOptions,

    /// The iterations to log the loss terms.
    #[config(default = "RangeOptions::default_with_step(500)")]
    pub range_log: RangeOptions,

    /// The iterations to call [`TrainingObserver::on_preview`].
    #[config(default = "RangeOptions::default_with_step(500)")]
    pub range_preview: RangeOptions,

    /// The count of rays sampled from a frame per iteration.
    #[config(default = "1024")]
    pub ray_count: usize,

    /// The iteration schedule of the objective.
    #[config(default = "Default::default()")]
    pub schedule: ScheduleConfig,

    /// The seed of frame and ray sampling.
    #[config(default = "0")]
    pub seed: u64,
}

impl DynamicNerfTrainerConfig {
    /// Initialize the trainer for the model and the dataset.
    ///
    /// ## Errors
    ///
    /// * [`Error::Validation`] if `ray_count` is zero or exceeds the pixel count,
    ///   or if the schedule period is zero.
    pub fn init<AB: AutodiffBackend, M: DynamicSceneModel<AB>>(
        &self,
        model: M,
        dataset: VideoDataset<AB>,
    ) -> Result<DynamicNerfTrainer<AB, M>, Error> {
        let pixel_count = dataset.intrinsics.pixel_count();
        if self.ray_count == 0 || self.ray_count > pixel_count {
            return Err(Error::Validation(
                format!("ray_count ({})", self.ray_count),
                format!("in the range of 1 to {pixel_count}"),
            ));
        }

        let schedule = self.schedule.init(dataset.frame_count());
        if schedule.period() == 0 {
            return Err(Error::Validation(
                format!("schedule.period() ({})", schedule.period()),
                "positive".into(),
            ));
        }

        let device = dataset.poses.device();
        let objective =
            DynamicObjective::init(dataset.intrinsics, self.loss_weights, &device);
        let context = TrainingContext {
            iteration: 0,
            iteration_pretrain: 0,
            learning_rate: self.learning_rate.init(),
            model,
            optimizer: self.init_optimizer(),
            schedule,
        };

        #[cfg(all(debug_assertions, not(test)))]
        log::debug!(
            target: "dynerf::trainer::train",
            "DynamicNerfTrainerConfig::init > {:?}",
            context,
        );

        Ok(DynamicNerfTrainer {
            config: self.to_owned(),
            context,
            dataset,
            objective,
            rng: StdRng::seed_from_u64(self.seed),
        })
    }

    /// An Adam optimizer with the default moments.
    #[inline]
    pub fn init_optimizer<AB: AutodiffBackend, M: DynamicSceneModel<AB>>(
        &self
    ) -> AdamModuleOptimizer<AB, M> {
        AdamConfig::new().with_epsilon(self.optimizer_epsilon).init()
    }
}

impl Default for DynamicNerfTrainerConfig {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}
