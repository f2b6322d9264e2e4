//! Training a dynamic radiance field from a monocular video.
//!
//! Every iteration samples a frame and its rays, renders them, evaluates the
//! objective, back-propagates and steps the optimizer.

pub mod config;
pub mod context;
pub mod observer;

pub use crate::{
    dataset::{RayBatch, VideoDataset},
    error::Error,
    loss::{DynamicObjective, LossRecord, LossWeights, NeighborPoses},
    optimize::{LearningRate, LearningRateConfig},
    range::RangeOptions,
    render::{DynamicSceneModel, RenderRequest},
    schedule::{Schedule, ScheduleConfig, ScheduleSignals},
};
pub use burn::{
    config::Config,
    optim::{adaptor::OptimizerAdaptor, Adam, AdamConfig, GradientsParams, Optimizer},
    tensor::{
        backend::{AutodiffBackend, Backend},
        ElementConversion, Tensor,
    },
};
pub use config::*;
pub use context::*;
pub use observer::*;

use rand::{rngs::StdRng, Rng, SeedableRng};
use std::fmt;

/// The trainer of a dynamic radiance field.
pub struct DynamicNerfTrainer<AB: AutodiffBackend, M: DynamicSceneModel<AB>> {
    /// The configuration it was initialized with.
    pub config: DynamicNerfTrainerConfig,
    /// The model and the optimizer state.
    pub context: TrainingContext<AB, M>,
    /// The frames to sample from.
    pub dataset: VideoDataset<AB>,
    /// The loss terms and their weights.
    pub objective: DynamicObjective<AB>,
    /// Sampling the frames and the rays.
    pub rng: StdRng,
}

/// The outcome of one iteration.
#[derive(Clone, Debug)]
pub struct StepReport<B: Backend> {
    /// The sampled frame.
    pub frame_index: usize,
    /// The iteration of the phase.
    pub iteration: u64,
    /// The learning rate for the next iteration.
    pub learning_rate: f64,
    /// The total loss.
    pub loss: f32,
    /// The evaluated terms.
    pub record: LossRecord<B>,
    /// The signals of the iteration.
    pub signals: ScheduleSignals,
}

impl<AB: AutodiffBackend, M: DynamicSceneModel<AB>> DynamicNerfTrainer<AB, M> {
    /// Pretraining the static branch if configured, then training both branches
    /// until the configured iteration count.
    pub fn train<O: TrainingObserver<AB, M>>(
        &mut self,
        observer: &mut O,
    ) -> Result<&mut Self, Error> {
        let pretrain_iteration_count = self.config.pretrain_iteration_count;

        if self.context.iteration_pretrain < pretrain_iteration_count {
            log::info!(
                target: "dynerf::trainer::train",
                "DynamicNerfTrainer::train > pretrain ({} iterations)",
                pretrain_iteration_count - self.context.iteration_pretrain,
            );

            while self.context.iteration_pretrain < pretrain_iteration_count {
                let report = self.pretrain_step()?;
                self.report(&report, observer)?;
            }

            observer.on_pretrained(&self.context)?;
            self.finish_pretraining();
        }

        log::info!(
            target: "dynerf::trainer::train",
            "DynamicNerfTrainer::train > main ({} iterations)",
            self.config
                .iteration_count
                .saturating_sub(self.context.iteration),
        );

        while self.context.iteration < self.config.iteration_count {
            let report = self.train_step()?;

            if self.config.range_checkpoint.has(report.iteration) {
                observer.on_checkpoint(&self.context)?;
            }
            self.report(&report, observer)?;
        }

        Ok(self)
    }

    /// One iteration of the static branch with the single photometric term.
    pub fn pretrain_step(&mut self) -> Result<StepReport<AB>, Error> {
        let iteration = self.context.iteration_pretrain;
        let signals = ScheduleSignals::pretrain();
        let batch = self.sample_batch()?;
        let request = self.get_render_request(&batch)?;

        let output = self.context.model.render_static(&request);
        output.validate(batch.ray_count())?;

        let record = self.objective.evaluate_static(&output, &batch);
        let loss = self.objective.total(&record, signals.temperature);
        let loss_value = check_finite(iteration, &loss)?;

        self.context.optimize(loss);
        self.context.learning_rate.update(iteration);
        self.context.iteration_pretrain += 1;

        #[cfg(all(debug_assertions, not(test)))]
        log::debug!(
            target: "dynerf::trainer::train",
            "DynamicNerfTrainer::pretrain_step > iteration ({iteration}) loss ({loss_value})",
        );

        Ok(StepReport {
            frame_index: batch.frame_index,
            iteration,
            learning_rate: *self.context.learning_rate,
            loss: loss_value,
            record,
            signals,
        })
    }

    /// One iteration of both branches with every term active under the schedule.
    pub fn train_step(&mut self) -> Result<StepReport<AB>, Error> {
        let iteration = self.context.iteration;
        let schedule = self.context.schedule;
        let signals = schedule.signals(iteration);

        if schedule.is_decay_boundary(iteration) {
            log::info!(
                target: "dynerf::trainer::train",
                "DynamicNerfTrainer::train_step > decay boundary ({iteration}) temperature ({})",
                signals.temperature,
            );
        }

        let batch = self.sample_batch()?;
        let request = self.get_render_request(&batch)?;
        let neighbors = NeighborPoses::init(&self.dataset, batch.frame_index)?;

        let output = self
            .context
            .model
            .render_dynamic(&request, signals.phase.is_chained());
        output.validate(
            batch.ray_count(),
            output.sample_count(),
            signals.phase,
        )?;

        let record =
            self.objective
                .evaluate_dynamic(&output, &batch, &neighbors, &signals);
        let loss = self.objective.total(&record, signals.temperature);
        let loss_value = check_finite(iteration, &loss)?;

        self.context.optimize(loss);
        self.context.learning_rate.update(iteration);
        self.context.iteration += 1;

        #[cfg(all(debug_assertions, not(test)))]
        log::debug!(
            target: "dynerf::trainer::train",
            "DynamicNerfTrainer::train_step > iteration ({iteration}) loss ({loss_value})",
        );

        Ok(StepReport {
            frame_index: batch.frame_index,
            iteration,
            learning_rate: *self.context.learning_rate,
            loss: loss_value,
            record,
            signals,
        })
    }

    /// Freezing the static branch and restarting the optimizer and the learning rate.
    pub fn finish_pretraining(&mut self) -> &mut Self {
        self.context.model = self.context.model.to_owned().freeze_static();
        self.context.optimizer = self.config.init_optimizer();
        self.context.learning_rate = self.config.learning_rate.init();

        log::info!(
            target: "dynerf::trainer::train",
            "DynamicNerfTrainer::finish_pretraining > iteration_pretrain ({})",
            self.context.iteration_pretrain,
        );

        self
    }

    fn sample_batch(&mut self) -> Result<RayBatch<AB>, Error> {
        let frame_index = self.rng.gen_range(0..self.dataset.frame_count());
        self.dataset
            .select_batch(frame_index, self.config.ray_count, &mut self.rng)
    }

    fn get_render_request(
        &self,
        batch: &RayBatch<AB>,
    ) -> Result<RenderRequest<AB>, Error> {
        Ok(RenderRequest {
            chunk: self.config.chunk,
            frame_index: batch.frame_index,
            intrinsics: self.dataset.intrinsics,
            pixels: batch.pixels.to_owned(),
            pose: self.dataset.pose(batch.frame_index)?,
            time: self.dataset.time(batch.frame_index),
        })
    }

    fn report<O: TrainingObserver<AB, M>>(
        &self,
        report: &StepReport<AB>,
        observer: &mut O,
    ) -> Result<(), Error> {
        let iteration = report.iteration;

        if self.config.range_preview.has(iteration) {
            observer.on_preview(iteration, report.frame_index, &self.context.model)?;
        }

        if self.config.range_log.has(iteration) {
            let record = report.to_log_record();

            log::info!(
                target: "dynerf::trainer::train",
                "Step: {iteration}, Loss: {}, Pretrain: {}, Chained: {}, LR: {:.3e}",
                record.loss,
                record.is_pretrain,
                record.chained,
                record.learning_rate,
            );

            observer.on_log(&record)?;
        }

        Ok(())
    }
}

/// Reading the scalar loss, or failing if it is not finite.
fn check_finite<B: Backend>(
    iteration: u64,
    loss: &Tensor<B, 1>,
) -> Result<f32, Error> {
    let value = loss.to_owned().into_scalar().elem::<f32>();
    if !value.is_finite() {
        return Err(Error::NonFiniteLoss(iteration, value));
    }
    Ok(value)
}

impl<AB: AutodiffBackend, M: DynamicSceneModel<AB>> fmt::Debug
    for DynamicNerfTrainer<AB, M>
{
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.debug_struct("DynamicNerfTrainer")
            .field("config", &self.config)
            .field("context", &self.context)
            .field("dataset", &self.dataset)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use burn::{
        module::{Module, Param, ParamId},
        tensor::{backend::Backend, Tensor},
    };

    type AB = burn::backend::Autodiff<burn::backend::NdArray>;

    /// A model of one static and one dynamic color.
    #[derive(Module, Debug)]
    struct ToyModel<B: Backend> {
        color_dynamic: Param<Tensor<B, 1>>,
        color_static: Param<Tensor<B, 1>>,
    }

    impl<B: Backend> ToyModel<B> {
        fn init(device: &B::Device) -> Self {
            Self {
                color_dynamic: Param::from_tensor(Tensor::zeros([3], device)),
                color_static: Param::from_tensor(Tensor::zeros([3], device)),
            }
        }
    }

    fn broadcast<B: Backend>(
        color: Tensor<B, 1>,
        ray_count: usize,
    ) -> Tensor<B, 2> {
        Tensor::ones([ray_count, 3], &color.device()).mul(color.unsqueeze_dim(0))
    }

    impl<B: super::AutodiffBackend> super::DynamicSceneModel<B> for ToyModel<B> {
        fn render_static(
            &self,
            request: &super::RenderRequest<B>,
        ) -> crate::render::StaticRenderOutput<B> {
            use crate::render::*;

            StaticRenderOutput {
                rgb_map_s: broadcast(self.color_static.val(), request.ray_count()),
            }
        }

        fn render_dynamic(
            &self,
            request: &super::RenderRequest<B>,
            chained: bool,
        ) -> crate::render::DynamicRenderOutput<B> {
            use crate::render::*;

            let n = request.ray_count();
            let width = request.intrinsics.width as f64;
            let device = &request.pixels.device();
            let color = broadcast(self.color_dynamic.val(), n);

            let mut output = DynamicRenderOutput::zeros(n, 2, chained, device);
            output.chained = output.chained.map(|mut chained| {
                chained.rgb_map_d_b_b = color.to_owned();
                chained.rgb_map_d_f_f = color.to_owned();
                chained
            });
            // The flat pixel indices are distinct and shifted by a parameter.
            output.depth_map_obj = request
                .pixels
                .to_owned()
                .slice([0..n, 0..1])
                .add(request.pixels.to_owned().slice([0..n, 1..2]).mul_scalar(width))
                .reshape([n])
                .add(self.color_dynamic.val().slice([0..1]));
            output.rgb_map_d_b = color.to_owned();
            output.rgb_map_d_f = color.to_owned();
            output.rgb_map_full = color.to_owned();
            output.rgb_map_obj = color;
            output.rgb_map_s = broadcast(self.color_static.val(), n);
            output
        }

        fn freeze_static(mut self) -> Self {
            self.color_static = Param::initialized(
                ParamId::new(),
                self.color_static.val().set_require_grad(false),
            );
            self
        }
    }

    #[derive(Default)]
    struct Recorder {
        checkpoints: Vec<u64>,
        color_static: Option<Vec<f32>>,
        logs: Vec<super::LogRecord>,
        pretrained: Vec<u64>,
        previews: Vec<(u64, usize)>,
    }

    impl super::TrainingObserver<AB, ToyModel<AB>> for Recorder {
        fn on_log(
            &mut self,
            record: &super::LogRecord,
        ) -> Result<(), super::Error> {
            self.logs.push(record.to_owned());
            Ok(())
        }

        fn on_checkpoint(
            &mut self,
            context: &super::TrainingContext<AB, ToyModel<AB>>,
        ) -> Result<(), super::Error> {
            self.checkpoints.push(context.iteration);
            Ok(())
        }

        fn on_preview(
            &mut self,
            iteration: u64,
            frame_index: usize,
            _model: &ToyModel<AB>,
        ) -> Result<(), super::Error> {
            self.previews.push((iteration, frame_index));
            Ok(())
        }

        fn on_pretrained(
            &mut self,
            context: &super::TrainingContext<AB, ToyModel<AB>>,
        ) -> Result<(), super::Error> {
            self.pretrained.push(context.iteration_pretrain);
            self.color_static = Some(
                context
                    .model
                    .color_static
                    .val()
                    .into_data()
                    .to_vec::<f32>()
                    .unwrap(),
            );
            Ok(())
        }
    }

    /// Three frames of 2 x 4 pixels.
    fn dataset(inverse_depth: impl Fn(usize) -> f32) -> super::VideoDataset<AB> {
        use super::*;
        use crate::{dataset::Frame, geometry::Intrinsics};

        let intrinsics = Intrinsics::new(2, 4, 2.0);
        let frames = (0..3)
            .map(|f| Frame {
                flow_grid: (0..8)
                    .flat_map(|p| {
                        let (x, y) = ((p % 4) as f32, (p / 4) as f32);
                        [x, y, 0.5, 0.0, 1.0, -0.5, 0.0, 1.0]
                    })
                    .collect(),
                image: (0..8)
                    .flat_map(|p| [p as f32 / 8.0, 0.5, f as f32 / 3.0])
                    .collect(),
                inverse_depth: (0..8).map(&inverse_depth).collect(),
                motion_mask: (0..8).map(|p| (p % 2) as f32).collect(),
                pose: [
                    [1.0, 0.0, 0.0, f as f32 * 0.1],
                    [0.0, 1.0, 0.0, 0.0],
                    [0.0, 0.0, 1.0, 0.0],
                ],
            })
            .collect::<Vec<_>>();

        VideoDataset::init(&frames, intrinsics, &Default::default()).unwrap()
    }

    #[test]
    fn train() {
        use super::*;

        let device = Default::default();
        let config = DynamicNerfTrainerConfig::new()
            .with_iteration_count(6)
            .with_pretrain_iteration_count(3)
            .with_range_checkpoint(RangeOptions::default_with_step(2))
            .with_range_log(RangeOptions::default_with_step(2))
            .with_range_preview(RangeOptions::default_with_step(4))
            .with_ray_count(4);
        let mut trainer = config
            .init(ToyModel::<AB>::init(&device), dataset(|p| 1.0 + p as f32))
            .unwrap();
        let mut recorder = Recorder::default();

        trainer.train(&mut recorder).unwrap();

        assert_eq!(trainer.context.iteration, 6);
        assert_eq!(trainer.context.iteration_pretrain, 3);
        assert_eq!(recorder.pretrained, [3]);
        assert_eq!(recorder.checkpoints, [1, 3, 5]);

        let previews = recorder
            .previews
            .iter()
            .map(|(iteration, _)| *iteration)
            .collect::<Vec<_>>();
        assert_eq!(previews, [0, 0, 4]);
        assert!(recorder.previews.iter().all(|(_, frame_index)| *frame_index < 3));

        let logs = recorder
            .logs
            .iter()
            .map(|record| (record.iteration, record.is_pretrain))
            .collect::<Vec<_>>();
        assert_eq!(logs, [(0, true), (2, true), (0, false), (2, false), (4, false)]);

        let log_pretrain = &recorder.logs[0];
        let keys = log_pretrain.entries.iter().map(|(key, _)| *key).collect::<Vec<_>>();
        assert_eq!(keys, ["psnr_s", "img_s_loss"]);
        assert!(log_pretrain.loss.is_finite());

        let log_main = &recorder.logs[2];
        assert_eq!(log_main.entries[0].0, "mask_loss");
        assert!(!log_main.chained);
        assert_eq!(log_main.temperature, 1.0);
        assert!(log_main.learning_rate > 0.0 && log_main.learning_rate <= 5e-4);

        // The static branch is trained only while pretraining.
        let color_static_pretrained = recorder.color_static.unwrap();
        let color_static = trainer
            .context
            .model
            .color_static
            .val()
            .into_data()
            .to_vec::<f32>()
            .unwrap();
        assert_eq!(color_static, color_static_pretrained);
        assert!(color_static.iter().any(|c| *c != 0.0));

        let color_dynamic = trainer
            .context
            .model
            .color_dynamic
            .val()
            .into_data()
            .to_vec::<f32>()
            .unwrap();
        assert!(color_dynamic.iter().any(|c| *c != 0.0));
        assert!(color_dynamic.iter().all(|c| c.is_finite()));
    }

    #[test]
    fn train_non_finite() {
        use super::*;

        let device = Default::default();
        let config = DynamicNerfTrainerConfig::new()
            .with_iteration_count(1)
            .with_ray_count(4);

        // The prior depth is constant, so it cannot be normalized.
        let mut trainer = config
            .init(ToyModel::<AB>::init(&device), dataset(|_| 1.0))
            .unwrap();

        let error = trainer.train(&mut ()).unwrap_err();
        assert!(matches!(error, Error::NonFiniteLoss(0, _)), "{error}");
    }

    #[test]
    fn init_invalid_ray_count() {
        use super::*;

        let device = Default::default();
        let config = DynamicNerfTrainerConfig::new().with_ray_count(9);

        let error = config
            .init(ToyModel::<AB>::init(&device), dataset(|p| p as f32))
            .unwrap_err();
        assert!(matches!(error, Error::Validation(_, _)), "{error}");
    }

    #[test]
    fn init_invalid_schedule() {
        use super::*;

        let device = Default::default();
        let config = DynamicNerfTrainerConfig::new()
            .with_ray_count(4)
            .with_schedule(ScheduleConfig::new().with_decay_iteration_scale(0));

        let error = config
            .init(ToyModel::<AB>::init(&device), dataset(|p| p as f32))
            .unwrap_err();
        assert!(
            matches!(&error, Error::Validation(name, _) if name.starts_with("schedule")),
            "{error}"
        );
    }
}
