//! The mutable state of training.

pub use super::*;

use std::fmt;

/// Adam over every parameter of the model.
pub type AdamModuleOptimizer<AB, M> =
    OptimizerAdaptor<Adam<<AB as AutodiffBackend>::InnerBackend>, M, AB>;

/// The mutable state of training.
#[derive(Clone)]
pub struct TrainingContext<AB: AutodiffBackend, M: DynamicSceneModel<AB>> {
    /// The next iteration of the main training.
    pub iteration: u64,
    /// The next iteration of pretraining.
    pub iteration_pretrain: u64,
    /// The learning rate of the next iteration.
    pub learning_rate: LearningRate,
    /// The model being trained.
    pub model: M,
    /// Reset after pretraining.
    pub optimizer: AdamModuleOptimizer<AB, M>,
    /// The iteration schedule of the main training.
    pub schedule: Schedule,
}

impl<AB: AutodiffBackend, M: DynamicSceneModel<AB>> TrainingContext<AB, M> {
    /// Updating the model with the gradients of the loss.
    pub fn optimize(
        &mut self,
        loss: Tensor<AB, 1>,
    ) -> &mut Self {
        let model = self.model.to_owned();
        let grads = GradientsParams::from_grads(loss.backward(), &model);

        self.model = self.optimizer.step(*self.learning_rate, model, grads);

        self
    }
}

impl<AB: AutodiffBackend, M: DynamicSceneModel<AB>> fmt::Debug
    for TrainingContext<AB, M>
{
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.debug_struct("TrainingContext")
            .field("iteration", &self.iteration)
            .field("iteration_pretrain", &self.iteration_pretrain)
            .field("learning_rate", &self.learning_rate)
            .field("optimizer", &format!("Adam<{}>", AB::name()))
            .field("schedule", &self.schedule)
            .finish()
    }
}
