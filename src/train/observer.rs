//! Periodic training events.

pub use super::*;

/// The scalars reported at the log range.
#[derive(Clone, Debug, PartialEq)]
pub struct LogRecord {
    /// Whether 5 frames were chained.
    pub chained: bool,
    /// The loss terms by name in the order of evaluation.
    pub entries: Vec<(&'static str, f32)>,
    /// Whether the iteration is of pretraining.
    pub is_pretrain: bool,
    /// The iteration of the phase.
    pub iteration: u64,
    /// The learning rate for the next iteration.
    pub learning_rate: f64,
    /// The total loss.
    pub loss: f32,
    /// The multiplier of the depth and flow terms.
    pub temperature: f64,
}

/// The receiver of periodic training events.
///
/// Every callback does nothing by default.
pub trait TrainingObserver<AB: AutodiffBackend, M: DynamicSceneModel<AB>> {
    /// Called at the log range.
    fn on_log(
        &mut self,
        _record: &LogRecord,
    ) -> Result<(), Error> {
        Ok(())
    }

    /// Called at the checkpoint range after the model is updated.
    fn on_checkpoint(
        &mut self,
        _context: &TrainingContext<AB, M>,
    ) -> Result<(), Error> {
        Ok(())
    }

    /// Called with the frame rendered in the iteration.
    fn on_preview(
        &mut self,
        _iteration: u64,
        _frame_index: usize,
        _model: &M,
    ) -> Result<(), Error> {
        Ok(())
    }

    /// Called once after pretraining, before the static branch is frozen.
    fn on_pretrained(
        &mut self,
        _context: &TrainingContext<AB, M>,
    ) -> Result<(), Error> {
        Ok(())
    }
}

impl<AB: AutodiffBackend, M: DynamicSceneModel<AB>> TrainingObserver<AB, M> for () {}

impl<B: Backend> StepReport<B> {
    /// The scalars of the report.
    pub fn to_log_record(&self) -> LogRecord {
        LogRecord {
            chained: self.signals.phase.is_chained(),
            entries: self.record.scalars(),
            is_pretrain: self.signals.phase.is_pretrain(),
            iteration: self.iteration,
            learning_rate: self.learning_rate,
            loss: self.loss,
            temperature: self.signals.temperature,
        }
    }
}
