//! Iteration scheduling of the training objective.
//!
//! Every signal is a pure function of the iteration and the schedule constants.
//! With `period = decay_iteration * 1000`:
//!
//! | Signal | Rule |
//! | --- | --- |
//! | Mask loss | active while `i < period` |
//! | Temperature | `1 / 10 ^ (i / period)` |
//! | Chaining 5 frames | `i >= 2 * period` |
//! | Decay boundary | `i % period == 0` |

pub use burn::config::Config;

/// The constants of the iteration schedule.
#[derive(Config, Copy, Debug, PartialEq)]
pub struct ScheduleConfig {
    /// The lower bound of `decay_iteration`.
    #[config(default = "25")]
    pub decay_iteration_min: u64,

    /// The iterations per unit of `decay_iteration`.
    #[config(default = "1000")]
    pub decay_iteration_scale: u64,
}

/// The schedule constants derived from the sequence.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Schedule {
    /// `max(decay_iteration_min, frame_count)`
    pub decay_iteration: u64,
    /// The iterations per unit of `decay_iteration`.
    pub decay_iteration_scale: u64,
}

/// The signals consumed by the renderer invocation and the objective.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScheduleSignals {
    /// Whether the mask loss is evaluated.
    pub is_mask_loss_active: bool,
    /// The branches to render.
    pub phase: TrainingPhase,
    /// The multiplier of the depth and flow terms.
    pub temperature: f64,
}

/// The phase decides which branches are rendered and which terms apply.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TrainingPhase {
    /// Only the static branch with a single photometric term.
    Pretrain,
    /// Both branches.
    Main {
        /// Adding the frames at `t - 2` and `t + 2`.
        chained: bool,
    },
}

impl ScheduleConfig {
    /// Deriving the schedule from the count of frames.
    pub fn init(
        &self,
        frame_count: usize,
    ) -> Schedule {
        Schedule {
            decay_iteration: self.decay_iteration_min.max(frame_count as u64),
            decay_iteration_scale: self.decay_iteration_scale,
        }
    }
}

impl Schedule {
    /// `decay_iteration * decay_iteration_scale`
    #[inline]
    pub const fn period(&self) -> u64 {
        self.decay_iteration * self.decay_iteration_scale
    }

    /// Whether the mask loss is evaluated at the iteration.
    #[inline]
    pub const fn is_mask_loss_active(
        &self,
        iteration: u64,
    ) -> bool {
        iteration < self.period()
    }

    /// Whether the frames at `t - 2` and `t + 2` are rendered at the iteration.
    #[inline]
    pub const fn is_chained(
        &self,
        iteration: u64,
    ) -> bool {
        iteration >= 2 * self.period()
    }

    /// Whether the iteration starts a new temperature band.
    #[inline]
    pub const fn is_decay_boundary(
        &self,
        iteration: u64,
    ) -> bool {
        iteration % self.period() == 0
    }

    /// The multiplier of the depth and flow terms.
    ///
    /// It is divided by 10 at each period.
    pub fn temperature(
        &self,
        iteration: u64,
    ) -> f64 {
        let band = (iteration / self.period()).min(i32::MAX as u64) as i32;
        1.0 / 10.0_f64.powi(band)
    }

    /// The phase of the main training at the iteration.
    #[inline]
    pub const fn phase(
        &self,
        iteration: u64,
    ) -> TrainingPhase {
        TrainingPhase::Main {
            chained: self.is_chained(iteration),
        }
    }

    /// Every signal at the iteration.
    pub fn signals(
        &self,
        iteration: u64,
    ) -> ScheduleSignals {
        ScheduleSignals {
            is_mask_loss_active: self.is_mask_loss_active(iteration),
            phase: self.phase(iteration),
            temperature: self.temperature(iteration),
        }
    }
}

impl ScheduleSignals {
    /// The signals while pretraining the static branch.
    #[inline]
    pub const fn pretrain() -> Self {
        Self {
            is_mask_loss_active: false,
            phase: TrainingPhase::Pretrain,
            temperature: 1.0,
        }
    }
}

impl TrainingPhase {
    /// Whether the phase chains 5 frames.
    #[inline]
    pub const fn is_chained(&self) -> bool {
        matches!(self, Self::Main { chained: true })
    }

    /// Whether the phase is pretraining.
    #[inline]
    pub const fn is_pretrain(&self) -> bool {
        matches!(self, Self::Pretrain)
    }
}

impl Default for ScheduleConfig {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}
