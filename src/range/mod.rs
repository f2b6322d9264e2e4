//! Iteration ranges of the periodic events.

pub use burn::config::Config;

/// The iterations `start, start + step, ...` below `end`.
#[derive(Config, Copy, Debug, PartialEq)]
pub struct RangeOptions {
    /// The first iteration.
    #[config(default = "0")]
    pub start: u64,

    /// The iteration to stop before.
    #[config(default = "u64::MAX")]
    pub end: u64,

    /// It never matches if zero.
    #[config(default = "1")]
    pub step: u64,
}

impl RangeOptions {
    /// Every `step` iterations from zero.
    #[inline]
    pub fn default_with_step(step: u64) -> Self {
        Self::new().with_step(step)
    }

    /// Whether the iteration is in the range.
    pub fn has(
        &self,
        iteration: u64,
    ) -> bool {
        self.step != 0
            && iteration >= self.start
            && iteration < self.end
            && (iteration - self.start) % self.step == 0
    }
}

impl Default for RangeOptions {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}
