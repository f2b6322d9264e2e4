//! Errors of training.

/// An error of loading the data, rendering or training.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The dataset has no frames.
    #[error("Empty dataset")]
    EmptyDataset,

    /// A motion mask value in a frame is neither `0` nor `1`.
    #[error("Invalid mask value at frame {0}: {1} should be 0 or 1")]
    InvalidMaskValue(usize, f32),

    /// An observer failed to write.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The renderer omitted an output required by the phase.
    #[error("Missing render output: {0}")]
    MissingRenderOutput(&'static str),

    /// The total loss at the iteration is NaN or infinite.
    #[error("Non-finite loss at iteration {0}: {1}")]
    NonFiniteLoss(u64, f32),

    /// More rays are requested than a frame has pixels.
    #[error("Ray batch size ({0}) exceeds the pixel count ({1})")]
    RayBatchTooLarge(usize, usize),

    /// The frame index is out of the sequence.
    #[error("Unknown frame index: {0}")]
    UnknownFrameIndex(usize),

    /// A value is malformed.
    #[error("Validation error: {0} should be {1}")]
    Validation(String, String),
}
