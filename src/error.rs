//! Error type shared by every stage of staff reconstruction

use crate::detector::metrics::MetricKind;

/// Errors raised while reconstructing staffs from a binary raster
#[derive(Debug, thiserror::Error)]
pub enum OmrError {
    /// The raster has zero width or zero height
    #[error("raster is empty ({width}x{height})")]
    EmptyRaster {
        /// Declared width
        width: usize,
        /// Declared height
        height: usize,
    },

    /// The pixel buffer does not match the declared dimensions
    #[error("raster buffer holds {actual} pixels, expected {expected}")]
    DimensionMismatch {
        /// `width * height`
        expected: usize,
        /// Length of the buffer handed in
        actual: usize,
    },

    /// A mode or mode range was requested from an empty histogram
    #[error("no {0} observations recorded")]
    NoObservations(MetricKind),

    /// Mode-range threshold outside `[0, 1]`
    #[error("mode range threshold {0} is outside [0, 1]")]
    InvalidThreshold(f64),

    /// A staff line holds no points, so it has no fitted equation
    #[error("staff line {index} has no points")]
    EmptyStaffLine {
        /// Line index, 0 = top line
        index: usize,
    },

    /// A pitch query with a NaN or infinite coordinate
    #[error("position ({x}, {y}) is not finite")]
    NonFinitePosition {
        /// Queried column
        x: f64,
        /// Queried row
        y: f64,
    },

    /// The query lies further from the staff than the ledger table reaches
    #[error("position is {steps} ledger steps from the staff, beyond the pitch table")]
    PitchOutOfRange {
        /// Ledger steps away from the outer staff line
        steps: i32,
    },

    /// Image loading or saving failed (tooling only)
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
}

/// Result alias used across the crate
pub type Result<T> = std::result::Result<T, OmrError>;
