//! Error types for tube planning.

use thiserror::Error;
use tubestock_sketch::SketchError;

/// Errors that can occur while planning a tube.
#[derive(Error, Debug)]
pub enum TubeError {
    /// An end angle is a multiple of 180°, so its extension is undefined.
    #[error("end {end} angle {angle}° has no finite miter")]
    DegenerateAngle {
        /// Which end (1 or 2).
        end: u8,
        /// The offending angle in degrees, after normalization.
        angle: f64,
    },

    /// A length is non-positive, non-finite or geometrically impossible.
    #[error("invalid dimension: {0}")]
    InvalidDimension(String),

    /// Rotational offset outside {0, 90, 180, 270}.
    #[error("rotational offset {0}° is not one of 0, 90, 180, 270")]
    InvalidOffset(f64),

    /// Numeric material code outside 1..=6.
    #[error("unknown material code {0}")]
    UnknownMaterialCode(i64),

    /// A sketch loop could not be built.
    #[error(transparent)]
    Sketch(#[from] SketchError),

    /// Job file is not valid TOML for the job schema.
    #[error("job parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Job file is not valid JSON for the job schema.
    #[error("job parse error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for tube planning.
pub type Result<T> = std::result::Result<T, TubeError>;
