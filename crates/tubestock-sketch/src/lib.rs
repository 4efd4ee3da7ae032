#![warn(missing_docs)]

//! 2D sketch geometry for tubestock.
//!
//! Cross-sections, end cuts and feature outlines are all described as
//! closed loops of line and arc segments drawn on a sketch plane. The
//! modeling kernel turns them into pads and pockets; this crate only
//! guarantees that every loop it hands out is continuous and closed.
//!
//! # Example
//!
//! ```
//! use tubestock_math::Point2;
//! use tubestock_sketch::{SketchLoop, SketchPlane, SketchProfile};
//!
//! // A 40 x 20 tube wall outline on the cross-section plane
//! let outer = SketchLoop::rectangle(Point2::new(-20.0, -10.0), Point2::new(20.0, 10.0)).unwrap();
//! let inner = SketchLoop::rectangle(Point2::new(-18.0, -8.0), Point2::new(18.0, 8.0)).unwrap();
//! let profile = SketchProfile::new(SketchPlane::xz(), vec![outer, inner]);
//!
//! assert_eq!(profile.loops.len(), 2);
//! assert!((profile.loops[0].area() - 800.0).abs() < 1e-9);
//! ```

mod plane;
mod profile;

pub use plane::SketchPlane;
pub use profile::{SketchLoop, SketchProfile, SketchSegment};

use thiserror::Error;

/// Errors from sketch construction.
#[derive(Debug, Clone, Error)]
pub enum SketchError {
    /// The loop is not closed (gap between consecutive segments).
    #[error("loop is not closed: gap of {0:.6} mm")]
    NotClosed(f64),

    /// A segment is degenerate (zero length).
    #[error("degenerate segment at index {0}")]
    DegenerateSegment(usize),

    /// A loop has no segments.
    #[error("loop has no segments")]
    EmptyLoop,

    /// A radius is zero, negative, or too large for the requested shape.
    #[error("invalid radius: {0}")]
    InvalidRadius(f64),
}
