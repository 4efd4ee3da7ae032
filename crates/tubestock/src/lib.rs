#![warn(missing_docs)]

//! Parametric geometry for structural tube stock.
//!
//! Given a material profile, a nominal length, two end treatments and a list
//! of cutout features, this crate plans the finished tube: the cross-section
//! to pad, the miter or cope cut at each end, and every placed feature
//! instance. A [`TubePlan`] lowers to a `tubestock_ir::Document` of sketch,
//! pad and pocket operations for a solid-modeling kernel.
//!
//! # Example
//!
//! ```
//! use tubestock::{plan_tube, EndTreatment, MaterialProfile, RotationalOffset, TubeSpec};
//!
//! let spec = TubeSpec {
//!     profile: MaterialProfile::Rectangular {
//!         side1: 40.0,
//!         side2: 40.0,
//!         wall: 3.0,
//!         corner_radius: 0.0,
//!     },
//!     nominal_length: 500.0,
//!     rotational_offset: RotationalOffset::Deg0,
//!     end1: EndTreatment::square(),
//!     end2: EndTreatment::mitered(45.0),
//! };
//! let plan = plan_tube(&spec, &[])?;
//! assert!((plan.end_cuts.effective_length - 520.0).abs() < 1e-9);
//!
//! let doc = plan.to_document();
//! assert_eq!(doc.op_counts().pads, 1);
//! # Ok::<(), tubestock::TubeError>(())
//! ```

pub mod document;
pub mod endcut;
pub mod error;
pub mod feature;
pub mod job;
pub mod material;
pub mod orientation;
pub mod plan;
pub mod profile;

pub use document::BODY_ROTATION;
pub use endcut::{
    effective_length, extension, plan_end_cuts, CutPlaneGeometry, CutSide, EndCutKind,
    EndCutPlan, EndMode, EndTreatment, RotationalOffset,
};
pub use error::{Result, TubeError};
pub use feature::{place, Feature, PlacedFeature, Placement};
pub use job::{FeatureRow, FeatureSource, Job, TubeRow, TubeSource, Units};
pub use material::{MaterialKind, MaterialProfile};
pub use orientation::{Orientation, OrientationFlags, ReferencePlane};
pub use plan::{plan_tube, FeaturePlan, FeatureRequest, TubePlan, TubeSpec};
pub use profile::{build_profile, CrossSection, Removal};
