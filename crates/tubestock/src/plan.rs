//! The per-tube pipeline: section, then end cuts, then features.

#[cfg(feature = "parallel")]
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::endcut::{plan_end_cuts, EndCutPlan, EndTreatment, RotationalOffset};
use crate::error::Result;
use crate::feature::{place, Feature, PlacedFeature, Placement};
use crate::material::MaterialProfile;
use crate::profile::{build_profile, CrossSection};

/// Everything needed to shape the bare tube.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TubeSpec {
    /// Section family and dimensions.
    pub profile: MaterialProfile,
    /// Length between the cut centers.
    pub nominal_length: f64,
    /// Angle of end 2's cut plane relative to end 1's.
    #[serde(default)]
    pub rotational_offset: RotationalOffset,
    /// End at `y = -length`.
    #[serde(default)]
    pub end1: EndTreatment,
    /// End at `y = 0`.
    #[serde(default)]
    pub end2: EndTreatment,
}

impl TubeSpec {
    /// Copy with every length multiplied by `factor`. Angles are unchanged.
    pub fn scaled(&self, factor: f64) -> Self {
        let scale_end = |e: EndTreatment| EndTreatment {
            join_diameter: e.join_diameter * factor,
            ..e
        };
        Self {
            profile: self.profile.scaled(factor),
            nominal_length: self.nominal_length * factor,
            end1: scale_end(self.end1),
            end2: scale_end(self.end2),
            ..*self
        }
    }
}

/// A feature and where to put it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureRequest {
    /// Shape.
    pub feature: Feature,
    /// Position, arrays and faces.
    pub placement: Placement,
}

impl FeatureRequest {
    /// Copy with every length multiplied by `factor`.
    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            feature: self.feature.scaled(factor),
            placement: self.placement.scaled(factor),
        }
    }
}

/// Placed instances of one requested feature.
#[derive(Debug, Clone, PartialEq)]
pub struct FeaturePlan {
    /// Position in the request list.
    pub index: usize,
    /// The requested shape.
    pub feature: Feature,
    /// Instances, ordered by orientation, row, then axial position.
    pub placed: Vec<PlacedFeature>,
}

/// Geometry description of one finished tube.
#[derive(Debug, Clone, PartialEq)]
pub struct TubePlan {
    /// The tube that was planned.
    pub spec: TubeSpec,
    /// Cross-section.
    pub section: CrossSection,
    /// Padded length and end cuts.
    pub end_cuts: EndCutPlan,
    /// One entry per request, in request order.
    pub features: Vec<FeaturePlan>,
    /// Request indices that were skipped as undefined.
    pub skipped: Vec<usize>,
}

impl TubePlan {
    /// Total placed instances over all features.
    pub fn instance_count(&self) -> usize {
        self.features.iter().map(|f| f.placed.len()).sum()
    }
}

/// Plan the section, end cuts and every feature of one tube.
#[instrument(skip_all, fields(kind = %spec.profile.kind(), features = requests.len()))]
pub fn plan_tube(spec: &TubeSpec, requests: &[FeatureRequest]) -> Result<TubePlan> {
    let section = build_profile(&spec.profile)?;
    let end_cuts = plan_end_cuts(
        &spec.profile,
        spec.nominal_length,
        &spec.end1,
        &spec.end2,
        spec.rotational_offset,
    )?;

    let placed = place_all(requests, &spec.profile, end_cuts.effective_length);

    let mut features = Vec::with_capacity(requests.len());
    let mut skipped = Vec::new();
    for (index, (request, result)) in requests.iter().zip(placed).enumerate() {
        if let Feature::Unrecognized { .. } = request.feature {
            skipped.push(index);
            continue;
        }
        features.push(FeaturePlan {
            index,
            feature: request.feature,
            placed: result?,
        });
    }

    let plan = TubePlan {
        spec: *spec,
        section,
        end_cuts,
        features,
        skipped,
    };
    info!(
        effective_length = plan.end_cuts.effective_length,
        instances = plan.instance_count(),
        skipped = plan.skipped.len(),
        "planned tube"
    );
    Ok(plan)
}

#[cfg(feature = "parallel")]
fn place_all(
    requests: &[FeatureRequest],
    profile: &MaterialProfile,
    effective_length: f64,
) -> Vec<Result<Vec<PlacedFeature>>> {
    requests
        .par_iter()
        .map(|r| place(&r.feature, &r.placement, profile, effective_length))
        .collect()
}

#[cfg(not(feature = "parallel"))]
fn place_all(
    requests: &[FeatureRequest],
    profile: &MaterialProfile,
    effective_length: f64,
) -> Vec<Result<Vec<PlacedFeature>>> {
    requests
        .iter()
        .map(|r| place(&r.feature, &r.placement, profile, effective_length))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orientation::OrientationFlags;
    use approx::assert_relative_eq;

    fn spec() -> TubeSpec {
        TubeSpec {
            profile: MaterialProfile::Rectangular {
                side1: 40.0,
                side2: 40.0,
                wall: 3.0,
                corner_radius: 0.0,
            },
            nominal_length: 500.0,
            rotational_offset: RotationalOffset::Deg0,
            end1: EndTreatment::square(),
            end2: EndTreatment::mitered(45.0),
        }
    }

    fn circle_at(axial: f64) -> FeatureRequest {
        FeatureRequest {
            feature: Feature::Circle { diameter: 6.0 },
            placement: Placement::at(axial, OrientationFlags::new(true, false, false, false)),
        }
    }

    #[test]
    fn test_features_use_effective_length() {
        let plan = plan_tube(&spec(), &[circle_at(100.0)]).unwrap();
        assert_relative_eq!(plan.end_cuts.effective_length, 520.0, epsilon = 1e-9);
        let p = &plan.features[0].placed[0];
        assert_relative_eq!(p.center.x, -420.0, epsilon = 1e-9);
    }

    #[test]
    fn test_undefined_feature_does_not_stop_processing() {
        let requests = [
            circle_at(50.0),
            FeatureRequest {
                feature: Feature::Unrecognized { code: 3 },
                placement: Placement::at(0.0, OrientationFlags::default()),
            },
            circle_at(150.0),
        ];
        let plan = plan_tube(&spec(), &requests).unwrap();
        assert_eq!(plan.skipped, vec![1]);
        let indices: Vec<usize> = plan.features.iter().map(|f| f.index).collect();
        assert_eq!(indices, vec![0, 2]);
        assert_eq!(plan.instance_count(), 2);
    }

    #[test]
    fn test_bad_feature_fails_tube() {
        let bad = FeatureRequest {
            feature: Feature::Circle { diameter: -1.0 },
            ..circle_at(10.0)
        };
        assert!(plan_tube(&spec(), &[bad]).is_err());
    }

    #[test]
    fn test_scaled_spec() {
        let s = TubeSpec {
            end2: EndTreatment::coped(2.0),
            ..spec()
        }
        .scaled(25.4);
        assert_relative_eq!(s.nominal_length, 12700.0, epsilon = 1e-9);
        assert_relative_eq!(s.end2.join_diameter, 50.8, epsilon = 1e-12);
        assert_eq!(s.end2.angle, 90.0);
    }
}
