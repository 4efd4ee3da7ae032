//! Job files: the parameter boundary.
//!
//! A job names one tube and its features, either with the typed schema or
//! with the legacy numeric columns, in millimetres or inches. Everything is
//! resolved to the typed schema in millimetres before planning.

use serde::{Deserialize, Serialize};

use crate::endcut::{CutSide, EndMode, EndTreatment, RotationalOffset};
use crate::error::Result;
use crate::feature::{Feature, Placement};
use crate::material::MaterialProfile;
use crate::orientation::OrientationFlags;
use crate::plan::{plan_tube, FeatureRequest, TubePlan, TubeSpec};

/// Millimetres per inch.
pub const MM_PER_INCH: f64 = 25.4;

/// Linear unit of every length in a job.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Units {
    /// Millimetres.
    #[default]
    Mm,
    /// Inches.
    Inch,
}

impl Units {
    /// Factor converting this unit to millimetres.
    pub fn to_mm(self) -> f64 {
        match self {
            Units::Mm => 1.0,
            Units::Inch => MM_PER_INCH,
        }
    }
}

/// Legacy tube columns, by name.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TubeRow {
    /// 1 round, 2 rectangular, 3 angle iron, 4 flat bar, 5 c-channel, 6 i-beam.
    pub material_type: i64,
    /// Round only.
    #[serde(default)]
    pub diameter: f64,
    /// Wall thickness.
    pub wall: f64,
    /// Rotational offset in degrees.
    #[serde(default)]
    pub roffset: f64,
    /// Nominal length.
    pub length: f64,
    /// End 1 join diameter.
    #[serde(default)]
    pub e1join: f64,
    /// End 1 angle.
    pub e1angle: f64,
    /// End 2 join diameter.
    #[serde(default)]
    pub e2join: f64,
    /// End 2 angle.
    pub e2angle: f64,
    /// End 1 is flat (false means coped).
    pub e1flat: bool,
    /// End 2 is flat (false means coped).
    pub e2flat: bool,
    /// Side 1.
    #[serde(default)]
    pub side1: f64,
    /// Side 2.
    #[serde(default)]
    pub side2: f64,
    /// Corner radius.
    #[serde(default)]
    pub cradius: f64,
    /// End 1 cut side, 1 or 2.
    #[serde(default = "side_one")]
    pub e1cutside: i64,
    /// End 2 cut side, 1 or 2.
    #[serde(default = "side_one")]
    pub e2cutside: i64,
}

fn side_one() -> i64 {
    1
}

fn cut_side(code: i64) -> CutSide {
    if code == 2 {
        CutSide::Side2
    } else {
        CutSide::Side1
    }
}

fn end_mode(flat: bool) -> EndMode {
    if flat {
        EndMode::Flat
    } else {
        EndMode::Coped
    }
}

impl TubeRow {
    /// Resolve to the typed schema.
    ///
    /// Rectangular rows measure the offset in the opposite sense, so 90 and
    /// 270 trade places.
    pub fn to_spec(&self) -> Result<TubeSpec> {
        let offset = RotationalOffset::from_degrees(self.roffset)?;
        let rotational_offset = match (self.material_type, offset) {
            (2, RotationalOffset::Deg90) => RotationalOffset::Deg270,
            (2, RotationalOffset::Deg270) => RotationalOffset::Deg90,
            (_, offset) => offset,
        };
        Ok(TubeSpec {
            profile: MaterialProfile::from_code(
                self.material_type,
                self.diameter,
                self.side1,
                self.side2,
                self.wall,
                self.cradius,
            )?,
            nominal_length: self.length,
            rotational_offset,
            end1: EndTreatment {
                angle: self.e1angle,
                mode: end_mode(self.e1flat),
                join_diameter: self.e1join,
                cut_side: cut_side(self.e1cutside),
            },
            end2: EndTreatment {
                angle: self.e2angle,
                mode: end_mode(self.e2flat),
                join_diameter: self.e2join,
                cut_side: cut_side(self.e2cutside),
            },
        })
    }
}

/// Legacy feature columns, by name.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureRow {
    /// 0 circle, 1 slot, 4 rectangle.
    pub desc_type: i64,
    /// Axial distance from end 1.
    pub x_distance: f64,
    /// Diameter, or rectangle width.
    pub diameter: f64,
    /// Slot or rectangle separation.
    #[serde(default)]
    pub separation: f64,
    /// Transverse distance of the first row.
    #[serde(default)]
    pub x_distance_y: f64,
    /// Axial spacing.
    #[serde(default)]
    pub array_increment: f64,
    /// Axial count.
    #[serde(default = "side_one")]
    pub array_instances: i64,
    /// 0° face.
    #[serde(default)]
    pub orientation_0: bool,
    /// 90° face.
    #[serde(default)]
    pub orientation_90: bool,
    /// 180° face.
    #[serde(default)]
    pub orientation_180: bool,
    /// 270° face.
    #[serde(default)]
    pub orientation_270: bool,
    /// Transverse spacing.
    #[serde(default)]
    pub array_increment_y: f64,
    /// Transverse count.
    #[serde(default = "side_one")]
    pub array_instances_y: i64,
}

impl FeatureRow {
    /// Resolve to the typed schema.
    pub fn to_request(&self) -> FeatureRequest {
        FeatureRequest {
            feature: Feature::from_code(self.desc_type, self.diameter, self.separation),
            placement: Placement {
                axial_distance: self.x_distance,
                transverse_distance: self.x_distance_y,
                array_increment: self.array_increment,
                array_instance_count: self.array_instances,
                transverse_increment: self.array_increment_y,
                transverse_instance_count: self.array_instances_y,
                orientations: OrientationFlags::new(
                    self.orientation_0,
                    self.orientation_90,
                    self.orientation_180,
                    self.orientation_270,
                ),
            },
        }
    }
}

/// Tube given either way.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TubeSource {
    /// Typed schema.
    Spec(TubeSpec),
    /// Legacy columns.
    Row(TubeRow),
}

/// Feature given either way.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FeatureSource {
    /// Typed schema.
    Request(FeatureRequest),
    /// Legacy columns.
    Row(FeatureRow),
}

/// One tube and its features, as read from a job file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    /// Unit of every length below.
    #[serde(default)]
    pub units: Units,
    /// The tube.
    pub tube: TubeSource,
    /// Features, in cut order.
    #[serde(default)]
    pub features: Vec<FeatureSource>,
}

impl Job {
    /// Parse a TOML job.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Parse a JSON job.
    pub fn from_json_str(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Resolve legacy rows and convert every length to millimetres.
    pub fn resolve(&self) -> Result<(TubeSpec, Vec<FeatureRequest>)> {
        let factor = self.units.to_mm();
        let tube = match self.tube {
            TubeSource::Spec(spec) => spec,
            TubeSource::Row(row) => row.to_spec()?,
        };
        let requests = self
            .features
            .iter()
            .map(|f| match f {
                FeatureSource::Request(r) => r.scaled(factor),
                FeatureSource::Row(row) => row.to_request().scaled(factor),
            })
            .collect();
        Ok((tube.scaled(factor), requests))
    }

    /// The same job in the typed schema, with every length in millimetres.
    pub fn normalized(&self) -> Result<Self> {
        let (tube, requests) = self.resolve()?;
        Ok(Self {
            units: Units::Mm,
            tube: TubeSource::Spec(tube),
            features: requests.into_iter().map(FeatureSource::Request).collect(),
        })
    }

    /// Resolve, then plan the tube.
    pub fn plan(&self) -> Result<TubePlan> {
        let (tube, requests) = self.resolve()?;
        plan_tube(&tube, &requests)
    }
}
