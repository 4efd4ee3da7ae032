//! Secondary cut features (holes, slots, rectangular cutouts) and their
//! placement across orientations and arrays.

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};
use tubestock_ir::CutExtent;
use tubestock_math::Point2;
use tubestock_sketch::{SketchLoop, SketchPlane};

use crate::error::{Result, TubeError};
use crate::material::{MaterialKind, MaterialProfile};
use crate::orientation::{Orientation, OrientationFlags, ReferencePlane};

/// Shape of a secondary cut.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Feature {
    /// Round hole.
    Circle {
        /// Hole diameter.
        diameter: f64,
    },
    /// Stadium: two semicircles `separation` apart along the tube axis.
    Slot {
        /// Slot width and end diameter.
        diameter: f64,
        /// Distance between the end centers.
        separation: f64,
    },
    /// Axis-aligned rectangle.
    Rectangle {
        /// Extent along the tube axis.
        width: f64,
        /// Extent across the tube axis.
        separation: f64,
    },
    /// Legacy feature code with no known shape; skipped when placed.
    Unrecognized {
        /// The code as read.
        code: i64,
    },
}

impl Feature {
    /// Legacy feature codes: 0 circle, 1 slot, 4 rectangle.
    pub fn from_code(code: i64, diameter: f64, separation: f64) -> Self {
        match code {
            0 => Feature::Circle { diameter },
            1 => Feature::Slot {
                diameter,
                separation,
            },
            4 => Feature::Rectangle {
                width: diameter,
                separation,
            },
            _ => Feature::Unrecognized { code },
        }
    }

    /// Short name for logs.
    pub fn label(&self) -> &'static str {
        match self {
            Feature::Circle { .. } => "circle",
            Feature::Slot { .. } => "slot",
            Feature::Rectangle { .. } => "rectangle",
            Feature::Unrecognized { .. } => "undefined",
        }
    }

    /// Copy with every length multiplied by `factor`.
    pub fn scaled(&self, factor: f64) -> Self {
        match *self {
            Feature::Circle { diameter } => Feature::Circle {
                diameter: diameter * factor,
            },
            Feature::Slot {
                diameter,
                separation,
            } => Feature::Slot {
                diameter: diameter * factor,
                separation: separation * factor,
            },
            Feature::Rectangle { width, separation } => Feature::Rectangle {
                width: width * factor,
                separation: separation * factor,
            },
            Feature::Unrecognized { code } => Feature::Unrecognized { code },
        }
    }

    fn validate(&self) -> Result<()> {
        let ok = match *self {
            Feature::Circle { diameter } => diameter > 0.0,
            Feature::Slot {
                diameter,
                separation,
            } => diameter > 0.0 && separation >= 0.0,
            Feature::Rectangle { width, separation } => width > 0.0 && separation > 0.0,
            Feature::Unrecognized { .. } => true,
        };
        if ok {
            Ok(())
        } else {
            Err(TubeError::InvalidDimension(format!(
                "{} feature has non-positive size: {self:?}",
                self.label()
            )))
        }
    }

    /// Outline centered at `center`, with local x along the tube axis.
    fn outline(&self, center: Point2) -> Result<Option<SketchLoop>> {
        let shape = match *self {
            Feature::Circle { diameter } => SketchLoop::circle(center, diameter / 2.0)?,
            Feature::Slot {
                diameter,
                separation,
            } => {
                let half = separation / 2.0;
                SketchLoop::stadium(
                    Point2::new(center.x - half, center.y),
                    Point2::new(center.x + half, center.y),
                    diameter / 2.0,
                )?
            }
            Feature::Rectangle { width, separation } => SketchLoop::rectangle(
                Point2::new(center.x - width / 2.0, center.y - separation / 2.0),
                Point2::new(center.x + width / 2.0, center.y + separation / 2.0),
            )?,
            Feature::Unrecognized { .. } => return Ok(None),
        };
        Ok(Some(shape))
    }
}

fn one() -> i64 {
    1
}

/// Where a feature goes and how it repeats.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    /// Distance of the first instance from end 1 along the axis.
    pub axial_distance: f64,
    /// Offset of the first row across the axis.
    #[serde(default)]
    pub transverse_distance: f64,
    /// Spacing between instances along the axis.
    #[serde(default)]
    pub array_increment: f64,
    /// Instances along the axis; zero or less places nothing.
    #[serde(default = "one")]
    pub array_instance_count: i64,
    /// Spacing between rows across the axis.
    #[serde(default)]
    pub transverse_increment: f64,
    /// Rows across the axis; zero or less places nothing.
    #[serde(default = "one")]
    pub transverse_instance_count: i64,
    /// Requested faces.
    #[serde(default)]
    pub orientations: OrientationFlags,
}

impl Placement {
    /// Single instance at `axial_distance` on the given faces.
    pub fn at(axial_distance: f64, orientations: OrientationFlags) -> Self {
        Self {
            axial_distance,
            transverse_distance: 0.0,
            array_increment: 0.0,
            array_instance_count: 1,
            transverse_increment: 0.0,
            transverse_instance_count: 1,
            orientations,
        }
    }

    /// Copy with every length multiplied by `factor`.
    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            axial_distance: self.axial_distance * factor,
            transverse_distance: self.transverse_distance * factor,
            array_increment: self.array_increment * factor,
            transverse_increment: self.transverse_increment * factor,
            ..*self
        }
    }

    /// Faces actually cut for `feature` on `kind`.
    pub fn effective_orientations(&self, feature: &Feature, kind: MaterialKind) -> OrientationFlags {
        let flags = match (feature, kind) {
            (Feature::Circle { .. }, MaterialKind::CChannel) => self.orientations.swap_deg0_deg270(),
            _ => self.orientations,
        };
        flags.remap(kind)
    }
}

/// One feature instance, ready to pocket.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedFeature {
    /// Face the instance is cut from.
    pub orientation: Orientation,
    /// Transverse row, from 0.
    pub row_index: usize,
    /// Axial instance within the row, from 0.
    pub instance_index: usize,
    /// Center in the tube frame as (axial, transverse).
    pub center: Point2,
    /// Closed outline in the reference plane's local frame.
    pub outline: SketchLoop,
    /// Reference plane pose.
    pub plane: SketchPlane,
    /// Pocket depth.
    pub extent: CutExtent,
    /// Pocket along the plane normal rather than against it.
    pub reversed: bool,
}

impl PlacedFeature {
    /// 1-based orientation index.
    pub fn orientation_index(&self) -> u8 {
        self.orientation.index()
    }
}

/// Pocket depth for features on `profile`.
///
/// Angle iron is pocketed a bounded distance both ways so that both legs
/// are reached from the mid plane.
pub fn feature_extent(profile: &MaterialProfile) -> CutExtent {
    match profile.kind() {
        MaterialKind::AngleIron => {
            let (hx, hz) = profile.half_extents();
            let depth = (2.0 * hx).max(2.0 * hz);
            CutExtent::TwoSided {
                forward: depth,
                backward: depth,
            }
        }
        _ => CutExtent::ThroughAll { both_sides: false },
    }
}

/// Most instances a single feature request may place.
pub const MAX_PLACED_INSTANCES: usize = 1 << 20;

/// Row count, per-row count and total instance count of a positive array.
fn array_size(placement: &Placement, faces: usize) -> Result<(usize, usize, usize)> {
    let too_large = || {
        TubeError::InvalidDimension(format!(
            "array of {} x {} on {faces} faces exceeds {MAX_PLACED_INSTANCES} instances",
            placement.transverse_instance_count, placement.array_instance_count
        ))
    };
    let rows = usize::try_from(placement.transverse_instance_count).map_err(|_| too_large())?;
    let instances = usize::try_from(placement.array_instance_count).map_err(|_| too_large())?;
    let total = rows
        .checked_mul(instances)
        .and_then(|n| n.checked_mul(faces))
        .filter(|&n| n <= MAX_PLACED_INSTANCES)
        .ok_or_else(too_large)?;
    Ok((rows, instances, total))
}

/// Place every instance of `feature` on every active orientation.
///
/// Results are ordered by orientation, then row, then axial instance. An
/// unrecognized feature is reported and yields nothing.
#[instrument(skip_all, fields(feature = feature.label()))]
pub fn place(
    feature: &Feature,
    placement: &Placement,
    profile: &MaterialProfile,
    effective_length: f64,
) -> Result<Vec<PlacedFeature>> {
    if let Feature::Unrecognized { code } = feature {
        warn!(code, "undefined feature, skipping");
        return Ok(Vec::new());
    }
    feature.validate()?;

    if placement.array_instance_count <= 0 || placement.transverse_instance_count <= 0 {
        debug!(
            axial = placement.array_instance_count,
            rows = placement.transverse_instance_count,
            "empty array"
        );
        return Ok(Vec::new());
    }

    let kind = profile.kind();
    let extent = feature_extent(profile);
    let base = -effective_length + placement.axial_distance;
    let orientations = placement.effective_orientations(feature, kind).active();

    let (rows, instances, total) = array_size(placement, orientations.len())?;
    let mut placed = Vec::with_capacity(total);
    for orientation in orientations {
        let reference = orientation.reference_plane();
        for row in 0..rows {
            let transverse =
                placement.transverse_distance + row as f64 * placement.transverse_increment;
            for instance in 0..instances {
                let axial = base + instance as f64 * placement.array_increment;
                let center = Point2::new(axial, transverse);
                let Some(outline) = feature.outline(center)? else {
                    continue;
                };
                let outline = if reference.axial_is_local_x() {
                    outline
                } else {
                    outline.transposed()
                };
                placed.push(PlacedFeature {
                    orientation,
                    row_index: row,
                    instance_index: instance,
                    center,
                    outline,
                    plane: reference.sketch_plane(),
                    extent,
                    reversed: orientation.reversed(),
                });
            }
        }
        debug!(
            orientation = orientation.index(),
            plane = ?reference,
            count = rows * instances,
            "placed"
        );
    }
    Ok(placed)
}
