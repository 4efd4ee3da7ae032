//! Material families and their per-family table.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TubeError};

/// Cross-section dimensions of one piece of stock.
///
/// For every family except `Round`, `side1` is the extent along the
/// 0°/180° axis and `side2` the extent along the 90°/270° axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MaterialProfile {
    /// Round tube.
    Round {
        /// Outside diameter.
        diameter: f64,
        /// Wall thickness.
        wall: f64,
    },
    /// Rectangular or square tube.
    Rectangular {
        /// Height.
        side1: f64,
        /// Width.
        side2: f64,
        /// Wall thickness.
        wall: f64,
        /// Fillet radius applied to all eight corners.
        #[serde(default)]
        corner_radius: f64,
    },
    /// L-shaped angle iron.
    AngleIron {
        /// Height.
        side1: f64,
        /// Width.
        side2: f64,
        /// Leg thickness.
        wall: f64,
        /// Accepted and ignored.
        #[serde(default)]
        corner_radius: f64,
    },
    /// Flat bar.
    FlatBar {
        /// Bounding height.
        side1: f64,
        /// Width.
        side2: f64,
        /// Bar thickness.
        wall: f64,
        /// Accepted and ignored.
        #[serde(default)]
        corner_radius: f64,
    },
    /// C-channel, open on the 90° face.
    CChannel {
        /// Height.
        side1: f64,
        /// Width.
        side2: f64,
        /// Web and flange thickness.
        wall: f64,
        /// Accepted and ignored.
        #[serde(default)]
        corner_radius: f64,
    },
    /// I-beam.
    IBeam {
        /// Height, flange to flange.
        side1: f64,
        /// Flange width.
        side2: f64,
        /// Web and flange thickness.
        wall: f64,
    },
}

/// The six material families without their dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaterialKind {
    /// Round tube.
    Round,
    /// Rectangular tube.
    Rectangular,
    /// Angle iron.
    AngleIron,
    /// Flat bar.
    FlatBar,
    /// C-channel.
    CChannel,
    /// I-beam.
    IBeam,
}

/// How material is taken out of the outer boundary to form the section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemovalPattern {
    /// Closed inner loop concentric with the outer one.
    Hollow,
    /// One rectangle covering a corner, leaving two legs.
    Corner,
    /// One full-width slab, leaving a single bar.
    Slab,
    /// One rectangle open to a face, leaving three walls.
    Channel,
    /// Two rectangles either side of a central web.
    FlangePair,
}

impl MaterialKind {
    /// All families, in legacy code order.
    pub const ALL: [MaterialKind; 6] = [
        MaterialKind::Round,
        MaterialKind::Rectangular,
        MaterialKind::AngleIron,
        MaterialKind::FlatBar,
        MaterialKind::CChannel,
        MaterialKind::IBeam,
    ];

    /// Number of faces that physically exist for feature placement.
    pub const fn real_sides(self) -> u8 {
        match self {
            MaterialKind::Round | MaterialKind::Rectangular | MaterialKind::IBeam => 4,
            MaterialKind::CChannel => 3,
            MaterialKind::AngleIron => 2,
            MaterialKind::FlatBar => 1,
        }
    }

    /// Removal pattern used to shape the cross-section.
    pub const fn removal_pattern(self) -> RemovalPattern {
        match self {
            MaterialKind::Round | MaterialKind::Rectangular => RemovalPattern::Hollow,
            MaterialKind::AngleIron => RemovalPattern::Corner,
            MaterialKind::FlatBar => RemovalPattern::Slab,
            MaterialKind::CChannel => RemovalPattern::Channel,
            MaterialKind::IBeam => RemovalPattern::FlangePair,
        }
    }

    /// Every family except round is laid out on the side1/side2 frame.
    pub const fn is_rectangular_family(self) -> bool {
        !matches!(self, MaterialKind::Round)
    }

    /// Look up a legacy numeric material code (1..=6).
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            1..=6 => Some(Self::ALL[(code - 1) as usize]),
            _ => None,
        }
    }

    /// Legacy numeric material code.
    pub fn code(self) -> i64 {
        Self::ALL.iter().position(|k| *k == self).map_or(0, |i| i as i64 + 1)
    }
}

impl fmt::Display for MaterialKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MaterialKind::Round => "round",
            MaterialKind::Rectangular => "rectangular",
            MaterialKind::AngleIron => "angle iron",
            MaterialKind::FlatBar => "flat bar",
            MaterialKind::CChannel => "c-channel",
            MaterialKind::IBeam => "i-beam",
        };
        f.write_str(name)
    }
}

impl MaterialProfile {
    /// Build a profile from a legacy code and the full column set.
    ///
    /// Round stock reads `diameter`; every other family reads the sides.
    pub fn from_code(
        code: i64,
        diameter: f64,
        side1: f64,
        side2: f64,
        wall: f64,
        corner_radius: f64,
    ) -> Result<Self> {
        let kind = MaterialKind::from_code(code).ok_or(TubeError::UnknownMaterialCode(code))?;
        Ok(match kind {
            MaterialKind::Round => MaterialProfile::Round { diameter, wall },
            MaterialKind::Rectangular => MaterialProfile::Rectangular {
                side1,
                side2,
                wall,
                corner_radius,
            },
            MaterialKind::AngleIron => MaterialProfile::AngleIron {
                side1,
                side2,
                wall,
                corner_radius,
            },
            MaterialKind::FlatBar => MaterialProfile::FlatBar {
                side1,
                side2,
                wall,
                corner_radius,
            },
            MaterialKind::CChannel => MaterialProfile::CChannel {
                side1,
                side2,
                wall,
                corner_radius,
            },
            MaterialKind::IBeam => MaterialProfile::IBeam { side1, side2, wall },
        })
    }

    /// The family of this profile.
    pub fn kind(&self) -> MaterialKind {
        match self {
            MaterialProfile::Round { .. } => MaterialKind::Round,
            MaterialProfile::Rectangular { .. } => MaterialKind::Rectangular,
            MaterialProfile::AngleIron { .. } => MaterialKind::AngleIron,
            MaterialProfile::FlatBar { .. } => MaterialKind::FlatBar,
            MaterialProfile::CChannel { .. } => MaterialKind::CChannel,
            MaterialProfile::IBeam { .. } => MaterialKind::IBeam,
        }
    }

    /// Dimension feeding the end-cut length extension.
    ///
    /// `diameter` for round, `side1` for every other family, regardless of
    /// which side is larger.
    pub fn controlling_dimension(&self) -> f64 {
        match *self {
            MaterialProfile::Round { diameter, .. } => diameter,
            MaterialProfile::Rectangular { side1, .. }
            | MaterialProfile::AngleIron { side1, .. }
            | MaterialProfile::FlatBar { side1, .. }
            | MaterialProfile::CChannel { side1, .. }
            | MaterialProfile::IBeam { side1, .. } => side1,
        }
    }

    /// Half extents `(x, z)` of the bounding box on the cross plane.
    pub fn half_extents(&self) -> (f64, f64) {
        match *self {
            MaterialProfile::Round { diameter, .. } => (diameter / 2.0, diameter / 2.0),
            MaterialProfile::Rectangular { side1, side2, .. }
            | MaterialProfile::AngleIron { side1, side2, .. }
            | MaterialProfile::FlatBar { side1, side2, .. }
            | MaterialProfile::CChannel { side1, side2, .. }
            | MaterialProfile::IBeam { side1, side2, .. } => (side2 / 2.0, side1 / 2.0),
        }
    }

    /// Wall thickness.
    pub fn wall(&self) -> f64 {
        match *self {
            MaterialProfile::Round { wall, .. }
            | MaterialProfile::Rectangular { wall, .. }
            | MaterialProfile::AngleIron { wall, .. }
            | MaterialProfile::FlatBar { wall, .. }
            | MaterialProfile::CChannel { wall, .. }
            | MaterialProfile::IBeam { wall, .. } => wall,
        }
    }

    /// Fillet radius that actually shapes the section (rectangular only).
    pub fn effective_corner_radius(&self) -> f64 {
        match *self {
            MaterialProfile::Rectangular { corner_radius, .. } => corner_radius,
            _ => 0.0,
        }
    }

    /// Copy with every length multiplied by `factor`.
    pub fn scaled(&self, factor: f64) -> Self {
        let mut out = *self;
        match &mut out {
            MaterialProfile::Round { diameter, wall } => {
                *diameter *= factor;
                *wall *= factor;
            }
            MaterialProfile::Rectangular {
                side1,
                side2,
                wall,
                corner_radius,
            }
            | MaterialProfile::AngleIron {
                side1,
                side2,
                wall,
                corner_radius,
            }
            | MaterialProfile::FlatBar {
                side1,
                side2,
                wall,
                corner_radius,
            }
            | MaterialProfile::CChannel {
                side1,
                side2,
                wall,
                corner_radius,
            } => {
                *side1 *= factor;
                *side2 *= factor;
                *wall *= factor;
                *corner_radius *= factor;
            }
            MaterialProfile::IBeam { side1, side2, wall } => {
                *side1 *= factor;
                *side2 *= factor;
                *wall *= factor;
            }
        }
        out
    }

    /// Check that every dimension is usable for this family.
    pub fn validate(&self) -> Result<()> {
        let kind = self.kind();
        let wall = self.wall();
        let (hx, hz) = self.half_extents();
        let (side2, side1) = (hx * 2.0, hz * 2.0);

        positive("wall", wall)?;
        if kind.is_rectangular_family() {
            positive("side1", side1)?;
            positive("side2", side2)?;
        } else {
            positive("diameter", side1)?;
        }

        let corner_radius = match *self {
            MaterialProfile::Rectangular { corner_radius, .. }
            | MaterialProfile::AngleIron { corner_radius, .. }
            | MaterialProfile::FlatBar { corner_radius, .. }
            | MaterialProfile::CChannel { corner_radius, .. } => corner_radius,
            _ => 0.0,
        };
        if !corner_radius.is_finite() || corner_radius < 0.0 {
            return Err(TubeError::InvalidDimension(format!(
                "corner radius must be >= 0, got {corner_radius}"
            )));
        }

        let fits = match kind.removal_pattern() {
            RemovalPattern::Hollow => true,
            RemovalPattern::Corner => wall < side1 && wall < side2,
            RemovalPattern::Slab => wall < side1,
            RemovalPattern::Channel => wall < side1 && 2.0 * wall < side2,
            RemovalPattern::FlangePair => 2.0 * wall < side1 && wall < side2,
        };
        if !fits {
            return Err(TubeError::InvalidDimension(format!(
                "wall {wall} leaves no open area in {side1} x {side2} {kind}"
            )));
        }
        Ok(())
    }
}

fn positive(name: &str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(TubeError::InvalidDimension(format!(
            "{name} must be positive, got {value}"
        )))
    }
}
