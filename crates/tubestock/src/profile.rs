//! Cross-section construction for every material family.

use tracing::{debug, instrument};
use tubestock_math::{Point2, Tolerance};
use tubestock_sketch::{SketchError, SketchLoop, SketchPlane, SketchProfile};

use crate::error::{Result, TubeError};
use crate::material::{MaterialProfile, RemovalPattern};

/// Material taken out of the outer boundary.
#[derive(Debug, Clone, PartialEq)]
pub enum Removal {
    /// Solid section.
    None,
    /// Closed inner loop, drawn as a hole in the pad sketch.
    Hollow(SketchLoop),
    /// Regions pocketed through the full length after padding.
    Cut(Vec<SketchLoop>),
}

/// The 2D section of a tube on the cross plane.
#[derive(Debug, Clone, PartialEq)]
pub struct CrossSection {
    /// Outer boundary.
    pub outer: SketchLoop,
    /// What is removed from inside the boundary.
    pub removal: Removal,
    /// Dimension used by the end-cut length extension.
    pub controlling_dimension: f64,
}

impl CrossSection {
    /// The plane the section is drawn on: global XZ, normal -Y.
    pub fn plane() -> SketchPlane {
        SketchPlane::xz()
    }

    /// Loops of the pad sketch: the outer boundary then any hole.
    pub fn pad_loops(&self) -> Vec<SketchLoop> {
        let mut loops = vec![self.outer.clone()];
        if let Removal::Hollow(inner) = &self.removal {
            loops.push(inner.clone());
        }
        loops
    }

    /// Loops pocketed after the pad, empty unless the section is open.
    pub fn cut_loops(&self) -> &[SketchLoop] {
        match &self.removal {
            Removal::Cut(loops) => loops,
            _ => &[],
        }
    }

    /// The pad sketch on the cross plane.
    pub fn pad_sketch(&self) -> SketchProfile {
        SketchProfile::new(Self::plane(), self.pad_loops())
    }

    /// The open-section removal sketch, if any.
    pub fn removal_sketch(&self) -> Option<SketchProfile> {
        let loops = self.cut_loops();
        (!loops.is_empty()).then(|| SketchProfile::new(Self::plane(), loops.to_vec()))
    }

    /// Net material area of the section.
    pub fn area(&self) -> f64 {
        let removed: f64 = match &self.removal {
            Removal::None => 0.0,
            Removal::Hollow(inner) => inner.area().abs(),
            Removal::Cut(loops) => loops.iter().map(|l| l.area().abs()).sum(),
        };
        self.outer.area().abs() - removed
    }
}

/// Build the cross-section for `profile`.
#[instrument(skip_all, fields(kind = %profile.kind()))]
pub fn build_profile(profile: &MaterialProfile) -> Result<CrossSection> {
    profile.validate()?;

    let wall = profile.wall();
    let (ox, oz) = profile.half_extents();
    let (ix, iz) = (ox - wall, oz - wall);
    let tol = Tolerance::DEFAULT;

    let section = match *profile {
        MaterialProfile::Round { diameter, .. } => {
            let r = diameter / 2.0;
            let outer = SketchLoop::circle(Point2::origin(), r)?;
            let inner_r = r - wall;
            let removal = if inner_r > tol.linear {
                Removal::Hollow(SketchLoop::circle(Point2::origin(), inner_r)?)
            } else {
                Removal::None
            };
            CrossSection {
                outer,
                removal,
                controlling_dimension: diameter,
            }
        }
        _ => {
            let radius = profile.effective_corner_radius();
            let outer = rounded(ox, oz, radius)?;
            let removal = match profile.kind().removal_pattern() {
                RemovalPattern::Hollow => {
                    if ix > tol.linear && iz > tol.linear {
                        Removal::Hollow(rounded(ix, iz, radius)?)
                    } else {
                        Removal::None
                    }
                }
                RemovalPattern::Corner => Removal::Cut(vec![span(-ix, ox, -iz, oz)?]),
                RemovalPattern::Slab => Removal::Cut(vec![span(-ox, ox, -oz + wall, oz)?]),
                RemovalPattern::Channel => Removal::Cut(vec![span(-ix, ix, -iz, oz)?]),
                RemovalPattern::FlangePair => {
                    let web = wall / 2.0;
                    Removal::Cut(vec![span(-ox, -web, -iz, iz)?, span(web, ox, -iz, iz)?])
                }
            };
            CrossSection {
                outer,
                removal,
                controlling_dimension: profile.controlling_dimension(),
            }
        }
    };

    debug!(
        area = section.area(),
        controlling = section.controlling_dimension,
        "built cross-section"
    );
    Ok(section)
}

fn span(x0: f64, x1: f64, z0: f64, z1: f64) -> Result<SketchLoop> {
    Ok(SketchLoop::rectangle(
        Point2::new(x0, z0),
        Point2::new(x1, z1),
    )?)
}

fn rounded(hx: f64, hz: f64, radius: f64) -> Result<SketchLoop> {
    SketchLoop::rounded_rectangle(Point2::new(-hx, -hz), Point2::new(hx, hz), radius).map_err(
        |e| match e {
            SketchError::InvalidRadius(r) => TubeError::InvalidDimension(format!(
                "corner radius {r} does not fit a {} x {} loop",
                2.0 * hx,
                2.0 * hz
            )),
            other => other.into(),
        },
    )
}
