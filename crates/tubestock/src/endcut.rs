//! End-cut planning: length extension, miter triangles and cope circles.
//!
//! The tube runs along global Y with end 1 at `y = -effective_length` and
//! end 2 at `y = 0`. A miter is a right triangle drawn on a reference plane
//! through the axis and pocketed straight through the section; a cope is a
//! circle drawn on a plane through the end point and pocketed along that
//! plane's normal, carving the seat of an intersecting round member.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};
use tubestock_ir::CutExtent;
use tubestock_math::{is_degenerate_miter, is_perpendicular, tan_deg, Point2, Transform};
use tubestock_sketch::{SketchLoop, SketchPlane, SketchProfile};

use crate::error::{Result, TubeError};
use crate::material::{MaterialKind, MaterialProfile};
use crate::orientation::ReferencePlane;

/// Join diameter used when a coped end gives zero.
pub const MIN_JOIN_DIAMETER: f64 = 1.0;

/// Cut style of one tube end.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndMode {
    /// Planar cut.
    #[default]
    Flat,
    /// Circular seat for a round member.
    Coped,
}

/// Which face's reference plane a rectangular-family miter is drawn on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CutSide {
    /// The front plane, spanning `side1`.
    #[default]
    Side1,
    /// The top plane, spanning `side2`.
    Side2,
}

/// How one end of the tube is finished.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EndTreatment {
    /// End angle in degrees; 90 is square.
    pub angle: f64,
    /// Flat or coped.
    #[serde(default)]
    pub mode: EndMode,
    /// Diameter of the member a coped end nests against.
    #[serde(default)]
    pub join_diameter: f64,
    /// Reference plane for a rectangular-family miter.
    #[serde(default)]
    pub cut_side: CutSide,
}

/// What an end actually gets cut with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndCutKind {
    /// No cut.
    None,
    /// Planar miter.
    Miter,
    /// Circular cope.
    Cope,
}

impl Default for EndTreatment {
    fn default() -> Self {
        Self::square()
    }
}

impl EndTreatment {
    /// Square, uncut end.
    pub fn square() -> Self {
        Self {
            angle: 90.0,
            mode: EndMode::Flat,
            join_diameter: 0.0,
            cut_side: CutSide::Side1,
        }
    }

    /// Flat cut at `angle` degrees.
    pub fn mitered(angle: f64) -> Self {
        Self {
            angle,
            ..Self::square()
        }
    }

    /// Coped end seating a member of `join_diameter`.
    pub fn coped(join_diameter: f64) -> Self {
        Self {
            mode: EndMode::Coped,
            join_diameter,
            ..Self::square()
        }
    }

    /// Same treatment drawn on `side`.
    pub fn on_side(self, side: CutSide) -> Self {
        Self {
            cut_side: side,
            ..self
        }
    }

    /// The cut produced at `angle` (the normalized end angle).
    ///
    /// A cope exists only on a square end and a miter only on a flat
    /// non-square one; the other two combinations produce nothing.
    pub fn cut_kind(&self, angle: f64) -> EndCutKind {
        match (self.mode, is_perpendicular(angle)) {
            (EndMode::Flat, false) => EndCutKind::Miter,
            (EndMode::Coped, true) => EndCutKind::Cope,
            _ => EndCutKind::None,
        }
    }

    /// Radius of the cope circle, with a zero join diameter floored.
    pub fn cope_radius(&self) -> f64 {
        if self.join_diameter == 0.0 {
            MIN_JOIN_DIAMETER / 2.0
        } else {
            self.join_diameter / 2.0
        }
    }
}

/// Angle of end 2's cut plane relative to end 1's, around the tube axis.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub enum RotationalOffset {
    /// Same plane.
    #[default]
    Deg0,
    /// Orthogonal plane.
    Deg90,
    /// Same plane, mirrored.
    Deg180,
    /// Orthogonal plane, mirrored.
    Deg270,
}

impl RotationalOffset {
    /// Parse a degree value; only the four quarter turns are accepted.
    pub fn from_degrees(degrees: f64) -> Result<Self> {
        match degrees {
            d if d == 0.0 => Ok(Self::Deg0),
            d if d == 90.0 => Ok(Self::Deg90),
            d if d == 180.0 => Ok(Self::Deg180),
            d if d == 270.0 => Ok(Self::Deg270),
            _ => Err(TubeError::InvalidOffset(degrees)),
        }
    }

    /// Value in degrees.
    pub fn degrees(self) -> f64 {
        match self {
            Self::Deg0 => 0.0,
            Self::Deg90 => 90.0,
            Self::Deg180 => 180.0,
            Self::Deg270 => 270.0,
        }
    }

    /// This offset plus 90°, wrapping 270 to 0.
    pub fn plus_quarter(self) -> Self {
        match self {
            Self::Deg0 => Self::Deg90,
            Self::Deg90 => Self::Deg180,
            Self::Deg180 => Self::Deg270,
            Self::Deg270 => Self::Deg0,
        }
    }

    /// End 2 is drawn on the plane orthogonal to end 1's.
    pub fn is_orthogonal(self) -> bool {
        matches!(self, Self::Deg90 | Self::Deg270)
    }
}

impl TryFrom<f64> for RotationalOffset {
    type Error = TubeError;

    fn try_from(value: f64) -> Result<Self> {
        Self::from_degrees(value)
    }
}

impl From<RotationalOffset> for f64 {
    fn from(value: RotationalOffset) -> Self {
        value.degrees()
    }
}

impl fmt::Display for RotationalOffset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}°", self.degrees())
    }
}

/// A planar outline, its pose in the tube frame, and how it is pocketed.
#[derive(Debug, Clone, PartialEq)]
pub struct CutPlaneGeometry {
    /// Closed outline in the plane's local frame.
    pub outline: SketchLoop,
    /// Plane pose in the tube frame.
    pub plane: SketchPlane,
    /// Pocket depth.
    pub extent: CutExtent,
    /// Pocket along the plane normal rather than against it.
    pub reversed: bool,
}

impl CutPlaneGeometry {
    /// The outline as a single-loop sketch on its plane.
    pub fn sketch(&self) -> SketchProfile {
        SketchProfile::new(self.plane.clone(), vec![self.outline.clone()])
    }

    fn through_all(outline: SketchLoop, plane: SketchPlane) -> Self {
        Self {
            outline,
            plane,
            extent: CutExtent::ThroughAll { both_sides: true },
            reversed: false,
        }
    }
}

/// Result of end-cut planning for one tube.
#[derive(Debug, Clone, PartialEq)]
pub struct EndCutPlan {
    /// Length the section is padded to.
    pub effective_length: f64,
    /// Offset actually used for end 2, after the cut-side adjustment.
    pub effective_offset: RotationalOffset,
    /// End 1 cut, if any.
    pub cut1: Option<CutPlaneGeometry>,
    /// End 2 cut, if any.
    pub cut2: Option<CutPlaneGeometry>,
}

/// Axial run a miter at `angle` adds to a tube of `controlling` size.
///
/// Exactly zero for a square end.
pub fn extension(controlling: f64, angle: f64) -> f64 {
    if is_perpendicular(angle) {
        0.0
    } else {
        controlling * tan_deg(90.0 - angle) / 2.0
    }
}

/// Padded length so that `nominal` is measured between the cut centers.
pub fn effective_length(controlling: f64, nominal: f64, angle1: f64, angle2: f64) -> f64 {
    match (is_perpendicular(angle1), is_perpendicular(angle2)) {
        (true, true) => nominal,
        (true, false) => nominal + extension(controlling, angle2),
        (false, true) => nominal + extension(controlling, angle1),
        (false, false) => nominal + extension(controlling, angle1) + extension(controlling, angle2),
    }
}

/// Rectangular-family end angles below zero become `360 - angle`.
///
/// Round angles pass through unchanged.
pub fn normalize_angle(kind: MaterialKind, angle: f64) -> f64 {
    if kind.is_rectangular_family() && angle < 0.0 {
        360.0 - angle
    } else {
        angle
    }
}

/// Plan both end cuts and the padded length.
#[instrument(skip(profile, end1, end2), fields(kind = %profile.kind()))]
pub fn plan_end_cuts(
    profile: &MaterialProfile,
    nominal_length: f64,
    end1: &EndTreatment,
    end2: &EndTreatment,
    offset: RotationalOffset,
) -> Result<EndCutPlan> {
    if !(nominal_length.is_finite() && nominal_length > 0.0) {
        return Err(TubeError::InvalidDimension(format!(
            "length must be positive, got {nominal_length}"
        )));
    }

    let kind = profile.kind();
    let a1 = normalize_angle(kind, end1.angle);
    let a2 = normalize_angle(kind, end2.angle);
    let kind1 = end1.cut_kind(a1);
    let kind2 = end2.cut_kind(a2);
    check_angle(1, a1)?;
    check_angle(2, a2)?;
    for (n, end) in [(1, end1), (2, end2)] {
        if end.join_diameter < 0.0 || !end.join_diameter.is_finite() {
            return Err(TubeError::InvalidDimension(format!(
                "end {n} join diameter must be >= 0, got {}",
                end.join_diameter
            )));
        }
    }

    let controlling = profile.controlling_dimension();
    let length = effective_length(controlling, nominal_length, a1, a2);
    if !(length.is_finite() && length > 0.0) {
        return Err(TubeError::InvalidDimension(format!(
            "end angles {a1}° and {a2}° leave no material on a {nominal_length} tube"
        )));
    }

    let effective_offset = if kind.is_rectangular_family() && end2.cut_side == CutSide::Side2 {
        offset.plus_quarter()
    } else {
        offset
    };

    let cut1 = match kind1 {
        EndCutKind::None => None,
        EndCutKind::Cope => Some(cope_end1(end1, a1, length)?),
        EndCutKind::Miter if kind.is_rectangular_family() => {
            Some(rect_miter_end1(profile, end1.cut_side, a1, length, effective_offset)?)
        }
        EndCutKind::Miter => Some(round_miter_end1(controlling, a1, length)?),
    };

    let cut2 = match kind2 {
        EndCutKind::None => None,
        EndCutKind::Cope => Some(cope_end2(end2, a2, offset)?),
        EndCutKind::Miter if kind.is_rectangular_family() => {
            Some(rect_miter_end2(profile, a2, effective_offset)?)
        }
        EndCutKind::Miter => Some(round_miter_end2(controlling, a2, offset)?),
    };

    debug!(
        effective_length = length,
        %effective_offset,
        end1 = ?kind1,
        end2 = ?kind2,
        "planned end cuts"
    );

    Ok(EndCutPlan {
        effective_length: length,
        effective_offset,
        cut1,
        cut2,
    })
}

/// Every end angle feeds the extension, whatever cut it produces.
fn check_angle(end: u8, angle: f64) -> Result<()> {
    if is_degenerate_miter(angle) {
        return Err(TubeError::DegenerateAngle { end, angle });
    }
    Ok(())
}

/// Miter triangle at end 1 on a plane whose local x is axial.
///
/// The right angle sits on the +transverse edge at the end face.
fn end1_triangle(span: f64, angle: f64, length: f64) -> Result<SketchLoop> {
    let h = span / 2.0;
    let x1 = -length;
    let x2 = x1 + span / tan_deg(angle);
    Ok(SketchLoop::triangle(
        Point2::new(x1, -h),
        Point2::new(x2, h),
        Point2::new(x1, h),
    )?)
}

fn round_miter_end1(diameter: f64, angle: f64, length: f64) -> Result<CutPlaneGeometry> {
    Ok(CutPlaneGeometry::through_all(
        end1_triangle(diameter, angle, length)?,
        ReferencePlane::Front.sketch_plane(),
    ))
}

fn round_miter_end2(
    diameter: f64,
    angle: f64,
    offset: RotationalOffset,
) -> Result<CutPlaneGeometry> {
    let h = diameter / 2.0;
    let x = -diameter / tan_deg(angle);
    let outline = SketchLoop::triangle(Point2::new(0.0, -h), Point2::new(x, h), Point2::new(0.0, h))?;
    // Round stock turns the front plane about the axis instead of switching planes
    let turn = Transform::rotation_y((-offset.degrees()).to_radians());
    Ok(CutPlaneGeometry::through_all(
        outline,
        ReferencePlane::Front.sketch_plane().transformed(&turn),
    ))
}

fn rect_miter_end1(
    profile: &MaterialProfile,
    side: CutSide,
    angle: f64,
    length: f64,
    effective_offset: RotationalOffset,
) -> Result<CutPlaneGeometry> {
    let (hx, hz) = profile.half_extents();
    let (outline, plane, depth) = match side {
        CutSide::Side1 => (
            end1_triangle(2.0 * hz, angle, length)?,
            ReferencePlane::Front,
            2.0 * hx,
        ),
        CutSide::Side2 => (
            end1_triangle(2.0 * hx, angle, length)?.transposed(),
            ReferencePlane::Top,
            2.0 * hz,
        ),
    };
    let mut cut = CutPlaneGeometry::through_all(outline, plane.sketch_plane());
    if effective_offset.is_orthogonal() {
        cut.extent = CutExtent::TwoSided {
            forward: depth,
            backward: depth,
        };
    }
    Ok(cut)
}

fn rect_miter_end2(
    profile: &MaterialProfile,
    angle: f64,
    effective_offset: RotationalOffset,
) -> Result<CutPlaneGeometry> {
    let (hx, hz) = profile.half_extents();
    let (outline, plane) = match effective_offset {
        RotationalOffset::Deg0 => {
            let x = -2.0 * hz / tan_deg(angle);
            (
                SketchLoop::triangle(Point2::new(0.0, -hz), Point2::new(x, hz), Point2::new(0.0, hz))?,
                ReferencePlane::Front,
            )
        }
        RotationalOffset::Deg180 => {
            let x = -2.0 * hz / tan_deg(angle);
            (
                SketchLoop::triangle(Point2::new(x, -hz), Point2::new(0.0, hz), Point2::new(0.0, -hz))?,
                ReferencePlane::Front,
            )
        }
        RotationalOffset::Deg90 => {
            let y = -2.0 * hx / tan_deg(angle);
            (
                SketchLoop::triangle(Point2::new(-hx, 0.0), Point2::new(-hx, y), Point2::new(hx, 0.0))?,
                ReferencePlane::Top,
            )
        }
        RotationalOffset::Deg270 => {
            let y = -2.0 * hx / tan_deg(angle);
            (
                SketchLoop::triangle(Point2::new(hx, 0.0), Point2::new(hx, y), Point2::new(-hx, 0.0))?,
                ReferencePlane::Top,
            )
        }
    };
    Ok(CutPlaneGeometry::through_all(outline, plane.sketch_plane()))
}

fn cope_end1(end: &EndTreatment, angle: f64, length: f64) -> Result<CutPlaneGeometry> {
    let pose = Transform::translation(0.0, -length, 0.0)
        .then(&Transform::rotation_x((-(90.0 - angle)).to_radians()));
    Ok(CutPlaneGeometry::through_all(
        SketchLoop::circle(Point2::origin(), end.cope_radius())?,
        SketchPlane::xy().transformed(&pose),
    ))
}

fn cope_end2(end: &EndTreatment, angle: f64, offset: RotationalOffset) -> Result<CutPlaneGeometry> {
    let pose = Transform::from_ypr_degrees(0.0, -offset.degrees(), 90.0 - angle);
    Ok(CutPlaneGeometry::through_all(
        SketchLoop::circle(Point2::origin(), end.cope_radius())?,
        SketchPlane::xy().transformed(&pose),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use tubestock_math::{Point3, Vec3};

    fn round() -> MaterialProfile {
        MaterialProfile::Round {
            diameter: 50.0,
            wall: 5.0,
        }
    }

    fn rect() -> MaterialProfile {
        MaterialProfile::Rectangular {
            side1: 40.0,
            side2: 60.0,
            wall: 3.0,
            corner_radius: 0.0,
        }
    }

    #[test]
    fn test_extension_formula() {
        assert_eq!(extension(50.0, 90.0), 0.0);
        for angle in [15.0, 30.0, 45.0, 60.0, 89.0, 91.0, 120.0, 170.0] {
            let expected = 50.0 * (90.0_f64 - angle).to_radians().tan() / 2.0;
            assert_relative_eq!(extension(50.0, angle), expected, epsilon = 1e-12);
        }
        assert_relative_eq!(extension(50.0, 45.0), 25.0, epsilon = 1e-12);
    }

    #[test]
    fn test_round_square_ends() {
        let plan = plan_end_cuts(
            &round(),
            200.0,
            &EndTreatment::square(),
            &EndTreatment::square(),
            RotationalOffset::Deg0,
        )
        .unwrap();
        assert_eq!(plan.effective_length, 200.0);
        assert!(plan.cut1.is_none());
        assert!(plan.cut2.is_none());
    }

    #[test]
    fn test_round_one_miter() {
        let plan = plan_end_cuts(
            &round(),
            200.0,
            &EndTreatment::square(),
            &EndTreatment::mitered(60.0),
            RotationalOffset::Deg0,
        )
        .unwrap();
        let expected = 200.0 + 50.0 * 30.0_f64.to_radians().tan() / 2.0;
        assert_relative_eq!(plan.effective_length, expected, epsilon = 1e-9);
        assert!(plan.cut1.is_none());

        let cut = plan.cut2.unwrap();
        assert_eq!(cut.outline.len(), 3);
        assert!(cut.outline.is_closed());
        assert_eq!(cut.extent, CutExtent::ThroughAll { both_sides: true });
        // Hypotenuse runs from the far edge at the end face back along the axis
        let v = cut.outline.vertices();
        assert_relative_eq!(v[1].x, -50.0 / 60.0_f64.to_radians().tan(), epsilon = 1e-9);
        assert_relative_eq!(v[1].y, 25.0);
    }

    #[test]
    fn test_both_ends_mitered() {
        let plan = plan_end_cuts(
            &rect(),
            300.0,
            &EndTreatment::mitered(45.0),
            &EndTreatment::mitered(60.0),
            RotationalOffset::Deg0,
        )
        .unwrap();
        let expected = 300.0 + extension(40.0, 45.0) + extension(40.0, 60.0);
        assert_relative_eq!(plan.effective_length, expected, epsilon = 1e-9);

        let cut1 = plan.cut1.unwrap();
        let v = cut1.outline.vertices();
        assert_relative_eq!(v[0].x, -expected, epsilon = 1e-9);
        assert_relative_eq!(v[1].x, -expected + 40.0, epsilon = 1e-9);
        assert_eq!(cut1.extent, CutExtent::ThroughAll { both_sides: true });
    }

    #[test]
    fn test_rect_end2_parallel_pattern() {
        let plan = plan_end_cuts(
            &rect(),
            300.0,
            &EndTreatment::square(),
            &EndTreatment::mitered(45.0),
            RotationalOffset::Deg0,
        )
        .unwrap();
        let cut2 = plan.cut2.unwrap();
        assert_eq!(cut2.plane, ReferencePlane::Front.sketch_plane());
        assert_eq!(cut2.extent, CutExtent::ThroughAll { both_sides: true });
        assert!(!cut2.reversed);
        let v = cut2.outline.vertices();
        assert_eq!(v.len(), 3);
        // Right angle at the +Z edge of the end face, run of side1 / tan
        assert_relative_eq!(v[0].x, 0.0);
        assert_relative_eq!(v[0].y, -20.0);
        assert_relative_eq!(v[1].x, -40.0, epsilon = 1e-9);
        assert_relative_eq!(v[1].y, 20.0);
        assert_relative_eq!(v[2].x, 0.0);
        assert_relative_eq!(v[2].y, 20.0);
    }

    #[test]
    fn test_end1_bounded_at_270() {
        let plan = plan_end_cuts(
            &rect(),
            300.0,
            &EndTreatment::mitered(45.0),
            &EndTreatment::mitered(45.0),
            RotationalOffset::Deg270,
        )
        .unwrap();
        let cut1 = plan.cut1.unwrap();
        assert_eq!(cut1.plane, ReferencePlane::Front.sketch_plane());
        assert_eq!(
            cut1.extent,
            CutExtent::TwoSided {
                forward: 60.0,
                backward: 60.0
            }
        );

        // Drawn on the top plane the depth is the side1 extent instead
        let plan = plan_end_cuts(
            &rect(),
            300.0,
            &EndTreatment::mitered(45.0).on_side(CutSide::Side2),
            &EndTreatment::mitered(45.0),
            RotationalOffset::Deg270,
        )
        .unwrap();
        let cut1 = plan.cut1.unwrap();
        assert_eq!(cut1.plane, ReferencePlane::Top.sketch_plane());
        assert_eq!(
            cut1.extent,
            CutExtent::TwoSided {
                forward: 40.0,
                backward: 40.0
            }
        );
    }

    #[test]
    fn test_cope_end2_follows_offset() {
        // Seat axis starts on Z and turns about the tube axis by -offset
        let cases = [
            (RotationalOffset::Deg0, Vec3::z()),
            (RotationalOffset::Deg180, -Vec3::z()),
            (RotationalOffset::Deg270, Vec3::x()),
        ];
        for (offset, normal) in cases {
            let plan = plan_end_cuts(
                &round(),
                120.0,
                &EndTreatment::square(),
                &EndTreatment::coped(40.0),
                offset,
            )
            .unwrap();
            let c2 = plan.cut2.unwrap();
            assert!((c2.plane.normal.as_ref() - normal).norm() < 1e-12);
            assert!((c2.plane.origin - Point3::origin()).norm() < 1e-12);
            assert_eq!(c2.extent, CutExtent::ThroughAll { both_sides: true });
            assert_eq!(c2.outline.segments()[0].radius(), Some(20.0));
        }
    }

    #[test]
    fn test_cut_side_increments_offset() {
        let plan = plan_end_cuts(
            &rect(),
            300.0,
            &EndTreatment::square(),
            &EndTreatment::mitered(60.0).on_side(CutSide::Side2),
            RotationalOffset::Deg90,
        )
        .unwrap();
        assert_eq!(plan.effective_offset, RotationalOffset::Deg180);
        let cut2 = plan.cut2.unwrap();
        // 180 stays on the front plane with the mirrored pattern
        assert_eq!(cut2.plane, ReferencePlane::Front.sketch_plane());
        let v = cut2.outline.vertices();
        assert_relative_eq!(v[0].y, -20.0);
        assert_relative_eq!(v[1].x, 0.0);
    }

    #[test]
    fn test_cut_side_wraps() {
        assert_eq!(
            RotationalOffset::Deg270.plus_quarter(),
            RotationalOffset::Deg0
        );
        let plan = plan_end_cuts(
            &rect(),
            300.0,
            &EndTreatment::square(),
            &EndTreatment::mitered(45.0).on_side(CutSide::Side2),
            RotationalOffset::Deg270,
        )
        .unwrap();
        assert_eq!(plan.effective_offset, RotationalOffset::Deg0);
    }

    #[test]
    fn test_cut_side_ignored_for_round() {
        let plan = plan_end_cuts(
            &round(),
            300.0,
            &EndTreatment::square(),
            &EndTreatment::mitered(45.0).on_side(CutSide::Side2),
            RotationalOffset::Deg90,
        )
        .unwrap();
        assert_eq!(plan.effective_offset, RotationalOffset::Deg90);
    }

    #[test]
    fn test_orthogonal_offset_uses_top_plane() {
        let plan = plan_end_cuts(
            &rect(),
            300.0,
            &EndTreatment::mitered(45.0),
            &EndTreatment::mitered(45.0),
            RotationalOffset::Deg90,
        )
        .unwrap();
        let cut1 = plan.cut1.unwrap();
        assert_eq!(
            cut1.extent,
            CutExtent::TwoSided {
                forward: 60.0,
                backward: 60.0
            }
        );
        let cut2 = plan.cut2.unwrap();
        assert_eq!(cut2.plane, ReferencePlane::Top.sketch_plane());
        let v = cut2.outline.vertices();
        // Half-width comes from side2, the axial run from side2 / tan
        assert_relative_eq!(v[0].x, -30.0);
        assert_relative_eq!(v[1].y, -60.0, epsilon = 1e-9);
        assert_eq!(cut2.extent, CutExtent::ThroughAll { both_sides: true });

        let mirrored = plan_end_cuts(
            &rect(),
            300.0,
            &EndTreatment::mitered(45.0),
            &EndTreatment::mitered(45.0),
            RotationalOffset::Deg270,
        )
        .unwrap()
        .cut2
        .unwrap();
        assert_relative_eq!(mirrored.outline.vertices()[0].x, 30.0);
    }

    #[test]
    fn test_end1_side2_on_top_plane() {
        let plan = plan_end_cuts(
            &rect(),
            300.0,
            &EndTreatment::mitered(45.0).on_side(CutSide::Side2),
            &EndTreatment::square(),
            RotationalOffset::Deg0,
        )
        .unwrap();
        let cut1 = plan.cut1.unwrap();
        assert_eq!(cut1.plane, ReferencePlane::Top.sketch_plane());
        let (min, max) = cut1.outline.bounds();
        // Local (transverse, axial) on the top plane
        assert_relative_eq!(min.x, -30.0);
        assert_relative_eq!(max.x, 30.0);
        assert_relative_eq!(min.y, -plan.effective_length, epsilon = 1e-9);
    }

    #[test]
    fn test_round_end2_plane_turns_with_offset() {
        let plan = plan_end_cuts(
            &round(),
            100.0,
            &EndTreatment::square(),
            &EndTreatment::mitered(60.0),
            RotationalOffset::Deg90,
        )
        .unwrap();
        let plane = plan.cut2.unwrap().plane;
        // YZ turned -90° about Y: transverse axis Z maps to -X
        assert!((plane.y_dir.as_ref() + Vec3::x()).norm() < 1e-12);
        assert!((plane.x_dir.as_ref() - Vec3::y()).norm() < 1e-12);
    }

    #[test]
    fn test_cope_ends() {
        let plan = plan_end_cuts(
            &round(),
            120.0,
            &EndTreatment::coped(0.0),
            &EndTreatment::coped(40.0),
            RotationalOffset::Deg90,
        )
        .unwrap();
        assert_eq!(plan.effective_length, 120.0);

        let c1 = plan.cut1.unwrap();
        assert_relative_eq!(c1.outline.area(), std::f64::consts::PI * 0.25, epsilon = 1e-9);
        assert!((c1.plane.origin - Point3::new(0.0, -120.0, 0.0)).norm() < 1e-12);

        let c2 = plan.cut2.unwrap();
        assert_eq!(c2.outline.segments()[0].radius(), Some(20.0));
        // Pitch about the tube axis turns the seat axis from Z to -X
        assert!((c2.plane.normal.as_ref() + Vec3::x()).norm() < 1e-12);
    }

    #[test]
    fn test_cope_on_rectangular() {
        let plan = plan_end_cuts(
            &rect(),
            120.0,
            &EndTreatment::square(),
            &EndTreatment::coped(30.0),
            RotationalOffset::Deg0,
        )
        .unwrap();
        assert!(plan.cut2.is_some());
    }

    #[test]
    fn test_unmatched_mode_angle_pairs_cut_nothing() {
        let coped_angled = EndTreatment {
            angle: 60.0,
            ..EndTreatment::coped(30.0)
        };
        let plan = plan_end_cuts(
            &round(),
            100.0,
            &coped_angled,
            &EndTreatment::square(),
            RotationalOffset::Deg0,
        )
        .unwrap();
        assert!(plan.cut1.is_none());
        // The extension still follows the angle
        assert_relative_eq!(
            plan.effective_length,
            100.0 + extension(50.0, 60.0),
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_degenerate_angle() {
        for angle in [0.0, 180.0] {
            let r = plan_end_cuts(
                &rect(),
                100.0,
                &EndTreatment::mitered(angle),
                &EndTreatment::square(),
                RotationalOffset::Deg0,
            );
            assert!(matches!(r, Err(TubeError::DegenerateAngle { end: 1, .. })));
        }
    }

    #[test]
    fn test_degenerate_angle_on_uncut_end() {
        // A coped end at 0° or 180° cuts nothing but still sets the length
        for angle in [0.0, 180.0] {
            let coped = EndTreatment {
                angle,
                ..EndTreatment::coped(30.0)
            };
            let r = plan_end_cuts(
                &round(),
                200.0,
                &coped,
                &EndTreatment::square(),
                RotationalOffset::Deg0,
            );
            assert!(matches!(
                r,
                Err(TubeError::DegenerateAngle { end: 1, angle: a }) if a == angle
            ));
            let r = plan_end_cuts(
                &rect(),
                200.0,
                &EndTreatment::square(),
                &coped,
                RotationalOffset::Deg0,
            );
            assert!(matches!(r, Err(TubeError::DegenerateAngle { end: 2, .. })));
        }
    }

    #[test]
    fn test_negative_angle_normalization_preserved() {
        // -30 becomes 390, not 330
        assert_eq!(normalize_angle(MaterialKind::Rectangular, -30.0), 390.0);
        assert_eq!(normalize_angle(MaterialKind::Round, -30.0), -30.0);

        let plan = plan_end_cuts(
            &rect(),
            300.0,
            &EndTreatment::mitered(-30.0),
            &EndTreatment::square(),
            RotationalOffset::Deg0,
        )
        .unwrap();
        assert_relative_eq!(
            plan.effective_length,
            300.0 + extension(40.0, 390.0),
            epsilon = 1e-9
        );
        assert_relative_eq!(extension(40.0, 390.0), extension(40.0, 30.0), epsilon = 1e-9);
    }

    #[test]
    fn test_rotational_offset_parse() {
        assert_eq!(
            RotationalOffset::from_degrees(180.0).unwrap(),
            RotationalOffset::Deg180
        );
        assert!(matches!(
            RotationalOffset::from_degrees(45.0),
            Err(TubeError::InvalidOffset(_))
        ));
        let parsed: RotationalOffset = serde_json::from_str("270").unwrap();
        assert_eq!(parsed, RotationalOffset::Deg270);
        assert!(serde_json::from_str::<RotationalOffset>("30").is_err());
    }
}
