//! 2D sketch loop types.

use std::f64::consts::PI;
use tubestock_math::{Point2, Tolerance, Vec2};

use crate::{SketchError, SketchPlane};

/// A segment of a 2D sketch loop.
#[derive(Debug, Clone, PartialEq)]
pub enum SketchSegment {
    /// A line segment from start to end.
    Line {
        /// Start point in 2D sketch coordinates.
        start: Point2,
        /// End point in 2D sketch coordinates.
        end: Point2,
    },
    /// A circular arc from start to end around a center.
    Arc {
        /// Start point in 2D sketch coordinates.
        start: Point2,
        /// End point in 2D sketch coordinates.
        end: Point2,
        /// Center of the arc in 2D sketch coordinates.
        center: Point2,
        /// If true, arc goes counter-clockwise from start to end.
        ccw: bool,
    },
}

impl SketchSegment {
    /// Get the start point of this segment.
    pub fn start(&self) -> Point2 {
        match self {
            SketchSegment::Line { start, .. } => *start,
            SketchSegment::Arc { start, .. } => *start,
        }
    }

    /// Get the end point of this segment.
    pub fn end(&self) -> Point2 {
        match self {
            SketchSegment::Line { end, .. } => *end,
            SketchSegment::Arc { end, .. } => *end,
        }
    }

    /// Radius of an arc segment, `None` for lines.
    pub fn radius(&self) -> Option<f64> {
        match self {
            SketchSegment::Line { .. } => None,
            SketchSegment::Arc { start, center, .. } => Some((start - center).norm()),
        }
    }

    /// Check if this segment is degenerate (zero length).
    pub fn is_degenerate(&self) -> bool {
        let tol = Tolerance::DEFAULT;
        match self {
            SketchSegment::Line { start, end } => (end - start).norm() < tol.linear,
            SketchSegment::Arc {
                start, end, center, ..
            } => {
                // Degenerate if start == end or radius is zero
                let r1 = (start - center).norm();
                let r2 = (end - center).norm();
                r1 < tol.linear || r2 < tol.linear || (end - start).norm() < tol.linear
            }
        }
    }

    /// Signed sweep angle of an arc in radians (positive for CCW), 0 for lines.
    pub fn sweep(&self) -> f64 {
        match self {
            SketchSegment::Line { .. } => 0.0,
            SketchSegment::Arc {
                start,
                end,
                center,
                ccw,
            } => {
                let d_start = start - center;
                let d_end = end - center;
                let start_angle = d_start.y.atan2(d_start.x);
                let end_angle = d_end.y.atan2(d_end.x);
                let mut angle = end_angle - start_angle;
                if *ccw {
                    if angle <= 0.0 {
                        angle += 2.0 * PI;
                    }
                } else if angle >= 0.0 {
                    angle -= 2.0 * PI;
                }
                angle
            }
        }
    }

    /// Unit direction of travel at the start of the segment.
    pub fn start_tangent(&self) -> Vec2 {
        match self {
            SketchSegment::Line { start, end } => (end - start).normalize(),
            SketchSegment::Arc {
                start, center, ccw, ..
            } => arc_tangent(*start, *center, *ccw),
        }
    }

    /// Unit direction of travel at the end of the segment.
    pub fn end_tangent(&self) -> Vec2 {
        match self {
            SketchSegment::Line { start, end } => (end - start).normalize(),
            SketchSegment::Arc {
                end, center, ccw, ..
            } => arc_tangent(*end, *center, *ccw),
        }
    }

    /// Swap the x and y coordinates of every point.
    ///
    /// Swapping axes is a reflection, so arcs change winding.
    pub fn transposed(&self) -> Self {
        let swap = |p: &Point2| Point2::new(p.y, p.x);
        match self {
            SketchSegment::Line { start, end } => SketchSegment::Line {
                start: swap(start),
                end: swap(end),
            },
            SketchSegment::Arc {
                start,
                end,
                center,
                ccw,
            } => SketchSegment::Arc {
                start: swap(start),
                end: swap(end),
                center: swap(center),
                ccw: !ccw,
            },
        }
    }

    /// Contribution of this segment to the enclosed signed area.
    fn area_term(&self) -> f64 {
        let (a, b) = (self.start(), self.end());
        let chord = 0.5 * (a.x * b.y - b.x * a.y);
        match self {
            SketchSegment::Line { .. } => chord,
            SketchSegment::Arc { .. } => {
                let r = self.radius().unwrap_or(0.0);
                let theta = self.sweep();
                chord + 0.5 * r * r * (theta - theta.sin())
            }
        }
    }

    /// Points that bound this segment: its endpoints plus any axis-extreme
    /// points an arc passes through.
    fn extreme_points(&self) -> Vec<Point2> {
        let mut pts = vec![self.start(), self.end()];
        if let SketchSegment::Arc { start, center, .. } = self {
            let r = (start - center).norm();
            let d = start - center;
            let a0 = d.y.atan2(d.x);
            let sweep = self.sweep();
            for k in 0..4 {
                let cardinal = k as f64 * PI / 2.0;
                let mut delta = (cardinal - a0).rem_euclid(2.0 * PI);
                if sweep < 0.0 {
                    delta = -((a0 - cardinal).rem_euclid(2.0 * PI));
                }
                if delta.abs() <= sweep.abs() {
                    pts.push(Point2::new(
                        center.x + r * cardinal.cos(),
                        center.y + r * cardinal.sin(),
                    ));
                }
            }
        }
        pts
    }
}

fn arc_tangent(p: Point2, center: Point2, ccw: bool) -> Vec2 {
    let r = (p - center).normalize();
    if ccw {
        Vec2::new(-r.y, r.x)
    } else {
        Vec2::new(r.y, -r.x)
    }
}

/// A closed loop of sketch segments in 2D sketch coordinates.
///
/// Every constructor validates that segments join end to start and that the
/// last segment ends where the first one begins, so a loop is never empty.
#[derive(Debug, Clone, PartialEq)]
pub struct SketchLoop {
    segments: Vec<SketchSegment>,
}

impl SketchLoop {
    /// Create a loop from segments.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The loop has no segments
    /// - Any segment is degenerate
    /// - The loop is not closed (start of first segment != end of last segment)
    pub fn new(segments: Vec<SketchSegment>) -> Result<Self, SketchError> {
        let Some(last) = segments.last() else {
            return Err(SketchError::EmptyLoop);
        };

        for (i, seg) in segments.iter().enumerate() {
            if seg.is_degenerate() {
                return Err(SketchError::DegenerateSegment(i));
            }
        }

        let tol = Tolerance::DEFAULT;
        let gap = (last.end() - segments[0].start()).norm();
        if gap > tol.linear {
            return Err(SketchError::NotClosed(gap));
        }

        for pair in segments.windows(2) {
            let continuity_gap = (pair[1].start() - pair[0].end()).norm();
            if continuity_gap > tol.linear {
                return Err(SketchError::NotClosed(continuity_gap));
            }
        }

        Ok(Self { segments })
    }

    /// Closed polygon through `points`, joined back to the first point.
    pub fn polygon(points: &[Point2]) -> Result<Self, SketchError> {
        let n = points.len();
        let segments = (0..n)
            .map(|i| SketchSegment::Line {
                start: points[i],
                end: points[(i + 1) % n],
            })
            .collect();
        Self::new(segments)
    }

    /// Three-segment closed triangle `a → b → c → a`.
    pub fn triangle(a: Point2, b: Point2, c: Point2) -> Result<Self, SketchError> {
        Self::polygon(&[a, b, c])
    }

    /// Axis-aligned rectangle spanning `min` to `max`.
    ///
    /// Segments go counter-clockwise starting with the bottom edge.
    pub fn rectangle(min: Point2, max: Point2) -> Result<Self, SketchError> {
        Self::polygon(&[
            Point2::new(min.x, min.y),
            Point2::new(max.x, min.y),
            Point2::new(max.x, max.y),
            Point2::new(min.x, max.y),
        ])
    }

    /// Axis-aligned rectangle with every corner rounded by `radius`.
    ///
    /// A zero radius gives the plain rectangle. Edges that the fillets
    /// consume entirely are dropped, so a square with `radius` equal to its
    /// half side becomes a circle made of four arcs.
    pub fn rounded_rectangle(min: Point2, max: Point2, radius: f64) -> Result<Self, SketchError> {
        let tol = Tolerance::DEFAULT;
        if tol.is_zero(radius) {
            return Self::rectangle(min, max);
        }
        let half = ((max.x - min.x) / 2.0).min((max.y - min.y) / 2.0);
        if radius < 0.0 || radius > half + tol.linear {
            return Err(SketchError::InvalidRadius(radius));
        }
        let r = radius.min(half);

        // Corner centers, counter-clockwise from bottom-right
        let br = Point2::new(max.x - r, min.y + r);
        let tr = Point2::new(max.x - r, max.y - r);
        let tl = Point2::new(min.x + r, max.y - r);
        let bl = Point2::new(min.x + r, min.y + r);

        let corners = [
            (br, Point2::new(br.x, min.y), Point2::new(max.x, br.y)),
            (tr, Point2::new(max.x, tr.y), Point2::new(tr.x, max.y)),
            (tl, Point2::new(tl.x, max.y), Point2::new(min.x, tl.y)),
            (bl, Point2::new(min.x, bl.y), Point2::new(bl.x, min.y)),
        ];

        let mut segments = Vec::with_capacity(8);
        for i in 0..4 {
            let (center, arc_start, arc_end) = corners[i];
            let prev_end = corners[(i + 3) % 4].2;
            if (arc_start - prev_end).norm() > tol.linear {
                segments.push(SketchSegment::Line {
                    start: prev_end,
                    end: arc_start,
                });
            }
            segments.push(SketchSegment::Arc {
                start: arc_start,
                end: arc_end,
                center,
                ccw: true,
            });
        }

        Self::new(segments)
    }

    /// Full circle made of two counter-clockwise semicircular arcs.
    pub fn circle(center: Point2, radius: f64) -> Result<Self, SketchError> {
        if radius <= Tolerance::DEFAULT.linear {
            return Err(SketchError::InvalidRadius(radius));
        }
        let east = Point2::new(center.x + radius, center.y);
        let west = Point2::new(center.x - radius, center.y);
        Self::new(vec![
            SketchSegment::Arc {
                start: east,
                end: west,
                center,
                ccw: true,
            },
            SketchSegment::Arc {
                start: west,
                end: east,
                center,
                ccw: true,
            },
        ])
    }

    /// Stadium (slot) outline: two semicircles of `radius` centered on `a`
    /// and `b`, joined by two straight tangent segments.
    ///
    /// When `a` and `b` coincide the stadium collapses to a circle.
    pub fn stadium(a: Point2, b: Point2, radius: f64) -> Result<Self, SketchError> {
        if radius <= Tolerance::DEFAULT.linear {
            return Err(SketchError::InvalidRadius(radius));
        }
        let axis = b - a;
        let separation = axis.norm();
        if separation < Tolerance::DEFAULT.linear {
            return Self::circle(a, radius);
        }
        let d = axis / separation;
        let n = Vec2::new(-d.y, d.x) * radius;

        Self::new(vec![
            SketchSegment::Line {
                start: a - n,
                end: b - n,
            },
            SketchSegment::Arc {
                start: b - n,
                end: b + n,
                center: b,
                ccw: true,
            },
            SketchSegment::Line {
                start: b + n,
                end: a + n,
            },
            SketchSegment::Arc {
                start: a + n,
                end: a - n,
                center: a,
                ccw: true,
            },
        ])
    }

    /// Copy of this loop with x and y swapped in every point.
    pub fn transposed(&self) -> Self {
        Self {
            segments: self.segments.iter().map(|s| s.transposed()).collect(),
        }
    }

    /// The segments forming the closed loop, in traversal order.
    pub fn segments(&self) -> &[SketchSegment] {
        &self.segments
    }

    /// First point of the loop.
    pub fn start(&self) -> Point2 {
        self.segments.first().map_or_else(Point2::origin, |s| s.start())
    }

    /// Last point of the loop.
    pub fn end(&self) -> Point2 {
        self.segments.last().map_or_else(Point2::origin, |s| s.end())
    }

    /// True if the last point coincides with the first.
    pub fn is_closed(&self) -> bool {
        Tolerance::DEFAULT.points2_equal(&self.start(), &self.end())
    }

    /// Get all segment start points (unique vertices of the loop).
    pub fn vertices(&self) -> Vec<Point2> {
        self.segments.iter().map(|s| s.start()).collect()
    }

    /// Signed enclosed area; positive when the loop runs counter-clockwise.
    pub fn area(&self) -> f64 {
        self.segments.iter().map(|s| s.area_term()).sum()
    }

    /// Axis-aligned bounding box as `(min, max)`.
    pub fn bounds(&self) -> (Point2, Point2) {
        let mut min = Point2::new(f64::INFINITY, f64::INFINITY);
        let mut max = Point2::new(f64::NEG_INFINITY, f64::NEG_INFINITY);
        for p in self.segments.iter().flat_map(|s| s.extreme_points()) {
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
        }
        (min, max)
    }

    /// Get the number of segments.
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Always false for a constructed loop.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

/// A set of closed loops drawn on one sketch plane.
///
/// The first loop of a pad sketch is the outer boundary; any further loops
/// are holes. In a pocket sketch every loop is removed.
#[derive(Debug, Clone, PartialEq)]
pub struct SketchProfile {
    /// Plane the loops are drawn on.
    pub plane: SketchPlane,
    /// The loops, in drawing order.
    pub loops: Vec<SketchLoop>,
}

impl SketchProfile {
    /// Create a profile from a plane and its loops.
    pub fn new(plane: SketchPlane, loops: Vec<SketchLoop>) -> Self {
        Self { plane, loops }
    }

}
