//! Lowering a [`TubePlan`] into the kernel document.

use tubestock_ir::{CutExtent, Document, DocumentBuilder, NodeId, PlaneDef, Point2D, Segment2D, Vec3};
use tubestock_math::{Point2, Point3};
use tubestock_sketch::{SketchLoop, SketchPlane, SketchProfile, SketchSegment};

use crate::endcut::CutPlaneGeometry;
use crate::plan::TubePlan;

/// Presentation pose of the finished body, as yaw/pitch/roll degrees.
pub const BODY_ROTATION: (f64, f64, f64) = (90.0, 0.0, 0.0);

fn point(p: Point2) -> Point2D {
    Point2D::new(p.x, p.y)
}

fn vec3(x: f64, y: f64, z: f64) -> Vec3 {
    Vec3::new(x, y, z)
}

fn origin(p: &Point3) -> Vec3 {
    vec3(p.x, p.y, p.z)
}

/// Convert a sketch plane to its document form.
pub fn plane_def(plane: &SketchPlane) -> PlaneDef {
    let axis = |d: &tubestock_math::Dir3| vec3(d.x, d.y, d.z);
    PlaneDef {
        origin: origin(&plane.origin),
        x_dir: axis(&plane.x_dir),
        y_dir: axis(&plane.y_dir),
        normal: axis(&plane.normal),
    }
}

/// Convert a loop to its document form.
pub fn loop_segments(l: &SketchLoop) -> Vec<Segment2D> {
    l.segments()
        .iter()
        .map(|s| match *s {
            SketchSegment::Line { start, end } => Segment2D::Line {
                start: point(start),
                end: point(end),
            },
            SketchSegment::Arc {
                start,
                end,
                center,
                ccw,
            } => Segment2D::Arc {
                start: point(start),
                end: point(end),
                center: point(center),
                ccw,
            },
        })
        .collect()
}

fn add_sketch(b: &mut DocumentBuilder, sketch: &SketchProfile) -> NodeId {
    b.sketch(
        plane_def(&sketch.plane),
        sketch.loops.iter().map(loop_segments).collect(),
    )
}

impl TubePlan {
    /// Emit the kernel operations for this tube.
    ///
    /// Order: section pad, open-section removal, end 1 cut, end 2 cut, then
    /// one pocket per (feature, orientation, row) holding every axial
    /// instance of that row.
    pub fn to_document(&self) -> Document {
        let mut b = DocumentBuilder::new();

        let sketch = add_sketch(&mut b, &self.section.pad_sketch());
        let mut solid = b.pad(sketch, self.end_cuts.effective_length);

        if let Some(removal) = self.section.removal_sketch() {
            let sketch = add_sketch(&mut b, &removal);
            solid = b.pocket(solid, sketch, CutExtent::ThroughAll { both_sides: true }, false);
        }

        let end_cuts: [&Option<CutPlaneGeometry>; 2] = [&self.end_cuts.cut1, &self.end_cuts.cut2];
        for cut in end_cuts.into_iter().flatten() {
            let sketch = add_sketch(&mut b, &cut.sketch());
            solid = b.pocket(solid, sketch, cut.extent, cut.reversed);
        }

        for plan in &self.features {
            for group in plan
                .placed
                .chunk_by(|x, y| x.orientation == y.orientation && x.row_index == y.row_index)
            {
                let first = &group[0];
                let loops = group.iter().map(|p| p.outline.clone()).collect();
                let sketch = add_sketch(&mut b, &SketchProfile::new(first.plane.clone(), loops));
                solid = b.pocket(solid, sketch, first.extent, first.reversed);
            }
        }

        let (yaw, pitch, roll) = BODY_ROTATION;
        b.body_rotation(yaw, pitch, roll);
        let doc = b.finish();
        debug_assert!(doc.dangling_references().is_empty());
        doc
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::endcut::{EndTreatment, RotationalOffset};
    use crate::feature::{Feature, Placement};
    use crate::material::MaterialProfile;
    use crate::orientation::OrientationFlags;
    use crate::plan::{plan_tube, FeatureRequest, TubeSpec};
    use tubestock_ir::GeomOp;

    fn angle_iron() -> TubeSpec {
        TubeSpec {
            profile: MaterialProfile::AngleIron {
                side1: 40.0,
                side2: 40.0,
                wall: 4.0,
                corner_radius: 0.0,
            },
            nominal_length: 400.0,
            rotational_offset: RotationalOffset::Deg0,
            end1: EndTreatment::mitered(45.0),
            end2: EndTreatment::mitered(45.0),
        }
    }

    #[test]
    fn test_document_order() {
        let requests = [FeatureRequest {
            feature: Feature::Circle { diameter: 8.0 },
            placement: Placement {
                array_increment: 50.0,
                array_instance_count: 3,
                transverse_increment: 10.0,
                transverse_instance_count: 2,
                ..Placement::at(40.0, OrientationFlags::new(false, true, false, false))
            },
        }];
        let plan = plan_tube(&angle_iron(), &requests).unwrap();
        let doc = plan.to_document();

        let ops: Vec<&GeomOp> = doc.nodes.values().map(|n| &n.op).collect();
        // removal, two end cuts, then one pocket per row on each of the
        // two faces the 90 request lands on
        let pockets = doc.op_counts().pockets;
        assert_eq!(pockets, 1 + 2 + 2 * 2);
        assert!(matches!(ops[1], GeomOp::Pad { .. }));
        match ops[1] {
            GeomOp::Pad { length, .. } => assert!((length - 440.0).abs() < 1e-9),
            _ => unreachable!(),
        }

        // The last sketch holds the three axial instances of row 1
        let last_sketch = doc
            .nodes
            .values()
            .rev()
            .find_map(|n| match &n.op {
                GeomOp::Sketch { loops, .. } => Some(loops.len()),
                _ => None,
            })
            .unwrap();
        assert_eq!(last_sketch, 3);
        assert!(doc.dangling_references().is_empty());
        assert_eq!(doc.root, doc.nodes.keys().next_back().copied());
        assert_eq!(doc.body_rotation, Vec3::new(90.0, 0.0, 0.0));
    }

    #[test]
    fn test_square_round_tube_is_one_pad() {
        let spec = TubeSpec {
            profile: MaterialProfile::Round {
                diameter: 50.0,
                wall: 5.0,
            },
            nominal_length: 200.0,
            rotational_offset: RotationalOffset::Deg0,
            end1: EndTreatment::square(),
            end2: EndTreatment::square(),
        };
        let doc = plan_tube(&spec, &[]).unwrap().to_document();
        assert_eq!(doc.nodes.len(), 2);
        match &doc.nodes[&1].op {
            GeomOp::Sketch { plane, loops } => {
                assert_eq!(loops.len(), 2);
                assert_eq!(plane.normal, Vec3::new(0.0, -1.0, 0.0));
            }
            other => panic!("expected sketch, got {other:?}"),
        }
    }
}
