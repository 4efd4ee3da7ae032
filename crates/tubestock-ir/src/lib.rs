//! Geometry document for tubestock.
//!
//! The document is what a modeling kernel consumes: an arena of sketch, pad
//! and pocket operations keyed by integer handles. Each node carries a
//! generated name that is unique within the document. Nothing here is
//! evaluated; the kernel executes the nodes in ascending id order.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Unique identifier for a node in the document.
pub type NodeId = u64;

/// 3D vector with f64 components (millimeters).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    /// X component.
    pub x: f64,
    /// Y component.
    pub y: f64,
    /// Z component.
    pub z: f64,
}

impl Vec3 {
    /// Create a new Vec3.
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

/// 2D point in a sketch's local frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point2D {
    /// Local x.
    pub x: f64,
    /// Local y.
    pub y: f64,
}

impl Point2D {
    /// Create a new Point2D.
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// One segment of a sketch loop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Segment2D {
    /// Straight segment.
    Line {
        /// Start point.
        start: Point2D,
        /// End point.
        end: Point2D,
    },
    /// Circular arc.
    Arc {
        /// Start point.
        start: Point2D,
        /// End point.
        end: Point2D,
        /// Arc center.
        center: Point2D,
        /// Counter-clockwise from start to end.
        ccw: bool,
    },
}

/// Placement of a sketch plane in the tube's frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlaneDef {
    /// Origin of the local frame.
    pub origin: Vec3,
    /// Local x axis.
    pub x_dir: Vec3,
    /// Local y axis.
    pub y_dir: Vec3,
    /// Plane normal.
    pub normal: Vec3,
}

/// How far a pocket cuts from its sketch plane.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum CutExtent {
    /// Unbounded cut, optionally on both sides of the plane.
    ThroughAll {
        /// Cut on both sides instead of one.
        both_sides: bool,
    },
    /// Bounded cut with independent depths either side of the plane.
    TwoSided {
        /// Depth along the cut direction.
        forward: f64,
        /// Depth against the cut direction.
        backward: f64,
    },
}

/// An operation in the document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum GeomOp {
    /// Closed loops drawn on a plane.
    Sketch {
        /// Plane the loops lie on.
        plane: PlaneDef,
        /// Closed loops; the first is the outer boundary for a pad.
        loops: Vec<Vec<Segment2D>>,
    },
    /// Extrude a sketch along its normal into a solid.
    Pad {
        /// Sketch to extrude.
        sketch: NodeId,
        /// Extrusion length.
        length: f64,
    },
    /// Remove the region swept by a sketch from a solid.
    Pocket {
        /// Solid to cut.
        base: NodeId,
        /// Sketch whose loops are removed.
        sketch: NodeId,
        /// Depth of the cut.
        extent: CutExtent,
        /// Cut along the plane normal instead of against it.
        reversed: bool,
    },
}

impl GeomOp {
    /// Node ids this op reads.
    pub fn inputs(&self) -> Vec<NodeId> {
        match self {
            GeomOp::Sketch { .. } => Vec::new(),
            GeomOp::Pad { sketch, .. } => vec![*sketch],
            GeomOp::Pocket { base, sketch, .. } => vec![*base, *sketch],
        }
    }
}

/// A node in the document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Unique identifier.
    pub id: NodeId,
    /// Generated kernel object name, e.g. `Pocket007`.
    pub name: String,
    /// The operation this node represents.
    pub op: GeomOp,
}

/// Per-kind node counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OpCounts {
    /// Number of sketches.
    pub sketches: usize,
    /// Number of pads.
    pub pads: usize,
    /// Number of pockets.
    pub pockets: usize,
}

/// A tube geometry document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Format version string.
    pub version: String,
    /// All nodes, keyed by [`NodeId`].
    pub nodes: BTreeMap<NodeId, Node>,
    /// The final solid, if any.
    pub root: Option<NodeId>,
    /// Presentation rotation of the finished body as yaw/pitch/roll degrees.
    pub body_rotation: Vec3,
}

impl Default for Document {
    fn default() -> Self {
        Self {
            version: "0.1".to_string(),
            nodes: BTreeMap::new(),
            root: None,
            body_rotation: Vec3::new(0.0, 0.0, 0.0),
        }
    }
}

impl Document {
    /// Create a new empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Serialize to JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize from JSON string.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Count nodes by kind.
    pub fn op_counts(&self) -> OpCounts {
        let mut counts = OpCounts::default();
        for node in self.nodes.values() {
            match node.op {
                GeomOp::Sketch { .. } => counts.sketches += 1,
                GeomOp::Pad { .. } => counts.pads += 1,
                GeomOp::Pocket { .. } => counts.pockets += 1,
            }
        }
        counts
    }

    /// Ids referenced by some node but never defined before it.
    ///
    /// Empty for every document a [`DocumentBuilder`] produces.
    pub fn dangling_references(&self) -> Vec<NodeId> {
        self.nodes
            .values()
            .flat_map(|n| n.op.inputs().into_iter().filter(move |i| *i >= n.id))
            .chain(self.root.filter(|r| !self.nodes.contains_key(r)))
            .collect()
    }
}

/// Appends nodes to a [`Document`] with sequential ids and unique names.
///
/// The builder owns the only naming counter; names are the kind prefix
/// followed by the zero-padded id.
#[derive(Debug, Default)]
pub struct DocumentBuilder {
    doc: Document,
    next_id: NodeId,
}

impl DocumentBuilder {
    /// Start an empty document.
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, prefix: &str, op: GeomOp) -> NodeId {
        self.next_id += 1;
        let id = self.next_id;
        self.doc.nodes.insert(
            id,
            Node {
                id,
                name: format!("{prefix}{id:03}"),
                op,
            },
        );
        id
    }

    /// Add a sketch.
    pub fn sketch(&mut self, plane: PlaneDef, loops: Vec<Vec<Segment2D>>) -> NodeId {
        self.push("Sketch", GeomOp::Sketch { plane, loops })
    }

    /// Add a pad; it becomes the document root.
    pub fn pad(&mut self, sketch: NodeId, length: f64) -> NodeId {
        let id = self.push("Pad", GeomOp::Pad { sketch, length });
        self.doc.root = Some(id);
        id
    }

    /// Add a pocket; it becomes the document root.
    pub fn pocket(
        &mut self,
        base: NodeId,
        sketch: NodeId,
        extent: CutExtent,
        reversed: bool,
    ) -> NodeId {
        let id = self.push(
            "Pocket",
            GeomOp::Pocket {
                base,
                sketch,
                extent,
                reversed,
            },
        );
        self.doc.root = Some(id);
        id
    }

    /// Record the presentation rotation of the finished body.
    pub fn body_rotation(&mut self, yaw: f64, pitch: f64, roll: f64) {
        self.doc.body_rotation = Vec3::new(yaw, pitch, roll);
    }

    /// Finish and return the document.
    pub fn finish(self) -> Document {
        self.doc
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> Vec<Segment2D> {
        let p = [
            Point2D::new(0.0, 0.0),
            Point2D::new(1.0, 0.0),
            Point2D::new(1.0, 1.0),
            Point2D::new(0.0, 1.0),
        ];
        (0..4)
            .map(|i| Segment2D::Line {
                start: p[i],
                end: p[(i + 1) % 4],
            })
            .collect()
    }

    fn xz() -> PlaneDef {
        PlaneDef {
            origin: Vec3::new(0.0, 0.0, 0.0),
            x_dir: Vec3::new(1.0, 0.0, 0.0),
            y_dir: Vec3::new(0.0, 0.0, 1.0),
            normal: Vec3::new(0.0, -1.0, 0.0),
        }
    }

    #[test]
    fn roundtrip_document() {
        let mut b = DocumentBuilder::new();
        let s = b.sketch(xz(), vec![square()]);
        let pad = b.pad(s, 100.0);
        let cut = b.sketch(
            xz(),
            vec![vec![
                Segment2D::Arc {
                    start: Point2D::new(1.0, 0.0),
                    end: Point2D::new(-1.0, 0.0),
                    center: Point2D::new(0.0, 0.0),
                    ccw: true,
                },
                Segment2D::Arc {
                    start: Point2D::new(-1.0, 0.0),
                    end: Point2D::new(1.0, 0.0),
                    center: Point2D::new(0.0, 0.0),
                    ccw: true,
                },
            ]],
        );
        b.pocket(
            pad,
            cut,
            CutExtent::TwoSided {
                forward: 5.0,
                backward: 5.0,
            },
            true,
        );
        b.body_rotation(90.0, 0.0, 0.0);
        let doc = b.finish();

        let json = doc.to_json().expect("serialize");
        let restored = Document::from_json(&json).expect("deserialize");

        assert_eq!(doc, restored);
        assert_eq!(restored.nodes.len(), 4);
        assert_eq!(restored.root, Some(4));
        assert_eq!(restored.body_rotation, Vec3::new(90.0, 0.0, 0.0));
    }

    #[test]
    fn builder_names_are_unique_and_sequential() {
        let mut b = DocumentBuilder::new();
        let s1 = b.sketch(xz(), vec![square()]);
        let p = b.pad(s1, 10.0);
        let s2 = b.sketch(xz(), vec![square()]);
        let k = b.pocket(p, s2, CutExtent::ThroughAll { both_sides: false }, false);
        let doc = b.finish();

        assert_eq!((s1, p, s2, k), (1, 2, 3, 4));
        assert_eq!(doc.nodes[&1].name, "Sketch001");
        assert_eq!(doc.nodes[&2].name, "Pad002");
        assert_eq!(doc.nodes[&4].name, "Pocket004");
        assert!(doc.dangling_references().is_empty());
        assert_eq!(
            doc.op_counts(),
            OpCounts {
                sketches: 2,
                pads: 1,
                pockets: 1
            }
        );
    }

    #[test]
    fn dangling_reference_detected() {
        let mut doc = Document::new();
        doc.nodes.insert(
            1,
            Node {
                id: 1,
                name: "Pad001".to_string(),
                op: GeomOp::Pad {
                    sketch: 7,
                    length: 1.0,
                },
            },
        );
        assert_eq!(doc.dangling_references(), vec![7]);
    }

    #[test]
    fn empty_document() {
        let doc = Document::new();
        assert_eq!(doc.version, "0.1");
        assert!(doc.nodes.is_empty());
        assert!(doc.root.is_none());
    }

    #[test]
    fn serde_tagged_enum() {
        let op = GeomOp::Pad {
            sketch: 1,
            length: 2.0,
        };
        let json = serde_json::to_string(&op).unwrap();
        assert!(json.contains(r#""type":"Pad""#));

        let restored: GeomOp = serde_json::from_str(&json).unwrap();
        assert_eq!(op, restored);

        let extent = CutExtent::ThroughAll { both_sides: true };
        let json = serde_json::to_string(&extent).unwrap();
        assert!(json.contains(r#""type":"ThroughAll""#));
    }
}
