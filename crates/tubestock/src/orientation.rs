//! Feature orientations around the tube axis and their per-family remap.

use serde::{Deserialize, Serialize};
use tubestock_sketch::SketchPlane;

use crate::material::MaterialKind;

/// One of the four canonical positions around the tube's long axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Orientation {
    /// +X face.
    Deg0,
    /// +Z face.
    Deg90,
    /// -X face.
    Deg180,
    /// -Z face.
    Deg270,
}

/// Reference plane through the tube axis that a feature is sketched on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferencePlane {
    /// Global YZ. Local coordinates are (axial, transverse).
    Front,
    /// Global XY. Local coordinates are (transverse, axial).
    Top,
}

impl ReferencePlane {
    /// The sketch plane in the tube frame.
    pub fn sketch_plane(self) -> SketchPlane {
        match self {
            ReferencePlane::Front => SketchPlane::yz(),
            ReferencePlane::Top => SketchPlane::xy(),
        }
    }

    /// True if the plane's local x runs along the tube axis.
    pub fn axial_is_local_x(self) -> bool {
        matches!(self, ReferencePlane::Front)
    }
}

impl Orientation {
    /// All orientations in index order.
    pub const ALL: [Orientation; 4] = [
        Orientation::Deg0,
        Orientation::Deg90,
        Orientation::Deg180,
        Orientation::Deg270,
    ];

    /// 1-based index: 1 = 0°, 2 = 90°, 3 = 180°, 4 = 270°.
    pub fn index(self) -> u8 {
        match self {
            Orientation::Deg0 => 1,
            Orientation::Deg90 => 2,
            Orientation::Deg180 => 3,
            Orientation::Deg270 => 4,
        }
    }

    /// Angle in degrees.
    pub fn degrees(self) -> f64 {
        f64::from(self.index() - 1) * 90.0
    }

    /// Plane the feature outline is drawn on.
    pub fn reference_plane(self) -> ReferencePlane {
        match self {
            Orientation::Deg0 | Orientation::Deg180 => ReferencePlane::Front,
            Orientation::Deg90 | Orientation::Deg270 => ReferencePlane::Top,
        }
    }

    /// Pocket runs along the plane normal (toward the positive face).
    pub fn reversed(self) -> bool {
        matches!(self, Orientation::Deg0 | Orientation::Deg90)
    }
}

/// Requested orientations for one feature.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrientationFlags {
    /// 0° requested.
    #[serde(default)]
    pub deg0: bool,
    /// 90° requested.
    #[serde(default)]
    pub deg90: bool,
    /// 180° requested.
    #[serde(default)]
    pub deg180: bool,
    /// 270° requested.
    #[serde(default)]
    pub deg270: bool,
}

impl OrientationFlags {
    /// Flags from the four values in 0°, 90°, 180°, 270° order.
    pub fn new(deg0: bool, deg90: bool, deg180: bool, deg270: bool) -> Self {
        Self {
            deg0,
            deg90,
            deg180,
            deg270,
        }
    }

    /// Whether `o` is set.
    pub fn get(&self, o: Orientation) -> bool {
        match o {
            Orientation::Deg0 => self.deg0,
            Orientation::Deg90 => self.deg90,
            Orientation::Deg180 => self.deg180,
            Orientation::Deg270 => self.deg270,
        }
    }

    /// Set orientations, in index order.
    pub fn active(&self) -> Vec<Orientation> {
        Orientation::ALL
            .into_iter()
            .filter(|o| self.get(*o))
            .collect()
    }

    /// Redirect requests onto faces that exist for `kind`.
    pub fn remap(self, kind: MaterialKind) -> Self {
        let mut f = self;
        match kind {
            MaterialKind::Round | MaterialKind::Rectangular | MaterialKind::IBeam => {}
            MaterialKind::CChannel => {
                f.deg270 = f.deg90;
                f.deg90 = false;
            }
            MaterialKind::AngleIron => {
                f.deg270 = f.deg0;
                f.deg180 = f.deg90;
            }
            MaterialKind::FlatBar => {
                f.deg270 = f.deg0;
                f.deg0 = false;
            }
        }
        f
    }

    /// Exchange the 0° and 270° values.
    ///
    /// Applied to circle features on C-channel before [`remap`](Self::remap).
    pub fn swap_deg0_deg270(self) -> Self {
        Self {
            deg0: self.deg270,
            deg270: self.deg0,
            ..self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_families() {
        let f = OrientationFlags::new(true, false, true, true);
        for kind in [
            MaterialKind::Round,
            MaterialKind::Rectangular,
            MaterialKind::IBeam,
        ] {
            assert_eq!(f.remap(kind), f);
        }
    }

    #[test]
    fn test_flat_bar_only_270() {
        let f = OrientationFlags::new(true, false, false, false).remap(MaterialKind::FlatBar);
        assert_eq!(f.active(), vec![Orientation::Deg270]);
    }

    #[test]
    fn test_c_channel_redirects_90() {
        let f = OrientationFlags::new(false, true, false, false).remap(MaterialKind::CChannel);
        assert_eq!(f, OrientationFlags::new(false, false, false, true));

        // 270 is overwritten by the 90 request
        let f = OrientationFlags::new(false, false, false, true).remap(MaterialKind::CChannel);
        assert!(f.active().is_empty());
    }

    #[test]
    fn test_angle_iron_copies_onto_real_legs() {
        let f = OrientationFlags::new(true, true, false, false).remap(MaterialKind::AngleIron);
        assert!(f.deg270);
        assert!(f.deg180);

        let f = OrientationFlags::new(false, false, true, true).remap(MaterialKind::AngleIron);
        assert_eq!(f, OrientationFlags::default());
    }

    #[test]
    fn test_swap_then_remap() {
        let f = OrientationFlags::new(false, false, false, true)
            .swap_deg0_deg270()
            .remap(MaterialKind::CChannel);
        assert_eq!(f.active(), vec![Orientation::Deg0]);
    }

    #[test]
    fn test_orientation_table() {
        let idx: Vec<u8> = Orientation::ALL.iter().map(|o| o.index()).collect();
        assert_eq!(idx, vec![1, 2, 3, 4]);
        assert_eq!(Orientation::Deg270.degrees(), 270.0);
        assert_eq!(Orientation::Deg0.reference_plane(), ReferencePlane::Front);
        assert_eq!(Orientation::Deg90.reference_plane(), ReferencePlane::Top);
        assert!(Orientation::Deg0.reversed());
        assert!(Orientation::Deg90.reversed());
        assert!(!Orientation::Deg180.reversed());
        assert!(!Orientation::Deg270.reversed());
    }
}
