//! Sketch planes: an origin plus two in-plane axes.

use tubestock_math::{Dir3, Point3, Transform, Vec3};

/// A plane in 3D space that 2D sketch coordinates are drawn on.
///
/// A local point `(u, v)` lies at `origin + u * x_dir + v * y_dir`.
#[derive(Debug, Clone, PartialEq)]
pub struct SketchPlane {
    /// Origin of the sketch coordinate system.
    pub origin: Point3,
    /// Local x axis.
    pub x_dir: Dir3,
    /// Local y axis, orthogonal to `x_dir`.
    pub y_dir: Dir3,
    /// Plane normal, `x_dir × y_dir`.
    pub normal: Dir3,
}

impl SketchPlane {
    fn axis_aligned(x: Vec3, y: Vec3) -> Self {
        Self {
            origin: Point3::origin(),
            x_dir: Dir3::new_unchecked(x),
            y_dir: Dir3::new_unchecked(y),
            normal: Dir3::new_unchecked(x.cross(&y)),
        }
    }

    /// Global XY plane (x = X, y = Y, normal +Z).
    pub fn xy() -> Self {
        Self::axis_aligned(Vec3::x(), Vec3::y())
    }

    /// Global YZ plane (x = Y, y = Z, normal +X).
    pub fn yz() -> Self {
        Self::axis_aligned(Vec3::y(), Vec3::z())
    }

    /// Global XZ plane (x = X, y = Z, normal -Y).
    pub fn xz() -> Self {
        Self::axis_aligned(Vec3::x(), Vec3::z())
    }

    /// The same plane moved rigidly by `t`.
    pub fn transformed(&self, t: &Transform) -> Self {
        let x = t.apply_vec(self.x_dir.as_ref()).normalize();
        let y = t.apply_vec(self.y_dir.as_ref()).normalize();
        Self {
            origin: t.apply_point(&self.origin),
            x_dir: Dir3::new_unchecked(x),
            y_dir: Dir3::new_unchecked(y),
            normal: Dir3::new_unchecked(x.cross(&y)),
        }
    }
}
