#![warn(missing_docs)]

//! Math types for tubestock geometry.
//!
//! Thin wrappers around nalgebra providing the points, vectors, directions,
//! rigid transforms and tolerance constants used to describe tube profiles,
//! end cuts and feature placements. Angles coming from the parameter source
//! are in degrees; the helpers here convert at the boundary.

use nalgebra::{Matrix4, Unit, Vector2, Vector3, Vector4};

/// A point in 3D space.
pub type Point3 = nalgebra::Point3<f64>;

/// A vector in 3D space.
pub type Vec3 = Vector3<f64>;

/// A unit (normalized) direction vector in 3D space.
pub type Dir3 = Unit<Vector3<f64>>;

/// A point in 2D sketch space.
pub type Point2 = nalgebra::Point2<f64>;

/// A vector in 2D space.
pub type Vec2 = Vector2<f64>;

/// A 4x4 rigid (or affine) transformation matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct Transform {
    /// The underlying 4x4 matrix.
    pub matrix: Matrix4<f64>,
}

impl Transform {
    /// Translation by `(dx, dy, dz)`.
    pub fn translation(dx: f64, dy: f64, dz: f64) -> Self {
        let mut m = Matrix4::identity();
        m[(0, 3)] = dx;
        m[(1, 3)] = dy;
        m[(2, 3)] = dz;
        Self { matrix: m }
    }

    /// Rotation about the X axis by `angle` radians.
    pub fn rotation_x(angle: f64) -> Self {
        let (s, c) = angle.sin_cos();
        let mut m = Matrix4::identity();
        m[(1, 1)] = c;
        m[(1, 2)] = -s;
        m[(2, 1)] = s;
        m[(2, 2)] = c;
        Self { matrix: m }
    }

    /// Rotation about the Y axis by `angle` radians.
    pub fn rotation_y(angle: f64) -> Self {
        let (s, c) = angle.sin_cos();
        let mut m = Matrix4::identity();
        m[(0, 0)] = c;
        m[(0, 2)] = s;
        m[(2, 0)] = -s;
        m[(2, 2)] = c;
        Self { matrix: m }
    }

    /// Rotation about the Z axis by `angle` radians.
    pub fn rotation_z(angle: f64) -> Self {
        let (s, c) = angle.sin_cos();
        let mut m = Matrix4::identity();
        m[(0, 0)] = c;
        m[(0, 1)] = -s;
        m[(1, 0)] = s;
        m[(1, 1)] = c;
        Self { matrix: m }
    }

    /// Rotation from yaw/pitch/roll angles in degrees.
    ///
    /// Yaw turns about Z, pitch about Y and roll about X; the composite is
    /// `Rz(yaw) * Ry(pitch) * Rx(roll)`, so roll is applied first.
    pub fn from_ypr_degrees(yaw: f64, pitch: f64, roll: f64) -> Self {
        Self::rotation_z(yaw.to_radians())
            .then(&Self::rotation_y(pitch.to_radians()))
            .then(&Self::rotation_x(roll.to_radians()))
    }

    /// Compose: `self` then `other` (self * other).
    ///
    /// `a.then(&b).apply_point(p)` equals `a.apply_point(&b.apply_point(p))`.
    pub fn then(&self, other: &Transform) -> Self {
        Self {
            matrix: self.matrix * other.matrix,
        }
    }

    /// Transform a point.
    pub fn apply_point(&self, p: &Point3) -> Point3 {
        let v = self.matrix * Vector4::new(p.x, p.y, p.z, 1.0);
        Point3::new(v.x, v.y, v.z)
    }

    /// Transform a direction vector (ignores translation).
    pub fn apply_vec(&self, v: &Vec3) -> Vec3 {
        let r = self.matrix * Vector4::new(v.x, v.y, v.z, 0.0);
        Vec3::new(r.x, r.y, r.z)
    }
}

/// Tolerance constants for geometric comparisons.
#[derive(Debug, Clone, Copy)]
pub struct Tolerance {
    /// Linear distance tolerance in mm.
    pub linear: f64,
    /// Angular tolerance in radians.
    pub angular: f64,
}

impl Tolerance {
    /// Default tolerances (1e-6 mm linear, 1e-9 rad angular).
    pub const DEFAULT: Self = Self {
        linear: 1e-6,
        angular: 1e-9,
    };

    /// Check if two sketch points are coincident within tolerance.
    pub fn points2_equal(&self, a: &Point2, b: &Point2) -> bool {
        (a - b).norm() < self.linear
    }

    /// Check if a scalar distance is effectively zero.
    pub fn is_zero(&self, d: f64) -> bool {
        d.abs() < self.linear
    }

    /// Check if two angles are effectively equal (in radians).
    pub fn angles_equal(&self, a: f64, b: f64) -> bool {
        (a - b).abs() < self.angular
    }

    /// Check if two angles are effectively equal (in degrees).
    pub fn degrees_equal(&self, a: f64, b: f64) -> bool {
        self.angles_equal(a.to_radians(), b.to_radians())
    }
}

impl Default for Tolerance {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Tangent of an angle given in degrees.
pub fn tan_deg(degrees: f64) -> f64 {
    degrees.to_radians().tan()
}

/// True if `degrees` denotes a square (uncut) tube end.
pub fn is_perpendicular(degrees: f64) -> bool {
    Tolerance::DEFAULT.degrees_equal(degrees, 90.0)
}

/// True if a miter at `degrees` has no finite run along the tube axis.
///
/// That is the case whenever the angle is a multiple of 180°, where
/// `tan` vanishes and `1 / tan` is undefined.
pub fn is_degenerate_miter(degrees: f64) -> bool {
    let r = degrees.rem_euclid(180.0);
    let tol = Tolerance::DEFAULT;
    tol.degrees_equal(r, 0.0) || tol.degrees_equal(r, 180.0)
}
