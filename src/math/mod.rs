use std::fmt::Debug;

/// 2D point type.
pub type Point2 = nalgebra::Point2<f64>;

/// 3D point type.
pub type Point3 = nalgebra::Point3<f64>;

/// 2D vector type.
pub type Vector2 = nalgebra::Vector2<f64>;

/// 3D vector type.
pub type Vector3 = nalgebra::Vector3<f64>;

/// Global geometric tolerance for floating-point comparisons.
pub const TOLERANCE: f64 = 1e-10;

/// Coordinate abstraction shared by the 2D and 3D kernels.
///
/// Every polyline, projection, offset and flattening algorithm in this crate
/// is written once against this trait. The 3D instantiation treats "lateral"
/// as the horizontal (XY) plane: left normals and turn signs are computed on
/// the XY projection while Z is carried by interpolation, matching the
/// centerline geometry the kernel serves.
pub trait Coord: Copy + PartialEq + Debug {
    /// Displacement vector type paired with this point type.
    type Vector: Copy + PartialEq + Debug;

    /// Number of coordinates per point.
    const DIM: usize;

    /// Euclidean distance to `other`.
    fn distance(self, other: Self) -> f64;

    /// Linear interpolation: `self + t * (other - self)`.
    ///
    /// `t` outside `[0, 1]` extrapolates.
    fn lerp(self, other: Self, t: f64) -> Self;

    /// Displacement `self - other`.
    fn sub(self, other: Self) -> Self::Vector;

    /// Returns `self + scale * v`.
    fn translate(self, v: Self::Vector, scale: f64) -> Self;

    /// Unit direction from `self` to `other`, or `None` when the points are
    /// within [`TOLERANCE`] of each other.
    fn direction_to(self, other: Self) -> Option<Self::Vector>;

    /// Whether every coordinate is finite.
    fn is_finite(self) -> bool;

    /// The coordinates as a slice, for export.
    fn coord_slice(&self) -> &[f64];

    /// Dot product.
    fn dot(a: Self::Vector, b: Self::Vector) -> f64;

    /// Vector sum (used for tangent bisectors).
    fn add_vectors(a: Self::Vector, b: Self::Vector) -> Self::Vector;

    /// Scales a vector by `f`.
    fn scale(v: Self::Vector, f: f64) -> Self::Vector;

    /// Unit vector in the direction of `v`, or `None` for near-zero `v`.
    fn normalize(v: Self::Vector) -> Option<Self::Vector>;

    /// Unit left normal of a unit direction, taken in the lateral plane.
    ///
    /// Returns `None` when the direction has no lateral component (a vertical
    /// 3D segment), where a left side is undefined.
    fn lateral(dir: Self::Vector) -> Option<Self::Vector>;

    /// Rotates `v` by `angle` radians counter-clockwise in the lateral plane.
    /// The out-of-plane component (Z in 3D) is preserved.
    fn rotate_lateral(v: Self::Vector, angle: f64) -> Self::Vector;

    /// Sign of the lateral-plane cross product `a × b`.
    ///
    /// Positive when `b` turns left of `a`.
    fn turn_sign(a: Self::Vector, b: Self::Vector) -> f64;
}

impl Coord for Point2 {
    type Vector = Vector2;

    const DIM: usize = 2;

    fn distance(self, other: Self) -> f64 {
        nalgebra::distance(&self, &other)
    }

    fn lerp(self, other: Self, t: f64) -> Self {
        self + (other - self) * t
    }

    fn sub(self, other: Self) -> Vector2 {
        self - other
    }

    fn translate(self, v: Vector2, scale: f64) -> Self {
        self + v * scale
    }

    fn direction_to(self, other: Self) -> Option<Vector2> {
        (other - self).try_normalize(TOLERANCE)
    }

    fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    fn coord_slice(&self) -> &[f64] {
        self.coords.as_slice()
    }

    fn dot(a: Vector2, b: Vector2) -> f64 {
        a.dot(&b)
    }

    fn add_vectors(a: Vector2, b: Vector2) -> Vector2 {
        a + b
    }

    fn scale(v: Vector2, f: f64) -> Vector2 {
        v * f
    }

    fn normalize(v: Vector2) -> Option<Vector2> {
        v.try_normalize(TOLERANCE)
    }

    fn lateral(dir: Vector2) -> Option<Vector2> {
        Vector2::new(-dir.y, dir.x).try_normalize(TOLERANCE)
    }

    fn rotate_lateral(v: Vector2, angle: f64) -> Vector2 {
        let (sin, cos) = angle.sin_cos();
        Vector2::new(cos * v.x - sin * v.y, sin * v.x + cos * v.y)
    }

    fn turn_sign(a: Vector2, b: Vector2) -> f64 {
        a.x * b.y - a.y * b.x
    }
}

impl Coord for Point3 {
    type Vector = Vector3;

    const DIM: usize = 3;

    fn distance(self, other: Self) -> f64 {
        nalgebra::distance(&self, &other)
    }

    fn lerp(self, other: Self, t: f64) -> Self {
        self + (other - self) * t
    }

    fn sub(self, other: Self) -> Vector3 {
        self - other
    }

    fn translate(self, v: Vector3, scale: f64) -> Self {
        self + v * scale
    }

    fn direction_to(self, other: Self) -> Option<Vector3> {
        (other - self).try_normalize(TOLERANCE)
    }

    fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }

    fn coord_slice(&self) -> &[f64] {
        self.coords.as_slice()
    }

    fn dot(a: Vector3, b: Vector3) -> f64 {
        a.dot(&b)
    }

    fn add_vectors(a: Vector3, b: Vector3) -> Vector3 {
        a + b
    }

    fn scale(v: Vector3, f: f64) -> Vector3 {
        v * f
    }

    fn normalize(v: Vector3) -> Option<Vector3> {
        v.try_normalize(TOLERANCE)
    }

    fn lateral(dir: Vector3) -> Option<Vector3> {
        Vector3::new(-dir.y, dir.x, 0.0).try_normalize(TOLERANCE)
    }

    fn rotate_lateral(v: Vector3, angle: f64) -> Vector3 {
        let (sin, cos) = angle.sin_cos();
        Vector3::new(cos * v.x - sin * v.y, sin * v.x + cos * v.y, v.z)
    }

    fn turn_sign(a: Vector3, b: Vector3) -> f64 {
        a.x * b.y - a.y * b.x
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn lerp_interpolates_and_extrapolates() {
        let a = Point2::new(0.0, 0.0);
        let b = Point2::new(4.0, 2.0);
        let mid = a.lerp(b, 0.5);
        assert_relative_eq!(mid.x, 2.0);
        assert_relative_eq!(mid.y, 1.0);
        let beyond = a.lerp(b, 1.5);
        assert_relative_eq!(beyond.x, 6.0);
        assert_relative_eq!(beyond.y, 3.0);
    }

    #[test]
    fn direction_to_coincident_is_none() {
        let p = Point2::new(1.0, 2.0);
        assert!(p.direction_to(p).is_none());
    }

    #[test]
    fn lateral_is_left_of_direction_2d() {
        let dir = Vector2::new(1.0, 0.0);
        let n = <Point2 as Coord>::lateral(dir).unwrap();
        assert_relative_eq!(n.x, 0.0);
        assert_relative_eq!(n.y, 1.0);
        assert!(<Point2 as Coord>::turn_sign(dir, n) > 0.0);
    }

    #[test]
    fn lateral_3d_ignores_vertical_component() {
        let dir = Vector3::new(1.0, 0.0, 0.7).normalize();
        let n = <Point3 as Coord>::lateral(dir).unwrap();
        assert_relative_eq!(n.x, 0.0);
        assert_relative_eq!(n.y, 1.0);
        assert_relative_eq!(n.z, 0.0);
    }

    #[test]
    fn lateral_3d_vertical_is_undefined() {
        let dir = Vector3::new(0.0, 0.0, 1.0);
        assert!(<Point3 as Coord>::lateral(dir).is_none());
    }

    #[test]
    fn rotate_lateral_quarter_turn() {
        let v = Vector2::new(1.0, 0.0);
        let r = <Point2 as Coord>::rotate_lateral(v, std::f64::consts::FRAC_PI_2);
        assert_relative_eq!(r.x, 0.0, epsilon = 1e-12);
        assert_relative_eq!(r.y, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn turn_sign_detects_left_and_right() {
        let ahead = Vector2::new(1.0, 0.0);
        assert!(<Point2 as Coord>::turn_sign(ahead, Vector2::new(0.0, 1.0)) > 0.0);
        assert!(<Point2 as Coord>::turn_sign(ahead, Vector2::new(0.0, -1.0)) < 0.0);
        assert_relative_eq!(<Point2 as Coord>::turn_sign(ahead, ahead), 0.0);
    }
}
