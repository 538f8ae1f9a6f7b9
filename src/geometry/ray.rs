use crate::error::{GeometryError, Result};
use crate::math::{Coord, Point2, Point3, Vector2, Vector3};

/// A directed point: a position plus a unit heading.
///
/// Rays serve as local tangent references — the answer of a position query
/// on a [`PolyLine`](crate::geometry::PolyLine), the endpoint specification
/// for Bézier synthesis, and the argument of directed projection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray<P: Coord> {
    point: P,
    direction: P::Vector,
}

impl<P: Coord> Ray<P> {
    /// Creates a ray from a position and a direction vector.
    ///
    /// The direction is normalized.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::Degenerate`] if the direction is near zero.
    pub fn new(point: P, direction: P::Vector) -> Result<Self> {
        let direction = P::normalize(direction)
            .ok_or_else(|| GeometryError::Degenerate("zero-length ray direction".to_owned()))?;
        Ok(Self { point, direction })
    }

    /// Creates a ray pointing from `from` toward `to`.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::CoincidentPoints`] if the points coincide.
    pub fn between(from: P, to: P) -> Result<Self> {
        let direction = from
            .direction_to(to)
            .ok_or(GeometryError::CoincidentPoints)?;
        Ok(Self {
            point: from,
            direction,
        })
    }

    /// Builds a ray from a direction already known to be unit length.
    pub(crate) fn from_unit(point: P, direction: P::Vector) -> Self {
        Self { point, direction }
    }

    /// Returns the position of the ray.
    #[must_use]
    pub fn point(&self) -> P {
        self.point
    }

    /// Returns the unit heading of the ray.
    #[must_use]
    pub fn direction(&self) -> P::Vector {
        self.direction
    }

    /// Returns the point at signed distance `t` along the heading.
    #[must_use]
    pub fn at(&self, t: f64) -> P {
        self.point.translate(self.direction, t)
    }
}

impl Ray<Point2> {
    /// Creates a 2D ray from a position and a heading angle in radians,
    /// measured counter-clockwise from the positive X axis.
    #[must_use]
    pub fn from_angle(point: Point2, angle: f64) -> Self {
        let (sin, cos) = angle.sin_cos();
        Self {
            point,
            direction: Vector2::new(cos, sin),
        }
    }

    /// Returns the heading angle in radians.
    #[must_use]
    pub fn angle(&self) -> f64 {
        self.direction.y.atan2(self.direction.x)
    }
}

impl Ray<Point3> {
    /// Creates a 3D ray from a position, a horizontal heading angle and a
    /// pitch angle (both in radians).
    #[must_use]
    pub fn from_angles(point: Point3, heading: f64, pitch: f64) -> Self {
        let (sin_h, cos_h) = heading.sin_cos();
        let (sin_p, cos_p) = pitch.sin_cos();
        Self {
            point,
            direction: Vector3::new(cos_h * cos_p, sin_h * cos_p, sin_p),
        }
    }

    /// Returns the horizontal heading angle in radians.
    #[must_use]
    pub fn heading(&self) -> f64 {
        self.direction.y.atan2(self.direction.x)
    }

    /// Returns the pitch angle in radians.
    #[must_use]
    pub fn pitch(&self) -> f64 {
        self.direction
            .z
            .atan2(self.direction.x.hypot(self.direction.y))
    }
}
