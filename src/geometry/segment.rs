use crate::math::Coord;

/// A transient two-point line segment.
///
/// Segments are views over consecutive polyline points (or a standalone pair)
/// used as query helpers; they are never stored.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineSegment<P: Coord> {
    start: P,
    end: P,
}

impl<P: Coord> LineSegment<P> {
    /// Creates a segment from its two endpoints.
    #[must_use]
    pub fn new(start: P, end: P) -> Self {
        Self { start, end }
    }

    /// Returns the start point.
    #[must_use]
    pub fn start(&self) -> P {
        self.start
    }

    /// Returns the end point.
    #[must_use]
    pub fn end(&self) -> P {
        self.end
    }

    /// Returns the segment length.
    #[must_use]
    pub fn length(&self) -> f64 {
        self.start.distance(self.end)
    }

    /// Returns the point at `fraction` along the segment.
    ///
    /// Fractions outside `[0, 1]` extrapolate along the carrying line.
    #[must_use]
    pub fn point_at(&self, fraction: f64) -> P {
        self.start.lerp(self.end, fraction)
    }

    /// Unit direction from start to end, `None` for a zero-length segment.
    #[must_use]
    pub fn direction(&self) -> Option<P::Vector> {
        self.start.direction_to(self.end)
    }

    /// Fraction of the perpendicular foot of `point` on the carrying
    /// infinite line.
    ///
    /// `0` maps to the start, `1` to the end; values outside `[0, 1]` lie on
    /// the segment's extensions. Returns `0` for a zero-length segment.
    #[must_use]
    pub fn projection_fraction(&self, point: P) -> f64 {
        let axis = self.end.sub(self.start);
        let len_sq = P::dot(axis, axis);
        if len_sq < f64::EPSILON {
            return 0.0;
        }
        P::dot(point.sub(self.start), axis) / len_sq
    }

    /// Perpendicular distance from `point` to the carrying infinite line.
    #[must_use]
    pub fn deviation(&self, point: P) -> f64 {
        let foot = self.point_at(self.projection_fraction(point));
        point.distance(foot)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::math::Point2;
    use approx::assert_relative_eq;

    fn horizontal() -> LineSegment<Point2> {
        LineSegment::new(Point2::new(0.0, 0.0), Point2::new(4.0, 0.0))
    }

    #[test]
    fn length_and_midpoint() {
        let s = horizontal();
        assert_relative_eq!(s.length(), 4.0);
        let mid = s.point_at(0.5);
        assert_relative_eq!(mid.x, 2.0);
        assert_relative_eq!(mid.y, 0.0);
    }

    #[test]
    fn projection_fraction_on_and_off_segment() {
        let s = horizontal();
        assert_relative_eq!(s.projection_fraction(Point2::new(1.0, 5.0)), 0.25);
        assert_relative_eq!(s.projection_fraction(Point2::new(-2.0, 1.0)), -0.5);
        assert_relative_eq!(s.projection_fraction(Point2::new(6.0, -1.0)), 1.5);
    }

    #[test]
    fn deviation_is_perpendicular_distance() {
        let s = horizontal();
        assert_relative_eq!(s.deviation(Point2::new(2.0, 3.0)), 3.0);
        assert_relative_eq!(s.deviation(Point2::new(2.0, 0.0)), 0.0);
    }

    #[test]
    fn zero_length_segment_projects_to_start() {
        let p = Point2::new(1.0, 1.0);
        let s = LineSegment::new(p, p);
        assert_relative_eq!(s.projection_fraction(Point2::new(9.0, 9.0)), 0.0);
        assert!(s.direction().is_none());
    }
}
