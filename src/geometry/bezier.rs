use crate::error::{ArgumentError, GeometryError, Result};
use crate::math::{Coord, TOLERANCE};

use super::{LineSegment, PolyLine, Ray};

/// Default point count for fixed-step flattening.
pub const DEFAULT_FLATTEN_COUNT: usize = 64;

/// Hard bound on adaptive bisection depth. `2^32` sub-curves is far beyond
/// any sane tolerance; the bound guarantees termination on pathological
/// control polygons.
const MAX_SUBDIVISION_DEPTH: u32 = 32;

/// A cubic Bézier curve given by four control points.
///
/// The curve has no identity beyond its control points; it exists to be
/// flattened into a [`PolyLine`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CubicBezier<P: Coord> {
    p0: P,
    c1: P,
    c2: P,
    p3: P,
}

impl<P: Coord> CubicBezier<P> {
    /// Creates a cubic curve from explicit control points.
    ///
    /// # Errors
    ///
    /// Returns [`ArgumentError::NonFinite`] for a NaN or infinite
    /// coordinate.
    pub fn new(p0: P, c1: P, c2: P, p3: P) -> Result<Self> {
        for point in [p0, c1, c2, p3] {
            for &value in point.coord_slice() {
                if !value.is_finite() {
                    return Err(ArgumentError::NonFinite {
                        parameter: "control coordinate",
                        value,
                    }
                    .into());
                }
            }
        }
        Ok(Self { p0, c1, c2, p3 })
    }

    /// Synthesizes a cubic curve between two directed endpoints.
    ///
    /// The inner control points are placed along each endpoint's heading.
    /// Their combined distance from the endpoints is `shape` times the chord
    /// length; unweighted synthesis splits it evenly, while `weighted`
    /// synthesis splits it by each endpoint's distance to the intersection
    /// of the two heading lines, shortening the handle on the tighter side.
    ///
    /// # Errors
    ///
    /// - [`ArgumentError::NonPositive`] / [`ArgumentError::NonFinite`] for
    ///   an invalid `shape`.
    /// - [`GeometryError::CoincidentPoints`] when the endpoints coincide.
    pub fn from_rays(start: Ray<P>, end: Ray<P>, shape: f64, weighted: bool) -> Result<Self> {
        if !shape.is_finite() {
            return Err(ArgumentError::NonFinite {
                parameter: "shape",
                value: shape,
            }
            .into());
        }
        if shape <= 0.0 {
            return Err(ArgumentError::NonPositive {
                parameter: "shape",
                value: shape,
            }
            .into());
        }
        let p0 = start.point();
        let p3 = end.point();
        let chord = p0.distance(p3);
        if chord < TOLERANCE {
            return Err(GeometryError::CoincidentPoints.into());
        }

        let budget = shape * chord;
        let (w0, w1) = if weighted {
            heading_apex_weights(&start, &end).unwrap_or((0.5, 0.5))
        } else {
            (0.5, 0.5)
        };
        let c1 = p0.translate(start.direction(), budget * w0);
        let c2 = p3.translate(end.direction(), -(budget * w1));
        Self::new(p0, c1, c2, p3)
    }

    /// Returns the start point.
    #[must_use]
    pub fn start(&self) -> P {
        self.p0
    }

    /// Returns the end point.
    #[must_use]
    pub fn end(&self) -> P {
        self.p3
    }

    /// Evaluates the curve at parameter `t` via de Casteljau interpolation.
    #[must_use]
    pub fn point_at(&self, t: f64) -> P {
        let a = self.p0.lerp(self.c1, t);
        let b = self.c1.lerp(self.c2, t);
        let c = self.c2.lerp(self.p3, t);
        let d = a.lerp(b, t);
        let e = b.lerp(c, t);
        d.lerp(e, t)
    }

    /// Splits the curve at parameter `t` into two sub-curves.
    #[must_use]
    pub fn split(&self, t: f64) -> (Self, Self) {
        let a = self.p0.lerp(self.c1, t);
        let b = self.c1.lerp(self.c2, t);
        let c = self.c2.lerp(self.p3, t);
        let d = a.lerp(b, t);
        let e = b.lerp(c, t);
        let f = d.lerp(e, t);
        (
            Self {
                p0: self.p0,
                c1: a,
                c2: d,
                p3: f,
            },
            Self {
                p0: f,
                c1: e,
                c2: c,
                p3: self.p3,
            },
        )
    }

    /// Maximum perpendicular deviation of the inner control points from the
    /// chord. An upper bound for the curve's own deviation, used as the
    /// subdivision criterion.
    #[must_use]
    pub fn flatness(&self) -> f64 {
        let chord = LineSegment::new(self.p0, self.p3);
        chord.deviation(self.c1).max(chord.deviation(self.c2))
    }

    /// Flattens the curve at `count` evenly spaced parameters.
    ///
    /// The first and last output points are the curve endpoints exactly.
    ///
    /// # Errors
    ///
    /// - [`ArgumentError::BelowMinimum`] for `count < 2`.
    /// - [`GeometryError::TooFewPoints`] when the control points are so
    ///   degenerate that fewer than 2 distinct points result.
    pub fn flatten(&self, count: usize) -> Result<PolyLine<P>> {
        if count < 2 {
            return Err(ArgumentError::BelowMinimum {
                parameter: "flatten count",
                value: count,
                minimum: 2,
            }
            .into());
        }
        let mut points = Vec::with_capacity(count);
        points.push(self.p0);
        #[allow(clippy::cast_precision_loss)]
        let last = (count - 1) as f64;
        for i in 1..count - 1 {
            #[allow(clippy::cast_precision_loss)]
            let t = i as f64 / last;
            points.push(self.point_at(t));
        }
        points.push(self.p3);
        PolyLine::filtered(points, 0.0)
    }

    /// Flattens the curve adaptively until every chord deviates from the
    /// curve by at most `epsilon`.
    ///
    /// Subdivision works an explicit stack of sub-curves (deterministic
    /// depth, no call recursion) with a hard depth bound.
    ///
    /// # Errors
    ///
    /// - [`ArgumentError::NonPositive`] / [`ArgumentError::NonFinite`] for
    ///   an invalid `epsilon`.
    /// - [`GeometryError::TooFewPoints`] for fully degenerate control
    ///   points.
    pub fn flatten_adaptive(&self, epsilon: f64) -> Result<PolyLine<P>> {
        if !epsilon.is_finite() {
            return Err(ArgumentError::NonFinite {
                parameter: "epsilon",
                value: epsilon,
            }
            .into());
        }
        if epsilon <= 0.0 {
            return Err(ArgumentError::NonPositive {
                parameter: "epsilon",
                value: epsilon,
            }
            .into());
        }

        let mut points = vec![self.p0];
        let mut stack: Vec<(Self, u32)> = vec![(*self, 0)];
        while let Some((curve, depth)) = stack.pop() {
            if depth >= MAX_SUBDIVISION_DEPTH || curve.flatness() <= epsilon {
                points.push(curve.p3);
            } else {
                let (left, right) = curve.split(0.5);
                stack.push((right, depth + 1));
                stack.push((left, depth + 1));
            }
        }
        PolyLine::filtered(points, 0.0)
    }
}

/// The straight two-anchor degenerate form: with no inner control points the
/// flattening error is zero by construction, so the result is the two-point
/// line itself.
///
/// # Errors
///
/// Returns [`GeometryError::DuplicatePoint`] when the anchors coincide.
pub fn line_between<P: Coord>(p0: P, p1: P) -> Result<PolyLine<P>> {
    PolyLine::new([p0, p1])
}

/// Splits the handle budget by each endpoint's distance to the intersection
/// of the two heading lines (taken in the lateral plane). `None` when the
/// headings are parallel or the intersection does not lie ahead of the start
/// and behind the end.
fn heading_apex_weights<P: Coord>(start: &Ray<P>, end: &Ray<P>) -> Option<(f64, f64)> {
    let d0 = start.direction();
    let d1 = end.direction();
    let cross = P::turn_sign(d0, d1);
    if cross.abs() < TOLERANCE {
        return None;
    }
    // Solve start + t0 * d0 == end + s * d1 in the lateral plane.
    let delta = end.point().sub(start.point());
    let t0 = P::turn_sign(delta, d1) / cross;
    let s = P::turn_sign(delta, d0) / cross;
    if t0 <= TOLERANCE || s >= -TOLERANCE {
        return None;
    }
    let a1 = -s;
    let total = t0 + a1;
    Some((t0 / total, a1 / total))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::math::Point2;
    use approx::assert_relative_eq;

    fn p(x: f64, y: f64) -> Point2 {
        Point2::new(x, y)
    }

    fn arch() -> CubicBezier<Point2> {
        CubicBezier::new(p(0.0, 0.0), p(1.0, 2.0), p(3.0, 2.0), p(4.0, 0.0)).unwrap()
    }

    #[test]
    fn rejects_non_finite_control_points() {
        assert!(CubicBezier::new(p(0.0, 0.0), p(f64::NAN, 0.0), p(1.0, 1.0), p(2.0, 0.0)).is_err());
    }

    #[test]
    fn evaluation_hits_endpoints_exactly() {
        let curve = arch();
        assert_eq!(curve.point_at(0.0), p(0.0, 0.0));
        assert_eq!(curve.point_at(1.0), p(4.0, 0.0));
    }

    #[test]
    fn split_halves_agree_with_whole() {
        let curve = arch();
        let (left, right) = curve.split(0.5);
        let on_whole = curve.point_at(0.25);
        let on_left = left.point_at(0.5);
        assert_relative_eq!(on_whole.x, on_left.x, epsilon = 1e-12);
        assert_relative_eq!(on_whole.y, on_left.y, epsilon = 1e-12);
        assert_eq!(right.end(), curve.end());
    }

    #[test]
    fn fixed_flattening_endpoint_fidelity() {
        let line = arch().flatten(16).unwrap();
        assert_eq!(line.len(), 16);
        assert_eq!(line.first(), p(0.0, 0.0));
        assert_eq!(line.last(), p(4.0, 0.0));
    }

    #[test]
    fn fixed_flattening_rejects_count_below_two() {
        assert!(arch().flatten(1).is_err());
        assert!(arch().flatten(0).is_err());
    }

    #[test]
    fn four_point_scenario() {
        // cubic(4, (10,0), (20,0), (0,20), (0,10))
        let curve =
            CubicBezier::new(p(10.0, 0.0), p(20.0, 0.0), p(0.0, 20.0), p(0.0, 10.0)).unwrap();
        let line = curve.flatten(4).unwrap();
        assert_eq!(line.len(), 4);
        assert_eq!(line.first(), p(10.0, 0.0));
        assert_eq!(line.last(), p(0.0, 10.0));
        for i in [1, 2] {
            let q = line.get(i).unwrap();
            assert!(q.x > 0.0 && q.x < 15.0, "x = {}", q.x);
            assert!(q.y > 0.0 && q.y < 15.0, "y = {}", q.y);
        }
    }

    #[test]
    fn adaptive_flattening_respects_tolerance() {
        let curve = arch();
        let reference = curve.flatten(256).unwrap();
        for epsilon in [0.5, 0.1, 0.02, 0.004] {
            let flat = curve.flatten_adaptive(epsilon).unwrap();
            let mut max_deviation: f64 = 0.0;
            for point in reference.iter() {
                let nearest = flat.closest_point(*point);
                max_deviation = max_deviation.max(point.distance(nearest));
            }
            assert!(
                max_deviation <= epsilon + 1e-9,
                "epsilon {epsilon}: deviation {max_deviation}"
            );
        }
    }

    #[test]
    fn adaptive_flattening_rejects_bad_epsilon() {
        let curve = arch();
        assert!(curve.flatten_adaptive(0.0).is_err());
        assert!(curve.flatten_adaptive(-1.0).is_err());
        assert!(curve.flatten_adaptive(f64::NAN).is_err());
    }

    #[test]
    fn adaptive_flattening_of_straight_curve_is_two_points() {
        let curve =
            CubicBezier::new(p(0.0, 0.0), p(1.0, 0.0), p(2.0, 0.0), p(3.0, 0.0)).unwrap();
        let flat = curve.flatten_adaptive(0.01).unwrap();
        assert_eq!(flat.len(), 2);
        assert_relative_eq!(flat.length(), 3.0);
    }

    #[test]
    fn line_between_is_straight() {
        let line = line_between(p(1.0, 1.0), p(4.0, 5.0)).unwrap();
        assert_eq!(line.len(), 2);
        assert_relative_eq!(line.length(), 5.0);
        assert!(line_between(p(1.0, 1.0), p(1.0, 1.0)).is_err());
    }

    #[test]
    fn synthesis_places_controls_along_headings() {
        let start = Ray::from_angle(p(0.0, 0.0), 0.0);
        let end = Ray::from_angle(p(10.0, 0.0), 0.0);
        let curve = CubicBezier::from_rays(start, end, 1.0, false).unwrap();
        // Collinear headings: handles are half the chord each way.
        assert_relative_eq!(curve.c1.x, 5.0);
        assert_relative_eq!(curve.c1.y, 0.0);
        assert_relative_eq!(curve.c2.x, 5.0);
        assert_relative_eq!(curve.c2.y, 0.0);
    }

    #[test]
    fn synthesis_stays_tangent_to_headings() {
        let start = Ray::from_angle(p(0.0, 0.0), 0.0);
        let end = Ray::from_angle(p(10.0, 10.0), std::f64::consts::FRAC_PI_2);
        let curve = CubicBezier::from_rays(start, end, 1.0, false).unwrap();
        // Near t=0 the curve leaves horizontally, near t=1 it arrives
        // vertically.
        let early = curve.point_at(0.01);
        assert!(early.y.abs() < early.x * 0.1);
        let late = curve.point_at(0.99);
        assert!((10.0 - late.x).abs() < (10.0 - late.y).abs() * 0.1 + 1e-6);
    }

    #[test]
    fn weighted_synthesis_shortens_the_tight_side() {
        // Headings y=x and y=2 meet at (2,2): much closer to the start
        // (0,0) than to the end (10,2), so the start handle shrinks.
        let start = Ray::from_angle(p(0.0, 0.0), std::f64::consts::FRAC_PI_4);
        let end = Ray::from_angle(p(10.0, 2.0), 0.0);
        let weighted = CubicBezier::from_rays(start, end, 1.0, true).unwrap();
        let even = CubicBezier::from_rays(start, end, 1.0, false).unwrap();
        let handle_w = weighted.p0.distance(weighted.c1);
        let handle_e = even.p0.distance(even.c1);
        assert!(handle_w < handle_e, "{handle_w} vs {handle_e}");
    }

    #[test]
    fn synthesis_rejects_bad_shape_and_coincident_endpoints() {
        let start = Ray::from_angle(p(0.0, 0.0), 0.0);
        let end = Ray::from_angle(p(10.0, 0.0), 0.0);
        assert!(CubicBezier::from_rays(start, end, 0.0, false).is_err());
        assert!(CubicBezier::from_rays(start, end, -2.0, false).is_err());
        assert!(CubicBezier::from_rays(start, end, f64::NAN, false).is_err());
        let same = Ray::from_angle(p(0.0, 0.0), 1.0);
        assert!(CubicBezier::from_rays(start, same, 1.0, false).is_err());
    }
}
