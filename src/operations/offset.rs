use crate::error::{ArgumentError, GeometryError, Result};
use crate::geometry::{PolyLine, Ray};
use crate::math::{Coord, TOLERANCE};

/// Default angular resolution of fillet arcs on the outside of corners.
pub const DEFAULT_CIRCLE_PRECISION: f64 = std::f64::consts::TAU / 32.0;

/// Default lower clamp for the post-pass filter tolerance.
pub const DEFAULT_MINIMUM_FILTER_VALUE: f64 = 1e-3;

/// Default upper clamp for the post-pass filter tolerance.
pub const DEFAULT_MAXIMUM_FILTER_VALUE: f64 = 0.5;

/// Default filter tolerance as a fraction of the offset magnitude.
pub const DEFAULT_FILTER_RATIO: f64 = 0.05;

/// When `cos(angle between consecutive segments) < this`, the corner gets a
/// flat cap instead of a miter. Only for near-180° reversals.
const FLAT_CAP_COS: f64 = -0.98;

/// Upper bound on points per fillet arc, independent of circle precision.
const MAX_ARC_STEPS: usize = 4096;

/// Number of raw-offset segments scanned ahead of each segment when looking
/// for local self-crossings. Inside-corner crossings are local by
/// construction, so a short window suffices.
const TRIM_WINDOW: usize = 8;

/// How the offset blends from its start to its end value along the line,
/// as a function of progress fraction in `[0, 1]`.
#[derive(Debug, Clone, Copy, Default)]
pub enum Transition {
    /// Straight-line blend.
    #[default]
    Linear,
    /// Cosine ease-in/ease-out.
    Cosine,
    /// Caller-supplied monotone map from `[0, 1]` to `[0, 1]`.
    Custom(fn(f64) -> f64),
}

impl Transition {
    /// Maps a progress fraction to a blend fraction.
    #[must_use]
    pub fn apply(self, fraction: f64) -> f64 {
        match self {
            Self::Linear => fraction,
            Self::Cosine => (1.0 - (std::f64::consts::PI * fraction).cos()) / 2.0,
            Self::Custom(f) => f(fraction),
        }
    }
}

/// Lateral offset of a polyline, with corner correction.
///
/// Produces a new polyline whose points lie at the requested lateral distance
/// from the source, positive to the left of the travel direction. The offset
/// may vary along the length via a [`Transition`].
///
/// # Algorithm
///
/// 1. Displace each vertex along the left normal of its adjacent segments by
///    the (possibly position-varying) offset.
/// 2. Inside a turn the two offset lines converge: the corner becomes their
///    miter intersection, and any remaining local self-crossing in the raw
///    result is trimmed to the single crossing point.
/// 3. Outside a turn the offset lines diverge: the gap is closed with a
///    circular fillet arc whose angular resolution is the circle precision.
/// 4. A post-pass collapses closely spaced auxiliary points using a tolerance
///    derived from the offset magnitude, so output size tracks geometric
///    complexity rather than input vertex count.
#[derive(Debug)]
pub struct OffsetLine<'a, P: Coord> {
    source: &'a PolyLine<P>,
    start_offset: f64,
    end_offset: f64,
    transition: Transition,
    circle_precision: f64,
    minimum_filter_value: f64,
    maximum_filter_value: f64,
    filter_ratio: f64,
}

impl<'a, P: Coord> OffsetLine<'a, P> {
    /// Creates a constant-offset operation.
    #[must_use]
    pub fn new(source: &'a PolyLine<P>, offset: f64) -> Self {
        Self::varying(source, offset, offset, Transition::Linear)
    }

    /// Creates an offset operation that blends from `start_offset` to
    /// `end_offset` along the line.
    #[must_use]
    pub fn varying(
        source: &'a PolyLine<P>,
        start_offset: f64,
        end_offset: f64,
        transition: Transition,
    ) -> Self {
        Self {
            source,
            start_offset,
            end_offset,
            transition,
            circle_precision: DEFAULT_CIRCLE_PRECISION,
            minimum_filter_value: DEFAULT_MINIMUM_FILTER_VALUE,
            maximum_filter_value: DEFAULT_MAXIMUM_FILTER_VALUE,
            filter_ratio: DEFAULT_FILTER_RATIO,
        }
    }

    /// Sets the angular resolution (radians per arc step) of fillet arcs.
    #[must_use]
    pub fn with_circle_precision(mut self, precision: f64) -> Self {
        self.circle_precision = precision;
        self
    }

    /// Sets the clamp interval for the post-pass filter tolerance.
    #[must_use]
    pub fn with_filter_values(mut self, minimum: f64, maximum: f64) -> Self {
        self.minimum_filter_value = minimum;
        self.maximum_filter_value = maximum;
        self
    }

    /// Sets the filter tolerance as a fraction of the offset magnitude.
    #[must_use]
    pub fn with_filter_ratio(mut self, ratio: f64) -> Self {
        self.filter_ratio = ratio;
        self
    }

    /// Executes the offset and returns the corrected polyline.
    ///
    /// An offset of 0 returns a line coordinate-equal to the source. A
    /// two-point source always yields a two-point result.
    ///
    /// # Errors
    ///
    /// - [`ArgumentError::NonFinite`] / [`ArgumentError::NonPositive`] for a
    ///   non-finite offset, or a circle precision or filter ratio that is not
    ///   finite and positive.
    /// - [`ArgumentError::InvertedThresholds`] when the minimum filter value
    ///   is not below the maximum.
    /// - [`GeometryError::Degenerate`] when a segment has no lateral
    ///   direction (a vertical 3D segment), leaving the offset side
    ///   undefined.
    pub fn execute(&self) -> Result<PolyLine<P>> {
        self.validate()?;

        if let Some(direction) = self.source.degenerate_direction() {
            return self.offset_degenerate(direction);
        }
        if self.start_offset.abs() <= TOLERANCE && self.end_offset.abs() <= TOLERANCE {
            return Ok(self.source.clone());
        }

        let raw = self.build_raw()?;
        let mut trimmed = raw;
        trim_crossings(&mut trimmed);

        let magnitude = self.start_offset.abs().max(self.end_offset.abs());
        let filter_tolerance = (magnitude * self.filter_ratio)
            .clamp(self.minimum_filter_value, self.maximum_filter_value);
        PolyLine::filtered(trimmed, TOLERANCE)?.noise_filtered(filter_tolerance)
    }

    fn validate(&self) -> Result<()> {
        for (parameter, value) in [
            ("start offset", self.start_offset),
            ("end offset", self.end_offset),
        ] {
            if !value.is_finite() {
                return Err(ArgumentError::NonFinite { parameter, value }.into());
            }
        }
        validate_positive("circle precision", self.circle_precision)?;
        validate_positive("filter ratio", self.filter_ratio)?;
        for (parameter, value) in [
            ("minimum filter value", self.minimum_filter_value),
            ("maximum filter value", self.maximum_filter_value),
        ] {
            if !value.is_finite() {
                return Err(ArgumentError::NonFinite { parameter, value }.into());
            }
        }
        if self.minimum_filter_value >= self.maximum_filter_value {
            return Err(ArgumentError::InvertedThresholds {
                minimum: self.minimum_filter_value,
                maximum: self.maximum_filter_value,
            }
            .into());
        }
        Ok(())
    }

    /// Offsets the zero-length form: the single point moves laterally, the
    /// direction is kept.
    fn offset_degenerate(&self, direction: P::Vector) -> Result<PolyLine<P>> {
        let normal = lateral_of::<P>(direction)?;
        let point = self.source.first().translate(normal, self.start_offset);
        Ok(PolyLine::degenerate(Ray::from_unit(point, direction)))
    }

    /// Phase 1 and 2: per-vertex displacement with miters inside and fillet
    /// arcs outside.
    fn build_raw(&self) -> Result<Vec<P>> {
        let points = self.source.points();
        let segment_count = self.source.segment_count();
        let length = self.source.length();

        let mut directions: Vec<P::Vector> = Vec::with_capacity(segment_count);
        for pair in points.windows(2) {
            let direction = pair[0].direction_to(pair[1]).ok_or_else(|| {
                GeometryError::Degenerate("offset source segment has no direction".to_owned())
            })?;
            directions.push(direction);
        }
        let mut normals: Vec<P::Vector> = Vec::with_capacity(segment_count);
        for &direction in &directions {
            normals.push(lateral_of::<P>(direction)?);
        }

        let offset_at = |index: usize| -> f64 {
            let fraction = if length <= f64::EPSILON {
                0.0
            } else {
                self.source.cumulative()[index] / length
            };
            self.start_offset
                + (self.end_offset - self.start_offset) * self.transition.apply(fraction)
        };

        let mut raw: Vec<P> = Vec::with_capacity(points.len() * 2);
        raw.push(points[0].translate(normals[0], offset_at(0)));

        for i in 1..points.len() - 1 {
            let offset = offset_at(i);
            let vertex = points[i];
            let previous = normals[i - 1];
            let next = normals[i];
            let cos = P::dot(directions[i - 1], directions[i]);
            let turn = P::turn_sign(directions[i - 1], directions[i]);

            if cos < FLAT_CAP_COS {
                // Near-reversal: a miter would diverge, an arc would sweep
                // almost a full half circle through the hairpin. Flat cap.
                raw.push(vertex.translate(previous, offset));
                raw.push(vertex.translate(next, offset));
            } else if turn.abs() <= TOLERANCE {
                raw.push(vertex.translate(next, offset));
            } else if turn * offset > 0.0 {
                push_miter(&mut raw, vertex, previous, next, offset);
            } else {
                self.push_fillet(&mut raw, vertex, previous, next, offset);
            }
        }

        raw.push(points[points.len() - 1].translate(normals[segment_count - 1], offset_at(points.len() - 1)));
        Ok(raw)
    }

    /// Closes an outside-corner gap with a circular arc around the vertex.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
    fn push_fillet(&self, raw: &mut Vec<P>, vertex: P, previous: P::Vector, next: P::Vector, offset: f64) {
        let angle = P::turn_sign(previous, next).atan2(P::dot(previous, next));
        let steps = ((angle.abs() / self.circle_precision).ceil() as usize)
            .clamp(1, MAX_ARC_STEPS);
        let start = P::scale(previous, offset);
        for step in 0..=steps {
            let fraction = step as f64 / steps as f64;
            raw.push(vertex.translate(P::rotate_lateral(start, angle * fraction), 1.0));
        }
    }
}

/// Replaces an inside corner with the miter intersection of the two offset
/// lines, reached along the normal bisector.
fn push_miter<P: Coord>(raw: &mut Vec<P>, vertex: P, previous: P::Vector, next: P::Vector, offset: f64) {
    let Some(bisector) = P::normalize(P::add_vectors(previous, next)) else {
        // Antiparallel normals past the flat-cap guard; cap instead.
        raw.push(vertex.translate(previous, offset));
        raw.push(vertex.translate(next, offset));
        return;
    };
    let reach = offset / P::dot(bisector, previous);
    raw.push(vertex.translate(bisector, reach));
}

fn lateral_of<P: Coord>(direction: P::Vector) -> Result<P::Vector> {
    P::lateral(direction).ok_or_else(|| {
        GeometryError::Degenerate("segment has no lateral direction".to_owned()).into()
    })
}

fn validate_positive(parameter: &'static str, value: f64) -> Result<()> {
    if !value.is_finite() {
        return Err(ArgumentError::NonFinite { parameter, value }.into());
    }
    if value <= 0.0 {
        return Err(ArgumentError::NonPositive { parameter, value }.into());
    }
    Ok(())
}

/// Removes local self-crossings from the raw offset chain by replacing each
/// crossing loop with its single intersection point. Each pass removes at
/// least one point, so the loop terminates.
fn trim_crossings<P: Coord>(points: &mut Vec<P>) {
    let passes = points.len();
    for _ in 0..passes {
        if !trim_first_crossing(points) {
            break;
        }
    }
}

/// Finds the first crossing between nearby non-adjacent segments and cuts
/// the loop between them. Returns whether a crossing was removed.
fn trim_first_crossing<P: Coord>(points: &mut Vec<P>) -> bool {
    let n = points.len();
    if n < 4 {
        return false;
    }
    for i in 0..n - 3 {
        let last = (i + 1 + TRIM_WINDOW).min(n - 1);
        for j in i + 2..last {
            if let Some(crossing) = segment_crossing(points[i], points[i + 1], points[j], points[j + 1]) {
                points.splice(i + 1..=j, std::iter::once(crossing));
                return true;
            }
        }
    }
    false
}

/// Lateral-plane intersection of segments `ab` and `cd`, interior only.
/// Endpoint touches are not crossings.
fn segment_crossing<P: Coord>(a: P, b: P, c: P, d: P) -> Option<P> {
    let r = b.sub(a);
    let s = d.sub(c);
    let denominator = P::turn_sign(r, s);
    if denominator.abs() <= TOLERANCE {
        return None;
    }
    let offset = c.sub(a);
    let t = P::turn_sign(offset, s) / denominator;
    let u = P::turn_sign(offset, r) / denominator;
    let eps = 1e-9;
    if t <= eps || t >= 1.0 - eps || u <= eps || u >= 1.0 - eps {
        return None;
    }
    Some(a.lerp(b, t))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::math::{Point2, Point3};
    use approx::assert_relative_eq;

    fn p(x: f64, y: f64) -> Point2 {
        Point2::new(x, y)
    }

    fn right_angle() -> PolyLine<Point2> {
        PolyLine::new([p(0.0, 0.0), p(10.0, 0.0), p(10.0, 10.0)]).unwrap()
    }

    #[test]
    fn zero_offset_is_identity() {
        let line = right_angle();
        let result = OffsetLine::new(&line, 0.0).execute().unwrap();
        assert_eq!(result, line);
    }

    #[test]
    fn straight_line_keeps_point_count_and_length() {
        let line = PolyLine::new([p(0.0, 0.0), p(10.0, 0.0)]).unwrap();
        let result = OffsetLine::new(&line, 2.5).execute().unwrap();
        assert_eq!(result.len(), 2);
        assert_relative_eq!(result.length(), 10.0);
        assert_relative_eq!(result.first().y, 2.5);
        assert_relative_eq!(result.last().y, 2.5);
    }

    #[test]
    fn opposite_offsets_are_symmetric_at_the_start() {
        let line = right_angle();
        for magnitude in [0.5, 1.5, 3.0] {
            let left = OffsetLine::new(&line, magnitude).execute().unwrap();
            let right = OffsetLine::new(&line, -magnitude).execute().unwrap();
            let gap = left.first().distance(right.first());
            assert!((gap - 2.0 * magnitude).abs() < 0.01, "gap {gap} for offset {magnitude}");
        }
    }

    #[test]
    fn inside_corner_becomes_a_miter() {
        // The path turns left at (10, 0); a left offset is on the inside.
        let line = right_angle();
        let result = OffsetLine::new(&line, 1.0).execute().unwrap();
        assert_eq!(result.len(), 3);
        assert_relative_eq!(result.first().y, 1.0);
        let corner = result.get(1).unwrap();
        assert_relative_eq!(corner.x, 9.0, epsilon = 1e-9);
        assert_relative_eq!(corner.y, 1.0, epsilon = 1e-9);
        assert_relative_eq!(result.length(), 18.0, epsilon = 1e-9);
    }

    #[test]
    fn outside_corner_gets_a_fillet_arc() {
        let line = right_angle();
        let result = OffsetLine::new(&line, -1.0).execute().unwrap();
        assert!(result.len() > 3, "expected arc points, got {}", result.len());
        assert_relative_eq!(result.first().x, 0.0);
        assert_relative_eq!(result.first().y, -1.0);
        assert_relative_eq!(result.last().x, 11.0);
        assert_relative_eq!(result.last().y, 10.0);
        // Interior arc points stay on the fillet circle around the corner.
        let corner = p(10.0, 0.0);
        for point in result.points().iter().skip(1).take(result.len() - 2) {
            let radius = corner.distance(*point);
            assert!((radius - 1.0).abs() < 1e-6, "arc radius {radius}");
        }
    }

    #[test]
    fn circle_precision_controls_arc_density() {
        let line = right_angle();
        let coarse = OffsetLine::new(&line, -1.0)
            .with_circle_precision(std::f64::consts::FRAC_PI_2)
            .with_filter_values(1e-6, 1e-5)
            .execute()
            .unwrap();
        let fine = OffsetLine::new(&line, -1.0)
            .with_circle_precision(0.05)
            .with_filter_values(1e-6, 1e-5)
            .execute()
            .unwrap();
        assert!(fine.len() > coarse.len());
    }

    #[test]
    fn varying_offset_blends_between_endpoints() {
        let line = PolyLine::new([p(0.0, 0.0), p(5.0, 0.0), p(10.0, 0.0)]).unwrap();
        let result = OffsetLine::varying(&line, 0.0, 2.0, Transition::Linear)
            .execute()
            .unwrap();
        assert_relative_eq!(result.first().y, 0.0);
        assert_relative_eq!(result.last().y, 2.0);
    }

    #[test]
    fn cosine_transition_eases_both_ends() {
        assert_relative_eq!(Transition::Cosine.apply(0.0), 0.0);
        assert_relative_eq!(Transition::Cosine.apply(0.5), 0.5);
        assert_relative_eq!(Transition::Cosine.apply(1.0), 1.0);
        assert!(Transition::Cosine.apply(0.1) < 0.1);
        assert!(Transition::Cosine.apply(0.9) > 0.9);
    }

    #[test]
    fn custom_transition_is_applied() {
        let line = PolyLine::new([p(0.0, 0.0), p(10.0, 0.0)]).unwrap();
        let result = OffsetLine::varying(&line, 0.0, 4.0, Transition::Custom(|f| f * f))
            .execute()
            .unwrap();
        assert_relative_eq!(result.first().y, 0.0);
        assert_relative_eq!(result.last().y, 4.0);
    }

    #[test]
    fn rejects_invalid_parameters() {
        let line = right_angle();
        assert!(OffsetLine::new(&line, f64::NAN).execute().is_err());
        assert!(OffsetLine::new(&line, f64::INFINITY).execute().is_err());
        assert!(OffsetLine::new(&line, 1.0)
            .with_circle_precision(0.0)
            .execute()
            .is_err());
        assert!(OffsetLine::new(&line, 1.0)
            .with_filter_values(0.5, 0.5)
            .execute()
            .is_err());
        assert!(OffsetLine::new(&line, 1.0)
            .with_filter_values(0.5, 0.1)
            .execute()
            .is_err());
        assert!(OffsetLine::new(&line, 1.0)
            .with_filter_ratio(-0.1)
            .execute()
            .is_err());
    }

    #[test]
    fn hairpin_reversal_uses_a_flat_cap() {
        let line = PolyLine::new([p(0.0, 0.0), p(10.0, 0.0), p(0.0, 0.05)]).unwrap();
        let result = OffsetLine::new(&line, 0.5).execute().unwrap();
        // No miter blow-up: everything stays near the input extents.
        for point in result.points() {
            assert!(point.x.abs() < 12.0 && point.y.abs() < 2.0, "runaway point {point:?}");
        }
    }

    #[test]
    fn degenerate_source_is_displaced_laterally() {
        let ray = Ray::from_angle(p(2.0, 3.0), 0.0);
        let line = PolyLine::degenerate(ray);
        let result = OffsetLine::new(&line, 1.0).execute().unwrap();
        assert!(result.is_degenerate());
        assert_relative_eq!(result.first().x, 2.0);
        assert_relative_eq!(result.first().y, 4.0);
    }

    #[test]
    fn works_in_three_dimensions() {
        let line = PolyLine::new([
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(10.0, 0.0, 5.0),
        ])
        .unwrap();
        let result = OffsetLine::new(&line, 1.0).execute().unwrap();
        assert_relative_eq!(result.first().y, 1.0);
        assert_relative_eq!(result.first().z, 0.0);
        assert_relative_eq!(result.last().y, 1.0);
        assert_relative_eq!(result.last().z, 5.0);
        assert_relative_eq!(result.length(), line.length());
    }

    #[test]
    fn vertical_3d_segment_has_no_offset_side() {
        let line = PolyLine::new([
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(0.0, 0.0, 5.0),
        ])
        .unwrap();
        assert!(OffsetLine::new(&line, 1.0).execute().is_err());
    }
}
