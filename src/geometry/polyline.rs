use crate::error::{ArgumentError, GeometryError, RangeError, Result};
use crate::math::{Coord, TOLERANCE};

use super::{LineSegment, Ray};

/// Iteration bound for the noise filter; each pass removes at least one
/// vertex, so real inputs converge long before this.
const MAX_NOISE_FILTER_PASSES: usize = 1024;

/// An ordered, immutable point sequence with a cumulative arclength index.
///
/// Invariants:
/// - at least 2 points, no two consecutive points coordinate-identical
///   (except the explicit [`PolyLine::degenerate`] single-point form);
/// - `cumulative[0] = 0` and `cumulative` is non-decreasing;
/// - total length is `cumulative[len - 1]`.
///
/// Every transformation returns a new polyline; nothing is mutated after
/// construction.
#[derive(Debug, Clone)]
pub struct PolyLine<P: Coord> {
    points: Vec<P>,
    cumulative: Vec<f64>,
    /// Tangent for the zero-length form, where no segment can supply one.
    degenerate_dir: Option<P::Vector>,
}

impl<P: Coord> PartialEq for PolyLine<P> {
    fn eq(&self, other: &Self) -> bool {
        self.points == other.points
    }
}

impl<P: Coord> PolyLine<P> {
    /// Creates a polyline from an ordered point source, rejecting
    /// consecutive duplicates.
    ///
    /// # Errors
    ///
    /// - [`ArgumentError::NonFinite`] for a NaN or infinite coordinate.
    /// - [`GeometryError::TooFewPoints`] for fewer than 2 points.
    /// - [`GeometryError::DuplicatePoint`] when two consecutive points are
    ///   coordinate-identical.
    pub fn new<I: IntoIterator<Item = P>>(points: I) -> Result<Self> {
        let points: Vec<P> = points.into_iter().collect();
        validate_finite(&points)?;
        if points.len() < 2 {
            return Err(GeometryError::TooFewPoints {
                count: points.len(),
            }
            .into());
        }
        for (index, pair) in points.windows(2).enumerate() {
            if pair[0] == pair[1] {
                return Err(GeometryError::DuplicatePoint { index: index + 1 }.into());
            }
        }
        Ok(Self::from_validated(points))
    }

    /// Creates a polyline from an ordered point source, silently dropping
    /// consecutive points within `tolerance` of the last kept point.
    ///
    /// A `tolerance` of 0 drops exact duplicates only.
    ///
    /// # Errors
    ///
    /// - [`ArgumentError::NonFinite`] / [`ArgumentError::Negative`] for an
    ///   invalid tolerance or coordinate.
    /// - [`GeometryError::TooFewPoints`] when fewer than 2 points survive.
    pub fn filtered<I: IntoIterator<Item = P>>(points: I, tolerance: f64) -> Result<Self> {
        validate_tolerance("duplicate tolerance", tolerance)?;
        let mut kept: Vec<P> = Vec::new();
        for point in points {
            match kept.last() {
                Some(last) if last.distance(point) <= tolerance => {}
                _ => kept.push(point),
            }
        }
        validate_finite(&kept)?;
        if kept.len() < 2 {
            return Err(GeometryError::TooFewPoints { count: kept.len() }.into());
        }
        Ok(Self::from_validated(kept))
    }

    /// Creates a polyline dropping exactly coincident consecutive points.
    ///
    /// Shorthand for [`PolyLine::filtered`] with tolerance 0.
    ///
    /// # Errors
    ///
    /// See [`PolyLine::filtered`].
    pub fn deduplicated<I: IntoIterator<Item = P>>(points: I) -> Result<Self> {
        Self::filtered(points, 0.0)
    }

    /// Creates the explicit zero-length polyline: a single located direction
    /// with no extent.
    ///
    /// This is the only way to obtain a polyline with fewer than 2 points.
    #[must_use]
    pub fn degenerate(ray: Ray<P>) -> Self {
        Self {
            points: vec![ray.point()],
            cumulative: vec![0.0],
            degenerate_dir: Some(ray.direction()),
        }
    }

    /// Builds the cumulative index for a validated point sequence.
    fn from_validated(points: Vec<P>) -> Self {
        let mut cumulative = Vec::with_capacity(points.len());
        cumulative.push(0.0);
        for pair in points.windows(2) {
            let last = cumulative[cumulative.len() - 1];
            cumulative.push(last + pair[0].distance(pair[1]));
        }
        Self {
            points,
            cumulative,
            degenerate_dir: None,
        }
    }

    /// Returns the number of points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// A polyline always has at least one point.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Whether this is the zero-length single-point form.
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        self.degenerate_dir.is_some()
    }

    /// Returns the total arclength.
    #[must_use]
    pub fn length(&self) -> f64 {
        self.cumulative[self.cumulative.len() - 1]
    }

    /// Returns the arclength from the first point to point `index`.
    ///
    /// # Errors
    ///
    /// Returns [`RangeError::IndexOutOfRange`] for an invalid index.
    pub fn length_at(&self, index: usize) -> Result<f64> {
        self.cumulative
            .get(index)
            .copied()
            .ok_or_else(|| self.index_error(index))
    }

    /// Returns the point at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`RangeError::IndexOutOfRange`] for an invalid index.
    pub fn get(&self, index: usize) -> Result<P> {
        self.points
            .get(index)
            .copied()
            .ok_or_else(|| self.index_error(index))
    }

    /// Returns the first point.
    #[must_use]
    pub fn first(&self) -> P {
        self.points[0]
    }

    /// Returns the last point.
    #[must_use]
    pub fn last(&self) -> P {
        self.points[self.points.len() - 1]
    }

    /// Returns the number of segments (edges between consecutive points).
    #[must_use]
    pub fn segment_count(&self) -> usize {
        self.points.len() - 1
    }

    /// Returns the segment from point `index` to point `index + 1`.
    ///
    /// # Errors
    ///
    /// Returns [`RangeError::SegmentOutOfRange`] when `index` has no
    /// following point (the last point index has no segment).
    pub fn segment(&self, index: usize) -> Result<LineSegment<P>> {
        if index + 1 >= self.points.len() {
            return Err(RangeError::SegmentOutOfRange {
                index,
                count: self.segment_count(),
            }
            .into());
        }
        Ok(LineSegment::new(self.points[index], self.points[index + 1]))
    }

    /// Returns the points as a slice.
    #[must_use]
    pub fn points(&self) -> &[P] {
        &self.points
    }

    /// Iterates over the points in order.
    pub fn iter(&self) -> std::slice::Iter<'_, P> {
        self.points.iter()
    }

    pub(crate) fn cumulative(&self) -> &[f64] {
        &self.cumulative
    }

    pub(crate) fn degenerate_direction(&self) -> Option<P::Vector> {
        self.degenerate_dir
    }

    fn index_error(&self, index: usize) -> crate::error::CurvisError {
        RangeError::IndexOutOfRange {
            index,
            len: self.points.len(),
        }
        .into()
    }

    /// Returns the polyline with point order reversed.
    #[must_use]
    pub fn reversed(&self) -> Self {
        if let Some(dir) = self.degenerate_dir {
            return Self {
                points: self.points.clone(),
                cumulative: self.cumulative.clone(),
                degenerate_dir: Some(P::scale(dir, -1.0)),
            };
        }
        let mut points = self.points.clone();
        points.reverse();
        Self::from_validated(points)
    }

    /// Extracts the part between arclengths `from` and `to` as a new
    /// polyline.
    ///
    /// # Errors
    ///
    /// - [`ArgumentError::NonFinite`] for non-finite bounds.
    /// - [`RangeError::DistanceOutOfRange`] when a bound leaves
    ///   `[0, length]`.
    /// - [`RangeError::ReversedRange`] when `to < from`.
    /// - [`GeometryError::Degenerate`] when the requested span is shorter
    ///   than the geometric tolerance.
    pub fn extract(&self, from: f64, to: f64) -> Result<Self> {
        validate_finite_value("extract start", from)?;
        validate_finite_value("extract end", to)?;
        let length = self.length();
        for value in [from, to] {
            if !(0.0..=length).contains(&value) {
                return Err(RangeError::DistanceOutOfRange { value, length }.into());
            }
        }
        if to < from {
            return Err(RangeError::ReversedRange { from, to }.into());
        }
        if to - from <= TOLERANCE {
            return Err(GeometryError::Degenerate(format!(
                "extract span [{from}, {to}] has no extent"
            ))
            .into());
        }

        let start_index = self.find(from);
        let mut points = Vec::with_capacity(self.points.len());
        points.push(self.point_at_clamped(start_index, from));
        for i in (start_index + 1)..self.points.len() {
            if self.cumulative[i] >= to {
                break;
            }
            if self.cumulative[i] > from {
                points.push(self.points[i]);
            }
        }
        points.push(self.point_at_clamped(self.find(to), to));
        Self::filtered(points, TOLERANCE)
    }

    /// Returns the polyline truncated at arclength `at`.
    ///
    /// # Errors
    ///
    /// See [`PolyLine::extract`].
    pub fn truncated(&self, at: f64) -> Result<Self> {
        self.extract(0.0, at)
    }

    /// Interpolated point at arclength `distance`, known to fall on the
    /// segment starting at `index`.
    fn point_at_clamped(&self, index: usize, distance: f64) -> P {
        let index = index.min(self.points.len().saturating_sub(2));
        let start = self.cumulative[index];
        let span = self.cumulative[index + 1] - start;
        if span <= f64::EPSILON {
            return self.points[index];
        }
        let fraction = ((distance - start) / span).clamp(0.0, 1.0);
        self.points[index].lerp(self.points[index + 1], fraction)
    }

    /// Joins several polylines end to start into one.
    ///
    /// Consecutive lines must meet within `tolerance`; the duplicated joint
    /// points are collapsed.
    ///
    /// # Errors
    ///
    /// - [`GeometryError::EmptyConcatenation`] for an empty list.
    /// - [`GeometryError::DisjointEndpoints`] when consecutive endpoints are
    ///   further apart than `tolerance`.
    /// - [`ArgumentError::NonFinite`] / [`ArgumentError::Negative`] for an
    ///   invalid tolerance.
    pub fn concatenate(tolerance: f64, lines: &[Self]) -> Result<Self> {
        validate_tolerance("concatenation tolerance", tolerance)?;
        let Some(first) = lines.first() else {
            return Err(GeometryError::EmptyConcatenation.into());
        };
        for pair in lines.windows(2) {
            let gap = pair[0].last().distance(pair[1].first());
            if gap > tolerance {
                return Err(GeometryError::DisjointEndpoints { gap, tolerance }.into());
            }
        }
        let mut points: Vec<P> = first.points.clone();
        for line in &lines[1..] {
            // The next line's first point duplicates the joint; skip it.
            // `tolerance` only admits the gap, it must not refilter the
            // interior vertices of the joined lines.
            points.extend_from_slice(&line.points[1..]);
        }
        Self::deduplicated(points)
    }

    /// Simplifies the polyline by removing interior points whose
    /// perpendicular deviation from the chord between their still-kept
    /// neighbours is within `tolerance`.
    ///
    /// The first and last points are always kept. When no point qualifies
    /// for removal the result is coordinate-equal to the input.
    ///
    /// # Errors
    ///
    /// Returns [`ArgumentError::NonFinite`] / [`ArgumentError::Negative`]
    /// for an invalid tolerance.
    pub fn noise_filtered(&self, tolerance: f64) -> Result<Self> {
        validate_tolerance("noise tolerance", tolerance)?;
        if self.points.len() <= 2 {
            return Ok(self.clone());
        }

        let mut kept = self.points.clone();
        for _ in 0..MAX_NOISE_FILTER_PASSES {
            let before = kept.len();
            kept = noise_filter_pass(&kept, tolerance);
            if kept.len() == before || kept.len() <= 2 {
                break;
            }
        }
        if kept.len() == self.points.len() {
            return Ok(self.clone());
        }
        Ok(Self::from_validated(kept))
    }
}

/// One removal sweep: drops interior points that deviate from the chord of
/// their current neighbours by at most `tolerance`.
fn noise_filter_pass<P: Coord>(points: &[P], tolerance: f64) -> Vec<P> {
    let mut kept: Vec<P> = Vec::with_capacity(points.len());
    kept.push(points[0]);
    let mut i = 1;
    while i + 1 < points.len() {
        let chord = LineSegment::new(kept[kept.len() - 1], points[i + 1]);
        // A zero-length chord (closed line with everything between already
        // removed) cannot measure deviation; keeping the point also keeps
        // the result free of consecutive duplicates.
        if chord.length() <= f64::EPSILON || chord.deviation(points[i]) > tolerance {
            kept.push(points[i]);
        }
        i += 1;
    }
    kept.push(points[points.len() - 1]);
    kept
}

fn validate_finite<P: Coord>(points: &[P]) -> Result<()> {
    for point in points {
        for &value in point.coord_slice() {
            if !value.is_finite() {
                return Err(ArgumentError::NonFinite {
                    parameter: "coordinate",
                    value,
                }
                .into());
            }
        }
    }
    Ok(())
}

fn validate_finite_value(parameter: &'static str, value: f64) -> Result<()> {
    if !value.is_finite() {
        return Err(ArgumentError::NonFinite { parameter, value }.into());
    }
    Ok(())
}

fn validate_tolerance(parameter: &'static str, value: f64) -> Result<()> {
    validate_finite_value(parameter, value)?;
    if value < 0.0 {
        return Err(ArgumentError::Negative { parameter, value }.into());
    }
    Ok(())
}
