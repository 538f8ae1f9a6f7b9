use crate::error::{ArgumentError, GeometryError, RangeError, Result};
use crate::geometry::{PolyLine, Ray};
use crate::math::Coord;

/// Arclength-indexed position queries.
impl<P: Coord> PolyLine<P> {
    /// Returns the index `i` of the segment whose arclength interval
    /// `[cumulative[i], cumulative[i + 1]]` contains `distance`.
    ///
    /// An exact boundary match resolves to the lower index; distances
    /// outside `[0, length]` clamp to the boundary segments. `find(0.0)` is
    /// always 0.
    #[must_use]
    pub fn find(&self, distance: f64) -> usize {
        let first_not_below = self.cumulative().partition_point(|&c| c < distance);
        first_not_below
            .saturating_sub(1)
            .min(self.segment_count().saturating_sub(1))
    }

    /// Returns the interpolated directed point at arclength `distance`.
    ///
    /// # Errors
    ///
    /// - [`ArgumentError::NonFinite`] for a non-finite distance.
    /// - [`RangeError::DistanceOutOfRange`] when `distance` leaves
    ///   `[0, length]`.
    pub fn location(&self, distance: f64) -> Result<Ray<P>> {
        if !distance.is_finite() {
            return Err(ArgumentError::NonFinite {
                parameter: "distance",
                value: distance,
            }
            .into());
        }
        let length = self.length();
        if !(0.0..=length).contains(&distance) {
            return Err(RangeError::DistanceOutOfRange {
                value: distance,
                length,
            }
            .into());
        }
        if let Some(direction) = self.degenerate_direction() {
            return Ok(Ray::from_unit(self.first(), direction));
        }

        let index = self.find(distance);
        let start = self.cumulative()[index];
        let span = self.cumulative()[index + 1] - start;
        let fraction = if span > 0.0 {
            (distance - start) / span
        } else {
            0.0
        };
        let point = self.points()[index].lerp(self.points()[index + 1], fraction);
        Ok(Ray::from_unit(point, self.tangent_at_segment(index)?))
    }

    /// Returns the directed point at `fraction` of the total length.
    ///
    /// # Errors
    ///
    /// - [`ArgumentError::NonFinite`] for a non-finite fraction.
    /// - [`RangeError::FractionOutOfRange`] when `fraction` leaves `[0, 1]`.
    pub fn location_fraction(&self, fraction: f64) -> Result<Ray<P>> {
        if !fraction.is_finite() {
            return Err(ArgumentError::NonFinite {
                parameter: "fraction",
                value: fraction,
            }
            .into());
        }
        if !(0.0..=1.0).contains(&fraction) {
            return Err(RangeError::FractionOutOfRange { value: fraction }.into());
        }
        self.location(fraction * self.length())
    }

    /// Like [`PolyLine::location`], but distances outside `[0, length]`
    /// extrapolate linearly along the first or last segment.
    ///
    /// # Errors
    ///
    /// Returns [`ArgumentError::NonFinite`] for a non-finite distance; any
    /// finite distance has an answer.
    pub fn location_extended(&self, distance: f64) -> Result<Ray<P>> {
        if !distance.is_finite() {
            return Err(ArgumentError::NonFinite {
                parameter: "distance",
                value: distance,
            }
            .into());
        }
        if let Some(direction) = self.degenerate_direction() {
            let point = self.first().translate(direction, distance);
            return Ok(Ray::from_unit(point, direction));
        }
        let length = self.length();
        if distance < 0.0 {
            let direction = self.tangent_at_segment(0)?;
            let point = self.first().translate(direction, distance);
            return Ok(Ray::from_unit(point, direction));
        }
        if distance > length {
            let last_segment = self.segment_count() - 1;
            let direction = self.tangent_at_segment(last_segment)?;
            let point = self.last().translate(direction, distance - length);
            return Ok(Ray::from_unit(point, direction));
        }
        self.location(distance)
    }

    /// Like [`PolyLine::location_fraction`], but fractions outside `[0, 1]`
    /// extrapolate linearly.
    ///
    /// # Errors
    ///
    /// Returns [`ArgumentError::NonFinite`] for a non-finite fraction.
    pub fn location_fraction_extended(&self, fraction: f64) -> Result<Ray<P>> {
        if !fraction.is_finite() {
            return Err(ArgumentError::NonFinite {
                parameter: "fraction",
                value: fraction,
            }
            .into());
        }
        self.location_extended(fraction * self.length())
    }

    /// Unit tangent of segment `index`, scanning neighbouring segments when
    /// the segment itself is too short to carry a direction.
    pub(crate) fn tangent_at_segment(&self, index: usize) -> Result<P::Vector> {
        let points = self.points();
        for i in index..self.segment_count() {
            if let Some(direction) = points[i].direction_to(points[i + 1]) {
                return Ok(direction);
            }
        }
        for i in (0..index).rev() {
            if let Some(direction) = points[i].direction_to(points[i + 1]) {
                return Ok(direction);
            }
        }
        Err(GeometryError::Degenerate("polyline has no usable tangent".to_owned()).into())
    }
}
