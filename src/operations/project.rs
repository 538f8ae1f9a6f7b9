use crate::geometry::{PolyLine, Ray};
use crate::math::Coord;

/// A candidate foot of projection on one segment.
struct Candidate<P: Coord> {
    foot: P,
    distance: f64,
    arclength: f64,
}

/// Point and ray projection onto the polyline.
impl<P: Coord> PolyLine<P> {
    /// Fraction in `[0, 1]` of the nearest on-segment orthogonal projection
    /// of `point`.
    ///
    /// Candidates are the perpendicular feet that land on a segment itself;
    /// among equally near feet the lowest segment index wins. `None` when
    /// every foot lies on a segment's extension only (or the polyline is
    /// degenerate).
    #[must_use]
    pub fn project_fraction(&self, point: P) -> Option<f64> {
        let mut best: Option<Candidate<P>> = None;
        for index in 0..self.segment_count() {
            let segment = match self.segment(index) {
                Ok(segment) => segment,
                Err(_) => return None,
            };
            let fraction = segment.projection_fraction(point);
            if !(0.0..=1.0).contains(&fraction) {
                continue;
            }
            let foot = segment.point_at(fraction);
            let candidate = Candidate {
                foot,
                distance: point.distance(foot),
                arclength: self.cumulative()[index] + fraction * segment.length(),
            };
            if best.as_ref().is_none_or(|b| candidate.distance < b.distance) {
                best = Some(candidate);
            }
        }
        best.map(|b| b.arclength / self.length())
    }

    /// Like [`PolyLine::project_fraction`], but the first and last segments
    /// extend to infinity, so a result is always produced and may fall
    /// outside `[0, 1]`.
    ///
    /// A degenerate polyline answers 0.
    #[must_use]
    pub fn project_fraction_extended(&self, point: P) -> f64 {
        let Some(best) = self.scan_candidates(point, true) else {
            return 0.0;
        };
        best.arclength / self.length()
    }

    /// The nearest point of the polyline itself.
    ///
    /// Total: falls back to the vertices when no perpendicular foot lands on
    /// a segment.
    #[must_use]
    pub fn closest_point(&self, point: P) -> P {
        match self.scan_candidates(point, false) {
            Some(best) => best.foot,
            None => self.first(),
        }
    }

    /// Projects a directed point onto the polyline, returning the arclength
    /// of the candidate orthogonal projection whose local tangent agrees
    /// best with the ray's heading.
    ///
    /// Used to match a position on one curve to the corresponding position
    /// on a geometrically related curve, where plain nearest-distance
    /// projection may pick the wrong branch. For a ray sweeping smoothly
    /// along a well-behaved nearby curve the returned arclengths are
    /// monotone.
    #[must_use]
    pub fn project_ray(&self, ray: Ray<P>) -> f64 {
        let point = ray.point();
        let mut best: Option<(f64, Candidate<P>)> = None;
        for index in 0..self.segment_count() {
            let Ok(segment) = self.segment(index) else {
                continue;
            };
            let raw = segment.projection_fraction(point);
            let fraction = clamp_for_ends(raw, index, self.segment_count());
            let foot = segment.point_at(fraction);
            let Some(tangent) = segment.direction() else {
                continue;
            };
            let score = P::dot(tangent, ray.direction());
            let candidate = Candidate {
                foot,
                distance: point.distance(foot),
                arclength: self.cumulative()[index] + fraction * segment.length(),
            };
            let better = match &best {
                None => true,
                Some((best_score, best_candidate)) => {
                    score > best_score + f64::EPSILON
                        || ((score - best_score).abs() <= f64::EPSILON
                            && candidate.distance < best_candidate.distance)
                }
            };
            if better {
                best = Some((score, candidate));
            }
        }
        best.map_or(0.0, |(_, candidate)| candidate.arclength)
    }

    /// Scans all segments for the nearest projection foot. Off-segment feet
    /// clamp to the segment ends; with `extend_ends` the outermost segments
    /// stay unclamped instead.
    fn scan_candidates(&self, point: P, extend_ends: bool) -> Option<Candidate<P>> {
        let count = self.segment_count();
        let mut best: Option<Candidate<P>> = None;
        for index in 0..count {
            let segment = self.segment(index).ok()?;
            let raw = segment.projection_fraction(point);
            let fraction = if extend_ends {
                clamp_for_ends(raw, index, count)
            } else {
                raw.clamp(0.0, 1.0)
            };
            let foot = segment.point_at(fraction);
            let candidate = Candidate {
                foot,
                distance: point.distance(foot),
                arclength: self.cumulative()[index] + fraction * segment.length(),
            };
            if best.as_ref().is_none_or(|b| candidate.distance < b.distance) {
                best = Some(candidate);
            }
        }
        best
    }
}

/// Clamps a projection fraction to `[0, 1]` except below the first segment
/// and beyond the last, where the polyline extends.
fn clamp_for_ends(fraction: f64, index: usize, count: usize) -> f64 {
    let low = if index == 0 { f64::NEG_INFINITY } else { 0.0 };
    let high = if index + 1 == count { f64::INFINITY } else { 1.0 };
    fraction.clamp(low, high)
}
