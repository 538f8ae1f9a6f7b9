//! Conversions between polylines and external point representations.
//!
//! Path input understands straight-edge commands only; curve segments belong
//! to the flattener and must arrive pre-flattened.

use std::fmt::Write as _;

use crate::error::{InputError, Result};
use crate::geometry::PolyLine;
use crate::math::Coord;

/// One command of a vector-path outline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathCommand<P> {
    /// Starts the path at a point.
    MoveTo(P),
    /// Straight edge to a point.
    LineTo(P),
    /// Curved edge; not representable as polyline input.
    CurveTo { control1: P, control2: P, end: P },
    /// Straight edge back to the path start.
    Close,
}

/// Builds a polyline from a straight-edge path.
///
/// `Close` appends the starting point; an already-closed path is left as is.
///
/// # Errors
///
/// - [`InputError::UnsupportedCommand`] for a `CurveTo`, a path not starting
///   with `MoveTo`, or a second `MoveTo` (subpaths are separate polylines).
/// - The polyline constructor errors when fewer than 2 distinct points
///   remain.
pub fn polyline_from_path<P: Coord>(commands: &[PathCommand<P>]) -> Result<PolyLine<P>> {
    let mut points: Vec<P> = Vec::with_capacity(commands.len() + 1);
    for command in commands {
        match *command {
            PathCommand::MoveTo(point) => {
                if points.is_empty() {
                    points.push(point);
                } else {
                    return Err(InputError::UnsupportedCommand("second subpath").into());
                }
            }
            PathCommand::LineTo(point) => {
                if points.is_empty() {
                    return Err(InputError::UnsupportedCommand("line before move").into());
                }
                points.push(point);
            }
            PathCommand::CurveTo { .. } => {
                return Err(InputError::UnsupportedCommand("curve segment").into());
            }
            PathCommand::Close => {
                if let Some(&first) = points.first() {
                    points.push(first);
                }
            }
        }
    }
    PolyLine::deduplicated(points)
}

/// Renders the points as a tab-separated table, one point per line.
#[must_use]
pub fn to_tsv<P: Coord>(line: &PolyLine<P>) -> String {
    let mut out = String::new();
    for point in line.iter() {
        let mut first = true;
        for value in point.coord_slice() {
            if !first {
                out.push('\t');
            }
            let _ = write!(out, "{value}");
            first = false;
        }
        out.push('\n');
    }
    out
}

/// Renders the points as a vector-path command string: `M x,y L x,y ...`.
///
/// 3D points render their lateral-plane coordinates only.
#[must_use]
pub fn to_path_string<P: Coord>(line: &PolyLine<P>) -> String {
    let mut out = String::new();
    for (index, point) in line.iter().enumerate() {
        let command = if index == 0 { 'M' } else { 'L' };
        if index > 0 {
            out.push(' ');
        }
        let coords = point.coord_slice();
        let _ = write!(out, "{command} {},{}", coords[0], coords[1]);
    }
    out
}
