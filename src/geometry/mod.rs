pub mod bezier;
pub mod polyline;
pub mod ray;
pub mod segment;

pub use bezier::CubicBezier;
pub use polyline::PolyLine;
pub use ray::Ray;
pub use segment::LineSegment;
