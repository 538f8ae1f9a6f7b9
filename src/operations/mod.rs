//! Queries and transformations over polylines.

pub mod locate;
pub mod offset;
pub mod project;

pub use offset::{
    OffsetLine, Transition, DEFAULT_CIRCLE_PRECISION, DEFAULT_FILTER_RATIO,
    DEFAULT_MAXIMUM_FILTER_VALUE, DEFAULT_MINIMUM_FILTER_VALUE,
};
