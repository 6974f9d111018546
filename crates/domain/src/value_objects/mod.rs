//! Value Objects - Immutable, identity-less domain primitives

mod coordinate;
mod routing_options;

pub use coordinate::Coordinate;
pub use routing_options::{
    BorderGranularity, DepartureTime, LengthUnit, METERS_PER_MILE, RoutingMode, TransportMode,
};
