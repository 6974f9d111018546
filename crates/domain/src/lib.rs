//! Domain layer for the HERE Maps helpers
//!
//! Coordinates, routing option enums and the pairwise-combination generator.
//! No I/O happens here; everything is validated before a request is built.

pub mod combinations;
pub mod errors;
pub mod value_objects;

pub use combinations::{Combination, CombinationOptions, all_combinations, indexed_product};
pub use errors::DomainError;
pub use value_objects::*;
