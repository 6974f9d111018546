#![forbid(unsafe_code)]
//! HERE Maps API clients
//!
//! Thin async wrappers over the HERE geocoding, routing and matrix routing
//! endpoints that reshape their JSON into flat records.
//!
//! # Architecture
//!
//! A single [`HereClient`] implements one trait per API family:
//! [`GeocodingClient`], [`RoutingClient`] and [`MatrixClient`]. Each trait
//! method issues exactly one HTTP request. The flattening functions
//! ([`summarize_route`], [`assemble_matrix`]) are public so responses
//! obtained elsewhere can be reshaped the same way.
//!
//! Failure reporting differs per family:
//!
//! - geocoding answers an empty result with one placeholder record
//! - routing answers an API error status with a summary whose `duration`
//!   and `length` are `None`
//! - matrix routing logs an API error status and returns `Ok(None)`
//!
//! # Example
//!
//! ```rust,ignore
//! use integration_here::{GeocodingClient, HereClient, HereConfig, RoutingClient, SummaryOptions};
//!
//! let client = HereClient::new(&HereConfig::with_api_key("..."))?;
//! let home = client.geocode("200 S Mathilda Sunnyvale CA", 1).await?;
//! let info = client
//!     .driving_info("37.37,-122.03".parse()?, "37.77,-122.41".parse()?, SummaryOptions::default())
//!     .await?;
//! ```

mod client;
mod config;
mod error;
mod geocoding;
mod matrix;
mod models;
mod routing;

pub use client::HereClient;
pub use config::HereConfig;
pub use error::HereError;
pub use geocoding::GeocodingClient;
pub use matrix::{
    MatrixClient, MatrixMetadata, MatrixOptions, MatrixRequest, MatrixResult, MatrixRow,
    RegionDefinition, assemble_matrix, build_matrix_body,
};
pub use models::{AddressRecord, BrowseFilters, ERROR_MARKER, PlaceAddress};
pub use routing::{
    RouteInfo, RouteRequest, RouteSummary, RoutingClient, SectionSummary, SummaryOptions,
    route_info_from_response, summarize_route,
};
