//! Enumerated routing options
//!
//! Each option parses from the string value HERE uses on the wire and
//! rejects anything else with [`DomainError::InvalidOption`], so a bad
//! value never reaches the network.

use chrono::{DateTime, FixedOffset, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::DomainError;

/// Meters in one statute mile
pub const METERS_PER_MILE: f64 = 1609.34;

/// Mode of transport for a route
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportMode {
    /// On foot
    Pedestrian,
    /// Passenger car
    Car,
    /// Truck (heavy goods vehicle)
    Truck,
    /// Bicycle
    Bicycle,
    /// Scooter
    Scooter,
}

impl TransportMode {
    const ALLOWED: &'static str = "'pedestrian', 'car', 'truck', 'bicycle' or 'scooter'";

    /// Wire value for the `transportMode` parameter
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pedestrian => "pedestrian",
            Self::Car => "car",
            Self::Truck => "truck",
            Self::Bicycle => "bicycle",
            Self::Scooter => "scooter",
        }
    }
}

impl fmt::Display for TransportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransportMode {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pedestrian" => Ok(Self::Pedestrian),
            "car" => Ok(Self::Car),
            "truck" => Ok(Self::Truck),
            "bicycle" => Ok(Self::Bicycle),
            "scooter" => Ok(Self::Scooter),
            _ => Err(DomainError::invalid_option("transportMode", s, Self::ALLOWED)),
        }
    }
}

/// Optimization target of the router
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoutingMode {
    /// Fastest route (default)
    #[default]
    Fast,
    /// Shortest route
    Short,
}

impl RoutingMode {
    /// Wire value for the `routingMode` parameter
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Fast => "fast",
            Self::Short => "short",
        }
    }
}

impl fmt::Display for RoutingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RoutingMode {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fast" => Ok(Self::Fast),
            "short" => Ok(Self::Short),
            _ => Err(DomainError::invalid_option(
                "routingMode",
                s,
                "'fast' or 'short'",
            )),
        }
    }
}

/// Unit used for route lengths in summaries
///
/// HERE always reports meters; miles are derived at flattening time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LengthUnit {
    /// Statute miles (default)
    #[default]
    Mile,
    /// Meters, as returned by the API
    Meter,
}

impl LengthUnit {
    /// Convert a length in meters into this unit
    #[must_use]
    pub fn from_meters(&self, meters: f64) -> f64 {
        match self {
            Self::Mile => meters / METERS_PER_MILE,
            Self::Meter => meters,
        }
    }
}

impl fmt::Display for LengthUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mile => f.write_str("mile"),
            Self::Meter => f.write_str("meter"),
        }
    }
}

impl FromStr for LengthUnit {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mile" => Ok(Self::Mile),
            "meter" => Ok(Self::Meter),
            _ => Err(DomainError::invalid_option(
                "mile_or_meter",
                s,
                "'mile' or 'meter'",
            )),
        }
    }
}

/// Granularity of border-crossing information requested for a route
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BorderGranularity {
    /// No span information (default)
    #[default]
    None,
    /// Country codes per span
    Country,
    /// Country and state codes per span
    State,
}

impl BorderGranularity {
    /// Value for the `spans` parameter, if any
    #[must_use]
    pub const fn span_attributes(&self) -> Option<&'static str> {
        match self {
            Self::None => None,
            Self::Country => Some("countryCode"),
            Self::State => Some("countryCode,stateCode"),
        }
    }
}

impl fmt::Display for BorderGranularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => f.write_str("none"),
            Self::Country => f.write_str("country"),
            Self::State => f.write_str("state"),
        }
    }
}

impl FromStr for BorderGranularity {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(Self::None),
            "country" => Ok(Self::Country),
            "state" => Ok(Self::State),
            _ => Err(DomainError::invalid_option(
                "borderCrossing",
                s,
                "'none', 'country' or 'state'",
            )),
        }
    }
}

/// Departure time of a route
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DepartureTime {
    /// Time-independent routing (`"any"`)
    #[default]
    Any,
    /// Departure at an instant with a UTC offset
    At(DateTime<FixedOffset>),
    /// Departure at local time of the origin
    Local(NaiveDateTime),
}

impl fmt::Display for DepartureTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => f.write_str("any"),
            Self::At(instant) => f.write_str(&instant.to_rfc3339()),
            Self::Local(local) => write!(f, "{}", local.format("%Y-%m-%dT%H:%M:%S")),
        }
    }
}

impl FromStr for DepartureTime {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "any" {
            return Ok(Self::Any);
        }
        if let Ok(instant) = DateTime::parse_from_rfc3339(s) {
            return Ok(Self::At(instant));
        }
        NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S")
            .map(Self::Local)
            .map_err(|_| DomainError::InvalidDateTime(s.to_string()))
    }
}
