//! HERE v8 matrix routing
//!
//! One synchronous batch call computes travel time and distance for every
//! origin/destination pair. The flat arrays in the response are zipped back
//! onto the indexed cartesian product of the inputs, so row `k` belongs to
//! origin `k / m` and destination `k % m` for `m` destinations.
//!
//! Unlike geocoding and routing, an API error status is logged and reported
//! as `Ok(None)`.

use async_trait::async_trait;
use domain::{Coordinate, DepartureTime, RoutingMode, TransportMode, indexed_product};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};
use tracing::{debug, error, instrument};

use crate::client::HereClient;
use crate::error::HereError;

/// Attributes requested from the matrix router
const MATRIX_ATTRIBUTES: [&str; 2] = ["travelTimes", "distances"];

/// Region in which the matrix router looks for routes
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum RegionDefinition {
    /// No restriction (needs a `profile` or default options)
    #[default]
    World,
    /// Circle around a center, radius in meters
    Circle {
        /// Circle center
        center: Coordinate,
        /// Radius in meters
        radius: f64,
    },
    /// Axis-aligned bounding box in degrees
    BoundingBox {
        /// Northern latitude
        north: f64,
        /// Southern latitude
        south: f64,
        /// Western longitude
        west: f64,
        /// Eastern longitude
        east: f64,
    },
    /// Polygon given by its outer ring
    Polygon {
        /// Outer ring vertices
        outer: Vec<Coordinate>,
    },
    /// Smallest circle around all waypoints, widened by `margin`
    AutoCircle {
        /// Margin in meters added to the computed radius
        #[serde(skip_serializing_if = "Option::is_none")]
        margin: Option<f64>,
        /// Upper bound on the computed radius in meters
        #[serde(rename = "maxRadius", skip_serializing_if = "Option::is_none")]
        max_radius: Option<f64>,
    },
}

/// Optional request-body options for the matrix router
///
/// The named fields cover the documented options; `extra` carries anything
/// else and is merged into the body last, overriding same-named keys.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatrixOptions {
    /// Mode of transport
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transport_mode: Option<TransportMode>,
    /// Fastest or shortest routes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub routing_mode: Option<RoutingMode>,
    /// Departure time
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "display_if_some"
    )]
    pub departure_time: Option<DepartureTime>,
    /// Features or areas to avoid, e.g. `{"features": ["tollRoad"]}`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avoid: Option<Value>,
    /// Countries to exclude, e.g. `{"countries": ["CHE"]}`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclude: Option<Value>,
    /// Truck dimensions and restrictions
    #[serde(skip_serializing_if = "Option::is_none")]
    pub truck: Option<Value>,
    /// Additional body fields passed through verbatim
    #[serde(skip)]
    pub extra: Map<String, Value>,
}

/// A matrix routing request
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MatrixRequest {
    /// Origin waypoints
    pub origins: Vec<Coordinate>,
    /// Destination waypoints; `None` pairs the origins with themselves
    pub destinations: Option<Vec<Coordinate>>,
    /// Region restriction, `world` by default
    pub region_definition: RegionDefinition,
    /// Named routing profile, e.g. `carFast`
    pub profile: Option<String>,
    /// Remaining options
    pub options: MatrixOptions,
}

impl MatrixRequest {
    /// Pairwise matrix within one set of points
    #[must_use]
    pub fn new(origins: Vec<Coordinate>) -> Self {
        Self {
            origins,
            ..Default::default()
        }
    }

    /// Use a separate destination list
    #[must_use]
    pub fn with_destinations(mut self, destinations: Vec<Coordinate>) -> Self {
        self.destinations = Some(destinations);
        self
    }

    /// Restrict the routing region
    #[must_use]
    pub fn with_region(mut self, region_definition: RegionDefinition) -> Self {
        self.region_definition = region_definition;
        self
    }

    /// Use a named profile
    #[must_use]
    pub fn with_profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = Some(profile.into());
        self
    }

    /// Set the remaining options
    #[must_use]
    pub fn with_options(mut self, options: MatrixOptions) -> Self {
        self.options = options;
        self
    }

    /// Destinations actually routed to
    #[must_use]
    pub fn effective_destinations(&self) -> &[Coordinate] {
        self.destinations.as_deref().unwrap_or(&self.origins)
    }
}

/// One origin/destination pair of the result table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatrixRow {
    /// Origin waypoint
    pub origin: Coordinate,
    /// Destination waypoint
    pub destination: Coordinate,
    /// 0-based index of the origin
    pub origin_index: usize,
    /// 0-based index of the destination
    pub destination_index: usize,
    /// Travel time in seconds, if travel times were requested
    pub travel_time: Option<u64>,
    /// Distance in meters, if distances were requested
    pub distance: Option<u64>,
    /// Per-pair error code, 0 on success
    pub error_code: i64,
}

/// Metadata reported alongside the result table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatrixMetadata {
    /// Identifier assigned by the router
    pub matrix_id: String,
    /// Number of origins the router saw
    pub num_origins: usize,
    /// Number of destinations the router saw
    pub num_destinations: usize,
    /// Region definition as echoed by the router
    pub region_definition: Value,
}

/// Result table plus metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatrixResult {
    /// Rows ordered by `(origin_index, destination_index)`
    pub rows: Vec<MatrixRow>,
    /// Router metadata
    pub metadata: MatrixMetadata,
}

/// Trait for matrix routing clients
#[async_trait]
pub trait MatrixClient: Send + Sync {
    /// Compute travel times and distances for every origin/destination pair
    ///
    /// Returns `Ok(None)` when the router answers with an error status.
    async fn calculate_matrix(
        &self,
        request: &MatrixRequest,
    ) -> Result<Option<MatrixResult>, HereError>;
}

#[async_trait]
impl MatrixClient for HereClient {
    #[instrument(skip(self, request), fields(
        origins = request.origins.len(),
        destinations = request.effective_destinations().len(),
    ))]
    async fn calculate_matrix(
        &self,
        request: &MatrixRequest,
    ) -> Result<Option<MatrixResult>, HereError> {
        let url = format!("{}/v8/matrix", self.config().matrix_base_url);
        let body = build_matrix_body(request)?;

        let mut params = vec![("async", "false"), ("apikey", self.api_key())];
        if let Some(token) = self.config().access_token() {
            params.push(("bearerAuth", token));
        }

        debug!(?url, "Requesting routing matrix");
        let response = self
            .fetch_payload(self.http().post(&url).query(&params).json(&body))
            .await?;

        if let Some(status) = response.get("status").filter(|s| !s.is_null()) {
            let title = response
                .get("title")
                .and_then(Value::as_str)
                .unwrap_or_default();
            error!(
                %status,
                title,
                response = %response,
                "Matrix routing failed"
            );
            return Ok(None);
        }

        let result = assemble_matrix(request, &response)?;
        debug!(rows = result.rows.len(), matrix_id = %result.metadata.matrix_id, "Matrix computed");
        Ok(Some(result))
    }
}

/// Build the JSON request body
///
/// # Errors
///
/// Returns an error if the options cannot be serialized.
pub fn build_matrix_body(request: &MatrixRequest) -> Result<Value, HereError> {
    let mut body = Map::new();
    body.insert("origins".to_string(), to_value(&request.origins)?);
    if let Some(destinations) = &request.destinations {
        body.insert("destinations".to_string(), to_value(destinations)?);
    }
    body.insert(
        "regionDefinition".to_string(),
        to_value(&request.region_definition)?,
    );
    body.insert(
        "matrixAttributes".to_string(),
        to_value(&MATRIX_ATTRIBUTES)?,
    );
    if let Some(profile) = &request.profile {
        body.insert("profile".to_string(), Value::String(profile.clone()));
    }

    if let Value::Object(options) = to_value(&request.options)? {
        body.extend(options);
    }
    body.extend(request.options.extra.clone());

    Ok(Value::Object(body))
}

/// Zip a successful router response onto the indexed origin/destination product
///
/// # Errors
///
/// Returns `HereError::ParseError` if the response is malformed or a
/// returned array does not have one entry per pair.
pub fn assemble_matrix(
    request: &MatrixRequest,
    response: &Value,
) -> Result<MatrixResult, HereError> {
    let raw =
        RawMatrixResponse::deserialize(response).map_err(|e| HereError::ParseError(e.to_string()))?;

    let pairs = indexed_product(&request.origins, request.effective_destinations());
    let expected = pairs.len();

    let travel_times = column("travelTimes", raw.matrix.travel_times, expected)?;
    let distances = column("distances", raw.matrix.distances, expected)?;
    let error_codes = column("errorCodes", raw.matrix.error_codes, expected)?;

    let rows = pairs
        .into_iter()
        .zip(travel_times)
        .zip(distances)
        .zip(error_codes)
        .map(|(((pair, travel_time), distance), error_code)| MatrixRow {
            origin: pair.input1,
            destination: pair.input2,
            origin_index: pair.index1,
            destination_index: pair.index2,
            travel_time,
            distance,
            error_code: error_code.unwrap_or(0),
        })
        .collect();

    Ok(MatrixResult {
        rows,
        metadata: MatrixMetadata {
            matrix_id: raw.matrix_id,
            num_origins: raw.matrix.num_origins,
            num_destinations: raw.matrix.num_destinations,
            region_definition: raw.region_definition,
        },
    })
}

/// One entry per pair, or all `None` when the router omitted the array
fn column<T: Copy>(
    name: &str,
    values: Option<Vec<T>>,
    expected: usize,
) -> Result<Vec<Option<T>>, HereError> {
    match values {
        None => Ok(vec![None; expected]),
        Some(values) if values.len() == expected => Ok(values.into_iter().map(Some).collect()),
        Some(values) => Err(HereError::ParseError(format!(
            "{name} has {} entries, expected {expected}",
            values.len()
        ))),
    }
}

#[allow(clippy::ref_option)]
fn display_if_some<S: Serializer>(
    value: &Option<DepartureTime>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match value {
        Some(time) => serializer.collect_str(time),
        None => serializer.serialize_none(),
    }
}

fn to_value<T: Serialize + ?Sized>(value: &T) -> Result<Value, HereError> {
    serde_json::to_value(value).map_err(|e| HereError::ParseError(e.to_string()))
}

// --- Raw API response types for deserialization ---

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawMatrixResponse {
    matrix_id: String,
    #[serde(default)]
    region_definition: Value,
    matrix: RawMatrix,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawMatrix {
    num_origins: usize,
    num_destinations: usize,
    travel_times: Option<Vec<u64>>,
    distances: Option<Vec<u64>>,
    error_codes: Option<Vec<i64>>,
}
