//! HERE v8 point-to-point routing
//!
//! [`RoutingClient::route`] returns the raw router response;
//! [`summarize_route`] flattens it into a [`RouteSummary`] with one row per
//! section. A response carrying a top-level `status`, or no routes at all,
//! flattens to [`RouteSummary::not_found`].

use std::collections::BTreeSet;

use async_trait::async_trait;
use domain::{BorderGranularity, Coordinate, DepartureTime, LengthUnit, RoutingMode, TransportMode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::client::HereClient;
use crate::error::HereError;

/// Parameters of a single route request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteRequest {
    /// Mode of transport
    pub transport_mode: TransportMode,
    /// Departure time, `any` by default
    pub departure_time: DepartureTime,
    /// Fastest or shortest route
    pub routing_mode: RoutingMode,
    /// Which jurisdiction codes to request per span
    pub border_crossing: BorderGranularity,
}

impl RouteRequest {
    /// Request with default options for the given transport mode
    #[must_use]
    pub fn new(transport_mode: TransportMode) -> Self {
        Self {
            transport_mode,
            departure_time: DepartureTime::Any,
            routing_mode: RoutingMode::Fast,
            border_crossing: BorderGranularity::None,
        }
    }

    /// Set the departure time
    #[must_use]
    pub const fn with_departure_time(mut self, departure_time: DepartureTime) -> Self {
        self.departure_time = departure_time;
        self
    }

    /// Set the routing mode
    #[must_use]
    pub const fn with_routing_mode(mut self, routing_mode: RoutingMode) -> Self {
        self.routing_mode = routing_mode;
        self
    }

    /// Request country (and optionally state) codes for each span
    #[must_use]
    pub const fn with_border_crossing(mut self, border_crossing: BorderGranularity) -> Self {
        self.border_crossing = border_crossing;
        self
    }

    fn query_params(
        &self,
        api_key: &str,
        origin: Coordinate,
        destination: Coordinate,
    ) -> Vec<(&'static str, String)> {
        let spans = self.border_crossing.span_attributes();
        let return_attributes = if spans.is_some() {
            "summary,typicalDuration,polyline"
        } else {
            "summary,typicalDuration"
        };

        let mut params = vec![
            ("apikey", api_key.to_string()),
            ("transportMode", self.transport_mode.to_string()),
            ("origin", origin.to_string()),
            ("destination", destination.to_string()),
            ("departureTime", self.departure_time.to_string()),
            ("routingMode", self.routing_mode.to_string()),
            ("return", return_attributes.to_string()),
        ];
        if let Some(spans) = spans {
            params.push(("spans", spans.to_string()));
        }
        params
    }
}

/// How a route response is reported back to the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SummaryOptions {
    /// Return only the flattened summary instead of the annotated response
    pub summary_only: bool,
    /// Unit for lengths in the summary
    pub unit: LengthUnit,
}

impl Default for SummaryOptions {
    fn default() -> Self {
        Self {
            summary_only: true,
            unit: LengthUnit::Mile,
        }
    }
}

/// One row of the per-section breakdown
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionSummary {
    /// Position of the section within the route
    pub index: usize,
    /// Transport mode used on this section
    pub mode: String,
    /// Travel time in seconds, including pre/post actions
    pub duration: f64,
    /// Seconds spent in pre/post actions (boarding, ferry wait, ...)
    pub extra_duration: f64,
    /// Travel time under typical traffic, including pre/post actions
    pub typical_duration: Option<f64>,
    /// Length in the requested unit
    pub length: f64,
    /// Country codes traversed, `|`-joined in travel order
    pub countries: String,
    /// State codes traversed, `|`-joined in travel order
    pub states: String,
}

/// Flattened route summary
///
/// `duration` and `length` are `None` when no route was found.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RouteSummary {
    /// Total travel time in seconds
    pub duration: Option<f64>,
    /// Total length in the requested unit
    pub length: Option<f64>,
    /// Total typical travel time, when every section reports one
    pub typical_duration: Option<f64>,
    /// Distinct transport modes, `|`-joined
    pub modes: String,
    /// Distinct country codes, `|`-joined
    pub countries: String,
    /// Distinct state codes, `|`-joined
    pub states: String,
    /// Per-section breakdown
    pub sections: Vec<SectionSummary>,
}

impl RouteSummary {
    /// Summary reported when the router found no route
    #[must_use]
    pub fn not_found() -> Self {
        Self::default()
    }

    /// Whether a route was found
    #[must_use]
    pub const fn is_found(&self) -> bool {
        self.duration.is_some()
    }
}

/// Result of a routing helper
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RouteInfo {
    /// The flattened summary only
    Summary(RouteSummary),
    /// The raw router response with the summary under `"summary"`
    Annotated(Value),
}

impl RouteInfo {
    /// The flattened summary, whichever form was returned
    ///
    /// # Errors
    ///
    /// Returns an error if an annotated response lost its `summary` key.
    pub fn summary(&self) -> Result<RouteSummary, HereError> {
        match self {
            Self::Summary(summary) => Ok(summary.clone()),
            Self::Annotated(value) => value
                .get("summary")
                .cloned()
                .ok_or_else(|| HereError::ParseError("missing summary".to_string()))
                .and_then(|s| {
                    serde_json::from_value(s).map_err(|e| HereError::ParseError(e.to_string()))
                }),
        }
    }
}

/// Trait for routing clients
///
/// Only [`route`](RoutingClient::route) touches the network; the other
/// methods bind parameters and flatten its response.
#[async_trait]
pub trait RoutingClient: Send + Sync {
    /// Fetch the raw route between two coordinates
    async fn route(
        &self,
        origin: Coordinate,
        destination: Coordinate,
        request: &RouteRequest,
    ) -> Result<Value, HereError>;

    /// Fetch a route and flatten it according to `options`
    async fn route_info(
        &self,
        origin: Coordinate,
        destination: Coordinate,
        request: &RouteRequest,
        options: SummaryOptions,
    ) -> Result<RouteInfo, HereError> {
        let response = self.route(origin, destination, request).await?;
        route_info_from_response(response, options)
    }

    /// Driving route by car
    async fn driving_info(
        &self,
        origin: Coordinate,
        destination: Coordinate,
        options: SummaryOptions,
    ) -> Result<RouteInfo, HereError> {
        self.route_info(
            origin,
            destination,
            &RouteRequest::new(TransportMode::Car),
            options,
        )
        .await
    }

    /// Walking route
    async fn walking_info(
        &self,
        origin: Coordinate,
        destination: Coordinate,
        options: SummaryOptions,
    ) -> Result<RouteInfo, HereError> {
        self.route_info(
            origin,
            destination,
            &RouteRequest::new(TransportMode::Pedestrian),
            options,
        )
        .await
    }

    /// Route for any transport mode
    async fn any_routing_info(
        &self,
        origin: Coordinate,
        destination: Coordinate,
        transport_mode: TransportMode,
        options: SummaryOptions,
    ) -> Result<RouteInfo, HereError> {
        self.route_info(
            origin,
            destination,
            &RouteRequest::new(transport_mode),
            options,
        )
        .await
    }
}

#[async_trait]
impl RoutingClient for HereClient {
    #[instrument(skip(self), fields(origin = %origin, destination = %destination))]
    async fn route(
        &self,
        origin: Coordinate,
        destination: Coordinate,
        request: &RouteRequest,
    ) -> Result<Value, HereError> {
        let url = format!("{}/v8/routes", self.config().router_base_url);
        let params = request.query_params(self.api_key(), origin, destination);

        debug!(?url, mode = %request.transport_mode, "Requesting route");
        self.fetch_payload(self.http().get(&url).query(&params)).await
    }
}

/// Flatten a router response into either a summary or an annotated response
///
/// # Errors
///
/// Returns an error if the sections cannot be parsed.
pub fn route_info_from_response(
    mut response: Value,
    options: SummaryOptions,
) -> Result<RouteInfo, HereError> {
    let summary = summarize_route(&response, options.unit)?;

    if options.summary_only || !summary.is_found() {
        return Ok(RouteInfo::Summary(summary));
    }

    let summary_value =
        serde_json::to_value(&summary).map_err(|e| HereError::ParseError(e.to_string()))?;
    if let Value::Object(map) = &mut response {
        map.insert("summary".to_string(), summary_value);
    }
    Ok(RouteInfo::Annotated(response))
}

/// Flatten the first route of a router response
///
/// # Errors
///
/// Returns an error if the response has routes whose sections cannot be parsed.
pub fn summarize_route(response: &Value, unit: LengthUnit) -> Result<RouteSummary, HereError> {
    if response.get("status").is_some_and(|s| !s.is_null()) {
        warn!(status = %response["status"], "Router returned an error status");
        return Ok(RouteSummary::not_found());
    }

    let raw =
        RawRouteResponse::deserialize(response).map_err(|e| HereError::ParseError(e.to_string()))?;
    let Some(route) = raw.routes.into_iter().next() else {
        warn!("Router returned no routes");
        return Ok(RouteSummary::not_found());
    };

    let mut modes = BTreeSet::new();
    let mut countries = BTreeSet::new();
    let mut states = BTreeSet::new();
    let mut total_duration = 0.0;
    let mut total_length = 0.0;
    let mut total_typical = Some(0.0);
    let mut sections = Vec::with_capacity(route.sections.len());

    for (index, section) in route.sections.into_iter().enumerate() {
        let mode = section.transport.mode.unwrap_or_default();
        modes.insert(mode.clone());

        let extra_duration: f64 = section
            .pre_actions
            .iter()
            .chain(&section.post_actions)
            .map(|action| action.duration)
            .sum();

        let section_countries = ordered_codes(section.spans.iter().map(|s| &s.country_code));
        let section_states = ordered_codes(section.spans.iter().map(|s| &s.state_code));
        countries.extend(section_countries.iter().cloned());
        states.extend(section_states.iter().cloned());

        let duration = section.summary.duration + extra_duration;
        let typical_duration = section.summary.typical_duration.map(|t| t + extra_duration);
        let length = unit.from_meters(section.summary.length);

        total_duration += duration;
        total_length += length;
        total_typical = total_typical.zip(typical_duration).map(|(a, b)| a + b);

        sections.push(SectionSummary {
            index,
            mode,
            duration,
            extra_duration,
            typical_duration,
            length,
            countries: section_countries.join("|"),
            states: section_states.join("|"),
        });
    }

    if sections.is_empty() {
        total_typical = None;
    }

    debug!(
        sections = sections.len(),
        duration = total_duration,
        length = total_length,
        "Summarized route"
    );

    Ok(RouteSummary {
        duration: Some(total_duration),
        length: Some(total_length),
        typical_duration: total_typical,
        modes: join_set(modes),
        countries: join_set(countries),
        states: join_set(states),
        sections,
    })
}

/// Distinct non-empty codes in first-seen order
fn ordered_codes<'a>(codes: impl Iterator<Item = &'a Option<String>>) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    for code in codes.flatten() {
        if !code.is_empty() && !seen.contains(code) {
            seen.push(code.clone());
        }
    }
    seen
}

fn join_set(set: BTreeSet<String>) -> String {
    set.into_iter()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("|")
}

// --- Raw API response types for deserialization ---

#[derive(Debug, Deserialize)]
struct RawRouteResponse {
    #[serde(default)]
    routes: Vec<RawRoute>,
}

#[derive(Debug, Deserialize)]
struct RawRoute {
    #[serde(default)]
    sections: Vec<RawSection>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSection {
    #[serde(default)]
    transport: RawTransport,
    #[serde(default)]
    pre_actions: Vec<RawAction>,
    #[serde(default)]
    post_actions: Vec<RawAction>,
    #[serde(default)]
    summary: RawSectionSummary,
    #[serde(default)]
    spans: Vec<RawSpan>,
}

#[derive(Debug, Default, Deserialize)]
struct RawTransport {
    mode: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawAction {
    #[serde(default)]
    duration: f64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSectionSummary {
    #[serde(default)]
    duration: f64,
    #[serde(default)]
    length: f64,
    typical_duration: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSpan {
    country_code: Option<String>,
    state_code: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn coord(s: &str) -> Coordinate {
        s.parse().unwrap()
    }

    fn two_section_route() -> Value {
        json!({
            "routes": [{
                "id": "r1",
                "sections": [
                    {
                        "id": "s1",
                        "type": "vehicle",
                        "transport": { "mode": "car" },
                        "summary": { "duration": 3600, "length": 160934, "typicalDuration": 3700 },
                        "spans": [
                            { "offset": 0, "countryCode": "USA", "stateCode": "NY" },
                            { "offset": 10, "countryCode": "USA", "stateCode": "VT" }
                        ]
                    },
                    {
                        "id": "s2",
                        "type": "vehicle",
                        "transport": { "mode": "ferry" },
                        "preActions": [{ "action": "board", "duration": 600 }],
                        "postActions": [{ "action": "deboard", "duration": 120 }],
                        "summary": { "duration": 1800, "length": 16093.4 },
                        "spans": [
                            { "offset": 0, "countryCode": "CAN", "stateCode": "QC" },
                            { "offset": 5, "countryCode": "USA", "stateCode": "VT" }
                        ]
                    }
                ]
            }]
        })
    }

    #[test]
    fn test_query_params_default() {
        let request = RouteRequest::new(TransportMode::Car);
        let params = request.query_params("key", coord("1,2"), coord("3,4"));
        assert!(params.contains(&("transportMode", "car".to_string())));
        assert!(params.contains(&("origin", "1,2".to_string())));
        assert!(params.contains(&("destination", "3,4".to_string())));
        assert!(params.contains(&("departureTime", "any".to_string())));
        assert!(params.contains(&("routingMode", "fast".to_string())));
        assert!(params.contains(&("return", "summary,typicalDuration".to_string())));
        assert!(!params.iter().any(|(k, _)| *k == "spans"));
    }

    #[test]
    fn test_query_params_state_granularity() {
        let request = RouteRequest::new(TransportMode::Truck)
            .with_routing_mode(RoutingMode::Short)
            .with_border_crossing(BorderGranularity::State);
        let params = request.query_params("key", coord("1,2"), coord("3,4"));
        assert!(params.contains(&("spans", "countryCode,stateCode".to_string())));
        assert!(params.contains(&("return", "summary,typicalDuration,polyline".to_string())));
        assert!(params.contains(&("routingMode", "short".to_string())));
    }

    #[test]
    fn test_error_status_yields_not_found() {
        let response = json!({ "status": 400, "title": "Malformed request" });
        for unit in [LengthUnit::Mile, LengthUnit::Meter] {
            let summary = summarize_route(&response, unit).unwrap();
            assert_eq!(summary.duration, None);
            assert_eq!(summary.length, None);
        }
    }

    #[test]
    fn test_zero_routes_yields_not_found() {
        let summary = summarize_route(&json!({ "routes": [] }), LengthUnit::Meter).unwrap();
        assert!(!summary.is_found());
        assert!(summary.sections.is_empty());
    }

    #[test]
    fn test_summarize_sections() {
        let summary = summarize_route(&two_section_route(), LengthUnit::Meter).unwrap();

        assert_eq!(summary.duration, Some(3600.0 + 1800.0 + 720.0));
        assert_eq!(summary.length, Some(160_934.0 + 16_093.4));
        assert_eq!(summary.modes, "car|ferry");
        assert_eq!(summary.countries, "CAN|USA");
        assert_eq!(summary.states, "NY|QC|VT");
        assert_eq!(summary.typical_duration, None);

        assert_eq!(summary.sections.len(), 2);
        let first = &summary.sections[0];
        assert_eq!(first.mode, "car");
        assert_eq!(first.countries, "USA");
        assert_eq!(first.states, "NY|VT");
        assert_eq!(first.typical_duration, Some(3700.0));

        let second = &summary.sections[1];
        assert_eq!(second.index, 1);
        assert!((second.extra_duration - 720.0).abs() < f64::EPSILON);
        assert!((second.duration - 2520.0).abs() < f64::EPSILON);
        assert_eq!(second.countries, "CAN|USA");
    }

    #[test]
    fn test_summarize_in_miles() {
        let meters = summarize_route(&two_section_route(), LengthUnit::Meter).unwrap();
        let miles = summarize_route(&two_section_route(), LengthUnit::Mile).unwrap();

        let expected = meters.length.unwrap() / domain::METERS_PER_MILE;
        assert!((miles.length.unwrap() - expected).abs() < 1e-9);
        assert!((miles.sections[0].length - 100.0).abs() < 1e-9);
        assert_eq!(miles.duration, meters.duration);
    }

    #[test]
    fn test_sections_without_spans() {
        let response = json!({
            "routes": [{
                "sections": [{
                    "transport": { "mode": "pedestrian" },
                    "summary": { "duration": 300, "length": 400, "typicalDuration": 300 }
                }]
            }]
        });
        let summary = summarize_route(&response, LengthUnit::Meter).unwrap();
        assert_eq!(summary.countries, "");
        assert_eq!(summary.states, "");
        assert_eq!(summary.modes, "pedestrian");
        assert_eq!(summary.typical_duration, Some(300.0));
    }

    #[test]
    fn test_route_info_summary_only() {
        let info = route_info_from_response(two_section_route(), SummaryOptions::default()).unwrap();
        assert!(matches!(info, RouteInfo::Summary(_)));
    }

    #[test]
    fn test_route_info_annotated() {
        let options = SummaryOptions {
            summary_only: false,
            unit: LengthUnit::Meter,
        };
        let info = route_info_from_response(two_section_route(), options).unwrap();
        let RouteInfo::Annotated(value) = &info else {
            unreachable!("expected annotated response");
        };
        assert_eq!(value["routes"][0]["id"], "r1");
        assert_eq!(value["summary"]["modes"], "car|ferry");
        assert_eq!(info.summary().unwrap().sections.len(), 2);
    }

    #[test]
    fn test_route_info_error_ignores_summary_only() {
        let options = SummaryOptions {
            summary_only: false,
            unit: LengthUnit::Mile,
        };
        let info = route_info_from_response(json!({ "status": 401 }), options).unwrap();
        let summary = info.summary().unwrap();
        assert_eq!(summary.duration, None);
        assert_eq!(summary.length, None);
    }

    #[test]
    fn test_ordered_codes() {
        let codes = [
            Some("USA".to_string()),
            None,
            Some("USA".to_string()),
            Some("CAN".to_string()),
            Some(String::new()),
        ];
        assert_eq!(ordered_codes(codes.iter()), vec!["USA", "CAN"]);
    }
}
