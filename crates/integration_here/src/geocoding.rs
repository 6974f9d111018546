//! HERE geocoding, reverse geocoding and browse
//!
//! Every operation issues one GET request. A successful response with no
//! items becomes a single placeholder record; HTTP and transport failures
//! are returned as [`HereError`].

use async_trait::async_trait;
use domain::Coordinate;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::client::HereClient;
use crate::error::HereError;
use crate::models::{AddressRecord, BrowseFilters, PlaceAddress};

const RESPONSE_ATTRIBUTES: &str = "[matchQuality, matchType, matchCode]";

/// Trait for geocoding clients
#[async_trait]
pub trait GeocodingClient: Send + Sync {
    /// Geocode a free-text address into at most `limit` ranked matches
    async fn geocode(&self, address: &str, limit: u32) -> Result<Vec<AddressRecord>, HereError>;

    /// Geocode a free-text address, returning the API items untouched
    async fn geocode_raw(&self, address: &str, limit: u32) -> Result<Vec<Value>, HereError>;

    /// Geocode through the legacy 6.2 geocoder
    async fn geocode_legacy(
        &self,
        address: &str,
        limit: u32,
    ) -> Result<Vec<AddressRecord>, HereError>;

    /// Legacy geocode, returning the `Result` entries untouched
    async fn geocode_legacy_raw(&self, address: &str, limit: u32)
    -> Result<Vec<Value>, HereError>;

    /// Addresses nearest to a coordinate, closest first
    async fn reverse_geocode(
        &self,
        at: Coordinate,
        limit: u32,
    ) -> Result<Vec<PlaceAddress>, HereError>;

    /// Reverse geocode, returning the API items untouched
    async fn reverse_geocode_raw(&self, at: Coordinate, limit: u32)
    -> Result<Vec<Value>, HereError>;

    /// Places near a coordinate, optionally filtered by category or area
    async fn browse(
        &self,
        at: Coordinate,
        filters: &BrowseFilters,
        limit: u32,
    ) -> Result<Vec<PlaceAddress>, HereError>;

    /// Browse, returning the API items untouched
    async fn browse_raw(
        &self,
        at: Coordinate,
        filters: &BrowseFilters,
        limit: u32,
    ) -> Result<Vec<Value>, HereError>;
}

impl HereClient {
    async fn geocode_items(&self, address: &str, limit: u32) -> Result<Vec<Value>, HereError> {
        let url = format!("{}/v1/geocode", self.config().geocode_base_url);
        let params = [
            ("apikey", self.api_key().to_string()),
            ("q", address.to_string()),
            ("limit", limit.to_string()),
            ("responseattributes", RESPONSE_ATTRIBUTES.to_string()),
        ];

        debug!(?url, "Geocoding address");
        let body = self.fetch_json(self.http().get(&url).query(&params)).await?;
        Ok(items_of(body))
    }

    async fn legacy_geocode_results(&self, address: &str) -> Result<Vec<Value>, HereError> {
        let url = format!("{}/6.2/geocode.json", self.config().legacy_geocode_base_url);
        let params = [
            ("apikey", self.api_key().to_string()),
            ("searchtext", address.to_string()),
        ];

        debug!(?url, "Geocoding address with legacy geocoder");
        let body = self.fetch_json(self.http().get(&url).query(&params)).await?;
        legacy_results_of(body)
    }

    async fn reverse_geocode_items(
        &self,
        at: Coordinate,
        limit: u32,
    ) -> Result<Vec<Value>, HereError> {
        let url = format!("{}/v1/revgeocode", self.config().geocode_base_url);
        let params = [
            ("apikey", self.api_key().to_string()),
            ("at", at.to_string()),
            ("limit", limit.to_string()),
        ];

        debug!(?url, "Reverse geocoding");
        let body = self.fetch_json(self.http().get(&url).query(&params)).await?;
        Ok(items_of(body))
    }

    async fn browse_items(
        &self,
        at: Coordinate,
        filters: &BrowseFilters,
        limit: u32,
    ) -> Result<Vec<Value>, HereError> {
        let url = format!("{}/v1/browse", self.config().geocode_base_url);
        let mut params = vec![
            ("apikey", self.api_key().to_string()),
            ("at", at.to_string()),
            ("limit", limit.to_string()),
        ];
        params.extend(filters.query_params());

        debug!(?url, ?filters, "Browsing nearby places");
        let body = self.fetch_json(self.http().get(&url).query(&params)).await?;
        Ok(items_of(body))
    }
}

#[async_trait]
impl GeocodingClient for HereClient {
    #[instrument(skip(self))]
    async fn geocode(&self, address: &str, limit: u32) -> Result<Vec<AddressRecord>, HereError> {
        let items = self.geocode_items(address, limit).await?;
        if items.is_empty() {
            warn!("No geocoding results");
            return Ok(vec![AddressRecord::not_found()]);
        }

        let records = summarize_items(&items, limit, convert_geocode_item)?;
        debug!(count = records.len(), "Geocoded address");
        Ok(records)
    }

    #[instrument(skip(self))]
    async fn geocode_raw(&self, address: &str, limit: u32) -> Result<Vec<Value>, HereError> {
        let items = self.geocode_items(address, limit).await?;
        if items.is_empty() {
            warn!("No geocoding results");
            return placeholder_value(&AddressRecord::not_found());
        }
        Ok(items)
    }

    #[instrument(skip(self))]
    async fn geocode_legacy(
        &self,
        address: &str,
        limit: u32,
    ) -> Result<Vec<AddressRecord>, HereError> {
        let results = self.legacy_geocode_results(address).await?;
        summarize_legacy_results(&results, limit)
    }

    #[instrument(skip(self))]
    async fn geocode_legacy_raw(
        &self,
        address: &str,
        limit: u32,
    ) -> Result<Vec<Value>, HereError> {
        let mut results = self.legacy_geocode_results(address).await?;
        if results.is_empty() {
            warn!("No legacy geocoding results");
            return placeholder_value(&AddressRecord::not_found());
        }
        results.truncate(limit as usize);
        Ok(results)
    }

    #[instrument(skip(self), fields(at = %at))]
    async fn reverse_geocode(
        &self,
        at: Coordinate,
        limit: u32,
    ) -> Result<Vec<PlaceAddress>, HereError> {
        let items = self.reverse_geocode_items(at, limit).await?;
        if items.is_empty() {
            warn!("No addresses found near coordinate");
            return Ok(vec![PlaceAddress::not_found()]);
        }
        summarize_items(&items, limit, convert_place_item)
    }

    #[instrument(skip(self), fields(at = %at))]
    async fn reverse_geocode_raw(
        &self,
        at: Coordinate,
        limit: u32,
    ) -> Result<Vec<Value>, HereError> {
        let items = self.reverse_geocode_items(at, limit).await?;
        if items.is_empty() {
            warn!("No addresses found near coordinate");
            return placeholder_value(&PlaceAddress::not_found());
        }
        Ok(items)
    }

    #[instrument(skip(self, filters), fields(at = %at))]
    async fn browse(
        &self,
        at: Coordinate,
        filters: &BrowseFilters,
        limit: u32,
    ) -> Result<Vec<PlaceAddress>, HereError> {
        let items = self.browse_items(at, filters, limit).await?;
        if items.is_empty() {
            warn!("No places found near coordinate");
            return Ok(vec![PlaceAddress::not_found()]);
        }
        summarize_items(&items, limit, convert_place_item)
    }

    #[instrument(skip(self, filters), fields(at = %at))]
    async fn browse_raw(
        &self,
        at: Coordinate,
        filters: &BrowseFilters,
        limit: u32,
    ) -> Result<Vec<Value>, HereError> {
        let items = self.browse_items(at, filters, limit).await?;
        if items.is_empty() {
            warn!("No places found near coordinate");
            return placeholder_value(&PlaceAddress::not_found());
        }
        Ok(items)
    }
}

/// Take the `items` array out of a response; a missing array counts as empty
fn items_of(mut body: Value) -> Vec<Value> {
    match body.get_mut("items").map(Value::take) {
        Some(Value::Array(items)) => items,
        _ => Vec::new(),
    }
}

fn placeholder_value<T: serde::Serialize>(record: &T) -> Result<Vec<Value>, HereError> {
    serde_json::to_value(record)
        .map(|value| vec![value])
        .map_err(|e| HereError::ParseError(e.to_string()))
}

fn summarize_items<R, T>(
    items: &[Value],
    limit: u32,
    convert: fn(R) -> T,
) -> Result<Vec<T>, HereError>
where
    R: DeserializeOwned,
{
    items
        .iter()
        .take(limit as usize)
        .map(|item| {
            R::deserialize(item)
                .map(convert)
                .map_err(|e| HereError::ParseError(e.to_string()))
        })
        .collect()
}

fn convert_geocode_item(raw: RawGeocodeItem) -> AddressRecord {
    let RawPosition { lat, lng } = raw.position;
    let field_score = raw.scoring.field_score;

    AddressRecord {
        lat: Some(lat),
        long: Some(lng),
        string: Coordinate::new_unchecked(lat, lng).to_string(),
        country: raw.address.country_name.unwrap_or_default(),
        state: raw.address.state,
        city: None,
        address: raw.address.label.unwrap_or_default(),
        relevance: raw.scoring.query_score.unwrap_or_default(),
        match_quality_country: field_score.country,
        match_quality_state: field_score.state,
        match_quality_district: field_score.district,
        match_quality_city: field_score.city,
        match_quality_street: field_score.streets.and_then(|s| s.first().copied()),
        match_quality_number: field_score.house_number,
        match_quality_postal_code: field_score.postal_code,
    }
}

fn convert_place_item(raw: RawPlaceItem) -> PlaceAddress {
    PlaceAddress {
        address: raw.address.label.unwrap_or_default(),
        country: raw.address.country_name.unwrap_or_default(),
        state: raw.address.state,
        city: raw.address.city,
        street: raw.address.street,
        postal_code: raw.address.postal_code,
        latitude: Some(raw.position.lat),
        longitude: Some(raw.position.lng),
    }
}

/// The `Result` entries of the first legacy `View`; no view counts as empty
fn legacy_results_of(body: Value) -> Result<Vec<Value>, HereError> {
    let raw = LegacyResponse::deserialize(body).map_err(|e| HereError::ParseError(e.to_string()))?;
    Ok(raw
        .response
        .view
        .into_iter()
        .next()
        .map(|view| view.result)
        .unwrap_or_default())
}

fn summarize_legacy_results(
    results: &[Value],
    limit: u32,
) -> Result<Vec<AddressRecord>, HereError> {
    if results.is_empty() {
        warn!("No legacy geocoding results");
        return Ok(vec![AddressRecord::not_found()]);
    }
    summarize_items(results, limit, convert_legacy_result)
}

fn convert_legacy_result(raw: LegacyResult) -> AddressRecord {
    let LegacyPosition {
        latitude,
        longitude,
    } = raw.location.display_position;
    let address = raw.location.address;
    let quality = raw.match_quality;

    AddressRecord {
        lat: Some(latitude),
        long: Some(longitude),
        string: Coordinate::new_unchecked(latitude, longitude).to_string(),
        country: address.country.unwrap_or_default(),
        state: address.state,
        city: address.city,
        address: address.label.unwrap_or_default(),
        relevance: raw.relevance,
        match_quality_country: quality.country,
        match_quality_state: quality.state,
        match_quality_district: quality.district,
        match_quality_city: quality.city,
        match_quality_street: quality.street.and_then(|s| s.first().copied()),
        match_quality_number: quality.house_number,
        match_quality_postal_code: quality.postal_code,
    }
}

// --- Raw API response types for deserialization ---

#[derive(Debug, Deserialize)]
struct RawGeocodeItem {
    position: RawPosition,
    #[serde(default)]
    address: RawAddress,
    #[serde(default)]
    scoring: RawScoring,
}

#[derive(Debug, Deserialize)]
struct RawPlaceItem {
    position: RawPosition,
    #[serde(default)]
    address: RawAddress,
}

#[derive(Debug, Deserialize)]
struct RawPosition {
    lat: f64,
    lng: f64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawAddress {
    label: Option<String>,
    country_name: Option<String>,
    state: Option<String>,
    city: Option<String>,
    street: Option<String>,
    postal_code: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawScoring {
    query_score: Option<f64>,
    #[serde(default)]
    field_score: RawFieldScore,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawFieldScore {
    country: Option<f64>,
    state: Option<f64>,
    district: Option<f64>,
    city: Option<f64>,
    streets: Option<Vec<f64>>,
    house_number: Option<f64>,
    postal_code: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct LegacyResponse {
    response: LegacyBody,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct LegacyBody {
    #[serde(default)]
    view: Vec<LegacyView>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct LegacyView {
    #[serde(default)]
    result: Vec<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct LegacyResult {
    #[serde(default)]
    relevance: f64,
    #[serde(default)]
    match_quality: LegacyMatchQuality,
    location: LegacyLocation,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct LegacyLocation {
    display_position: LegacyPosition,
    #[serde(default)]
    address: LegacyAddress,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct LegacyPosition {
    latitude: f64,
    longitude: f64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct LegacyAddress {
    label: Option<String>,
    country: Option<String>,
    state: Option<String>,
    city: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct LegacyMatchQuality {
    country: Option<f64>,
    state: Option<f64>,
    district: Option<f64>,
    city: Option<f64>,
    street: Option<Vec<f64>>,
    house_number: Option<f64>,
    postal_code: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn geocode_item() -> Value {
        json!({
            "title": "6649 N Blue Gum St, New Orleans, LA 70118, United States",
            "position": { "lat": 29.97, "lng": -90.05 },
            "address": {
                "label": "6649 N Blue Gum St, New Orleans, LA 70118, United States",
                "countryName": "United States",
                "state": "Louisiana",
                "city": "New Orleans"
            },
            "scoring": {
                "queryScore": 0.95,
                "fieldScore": {
                    "state": 1.0,
                    "city": 1.0,
                    "streets": [0.9, 0.4],
                    "houseNumber": 1.0
                }
            }
        })
    }

    #[test]
    fn test_items_of() {
        assert_eq!(items_of(json!({ "items": [1, 2] })).len(), 2);
        assert!(items_of(json!({ "items": [] })).is_empty());
        assert!(items_of(json!({})).is_empty());
        assert!(items_of(json!({ "items": null })).is_empty());
    }

    #[test]
    fn test_convert_geocode_item() {
        let records = summarize_items(&[geocode_item()], 5, convert_geocode_item).unwrap();
        assert_eq!(records.len(), 1);

        let record = &records[0];
        assert_eq!(record.string, "29.97,-90.05");
        assert_eq!(record.country, "United States");
        assert_eq!(record.state.as_deref(), Some("Louisiana"));
        assert!((record.relevance - 0.95).abs() < f64::EPSILON);
        assert_eq!(record.match_quality_street, Some(0.9));
        assert_eq!(record.match_quality_number, Some(1.0));
        assert_eq!(record.match_quality_country, None);
        assert_eq!(record.match_quality_postal_code, None);
        assert!(!record.is_error());
    }

    #[test]
    fn test_missing_scoring_is_not_an_error() {
        let item = json!({ "position": { "lat": 1.0, "lng": 2.0 } });
        let records = summarize_items(&[item], 1, convert_geocode_item).unwrap();
        assert_eq!(records[0].string, "1,2");
        assert_eq!(records[0].country, "");
        assert_eq!(records[0].state, None);
        assert_eq!(records[0].match_quality_city, None);
    }

    #[test]
    fn test_missing_position_is_a_parse_error() {
        let item = json!({ "address": { "label": "Nowhere" } });
        let result = summarize_items(&[item], 1, convert_geocode_item);
        assert!(matches!(result, Err(HereError::ParseError(_))));
    }

    #[test]
    fn test_summarize_respects_limit_and_order() {
        let items: Vec<Value> = (0..4)
            .map(|i| json!({ "position": { "lat": f64::from(i), "lng": 0.0 } }))
            .collect();
        let records = summarize_items(&items, 2, convert_geocode_item).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].lat, Some(0.0));
        assert_eq!(records[1].lat, Some(1.0));
    }

    #[test]
    fn test_convert_place_item_uses_city() {
        let item = json!({
            "position": { "lat": 38.8789, "lng": -76.0 },
            "address": {
                "label": "Tilghman Island, MD",
                "countryName": "United States",
                "state": "Maryland",
                "city": "Tilghman",
                "street": "Main St"
            }
        });
        let places = summarize_items(&[item], 1, convert_place_item).unwrap();
        let place = &places[0];
        assert_eq!(place.state.as_deref(), Some("Maryland"));
        assert_eq!(place.city.as_deref(), Some("Tilghman"));
        assert_eq!(place.street.as_deref(), Some("Main St"));
        assert_eq!(place.postal_code, None);
        assert_eq!(place.latitude, Some(38.8789));
    }

    #[test]
    fn test_parse_legacy_response() {
        let body = json!({
            "Response": {
                "View": [{
                    "Result": [
                        {
                            "Relevance": 0.88,
                            "MatchQuality": { "City": 1.0, "Street": [0.8] },
                            "Location": {
                                "DisplayPosition": { "Latitude": 38.89, "Longitude": -77.03 },
                                "Address": {
                                    "Label": "1600 Pennsylvania Ave NW, Washington, DC",
                                    "Country": "USA",
                                    "State": "DC",
                                    "City": "Washington"
                                }
                            }
                        },
                        {
                            "Relevance": 0.5,
                            "Location": {
                                "DisplayPosition": { "Latitude": 38.0, "Longitude": -77.0 }
                            }
                        }
                    ]
                }]
            }
        });

        let results = legacy_results_of(body).unwrap();
        assert_eq!(results.len(), 2);
        let records = summarize_legacy_results(&results, 1).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].string, "38.89,-77.03");
        assert_eq!(records[0].city.as_deref(), Some("Washington"));
        assert_eq!(records[0].match_quality_street, Some(0.8));
        assert!((records[0].relevance - 0.88).abs() < f64::EPSILON);
    }

    #[test]
    fn test_parse_legacy_empty_view() {
        let results = legacy_results_of(json!({ "Response": { "View": [] } })).unwrap();
        let records = summarize_legacy_results(&results, 3).unwrap();
        assert_eq!(records.len(), 1);
        assert!(records[0].is_error());
    }

    #[test]
    fn test_parse_legacy_view_without_results() {
        let body = json!({ "Response": { "View": [{ "Result": [] }] } });
        let results = legacy_results_of(body).unwrap();
        assert!(results.is_empty());

        let records = summarize_legacy_results(&results, 3).unwrap();
        assert_eq!(records.len(), 1);
        assert!(records[0].is_error());
        assert_eq!(records[0].lat, None);
    }

    #[test]
    fn test_parse_legacy_missing_response_is_a_parse_error() {
        let result = legacy_results_of(json!({ "items": [] }));
        assert!(matches!(result, Err(HereError::ParseError(_))));
    }
}
