//! Flattened HERE geocoding records
//!
//! These are the summaries returned by the geocoding helpers. An empty API
//! result is reported as a single placeholder record (see
//! [`AddressRecord::not_found`] and [`PlaceAddress::not_found`]) rather
//! than an error.

use serde::{Serialize, Serializer};

/// Marker used by the placeholder records
pub const ERROR_MARKER: &str = "ERROR";

/// Forward-geocoding result for one matched address
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AddressRecord {
    /// Latitude (blank in the placeholder record)
    #[serde(serialize_with = "blank_if_none")]
    pub lat: Option<f64>,
    /// Longitude (blank in the placeholder record)
    #[serde(serialize_with = "blank_if_none")]
    pub long: Option<f64>,
    /// `"{lat},{long}"`, or `"ERROR"` in the placeholder record
    pub string: String,
    /// Country name
    pub country: String,
    /// State or region
    pub state: Option<String>,
    /// City (only reported by the legacy geocoder)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    /// Full address label
    pub address: String,
    /// Overall query score (0 to 1)
    pub relevance: f64,
    /// Per-field match quality: country
    pub match_quality_country: Option<f64>,
    /// Per-field match quality: state
    pub match_quality_state: Option<f64>,
    /// Per-field match quality: district
    pub match_quality_district: Option<f64>,
    /// Per-field match quality: city
    pub match_quality_city: Option<f64>,
    /// Per-field match quality: first street
    pub match_quality_street: Option<f64>,
    /// Per-field match quality: house number
    pub match_quality_number: Option<f64>,
    /// Per-field match quality: postal code
    pub match_quality_postal_code: Option<f64>,
}

impl AddressRecord {
    /// Placeholder returned when the geocoder finds nothing
    #[must_use]
    pub fn not_found() -> Self {
        Self {
            lat: None,
            long: None,
            string: ERROR_MARKER.to_string(),
            country: String::new(),
            state: Some(String::new()),
            city: None,
            address: String::new(),
            relevance: 0.0,
            match_quality_country: None,
            match_quality_state: None,
            match_quality_district: None,
            match_quality_city: None,
            match_quality_street: None,
            match_quality_number: None,
            match_quality_postal_code: None,
        }
    }

    /// Whether this is the placeholder for an empty result
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.string == ERROR_MARKER
    }
}

/// Address near a coordinate, from reverse geocoding or browsing
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceAddress {
    /// Full address label
    pub address: String,
    /// Country name
    pub country: String,
    /// State or region
    pub state: Option<String>,
    /// City
    pub city: Option<String>,
    /// Street name
    pub street: Option<String>,
    /// Postal code
    pub postal_code: Option<String>,
    /// Latitude (`"ERROR"` in the placeholder record)
    #[serde(serialize_with = "error_if_none")]
    pub latitude: Option<f64>,
    /// Longitude (`"ERROR"` in the placeholder record)
    #[serde(serialize_with = "error_if_none")]
    pub longitude: Option<f64>,
}

impl PlaceAddress {
    /// Placeholder returned when nothing is found near the coordinate
    #[must_use]
    pub fn not_found() -> Self {
        Self {
            address: String::new(),
            country: String::new(),
            state: Some(String::new()),
            city: Some(String::new()),
            street: Some(String::new()),
            postal_code: Some(String::new()),
            latitude: None,
            longitude: None,
        }
    }

    /// Whether this is the placeholder for an empty result
    #[must_use]
    pub const fn is_error(&self) -> bool {
        self.latitude.is_none()
    }
}

/// Optional filters for the browse endpoint
///
/// Unset filters are left out of the request entirely.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BrowseFilters {
    /// Place category IDs (e.g. `"600-6100-0062"`), sent comma-joined
    pub categories: Vec<String>,
    /// Geographic area restriction, e.g. `countryCode:USA` or `circle:52.5,13.4;r=1000`
    pub area: Option<String>,
    /// Full-text filter on place names
    pub name: Option<String>,
}

impl BrowseFilters {
    /// Restrict to the given category IDs
    #[must_use]
    pub fn with_categories<I, S>(mut self, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.categories = categories.into_iter().map(Into::into).collect();
        self
    }

    /// Restrict to a geographic area
    #[must_use]
    pub fn with_area(mut self, area: impl Into<String>) -> Self {
        self.area = Some(area.into());
        self
    }

    /// Only return places whose name matches
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Query parameters contributed by the set filters
    pub(crate) fn query_params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if !self.categories.is_empty() {
            params.push(("categories", self.categories.join(",")));
        }
        if let Some(area) = &self.area {
            params.push(("in", area.clone()));
        }
        if let Some(name) = &self.name {
            params.push(("name", name.clone()));
        }
        params
    }
}

#[allow(clippy::ref_option)]
fn blank_if_none<S: Serializer>(value: &Option<f64>, serializer: S) -> Result<S::Ok, S::Error> {
    match value {
        Some(v) => serializer.serialize_f64(*v),
        None => serializer.serialize_str(""),
    }
}

#[allow(clippy::ref_option)]
fn error_if_none<S: Serializer>(value: &Option<f64>, serializer: S) -> Result<S::Ok, S::Error> {
    match value {
        Some(v) => serializer.serialize_f64(*v),
        None => serializer.serialize_str(ERROR_MARKER),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn address_placeholder_serializes_blank_coordinates() {
        let record = AddressRecord::not_found();
        assert!(record.is_error());

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["string"], "ERROR");
        assert_eq!(value["lat"], "");
        assert_eq!(value["long"], "");
        assert_eq!(value["relevance"], 0.0);
        assert!(value.get("city").is_none());
    }

    #[test]
    fn place_placeholder_serializes_error_coordinates() {
        let place = PlaceAddress::not_found();
        assert!(place.is_error());

        let value = serde_json::to_value(&place).unwrap();
        assert_eq!(value["latitude"], "ERROR");
        assert_eq!(value["longitude"], "ERROR");
        assert_eq!(value["postalCode"], "");
        assert_eq!(value["address"], "");
    }

    #[test]
    fn place_serializes_numbers() {
        let place = PlaceAddress {
            latitude: Some(38.8789),
            longitude: Some(-76.0),
            ..PlaceAddress::not_found()
        };
        assert!(!place.is_error());
        let value = serde_json::to_value(&place).unwrap();
        assert_eq!(value["latitude"], json!(38.8789));
        assert_eq!(value["longitude"], json!(-76.0));
    }

    #[test]
    fn browse_filters_omit_unset_values() {
        assert!(BrowseFilters::default().query_params().is_empty());

        let filters = BrowseFilters::default()
            .with_categories(["600-6100-0062", "600-6200-0063"])
            .with_area("countryCode:USA");
        assert_eq!(
            filters.query_params(),
            vec![
                ("categories", "600-6100-0062,600-6200-0063".to_string()),
                ("in", "countryCode:USA".to_string()),
            ]
        );
    }

    #[test]
    fn browse_filters_send_name() {
        let filters = BrowseFilters::default().with_name("Starbucks");
        assert_eq!(filters.query_params(), vec![("name", "Starbucks".to_string())]);

        let filters = BrowseFilters::default()
            .with_categories(["100-1000-0000"])
            .with_name("Cafe");
        assert_eq!(
            filters.query_params(),
            vec![
                ("categories", "100-1000-0000".to_string()),
                ("name", "Cafe".to_string()),
            ]
        );
    }
}
