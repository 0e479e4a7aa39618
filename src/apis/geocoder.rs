use crate::app::ports::HttpClientPort;
use crate::config::GeocoderConfig;
use crate::parser::parse_formatted_address;
use crate::types::{Address, Coordinates, Geocoder, Lookup};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Reverse geocoder keyed by `latlng=<lat>,<lon>`.
pub struct GoogleGeocoder {
    http: Arc<dyn HttpClientPort>,
    url: String,
    api_key: Option<String>,
}

impl GoogleGeocoder {
    pub fn new(http: Arc<dyn HttpClientPort>, config: &GeocoderConfig) -> Self {
        Self {
            http,
            url: config.url.clone(),
            api_key: config.api_key(),
        }
    }

    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key;
        self
    }
}

impl Geocoder for GoogleGeocoder {
    #[instrument(skip(self), fields(lat = %coordinates.lat, lon = %coordinates.lon))]
    fn lookup_address(&self, coordinates: &Coordinates) -> Lookup<Address> {
        let mut query = vec![(
            "latlng".to_string(),
            format!("{},{}", coordinates.lat, coordinates.lon),
        )];
        if let Some(key) = &self.api_key {
            query.push(("key".to_string(), key.clone()));
        }

        let resp = match self.http.get(&self.url, &query) {
            Ok(resp) => resp,
            Err(e) => return Lookup::Transient(e),
        };
        if !resp.is_success() {
            return Lookup::Transient(format!("geocoder responded with HTTP {}", resp.status));
        }

        match serde_json::from_str::<Value>(&resp.body) {
            Ok(data) => interpret_response(&data),
            Err(e) => Lookup::Transient(format!("geocoder returned invalid JSON: {e}")),
        }
    }
}

/// Turn a geocoder JSON document into a lookup result.
pub fn interpret_response(data: &Value) -> Lookup<Address> {
    match data["status"].as_str() {
        Some("OK") | None => {}
        Some("ZERO_RESULTS") => return Lookup::NotFound,
        Some(other) => return Lookup::Transient(format!("geocoder status {other}")),
    }

    let Some(formatted) = data["results"][0]["formatted_address"].as_str() else {
        return Lookup::NotFound;
    };

    match parse_formatted_address(formatted) {
        Some(address) => Lookup::Found(address),
        None => {
            debug!("Could not parse formatted address: {}", formatted);
            Lookup::NotFound
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn takes_first_result() {
        let data = json!({
            "status": "OK",
            "results": [
                {"formatted_address": "1234 14th St N, Fargo, ND 58102, USA"},
                {"formatted_address": "Fargo, ND, USA"}
            ]
        });
        let address = interpret_response(&data).found().unwrap();
        assert_eq!(address.search_line(), "1234 14 St N");
    }

    #[test]
    fn zero_results_is_not_found() {
        let data = json!({"status": "ZERO_RESULTS", "results": []});
        assert_eq!(interpret_response(&data), Lookup::NotFound);
    }

    #[test]
    fn quota_errors_are_transient() {
        let data = json!({"status": "OVER_QUERY_LIMIT", "results": []});
        assert!(interpret_response(&data).is_transient());
    }

    #[test]
    fn unparseable_address_is_not_found() {
        let data = json!({"status": "OK", "results": [{"formatted_address": "Cass County, ND, USA"}]});
        assert_eq!(interpret_response(&data), Lookup::NotFound);
    }
}
