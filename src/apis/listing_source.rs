use crate::app::ports::HttpClientPort;
use crate::config::{BoundingBox, ListingSourceConfig};
use crate::constants::LISTING_STATUS_PARAMS;
use crate::error::{Result, ScraperError};
use crate::parser::{parse_price, CoordinateFormat};
use crate::types::{ListingSource, RawListing};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, instrument};

pub const ZILLOW_SOURCE: &str = "zillow";

/// Map-search listing source. Each entry of `map.properties` is a positional array:
/// `[id, lat, lon, "$350K", ..., [_, beds, baths, ...]]`.
pub struct ZillowListingSource {
    http: Arc<dyn HttpClientPort>,
    url: String,
    bounding_box: BoundingBox,
    coordinate_format: CoordinateFormat,
}

impl ZillowListingSource {
    pub fn new(http: Arc<dyn HttpClientPort>, config: &ListingSourceConfig) -> Self {
        Self {
            http,
            url: config.url.clone(),
            bounding_box: config.bounding_box,
            coordinate_format: config.coordinate_format,
        }
    }

    fn query(&self) -> Vec<(String, String)> {
        let mut query: Vec<(String, String)> = LISTING_STATUS_PARAMS
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        query.push(("rect".to_string(), self.bounding_box.to_rect_param()));
        query
    }
}

impl ListingSource for ZillowListingSource {
    fn source_name(&self) -> &'static str {
        ZILLOW_SOURCE
    }

    #[instrument(skip(self))]
    fn get_homes(&self) -> Result<Vec<RawListing>> {
        let resp = self
            .http
            .get(&self.url, &self.query())
            .map_err(|message| ScraperError::Api { message })?;

        if !resp.is_success() {
            return Err(ScraperError::Api {
                message: format!("listing source responded with HTTP {}", resp.status),
            });
        }

        let data: Value = serde_json::from_str(&resp.body)?;
        let listings = parse_properties(&data, &self.coordinate_format)?;
        info!("Fetched {} listings from {}", listings.len(), ZILLOW_SOURCE);
        Ok(listings)
    }
}

/// Extract every well-formed entry of `map.properties`. Entries that fail to
/// parse are skipped; a missing `map.properties` array is an error.
pub fn parse_properties(data: &Value, format: &CoordinateFormat) -> Result<Vec<RawListing>> {
    let properties = data["map"]["properties"]
        .as_array()
        .ok_or_else(|| ScraperError::MissingField("map.properties not found".into()))?;

    let listings: Vec<RawListing> = properties
        .iter()
        .filter_map(|entry| parse_entry(entry, format))
        .collect();

    let skipped = properties.len() - listings.len();
    if skipped > 0 {
        debug!("Skipped {} malformed listing entries", skipped);
    }
    Ok(listings)
}

pub fn parse_entry(entry: &Value, format: &CoordinateFormat) -> Option<RawListing> {
    let fields = entry.as_array()?;

    let lat = fields.get(1)?.as_i64()?;
    let lon = fields.get(2)?.as_i64()?;
    let price = parse_price(fields.get(3)?.as_str()?)?;

    // Bed and bath counts live in the first nested array after the price.
    let details = fields.iter().skip(4).find_map(Value::as_array)?;
    let bed_no = room_count(details.get(1)?)?;
    let bath_no = room_count(details.get(2)?)?;

    Some(RawListing {
        coordinates: format.format(lat, lon),
        price,
        bed_no,
        bath_no,
    })
}

// Half baths arrive as 1.5 / 2.5; the report carries whole counts.
fn room_count(value: &Value) -> Option<u32> {
    let count = match value.as_u64() {
        Some(n) => n,
        None => {
            let f = value.as_f64().filter(|f| *f >= 0.0)?;
            f.trunc() as u64
        }
    };
    u32::try_from(count).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_positional_entry() {
        let entry = json!([2127904142, 46873946, -96793139, "$145K", 1, 0, 0, 0, ["$145K", 3, 2.0, 1530]]);
        let listing = parse_entry(&entry, &CoordinateFormat::default()).unwrap();
        assert_eq!(listing.coordinates.lat, "46.873946");
        assert_eq!(listing.coordinates.lon, "-96.793139");
        assert_eq!(listing.price, 145_000);
        assert_eq!(listing.bed_no, 3);
        assert_eq!(listing.bath_no, 2);
    }

    #[test]
    fn half_baths_truncate() {
        let entry = json!([1, 46873946, -96793139, "$1.2M", ["$1.2M", 5, 3.5]]);
        let listing = parse_entry(&entry, &CoordinateFormat::default()).unwrap();
        assert_eq!(listing.price, 1_200_000);
        assert_eq!(listing.bath_no, 3);
    }

    #[test]
    fn malformed_entries_are_rejected() {
        let format = CoordinateFormat::default();
        // price missing
        assert!(parse_entry(&json!([1, 46873946, -96793139, null, [0, 3, 2]]), &format).is_none());
        // no bed/bath array
        assert!(parse_entry(&json!([1, 46873946, -96793139, "$145K", 1, 0]), &format).is_none());
        // coordinates not integers
        assert!(parse_entry(&json!([1, "46.8", -96793139, "$145K", [0, 3, 2]]), &format).is_none());
        assert!(parse_entry(&json!({"lat": 1}), &format).is_none());
    }

    #[test]
    fn skips_bad_entries_but_keeps_order() {
        let data = json!({
            "map": {
                "properties": [
                    [1, 46800000, -96800000, "$300K", [0, 3, 2]],
                    [2, 46800000, -96800000, "Contact agent", [0, 3, 2]],
                    [3, 46900000, -96900000, "$200K", [0, 2, 1]]
                ]
            }
        });
        let listings = parse_properties(&data, &CoordinateFormat::default()).unwrap();
        let prices: Vec<u64> = listings.iter().map(|l| l.price).collect();
        assert_eq!(prices, vec![300_000, 200_000]);
    }

    #[test]
    fn missing_properties_array_is_an_error() {
        let err = parse_properties(&json!({"map": {}}), &CoordinateFormat::default()).unwrap_err();
        assert!(matches!(err, ScraperError::MissingField(_)));
    }
}
