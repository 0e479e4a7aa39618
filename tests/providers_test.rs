use parcel_scout::apis::{CityParcelRegistry, CountyTaxAssessor, GoogleGeocoder, ZillowListingSource};
use parcel_scout::app::ports::{HttpClientPort, HttpResponse};
use parcel_scout::config::{GeocoderConfig, ListingSourceConfig, ParcelRegistryConfig, TaxAssessmentConfig};
use parcel_scout::error::ScraperError;
use parcel_scout::types::{
    Address, Coordinates, Geocoder, ListingSource, Lookup, ParcelRef, ParcelRegistry, TaxAssessor,
};
use serde_json::json;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone)]
struct Recorded {
    method: &'static str,
    url: String,
    params: Vec<(String, String)>,
    json: Option<serde_json::Value>,
}

/// Replays canned responses in order and records every request.
#[derive(Default)]
struct CannedHttp {
    responses: Mutex<VecDeque<Result<HttpResponse, String>>>,
    requests: Mutex<Vec<Recorded>>,
}

impl CannedHttp {
    fn with(responses: Vec<Result<HttpResponse, String>>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses.into()),
            requests: Mutex::new(Vec::new()),
        })
    }

    fn ok(body: impl Into<String>) -> Result<HttpResponse, String> {
        Ok(HttpResponse {
            status: 200,
            body: body.into(),
        })
    }

    fn status(status: u16) -> Result<HttpResponse, String> {
        Ok(HttpResponse {
            status,
            body: String::new(),
        })
    }

    fn next(&self, recorded: Recorded) -> Result<HttpResponse, String> {
        self.requests.lock().unwrap().push(recorded);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err("no canned response".to_string()))
    }

    fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }
}

impl HttpClientPort for CannedHttp {
    fn get(&self, url: &str, query: &[(String, String)]) -> Result<HttpResponse, String> {
        self.next(Recorded {
            method: "GET",
            url: url.to_string(),
            params: query.to_vec(),
            json: None,
        })
    }

    fn post_form(&self, url: &str, form: &[(String, String)]) -> Result<HttpResponse, String> {
        self.next(Recorded {
            method: "POST",
            url: url.to_string(),
            params: form.to_vec(),
            json: None,
        })
    }

    fn post_json(&self, url: &str, body: &serde_json::Value) -> Result<HttpResponse, String> {
        self.next(Recorded {
            method: "POST",
            url: url.to_string(),
            params: Vec::new(),
            json: Some(body.clone()),
        })
    }
}

fn param<'a>(recorded: &'a Recorded, key: &str) -> Option<&'a str> {
    recorded
        .params
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
}

fn fargo_address() -> Address {
    Address {
        house_no: "1234".into(),
        street: "14 St N".into(),
        city: "Fargo".into(),
        state: "ND".into(),
        zip: "58102".into(),
    }
}

#[test]
fn listing_source_sends_bounding_box_and_parses_entries() {
    let body = json!({
        "map": {
            "properties": [
                [2127904142u64, 46873946, -96793139, "$145K", 1, 0, 0, 0, ["$145K", 3, 2.0, 1530]],
                [2127904143u64, 46873946, -96793139, "$1.2M", 1, 0, 0, 0, ["$1.2M", 5, 4]],
                ["garbage"]
            ]
        }
    });
    let http = CannedHttp::with(vec![CannedHttp::ok(body.to_string())]);
    let source = ZillowListingSource::new(http.clone(), &ListingSourceConfig::default());

    let homes = source.get_homes().unwrap();

    assert_eq!(homes.len(), 2);
    assert_eq!(homes[0].price, 145_000);
    assert_eq!(homes[1].price, 1_200_000);
    assert_eq!(homes[0].coordinates.lat, "46.873946");

    let requests = http.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].method, "GET");
    assert_eq!(
        param(&requests[0], "rect"),
        Some("-97219391,46746918,-96481247,46955886")
    );
    assert_eq!(param(&requests[0], "status"), Some("110001"));
}

#[test]
fn listing_source_failures_are_systemic() {
    let config = ListingSourceConfig::default();

    let unreachable = ZillowListingSource::new(
        CannedHttp::with(vec![Err("connection refused".into())]),
        &config,
    );
    assert!(matches!(unreachable.get_homes(), Err(ScraperError::Api { .. })));

    let server_error = ZillowListingSource::new(CannedHttp::with(vec![CannedHttp::status(500)]), &config);
    assert!(matches!(server_error.get_homes(), Err(ScraperError::Api { .. })));

    let not_json = ZillowListingSource::new(CannedHttp::with(vec![CannedHttp::ok("<html>")]), &config);
    assert!(matches!(not_json.get_homes(), Err(ScraperError::Json(_))));

    let wrong_shape = ZillowListingSource::new(CannedHttp::with(vec![CannedHttp::ok("{}")]), &config);
    assert!(matches!(wrong_shape.get_homes(), Err(ScraperError::MissingField(_))));
}

#[test]
fn geocoder_resolves_and_normalizes() {
    let body = json!({
        "status": "OK",
        "results": [{"formatted_address": "1234 14th St N, Fargo, ND 58102, USA"}]
    });
    let http = CannedHttp::with(vec![CannedHttp::ok(body.to_string())]);
    let geocoder = GoogleGeocoder::new(http.clone(), &GeocoderConfig::default())
        .with_api_key(Some("secret".into()));
    let coordinates = Coordinates {
        lat: "46.873946".into(),
        lon: "-96.793139".into(),
    };

    let address = geocoder.get_address(&coordinates).unwrap();

    assert_eq!(address, fargo_address());
    let requests = http.requests();
    assert_eq!(param(&requests[0], "latlng"), Some("46.873946,-96.793139"));
    assert_eq!(param(&requests[0], "key"), Some("secret"));
}

#[test]
fn geocoder_failures_are_absent() {
    let coordinates = Coordinates {
        lat: "46.0".into(),
        lon: "-96.0".into(),
    };
    let responses = vec![
        Err("timed out".to_string()),
        CannedHttp::status(502),
        CannedHttp::ok("not json"),
        CannedHttp::ok(json!({"status": "ZERO_RESULTS", "results": []}).to_string()),
    ];
    let geocoder = GoogleGeocoder::new(CannedHttp::with(responses), &GeocoderConfig::default())
        .with_api_key(None);

    assert!(geocoder.lookup_address(&coordinates).is_transient());
    assert!(geocoder.lookup_address(&coordinates).is_transient());
    assert!(geocoder.lookup_address(&coordinates).is_transient());
    assert_eq!(geocoder.lookup_address(&coordinates), Lookup::NotFound);
}

#[test]
fn registry_search_posts_address_form() {
    let html = r#"<a href="index.asp?dispaddr=01-2345-67890-000&seg=1">1234 14 St N</a>"#;
    let http = CannedHttp::with(vec![CannedHttp::ok(html)]);
    let registry = CityParcelRegistry::new(http.clone(), &ParcelRegistryConfig::default());

    let parcel = registry.get_parcel_and_seg(&fargo_address());

    assert_eq!(
        parcel,
        ParcelRef {
            parcel_no: "01-2345-67890-000".into(),
            seg_no: 1
        }
    );
    let requests = http.requests();
    assert_eq!(requests[0].method, "POST");
    assert_eq!(requests[0].url, "http://www.fargoparcels.com/index.asp");
    assert_eq!(param(&requests[0], "address"), Some("1234 14 St N"));
    assert_eq!(param(&requests[0], "process"), Some("true"));
}

#[test]
fn registry_no_match_or_failure_yields_sentinel() {
    let http = CannedHttp::with(vec![
        CannedHttp::ok("<p>No matching records</p>"),
        Err("connection reset".into()),
    ]);
    let registry = CityParcelRegistry::new(http, &ParcelRegistryConfig::default());

    assert_eq!(registry.get_parcel_and_seg(&fargo_address()), ParcelRef::sentinel());
    assert_eq!(registry.get_parcel_and_seg(&fargo_address()), ParcelRef::sentinel());
}

#[test]
fn registry_detail_takes_last_square_footage() {
    let html = "<div>900 Sq. Ft.</div><div>garage</div><div>1450 Sq. Ft.</div>";
    let http = CannedHttp::with(vec![CannedHttp::ok(html), CannedHttp::ok("<p>none</p>")]);
    let registry = CityParcelRegistry::new(http.clone(), &ParcelRegistryConfig::default());
    let parcel = ParcelRef {
        parcel_no: "01-2345-67890-000".into(),
        seg_no: 2,
    };

    assert_eq!(registry.get_square_feet(&parcel), 1450);
    assert_eq!(registry.get_square_feet(&parcel), 0);

    let requests = http.requests();
    assert_eq!(requests[0].method, "GET");
    assert_eq!(param(&requests[0], "dispaddr"), Some("01-2345-67890-000"));
    assert_eq!(param(&requests[0], "seg"), Some("2"));
}

#[test]
fn tax_assessor_posts_parcel_number() {
    let body = json!({"d": {"LatestStatement": {"Tax": "$2,345.67"}}});
    let http = CannedHttp::with(vec![CannedHttp::ok(body.to_string()), CannedHttp::status(500)]);
    let tax = CountyTaxAssessor::new(http.clone(), &TaxAssessmentConfig::default());
    let parcel = ParcelRef {
        parcel_no: "01-2345-67890-000".into(),
        seg_no: 1,
    };

    assert_eq!(tax.lookup_latest_tax(&parcel), Lookup::Found(2345));
    assert!(tax.lookup_latest_tax(&parcel).is_transient());

    let requests = http.requests();
    assert_eq!(
        requests[0].json,
        Some(json!({"parcelNumber": "01-2345-67890-000"}))
    );
}
