use crate::app::ports::HttpClientPort;
use crate::config::ParcelRegistryConfig;
use crate::types::{Address, Lookup, ParcelRef, ParcelRegistry};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::Html;
use std::sync::Arc;
use tracing::{debug, instrument};

// Search results link to detail pages as `...dispaddr=01-2345-67890-000&seg=1`.
static PARCEL_LINK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\d{2}-\d{4}-\d{5}-\d{3})&(?:amp;)?seg=(\d+)").expect("parcel link pattern")
});

// The figure must not continue a longer number such as a `12,345` lot size.
static SQUARE_FEET: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:^|[^\d,])(\d,\d{3}|\d{3,4})\s*Sq\.\s*Ft\.").expect("square feet pattern")
});

/// Municipal parcel registry scraped from its HTML pages.
///
/// There is no structured API here: both lookups pattern-match the markup, so
/// a layout change on the registry's side silently turns into `NotFound`.
pub struct CityParcelRegistry {
    http: Arc<dyn HttpClientPort>,
    url: String,
}

impl CityParcelRegistry {
    pub fn new(http: Arc<dyn HttpClientPort>, config: &ParcelRegistryConfig) -> Self {
        Self {
            http,
            url: config.url.clone(),
        }
    }
}

impl ParcelRegistry for CityParcelRegistry {
    #[instrument(skip(self, address), fields(address = %address.search_line()))]
    fn lookup_parcel(&self, address: &Address) -> Lookup<ParcelRef> {
        let form = vec![
            ("address".to_string(), address.search_line()),
            ("process".to_string(), "true".to_string()),
        ];

        let resp = match self.http.post_form(&self.url, &form) {
            Ok(resp) => resp,
            Err(e) => return Lookup::Transient(e),
        };
        if !resp.is_success() {
            return Lookup::Transient(format!("parcel search responded with HTTP {}", resp.status));
        }

        match extract_parcel(&resp.body) {
            Some(parcel) => Lookup::Found(parcel),
            None => {
                debug!("No parcel link in registry search results");
                Lookup::NotFound
            }
        }
    }

    #[instrument(skip(self), fields(parcel_no = %parcel.parcel_no, seg_no = parcel.seg_no))]
    fn lookup_square_feet(&self, parcel: &ParcelRef) -> Lookup<u32> {
        let query = vec![
            ("dispaddr".to_string(), parcel.parcel_no.clone()),
            ("seg".to_string(), parcel.seg_no.to_string()),
        ];

        let resp = match self.http.get(&self.url, &query) {
            Ok(resp) => resp,
            Err(e) => return Lookup::Transient(e),
        };
        if !resp.is_success() {
            return Lookup::Transient(format!("parcel detail responded with HTTP {}", resp.status));
        }

        match extract_square_feet(&resp.body) {
            Some(sq_ft) => Lookup::Found(sq_ft),
            None => Lookup::NotFound,
        }
    }
}

/// First parcel/segment pair linked from a search results page.
pub fn extract_parcel(html: &str) -> Option<ParcelRef> {
    let caps = PARCEL_LINK.captures(html)?;
    Some(ParcelRef {
        parcel_no: caps.get(1)?.as_str().to_string(),
        seg_no: caps.get(2)?.as_str().parse().ok()?,
    })
}

/// Square footage from a parcel detail page.
///
/// The page can list several structures (historical or under construction);
/// the last figure is the current assessment.
pub fn extract_square_feet(html: &str) -> Option<u32> {
    let document = Html::parse_document(html);
    let text = document.root_element().text().collect::<Vec<_>>().join(" ");

    SQUARE_FEET
        .captures_iter(&text)
        .last()
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().replace(',', "").parse().ok())
}
