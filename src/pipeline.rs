use crate::app::ports::{RateLimiterPort, ReportOutputPort};
use crate::config::Config;
use crate::error::Result;
use crate::types::{
    Address, Geocoder, GeocodedListing, ListingSource, Lookup, ParcelRef, ParcelRegistry,
    PricedListing, RawListing, ResolvedListing, TaxAssessor,
};
use metrics::counter;
use rand::Rng;
use serde::Serialize;
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument, warn};

/// Knobs the pipeline needs at run time.
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub max_price: u64,
    /// Extra attempts for a transient lookup failure. 0 disables retries.
    pub max_retries: u32,
    pub retry_backoff_ms: u64,
    /// Shortest wait before retrying a registry call.
    pub registry_interval_ms: u64,
}

impl PipelineSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_price: config.search.max_price,
            max_retries: config.retry.max_retries,
            retry_backoff_ms: config.retry.backoff_ms,
            registry_interval_ms: config.parcel_registry.rate_limit_ms,
        }
    }
}

/// Result of a complete pipeline run
#[derive(Debug, Default, Clone, Serialize)]
pub struct PipelineResult {
    pub source: String,
    pub fetched: usize,
    pub removed_by_price: usize,
    pub dropped_without_address: usize,
    pub parcels_not_found: usize,
    pub square_feet_missing: usize,
    pub retries: usize,
    pub written: usize,
    pub output: String,
    pub duration_secs: f64,
}

pub struct EnrichmentPipeline {
    listings: Box<dyn ListingSource>,
    geocoder: Box<dyn Geocoder>,
    registry: Box<dyn ParcelRegistry>,
    tax: Option<Box<dyn TaxAssessor>>,
    limiter: Box<dyn RateLimiterPort>,
    output: Box<dyn ReportOutputPort>,
    settings: PipelineSettings,
}

/// Keep listings priced at or below `max_price`, preserving order.
pub fn filter_by_price(listings: Vec<RawListing>, max_price: u64) -> Vec<PricedListing> {
    listings
        .into_iter()
        .filter(|listing| listing.price <= max_price)
        .map(PricedListing)
        .collect()
}

/// Keep listings whose address resolved, preserving order.
pub fn filter_by_address(geocoded: Vec<(RawListing, Option<Address>)>) -> Vec<GeocodedListing> {
    geocoded
        .into_iter()
        .filter_map(|(listing, address)| address.map(|address| GeocodedListing { listing, address }))
        .collect()
}

impl EnrichmentPipeline {
    pub fn new(
        listings: Box<dyn ListingSource>,
        geocoder: Box<dyn Geocoder>,
        registry: Box<dyn ParcelRegistry>,
        limiter: Box<dyn RateLimiterPort>,
        output: Box<dyn ReportOutputPort>,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            listings,
            geocoder,
            registry,
            tax: None,
            limiter,
            output,
            settings,
        }
    }

    pub fn with_tax_assessor(mut self, tax: Box<dyn TaxAssessor>) -> Self {
        self.tax = Some(tax);
        self
    }

    pub fn includes_tax(&self) -> bool {
        self.tax.is_some()
    }

    /// Run every stage and write the report.
    #[instrument(skip(self), fields(source = %self.listings.source_name()))]
    pub fn run(&self) -> Result<PipelineResult> {
        let t_pipeline = Instant::now();
        let (resolved, mut result) = self.run_stages()?;

        // EMIT
        self.output.write_report(&resolved, self.includes_tax())?;
        result.written = resolved.len();
        result.output = self.output.location();
        result.duration_secs = t_pipeline.elapsed().as_secs_f64();

        info!(
            "✅ Wrote {} listings to {} in {:.1}s",
            result.written, result.output, result.duration_secs
        );
        Ok(result)
    }

    /// FETCH through PARCEL_RESOLVE. Only a listing-source failure is an error.
    pub fn run_stages(&self) -> Result<(Vec<ResolvedListing>, PipelineResult)> {
        let mut result = PipelineResult {
            source: self.listings.source_name().to_string(),
            ..Default::default()
        };

        // FETCH
        info!("📡 Fetching listings from {}...", result.source);
        let all = self.listings.get_homes()?;
        result.fetched = all.len();
        counter!("parcel_scout_listings_fetched_total").increment(all.len() as u64);
        info!("Fetched {} listings", result.fetched);

        // PRICE_FILTER
        let priced = filter_by_price(all, self.settings.max_price);
        result.removed_by_price = result.fetched - priced.len();
        counter!("parcel_scout_price_filtered_total").increment(result.removed_by_price as u64);
        info!(
            "Removed {} listings above ${} ({} remain)",
            result.removed_by_price,
            self.settings.max_price,
            priced.len()
        );

        // GEOCODE
        let geocoded = self.geocode(priced, &mut result);

        // ADDRESS_FILTER
        let before = geocoded.len();
        let with_address = filter_by_address(geocoded);
        result.dropped_without_address = before - with_address.len();
        counter!("parcel_scout_address_dropped_total")
            .increment(result.dropped_without_address as u64);
        info!(
            "Dropped {} listings without an address ({} remain)",
            result.dropped_without_address,
            with_address.len()
        );

        // PARCEL_RESOLVE
        let resolved = self.resolve(with_address, &mut result);
        info!(
            "Resolved {} listings ({} without a parcel)",
            resolved.len(),
            result.parcels_not_found
        );

        Ok((resolved, result))
    }

    fn geocode(
        &self,
        priced: Vec<PricedListing>,
        result: &mut PipelineResult,
    ) -> Vec<(RawListing, Option<Address>)> {
        info!("🗺️ Geocoding {} listings...", priced.len());
        priced
            .into_iter()
            .map(|priced| {
                let listing = priced.into_inner();
                let lookup = self.with_retries("geocode", Duration::ZERO, result, || {
                    self.geocoder.lookup_address(&listing.coordinates)
                });
                let address = match lookup {
                    Lookup::Found(address) => Some(address),
                    Lookup::NotFound => {
                        debug!(
                            "No address for {},{}",
                            listing.coordinates.lat, listing.coordinates.lon
                        );
                        None
                    }
                    Lookup::Transient(e) => {
                        warn!(
                            "Geocoding {},{} failed: {}",
                            listing.coordinates.lat, listing.coordinates.lon, e
                        );
                        None
                    }
                };
                (listing, address)
            })
            .collect()
    }

    fn resolve(
        &self,
        geocoded: Vec<GeocodedListing>,
        result: &mut PipelineResult,
    ) -> Vec<ResolvedListing> {
        info!("🏛️ Resolving parcels for {} listings...", geocoded.len());
        let mut resolved = Vec::with_capacity(geocoded.len());
        let registry_floor = Duration::from_millis(self.settings.registry_interval_ms);

        for (i, GeocodedListing { listing, address }) in geocoded.into_iter().enumerate() {
            let parcel = match self.with_retries("parcel search", registry_floor, result, || {
                self.registry.lookup_parcel(&address)
            }) {
                Lookup::Found(parcel) => parcel,
                Lookup::NotFound => {
                    debug!("No parcel for {}", address);
                    result.parcels_not_found += 1;
                    ParcelRef::sentinel()
                }
                Lookup::Transient(e) => {
                    warn!("Parcel search for {} failed: {}", address, e);
                    result.parcels_not_found += 1;
                    ParcelRef::sentinel()
                }
            };

            // A sentinel parcel has no detail page to look at.
            let sq_ft = if parcel.is_sentinel() {
                0
            } else {
                match self.with_retries("square feet", registry_floor, result, || {
                    self.registry.lookup_square_feet(&parcel)
                }) {
                    Lookup::Found(sq_ft) => sq_ft,
                    Lookup::NotFound => {
                        debug!("No square footage for parcel {}", parcel.parcel_no);
                        result.square_feet_missing += 1;
                        0
                    }
                    Lookup::Transient(e) => {
                        warn!("Square footage for parcel {} failed: {}", parcel.parcel_no, e);
                        result.square_feet_missing += 1;
                        0
                    }
                }
            };

            let latest_tax = match &self.tax {
                Some(tax) if !parcel.is_sentinel() => self
                    .with_retries("tax lookup", Duration::ZERO, result, || {
                        tax.lookup_latest_tax(&parcel)
                    })
                    .found(),
                _ => None,
            };

            if parcel.is_sentinel() {
                counter!("parcel_scout_parcel_not_found_total").increment(1);
            }
            if (i + 1) % 10 == 0 {
                debug!("Resolved {} listings so far", i + 1);
            }

            resolved.push(ResolvedListing {
                listing,
                address,
                parcel,
                sq_ft,
                latest_tax,
            });

            self.limiter.pause();
        }

        resolved
    }

    /// Call `lookup` until it stops returning `Transient` or the retry budget runs out.
    /// Each retry waits at least `floor`.
    fn with_retries<T>(
        &self,
        what: &str,
        floor: Duration,
        result: &mut PipelineResult,
        mut lookup: impl FnMut() -> Lookup<T>,
    ) -> Lookup<T> {
        let mut attempt = 0;
        loop {
            match lookup() {
                Lookup::Transient(ref e) if attempt < self.settings.max_retries => {
                    attempt += 1;
                    result.retries += 1;
                    counter!("parcel_scout_lookup_retries_total").increment(1);
                    warn!("⚠️ {} attempt {} failed: {}", what, attempt, e);
                    std::thread::sleep(self.backoff(attempt).max(floor));
                }
                other => return other,
            }
        }
    }

    /// `retry_backoff_ms * 2^(attempt - 1)` plus up to `retry_backoff_ms` of jitter.
    fn backoff(&self, attempt: u32) -> Duration {
        let base = self.settings.retry_backoff_ms;
        if base == 0 {
            return Duration::ZERO;
        }
        let exponential = base.saturating_mul(1u64 << attempt.saturating_sub(1).min(10));
        let jitter = rand::thread_rng().gen_range(0..=base);
        Duration::from_millis(exponential.saturating_add(jitter))
    }
}
