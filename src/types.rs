use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Decimal-degree coordinates as formatted from the listing source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: String,
    pub lon: String,
}

/// Postal address resolved by the geocoder. `street` is already normalized
/// (ordinal suffixes stripped) so it can be fed straight to the parcel registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub house_no: String,
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip: String,
}

impl Address {
    /// The `"<house_no> <street>"` form the parcel registry searches on.
    pub fn search_line(&self) -> String {
        format!("{} {}", self.house_no, self.street)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}, {}, {} {}",
            self.house_no, self.street, self.city, self.state, self.zip
        )
    }
}

/// Parcel identifier plus segment number as issued by the municipal registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParcelRef {
    pub parcel_no: String,
    pub seg_no: u32,
}

impl ParcelRef {
    /// Placeholder written to the report when the registry has no match.
    pub fn sentinel() -> Self {
        Self {
            parcel_no: "0".to_string(),
            seg_no: 0,
        }
    }

    pub fn is_sentinel(&self) -> bool {
        self.parcel_no == "0" && self.seg_no == 0
    }
}

/// Outcome of a single per-record provider call.
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup<T> {
    Found(T),
    /// The provider answered, but had nothing matching.
    NotFound,
    /// Network failure, timeout, or an unusable response.
    Transient(String),
}

impl<T> Lookup<T> {
    pub fn found(self) -> Option<T> {
        match self {
            Lookup::Found(v) => Some(v),
            _ => None,
        }
    }

    pub fn is_transient(&self) -> bool {
        matches!(self, Lookup::Transient(_))
    }
}

/// A listing as extracted from the listing source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawListing {
    pub coordinates: Coordinates,
    pub price: u64,
    pub bed_no: u32,
    pub bath_no: u32,
}

/// A listing that passed the price ceiling. Only the pipeline's price filter builds these.
#[derive(Debug, Clone, PartialEq)]
pub struct PricedListing(pub(crate) RawListing);

impl PricedListing {
    pub fn listing(&self) -> &RawListing {
        &self.0
    }

    pub fn into_inner(self) -> RawListing {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GeocodedListing {
    pub listing: RawListing,
    pub address: Address,
}

/// Fully enriched listing, ready for the report.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedListing {
    pub listing: RawListing,
    pub address: Address,
    pub parcel: ParcelRef,
    pub sq_ft: u32,
    pub latest_tax: Option<i64>,
}

/// Source of candidate listings for the configured search area.
pub trait ListingSource: Send + Sync {
    fn source_name(&self) -> &'static str;

    /// Fetch every listing the source returns. Malformed entries are skipped;
    /// an unreachable source or malformed top-level document is an error.
    fn get_homes(&self) -> Result<Vec<RawListing>>;
}

pub trait Geocoder: Send + Sync {
    fn lookup_address(&self, coordinates: &Coordinates) -> Lookup<Address>;

    fn get_address(&self, coordinates: &Coordinates) -> Option<Address> {
        self.lookup_address(coordinates).found()
    }
}

pub trait ParcelRegistry: Send + Sync {
    fn lookup_parcel(&self, address: &Address) -> Lookup<ParcelRef>;

    fn lookup_square_feet(&self, parcel: &ParcelRef) -> Lookup<u32>;

    /// Parcel for `address`, or the sentinel `("0", 0)` when there is no usable answer.
    fn get_parcel_and_seg(&self, address: &Address) -> ParcelRef {
        self.lookup_parcel(address)
            .found()
            .unwrap_or_else(ParcelRef::sentinel)
    }

    /// Assessed square footage, or 0 when there is no usable answer.
    fn get_square_feet(&self, parcel: &ParcelRef) -> u32 {
        self.lookup_square_feet(parcel).found().unwrap_or(0)
    }
}

pub trait TaxAssessor: Send + Sync {
    fn lookup_latest_tax(&self, parcel: &ParcelRef) -> Lookup<i64>;
}
