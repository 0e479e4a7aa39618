/// Default endpoints and fixed request parameters for the providers.
/// Every URL here can be overridden from `config.toml`.

pub const LISTING_SOURCE_URL: &str = "https://www.zillow.com/search/GetResults.htm";
pub const GEOCODER_URL: &str = "https://maps.googleapis.com/maps/api/geocode/json";
pub const PARCEL_REGISTRY_URL: &str = "http://www.fargoparcels.com/index.asp";
pub const TAX_ASSESSMENT_URL: &str =
    "https://www.casscountynd.gov/_wcf/PropertyTaxService.svc/GetPropertyByParcelNumber";

pub const USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/121.0 Safari/537.36";

pub const GEOCODER_API_KEY_ENV: &str = "GEOCODING_API_KEY";

// Fargo, ND metro area (decimal degrees)
pub const DEFAULT_WEST: f64 = -97.219391;
pub const DEFAULT_SOUTH: f64 = 46.746918;
pub const DEFAULT_EAST: f64 = -96.481247;
pub const DEFAULT_NORTH: f64 = 46.955886;

pub const DEFAULT_MAX_PRICE: u64 = 350_000;

/// Listing source returns coordinates as integers scaled by this factor.
pub const COORDINATE_SCALE: f64 = 1_000_000.0;

/// Query parameters that select for-sale residential listings in map-search mode.
/// `rect` is appended separately from the configured bounding box.
pub const LISTING_STATUS_PARAMS: &[(&str, &str)] = &[
    ("spt", "homes"),
    ("status", "110001"),
    ("lt", "111101"),
    ("ht", "100000"),
    ("pr", ","),
    ("mp", ","),
    ("ba", "0,"),
    ("sf", ","),
    ("lot", "0,"),
    ("yr", ","),
    ("singlestory", "0"),
    ("hoa", "0,"),
    ("pho", "0"),
    ("pets", "0"),
    ("parking", "0"),
    ("laundry", "0"),
    ("income-restricted", "0"),
    ("pnd", "0"),
    ("red", "0"),
    ("zso", "0"),
    ("days", "any"),
    ("ds", "all"),
    ("pmf", "1"),
    ("pf", "1"),
    ("sch", "100111"),
    ("zoom", "10"),
    ("p", "1"),
    ("sort", "globalrelevanceex"),
    ("search", "map"),
    ("rid", "18073"),
    ("rt", "6"),
    ("listright", "true"),
    ("isMapSearch", "1"),
];

pub const CSV_HEADER: &[&str] = &[
    "Price",
    "House Number",
    "Street",
    "City",
    "Parcel Number",
    "Segment",
    "Square Feet",
    "Bedrooms",
    "Bathrooms",
];

pub const CSV_TAX_COLUMN: &str = "Latest Tax";
