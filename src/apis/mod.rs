pub mod geocoder;
pub mod listing_source;
pub mod parcel_registry;
pub mod tax_assessment;

pub use geocoder::GoogleGeocoder;
pub use listing_source::ZillowListingSource;
pub use parcel_registry::CityParcelRegistry;
pub use tax_assessment::CountyTaxAssessor;
