use crate::types::Address;
use once_cell::sync::Lazy;
use regex::Regex;

// "<number> <street>, <city>, <ST> <zip>[-<plus4>], <country>"
static FORMATTED_ADDRESS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^\s*(?P<house>\d+)\s+(?P<street>[^,]+?)\s*,\s*(?P<city>[^,]+?)\s*,\s*(?P<state>[A-Z]{2})\s+(?P<zip>\d{5})(?:-\d{4})?\s*(?:,|$)",
    )
    .expect("formatted address pattern")
});

static ORDINAL_SUFFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(\d+)(?:st|nd|rd|th)\b").expect("ordinal suffix pattern"));

/// Parse a geocoder formatted address into an [`Address`].
///
/// Returns `None` unless every field (house number, street, city, state, zip)
/// is present; a partial address is never produced. The street is normalized
/// with [`normalize_street`].
pub fn parse_formatted_address(formatted: &str) -> Option<Address> {
    let caps = FORMATTED_ADDRESS.captures(formatted)?;

    let street = normalize_street(caps.name("street")?.as_str());
    if street.is_empty() {
        return None;
    }

    Some(Address {
        house_no: caps.name("house")?.as_str().to_string(),
        street,
        city: caps.name("city")?.as_str().to_string(),
        state: caps.name("state")?.as_str().to_string(),
        zip: caps.name("zip")?.as_str().to_string(),
    })
}

/// Strip ordinal suffixes that directly follow a digit run: `"14th St N"` becomes `"14 St N"`.
/// The parcel registry indexes numbered streets by the bare number.
pub fn normalize_street(street: &str) -> String {
    ORDINAL_SUFFIX
        .replace_all(street.trim(), "${1}")
        .into_owned()
}
