use crate::types::Coordinates;
use serde::{Deserialize, Serialize};

/// Where to place the decimal point in the listing source's integer coordinates.
///
/// The split counts leading characters of the integer's decimal string, sign
/// included, so `-96803948` with 3 becomes `-96.803948`. This is tied to the
/// listing source and the region searched; it is not a geodetic transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoordinateFormat {
    pub lat_integer_digits: usize,
    pub lon_integer_digits: usize,
}

impl Default for CoordinateFormat {
    fn default() -> Self {
        Self {
            lat_integer_digits: 2,
            lon_integer_digits: 3,
        }
    }
}

impl CoordinateFormat {
    pub fn format(&self, lat_raw: i64, lon_raw: i64) -> Coordinates {
        Coordinates {
            lat: format_coordinate(lat_raw, self.lat_integer_digits),
            lon: format_coordinate(lon_raw, self.lon_integer_digits),
        }
    }
}

/// Insert a decimal point after `integer_digits` leading characters.
/// Values too short to split come back unchanged.
pub fn format_coordinate(raw: i64, integer_digits: usize) -> String {
    let digits = raw.to_string();
    if integer_digits == 0 || digits.len() <= integer_digits {
        return digits;
    }
    let (whole, fraction) = digits.split_at(integer_digits);
    format!("{whole}.{fraction}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_latitude_after_two_digits() {
        assert_eq!(format_coordinate(46852215, 2), "46.852215");
        assert_eq!(format_coordinate(468522, 2), "46.8522");
    }

    #[test]
    fn splits_longitude_after_three_characters() {
        assert_eq!(format_coordinate(969638, 3), "969.638");
        assert_eq!(format_coordinate(-96803948, 3), "-96.803948");
    }

    #[test]
    fn short_values_are_left_unsplit() {
        assert_eq!(format_coordinate(46, 2), "46");
        assert_eq!(format_coordinate(7, 3), "7");
    }

    #[test]
    fn default_format_pairs() {
        let coords = CoordinateFormat::default().format(46873946, -96793139);
        assert_eq!(coords.lat, "46.873946");
        assert_eq!(coords.lon, "-96.793139");
    }
}
