//! Text parsing for the loosely structured values providers hand back.

pub mod address;
pub mod coordinates;
pub mod price;

pub use address::{normalize_street, parse_formatted_address};
pub use coordinates::{format_coordinate, CoordinateFormat};
pub use price::{parse_currency_amount, parse_price};
