/// Parse a listing price such as `"$350K"`, `"$1.2M"` or `"$249,900"`.
///
/// `K` and `M` shift the decimal point by 3 and 6 places. The arithmetic is
/// done on the digit string, so `"$1.2M"` is exactly `1200000`; fractional
/// digits beyond the shift are truncated.
pub fn parse_price(raw: &str) -> Option<u64> {
    let cleaned: String = raw
        .chars()
        .filter(|c| *c != '$' && *c != ',' && !c.is_whitespace())
        .collect();

    let (number, exponent) = match cleaned.chars().last()? {
        'K' | 'k' => (&cleaned[..cleaned.len() - 1], 3),
        'M' | 'm' => (&cleaned[..cleaned.len() - 1], 6),
        _ => (cleaned.as_str(), 0),
    };

    let (whole, fraction) = number.split_once('.').unwrap_or((number, ""));
    if whole.is_empty() && fraction.is_empty() {
        return None;
    }
    if !whole.chars().all(|c| c.is_ascii_digit()) || !fraction.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }

    let mut shifted: String = fraction.chars().take(exponent).collect();
    while shifted.len() < exponent {
        shifted.push('0');
    }

    format!("{whole}{shifted}").parse().ok()
}

/// Parse a currency amount like `"$2,345.67"`, truncating cents.
pub fn parse_currency_amount(raw: &str) -> Option<i64> {
    let trimmed = raw.trim();
    let (negative, rest) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed),
    };
    // Shorthand suffixes are listing-only; amounts must be plain numbers.
    if rest.ends_with(|c: char| c.is_ascii_alphabetic()) {
        return None;
    }
    let value = i64::try_from(parse_price(rest)?).ok()?;
    Some(if negative { -value } else { value })
}
