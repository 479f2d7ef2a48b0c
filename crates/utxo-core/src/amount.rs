//! Exact conversion of node-reported decimal coin amounts to integer subunits.
//!
//! Nodes report output values as JSON decimals (`0.00070000`). Converting via
//! `f64 * 10^8` misrounds once enough significant digits are involved, so the
//! conversion here works on the decimal text directly.

use crate::error::UtxoError;

/// Parse a decimal coin amount into smallest units.
///
/// The fractional part is right-padded with zeros or truncated to `digits`
/// places. Signs, exponents and anything but ASCII digits and one `.` are
/// rejected.
pub fn parse_decimal_amount(value: &str, digits: u32) -> Result<u64, UtxoError> {
    let text = value.trim();
    let invalid = |reason: &str| UtxoError::InvalidAmount(format!("{value:?}: {reason}"));

    if text.is_empty() {
        return Err(invalid("empty amount"));
    }
    if text.starts_with('-') {
        return Err(invalid("negative amount"));
    }

    let (whole, fraction) = match text.split_once('.') {
        Some((whole, fraction)) => (whole, fraction),
        None => (text, ""),
    };
    if whole.is_empty() && fraction.is_empty() {
        return Err(invalid("no digits"));
    }
    if !whole.bytes().all(|b| b.is_ascii_digit()) || !fraction.bytes().all(|b| b.is_ascii_digit())
    {
        return Err(invalid("expected plain decimal digits"));
    }

    let width = digits as usize;
    let mut subunits: String = fraction.chars().take(width).collect();
    while subunits.len() < width {
        subunits.push('0');
    }

    let mut combined = String::with_capacity(whole.len() + width);
    combined.push_str(whole);
    combined.push_str(&subunits);

    let combined = combined.trim_start_matches('0');
    if combined.is_empty() {
        return Ok(0);
    }
    combined
        .parse::<u64>()
        .map_err(|_| invalid("amount out of range"))
}
