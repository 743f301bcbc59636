use rust_decimal::{Decimal, RoundingStrategy};
use thiserror::Error;

/// Error returned when a string cannot be parsed as a [`Decimal`].
#[derive(Debug, Error)]
#[error("invalid decimal '{input}': {source}")]
pub struct ParseDecimalError {
    input: String,
    #[source]
    source: rust_decimal::Error,
}

/// Normalizes input for decimal parsing: trims whitespace and removes commas (thousands separator).
fn normalize_decimal_input(s: &str) -> String {
    s.trim().replace(',', "")
}

/// Parses a string into a [`Decimal`].
///
/// Handles comma as thousands separator (e.g. `"1,234.56"`).
/// Empty or whitespace-only input is treated as 0.
pub fn parse_decimal(s: &str) -> Result<Decimal, ParseDecimalError> {
    let normalized = normalize_decimal_input(s);
    if normalized.is_empty() {
        return Ok(Decimal::ZERO);
    }
    normalized.parse().map_err(|e| ParseDecimalError {
        input: s.to_string(),
        source: e,
    })
}

/// Parses an optional cell: `None` for empty input, an error for garbage.
pub fn parse_optional_decimal(s: &str) -> Result<Option<Decimal>, ParseDecimalError> {
    if normalize_decimal_input(s).is_empty() {
        Ok(None)
    } else {
        parse_decimal(s).map(Some)
    }
}

/// Formats a monetary amount with exactly two decimal places.
pub fn format_money(amount: Decimal) -> String {
    let mut rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);
    rounded.to_string()
}

/// Formats a percentage without trailing zeros, e.g. `13%` or `14.975%`.
pub fn format_percent(rate: Decimal) -> String {
    format!("{}%", rate.normalize())
}

/// Formats an optional value for display, using "-" when `None`.
pub fn opt_display<T: ToString>(value: Option<T>) -> String {
    value
        .map(|v| v.to_string())
        .unwrap_or_else(|| "-".to_string())
}
