//! Parsing of typed input.

use std::str::FromStr;

use rust_decimal::Decimal;
use tracing::debug;
use tripbudget_shared::NonNumericInput;

use super::error::EditorError;

/// Reads a number from an input field.
///
/// Accepts a leading `$`, a trailing `%`, and `,` or `_` digit separators.
/// Blank input is zero. Anything else that does not parse is handled per
/// `policy`.
///
/// # Errors
///
/// Returns `EditorError::InvalidNumber` under [`NonNumericInput::Reject`].
pub fn parse_input(raw: &str, policy: NonNumericInput) -> Result<Decimal, EditorError> {
    let cleaned: String = raw
        .trim()
        .trim_start_matches('$')
        .trim_end_matches('%')
        .chars()
        .filter(|c| *c != ',' && *c != '_')
        .collect();
    let cleaned = cleaned.trim();

    if cleaned.is_empty() {
        return Ok(Decimal::ZERO);
    }

    match Decimal::from_str(cleaned).or_else(|_| Decimal::from_scientific(cleaned)) {
        Ok(value) => Ok(value),
        Err(_) => match policy {
            NonNumericInput::Reject => Err(EditorError::InvalidNumber(raw.to_string())),
            NonNumericInput::Zero => {
                debug!(input = raw, "Non-numeric input treated as zero");
                Ok(Decimal::ZERO)
            }
        },
    }
}
