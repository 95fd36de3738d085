//! Input validation utilities.
//!
//! Values checked here are resolved once at startup and then written verbatim into
//! every outbound message header.

use crate::config::ConfigError;

/// Longest value accepted for an `MSH` header field.
const MAX_HEADER_VALUE_LEN: usize = 180;

/// Validates a value destined for an `MSH` header field.
///
/// Applies guardrails so that a misconfigured value cannot produce a header that
/// receivers would reject:
/// - Rejects empty or whitespace-only strings
/// - Bounds the length
/// - Restricts to printable ASCII without HL7 delimiter characters (`|^~\&`)
///
/// # Errors
///
/// Returns [`ConfigError::InvalidValue`] naming `key` if the value is invalid.
pub fn validate_header_value(key: &str, value: &str) -> Result<(), ConfigError> {
    let invalid = |reason: &str| ConfigError::InvalidValue {
        key: key.to_owned(),
        reason: reason.to_owned(),
    };

    if value.trim().is_empty() {
        return Err(invalid("value cannot be empty"));
    }

    if value.len() > MAX_HEADER_VALUE_LEN {
        return Err(invalid(&format!(
            "value exceeds maximum length of {MAX_HEADER_VALUE_LEN} characters"
        )));
    }

    let ok = value
        .bytes()
        .all(|b| b.is_ascii_graphic() || b == b' ')
        && !value.contains(['|', '^', '~', '\\', '&']);

    if !ok {
        return Err(invalid(
            "value must be printable ASCII without HL7 delimiters (|^~\\&)",
        ));
    }

    Ok(())
}
