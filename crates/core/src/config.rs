//! Core runtime configuration.
//!
//! This module defines configuration that should be resolved once at process startup and then
//! passed into core services. Request handling never reads process-wide environment variables;
//! the resolvers here take a lookup function so the binary can pass `std::env::var` and tests
//! can pass a map.

use crate::constants::{
    DEFAULT_MLLP_PORT, MLLP_HOST_ENV, MLLP_PORT_ENV, RECEIVING_APPLICATION_ENV,
    RECEIVING_FACILITY_ENV, SENDING_APPLICATION_ENV, SENDING_FACILITY_ENV,
};
use crate::validation::validate_header_value;
use hl7::MessageHeader;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {reason}")]
    InvalidValue { key: String, reason: String },
}

/// Core configuration resolved at startup.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CoreConfig {
    message_header: MessageHeader,
}

impl CoreConfig {
    /// Create a new `CoreConfig` with the given `MSH-3` to `MSH-6` values.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] if any value is blank, too long or contains
    /// HL7 delimiters.
    pub fn new(
        sending_application: String,
        sending_facility: String,
        receiving_application: String,
        receiving_facility: String,
    ) -> Result<Self, ConfigError> {
        validate_header_value(SENDING_APPLICATION_ENV, &sending_application)?;
        validate_header_value(SENDING_FACILITY_ENV, &sending_facility)?;
        validate_header_value(RECEIVING_APPLICATION_ENV, &receiving_application)?;
        validate_header_value(RECEIVING_FACILITY_ENV, &receiving_facility)?;

        Ok(Self {
            message_header: MessageHeader {
                sending_application,
                sending_facility,
                receiving_application,
                receiving_facility,
                ..MessageHeader::default()
            },
        })
    }

    /// Resolve configuration from `lookup`, falling back to the fixed header defaults for
    /// unset or empty keys.
    ///
    /// # Errors
    ///
    /// As [`CoreConfig::new`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = MessageHeader::default();
        let value = |key: &str, default: String| {
            lookup(key)
                .map(|v| v.trim().to_owned())
                .filter(|v| !v.is_empty())
                .unwrap_or(default)
        };

        Self::new(
            value(SENDING_APPLICATION_ENV, defaults.sending_application),
            value(SENDING_FACILITY_ENV, defaults.sending_facility),
            value(RECEIVING_APPLICATION_ENV, defaults.receiving_application),
            value(RECEIVING_FACILITY_ENV, defaults.receiving_facility),
        )
    }

    /// Header written to every exported HL7 message.
    pub fn message_header(&self) -> &MessageHeader {
        &self.message_header
    }
}

/// Where outbound HL7 messages are delivered.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MllpEndpoint {
    pub host: String,
    pub port: u16,
}

/// Resolve the default MLLP endpoint from `lookup`.
///
/// Returns `Ok(None)` when no host is configured. The port defaults to 2575.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidValue`] if the port is not a non-zero `u16`.
pub fn mllp_endpoint_from_lookup<F>(lookup: F) -> Result<Option<MllpEndpoint>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(host) = lookup(MLLP_HOST_ENV)
        .map(|h| h.trim().to_owned())
        .filter(|h| !h.is_empty())
    else {
        return Ok(None);
    };

    let port = match lookup(MLLP_PORT_ENV).map(|p| p.trim().to_owned()) {
        None => DEFAULT_MLLP_PORT,
        Some(p) if p.is_empty() => DEFAULT_MLLP_PORT,
        Some(p) => p
            .parse::<u16>()
            .ok()
            .filter(|port| *port != 0)
            .ok_or_else(|| ConfigError::InvalidValue {
                key: MLLP_PORT_ENV.to_owned(),
                reason: format!("'{p}' is not a valid port"),
            })?,
    };

    Ok(Some(MllpEndpoint { host, port }))
}
