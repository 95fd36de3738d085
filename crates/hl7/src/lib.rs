//! HL7v2 boundary support for Infoctor.
//!
//! This crate provides:
//! - a small pipe-delimited message model ([`Hl7Message`], [`Segment`])
//! - the fixed `ADT^A01` patient encoding used by the EHR ([`Patient`])
//! - acknowledgment (`MSA`) parsing for replies from receiving systems
//!
//! It is deliberately not a general-purpose HL7 library: only `MSH`, `PID` and `MSA`
//! are interpreted.

pub mod ack;
pub mod message;
pub mod patient;

pub use ack::{AckCode, Acknowledgment};
pub use message::{Delimiters, Hl7Message, Segment};
pub use patient::{MessageHeader, Patient};

pub use infoctor_types::{PatientDraft, PatientRecord};

/// HL7 segment separator.
pub const SEGMENT_SEPARATOR: char = '\r';

/// Errors returned by the `hl7` boundary crate.
#[derive(Debug, thiserror::Error)]
pub enum Hl7Error {
    /// A required segment, field or component is absent.
    ///
    /// `path` uses HL7 notation: `PID`, `PID-8`, `PID-5.2`.
    #[error("missing required field: {path}")]
    MissingField { path: String },

    #[error("malformed HL7 message: {0}")]
    Malformed(String),

    #[error("invalid UUID at {path}: {source}")]
    InvalidUuid {
        path: String,
        #[source]
        source: uuid::Error,
    },
}

impl Hl7Error {
    pub(crate) fn missing(path: impl Into<String>) -> Self {
        Self::MissingField { path: path.into() }
    }
}

/// Type alias for Results that can fail with an [`Hl7Error`].
pub type Hl7Result<T> = Result<T, Hl7Error>;
