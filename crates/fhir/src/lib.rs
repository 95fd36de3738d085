//! FHIR boundary support for Infoctor.
//!
//! This crate converts between the internal [`PatientRecord`] and a FHIR R4 `Patient`
//! resource carried as a JSON document.
//!
//! This crate focuses on:
//! - the fixed subset of `Patient` the EHR exchanges (id, identifier, name, gender, birthDate)
//! - strict, path-aware parsing of untrusted inbound documents
//! - translation between domain records and the wire model
//!
//! Only the `Patient` resource is modelled.

pub mod patient;

pub use patient::Patient;

pub use infoctor_types::{PatientDraft, PatientRecord};

/// Errors returned by the `fhir` boundary crate.
#[derive(Debug, thiserror::Error)]
pub enum FhirError {
    /// A required element is absent (or `null`). `path` names it, e.g. `name[0].given`.
    #[error("missing required field: {path}")]
    MissingField { path: String },

    /// An element is present but has the wrong shape or type.
    #[error("malformed FHIR payload at {path}: {reason}")]
    Malformed { path: String, reason: String },

    #[error("invalid UUID at {path}: {source}")]
    InvalidUuid {
        path: String,
        #[source]
        source: uuid::Error,
    },

    #[error("invalid JSON: {0}")]
    InvalidJson(#[source] serde_json::Error),

    /// Building the outbound document failed.
    #[error("translation error: {0}")]
    Translation(String),
}

impl FhirError {
    pub(crate) fn missing(path: impl Into<String>) -> Self {
        Self::MissingField { path: path.into() }
    }
}

/// Type alias for Results that can fail with a [`FhirError`].
pub type FhirResult<T> = Result<T, FhirError>;
