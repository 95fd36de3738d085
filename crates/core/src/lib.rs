//! # Infoctor Core
//!
//! Interoperability logic for the Infoctor EHR.
//!
//! This crate sits between the EHR's patient records and outside systems:
//! - FHIR `Patient` export and import
//! - HL7v2 `ADT^A01` export and import
//! - MLLP delivery of HL7 messages to a receiving system
//!
//! Everything is reached through [`InteropService`], which folds codec and transport
//! failures into the four [`ErrorKind`]s callers report on.
//!
//! **No API concerns**: Authentication, HTTP servers, or record storage belong in the
//! calling layer.

pub mod config;
pub mod constants;
mod error;
pub mod interop;
pub mod validation;

pub use config::{mllp_endpoint_from_lookup, ConfigError, CoreConfig, MllpEndpoint};
pub use error::{ErrorKind, InteropError, InteropResult};
pub use interop::InteropService;

pub use hl7::MessageHeader;
pub use infoctor_types::{NonEmptyText, PatientDraft, PatientRecord};
