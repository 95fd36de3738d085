//! Interoperability service.
//!
//! This module is the single entry point for FHIR and HL7 conversion and for MLLP
//! delivery. Callers (routing, CLI) are expected to have authorised the request and
//! loaded any records before calling in.

use crate::config::CoreConfig;
use crate::error::{InteropError, InteropResult};
use chrono::NaiveDate;
use infoctor_types::{PatientDraft, PatientRecord};
use mllp::MllpClient;
use serde_json::Value;
use std::sync::Arc;

/// Conversion and delivery operations - no storage or API concerns.
///
/// Holds only immutable configuration, so one instance can be cloned into every handler
/// and called concurrently.
#[derive(Clone, Debug)]
pub struct InteropService {
    cfg: Arc<CoreConfig>,
    client: MllpClient,
}

impl InteropService {
    /// Creates a new instance of InteropService.
    pub fn new(cfg: Arc<CoreConfig>) -> Self {
        Self {
            cfg,
            client: MllpClient::new(),
        }
    }

    /// Uses `client` for MLLP delivery instead of the default.
    pub fn with_client(mut self, client: MllpClient) -> Self {
        self.client = client;
        self
    }

    /// Export a patient record as a FHIR `Patient` document.
    ///
    /// # Errors
    ///
    /// Returns [`InteropError::Conversion`] if the document cannot be built.
    pub fn export_fhir(&self, record: &PatientRecord) -> InteropResult<Value> {
        fhir::Patient::export(record)
            .map_err(InteropError::from)
            .inspect_err(|e| log_failure("export_fhir", e))
    }

    /// Import a FHIR `Patient` document as a draft record.
    ///
    /// The draft's `organization_id` is read from `identifier[0].value`.
    ///
    /// # Errors
    ///
    /// Returns [`InteropError::MissingField`] naming the first absent required element,
    /// or [`InteropError::MalformedPayload`] for anything else that does not fit.
    pub fn import_fhir(&self, document: &Value) -> InteropResult<PatientDraft> {
        fhir::Patient::import(document)
            .map_err(InteropError::from)
            .inspect_err(|e| log_failure("import_fhir", e))
    }

    /// As [`InteropService::import_fhir`], starting from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`InteropError::MalformedPayload`] if the text is not JSON.
    pub fn import_fhir_str(&self, json_text: &str) -> InteropResult<PatientDraft> {
        fhir::Patient::import_str(json_text)
            .map_err(InteropError::from)
            .inspect_err(|e| log_failure("import_fhir", e))
    }

    /// Export a patient record as an `ADT^A01` message using the configured header.
    ///
    /// # Errors
    ///
    /// Encoding itself cannot fail; the `Result` keeps the operation uniform with the
    /// other exports.
    pub fn export_hl7(&self, record: &PatientRecord) -> InteropResult<String> {
        Ok(hl7::Patient::export(record, self.cfg.message_header()))
    }

    /// Import the `PID` segment of an HL7 message as a draft record.
    ///
    /// The draft's `organization_id` is read from `PID-3.1`.
    ///
    /// # Errors
    ///
    /// Returns [`InteropError::MissingField`] if `PID` or a required position is absent,
    /// or [`InteropError::MalformedPayload`] for anything else that does not fit.
    pub fn import_hl7(&self, message: &str) -> InteropResult<PatientDraft> {
        hl7::Patient::import(message)
            .map_err(InteropError::from)
            .inspect_err(|e| log_failure("import_hl7", e))
    }

    /// Encode `record` as HL7 and deliver it to `host:port` over MLLP.
    ///
    /// # Returns
    ///
    /// The receiver's acknowledgment, unframed.
    ///
    /// # Errors
    ///
    /// Returns [`InteropError::Transport`] if delivery fails. Nothing is retried.
    pub async fn send_hl7(
        &self,
        host: &str,
        port: u16,
        record: &PatientRecord,
    ) -> InteropResult<String> {
        let message = self.export_hl7(record)?;
        self.send_message(host, port, &message).await
    }

    /// Deliver an already encoded HL7 message to `host:port` over MLLP.
    ///
    /// # Errors
    ///
    /// Returns [`InteropError::Transport`] if delivery fails. Nothing is retried.
    pub async fn send_message(&self, host: &str, port: u16, message: &str) -> InteropResult<String> {
        let ack = self
            .client
            .send(host, port, message)
            .await
            .map_err(InteropError::from)
            .inspect_err(|e| log_failure("send_hl7", e))?;

        tracing::info!(%host, port, "HL7 message delivered");
        Ok(ack)
    }

    /// Validate a draft's raw date of birth as `YYYY-MM-DD`.
    ///
    /// Imports keep the date as received; callers that persist drafts can use this to
    /// reject bad dates with the same error taxonomy.
    ///
    /// # Errors
    ///
    /// Returns [`InteropError::MalformedPayload`] if the date does not parse.
    pub fn draft_birth_date(&self, draft: &PatientDraft) -> InteropResult<NaiveDate> {
        draft.birth_date().map_err(|source| {
            InteropError::malformed(
                format!("date_of_birth '{}' is not YYYY-MM-DD", draft.date_of_birth),
                source,
            )
        })
    }
}

fn log_failure(operation: &'static str, err: &InteropError) {
    tracing::warn!(operation, kind = ?err.kind(), error = %err, "interoperability call failed");
}
