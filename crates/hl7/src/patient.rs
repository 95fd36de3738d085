//! Fixed `ADT^A01` patient encoding.
//!
//! Export writes exactly two segments:
//!
//! ```text
//! MSH|^~\&|INFOCTOR|HOSPITAL|HL7RECV|ANYWHERE|<timestamp>||ADT^A01|<msg-id>|P|2.3
//! PID|||<patient_id>||<last_name>^<first_name>||<date_of_birth>|<gender>
//! ```
//!
//! Import reads `PID` only. The organisation identifier comes from `PID-3.1`, which is
//! where export writes the patient's own identifier.

use crate::message::{Delimiters, Hl7Message, Segment};
use crate::{Hl7Error, Hl7Result};
use infoctor_types::{PatientDraft, PatientRecord};
use uuid::Uuid;

/// Message type written to `MSH-9`.
pub const MESSAGE_TYPE: [&str; 2] = ["ADT", "A01"];

/// Values written to the `MSH` segment.
///
/// The defaults are fixed so that exporting the same record twice yields the same text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MessageHeader {
    pub sending_application: String,
    pub sending_facility: String,
    pub receiving_application: String,
    pub receiving_facility: String,
    /// `MSH-7`, `YYYYMMDDHHMMSS`.
    pub timestamp: String,
    /// `MSH-10`.
    pub control_id: String,
    /// `MSH-11`.
    pub processing_id: String,
    /// `MSH-12`.
    pub version: String,
}

impl Default for MessageHeader {
    fn default() -> Self {
        Self {
            sending_application: "INFOCTOR".into(),
            sending_facility: "HOSPITAL".into(),
            receiving_application: "HL7RECV".into(),
            receiving_facility: "ANYWHERE".into(),
            timestamp: "20230101000000".into(),
            control_id: "MSG00001".into(),
            processing_id: "P".into(),
            version: "2.3".into(),
        }
    }
}

impl MessageHeader {
    /// Builds the `MSH` segment for `message_type`.
    pub(crate) fn to_segment(&self, delimiters: Delimiters, message_type: &[&str]) -> Segment {
        let mut msh = Segment::header(delimiters);
        msh.set_value(3, &self.sending_application)
            .set_value(4, &self.sending_facility)
            .set_value(5, &self.receiving_application)
            .set_value(6, &self.receiving_facility)
            .set_value(7, &self.timestamp)
            .set_components(9, message_type)
            .set_value(10, &self.control_id)
            .set_value(11, &self.processing_id)
            .set_value(12, &self.version);
        msh
    }
}

/// Patient message operations.
///
/// This is a zero-sized type used for namespacing patient-related operations.
pub struct Patient;

impl Patient {
    /// Encode a patient record as an `ADT^A01` message.
    ///
    /// Segments are separated by `\r`; the message has no trailing separator. An absent
    /// gender leaves `PID-8` empty.
    pub fn export(record: &PatientRecord, header: &MessageHeader) -> String {
        let delimiters = Delimiters::default();
        let msh = header.to_segment(delimiters, &MESSAGE_TYPE);

        let mut pid = Segment::new("PID", delimiters);
        pid.set_value(3, &record.patient_id.to_string())
            .set_components(5, &[record.last_name.as_str(), record.first_name.as_str()])
            .set_value(7, &record.date_of_birth.to_string())
            .set_value(8, record.gender.as_deref().unwrap_or_default());

        let message = Hl7Message::from_segments(delimiters, vec![msh, pid]).to_string();
        tracing::debug!(patient_id = %record.patient_id, "exported patient to HL7");
        message
    }

    /// Decode the `PID` segment of a message as a patient draft.
    ///
    /// Fields are checked in the order `PID-3.1`, `PID-5.1`, `PID-5.2`, `PID-7`, `PID-8`.
    /// A field that is present but empty is returned as an empty string.
    ///
    /// # Errors
    ///
    /// Returns:
    /// - [`Hl7Error::Malformed`] if the text is not a parseable message,
    /// - [`Hl7Error::MissingField`] if there is no `PID` segment or a required position
    ///   is beyond the end of the segment,
    /// - [`Hl7Error::InvalidUuid`] if `PID-3.1` is not a UUID.
    pub fn import(text: &str) -> Hl7Result<PatientDraft> {
        let message = Hl7Message::parse(text)?;
        let pid = message
            .segment("PID")
            .ok_or_else(|| Hl7Error::missing("PID"))?;

        let identifier = pid
            .component(3, 1)
            .ok_or_else(|| Hl7Error::missing("PID-3.1"))?;
        let last_name = pid
            .component(5, 1)
            .ok_or_else(|| Hl7Error::missing("PID-5.1"))?;
        let first_name = pid
            .component(5, 2)
            .ok_or_else(|| Hl7Error::missing("PID-5.2"))?;
        let date_of_birth = pid.value(7).ok_or_else(|| Hl7Error::missing("PID-7"))?;
        let gender = pid.value(8).ok_or_else(|| Hl7Error::missing("PID-8"))?;

        let organization_id =
            Uuid::parse_str(&identifier).map_err(|source| Hl7Error::InvalidUuid {
                path: "PID-3.1".into(),
                source,
            })?;

        tracing::debug!(%organization_id, "imported patient from HL7");
        Ok(PatientDraft::new(
            first_name,
            last_name,
            date_of_birth,
            gender,
            organization_id,
        ))
    }
}
