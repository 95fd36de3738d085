//! Patient record carriers.

use crate::NonEmptyText;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle tag given to records that do not state one.
pub const DEFAULT_PATIENT_STATUS: &str = "active";

fn default_status() -> String {
    DEFAULT_PATIENT_STATUS.to_owned()
}

/// Canonical internal patient record, as stored by the persistence layer.
///
/// The interoperability codecs only ever read from a record; they never mutate it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientRecord {
    /// Unique identifier, immutable once assigned.
    pub patient_id: Uuid,

    /// Owning tenant.
    pub organization_id: Uuid,

    pub first_name: NonEmptyText,

    pub last_name: NonEmptyText,

    pub date_of_birth: NaiveDate,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,

    /// Lifecycle tag, `"active"` unless stated otherwise.
    #[serde(default = "default_status")]
    pub status: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl PatientRecord {
    /// Creates a record with the required fields set and every optional field empty.
    pub fn new(
        patient_id: Uuid,
        organization_id: Uuid,
        first_name: NonEmptyText,
        last_name: NonEmptyText,
        date_of_birth: NaiveDate,
    ) -> Self {
        Self {
            patient_id,
            organization_id,
            first_name,
            last_name,
            date_of_birth,
            gender: None,
            email: None,
            phone: None,
            address: None,
            status: default_status(),
            created_at: None,
            updated_at: None,
        }
    }

    /// Sets the gender code.
    pub fn with_gender(mut self, gender: impl Into<String>) -> Self {
        self.gender = Some(gender.into());
        self
    }
}

/// A patient extracted from an external payload, not yet assigned a `patient_id`.
///
/// `date_of_birth` and `gender` are carried exactly as they appeared in the payload.
/// Validation is left to whoever persists the draft; see [`PatientDraft::birth_date`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientDraft {
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: String,
    pub gender: String,

    /// Read from the payload's patient identifier slot.
    ///
    /// Both codecs take the tenant identifier from the place the export writes the
    /// patient's own identifier, so a round trip turns `patient_id` into
    /// `organization_id`. Kept for compatibility with existing senders.
    pub organization_id: Uuid,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,

    #[serde(default = "default_status")]
    pub status: String,
}

impl PatientDraft {
    /// Creates a draft with no contact details and the default status.
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        date_of_birth: impl Into<String>,
        gender: impl Into<String>,
        organization_id: Uuid,
    ) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            date_of_birth: date_of_birth.into(),
            gender: gender.into(),
            organization_id,
            email: None,
            phone: None,
            address: None,
            status: default_status(),
        }
    }

    /// Parses the raw date of birth as an ISO-8601 calendar date (`YYYY-MM-DD`).
    pub fn birth_date(&self) -> Result<NaiveDate, chrono::ParseError> {
        NaiveDate::parse_from_str(&self.date_of_birth, "%Y-%m-%d")
    }
}
