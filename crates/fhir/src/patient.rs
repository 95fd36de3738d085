//! FHIR `Patient` wire model and translation helpers.
//!
//! Responsibilities:
//! - Define a wire model covering the exchanged subset of the resource
//! - Render a [`PatientRecord`] as a deterministic JSON document
//! - Parse an untrusted document into a [`PatientDraft`], reporting the exact path of
//!   any missing or malformed element
//!
//! Notes:
//! - Unknown elements on inbound documents are ignored; FHIR senders routinely add
//!   `meta`, `text`, extensions and so on
//! - The outbound document carries exactly `id`, `identifier`, `name`, `gender` and
//!   `birthDate`
//! - On import the organisation identifier is read from `identifier[0].value`, the slot
//!   export fills with the patient's own id

use crate::{FhirError, FhirResult};
use infoctor_types::{PatientDraft, PatientRecord};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use uuid::Uuid;

/// Patient resource operations.
///
/// This is a zero-sized type used for namespacing patient-related operations.
/// All methods are associated functions.
pub struct Patient;

impl Patient {
    /// Export a patient record as a FHIR `Patient` document.
    ///
    /// The same record always yields the same document: object keys are ordered and no
    /// time-dependent values are emitted. `gender` is omitted when the record has none.
    ///
    /// # Errors
    ///
    /// Returns [`FhirError::Translation`] if the document cannot be built.
    pub fn export(record: &PatientRecord) -> FhirResult<Value> {
        let wire = record_to_wire(record);
        let document = serde_json::to_value(&wire)
            .map_err(|e| FhirError::Translation(format!("Failed to serialise patient: {e}")))?;

        tracing::debug!(patient_id = %record.patient_id, "exported patient to FHIR");
        Ok(document)
    }

    /// Export a patient record as pretty-printed FHIR JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`FhirError::Translation`] if serialisation fails.
    pub fn render(record: &PatientRecord) -> FhirResult<String> {
        let document = Self::export(record)?;
        serde_json::to_string_pretty(&document)
            .map_err(|e| FhirError::Translation(format!("Failed to render patient: {e}")))
    }

    /// Import a FHIR `Patient` document as a patient draft.
    ///
    /// Required elements are read in this order, and the first one that is missing or
    /// has the wrong type is reported: `name[0].given[0]`, `name[0].family`, `birthDate`,
    /// `gender`, `identifier[0].value`. Elements after the first failure are not looked at.
    ///
    /// An element whose value is JSON `null` counts as missing. This includes `gender`,
    /// so a document with `"gender": null` is rejected rather than imported without one.
    ///
    /// # Errors
    ///
    /// Returns:
    /// - [`FhirError::MissingField`] naming the first absent required element,
    /// - [`FhirError::Malformed`] if an element has the wrong type or `resourceType`
    ///   is present but is not `Patient`,
    /// - [`FhirError::InvalidUuid`] if `identifier[0].value` is not a UUID.
    pub fn import(document: &Value) -> FhirResult<PatientDraft> {
        let root = object(document, ROOT)?;

        if let Some(resource_type) = optional(root, "resourceType") {
            let resource_type: String = parse(resource_type, "resourceType")?;
            if resource_type != "Patient" {
                return Err(FhirError::Malformed {
                    path: "resourceType".into(),
                    reason: format!("expected 'Patient', got '{resource_type}'"),
                });
            }
        }

        let name = object(first(required(root, ROOT, "name")?, "name")?, "name[0]")?;
        let given = first(required(name, "name[0]", "given")?, "name[0].given")?;
        let first_name: String = parse(given, "name[0].given[0]")?;
        let last_name: String = parse(required(name, "name[0]", "family")?, "name[0].family")?;
        let birth_date: String = parse(required(root, ROOT, "birthDate")?, "birthDate")?;
        let gender: String = parse(required(root, ROOT, "gender")?, "gender")?;

        let identifier = object(
            first(required(root, ROOT, "identifier")?, "identifier")?,
            "identifier[0]",
        )?;
        let value: String = parse(
            required(identifier, "identifier[0]", "value")?,
            "identifier[0].value",
        )?;
        let organization_id = Uuid::parse_str(&value).map_err(|source| FhirError::InvalidUuid {
            path: "identifier[0].value".into(),
            source,
        })?;

        let draft = PatientDraft::new(first_name, last_name, birth_date, gender, organization_id);
        tracing::debug!(organization_id = %draft.organization_id, "imported patient from FHIR");
        Ok(draft)
    }

    /// Import a FHIR `Patient` document from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`FhirError::InvalidJson`] if the text is not JSON, otherwise as
    /// [`Patient::import`].
    pub fn import_str(json_text: &str) -> FhirResult<PatientDraft> {
        let document: Value = serde_json::from_str(json_text).map_err(FhirError::InvalidJson)?;
        Self::import(&document)
    }
}

// ============================================================================
// Wire types (internal)
// ============================================================================

/// Wire representation of the exchanged subset of a FHIR `Patient`, as exported.
#[derive(Clone, Debug, Default, Serialize, PartialEq, Eq)]
struct PatientWire {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub identifier: Option<Vec<IdentifierWire>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<Vec<HumanNameWire>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,

    #[serde(rename = "birthDate", skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<String>,
}

#[derive(Clone, Debug, Default, Serialize, PartialEq, Eq)]
struct IdentifierWire {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

#[derive(Clone, Debug, Default, Serialize, PartialEq, Eq)]
struct HumanNameWire {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub family: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub given: Option<Vec<String>>,
}

// ============================================================================
// Helper functions (internal)
// ============================================================================

fn record_to_wire(record: &PatientRecord) -> PatientWire {
    let id = record.patient_id.to_string();

    PatientWire {
        identifier: Some(vec![IdentifierWire {
            value: Some(id.clone()),
        }]),
        id: Some(id),
        name: Some(vec![HumanNameWire {
            family: Some(record.last_name.as_str().to_owned()),
            given: Some(vec![record.first_name.as_str().to_owned()]),
        }]),
        gender: record.gender.clone(),
        birth_date: Some(record.date_of_birth.format("%Y-%m-%d").to_string()),
    }
}

/// Path used in errors about the document itself.
const ROOT: &str = "<root>";

fn child_path(parent: &str, key: &str) -> String {
    if parent == ROOT {
        key.to_owned()
    } else {
        format!("{parent}.{key}")
    }
}

/// Element `key` of `parent`, with `null` treated as absent.
fn optional<'a>(parent: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    parent.get(key).filter(|value| !value.is_null())
}

/// Element `key` of `parent`, which lives at `parent_path`.
fn required<'a>(
    parent: &'a Map<String, Value>,
    parent_path: &str,
    key: &str,
) -> FhirResult<&'a Value> {
    optional(parent, key).ok_or_else(|| FhirError::missing(child_path(parent_path, key)))
}

fn object<'a>(value: &'a Value, path: &str) -> FhirResult<&'a Map<String, Value>> {
    value.as_object().ok_or_else(|| FhirError::Malformed {
        path: path.to_owned(),
        reason: format!("expected an object, got {}", type_name(value)),
    })
}

/// Element 0 of the list at `path`, reporting `path[0]` when the list is empty.
fn first<'a>(value: &'a Value, path: &str) -> FhirResult<&'a Value> {
    let items = value.as_array().ok_or_else(|| FhirError::Malformed {
        path: path.to_owned(),
        reason: format!("expected a list, got {}", type_name(value)),
    })?;

    items
        .first()
        .filter(|item| !item.is_null())
        .ok_or_else(|| FhirError::missing(format!("{path}[0]")))
}

/// Deserialises the element at `path`, extending `path` with any nested location serde
/// reports.
fn parse<T: DeserializeOwned>(value: &Value, path: &str) -> FhirResult<T> {
    serde_path_to_error::deserialize(value).map_err(|err| {
        let nested = err.path().to_string();
        let path = match nested.as_str() {
            "" | "." => path.to_owned(),
            nested => child_path(path, nested),
        };
        FhirError::Malformed {
            path,
            reason: err.into_inner().to_string(),
        }
    })
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use infoctor_types::NonEmptyText;
    use serde_json::json;

    fn sample_record() -> PatientRecord {
        PatientRecord::new(
            Uuid::parse_str("12345678-1234-5678-1234-567812345678").expect("valid uuid"),
            Uuid::parse_str("87654321-8765-4321-8765-432187654321").expect("valid uuid"),
            NonEmptyText::new("John").expect("non-empty"),
            NonEmptyText::new("Doe").expect("non-empty"),
            NaiveDate::from_ymd_opt(1990, 1, 1).expect("valid date"),
        )
        .with_gender("male")
    }

    fn sample_document() -> Value {
        json!({
            "id": "12345678-1234-5678-1234-567812345678",
            "identifier": [{"value": "87654321-8765-4321-8765-432187654321"}],
            "name": [{"family": "Doe", "given": ["John"]}],
            "gender": "male",
            "birthDate": "1990-01-01"
        })
    }

    #[test]
    fn exports_expected_document() {
        let document = Patient::export(&sample_record()).expect("export");

        assert_eq!(
            document,
            json!({
                "id": "12345678-1234-5678-1234-567812345678",
                "identifier": [{"value": "12345678-1234-5678-1234-567812345678"}],
                "name": [{"family": "Doe", "given": ["John"]}],
                "gender": "male",
                "birthDate": "1990-01-01"
            })
        );
    }

    #[test]
    fn export_omits_contact_details_and_absent_gender() {
        let mut record = sample_record();
        record.gender = None;
        record.email = Some("john.doe@example.com".into());
        record.phone = Some("1234567890".into());

        let document = Patient::export(&record).expect("export");
        let object = document.as_object().expect("object");

        let mut keys: Vec<&str> = object.keys().map(String::as_str).collect();
        keys.sort_unstable();
        assert_eq!(keys, vec!["birthDate", "id", "identifier", "name"]);
    }

    #[test]
    fn export_is_deterministic() {
        let record = sample_record();
        let first = Patient::render(&record).expect("render");
        let second = Patient::render(&record).expect("render");
        assert_eq!(first, second);
    }

    #[test]
    fn imports_sample_document() {
        let draft = Patient::import(&sample_document()).expect("import");

        assert_eq!(draft.first_name, "John");
        assert_eq!(draft.last_name, "Doe");
        assert_eq!(draft.gender, "male");
        assert_eq!(draft.date_of_birth, "1990-01-01");
        assert_eq!(
            draft.organization_id,
            Uuid::parse_str("87654321-8765-4321-8765-432187654321").expect("valid uuid")
        );
    }

    #[test]
    fn round_trip_moves_patient_id_into_organisation_slot() {
        let record = sample_record();
        let draft = Patient::import(&Patient::export(&record).expect("export")).expect("import");

        assert_eq!(draft.first_name, record.first_name.as_str());
        assert_eq!(draft.last_name, record.last_name.as_str());
        assert_eq!(draft.gender, "male");
        assert_eq!(draft.date_of_birth, "1990-01-01");
        assert_eq!(draft.organization_id, record.patient_id);
    }

    #[test]
    fn reports_missing_given_name() {
        let err = Patient::import(&json!({"name": [{"family": "Doe"}]}))
            .expect_err("given is required");

        match err {
            FhirError::MissingField { path } => assert_eq!(path, "name[0].given"),
            other => panic!("expected MissingField, got {other:?}"),
        }
    }

    #[test]
    fn reports_required_paths_in_access_order() {
        let cases = [
            (json!({}), "name"),
            (json!({"name": []}), "name[0]"),
            (json!({"name": [{"given": [], "family": "Doe"}]}), "name[0].given[0]"),
            (json!({"name": [{"given": ["John"]}]}), "name[0].family"),
            (
                json!({"name": [{"given": ["John"], "family": "Doe"}], "gender": "male"}),
                "birthDate",
            ),
            (
                json!({"name": [{"given": ["John"], "family": "Doe"}], "birthDate": "1990-01-01"}),
                "gender",
            ),
            (
                json!({
                    "name": [{"given": ["John"], "family": "Doe"}],
                    "birthDate": "1990-01-01",
                    "gender": "male",
                    "identifier": [{}]
                }),
                "identifier[0].value",
            ),
        ];

        for (document, expected) in cases {
            match Patient::import(&document) {
                Err(FhirError::MissingField { path }) => assert_eq!(path, expected),
                other => panic!("expected MissingField({expected}), got {other:?}"),
            }
        }
    }

    #[test]
    fn missing_earlier_element_wins_over_later_type_error() {
        let document = json!({
            "name": [{"family": "Doe"}],
            "birthDate": 19900101,
            "gender": "male",
            "identifier": [{"value": "87654321-8765-4321-8765-432187654321"}]
        });

        match Patient::import(&document) {
            Err(FhirError::MissingField { path }) => assert_eq!(path, "name[0].given"),
            other => panic!("expected MissingField, got {other:?}"),
        }
    }

    #[test]
    fn reports_wrong_type_at_element_path() {
        let mut document = sample_document();
        document["birthDate"] = json!(19900101);

        match Patient::import(&document) {
            Err(FhirError::Malformed { path, reason }) => {
                assert_eq!(path, "birthDate");
                assert!(reason.contains("invalid type"));
            }
            other => panic!("expected Malformed, got {other:?}"),
        }

        let mut document = sample_document();
        document["name"][0]["given"] = json!([7]);

        match Patient::import(&document) {
            Err(FhirError::Malformed { path, .. }) => assert_eq!(path, "name[0].given[0]"),
            other => panic!("expected Malformed, got {other:?}"),
        }
    }

    #[test]
    fn null_counts_as_missing() {
        let mut document = sample_document();
        document["gender"] = Value::Null;

        match Patient::import(&document) {
            Err(FhirError::MissingField { path }) => assert_eq!(path, "gender"),
            other => panic!("expected MissingField, got {other:?}"),
        }
    }

    #[test]
    fn rejects_non_uuid_identifier() {
        let mut document = sample_document();
        document["identifier"][0]["value"] = json!("not-a-uuid");

        match Patient::import(&document) {
            Err(FhirError::InvalidUuid { path, .. }) => assert_eq!(path, "identifier[0].value"),
            other => panic!("expected InvalidUuid, got {other:?}"),
        }
    }

    #[test]
    fn rejects_name_that_is_not_a_list() {
        let mut document = sample_document();
        document["name"] = json!({"family": "Doe", "given": ["John"]});

        match Patient::import(&document) {
            Err(FhirError::Malformed { path, .. }) => assert_eq!(path, "name"),
            other => panic!("expected Malformed, got {other:?}"),
        }
    }

    #[test]
    fn rejects_non_object_document() {
        match Patient::import(&json!(42)) {
            Err(FhirError::Malformed { path, .. }) => assert_eq!(path, "<root>"),
            other => panic!("expected Malformed, got {other:?}"),
        }
    }

    #[test]
    fn rejects_other_resource_types() {
        let mut document = sample_document();
        document["resourceType"] = json!("Practitioner");

        match Patient::import(&document) {
            Err(FhirError::Malformed { path, reason }) => {
                assert_eq!(path, "resourceType");
                assert!(reason.contains("Practitioner"));
            }
            other => panic!("expected Malformed, got {other:?}"),
        }
    }

    #[test]
    fn ignores_unknown_elements() {
        let mut document = sample_document();
        document["resourceType"] = json!("Patient");
        document["meta"] = json!({"lastUpdated": "2026-01-23T13:58:04Z"});
        document["active"] = json!(true);

        assert!(Patient::import(&document).is_ok());
    }

    #[test]
    fn import_str_reports_invalid_json() {
        assert!(matches!(
            Patient::import_str("{not json"),
            Err(FhirError::InvalidJson(_))
        ));

        let draft = Patient::import_str(&sample_document().to_string()).expect("import");
        assert_eq!(draft.last_name, "Doe");
    }
}
