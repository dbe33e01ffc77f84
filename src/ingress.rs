// letter-rendering-service/src/ingress.rs

//! Typed parsing boundary for records handed over by the portal backend.
//!
//! Stored records arrive as JSON objects or as JSON-encoded strings, and some
//! columns were encoded twice. Everything here degrades to an empty default
//! instead of failing, so a bad row never stops a letter from rendering.

use crate::models::{FieldDefinition, FieldValue, LetterType, OfficeConfig, Request, SubmittedFields};
use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::collections::HashSet;
use tracing::warn;

/// Layers of string encoding peeled off before giving up.
const MAX_ENCODING_DEPTH: usize = 3;

fn peel_encoding(raw: &Value) -> Result<Value, serde_json::Error> {
    let mut current = raw.clone();
    for _ in 0..MAX_ENCODING_DEPTH {
        match current {
            Value::String(encoded) => current = serde_json::from_str(&encoded)?,
            decoded => return Ok(decoded),
        }
    }
    Ok(current)
}

/// Object behind `raw`; empty when absent or malformed.
pub fn safe_parse_object(raw: &Value, what: &str) -> Map<String, Value> {
    match peel_encoding(raw) {
        Ok(Value::Object(map)) => map,
        Ok(Value::Null) => Map::new(),
        Ok(other) => {
            warn!(record = what, found = %type_name(&other), "Expected a JSON object, using {{}}");
            Map::new()
        }
        Err(e) => {
            warn!(record = what, error = %e, "Malformed stored JSON, using {{}}");
            Map::new()
        }
    }
}

/// Array behind `raw`; empty when absent or malformed.
pub fn safe_parse_list(raw: &Value, what: &str) -> Vec<Value> {
    match peel_encoding(raw) {
        Ok(Value::Array(items)) => items,
        Ok(Value::Null) => Vec::new(),
        Ok(other) => {
            warn!(record = what, found = %type_name(&other), "Expected a JSON array, using []");
            Vec::new()
        }
        Err(e) => {
            warn!(record = what, error = %e, "Malformed stored JSON, using []");
            Vec::new()
        }
    }
}

/// Submitted field values of a request ("data surat").
///
/// Parses when given a string, passes objects through, and yields an empty
/// mapping for anything else.
pub fn safe_parse_data_surat(raw: &Value) -> SubmittedFields {
    safe_parse_object(raw, "submitted_fields")
        .into_iter()
        .filter_map(|(key, value)| field_value(value).map(|value| (key, value)))
        .collect()
}

fn field_value(value: Value) -> Option<FieldValue> {
    match value {
        Value::Null => None,
        Value::Bool(flag) => Some(FieldValue::Flag(flag)),
        Value::Number(number) => Some(FieldValue::Number(number)),
        Value::String(text) => Some(FieldValue::Text(text)),
        Value::Array(items) => {
            let joined = items
                .into_iter()
                .filter_map(field_value)
                .map(|item| item.to_string())
                .collect::<Vec<_>>()
                .join(", ");
            Some(FieldValue::Text(joined))
        }
        Value::Object(map) => Some(FieldValue::Text(Value::Object(map).to_string())),
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Field access over a decoded record. Each getter accepts the camelCase
/// name first and its snake_case spelling second.
struct StoredRecord {
    entity: &'static str,
    map: Map<String, Value>,
}

impl StoredRecord {
    fn new(raw: &Value, entity: &'static str) -> Self {
        Self {
            entity,
            map: safe_parse_object(raw, entity),
        }
    }

    fn get(&self, keys: &[&str]) -> Option<&Value> {
        keys.iter()
            .find_map(|key| self.map.get(*key))
            .filter(|value| !value.is_null())
    }

    fn text(&self, keys: &[&str]) -> String {
        match self.get(keys) {
            Some(Value::String(text)) => text.clone(),
            Some(Value::Number(number)) => number.to_string(),
            Some(Value::Bool(flag)) => flag.to_string(),
            _ => String::new(),
        }
    }

    fn optional_text(&self, keys: &[&str]) -> Option<String> {
        Some(self.text(keys)).filter(|text| !text.trim().is_empty())
    }

    fn flag(&self, keys: &[&str]) -> bool {
        match self.get(keys) {
            Some(Value::Bool(flag)) => *flag,
            Some(Value::Number(number)) => number.as_f64().map_or(false, |n| n != 0.0),
            Some(Value::String(text)) => matches!(text.trim(), "true" | "1"),
            _ => false,
        }
    }

    fn typed<T: DeserializeOwned + Default>(&self, keys: &[&str]) -> T {
        let Some(value) = self.get(keys) else {
            return T::default();
        };
        match serde_json::from_value(value.clone()) {
            Ok(typed) => typed,
            Err(e) => {
                warn!(record = self.entity, field = keys[0], error = %e, "Unreadable value, using default");
                T::default()
            }
        }
    }

    /// Elements of a list column; unreadable elements are dropped.
    fn list<T: DeserializeOwned>(&self, keys: &[&str]) -> Vec<T> {
        let raw = self.get(keys).cloned().unwrap_or(Value::Null);
        safe_parse_list(&raw, self.entity)
            .into_iter()
            .filter_map(|item| match serde_json::from_value(peel_encoding(&item).ok()?) {
                Ok(typed) => Some(typed),
                Err(e) => {
                    warn!(record = self.entity, field = keys[0], error = %e, "Dropping unreadable list entry");
                    None
                }
            })
            .collect()
    }

    fn date(&self, keys: &[&str]) -> Option<NaiveDate> {
        let text = self.text(keys);
        let day = text.get(..10).unwrap_or(text.as_str());
        if day.is_empty() {
            return None;
        }
        match NaiveDate::parse_from_str(day, "%Y-%m-%d") {
            Ok(date) => Some(date),
            Err(e) => {
                warn!(record = self.entity, field = keys[0], value = %text, error = %e, "Unreadable date");
                None
            }
        }
    }
}

fn dedupe_fields(fields: Vec<FieldDefinition>) -> Vec<FieldDefinition> {
    let mut seen = HashSet::new();
    fields
        .into_iter()
        .filter(|field| {
            let fresh = seen.insert(field.name.clone());
            if !fresh {
                warn!(field = %field.name, "Duplicate field name in letter type, keeping the first");
            }
            fresh
        })
        .collect()
}

impl LetterType {
    /// Letter type from a stored record, tolerating encoded columns.
    pub fn from_stored(raw: &Value) -> Self {
        let record = StoredRecord::new(raw, "letter_type");
        Self {
            id: record.text(&["id"]),
            name: record.text(&["name"]),
            code: record.text(&["code"]),
            number_format_pattern: record.text(&["numberFormatPattern", "number_format_pattern"]),
            opening_sentence: record.text(&["openingSentence", "opening_sentence"]),
            body_template: record.text(&["bodyTemplate", "body_template"]),
            fields: dedupe_fields(record.list(&["fields"])),
            signers: record.list(&["signers"]),
            signature_layout: record.typed(&["signatureLayout", "signature_layout"]),
            show_seal: record.flag(&["showSeal", "show_seal"]),
            paper_size: record.typed(&["paperSize", "paper_size"]),
        }
    }
}

impl Request {
    /// Request from a stored record, tolerating encoded columns.
    pub fn from_stored(raw: &Value) -> Self {
        let record = StoredRecord::new(raw, "request");
        let submitted = record
            .get(&["submittedFields", "submitted_fields"])
            .map(safe_parse_data_surat)
            .unwrap_or_default();
        Self {
            id: record.text(&["id"]),
            letter_type_id: record.text(&["letterTypeId", "letter_type_id"]),
            submitted_fields: submitted,
            status: record.typed(&["status"]),
            letter_date: record.date(&["letterDate", "letter_date"]),
            assigned_number: record.optional_text(&["assignedNumber", "assigned_number"]),
            purpose: record.text(&["purpose"]),
            review_note: record.optional_text(&["reviewNote", "review_note"]),
        }
    }
}

impl OfficeConfig {
    /// Office identity from a stored record; unreadable records yield an empty config.
    pub fn from_stored(raw: &Value) -> Self {
        let map = safe_parse_object(raw, "office_config");
        match serde_json::from_value(Value::Object(map)) {
            Ok(office) => office,
            Err(e) => {
                warn!(error = %e, "Unreadable office config, using empty identity");
                OfficeConfig::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FieldType, PaperSize, RequestStatus, SignatureLayout, SignerRole};
    use serde_json::json;

    #[test]
    fn test_data_surat_parse_tolerance() {
        let expected: SubmittedFields = [("a".to_string(), FieldValue::from(1i64))].into_iter().collect();
        assert_eq!(safe_parse_data_surat(&json!("{\"a\":1}")), expected);
        assert_eq!(safe_parse_data_surat(&json!({"a": 1})), expected);
        assert_eq!(safe_parse_data_surat(&json!("not json")), SubmittedFields::new());
    }

    #[test]
    fn test_double_encoded_object() {
        let once = serde_json::to_string(&json!({"nama": "Siti"})).unwrap();
        let twice = Value::String(serde_json::to_string(&once).unwrap());
        let fields = safe_parse_data_surat(&twice);
        assert_eq!(fields["nama"], FieldValue::from("Siti"));
    }

    #[test]
    fn test_wrong_shapes_degrade_to_empty() {
        assert!(safe_parse_data_surat(&json!([1, 2])).is_empty());
        assert!(safe_parse_data_surat(&Value::Null).is_empty());
        assert!(safe_parse_list(&json!("{broken"), "fields").is_empty());
        assert!(safe_parse_list(&json!({"a": 1}), "fields").is_empty());
    }

    #[test]
    fn test_nulls_dropped_and_arrays_joined() {
        let fields = safe_parse_data_surat(&json!({"kosong": null, "anak": ["Ani", "Budi"]}));
        assert!(!fields.contains_key("kosong"));
        assert_eq!(fields["anak"], FieldValue::from("Ani, Budi"));
    }

    #[test]
    fn test_letter_type_with_encoded_columns() {
        let raw = json!({
            "id": 12,
            "name": "Surat Keterangan Domisili",
            "code": "SKD",
            "numberFormatPattern": "{nomor}/{kode_surat}/{bulan}/{tahun}",
            "bodyTemplate": "Bertempat tinggal di (alamat).",
            "fields": "[{\"name\":\"nama\",\"label\":\"Nama\",\"type\":\"text\",\"required\":true},{\"name\":\"nama\",\"label\":\"Dup\"},{\"name\":\"nik\",\"type\":\"number\",\"showInDocument\":false}]",
            "signers": [{"role": "kepala_desa", "label": "Kepala Desa"}, {"role": 5}],
            "signatureLayout": "two-horizontal",
            "showSeal": "true",
            "paperSize": "legal"
        });
        let letter_type = LetterType::from_stored(&raw);
        assert_eq!(letter_type.id, "12");
        assert_eq!(letter_type.fields.len(), 2);
        assert_eq!(letter_type.fields[0].label, "Nama");
        assert_eq!(letter_type.fields[1].field_type, FieldType::Number);
        assert!(!letter_type.fields[1].show_in_document);
        assert_eq!(letter_type.signers.len(), 1);
        assert_eq!(letter_type.signers[0].role, SignerRole::VillageHead);
        assert_eq!(letter_type.signature_layout, SignatureLayout::TwoHorizontal);
        assert!(letter_type.show_seal);
        assert_eq!(letter_type.paper_size, PaperSize::Legal);
    }

    #[test]
    fn test_letter_type_from_garbage() {
        let letter_type = LetterType::from_stored(&json!("<html>oops</html>"));
        assert_eq!(letter_type, LetterType::default());
    }

    #[test]
    fn test_request_record() {
        let raw = json!({
            "id": "REQ-7",
            "letter_type_id": "12",
            "submitted_fields": "{\"nama\":\"Siti\",\"umur\":31}",
            "status": "pending_verification",
            "letterDate": "2025-10-05T08:30:00Z",
            "assignedNumber": "",
            "purpose": "Melamar pekerjaan"
        });
        let request = Request::from_stored(&raw);
        assert_eq!(request.letter_type_id, "12");
        assert_eq!(request.submitted_fields["umur"].to_string(), "31");
        assert_eq!(request.status, RequestStatus::PendingVerification);
        assert_eq!(request.letter_date, NaiveDate::from_ymd_opt(2025, 10, 5));
        assert_eq!(request.assigned_number, None);
    }

    #[test]
    fn test_request_unknown_status_defaults_to_draft() {
        let request = Request::from_stored(&json!({"status": "archived", "letterDate": "kemarin"}));
        assert_eq!(request.status, RequestStatus::Draft);
        assert_eq!(request.letter_date, None);
    }

    #[test]
    fn test_office_config_from_encoded_string() {
        let raw = json!("{\"villageName\":\"Sukamaju\",\"neighborhoodHeads\":{\"3\":\"Pak Darto\"}}");
        let office = OfficeConfig::from_stored(&raw);
        assert_eq!(office.village_name, "Sukamaju");
        assert_eq!(office.neighborhood_heads.get(&3).map(String::as_str), Some("Pak Darto"));
    }
}
