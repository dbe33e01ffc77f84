// letter-rendering-service/src/template/resolver.rs

use crate::models::{FieldValue, SubmittedFields};
use crate::template::normalize::normalize_key;
use std::collections::HashMap;

/// Binds field names to submitted values, exact key first, normalized key second.
///
/// The normalized index is built once per set of submitted fields so a
/// template with many placeholders does not re-normalize every key.
pub struct FieldResolver<'a> {
    fields: &'a SubmittedFields,
    normalized: HashMap<String, &'a FieldValue>,
}

impl<'a> FieldResolver<'a> {
    pub fn new(fields: &'a SubmittedFields) -> Self {
        let mut normalized = HashMap::with_capacity(fields.len());
        // First truthy key in sorted order owns a contested normalized slot.
        for (key, value) in fields.iter().filter(|(_, value)| value.is_truthy()) {
            normalized.entry(normalize_key(key)).or_insert(value);
        }
        Self { fields, normalized }
    }

    /// Submitted value for `field_name`, or `None` when absent or falsy.
    pub fn lookup(&self, field_name: &str) -> Option<&'a FieldValue> {
        if let Some(value) = self.fields.get(field_name) {
            if value.is_truthy() {
                return Some(value);
            }
        }
        self.normalized
            .get(&normalize_key(field_name))
            .copied()
    }

    /// Display text for `field_name`; empty when nothing is bound.
    pub fn resolve(&self, field_name: &str) -> String {
        self.lookup(field_name)
            .map(ToString::to_string)
            .unwrap_or_default()
    }
}

/// One-shot lookup of a single field.
pub fn resolve_field(field_name: &str, fields: &SubmittedFields) -> String {
    FieldResolver::new(fields).resolve(field_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(pairs: &[(&str, FieldValue)]) -> SubmittedFields {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_exact_match_wins_over_normalized_collision() {
        let submitted = fields(&[("Nama", "A".into()), ("nama", "B".into())]);
        assert_eq!(resolve_field("Nama", &submitted), "A");
        assert_eq!(resolve_field("nama", &submitted), "B");
    }

    #[test]
    fn test_fuzzy_fallback() {
        let submitted = fields(&[("tempat_lahir", "Bogor".into())]);
        assert_eq!(resolve_field("Tempat Lahir", &submitted), "Bogor");
        assert_eq!(resolve_field("tempat-lahir", &submitted), "Bogor");
    }

    #[test]
    fn test_missing_field_is_empty() {
        let submitted = fields(&[("nik", "3201".into())]);
        assert_eq!(resolve_field("alamat", &submitted), "");
    }

    #[test]
    fn test_empty_string_is_indistinguishable_from_missing() {
        let submitted = fields(&[("pekerjaan", "".into())]);
        let resolver = FieldResolver::new(&submitted);
        assert_eq!(resolver.lookup("pekerjaan"), None);
        assert_eq!(resolver.lookup("tidak_ada"), None);
        assert_eq!(resolver.resolve("pekerjaan"), resolver.resolve("tidak_ada"));
    }

    #[test]
    fn test_falsy_exact_value_falls_through_to_normalized_key() {
        // "Alamat " sorts before "alamat", so it owns the normalized slot.
        let submitted = fields(&[("alamat", "".into()), ("Alamat ", "Jl. Melati".into())]);
        assert_eq!(resolve_field("alamat", &submitted), "Jl. Melati");
    }

    #[test]
    fn test_falsy_value_never_hides_a_truthy_collision() {
        // "Nama_Lengkap" sorts first but is empty.
        let submitted = fields(&[("namalengkap", "Siti".into()), ("Nama_Lengkap", "".into())]);
        assert_eq!(resolve_field("Nama Lengkap", &submitted), "Siti");
        assert_eq!(resolve_field("Nama_Lengkap", &submitted), "Siti");
    }

    #[test]
    fn test_numbers_and_flags_render_as_text() {
        let submitted = fields(&[("umur", 42i64.into()), ("menikah", true.into())]);
        let resolver = FieldResolver::new(&submitted);
        assert_eq!(resolver.resolve("umur"), "42");
        assert_eq!(resolver.resolve("menikah"), "true");
        let zero = fields(&[("jumlah", 0i64.into())]);
        assert_eq!(resolve_field("jumlah", &zero), "");
    }
}
