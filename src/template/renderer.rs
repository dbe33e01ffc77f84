// letter-rendering-service/src/template/renderer.rs

use crate::models::SubmittedFields;
use crate::template::resolver::FieldResolver;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use tracing::debug;

static PAREN_PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\(([^()]+)\)").expect("Invalid regex"));

static BRACE_PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{\{([^{}]+)\}\}").expect("Invalid regex"));

static BRACKET_PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[([^\[\]]+)\]").expect("Invalid regex"));

static WORD_KEY_LEFTOVER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\((\w+)\)|\{\{(\w+)\}\}|\[(\w+)\]").expect("Invalid regex")
});

static SPACED_KEY_LEFTOVER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\((\w+(?: \w+)*)\)|\{\{(\w+(?: \w+)*)\}\}|\[(\w+(?: \w+)*)\]")
        .expect("Invalid regex")
});

const MISSING_MARKER_PREFIX: &str = "Data ";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderOptions {
    /// Also turn unresolved keys such as `(tempat lahir)` into `[Data ...]`
    /// markers. Off by default: ordinary prose in parentheses would match too.
    pub mark_spaced_placeholders: bool,
}

/// Outcome of a render with the diagnostics a reviewer needs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderReport {
    pub html: String,
    /// Keys that were replaced by a `[Data <key>]` marker.
    pub missing: Vec<String>,
    /// Placeholder-shaped fragments still present verbatim in `html`.
    pub unresolved: Vec<String>,
}

/// Multi-pass placeholder substitution for letter bodies.
///
/// Passes run in a fixed order over the current text: `(key)`, then
/// `{{key}}`, then `[key]`, then the cleanup that marks missing word keys.
/// Substituted values are inserted verbatim; escaping is the caller's job.
#[derive(Debug, Clone, Default)]
pub struct TemplateRenderer {
    options: RenderOptions,
}

impl TemplateRenderer {
    pub fn new(options: RenderOptions) -> Self {
        Self { options }
    }

    pub fn render(&self, template: &str, fields: &SubmittedFields) -> String {
        self.render_with_report(template, fields).html
    }

    pub fn render_with_report(&self, template: &str, fields: &SubmittedFields) -> RenderReport {
        let resolver = FieldResolver::new(fields);

        let mut text = template.to_string();
        for pass in [&*PAREN_PLACEHOLDER, &*BRACE_PLACEHOLDER, &*BRACKET_PLACEHOLDER] {
            text = substitute(pass, &text, &resolver);
        }

        let leftover = if self.options.mark_spaced_placeholders {
            &*SPACED_KEY_LEFTOVER
        } else {
            &*WORD_KEY_LEFTOVER
        };

        let mut missing = Vec::new();
        let html = leftover
            .replace_all(&text, |caps: &Captures| {
                let key = (1..=3)
                    .find_map(|group| caps.get(group))
                    .map(|m| m.as_str())
                    .unwrap_or_default();
                missing.push(key.to_string());
                format!("[{}{}]", MISSING_MARKER_PREFIX, key)
            })
            .into_owned();

        if !missing.is_empty() {
            debug!(missing = ?missing, "Template placeholders without submitted data");
        }

        let unresolved = find_unresolved(&html);
        RenderReport {
            html,
            missing,
            unresolved,
        }
    }
}

fn substitute(pattern: &Regex, text: &str, resolver: &FieldResolver<'_>) -> String {
    pattern
        .replace_all(text, |caps: &Captures| match resolver.lookup(&caps[1]) {
            Some(value) => value.to_string(),
            None => caps[0].to_string(),
        })
        .into_owned()
}

/// Placeholder-shaped fragments left in rendered output, excluding the
/// `[Data <key>]` markers the cleanup pass produced.
pub fn find_unresolved(rendered: &str) -> Vec<String> {
    let mut found = Vec::new();
    for pattern in [&*PAREN_PLACEHOLDER, &*BRACE_PLACEHOLDER, &*BRACKET_PLACEHOLDER] {
        for caps in pattern.captures_iter(rendered) {
            let is_marker =
                caps[0].starts_with('[') && caps[1].starts_with(MISSING_MARKER_PREFIX);
            if !is_marker {
                found.push(caps[0].to_string());
            }
        }
    }
    found
}

/// Renders with default options.
pub fn render_template(template: &str, fields: &SubmittedFields) -> String {
    TemplateRenderer::default().render(template, fields)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FieldValue;

    fn fields(pairs: &[(&str, &str)]) -> SubmittedFields {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), FieldValue::from(*v)))
            .collect()
    }

    #[test]
    fn test_three_syntaxes_are_equivalent() {
        let submitted = fields(&[("k", "V")]);
        assert_eq!(render_template("(k)", &submitted), "V");
        assert_eq!(render_template("{{k}}", &submitted), "V");
        assert_eq!(render_template("[k]", &submitted), "V");
    }

    #[test]
    fn test_missing_word_key_gets_marker() {
        assert_eq!(render_template("(ghost)", &SubmittedFields::new()), "[Data ghost]");
        assert_eq!(render_template("{{ghost}}", &SubmittedFields::new()), "[Data ghost]");
        assert_eq!(render_template("[ghost]", &SubmittedFields::new()), "[Data ghost]");
    }

    #[test]
    fn test_fuzzy_keys_in_placeholders() {
        let submitted = fields(&[("tempat_lahir", "Bogor"), ("Tanggal Lahir", "1 Mei 1990")]);
        let rendered = render_template(
            "Lahir di (Tempat Lahir) pada {{tanggal_lahir}}.",
            &submitted,
        );
        assert_eq!(rendered, "Lahir di Bogor pada 1 Mei 1990.");
    }

    #[test]
    fn test_spaced_missing_key_left_verbatim_by_default() {
        let report = TemplateRenderer::default()
            .render_with_report("Lahir di (tempat lahir).", &SubmittedFields::new());
        assert_eq!(report.html, "Lahir di (tempat lahir).");
        assert!(report.missing.is_empty());
        assert_eq!(report.unresolved, vec!["(tempat lahir)".to_string()]);
    }

    #[test]
    fn test_spaced_missing_key_marked_when_enabled() {
        let renderer = TemplateRenderer::new(RenderOptions {
            mark_spaced_placeholders: true,
        });
        let report = renderer.render_with_report("Lahir di (tempat lahir).", &SubmittedFields::new());
        assert_eq!(report.html, "Lahir di [Data tempat lahir].");
        assert_eq!(report.missing, vec!["tempat lahir".to_string()]);
        assert!(report.unresolved.is_empty());
    }

    #[test]
    fn test_empty_value_renders_like_missing() {
        let submitted = fields(&[("pekerjaan", "")]);
        assert_eq!(
            render_template("(pekerjaan)", &submitted),
            render_template("(pekerjaan)", &SubmittedFields::new())
        );
    }

    #[test]
    fn test_values_are_inserted_verbatim() {
        let submitted = fields(&[("catatan", "<b>penting</b> & segera")]);
        assert_eq!(
            render_template("{{catatan}}", &submitted),
            "<b>penting</b> & segera"
        );
    }

    #[test]
    fn test_later_pass_sees_earlier_substitution() {
        // Pass A inserts brace text; pass B resolves it once.
        let submitted = fields(&[("a", "{{b}}"), ("b", "final")]);
        assert_eq!(render_template("(a)", &submitted), "final");

        // Text inserted by the bracket pass is only seen by the cleanup.
        let submitted = fields(&[("c", "[d]"), ("d", "never")]);
        assert_eq!(render_template("[c]", &submitted), "[Data d]");
    }

    #[test]
    fn test_mixed_template() {
        let submitted = fields(&[("nama", "Budi Santoso"), ("nik", "3201010101900001")]);
        let report = TemplateRenderer::default().render_with_report(
            "Nama (nama), NIK {{nik}}, alamat [alamat], RT (RT 01/RW 02).",
            &submitted,
        );
        assert_eq!(
            report.html,
            "Nama Budi Santoso, NIK 3201010101900001, alamat [Data alamat], RT (RT 01/RW 02)."
        );
        assert_eq!(report.missing, vec!["alamat".to_string()]);
        assert_eq!(report.unresolved, vec!["(RT 01/RW 02)".to_string()]);
    }
}
