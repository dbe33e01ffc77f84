// letter-rendering-service/src/numbering.rs

use crate::models::Request;
use chrono::{Datelike, NaiveDate};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

pub const DEFAULT_LETTER_CODE: &str = "SK";
pub const DEFAULT_NUMBER_PATTERN: &str = "{nomor}/{kode_surat}/{bulan}/{tahun}";

/// Braced tokens match in any case; the legacy bare tokens are uppercase words.
static NUMBER_TOKEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i:\{(nomor|kode_surat|kode|bulan_romawi|bulan|tahun)\})|\b(NOMOR|KODE_SURAT|KODE|BULAN|TAHUN)\b",
    )
    .expect("Invalid number token regex")
});

const ROMAN_MONTHS: [&str; 12] = [
    "I", "II", "III", "IV", "V", "VI", "VII", "VIII", "IX", "X", "XI", "XII",
];

/// Formats letter reference numbers such as `001/SKD/10/2025`.
#[derive(Debug, Clone)]
pub struct LetterNumberGenerator {
    default_code: String,
    default_pattern: String,
}

impl Default for LetterNumberGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_LETTER_CODE, DEFAULT_NUMBER_PATTERN)
    }
}

impl LetterNumberGenerator {
    pub fn new(default_code: impl Into<String>, default_pattern: impl Into<String>) -> Self {
        Self {
            default_code: default_code.into(),
            default_pattern: default_pattern.into(),
        }
    }

    pub fn generate(&self, pattern: &str, sequence: u32, code: &str, date: NaiveDate) -> String {
        let pattern = if pattern.trim().is_empty() {
            self.default_pattern.as_str()
        } else {
            pattern
        };
        let code = if code.trim().is_empty() {
            self.default_code.as_str()
        } else {
            code.trim()
        };

        NUMBER_TOKEN
            .replace_all(pattern, |caps: &Captures| {
                let token = caps
                    .get(1)
                    .or_else(|| caps.get(2))
                    .map(|m| m.as_str().to_lowercase())
                    .unwrap_or_default();
                match token.as_str() {
                    "nomor" => format!("{:03}", sequence),
                    "kode_surat" | "kode" => code.to_string(),
                    "bulan" => format!("{:02}", date.month()),
                    "bulan_romawi" => ROMAN_MONTHS[date.month0() as usize].to_string(),
                    "tahun" => format!("{:04}", date.year()),
                    _ => caps[0].to_string(),
                }
            })
            .into_owned()
    }

    /// Number for `request`. A number assigned earlier is returned untouched,
    /// whatever the other arguments say.
    pub fn number_for(
        &self,
        request: &Request,
        pattern: &str,
        sequence: u32,
        code: &str,
        date: NaiveDate,
    ) -> String {
        match request.assigned_number.as_deref() {
            Some(existing) if !existing.trim().is_empty() => existing.to_string(),
            _ => self.generate(pattern, sequence, code, date),
        }
    }
}

pub fn generate_letter_number(pattern: &str, sequence: u32, code: &str, date: NaiveDate) -> String {
    LetterNumberGenerator::default().generate(pattern, sequence, code, date)
}
