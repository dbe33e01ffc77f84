// letter-rendering-service/src/document.rs

use crate::error::Result;
use crate::models::{FieldType, FieldValue, LetterType, OfficeConfig, Request, RequestStatus, SubmittedFields};
use crate::numbering::LetterNumberGenerator;
use crate::signature::{compose_signatures, BlockKind, DatePlacement, OfficeSignerDirectory, SignatureSection};
use crate::template::{FieldResolver, RenderOptions, TemplateRenderer};
use chrono::{Datelike, NaiveDate, Utc};
use handlebars::Handlebars;
use serde::Serialize;
use tracing::info;

const LETTER_TEMPLATE_NAME: &str = "letter";
const LETTER_TEMPLATE: &str = include_str!("../templates/letter.html.hbs");

const MONTHS_ID: [&str; 12] = [
    "Januari", "Februari", "Maret", "April", "Mei", "Juni", "Juli", "Agustus", "September",
    "Oktober", "November", "Desember",
];

/// Where field values come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataSource {
    /// The resident's submitted values.
    Submitted,
    /// Generated sample values, for previewing a letter type.
    Sample,
}

/// Everything needed to print one letter.
pub struct LetterInput<'a> {
    pub letter_type: &'a LetterType,
    pub request: &'a Request,
    pub office: &'a OfficeConfig,
    /// Sequence used when the request has no assigned number yet.
    pub sequence: u32,
    pub source: DataSource,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssembledLetter {
    pub number: String,
    pub html: String,
    pub missing: Vec<String>,
    pub unresolved: Vec<String>,
}

/// "5 Oktober 2025".
pub fn format_indonesian_date(date: NaiveDate) -> String {
    format!("{} {} {}", date.day(), MONTHS_ID[date.month0() as usize], date.year())
}

/// Placeholder values for every field of a letter type.
pub fn sample_fields(letter_type: &LetterType, date: NaiveDate) -> SubmittedFields {
    letter_type
        .fields
        .iter()
        .map(|field| {
            let value = match field.field_type {
                FieldType::Select => field
                    .options
                    .first()
                    .cloned()
                    .unwrap_or_else(|| format!("Pilihan {}", field.display_label()))
                    .into(),
                FieldType::Date => format_indonesian_date(date).into(),
                FieldType::Number => FieldValue::from(1i64),
                FieldType::Text | FieldType::Textarea => format!("Contoh {}", field.display_label()).into(),
            };
            (field.name.clone(), value)
        })
        .collect()
}

#[derive(Serialize)]
struct FieldLine {
    label: String,
    value: String,
}

#[derive(Serialize)]
struct BlockView {
    position: String,
    is_signer: bool,
    is_seal: bool,
    date_line: Option<String>,
    on_behalf_of: Option<String>,
    label: String,
    name: String,
    id_number: Option<String>,
}

#[derive(Serialize)]
struct SignatureView {
    layout: String,
    centered_date: bool,
    blocks: Vec<BlockView>,
}

fn kebab_name<T: Serialize>(value: &T) -> String {
    serde_json::to_value(value)
        .ok()
        .and_then(|v| v.as_str().map(str::to_string))
        .unwrap_or_default()
}

fn signature_view(section: &SignatureSection, date_line: &str) -> SignatureView {
    let blocks = section
        .blocks
        .iter()
        .map(|block| BlockView {
            position: kebab_name(&block.position),
            is_signer: block.kind == BlockKind::Signer,
            is_seal: block.kind == BlockKind::Seal,
            date_line: block.show_date.then(|| date_line.to_string()),
            on_behalf_of: block.on_behalf_of.clone(),
            label: block.label.clone(),
            name: block.name.clone(),
            id_number: block.id_number.clone(),
        })
        .collect();
    SignatureView {
        layout: kebab_name(&section.layout),
        centered_date: section.date_placement == DatePlacement::Centered,
        blocks,
    }
}

#[derive(Serialize)]
struct PaperView {
    width_mm: u32,
    height_mm: u32,
}

#[derive(Serialize)]
struct OfficeView {
    village_name: String,
    district_name: String,
    regency_name: String,
    office_address: String,
    postal_code: String,
    phone: String,
    email: String,
}

#[derive(Serialize)]
struct LetterView {
    draft: bool,
    paper: PaperView,
    office: OfficeView,
    title: String,
    number: String,
    opening_sentence: String,
    field_lines: Vec<FieldLine>,
    body: String,
    purpose: String,
    date_line: String,
    signature: SignatureView,
}

/// Assembles the rendered fragments of a letter into one printable page.
pub struct DocumentAssembler {
    handlebars: Handlebars<'static>,
    renderer: TemplateRenderer,
    numbers: LetterNumberGenerator,
}

impl DocumentAssembler {
    pub fn new(options: RenderOptions, numbers: LetterNumberGenerator) -> Result<Self> {
        let mut handlebars = Handlebars::new();
        handlebars.set_strict_mode(false);
        handlebars.register_template_string(LETTER_TEMPLATE_NAME, LETTER_TEMPLATE)?;

        Ok(Self {
            handlebars,
            renderer: TemplateRenderer::new(options),
            numbers,
        })
    }

    pub fn assemble(&self, input: &LetterInput<'_>) -> Result<AssembledLetter> {
        let LetterInput {
            letter_type,
            request,
            office,
            sequence,
            source,
        } = *input;

        let date = request
            .letter_date
            .unwrap_or_else(|| Utc::now().date_naive());

        let sample;
        let fields = match source {
            DataSource::Submitted => &request.submitted_fields,
            DataSource::Sample => {
                sample = sample_fields(letter_type, date);
                &sample
            }
        };

        let number = self.numbers.number_for(
            request,
            &letter_type.number_format_pattern,
            sequence,
            &letter_type.code,
            date,
        );

        let report = self.renderer.render_with_report(&letter_type.body_template, fields);

        let resolver = FieldResolver::new(fields);
        let field_lines = letter_type
            .fields
            .iter()
            .filter(|field| field.show_in_document)
            .map(|field| {
                let value = resolver.resolve(&field.name);
                FieldLine {
                    label: field.display_label().to_string(),
                    value: if value.is_empty() { "-".to_string() } else { value },
                }
            })
            .collect();

        let directory = OfficeSignerDirectory::new(office);
        let section = compose_signatures(
            &letter_type.signers,
            letter_type.signature_layout,
            letter_type.show_seal,
            |spec| directory.resolve(spec),
        );
        let date_line = format!("{}, {}", office.village_name, format_indonesian_date(date))
            .trim_start_matches([',', ' '])
            .to_string();

        let (width_mm, height_mm) = letter_type.paper_size.dimensions_mm();
        let purpose = match source {
            DataSource::Submitted => request.purpose.trim().to_string(),
            DataSource::Sample => "Contoh keperluan".to_string(),
        };

        let view = LetterView {
            draft: source == DataSource::Sample || request.status != RequestStatus::Approved,
            paper: PaperView { width_mm, height_mm },
            office: OfficeView {
                village_name: office.village_name.to_uppercase(),
                district_name: office.district_name.to_uppercase(),
                regency_name: office.regency_name.to_uppercase(),
                office_address: office.office_address.clone(),
                postal_code: office.postal_code.clone(),
                phone: office.phone.clone(),
                email: office.email.clone(),
            },
            title: letter_type.name.to_uppercase(),
            number: number.clone(),
            opening_sentence: letter_type.opening_sentence.clone(),
            field_lines,
            body: report.html,
            purpose,
            signature: signature_view(&section, &date_line),
            date_line,
        };

        let html = self.handlebars.render(LETTER_TEMPLATE_NAME, &view)?;

        info!(
            request_id = %request.id,
            letter_type = %letter_type.code,
            number = %number,
            layout = ?section.layout,
            missing = report.missing.len(),
            "Letter assembled"
        );

        Ok(AssembledLetter {
            number,
            html,
            missing: report.missing,
            unresolved: report.unresolved,
        })
    }
}
