// letter-rendering-service/src/lib.rs

//! Rendering engine for village letter requests: placeholder substitution,
//! field binding, signature layouts, letter numbering and the review
//! workflow, plus the assembler that prints a complete letter.

pub mod batch;
pub mod config;
pub mod document;
pub mod error;
pub mod ingress;
pub mod models;
pub mod numbering;
pub mod signature;
pub mod template;
pub mod workflow;

pub use document::{AssembledLetter, DataSource, DocumentAssembler, LetterInput};
pub use error::{LetterError, Result};
pub use ingress::safe_parse_data_surat;
pub use models::{
    FieldDefinition, FieldValue, LetterType, OfficeConfig, Request, RequestStatus, SignatureLayout,
    SignerSpec, SubmittedFields,
};
pub use numbering::LetterNumberGenerator;
pub use signature::{compose_signatures, OfficeSignerDirectory};
pub use template::{normalize_key, resolve_field, render_template, TemplateRenderer};
