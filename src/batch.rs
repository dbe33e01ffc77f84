// letter-rendering-service/src/batch.rs

use crate::document::{DataSource, DocumentAssembler, LetterInput};
use crate::error::{ErrorResponse, LetterError, Result};
use crate::models::{LetterType, OfficeConfig, Request};
use base64::{engine::general_purpose, Engine as _};
use chrono::{DateTime, Utc};
use futures::{stream, StreamExt};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::sync::Arc;
use tracing::{error, info, warn};
use uuid::Uuid;

/// Inbound batch: stored records exactly as the portal backend exports them.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderBatch {
    #[serde(default)]
    pub batch_id: Option<Uuid>,
    #[serde(default)]
    pub office: Value,
    #[serde(default)]
    pub items: Vec<BatchItem>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchItem {
    #[serde(default)]
    pub letter_type: Value,
    #[serde(default)]
    pub request: Value,
    /// Defaults to the item's 1-based position in the batch.
    #[serde(default)]
    pub sequence_number: Option<u32>,
    /// Render with sample values instead of the submitted ones.
    #[serde(default)]
    pub preview: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderedLetter {
    pub letter_number: String,
    pub filename: String,
    pub mime_type: String,
    pub content_base64: String,
    pub sha256_checksum: String,
    pub size_bytes: usize,
    pub missing_placeholders: Vec<String>,
    pub unresolved_placeholders: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemResult {
    pub request_id: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub letter: Option<RenderedLetter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorResponse>,
}

impl ItemResult {
    fn rendered(request_id: String, letter: RenderedLetter) -> Self {
        Self {
            request_id,
            status: "success".to_string(),
            letter: Some(letter),
            error: None,
        }
    }

    fn failed(request_id: String, err: &LetterError) -> Self {
        Self {
            request_id,
            status: "error".to_string(),
            letter: None,
            error: Some(err.to_error_response()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchResponse {
    pub batch_id: String,
    pub status: String,
    pub results: Vec<ItemResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub generated_at: DateTime<Utc>,
}

impl BatchResponse {
    pub fn completed(batch_id: String, results: Vec<ItemResult>) -> Self {
        let rendered = results.iter().filter(|r| r.letter.is_some()).count();
        let status = if rendered == results.len() {
            "success"
        } else if rendered > 0 {
            "partial"
        } else {
            "error"
        };
        Self {
            batch_id,
            status: status.to_string(),
            results,
            error: None,
            generated_at: Utc::now(),
        }
    }

    pub fn error(batch_id: String, error: String) -> Self {
        Self {
            batch_id,
            status: "error".to_string(),
            results: vec![],
            error: Some(error),
            generated_at: Utc::now(),
        }
    }
}

/// Renders every item of a batch into a complete HTML letter.
pub struct BatchRenderer {
    assembler: Arc<DocumentAssembler>,
    max_concurrent: usize,
}

impl BatchRenderer {
    pub fn new(assembler: DocumentAssembler, max_concurrent: usize) -> Self {
        Self {
            assembler: Arc::new(assembler),
            max_concurrent: max_concurrent.max(1),
        }
    }

    pub async fn handle_message(&self, data: &[u8]) -> BatchResponse {
        let batch: RenderBatch = match serde_json::from_slice(data) {
            Ok(batch) => batch,
            Err(e) => {
                error!("Failed to parse batch: {}", e);
                return BatchResponse::error("unknown".to_string(), format!("Invalid batch format: {}", e));
            }
        };

        let batch_id = batch.batch_id.unwrap_or_else(Uuid::new_v4).to_string();

        if batch.items.is_empty() {
            warn!(batch_id = %batch_id, "Batch contains no items");
            return BatchResponse::error(batch_id, "Batch contains no items".to_string());
        }

        info!(
            batch_id = %batch_id,
            items = batch.items.len(),
            max_concurrent = self.max_concurrent,
            "Processing render batch"
        );

        let office = Arc::new(OfficeConfig::from_stored(&batch.office));

        let results: Vec<ItemResult> = stream::iter(batch.items.into_iter().enumerate())
            .map(|(index, item)| {
                let assembler = Arc::clone(&self.assembler);
                let office = Arc::clone(&office);
                async move {
                    tokio::task::spawn_blocking(move || render_item(&assembler, &office, item, index))
                        .await
                        .unwrap_or_else(|e| {
                            ItemResult::failed(
                                format!("item-{}", index + 1),
                                &LetterError::TaskFailed(e.to_string()),
                            )
                        })
                }
            })
            .buffered(self.max_concurrent)
            .collect()
            .await;

        let response = BatchResponse::completed(batch_id, results);

        info!(
            batch_id = %response.batch_id,
            status = %response.status,
            rendered = response.results.iter().filter(|r| r.letter.is_some()).count(),
            "Render batch finished"
        );

        response
    }
}

fn render_item(assembler: &DocumentAssembler, office: &OfficeConfig, item: BatchItem, index: usize) -> ItemResult {
    let request = Request::from_stored(&item.request);
    let request_id = if request.id.is_empty() {
        format!("item-{}", index + 1)
    } else {
        request.id.clone()
    };

    let sequence = item.sequence_number.unwrap_or(index as u32 + 1);
    match render_letter(assembler, office, &item, &request, sequence) {
        Ok(letter) => ItemResult::rendered(request_id, letter),
        Err(e) => {
            error!(request_id = %request_id, error = %e, "Failed to render letter");
            ItemResult::failed(request_id, &e)
        }
    }
}

fn render_letter(
    assembler: &DocumentAssembler,
    office: &OfficeConfig,
    item: &BatchItem,
    request: &Request,
    sequence: u32,
) -> Result<RenderedLetter> {
    if item.request.is_null() {
        return Err(LetterError::MissingField("request".to_string()));
    }
    if item.letter_type.is_null() {
        return Err(LetterError::MissingField("letterType".to_string()));
    }

    let letter_type = LetterType::from_stored(&item.letter_type);
    let source = if item.preview {
        DataSource::Sample
    } else {
        DataSource::Submitted
    };

    let letter = assembler.assemble(&LetterInput {
        letter_type: &letter_type,
        request,
        office,
        sequence,
        source,
    })?;

    let bytes = letter.html.into_bytes();
    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    let sha256_checksum = hex::encode(hasher.finalize());

    let stem = format!("{}_{}", letter_type.code, letter.number);
    let filename = format!(
        "{}.html",
        stem.chars()
            .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect::<String>()
    );

    Ok(RenderedLetter {
        letter_number: letter.number,
        filename,
        mime_type: "text/html".to_string(),
        content_base64: general_purpose::STANDARD.encode(&bytes),
        sha256_checksum,
        size_bytes: bytes.len(),
        missing_placeholders: letter.missing,
        unresolved_placeholders: letter.unresolved,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::numbering::LetterNumberGenerator;
    use crate::template::RenderOptions;
    use serde_json::json;

    fn renderer() -> BatchRenderer {
        let assembler = DocumentAssembler::new(RenderOptions::default(), LetterNumberGenerator::default()).unwrap();
        BatchRenderer::new(assembler, 2)
    }

    fn letter_type() -> Value {
        json!({
            "id": 3,
            "name": "Surat Keterangan Usaha",
            "code": "SKU",
            "numberFormatPattern": "NOMOR/KODE/BULAN/TAHUN",
            "bodyTemplate": "Memiliki usaha {{jenis_usaha}}.",
            "fields": "[{\"name\":\"jenis_usaha\",\"label\":\"Jenis Usaha\"}]",
            "signers": [{"role": "village_head"}]
        })
    }

    #[tokio::test]
    async fn test_batch_renders_items_in_order() {
        let batch = json!({
            "batchId": "6f1c1a7e-8d7b-4f2e-9a57-3b0c3f1d2e11",
            "office": "{\"villageName\":\"Sukamaju\",\"villageHeadName\":\"H. Ahmad Fauzi\"}",
            "items": [
                {
                    "letterType": letter_type(),
                    "request": {"id": "A", "status": "approved", "letterDate": "2025-10-05",
                                "submittedFields": {"jenis_usaha": "Warung"}},
                    "sequenceNumber": 7
                },
                {
                    "letterType": serde_json::to_string(&letter_type()).unwrap(),
                    "request": {"id": "B", "letterDate": "2025-11-01", "assignedNumber": "099/SKU/11/2025"}
                }
            ]
        });
        let response = renderer().handle_message(batch.to_string().as_bytes()).await;

        assert_eq!(response.status, "success");
        assert_eq!(response.batch_id, "6f1c1a7e-8d7b-4f2e-9a57-3b0c3f1d2e11");
        assert_eq!(response.results.len(), 2);

        let first = response.results[0].letter.as_ref().unwrap();
        assert_eq!(response.results[0].request_id, "A");
        assert_eq!(first.letter_number, "007/SKU/10/2025");
        assert_eq!(first.filename, "SKU_007_SKU_10_2025.html");
        assert_eq!(first.sha256_checksum.len(), 64);
        let html = String::from_utf8(general_purpose::STANDARD.decode(&first.content_base64).unwrap()).unwrap();
        assert_eq!(html.len(), first.size_bytes);
        assert!(html.contains("Memiliki usaha Warung."));
        assert!(html.contains("H. Ahmad Fauzi"));

        let second = response.results[1].letter.as_ref().unwrap();
        assert_eq!(second.letter_number, "099/SKU/11/2025");
        assert_eq!(second.missing_placeholders, vec!["jenis_usaha".to_string()]);
    }

    #[tokio::test]
    async fn test_missing_request_fails_only_that_item() {
        let batch = json!({
            "items": [
                {"letterType": letter_type()},
                {"letterType": letter_type(), "request": {"id": "C"}}
            ]
        });
        let response = renderer().handle_message(batch.to_string().as_bytes()).await;
        assert_eq!(response.status, "partial");
        assert_eq!(response.results[0].request_id, "item-1");
        assert_eq!(response.results[0].error.as_ref().unwrap().error_type, "missing_field");
        assert!(response.results[1].letter.is_some());
    }

    #[tokio::test]
    async fn test_unparseable_batch() {
        let response = renderer().handle_message(b"not json").await;
        assert_eq!(response.status, "error");
        assert_eq!(response.batch_id, "unknown");
        assert!(response.error.unwrap().starts_with("Invalid batch format"));
    }

    #[tokio::test]
    async fn test_empty_batch() {
        let response = renderer().handle_message(br#"{"items": []}"#).await;
        assert_eq!(response.status, "error");
        assert!(response.results.is_empty());
    }
}
