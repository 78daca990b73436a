//! Text extraction for uploaded documents (resumes, internship offers).

use axum::{extract::Multipart, Json};
use bytes::Bytes;
use serde::Serialize;
use tracing::{debug, info};

use crate::errors::AppError;
use crate::recovery::ExtractionError;

const PDF_MIME: &str = "application/pdf";
const OCTET_STREAM: &str = "application/octet-stream";

fn is_text_mime(mime: &str) -> bool {
    mime.starts_with("text/") || mime == "application/json" || mime.ends_with("+json")
}

/// Picks the effective MIME type: explicit hint, then the part's declared
/// type, then the file extension, then content sniffing.
pub fn resolve_mime(
    hint: Option<&str>,
    content_type: Option<&str>,
    file_name: Option<&str>,
    data: &[u8],
) -> String {
    let declared = [hint, content_type]
        .into_iter()
        .flatten()
        .map(|m| m.trim().to_ascii_lowercase())
        .find(|m| !m.is_empty() && m != OCTET_STREAM);
    if let Some(mime) = declared {
        return mime;
    }

    let extension = file_name
        .and_then(|name| name.rsplit_once('.'))
        .map(|(_, ext)| ext.to_ascii_lowercase());
    match extension.as_deref() {
        Some("pdf") => return PDF_MIME.to_string(),
        Some("json") => return "application/json".to_string(),
        Some("txt" | "md") => return "text/plain".to_string(),
        _ => {}
    }

    if data.starts_with(b"%PDF-") {
        PDF_MIME.to_string()
    } else if std::str::from_utf8(data).is_ok() {
        "text/plain".to_string()
    } else {
        OCTET_STREAM.to_string()
    }
}

/// Extracts plain text from a document. Plain text and JSON pass through
/// (lossy UTF-8); PDFs go through `pdf-extract`.
pub fn extract_text_from_file(data: &[u8], mime: &str) -> Result<String, ExtractionError> {
    let text = if is_text_mime(mime) {
        String::from_utf8_lossy(data).into_owned()
    } else if mime == PDF_MIME {
        pdf_extract::extract_text_from_mem(data).map_err(|e| ExtractionError::Pdf(e.to_string()))?
    } else {
        return Err(ExtractionError::UnsupportedType(mime.to_string()));
    };

    let text = text.trim();
    if text.is_empty() {
        return Err(ExtractionError::EmptyDocument);
    }
    Ok(text.to_string())
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractTextResponse {
    pub text: String,
    pub mime_type: String,
}

struct Upload {
    data: Bytes,
    content_type: Option<String>,
    file_name: Option<String>,
}

/// POST /api/extract-text
/// Multipart body: `file` (required) and `mimeType` (optional hint).
pub async fn handle_extract_text(
    mut multipart: Multipart,
) -> Result<Json<ExtractTextResponse>, AppError> {
    let invalid = |e: axum::extract::multipart::MultipartError| {
        AppError::Validation(format!("Invalid upload: {e}"))
    };

    let mut upload = None;
    let mut hint = None;
    while let Some(field) = multipart.next_field().await.map_err(invalid)? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("file") => {
                let content_type = field.content_type().map(str::to_string);
                let file_name = field.file_name().map(str::to_string);
                let data = field.bytes().await.map_err(invalid)?;
                upload = Some(Upload {
                    data,
                    content_type,
                    file_name,
                });
            }
            Some("mimeType") => hint = Some(field.text().await.map_err(invalid)?),
            _ => debug!(field = ?name, "ignoring multipart field"),
        }
    }

    let upload =
        upload.ok_or_else(|| AppError::Validation("A file upload is required.".to_string()))?;
    let mime = resolve_mime(
        hint.as_deref(),
        upload.content_type.as_deref(),
        upload.file_name.as_deref(),
        &upload.data,
    );

    // PDF parsing is CPU-bound and may panic on hostile input
    let data = upload.data;
    let task_mime = mime.clone();
    let text = tokio::task::spawn_blocking(move || extract_text_from_file(&data, &task_mime))
        .await
        .map_err(|e| ExtractionError::Pdf(e.to_string()))??;

    info!(mime = %mime, chars = text.chars().count(), "document text extracted");
    Ok(Json(ExtractTextResponse {
        text,
        mime_type: mime,
    }))
}
