// Resume import: free text (or an exported CV) into a validated CvDocument.

use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};

use crate::ai::{prompts, AiContext, TaskError};
use crate::models::cv::{
    repair_personal, sanitize_nulls, validate, PLACEHOLDER_EMAIL, PLACEHOLDER_NAME,
};
use crate::models::CvDocument;
use crate::recovery::recover_json;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ImportSource {
    /// Input already was a CV document in the canonical JSON shape.
    DirectJson,
    Ai,
}

impl ImportSource {
    pub fn reason(self) -> &'static str {
        match self {
            Self::DirectJson => "Parsed resume directly from structured JSON.",
            Self::Ai => "Structured resume with AI.",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImportedCv {
    pub cv: CvDocument,
    pub source: ImportSource,
}

/// Accepts text that already is CV JSON, skipping the model.
pub fn import_structured(text: &str) -> Option<CvDocument> {
    let value: Value = serde_json::from_str(text.trim()).ok()?;
    if !value.is_object() {
        return None;
    }
    validate(&sanitize_nulls(value)).ok()
}

/// Structures resume text into a CV. No local fallback: when the model's
/// answer cannot be turned into a valid document, the error is returned.
pub async fn import_cv(ai: &AiContext, resume_text: &str) -> Result<ImportedCv, TaskError> {
    let text = resume_text.trim();
    if text.is_empty() {
        return Err(TaskError::Validation(
            "Resume text is required for AI import.".to_string(),
        ));
    }

    if let Some(cv) = import_structured(text) {
        info!("resume imported from structured JSON");
        return Ok(ImportedCv {
            cv,
            source: ImportSource::DirectJson,
        });
    }

    let answer = ai.generate_non_empty(&prompts::cv_import(text)).await?;
    let candidate = recover_json(&answer).map_err(|e| {
        warn!(error = %e, "import answer had no usable JSON");
        e
    })?;
    let candidate = repair_personal(sanitize_nulls(candidate), PLACEHOLDER_NAME, PLACEHOLDER_EMAIL);
    let cv = validate(&candidate)?;

    info!(
        experience = cv.experience.len(),
        education = cv.education.len(),
        "resume structured with AI"
    );
    Ok(ImportedCv {
        cv,
        source: ImportSource::Ai,
    })
}
