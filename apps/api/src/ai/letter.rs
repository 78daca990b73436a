// Motivation letter generation.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::ai::fallback::{fallback_letter, LETTER_FALLBACK_MESSAGE};
use crate::ai::{prompts, AiContext, TaskError, TaskOutcome};
use crate::models::CvDocument;

/// Answers shorter than this are treated as a failed generation.
const MIN_LETTER_CHARS: usize = 100;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LetterLanguage {
    #[default]
    En,
    Fr,
}

impl std::str::FromStr for LetterLanguage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" => Ok(Self::En),
            "fr" => Ok(Self::Fr),
            other => Err(format!("unsupported letter language: {other}")),
        }
    }
}

pub async fn generate_motivation_letter(
    ai: &AiContext,
    cv: &CvDocument,
    job_position: &str,
    language: LetterLanguage,
) -> Result<TaskOutcome<String>, TaskError> {
    let job = job_position.trim();
    if job.is_empty() {
        return Err(TaskError::Validation(
            "CV data and job position are required.".to_string(),
        ));
    }

    let prompt = prompts::motivation_letter(cv, job, language);
    let failure = match ai.generate_non_empty(&prompt).await {
        Ok(letter) if letter.chars().count() >= MIN_LETTER_CHARS => {
            return Ok(TaskOutcome::ai(letter));
        }
        Ok(letter) => format!("letter too short ({} chars)", letter.chars().count()),
        Err(e) => e.to_string(),
    };

    warn!(error = %failure, ?language, "motivation letter fell back to template");
    Ok(TaskOutcome::fallback(
        fallback_letter(cv, job, language),
        LETTER_FALLBACK_MESSAGE,
    ))
}
