// Summary and single-experience enhancement.

use tracing::{debug, warn};

use crate::ai::fallback::{
    fallback_experience, fallback_summary, EXPERIENCE_FALLBACK_MESSAGE, SUMMARY_FALLBACK_MESSAGE,
};
use crate::ai::{prompts, AiContext, TaskError, TaskOutcome};
use crate::models::cv::EXPERIENCE_HIGHLIGHT_MAX;
use crate::models::ExperienceEntry;
use crate::recovery::{extract_bullets, extract_keywords};

const MAX_BULLETS: usize = 5;
/// Keywords derived from the job description when the caller seeds none.
const DERIVED_KEYWORDS: usize = 10;

/// Rewrites a professional summary. Never fails on provider trouble: the
/// local fallback is returned instead.
pub async fn enhance_summary(
    ai: &AiContext,
    summary: &str,
    context: Option<&str>,
) -> Result<TaskOutcome<String>, TaskError> {
    let summary = summary.trim();
    if summary.is_empty() {
        return Err(TaskError::Validation("Summary is required.".to_string()));
    }

    let prompt = prompts::summary_enhancement(summary, context);
    match ai.generate_non_empty(&prompt).await {
        Ok(text) => Ok(TaskOutcome::ai(text)),
        Err(e) => {
            warn!(error = %e, "summary enhancement fell back to local rewrite");
            Ok(TaskOutcome::fallback(
                fallback_summary(summary, context),
                SUMMARY_FALLBACK_MESSAGE,
            ))
        }
    }
}

/// Rewrites the highlights of one experience entry. Identity fields and the
/// id are carried over from the input.
pub async fn enhance_experience(
    ai: &AiContext,
    entry: ExperienceEntry,
    job_description: Option<&str>,
    keywords: &[String],
) -> TaskOutcome<ExperienceEntry> {
    let keywords = if keywords.is_empty() {
        job_description
            .map(|job| extract_keywords(job, DERIVED_KEYWORDS))
            .unwrap_or_default()
    } else {
        keywords.to_vec()
    };

    let prompt = prompts::experience_enhancement(&entry, job_description, &keywords);
    let failure = match ai.generate_non_empty(&prompt).await {
        Ok(text) => {
            let bullets: Vec<String> = extract_bullets(&text, usize::MAX)
                .into_iter()
                .filter(|b| b.chars().count() <= EXPERIENCE_HIGHLIGHT_MAX)
                .take(MAX_BULLETS)
                .collect();
            if !bullets.is_empty() {
                debug!(entry = %entry.id, bullets = bullets.len(), "experience enhanced");
                return TaskOutcome::ai(ExperienceEntry {
                    highlights: bullets,
                    ..entry
                });
            }
            TaskError::EmptyResponse
        }
        Err(e) => e,
    };

    warn!(entry = %entry.id, error = %failure, "experience enhancement fell back to local rewrite");
    TaskOutcome::fallback(
        fallback_experience(&entry, &keywords),
        EXPERIENCE_FALLBACK_MESSAGE,
    )
}
