// Whole-CV adaptation to a job description.

use tokio::task::JoinSet;
use tracing::{info, warn};

use crate::ai::enhance::enhance_experience;
use crate::ai::fallback::{
    fallback_adapt_skills, fallback_adapt_summary, fallback_experience, ADAPT_FALLBACK_MESSAGE,
};
use crate::ai::{prompts, AiContext, TaskError, TaskOutcome};
use crate::models::{CvDocument, ExperienceEntry};
use crate::recovery::{extract_keywords, merge_skills, parse_keyword_list};

const MAX_KEYWORDS: usize = 20;
const MAX_MERGED_SKILLS: usize = 18;

/// Keywords the job asks for. Falls back to local token extraction.
pub async fn suggest_keywords(ai: &AiContext, job_description: &str) -> TaskOutcome<Vec<String>> {
    let prompt = prompts::keyword_extraction(job_description);
    let failure = match ai.generate_non_empty(&prompt).await {
        Ok(text) => {
            let keywords = parse_keyword_list(&text, MAX_KEYWORDS);
            if !keywords.is_empty() {
                return TaskOutcome::ai(keywords);
            }
            TaskError::EmptyResponse
        }
        Err(e) => e,
    };
    warn!(error = %failure, "keyword extraction fell back to local tokens");
    TaskOutcome::fallback(
        extract_keywords(job_description, MAX_KEYWORDS),
        ADAPT_FALLBACK_MESSAGE,
    )
}

pub async fn adapt_summary(
    ai: &AiContext,
    summary: &str,
    keywords: &[String],
) -> TaskOutcome<String> {
    let prompt = prompts::summary_adaptation(summary, keywords);
    match ai.generate_non_empty(&prompt).await {
        Ok(text) => TaskOutcome::ai(text),
        Err(e) => {
            warn!(error = %e, "summary adaptation fell back to local rewrite");
            TaskOutcome::fallback(
                fallback_adapt_summary(summary, keywords),
                ADAPT_FALLBACK_MESSAGE,
            )
        }
    }
}

/// Adapts summary, experience highlights, and skills to `job_description`.
///
/// Experience entries are enhanced concurrently; results are reassembled in
/// the original order. Each part falls back independently and the outcome is
/// flagged `fallback` when any part did. Dropping the returned future aborts
/// the in-flight entry tasks.
pub async fn adapt_cv(
    ai: &AiContext,
    cv: CvDocument,
    job_description: &str,
) -> Result<TaskOutcome<CvDocument>, TaskError> {
    let job = job_description.trim();
    if job.is_empty() {
        return Err(TaskError::Validation(
            "CV data and job description are required.".to_string(),
        ));
    }

    let keywords = suggest_keywords(ai, job).await;
    let summary = adapt_summary(ai, &cv.personal.summary, &keywords.value).await;

    let mut tasks = JoinSet::new();
    for (index, entry) in cv.experience.iter().cloned().enumerate() {
        let ai = ai.clone();
        let job = job.to_string();
        let seeded = keywords.value.clone();
        tasks.spawn(async move {
            let outcome = enhance_experience(&ai, entry, Some(&job), &seeded).await;
            (index, outcome)
        });
    }

    let mut enhanced: Vec<Option<TaskOutcome<ExperienceEntry>>> =
        (0..cv.experience.len()).map(|_| None).collect();
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((index, outcome)) => enhanced[index] = Some(outcome),
            Err(e) => warn!(error = %e, "experience task did not complete"),
        }
    }

    let mut any_fallback = keywords.fallback || summary.fallback;
    let experience = cv
        .experience
        .iter()
        .zip(enhanced)
        .map(|(original, outcome)| {
            let outcome = outcome.unwrap_or_else(|| {
                TaskOutcome::fallback(
                    fallback_experience(original, &keywords.value),
                    ADAPT_FALLBACK_MESSAGE,
                )
            });
            any_fallback |= outcome.fallback;
            outcome.value
        })
        .collect();

    let skills = if keywords.fallback {
        fallback_adapt_skills(&cv.skills, &keywords.value)
    } else {
        merge_skills(&cv.skills, &keywords.value, MAX_MERGED_SKILLS)
    };

    let mut adapted = cv;
    adapted.personal.summary = summary.value;
    adapted.experience = experience;
    adapted.skills = skills;

    info!(
        keywords = keywords.value.len(),
        fallback = any_fallback,
        "CV adapted to job description"
    );

    Ok(if any_fallback {
        TaskOutcome::fallback(adapted, ADAPT_FALLBACK_MESSAGE)
    } else {
        TaskOutcome::ai(adapted)
    })
}
