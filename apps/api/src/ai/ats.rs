// ATS optimization of a full CV.

use tracing::{info, warn};

use crate::ai::fallback::{fallback_ats, ATS_FALLBACK_MESSAGE};
use crate::ai::{prompts, AiContext, TaskError, TaskOutcome};
use crate::models::cv::{repair_personal, sanitize_nulls, validate};
use crate::models::CvDocument;
use crate::recovery::recover_json;

pub async fn optimize_for_ats(ai: &AiContext, cv: CvDocument) -> TaskOutcome<CvDocument> {
    match optimize_with_ai(ai, &cv).await {
        Ok(optimized) => {
            info!("CV optimized for ATS");
            TaskOutcome::ai(optimized)
        }
        Err(e) => {
            warn!(error = %e, "ATS optimization fell back to local rules");
            TaskOutcome::fallback(fallback_ats(&cv), ATS_FALLBACK_MESSAGE)
        }
    }
}

async fn optimize_with_ai(ai: &AiContext, cv: &CvDocument) -> Result<CvDocument, TaskError> {
    let prompt = prompts::ats_optimization(cv)?;
    let answer = ai.generate_non_empty(&prompt).await?;
    let candidate = repair_personal(
        sanitize_nulls(recover_json(&answer)?),
        &cv.personal.full_name,
        &cv.personal.email,
    );
    Ok(validate(&candidate)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::testing::{context, ScriptedProvider};
    use crate::models::cv::default_cv;

    #[tokio::test]
    async fn test_ats_accepts_valid_model_output() {
        let cv = default_cv();
        let mut improved = serde_json::to_value(&cv).unwrap();
        improved["personal"]["summary"] = "ATS ready summary".into();
        improved["personal"]["fullName"] = serde_json::Value::Null;
        let answer = format!("```json\n{improved}\n```");

        let (ai, _) = context(ScriptedProvider::texts(&[&answer]));
        let out = optimize_for_ats(&ai, cv.clone()).await;
        assert!(!out.fallback);
        assert_eq!(out.value.personal.summary, "ATS ready summary");
        assert_eq!(out.value.personal.full_name, cv.personal.full_name);
        assert_eq!(out.value.experience[0].id, cv.experience[0].id);
    }

    #[tokio::test]
    async fn test_ats_falls_back_on_provider_failure() {
        let mut cv = default_cv();
        cv.experience[0].highlights = vec!["Built a dashboard.".to_string()];
        let (ai, _) = context(ScriptedProvider::failing());

        let out = optimize_for_ats(&ai, cv.clone()).await;
        assert!(out.fallback);
        assert_eq!(out.value.experience[0].highlights, vec!["Achieved Built a dashboard."]);
        assert_eq!(out.value.personal.email, cv.personal.email);
    }

    #[tokio::test]
    async fn test_ats_falls_back_on_invalid_output() {
        let answer = r#"{"personal": {"fullName": "X", "email": "x@y.z"}, "experience": [{"role": "only"}]}"#;
        let (ai, _) = context(ScriptedProvider::texts(&[answer]));
        let out = optimize_for_ats(&ai, default_cv()).await;
        assert!(out.fallback);
        assert_eq!(out.message.as_deref(), Some(ATS_FALLBACK_MESSAGE));
    }
}
