// Internship document analysis and application email drafting.
// Neither operation has a local fallback; failures surface to the caller.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::ai::{prompts, AiContext, TaskError};
use crate::models::{CvDocument, SchemaError};
use crate::recovery::{recover_json, ExtractionError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InternshipSubject {
    pub subject: String,
    pub explanation: String,
}

/// What the client keeps between analysis and email generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InternshipContext {
    pub internship_text: String,
    #[serde(default)]
    pub company_email: Option<String>,
    #[serde(default)]
    pub company_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InternshipAnalysis {
    pub subjects: Vec<InternshipSubject>,
    pub company_email: Option<String>,
    pub company_name: Option<String>,
    pub context: InternshipContext,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InternshipEmails {
    pub applicant_email: String,
    pub company_email: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawAnalysis {
    #[serde(default)]
    subjects: Vec<RawSubject>,
    #[serde(default)]
    company_email: Option<String>,
    #[serde(default)]
    company_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawSubject {
    #[serde(default)]
    subject: Option<String>,
    #[serde(default)]
    explanation: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawEmails {
    #[serde(default)]
    applicant_email: Option<String>,
    #[serde(default)]
    company_email: Option<String>,
}

/// Blank and literal "null" answers count as absent.
fn present(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty() && !v.eq_ignore_ascii_case("null"))
}

fn parse_answer<T: for<'de> Deserialize<'de>>(answer: &str) -> Result<T, TaskError> {
    let value: Value = recover_json(answer)?;
    serde_json::from_value(value).map_err(|e| TaskError::Extraction(ExtractionError::InvalidJson(e)))
}

pub async fn suggest_internship_subjects(
    ai: &AiContext,
    internship_text: &str,
    cv: &CvDocument,
) -> Result<InternshipAnalysis, TaskError> {
    let text = internship_text.trim();
    if text.is_empty() {
        return Err(TaskError::Validation(
            "CV data and internship text are required.".to_string(),
        ));
    }

    let answer = ai
        .generate_non_empty(&prompts::internship_subjects(text, cv))
        .await?;
    let raw: RawAnalysis = parse_answer(&answer)?;

    if raw.subjects.is_empty() {
        return Err(SchemaError::new("subjects", "must not be empty").into());
    }
    let subjects = raw
        .subjects
        .into_iter()
        .enumerate()
        .map(|(i, s)| match (present(s.subject), present(s.explanation)) {
            (Some(subject), Some(explanation)) => Ok(InternshipSubject {
                subject,
                explanation,
            }),
            (None, _) => Err(SchemaError::new(format!("subjects[{i}].subject"), "is required")),
            (_, None) => Err(SchemaError::new(
                format!("subjects[{i}].explanation"),
                "is required",
            )),
        })
        .collect::<Result<Vec<_>, _>>()?;

    let company_email = present(raw.company_email);
    let company_name = present(raw.company_name);
    info!(
        subjects = subjects.len(),
        has_company_email = company_email.is_some(),
        "internship analyzed"
    );

    Ok(InternshipAnalysis {
        subjects,
        context: InternshipContext {
            internship_text: text.to_string(),
            company_email: company_email.clone(),
            company_name: company_name.clone(),
        },
        company_email,
        company_name,
    })
}

pub async fn generate_internship_emails(
    ai: &AiContext,
    internship_text: &str,
    cv: &CvDocument,
    subject: &str,
) -> Result<InternshipEmails, TaskError> {
    let text = internship_text.trim();
    let subject = subject.trim();
    if text.is_empty() || subject.is_empty() {
        return Err(TaskError::Validation(
            "CV data, internship text, and selected subject are required.".to_string(),
        ));
    }

    let answer = ai
        .generate_non_empty(&prompts::internship_emails(text, cv, subject))
        .await?;
    let raw: RawEmails = parse_answer(&answer)?;

    let applicant_email = present(raw.applicant_email)
        .ok_or_else(|| SchemaError::new("applicantEmail", "is required"))?;
    let company_email = present(raw.company_email)
        .ok_or_else(|| SchemaError::new("companyEmail", "is required"))?;

    info!("internship emails generated");
    Ok(InternshipEmails {
        applicant_email,
        company_email,
    })
}
