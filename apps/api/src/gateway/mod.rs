//! The AI gateway: one entry point that checks configuration, resolves the
//! action, validates its payload into a typed request, and dispatches to the
//! matching task operation.

pub mod handlers;

use std::fmt;
use std::str::FromStr;

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::ai::import::import_cv;
use crate::ai::internship::{
    generate_internship_emails, suggest_internship_subjects, InternshipAnalysis, InternshipContext,
    InternshipEmails,
};
use crate::ai::letter::{generate_motivation_letter, LetterLanguage};
use crate::ai::{adapt, ats, enhance, AiContext, TaskOutcome};
use crate::errors::AppError;
use crate::models::cv::{validate, validate_experience};
use crate::models::{AiConfig, CvDocument, ExperienceEntry};

const IMPORT_FAILED: &str = "AI could not structure that resume yet.";
const ANALYZE_FAILED: &str = "Failed to analyze internship document.";
const EMAILS_FAILED: &str = "Failed to generate internship emails.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AiAction {
    EnhanceSummary,
    EnhanceExperience,
    AdaptCv,
    ImportCv,
    OptimizeAts,
    GenerateMotivationLetter,
    AnalyzeInternship,
    GenerateInternshipEmails,
}

impl AiAction {
    pub const ALL: [AiAction; 8] = [
        AiAction::EnhanceSummary,
        AiAction::EnhanceExperience,
        AiAction::AdaptCv,
        AiAction::ImportCv,
        AiAction::OptimizeAts,
        AiAction::GenerateMotivationLetter,
        AiAction::AnalyzeInternship,
        AiAction::GenerateInternshipEmails,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            AiAction::EnhanceSummary => "enhance-summary",
            AiAction::EnhanceExperience => "enhance-experience",
            AiAction::AdaptCv => "adapt-cv",
            AiAction::ImportCv => "import-cv",
            AiAction::OptimizeAts => "optimize-ats",
            AiAction::GenerateMotivationLetter => "generate-motivation-letter",
            AiAction::AnalyzeInternship => "analyze-internship",
            AiAction::GenerateInternshipEmails => "generate-internship-emails",
        }
    }

    /// 400 message when the payload lacks what this action needs.
    fn required_message(self) -> &'static str {
        match self {
            AiAction::EnhanceSummary => "Summary is required.",
            AiAction::EnhanceExperience => "Experience payload is missing.",
            AiAction::AdaptCv => "CV data and job description are required.",
            AiAction::ImportCv => "Resume text is required for AI import.",
            AiAction::OptimizeAts => "CV data is required for ATS optimization.",
            AiAction::GenerateMotivationLetter => "CV data and job position are required.",
            AiAction::AnalyzeInternship => "CV data and internship text are required.",
            AiAction::GenerateInternshipEmails => {
                "CV data, internship text, and selected subject are required."
            }
        }
    }
}

impl fmt::Display for AiAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AiAction {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AiAction::ALL
            .into_iter()
            .find(|action| action.as_str() == s)
            .ok_or_else(|| AppError::Validation("Unsupported AI action.".to_string()))
    }
}

/// Wire shape of `POST /api/ai`.
#[derive(Debug, Deserialize)]
pub struct GatewayRequest {
    #[serde(default)]
    pub action: String,
    #[serde(default)]
    pub payload: Value,
    #[serde(default)]
    pub config: Option<AiConfig>,
}

// ────────────────────────────────────────────────────────────────────────────
// Typed payloads
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum AiRequest {
    EnhanceSummary {
        summary: String,
        context: Option<String>,
    },
    EnhanceExperience {
        experience: ExperienceEntry,
        job_description: Option<String>,
        keywords: Vec<String>,
    },
    AdaptCv {
        cv: CvDocument,
        job_description: String,
    },
    ImportCv {
        text: String,
    },
    OptimizeAts {
        cv: CvDocument,
    },
    GenerateMotivationLetter {
        cv: CvDocument,
        job_position: String,
        language: LetterLanguage,
    },
    AnalyzeInternship {
        cv: CvDocument,
        internship_text: String,
    },
    GenerateInternshipEmails {
        cv: CvDocument,
        internship_text: String,
        selected_subject: String,
    },
}

#[derive(Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SummaryPayload {
    summary: Option<String>,
    context: Option<String>,
}

#[derive(Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ExperiencePayload {
    experience: Option<Value>,
    job_description: Option<String>,
    keywords: Option<Vec<String>>,
}

#[derive(Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CvPayload {
    cv: Option<Value>,
    job_description: Option<String>,
    job_position: Option<String>,
    language: Option<String>,
    internship_text: Option<String>,
    selected_subject: Option<String>,
    context: Option<InternshipContext>,
}

#[derive(Default, Deserialize)]
struct ImportPayload {
    text: Option<String>,
}

/// Present and not just whitespace.
fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl AiRequest {
    /// Validates `payload` for `action`. Every failure is a 400 carrying the
    /// action's own message, or the schema error for a malformed CV.
    pub fn parse(action: AiAction, payload: Value) -> Result<Self, AppError> {
        let required = || AppError::Validation(action.required_message().to_string());

        match action {
            AiAction::EnhanceSummary => {
                let p: SummaryPayload = payload_as(payload, action)?;
                Ok(AiRequest::EnhanceSummary {
                    summary: non_blank(p.summary).ok_or_else(required)?,
                    context: non_blank(p.context),
                })
            }
            AiAction::EnhanceExperience => {
                let p: ExperiencePayload = payload_as(payload, action)?;
                let raw = p.experience.ok_or_else(required)?;
                let experience = validate_experience(&raw).map_err(|e| {
                    AppError::Validation(format!("Invalid experience data: {e}"))
                })?;
                Ok(AiRequest::EnhanceExperience {
                    experience,
                    job_description: non_blank(p.job_description),
                    keywords: p.keywords.unwrap_or_default(),
                })
            }
            AiAction::ImportCv => {
                let p: ImportPayload = payload_as(payload, action)?;
                Ok(AiRequest::ImportCv {
                    text: non_blank(p.text).ok_or_else(required)?,
                })
            }
            AiAction::AdaptCv => {
                let p: CvPayload = payload_as(payload, action)?;
                let (Some(cv), Some(job_description)) = (p.cv, non_blank(p.job_description))
                else {
                    return Err(required());
                };
                Ok(AiRequest::AdaptCv {
                    cv: parse_cv(&cv)?,
                    job_description,
                })
            }
            AiAction::OptimizeAts => {
                let p: CvPayload = payload_as(payload, action)?;
                let cv = p.cv.ok_or_else(required)?;
                Ok(AiRequest::OptimizeAts { cv: parse_cv(&cv)? })
            }
            AiAction::GenerateMotivationLetter => {
                let p: CvPayload = payload_as(payload, action)?;
                let (Some(cv), Some(job_position)) = (p.cv, non_blank(p.job_position)) else {
                    return Err(required());
                };
                let language = match p.language {
                    Some(lang) => lang.parse::<LetterLanguage>().map_err(AppError::Validation)?,
                    None => LetterLanguage::default(),
                };
                Ok(AiRequest::GenerateMotivationLetter {
                    cv: parse_cv(&cv)?,
                    job_position,
                    language,
                })
            }
            AiAction::AnalyzeInternship => {
                let p: CvPayload = payload_as(payload, action)?;
                let (Some(cv), Some(internship_text)) = (p.cv, non_blank(p.internship_text))
                else {
                    return Err(required());
                };
                Ok(AiRequest::AnalyzeInternship {
                    cv: parse_cv(&cv)?,
                    internship_text,
                })
            }
            AiAction::GenerateInternshipEmails => {
                let p: CvPayload = payload_as(payload, action)?;
                // the analysis context stands in for a bare internshipText
                let internship_text = non_blank(p.internship_text)
                    .or_else(|| non_blank(p.context.map(|c| c.internship_text)));
                let (Some(cv), Some(internship_text), Some(selected_subject)) =
                    (p.cv, internship_text, non_blank(p.selected_subject))
                else {
                    return Err(required());
                };
                Ok(AiRequest::GenerateInternshipEmails {
                    cv: parse_cv(&cv)?,
                    internship_text,
                    selected_subject,
                })
            }
        }
    }

    pub fn action(&self) -> AiAction {
        match self {
            AiRequest::EnhanceSummary { .. } => AiAction::EnhanceSummary,
            AiRequest::EnhanceExperience { .. } => AiAction::EnhanceExperience,
            AiRequest::AdaptCv { .. } => AiAction::AdaptCv,
            AiRequest::ImportCv { .. } => AiAction::ImportCv,
            AiRequest::OptimizeAts { .. } => AiAction::OptimizeAts,
            AiRequest::GenerateMotivationLetter { .. } => AiAction::GenerateMotivationLetter,
            AiRequest::AnalyzeInternship { .. } => AiAction::AnalyzeInternship,
            AiRequest::GenerateInternshipEmails { .. } => AiAction::GenerateInternshipEmails,
        }
    }
}

/// A null or absent payload reads as an empty one; wrongly typed fields are
/// treated as missing.
fn payload_as<T: DeserializeOwned + Default>(payload: Value, action: AiAction) -> Result<T, AppError> {
    if payload.is_null() {
        return Ok(T::default());
    }
    serde_json::from_value(payload)
        .map_err(|_| AppError::Validation(action.required_message().to_string()))
}

fn parse_cv(value: &Value) -> Result<CvDocument, AppError> {
    validate(value).map_err(|e| AppError::Validation(format!("Invalid CV data: {e}")))
}

// ────────────────────────────────────────────────────────────────────────────
// Responses
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FallbackStatus {
    pub fallback: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl FallbackStatus {
    fn none() -> Self {
        Self {
            fallback: false,
            message: None,
        }
    }
}

fn split<T>(outcome: TaskOutcome<T>) -> (T, FallbackStatus) {
    (
        outcome.value,
        FallbackStatus {
            fallback: outcome.fallback,
            message: outcome.message,
        },
    )
}

/// Success envelope: the action's result as a flat object plus its fallback
/// status.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AiResponse {
    Summary {
        summary: String,
        #[serde(flatten)]
        status: FallbackStatus,
    },
    Experience {
        experience: ExperienceEntry,
        #[serde(flatten)]
        status: FallbackStatus,
    },
    Cv {
        cv: CvDocument,
        #[serde(flatten)]
        status: FallbackStatus,
        #[serde(skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
    },
    Letter {
        letter: String,
        #[serde(flatten)]
        status: FallbackStatus,
    },
    Internship {
        #[serde(flatten)]
        analysis: InternshipAnalysis,
        #[serde(flatten)]
        status: FallbackStatus,
    },
    Emails {
        #[serde(flatten)]
        emails: InternshipEmails,
        #[serde(flatten)]
        status: FallbackStatus,
    },
}

// ────────────────────────────────────────────────────────────────────────────
// Entry point
// ────────────────────────────────────────────────────────────────────────────

/// Gateway entry point. Configuration is checked before anything else so an
/// unconfigured service answers 503 regardless of the request's content.
pub async fn handle(ai: &AiContext, action: &str, payload: Value) -> Result<AiResponse, AppError> {
    ai.ensure_available()
        .map_err(|e| AppError::from_task(e, "AI service is not configured."))?;
    let action: AiAction = action.parse()?;
    let request = AiRequest::parse(action, payload)?;
    dispatch(ai, request).await
}

pub async fn dispatch(ai: &AiContext, request: AiRequest) -> Result<AiResponse, AppError> {
    info!(action = %request.action(), "dispatching AI action");
    let response = match request {
        AiRequest::EnhanceSummary { summary, context } => {
            let outcome = enhance::enhance_summary(ai, &summary, context.as_deref())
                .await
                .map_err(|e| AppError::from_task(e, "Failed to enhance summary."))?;
            let (summary, status) = split(outcome);
            AiResponse::Summary { summary, status }
        }
        AiRequest::EnhanceExperience {
            experience,
            job_description,
            keywords,
        } => {
            let outcome =
                enhance::enhance_experience(ai, experience, job_description.as_deref(), &keywords)
                    .await;
            let (experience, status) = split(outcome);
            AiResponse::Experience { experience, status }
        }
        AiRequest::AdaptCv {
            cv,
            job_description,
        } => {
            let outcome = adapt::adapt_cv(ai, cv, &job_description)
                .await
                .map_err(|e| AppError::from_task(e, "Failed to adapt CV."))?;
            let (cv, status) = split(outcome);
            AiResponse::Cv {
                cv,
                status,
                reason: None,
            }
        }
        AiRequest::ImportCv { text } => {
            let imported = import_cv(ai, &text)
                .await
                .map_err(|e| AppError::from_task(e, IMPORT_FAILED))?;
            AiResponse::Cv {
                cv: imported.cv,
                status: FallbackStatus::none(),
                reason: Some(imported.source.reason().to_string()),
            }
        }
        AiRequest::OptimizeAts { cv } => {
            let (cv, status) = split(ats::optimize_for_ats(ai, cv).await);
            AiResponse::Cv {
                cv,
                status,
                reason: None,
            }
        }
        AiRequest::GenerateMotivationLetter {
            cv,
            job_position,
            language,
        } => {
            let outcome = generate_motivation_letter(ai, &cv, &job_position, language)
                .await
                .map_err(|e| AppError::from_task(e, "Failed to generate motivation letter."))?;
            let (letter, status) = split(outcome);
            AiResponse::Letter { letter, status }
        }
        AiRequest::AnalyzeInternship {
            cv,
            internship_text,
        } => {
            let analysis = suggest_internship_subjects(ai, &internship_text, &cv)
                .await
                .map_err(|e| AppError::from_task(e, ANALYZE_FAILED))?;
            AiResponse::Internship {
                analysis,
                status: FallbackStatus::none(),
            }
        }
        AiRequest::GenerateInternshipEmails {
            cv,
            internship_text,
            selected_subject,
        } => {
            let emails = generate_internship_emails(ai, &internship_text, &cv, &selected_subject)
                .await
                .map_err(|e| AppError::from_task(e, EMAILS_FAILED))?;
            AiResponse::Emails {
                emails,
                status: FallbackStatus::none(),
            }
        }
    };
    Ok(response)
}
