//! Applying AI results to the CV held in form state.
//!
//! A result only ever touches what it targets: a summary replaces the summary,
//! an experience entry replaces the entry with the same id, and a whole
//! document replaces the form only after it has passed validation.

use serde_json::Value;

use crate::models::cv::validate;
use crate::models::{CvDocument, ExperienceEntry, SchemaError};

pub fn apply_summary(cv: &mut CvDocument, summary: &str) {
    let summary = summary.trim();
    if !summary.is_empty() {
        cv.personal.summary = summary.to_string();
    }
}

/// Returns false when the entry was removed from the form while the request
/// was in flight; the result is then dropped.
pub fn apply_experience(cv: &mut CvDocument, entry: ExperienceEntry) -> bool {
    cv.replace_experience(entry)
}

/// Validates `candidate` and, only on success, replaces the whole document.
/// On failure the current document is left exactly as it was.
pub fn apply_document(cv: &mut CvDocument, candidate: &Value) -> Result<(), SchemaError> {
    *cv = validate(candidate)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::models::cv::default_cv;

    #[test]
    fn test_blank_summary_keeps_previous() {
        let mut cv = default_cv();
        let before = cv.personal.summary.clone();
        apply_summary(&mut cv, "  ");
        assert_eq!(cv.personal.summary, before);
        apply_summary(&mut cv, " New summary ");
        assert_eq!(cv.personal.summary, "New summary");
    }

    #[test]
    fn test_concurrent_entry_results_touch_only_their_entry() {
        let mut cv = default_cv();
        let mut first = cv.experience[0].clone();
        let mut second = cv.experience[1].clone();
        first.highlights = vec!["First result".to_string()];
        second.highlights = vec!["Second result".to_string()];

        // results arrive out of order
        assert!(apply_experience(&mut cv, second.clone()));
        assert!(apply_experience(&mut cv, first.clone()));
        assert_eq!(cv.experience[0], first);
        assert_eq!(cv.experience[1], second);
    }

    #[test]
    fn test_result_for_removed_entry_is_dropped() {
        let mut cv = default_cv();
        let mut orphan = cv.experience[1].clone();
        cv.experience.truncate(1);
        orphan.highlights = vec!["Late result".to_string()];
        assert!(!apply_experience(&mut cv, orphan));
        assert_eq!(cv.experience.len(), 1);
    }

    #[test]
    fn test_invalid_document_never_replaces_form() {
        let mut cv = default_cv();
        let before = cv.clone();
        let err = apply_document(&mut cv, &json!({"personal": {"fullName": "X"}})).unwrap_err();
        assert_eq!(err.path, "personal.email");
        assert_eq!(cv, before);

        let replacement = json!({"personal": {"fullName": "Ada", "email": "ada@example.com"}});
        apply_document(&mut cv, &replacement).unwrap();
        assert_eq!(cv.personal.full_name, "Ada");
    }
}
