//! The canonical CV document and the validator that produces it.
//!
//! `CvDocument` deserialization always goes through [`validate`], so any value
//! of this type has passed the schema: required fields are present, optional
//! fields hold their zero value instead of `null`, and every list entry carries
//! a locally unique id.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use uuid::Uuid;

pub const EXPERIENCE_HIGHLIGHT_MAX: usize = 260;
pub const EDUCATION_HIGHLIGHT_MAX: usize = 200;
pub const PROJECT_HIGHLIGHT_MAX: usize = 220;

/// Substituted for a missing name when structuring an imported resume.
pub const PLACEHOLDER_NAME: &str = "Candidate";
/// Substituted for an unusable email when structuring an imported resume.
pub const PLACEHOLDER_EMAIL: &str = "candidate@example.com";

/// First violated field, e.g. `experience[1].company: is required`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{path}: {message}")]
pub struct SchemaError {
    pub path: String,
    pub message: String,
}

impl SchemaError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PhotoStyle {
    #[default]
    Square,
    Circle,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Personal {
    pub full_name: String,
    pub title: String,
    pub summary: String,
    pub email: String,
    pub phone: String,
    pub location: String,
    pub website: String,
    pub linkedin: String,
    pub photo_style: PhotoStyle,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "Value")]
pub struct ExperienceEntry {
    pub id: String,
    pub role: String,
    pub company: String,
    pub location: String,
    pub start_date: String,
    pub end_date: String,
    pub highlights: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EducationEntry {
    pub id: String,
    pub school: String,
    pub degree: String,
    pub location: String,
    pub start_date: String,
    pub end_date: String,
    pub highlights: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectEntry {
    pub id: String,
    pub name: String,
    pub summary: String,
    pub link: String,
    pub highlights: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "Value")]
pub struct CvDocument {
    pub personal: Personal,
    pub experience: Vec<ExperienceEntry>,
    pub education: Vec<EducationEntry>,
    pub projects: Vec<ProjectEntry>,
    pub skills: Vec<String>,
    pub certifications: Vec<String>,
    pub languages: Vec<String>,
}

impl TryFrom<Value> for CvDocument {
    type Error = SchemaError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        validate(&value)
    }
}

impl TryFrom<Value> for ExperienceEntry {
    type Error = SchemaError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        validate_experience(&value)
    }
}

impl CvDocument {
    /// Replaces the experience entry whose id matches `entry.id`.
    /// Returns false (and leaves the document untouched) when no entry matches.
    pub fn replace_experience(&mut self, entry: ExperienceEntry) -> bool {
        match self.experience.iter_mut().find(|e| e.id == entry.id) {
            Some(slot) => {
                *slot = entry;
                true
            }
            None => false,
        }
    }

    pub fn latest_experience(&self) -> Option<&ExperienceEntry> {
        self.experience.first()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Validation
// ────────────────────────────────────────────────────────────────────────────

/// Validates an untyped candidate into a `CvDocument`.
///
/// Required: `personal.fullName`, a plausible `personal.email`, and the
/// required fields of every list entry. Everything else is coerced to its zero
/// value. Idempotent over its own serialized output.
pub fn validate(candidate: &Value) -> Result<CvDocument, SchemaError> {
    let root = Fields::object(candidate, "")?;

    let personal_value = root
        .get("personal")
        .ok_or_else(|| SchemaError::new("personal", "is required"))?;
    let personal = validate_personal(personal_value)?;

    let experience = root
        .entries("experience")
        .iter()
        .enumerate()
        .map(|(i, v)| experience_at(v, &format!("experience[{i}]")))
        .collect::<Result<Vec<_>, _>>()?;

    let education = root
        .entries("education")
        .iter()
        .enumerate()
        .map(|(i, v)| education_at(v, &format!("education[{i}]")))
        .collect::<Result<Vec<_>, _>>()?;

    let projects = root
        .entries("projects")
        .iter()
        .enumerate()
        .map(|(i, v)| project_at(v, &format!("projects[{i}]")))
        .collect::<Result<Vec<_>, _>>()?;

    let doc = CvDocument {
        personal,
        experience,
        education,
        projects,
        skills: root.strings("skills", None)?,
        certifications: root.strings("certifications", None)?,
        languages: root.strings("languages", None)?,
    };

    Ok(ensure_ids(doc))
}

/// Validates a single experience entry, assigning `ai_experience_0` when it
/// arrives without an id.
pub fn validate_experience(candidate: &Value) -> Result<ExperienceEntry, SchemaError> {
    let mut entry = experience_at(candidate, "experience")?;
    if entry.id.is_empty() {
        entry.id = "ai_experience_0".to_string();
    }
    Ok(entry)
}

fn validate_personal(value: &Value) -> Result<Personal, SchemaError> {
    let fields = Fields::object(value, "personal")?;
    let full_name = fields.required_str("fullName")?;
    let email = fields.required_str("email")?;
    if !is_plausible_email(&email) {
        return Err(SchemaError::new("personal.email", "must be a valid email"));
    }

    let photo_style = match fields.optional_str("photoStyle").as_str() {
        "circle" => PhotoStyle::Circle,
        _ => PhotoStyle::Square,
    };

    Ok(Personal {
        full_name,
        title: fields.optional_str("title"),
        summary: fields.optional_str("summary"),
        email,
        phone: fields.optional_str("phone"),
        location: fields.optional_str("location"),
        website: fields.optional_str("website"),
        linkedin: fields.optional_str("linkedin"),
        photo_style,
    })
}

fn experience_at(value: &Value, path: &str) -> Result<ExperienceEntry, SchemaError> {
    let fields = Fields::object(value, path)?;
    Ok(ExperienceEntry {
        id: fields.optional_str("id"),
        role: fields.required_str("role")?,
        company: fields.required_str("company")?,
        location: fields.optional_str("location"),
        start_date: fields.optional_str("startDate"),
        end_date: fields.optional_str("endDate"),
        highlights: fields.strings("highlights", Some(EXPERIENCE_HIGHLIGHT_MAX))?,
    })
}

fn education_at(value: &Value, path: &str) -> Result<EducationEntry, SchemaError> {
    let fields = Fields::object(value, path)?;
    Ok(EducationEntry {
        id: fields.optional_str("id"),
        school: fields.required_str("school")?,
        degree: fields.required_str("degree")?,
        location: fields.optional_str("location"),
        start_date: fields.optional_str("startDate"),
        end_date: fields.optional_str("endDate"),
        highlights: fields.strings("highlights", Some(EDUCATION_HIGHLIGHT_MAX))?,
    })
}

fn project_at(value: &Value, path: &str) -> Result<ProjectEntry, SchemaError> {
    let fields = Fields::object(value, path)?;
    Ok(ProjectEntry {
        id: fields.optional_str("id"),
        name: fields.required_str("name")?,
        summary: fields.optional_str("summary"),
        link: fields.optional_str("link"),
        highlights: fields.strings("highlights", Some(PROJECT_HIGHLIGHT_MAX))?,
    })
}

/// Basic syntax check: one `@` with something on both sides and no spaces.
pub fn is_plausible_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.is_empty()
                && !domain.contains('@')
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    }
}

/// Read-only view over one JSON object, tracking its path for error messages.
struct Fields<'a> {
    map: &'a Map<String, Value>,
    path: String,
}

impl<'a> Fields<'a> {
    fn object(value: &'a Value, path: &str) -> Result<Self, SchemaError> {
        match value {
            Value::Object(map) => Ok(Self {
                map,
                path: path.to_string(),
            }),
            _ => Err(SchemaError::new(
                if path.is_empty() { "$" } else { path },
                "must be an object",
            )),
        }
    }

    fn path_of(&self, key: &str) -> String {
        if self.path.is_empty() {
            key.to_string()
        } else {
            format!("{}.{key}", self.path)
        }
    }

    fn get(&self, key: &str) -> Option<&'a Value> {
        self.map.get(key).filter(|v| !v.is_null())
    }

    fn required_str(&self, key: &str) -> Result<String, SchemaError> {
        match self.get(key) {
            Some(Value::String(s)) if !s.trim().is_empty() => Ok(s.trim().to_string()),
            Some(Value::String(_)) | None => Err(SchemaError::new(self.path_of(key), "is required")),
            Some(_) => Err(SchemaError::new(self.path_of(key), "must be a string")),
        }
    }

    /// Missing or null becomes `""`; scalars are stringified; anything else is dropped.
    fn optional_str(&self, key: &str) -> String {
        self.get(key).map(scalar_to_string).unwrap_or_default()
    }

    fn entries(&self, key: &str) -> &'a [Value] {
        match self.get(key) {
            Some(Value::Array(items)) => items.as_slice(),
            _ => &[],
        }
    }

    fn strings(&self, key: &str, max_chars: Option<usize>) -> Result<Vec<String>, SchemaError> {
        let mut out = Vec::new();
        for (i, item) in self.entries(key).iter().enumerate() {
            let text = scalar_to_string(item);
            if text.is_empty() {
                continue;
            }
            if let Some(max) = max_chars {
                if text.chars().count() > max {
                    return Err(SchemaError::new(
                        format!("{}[{i}]", self.path_of(key)),
                        format!("must be at most {max} characters"),
                    ));
                }
            }
            out.push(text);
        }
        Ok(out)
    }
}

fn scalar_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Null sanitizing and id assignment
// ────────────────────────────────────────────────────────────────────────────

/// Keys whose values are lists in the CV schema; a `null` there becomes `[]`.
const LIST_KEYS: &[&str] = &[
    "experience",
    "education",
    "projects",
    "skills",
    "certifications",
    "languages",
    "highlights",
];

/// Recursively replaces `null` with `[]` under list-typed keys and `""`
/// everywhere else. LLMs routinely emit `null` for "no data".
pub fn sanitize_nulls(candidate: Value) -> Value {
    sanitize_under(candidate, None)
}

fn sanitize_under(value: Value, key: Option<&str>) -> Value {
    match value {
        Value::Null => match key {
            Some(k) if LIST_KEYS.contains(&k) => Value::Array(Vec::new()),
            _ => Value::String(String::new()),
        },
        Value::Array(items) => Value::Array(
            items
                .into_iter()
                // list elements are never themselves lists in this schema
                .map(|item| sanitize_under(item, None))
                .collect(),
        ),
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(k, v)| {
                    let sanitized = sanitize_under(v, Some(&k));
                    (k, sanitized)
                })
                .collect(),
        ),
        other => other,
    }
}

/// Patches `personal.fullName` and `personal.email` on an untyped candidate
/// when they are missing, blank, or (for email) implausible. Used before
/// validating AI output so a model that drops the identity fields does not
/// sink the whole document.
pub fn repair_personal(mut candidate: Value, full_name: &str, email: &str) -> Value {
    let Value::Object(root) = &mut candidate else {
        return candidate;
    };
    let personal = root
        .entry("personal")
        .or_insert_with(|| Value::Object(Map::new()));
    if !personal.is_object() {
        *personal = Value::Object(Map::new());
    }
    if let Value::Object(fields) = personal {
        let name_ok = matches!(fields.get("fullName"), Some(Value::String(s)) if !s.trim().is_empty());
        if !name_ok {
            fields.insert("fullName".to_string(), Value::String(full_name.to_string()));
        }
        let email_ok = matches!(fields.get("email"), Some(Value::String(s)) if is_plausible_email(s.trim()));
        if !email_ok {
            fields.insert("email".to_string(), Value::String(email.to_string()));
        }
    }
    candidate
}

trait HasId {
    fn id_mut(&mut self) -> &mut String;
}

impl HasId for ExperienceEntry {
    fn id_mut(&mut self) -> &mut String {
        &mut self.id
    }
}

impl HasId for EducationEntry {
    fn id_mut(&mut self) -> &mut String {
        &mut self.id
    }
}

impl HasId for ProjectEntry {
    fn id_mut(&mut self) -> &mut String {
        &mut self.id
    }
}

/// Gives every list entry a non-empty, locally unique id. Missing or
/// duplicate ids become `ai_<kind>_<index>`, bumping the counter past any
/// id already taken.
pub fn ensure_ids(mut doc: CvDocument) -> CvDocument {
    assign_ids(&mut doc.experience, "experience");
    assign_ids(&mut doc.education, "education");
    assign_ids(&mut doc.projects, "project");
    doc
}

fn assign_ids<T: HasId>(entries: &mut [T], kind: &str) {
    let mut taken: HashSet<String> = HashSet::new();
    let mut needs_id = Vec::new();

    for (index, entry) in entries.iter_mut().enumerate() {
        let id = entry.id_mut();
        if id.is_empty() || !taken.insert(id.clone()) {
            needs_id.push(index);
        }
    }

    // Second pass so a generated id never collides with a later explicit one.
    for index in needs_id {
        let mut counter = index;
        let id = loop {
            let candidate = format!("ai_{kind}_{counter}");
            if taken.insert(candidate.clone()) {
                break candidate;
            }
            counter += 1;
        };
        *entries[index].id_mut() = id;
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Constructors for fresh form state
// ────────────────────────────────────────────────────────────────────────────

/// A fresh `cv_<8 hex>` id for rows created by the user.
pub fn new_entry_id() -> String {
    let simple = Uuid::new_v4().simple().to_string();
    format!("cv_{}", &simple[..8])
}

impl ExperienceEntry {
    pub fn empty() -> Self {
        Self {
            id: new_entry_id(),
            role: String::new(),
            company: String::new(),
            location: String::new(),
            start_date: String::new(),
            end_date: String::new(),
            highlights: Vec::new(),
        }
    }
}

impl EducationEntry {
    pub fn empty() -> Self {
        Self {
            id: new_entry_id(),
            school: String::new(),
            degree: String::new(),
            location: String::new(),
            start_date: String::new(),
            end_date: String::new(),
            highlights: Vec::new(),
        }
    }
}

impl ProjectEntry {
    pub fn empty() -> Self {
        Self {
            id: new_entry_id(),
            name: String::new(),
            summary: String::new(),
            link: String::new(),
            highlights: Vec::new(),
        }
    }
}

fn lines(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Placeholder document shown when a session starts.
pub fn default_cv() -> CvDocument {
    CvDocument {
        personal: Personal {
            full_name: "Jordan Smith".to_string(),
            title: "Senior Product Designer".to_string(),
            summary: "Human-centered designer with 7+ years crafting digital experiences that balance UX rigor with business outcomes.".to_string(),
            email: "jordan.smith@example.com".to_string(),
            phone: "+33 6 12 34 56 78".to_string(),
            location: "Paris, France".to_string(),
            website: "https://jordansmith.design".to_string(),
            linkedin: "https://linkedin.com/in/jordansmith".to_string(),
            photo_style: PhotoStyle::Square,
        },
        experience: vec![
            ExperienceEntry {
                id: new_entry_id(),
                role: "Lead Product Designer".to_string(),
                company: "Flowly".to_string(),
                location: "Remote".to_string(),
                start_date: "2022".to_string(),
                end_date: "Present".to_string(),
                highlights: lines(&[
                    "Shipped a design system refresh that increased design-dev velocity by 35% and reduced inconsistencies across 4 products.",
                    "Partnered with PM and data to launch AI onboarding, improving activation by 18% through contextual nudges.",
                    "Facilitated weekly design critiques and mentorship for a team of 5 designers, raising NPS from 32 to 54.",
                ]),
            },
            ExperienceEntry {
                id: new_entry_id(),
                role: "Product Designer".to_string(),
                company: "Atlas HR".to_string(),
                location: "Lyon, France".to_string(),
                start_date: "2019".to_string(),
                end_date: "2022".to_string(),
                highlights: lines(&[
                    "Redesigned analytics workflows that cut report creation time by 42% and lifted retention by 9%.",
                    "Ran continuous discovery with 40+ interviews each quarter to validate roadmap bets and reduce churn.",
                ]),
            },
        ],
        education: vec![EducationEntry {
            id: new_entry_id(),
            school: "ENSA Lyon".to_string(),
            degree: "M.Des. Interaction Design".to_string(),
            location: "Lyon, France".to_string(),
            start_date: "2016".to_string(),
            end_date: "2018".to_string(),
            highlights: lines(&[
                "Thesis on adaptive interfaces for neurodiverse teams, awarded jury distinction.",
            ]),
        }],
        projects: vec![ProjectEntry {
            id: new_entry_id(),
            name: "Portfolio Platform".to_string(),
            summary: "Modular case study builder for creative teams.".to_string(),
            link: "https://portfolio-template.dev".to_string(),
            highlights: lines(&[
                "Architected component library that enabled non-designers to ship branded pages in under 10 minutes.",
                "Implemented analytics guardrails and privacy controls adopted by 200+ teams in beta.",
            ]),
        }],
        skills: lines(&[
            "Design systems",
            "Product discovery",
            "Figma",
            "User research",
            "Design ops",
            "Prototyping",
        ]),
        certifications: lines(&["Google UX Design Professional Certificate"]),
        languages: lines(&["English", "French"]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn minimal() -> Value {
        json!({
            "personal": {"fullName": "Ada Lovelace", "email": "ada@example.com"}
        })
    }

    fn contains_null(value: &Value) -> bool {
        match value {
            Value::Null => true,
            Value::Array(items) => items.iter().any(contains_null),
            Value::Object(map) => map.values().any(contains_null),
            _ => false,
        }
    }

    #[test]
    fn test_minimal_document_gets_zero_values() {
        let doc = validate(&minimal()).unwrap();
        assert_eq!(doc.personal.full_name, "Ada Lovelace");
        assert_eq!(doc.personal.title, "");
        assert_eq!(doc.personal.photo_style, PhotoStyle::Square);
        assert!(doc.experience.is_empty());
        assert!(doc.skills.is_empty());
    }

    #[test]
    fn test_missing_full_name_reports_path() {
        let err = validate(&json!({"personal": {"email": "a@b.co"}})).unwrap_err();
        assert_eq!(err.path, "personal.fullName");
    }

    #[test]
    fn test_empty_personal_reports_full_name_first() {
        let err = validate(&json!({"personal": {}})).unwrap_err();
        assert_eq!(err.path, "personal.fullName");
        let err = validate(&json!({"personal": {"email": "nope"}})).unwrap_err();
        assert_eq!(err.path, "personal.fullName");
    }

    #[test]
    fn test_invalid_email_rejected() {
        let err =
            validate(&json!({"personal": {"fullName": "A", "email": "not-an-email"}})).unwrap_err();
        assert_eq!(err.path, "personal.email");
    }

    #[test]
    fn test_missing_personal_rejected() {
        let err = validate(&json!({"skills": ["Rust"]})).unwrap_err();
        assert_eq!(err.path, "personal");
    }

    #[test]
    fn test_non_object_root_rejected() {
        assert!(validate(&json!([1, 2, 3])).is_err());
    }

    #[test]
    fn test_entry_required_field_path_is_indexed() {
        let mut candidate = minimal();
        candidate["experience"] = json!([
            {"role": "Engineer", "company": "Acme"},
            {"role": "Engineer"}
        ]);
        let err = validate(&candidate).unwrap_err();
        assert_eq!(err.path, "experience[1].company");
    }

    #[test]
    fn test_highlight_over_limit_rejected() {
        let mut candidate = minimal();
        candidate["projects"] = json!([{"name": "P", "highlights": ["x".repeat(221)]}]);
        let err = validate(&candidate).unwrap_err();
        assert_eq!(err.path, "projects[0].highlights[0]");
    }

    #[test]
    fn test_blank_highlights_dropped_and_trimmed() {
        let mut candidate = minimal();
        candidate["experience"] = json!([
            {"role": "R", "company": "C", "highlights": ["  Shipped it  ", "", "   "]}
        ]);
        let doc = validate(&candidate).unwrap();
        assert_eq!(doc.experience[0].highlights, vec!["Shipped it".to_string()]);
    }

    #[test]
    fn test_optional_scalars_are_stringified() {
        let mut candidate = minimal();
        candidate["personal"]["phone"] = json!(5551234);
        candidate["personal"]["photoStyle"] = json!("circle");
        let doc = validate(&candidate).unwrap();
        assert_eq!(doc.personal.phone, "5551234");
        assert_eq!(doc.personal.photo_style, PhotoStyle::Circle);
    }

    #[test]
    fn test_validate_is_idempotent() {
        let mut candidate = minimal();
        candidate["experience"] = json!([
            {"role": "R", "company": "C", "highlights": [" a ", "b"]},
            {"id": "x1", "role": "R2", "company": "C2"}
        ]);
        candidate["education"] = json!([{"school": "S", "degree": "D"}]);
        candidate["skills"] = json!(["Rust", " Go "]);

        let once = validate(&candidate).unwrap();
        let twice = validate(&serde_json::to_value(&once).unwrap()).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_default_cv_round_trips_through_validate() {
        let doc = default_cv();
        let revalidated = validate(&serde_json::to_value(&doc).unwrap()).unwrap();
        assert_eq!(doc, revalidated);
    }

    #[test]
    fn test_sanitize_nulls_then_validate_leaves_no_nulls() {
        let candidate = json!({
            "personal": {
                "fullName": "Ada", "email": "ada@example.com",
                "title": null, "phone": null, "website": null
            },
            "experience": [{"role": "R", "company": "C", "location": null, "highlights": null}],
            "projects": null,
            "skills": null
        });

        let sanitized = sanitize_nulls(candidate);
        assert!(!contains_null(&sanitized));
        assert_eq!(sanitized["personal"]["title"], json!(""));
        assert_eq!(sanitized["experience"][0]["highlights"], json!([]));
        assert_eq!(sanitized["skills"], json!([]));

        let doc = validate(&sanitized).unwrap();
        let serialized = serde_json::to_value(&doc).unwrap();
        assert!(!contains_null(&serialized));
        assert_eq!(doc.personal.title, "");
        assert!(doc.projects.is_empty());
        assert!(doc.experience[0].highlights.is_empty());
    }

    #[test]
    fn test_ensure_ids_assigns_in_order() {
        let mut candidate = minimal();
        candidate["experience"] = json!([
            {"role": "A", "company": "X"},
            {"role": "B", "company": "Y"}
        ]);
        let doc = validate(&candidate).unwrap();
        assert_eq!(doc.experience[0].id, "ai_experience_0");
        assert_eq!(doc.experience[1].id, "ai_experience_1");
    }

    #[test]
    fn test_ensure_ids_avoids_collisions_and_duplicates() {
        let mut candidate = minimal();
        candidate["projects"] = json!([
            {"name": "A"},
            {"id": "ai_project_0", "name": "B"},
            {"id": "ai_project_0", "name": "C"}
        ]);
        let doc = validate(&candidate).unwrap();
        let ids: Vec<_> = doc.projects.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["ai_project_1", "ai_project_0", "ai_project_2"]);
    }

    #[test]
    fn test_existing_ids_preserved() {
        let mut candidate = minimal();
        candidate["education"] = json!([{"id": "edu-7", "school": "S", "degree": "D"}]);
        let doc = validate(&candidate).unwrap();
        assert_eq!(doc.education[0].id, "edu-7");
    }

    #[test]
    fn test_cv_document_deserialize_runs_validation() {
        let bad: Result<CvDocument, _> =
            serde_json::from_value(json!({"personal": {"fullName": "A"}}));
        assert!(bad.is_err());
        let good: CvDocument = serde_json::from_value(minimal()).unwrap();
        assert_eq!(good.personal.email, "ada@example.com");
    }

    #[test]
    fn test_validate_experience_assigns_id() {
        let entry = validate_experience(&json!({"role": "R", "company": "C"})).unwrap();
        assert_eq!(entry.id, "ai_experience_0");
    }

    #[test]
    fn test_replace_experience_targets_matching_id_only() {
        let mut doc = default_cv();
        let untouched = doc.experience[1].clone();
        let mut updated = doc.experience[0].clone();
        updated.highlights = vec!["New bullet".to_string()];

        assert!(doc.replace_experience(updated.clone()));
        assert_eq!(doc.experience[0], updated);
        assert_eq!(doc.experience[1], untouched);

        let mut stranger = updated;
        stranger.id = "missing".to_string();
        assert!(!doc.replace_experience(stranger));
    }

    #[test]
    fn test_new_entry_id_shape() {
        let id = new_entry_id();
        assert!(id.starts_with("cv_"));
        assert_eq!(id.len(), 11);
    }

    #[test]
    fn test_new_rows_keep_their_ids_through_validate() {
        let mut doc = default_cv();
        doc.experience.push(ExperienceEntry::empty());
        doc.education.push(EducationEntry::empty());
        doc.projects.push(ProjectEntry::empty());
        let ids: Vec<String> = [
            &doc.experience.last().unwrap().id,
            &doc.education.last().unwrap().id,
            &doc.projects.last().unwrap().id,
        ]
        .into_iter()
        .cloned()
        .collect();
        assert!(ids.iter().all(|id| id.starts_with("cv_")));

        let again = validate(&serde_json::to_value(&doc).unwrap()).unwrap();
        assert_eq!(again.experience.last().unwrap().id, ids[0]);
        assert_eq!(again.education.last().unwrap().id, ids[1]);
        assert_eq!(again.projects.last().unwrap().id, ids[2]);
    }

    #[test]
    fn test_repair_personal_fills_identity_only_when_unusable() {
        let broken = json!({"personal": {"fullName": "  ", "email": "nope", "title": "T"}});
        let repaired = repair_personal(broken, PLACEHOLDER_NAME, PLACEHOLDER_EMAIL);
        assert_eq!(repaired["personal"]["fullName"], "Candidate");
        assert_eq!(repaired["personal"]["email"], "candidate@example.com");
        assert_eq!(repaired["personal"]["title"], "T");

        let fine = repair_personal(minimal(), PLACEHOLDER_NAME, PLACEHOLDER_EMAIL);
        assert_eq!(fine, minimal());

        let missing = repair_personal(json!({"skills": []}), "Ada", "ada@example.com");
        assert!(validate(&missing).is_ok());
    }

    #[test]
    fn test_plausible_email() {
        assert!(is_plausible_email("a@b.co"));
        assert!(!is_plausible_email("@b.co"));
        assert!(!is_plausible_email("a@"));
        assert!(!is_plausible_email("a b@c.d"));
        assert!(!is_plausible_email("a@b@c"));
    }
}
