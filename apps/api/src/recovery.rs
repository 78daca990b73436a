//! Text recovery: turns noisy LLM output into JSON objects, bullet lists,
//! and keyword lists the task operations can use.

use std::collections::HashSet;

use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("AI response did not include a JSON object")]
    NoJsonObject,

    #[error("AI response JSON could not be parsed: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("Unsupported document type: {0}")]
    UnsupportedType(String),

    #[error("Document contained no extractable text")]
    EmptyDocument,

    #[error("PDF text extraction failed: {0}")]
    Pdf(String),
}

/// Removes a surrounding markdown code fence (```json ... ```), if the text
/// starts with one. Otherwise returns the input trimmed.
pub fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    if !trimmed.starts_with("```") {
        return trimmed;
    }

    // Drop the opening fence line, language tag included.
    let body = match trimmed.find('\n') {
        Some(i) => &trimmed[i + 1..],
        None => "",
    };

    let body = match body.rfind('\n') {
        Some(i) if body[i + 1..].trim_start().starts_with("```") => &body[..i],
        None if body.trim_start().starts_with("```") => "",
        _ => body,
    };

    body.trim()
}

/// Returns the substring from the first `{` to the last `}` after fence
/// stripping. Best effort for models that wrap JSON in commentary.
pub fn extract_json_object(text: &str) -> Result<&str, ExtractionError> {
    let cleaned = strip_code_fences(text);
    match (cleaned.find('{'), cleaned.rfind('}')) {
        (Some(start), Some(end)) if end > start => Ok(&cleaned[start..=end]),
        _ => Err(ExtractionError::NoJsonObject),
    }
}

/// `extract_json_object` followed by a parse into an untyped value.
pub fn recover_json(text: &str) -> Result<Value, ExtractionError> {
    let json = extract_json_object(text)?;
    Ok(serde_json::from_str(json)?)
}

/// Lowercase tokens longer than three characters, split on anything that is
/// not alphanumeric, deduplicated in first-seen order and capped at `max`.
pub fn extract_keywords(text: &str, max: usize) -> Vec<String> {
    let lowered = text.to_lowercase();
    let tokens = lowered
        .split(|c: char| !c.is_alphanumeric())
        .filter(|token| token.chars().count() > 3)
        .map(str::to_string);
    dedupe(tokens).into_iter().take(max).collect()
}

/// Strips leading list markers (dashes, bullets, numbering) and collapses
/// internal whitespace. A leading figure ("40% faster", "3D") is content and
/// is kept; digits only count as numbering when `.` or `)` and a space follow.
pub fn sanitize_bullet(line: &str) -> String {
    let line = line
        .trim_start_matches(|c: char| matches!(c, '-' | '*' | '•') || c.is_whitespace());
    collapse_whitespace(strip_numbering(line))
}

fn strip_numbering(line: &str) -> &str {
    let rest = line.trim_start_matches(|c: char| c.is_ascii_digit());
    if rest.len() == line.len() {
        return line;
    }
    match rest.strip_prefix(|c: char| c == '.' || c == ')') {
        Some(after) if after.is_empty() || after.starts_with(char::is_whitespace) => {
            after.trim_start()
        }
        _ => line,
    }
}

pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// One bullet per non-trivial line of free-text output.
pub fn extract_bullets(text: &str, max: usize) -> Vec<String> {
    text.lines()
        .map(sanitize_bullet)
        .filter(|line| line.chars().count() > 4)
        .take(max)
        .collect()
}

/// Parses a comma/semicolon/newline separated keyword list.
pub fn parse_keyword_list(text: &str, max: usize) -> Vec<String> {
    let items = text
        .split(&[',', ';', '\n'][..])
        .map(|item| sanitize_bullet(item).to_lowercase())
        .filter(|item| item.chars().count() > 2);
    dedupe(items).into_iter().take(max).collect()
}

/// Drops empty values and repeats, keeping first-seen order.
pub fn dedupe<I>(values: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut seen = HashSet::new();
    values
        .into_iter()
        .filter(|v| !v.is_empty() && seen.insert(v.clone()))
        .collect()
}

pub fn title_case(text: &str) -> String {
    text.split(' ')
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// New skills (title-cased) first, then existing ones, deduplicated and capped.
pub fn merge_skills(current: &[String], incoming: &[String], max: usize) -> Vec<String> {
    let merged = incoming
        .iter()
        .map(|s| title_case(s))
        .chain(current.iter().cloned());
    dedupe(merged).into_iter().take(max).collect()
}
