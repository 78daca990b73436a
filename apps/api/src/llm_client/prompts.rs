// Shared prompt fragments.
// Each task module's builders live in ai/prompts.rs; this file holds the
// cross-cutting output-format instructions they embed.

/// Appended to every prompt whose answer is read as plain prose.
pub const PLAIN_TEXT_RULES: &str = "\
DO NOT use bullet points, bold text, markdown formatting, asterisks, or generic introductions.
Write in plain text only. Be direct and specific.";

/// Appended to every prompt whose answer is parsed as a JSON object.
pub const JSON_ONLY_RULES: &str = "\
IMPORTANT OUTPUT REQUIREMENTS:
- Return ONLY a valid JSON object, no markdown fences, no explanations
- Use empty string \"\" for missing text fields (NEVER use null)
- Use empty array [] for missing list fields (NEVER use null)";
