//! Wire types for the OpenRouter streamed chat-completions endpoint.

use serde::{Deserialize, Serialize};

use super::LlmError;

#[derive(Debug, Serialize)]
pub struct ChatRequest<'a> {
    pub model: &'a str,
    pub messages: Vec<ChatMessage<'a>>,
    pub stream: bool,
}

#[derive(Debug, Serialize)]
pub struct ChatMessage<'a> {
    pub role: &'a str,
    pub content: &'a str,
}

impl<'a> ChatRequest<'a> {
    pub fn streamed_user_prompt(model: &'a str, prompt: &'a str) -> Self {
        Self {
            model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            stream: true,
        }
    }
}

#[derive(Debug, Deserialize)]
struct StreamChunk {
    #[serde(default)]
    choices: Vec<StreamChoice>,
    error: Option<StreamFailure>,
}

#[derive(Debug, Deserialize)]
struct StreamChoice {
    delta: Option<Delta>,
}

#[derive(Debug, Deserialize)]
struct Delta {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StreamFailure {
    message: String,
}

/// Concatenates every `delta.content` fragment of a server-sent-event body.
/// Comment lines (`: ...`) are keep-alives; `[DONE]` ends the stream.
pub fn collect_stream(body: &str) -> Result<String, LlmError> {
    let mut text = String::new();

    for line in body.lines() {
        let Some(data) = line.strip_prefix("data:") else {
            continue;
        };
        let data = data.trim();
        if data.is_empty() {
            continue;
        }
        if data == "[DONE]" {
            break;
        }

        let chunk: StreamChunk = serde_json::from_str(data)?;
        if let Some(failure) = chunk.error {
            return Err(LlmError::Stream(failure.message));
        }
        for choice in chunk.choices {
            if let Some(content) = choice.delta.and_then(|d| d.content) {
                text.push_str(&content);
            }
        }
    }

    Ok(text.trim().to_string())
}
