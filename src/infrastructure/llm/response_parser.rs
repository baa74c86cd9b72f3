use serde_json::Value;

use crate::application::ports::LlmClientError;

/// Parses model output as JSON, tolerating a surrounding Markdown code fence.
pub fn parse_json_response(content: &str) -> Result<Value, LlmClientError> {
    let body = strip_code_fence(content);
    serde_json::from_str(body).map_err(|e| {
        LlmClientError::InvalidResponse(format!("model output is not valid JSON: {e}"))
    })
}

fn strip_code_fence(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    let rest = rest.strip_suffix("```").unwrap_or(rest);
    rest.trim()
}
