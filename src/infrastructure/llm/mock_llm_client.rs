use serde_json::{Value, json};

use crate::application::ports::{LlmClient, LlmClientError};

/// Offline stand-in that answers every chunk prompt with a small, valid object
/// for the section named in the prompt.
pub struct MockLlmClient;

impl MockLlmClient {
    fn section(prompt: &str) -> Option<&str> {
        prompt
            .lines()
            .find_map(|line| line.strip_prefix("SECTION: "))
            .map(str::trim)
    }
}

#[async_trait::async_trait]
impl LlmClient for MockLlmClient {
    async fn generate_json(&self, prompt: &str) -> Result<Value, LlmClientError> {
        let value = match Self::section(prompt) {
            Some("header") => json!({
                "name": "Mock Candidate",
                "contactInfo": { "email": "mock@example.com", "phone": "", "location": "", "linkedin": "" },
                "objective": ""
            }),
            Some("education") => json!({ "education": [] }),
            Some("experience") => json!({ "experience": [] }),
            Some("projects") => json!({ "projects": [] }),
            Some("skillsAndExtras") => json!({
                "skills": { "languages": "", "technologies": "" },
                "certifications": [],
                "activities": []
            }),
            _ => json!({}),
        };
        Ok(value)
    }
}
