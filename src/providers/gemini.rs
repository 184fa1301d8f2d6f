//! Gemini `generateContent` client

use async_trait::async_trait;
use reqwest_middleware::ClientWithMiddleware;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use super::ContentProvider;
use crate::config::ContentConfig;
use crate::{Result, TravelAiError};

const PROVIDER: &str = "gemini";

pub struct GeminiProvider {
    client: ClientWithMiddleware,
    api_key: Option<String>,
    model: String,
    base_url: String,
    temperature: f32,
}

impl GeminiProvider {
    pub fn new(client: ClientWithMiddleware, config: &ContentConfig) -> Self {
        Self {
            client,
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            temperature: config.temperature,
        }
    }

    fn endpoint(&self, api_key: &str) -> String {
        format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url,
            urlencoding::encode(&self.model),
            urlencoding::encode(api_key)
        )
    }
}

/// Single-turn prompt; the system instruction travels inline ahead of the prompt
fn compose_prompt(prompt: &str, system_instruction: Option<&str>) -> String {
    match system_instruction.map(str::trim).filter(|s| !s.is_empty()) {
        Some(system) => format!("System instruction: {system}\n\nUser prompt: {prompt}"),
        None => prompt.to_string(),
    }
}

#[async_trait]
impl ContentProvider for GeminiProvider {
    #[instrument(skip_all, fields(model = %self.model, prompt_len = prompt.len()))]
    async fn complete(&self, prompt: &str, system_instruction: Option<&str>) -> Result<String> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| TravelAiError::config("No content API key configured"))?;

        let body = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: compose_prompt(prompt, system_instruction),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: self.temperature,
            },
        };

        let response = self
            .client
            .post(self.endpoint(api_key))
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(TravelAiError::upstream(
                PROVIDER,
                format!("HTTP {status}: {}", detail.chars().take(300).collect::<String>()),
            ));
        }

        let parsed: GenerateResponse = response.json().await?;
        let text = parsed.first_text().ok_or_else(|| {
            TravelAiError::upstream(PROVIDER, "Response contained no candidate text")
        })?;
        debug!(response_len = text.len(), "Content generated");
        Ok(text)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f32,
}

#[derive(Debug, Serialize, Deserialize, Default)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Content,
}

impl GenerateResponse {
    fn first_text(&self) -> Option<String> {
        let text: String = self
            .candidates
            .first()?
            .content
            .parts
            .iter()
            .map(|p| p.text.as_str())
            .collect();
        Some(text).filter(|t| !t.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compose_prompt() {
        assert_eq!(compose_prompt("Plan", None), "Plan");
        assert_eq!(compose_prompt("Plan", Some("  ")), "Plan");
        assert_eq!(
            compose_prompt("Plan", Some("Be brief")),
            "System instruction: Be brief\n\nUser prompt: Plan"
        );
    }

    #[test]
    fn test_first_candidate_text_is_joined() {
        let response: GenerateResponse = serde_json::from_value(serde_json::json!({
            "candidates": [{"content": {"parts": [{"text": "{\"a\":"}, {"text": " 1}"}]}}]
        }))
        .unwrap();
        assert_eq!(response.first_text().as_deref(), Some("{\"a\": 1}"));

        let empty: GenerateResponse = serde_json::from_str(r#"{"candidates": []}"#).unwrap();
        assert!(empty.first_text().is_none());
    }

    #[test]
    fn test_request_uses_camel_case() {
        let body = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part { text: "hi".into() }],
            }],
            generation_config: GenerationConfig { temperature: 0.3 },
        };
        let value = serde_json::to_value(&body).unwrap();
        assert!(value.get("generationConfig").is_some());
        assert_eq!(value["contents"][0]["parts"][0]["text"], "hi");
    }
}
