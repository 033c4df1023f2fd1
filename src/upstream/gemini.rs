use crate::error::AppError;
use crate::upstream::{GenerationClient, GenerationTurn, TurnRole};
use async_trait::async_trait;
use log::{debug, info};
use serde::{Deserialize, Serialize};

#[derive(Serialize)]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
}

#[derive(Serialize)]
struct GeminiContent {
    role: &'static str,
    parts: Vec<GeminiPart>,
}

#[derive(Serialize)]
struct GeminiPart {
    text: String,
}

#[derive(Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiCandidateContent>,
}

#[derive(Deserialize)]
struct GeminiCandidateContent {
    #[serde(default)]
    parts: Vec<GeminiResponsePart>,
}

#[derive(Deserialize)]
struct GeminiResponsePart {
    #[serde(default)]
    text: String,
}

/// Gemini `generateContent` client. The base URL and key come from the
/// environment; nothing provider-specific is baked in.
pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiClient {
    pub fn new(http: reqwest::Client, api_key: String, model: String, base_url: String) -> Self {
        Self {
            http,
            api_key,
            model,
            base_url,
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }
}

fn extract_text(resp: &GeminiResponse) -> String {
    let parts = resp
        .candidates
        .first()
        .and_then(|c| c.content.as_ref())
        .map(|content| content.parts.as_slice())
        .unwrap_or(&[]);

    parts
        .iter()
        .map(|p| p.text.as_str())
        .collect::<String>()
        .trim()
        .to_string()
}

#[async_trait]
impl GenerationClient for GeminiClient {
    async fn generate(&self, turns: &[GenerationTurn]) -> Result<String, AppError> {
        let contents = turns
            .iter()
            .map(|turn| GeminiContent {
                role: match turn.role {
                    TurnRole::User => "user",
                    TurnRole::Model => "model",
                },
                parts: vec![GeminiPart {
                    text: turn.text.clone(),
                }],
            })
            .collect();

        info!(
            "GeminiClient::generate() -> model={} turns={}",
            self.model,
            turns.len()
        );

        let resp = self
            .http
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&GeminiRequest { contents })
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(AppError::upstream(Some(status.as_u16()), body));
        }

        let parsed: GeminiResponse = resp.json().await?;
        let text = extract_text(&parsed);
        debug!("Gemini returned {} chars", text.len());
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_and_joins_candidate_parts() {
        let resp: GeminiResponse = serde_json::from_str(
            r#"{
                "candidates": [{
                    "content": { "parts": [{ "text": "Wear gloves.\n" }, { "text": "Prune daily." }] }
                }]
            }"#,
        )
        .unwrap();
        assert_eq!(extract_text(&resp), "Wear gloves.\nPrune daily.");
    }

    #[test]
    fn missing_candidates_yield_empty_text() {
        let resp: GeminiResponse = serde_json::from_str("{}").unwrap();
        assert_eq!(extract_text(&resp), "");

        let resp: GeminiResponse =
            serde_json::from_str(r#"{ "candidates": [{ "content": null }] }"#).unwrap();
        assert_eq!(extract_text(&resp), "");
    }
}
