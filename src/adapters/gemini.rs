use crate::domain::ports::{ContractGenerator, GenerationRequest};
use crate::utils::error::{ContractError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentBody<'a> {
    system_instruction: Content<'a>,
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'a str>,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

impl GenerateContentResponse {
    fn text(&self) -> String {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|content| {
                content
                    .parts
                    .iter()
                    .filter_map(|p| p.text.as_deref())
                    .collect::<String>()
            })
            .unwrap_or_default()
    }
}

/// Contract drafting through a Gemini-compatible `generateContent` endpoint.
pub struct GeminiGenerator {
    client: Client,
    endpoint: String,
    model: String,
    api_key: String,
}

impl GeminiGenerator {
    pub fn new(endpoint: impl Into<String>, model: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.into(),
            model: model.into(),
            api_key: api_key.into(),
        }
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Result<Self> {
        if let Some(timeout) = timeout {
            self.client = Client::builder().timeout(timeout).build()?;
        }
        Ok(self)
    }

    fn url(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.endpoint.trim_end_matches('/'),
            self.model
        )
    }
}

fn transport_error(e: reqwest::Error) -> ContractError {
    ContractError::Generation {
        message: e.to_string(),
    }
}

#[async_trait]
impl ContractGenerator for GeminiGenerator {
    async fn generate(&self, request: &GenerationRequest) -> Result<String> {
        let body = GenerateContentBody {
            system_instruction: Content {
                role: None,
                parts: vec![Part {
                    text: &request.system_instruction,
                }],
            },
            contents: vec![Content {
                role: Some("user"),
                parts: vec![Part {
                    text: &request.prompt,
                }],
            }],
            generation_config: GenerationConfig {
                temperature: request.temperature,
            },
        };

        tracing::debug!("Requesting contract draft from model {}", self.model);
        let response = self
            .client
            .post(self.url())
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(ContractError::Generation {
                message: format!("generation service answered {status}: {error_body}"),
            });
        }

        let parsed: GenerateContentResponse = response.json().await.map_err(transport_error)?;
        let text = parsed.text();
        // An empty reply is a failure, not a draft to edit.
        if text.trim().is_empty() {
            return Err(ContractError::Generation {
                message: "generation service returned no text".to_string(),
            });
        }

        tracing::debug!("Received {} characters of contract text", text.chars().count());
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn request() -> GenerationRequest {
        GenerationRequest {
            system_instruction: "Você é um advogado.".to_string(),
            prompt: "Elabore um contrato.".to_string(),
            temperature: 0.4,
        }
    }

    #[tokio::test]
    async fn test_generate_joins_parts() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(POST)
                .path("/v1beta/models/gemini-2.5-flash:generateContent")
                .query_param("key", "test-key")
                .json_body_partial(
                    r#"{"contents":[{"role":"user","parts":[{"text":"Elabore um contrato."}]}],
                        "systemInstruction":{"parts":[{"text":"Você é um advogado."}]}}"#,
                );
            then.status(200).json_body(serde_json::json!({
                "candidates": [{
                    "content": {"parts": [{"text": "**CONTRATO**\n"}, {"text": "Cláusula 1."}]}
                }]
            }));
        });

        let generator = GeminiGenerator::new(server.base_url(), DEFAULT_MODEL, "test-key");
        let text = generator.generate(&request()).await.unwrap();

        api_mock.assert();
        assert_eq!(text, "**CONTRATO**\nCláusula 1.");
    }

    #[tokio::test]
    async fn test_generate_auth_failure() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST);
            then.status(403).body("API key not valid");
        });

        let generator = GeminiGenerator::new(server.base_url(), DEFAULT_MODEL, "bad");
        let err = generator.generate(&request()).await.unwrap_err();
        match err {
            ContractError::Generation { message } => assert!(message.contains("403")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_generate_empty_candidates() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST);
            then.status(200).json_body(serde_json::json!({"candidates": []}));
        });

        let generator = GeminiGenerator::new(server.base_url(), DEFAULT_MODEL, "k");
        assert!(matches!(
            generator.generate(&request()).await,
            Err(ContractError::Generation { .. })
        ));
    }

    #[tokio::test]
    async fn test_generate_blank_text_is_failure() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST);
            then.status(200).json_body(serde_json::json!({
                "candidates": [{"content": {"parts": [{"text": "  \n "}]}}]
            }));
        });

        let generator = GeminiGenerator::new(server.base_url(), DEFAULT_MODEL, "k");
        assert!(matches!(
            generator.generate(&request()).await,
            Err(ContractError::Generation { .. })
        ));
    }

    #[tokio::test]
    async fn test_generate_transport_error() {
        // nothing listens on the discard port
        let generator = GeminiGenerator::new("http://127.0.0.1:9", DEFAULT_MODEL, "k");
        assert!(matches!(
            generator.generate(&request()).await,
            Err(ContractError::Generation { .. })
        ));
    }
}
