//! Google Gemini `generateContent` client.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::{Assistant, AssistantError, build_prompt};

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
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

impl GenerateResponse {
    /// Text of the first candidate, parts concatenated.
    fn into_text(self) -> Option<String> {
        let content = self.candidates.into_iter().next()?.content?;
        let text: String = content.parts.into_iter().filter_map(|p| p.text).collect();
        (!text.is_empty()).then_some(text)
    }
}

/// Assistant backed by the Gemini REST API.
#[derive(Clone)]
pub struct GeminiAssistant {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl fmt::Debug for GeminiAssistant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiAssistant")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}

impl GeminiAssistant {
    #[must_use]
    pub fn new(
        http: reqwest::Client,
        base_url: &str,
        api_key: impl Into<String>,
        model: &str,
    ) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            model: model.to_string(),
        }
    }
}

#[async_trait::async_trait]
impl Assistant for GeminiAssistant {
    fn name(&self) -> &'static str {
        "gemini"
    }

    async fn answer(&self, query: &str) -> Result<String, AssistantError> {
        let prompt = build_prompt(query);
        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);

        tracing::debug!(
            url = %url,
            model = %self.model,
            prompt_len = prompt.len(),
            "Calling Gemini API"
        );

        let response = self
            .http
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&GenerateRequest {
                contents: vec![Content {
                    parts: vec![Part { text: &prompt }],
                }],
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error body".to_string());
            tracing::error!(status_code = status.as_u16(), error_body = %body, "Gemini API returned error status");
            return Err(AssistantError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: GenerateResponse = response.json().await?;
        parsed.into_text().ok_or(AssistantError::EmptyResponse)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};

    fn assistant(base_url: &str) -> GeminiAssistant {
        GeminiAssistant::new(reqwest::Client::new(), base_url, "test-key", "gemini-1.5-pro")
    }

    #[tokio::test]
    async fn test_answer_returns_first_candidate_text() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/models/gemini-1.5-pro:generateContent")
            .match_query(Matcher::UrlEncoded("key".into(), "test-key".into()))
            .match_header("content-type", "application/json")
            .match_body(Matcher::PartialJsonString(
                r#"{"contents":[{"parts":[{"text":"You are an AI assistant for an inventory management system. You can answer questions about inventory, products, sales, and related topics. Keep your answers concise and focused on inventory management.\n\nUser query: stock?"}]}]}"#
                    .to_string(),
            ))
            .with_status(200)
            .with_body(
                r#"{
                    "candidates": [{
                        "content": {
                            "parts": [{ "text": "42 items" }],
                            "role": "model"
                        }
                    }]
                }"#,
            )
            .create_async()
            .await;

        let answer = assistant(&server.url()).answer("stock?").await.unwrap();

        mock.assert_async().await;
        assert_eq!(answer, "42 items");
    }

    #[tokio::test]
    async fn test_error_status() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/models/gemini-1.5-pro:generateContent")
            .match_query(Matcher::Any)
            .with_status(400)
            .with_body("API key not valid")
            .create_async()
            .await;

        let err = assistant(&server.url()).answer("stock?").await.unwrap_err();
        assert!(matches!(err, AssistantError::Status { status: 400, .. }));
        assert!(err.to_string().contains("API key not valid"));
    }

    #[tokio::test]
    async fn test_missing_candidates() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/models/gemini-1.5-pro:generateContent")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"candidates": []}"#)
            .create_async()
            .await;

        let err = assistant(&server.url()).answer("stock?").await.unwrap_err();
        assert!(matches!(err, AssistantError::EmptyResponse));
    }
}
