use crate::domain::ports::LanguageModel;
use crate::utils::error::{Result, TrackError};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error};

pub const RESPONSES_PATH: &str = "/v1/responses";

#[derive(Debug, Serialize)]
struct ResponsesRequest<'a> {
    model: &'a str,
    input: &'a str,
    temperature: f32,
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ResponsesResponse {
    #[serde(default)]
    output_text: Option<String>,
    #[serde(default)]
    output: Vec<OutputItem>,
}

#[derive(Debug, Deserialize)]
struct OutputItem {
    #[serde(default)]
    content: Vec<ContentPart>,
}

#[derive(Debug, Deserialize)]
struct ContentPart {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

impl ResponsesResponse {
    /// 合併所有 output_text 片段
    fn text(self) -> String {
        if let Some(text) = self.output_text {
            return text.trim().to_string();
        }
        self.output
            .into_iter()
            .flat_map(|item| item.content)
            .filter(|part| part.kind == "output_text")
            .filter_map(|part| part.text)
            .collect::<Vec<_>>()
            .join("")
            .trim()
            .to_string()
    }
}

/// OpenAI Responses API client.
pub struct OpenAiClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl OpenAiClient {
    pub fn new(api_key: &str, base_url: &str, model: &str) -> Result<Self> {
        let client = Client::builder().timeout(Duration::from_secs(60)).build()?;
        Ok(Self {
            client,
            api_key: api_key.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl LanguageModel for OpenAiClient {
    async fn respond(&self, prompt: &str, temperature: f32, max_tokens: u32) -> Result<String> {
        debug!("Starting OpenAI responses request with model: {}", self.model);

        let request = ResponsesRequest {
            model: &self.model,
            input: prompt,
            temperature,
            max_output_tokens: max_tokens,
        };

        let response = self
            .client
            .post(format!("{}{}", self.base_url, RESPONSES_PATH))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| TrackError::ModelError {
                message: format!("request failed: {}", e),
            })?;

        let status = response.status();
        debug!("OpenAI API response status: {}", status);

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            error!("OpenAI API error: {} - {}", status, error_text);
            return Err(TrackError::ModelError {
                message: format!("{} - {}", status, error_text),
            });
        }

        let body: ResponsesResponse = response.json().await.map_err(|e| TrackError::ModelError {
            message: format!("unreadable response: {}", e),
        })?;

        Ok(body.text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    #[tokio::test]
    async fn test_respond_collects_output_text() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(POST)
                .path("/v1/responses")
                .header("authorization", "Bearer sk-test")
                .json_body_partial(r#"{"model": "gpt-4o-mini", "max_output_tokens": 500}"#);
            then.status(200).json_body(serde_json::json!({
                "id": "resp_1",
                "output": [{
                    "type": "message",
                    "content": [
                        {"type": "output_text", "text": "print('hi')\n"},
                        {"type": "refusal"}
                    ]
                }]
            }));
        });

        let client = OpenAiClient::new("sk-test", &server.base_url(), "gpt-4o-mini").unwrap();
        let text = client.respond("write code", 0.0, 500).await.unwrap();

        api_mock.assert();
        assert_eq!(text, "print('hi')");
    }

    #[tokio::test]
    async fn test_rate_limit_is_model_error() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(POST).path("/v1/responses");
            then.status(429).body("rate limited");
        });

        let client = OpenAiClient::new("sk-test", &server.base_url(), "gpt-4o-mini").unwrap();
        let result = client.respond("write code", 0.2, 1400).await;

        api_mock.assert();
        match result {
            Err(TrackError::ModelError { message }) => assert!(message.contains("429")),
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
