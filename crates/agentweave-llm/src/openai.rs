use futures::future::BoxFuture;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use agentweave_core::config::ModelConfig;
use agentweave_core::error::{Result, WeaveError};
use agentweave_core::traits::CompletionClient;

const OPENAI_API_URL: &str = "https://api.openai.com/v1/chat/completions";

/// OpenAI-compatible client. Works with OpenAI, Ollama, vLLM, Groq,
/// OpenRouter, etc.
pub struct OpenAiClient {
    http: Client,
}

impl OpenAiClient {
    pub fn new() -> Self {
        Self {
            http: Client::new(),
        }
    }
}

impl Default for OpenAiClient {
    fn default() -> Self {
        Self::new()
    }
}

// Request types
#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<OaiMessage>,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Serialize)]
struct OaiMessage {
    role: String,
    content: String,
}

// Response types
#[derive(Deserialize, Debug)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize, Debug)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize, Debug)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

pub(crate) fn parse_completion(body: &str) -> Result<String> {
    let parsed: ChatResponse =
        serde_json::from_str(body).map_err(|e| WeaveError::CompletionParse(e.to_string()))?;

    parsed
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .ok_or_else(|| WeaveError::CompletionParse("response contained no completion".into()))
}

impl CompletionClient for OpenAiClient {
    fn complete(
        &self,
        config: &ModelConfig,
        system: &str,
        user: &str,
    ) -> BoxFuture<'_, Result<String>> {
        let config = config.clone();
        let system = system.to_string();
        let user = user.to_string();

        Box::pin(async move {
            let base_url = config.base_url.as_deref().unwrap_or(OPENAI_API_URL);

            let body = ChatRequest {
                model: config.model_id.clone(),
                messages: vec![
                    OaiMessage {
                        role: "system".to_string(),
                        content: system,
                    },
                    OaiMessage {
                        role: "user".to_string(),
                        content: user,
                    },
                ],
                max_tokens: config.max_tokens,
                temperature: if config.temperature > 0.0 {
                    Some(config.temperature)
                } else {
                    None
                },
            };

            let mut req = self.http.post(base_url).json(&body);

            if let Some(api_key) = &config.api_key {
                req = req.header("Authorization", format!("Bearer {}", api_key));
            }

            debug!(model = %config.model_id, "Sending completion request");

            let response = req
                .send()
                .await
                .map_err(|e| WeaveError::Completion(e.to_string()))?;

            if !response.status().is_success() {
                let status = response.status();
                let body = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "unknown".to_string());
                return Err(WeaveError::Completion(format!("HTTP {}: {}", status, body)));
            }

            let text = response
                .text()
                .await
                .map_err(|e| WeaveError::Completion(e.to_string()))?;

            parse_completion(&text)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_completion() {
        let body = r#"{
            "choices": [
                {"message": {"role": "assistant", "content": "hello there"}}
            ]
        }"#;
        assert_eq!(parse_completion(body).unwrap(), "hello there");
    }

    #[test]
    fn test_parse_completion_empty_choices() {
        let err = parse_completion(r#"{"choices": []}"#).unwrap_err();
        assert!(matches!(err, WeaveError::CompletionParse(_)));
    }

    #[test]
    fn test_parse_completion_malformed() {
        let err = parse_completion("not json").unwrap_err();
        assert!(matches!(err, WeaveError::CompletionParse(_)));
    }

    #[test]
    fn test_request_serialization_skips_zero_temperature() {
        let body = ChatRequest {
            model: "gpt-4.1-mini".into(),
            messages: vec![],
            max_tokens: 2000,
            temperature: None,
        };
        let json = serde_json::to_string(&body).unwrap();
        assert!(!json.contains("temperature"));
    }
}
