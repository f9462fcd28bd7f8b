// src/analysis/llm.rs
use crate::utils::config::LlmSettings;
use crate::utils::error::AnalysisError;
use serde::{Deserialize, Serialize};

pub const TEMPERATURE: f64 = 0.2;
pub const MAX_TOKENS: u32 = 300;

const SYSTEM_PROMPT: &str = "You are a financial data extraction assistant.";

/// Client for an OpenAI-compatible chat completion endpoint.
pub struct OpenAiClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<Message>,
    max_tokens: u32,
    temperature: f64,
}

#[derive(Debug, Serialize)]
pub struct Message {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

/// The fixed conversation: the filing text goes into the user turn verbatim.
pub fn build_messages(filing_text: &str) -> Vec<Message> {
    vec![
        Message {
            role: "system".to_string(),
            content: SYSTEM_PROMPT.to_string(),
        },
        Message {
            role: "user".to_string(),
            content: format!(
                "Extract financial data needed for EBITDA calculation from the following text:\n\n\
                 {filing_text}\n\n\
                 Please remove the ',' thousand separators and any blank space between digits. \
                 The result should be provided in a format A - B - C + D + E, \
                 e.g.: 5678000 - 2345000 - 1234000 + 345000 + 123000. \
                 Nothing else on the output. Don't explain anything."
            ),
        },
    ]
}

impl OpenAiClient {
    pub fn new(settings: &LlmSettings) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key: settings.api_key.clone(),
            base_url: settings.base_url.clone(),
            model: settings.model.clone(),
        }
    }

    /// Sends the filing text once and returns the trimmed reply as-is.
    pub async fn extract_expression(&self, filing_text: &str) -> Result<String, AnalysisError> {
        let request = ChatRequest {
            model: &self.model,
            messages: build_messages(filing_text),
            max_tokens: MAX_TOKENS,
            temperature: TEMPERATURE,
        };

        tracing::info!(
            "Asking {} for EBITDA inputs ({} bytes of filing text)",
            self.model,
            filing_text.len()
        );

        let response = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!("Model API returned {}", status);
            return Err(AnalysisError::Api { status, body });
        }

        let parsed: ChatResponse = response.json().await?;
        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|content| content.trim().to_string())
            .filter(|content| !content.is_empty())
            .ok_or(AnalysisError::EmptyResponse)?;

        tracing::debug!("Model replied: {}", content);
        Ok(content)
    }
}
