//! HTTP chat-completions oracle
//!
//! Talks to an OpenAI-compatible chat completions endpoint. Requests are
//! blocking; the reconciliation core drives rounds sequentially and the
//! concurrent resolver wraps calls in its own worker pool.

use crate::parse::parse_reply;
use crate::prompt::build_prompt;
use crate::OracleError;
use scrivener_domain::{Oracle, OracleReply, OracleRequest};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

/// Default timeout for oracle requests
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Default number of retry attempts
pub const DEFAULT_MAX_RETRIES: u32 = 3;

const SYSTEM_MESSAGE: &str =
    "You extract structured records from documents. Reply with JSON only.";

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f64,
}

#[derive(Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: String,
}

/// Oracle backed by an OpenAI-compatible chat completions API
pub struct HttpOracle {
    endpoint: String,
    model: String,
    api_key: Option<String>,
    client: reqwest::blocking::Client,
    max_retries: u32,
}

impl HttpOracle {
    /// Create an oracle for the given endpoint and model
    ///
    /// `endpoint` is the full chat completions URL
    /// (e.g. "https://api.example.com/v1/chat/completions").
    pub fn new(endpoint: impl Into<String>, model: impl Into<String>) -> Result<Self, OracleError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .map_err(|e| OracleError::Communication(format!("Client build failed: {}", e)))?;

        Ok(Self {
            endpoint: endpoint.into(),
            model: model.into(),
            api_key: None,
            client,
            max_retries: DEFAULT_MAX_RETRIES,
        })
    }

    /// Attach a bearer token sent with every request
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Set the maximum number of retry attempts
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    fn call(&self, prompt: &str) -> Result<String, OracleError> {
        let body = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: SYSTEM_MESSAGE.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: prompt.to_string(),
                },
            ],
            temperature: 0.0,
        };

        let mut attempts = 0;
        let mut last_error = None;

        while attempts < self.max_retries {
            let mut request = self.client.post(&self.endpoint).json(&body);
            if let Some(key) = &self.api_key {
                request = request.bearer_auth(key);
            }

            match request.send() {
                Ok(response) => {
                    if response.status().is_success() {
                        let parsed: ChatResponse = response.json().map_err(|e| {
                            OracleError::InvalidReply(format!("Failed to parse response: {}", e))
                        })?;
                        let content = parsed
                            .choices
                            .into_iter()
                            .next()
                            .map(|c| c.message.content)
                            .ok_or_else(|| {
                                OracleError::InvalidReply("Response carried no choices".to_string())
                            })?;
                        return Ok(content);
                    } else if response.status() == reqwest::StatusCode::NOT_FOUND {
                        return Err(OracleError::ModelNotAvailable(self.model.clone()));
                    } else {
                        let status = response.status();
                        let error_text = response
                            .text()
                            .unwrap_or_else(|_| "Unknown error".to_string());
                        last_error = Some(OracleError::Communication(format!(
                            "HTTP {}: {}",
                            status, error_text
                        )));
                    }
                }
                Err(e) => {
                    last_error = Some(OracleError::Communication(format!(
                        "Request failed: {}",
                        e
                    )));
                }
            }

            attempts += 1;
            if attempts < self.max_retries {
                // Exponential backoff: 1s, 2s, 4s, ...
                let delay = Duration::from_secs(2u64.pow(attempts - 1));
                warn!(attempt = attempts, "oracle request failed, retrying");
                std::thread::sleep(delay);
            }
        }

        Err(last_error
            .unwrap_or_else(|| OracleError::Communication("Max retries exceeded".to_string())))
    }
}

impl Oracle for HttpOracle {
    type Error = OracleError;

    fn propose(&self, request: &OracleRequest) -> Result<OracleReply, Self::Error> {
        let prompt = build_prompt(request);
        debug!(
            class = request.schema.name.as_str(),
            round = request.round,
            prompt_len = prompt.len(),
            "calling oracle"
        );
        let raw = self.call(&prompt)?;
        parse_reply(&raw)
    }
}
