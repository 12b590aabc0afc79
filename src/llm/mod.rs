
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error, warn};
use url::Url;

use crate::config::LlmConfig;

const DEFAULT_TIMEOUT_SECONDS: u64 = 60;
const DEFAULT_RETRY_ATTEMPTS: u32 = 3;
const EXPONENTIAL_BACKOFF_BASE: u64 = 2;

/// Chat-completion client for grounded answer generation against an
/// OpenAI-compatible endpoint
#[derive(Debug, Clone)]
pub struct ChatClient {
    completions_url: Url,
    model: String,
    api_key: String,
    temperature: f32,
    max_tokens: u32,
    agent: ureq::Agent,
    retry_attempts: u32,
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

impl ChatClient {
    /// Build a client from config; the API key is read from the environment
    /// variable the config names
    #[inline]
    pub fn new(config: &LlmConfig) -> Result<Self> {
        let completions_url = Url::parse(&format!(
            "{}/chat/completions",
            config.api_url.trim_end_matches('/')
        ))
        .context("Failed to build chat completions URL from config")?;

        let api_key = std::env::var(&config.api_key_env).with_context(|| {
            format!(
                "Answer generation requires the {} environment variable",
                config.api_key_env
            )
        })?;

        let agent = ureq::Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(DEFAULT_TIMEOUT_SECONDS)))
            .build()
            .into();

        Ok(Self {
            completions_url,
            model: config.model.clone(),
            api_key,
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            agent,
            retry_attempts: DEFAULT_RETRY_ATTEMPTS,
        })
    }

    #[inline]
    pub fn with_retry_attempts(mut self, attempts: u32) -> Self {
        self.retry_attempts = attempts;
        self
    }

    /// Generate an answer to `question` grounded exclusively in the supplied
    /// context chunks. The prompt instructs the model to decline when the
    /// context does not contain the answer.
    #[inline]
    pub fn generate_answer(&self, question: &str, contexts: &[String]) -> Result<String> {
        debug!(
            "Generating answer for question (length {}) over {} context chunks",
            question.len(),
            contexts.len()
        );

        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: build_prompt(question, contexts),
            }],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        let request_json =
            serde_json::to_string(&request).context("Failed to serialize chat request")?;

        let response_text = self
            .make_request_with_retry(|| {
                self.agent
                    .post(self.completions_url.as_str())
                    .header("Content-Type", "application/json")
                    .header("Authorization", &format!("Bearer {}", self.api_key))
                    .send(&request_json)
                    .and_then(|mut resp| resp.body_mut().read_to_string())
            })
            .context("Failed to generate answer")?;

        let chat_response: ChatResponse =
            serde_json::from_str(&response_text).context("Failed to parse chat response")?;

        let answer = chat_response
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content.trim().to_string())
            .context("Chat response contained no choices")?;

        debug!("Generated answer of {} characters", answer.len());
        Ok(answer)
    }

    fn make_request_with_retry<F>(&self, mut request_fn: F) -> Result<String>
    where
        F: FnMut() -> Result<String, ureq::Error>,
    {
        let mut last_error = None;

        for attempt in 1..=self.retry_attempts {
            debug!("HTTP request attempt {}/{}", attempt, self.retry_attempts);

            match request_fn() {
                Ok(response_text) => return Ok(response_text),
                Err(error) => {
                    let should_retry = match &error {
                        ureq::Error::StatusCode(status) => {
                            if *status >= 500 {
                                warn!(
                                    "Server error (status {}), attempt {}/{}",
                                    status, attempt, self.retry_attempts
                                );
                                true
                            } else {
                                warn!("Client error (status {}), not retrying", status);
                                return Err(anyhow::anyhow!("Client error: HTTP {}", status));
                            }
                        }
                        ureq::Error::ConnectionFailed
                        | ureq::Error::HostNotFound
                        | ureq::Error::Timeout(_)
                        | ureq::Error::Io(_) => {
                            warn!(
                                "Transport error: {}, attempt {}/{}",
                                error, attempt, self.retry_attempts
                            );
                            true
                        }
                        _ => {
                            warn!("Non-retryable error: {}", error);
                            false
                        }
                    };

                    if !should_retry {
                        return Err(anyhow::anyhow!("Non-retryable error: {}", error));
                    }

                    last_error = Some(anyhow::anyhow!("Request error: {}", error));

                    if attempt < self.retry_attempts {
                        let delay = Duration::from_millis(
                            EXPONENTIAL_BACKOFF_BASE.pow(attempt - 1) * 1000,
                        );
                        debug!("Waiting {:?} before retry", delay);
                        std::thread::sleep(delay);
                    }
                }
            }
        }

        error!(
            "All retry attempts failed for request to {}",
            self.completions_url
        );

        Err(last_error.unwrap_or_else(|| anyhow::anyhow!("Request failed after retries")))
    }
}

/// Strict grounding prompt: answer only from the supplied chunks, decline
/// otherwise
fn build_prompt(question: &str, contexts: &[String]) -> String {
    let context = contexts
        .iter()
        .enumerate()
        .map(|(i, chunk)| format!("Chunk {}:\n{}", i + 1, chunk))
        .collect::<Vec<_>>()
        .join("\n\n");

    format!(
        "You are an assistant answering questions ONLY using the provided document context.\n\
         \n\
         Rules:\n\
         - Use ONLY the information from the context\n\
         - If the answer is not in the context, say: \"The document does not contain this information.\"\n\
         - Do NOT use prior knowledge\n\
         - Be clear and concise\n\
         \n\
         Context:\n\
         {context}\n\
         \n\
         Question:\n\
         {question}\n\
         \n\
         Answer:"
    )
}
