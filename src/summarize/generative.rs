use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::errors::GenerativeError;
use crate::text::Language;

/// A remote summarizer. `summarize` is a single attempt with no retry.
#[async_trait]
pub trait GenerativeBackend: Send + Sync {
    /// False when no credential is available; callers must not expect a
    /// network attempt in that case.
    fn is_configured(&self) -> bool;

    async fn summarize(&self, text: &str, sentence_count: usize) -> Result<String, GenerativeError>;
}

#[derive(Debug, Clone)]
pub struct GenerativeSettings {
    pub base_url: String,
    pub api_key: Option<String>,
    pub model: String,
    pub language: Language,
    pub max_output_tokens: u32,
    pub timeout: Duration,
}

/// OpenAI-compatible chat completions client.
pub struct OpenAiSummarizer {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
    language: Language,
    max_output_tokens: u32,
}

impl OpenAiSummarizer {
    pub fn new(settings: GenerativeSettings) -> Result<Self, GenerativeError> {
        let client = Client::builder().timeout(settings.timeout).build()?;
        Ok(Self {
            client,
            base_url: settings.base_url,
            api_key: settings.api_key.filter(|k| !k.trim().is_empty()),
            model: settings.model,
            language: settings.language,
            max_output_tokens: settings.max_output_tokens,
        })
    }
}

/// System instruction; depends only on the target language and sentence count.
pub fn instruction(language: Language, sentence_count: usize) -> String {
    let unit = if sentence_count == 1 {
        "sentence"
    } else {
        "sentences"
    };
    format!(
        "You are a precise summarization assistant. Summarize the text supplied by the user in {language} \
         using at most {sentence_count} {unit}. Keep only the most important information and do not add \
         facts that are not in the text. Reply with the summary alone, one sentence per line."
    )
}

#[async_trait]
impl GenerativeBackend for OpenAiSummarizer {
    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    async fn summarize(&self, text: &str, sentence_count: usize) -> Result<String, GenerativeError> {
        let Some(api_key) = self.api_key.as_deref() else {
            return Err(GenerativeError::CredentialMissing);
        };
        let system = instruction(self.language, sentence_count);
        let body = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &system,
                },
                ChatMessage {
                    role: "user",
                    content: text,
                },
            ],
            max_tokens: self.max_output_tokens,
            temperature: 0.2,
        };

        let url = format!("{}/chat/completions", self.base_url.trim_end_matches('/'));
        tracing::debug!(
            model = %self.model,
            text_chars = text.chars().count(),
            sentence_count,
            "calling generative service"
        );
        let resp = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let detail = resp.text().await.unwrap_or_default();
            let detail: String = detail.chars().take(200).collect();
            tracing::warn!(%status, "generative service returned an error status");
            return Err(GenerativeError::Upstream(format!("status {status}: {detail}")));
        }

        let parsed: ChatResponse = resp.json().await?;
        parsed
            .choices
            .into_iter()
            .find_map(|c| c.message.and_then(|m| m.content))
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .ok_or(GenerativeError::EmptyResponse)
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: Option<ResponseMessage>,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}
