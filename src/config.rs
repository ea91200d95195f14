use clap::Parser;
use std::num::NonZeroUsize;
use std::time::Duration;

use crate::settings::{SettingsDefaults, DEFAULT_SENTENCE_COUNT};
use crate::summarize::generative::GenerativeSettings;
use crate::summarize::registry::StrategyRegistry;
use crate::text::Language;
use crate::validate::DEFAULT_MIN_TEXT_CHARS;

#[derive(Debug, Clone, Parser)]
#[command(name = "summarizer-assistant")]
#[command(about = "Summarizes chat text with per-user extractive or generative strategies", long_about = None)]
pub struct AppConfig {
    #[arg(long, env = "SUMMARY_LANGUAGE", value_enum, default_value = "arabic")]
    pub language: Language,

    #[arg(long, env = "DEFAULT_SENTENCES", default_value_t = DEFAULT_SENTENCE_COUNT.get())]
    pub default_sentences: usize,

    /// Strategy for users who never chose one; falls back to generative when a
    /// credential is configured, centrality otherwise.
    #[arg(long, env = "DEFAULT_STRATEGY")]
    pub default_strategy: Option<String>,

    #[arg(long, env = "MIN_TEXT_CHARS", default_value_t = DEFAULT_MIN_TEXT_CHARS)]
    pub min_text_chars: usize,

    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub openai_api_key: Option<String>,

    #[arg(long, env = "OPENAI_BASE_URL", default_value = "https://api.openai.com/v1")]
    pub openai_base_url: String,

    #[arg(long, env = "GENERATIVE_MODEL", default_value = "gpt-4o-mini")]
    pub generative_model: String,

    #[arg(long, env = "GENERATIVE_TIMEOUT_SECS", default_value_t = 60)]
    pub generative_timeout_secs: u64,

    #[arg(long, env = "MAX_OUTPUT_TOKENS", default_value_t = 512)]
    pub max_output_tokens: u32,
}

impl AppConfig {
    pub fn from_env_and_args() -> Self {
        Self::parse()
    }

    pub fn has_credential(&self) -> bool {
        self.openai_api_key
            .as_deref()
            .is_some_and(|k| !k.trim().is_empty())
    }

    pub fn generative_timeout(&self) -> Duration {
        Duration::from_secs(self.generative_timeout_secs)
    }

    pub fn generative(&self) -> GenerativeSettings {
        GenerativeSettings {
            base_url: self.openai_base_url.clone(),
            api_key: self.openai_api_key.clone(),
            model: self.generative_model.clone(),
            language: self.language,
            max_output_tokens: self.max_output_tokens,
            timeout: self.generative_timeout(),
        }
    }

    /// Defaults for first-contact users. An unresolvable `default_strategy` or
    /// a zero sentence count falls back to the registry default and 3.
    pub fn settings_defaults(&self, registry: &StrategyRegistry) -> SettingsDefaults {
        let strategy = self
            .default_strategy
            .as_deref()
            .and_then(|name| registry.resolve(name).ok())
            .unwrap_or_else(|| registry.default_strategy());
        let sentence_count = NonZeroUsize::new(self.default_sentences)
            .unwrap_or(DEFAULT_SENTENCE_COUNT);
        SettingsDefaults {
            strategy,
            sentence_count,
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.default_sentences == 0 {
            return Err("default_sentences must be > 0".into());
        }
        if self.min_text_chars == 0 {
            return Err("min_text_chars must be > 0".into());
        }
        if self.generative_timeout_secs == 0 {
            return Err("generative_timeout_secs must be > 0".into());
        }
        if self.max_output_tokens == 0 {
            return Err("max_output_tokens must be > 0".into());
        }
        url::Url::parse(&self.openai_base_url)
            .map_err(|_| "Invalid OPENAI_BASE_URL format".to_string())?;
        if let Some(name) = &self.default_strategy {
            StrategyRegistry::new(self.has_credential())
                .resolve(name)
                .map_err(|e| e.to_string())?;
        }
        Ok(())
    }
}
