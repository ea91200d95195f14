use std::sync::Arc;

mod config;
mod errors;
mod health;
mod logging;
mod server;
mod settings;
mod summarize;
mod text;
mod validate;

use crate::config::AppConfig;
use crate::server::{GenerativeEndpoint, StdioService};
use crate::settings::SettingsStore;
use crate::summarize::generative::OpenAiSummarizer;
use crate::summarize::registry::StrategyRegistry;
use crate::summarize::Dispatcher;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init_logging();

    let cfg = AppConfig::from_env_and_args();
    if let Err(e) = cfg.validate() {
        tracing::warn!(config_error=%e, "invalid config");
    }

    let registry = Arc::new(StrategyRegistry::new(cfg.has_credential()));
    let store = SettingsStore::new(registry.clone(), cfg.settings_defaults(&registry));
    let backend = Arc::new(OpenAiSummarizer::new(cfg.generative())?);
    let dispatcher = Arc::new(Dispatcher::new(
        cfg.language,
        backend,
        cfg.generative_timeout(),
    ));

    // Startup health check (best-effort, logged only)
    let generative_ok = if cfg.has_credential() {
        health::check_generative(&cfg.openai_base_url, cfg.openai_api_key.as_deref()).await
    } else {
        false
    };
    tracing::info!(
        language=%cfg.language,
        generative_configured=cfg.has_credential(),
        generative_ok=generative_ok,
        default_strategy=%registry.default_strategy(),
        min_text_chars=cfg.min_text_chars,
        "summarizer service startup complete"
    );

    let service = Arc::new(StdioService::new(
        store,
        dispatcher,
        cfg.min_text_chars,
        GenerativeEndpoint {
            base_url: cfg.openai_base_url.clone(),
            api_key: cfg.openai_api_key.clone(),
        },
    ));
    tokio::select! {
        res = service.run() => {
            if let Err(e) = res { tracing::error!(error=?e, "service terminated with error") }
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("received shutdown signal");
        }
    }
    Ok(())
}
