use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_DIRECTIVES: &str = "info,summarizer_assistant=info";

/// `RUST_LOG` when it parses, the default directives otherwise.
fn filter(rust_log: Option<&str>) -> EnvFilter {
    rust_log
        .and_then(|s| EnvFilter::try_new(s).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_DIRECTIVES))
}

/// Logs go to stderr; stdout carries the protocol. Never colored, since the
/// host usually captures stderr into a file.
pub fn init_logging() {
    let rust_log = std::env::var("RUST_LOG").ok();
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_ansi(false)
        .with_thread_ids(false)
        .with_thread_names(false);

    let installed = tracing_subscriber::registry()
        .with(filter(rust_log.as_deref()))
        .with(fmt_layer)
        .try_init();
    if installed.is_err() {
        tracing::debug!("a global subscriber was already installed");
    }
}
