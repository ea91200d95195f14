pub mod extractive;
pub mod generative;
pub mod registry;

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::errors::GenerativeError;
use crate::text::Language;
use generative::GenerativeBackend;
use registry::{StrategyId, StrategyKind};

/// Separator the transport uses to render extractive output.
pub const PARAGRAPH_SEPARATOR: &str = "\n\n";

#[derive(Debug, Clone)]
pub struct SummarizationRequest {
    pub text: String,
    pub sentence_count: usize,
    pub strategy: StrategyId,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub strategy: StrategyId,
    pub sentences: Vec<String>,
    pub requested: usize,
}

impl Summary {
    pub fn text(&self) -> String {
        self.sentences.join(PARAGRAPH_SEPARATOR)
    }

    /// Extractive only; a generative reply sets its own line breaks.
    pub fn is_partial(&self) -> bool {
        matches!(self.strategy.kind(), StrategyKind::Extractive(_))
            && self.sentences.len() < self.requested
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    NoSentences,
    CredentialMissing,
    Upstream,
    Timeout,
    EmptyResponse,
    Internal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub message: String,
    pub retryable: bool,
}

impl Diagnostic {
    fn new(kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            retryable: matches!(kind, DiagnosticKind::Upstream | DiagnosticKind::Timeout),
        }
    }

    fn no_sentences() -> Self {
        Self::new(
            DiagnosticKind::NoSentences,
            "could not summarize this text; it may be too short or unsuitable for summarization",
        )
    }

    fn from_generative(err: GenerativeError) -> Self {
        match err {
            GenerativeError::CredentialMissing => Self::new(
                DiagnosticKind::CredentialMissing,
                "the generative strategy is not configured; choose another strategy",
            ),
            GenerativeError::Upstream(detail) => Self::new(
                DiagnosticKind::Upstream,
                format!("the generative service failed, try again later ({detail})"),
            ),
            GenerativeError::Timeout => Self::new(
                DiagnosticKind::Timeout,
                "the generative service did not answer in time, try again later",
            ),
            GenerativeError::EmptyResponse => Self::new(
                DiagnosticKind::EmptyResponse,
                "the generative service returned an empty summary",
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SummarizationResult {
    Summary(Summary),
    Diagnostic(Diagnostic),
}

#[derive(Default)]
struct DispatchMetrics {
    requests: AtomicU64,
    summaries: AtomicU64,
    diagnostics: AtomicU64,
    extractive_runs: AtomicU64,
    generative_calls: AtomicU64,
}

#[derive(Debug, Serialize)]
pub struct DispatchMetricsSnapshot {
    pub requests: u64,
    pub summaries: u64,
    pub diagnostics: u64,
    pub extractive_runs: u64,
    pub generative_calls: u64,
}

/// Routes a request to the adapter for its strategy and folds every failure
/// into a [`Diagnostic`].
pub struct Dispatcher {
    language: Language,
    generative: Arc<dyn GenerativeBackend>,
    timeout: Duration,
    metrics: DispatchMetrics,
}

impl Dispatcher {
    pub fn new(language: Language, generative: Arc<dyn GenerativeBackend>, timeout: Duration) -> Self {
        Self {
            language,
            generative,
            timeout,
            metrics: DispatchMetrics::default(),
        }
    }

    pub fn generative_enabled(&self) -> bool {
        self.generative.is_configured()
    }

    pub async fn summarize(&self, req: &SummarizationRequest) -> SummarizationResult {
        self.metrics.requests.fetch_add(1, Ordering::Relaxed);
        let result = match req.strategy.kind() {
            StrategyKind::Generative => self.run_generative(req).await,
            StrategyKind::Extractive(algorithm) => {
                self.metrics.extractive_runs.fetch_add(1, Ordering::Relaxed);
                let text = req.text.clone();
                let language = self.language;
                let count = req.sentence_count;
                tokio::task::spawn_blocking(move || {
                    extractive::rank(&text, language, count, algorithm)
                })
                .await
                .map_err(|e| {
                    tracing::error!(error = %e, "extractive worker failed");
                    Diagnostic::new(DiagnosticKind::Internal, "internal error while summarizing")
                })
            }
        };

        let outcome = match result {
            Ok(sentences) if sentences.is_empty() => {
                SummarizationResult::Diagnostic(Diagnostic::no_sentences())
            }
            Ok(sentences) => SummarizationResult::Summary(Summary {
                strategy: req.strategy,
                sentences,
                requested: req.sentence_count,
            }),
            Err(diagnostic) => SummarizationResult::Diagnostic(diagnostic),
        };
        match &outcome {
            SummarizationResult::Summary(s) => {
                self.metrics.summaries.fetch_add(1, Ordering::Relaxed);
                tracing::info!(
                    strategy = %req.strategy,
                    returned = s.sentences.len(),
                    requested = s.requested,
                    "summary produced"
                );
            }
            SummarizationResult::Diagnostic(d) => {
                self.metrics.diagnostics.fetch_add(1, Ordering::Relaxed);
                tracing::warn!(strategy = %req.strategy, kind = ?d.kind, "summarization diagnostic");
            }
        }
        outcome
    }

    async fn run_generative(&self, req: &SummarizationRequest) -> Result<Vec<String>, Diagnostic> {
        if !self.generative.is_configured() {
            return Err(Diagnostic::from_generative(GenerativeError::CredentialMissing));
        }
        self.metrics.generative_calls.fetch_add(1, Ordering::Relaxed);
        // Dropping the future on timeout releases the underlying connection.
        let text = match tokio::time::timeout(
            self.timeout,
            self.generative.summarize(&req.text, req.sentence_count),
        )
        .await
        {
            Ok(Ok(text)) => text,
            Ok(Err(e)) => return Err(Diagnostic::from_generative(e)),
            Err(_) => return Err(Diagnostic::from_generative(GenerativeError::Timeout)),
        };
        Ok(text
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect())
    }

    pub fn metrics_snapshot(&self) -> DispatchMetricsSnapshot {
        DispatchMetricsSnapshot {
            requests: self.metrics.requests.load(Ordering::Relaxed),
            summaries: self.metrics.summaries.load(Ordering::Relaxed),
            diagnostics: self.metrics.diagnostics.load(Ordering::Relaxed),
            extractive_runs: self.metrics.extractive_runs.load(Ordering::Relaxed),
            generative_calls: self.metrics.generative_calls.load(Ordering::Relaxed),
        }
    }
}
