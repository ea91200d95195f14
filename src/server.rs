use serde::Deserialize;
use serde_json::{json, Value};
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tracing::Instrument;
use uuid::Uuid;

use crate::errors::{FrameError, ServiceError, SummarizeError};
use crate::health;
use crate::settings::{SettingsStore, UserId};
use crate::summarize::{Dispatcher, SummarizationRequest, SummarizationResult};
use crate::validate::validate_text;

const SERVER_NAME: &str = "summarizer-assistant";
const MAX_FRAME_BYTES: usize = 4 * 1024 * 1024;
const METHODS: &[&str] = &[
    "summarize",
    "set_strategy",
    "set_sentence_count",
    "get_settings",
    "list_strategies",
    "metrics",
    "health_check",
];

#[derive(Debug, Clone)]
pub struct GenerativeEndpoint {
    pub base_url: String,
    pub api_key: Option<String>,
}

pub struct StdioService {
    store: SettingsStore,
    dispatcher: Arc<Dispatcher>,
    min_text_chars: usize,
    endpoint: GenerativeEndpoint,
}

impl StdioService {
    pub fn new(
        store: SettingsStore,
        dispatcher: Arc<Dispatcher>,
        min_text_chars: usize,
        endpoint: GenerativeEndpoint,
    ) -> Self {
        Self {
            store,
            dispatcher,
            min_text_chars,
            endpoint,
        }
    }

    // Replies are matched by id, not by order.
    pub async fn run(self: Arc<Self>) -> anyhow::Result<()> {
        let mut reader = tokio::io::BufReader::new(tokio::io::stdin());
        let ndjson = Arc::new(AtomicBool::new(
            std::env::var("SERVICE_FORCE_NDJSON").ok().as_deref() == Some("1"),
        ));
        let (tx, mut rx) = mpsc::channel::<Value>(64);

        let writer = {
            let ndjson = ndjson.clone();
            tokio::spawn(async move {
                let mut stdout = tokio::io::stdout();
                while let Some(reply) = rx.recv().await {
                    if let Err(e) = write_framed(&mut stdout, &reply, ndjson.load(Ordering::Relaxed)).await {
                        tracing::warn!(error = ?e, "failed to write reply");
                        break;
                    }
                }
            })
        };

        tracing::info!("service loop started: waiting for requests on stdin");
        loop {
            let frame = match read_frame(&mut reader, MAX_FRAME_BYTES).await {
                Ok(Some(frame)) => frame,
                Ok(None) => break,
                Err(FrameError::Malformed(reason)) => {
                    tracing::warn!(%reason, "skipping malformed frame");
                    continue;
                }
                Err(FrameError::Io(e)) => {
                    tracing::debug!(error = ?e, "stdin closed");
                    break;
                }
            };
            if frame.raw {
                ndjson.store(true, Ordering::Relaxed);
            }
            let req: Value = match serde_json::from_slice(&frame.body) {
                Ok(v) => v,
                Err(e) => {
                    tracing::warn!(error = ?e, "invalid JSON");
                    continue;
                }
            };
            let method = req
                .get("method")
                .and_then(|m| m.as_str())
                .unwrap_or("")
                .to_string();
            let id = req.get("id").filter(|v| !v.is_null()).cloned();
            let params = req.get("params").cloned().unwrap_or(json!({}));
            tracing::debug!(%method, id = ?id, "received request");

            let service = self.clone();
            let tx = tx.clone();
            tokio::spawn(async move {
                let outcome = service.handle(&method, params).await;
                // Notifications (no id) get no reply.
                let Some(id) = id else { return };
                let reply = match outcome {
                    Ok(result) => json!({"jsonrpc": "2.0", "id": id, "result": result}),
                    Err(e) => error_reply(id, &e),
                };
                let _ = tx.send(reply).await;
            });
        }

        // The writer drains once every in-flight request has dropped its sender.
        drop(tx);
        writer.await?;
        tracing::info!("service loop finished");
        Ok(())
    }

    pub async fn handle(&self, method: &str, params: Value) -> Result<Value, ServiceError> {
        match method {
            "initialize" | "server/info" => Ok(json!({
                "serverInfo": {"name": SERVER_NAME, "version": env!("CARGO_PKG_VERSION")},
                "methods": METHODS,
            })),
            "summarize" => {
                let p: SummarizeParams = serde_json::from_value(params)?;
                self.summarize(p).await
            }
            "set_strategy" => {
                let p: SetStrategyParams = serde_json::from_value(params)?;
                let settings = self.store.select_strategy(&p.user_id, &p.strategy)?;
                Ok(serde_json::to_value(settings)?)
            }
            "set_sentence_count" => {
                let p: SetSentenceCountParams = serde_json::from_value(params)?;
                let count = sentence_count(p.sentence_count)?;
                let settings = self.store.set_sentence_count(&p.user_id, count);
                tracing::info!(user = %p.user_id, sentence_count = count.get(), "sentence count changed");
                Ok(serde_json::to_value(settings)?)
            }
            "get_settings" => {
                let p: UserParams = serde_json::from_value(params)?;
                Ok(serde_json::to_value(self.store.get(&p.user_id))?)
            }
            "list_strategies" => Ok(json!({
                "strategies": self.store.registry().entries(),
                "default": self.store.registry().default_strategy(),
            })),
            "metrics" => Ok(json!({
                "dispatch": self.dispatcher.metrics_snapshot(),
                "known_users": self.store.len(),
            })),
            "health_check" => {
                let generative_ok = health::check_generative(
                    &self.endpoint.base_url,
                    self.endpoint.api_key.as_deref(),
                )
                .await;
                Ok(json!({
                    "generative_configured": self.dispatcher.generative_enabled(),
                    "generative_ok": generative_ok,
                    "server": {"name": SERVER_NAME, "version": env!("CARGO_PKG_VERSION")},
                }))
            }
            other => Err(ServiceError::MethodNotFound(other.to_string())),
        }
    }

    async fn summarize(&self, p: SummarizeParams) -> Result<Value, ServiceError> {
        let text = validate_text(&p.text, self.min_text_chars)?;
        let settings = self.store.get(&p.user_id);
        // Per-request overrides are not persisted.
        let strategy = match p.strategy.as_deref() {
            Some(name) => self.store.registry().resolve(name)?,
            None => settings.strategy,
        };
        let count = match p.sentence_count {
            Some(n) => sentence_count(n)?,
            None => settings.sentence_count,
        };

        let request_id = Uuid::new_v4();
        let span = tracing::info_span!(
            "summarize",
            %request_id,
            user = %p.user_id,
            %strategy,
            text_chars = text.chars().count()
        );
        let request = SummarizationRequest {
            text: text.to_string(),
            sentence_count: count.get(),
            strategy,
        };
        let result = self.dispatcher.summarize(&request).instrument(span).await;
        Ok(render(result))
    }
}

fn sentence_count(n: u64) -> Result<NonZeroUsize, SummarizeError> {
    usize::try_from(n)
        .ok()
        .and_then(NonZeroUsize::new)
        .ok_or(SummarizeError::InvalidSentenceCount(n))
}

fn render(result: SummarizationResult) -> Value {
    match result {
        SummarizationResult::Summary(s) => json!({
            "status": "ok",
            "strategy": s.strategy,
            "summary": s.text(),
            "partial": s.is_partial(),
            "requested": s.requested,
            "sentences": s.sentences,
        }),
        SummarizationResult::Diagnostic(d) => json!({
            "status": "diagnostic",
            "kind": d.kind,
            "message": d.message,
            "retryable": d.retryable,
        }),
    }
}

fn error_reply(id: Value, err: &ServiceError) -> Value {
    let mut data = json!({"kind": err.kind(), "retryable": false});
    match err {
        ServiceError::Summarize(SummarizeError::UnknownStrategy { valid, .. }) => {
            data["valid_strategies"] = json!(valid);
        }
        ServiceError::Summarize(SummarizeError::TooShort { min, .. }) => {
            data["min_chars"] = json!(min);
        }
        _ => {}
    }
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "error": {"code": err.code(), "message": err.to_string(), "data": data}
    })
}

#[derive(Debug)]
struct Frame {
    body: Vec<u8>,
    /// Sent as a bare JSON line rather than with a Content-Length header.
    raw: bool,
}

async fn read_frame<R: AsyncBufRead + Unpin>(
    reader: &mut R,
    max_len: usize,
) -> Result<Option<Frame>, FrameError> {
    let mut header = String::new();
    let mut content_length: Option<Result<usize, String>> = None;
    let mut header_lines: usize = 0;
    loop {
        header.clear();
        let n = reader.read_line(&mut header).await?;
        if n == 0 {
            if header_lines == 0 {
                return Ok(None);
            }
            return Err(FrameError::Io(std::io::ErrorKind::UnexpectedEof.into()));
        }
        let line = header.trim_end_matches(['\r', '\n']);
        if line.is_empty() {
            if header_lines == 0 {
                continue;
            }
            break;
        }
        header_lines += 1;
        if header_lines == 1 && line.starts_with('{') && line.contains("\"jsonrpc\"") {
            tracing::trace!("raw JSON line without Content-Length");
            return Ok(Some(Frame {
                body: line.as_bytes().to_vec(),
                raw: true,
            }));
        }
        if let Some((name, value)) = line.split_once(':') {
            if name.trim().eq_ignore_ascii_case("content-length") {
                content_length = Some(value.trim().parse::<usize>().map_err(|e| e.to_string()));
            }
        }
    }
    let len = match content_length {
        Some(Ok(len)) => len,
        Some(Err(e)) => return Err(FrameError::Malformed(format!("bad Content-Length: {e}"))),
        None => return Err(FrameError::Malformed("missing Content-Length".into())),
    };
    if len > max_len {
        // Skip the body so the next frame starts on a header.
        tokio::io::copy(&mut (&mut *reader).take(len as u64), &mut tokio::io::sink()).await?;
        return Err(FrameError::Malformed(format!(
            "frame of {len} bytes exceeds the {max_len} byte limit"
        )));
    }
    let mut body = vec![0u8; len];
    reader.read_exact(&mut body).await?;
    Ok(Some(Frame { body, raw: false }))
}

async fn write_framed<W: AsyncWrite + Unpin>(
    writer: &mut W,
    v: &Value,
    ndjson: bool,
) -> anyhow::Result<()> {
    let s = serde_json::to_string(v)?;
    let framed = if ndjson {
        format!("{s}\n")
    } else {
        format!("Content-Length: {}\r\n\r\n{}", s.len(), s)
    };
    writer.write_all(framed.as_bytes()).await?;
    writer.flush().await?;
    Ok(())
}

#[derive(Debug, Deserialize)]
struct SummarizeParams {
    user_id: UserId,
    text: String,
    sentence_count: Option<u64>,
    strategy: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SetStrategyParams {
    user_id: UserId,
    strategy: String,
}

#[derive(Debug, Deserialize)]
struct SetSentenceCountParams {
    user_id: UserId,
    sentence_count: u64,
}

#[derive(Debug, Deserialize)]
struct UserParams {
    user_id: UserId,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::{SettingsDefaults, DEFAULT_SENTENCE_COUNT};
    use crate::summarize::registry::{StrategyId, StrategyRegistry};
    use crate::summarize::tests::FakeBackend;
    use crate::text::Language;
    use std::time::Duration;

    const ARABIC_PARAGRAPH: &str = "القراءة غذاء العقل والروح. القراءة تفتح أبواب المعرفة. يحب الطلاب القراءة كثيرا. تساعد الكتب على تنمية اللغة. ينصح المعلمون بالقراءة اليومية المستمرة.";

    fn service(backend: FakeBackend) -> StdioService {
        let backend = Arc::new(backend);
        let registry = Arc::new(StrategyRegistry::new(backend.configured));
        let defaults = SettingsDefaults {
            strategy: registry.default_strategy(),
            sentence_count: DEFAULT_SENTENCE_COUNT,
        };
        StdioService::new(
            SettingsStore::new(registry, defaults),
            Arc::new(Dispatcher::new(
                Language::Arabic,
                backend,
                Duration::from_secs(1),
            )),
            100,
            GenerativeEndpoint {
                base_url: "http://127.0.0.1:9".into(),
                api_key: None,
            },
        )
    }

    #[tokio::test]
    async fn summarize_uses_the_users_strategy_and_count() {
        let svc = service(FakeBackend::unconfigured());
        svc.handle("set_strategy", json!({"user_id": "u1", "strategy": "luhn"}))
            .await
            .unwrap();
        let out = svc
            .handle("summarize", json!({"user_id": "u1", "text": ARABIC_PARAGRAPH}))
            .await
            .unwrap();
        assert_eq!(out["status"], "ok");
        assert_eq!(out["strategy"], "frequency");
        let sentences = out["sentences"].as_array().unwrap();
        assert_eq!(sentences.len(), 3);
        for s in sentences {
            assert!(ARABIC_PARAGRAPH.contains(s.as_str().unwrap()));
        }
        assert_eq!(out["partial"], false);
        assert!(out["summary"].as_str().unwrap().contains("\n\n"));
    }

    #[tokio::test]
    async fn per_request_overrides_are_not_persisted() {
        let svc = service(FakeBackend::unconfigured());
        let out = svc
            .handle(
                "summarize",
                json!({"user_id": "u2", "text": ARABIC_PARAGRAPH, "sentence_count": 10, "strategy": "LSA"}),
            )
            .await
            .unwrap();
        assert_eq!(out["strategy"], "decomposition");
        assert_eq!(out["sentences"].as_array().unwrap().len(), 5);
        assert_eq!(out["partial"], true);

        let settings = svc
            .handle("get_settings", json!({"user_id": "u2"}))
            .await
            .unwrap();
        assert_eq!(settings["strategy"], "centrality");
        assert_eq!(settings["sentence_count"], 3);
    }

    #[tokio::test]
    async fn short_text_is_rejected_before_dispatch() {
        let svc = service(FakeBackend::unconfigured());
        let err = svc
            .handle("summarize", json!({"user_id": "u3", "text": "قصير جدا"}))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Summarize(SummarizeError::TooShort { .. })));
        assert_eq!(err.code(), -32602);
        assert_eq!(svc.dispatcher.metrics_snapshot().requests, 0);

        let reply = error_reply(json!(7), &err);
        assert_eq!(reply["error"]["data"]["min_chars"], 100);
    }

    #[tokio::test]
    async fn unknown_strategy_lists_valid_options_and_keeps_settings() {
        let svc = service(FakeBackend::unconfigured());
        let before = svc
            .handle("get_settings", json!({"user_id": "u4"}))
            .await
            .unwrap();
        let err = svc
            .handle("set_strategy", json!({"user_id": "u4", "strategy": "markov"}))
            .await
            .unwrap_err();
        let reply = error_reply(json!(1), &err);
        assert_eq!(reply["error"]["data"]["kind"], "unknown_strategy");
        assert_eq!(
            reply["error"]["data"]["valid_strategies"],
            json!(["centrality", "decomposition", "frequency", "generative"])
        );
        let after = svc
            .handle("get_settings", json!({"user_id": "u4"}))
            .await
            .unwrap();
        assert_eq!(before, after);
    }

    #[tokio::test]
    async fn generative_without_credential_returns_diagnostic() {
        let svc = service(FakeBackend::unconfigured());
        let out = svc
            .handle(
                "summarize",
                json!({"user_id": "u5", "text": ARABIC_PARAGRAPH, "strategy": "generative"}),
            )
            .await
            .unwrap();
        assert_eq!(out["status"], "diagnostic");
        assert_eq!(out["kind"], "credential_missing");
        assert_eq!(out["retryable"], false);
    }

    #[tokio::test]
    async fn zero_sentence_count_is_rejected() {
        let svc = service(FakeBackend::unconfigured());
        let err = svc
            .handle("set_sentence_count", json!({"user_id": "u6", "sentence_count": 0}))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "invalid_sentence_count");
        let ok = svc
            .handle("set_sentence_count", json!({"user_id": "u6", "sentence_count": 4}))
            .await
            .unwrap();
        assert_eq!(ok["sentence_count"], 4);
    }

    #[tokio::test]
    async fn list_strategies_reports_availability() {
        let svc = service(FakeBackend::replying("ok"));
        let out = svc.handle("list_strategies", json!({})).await.unwrap();
        assert_eq!(out["default"], "generative");
        let entries = out["strategies"].as_array().unwrap();
        assert_eq!(entries.len(), 4);
        assert!(entries.iter().all(|e| e["available"] == true));
        let generative = entries.iter().find(|e| e["id"] == "generative").unwrap();
        assert_eq!(generative["requires_network"], true);
    }

    #[tokio::test]
    async fn malformed_params_and_unknown_methods() {
        let svc = service(FakeBackend::unconfigured());
        let err = svc.handle("summarize", json!({"text": 5})).await.unwrap_err();
        assert_eq!(err.kind(), "invalid_params");
        let err = svc.handle("tools/list", json!({})).await.unwrap_err();
        assert_eq!(err.code(), -32601);
    }

    #[tokio::test]
    async fn concurrent_users_keep_independent_settings() {
        let svc = Arc::new(service(FakeBackend::unconfigured()));
        let names = ["lexrank", "lsa", "luhn"];
        let mut tasks = Vec::new();
        for i in 0..12 {
            let svc = svc.clone();
            tasks.push(tokio::spawn(async move {
                let user = format!("user-{i}");
                svc.handle(
                    "set_strategy",
                    json!({"user_id": user, "strategy": names[i % 3]}),
                )
                .await
                .unwrap();
                svc.handle("summarize", json!({"user_id": user, "text": ARABIC_PARAGRAPH}))
                    .await
                    .unwrap()
            }));
        }
        let expected = [
            StrategyId::Centrality,
            StrategyId::Decomposition,
            StrategyId::Frequency,
        ];
        for (i, task) in tasks.into_iter().enumerate() {
            let out = task.await.unwrap();
            assert_eq!(out["strategy"], json!(expected[i % 3]));
        }
    }

    #[tokio::test]
    async fn framed_write_and_read_roundtrip() {
        let v = json!({"jsonrpc": "2.0", "id": 1, "result": {"ok": true}});
        let mut out = Vec::new();
        write_framed(&mut out, &v, false).await.expect("write");
        let mut reader = tokio::io::BufReader::new(&out[..]);
        let frame = read_frame(&mut reader, MAX_FRAME_BYTES).await.expect("read").expect("frame");
        assert!(!frame.raw);
        let parsed: Value = serde_json::from_slice(&frame.body).unwrap();
        assert_eq!(parsed, v);
        assert!(read_frame(&mut reader, MAX_FRAME_BYTES).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn oversized_and_headerless_frames_are_skipped() {
        let good = r#"{"jsonrpc":"2.0","id":3,"method":"metrics"}"#;
        let input = format!(
            "Content-Length: 64\r\n\r\n{}X-Other: 1\r\n\r\nContent-Length: {}\r\n\r\n{}",
            "x".repeat(64),
            good.len(),
            good
        );
        let mut reader = tokio::io::BufReader::new(input.as_bytes());
        assert!(matches!(
            read_frame(&mut reader, 48).await,
            Err(FrameError::Malformed(_))
        ));
        assert!(matches!(
            read_frame(&mut reader, 48).await,
            Err(FrameError::Malformed(_))
        ));
        let frame = read_frame(&mut reader, 48).await.unwrap().unwrap();
        let parsed: Value = serde_json::from_slice(&frame.body).unwrap();
        assert_eq!(parsed["id"], 3);
    }

    #[tokio::test]
    async fn eof_inside_header_is_an_io_error() {
        let mut reader = tokio::io::BufReader::new(&b"Content-Length: 5\r\n"[..]);
        assert!(matches!(
            read_frame(&mut reader, MAX_FRAME_BYTES).await,
            Err(FrameError::Io(_))
        ));
    }

    #[tokio::test]
    async fn raw_json_lines_are_accepted() {
        let input = b"\n{\"jsonrpc\":\"2.0\",\"id\":2,\"method\":\"metrics\"}\n";
        let mut reader = tokio::io::BufReader::new(&input[..]);
        let frame = read_frame(&mut reader, MAX_FRAME_BYTES).await.unwrap().unwrap();
        assert!(frame.raw);
        let parsed: Value = serde_json::from_slice(&frame.body).unwrap();
        assert_eq!(parsed["method"], "metrics");

        let mut out = Vec::new();
        write_framed(&mut out, &parsed, true).await.unwrap();
        assert!(out.ends_with(b"\n"));
        assert!(!out.starts_with(b"Content-Length"));
    }
}
