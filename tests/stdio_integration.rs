use assert_cmd::prelude::*;
use std::io::{BufRead, BufReader, Read, Write};
use std::process::{Command, Stdio};

const ARABIC_PARAGRAPH: &str = "القراءة غذاء العقل والروح. القراءة تفتح أبواب المعرفة. يحب الطلاب القراءة كثيرا. تساعد الكتب على تنمية اللغة. ينصح المعلمون بالقراءة اليومية المستمرة.";

fn write_framed<W: Write>(w: &mut W, v: &serde_json::Value) {
    let s = serde_json::to_string(v).unwrap();
    write!(w, "Content-Length: {}\r\n\r\n{}", s.len(), s).unwrap();
    w.flush().unwrap();
}

fn read_framed<R: Read>(reader: &mut BufReader<R>) -> serde_json::Value {
    let mut header = String::new();
    let mut content_length: Option<usize> = None;
    loop {
        header.clear();
        let n = reader.read_line(&mut header).unwrap();
        assert!(n > 0, "unexpected eof reading header");
        let line = header.trim_end_matches(['\r', '\n']);
        if line.is_empty() {
            break;
        }
        if let Some(rest) = line.strip_prefix("Content-Length:") {
            content_length = Some(rest.trim().parse::<usize>().unwrap());
        }
    }
    let len = content_length.expect("missing Content-Length");
    let mut body = vec![0u8; len];
    reader.read_exact(&mut body).unwrap();
    serde_json::from_slice(&body).unwrap()
}

fn call<W: Write, R: Read>(
    stdin: &mut W,
    stdout: &mut BufReader<R>,
    id: i64,
    method: &str,
    params: serde_json::Value,
) -> serde_json::Value {
    write_framed(
        stdin,
        &serde_json::json!({"jsonrpc":"2.0","id":id,"method":method,"params":params}),
    );
    let resp = read_framed(stdout);
    assert_eq!(resp.get("id").and_then(|x| x.as_i64()), Some(id));
    resp
}

fn spawn() -> std::process::Child {
    let mut cmd = Command::cargo_bin("summarizer-assistant").unwrap();
    cmd.env_remove("OPENAI_API_KEY")
        .env_remove("DEFAULT_STRATEGY")
        .env_remove("SERVICE_FORCE_NDJSON")
        .env("SUMMARY_LANGUAGE", "arabic")
        .env("RUST_LOG", "warn")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .unwrap()
}

#[test]
fn stdio_end_to_end() {
    let mut child = spawn();
    let mut stdin = child.stdin.take().unwrap();
    let mut stdout = BufReader::new(child.stdout.take().unwrap());

    let resp = call(&mut stdin, &mut stdout, 1, "initialize", serde_json::json!({}));
    assert_eq!(resp["result"]["serverInfo"]["name"], "summarizer-assistant");

    // Without a credential generative is listed but unavailable.
    let resp = call(&mut stdin, &mut stdout, 2, "list_strategies", serde_json::json!({}));
    assert_eq!(resp["result"]["default"], "centrality");
    let strategies = resp["result"]["strategies"].as_array().unwrap();
    assert_eq!(strategies.len(), 4);
    let generative = strategies
        .iter()
        .find(|s| s["id"] == "generative")
        .unwrap();
    assert_eq!(generative["available"], false);

    let resp = call(
        &mut stdin,
        &mut stdout,
        3,
        "set_strategy",
        serde_json::json!({"user_id":"42","strategy":"luhn"}),
    );
    assert_eq!(resp["result"]["strategy"], "frequency");

    let resp = call(
        &mut stdin,
        &mut stdout,
        4,
        "summarize",
        serde_json::json!({"user_id":"42","text":ARABIC_PARAGRAPH}),
    );
    let result = &resp["result"];
    assert_eq!(result["status"], "ok");
    assert_eq!(result["strategy"], "frequency");
    let sentences = result["sentences"].as_array().unwrap();
    assert_eq!(sentences.len(), 3);
    let mut cursor = 0;
    for s in sentences {
        let s = s.as_str().unwrap();
        let at = ARABIC_PARAGRAPH[cursor..]
            .find(s)
            .expect("sentence copied verbatim and in source order");
        cursor += at + s.len();
    }

    let resp = call(
        &mut stdin,
        &mut stdout,
        5,
        "set_strategy",
        serde_json::json!({"user_id":"42","strategy":"markov"}),
    );
    let err = &resp["error"];
    assert_eq!(err["code"], -32602);
    assert_eq!(err["data"]["kind"], "unknown_strategy");
    assert_eq!(
        err["data"]["valid_strategies"],
        serde_json::json!(["centrality", "decomposition", "frequency", "generative"])
    );

    let resp = call(
        &mut stdin,
        &mut stdout,
        6,
        "get_settings",
        serde_json::json!({"user_id":"42"}),
    );
    assert_eq!(resp["result"]["strategy"], "frequency");

    let resp = call(
        &mut stdin,
        &mut stdout,
        7,
        "set_strategy",
        serde_json::json!({"user_id":"42","strategy":"LSA"}),
    );
    assert_eq!(resp["result"]["strategy"], "decomposition");

    let resp = call(
        &mut stdin,
        &mut stdout,
        8,
        "summarize",
        serde_json::json!({"user_id":"7","text":ARABIC_PARAGRAPH,"strategy":"generative"}),
    );
    assert_eq!(resp["result"]["status"], "diagnostic");
    assert_eq!(resp["result"]["kind"], "credential_missing");

    let resp = call(
        &mut stdin,
        &mut stdout,
        9,
        "summarize",
        serde_json::json!({"user_id":"7","text":"نص قصير"}),
    );
    assert_eq!(resp["error"]["data"]["kind"], "too_short");
    assert_eq!(resp["error"]["data"]["min_chars"], 100);

    let resp = call(&mut stdin, &mut stdout, 10, "metrics", serde_json::json!({}));
    assert_eq!(resp["result"]["dispatch"]["requests"], 2);
    assert_eq!(resp["result"]["known_users"], 2);

    drop(stdin);
    let status = child.wait().unwrap();
    assert!(status.success());
}

#[test]
fn raw_json_lines_get_line_replies() {
    let mut child = spawn();
    let mut stdin = child.stdin.take().unwrap();
    let mut stdout = BufReader::new(child.stdout.take().unwrap());

    writeln!(
        stdin,
        "{}",
        serde_json::json!({"jsonrpc":"2.0","id":1,"method":"get_settings","params":{"user_id":"a"}})
    )
    .unwrap();
    stdin.flush().unwrap();

    let mut line = String::new();
    stdout.read_line(&mut line).unwrap();
    let resp: serde_json::Value = serde_json::from_str(line.trim()).unwrap();
    assert_eq!(resp["id"], 1);
    assert_eq!(resp["result"]["strategy"], "centrality");
    assert_eq!(resp["result"]["sentence_count"], 3);

    drop(stdin);
    assert!(child.wait().unwrap().success());
}
