//! `GeminiCompleter` against a local one-shot HTTP server.
//!
//! Verifies how HTTP-level outcomes map onto an advance: a 200 without usable
//! text halts with the validator fallback, while an HTTP error status is a
//! transport failure and force-advances.

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use quest::core::feedback::{FeedbackStatus, TRANSPORT_FAILURE_MESSAGE, VALIDATOR_FALLBACK_MESSAGE};
use quest::core::machine::{Resolution, Session};
use quest::core::step::QuestStep;
use quest::io::completion::GeminiCompleter;
use quest::io::validator::Validator;
use quest::quest::run_advance;

/// Serve one canned response; the handle yields the raw request.
fn serve_once(status: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let base_url = format!("http://{}", listener.local_addr().expect("addr"));
    let handle = thread::spawn(move || {
        let (mut stream, _) = listener.accept().expect("accept");
        let request = read_request(&mut stream);
        let response = format!(
            "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        stream.write_all(response.as_bytes()).expect("write");
        request
    });
    (base_url, handle)
}

fn read_request(stream: &mut TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        let n = stream.read(&mut chunk).expect("read");
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
        let text = String::from_utf8_lossy(&buf);
        let Some(end) = text.find("\r\n\r\n") else {
            continue;
        };
        let head = text[..end].to_ascii_lowercase();
        if head.contains("transfer-encoding: chunked") {
            if text.ends_with("0\r\n\r\n") {
                break;
            }
            continue;
        }
        let content_length = head
            .lines()
            .find_map(|line| line.strip_prefix("content-length:"))
            .and_then(|value| value.trim().parse::<usize>().ok())
            .unwrap_or(0);
        if buf.len() >= end + 4 + content_length {
            break;
        }
    }
    String::from_utf8_lossy(&buf).into_owned()
}

fn advance_against(base_url: &str) -> (Session, Resolution) {
    let completer =
        GeminiCompleter::new(base_url, "test-model", "test-key", Duration::from_secs(10));
    let validator = Validator::new(completer).expect("validator");
    let mut session = Session::new();
    let outcome =
        run_advance(&mut session, &validator, Duration::ZERO, |_, _| {}).expect("advance");
    (session, outcome.resolution)
}

#[test]
fn blocked_candidate_halts_with_validator_fallback() {
    let (base_url, server) = serve_once("200 OK", r#"{"candidates":[{"finishReason":"SAFETY"}]}"#);

    let (session, resolution) = advance_against(&base_url);

    assert_eq!(resolution, Resolution::Halted);
    assert_eq!(session.step(), QuestStep::Anchor);
    let feedback = session.feedback().expect("feedback");
    assert_eq!(feedback.status, FeedbackStatus::Error);
    assert_eq!(feedback.message, VALIDATOR_FALLBACK_MESSAGE);

    let request = server.join().expect("server").to_ascii_lowercase();
    assert!(request.starts_with("post /v1beta/models/test-model:generatecontent"));
    assert!(request.contains("x-goog-api-key: test-key"));
}

#[test]
fn empty_parts_halt_with_validator_fallback() {
    let (base_url, server) = serve_once(
        "200 OK",
        r#"{"candidates":[{"content":{"role":"model","parts":[]}}]}"#,
    );

    let (session, resolution) = advance_against(&base_url);
    server.join().expect("server");

    assert_eq!(resolution, Resolution::Halted);
    assert_eq!(session.step(), QuestStep::Anchor);
    assert_eq!(
        session.feedback().map(|f| f.message.as_str()),
        Some(VALIDATOR_FALLBACK_MESSAGE)
    );
}

#[test]
fn http_error_status_force_advances() {
    let (base_url, server) = serve_once(
        "500 Internal Server Error",
        r#"{"error":{"code":500,"message":"internal"}}"#,
    );

    let (session, resolution) = advance_against(&base_url);
    server.join().expect("server");

    assert_eq!(
        resolution,
        Resolution::ForcedAdvance {
            to: QuestStep::Blueprint
        }
    );
    assert_eq!(
        session.feedback().map(|f| f.message.as_str()),
        Some(TRANSPORT_FAILURE_MESSAGE)
    );
}
