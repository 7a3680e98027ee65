/// Integration tests for the chat-completion client against a local stub.
///
/// The stub is a one-shot TCP listener that reads a single HTTP request and
/// replies with a canned response, so no real model is needed.
use std::io::{BufRead, BufReader, Read, Write};
use std::net::TcpListener;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use sidekick::remote::{ChatClientTrait, ChatCompletionClientBuilder, RemoteError};

/// Serves exactly one request, returning the endpoint URL and a receiver for
/// the raw request body.
fn serve_once(status_line: &'static str, body: &'static str, delay: Duration) -> (String, mpsc::Receiver<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind stub");
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = mpsc::channel();

    thread::spawn(move || {
        let Ok((stream, _)) = listener.accept() else {
            return;
        };
        let mut reader = BufReader::new(stream.try_clone().unwrap());

        let mut content_length = 0usize;
        loop {
            let mut line = String::new();
            if reader.read_line(&mut line).unwrap_or(0) == 0 {
                break;
            }
            let trimmed = line.trim_end();
            if trimmed.is_empty() {
                break;
            }
            if let Some((name, value)) = trimmed.split_once(':')
                && name.eq_ignore_ascii_case("content-length")
            {
                content_length = value.trim().parse().unwrap_or(0);
            }
        }
        let mut request_body = vec![0u8; content_length];
        let _ = reader.read_exact(&mut request_body);
        let _ = tx.send(String::from_utf8_lossy(&request_body).into_owned());

        thread::sleep(delay);

        let mut stream = stream;
        let response = format!(
            "{status_line}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        let _ = stream.write_all(response.as_bytes());
        let _ = stream.flush();
    });

    (format!("http://{addr}/v1/chat/completions"), rx)
}

fn client_for(endpoint: &str, timeout: Duration) -> sidekick::ChatCompletionClient {
    ChatCompletionClientBuilder::new()
        .endpoint(endpoint)
        .api_token("hf_test")
        .model("test-model")
        .timeout(timeout)
        .build()
        .expect("client should build")
}

#[test]
fn successful_completion_returns_first_choice_content() {
    let (endpoint, requests) = serve_once(
        "HTTP/1.1 200 OK",
        r#"{"choices":[{"message":{"role":"assistant","content":"The total is $500."}}]}"#,
        Duration::ZERO,
    );
    let client = client_for(&endpoint, Duration::from_secs(5));

    let answer = client
        .complete("system rules", "What is the total?")
        .expect("completion should succeed");
    assert_eq!(answer, "The total is $500.");

    let sent: serde_json::Value =
        serde_json::from_str(&requests.recv().unwrap()).expect("request body is JSON");
    assert_eq!(sent["model"], "test-model");
    assert_eq!(sent["max_tokens"], 512);
    assert_eq!(sent["messages"][0]["content"], "system rules");
    assert_eq!(sent["messages"][1]["content"], "What is the total?");
}

#[test]
fn error_status_carries_status_and_body() {
    let (endpoint, _requests) = serve_once(
        "HTTP/1.1 503 Service Unavailable",
        r#"{"error":"model loading"}"#,
        Duration::ZERO,
    );
    let client = client_for(&endpoint, Duration::from_secs(5));

    match client.complete("s", "p") {
        Err(RemoteError::Api { status, body }) => {
            assert_eq!(status, 503);
            assert!(body.contains("model loading"));
        }
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[test]
fn unexpected_shape_is_returned_serialized() {
    let (endpoint, _requests) =
        serve_once("HTTP/1.1 200 OK", r#"{"generated_text":"hi"}"#, Duration::ZERO);
    let client = client_for(&endpoint, Duration::from_secs(5));

    let answer = client.complete("s", "p").unwrap();
    assert_eq!(answer, r#"{"generated_text":"hi"}"#);
}

#[test]
fn slow_endpoint_times_out() {
    let (endpoint, _requests) = serve_once(
        "HTTP/1.1 200 OK",
        r#"{"choices":[{"message":{"content":"late"}}]}"#,
        Duration::from_secs(3),
    );
    let client = client_for(&endpoint, Duration::from_millis(300));

    let result = client.complete("s", "p");
    assert!(
        matches!(result, Err(RemoteError::Timeout(_))),
        "expected timeout, got {result:?}"
    );
}

#[test]
fn unreachable_endpoint_is_a_network_error() {
    // Bind then drop to get a port with nothing listening
    let port = TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port();
    let client = client_for(
        &format!("http://127.0.0.1:{port}/v1/chat/completions"),
        Duration::from_secs(2),
    );

    let result = client.complete("s", "p");
    assert!(
        matches!(result, Err(RemoteError::Network(_))),
        "expected network error, got {result:?}"
    );
}
