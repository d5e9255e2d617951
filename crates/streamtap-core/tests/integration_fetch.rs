//! Integration test: local HTTP server, body passed through a progress stream.
//!
//! Covers length inference from `Content-Length`, the encoded-body exception,
//! and failure paths that must not report completion.

mod common;

use std::sync::{Arc, Mutex};

use common::http_server::{self, ServerOptions};
use streamtap_core::fetch::{fetch_to, HttpOptions};
use streamtap_core::{ProgressError, ProgressEvent, ProgressOptions, ProgressStream};

fn recorded(stream: &mut ProgressStream) -> Arc<Mutex<Vec<ProgressEvent>>> {
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&events);
    stream.subscribe(move |e| sink.lock().unwrap().push(*e));
    events
}

fn progress_of(events: &[ProgressEvent]) -> Vec<f64> {
    events
        .iter()
        .filter_map(|e| match e {
            ProgressEvent::Progress(p) => Some(p.percentage),
            ProgressEvent::Length(_) => None,
        })
        .collect()
}

#[test]
fn content_length_sets_length_before_first_progress() {
    let body: Vec<u8> = (0u8..200).cycle().take(1024 * 1024).collect();
    let url = http_server::start(body.clone());

    let mut stream = ProgressStream::new(ProgressOptions::default().time(100));
    let events = recorded(&mut stream);
    let mut out = Vec::new();
    let n = fetch_to(&url, &mut stream, &mut out, &HttpOptions::default()).expect("fetch");

    assert_eq!(n, body.len() as u64);
    assert_eq!(out, body, "body must pass through unchanged");

    let events = events.lock().unwrap();
    assert_eq!(events[0], ProgressEvent::Length(1024 * 1024));
    match events.last().unwrap() {
        ProgressEvent::Progress(p) => {
            assert_eq!(p.percentage, 100.0);
            assert_eq!(p.length, 1024 * 1024);
            assert_eq!(p.transferred, 1024 * 1024);
        }
        ProgressEvent::Length(_) => panic!("expected final progress"),
    }
}

#[test]
fn encoded_body_keeps_length_unknown() {
    let url = http_server::start_with_options(
        vec![1u8; 50_000],
        ServerOptions {
            content_encoding: Some("gzip"),
            ..ServerOptions::default()
        },
    );

    let mut stream = ProgressStream::new(ProgressOptions::default());
    let events = recorded(&mut stream);
    fetch_to(&url, &mut stream, std::io::sink(), &HttpOptions::default()).expect("fetch");

    let events = events.lock().unwrap();
    assert!(!events.iter().any(|e| matches!(e, ProgressEvent::Length(_))));
    let pcts = progress_of(&events);
    let (last, rest) = pcts.split_last().unwrap();
    assert_eq!(*last, 100.0);
    assert!(rest.iter().all(|p| *p == 0.0));
}

#[test]
fn missing_content_length_still_completes() {
    let url = http_server::start_with_options(
        vec![7u8; 40_000],
        ServerOptions {
            send_length: false,
            ..ServerOptions::default()
        },
    );

    let mut stream = ProgressStream::new(ProgressOptions::default());
    let n = fetch_to(&url, &mut stream, std::io::sink(), &HttpOptions::default()).expect("fetch");
    assert_eq!(n, 40_000);
    assert_eq!(stream.state().length, 0);
    assert_eq!(stream.state().percentage, 100.0);
}

#[test]
fn http_error_fails_without_completion() {
    let url = http_server::start_with_options(
        b"not here".to_vec(),
        ServerOptions {
            status: "404 Not Found",
            ..ServerOptions::default()
        },
    );

    let mut stream = ProgressStream::new(ProgressOptions::default());
    let events = recorded(&mut stream);
    let err = fetch_to(&url, &mut stream, std::io::sink(), &HttpOptions::default()).unwrap_err();

    assert!(matches!(err, ProgressError::Http(404)), "got {err}");
    assert!(stream.is_failed());
    assert!(progress_of(&events.lock().unwrap()).is_empty());
}
