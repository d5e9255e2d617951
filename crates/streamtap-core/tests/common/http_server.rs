//! Minimal HTTP/1.1 server for integration tests.
//!
//! Serves a single static body to every GET, with configurable status and
//! headers, and closes the connection after each response.

use std::io::{Read, Write};
use std::net::TcpListener;
use std::sync::Arc;
use std::thread;

#[derive(Debug, Clone, Copy)]
pub struct ServerOptions {
    /// Status line sent with the body (e.g. "200 OK").
    pub status: &'static str,
    /// If false, omit `Content-Length`; the body ends when the connection closes.
    pub send_length: bool,
    /// Optional `Content-Encoding` value.
    pub content_encoding: Option<&'static str>,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            status: "200 OK",
            send_length: true,
            content_encoding: None,
        }
    }
}

/// Starts a server in a background thread serving `body`. Returns the base URL
/// (e.g. "http://127.0.0.1:12345/"). The server runs until the process exits.
pub fn start(body: Vec<u8>) -> String {
    start_with_options(body, ServerOptions::default())
}

pub fn start_with_options(body: Vec<u8>, opts: ServerOptions) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let body = Arc::new(body);
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let body = Arc::clone(&body);
            thread::spawn(move || handle(stream, &body, opts));
        }
    });
    format!("http://127.0.0.1:{}/", port)
}

fn handle(mut stream: std::net::TcpStream, body: &[u8], opts: ServerOptions) {
    let _ = stream.set_read_timeout(Some(std::time::Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(std::time::Duration::from_secs(5)));
    let mut buf = [0u8; 8192];
    match stream.read(&mut buf) {
        Ok(0) | Err(_) => return,
        Ok(_) => {}
    }
    let mut head = format!(
        "HTTP/1.1 {}\r\nContent-Type: application/octet-stream\r\nConnection: close\r\n",
        opts.status
    );
    if opts.send_length {
        head.push_str(&format!("Content-Length: {}\r\n", body.len()));
    }
    if let Some(enc) = opts.content_encoding {
        head.push_str(&format!("Content-Encoding: {}\r\n", enc));
    }
    head.push_str("\r\n");
    let _ = stream.write_all(head.as_bytes());
    // Several writes so the client sees more than one body chunk.
    for part in body.chunks(16 * 1024) {
        if stream.write_all(part).is_err() {
            return;
        }
    }
    let _ = stream.flush();
}
