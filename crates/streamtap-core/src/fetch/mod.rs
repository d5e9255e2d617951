//! HTTP GET as a progress source.
//!
//! Uses the curl crate (libcurl). Response headers are collected while they
//! arrive; on the first body chunk they are connected to the stream so the
//! total length comes from `Content-Length`. The body then flows through the
//! stream into the sink.

mod parse;

pub use parse::{parse_headers, HttpHeaders};

use std::cell::RefCell;
use std::io::{self, ErrorKind, Write};
use std::str;
use std::time::Duration;

use crate::clock::Clock;
use crate::error::ProgressError;
use crate::progress::ProgressStream;

/// Transfer settings for [`fetch_to`].
#[derive(Debug, Clone)]
pub struct HttpOptions {
    pub connect_timeout: Duration,
    pub timeout: Duration,
    pub follow_redirects: bool,
    /// Extra request headers ("Name", "value").
    pub headers: Vec<(String, String)>,
}

impl Default for HttpOptions {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(15),
            timeout: Duration::from_secs(3600),
            follow_redirects: true,
            headers: Vec::new(),
        }
    }
}

/// Body-side state shared by the curl callbacks.
struct Body<'a, W, C> {
    stream: &'a mut ProgressStream<C>,
    sink: W,
    lines: Vec<String>,
    connected: bool,
    discarding: bool,
    written: u64,
    status_error: Option<u32>,
    sink_error: Option<io::Error>,
}

impl<W: Write, C: Clock> Body<'_, W, C> {
    fn header(&mut self, data: &[u8]) {
        if let Ok(s) = str::from_utf8(data) {
            let line = s.trim_end();
            if line.starts_with("HTTP/") {
                self.lines.clear();
            }
            self.lines.push(line.to_string());
        }
    }

    /// Returns the number of bytes taken; anything short of `data.len()` aborts the transfer.
    fn body(&mut self, data: &[u8]) -> usize {
        if !self.connected {
            self.connected = true;
            let headers = parse_headers(&self.lines);
            if let Some(code) = headers.status.filter(|c| !(200..300).contains(c)) {
                self.status_error = Some(code);
                return 0;
            }
            self.stream.connect(&headers);
        }
        let data = self.stream.transform(data);
        if !self.discarding {
            if let Err(e) = self.sink.write_all(data) {
                if e.kind() == ErrorKind::BrokenPipe && self.stream.drain() {
                    tracing::debug!(written = self.written, "sink closed, draining");
                    self.discarding = true;
                } else {
                    self.sink_error = Some(e);
                    return 0;
                }
            }
        }
        self.written += data.len() as u64;
        data.len()
    }
}

/// GET `url`, passing the body through `stream` into `sink`.
///
/// Returns the number of body bytes received. Finishes the stream on
/// success; on any failure the stream is marked failed instead.
pub fn fetch_to<W: Write, C: Clock>(
    url: &str,
    stream: &mut ProgressStream<C>,
    sink: W,
    opts: &HttpOptions,
) -> Result<u64, ProgressError> {
    let mut easy = curl::easy::Easy::new();
    easy.url(url)?;
    easy.follow_location(opts.follow_redirects)?;
    easy.max_redirections(10)?;
    easy.connect_timeout(opts.connect_timeout)?;
    easy.timeout(opts.timeout)?;

    if !opts.headers.is_empty() {
        let mut list = curl::easy::List::new();
        for (k, v) in &opts.headers {
            list.append(&format!("{}: {}", k.trim(), v.trim()))?;
        }
        easy.http_headers(list)?;
    }

    let state = RefCell::new(Body {
        stream,
        sink,
        lines: Vec::new(),
        connected: false,
        discarding: false,
        written: 0,
        status_error: None,
        sink_error: None,
    });

    let performed = {
        let mut transfer = easy.transfer();
        transfer.header_function(|data| {
            state.borrow_mut().header(data);
            true
        })?;
        transfer.write_function(|data| Ok(state.borrow_mut().body(data)))?;
        transfer.perform()
    };
    let mut body = state.into_inner();

    if let Err(e) = performed {
        let err = match (body.status_error, body.sink_error.take()) {
            (Some(code), _) => ProgressError::Http(code),
            (None, Some(io)) => ProgressError::Io(io),
            (None, None) => ProgressError::Curl(e),
        };
        body.stream.fail(&err);
        return Err(err);
    }

    // 0 for non-HTTP schemes (file://).
    let code = easy.response_code()?;
    if code != 0 && !(200..300).contains(&code) {
        let err = ProgressError::Http(code);
        body.stream.fail(&err);
        return Err(err);
    }
    if !body.connected {
        let headers = parse_headers(&body.lines);
        body.stream.connect(&headers);
    }
    if !body.discarding {
        if let Err(e) = body.sink.flush() {
            body.stream.fail(&e);
            return Err(e.into());
        }
    }
    body.stream.finish();
    tracing::debug!(url, bytes = body.written, "fetch complete");
    Ok(body.written)
}
