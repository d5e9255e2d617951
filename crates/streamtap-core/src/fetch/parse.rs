//! Parse HTTP response header lines into HttpHeaders.

use crate::progress::SourceMetadata;

/// Response metadata relevant to length inference.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HttpHeaders {
    /// Status code from the last `HTTP/x y` status line.
    pub status: Option<u32>,
    /// Total size in bytes, if `Content-Length` is present.
    pub content_length: Option<u64>,
    /// `Content-Encoding` value if present (e.g. gzip).
    pub content_encoding: Option<String>,
}

impl SourceMetadata for HttpHeaders {
    fn content_length(&self) -> Option<u64> {
        self.content_length
    }

    fn content_encoding(&self) -> Option<&str> {
        self.content_encoding.as_deref()
    }
}

/// Parse collected header lines into HttpHeaders.
///
/// A status line starts a new header block, so after redirects only the
/// final response is described.
pub fn parse_headers(lines: &[String]) -> HttpHeaders {
    let mut headers = HttpHeaders::default();

    for line in lines {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line.starts_with("HTTP/") {
            headers = HttpHeaders {
                status: line
                    .split_whitespace()
                    .nth(1)
                    .and_then(|code| code.parse().ok()),
                ..HttpHeaders::default()
            };
            continue;
        }
        if let Some((name, value)) = line.split_once(':') {
            let name = name.trim();
            let value = value.trim();
            if name.eq_ignore_ascii_case("content-length") {
                if let Ok(n) = value.parse::<u64>() {
                    headers.content_length = Some(n);
                }
            }
            if name.eq_ignore_ascii_case("content-encoding") {
                headers.content_encoding = Some(value.to_string());
            }
        }
    }

    headers
}
