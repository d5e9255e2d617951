//! Errors raised by the adapters that drive a progress stream.
//!
//! The stream itself never fails while counting; these describe failures of
//! the pipeline around it.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProgressError {
    /// Reading from the source or writing to the sink failed.
    #[error("i/o: {0}")]
    Io(#[from] std::io::Error),

    /// The upstream stage reported an error; it was forwarded downstream.
    #[error("upstream failed: {0}")]
    Upstream(String),

    /// The downstream consumer went away and the stream is not draining.
    #[error("downstream closed before end of stream")]
    DownstreamClosed,

    /// HTTP response had a non-2xx status.
    #[error("HTTP {0}")]
    Http(u32),

    /// Curl reported an error (timeout, connection, etc.).
    #[error("curl: {0}")]
    Curl(#[from] curl::Error),
}

impl ProgressError {
    /// True when the error came from the far side of the pipeline (source or network).
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            ProgressError::Upstream(_) | ProgressError::Http(_) | ProgressError::Curl(_)
        )
    }
}
