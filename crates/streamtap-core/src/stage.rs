//! Async pipeline stage over tokio channels.
//!
//! Chunks arrive as `Result<T, E>` on a bounded channel and leave the same
//! way. Awaiting `send` on the bounded output is the backpressure; an `Err`
//! item is forwarded downstream and ends the stage without a completion
//! snapshot.

use std::fmt;

use tokio::sync::mpsc;

use crate::clock::Clock;
use crate::error::ProgressError;
use crate::progress::{Chunk, ProgressState, ProgressStream};

/// Forward every chunk from `input` to `output` through `stream`.
///
/// Returns the final snapshot once `input` closes. With `output` absent or
/// closed, a draining stream keeps consuming and discards the chunks; a
/// non-draining one stops with [`ProgressError::DownstreamClosed`].
pub async fn forward<T, E, C>(
    stream: &mut ProgressStream<C>,
    mut input: mpsc::Receiver<Result<T, E>>,
    mut output: Option<mpsc::Sender<Result<T, E>>>,
) -> Result<ProgressState, ProgressError>
where
    T: Chunk,
    E: fmt::Display,
    C: Clock,
{
    while let Some(item) = input.recv().await {
        match item {
            Ok(chunk) => {
                let chunk = stream.transform(chunk);
                let delivered = match &output {
                    Some(tx) => tx.send(Ok(chunk)).await.is_ok(),
                    None => false,
                };
                if !delivered {
                    if !stream.drain() {
                        stream.fail("downstream closed");
                        return Err(ProgressError::DownstreamClosed);
                    }
                    if output.take().is_some() {
                        tracing::debug!("downstream closed, draining");
                    }
                }
            }
            Err(e) => {
                let message = e.to_string();
                stream.fail(&message);
                if let Some(tx) = &output {
                    if tx.send(Err(e)).await.is_err() {
                        tracing::debug!("downstream closed before upstream error was forwarded");
                    }
                }
                return Err(ProgressError::Upstream(message));
            }
        }
    }
    Ok(stream.finish())
}
