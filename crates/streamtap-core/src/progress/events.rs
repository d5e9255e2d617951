//! Side-channel events and listener registration.

use tokio::sync::mpsc;

use super::state::ProgressState;

/// Event published by a [`ProgressStream`](super::ProgressStream).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProgressEvent {
    /// A rate-limited (or final) snapshot.
    Progress(ProgressState),
    /// The total length was set or inferred.
    Length(u64),
}

pub(super) type Listener = Box<dyn FnMut(&ProgressEvent) + Send>;

/// Listeners in registration order. Publishing is synchronous.
#[derive(Default)]
pub(super) struct Listeners {
    inner: Vec<Listener>,
}

impl Listeners {
    pub(super) fn push(&mut self, listener: Listener) {
        self.inner.push(listener);
    }

    pub(super) fn publish(&mut self, event: &ProgressEvent) {
        for listener in &mut self.inner {
            listener(event);
        }
    }

    pub(super) fn len(&self) -> usize {
        self.inner.len()
    }
}

/// Listener that forwards events into a bounded channel.
///
/// Never blocks the data path: when the receiver lags and the channel is full,
/// the event is dropped. A later snapshot supersedes it anyway.
pub fn channel_listener(tx: mpsc::Sender<ProgressEvent>) -> impl FnMut(&ProgressEvent) + Send {
    move |event| {
        if let Err(mpsc::error::TrySendError::Full(_)) = tx.try_send(*event) {
            tracing::trace!("progress event dropped, receiver lagging");
        }
    }
}
