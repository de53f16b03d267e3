use crate::error::AgentError;
use crate::events::Event;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::sync::mpsc;
use tokio_stream::Stream;
use tokio_util::sync::{CancellationToken, DropGuard};

/// Creates the one-shot channel between a run and its single subscriber.
pub fn channel() -> (EventSink, EventStream) {
    let (tx, rx) = mpsc::unbounded_channel();
    let token = CancellationToken::new();

    let sink = EventSink {
        tx,
        token: token.clone(),
    };
    let stream = EventStream {
        rx,
        token: token.clone(),
        _guard: token.drop_guard(),
        closed: false,
    };
    (sink, stream)
}

/// Producer half, owned by the run.
pub struct EventSink {
    tx: mpsc::UnboundedSender<Event>,
    token: CancellationToken,
}

impl EventSink {
    /// Pushes one event. Fails with [`AgentError::Cancelled`] once the subscriber is gone.
    pub fn emit(&self, event: Event) -> Result<(), AgentError> {
        if self.token.is_cancelled() {
            return Err(AgentError::Cancelled);
        }
        self.tx.send(event).map_err(|_| AgentError::Cancelled)
    }

    pub fn token(&self) -> &CancellationToken {
        &self.token
    }
}

/// Consumer half of a run.
///
/// Dropping the stream or calling [`EventStream::cancel`] unsubscribes: the producer stops at
/// its next suspension point or emission and nothing further is yielded, buffered events
/// included.
pub struct EventStream {
    rx: mpsc::UnboundedReceiver<Event>,
    token: CancellationToken,
    _guard: DropGuard,
    closed: bool,
}

impl EventStream {
    pub fn cancel(&mut self) {
        self.token.cancel();
        self.rx.close();
        self.closed = true;
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Token shared with the producer; cancelled when this stream is dropped.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.token.clone()
    }
}

impl Stream for EventStream {
    type Item = Event;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Event>> {
        let this = self.get_mut();
        if this.closed {
            return Poll::Ready(None);
        }
        this.rx.poll_recv(cx)
    }
}
