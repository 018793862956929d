use std::{
    fmt::{Display, Formatter},
    future::Future,
    pin::Pin,
    sync::Arc,
};

use tokio::{
    sync::{broadcast, oneshot},
    time::Instant,
};

/// Why a [`Context`] was cancelled.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum CancelReason {
    Deadline,
    Cancel,
}

impl Display for CancelReason {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Deadline => write!(f, "Deadline"),
            Self::Cancel => write!(f, "Cancel"),
        }
    }
}

struct RawContext {
    // Dropped when the last context clone goes away, which resolves
    // `Handler::done`.
    _sender: oneshot::Sender<()>,
    deadline: Option<Instant>,
    cancel_receiver: broadcast::Receiver<()>,
}

impl RawContext {
    #[must_use]
    fn new(deadline: Option<Instant>) -> (Self, Handler) {
        let (sender, recv) = oneshot::channel();
        let (cancel_sender, cancel_receiver) = broadcast::channel(1);

        (
            Self {
                _sender: sender,
                deadline,
                cancel_receiver,
            },
            Handler {
                recv,
                cancel_sender,
            },
        )
    }

    fn done(&self) -> Pin<Box<dyn Future<Output = CancelReason> + '_ + Send>> {
        let mut recv = self.cancel_receiver.resubscribe();
        Box::pin(async move {
            match self.deadline {
                Some(deadline) => {
                    tokio::select! {
                        _ = tokio::time::sleep_until(deadline) => CancelReason::Deadline,
                        _ = recv.recv() => CancelReason::Cancel,
                    }
                }
                None => {
                    let _ = recv.recv().await;
                    CancelReason::Cancel
                }
            }
        })
    }
}

/// The owning side of a [`Context`]: cancels it and waits for all holders to
/// drop.
pub struct Handler {
    recv: oneshot::Receiver<()>,
    cancel_sender: broadcast::Sender<()>,
}

impl Handler {
    /// Waits for every clone of the context to be dropped.
    pub async fn done(&mut self) {
        let _ = (&mut self.recv).await;
    }

    /// Cancels the context and waits for every clone to be dropped.
    pub async fn cancel(self) {
        drop(self.cancel_sender);

        let _ = self.recv.await;
    }
}

/// A cancellation context handed to long-running tasks so they can shut down
/// gracefully.
#[derive(Clone)]
pub struct Context(Arc<RawContext>);

impl Context {
    pub fn new() -> (Self, Handler) {
        let (ctx, handler) = RawContext::new(None);
        (Self(Arc::new(ctx)), handler)
    }

    pub fn with_deadline(deadline: Instant) -> (Self, Handler) {
        let (ctx, handler) = RawContext::new(Some(deadline));
        (Self(Arc::new(ctx)), handler)
    }

    pub fn with_timeout(timeout: std::time::Duration) -> (Self, Handler) {
        Self::with_deadline(Instant::now() + timeout)
    }

    /// Resolves once the context is cancelled or its deadline passes.
    pub async fn done(&self) -> CancelReason {
        self.0.done().await
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn test_cancel() {
        let (ctx, handler) = Context::new();

        let task = tokio::spawn(async move { ctx.done().await });

        handler.cancel().await;

        assert_eq!(task.await.unwrap(), CancelReason::Cancel);
    }

    #[tokio::test]
    async fn test_deadline() {
        let (ctx, _handler) = Context::with_timeout(Duration::from_millis(50));

        assert_eq!(ctx.done().await, CancelReason::Deadline);
    }

    #[tokio::test]
    async fn test_handler_waits_for_holders() {
        let (ctx, mut handler) = Context::new();

        let task = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            drop(ctx);
        });

        handler.done().await;
        task.await.unwrap();
    }
}
