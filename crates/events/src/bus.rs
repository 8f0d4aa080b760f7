//! Change notification publishing/subscription abstraction (mechanics only).
//!
//! A change bus distributes "the stall table changed" notices from a sync
//! adapter to whoever keeps a local copy of the table.
//!
//! - **Transport-agnostic**: in-process channels, a realtime socket, a poller
//! - **Lossy under pressure**: a slow subscriber may miss notices; it is told
//!   it lagged, which means "something changed" just like a notice would
//! - **No persistence**: the backend table is the source of truth

use std::sync::Arc;

use tokio::sync::broadcast;
use tokio::sync::broadcast::error::{RecvError, TryRecvError};

/// What a subscriber observes on its stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery<M> {
    Message(M),
    /// `n` messages were dropped because the subscriber fell behind.
    Lagged(u64),
}

/// A subscription to a change stream.
///
/// Dropping the subscription releases it; the bus stops delivering to it.
#[derive(Debug)]
pub struct Subscription<M> {
    receiver: broadcast::Receiver<M>,
}

impl<M: Clone> Subscription<M> {
    pub fn new(receiver: broadcast::Receiver<M>) -> Self {
        Self { receiver }
    }

    /// Wait for the next delivery; `None` once the bus is gone.
    pub async fn recv(&mut self) -> Option<Delivery<M>> {
        match self.receiver.recv().await {
            Ok(message) => Some(Delivery::Message(message)),
            Err(RecvError::Lagged(n)) => Some(Delivery::Lagged(n)),
            Err(RecvError::Closed) => None,
        }
    }

    /// Take a pending delivery without waiting.
    pub fn try_recv(&mut self) -> Option<Delivery<M>> {
        match self.receiver.try_recv() {
            Ok(message) => Some(Delivery::Message(message)),
            Err(TryRecvError::Lagged(n)) => Some(Delivery::Lagged(n)),
            Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => None,
        }
    }
}

/// Pub/sub for change notices.
///
/// `publish` never fails because nobody is listening; having no subscribers
/// is the normal state of a freshly started adapter.
pub trait ChangeBus<M>: Send + Sync {
    fn publish(&self, message: M);

    fn subscribe(&self) -> Subscription<M>;
}

impl<M, B> ChangeBus<M> for Arc<B>
where
    B: ChangeBus<M> + ?Sized,
{
    fn publish(&self, message: M) {
        (**self).publish(message)
    }

    fn subscribe(&self) -> Subscription<M> {
        (**self).subscribe()
    }
}
