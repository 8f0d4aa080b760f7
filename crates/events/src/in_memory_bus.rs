//! In-process change bus.

use tokio::sync::broadcast;

use crate::bus::{ChangeBus, Subscription};

/// Default number of undelivered notices kept per subscriber.
pub const DEFAULT_CAPACITY: usize = 64;

/// In-memory broadcast bus.
///
/// - Fan-out to every live subscriber
/// - Bounded; slow subscribers see `Delivery::Lagged` instead of blocking publishers
#[derive(Debug)]
pub struct InMemoryChangeBus<M> {
    sender: broadcast::Sender<M>,
}

impl<M: Clone> InMemoryChangeBus<M> {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Live subscriber count.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl<M: Clone> Default for InMemoryChangeBus<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M> ChangeBus<M> for InMemoryChangeBus<M>
where
    M: Clone + Send + core::fmt::Debug + 'static,
{
    fn publish(&self, message: M) {
        if let Err(broadcast::error::SendError(dropped)) = self.sender.send(message) {
            tracing::trace!(?dropped, "change notice published with no subscribers");
        }
    }

    fn subscribe(&self) -> Subscription<M> {
        Subscription::new(self.sender.subscribe())
    }
}
