//! In-process typed broadcast signal: the fan-out hub from the worker
//! thread to every subscriber, plus the RAII connection handle.
//!
//! [`SubscriberHandle`] wraps a broadcast receiver in a guard whose `Drop`
//! is what actually disconnects it. `tokio::sync::broadcast` already tracks
//! receiver count for free, so there's nothing extra to wake on disconnect;
//! the worker thread never blocks on subscriber presence either way.

use std::collections::VecDeque;

use tokio::sync::broadcast;

/// Default ring-buffer capacity for a hub's broadcast channel. Generous for
/// typical event volumes; a subscriber that falls this far behind receives
/// `RecvError::Lagged` on its next `recv()` rather than stalling emission.
pub const CHANNEL_CAPACITY: usize = 4_096;

/// Fan-out signal for one scope (the receiver, or a single VFO).
pub struct EventHub<E> {
    sender: broadcast::Sender<E>,
}

impl<E: Clone> EventHub<E> {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { sender }
    }

    /// Emits `event` to every connected subscriber. Synchronous with respect
    /// to enqueueing onto each subscriber's ring buffer; subscribers must
    /// not block when draining it.
    pub fn emit(&self, event: E) {
        // `send` only errors when there are zero receivers, which is not a
        // failure from the emitter's point of view — nobody was listening.
        let _ = self.sender.send(event);
    }

    /// Connects a new subscriber and returns its RAII handle.
    pub fn subscribe(&self) -> SubscriberHandle<E> {
        SubscriberHandle {
            receiver: Some(self.sender.subscribe()),
            primed: VecDeque::new(),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl<E: Clone> Default for EventHub<E> {
    fn default() -> Self {
        Self::new()
    }
}

/// RAII connection handle. Dropping it (or calling [`disconnect`]
/// explicitly) removes the subscription; both are idempotent.
///
/// [`disconnect`]: SubscriberHandle::disconnect
pub struct SubscriberHandle<E> {
    receiver: Option<broadcast::Receiver<E>>,
    /// Synthetic replay events from the sync protocol, queued ahead of the
    /// live feed, visible only to this subscriber.
    primed: VecDeque<E>,
}

impl<E: Clone> SubscriberHandle<E> {
    /// Disconnects from the hub. Safe to call more than once.
    pub fn disconnect(&mut self) {
        self.receiver = None;
    }

    /// Queues `events` ahead of the live broadcast feed, visible only to
    /// this subscriber. Used to deliver the synchronisation replay without
    /// re-broadcasting it to every other connected subscriber.
    pub fn prime(&mut self, events: Vec<E>) {
        self.primed.extend(events);
    }

    /// Awaits the next event: first draining any primed replay events, then
    /// the live feed. Returns `Err` on lag (some events were dropped) or
    /// once the hub itself has gone away.
    pub async fn recv(&mut self) -> Result<E, broadcast::error::RecvError> {
        if let Some(event) = self.primed.pop_front() {
            return Ok(event);
        }
        match self.receiver.as_mut() {
            Some(r) => r.recv().await,
            None => Err(broadcast::error::RecvError::Closed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn subscriber_receives_emitted_events_in_order() {
        let hub: EventHub<i32> = EventHub::new();
        let mut sub = hub.subscribe();

        hub.emit(1);
        hub.emit(2);
        hub.emit(3);

        assert_eq!(sub.recv().await.unwrap(), 1);
        assert_eq!(sub.recv().await.unwrap(), 2);
        assert_eq!(sub.recv().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn disconnect_is_idempotent_and_drops_subscription() {
        let hub: EventHub<i32> = EventHub::new();
        let mut sub = hub.subscribe();
        assert_eq!(hub.subscriber_count(), 1);

        sub.disconnect();
        sub.disconnect();
        assert_eq!(hub.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn each_subscriber_sees_every_event_independently() {
        let hub: EventHub<i32> = EventHub::new();
        let mut a = hub.subscribe();
        let mut b = hub.subscribe();

        hub.emit(42);

        assert_eq!(a.recv().await.unwrap(), 42);
        assert_eq!(b.recv().await.unwrap(), 42);
    }
}
