//! Room-scoped refresh notifications.
//!
//! One broadcast channel fans out to every connected WebSocket session;
//! each session filters on its own room. Delivery is best-effort: events
//! only tell clients to re-fetch, so a dropped or duplicate event is
//! harmless and a send into a channel with no subscribers is ignored.

use tokio::sync::broadcast;

const BROADCAST_CAPACITY: usize = 256;

/// Target audience of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Room {
    Admin,
    Reseller(i64),
}

#[derive(Debug, Clone)]
pub struct Notification {
    pub room: Room,
    pub event: &'static str,
}

#[derive(Clone)]
pub struct EventHub {
    tx: broadcast::Sender<Notification>,
}

impl EventHub {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(BROADCAST_CAPACITY);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.tx.subscribe()
    }

    /// Emit after commit only. Never fails the caller.
    pub fn emit(&self, room: Room, event: &'static str) {
        let _ = self.tx.send(Notification { room, event });
    }
}

impl Default for EventHub {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn delivers_to_subscriber() {
        let hub = EventHub::new();
        let mut rx = hub.subscribe();

        hub.emit(Room::Admin, "update_orders");

        let n = rx.recv().await.unwrap();
        assert_eq!(n.room, Room::Admin);
        assert_eq!(n.event, "update_orders");
    }

    #[tokio::test]
    async fn emit_without_subscribers_is_ignored() {
        let hub = EventHub::new();
        // No receiver exists; must not panic or error.
        hub.emit(Room::Reseller(7), "update_balance");
    }
}
