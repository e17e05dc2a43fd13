//! Notification Fan-out
//!
//! Fire-and-forget delivery of server events to connected clients. Each
//! WebSocket connection subscribes to the broadcast channel and filters by
//! recipient; events sent while nobody is connected are dropped, never
//! queued or retried.

use crate::events::ServerEvent;
use tokio::sync::broadcast;
use tracing::debug;

/// Addressing for an outbound event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recipient {
    All,
    User(String),
}

/// An addressed event on the fan-out channel.
#[derive(Debug, Clone)]
pub struct Envelope {
    pub recipient: Recipient,
    pub event: ServerEvent,
}

impl Envelope {
    /// Whether a connection bound to `username` should deliver this event.
    pub fn is_for(&self, username: &str) -> bool {
        match &self.recipient {
            Recipient::All => true,
            Recipient::User(user) => user == username,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Notifier {
    tx: broadcast::Sender<Envelope>,
}

impl Notifier {
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Envelope> {
        self.tx.subscribe()
    }

    /// Push an event at one user's connections, if any.
    pub fn send_to(&self, username: &str, event: ServerEvent) {
        self.send(Envelope {
            recipient: Recipient::User(username.to_string()),
            event,
        });
    }

    /// Push an event at every connection.
    pub fn broadcast(&self, event: ServerEvent) {
        self.send(Envelope {
            recipient: Recipient::All,
            event,
        });
    }

    fn send(&self, envelope: Envelope) {
        if self.tx.send(envelope).is_err() {
            debug!("no connected clients; event dropped");
        }
    }

    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new(1024)
    }
}
