//! State shared by the dev server's request handlers.
//!
//! Holds the scheme resolver that answers page requests and the set of
//! live-reload subscribers.

use crate::dev::DevEvent;
use hull_protocol::SchemeResolver;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

/// Messages buffered per subscriber before new ones are dropped for it.
const SUBSCRIBER_BUFFER: usize = 32;

/// Open live-reload event streams, keyed by subscriber id.
#[derive(Debug, Default)]
struct Subscribers {
    next_id: AtomicU64,
    senders: Mutex<HashMap<u64, mpsc::Sender<String>>>,
}

pub struct DevServerState {
    resolver: SchemeResolver,
    reload: bool,
    subscribers: Subscribers,
}

impl DevServerState {
    pub fn new(resolver: SchemeResolver, reload: bool) -> Self {
        Self {
            resolver,
            reload,
            subscribers: Subscribers::default(),
        }
    }

    pub fn resolver(&self) -> &SchemeResolver {
        &self.resolver
    }

    /// Whether served HTML gets the live-reload client.
    pub fn reload_enabled(&self) -> bool {
        self.reload
    }

    /// Open a new event stream. Messages are JSON-encoded [`DevEvent`]s.
    pub fn register_client(&self) -> (u64, mpsc::Receiver<String>) {
        let id = self.subscribers.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = mpsc::channel(SUBSCRIBER_BUFFER);
        self.subscribers.senders.lock().insert(id, tx);
        (id, rx)
    }

    pub fn unregister_client(&self, id: u64) {
        self.subscribers.senders.lock().remove(&id);
    }

    /// End every open stream.
    pub fn disconnect_all(&self) {
        self.subscribers.senders.lock().clear();
    }

    /// Push `event` to every subscriber without waiting on slow ones.
    ///
    /// Subscribers whose stream has gone away are removed. Returns how many
    /// subscribers received the event.
    pub fn broadcast(&self, event: &DevEvent) -> usize {
        let message = match serde_json::to_string(event) {
            Ok(message) => message,
            Err(err) => {
                tracing::warn!(error = %err, "failed to encode dev event");
                return 0;
            }
        };

        let mut delivered = 0;
        self.subscribers
            .senders
            .lock()
            .retain(|_, tx| match tx.try_send(message.clone()) {
                Ok(()) => {
                    delivered += 1;
                    true
                }
                Err(TrySendError::Full(_)) => true,
                Err(TrySendError::Closed(_)) => false,
            });
        delivered
    }

    pub fn client_count(&self) -> usize {
        self.subscribers.senders.lock().len()
    }
}

pub type SharedState = Arc<DevServerState>;
