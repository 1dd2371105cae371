//! In-process food collection.
//!
//! Behaves like a remote collection: writes are applied to shared state and
//! broadcast as child events to every live subscription. New subscriptions
//! first receive an `Added` event for each existing record.

use std::sync::Arc;

use tokio::sync::broadcast::{self, error::RecvError};
use tokio::sync::RwLock;

use super::error::SyncError;
use super::event::ChildEvent;
use super::gateway::FoodGateway;
use super::subscription::Subscription;
use crate::models::{Food, FoodId};

const BROADCAST_BUFFER: usize = 256;

#[derive(Debug, Default)]
struct State {
    records: Vec<Food>,
    revoked: Option<String>,
}

#[derive(Debug)]
struct Inner {
    state: RwLock<State>,
    events: broadcast::Sender<ChildEvent>,
}

/// Cloneable handle on a shared in-memory collection.
#[derive(Debug, Clone)]
pub struct MemoryCollection {
    inner: Arc<Inner>,
}

impl MemoryCollection {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(BROADCAST_BUFFER);
        Self {
            inner: Arc::new(Inner {
                state: RwLock::new(State::default()),
                events,
            }),
        }
    }

    /// Current records in collection order.
    pub async fn records(&self) -> Vec<Food> {
        self.inner.state.read().await.records.clone()
    }

    /// Writes a record under `id`, emitting `Added` or `Changed`.
    ///
    /// Writing an identical value emits nothing.
    pub async fn set(&self, id: &FoodId, food: &Food) {
        let mut state = self.inner.state.write().await;
        let record = food.clone().with_id(id.clone());

        let event = match state.records.iter().position(|r| r.is_same_item(&record)) {
            Some(position) if state.records[position] == record => return,
            Some(position) => {
                state.records[position] = record.clone();
                ChildEvent::Changed(record)
            }
            None => {
                state.records.push(record.clone());
                ChildEvent::Added(record)
            }
        };
        self.broadcast(event);
    }

    /// Moves a record to the end of the collection, emitting `Moved`.
    ///
    /// Returns false if no record has this id.
    pub async fn move_to_end(&self, id: &FoodId) -> bool {
        let mut state = self.inner.state.write().await;
        let Some(position) = state.records.iter().position(|r| r.id.as_ref() == Some(id)) else {
            return false;
        };
        let record = state.records.remove(position);
        state.records.push(record.clone());
        self.broadcast(ChildEvent::Moved(record));
        true
    }

    /// Revokes access: live subscriptions receive `Cancelled`, and new ones
    /// are cancelled immediately.
    pub async fn revoke(&self, reason: impl Into<String>) {
        let reason = reason.into();
        let mut state = self.inner.state.write().await;
        state.revoked = Some(reason.clone());
        self.broadcast(ChildEvent::Cancelled(reason));
    }

    /// Number of subscriptions currently attached.
    pub fn subscriber_count(&self) -> usize {
        self.inner.events.receiver_count()
    }

    fn broadcast(&self, event: ChildEvent) {
        tracing::trace!(kind = event.kind(), "Broadcasting child event");
        // No receivers is fine; nobody is subscribed.
        let _ = self.inner.events.send(event);
    }
}

impl Default for MemoryCollection {
    fn default() -> Self {
        Self::new()
    }
}

impl FoodGateway for MemoryCollection {
    async fn subscribe(&self) -> Result<Subscription, SyncError> {
        let (tx, rx) = Subscription::channel();

        // Snapshot and attach under the same lock so no write falls between.
        let state = self.inner.state.read().await;
        let revoked = state.revoked.clone();
        let snapshot = state.records.clone();
        let mut updates = self.inner.events.subscribe();
        drop(state);

        let producer = tokio::spawn(async move {
            if let Some(reason) = revoked {
                let _ = tx.send(ChildEvent::Cancelled(reason)).await;
                return;
            }

            for food in snapshot {
                if tx.send(ChildEvent::Added(food)).await.is_err() {
                    return;
                }
            }

            loop {
                match updates.recv().await {
                    Ok(event) => {
                        let terminal = matches!(event, ChildEvent::Cancelled(_));
                        if tx.send(event).await.is_err() || terminal {
                            return;
                        }
                    }
                    Err(RecvError::Lagged(missed)) => {
                        tracing::warn!(missed, "Subscriber fell behind, cancelling");
                        let _ = tx
                            .send(ChildEvent::Cancelled(format!(
                                "subscriber missed {} events",
                                missed
                            )))
                            .await;
                        return;
                    }
                    Err(RecvError::Closed) => return,
                }
            }
        });

        Ok(Subscription::new(rx, producer))
    }

    async fn create(&self, food: &Food) -> Result<FoodId, SyncError> {
        let id = FoodId::generate();
        let mut state = self.inner.state.write().await;
        let record = food.clone().with_id(id.clone());
        state.records.push(record.clone());
        self.broadcast(ChildEvent::Added(record));
        Ok(id)
    }

    async fn delete(&self, id: &FoodId) -> Result<(), SyncError> {
        let mut state = self.inner.state.write().await;
        if let Some(position) = state.records.iter().position(|r| r.id.as_ref() == Some(id)) {
            let record = state.records.remove(position);
            self.broadcast(ChildEvent::Removed(record));
        }
        Ok(())
    }
}
