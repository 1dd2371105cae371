//! A client session against a remote food collection.
//!
//! The session owns the local [`ItemSyncStore`] and is its only writer. Events
//! are pulled from the subscription and applied one at a time, in delivery
//! order, on whichever task drives the session. User writes go to the
//! gateway and only reach the store through their echo events.

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::timeout;

use super::error::SyncError;
use super::event::ChildEvent;
use super::gateway::FoodGateway;
use super::subscription::Subscription;
use crate::models::{Food, FoodId};
use crate::store::ItemSyncStore;

/// Presentation hooks raised by a [`SyncSession`].
pub trait StoreObserver {
    /// Called after every added, changed or removed event.
    fn store_changed(&mut self, store: &ItemSyncStore);

    /// Called when the remote side reorders an item.
    fn item_moved(&mut self, _food: &Food) {}

    /// Called once when the subscription is revoked.
    fn subscription_cancelled(&mut self, _reason: &str) {}
}

impl StoreObserver for () {
    fn store_changed(&mut self, _store: &ItemSyncStore) {}
}

pub struct SyncSession<G, O> {
    gateway: G,
    store: ItemSyncStore,
    observer: O,
    subscription: Option<Subscription>,
}

impl<G, O> SyncSession<G, O>
where
    G: FoodGateway + Clone + Send + Sync + 'static,
    O: StoreObserver,
{
    /// Creates a session with an empty store. Nothing is subscribed until
    /// [`start`](Self::start).
    pub fn new(gateway: G, observer: O) -> Self {
        Self {
            gateway,
            store: ItemSyncStore::new(),
            observer,
            subscription: None,
        }
    }

    pub fn store(&self) -> &ItemSyncStore {
        &self.store
    }

    pub fn observer(&self) -> &O {
        &self.observer
    }

    pub fn observer_mut(&mut self) -> &mut O {
        &mut self.observer
    }

    pub fn is_subscribed(&self) -> bool {
        self.subscription.is_some()
    }

    /// Ends the session, releasing the subscription and keeping the store.
    pub fn into_store(mut self) -> ItemSyncStore {
        self.stop();
        self.store
    }

    /// Subscribes to the collection. Does nothing if already subscribed.
    pub async fn start(&mut self) -> Result<(), SyncError> {
        if self.subscription.is_none() {
            self.subscription = Some(self.gateway.subscribe().await?);
        }
        Ok(())
    }

    /// Releases the subscription. The store keeps its contents.
    pub fn stop(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            subscription.close();
        }
    }

    /// Waits for one event and applies it.
    ///
    /// Returns `Ok(false)` once there is no subscription or its stream has
    /// ended, and `Err(SubscriptionCancelled)` if access was revoked.
    pub async fn process_next(&mut self) -> Result<bool, SyncError> {
        let Some(subscription) = self.subscription.as_mut() else {
            return Ok(false);
        };

        match subscription.next().await {
            Some(event) => self.apply(event).map(|_| true),
            None => {
                tracing::info!("Subscription stream ended");
                self.subscription = None;
                Ok(false)
            }
        }
    }

    /// Processes events until the stream ends.
    pub async fn run(&mut self) -> Result<(), SyncError> {
        while self.process_next().await? {}
        Ok(())
    }

    /// Processes events until none arrives for `idle`.
    ///
    /// Used to load the current contents of the collection before reading
    /// from the store.
    pub async fn run_until_idle(&mut self, idle: Duration) -> Result<(), SyncError> {
        loop {
            match timeout(idle, self.process_next()).await {
                Ok(Ok(true)) => continue,
                Ok(Ok(false)) => return Ok(()),
                Ok(Err(e)) => return Err(e),
                Err(_) => {
                    tracing::debug!(items = self.store.len(), "No activity, assuming loaded");
                    return Ok(());
                }
            }
        }
    }

    /// Loads the current contents of the collection.
    ///
    /// Waits up to `first_event` for the collection to answer at all, then
    /// keeps applying events until none arrives for `idle`. A collection that
    /// never answers is treated as empty.
    pub async fn load(&mut self, first_event: Duration, idle: Duration) -> Result<(), SyncError> {
        match timeout(first_event, self.process_next()).await {
            Ok(Ok(true)) => self.run_until_idle(idle).await,
            Ok(Ok(false)) => Ok(()),
            Ok(Err(e)) => Err(e),
            Err(_) => {
                tracing::warn!("No events within {:?}, treating collection as empty", first_event);
                Ok(())
            }
        }
    }

    /// Hands the current store to the observer, as after a change.
    pub fn refresh(&mut self) {
        self.observer.store_changed(&self.store);
    }

    /// Sends a new item to the remote collection without waiting.
    ///
    /// Fields are trimmed; empty values are sent as-is. Failures are logged.
    pub fn submit(&self, name: &str, price: &str) -> JoinHandle<()> {
        let food = Food::new(name, price);
        let gateway = self.gateway.clone();
        tokio::spawn(async move {
            match gateway.create(&food).await {
                Ok(id) => tracing::debug!(%id, name = %food.name, "Submitted item"),
                Err(e) => tracing::warn!("Failed to submit '{}': {}", food.name, e),
            }
        })
    }

    /// Asks the remote collection to delete an item without waiting.
    pub fn remove(&self, id: FoodId) -> JoinHandle<()> {
        let gateway = self.gateway.clone();
        tokio::spawn(async move {
            if let Err(e) = gateway.delete(&id).await {
                tracing::warn!("Failed to delete {}: {}", id, e);
            }
        })
    }

    fn apply(&mut self, event: ChildEvent) -> Result<(), SyncError> {
        tracing::debug!(
            kind = event.kind(),
            id = ?event.food().and_then(|food| food.id.as_ref()),
            "Applying child event"
        );

        match event {
            ChildEvent::Added(food) => {
                self.store.on_item_added(food);
                self.observer.store_changed(&self.store);
            }
            ChildEvent::Changed(food) => {
                self.store.on_item_changed(food);
                self.observer.store_changed(&self.store);
            }
            ChildEvent::Removed(food) => {
                self.store.on_item_removed(&food);
                self.observer.store_changed(&self.store);
            }
            ChildEvent::Moved(food) => {
                self.store.on_item_moved(&food);
                self.observer.item_moved(&food);
            }
            ChildEvent::Cancelled(reason) => {
                tracing::warn!(%reason, "Subscription cancelled");
                self.observer.subscription_cancelled(&reason);
                self.stop();
                return Err(SyncError::SubscriptionCancelled(reason));
            }
        }
        Ok(())
    }
}
