use std::future::Future;

use super::error::SyncError;
use super::subscription::Subscription;
use crate::models::{Food, FoodId};

/// Access to a remote, authoritative collection of food records.
///
/// Writes are not reflected locally by the caller; their effect becomes
/// visible only through the events of a [`Subscription`].
pub trait FoodGateway {
    /// Opens a subscription delivering child events for the collection.
    fn subscribe(&self) -> impl Future<Output = Result<Subscription, SyncError>> + Send;

    /// Stores a new record and returns the key assigned to it.
    fn create(&self, food: &Food) -> impl Future<Output = Result<FoodId, SyncError>> + Send;

    /// Removes the record with the given key.
    fn delete(&self, id: &FoodId) -> impl Future<Output = Result<(), SyncError>> + Send;
}
