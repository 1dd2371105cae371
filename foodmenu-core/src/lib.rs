//! Food Menu Core Library
//!
//! Food item models, the local sync store, and gateways to the remote
//! collection the store mirrors.

pub mod models;
pub mod store;
pub mod sync;

pub use models::{Food, FoodId};
pub use store::ItemSyncStore;
pub use sync::{
    ChildEvent, FirebaseCollection, FoodGateway, MemoryCollection, StoreObserver, Subscription,
    SyncError, SyncSession,
};
