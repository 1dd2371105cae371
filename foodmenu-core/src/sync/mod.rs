//! Synchronization with the remote food collection.
//!
//! A [`FoodGateway`] gives access to the authoritative collection: it hands
//! out [`Subscription`]s streaming [`ChildEvent`]s and accepts create/delete
//! commands. A [`SyncSession`] consumes one subscription and keeps an
//! [`ItemSyncStore`](crate::store::ItemSyncStore) in step with it.
//!
//! ## Gateways
//!
//! - [`MemoryCollection`]: in-process collection
//! - [`FirebaseCollection`]: Firebase Realtime Database REST streaming API

mod error;
mod event;
mod firebase;
mod gateway;
mod memory;
mod session;
mod sse;
mod subscription;
mod tracker;

pub use error::SyncError;
pub use event::ChildEvent;
pub use firebase::{FirebaseCollection, DEFAULT_COLLECTION};
pub use gateway::FoodGateway;
pub use memory::MemoryCollection;
pub use session::{StoreObserver, SyncSession};
pub use subscription::Subscription;
