//! Firebase Realtime Database gateway over the REST API.
//!
//! Reads use the streaming endpoint: a `GET` with
//! `Accept: text/event-stream` answered by a never-ending body of `put` and
//! `patch` events. Writes are plain `POST`/`DELETE` requests.

use reqwest::header::ACCEPT;
use serde::Deserialize;
use serde_json::Value;
use tokio::sync::mpsc;

use super::error::SyncError;
use super::event::ChildEvent;
use super::gateway::FoodGateway;
use super::sse::{SseDecoder, SseEvent};
use super::subscription::Subscription;
use super::tracker::ChildTracker;
use crate::models::{Food, FoodId};

/// Default collection path.
pub const DEFAULT_COLLECTION: &str = "food";

/// Body of a streamed `put` or `patch` event.
#[derive(Debug, Deserialize)]
struct PathData {
    path: String,
    data: Value,
}

/// Response to a `POST` on a collection.
#[derive(Debug, Deserialize)]
struct PushResponse {
    name: String,
}

/// What a decoded stream event means for the subscriber.
#[derive(Debug, PartialEq)]
enum StreamStep {
    Events(Vec<ChildEvent>),
    Cancelled(String),
}

/// A collection in a Firebase Realtime Database.
#[derive(Debug, Clone)]
pub struct FirebaseCollection {
    client: reqwest::Client,
    database_url: String,
    collection: String,
}

impl FirebaseCollection {
    /// Creates a gateway for `collection` in the database at `database_url`
    /// (e.g. `https://my-app-default-rtdb.firebaseio.com`).
    pub fn new(database_url: impl Into<String>, collection: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            database_url: database_url.into(),
            collection: collection.into(),
        }
    }

    pub fn database_url(&self) -> &str {
        &self.database_url
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Builds the base URL, adding `https://` when no scheme is given.
    fn base_url(&self) -> String {
        let base = if self.database_url.starts_with("http://")
            || self.database_url.starts_with("https://")
        {
            self.database_url.clone()
        } else {
            format!("https://{}", self.database_url)
        };
        base.trim_end_matches('/').to_string()
    }

    fn collection_url(&self) -> String {
        format!(
            "{}/{}.json",
            self.base_url(),
            self.collection.trim_matches('/')
        )
    }

    fn child_url(&self, id: &FoodId) -> String {
        format!(
            "{}/{}/{}.json",
            self.base_url(),
            self.collection.trim_matches('/'),
            urlencoding::encode(id.as_str())
        )
    }
}

impl FoodGateway for FirebaseCollection {
    async fn subscribe(&self) -> Result<Subscription, SyncError> {
        let url = self.collection_url();
        let response = self
            .client
            .get(&url)
            .header(ACCEPT, "text/event-stream")
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(SyncError::StatusError(response.status().as_u16()));
        }

        tracing::info!(%url, "Subscribed to collection");

        let (tx, rx) = Subscription::channel();
        let producer = tokio::spawn(pump_stream(response, tx));
        Ok(Subscription::new(rx, producer))
    }

    async fn create(&self, food: &Food) -> Result<FoodId, SyncError> {
        let response = self
            .client
            .post(self.collection_url())
            .json(food)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(SyncError::StatusError(response.status().as_u16()));
        }

        let pushed: PushResponse = response
            .json()
            .await
            .map_err(|e| SyncError::PayloadError(e.to_string()))?;

        tracing::debug!(id = %pushed.name, "Created record");
        Ok(FoodId::from(pushed.name))
    }

    async fn delete(&self, id: &FoodId) -> Result<(), SyncError> {
        let response = self.client.delete(self.child_url(id)).send().await?;

        if !response.status().is_success() {
            return Err(SyncError::StatusError(response.status().as_u16()));
        }

        tracing::debug!(%id, "Deleted record");
        Ok(())
    }
}

/// Reads the event stream until it ends, forwarding child events.
async fn pump_stream(mut response: reqwest::Response, tx: mpsc::Sender<ChildEvent>) {
    let mut decoder = SseDecoder::new();
    let mut tracker = ChildTracker::new();

    loop {
        let chunk = match response.chunk().await {
            Ok(Some(chunk)) => chunk,
            Ok(None) => {
                tracing::info!("Event stream closed by server");
                return;
            }
            Err(e) => {
                tracing::warn!("Event stream failed: {}", e);
                let _ = tx.send(ChildEvent::Cancelled(e.to_string())).await;
                return;
            }
        };

        for event in decoder.push(&chunk) {
            match interpret(&mut tracker, event) {
                StreamStep::Events(events) => {
                    for event in events {
                        if tx.send(event).await.is_err() {
                            return;
                        }
                    }
                }
                StreamStep::Cancelled(reason) => {
                    tracing::warn!(%reason, "Subscription cancelled by server");
                    let _ = tx.send(ChildEvent::Cancelled(reason)).await;
                    return;
                }
            }
        }
    }
}

fn interpret(tracker: &mut ChildTracker, event: SseEvent) -> StreamStep {
    match event.event.as_str() {
        "put" | "patch" => {
            let payload: PathData = match serde_json::from_str(&event.data) {
                Ok(payload) => payload,
                Err(e) => {
                    tracing::warn!(event = %event.event, "Malformed stream payload: {}", e);
                    return StreamStep::Events(Vec::new());
                }
            };
            let events = if event.event == "put" {
                tracker.put(&payload.path, payload.data)
            } else {
                tracker.patch(&payload.path, payload.data)
            };
            StreamStep::Events(events)
        }
        "keep-alive" => StreamStep::Events(Vec::new()),
        "cancel" => StreamStep::Cancelled(cancel_reason(&event.data, "cancelled")),
        "auth_revoked" => StreamStep::Cancelled(cancel_reason(&event.data, "auth revoked")),
        other => {
            tracing::debug!(event = other, "Ignoring unknown stream event");
            StreamStep::Events(Vec::new())
        }
    }
}

/// Cancel payloads are usually a JSON string, sometimes `null`.
fn cancel_reason(data: &str, fallback: &str) -> String {
    match serde_json::from_str::<Value>(data) {
        Ok(Value::String(reason)) => reason,
        Ok(Value::Null) => fallback.to_string(),
        _ if data.trim().is_empty() => fallback.to_string(),
        _ => data.to_string(),
    }
}
