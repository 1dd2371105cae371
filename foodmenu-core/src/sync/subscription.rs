//! Scoped handle on a live stream of child events.

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::event::ChildEvent;

/// Buffer between a gateway's producer task and the consuming session.
pub const EVENT_BUFFER: usize = 64;

/// A held subscription to the remote collection.
///
/// Events are produced by a background task owned by the subscription.
/// Dropping or closing the subscription stops that task.
#[derive(Debug)]
pub struct Subscription {
    events: mpsc::Receiver<ChildEvent>,
    producer: Option<JoinHandle<()>>,
}

impl Subscription {
    /// Wraps the receiving end of an event channel and the task feeding it.
    pub fn new(events: mpsc::Receiver<ChildEvent>, producer: JoinHandle<()>) -> Self {
        Self {
            events,
            producer: Some(producer),
        }
    }

    /// Creates the event channel a producer task should send into.
    pub fn channel() -> (mpsc::Sender<ChildEvent>, mpsc::Receiver<ChildEvent>) {
        mpsc::channel(EVENT_BUFFER)
    }

    /// Waits for the next event. Returns `None` once the stream has ended.
    pub async fn next(&mut self) -> Option<ChildEvent> {
        self.events.recv().await
    }

    /// Whether the producer is still running.
    #[cfg(test)]
    fn is_active(&self) -> bool {
        self.producer
            .as_ref()
            .map(|task| !task.is_finished())
            .unwrap_or(false)
    }

    /// Releases the subscription.
    pub fn close(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if let Some(task) = self.producer.take() {
            task.abort();
            tracing::debug!("Subscription released");
        }
        self.events.close();
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release();
    }
}
