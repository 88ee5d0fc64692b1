use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio_stream::Stream;

use crate::document::Category;
use crate::events::CategoryEvent;

use super::document::{CategoryFilter, DocumentStore};

const SNAPSHOT_BUFFER: usize = 16;

/// Live query handle.
///
/// Every message is the complete, current result set for the filter; the
/// consumer replaces its cached copy rather than merging. Dropping the
/// handle or calling [`Subscription::unsubscribe`] stops delivery.
#[derive(Debug)]
pub struct Subscription {
    filter: CategoryFilter,
    receiver: mpsc::Receiver<Vec<Category>>,
    cancel: Option<oneshot::Sender<()>>,
}

impl Subscription {
    /// Start watching `events` for changes that touch `filter`, re-listing
    /// from `store` each time. `events` must be subscribed before the call so
    /// no write between the initial listing and the first event is missed.
    pub fn spawn(
        store: Arc<dyn DocumentStore>,
        events: broadcast::Receiver<CategoryEvent>,
        filter: CategoryFilter,
    ) -> Self {
        let (tx, receiver) = mpsc::channel(SNAPSHOT_BUFFER);
        let (cancel, cancelled) = oneshot::channel();
        tokio::spawn(watch(store, events, filter.clone(), tx, cancelled));
        Self {
            filter,
            receiver,
            cancel: Some(cancel),
        }
    }

    pub fn filter(&self) -> &CategoryFilter {
        &self.filter
    }

    pub fn is_active(&self) -> bool {
        self.cancel.is_some()
    }

    /// Wait for the next snapshot. `None` once unsubscribed.
    pub async fn next(&mut self) -> Option<Vec<Category>> {
        if !self.is_active() {
            return None;
        }
        self.receiver.recv().await
    }

    /// Take a snapshot that has already arrived, without waiting.
    pub fn try_next(&mut self) -> Option<Vec<Category>> {
        if !self.is_active() {
            return None;
        }
        self.receiver.try_recv().ok()
    }

    /// Stop the subscription. Safe to call more than once.
    pub fn unsubscribe(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            let _ = cancel.send(());
            self.receiver.close();
            tracing::debug!(
                root = %self.filter.root_category,
                sub = %self.filter.sub_category,
                "subscription closed"
            );
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

impl Stream for Subscription {
    type Item = Vec<Category>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        if !self.is_active() {
            return Poll::Ready(None);
        }
        self.receiver.poll_recv(cx)
    }
}

async fn watch(
    store: Arc<dyn DocumentStore>,
    mut events: broadcast::Receiver<CategoryEvent>,
    filter: CategoryFilter,
    tx: mpsc::Sender<Vec<Category>>,
    mut cancelled: oneshot::Receiver<()>,
) {
    if !push_snapshot(store.as_ref(), &filter, &tx).await {
        return;
    }
    loop {
        tokio::select! {
            _ = &mut cancelled => break,
            received = events.recv() => match received {
                Ok(event) if event.touches(&filter) => {
                    if !push_snapshot(store.as_ref(), &filter, &tx).await {
                        break;
                    }
                }
                Ok(_) => {}
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "subscription lagged, resynchronising");
                    if !push_snapshot(store.as_ref(), &filter, &tx).await {
                        break;
                    }
                }
                Err(RecvError::Closed) => break,
            },
        }
    }
}

/// Returns `false` once the consumer is gone.
async fn push_snapshot(
    store: &dyn DocumentStore,
    filter: &CategoryFilter,
    tx: &mpsc::Sender<Vec<Category>>,
) -> bool {
    match store.list(filter).await {
        Ok(snapshot) => tx.send(snapshot).await.is_ok(),
        Err(err) => {
            tracing::error!(error = %err, "error in live category listener");
            !tx.is_closed()
        }
    }
}
