//! Live queries: re-run a store query every time the store changes.

use std::sync::Arc;

use futures::stream::{self, BoxStream, StreamExt};
use tokio::sync::watch;

use crate::ticket::{TicketError, TicketStore};

/// Build a stream that evaluates `query` once immediately and again after
/// every write to `store`, for as long as the stream is polled.
///
/// Each evaluation runs on the blocking pool. Writes that land while an
/// evaluation is in flight are coalesced into a single re-run. Dropping the
/// stream ends the subscription.
pub fn live_query<T, F>(
    store: Arc<dyn TicketStore>,
    query: F,
) -> BoxStream<'static, Result<T, TicketError>>
where
    T: Send + 'static,
    F: Fn(&dyn TicketStore) -> Result<T, TicketError> + Send + Sync + 'static,
{
    let changes = store.subscribe();
    let state = LiveQuery {
        store,
        changes,
        query: Arc::new(query),
        started: false,
    };

    stream::unfold(state, |mut state| async move {
        if state.started {
            // The store owns the sender and we hold the store, so this only
            // fails if the store itself is being torn down.
            state.changes.changed().await.ok()?;
        }
        state.started = true;
        state.changes.borrow_and_update();

        let result = state.evaluate().await;
        Some((result, state))
    })
    .boxed()
}

struct LiveQuery<F> {
    store: Arc<dyn TicketStore>,
    changes: watch::Receiver<u64>,
    query: Arc<F>,
    started: bool,
}

impl<F> LiveQuery<F> {
    async fn evaluate<T>(&self) -> Result<T, TicketError>
    where
        T: Send + 'static,
        F: Fn(&dyn TicketStore) -> Result<T, TicketError> + Send + Sync + 'static,
    {
        let store = Arc::clone(&self.store);
        let query = Arc::clone(&self.query);

        tokio::task::spawn_blocking(move || query(store.as_ref()))
            .await
            .unwrap_or_else(|e| Err(TicketError::Database(format!("query task failed: {}", e))))
    }
}
