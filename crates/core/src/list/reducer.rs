//! Ticket list reducer.
//!
//! Criteria changes are funnelled through a `watch` channel into a single
//! driver task. The driver holds at most one repository subscription; any
//! newer criteria cancels the pending debounce and drops the subscription
//! before the next query is issued, so only the latest criteria's results
//! ever reach [`ListViewState`].

use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use tokio::sync::{mpsc, watch};
use tracing::{debug, warn};

use super::{Criteria, ListEffect, ListEvent, ListViewState};
use crate::config::ListConfig;
use crate::effect::{effect_channel, EffectSender, DEFAULT_EFFECT_BUFFER};
use crate::repository::TicketRepository;
use crate::scope::TaskScope;
use crate::ticket::Ticket;

/// Criteria snapshot handed to the driver, with how long to wait before querying.
#[derive(Debug, Clone)]
struct QueryRequest {
    criteria: Criteria,
    delay: Duration,
}

/// Owns the list screen's criteria and search result.
pub struct TicketListReducer {
    repository: Arc<dyn TicketRepository>,
    config: ListConfig,
    criteria: watch::Sender<Criteria>,
    requests: watch::Sender<QueryRequest>,
    search_result: watch::Receiver<ListViewState>,
    effects: EffectSender<ListEffect>,
    scope: TaskScope,
}

impl TicketListReducer {
    /// Create the reducer and start querying with default criteria.
    ///
    /// Returns the receiver for one-shot effects.
    ///
    /// # Panics
    ///
    /// Panics when called outside a tokio runtime.
    pub fn new(
        repository: Arc<dyn TicketRepository>,
        config: ListConfig,
    ) -> (Self, mpsc::Receiver<ListEffect>) {
        let (effects, effect_rx) = effect_channel(DEFAULT_EFFECT_BUFFER);

        let initial = Criteria::default();
        let (criteria, _) = watch::channel(initial.clone());
        let (requests, request_rx) = watch::channel(QueryRequest {
            criteria: initial,
            delay: Duration::ZERO,
        });
        let (state_tx, search_result) = watch::channel(ListViewState::Loading);

        let scope = TaskScope::new();
        scope.spawn(drive_queries(Arc::clone(&repository), request_rx, state_tx));

        let reducer = Self {
            repository,
            config,
            criteria,
            requests,
            search_result,
            effects,
            scope,
        };
        (reducer, effect_rx)
    }

    /// Observe the search criteria. Updated immediately on every event.
    pub fn criteria(&self) -> watch::Receiver<Criteria> {
        self.criteria.subscribe()
    }

    /// Observe the search result.
    pub fn search_result(&self) -> watch::Receiver<ListViewState> {
        self.search_result.clone()
    }

    /// Current search result.
    pub fn current_state(&self) -> ListViewState {
        self.search_result.borrow().clone()
    }

    /// Current criteria.
    pub fn current_criteria(&self) -> Criteria {
        self.criteria.borrow().clone()
    }

    /// Handle one user event. Never blocks; async work runs on the reducer's tasks.
    pub fn on_event(&self, event: ListEvent) {
        match event {
            ListEvent::SearchChanged(text) => self.search_changed(text),
            ListEvent::SortToggled => {
                self.criteria.send_modify(|c| c.sort = c.sort.toggled());
                self.issue(Duration::ZERO);
            }
            ListEvent::AddRequested => {
                self.effects.try_emit(ListEffect::NavigateToCreate);
            }
            ListEvent::EditRequested(ticket) => {
                self.effects.try_emit(ListEffect::NavigateToEdit(ticket.id));
            }
            ListEvent::DeleteRequested(ticket) => self.delete(ticket),
        }
    }

    fn search_changed(&self, text: String) {
        // Clearing restores the full list at once; typing waits for a pause.
        let delay = if text.is_empty() {
            Duration::ZERO
        } else {
            self.config.search_debounce()
        };

        let changed = self.criteria.send_if_modified(|c| {
            if c.query == text {
                return false;
            }
            c.query = text;
            true
        });

        if changed {
            self.issue(delay);
        }
    }

    fn issue(&self, delay: Duration) {
        let criteria = self.criteria.borrow().clone();
        self.requests.send_replace(QueryRequest { criteria, delay });
    }

    fn delete(&self, ticket: Ticket) {
        let repository = Arc::clone(&self.repository);
        let effects = self.effects.clone();

        self.scope.spawn(async move {
            if let Err(e) = repository.delete(&ticket).await {
                warn!("Failed to delete ticket {}: {}", ticket.id, e);
                effects
                    .emit(ListEffect::DeleteFailed {
                        id: ticket.id,
                        message: e.to_string(),
                    })
                    .await;
            }
        });
    }
}

/// Issue one repository query per criteria change, switching to the latest.
async fn drive_queries(
    repository: Arc<dyn TicketRepository>,
    mut requests: watch::Receiver<QueryRequest>,
    state: watch::Sender<ListViewState>,
) {
    loop {
        let request = requests.borrow_and_update().clone();

        if !request.delay.is_zero() {
            tokio::select! {
                biased;
                changed = requests.changed() => {
                    if changed.is_err() {
                        return;
                    }
                    continue;
                }
                _ = tokio::time::sleep(request.delay) => {}
            }
        }

        debug!(
            query = %request.criteria.query,
            sort = ?request.criteria.sort,
            "Issuing ticket query"
        );
        state.send_replace(ListViewState::Loading);
        let mut results = repository.search(&request.criteria.query, request.criteria.sort);

        loop {
            tokio::select! {
                biased;
                changed = requests.changed() => {
                    if changed.is_err() {
                        return;
                    }
                    break;
                }
                item = results.next() => match item {
                    Some(Ok(tickets)) => {
                        state.send_replace(ListViewState::Success(tickets));
                    }
                    Some(Err(e)) => {
                        warn!("Ticket query failed: {}", e);
                        state.send_replace(ListViewState::Error(e));
                    }
                    None => {
                        // Finite source; nothing more until the criteria change.
                        if requests.changed().await.is_err() {
                            return;
                        }
                        break;
                    }
                },
            }
        }
    }
}
