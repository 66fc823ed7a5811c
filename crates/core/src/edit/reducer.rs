use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

use super::{EditEffect, EditEvent, EditViewState};
use crate::config::EditConfig;
use crate::effect::{effect_channel, EffectSender, DEFAULT_EFFECT_BUFFER};
use crate::repository::{first, TicketRepository};
use crate::scope::TaskScope;
use crate::ticket::{truncate_to_millis, Ticket, TicketId};

/// Drives the create/edit form for one ticket.
///
/// In edit mode the ticket is loaded once on construction; the form does not
/// follow later changes to the stored row.
pub struct TicketEditReducer {
    repository: Arc<dyn TicketRepository>,
    state: Arc<watch::Sender<EditViewState>>,
    effects: EffectSender<EditEffect>,
    scope: TaskScope,
}

impl TicketEditReducer {
    /// Create the reducer for `ticket_id`, or for a new ticket when it is
    /// [`TicketId::NEW`].
    ///
    /// # Panics
    ///
    /// Panics when called outside a tokio runtime.
    pub fn new(
        repository: Arc<dyn TicketRepository>,
        config: EditConfig,
        ticket_id: TicketId,
    ) -> (Self, mpsc::Receiver<EditEffect>) {
        let (effects, effect_rx) = effect_channel(DEFAULT_EFFECT_BUFFER);
        let (state, _) = watch::channel(EditViewState::new(ticket_id, Utc::now()));
        let state = Arc::new(state);
        let scope = TaskScope::new();

        if !ticket_id.is_new() {
            scope.spawn(load_ticket(
                Arc::clone(&repository),
                ticket_id,
                Arc::clone(&state),
                effects.clone(),
                config.load_error_close_delay(),
            ));
        }

        let reducer = Self {
            repository,
            state,
            effects,
            scope,
        };
        (reducer, effect_rx)
    }

    /// Observe the form state.
    pub fn state(&self) -> watch::Receiver<EditViewState> {
        self.state.subscribe()
    }

    /// Current form state.
    pub fn current_state(&self) -> EditViewState {
        self.state.borrow().clone()
    }

    pub fn on_event(&self, event: EditEvent) {
        match event {
            EditEvent::DriverNameChanged(value) => {
                self.state.send_modify(|s| s.driver_name = value);
            }
            EditEvent::LicenceNumberChanged(value) => {
                self.state.send_modify(|s| s.licence_number = value);
            }
            EditEvent::InboundWeightChanged(value) => {
                self.state.send_modify(|s| s.inbound_weight = value);
            }
            EditEvent::OutboundWeightChanged(value) => {
                self.state.send_modify(|s| s.outbound_weight = value);
            }
            EditEvent::DateTimeChanged(timestamp) => {
                self.state
                    .send_modify(|s| s.timestamp = truncate_to_millis(timestamp));
            }
            EditEvent::SaveRequested => self.save(),
        }
    }

    fn save(&self) {
        {
            let state = self.state.borrow();
            if state.is_submitting {
                debug!("Save already in flight, ignoring");
                return;
            }
            if state.is_edit_mode() && !state.is_hydrated {
                debug!("Ticket {} not loaded yet, ignoring save", state.ticket_id);
                return;
            }
        }

        let mut ticket = None;
        self.state.send_modify(|s| {
            s.is_submitting = true;
            match s.validate() {
                Ok(()) => ticket = Some(s.to_ticket()),
                Err(e) => {
                    s.is_submitting = false;
                    s.error_message = e.to_string();
                }
            }
        });

        if let Some(ticket) = ticket {
            self.scope.spawn(persist_ticket(
                Arc::clone(&self.repository),
                ticket,
                Arc::clone(&self.state),
                self.effects.clone(),
            ));
        }
    }
}

async fn load_ticket(
    repository: Arc<dyn TicketRepository>,
    id: TicketId,
    state: Arc<watch::Sender<EditViewState>>,
    effects: EffectSender<EditEffect>,
    close_delay: Duration,
) {
    match first(repository.get(id)).await {
        Ok(ticket) => state.send_modify(|s| s.hydrate(&ticket)),
        Err(e) => {
            warn!("Failed to load ticket {}: {}", id, e);
            state.send_modify(|s| {
                s.is_loading = true;
                s.error_message = e.to_string();
            });
            tokio::time::sleep(close_delay).await;
            effects.emit(EditEffect::LoadFailed).await;
        }
    }
}

async fn persist_ticket(
    repository: Arc<dyn TicketRepository>,
    ticket: Ticket,
    state: Arc<watch::Sender<EditViewState>>,
    effects: EffectSender<EditEffect>,
) {
    let result = if ticket.id.is_new() {
        repository.add(&ticket).await.map(|id| {
            info!("Added ticket {}", id);
        })
    } else {
        repository.update(&ticket).await.map(|()| {
            info!("Updated ticket {}", ticket.id);
        })
    };

    match result {
        Ok(()) => {
            state.send_modify(|s| s.error_message.clear());
            effects.emit(EditEffect::Saved).await;
        }
        Err(e) => {
            warn!("Failed to save ticket: {}", e);
            state.send_modify(|s| {
                s.is_submitting = false;
                s.error_message = e.to_string();
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{fixtures, MockTicketRepository};
    use crate::ticket::TicketError;

    fn create_reducer(
        repository: &Arc<MockTicketRepository>,
        ticket_id: TicketId,
    ) -> (TicketEditReducer, mpsc::Receiver<EditEffect>) {
        TicketEditReducer::new(repository.clone(), EditConfig::default(), ticket_id)
    }

    fn fill(
        reducer: &TicketEditReducer,
        driver: &str,
        licence: &str,
        inbound: &str,
        outbound: &str,
    ) {
        reducer.on_event(EditEvent::DriverNameChanged(driver.to_string()));
        reducer.on_event(EditEvent::LicenceNumberChanged(licence.to_string()));
        reducer.on_event(EditEvent::InboundWeightChanged(inbound.to_string()));
        reducer.on_event(EditEvent::OutboundWeightChanged(outbound.to_string()));
    }

    fn stored_ticket() -> Ticket {
        Ticket::new(fixtures::timestamp(), "Budi", "B 1", 100.0, 150.0).with_id(TicketId(1))
    }

    #[tokio::test]
    async fn test_blank_form_is_rejected() {
        let repository = Arc::new(MockTicketRepository::new());
        let (reducer, mut effects) = create_reducer(&repository, TicketId::NEW);

        reducer.on_event(EditEvent::SaveRequested);

        let state = reducer.current_state();
        assert_eq!(
            state.error_message,
            "Driver Name, Licence Number, Inbound Weight, Outbound Weight is required"
        );
        assert!(!state.is_submitting);
        assert!(repository.added().is_empty());
        assert!(effects.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_create_saves_new_ticket() {
        let repository = Arc::new(MockTicketRepository::new());
        let (reducer, mut effects) = create_reducer(&repository, TicketId::NEW);

        fill(&reducer, "Test", "B1", "100", "150");
        reducer.on_event(EditEvent::SaveRequested);

        assert_eq!(effects.recv().await, Some(EditEffect::Saved));

        let added = repository.added();
        assert_eq!(added.len(), 1);
        assert_eq!(added[0].id, TicketId::NEW);
        assert_eq!(added[0].driver_name, "Test");
        assert_eq!(added[0].inbound_weight, 100.0);
        assert_eq!(added[0].outbound_weight, 150.0);
        assert!(repository.updated().is_empty());

        let state = reducer.current_state();
        assert_eq!(state.net_weight_text(), "50");
        assert_eq!(state.error_message, "");
    }

    #[tokio::test]
    async fn test_field_events_replace_single_field() {
        let repository = Arc::new(MockTicketRepository::new());
        let (reducer, _effects) = create_reducer(&repository, TicketId::NEW);

        reducer.on_event(EditEvent::DriverNameChanged("Budi".to_string()));
        reducer.on_event(EditEvent::DateTimeChanged(fixtures::timestamp()));

        let state = reducer.current_state();
        assert_eq!(state.driver_name, "Budi");
        assert_eq!(state.licence_number, "");
        assert_eq!(state.timestamp, fixtures::timestamp());
    }

    #[tokio::test]
    async fn test_picked_timestamp_is_truncated_to_millis() {
        let repository = Arc::new(MockTicketRepository::new());
        let (reducer, mut effects) = create_reducer(&repository, TicketId::NEW);
        let picked = fixtures::timestamp() + chrono::Duration::nanoseconds(42_123_456);

        reducer.on_event(EditEvent::DateTimeChanged(picked));
        assert_eq!(
            reducer.current_state().timestamp.timestamp_subsec_nanos(),
            42_000_000
        );

        fill(&reducer, "Test", "B1", "100", "150");
        reducer.on_event(EditEvent::SaveRequested);
        assert_eq!(effects.recv().await, Some(EditEffect::Saved));

        assert_eq!(
            repository.added()[0].timestamp.timestamp_millis(),
            fixtures::timestamp().timestamp_millis() + 42
        );
    }

    #[tokio::test]
    async fn test_non_finite_weights_save_as_zero() {
        let repository = Arc::new(MockTicketRepository::new());
        let (reducer, mut effects) = create_reducer(&repository, TicketId::NEW);

        fill(&reducer, "Test", "B1", "NaN", "inf");
        assert_eq!(reducer.current_state().net_weight_text(), "0");

        reducer.on_event(EditEvent::SaveRequested);
        assert_eq!(effects.recv().await, Some(EditEffect::Saved));

        let added = repository.added();
        assert_eq!(added[0].inbound_weight, 0.0);
        assert_eq!(added[0].outbound_weight, 0.0);
    }

    #[tokio::test]
    async fn test_save_ignored_while_submitting() {
        let repository = Arc::new(MockTicketRepository::new());
        let (reducer, mut effects) = create_reducer(&repository, TicketId::NEW);

        fill(&reducer, "Test", "B1", "100", "150");
        reducer.on_event(EditEvent::SaveRequested);
        reducer.on_event(EditEvent::SaveRequested);

        assert_eq!(effects.recv().await, Some(EditEffect::Saved));
        tokio::task::yield_now().await;

        assert_eq!(repository.added().len(), 1);
        assert!(effects.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_save_failure_shows_store_error() {
        let repository = Arc::new(MockTicketRepository::new());
        repository.fail_writes(TicketError::Database("disk full".to_string()));
        let (reducer, mut effects) = create_reducer(&repository, TicketId::NEW);

        fill(&reducer, "Test", "B1", "100", "150");
        reducer.on_event(EditEvent::SaveRequested);

        let mut rx = reducer.state();
        let state = rx
            .wait_for(|s| !s.is_submitting)
            .await
            .unwrap()
            .clone();

        assert_eq!(state.error_message, "Database error: disk full");
        assert!(effects.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_edit_mode_hydrates_fields() {
        let repository = Arc::new(MockTicketRepository::with_tickets(vec![stored_ticket()]));
        let (reducer, _effects) = create_reducer(&repository, TicketId(1));

        let mut rx = reducer.state();
        let state = rx.wait_for(|s| s.is_hydrated).await.unwrap().clone();

        assert_eq!(state.ticket_id, TicketId(1));
        assert_eq!(state.driver_name, "Budi");
        assert_eq!(state.licence_number, "B 1");
        assert_eq!(state.inbound_weight, "100");
        assert_eq!(state.outbound_weight, "150");
        assert!(!state.is_loading);
        assert!(state.should_edit());
        assert_eq!(repository.recorded_gets(), vec![TicketId(1)]);
    }

    #[tokio::test]
    async fn test_edit_mode_saves_through_update() {
        let repository = Arc::new(MockTicketRepository::with_tickets(vec![stored_ticket()]));
        let (reducer, mut effects) = create_reducer(&repository, TicketId(1));

        let mut rx = reducer.state();
        rx.wait_for(|s| s.is_hydrated).await.unwrap();

        reducer.on_event(EditEvent::OutboundWeightChanged("175".to_string()));
        reducer.on_event(EditEvent::SaveRequested);

        assert_eq!(effects.recv().await, Some(EditEffect::Saved));
        assert!(repository.added().is_empty());
        assert_eq!(repository.updated().len(), 1);
        assert_eq!(repository.tickets()[0].outbound_weight, 175.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_load_failure_closes_after_delay() {
        let repository = Arc::new(MockTicketRepository::new());
        let (reducer, mut effects) = create_reducer(&repository, TicketId(1));

        let mut rx = reducer.state();
        let state = rx
            .wait_for(|s| !s.error_message.is_empty())
            .await
            .unwrap()
            .clone();

        assert!(state.is_loading);
        assert_eq!(state.error_message, "Ticket not found: 1");
        assert!(!state.is_hydrated);

        tokio::time::sleep(Duration::from_millis(900)).await;
        assert!(effects.try_recv().is_err());

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(effects.try_recv(), Ok(EditEffect::LoadFailed));

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert!(effects.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_store_error_on_load_closes_form() {
        let repository = Arc::new(MockTicketRepository::with_tickets(vec![stored_ticket()]));
        repository.fail_get(TicketError::Database("disk I/O error".to_string()));
        let (reducer, mut effects) = create_reducer(&repository, TicketId(1));

        let mut rx = reducer.state();
        let state = rx
            .wait_for(|s| !s.error_message.is_empty())
            .await
            .unwrap()
            .clone();

        assert!(state.is_loading);
        assert!(!state.is_hydrated);
        assert_eq!(state.error_message, "Database error: disk I/O error");
        assert_eq!(repository.recorded_gets(), vec![TicketId(1)]);

        tokio::time::sleep(Duration::from_millis(1100)).await;
        assert_eq!(effects.try_recv(), Ok(EditEffect::LoadFailed));
    }

    #[tokio::test]
    async fn test_save_before_load_is_ignored() {
        let repository = Arc::new(MockTicketRepository::with_tickets(vec![stored_ticket()]));
        let (reducer, _effects) = create_reducer(&repository, TicketId(1));

        reducer.on_event(EditEvent::SaveRequested);

        let state = reducer.current_state();
        assert!(!state.is_submitting);
        assert_eq!(state.error_message, "");
        assert!(repository.updated().is_empty());
    }
}
