//! Subcommands, each driving the same reducers an interactive front end would.

use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};
use chrono::{DateTime, Utc};
use clap::Args;
use futures::StreamExt;
use tracing::{debug, info};

use weighbridge_core::list::ListItem;
use weighbridge_core::navigation::{LifecycleEvent, NavigationError};
use weighbridge_core::{
    weighbridge_sheets, Config, EditEffect, EditEvent, ListConfig, ListEffect, ListEvent,
    ListViewState, Route, SheetNavigator, Ticket, TicketEditReducer, TicketId, TicketListReducer,
    TicketRepository,
};

/// Ticket form fields as typed on the command line.
#[derive(Debug, Clone, Default, Args)]
pub struct TicketFields {
    /// Driver name.
    #[arg(long)]
    pub driver: Option<String>,

    /// Vehicle licence number.
    #[arg(long)]
    pub licence: Option<String>,

    /// Inbound (loaded) weight.
    #[arg(long)]
    pub inbound: Option<String>,

    /// Outbound weight.
    #[arg(long)]
    pub outbound: Option<String>,

    /// Weighing time (RFC 3339). Defaults to now for new tickets.
    #[arg(long)]
    pub at: Option<DateTime<Utc>>,
}

impl TicketFields {
    fn events(self) -> Vec<EditEvent> {
        let mut events = Vec::new();
        if let Some(v) = self.driver {
            events.push(EditEvent::DriverNameChanged(v));
        }
        if let Some(v) = self.licence {
            events.push(EditEvent::LicenceNumberChanged(v));
        }
        if let Some(v) = self.inbound {
            events.push(EditEvent::InboundWeightChanged(v));
        }
        if let Some(v) = self.outbound {
            events.push(EditEvent::OutboundWeightChanged(v));
        }
        if let Some(at) = self.at {
            events.push(EditEvent::DateTimeChanged(at));
        }
        events
    }
}

/// Create a ticket, or edit ticket `id`, through the form sheet.
pub async fn save(
    repository: Arc<dyn TicketRepository>,
    config: &Config,
    id: Option<i64>,
    fields: TicketFields,
) -> Result<()> {
    let route = match id {
        Some(id) => Route::Edit(TicketId(id)),
        None => Route::Create,
    };

    let mut sheets = weighbridge_sheets();
    let entry = sheets.navigate(&route.path())?;
    sheets.on_lifecycle(entry, LifecycleEvent::Started)?;
    let ticket_id = route
        .ticket_id()
        .ok_or_else(|| NavigationError::UnknownRoute(route.path()))?;

    let (reducer, mut effects) = TicketEditReducer::new(repository, config.edit.clone(), ticket_id);
    let mut state = reducer.state();

    if !ticket_id.is_new() {
        let loaded = state
            .wait_for(|s| s.is_hydrated || !s.error_message.is_empty())
            .await?
            .clone();
        if !loaded.is_hydrated {
            dismiss(&mut sheets);
            bail!(loaded.error_message);
        }
    }

    for event in fields.events() {
        reducer.on_event(event);
    }
    reducer.on_event(EditEvent::SaveRequested);

    let submitted = reducer.current_state();
    if !submitted.is_submitting {
        dismiss(&mut sheets);
        bail!(submitted.error_message);
    }

    tokio::select! {
        effect = effects.recv() => match effect {
            Some(EditEffect::Saved) => {}
            other => bail!("Unexpected form result: {:?}", other),
        },
        failed = state.wait_for(|s| !s.is_submitting) => {
            let message = failed?.error_message.clone();
            dismiss(&mut sheets);
            bail!(message);
        }
    }

    close(&mut sheets)?;

    let saved = reducer.current_state().to_ticket();
    info!("Saved ticket for {}", saved.driver_name);
    println!(
        "Saved {} ({}) net weight {}",
        saved.driver_name,
        saved.licence_number,
        reducer.current_state().net_weight_text()
    );
    Ok(())
}

/// Print the tickets matching `query`.
pub async fn list(
    repository: Arc<dyn TicketRepository>,
    config: &Config,
    query: Option<String>,
    desc: bool,
    json: bool,
) -> Result<()> {
    let (reducer, _effects) = one_shot_list(repository, config);

    if let Some(query) = query {
        reducer.on_event(ListEvent::SearchChanged(query));
    }
    if desc {
        reducer.on_event(ListEvent::SortToggled);
    }

    let tickets = settled_tickets(&reducer).await?;
    let items: Vec<ListItem> = tickets.iter().map(ListItem::from).collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&items)?);
    } else if items.is_empty() {
        println!("No tickets");
    } else {
        for item in &items {
            print_row(item);
        }
    }
    Ok(())
}

/// Print one ticket.
pub async fn show(repository: Arc<dyn TicketRepository>, id: i64, json: bool) -> Result<()> {
    let ticket = fetch(repository.as_ref(), TicketId(id)).await?;
    let item = ListItem::from(&ticket);

    if json {
        println!("{}", serde_json::to_string_pretty(&item)?);
    } else {
        print_row(&item);
    }
    Ok(())
}

/// Delete ticket `id` and wait until the list no longer shows it.
pub async fn delete(
    repository: Arc<dyn TicketRepository>,
    config: &Config,
    id: i64,
) -> Result<()> {
    let ticket = fetch(repository.as_ref(), TicketId(id)).await?;
    let (reducer, mut effects) = one_shot_list(repository, config);
    settled_tickets(&reducer).await?;

    let mut results = reducer.search_result();
    results.borrow_and_update();
    reducer.on_event(ListEvent::DeleteRequested(ticket));

    loop {
        tokio::select! {
            effect = effects.recv() => match effect {
                Some(ListEffect::DeleteFailed { message, .. }) => bail!(message),
                Some(other) => debug!("Ignoring list effect {:?}", other),
                None => bail!("List closed before the delete finished"),
            },
            changed = results.changed() => {
                changed.context("List closed before the delete finished")?;
                let gone = results
                    .borrow_and_update()
                    .tickets()
                    .is_some_and(|tickets| tickets.iter().all(|t| t.id != TicketId(id)));
                if gone {
                    break;
                }
            }
        }
    }

    println!("Deleted ticket {}", id);
    Ok(())
}

/// A list reducer for a single query: typed text is applied without waiting.
fn one_shot_list(
    repository: Arc<dyn TicketRepository>,
    config: &Config,
) -> (TicketListReducer, tokio::sync::mpsc::Receiver<ListEffect>) {
    let mut list_config: ListConfig = config.list.clone();
    list_config.search_debounce_ms = 0;
    TicketListReducer::new(repository, list_config)
}

async fn settled_tickets(reducer: &TicketListReducer) -> Result<Vec<Ticket>> {
    let mut results = reducer.search_result();
    let state = results.wait_for(|s| !s.is_loading()).await?.clone();
    match state {
        ListViewState::Success(tickets) => Ok(tickets),
        ListViewState::Error(e) => Err(e.into()),
        ListViewState::Loading => Err(anyhow!("Query did not complete")),
    }
}

async fn fetch(repository: &dyn TicketRepository, id: TicketId) -> Result<Ticket> {
    let ticket = repository
        .get(id)
        .next()
        .await
        .ok_or_else(|| anyhow!("Ticket {} is not available", id))??;
    Ok(ticket)
}

fn close(sheets: &mut SheetNavigator) -> Result<()> {
    let hide = sheets.pop_back_stack()?;
    // No animation to wait for on a terminal
    sheets.on_hide_finished(hide.entry)?;
    Ok(())
}

fn dismiss(sheets: &mut SheetNavigator) {
    if let Some(id) = sheets.top().map(|entry| entry.id) {
        if let Err(e) = sheets.dismiss(id) {
            debug!("Sheet already gone: {}", e);
        }
    }
}

fn print_row(item: &ListItem) {
    println!(
        "{:>5}  {}  {:<20}  {:<12}  in {:>10}  out {:>10}  net {:>10}",
        item.id,
        item.timestamp,
        item.driver_name,
        item.licence_number,
        item.inbound_weight,
        item.outbound_weight,
        item.net_weight
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use weighbridge_core::testing::{fixtures, MockTicketRepository};

    #[test]
    fn test_fields_to_events_skip_missing() {
        let fields = TicketFields {
            driver: Some("Budi".to_string()),
            outbound: Some("150".to_string()),
            ..Default::default()
        };

        assert_eq!(
            fields.events(),
            vec![
                EditEvent::DriverNameChanged("Budi".to_string()),
                EditEvent::OutboundWeightChanged("150".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_save_creates_ticket() {
        let repository = Arc::new(MockTicketRepository::new());
        let fields = TicketFields {
            driver: Some("Test".to_string()),
            licence: Some("B1".to_string()),
            inbound: Some("100".to_string()),
            outbound: Some("150".to_string()),
            at: Some(fixtures::timestamp()),
        };

        save(repository.clone(), &Config::default(), None, fields)
            .await
            .unwrap();

        let added = repository.added();
        assert_eq!(added.len(), 1);
        assert_eq!(added[0].timestamp, fixtures::timestamp());
    }

    #[tokio::test]
    async fn test_save_reports_validation_error() {
        let repository = Arc::new(MockTicketRepository::new());
        let fields = TicketFields {
            driver: Some("Test".to_string()),
            ..Default::default()
        };

        let err = save(repository.clone(), &Config::default(), None, fields)
            .await
            .unwrap_err();

        assert_eq!(
            err.to_string(),
            "Licence Number, Inbound Weight, Outbound Weight is required"
        );
        assert!(repository.added().is_empty());
    }

    #[tokio::test]
    async fn test_edit_missing_ticket_fails() {
        let repository = Arc::new(MockTicketRepository::new());

        let err = save(repository, &Config::default(), Some(9), TicketFields::default())
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "Ticket not found: 9");
    }

    #[tokio::test]
    async fn test_show_missing_ticket_fails() {
        let repository = Arc::new(MockTicketRepository::with_tickets(fixtures::tickets(1)));
        assert!(show(repository, 2, false).await.is_err());
    }
}
