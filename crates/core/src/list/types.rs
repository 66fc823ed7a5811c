//! Ticket list view state, events and effects.

use serde::Serialize;

use crate::format::{format_timestamp, format_weight, LIST_TIMESTAMP_FORMAT};
use crate::ticket::{SortOrder, Ticket, TicketError, TicketId};

/// Search text and sort direction driving the list query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Criteria {
    /// Prefix typed into the search field. Empty means no filter.
    pub query: String,
    pub sort: SortOrder,
}

/// What the list screen shows.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum ListViewState {
    /// No result yet for the current criteria.
    #[default]
    Loading,
    Success(Vec<Ticket>),
    Error(TicketError),
}

impl ListViewState {
    pub fn is_loading(&self) -> bool {
        matches!(self, ListViewState::Loading)
    }

    /// Tickets when the query succeeded.
    pub fn tickets(&self) -> Option<&[Ticket]> {
        match self {
            ListViewState::Success(tickets) => Some(tickets),
            _ => None,
        }
    }
}

/// User input on the list screen.
#[derive(Debug, Clone, PartialEq)]
pub enum ListEvent {
    SearchChanged(String),
    SortToggled,
    AddRequested,
    EditRequested(Ticket),
    DeleteRequested(Ticket),
}

/// One-shot effects emitted by the list reducer.
#[derive(Debug, Clone, PartialEq)]
pub enum ListEffect {
    /// Open the empty ticket form.
    NavigateToCreate,
    /// Open the form for an existing ticket.
    NavigateToEdit(TicketId),
    /// A delete did not go through; the list still shows the ticket.
    DeleteFailed { id: TicketId, message: String },
}

/// A ticket prepared for display in a list row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListItem {
    pub id: TicketId,
    pub driver_name: String,
    pub licence_number: String,
    pub timestamp: String,
    pub inbound_weight: String,
    pub outbound_weight: String,
    pub net_weight: String,
}

impl From<&Ticket> for ListItem {
    fn from(ticket: &Ticket) -> Self {
        Self {
            id: ticket.id,
            driver_name: ticket.driver_name.clone(),
            licence_number: ticket.licence_number.clone(),
            timestamp: format_timestamp(ticket.timestamp, LIST_TIMESTAMP_FORMAT),
            inbound_weight: format_weight(ticket.inbound_weight),
            outbound_weight: format_weight(ticket.outbound_weight),
            net_weight: format_weight(ticket.net_weight()),
        }
    }
}
