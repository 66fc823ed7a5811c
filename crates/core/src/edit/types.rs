//! Edit form state, events and effects.

use chrono::{DateTime, Utc};

use super::validation::{validate_required, ValidationError};
use crate::format::{format_timestamp, format_weight, parse_weight, FORM_TIMESTAMP_FORMAT};
use crate::ticket::{truncate_to_millis, Ticket, TicketId};

/// What the create/edit form shows.
///
/// Weights are kept as the raw text the user typed; they are parsed only
/// when computing the net weight or saving.
#[derive(Debug, Clone, PartialEq)]
pub struct EditViewState {
    /// [`TicketId::NEW`] in create mode.
    pub ticket_id: TicketId,
    pub timestamp: DateTime<Utc>,
    pub driver_name: String,
    pub licence_number: String,
    pub inbound_weight: String,
    pub outbound_weight: String,
    pub is_loading: bool,
    pub is_submitting: bool,
    /// Empty when there is nothing to report.
    pub error_message: String,
    /// Set once an existing ticket's fields have been loaded into the form.
    pub is_hydrated: bool,
}

impl EditViewState {
    /// Initial state for the given ticket. Edit mode starts out loading.
    pub fn new(ticket_id: TicketId, now: DateTime<Utc>) -> Self {
        Self {
            ticket_id,
            timestamp: truncate_to_millis(now),
            driver_name: String::new(),
            licence_number: String::new(),
            inbound_weight: String::new(),
            outbound_weight: String::new(),
            is_loading: !ticket_id.is_new(),
            is_submitting: false,
            error_message: String::new(),
            is_hydrated: false,
        }
    }

    pub fn is_edit_mode(&self) -> bool {
        !self.ticket_id.is_new()
    }

    /// True once an existing ticket is ready to be edited.
    pub fn should_edit(&self) -> bool {
        self.is_edit_mode() && self.is_hydrated
    }

    /// Whether the form accepts input.
    pub fn fields_enabled(&self) -> bool {
        !self.is_loading && !self.is_submitting
    }

    pub fn net_weight(&self) -> f64 {
        parse_weight(&self.outbound_weight) - parse_weight(&self.inbound_weight)
    }

    pub fn net_weight_text(&self) -> String {
        format_weight(self.net_weight())
    }

    pub fn timestamp_text(&self) -> String {
        format_timestamp(self.timestamp, FORM_TIMESTAMP_FORMAT)
    }

    /// Check the required fields.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_required([
            self.driver_name.as_str(),
            self.licence_number.as_str(),
            self.inbound_weight.as_str(),
            self.outbound_weight.as_str(),
        ])
    }

    /// The ticket the form currently describes.
    pub fn to_ticket(&self) -> Ticket {
        Ticket::new(
            self.timestamp,
            self.driver_name.as_str(),
            self.licence_number.as_str(),
            parse_weight(&self.inbound_weight),
            parse_weight(&self.outbound_weight),
        )
        .with_id(self.ticket_id)
    }

    pub(crate) fn hydrate(&mut self, ticket: &Ticket) {
        self.timestamp = ticket.timestamp;
        self.driver_name = ticket.driver_name.clone();
        self.licence_number = ticket.licence_number.clone();
        self.inbound_weight = ticket.inbound_weight.to_string();
        self.outbound_weight = ticket.outbound_weight.to_string();
        self.is_loading = false;
        self.is_hydrated = true;
    }
}

/// User input on the edit form.
#[derive(Debug, Clone, PartialEq)]
pub enum EditEvent {
    DriverNameChanged(String),
    LicenceNumberChanged(String),
    InboundWeightChanged(String),
    OutboundWeightChanged(String),
    DateTimeChanged(DateTime<Utc>),
    SaveRequested,
}

/// One-shot effects emitted by the edit reducer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditEffect {
    /// The ticket was persisted; close the form.
    Saved,
    /// The ticket could not be loaded; close the form.
    LoadFailed,
}
