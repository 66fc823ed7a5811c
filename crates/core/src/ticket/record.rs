//! Persisted row shape of a ticket and its translation to the domain type.

use chrono::{DateTime, Utc};

use super::{Ticket, TicketId};

/// A ticket exactly as it is stored in the `weighbridge` table.
#[derive(Debug, Clone, PartialEq)]
pub struct TicketRecord {
    /// Row id; 0 for a row that has not been inserted.
    pub uid: i64,
    /// Epoch milliseconds.
    pub datetime: i64,
    pub licence_number: String,
    pub driver_name: String,
    pub inbound_weight: f64,
    pub outbound_weight: f64,
}

impl From<&Ticket> for TicketRecord {
    fn from(ticket: &Ticket) -> Self {
        Self {
            uid: ticket.id.value(),
            datetime: ticket.timestamp.timestamp_millis(),
            licence_number: ticket.licence_number.clone(),
            driver_name: ticket.driver_name.clone(),
            inbound_weight: ticket.inbound_weight,
            outbound_weight: ticket.outbound_weight,
        }
    }
}

impl From<TicketRecord> for Ticket {
    fn from(record: TicketRecord) -> Self {
        // Out-of-range values can only come from foreign writers; clamp to the epoch.
        let timestamp = DateTime::<Utc>::from_timestamp_millis(record.datetime).unwrap_or_default();

        Ticket {
            id: TicketId(record.uid),
            timestamp,
            driver_name: record.driver_name,
            licence_number: record.licence_number,
            inbound_weight: record.inbound_weight,
            outbound_weight: record.outbound_weight,
        }
    }
}
