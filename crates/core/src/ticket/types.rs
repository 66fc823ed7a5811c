//! Core ticket data types.

use std::fmt;

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

/// Identifier of a weighbridge ticket.
///
/// [`TicketId::NEW`] marks a ticket that has never been persisted; the store
/// assigns a real identifier on first insert.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TicketId(pub i64);

impl TicketId {
    /// Identifier of a ticket that has not been inserted yet.
    pub const NEW: TicketId = TicketId(0);

    /// Whether this ticket has never been persisted.
    pub fn is_new(self) -> bool {
        self == Self::NEW
    }

    pub fn value(self) -> i64 {
        self.0
    }
}

impl fmt::Display for TicketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for TicketId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

/// One weighbridge record: a vehicle weighed on the way in and on the way out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ticket {
    pub id: TicketId,
    /// When the weighing happened, in whole milliseconds like the stored row.
    pub timestamp: DateTime<Utc>,
    pub driver_name: String,
    pub licence_number: String,
    pub inbound_weight: f64,
    pub outbound_weight: f64,
}

impl Ticket {
    /// Create a ticket that has not been persisted yet.
    ///
    /// The timestamp is truncated to milliseconds, the precision the store keeps.
    pub fn new(
        timestamp: DateTime<Utc>,
        driver_name: impl Into<String>,
        licence_number: impl Into<String>,
        inbound_weight: f64,
        outbound_weight: f64,
    ) -> Self {
        Self {
            id: TicketId::NEW,
            timestamp: truncate_to_millis(timestamp),
            driver_name: driver_name.into(),
            licence_number: licence_number.into(),
            inbound_weight,
            outbound_weight,
        }
    }

    /// Outbound minus inbound weight. Negative values are allowed.
    pub fn net_weight(&self) -> f64 {
        self.outbound_weight - self.inbound_weight
    }

    /// Same ticket with the given identifier.
    pub fn with_id(self, id: TicketId) -> Self {
        Self { id, ..self }
    }
}

/// Drop sub-millisecond precision from a ticket timestamp.
pub fn truncate_to_millis(timestamp: DateTime<Utc>) -> DateTime<Utc> {
    timestamp.trunc_subsecs(3)
}

/// Ordering of ticket lists by identifier (insertion order).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

impl SortOrder {
    /// The other direction.
    pub fn toggled(self) -> Self {
        match self {
            SortOrder::Ascending => SortOrder::Descending,
            SortOrder::Descending => SortOrder::Ascending,
        }
    }

    pub(crate) fn as_sql(self) -> &'static str {
        match self {
            SortOrder::Ascending => "ASC",
            SortOrder::Descending => "DESC",
        }
    }
}
