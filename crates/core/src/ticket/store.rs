//! Ticket storage trait and types.

use thiserror::Error;
use tokio::sync::watch;

use super::{SortOrder, TicketId, TicketRecord};

/// Error type for ticket operations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum TicketError {
    /// No row with this identifier.
    #[error("Ticket not found: {0}")]
    NotFound(TicketId),
    /// The underlying storage failed.
    #[error("Database error: {0}")]
    Database(String),
}

impl From<rusqlite::Error> for TicketError {
    fn from(e: rusqlite::Error) -> Self {
        TicketError::Database(e.to_string())
    }
}

/// Filter for querying tickets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TicketFilter {
    /// Prefix matched against driver name or licence number. Empty matches all.
    pub prefix: String,
    /// Ordering by id.
    pub order: SortOrder,
    /// Maximum number of results (None = unlimited).
    pub limit: Option<i64>,
}

impl TicketFilter {
    /// Create a new filter matching every ticket in ascending order.
    pub fn new() -> Self {
        Self::default()
    }

    /// Filter by driver name or licence number prefix.
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Set ordering.
    pub fn with_order(mut self, order: SortOrder) -> Self {
        self.order = order;
        self
    }

    /// Set limit.
    pub fn with_limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Trait for ticket storage backends.
///
/// Implementations serialize their own writes. Every successful write must
/// bump the counter handed out by [`TicketStore::subscribe`] so live queries
/// can re-run.
pub trait TicketStore: Send + Sync {
    /// Insert a new row and return its freshly assigned id.
    /// The record's `uid` is ignored.
    fn insert(&self, record: &TicketRecord) -> Result<TicketId, TicketError>;

    /// Replace the row with the record's `uid`.
    /// Fails with [`TicketError::NotFound`] if there is no such row.
    fn update(&self, record: &TicketRecord) -> Result<(), TicketError>;

    /// Remove a row. Fails with [`TicketError::NotFound`] if there is no such row.
    fn delete(&self, id: TicketId) -> Result<(), TicketError>;

    /// Get a row by id.
    fn get(&self, id: TicketId) -> Result<Option<TicketRecord>, TicketError>;

    /// List rows matching the filter.
    fn list(&self, filter: &TicketFilter) -> Result<Vec<TicketRecord>, TicketError>;

    /// Change notifications: the value increases after every write.
    fn subscribe(&self) -> watch::Receiver<u64>;
}
