//! Mock ticket repository for testing.

use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use futures::stream::{self, StreamExt};

use crate::repository::{TicketRepository, TicketStream};
use crate::ticket::{SortOrder, Ticket, TicketError, TicketId};

/// A recorded search for test assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedSearch {
    pub query: String,
    pub sort: SortOrder,
}

/// Mock implementation of the TicketRepository trait.
///
/// Provides controllable behavior for testing:
/// - In-memory tickets, filtered and ordered like the real store
/// - Every call recorded for assertions
/// - Injectable failures and search latency
///
/// Streams returned by `get` and `search` emit a single snapshot and end;
/// use the SQLite-backed repository when a test needs live re-emission.
#[derive(Debug, Default)]
pub struct MockTicketRepository {
    tickets: Mutex<Vec<Ticket>>,
    searches: Mutex<Vec<RecordedSearch>>,
    gets: Mutex<Vec<TicketId>>,
    added: Mutex<Vec<Ticket>>,
    updated: Mutex<Vec<Ticket>>,
    deleted: Mutex<Vec<Ticket>>,
    get_error: Mutex<Option<TicketError>>,
    search_error: Mutex<Option<TicketError>>,
    write_error: Mutex<Option<TicketError>>,
    search_delay: Mutex<Duration>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

impl MockTicketRepository {
    /// Create an empty mock repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock repository holding these tickets.
    pub fn with_tickets(tickets: Vec<Ticket>) -> Self {
        let repository = Self::new();
        repository.set_tickets(tickets);
        repository
    }

    /// Replace the stored tickets.
    pub fn set_tickets(&self, tickets: Vec<Ticket>) {
        *lock(&self.tickets) = tickets;
    }

    /// Current stored tickets.
    pub fn tickets(&self) -> Vec<Ticket> {
        lock(&self.tickets).clone()
    }

    /// Make every `get` fail with this error.
    pub fn fail_get(&self, error: TicketError) {
        *lock(&self.get_error) = Some(error);
    }

    /// Make every `search` fail with this error.
    pub fn fail_search(&self, error: TicketError) {
        *lock(&self.search_error) = Some(error);
    }

    /// Make every `add`, `update` and `delete` fail with this error.
    pub fn fail_writes(&self, error: TicketError) {
        *lock(&self.write_error) = Some(error);
    }

    /// Delay before a search stream emits.
    pub fn set_search_delay(&self, delay: Duration) {
        *lock(&self.search_delay) = delay;
    }

    /// Searches issued so far, oldest first.
    pub fn recorded_searches(&self) -> Vec<RecordedSearch> {
        lock(&self.searches).clone()
    }

    /// Ids passed to `get`.
    pub fn recorded_gets(&self) -> Vec<TicketId> {
        lock(&self.gets).clone()
    }

    /// Tickets passed to `add`.
    pub fn added(&self) -> Vec<Ticket> {
        lock(&self.added).clone()
    }

    /// Tickets passed to `update`.
    pub fn updated(&self) -> Vec<Ticket> {
        lock(&self.updated).clone()
    }

    /// Tickets passed to `delete`.
    pub fn deleted(&self) -> Vec<Ticket> {
        lock(&self.deleted).clone()
    }

    fn write_error(&self) -> Option<TicketError> {
        lock(&self.write_error).clone()
    }

    fn matching(&self, query: &str, sort: SortOrder) -> Vec<Ticket> {
        let mut tickets: Vec<Ticket> = lock(&self.tickets)
            .iter()
            .filter(|t| t.driver_name.starts_with(query) || t.licence_number.starts_with(query))
            .cloned()
            .collect();
        tickets.sort_by_key(|t| t.id);
        if sort == SortOrder::Descending {
            tickets.reverse();
        }
        tickets
    }
}

#[async_trait]
impl TicketRepository for MockTicketRepository {
    fn get(&self, id: TicketId) -> TicketStream<Ticket> {
        lock(&self.gets).push(id);

        let result = match lock(&self.get_error).clone() {
            Some(error) => Err(error),
            None => lock(&self.tickets)
                .iter()
                .find(|t| t.id == id)
                .cloned()
                .ok_or(TicketError::NotFound(id)),
        };

        stream::once(async move { result }).boxed()
    }

    fn search(&self, query: &str, sort: SortOrder) -> TicketStream<Vec<Ticket>> {
        lock(&self.searches).push(RecordedSearch {
            query: query.to_string(),
            sort,
        });

        let result = match lock(&self.search_error).clone() {
            Some(error) => Err(error),
            None => Ok(self.matching(query, sort)),
        };
        let delay = *lock(&self.search_delay);

        stream::once(async move {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            result
        })
        .boxed()
    }

    async fn add(&self, ticket: &Ticket) -> Result<TicketId, TicketError> {
        lock(&self.added).push(ticket.clone());
        if let Some(error) = self.write_error() {
            return Err(error);
        }

        let mut tickets = lock(&self.tickets);
        let id = TicketId(tickets.iter().map(|t| t.id.value()).max().unwrap_or(0) + 1);
        tickets.push(ticket.clone().with_id(id));
        Ok(id)
    }

    async fn update(&self, ticket: &Ticket) -> Result<(), TicketError> {
        lock(&self.updated).push(ticket.clone());
        if let Some(error) = self.write_error() {
            return Err(error);
        }

        let mut tickets = lock(&self.tickets);
        let existing = tickets
            .iter_mut()
            .find(|t| t.id == ticket.id)
            .ok_or(TicketError::NotFound(ticket.id))?;
        *existing = ticket.clone();
        Ok(())
    }

    async fn delete(&self, ticket: &Ticket) -> Result<(), TicketError> {
        lock(&self.deleted).push(ticket.clone());
        if let Some(error) = self.write_error() {
            return Err(error);
        }

        let mut tickets = lock(&self.tickets);
        let before = tickets.len();
        tickets.retain(|t| t.id != ticket.id);
        if tickets.len() == before {
            return Err(TicketError::NotFound(ticket.id));
        }
        Ok(())
    }
}
