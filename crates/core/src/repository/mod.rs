//! Reactive ticket repository.
//!
//! Sits between the view-state reducers and a [`TicketStore`]: translates
//! persisted [`TicketRecord`](crate::ticket::TicketRecord)s into domain
//! [`Ticket`]s and exposes reads as live streams that re-emit whenever the
//! store changes.

mod live;
mod store_repository;

pub use live::live_query;
pub use store_repository::StoreTicketRepository;

pub(crate) use store_repository::first;

use async_trait::async_trait;
use futures::stream::BoxStream;

use crate::ticket::{SortOrder, Ticket, TicketError, TicketId};

/// A live query result. Dropping the stream cancels the subscription.
pub type TicketStream<T> = BoxStream<'static, Result<T, TicketError>>;

/// Source of truth for tickets as seen by the reducers.
#[async_trait]
pub trait TicketRepository: Send + Sync {
    /// Live view of one ticket. A missing ticket emits [`TicketError::NotFound`].
    fn get(&self, id: TicketId) -> TicketStream<Ticket>;

    /// Live list of tickets whose driver name or licence number starts with
    /// `query`, ordered by id.
    fn search(&self, query: &str, sort: SortOrder) -> TicketStream<Vec<Ticket>>;

    /// Persist a new ticket and return its assigned id.
    async fn add(&self, ticket: &Ticket) -> Result<TicketId, TicketError>;

    /// Replace an existing ticket.
    async fn update(&self, ticket: &Ticket) -> Result<(), TicketError>;

    /// Remove a ticket.
    async fn delete(&self, ticket: &Ticket) -> Result<(), TicketError>;
}
