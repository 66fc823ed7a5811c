//! [`TicketRepository`] backed by a [`TicketStore`].

use std::sync::Arc;

use async_trait::async_trait;
use futures::StreamExt;

use super::{live_query, TicketRepository, TicketStream};
use crate::ticket::{
    SortOrder, Ticket, TicketError, TicketFilter, TicketId, TicketRecord, TicketStore,
};

/// Repository forwarding to a ticket store. Writes run on the blocking pool.
#[derive(Clone)]
pub struct StoreTicketRepository {
    store: Arc<dyn TicketStore>,
}

impl StoreTicketRepository {
    pub fn new(store: Arc<dyn TicketStore>) -> Self {
        Self { store }
    }

    async fn write<T, F>(&self, op: F) -> Result<T, TicketError>
    where
        T: Send + 'static,
        F: FnOnce(&dyn TicketStore) -> Result<T, TicketError> + Send + 'static,
    {
        let store = Arc::clone(&self.store);
        tokio::task::spawn_blocking(move || op(store.as_ref()))
            .await
            .unwrap_or_else(|e| Err(TicketError::Database(format!("store task failed: {}", e))))
    }
}

#[async_trait]
impl TicketRepository for StoreTicketRepository {
    fn get(&self, id: TicketId) -> TicketStream<Ticket> {
        live_query(Arc::clone(&self.store), move |store| {
            store
                .get(id)?
                .map(Ticket::from)
                .ok_or(TicketError::NotFound(id))
        })
    }

    fn search(&self, query: &str, sort: SortOrder) -> TicketStream<Vec<Ticket>> {
        let filter = TicketFilter::new().with_prefix(query).with_order(sort);
        live_query(Arc::clone(&self.store), move |store| {
            Ok(store.list(&filter)?.into_iter().map(Ticket::from).collect())
        })
    }

    async fn add(&self, ticket: &Ticket) -> Result<TicketId, TicketError> {
        let record = TicketRecord::from(ticket);
        self.write(move |store| store.insert(&record)).await
    }

    async fn update(&self, ticket: &Ticket) -> Result<(), TicketError> {
        let record = TicketRecord::from(ticket);
        self.write(move |store| store.update(&record)).await
    }

    async fn delete(&self, ticket: &Ticket) -> Result<(), TicketError> {
        let id = ticket.id;
        self.write(move |store| store.delete(id)).await
    }
}

/// Take the first emission of a live stream, treating an ended stream as a
/// storage failure.
pub(crate) async fn first<T>(mut stream: TicketStream<T>) -> Result<T, TicketError> {
    stream
        .next()
        .await
        .unwrap_or_else(|| Err(TicketError::Database("query stream ended".to_string())))
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Utc};

    use super::*;
    use crate::ticket::SqliteTicketStore;

    fn create_repository() -> StoreTicketRepository {
        StoreTicketRepository::new(Arc::new(SqliteTicketStore::in_memory().unwrap()))
    }

    fn ticket(driver: &str, licence: &str) -> Ticket {
        let timestamp = DateTime::<Utc>::from_timestamp_millis(1_718_000_000_000).unwrap();
        Ticket::new(timestamp, driver, licence, 100.0, 150.0)
    }

    #[tokio::test]
    async fn test_add_then_get_round_trip() {
        let repository = create_repository();
        let original = ticket("Test", "B1");

        let id = repository.add(&original).await.unwrap();
        let fetched = first(repository.get(id)).await.unwrap();

        assert_eq!(fetched, original.with_id(id));
        assert_eq!(fetched.net_weight(), 50.0);
    }

    #[tokio::test]
    async fn test_current_time_survives_round_trip() {
        let repository = create_repository();
        let original = Ticket::new(Utc::now(), "Test", "B1", 100.0, 150.0);

        let id = repository.add(&original).await.unwrap();
        let fetched = first(repository.get(id)).await.unwrap();

        assert_eq!(fetched, original.with_id(id));
    }

    #[tokio::test]
    async fn test_get_missing_ticket_emits_not_found() {
        let repository = create_repository();

        let result = first(repository.get(TicketId(3))).await;
        assert_eq!(result, Err(TicketError::NotFound(TicketId(3))));
    }

    #[tokio::test]
    async fn test_update_existing_ticket() {
        let repository = create_repository();
        let id = repository.add(&ticket("Ana", "B 1")).await.unwrap();

        let mut changed = ticket("Ana", "B 1").with_id(id);
        changed.outbound_weight = 400.0;
        repository.update(&changed).await.unwrap();

        let fetched = first(repository.get(id)).await.unwrap();
        assert_eq!(fetched.net_weight(), 300.0);
    }

    #[tokio::test]
    async fn test_update_missing_ticket_fails() {
        let repository = create_repository();

        let result = repository.update(&ticket("Ana", "B 1").with_id(TicketId(8))).await;
        assert_eq!(result, Err(TicketError::NotFound(TicketId(8))));
    }

    #[tokio::test]
    async fn test_search_is_live() {
        let repository = create_repository();
        let mut results = repository.search("Driver", SortOrder::Descending);

        assert!(results.next().await.unwrap().unwrap().is_empty());

        let first_id = repository.add(&ticket("Driver 1", "BA 1")).await.unwrap();
        let tickets = results.next().await.unwrap().unwrap();
        assert_eq!(tickets.len(), 1);

        let second_id = repository.add(&ticket("Driver 2", "BA 2")).await.unwrap();
        let tickets = results.next().await.unwrap().unwrap();
        let ids: Vec<TicketId> = tickets.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![second_id, first_id]);

        repository.delete(&tickets[0]).await.unwrap();
        let tickets = results.next().await.unwrap().unwrap();
        assert_eq!(tickets.len(), 1);
        assert_eq!(tickets[0].id, first_id);
    }

    #[tokio::test]
    async fn test_search_filters_by_prefix() {
        let repository = create_repository();
        repository.add(&ticket("Driver 1", "BA 1")).await.unwrap();
        repository.add(&ticket("Sari", "BA 2")).await.unwrap();

        let tickets = first(repository.search("Sa", SortOrder::Ascending))
            .await
            .unwrap();
        assert_eq!(tickets.len(), 1);
        assert_eq!(tickets[0].driver_name, "Sari");
    }
}
