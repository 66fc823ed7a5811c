//! Testing utilities and mock implementations.
//!
//! # Example
//!
//! ```rust,ignore
//! use weighbridge_core::testing::{fixtures, MockTicketRepository};
//!
//! let repository = Arc::new(MockTicketRepository::with_tickets(fixtures::tickets(4)));
//! let (reducer, mut effects) = TicketListReducer::new(repository.clone(), ListConfig::default());
//!
//! reducer.on_event(ListEvent::SearchChanged("Driver 3".into()));
//! // ...
//! assert_eq!(repository.recorded_searches().last().unwrap().query, "Driver 3");
//! ```

mod mock_repository;

pub use mock_repository::{MockTicketRepository, RecordedSearch};

/// Test fixtures and helper functions.
pub mod fixtures {
    use chrono::{DateTime, Utc};

    use crate::ticket::{Ticket, TicketId};

    /// Fixed weighing time used by fixtures: 12 Jun 2024 08:30 UTC.
    pub fn timestamp() -> DateTime<Utc> {
        DateTime::<Utc>::from_timestamp_millis(1_718_181_000_000).unwrap_or_default()
    }

    /// Persisted ticket `n`: "Driver n", licence "BA n", weights `10n` in and `15n` out.
    pub fn ticket(n: i64) -> Ticket {
        Ticket::new(
            timestamp(),
            format!("Driver {}", n),
            format!("BA {}", n),
            n as f64 * 10.0,
            n as f64 * 15.0,
        )
        .with_id(TicketId(n))
    }

    /// Tickets 1 through `count`.
    pub fn tickets(count: i64) -> Vec<Ticket> {
        (1..=count).map(ticket).collect()
    }
}
