//! Weighbridge tickets: domain types, persisted records and storage.

mod record;
mod schema;
mod sqlite_store;
mod store;
mod types;

pub use record::TicketRecord;
pub use schema::{SCHEMA_VERSION, TABLE_NAME};
pub use sqlite_store::SqliteTicketStore;
pub use store::{TicketError, TicketFilter, TicketStore};
pub use types::{truncate_to_millis, SortOrder, Ticket, TicketId};
