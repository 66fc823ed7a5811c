//! SQLite-backed ticket store implementation.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use rusqlite::{params, Connection};
use tokio::sync::watch;
use tracing::info;

use super::schema::initialize_schema;
use super::{TicketError, TicketFilter, TicketId, TicketRecord, TicketStore};

const SELECT_COLUMNS: &str =
    "SELECT uid, datetime, licenceNumber, driverName, inboundWeight, outboundWeight FROM weighbridge";

/// SQLite-backed ticket store.
pub struct SqliteTicketStore {
    conn: Mutex<Connection>,
    changes: watch::Sender<u64>,
}

impl SqliteTicketStore {
    /// Create a new SQLite ticket store, creating the database file and tables if needed.
    /// Files written by an older schema version are migrated in place.
    pub fn new(path: &Path) -> Result<Self, TicketError> {
        let conn = Connection::open(path)?;
        initialize_schema(&conn)?;
        info!("Ticket store opened at {:?}", path);
        Ok(Self::from_connection(conn))
    }

    /// Create an in-memory SQLite ticket store (useful for testing).
    pub fn in_memory() -> Result<Self, TicketError> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self::from_connection(conn))
    }

    fn from_connection(conn: Connection) -> Self {
        let (changes, _) = watch::channel(0);
        Self {
            conn: Mutex::new(conn),
            changes,
        }
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, TicketError> {
        self.conn
            .lock()
            .map_err(|e| TicketError::Database(format!("connection lock poisoned: {}", e)))
    }

    fn notify_changed(&self) {
        self.changes.send_modify(|version| *version += 1);
    }

    fn row_to_record(row: &rusqlite::Row) -> rusqlite::Result<TicketRecord> {
        Ok(TicketRecord {
            uid: row.get(0)?,
            datetime: row.get(1)?,
            licence_number: row.get(2)?,
            driver_name: row.get(3)?,
            inbound_weight: row.get(4)?,
            outbound_weight: row.get(5)?,
        })
    }
}

/// Escape `LIKE` wildcards so the prefix is matched literally.
fn like_prefix_pattern(prefix: &str) -> String {
    let mut pattern = String::with_capacity(prefix.len() + 1);
    for c in prefix.chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

impl TicketStore for SqliteTicketStore {
    fn insert(&self, record: &TicketRecord) -> Result<TicketId, TicketError> {
        let conn = self.conn()?;

        conn.execute(
            "INSERT INTO weighbridge (datetime, licenceNumber, driverName, inboundWeight, outboundWeight) VALUES (?, ?, ?, ?, ?)",
            params![
                record.datetime,
                record.licence_number,
                record.driver_name,
                record.inbound_weight,
                record.outbound_weight,
            ],
        )?;
        let id = TicketId(conn.last_insert_rowid());
        drop(conn);

        self.notify_changed();
        Ok(id)
    }

    fn update(&self, record: &TicketRecord) -> Result<(), TicketError> {
        let conn = self.conn()?;

        let changed = conn.execute(
            "UPDATE weighbridge SET datetime = ?, licenceNumber = ?, driverName = ?, inboundWeight = ?, outboundWeight = ? WHERE uid = ?",
            params![
                record.datetime,
                record.licence_number,
                record.driver_name,
                record.inbound_weight,
                record.outbound_weight,
                record.uid,
            ],
        )?;
        drop(conn);

        if changed == 0 {
            return Err(TicketError::NotFound(TicketId(record.uid)));
        }

        self.notify_changed();
        Ok(())
    }

    fn delete(&self, id: TicketId) -> Result<(), TicketError> {
        let conn = self.conn()?;

        let changed = conn.execute("DELETE FROM weighbridge WHERE uid = ?", params![id.value()])?;
        drop(conn);

        if changed == 0 {
            return Err(TicketError::NotFound(id));
        }

        self.notify_changed();
        Ok(())
    }

    fn get(&self, id: TicketId) -> Result<Option<TicketRecord>, TicketError> {
        let conn = self.conn()?;

        let result = conn.query_row(
            &format!("{} WHERE uid = ?", SELECT_COLUMNS),
            params![id.value()],
            Self::row_to_record,
        );

        match result {
            Ok(record) => Ok(Some(record)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn list(&self, filter: &TicketFilter) -> Result<Vec<TicketRecord>, TicketError> {
        let conn = self.conn()?;

        let sql = format!(
            r"{} WHERE (licenceNumber LIKE ?1 ESCAPE '\' OR driverName LIKE ?1 ESCAPE '\') ORDER BY uid {} LIMIT ?2",
            SELECT_COLUMNS,
            filter.order.as_sql()
        );

        let mut stmt = conn.prepare(&sql)?;

        // SQLite treats a negative limit as "no limit"
        let limit = filter.limit.unwrap_or(-1);
        let rows = stmt.query_map(
            params![like_prefix_pattern(&filter.prefix), limit],
            Self::row_to_record,
        )?;

        let mut records = Vec::new();
        for row_result in rows {
            records.push(row_result?);
        }

        Ok(records)
    }

    fn subscribe(&self) -> watch::Receiver<u64> {
        self.changes.subscribe()
    }
}
