//! Schema creation and migration for the `weighbridge` table.
//!
//! The schema version is kept in `PRAGMA user_version`. Version 1 files were
//! written by the generic template this app grew out of: the table was called
//! `MyModel` and the driver column was called `name`. Both are renamed in
//! place so existing rows survive.

use rusqlite::{params, Connection};
use tracing::info;

use super::TicketError;

/// Current schema version.
pub const SCHEMA_VERSION: i64 = 2;

/// Table holding ticket rows.
pub const TABLE_NAME: &str = "weighbridge";

const LEGACY_TABLE_NAME: &str = "MyModel";

pub(crate) fn initialize_schema(conn: &Connection) -> Result<(), TicketError> {
    let version: i64 = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;

    if version > SCHEMA_VERSION {
        return Err(TicketError::Database(format!(
            "schema version {} is newer than supported version {}",
            version, SCHEMA_VERSION
        )));
    }

    if version < SCHEMA_VERSION && table_exists(conn, LEGACY_TABLE_NAME)? {
        info!("Migrating ticket schema from version {} to {}", version, SCHEMA_VERSION);
        let tx = conn.unchecked_transaction()?;
        tx.execute_batch(
            r#"
            ALTER TABLE MyModel RENAME COLUMN name TO driverName;
            ALTER TABLE MyModel RENAME TO weighbridge;
            "#,
        )?;
        tx.commit()?;
    }

    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS weighbridge (
            uid INTEGER PRIMARY KEY AUTOINCREMENT NOT NULL,
            datetime INTEGER NOT NULL DEFAULT 0,
            licenceNumber TEXT NOT NULL DEFAULT '',
            driverName TEXT NOT NULL DEFAULT '',
            inboundWeight REAL NOT NULL DEFAULT 0,
            outboundWeight REAL NOT NULL DEFAULT 0
        );
        "#,
    )?;

    conn.pragma_update(None, "user_version", SCHEMA_VERSION)?;

    Ok(())
}

fn table_exists(conn: &Connection, name: &str) -> Result<bool, TicketError> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?",
        params![name],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user_version(conn: &Connection) -> i64 {
        conn.query_row("PRAGMA user_version", [], |row| row.get(0))
            .unwrap()
    }

    #[test]
    fn test_fresh_database_is_current_version() {
        let conn = Connection::open_in_memory().unwrap();
        initialize_schema(&conn).unwrap();

        assert_eq!(user_version(&conn), SCHEMA_VERSION);
        assert!(table_exists(&conn, TABLE_NAME).unwrap());
    }

    #[test]
    fn test_initialize_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        initialize_schema(&conn).unwrap();
        conn.execute(
            "INSERT INTO weighbridge (datetime, licenceNumber, driverName) VALUES (1, 'B1', 'Ana')",
            [],
        )
        .unwrap();

        initialize_schema(&conn).unwrap();

        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM weighbridge", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_migrates_legacy_table() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            r#"
            CREATE TABLE MyModel (
                uid INTEGER PRIMARY KEY AUTOINCREMENT NOT NULL,
                datetime INTEGER NOT NULL DEFAULT 0,
                licenceNumber TEXT NOT NULL DEFAULT '',
                name TEXT NOT NULL DEFAULT '',
                inboundWeight REAL NOT NULL DEFAULT 0,
                outboundWeight REAL NOT NULL DEFAULT 0
            );
            INSERT INTO MyModel (datetime, licenceNumber, name, inboundWeight, outboundWeight)
                VALUES (1000, 'B 1', 'Legacy Driver', 10.0, 25.0);
            PRAGMA user_version = 1;
            "#,
        )
        .unwrap();

        initialize_schema(&conn).unwrap();

        assert!(!table_exists(&conn, LEGACY_TABLE_NAME).unwrap());
        assert_eq!(user_version(&conn), SCHEMA_VERSION);

        let driver: String = conn
            .query_row("SELECT driverName FROM weighbridge WHERE uid = 1", [], |row| {
                row.get(0)
            })
            .unwrap();
        assert_eq!(driver, "Legacy Driver");
    }

    #[test]
    fn test_rejects_newer_schema() {
        let conn = Connection::open_in_memory().unwrap();
        conn.pragma_update(None, "user_version", SCHEMA_VERSION + 1)
            .unwrap();

        let result = initialize_schema(&conn);
        assert!(matches!(result, Err(TicketError::Database(_))));
    }
}
