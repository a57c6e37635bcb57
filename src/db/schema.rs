//! Target table DDL and connection setup
//!
//! The SQL text the loader runs lives here: the pragma block applied to
//! every connection, the parameterized INSERT builder, and helpers to
//! create or check the target table.

use rusqlite::Connection;

use crate::error::DbResult;
use crate::schema::Schema;

/// SQLite pragmas applied to every loader connection
///
/// WAL lets dispatch workers write concurrently on separate connections;
/// the busy timeout covers write-lock handoff between them.
const LOAD_PRAGMAS: &str = r#"
PRAGMA journal_mode = WAL;
PRAGMA synchronous = NORMAL;
PRAGMA cache_size = -64000;      -- 64MB cache
PRAGMA temp_store = MEMORY;
PRAGMA busy_timeout = 5000;
"#;

/// Apply loader pragmas to a connection
pub fn configure_connection(conn: &Connection) -> DbResult<()> {
    conn.execute_batch(LOAD_PRAGMAS)?;
    Ok(())
}

/// Build the parameterized INSERT statement for a column list
///
/// Identifiers were validated at config time and are double-quoted here.
/// Values are always bound positionally, never spliced into the text.
pub fn insert_sql(table: &str, columns: &[&str]) -> String {
    let cols = columns
        .iter()
        .map(|c| format!("\"{}\"", c))
        .collect::<Vec<_>>()
        .join(", ");
    let params = (1..=columns.len())
        .map(|i| format!("?{}", i))
        .collect::<Vec<_>>()
        .join(", ");
    format!("INSERT INTO \"{}\" ({}) VALUES ({})", table, cols, params)
}

/// Create the target table from the schema if it does not exist
pub fn create_table(conn: &Connection, table: &str, schema: &Schema) -> DbResult<()> {
    let cols = schema
        .columns()
        .iter()
        .map(|c| format!("\"{}\" {}", c.name, c.ty.sql_type()))
        .collect::<Vec<_>>()
        .join(", ");
    let sql = format!("CREATE TABLE IF NOT EXISTS \"{}\" ({})", table, cols);
    conn.execute(&sql, [])?;
    Ok(())
}

/// Check whether the target table exists
pub fn table_exists(conn: &Connection, table: &str) -> DbResult<bool> {
    let result = conn.query_row(
        "SELECT name FROM sqlite_master WHERE type = 'table' AND name = ?1",
        [table],
        |row| row.get::<_, String>(0),
    );

    match result {
        Ok(_) => Ok(true),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(false),
        Err(e) => Err(e.into()),
    }
}
