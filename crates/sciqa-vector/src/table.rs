//! LanceDB connection and housekeeping helpers.
//!
//! Opening the database, table existence checks, row counts and clearing a
//! table. Everything here is async; [`crate::LanceStore`] drives it from its
//! own runtime.
use anyhow::Result;
use lancedb::{connect, Connection, Table};

pub async fn open_db(uri: &str) -> Result<Connection> {
    Ok(connect(uri).execute().await?)
}

pub async fn table_exists(conn: &Connection, name: &str) -> Result<bool> {
    let names = conn.table_names().execute().await?;
    Ok(names.iter().any(|n| n == name))
}

/// `None` when the table was never created.
pub async fn open_table(conn: &Connection, name: &str) -> Result<Option<Table>> {
    if !table_exists(conn, name).await? {
        return Ok(None);
    }
    Ok(Some(conn.open_table(name).execute().await?))
}

pub async fn count_rows(conn: &Connection, name: &str) -> Result<usize> {
    match open_table(conn, name).await? {
        Some(table) => Ok(table.count_rows(None).await?),
        None => Ok(0),
    }
}

pub async fn count_where(table: &Table, filter: &str) -> Result<usize> {
    Ok(table.count_rows(Some(filter.to_string())).await?)
}

/// Remove every row, keeping the table and its schema.
pub async fn clear_table(conn: &Connection, name: &str) -> Result<usize> {
    let Some(table) = open_table(conn, name).await? else { return Ok(0) };
    let removed = table.count_rows(None).await?;
    if removed > 0 {
        table.delete("true").await?;
    }
    Ok(removed)
}

/// SQL string literal for a `only_if`/`delete` predicate.
pub fn quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}
