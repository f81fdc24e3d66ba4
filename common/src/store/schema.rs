use super::{open_store, quote_ident, unreadable};
use crate::error::Result;
use rusqlite::{Connection, OpenFlags};
use serde::Serialize;
use std::fmt;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableSchema {
    pub name: String,
    pub columns: Vec<String>,
}

/// tables and column names used to ground generation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SchemaListing {
    pub tables: Vec<TableSchema>,
}

impl fmt::Display for SchemaListing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for table in &self.tables {
            write!(
                f,
                "\nTable: {}\nColumns: {}\n",
                table.name,
                table.columns.join(", ")
            )?;
        }
        Ok(())
    }
}

/// user tables in creation order, internal sqlite_* tables excluded
pub(crate) fn user_tables(conn: &Connection) -> rusqlite::Result<Vec<String>> {
    let mut stmt = conn.prepare(
        "SELECT name FROM sqlite_master \
         WHERE type = 'table' AND name NOT LIKE 'sqlite\\_%' ESCAPE '\\' \
         ORDER BY rowid",
    )?;
    let names = stmt
        .query_map([], |row| row.get::<_, String>(0))?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(names)
}

fn table_columns(conn: &Connection, table: &str) -> rusqlite::Result<Vec<String>> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({})", quote_ident(table)))?;
    let columns = stmt
        .query_map([], |row| row.get::<_, String>(1))?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(columns)
}

fn read_listing(conn: &Connection) -> rusqlite::Result<SchemaListing> {
    let mut tables = Vec::new();
    for name in user_tables(conn)? {
        let columns = table_columns(conn, &name)?;
        tables.push(TableSchema { name, columns });
    }
    Ok(SchemaListing { tables })
}

/// read every table and its column names from the store at `path`
#[tracing::instrument(skip(path), fields(db = %path.display()))]
pub fn extract_schema(path: &Path) -> Result<SchemaListing> {
    let conn = open_store(path, OpenFlags::SQLITE_OPEN_READ_ONLY)?;
    let listing = read_listing(&conn).map_err(|e| unreadable(path, e))?;

    tracing::debug!(tables = listing.tables.len(), "schema extracted");
    Ok(listing)
}

/// the create table statements of the store at `path`, one per line
pub fn extract_ddl(path: &Path) -> Result<String> {
    let conn = open_store(path, OpenFlags::SQLITE_OPEN_READ_ONLY)?;

    let read = || -> rusqlite::Result<Vec<String>> {
        let mut stmt = conn.prepare(
            "SELECT sql FROM sqlite_master \
             WHERE type = 'table' AND sql IS NOT NULL \
             AND name NOT LIKE 'sqlite\\_%' ESCAPE '\\' \
             ORDER BY rowid",
        )?;
        let statements = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(statements)
    };

    let statements = read().map_err(|e| unreadable(path, e))?;
    Ok(statements.join("\n"))
}
