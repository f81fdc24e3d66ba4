use super::executor::{query_rows, ResultSet};
use super::schema::user_tables;
use super::{open_store, quote_ident, unreadable};
use crate::error::Result;
use rusqlite::OpenFlags;
use serde::Serialize;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableSample {
    pub table: String,
    pub sample: ResultSet,
}

/// the first `limit` rows of every user table
#[tracing::instrument(skip(path), fields(db = %path.display()))]
pub fn table_samples(path: &Path, limit: usize) -> Result<Vec<TableSample>> {
    let conn = open_store(path, OpenFlags::SQLITE_OPEN_READ_ONLY)?;
    let tables = user_tables(&conn).map_err(|e| unreadable(path, e))?;
    // sqlite limits are signed
    let limit = i64::try_from(limit).unwrap_or(i64::MAX);

    let mut samples = Vec::with_capacity(tables.len());
    for table in tables {
        let sql = format!("SELECT * FROM {} LIMIT ?1", quote_ident(&table));
        let sample = query_rows(&conn, &sql, [limit]).map_err(|e| unreadable(path, e))?;
        samples.push(TableSample { table, sample });
    }

    Ok(samples)
}
