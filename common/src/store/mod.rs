pub mod discovery;
pub mod schema;
pub mod executor;
pub mod samples;

pub use discovery::{list_databases, resolve_database, DatabaseHandle, DATABASE_EXTENSION};
pub use executor::{
    execute_statement, CellValue, QueryOutcome, ResultSet, EMPTY_STATEMENT, NO_DATA_NOTICE,
};
pub use samples::{table_samples, TableSample};
pub use schema::{extract_ddl, extract_schema, SchemaListing, TableSchema};

use crate::error::Result;
use rusqlite::{Connection, OpenFlags};
use std::io;
use std::path::Path;

/// run blocking store work off the async runtime
pub async fn run_blocking<T, F>(f: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| io::Error::other(format!("task join error: {}", e)))?
}

/// open an existing store without creating it
pub(crate) fn open_store(path: &Path, flags: OpenFlags) -> Result<Connection> {
    if !path.is_file() {
        return Err(io::Error::new(
            io::ErrorKind::NotFound,
            format!("database not found: {}", path.display()),
        )
        .into());
    }

    Connection::open_with_flags(path, flags | OpenFlags::SQLITE_OPEN_NO_MUTEX)
        .map_err(|e| unreadable(path, e).into())
}

/// classify a failure to read the store as invalid data
pub(crate) fn unreadable(path: &Path, e: rusqlite::Error) -> io::Error {
    io::Error::new(
        io::ErrorKind::InvalidData,
        format!("cannot read database {}: {}", path.display(), e),
    )
}

/// quote an identifier for interpolation into sql text
pub(crate) fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
