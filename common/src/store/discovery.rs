use crate::error::{AskDbError, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};

pub const DATABASE_EXTENSION: &str = "db";

/// a database file that questions can be asked of
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DatabaseHandle {
    pub name: String,
    pub path: PathBuf,
}

impl DatabaseHandle {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self { name, path }
    }
}

fn has_database_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e == DATABASE_EXTENSION)
        .unwrap_or(false)
}

/// enumerate database files in `dir`, sorted by file name
#[tracing::instrument(skip(dir), fields(dir = %dir.display()))]
pub fn list_databases(dir: &Path) -> Result<Vec<DatabaseHandle>> {
    let mut databases = Vec::new();

    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if entry.file_type()?.is_file() && has_database_extension(&path) {
            databases.push(DatabaseHandle::new(path));
        }
    }

    databases.sort_by(|a, b| a.name.cmp(&b.name));
    tracing::debug!("found {} databases", databases.len());

    Ok(databases)
}

/// map a user-supplied name onto a database file inside `dir`
pub fn resolve_database(dir: &Path, name: &str) -> Result<DatabaseHandle> {
    let name = name.trim();

    if name.is_empty()
        || name.contains('/')
        || name.contains('\\')
        || name.contains("..")
        || !has_database_extension(Path::new(name))
    {
        return Err(AskDbError::UnknownDatabase(name.to_string()));
    }

    let path = dir.join(name);
    if !path.is_file() {
        return Err(AskDbError::UnknownDatabase(name.to_string()));
    }

    Ok(DatabaseHandle::new(path))
}
