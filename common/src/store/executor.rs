use super::open_store;
use crate::error::Result;
use rusqlite::fallible_iterator::FallibleIterator;
use rusqlite::types::ValueRef;
use rusqlite::{Batch, Connection, OpenFlags, Params, Statement};
use serde::{Serialize, Serializer};
use std::fmt;
use std::path::Path;

pub const NO_DATA_NOTICE: &str = "Query executed successfully, but no data was returned.";

/// reported for text holding no statement at all: blank, `;` or only comments
pub const EMPTY_STATEMENT: &str = "empty statement";

/// a single value as sqlite stored it
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
}

impl From<ValueRef<'_>> for CellValue {
    fn from(value: ValueRef<'_>) -> Self {
        match value {
            ValueRef::Null => CellValue::Null,
            ValueRef::Integer(i) => CellValue::Integer(i),
            ValueRef::Real(f) => CellValue::Real(f),
            ValueRef::Text(t) => CellValue::Text(String::from_utf8_lossy(t).into_owned()),
            ValueRef::Blob(b) => CellValue::Blob(b.to_vec()),
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Null => write!(f, "NULL"),
            CellValue::Integer(i) => write!(f, "{}", i),
            CellValue::Real(r) => write!(f, "{}", r),
            CellValue::Text(s) => write!(f, "{}", s),
            CellValue::Blob(b) => write!(f, "[BLOB {} bytes]", b.len()),
        }
    }
}

impl Serialize for CellValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            CellValue::Null => serializer.serialize_none(),
            CellValue::Integer(i) => serializer.serialize_i64(*i),
            CellValue::Real(r) => serializer.serialize_f64(*r),
            CellValue::Text(s) => serializer.serialize_str(s),
            CellValue::Blob(_) => serializer.collect_str(self),
        }
    }
}

/// column names and rows in the order the statement produced them
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResultSet {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

impl ResultSet {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum QueryOutcome {
    Rows(ResultSet),
    /// the statement ran but produced no rows
    Empty,
    /// the store rejected the statement
    Failed(String),
}

impl QueryOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, QueryOutcome::Failed(_))
    }
}

pub(crate) fn query_rows<P: Params>(
    conn: &Connection,
    sql: &str,
    params: P,
) -> rusqlite::Result<ResultSet> {
    let mut stmt = conn.prepare(sql)?;
    read_rows(&mut stmt, params)
}

fn read_rows<P: Params>(stmt: &mut Statement<'_>, params: P) -> rusqlite::Result<ResultSet> {
    let columns: Vec<String> = stmt.column_names().iter().map(|c| c.to_string()).collect();

    let mut rows = Vec::new();
    let mut cursor = stmt.query(params)?;
    while let Some(row) = cursor.next()? {
        let mut values = Vec::with_capacity(columns.len());
        for idx in 0..columns.len() {
            values.push(CellValue::from(row.get_ref(idx)?));
        }
        rows.push(values);
    }

    Ok(ResultSet { columns, rows })
}

/// prepare the only statement in `sql`; `None` when it holds no statement.
/// nothing is executed before the whole text has been checked.
fn prepare_single<'conn>(
    conn: &'conn Connection,
    sql: &str,
) -> rusqlite::Result<Option<Statement<'conn>>> {
    let mut batch = Batch::new(conn, sql);
    let first = batch.next()?;
    if first.is_some() && batch.next()?.is_some() {
        return Err(rusqlite::Error::MultipleStatement);
    }
    Ok(first)
}

/// run `sql` against the store at `path`
///
/// statement errors are reported as [`QueryOutcome::Failed`]; only failing
/// to open the store at all is an `Err`.
#[tracing::instrument(skip(path, sql), fields(db = %path.display(), sql_len = sql.len()))]
pub fn execute_statement(path: &Path, sql: &str) -> Result<QueryOutcome> {
    let conn = open_store(path, OpenFlags::SQLITE_OPEN_READ_WRITE)?;

    let result = prepare_single(&conn, sql).and_then(|stmt| match stmt {
        Some(mut stmt) => read_rows(&mut stmt, []).map(Some),
        None => Ok(None),
    });

    let outcome = match result {
        Ok(None) => {
            tracing::warn!("no statement to execute");
            QueryOutcome::Failed(EMPTY_STATEMENT.to_string())
        }
        Ok(Some(result)) if result.is_empty() => QueryOutcome::Empty,
        Ok(Some(result)) => {
            tracing::info!(rows = result.rows.len(), columns = result.columns.len(), "statement returned rows");
            QueryOutcome::Rows(result)
        }
        Err(e) => {
            tracing::warn!("statement failed: {}", e);
            QueryOutcome::Failed(e.to_string())
        }
    };

    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn olympics(dir: &Path) -> std::path::PathBuf {
        let path = dir.join("olympics.db");
        let conn = Connection::open(&path).unwrap();
        conn.execute_batch(
            "CREATE TABLE medals (athlete TEXT, country TEXT, year INTEGER, gold INTEGER, score REAL, flag INTEGER);
             INSERT INTO medals VALUES ('phelps', 'USA', 2012, 4, 9.5, 1);
             INSERT INTO medals VALUES ('bolt', 'JAM', 2012, 3, NULL, 0);
             INSERT INTO medals VALUES ('ledecky', 'USA', 2016, 4, 8.25, 1);",
        )
        .unwrap();
        path
    }

    #[test]
    fn test_invalid_statement_reports_error_message() {
        let dir = tempfile::tempdir().unwrap();
        let path = olympics(dir.path());

        match execute_statement(&path, "SELEC athlete FROM medals").unwrap() {
            QueryOutcome::Failed(message) => assert!(message.contains("syntax error")),
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[test]
    fn test_missing_table_reports_error_message() {
        let dir = tempfile::tempdir().unwrap();
        let path = olympics(dir.path());

        let outcome = execute_statement(&path, "SELECT * FROM winners").unwrap();
        assert!(outcome.is_failed());
    }

    #[test]
    fn test_zero_rows_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = olympics(dir.path());

        let outcome = execute_statement(&path, "SELECT athlete FROM medals WHERE year = 1896").unwrap();
        assert_eq!(outcome, QueryOutcome::Empty);
    }

    #[test]
    fn test_rows_keep_column_and_row_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = olympics(dir.path());

        let outcome = execute_statement(
            &path,
            "SELECT athlete, score FROM medals WHERE year = 2012 ORDER BY gold DESC",
        )
        .unwrap();

        let QueryOutcome::Rows(result) = outcome else {
            panic!("expected rows");
        };
        assert_eq!(result.columns, vec!["athlete", "score"]);
        assert_eq!(
            result.rows,
            vec![
                vec![CellValue::Text("phelps".to_string()), CellValue::Real(9.5)],
                vec![CellValue::Text("bolt".to_string()), CellValue::Null],
            ]
        );
    }

    #[test]
    fn test_statements_without_content_fail_alike() {
        let dir = tempfile::tempdir().unwrap();
        let path = olympics(dir.path());

        for sql in ["", "  \n", ";", "-- nothing here", "/* a */ ; -- b"] {
            assert_eq!(
                execute_statement(&path, sql).unwrap(),
                QueryOutcome::Failed(EMPTY_STATEMENT.to_string()),
                "{:?}",
                sql
            );
        }
    }

    #[test]
    fn test_multiple_statements_fail_without_running_any() {
        let dir = tempfile::tempdir().unwrap();
        let path = olympics(dir.path());

        assert!(execute_statement(&path, "SELECT 1; SELECT 2").unwrap().is_failed());
        assert!(execute_statement(&path, "DELETE FROM medals; SELECT 1").unwrap().is_failed());

        let QueryOutcome::Rows(result) =
            execute_statement(&path, "SELECT COUNT(*) FROM medals").unwrap()
        else {
            panic!("expected rows");
        };
        assert_eq!(result.rows, vec![vec![CellValue::Integer(3)]]);
    }

    #[test]
    fn test_trailing_semicolon_and_comment_are_one_statement() {
        let dir = tempfile::tempdir().unwrap();
        let path = olympics(dir.path());

        let outcome = execute_statement(&path, "SELECT athlete FROM medals WHERE gold = 3; -- fastest").unwrap();
        assert_eq!(
            outcome,
            QueryOutcome::Rows(ResultSet {
                columns: vec!["athlete".to_string()],
                rows: vec![vec![CellValue::Text("bolt".to_string())]],
            })
        );
    }

    #[test]
    fn test_missing_store_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(execute_statement(&dir.path().join("absent.db"), "SELECT 1").is_err());
    }

    #[test]
    fn test_cell_value_serialization() {
        let row = vec![
            CellValue::Null,
            CellValue::Integer(4),
            CellValue::Real(8.25),
            CellValue::Text("USA".to_string()),
            CellValue::Blob(vec![0, 1, 2]),
        ];
        let json = serde_json::to_string(&row).unwrap();
        assert_eq!(json, r#"[null,4,8.25,"USA","[BLOB 3 bytes]"]"#);
    }
}
