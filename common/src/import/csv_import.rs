use super::inference::{infer_column_types, ColumnType};
use crate::error::{AskDbError, Result};
use crate::store::quote_ident;
use rusqlite::{params_from_iter, Connection};
use serde::Serialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImportReport {
    pub table: String,
    pub database: PathBuf,
    pub columns: Vec<(String, ColumnType)>,
    pub rows: usize,
}

/// table name derived from the csv file name
pub fn table_name_for(csv_path: &Path) -> Result<String> {
    csv_path
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .ok_or_else(|| {
            AskDbError::Import(format!("cannot derive a table name from {}", csv_path.display()))
        })
}

/// make repeated header names unique by suffixing `.1`, `.2`, ...
fn dedupe_headers(headers: &csv::StringRecord) -> Vec<String> {
    let mut seen = HashSet::new();
    headers
        .iter()
        .map(|h| {
            let mut name = h.to_string();
            let mut n = 1;
            while !seen.insert(name.clone()) {
                name = format!("{}.{}", h, n);
                n += 1;
            }
            name
        })
        .collect()
}

/// load `csv_path` into a table named after the file, replacing any previous copy
#[tracing::instrument(skip(csv_path, db_path), fields(csv = %csv_path.display(), db = %db_path.display()))]
pub fn import_csv(csv_path: &Path, db_path: &Path) -> Result<ImportReport> {
    let table = table_name_for(csv_path)?;

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(csv_path)?;

    let headers = reader.headers()?.clone();
    if headers.is_empty() || headers.iter().all(|h| h.is_empty()) {
        return Err(AskDbError::Import(format!(
            "{} has no header row",
            csv_path.display()
        )));
    }
    let names = dedupe_headers(&headers);

    let mut records: Vec<Vec<String>> = Vec::new();
    for record in reader.records() {
        records.push(record?.iter().map(str::to_string).collect());
    }
    tracing::info!(columns = names.len(), rows = records.len(), "csv loaded");

    let types = infer_column_types(names.len(), &records);

    if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let mut conn = Connection::open(db_path)?;
    let tx = conn.transaction()?;

    let quoted_table = quote_ident(&table);
    let column_defs: Vec<String> = names
        .iter()
        .zip(&types)
        .map(|(name, ty)| format!("{} {}", quote_ident(name), ty.as_sql()))
        .collect();

    tx.execute_batch(&format!(
        "DROP TABLE IF EXISTS {table}; CREATE TABLE {table} ({columns});",
        table = quoted_table,
        columns = column_defs.join(", ")
    ))?;

    {
        let placeholders = vec!["?"; names.len()].join(", ");
        let mut insert = tx.prepare(&format!(
            "INSERT INTO {} VALUES ({})",
            quoted_table, placeholders
        ))?;

        for record in &records {
            let values = types
                .iter()
                .enumerate()
                .map(|(idx, ty)| ty.to_value(record.get(idx).map(String::as_str).unwrap_or("")));
            insert.execute(params_from_iter(values))?;
        }
    }

    tx.commit()?;

    tracing::info!(table = %table, rows = records.len(), "csv imported");

    Ok(ImportReport {
        table,
        database: db_path.to_path_buf(),
        columns: names.into_iter().zip(types).collect(),
        rows: records.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{execute_statement, extract_ddl, extract_schema, CellValue, QueryOutcome};

    fn write_csv(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_import_round_trips_rows_and_columns() {
        let dir = tempfile::tempdir().unwrap();
        let csv = write_csv(dir.path(), "points.csv", "x,y\n1,a\n2,b\n3,c\n4,d\n");
        let db = dir.path().join("points.db");

        let report = import_csv(&csv, &db).unwrap();
        assert_eq!(report.table, "points");
        assert_eq!(report.rows, 4);

        let listing = extract_schema(&db).unwrap();
        assert_eq!(listing.tables[0].name, "points");
        assert_eq!(listing.tables[0].columns, vec!["x", "y"]);

        let QueryOutcome::Rows(result) =
            execute_statement(&db, "SELECT COUNT(*) AS n FROM points").unwrap()
        else {
            panic!("expected rows");
        };
        assert_eq!(result.rows, vec![vec![CellValue::Integer(4)]]);
    }

    #[test]
    fn test_import_infers_types_and_nulls() {
        let dir = tempfile::tempdir().unwrap();
        let csv = write_csv(
            dir.path(),
            "Walmart_sales.csv",
            "Store,Date,Weekly_Sales,Holiday_Flag\n\
             1,05-02-2010,1643690.9,0\n\
             1,12-02-2010,,1\n",
        );
        let db = dir.path().join("Walmart_sales.db");

        let report = import_csv(&csv, &db).unwrap();
        assert_eq!(
            report.columns,
            vec![
                ("Store".to_string(), ColumnType::Integer),
                ("Date".to_string(), ColumnType::Text),
                ("Weekly_Sales".to_string(), ColumnType::Real),
                ("Holiday_Flag".to_string(), ColumnType::Integer),
            ]
        );

        let QueryOutcome::Rows(result) = execute_statement(
            &db,
            "SELECT Weekly_Sales, typeof(Store) FROM Walmart_sales ORDER BY Date",
        )
        .unwrap() else {
            panic!("expected rows");
        };
        assert_eq!(result.rows[0], vec![CellValue::Real(1643690.9), CellValue::Text("integer".to_string())]);
        assert_eq!(result.rows[1][0], CellValue::Null);
    }

    fn count(db: &Path, sql: &str) -> CellValue {
        let QueryOutcome::Rows(result) = execute_statement(db, sql).unwrap() else {
            panic!("expected rows for {}", sql);
        };
        result.rows[0][0].clone()
    }

    #[test]
    fn test_import_booleans_and_missing_markers() {
        let dir = tempfile::tempdir().unwrap();
        let csv = write_csv(dir.path(), "stats.csv", "n,flag\n10,True\nNA,False\n3,True\n");
        let db = dir.path().join("stats.db");

        let report = import_csv(&csv, &db).unwrap();
        assert_eq!(
            report.columns,
            vec![
                ("n".to_string(), ColumnType::Integer),
                ("flag".to_string(), ColumnType::Boolean),
            ]
        );

        assert_eq!(count(&db, "SELECT COUNT(*) FROM stats WHERE flag = 1"), CellValue::Integer(2));
        assert_eq!(count(&db, "SELECT COUNT(*) FROM stats WHERE n > 5"), CellValue::Integer(1));
        assert_eq!(count(&db, "SELECT COUNT(*) FROM stats WHERE n IS NULL"), CellValue::Integer(1));

        assert!(extract_ddl(&db).unwrap().contains("\"flag\" INTEGER"));
    }

    #[test]
    fn test_import_replaces_existing_table() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("points.db");

        let first = write_csv(dir.path(), "points.csv", "x,y\n1,2\n3,4\n");
        import_csv(&first, &db).unwrap();

        std::fs::write(&first, "x,z\n9,9\n").unwrap();
        let report = import_csv(&first, &db).unwrap();
        assert_eq!(report.rows, 1);

        let listing = extract_schema(&db).unwrap();
        assert_eq!(listing.tables.len(), 1);
        assert_eq!(listing.tables[0].columns, vec!["x", "z"]);
    }

    #[test]
    fn test_import_dedupes_headers() {
        let dir = tempfile::tempdir().unwrap();
        let csv = write_csv(dir.path(), "dups.csv", "a,a,b,a\n1,2,3,4\n");
        let report = import_csv(&csv, &dir.path().join("dups.db")).unwrap();

        let names: Vec<&str> = report.columns.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["a", "a.1", "b", "a.2"]);
    }

    #[test]
    fn test_import_empty_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let csv = write_csv(dir.path(), "empty.csv", "");
        let result = import_csv(&csv, &dir.path().join("empty.db"));
        assert!(matches!(result, Err(AskDbError::Import(_))));
    }

    #[test]
    fn test_import_ragged_rows_fail() {
        let dir = tempfile::tempdir().unwrap();
        let csv = write_csv(dir.path(), "ragged.csv", "x,y\n1,2\n3\n");
        let result = import_csv(&csv, &dir.path().join("ragged.db"));
        assert!(matches!(result, Err(AskDbError::Csv(_))));
    }

    #[test]
    fn test_import_missing_csv_fails() {
        let dir = tempfile::tempdir().unwrap();
        let result = import_csv(&dir.path().join("absent.csv"), &dir.path().join("absent.db"));
        assert!(result.is_err());
        assert!(!dir.path().join("absent.db").exists());
    }
}
