use rusqlite::types::Value;
use serde::Serialize;
use std::fmt;

/// cells read as missing, matching the usual csv null spellings
const MISSING_TOKENS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

fn is_missing(cell: &str) -> bool {
    MISSING_TOKENS.contains(&cell)
}

fn parse_bool(cell: &str) -> Option<bool> {
    match cell.trim() {
        "True" | "TRUE" | "true" => Some(true),
        "False" | "FALSE" | "false" => Some(false),
        _ => None,
    }
}

/// storage type chosen for an imported column
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum ColumnType {
    /// stored as 0/1 in an integer column
    Boolean,
    Integer,
    Real,
    Text,
}

impl ColumnType {
    pub fn as_sql(&self) -> &'static str {
        match self {
            ColumnType::Boolean | ColumnType::Integer => "INTEGER",
            ColumnType::Real => "REAL",
            ColumnType::Text => "TEXT",
        }
    }

    /// convert a raw cell; missing cells become null
    pub fn to_value(&self, cell: &str) -> Value {
        if is_missing(cell) {
            return Value::Null;
        }

        match self {
            ColumnType::Boolean => parse_bool(cell)
                .map(|b| Value::Integer(i64::from(b)))
                .unwrap_or_else(|| Value::Text(cell.to_string())),
            ColumnType::Integer => cell
                .trim()
                .parse::<i64>()
                .map(Value::Integer)
                .unwrap_or_else(|_| Value::Text(cell.to_string())),
            ColumnType::Real => cell
                .trim()
                .parse::<f64>()
                .map(Value::Real)
                .unwrap_or_else(|_| Value::Text(cell.to_string())),
            ColumnType::Text => Value::Text(cell.to_string()),
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnType::Boolean => f.write_str("INTEGER (boolean)"),
            other => f.write_str(other.as_sql()),
        }
    }
}

/// type of a single present cell; `None` for missing cells
fn infer_cell(cell: &str) -> Option<ColumnType> {
    let trimmed = cell.trim();
    if is_missing(cell) {
        None
    } else if parse_bool(cell).is_some() {
        Some(ColumnType::Boolean)
    } else if trimmed.parse::<i64>().is_ok() {
        Some(ColumnType::Integer)
    } else if trimmed.parse::<f64>().map(|f| f.is_finite()).unwrap_or(false) {
        Some(ColumnType::Real)
    } else {
        Some(ColumnType::Text)
    }
}

/// widen two observations: integer < real < text, missing merges with anything.
/// booleans only stay boolean alongside other booleans.
fn merge_types(lhs: Option<ColumnType>, rhs: Option<ColumnType>) -> Option<ColumnType> {
    match (lhs, rhs) {
        (Some(ColumnType::Boolean), Some(ColumnType::Boolean)) => Some(ColumnType::Boolean),
        (Some(ColumnType::Boolean), Some(_)) | (Some(_), Some(ColumnType::Boolean)) => {
            Some(ColumnType::Text)
        }
        (Some(l), Some(r)) => Some(l.max(r)),
        (l, r) => l.or(r),
    }
}

/// one type per column; columns without any value fall back to text
pub fn infer_column_types<R: AsRef<[String]>>(width: usize, rows: &[R]) -> Vec<ColumnType> {
    let mut observed: Vec<Option<ColumnType>> = vec![None; width];

    for row in rows {
        for (idx, cell) in row.as_ref().iter().enumerate().take(width) {
            observed[idx] = merge_types(observed[idx], infer_cell(cell));
        }
    }

    observed
        .into_iter()
        .map(|t| t.unwrap_or(ColumnType::Text))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(data: &[&[&str]]) -> Vec<Vec<String>> {
        data.iter()
            .map(|r| r.iter().map(|c| c.to_string()).collect())
            .collect()
    }

    #[test]
    fn test_infer_cell() {
        assert_eq!(infer_cell(""), None);
        assert_eq!(infer_cell("42"), Some(ColumnType::Integer));
        assert_eq!(infer_cell(" 42 "), Some(ColumnType::Integer));
        assert_eq!(infer_cell("  "), Some(ColumnType::Text));
        assert_eq!(infer_cell("-7"), Some(ColumnType::Integer));
        assert_eq!(infer_cell("1643690.9"), Some(ColumnType::Real));
        assert_eq!(infer_cell("1e3"), Some(ColumnType::Real));
        assert_eq!(infer_cell("05-02-2010"), Some(ColumnType::Text));
        assert_eq!(infer_cell("inf"), Some(ColumnType::Text));
        assert_eq!(infer_cell("NA"), None);
        assert_eq!(infer_cell("NULL"), None);
        assert_eq!(infer_cell("nan"), None);
        assert_eq!(infer_cell("True"), Some(ColumnType::Boolean));
        assert_eq!(infer_cell("false"), Some(ColumnType::Boolean));
    }

    #[test]
    fn test_merge_types() {
        assert_eq!(
            merge_types(Some(ColumnType::Integer), Some(ColumnType::Real)),
            Some(ColumnType::Real)
        );
        assert_eq!(
            merge_types(Some(ColumnType::Real), Some(ColumnType::Text)),
            Some(ColumnType::Text)
        );
        assert_eq!(merge_types(None, Some(ColumnType::Integer)), Some(ColumnType::Integer));
        assert_eq!(merge_types(None, None), None);
        assert_eq!(
            merge_types(Some(ColumnType::Boolean), Some(ColumnType::Boolean)),
            Some(ColumnType::Boolean)
        );
        assert_eq!(
            merge_types(Some(ColumnType::Boolean), Some(ColumnType::Integer)),
            Some(ColumnType::Text)
        );
        assert_eq!(
            merge_types(Some(ColumnType::Real), Some(ColumnType::Boolean)),
            Some(ColumnType::Text)
        );
    }

    #[test]
    fn test_missing_tokens_keep_numeric_columns() {
        let data = rows(&[&["10", "True"], &["NA", "False"], &["3", "N/A"]]);
        assert_eq!(
            infer_column_types(2, &data),
            vec![ColumnType::Integer, ColumnType::Boolean]
        );
    }

    #[test]
    fn test_infer_column_types() {
        let data = rows(&[
            &["1", "05-02-2010", "1643690.90", "0", ""],
            &["2", "12-02-2010", "1641957", "1", ""],
            &["3", "", "", "", ""],
        ]);

        let types = infer_column_types(5, &data);
        assert_eq!(
            types,
            vec![
                ColumnType::Integer,
                ColumnType::Text,
                ColumnType::Real,
                ColumnType::Integer,
                ColumnType::Text,
            ]
        );
    }

    #[test]
    fn test_to_value() {
        assert_eq!(ColumnType::Integer.to_value("12"), Value::Integer(12));
        assert_eq!(ColumnType::Real.to_value("12"), Value::Real(12.0));
        assert_eq!(ColumnType::Text.to_value(" x "), Value::Text(" x ".to_string()));
        assert_eq!(ColumnType::Real.to_value(""), Value::Null);
        assert_eq!(ColumnType::Integer.to_value("NA"), Value::Null);
        assert_eq!(ColumnType::Text.to_value("NULL"), Value::Null);
        assert_eq!(ColumnType::Boolean.to_value("True"), Value::Integer(1));
        assert_eq!(ColumnType::Boolean.to_value("False"), Value::Integer(0));
        assert_eq!(ColumnType::Boolean.as_sql(), "INTEGER");
    }
}
