//! Textual dialect adjustment for generated statements.
//!
//! Adjusters do not parse sql. They rewrite text so that statements written
//! for other dialects have a better chance of running on the target store.

/// rewrites a generated statement for the target store
pub trait DialectAdjuster: Send + Sync {
    fn name(&self) -> &str;

    fn adjust(&self, sql: &str) -> String;
}

/// literal substitutions applied in order, for sqlite targets
#[derive(Debug, Clone)]
pub struct SqliteAdjuster {
    substitutions: Vec<(&'static str, &'static str)>,
}

impl Default for SqliteAdjuster {
    fn default() -> Self {
        Self {
            substitutions: vec![("ILIKE", "LIKE"), ("TRUE", "1"), ("FALSE", "0")],
        }
    }
}

impl DialectAdjuster for SqliteAdjuster {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn adjust(&self, sql: &str) -> String {
        let adjusted = self
            .substitutions
            .iter()
            .fold(sql.to_string(), |acc, (from, to)| acc.replace(from, to));

        if adjusted != sql {
            tracing::debug!(adjuster = self.name(), "statement adjusted");
        }
        adjusted
    }
}
