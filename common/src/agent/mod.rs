pub mod prompt;
pub mod parser;
pub mod dialect;
pub mod pipeline;

pub use dialect::{DialectAdjuster, SqliteAdjuster};
pub use parser::extract_statement;
pub use pipeline::{QueryPipeline, QueryRequest, Submission};
pub use prompt::build_sql_prompt;
