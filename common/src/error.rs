use thiserror::Error;

#[derive(Error, Debug)]
pub enum AskDbError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("sqlite error: {0}")]
    Store(#[from] rusqlite::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("generation failed: {0}")]
    Llm(String),

    #[error("unknown database: {0}")]
    UnknownDatabase(String),

    #[error("csv import failed: {0}")]
    Import(String),

    #[error("tracing initialization failed: {0}")]
    Tracing(String),
}

pub type Result<T> = std::result::Result<T, AskDbError>;
