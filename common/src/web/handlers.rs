use super::AppState;
use crate::agent::{QueryRequest, Submission};
use crate::error::AskDbError;
use crate::store::{
    self, resolve_database, run_blocking, DatabaseHandle, QueryOutcome, ResultSet, SchemaListing,
    TableSample, NO_DATA_NOTICE,
};
use axum::{
    extract::{Extension, Json, Path, Query},
    http::StatusCode,
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Response,
    },
};
use futures::stream::{Stream, StreamExt};
use serde::Deserialize;
use std::convert::Infallible;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;

/// error body returned by the json endpoints
pub struct ApiError(AskDbError);

impl From<AskDbError> for ApiError {
    fn from(e: AskDbError) -> Self {
        ApiError(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            AskDbError::UnknownDatabase(_) => StatusCode::NOT_FOUND,
            AskDbError::Io(e) if e.kind() == std::io::ErrorKind::NotFound => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = serde_json::json!({ "error": self.0.to_string() });
        (status, Json(body)).into_response()
    }
}

pub async fn list_databases(
    Extension(state): Extension<Arc<AppState>>,
) -> Result<Json<Vec<DatabaseHandle>>, ApiError> {
    let dir = state.databases_dir.clone();
    let databases = run_blocking(move || store::list_databases(&dir)).await?;
    Ok(Json(databases))
}

pub async fn get_schema(
    Path(name): Path<String>,
    Extension(state): Extension<Arc<AppState>>,
) -> Result<Json<SchemaListing>, ApiError> {
    let database = resolve_database(&state.databases_dir, &name)?;
    let listing = run_blocking(move || store::extract_schema(&database.path)).await?;
    Ok(Json(listing))
}

#[derive(Debug, Deserialize)]
pub struct SampleParams {
    pub limit: Option<usize>,
}

pub async fn get_samples(
    Path(name): Path<String>,
    Query(params): Query<SampleParams>,
    Extension(state): Extension<Arc<AppState>>,
) -> Result<Json<Vec<TableSample>>, ApiError> {
    let database = resolve_database(&state.databases_dir, &name)?;
    let limit = params.limit.unwrap_or(state.sample_limit);
    let samples = run_blocking(move || store::table_samples(&database.path, limit)).await?;
    Ok(Json(samples))
}

#[derive(Debug, Deserialize)]
pub struct QueryBody {
    pub database: String,
    pub question: String,
}

/// one server-sent event of a query stream
#[derive(Debug, Clone)]
pub enum QueryEvent {
    Token(String),
    Statement(String),
    Rows(ResultSet),
    Empty,
    Error(String),
    Done,
}

impl QueryEvent {
    pub fn name(&self) -> &'static str {
        match self {
            QueryEvent::Token(_) => "token",
            QueryEvent::Statement(_) => "statement",
            QueryEvent::Rows(_) => "rows",
            QueryEvent::Empty => "empty",
            QueryEvent::Error(_) => "error",
            QueryEvent::Done => "done",
        }
    }

    /// events that close out a finished submission
    pub fn from_submission(submission: Submission) -> Vec<QueryEvent> {
        let result = match submission.outcome {
            QueryOutcome::Rows(rows) => QueryEvent::Rows(rows),
            QueryOutcome::Empty => QueryEvent::Empty,
            QueryOutcome::Failed(message) => {
                QueryEvent::Error(format!("Error executing SQL query: {}", message))
            }
        };
        vec![QueryEvent::Statement(submission.statement), result]
    }

    pub fn into_event(self) -> Event {
        let event = Event::default().event(self.name());
        let built = match self {
            QueryEvent::Token(text) | QueryEvent::Statement(text) | QueryEvent::Error(text) => {
                event.json_data(text)
            }
            QueryEvent::Rows(rows) => event.json_data(rows),
            QueryEvent::Empty => event.json_data(NO_DATA_NOTICE),
            QueryEvent::Done => Ok(event.data("")),
        };

        built.unwrap_or_else(|e| {
            Event::default()
                .event("error")
                .data(format!("cannot encode event: {}", e))
        })
    }
}

/// run one submission and stream its progress as server-sent events
pub async fn submit_query(
    Extension(state): Extension<Arc<AppState>>,
    Json(body): Json<QueryBody>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, ApiError> {
    let database = resolve_database(&state.databases_dir, &body.database)?;
    let request = QueryRequest::new(database, body.question);

    let (tx, rx) = mpsc::unbounded_channel();
    let pipeline = Arc::clone(&state.pipeline);

    tokio::spawn(async move {
        let token_tx = tx.clone();
        let on_token = move |token: &str| {
            let _ = token_tx.send(QueryEvent::Token(token.to_string()));
        };

        let events = match pipeline.submit(&request, &on_token).await {
            Ok(submission) => QueryEvent::from_submission(submission),
            Err(e) => {
                tracing::error!("submission failed: {}", e);
                vec![QueryEvent::Error(e.to_string())]
            }
        };

        for event in events {
            let _ = tx.send(event);
        }
        let _ = tx.send(QueryEvent::Done);
    });

    let stream = UnboundedReceiverStream::new(rx).map(|event| Ok(event.into_event()));
    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}
