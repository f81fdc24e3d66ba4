use crate::agent::dialect::DialectAdjuster;
use crate::agent::parser::extract_statement;
use crate::agent::prompt::build_sql_prompt;
use crate::error::Result;
use crate::llm::{CompletionClient, Message, TokenSink};
use crate::store::{execute_statement, extract_schema, run_blocking, DatabaseHandle, QueryOutcome};
use std::sync::Arc;

/// everything one submission needs: which database, and what to ask it
#[derive(Debug, Clone)]
pub struct QueryRequest {
    pub database: DatabaseHandle,
    pub question: String,
}

impl QueryRequest {
    pub fn new(database: DatabaseHandle, question: impl Into<String>) -> Self {
        Self {
            database,
            question: question.into(),
        }
    }
}

/// what a submission produced at each stage
#[derive(Debug, Clone)]
pub struct Submission {
    /// raw text streamed by the model
    pub generated: String,
    /// extracted and dialect-adjusted statement that was executed
    pub statement: String,
    pub outcome: QueryOutcome,
}

pub struct QueryPipeline {
    client: Arc<dyn CompletionClient>,
    adjuster: Arc<dyn DialectAdjuster>,
}

impl QueryPipeline {
    pub fn new(client: Arc<dyn CompletionClient>, adjuster: Arc<dyn DialectAdjuster>) -> Self {
        Self { client, adjuster }
    }

    /// schema → prompt → streamed generation → adjustment → execution
    #[tracing::instrument(
        skip(self, request, on_token),
        fields(db = %request.database.name, llm = self.client.name(), adjuster = self.adjuster.name())
    )]
    pub async fn submit(&self, request: &QueryRequest, on_token: TokenSink<'_>) -> Result<Submission> {
        let path = request.database.path.clone();
        let schema = run_blocking(move || extract_schema(&path)).await?;
        tracing::info!(tables = schema.tables.len(), "schema loaded");

        let prompt = build_sql_prompt(&request.question, &schema.to_string());

        tracing::info!("generating sql");
        let generated = self
            .client
            .stream_completion(vec![Message::user(prompt)], on_token)
            .await?;

        let statement = self.adjuster.adjust(&extract_statement(&generated));
        tracing::info!(statement = %statement, "executing statement");

        let path = request.database.path.clone();
        let sql = statement.clone();
        let outcome = run_blocking(move || execute_statement(&path, &sql)).await?;

        match &outcome {
            QueryOutcome::Rows(result) => tracing::info!(rows = result.rows.len(), "query answered"),
            QueryOutcome::Empty => tracing::info!("query returned no data"),
            QueryOutcome::Failed(message) => tracing::warn!("query failed: {}", message),
        }

        Ok(Submission {
            generated,
            statement,
            outcome,
        })
    }
}
