//! Web presentation layer.
//!
//! Serves a single page with a database selector, per-table samples and a
//! question form, plus the JSON and server-sent-event endpoints it talks to:
//!
//! - `GET  /`                              page
//! - `GET  /api/databases`                 available databases
//! - `GET  /api/databases/:name/schema`    schema listing
//! - `GET  /api/databases/:name/samples`   first rows of every table
//! - `POST /api/query`                     streamed generation and result

pub mod handlers;
pub mod page;

use crate::agent::QueryPipeline;
use crate::error::Result;
use axum::{
    routing::{get, post},
    Extension, Router,
};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;

pub const DEFAULT_SAMPLE_LIMIT: usize = 100;

/// shared, read-only state; nothing here changes between requests
pub struct AppState {
    pub databases_dir: PathBuf,
    pub pipeline: Arc<QueryPipeline>,
    pub sample_limit: usize,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(page::index))
        .route("/api/databases", get(handlers::list_databases))
        .route("/api/databases/:name/schema", get(handlers::get_schema))
        .route("/api/databases/:name/samples", get(handlers::get_samples))
        .route("/api/query", post(handlers::submit_query))
        .layer(Extension(state))
}

pub async fn serve(addr: SocketAddr, state: Arc<AppState>) -> Result<()> {
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("askdb listening on http://{}", listener.local_addr()?);
    tracing::info!("serving databases from {}", state.databases_dir.display());

    axum::serve(listener, router(state)).await?;
    Ok(())
}
