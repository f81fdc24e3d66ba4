pub mod error;
pub mod config;
pub mod store;
pub mod llm;
pub mod agent;
pub mod import;
pub mod web;
pub mod tracing;

pub use error::{AskDbError, Result};
