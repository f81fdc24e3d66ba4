use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use common::agent::{QueryPipeline, QueryRequest, SqliteAdjuster};
use common::config::{resolve_databases_dir, resolve_listen_addr, LlmConfig};
use common::llm::OpenAiChatClient;
use common::store::{self, QueryOutcome, NO_DATA_NOTICE};
use common::tracing::init_tracing;
use std::io::Write;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use crate::render::format_table;

const DEFAULT_QUESTION: &str = "Who won the most gold medals in 2012?";

#[derive(Parser)]
#[command(name = "askdb")]
#[command(about = "ask questions of sqlite databases in plain language", long_about = None)]
pub struct Cli {
    /// Directory holding the .db files to query
    #[arg(long, global = true, env = "ASKDB_DATABASES_DIR")]
    databases_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Chat-completion endpoint settings
#[derive(Args, Clone)]
struct LlmArgs {
    /// Base url of the openai-compatible endpoint
    #[arg(long, env = "ASKDB_LLM_BASE_URL")]
    base_url: Option<String>,

    /// Model name sent with every request
    #[arg(long, env = "ASKDB_LLM_MODEL")]
    model: Option<String>,

    /// Bearer token for the endpoint
    #[arg(long, env = "ASKDB_LLM_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Sampling temperature
    #[arg(long, env = "ASKDB_LLM_TEMPERATURE")]
    temperature: Option<f32>,
}

impl LlmArgs {
    fn into_config(self) -> LlmConfig {
        LlmConfig::resolve(self.base_url, self.model, self.api_key, self.temperature)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// List the databases that can be queried
    Databases,

    /// Print the schema listing of a database
    Schema {
        /// Database file name, e.g. olympics.db
        #[arg(short, long)]
        database: String,

        /// Print the create table statements instead of the listing
        #[arg(long)]
        ddl: bool,
    },

    /// Print the first rows of every table in a database
    Samples {
        #[arg(short, long)]
        database: String,

        /// Rows per table
        #[arg(long, default_value_t = common::web::DEFAULT_SAMPLE_LIMIT)]
        limit: usize,
    },

    /// Translate a question into sql, run it and print the result
    Ask {
        #[arg(short, long)]
        database: String,

        /// Question in plain language
        #[arg(default_value = DEFAULT_QUESTION)]
        question: String,

        #[command(flatten)]
        llm: LlmArgs,
    },

    /// Serve the web interface
    Serve {
        /// Address to listen on
        #[arg(long, env = "ASKDB_LISTEN_ADDR")]
        addr: Option<SocketAddr>,

        /// Rows shown per table in the samples panel
        #[arg(long, default_value_t = common::web::DEFAULT_SAMPLE_LIMIT)]
        sample_limit: usize,

        #[command(flatten)]
        llm: LlmArgs,
    },

    /// Import a csv file into a database table named after the file
    Import {
        /// Input csv file
        #[arg(long, default_value = "Walmart_sales.csv")]
        csv: PathBuf,

        /// Output database (default: <databases dir>/<csv stem>.db)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

impl Cli {
    pub async fn execute(self) -> Result<()> {
        let _guard = init_tracing("askdb")?;
        let databases_dir = resolve_databases_dir(self.databases_dir);

        match self.command {
            Commands::Databases => list_databases(databases_dir),
            Commands::Schema { database, ddl } => print_schema(databases_dir, database, ddl),
            Commands::Samples { database, limit } => print_samples(databases_dir, database, limit),
            Commands::Ask {
                database,
                question,
                llm,
            } => ask(databases_dir, database, question, llm.into_config()).await,
            Commands::Serve {
                addr,
                sample_limit,
                llm,
            } => serve(databases_dir, addr, sample_limit, llm.into_config()).await,
            Commands::Import { csv, output } => import(databases_dir, csv, output),
        }
    }
}

fn build_pipeline(config: LlmConfig) -> Arc<QueryPipeline> {
    tracing::info!(
        endpoint = %config.base_url,
        model = %config.model,
        "using chat-completion endpoint"
    );
    Arc::new(QueryPipeline::new(
        Arc::new(OpenAiChatClient::new(config)),
        Arc::new(SqliteAdjuster::default()),
    ))
}

fn list_databases(databases_dir: PathBuf) -> Result<()> {
    let databases = store::list_databases(&databases_dir)
        .with_context(|| format!("cannot list {}", databases_dir.display()))?;

    if databases.is_empty() {
        tracing::warn!("no databases found in {}", databases_dir.display());
    }
    for database in databases {
        println!("{}", database.name);
    }
    Ok(())
}

fn print_schema(databases_dir: PathBuf, database: String, ddl: bool) -> Result<()> {
    let handle = store::resolve_database(&databases_dir, &database)?;
    if ddl {
        println!("{}", store::extract_ddl(&handle.path)?);
    } else {
        print!("{}", store::extract_schema(&handle.path)?);
    }
    Ok(())
}

fn print_samples(databases_dir: PathBuf, database: String, limit: usize) -> Result<()> {
    let handle = store::resolve_database(&databases_dir, &database)?;
    for sample in store::table_samples(&handle.path, limit)? {
        println!("Sample from {}", sample.table);
        println!("{}\n", format_table(&sample.sample));
    }
    Ok(())
}

async fn ask(
    databases_dir: PathBuf,
    database: String,
    question: String,
    config: LlmConfig,
) -> Result<()> {
    let handle = store::resolve_database(&databases_dir, &database)?;
    let pipeline = build_pipeline(config);
    let request = QueryRequest::new(handle, question);

    let on_token = |token: &str| {
        let mut stdout = std::io::stdout().lock();
        let _ = stdout.write_all(token.as_bytes());
        let _ = stdout.flush();
    };

    println!("-- SQL Query");
    let submission = pipeline.submit(&request, &on_token).await?;
    println!();

    if submission.statement != submission.generated.trim() {
        println!("-- Executed\n{}", submission.statement);
    }
    println!();

    match submission.outcome {
        QueryOutcome::Rows(result) => println!("{}", format_table(&result)),
        QueryOutcome::Empty => println!("{}", NO_DATA_NOTICE),
        QueryOutcome::Failed(message) => {
            eprintln!("Error executing SQL query: {}", message);
        }
    }

    Ok(())
}

async fn serve(
    databases_dir: PathBuf,
    addr: Option<SocketAddr>,
    sample_limit: usize,
    config: LlmConfig,
) -> Result<()> {
    use common::web::AppState;

    let state = Arc::new(AppState {
        databases_dir,
        pipeline: build_pipeline(config),
        sample_limit,
    });
    common::web::serve(resolve_listen_addr(addr), state).await?;
    Ok(())
}

fn import(databases_dir: PathBuf, csv: PathBuf, output: Option<PathBuf>) -> Result<()> {
    let output = match output {
        Some(path) => path,
        None => {
            let stem = common::import::table_name_for(&csv)?;
            databases_dir.join(format!("{}.{}", stem, store::DATABASE_EXTENSION))
        }
    };

    let report = common::import::import_csv(&csv, &output)
        .with_context(|| format!("importing {}", csv.display()))?;

    tracing::info!(
        table = %report.table,
        rows = report.rows,
        output = %report.database.display(),
        "import complete"
    );
    for (name, ty) in &report.columns {
        println!("{:<32} {}", name, ty);
    }
    println!(
        "{} rows written to table {} in {}",
        report.rows,
        report.table,
        report.database.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_ask_defaults() {
        let cli = Cli::try_parse_from(["askdb", "ask", "--database", "olympics.db"]).unwrap();
        match cli.command {
            Commands::Ask { database, question, .. } => {
                assert_eq!(database, "olympics.db");
                assert_eq!(question, DEFAULT_QUESTION);
            }
            _ => panic!("expected ask"),
        }
    }

    #[test]
    fn test_parse_import_defaults() {
        let cli = Cli::try_parse_from(["askdb", "import"]).unwrap();
        match cli.command {
            Commands::Import { csv, output } => {
                assert_eq!(csv, PathBuf::from("Walmart_sales.csv"));
                assert!(output.is_none());
            }
            _ => panic!("expected import"),
        }
    }

    #[test]
    fn test_import_writes_into_databases_dir() {
        let dir = tempfile::tempdir().unwrap();
        let csv = dir.path().join("sales.csv");
        std::fs::write(&csv, "store,amount\n1,10.5\n2,3\n").unwrap();
        let databases = dir.path().join("databases");

        import(databases.clone(), csv, None).unwrap();

        let listed = store::list_databases(&databases).unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].name, "sales.db");
    }
}
