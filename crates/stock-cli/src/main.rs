//! `stock-dash`: terminal front-end for the sneaker stock dashboard

mod config;
mod output;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::io::Write as _;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use stock_dataset::{DataSource, Dataset, DatasetCache, QuickFilter};
use stock_query::{InterpretationMode, OpenAiClient, QueryEngine};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::DashboardConfig;

/// Sneaker stock dashboard
#[derive(Parser, Debug)]
#[command(name = "stock-dash", version, about, long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// CSV or Excel path, or URL, of the stock sheet
    #[arg(short, long, global = true)]
    source: Option<String>,

    /// Seconds a loaded sheet is served before it is read again
    #[arg(long, global = true, value_name = "SECS")]
    ttl: Option<u64>,

    /// Interpretation mode for questions: basic or advanced
    #[arg(short, long, global = true)]
    mode: Option<InterpretationMode>,

    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log as JSON
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Headline numbers: total pairs, in stock, sold, net profit
    Summary,

    /// Stock table narrowed by quick filters
    Table(TableArgs),

    /// Answer one question
    Ask {
        /// Question in Spanish
        #[arg(required = true)]
        question: Vec<String>,
    },

    /// Answer questions read from standard input, one per line
    Shell,
}

impl Cli {
    /// Command-line layer on top of file and environment settings
    fn apply(&self, mut config: DashboardConfig) -> DashboardConfig {
        if let Some(source) = &self.source {
            config = config.with_data_source(source.as_str());
        }
        if let Some(secs) = self.ttl {
            config = config.with_cache_ttl(Duration::from_secs(secs));
        }
        if let Some(mode) = self.mode {
            config = config.with_mode(mode);
        }
        config
    }
}

#[derive(Args, Debug, Default)]
struct TableArgs {
    /// Model name
    #[arg(long)]
    model: Option<String>,

    /// Size; repeat for several
    #[arg(long = "size")]
    sizes: Vec<i64>,

    /// Status label (En stock, Vendido)
    #[arg(long)]
    status: Option<String>,

    /// Seller name
    #[arg(long)]
    seller: Option<String>,

    /// List the values each filter accepts
    #[arg(long)]
    options: bool,
}

impl TableArgs {
    fn quick_filter(&self) -> QuickFilter {
        QuickFilter {
            model: self.model.clone(),
            sizes: self.sizes.clone(),
            status: self.status.clone(),
            seller: self.seller.clone(),
        }
    }
}

/// Session state shared by every command
struct Dashboard {
    source: DataSource,
    cache: DatasetCache,
    engine: QueryEngine<OpenAiClient>,
    mode: InterpretationMode,
}

impl Dashboard {
    fn new(config: &DashboardConfig) -> Result<Self> {
        let client = OpenAiClient::new(config.openai_api_key.clone())
            .with_base_url(config.openai_base_url.as_str())
            .with_model(config.openai_model.as_str());

        Ok(Self {
            source: config.source()?,
            cache: DatasetCache::new(config.cache_ttl()),
            engine: QueryEngine::new(client),
            mode: config.mode,
        })
    }

    async fn dataset(&self) -> Result<Arc<Dataset>> {
        self.cache
            .load(&self.source)
            .await
            .with_context(|| format!("failed to load stock sheet from {}", self.source))
    }

    async fn ask(&self, question: &str, mode: InterpretationMode) -> Result<String> {
        let dataset = self.dataset().await?;
        let answer = self.engine.answer(&dataset, question, mode).await;
        Ok(output::render_answer(&answer))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.json_logs);

    let config = cli.apply(
        DashboardConfig::load(cli.config.as_deref())
            .context("failed to load configuration")?
            .with_env(),
    );

    let dashboard = Dashboard::new(&config)?;
    tracing::debug!(
        source = %dashboard.source,
        ttl = ?config.cache_ttl(),
        mode = ?dashboard.mode,
        "dashboard ready"
    );

    match cli.command {
        Command::Summary => {
            let dataset = dashboard.dataset().await?;
            print!("{}", output::render_summary(&dataset.summary()));
        }
        Command::Table(args) => {
            let dataset = dashboard.dataset().await?;
            if args.options {
                print!("{}", output::render_options(&dataset));
            } else {
                let subset = dataset.filter(&args.quick_filter().to_predicates());
                print!("{}", output::render_records(&subset));
            }
        }
        Command::Ask { question } => {
            let question = question.join(" ");
            print!("{}", dashboard.ask(&question, dashboard.mode).await?);
        }
        Command::Shell => {
            run_shell(&dashboard, dashboard.mode).await?;
        }
    }

    Ok(())
}

async fn run_shell(dashboard: &Dashboard, mode: InterpretationMode) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    prompt();
    while let Some(line) = lines.next_line().await? {
        let question = line.trim();
        if matches!(question, "salir" | "exit" | "quit") {
            break;
        }
        if !question.is_empty() {
            // The sheet is re-read through the cache for every question.
            match dashboard.ask(question, mode).await {
                Ok(text) => print!("{text}"),
                Err(err) => eprintln!("error: {err:#}"),
            }
        }
        prompt();
    }

    Ok(())
}

fn prompt() {
    print!("> ");
    let _ = std::io::stdout().flush();
}

fn init_tracing(verbose: bool, json: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use stock_test_utils::SAMPLE_CSV;

    fn sheet() -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE_CSV.as_bytes()).unwrap();
        file
    }

    #[test]
    fn parses_table_filters() {
        let cli = Cli::parse_from([
            "stock-dash", "table", "--model", "Roja", "--size", "36", "--size", "44",
        ]);
        let Command::Table(args) = cli.command else {
            panic!("expected table command");
        };
        let filter = args.quick_filter();
        assert_eq!(filter.model.as_deref(), Some("Roja"));
        assert_eq!(filter.sizes, vec![36, 44]);
    }

    #[test]
    fn parses_ask_with_mode() {
        let cli = Cli::parse_from([
            "stock-dash", "--source", "stock.csv", "ask", "-m", "avanzado", "cuántas", "rojas",
        ]);
        assert_eq!(cli.mode, Some(InterpretationMode::Advanced));
        let Command::Ask { question } = cli.command else {
            panic!("expected ask command");
        };
        assert_eq!(question.join(" "), "cuántas rojas");
        assert_eq!(cli.source.as_deref(), Some("stock.csv"));
    }

    #[test]
    fn rejects_unknown_mode() {
        let parsed = Cli::try_parse_from(["stock-dash", "ask", "--mode", "magic", "hola"]);
        assert!(parsed.is_err());
    }

    #[test]
    fn flags_override_config_layers() {
        let cli = Cli::parse_from([
            "stock-dash", "shell", "--ttl", "5", "--mode", "advanced", "-s", "otro.csv",
        ]);
        let base = DashboardConfig::default().with_data_source("stock.csv");
        let config = cli.apply(base);

        assert_eq!(config.cache_ttl(), Duration::from_secs(5));
        assert_eq!(config.mode, InterpretationMode::Advanced);
        assert_eq!(config.data_source.as_deref(), Some("otro.csv"));
        assert_eq!(Dashboard::new(&config).unwrap().mode, InterpretationMode::Advanced);
    }

    #[test]
    fn absent_flags_keep_config() {
        let cli = Cli::parse_from(["stock-dash", "summary"]);
        let base = DashboardConfig::default().with_data_source("stock.csv");
        assert_eq!(cli.apply(base.clone()), base);
    }

    #[tokio::test]
    async fn asks_against_file_sheet() {
        let file = sheet();
        let config = DashboardConfig::default().with_data_source(file.path().to_string_lossy());
        let dashboard = Dashboard::new(&config).unwrap();

        let text = dashboard
            .ask("¿Cuántas blancas 41 me quedan?", InterpretationMode::Basic)
            .await
            .unwrap();
        assert_eq!(text, "Coincidencias: 2 par(es). Ganancia acumulada: $ 0.\n");
    }

    #[tokio::test]
    async fn advanced_without_key_reports_configuration() {
        let file = sheet();
        let config = DashboardConfig::default().with_data_source(file.path().to_string_lossy());
        let dashboard = Dashboard::new(&config).unwrap();

        let text = dashboard
            .ask("ganancia de enzo", InterpretationMode::Advanced)
            .await
            .unwrap();
        assert_eq!(text, "Falta OPENAI_API_KEY en la configuración.\n");
    }

    #[tokio::test]
    async fn missing_sheet_is_an_error() {
        let config = DashboardConfig::default().with_data_source("/nonexistent/stock.csv");
        let dashboard = Dashboard::new(&config).unwrap();
        let err = dashboard.dataset().await.unwrap_err();
        assert!(format!("{err:#}").contains("/nonexistent/stock.csv"));
    }
}
