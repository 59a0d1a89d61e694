use anyhow::{Context, Result};
use clap::Parser;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tabview::config::Config;
use tabview::data::loaders::{open_source, InputFormat};
use tabview::data::{IndexedTable, Record, TableHandle};
use tabview::search_filter::MatchMode;
use tabview::ui::{CrosstermKeys, TableView, TerminalSurface, ViewOptions};
use tracing::info;

/// Browse and search structured records in the terminal.
///
/// Type to filter, arrow keys to move, Enter prints the selected record as
/// JSON on stdout, Esc quits without a selection.
#[derive(Parser, Debug)]
#[command(name = "tabview", version, about)]
struct Cli {
    /// Input file (JSON, JSON Lines or CSV); reads stdin when omitted
    file: Option<PathBuf>,

    /// Input format, guessed from the file extension by default
    #[arg(long, value_enum)]
    format: Option<InputFormat>,

    /// Maximum number of columns to show
    #[arg(long)]
    max_columns: Option<usize>,

    /// How search text is matched
    #[arg(long, value_enum)]
    match_mode: Option<MatchMode>,

    /// Flush the screen if a row takes longer than this to load
    #[arg(long = "refresh-ms", value_name = "MS")]
    refresh_ms: Option<u64>,

    /// Config file to use instead of the default location
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Print a commented default config and exit
    #[arg(long)]
    generate_config: bool,

    /// Log level used when RUST_LOG is not set
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.generate_config {
        print!("{}", Config::create_default_with_comments());
        return ExitCode::SUCCESS;
    }

    match run(cli) {
        Ok(Some(record)) => match serde_json::to_string_pretty(&*record) {
            Ok(json) => {
                println!("{}", json);
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("Error: failed to print selection: {}", e);
                ExitCode::from(2)
            }
        },
        Ok(None) => ExitCode::from(1),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(2)
        }
    }
}

fn run(cli: Cli) -> Result<Option<Record>> {
    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(max_columns) = cli.max_columns {
        config.display.max_columns = max_columns;
    }
    if let Some(match_mode) = cli.match_mode {
        config.search.match_mode = match_mode;
    }
    if let Some(refresh_ms) = cli.refresh_ms {
        config.display.refresh_delay_ms = refresh_ms;
    }

    if cli.file.is_none() && std::io::stdin().is_terminal() {
        anyhow::bail!("No input: pass a FILE or pipe records on stdin");
    }

    if let Err(e) = tabview::utils::logging::init_tracing(&cli.log_level) {
        eprintln!("Warning: logging disabled: {:#}", e);
    }

    // one cooperative control flow; terminal reads use the blocking pool
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;
    let result = runtime.block_on(browse(cli.file.as_deref(), cli.format, &config));

    // a producer may still be parked on a read of stdin
    runtime.shutdown_background();
    result
}

async fn browse(
    path: Option<&Path>,
    format: Option<InputFormat>,
    config: &Config,
) -> Result<Option<Record>> {
    let source = open_source(path, format).await?;
    let base = TableHandle::new(IndexedTable::with_max_columns(
        source,
        config.display.max_columns,
    ));

    let surface = TerminalSurface::new()?;
    let mut view = TableView::new(surface, base, ViewOptions::from_config(config));
    let mut keys = CrosstermKeys;
    let selection = view.show(&mut keys).await;

    // leave the alternate screen before anything is printed
    drop(view);
    info!(target: "view", "Session ended");
    selection
}
