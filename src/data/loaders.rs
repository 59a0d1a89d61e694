use crate::data::record::{record_from_pairs, record_from_value, Record};
use crate::data::record_source::{ChannelSource, JsonLinesSource, RecordSource};
use anyhow::{Context, Result};
use serde_json::Value;
use std::io::Read;
use std::path::Path;
use tokio::io::BufReader;
use tokio::sync::mpsc::Sender;
use tracing::{info, warn};

/// Records buffered between a blocking parser and the table
const CHANNEL_CAPACITY: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum InputFormat {
    /// A JSON document; arrays yield one record per element
    Json,
    /// One JSON value per line
    #[value(name = "jsonl", alias = "ndjson")]
    JsonLines,
    /// Comma separated values with a header row
    Csv,
}

impl InputFormat {
    /// Guess the format from a file extension, JSON Lines when unsure
    pub fn from_path(path: &Path) -> Self {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase());

        match extension.as_deref() {
            Some("json") => InputFormat::Json,
            Some("csv") => InputFormat::Csv,
            _ => InputFormat::JsonLines,
        }
    }
}

/// Open `path` (or stdin when `None`) as a record source.
///
/// Missing or unreadable files fail here, before any terminal setup. Faults
/// found later while reading end the source early and are logged.
pub async fn open_source(
    path: Option<&Path>,
    format: Option<InputFormat>,
) -> Result<Box<dyn RecordSource>> {
    let format = format.unwrap_or_else(|| path.map_or(InputFormat::JsonLines, InputFormat::from_path));
    info!(
        target: "loader",
        "Opening {} as {:?}",
        path.map_or_else(|| "<stdin>".to_string(), |p| p.display().to_string()),
        format
    );

    match format {
        InputFormat::JsonLines => match path {
            Some(path) => {
                let file = tokio::fs::File::open(path)
                    .await
                    .with_context(|| format!("Failed to open {}", path.display()))?;
                Ok(Box::new(JsonLinesSource::new(BufReader::new(file))))
            }
            None => Ok(Box::new(JsonLinesSource::new(BufReader::new(
                tokio::io::stdin(),
            )))),
        },
        InputFormat::Json => {
            let reader = open_reader(path)?;
            Ok(Box::new(spawn_producer(move |tx| produce_json(reader, tx))))
        }
        InputFormat::Csv => {
            let reader = open_reader(path)?;
            Ok(Box::new(spawn_producer(move |tx| produce_csv(reader, tx))))
        }
    }
}

fn open_reader(path: Option<&Path>) -> Result<Box<dyn Read + Send>> {
    match path {
        Some(path) => {
            let file = std::fs::File::open(path)
                .with_context(|| format!("Failed to open {}", path.display()))?;
            Ok(Box::new(std::io::BufReader::new(file)))
        }
        None => Ok(Box::new(std::io::stdin())),
    }
}

/// Run a blocking parser on the blocking pool, feeding a bounded channel.
///
/// The producer stalls while the channel is full, so records are only parsed
/// a little ahead of what the view asks for. It stops once the receiving
/// source is dropped.
fn spawn_producer<F>(produce: F) -> ChannelSource
where
    F: FnOnce(&Sender<Record>) -> Result<()> + Send + 'static,
{
    let (tx, source) = ChannelSource::channel(CHANNEL_CAPACITY);
    tokio::task::spawn_blocking(move || {
        if let Err(e) = produce(&tx) {
            warn!(target: "loader", "Input ended early: {:#}", e);
        }
    });
    source
}

fn produce_json(reader: Box<dyn Read + Send>, tx: &Sender<Record>) -> Result<()> {
    let document: Value = serde_json::from_reader(reader).context("Invalid JSON document")?;
    match document {
        Value::Array(items) => {
            for item in items {
                if tx.blocking_send(record_from_value(item)).is_err() {
                    break;
                }
            }
        }
        other => {
            let _ = tx.blocking_send(record_from_value(other));
        }
    }
    Ok(())
}

fn produce_csv(reader: Box<dyn Read + Send>, tx: &Sender<Record>) -> Result<()> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(reader);
    let headers = csv_reader.headers().context("Failed to read CSV header")?.clone();

    for (line, row) in csv_reader.records().enumerate() {
        let row = row.with_context(|| format!("Bad CSV record {}", line + 1))?;
        let record = record_from_pairs(
            headers
                .iter()
                .zip(row.iter())
                .map(|(name, value)| (name, Value::String(value.to_string()))),
        );
        if tx.blocking_send(record).is_err() {
            break;
        }
    }
    Ok(())
}
