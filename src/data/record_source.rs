use crate::data::record::{record_from_value, Record};
use async_trait::async_trait;
use serde_json::Value;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, Lines};
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// A single-pass, sequential producer of records.
///
/// Returning `None` means the source is exhausted. Sources are expected to
/// turn their own faults (I/O errors, malformed input) into early
/// exhaustion, since nothing downstream treats running out of rows as an
/// error.
#[async_trait]
pub trait RecordSource: Send {
    async fn next_record(&mut self) -> Option<Record>;
}

#[async_trait]
impl<S: RecordSource + ?Sized> RecordSource for Box<S> {
    async fn next_record(&mut self) -> Option<Record> {
        (**self).next_record().await
    }
}

/// Adapts any in-memory iterator of records
pub struct IterSource<I> {
    iter: I,
}

impl<I> IterSource<I>
where
    I: Iterator<Item = Record> + Send,
{
    pub fn new<T>(items: T) -> Self
    where
        T: IntoIterator<IntoIter = I>,
    {
        Self {
            iter: items.into_iter(),
        }
    }
}

#[async_trait]
impl<I> RecordSource for IterSource<I>
where
    I: Iterator<Item = Record> + Send,
{
    async fn next_record(&mut self) -> Option<Record> {
        self.iter.next()
    }
}

/// Receives records from a producer running elsewhere (usually a blocking
/// parser thread). The channel closing is exhaustion.
pub struct ChannelSource {
    receiver: mpsc::Receiver<Record>,
}

impl ChannelSource {
    pub fn new(receiver: mpsc::Receiver<Record>) -> Self {
        Self { receiver }
    }

    /// Create a bounded channel and the source reading from it
    pub fn channel(capacity: usize) -> (mpsc::Sender<Record>, Self) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (tx, Self::new(rx))
    }
}

#[async_trait]
impl RecordSource for ChannelSource {
    async fn next_record(&mut self) -> Option<Record> {
        self.receiver.recv().await
    }
}

/// Reads one JSON value per line. Blank lines are skipped.
pub struct JsonLinesSource<R> {
    lines: Lines<R>,
    line_no: usize,
    finished: bool,
}

impl<R> JsonLinesSource<R>
where
    R: AsyncBufRead + Unpin + Send,
{
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            line_no: 0,
            finished: false,
        }
    }
}

#[async_trait]
impl<R> RecordSource for JsonLinesSource<R>
where
    R: AsyncBufRead + Unpin + Send,
{
    async fn next_record(&mut self) -> Option<Record> {
        if self.finished {
            return None;
        }

        loop {
            let line = match self.lines.next_line().await {
                Ok(Some(line)) => line,
                Ok(None) => {
                    debug!(target: "loader", "JSON lines input ended after {} lines", self.line_no);
                    self.finished = true;
                    return None;
                }
                Err(e) => {
                    warn!(target: "loader", "Read failed after line {}: {}", self.line_no, e);
                    self.finished = true;
                    return None;
                }
            };
            self.line_no += 1;

            if line.trim().is_empty() {
                continue;
            }

            match serde_json::from_str::<Value>(&line) {
                Ok(value) => return Some(record_from_value(value)),
                Err(e) => {
                    warn!(target: "loader", "Malformed JSON on line {}, stopping: {}", self.line_no, e);
                    self.finished = true;
                    return None;
                }
            }
        }
    }
}
