use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::runner::RunId;

/// Lazy, finite sequence of output lines from one process.
///
/// Ends when the process closes its output or is cancelled. Lines still
/// buffered at cancellation are dropped.
#[derive(Debug)]
pub struct OutputStream {
    id: RunId,
    rx: mpsc::Receiver<String>,
    cancel: CancellationToken,
}

impl OutputStream {
    pub(crate) fn new(id: RunId, rx: mpsc::Receiver<String>, cancel: CancellationToken) -> Self {
        Self { id, rx, cancel }
    }

    pub fn id(&self) -> RunId {
        self.id
    }

    /// Next line, or `None` once the stream has ended.
    pub async fn next_line(&mut self) -> Option<String> {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => {
                self.rx.close();
                None
            }
            line = self.rx.recv() => line,
        }
    }

    /// Read every remaining line.
    pub async fn collect(mut self) -> Vec<String> {
        let mut lines = Vec::new();
        while let Some(line) = self.next_line().await {
            lines.push(line);
        }
        lines
    }
}

/// Consumer side of a run: where output lines end up (terminal, log view, buffer).
pub trait LineSink {
    fn line(&mut self, run: RunId, line: &str);
}

impl LineSink for Vec<String> {
    fn line(&mut self, _run: RunId, line: &str) {
        self.push(line.to_string());
    }
}

/// Forward the whole stream into `sink`; returns the number of lines delivered.
pub async fn drain_into<S>(stream: &mut OutputStream, sink: &mut S) -> usize
where
    S: LineSink + ?Sized,
{
    let mut count = 0;
    while let Some(line) = stream.next_line().await {
        sink.line(stream.id, &line);
        count += 1;
    }
    count
}
