use std::io::{self, Write};

use splash_exec::{LineSink, RunId};
use tracing::trace;

/// Prints each output line to stdout as soon as it arrives.
#[derive(Debug, Default)]
pub struct StdoutSink {
    closed: bool,
}

impl LineSink for StdoutSink {
    fn line(&mut self, run: RunId, line: &str) {
        trace!(run = %run, line, "output");
        if self.closed {
            return;
        }
        // A closed pipe (`splash run | head`) stops printing, not the run.
        let mut out = io::stdout().lock();
        if writeln!(out, "{line}").and_then(|_| out.flush()).is_err() {
            self.closed = true;
        }
    }
}
