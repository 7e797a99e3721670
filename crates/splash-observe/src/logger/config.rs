use std::{io::IsTerminal, path::PathBuf};

use serde::{Deserialize, Serialize};

use crate::logger::object::{LoggerFormat, LoggerLevel, LoggerTimeZone};

/// Logger configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggerConfig {
    /// Output format.
    pub format: LoggerFormat,
    /// `EnvFilter` expression, e.g. `"info"` or `"splash_exec=trace,info"`.
    pub level: LoggerLevel,
    /// Timezone for timestamps.
    pub tz: LoggerTimeZone,
    /// Include targets (module paths) in each record.
    pub with_targets: bool,
    /// Colored text output; only honoured on a terminal.
    pub use_color: bool,
    /// Append records to this file instead of stderr.
    ///
    /// Streamed tool output goes to stdout, so the two never interleave on
    /// screen. Ignored by the journald format.
    pub file: Option<PathBuf>,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            format: LoggerFormat::default(),
            level: LoggerLevel::default(),
            tz: LoggerTimeZone::default(),
            with_targets: true,
            use_color: true,
            file: None,
        }
    }
}

impl LoggerConfig {
    /// Whether to emit ANSI colors.
    ///
    /// Requires `use_color`, no log file, and a terminal on stderr (where the
    /// records are written). Decided at init time, not at parse time.
    pub fn should_use_color(&self) -> bool {
        self.use_color && self.file.is_none() && std::io::stderr().is_terminal()
    }
}
