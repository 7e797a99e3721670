use serde::{Deserialize, Serialize};

/// How process output lines are clipped and mirrored into the application log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Max line length in bytes before truncation.
    pub max_line_length: usize,
    /// Mirror every output line at INFO level (false = TRACE).
    pub echo: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            max_line_length: 4096,
            echo: false,
        }
    }
}

impl LogConfig {
    /// Decode raw bytes, drop the line terminator and clip to `max_line_length`.
    ///
    /// Truncation never splits a UTF-8 sequence.
    pub fn clip(&self, raw: &[u8]) -> String {
        let raw = raw.strip_suffix(b"\n").unwrap_or(raw);
        let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
        let mut line = String::from_utf8_lossy(raw).into_owned();
        if line.len() > self.max_line_length {
            let mut cut = self.max_line_length;
            while !line.is_char_boundary(cut) {
                cut -= 1;
            }
            line.truncate(cut);
        }
        line
    }
}
