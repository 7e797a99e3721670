use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

use crate::logger::LoggerError;

/// A validated `tracing_subscriber::EnvFilter` expression.
///
/// Holds the raw string so it can round-trip through configuration files.
/// Validation happens once, on construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "String")]
#[serde(into = "String")]
pub struct LoggerLevel(String);

impl LoggerLevel {
    pub fn new(s: impl Into<String>) -> Result<Self, LoggerError> {
        Self::try_from(s.into())
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Build the filter for the subscriber.
    pub fn to_env_filter(&self) -> Result<EnvFilter, LoggerError> {
        EnvFilter::try_new(self.as_str())
            .map_err(|e| LoggerError::InvalidLevel(format!("{}: {}", self.0, e)))
    }
}

impl Default for LoggerLevel {
    fn default() -> Self {
        Self("info".to_string())
    }
}

impl FromStr for LoggerLevel {
    type Err = LoggerError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::try_from(s.to_owned())
    }
}

impl TryFrom<String> for LoggerLevel {
    type Error = LoggerError;
    fn try_from(s: String) -> Result<Self, Self::Error> {
        match EnvFilter::try_new(&s) {
            Ok(_) => Ok(LoggerLevel(s)),
            Err(e) => Err(LoggerError::InvalidLevel(format!("{}: {}", s, e))),
        }
    }
}

impl From<LoggerLevel> for String {
    fn from(l: LoggerLevel) -> Self {
        l.0
    }
}

#[cfg(test)]
mod tests {
    use super::LoggerLevel;

    #[test]
    fn accepts_levels_and_directives() {
        for lvl in ["info", "trace", "splash_exec=trace,splash_core=debug,warn"] {
            let parsed = lvl.parse::<LoggerLevel>();
            assert!(parsed.is_ok(), "expected {lvl} to parse, got {parsed:?}");
            assert!(parsed.unwrap().to_env_filter().is_ok());
        }
    }

    #[test]
    fn rejects_unknown_levels() {
        for lvl in ["splash_exec=chatty", "root=info,sub=xyz"] {
            assert!(lvl.parse::<LoggerLevel>().is_err(), "{lvl} should be rejected");
        }
    }

    #[test]
    fn default_is_info() {
        let lvl = LoggerLevel::default();
        assert_eq!(lvl.as_str(), "info");
        assert!(lvl.to_env_filter().is_ok());
    }

    #[test]
    fn serde_keeps_the_raw_expression() {
        let lvl: LoggerLevel = serde_json::from_str(r#""splash_props=debug,info""#).unwrap();
        assert_eq!(lvl.as_str(), "splash_props=debug,info");
        assert_eq!(serde_json::to_string(&lvl).unwrap(), r#""splash_props=debug,info""#);
    }
}
