use std::{fs::File, sync::Mutex};

use tracing::Subscriber;
use tracing_subscriber::{
    fmt::{self, writer::BoxMakeWriter},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

use crate::logger::{
    config::LoggerConfig,
    error::{LoggerError, LoggerResult},
    object::LoggerRfc3339,
};

pub fn logger_text(cfg: &LoggerConfig) -> LoggerResult<()> {
    let filter = cfg.level.to_env_filter()?;
    let fmt_layer = fmt::layer()
        .with_ansi(cfg.should_use_color())
        .with_target(cfg.with_targets)
        .with_timer(LoggerRfc3339::new(cfg.tz))
        .with_writer(make_writer(cfg)?);

    let subscriber = tracing_subscriber::registry().with(filter).with(fmt_layer);
    init_subscriber(subscriber)
}

pub fn logger_json(cfg: &LoggerConfig) -> LoggerResult<()> {
    let filter = cfg.level.to_env_filter()?;
    let fmt_layer = fmt::layer()
        .json()
        .with_ansi(false)
        .with_target(cfg.with_targets)
        .with_timer(LoggerRfc3339::new(cfg.tz))
        .with_writer(make_writer(cfg)?);

    let subscriber = tracing_subscriber::registry().with(filter).with(fmt_layer);
    init_subscriber(subscriber)
}

#[cfg(target_os = "linux")]
pub fn logger_journald(cfg: &LoggerConfig) -> LoggerResult<()> {
    let filter = cfg.level.to_env_filter()?;
    let journald =
        tracing_journald::layer().map_err(|e| LoggerError::JournaldInitFailed(e.to_string()))?;

    let subscriber = tracing_subscriber::registry().with(filter).with(journald);
    init_subscriber(subscriber)
}

#[cfg(not(target_os = "linux"))]
pub fn logger_journald(_cfg: &LoggerConfig) -> LoggerResult<()> {
    Err(LoggerError::JournaldNotSupported)
}

/// Stderr, or the configured file opened for append.
fn make_writer(cfg: &LoggerConfig) -> LoggerResult<BoxMakeWriter> {
    let Some(path) = &cfg.file else {
        return Ok(BoxMakeWriter::new(std::io::stderr));
    };
    let file = File::options()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|source| LoggerError::LogFile {
            path: path.clone(),
            source,
        })?;
    Ok(BoxMakeWriter::new(Mutex::new(file)))
}

fn init_subscriber<S>(subscriber: S) -> LoggerResult<()>
where
    S: Subscriber + Send + Sync + 'static,
{
    subscriber
        .try_init()
        .map_err(|_| LoggerError::AlreadyInitialized)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logger::object::LoggerFormat;

    #[test]
    fn unwritable_log_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let config = LoggerConfig {
            file: Some(dir.path().join("missing/splash.log")),
            ..Default::default()
        };
        assert!(matches!(make_writer(&config), Err(LoggerError::LogFile { .. })));
    }

    // The only test in this crate that installs the global subscriber.
    #[test]
    fn json_records_go_to_the_log_file_and_init_is_once_only() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("splash.log");
        let config = LoggerConfig {
            format: LoggerFormat::Json,
            level: "debug".parse().unwrap(),
            file: Some(path.clone()),
            ..Default::default()
        };

        crate::init_logger(&config).unwrap();
        tracing::info!(run = "run-0001", "process started");

        let text = std::fs::read_to_string(&path).unwrap();
        let record: serde_json::Value = serde_json::from_str(text.lines().last().unwrap()).unwrap();
        assert_eq!(record["level"], "INFO");
        assert_eq!(record["fields"]["message"], "process started");
        assert_eq!(record["fields"]["run"], "run-0001");

        assert!(matches!(
            crate::init_logger(&config),
            Err(LoggerError::AlreadyInitialized)
        ));
    }

    #[test]
    #[cfg(not(target_os = "linux"))]
    fn journald_is_rejected_off_linux() {
        let config = LoggerConfig {
            format: LoggerFormat::Journald,
            ..Default::default()
        };
        assert!(matches!(
            logger_journald(&config),
            Err(LoggerError::JournaldNotSupported)
        ));
    }
}
