use crate::config::{LogConfig, LogDestination};
use std::io;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, Registry, fmt, layer::SubscriberExt, util::SubscriberInitExt};

pub const LOG_FILE_PREFIX: &str = "docsign.log";

/// Installs the global tracing subscriber described by `config`.
///
/// The returned guard must outlive all logging when the destination is a
/// file; dropping it flushes the background writer.
pub fn init_logs(config: &LogConfig) -> Result<Option<WorkerGuard>, Box<dyn std::error::Error>> {
    if !config.enabled {
        return Ok(None);
    }

    let filter = EnvFilter::new(&config.level).add_directive("object_store=warn".parse()?);

    match &config.destination {
        LogDestination::File { path } => {
            let file_appender = RollingFileAppender::new(Rotation::DAILY, path, LOG_FILE_PREFIX);
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

            Registry::default()
                .with(filter)
                .with(fmt::layer().with_writer(non_blocking).with_ansi(false))
                .try_init()?;
            Ok(Some(guard))
        }
        LogDestination::Stderr => {
            // a subscriber installed by a test harness wins
            let _ = Registry::default()
                .with(filter)
                .with(fmt::layer().with_writer(io::stderr).with_target(false))
                .try_init();
            Ok(None)
        }
        LogDestination::Null => Ok(None),
    }
}
