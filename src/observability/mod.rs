// "observability": {
//     "logs": {
//       "enabled": true,
//       "level": "info",
//       "destination": {
//         "type": "file",
//         "path": "./docsign_logs"
//       }
//     }
// }

pub mod logs;

pub use crate::config::{LogConfig, LogDestination, ObservabilityConfig};
pub use logs::init_logs;

/// Initializes logging from the observability section of a loaded config.
pub fn init_observability(
    config: &ObservabilityConfig,
) -> Result<Option<tracing_appender::non_blocking::WorkerGuard>, Box<dyn std::error::Error>> {
    init_logs(&config.logs)
}
