use crate::config::LoggingConfig;
use anyhow::Result;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter directive: `RUST_LOG` wins over `logging.level`.
fn filter_directive(config: &LoggingConfig) -> String {
    std::env::var("RUST_LOG")
        .ok()
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| config.level.clone())
}

/// Stdout plus `<dir>/<file_prefix>.<date>.log`, rotated daily.
pub fn init_logger(config: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_new(filter_directive(config))?;

    // pretty | json
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string());

    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(&config.file_prefix)
        .filename_suffix("log")
        .build(&config.dir)?;

    if log_format == "json" {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stdout).with_target(true))
            .with(fmt::layer().json().with_writer(file_appender).with_target(true))
            .try_init()?;
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_writer(std::io::stdout).with_target(true))
            .with(
                fmt::layer()
                    .with_writer(file_appender)
                    .with_target(false)
                    .with_ansi(false),
            )
            .try_init()?;
    }

    Ok(())
}
