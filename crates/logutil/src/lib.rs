//! Utilities for logging.
use std::fmt;

use tracing::subscriber;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::fmt::format::FmtSpan;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum LogFormat {
    Json,
    #[default]
    HumanReadable,
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json => write!(f, "json"),
            Self::HumanReadable => write!(f, "human-readable"),
        }
    }
}

/// Build the filter used for all subscribers.
///
/// `RUST_LOG` takes precedence, falling back to `default_level`.
pub fn env_filter(default_level: tracing::Level) -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(default_level.into())
        .from_env_lossy()
}

/// Configure the global logger, writing to `writer`.
///
/// Does nothing if a global logger has already been set.
pub fn configure_global_logger<W>(default_level: tracing::Level, format: LogFormat, writer: W)
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter(default_level))
        .with_writer(writer)
        .with_span_events(FmtSpan::CLOSE)
        .with_file(true)
        .with_line_number(true);

    let result = match format {
        LogFormat::Json => subscriber::set_global_default(builder.json().finish()),
        LogFormat::HumanReadable => subscriber::set_global_default(builder.finish()),
    };

    if result.is_err() {
        tracing::debug!("global logger already configured");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configure_twice() {
        configure_global_logger(tracing::Level::DEBUG, LogFormat::Json, std::io::sink);
        configure_global_logger(tracing::Level::INFO, LogFormat::HumanReadable, std::io::sink);
        tracing::info!("logged");
    }

    #[test]
    fn format_display() {
        assert_eq!("json", LogFormat::Json.to_string());
        assert_eq!(LogFormat::HumanReadable, LogFormat::default());
    }
}
