//! Diagnostic logging. Everything goes to stderr; stdout carries the
//! protocol stream and must never see a log line.

use tracing_subscriber::{fmt, EnvFilter};

pub const FORMAT_ENV: &str = "GMAIL_MCP_LOG_FORMAT";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// One JSON object per event.
    Json,
    /// Human readable, no colors.
    #[default]
    Compact,
}

impl LogFormat {
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "json" => LogFormat::Json,
            "compact" | "text" | "" => LogFormat::Compact,
            other => {
                eprintln!("Invalid {}: {}, using compact", FORMAT_ENV, other);
                LogFormat::Compact
            }
        }
    }

    pub fn from_env() -> Self {
        std::env::var(FORMAT_ENV)
            .map(|v| Self::parse(&v))
            .unwrap_or_default()
    }
}

/// Installs the global subscriber. `RUST_LOG` overrides the `info` default.
/// Calling it twice is harmless: the second install is ignored.
pub fn init(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(false);

    let result = match format {
        LogFormat::Json => builder.json().with_current_span(false).try_init(),
        LogFormat::Compact => builder.compact().try_init(),
    };
    if let Err(e) = result {
        tracing::debug!(error = %e, "tracing subscriber already installed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_format() {
        assert_eq!(LogFormat::parse("json"), LogFormat::Json);
        assert_eq!(LogFormat::parse(" JSON "), LogFormat::Json);
        assert_eq!(LogFormat::parse("compact"), LogFormat::Compact);
        assert_eq!(LogFormat::parse(""), LogFormat::Compact);
        assert_eq!(LogFormat::parse("xml"), LogFormat::Compact);
        assert_eq!(LogFormat::default(), LogFormat::Compact);
    }

    #[test]
    fn test_init_twice_does_not_panic() {
        init(LogFormat::Compact);
        init(LogFormat::Json);
    }
}
