//! Tracing subscriber setup for the demo binary.
//!
//! `RUST_LOG` wins over the `--log-level` flag when it is set and valid.

use clap::ValueEnum;
use thiserror::Error;
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Error, Debug)]
pub enum LoggingError {
    #[error("invalid log filter: {0}")]
    Filter(#[from] ParseError),
    #[error("failed to install subscriber: {0}")]
    Init(#[from] TryInitError),
}

pub fn build_filter(level: &str) -> Result<EnvFilter, LoggingError> {
    filter_or_level(EnvFilter::try_from_default_env().ok(), level)
}

/// A usable `RUST_LOG` filter wins; otherwise `level` must parse.
fn filter_or_level(env: Option<EnvFilter>, level: &str) -> Result<EnvFilter, LoggingError> {
    match env {
        Some(filter) => Ok(filter),
        None => Ok(EnvFilter::try_new(level)?),
    }
}

pub fn init_logging(level: &str, format: LogFormat) -> Result<(), LoggingError> {
    let registry = tracing_subscriber::registry().with(build_filter(level)?);
    match format {
        LogFormat::Text => registry.with(fmt::layer().with_target(false)).try_init()?,
        LogFormat::Json => registry.with(fmt::layer().json()).try_init()?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_level_is_a_filter_error() {
        let err = filter_or_level(None, "must_core=notalevel").unwrap_err();
        assert!(matches!(err, LoggingError::Filter(_)));
        assert!(err.to_string().starts_with("invalid log filter"));
    }

    #[test]
    fn level_is_used_without_env_filter() {
        let filter = filter_or_level(None, "info,must_core=debug").unwrap();
        let rendered = filter.to_string();
        assert!(rendered.contains("must_core=debug"), "{rendered}");
        assert!(rendered.contains("info"), "{rendered}");
    }

    #[test]
    fn env_filter_wins_over_level() {
        let env = EnvFilter::try_new("warn").unwrap();
        let filter = filter_or_level(Some(env), "not a level ===").unwrap();
        assert!(filter.to_string().contains("warn"));
    }
}
