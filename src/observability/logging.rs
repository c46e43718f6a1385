//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the global tracing subscriber
//! - Resolve the filter from `RUST_LOG` or the configured level
//!
//! # Design Decisions
//! - `RUST_LOG` wins when set, the configured level is the fallback
//! - Debug mode raises this crate and tower-http to `debug`

use thiserror::Error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("invalid log filter '{filter}': {source}")]
    Filter {
        filter: String,
        #[source]
        source: tracing_subscriber::filter::ParseError,
    },

    #[error("failed to set subscriber: {0}")]
    Init(#[from] tracing_subscriber::util::TryInitError),
}

/// Filter directive for `level`, raised for this crate in debug mode.
pub fn filter_directive(level: &str, debug: bool) -> String {
    if debug {
        format!("{level},space_api=debug,tower_http=debug")
    } else {
        level.to_string()
    }
}

/// Install the global subscriber. Fails if one is already installed.
pub fn init(level: &str, debug: bool) -> Result<(), LoggingError> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => {
            let directive = filter_directive(level, debug);
            EnvFilter::try_new(&directive).map_err(|source| LoggingError::Filter {
                filter: directive,
                source,
            })?
        }
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_raises_crate_level() {
        assert_eq!(filter_directive("warn", false), "warn");
        assert_eq!(
            filter_directive("warn", true),
            "warn,space_api=debug,tower_http=debug"
        );
        assert!(EnvFilter::try_new(filter_directive("info", true)).is_ok());
    }

    #[test]
    fn test_init_succeeds_or_already_init() {
        match init("info", false) {
            Ok(()) | Err(LoggingError::Init(_)) => {}
            Err(e) => panic!("unexpected error: {e}"),
        }
    }
}
