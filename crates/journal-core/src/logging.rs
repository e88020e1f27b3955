#![forbid(unsafe_code)]

//! Logging and tracing support.
//!
//! All journal crates log through `tracing`. Installing a subscriber is the
//! host's decision; with the `subscriber` feature enabled this module offers
//! a ready-made one built on `tracing-subscriber` (env filter, optional JSON).

/// Target prefix shared by every journal crate's events.
pub const TARGET: &str = "journal";

/// Subscriber settings.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub default_filter: String,
    /// Emit JSON lines instead of human-readable output.
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            default_filter: format!("{TARGET}=info"),
            json: false,
        }
    }
}

/// Failure to install the global subscriber.
#[derive(Debug, thiserror::Error)]
#[error("failed to install tracing subscriber: {0}")]
pub struct LoggingInitError(String);

/// Install a global `tracing` subscriber.
///
/// `RUST_LOG` takes precedence over `default_filter`. Returns an error
/// (instead of panicking) if a global subscriber is already set.
#[cfg(feature = "subscriber")]
pub fn init_subscriber(config: &LoggingConfig) -> Result<(), LoggingInitError> {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.default_filter))
        .map_err(|e| LoggingInitError(e.to_string()))?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    let result = if config.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    result.map_err(|e| LoggingInitError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_targets_journal() {
        let config = LoggingConfig::default();
        assert!(config.default_filter.starts_with(TARGET));
        assert!(!config.json);
    }

    #[cfg(feature = "subscriber")]
    #[test]
    fn second_install_is_an_error_not_a_panic() {
        let config = LoggingConfig::default();
        let _ = init_subscriber(&config);
        assert!(init_subscriber(&config).is_err());
    }
}
