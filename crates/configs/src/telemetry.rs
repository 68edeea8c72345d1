use tracing_subscriber::EnvFilter;

use crate::{ConfigError, LogSettings};

/// Installs the global subscriber. `RUST_LOG` wins over `settings.level`.
///
/// Fails if a subscriber is already installed, which callers that may run
/// more than once (tests) can ignore.
pub fn init_tracing(settings: &LogSettings) -> Result<(), ConfigError> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.level))
        .map_err(|e| ConfigError::Telemetry(e.to_string()))?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);
    let installed = if settings.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    installed.map_err(|e| ConfigError::Telemetry(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_install_fails() {
        let settings = LogSettings::default();
        let _ = init_tracing(&settings);
        assert!(matches!(
            init_tracing(&settings),
            Err(ConfigError::Telemetry(_))
        ));
    }
}
