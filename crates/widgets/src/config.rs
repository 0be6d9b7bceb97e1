//! Application configuration loaded from environment variables.

use mediator::MediatorConfig;

/// Host configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `RUST_LOG`: tracing filter directive (default: `"info"`)
/// - `MEDIATOR_PUBLISH_STRATEGY`: see [`MediatorConfig`]
#[derive(Debug, Clone)]
pub struct Config {
    pub log_level: String,
    pub mediator: MediatorConfig,
}

impl Config {
    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self {
            log_level: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            mediator: MediatorConfig::from_env(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            mediator: MediatorConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mediator::PublishStrategy;

    #[test]
    fn test_default_values() {
        let config = Config::default();
        assert_eq!(config.log_level, "info");
        assert_eq!(config.mediator.publish_strategy, PublishStrategy::Aggregate);
    }
}
