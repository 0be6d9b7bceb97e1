//! Mediator configuration loaded from environment variables.

use std::str::FromStr;

use thiserror::Error;

/// How a publish reports failures when several handlers fail.
///
/// Either way every handler runs to completion first; the strategy only
/// decides how much of the outcome the caller sees.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PublishStrategy {
    /// Report only the first failing handler, in registration order.
    FirstFailure,

    /// Report every failing handler, in registration order.
    #[default]
    Aggregate,
}

/// Error returned when parsing an unknown publish strategy name.
#[derive(Debug, Error)]
#[error("Unknown publish strategy: {0} (expected \"first-failure\" or \"aggregate\")")]
pub struct ParsePublishStrategyError(String);

impl FromStr for PublishStrategy {
    type Err = ParsePublishStrategyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "first" | "first-failure" | "first_failure" => Ok(Self::FirstFailure),
            "aggregate" | "all" => Ok(Self::Aggregate),
            _ => Err(ParsePublishStrategyError(s.to_string())),
        }
    }
}

impl std::fmt::Display for PublishStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::FirstFailure => write!(f, "first-failure"),
            Self::Aggregate => write!(f, "aggregate"),
        }
    }
}

/// Mediator settings.
///
/// Reads from environment variables:
/// - `MEDIATOR_PUBLISH_STRATEGY`: `first-failure` or `aggregate` (default: `aggregate`)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MediatorConfig {
    pub publish_strategy: PublishStrategy,
}

impl MediatorConfig {
    pub const PUBLISH_STRATEGY_VAR: &'static str = "MEDIATOR_PUBLISH_STRATEGY";

    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads configuration from an arbitrary key lookup.
    ///
    /// Unparseable values fall back to the default with a warning.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let publish_strategy = match lookup(Self::PUBLISH_STRATEGY_VAR) {
            Some(raw) => raw.parse().unwrap_or_else(|e: ParsePublishStrategyError| {
                tracing::warn!(error = %e, "falling back to default publish strategy");
                PublishStrategy::default()
            }),
            None => PublishStrategy::default(),
        };

        Self { publish_strategy }
    }

    pub fn with_publish_strategy(mut self, publish_strategy: PublishStrategy) -> Self {
        self.publish_strategy = publish_strategy;
        self
    }
}
