//! Checker configuration.

use thiserror::Error;

/// Environment variable capping the witnesses reported per switch.
pub const WITNESS_LIMIT_VAR: &str = "ORI_SPACE_WITNESS_LIMIT";

/// Environment variable toggling unreachable-case reporting.
pub const REPORT_UNREACHABLE_VAR: &str = "ORI_SPACE_REPORT_UNREACHABLE";

/// Configuration for [`check_switch`](crate::check_switch).
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct CheckerConfig {
    /// Maximum number of witnesses per non-exhaustive switch (0 = unlimited).
    pub witness_limit: usize,
    /// Report cases covered by the cases before them.
    pub report_unreachable: bool,
}

impl Default for CheckerConfig {
    fn default() -> Self {
        CheckerConfig {
            witness_limit: 5,
            report_unreachable: true,
        }
    }
}

/// A configuration value that could not be parsed.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum ConfigError {
    #[error("invalid witness limit in {var}: {value:?} (expected a non-negative integer)")]
    InvalidLimit { var: &'static str, value: String },
    #[error("invalid flag in {var}: {value:?} (expected true, false, 1 or 0)")]
    InvalidFlag { var: &'static str, value: String },
}

impl CheckerConfig {
    /// Create a config with no limits (for testing).
    pub fn unlimited() -> Self {
        CheckerConfig {
            witness_limit: 0,
            report_unreachable: true,
        }
    }

    /// The defaults, overridden by `ORI_SPACE_WITNESS_LIMIT` and
    /// `ORI_SPACE_REPORT_UNREACHABLE` when set.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// The defaults, overridden by whatever `lookup` returns per variable.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = CheckerConfig::default();
        if let Some(value) = lookup(WITNESS_LIMIT_VAR) {
            config.witness_limit = value.trim().parse().map_err(|_| ConfigError::InvalidLimit {
                var: WITNESS_LIMIT_VAR,
                value: value.clone(),
            })?;
        }
        if let Some(value) = lookup(REPORT_UNREACHABLE_VAR) {
            config.report_unreachable = match value.trim() {
                "1" | "true" => true,
                "0" | "false" => false,
                _ => {
                    return Err(ConfigError::InvalidFlag {
                        var: REPORT_UNREACHABLE_VAR,
                        value,
                    })
                }
            };
        }
        Ok(config)
    }

    /// How many witnesses a search may produce.
    #[inline]
    pub(crate) fn witness_budget(&self) -> usize {
        if self.witness_limit == 0 {
            usize::MAX
        } else {
            self.witness_limit
        }
    }
}
