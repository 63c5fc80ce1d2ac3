//! Bill split configuration

use serde::Deserialize;

/// Service configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BillSplitConfig {
    /// Decimal places (of the minor unit) used when rounding liabilities for display
    pub settlement_scale: u32,
    /// Re-check the zero-sum property after every committed mutation
    pub verify_balance: bool,
    /// Log level: trace, debug, info, warn, error
    pub log_level: String,
}

impl Default for BillSplitConfig {
    fn default() -> Self {
        Self {
            settlement_scale: 2,
            verify_balance: true,
            log_level: "info".to_string(),
        }
    }
}

impl BillSplitConfig {
    /// Loads configuration from `BILLSPLIT_*` environment variables
    ///
    /// A `.env` file in the working directory is read first if present.
    /// Unset variables fall back to [`Default`].
    pub fn from_env() -> Result<Self, config::ConfigError> {
        dotenvy::dotenv().ok();

        let defaults = Self::default();
        config::Config::builder()
            .set_default("settlement_scale", defaults.settlement_scale as i64)?
            .set_default("verify_balance", defaults.verify_balance)?
            .set_default("log_level", defaults.log_level)?
            .add_source(config::Environment::with_prefix("BILLSPLIT").try_parsing(true))
            .build()?
            .try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = BillSplitConfig::default();
        assert_eq!(config.settlement_scale, 2);
        assert!(config.verify_balance);
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_from_env_reads_prefixed_variables() {
        std::env::set_var("BILLSPLIT_SETTLEMENT_SCALE", "4");
        let config = BillSplitConfig::from_env().unwrap();
        std::env::remove_var("BILLSPLIT_SETTLEMENT_SCALE");

        assert_eq!(config.settlement_scale, 4);
        assert!(config.verify_balance);
    }
}
