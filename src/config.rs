//! # Configuration Module
//!
//! Locations of the reference tables and tokenizer options, with defaults that can
//! be overridden from the environment (including a `.env` file).

use std::env;
use std::path::PathBuf;

use log::debug;

use crate::ingredient_matcher::TokenizerMode;

pub const DEFAULT_RISK_TABLE_PATH: &str = "data/harmful_ingredients_risk_list.csv";
pub const DEFAULT_DAILY_INTAKE_PATH: &str = "data/daily_intake.csv";

pub const RISK_TABLE_ENV: &str = "BITE_RIGHT_RISK_TABLE";
pub const DAILY_INTAKE_ENV: &str = "BITE_RIGHT_DAILY_INTAKE";
pub const SPLIT_PARENTHESES_ENV: &str = "BITE_RIGHT_SPLIT_PARENTHESES";

/// Application configuration
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// CSV file with the ingredient risk taxonomy
    pub risk_table_path: PathBuf,
    /// CSV file with the recommended daily intakes
    pub daily_intake_path: PathBuf,
    /// Also split ingredient tokens on parentheses
    pub split_on_parentheses: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            risk_table_path: PathBuf::from(DEFAULT_RISK_TABLE_PATH),
            daily_intake_path: PathBuf::from(DEFAULT_DAILY_INTAKE_PATH),
            split_on_parentheses: false,
        }
    }
}

impl AppConfig {
    /// Defaults overridden by environment variables
    pub fn from_env() -> Self {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for each variable
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(path) = lookup(RISK_TABLE_ENV).filter(|v| !v.trim().is_empty()) {
            config.risk_table_path = PathBuf::from(path.trim());
        }
        if let Some(path) = lookup(DAILY_INTAKE_ENV).filter(|v| !v.trim().is_empty()) {
            config.daily_intake_path = PathBuf::from(path.trim());
        }
        if let Some(flag) = lookup(SPLIT_PARENTHESES_ENV) {
            config.split_on_parentheses = parse_flag(&flag);
        }

        debug!("Loaded configuration: {:?}", config);
        config
    }

    pub fn tokenizer_mode(&self) -> TokenizerMode {
        if self.split_on_parentheses {
            TokenizerMode::SplitParentheses
        } else {
            TokenizerMode::Standard
        }
    }
}

fn parse_flag(raw: &str) -> bool {
    matches!(
        raw.trim().to_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.risk_table_path, PathBuf::from(DEFAULT_RISK_TABLE_PATH));
        assert_eq!(config.daily_intake_path, PathBuf::from(DEFAULT_DAILY_INTAKE_PATH));
        assert_eq!(config.tokenizer_mode(), TokenizerMode::Standard);
    }

    #[test]
    fn test_overrides_from_lookup() {
        let vars: HashMap<&str, &str> = [
            (RISK_TABLE_ENV, "/srv/risk.csv"),
            (DAILY_INTAKE_ENV, "  "),
            (SPLIT_PARENTHESES_ENV, "Yes"),
        ]
        .into_iter()
        .collect();

        let config = AppConfig::from_lookup(|key| vars.get(key).map(|v| v.to_string()));
        assert_eq!(config.risk_table_path, PathBuf::from("/srv/risk.csv"));
        assert_eq!(config.daily_intake_path, PathBuf::from(DEFAULT_DAILY_INTAKE_PATH));
        assert_eq!(config.tokenizer_mode(), TokenizerMode::SplitParentheses);
    }

    #[test]
    fn test_flag_parsing() {
        assert!(parse_flag("1"));
        assert!(parse_flag(" TRUE "));
        assert!(!parse_flag("0"));
        assert!(!parse_flag("nope"));
    }
}
