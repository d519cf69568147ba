//! Configuration management for the circulation core

use config::{Config, ConfigError, Environment, File};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct LendingConfig {
    /// Loan period in days; due date = issue date + this many days.
    #[serde(default = "default_loan_period_days")]
    pub loan_period_days: i64,
    /// Fine charged per day a return is overdue.
    #[serde(default = "default_fine_per_day")]
    pub fine_per_day: Decimal,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CatalogConfig {
    /// Fixed page size for catalog query results.
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RecentConfig {
    /// Capacity of the per-session recently-viewed list.
    #[serde(default = "default_recent_capacity")]
    pub capacity: usize,
    /// Session key the serialized list is stored under.
    #[serde(default = "default_session_key")]
    pub session_key: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    #[serde(default)]
    pub lending: LendingConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub recent: RecentConfig,
}

fn default_loan_period_days() -> i64 {
    14
}

fn default_fine_per_day() -> Decimal {
    Decimal::ONE
}

fn default_page_size() -> usize {
    8
}

fn default_recent_capacity() -> usize {
    8
}

fn default_session_key() -> String {
    "recently_viewed".to_string()
}

impl AppConfig {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let config = Config::builder()
            // Start with default configuration
            .add_source(File::with_name("config/default").required(false))
            // Layer on the environment-specific file
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Add environment variables (with prefix CIRCULUS_)
            .add_source(
                Environment::with_prefix("CIRCULUS")
                    .separator("_")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            lending: LendingConfig::default(),
            catalog: CatalogConfig::default(),
            recent: RecentConfig::default(),
        }
    }
}

impl Default for LendingConfig {
    fn default() -> Self {
        Self {
            loan_period_days: default_loan_period_days(),
            fine_per_day: default_fine_per_day(),
        }
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
        }
    }
}

impl Default for RecentConfig {
    fn default() -> Self {
        Self {
            capacity: default_recent_capacity(),
            session_key: default_session_key(),
        }
    }
}
