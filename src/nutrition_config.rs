//! # Nutrition Configuration Module
//!
//! This module defines configuration structures for the nutrition engine: store
//! connection settings, seeding switches, the optional bulk dataset location and the
//! matcher tunables.

use std::env;
use std::path::PathBuf;

use crate::nutrition_errors::NutritionError;

// Constants for nutrition configuration
pub const DEFAULT_DATABASE_URL: &str = "sqlite://nutrition.db";
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;
pub const MIN_WORD_OVERLAP_TOKEN_LEN: usize = 2; // tokens must be longer than this
pub const MIN_REVERSE_DESCRIPTION_LEN: usize = 4;

/// Matcher tunables
#[derive(Debug, Clone)]
pub struct MatchConfig {
    /// Word-overlap tiers only consider tokens strictly longer than this
    pub min_token_len_exclusive: usize,
    /// Bulk "query contains description" matches need descriptions at least this long
    pub min_reverse_description_len: usize,
    /// Write records resolved from the bulk dataset back to the store
    pub persist_bulk_matches: bool,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            min_token_len_exclusive: MIN_WORD_OVERLAP_TOKEN_LEN,
            min_reverse_description_len: MIN_REVERSE_DESCRIPTION_LEN,
            persist_bulk_matches: true,
        }
    }
}

/// Configuration structure for the nutrition engine
#[derive(Debug, Clone)]
pub struct NutritionConfig {
    /// sqlx connection string, e.g. "sqlite://nutrition.db" or "sqlite::memory:"
    pub database_url: String,
    /// Pool size for the store
    pub max_connections: u32,
    /// Bulk reference dataset; the bulk fallback tier is disabled when unset
    pub bulk_dataset_path: Option<PathBuf>,
    /// Seed curated records and unit conversions into an empty store on startup
    pub seed_on_startup: bool,
    /// Also copy every bulk dataset food into the store on startup
    pub seed_bulk_records: bool,
    /// Matcher tunables
    pub matching: MatchConfig,
}

impl Default for NutritionConfig {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            bulk_dataset_path: None,
            seed_on_startup: true,
            seed_bulk_records: false,
            matching: MatchConfig::default(),
        }
    }
}

impl NutritionConfig {
    /// Build the configuration from environment variables, falling back to defaults.
    ///
    /// Call `dotenv::dotenv().ok()` first to pick up a `.env` file.
    ///
    /// | Variable | Default |
    /// |---|---|
    /// | `DATABASE_URL` | `sqlite://nutrition.db` |
    /// | `DATABASE_MAX_CONNECTIONS` | `5` |
    /// | `FOOD_DATA_PATH` | unset |
    /// | `NUTRITION_SEED` | `true` |
    /// | `NUTRITION_SEED_BULK` | `false` |
    pub fn from_env() -> Result<Self, NutritionError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`NutritionConfig::from_env`] over an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, NutritionError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let value = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let max_connections = match value("DATABASE_MAX_CONNECTIONS") {
            Some(raw) => {
                let parsed = raw.trim().parse::<u32>().map_err(|_| {
                    NutritionError::Config(format!("DATABASE_MAX_CONNECTIONS must be a positive integer, got '{raw}'"))
                })?;
                if parsed == 0 {
                    return Err(NutritionError::Config(
                        "DATABASE_MAX_CONNECTIONS must be at least 1".to_string(),
                    ));
                }
                parsed
            }
            None => defaults.max_connections,
        };

        Ok(Self {
            database_url: value("DATABASE_URL").unwrap_or(defaults.database_url),
            max_connections,
            bulk_dataset_path: value("FOOD_DATA_PATH").map(PathBuf::from),
            seed_on_startup: parse_flag("NUTRITION_SEED", value("NUTRITION_SEED"), defaults.seed_on_startup)?,
            seed_bulk_records: parse_flag(
                "NUTRITION_SEED_BULK",
                value("NUTRITION_SEED_BULK"),
                defaults.seed_bulk_records,
            )?,
            matching: defaults.matching,
        })
    }
}

fn parse_flag(key: &str, raw: Option<String>, default: bool) -> Result<bool, NutritionError> {
    let Some(raw) = raw else {
        return Ok(default);
    };
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(NutritionError::Config(format!("{key} must be a boolean, got '{raw}'"))),
    }
}
