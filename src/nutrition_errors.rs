//! # Nutrition Error Types Module
//!
//! Structured errors for the nutrition engine. Only structural problems become a
//! `NutritionError`; per-ingredient resolution failures are described by
//! [`MissingReason`] and reported through `RecipeNutrition::missing_ingredients`.

/// Custom error types for nutrition operations
#[derive(Debug)]
pub enum NutritionError {
    /// Local store errors (connection, query, schema)
    Store(String),
    /// Bulk reference dataset could not be read or decoded
    Dataset(String),
    /// A nutrient record breaks the per-100g / non-negative invariants
    InvalidRecord(String),
    /// Configuration values could not be interpreted
    Config(String),
    /// The recipe itself is structurally unusable
    InvalidRecipe(String),
}

impl std::fmt::Display for NutritionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NutritionError::Store(msg) => write!(f, "Store error: {msg}"),
            NutritionError::Dataset(msg) => write!(f, "Dataset error: {msg}"),
            NutritionError::InvalidRecord(msg) => write!(f, "Invalid nutrient record: {msg}"),
            NutritionError::Config(msg) => write!(f, "Configuration error: {msg}"),
            NutritionError::InvalidRecipe(msg) => write!(f, "Invalid recipe: {msg}"),
        }
    }
}

impl std::error::Error for NutritionError {}

impl From<sqlx::Error> for NutritionError {
    fn from(err: sqlx::Error) -> Self {
        NutritionError::Store(err.to_string())
    }
}

impl From<serde_json::Error> for NutritionError {
    fn from(err: serde_json::Error) -> Self {
        NutritionError::Dataset(err.to_string())
    }
}

impl From<std::io::Error> for NutritionError {
    fn from(err: std::io::Error) -> Self {
        NutritionError::Dataset(err.to_string())
    }
}

/// Why an ingredient ended up in the missing list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingReason {
    /// The amount text matched none of the amount patterns
    UnparseableAmount,
    /// The amount parsed but no conversion path to grams exists (or it came out as 0 g)
    UnconvertibleUnit,
    /// Every matcher tier came up empty
    UnmatchedIngredient,
}

impl std::fmt::Display for MissingReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MissingReason::UnparseableAmount => write!(f, "unparseable amount"),
            MissingReason::UnconvertibleUnit => write!(f, "no gram conversion"),
            MissingReason::UnmatchedIngredient => write!(f, "no nutrient data"),
        }
    }
}
