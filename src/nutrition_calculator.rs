//! # Nutrition Calculator
//!
//! Per-serving nutrition for a recipe.
//!
//! For every ingredient the amount is parsed, converted to grams, matched to a nutrient
//! record and scaled from its 100 g basis into the running totals. Ingredients that fail
//! any of those steps are listed in `missing_ingredients` instead of failing the recipe;
//! "al gusto"-style amounts are skipped silently.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use recipe_nutrition::db::SqliteNutrientStore;
//! use recipe_nutrition::nutrition_calculator::NutritionCalculator;
//! use recipe_nutrition::nutrition_config::MatchConfig;
//! use recipe_nutrition::nutrition_model::{Recipe, RecipeIngredient};
//!
//! # async fn run() -> Result<(), recipe_nutrition::nutrition_errors::NutritionError> {
//! let store = SqliteNutrientStore::in_memory().await?;
//! store.seed_nutrient_records().await?;
//!
//! let calculator = NutritionCalculator::new(Arc::new(store), None, MatchConfig::default());
//! let recipe = Recipe::new("Pollo", 2).with_ingredient(RecipeIngredient::new("pollo", "200g"));
//! let nutrition = calculator.calculate_recipe_nutrition(&recipe).await?;
//! assert_eq!(nutrition.calories_per_serving, 239.0);
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::amount_parser::parse_amount;
use crate::bulk_dataset::BulkDataset;
use crate::db::NutrientStore;
use crate::nutrient_cache::NutrientCache;
use crate::nutrient_matcher::NutrientMatcher;
use crate::nutrition_config::MatchConfig;
use crate::nutrition_errors::{MissingReason, NutritionError};
use crate::nutrition_model::{
    NutrientRecord, NutrientTotals, Recipe, RecipeIngredient, RecipeNutrition, REFERENCE_SERVING_G,
};
use crate::unit_converter::{UnitConversionTable, UnitConverter};

/// Outcome of resolving one ingredient
enum Resolution {
    /// Non-quantifiable amount, left out without being reported
    Skipped,
    Resolved { grams: f64, record: NutrientRecord },
    Missing(MissingReason),
}

pub struct NutritionCalculator {
    store: Arc<dyn NutrientStore>,
    matcher: NutrientMatcher,
    cache: NutrientCache,
    units: RwLock<Option<Arc<UnitConverter>>>,
}

impl NutritionCalculator {
    pub fn new(store: Arc<dyn NutrientStore>, dataset: Option<Arc<BulkDataset>>, config: MatchConfig) -> Self {
        let matcher = NutrientMatcher::new(Arc::clone(&store), dataset, config);
        Self {
            store,
            matcher,
            cache: NutrientCache::new(),
            units: RwLock::new(None),
        }
    }

    pub fn cache(&self) -> &NutrientCache {
        &self.cache
    }

    pub fn matcher(&self) -> &NutrientMatcher {
        &self.matcher
    }

    /// Forget the cached nutrient records and conversion table; the next calculation
    /// reloads both from the store.
    pub async fn invalidate_nutrient_cache(&self) {
        self.cache.invalidate().await;
        *self.units.write().await = None;
    }

    async fn unit_converter(&self) -> Result<Arc<UnitConverter>, NutritionError> {
        if let Some(converter) = self.units.read().await.as_ref() {
            return Ok(Arc::clone(converter));
        }

        let mut guard = self.units.write().await;
        if let Some(converter) = guard.as_ref() {
            return Ok(Arc::clone(converter));
        }
        let rows = self.store.all_unit_conversions().await?;
        info!(rows = rows.len(), "Unit conversion table loaded");
        let converter = Arc::new(UnitConverter::new(UnitConversionTable::new(rows)));
        *guard = Some(Arc::clone(&converter));
        Ok(converter)
    }

    /// Compute per-serving nutrition for `recipe`.
    ///
    /// Only store failures and structurally empty ingredient rows are errors; every
    /// other problem ends up in `missing_ingredients`.
    pub async fn calculate_recipe_nutrition(&self, recipe: &Recipe) -> Result<RecipeNutrition, NutritionError> {
        validate_recipe(recipe)?;
        self.cache.load_if_absent(self.store.as_ref()).await?;
        let converter = self.unit_converter().await?;

        let mut totals = NutrientTotals::default();
        let mut missing = Vec::new();

        for ingredient in &recipe.ingredients {
            match self.resolve_ingredient(ingredient, &converter).await {
                Resolution::Skipped => {
                    debug!(item = %ingredient.item, amount = %ingredient.amount, "Skipping non-quantifiable amount");
                }
                Resolution::Resolved { grams, record } => {
                    debug!(
                        item = %ingredient.item,
                        grams,
                        matched = %record.ingredient_name,
                        "Ingredient resolved"
                    );
                    totals.accumulate(&record, grams / REFERENCE_SERVING_G);
                }
                Resolution::Missing(reason) => {
                    warn!(item = %ingredient.item, amount = %ingredient.amount, %reason, "Ingredient left out");
                    missing.push(ingredient.item.clone());
                }
            }
        }

        let servings = recipe.effective_servings();
        let nutrition = RecipeNutrition::from_per_serving(&totals.divided_by(servings as f64), servings, missing);
        info!(
            title = %recipe.title,
            calories_per_serving = nutrition.calories_per_serving,
            servings,
            approximate = nutrition.is_approximate(),
            "Recipe nutrition calculated"
        );
        Ok(nutrition)
    }

    async fn resolve_ingredient(&self, ingredient: &RecipeIngredient, converter: &UnitConverter) -> Resolution {
        let parsed = parse_amount(&ingredient.amount);
        if parsed.is_variable() {
            return Resolution::Skipped;
        }
        if parsed.is_unknown() {
            return Resolution::Missing(MissingReason::UnparseableAmount);
        }

        let grams = parsed
            .grams
            .or_else(|| converter.convert_to_grams(parsed.quantity, &parsed.unit, &ingredient.item, None));
        let grams = match grams {
            Some(grams) if grams > 0.0 => grams,
            _ => return Resolution::Missing(MissingReason::UnconvertibleUnit),
        };

        match self.matcher.find_best_match(&ingredient.item, &self.cache).await {
            Some(record) => Resolution::Resolved { grams, record },
            None => Resolution::Missing(MissingReason::UnmatchedIngredient),
        }
    }
}

/// Reject ingredient rows with neither a name nor an amount.
fn validate_recipe(recipe: &Recipe) -> Result<(), NutritionError> {
    if let Some(position) = recipe
        .ingredients
        .iter()
        .position(|ingredient| ingredient.item.trim().is_empty() && ingredient.amount.trim().is_empty())
    {
        return Err(NutritionError::InvalidRecipe(format!(
            "ingredient #{} of '{}' has neither a name nor an amount",
            position + 1,
            recipe.title
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_recipe() {
        let ok = Recipe::new("ok", 1)
            .with_ingredient(RecipeIngredient::new("pollo", ""))
            .with_ingredient(RecipeIngredient::new("", "200g"));
        assert!(validate_recipe(&ok).is_ok());

        let empty_row = Recipe::new("broken", 1).with_ingredient(RecipeIngredient::new(" ", ""));
        assert!(matches!(validate_recipe(&empty_row), Err(NutritionError::InvalidRecipe(_))));
    }
}
