//! # Nutrition Data Model
//!
//! This module defines the data structures the nutrition engine consumes and produces:
//! per-100g nutrient records, unit conversion rows, parsed amounts, recipes and the
//! per-serving report.
//!
//! ## Core Concepts
//!
//! - **NutrientRecord**: the nutrient profile of one ingredient per 100 g
//! - **UnitConversion**: grams per unit for a (unit, ingredient category) pair
//! - **ParsedAmount**: a free-text amount turned into quantity + unit (+ grams when known)
//! - **RecipeNutrition**: per-serving totals plus the ingredients that could not be resolved
//!
//! ## Usage
//!
//! ```rust
//! use recipe_nutrition::nutrition_model::{Recipe, RecipeIngredient};
//!
//! let recipe = Recipe::new("Pollo al horno", 2)
//!     .with_ingredient(RecipeIngredient::new("pollo", "200g"))
//!     .with_ingredient(RecipeIngredient::new("sal", "a gusto"));
//!
//! assert_eq!(recipe.ingredients.len(), 2);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::amount_parser::scale_amount;
use crate::nutrition_errors::NutritionError;

/// Every nutrient record is expressed per this many grams.
pub const REFERENCE_SERVING_G: f64 = 100.0;

/// Category tag given to records synthesised from the bulk reference dataset.
pub const BULK_CATEGORY: &str = "usda_foundation";

/// Category value for universal unit conversions.
pub const ANY_CATEGORY: &str = "any";

fn default_serving_size() -> f64 {
    REFERENCE_SERVING_G
}

fn default_category() -> String {
    "other".to_string()
}

/// Nutrient profile per 100 g of an ingredient
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NutrientRecord {
    /// Canonical (English) name, unique in the store
    pub ingredient_name: String,

    /// Optional Spanish display name
    #[serde(default)]
    pub spanish_name: Option<String>,

    /// Reference serving in grams, always 100
    #[serde(default = "default_serving_size")]
    pub serving_size_g: f64,

    pub calories: f64,
    pub protein_g: f64,
    pub carbs_g: f64,
    pub fat_g: f64,
    #[serde(default)]
    pub fiber_g: f64,
    #[serde(default)]
    pub sugar_g: f64,
    #[serde(default)]
    pub sodium_mg: f64,
    #[serde(default)]
    pub vitamin_a_dv: f64,
    #[serde(default)]
    pub vitamin_c_dv: f64,
    #[serde(default)]
    pub calcium_dv: f64,
    #[serde(default)]
    pub iron_dv: f64,

    /// Free-text category tag ("protein", "vegetable", "usda_foundation", ...)
    #[serde(default = "default_category")]
    pub category: String,
}

impl NutrientRecord {
    /// Create a record with the given name and macro profile; everything else zero.
    pub fn new(ingredient_name: &str, calories: f64, protein_g: f64, carbs_g: f64, fat_g: f64) -> Self {
        Self {
            ingredient_name: ingredient_name.to_string(),
            spanish_name: None,
            serving_size_g: REFERENCE_SERVING_G,
            calories,
            protein_g,
            carbs_g,
            fat_g,
            fiber_g: 0.0,
            sugar_g: 0.0,
            sodium_mg: 0.0,
            vitamin_a_dv: 0.0,
            vitamin_c_dv: 0.0,
            calcium_dv: 0.0,
            iron_dv: 0.0,
            category: default_category(),
        }
    }

    pub fn with_spanish_name(mut self, spanish_name: &str) -> Self {
        self.spanish_name = Some(spanish_name.to_string());
        self
    }

    pub fn with_category(mut self, category: &str) -> Self {
        self.category = category.to_string();
        self
    }

    /// Check the record invariants: per-100g basis and non-negative nutrient values.
    pub fn validate(&self) -> Result<(), NutritionError> {
        if self.ingredient_name.trim().is_empty() {
            return Err(NutritionError::InvalidRecord(
                "ingredient name must not be empty".to_string(),
            ));
        }
        if (self.serving_size_g - REFERENCE_SERVING_G).abs() > f64::EPSILON {
            return Err(NutritionError::InvalidRecord(format!(
                "'{}' uses a {} g basis, only 100 g is supported",
                self.ingredient_name, self.serving_size_g
            )));
        }
        let totals = NutrientTotals::from(self);
        if let Some((field, value)) = totals.fields().into_iter().find(|(_, v)| *v < 0.0 || v.is_nan()) {
            return Err(NutritionError::InvalidRecord(format!(
                "'{}' has invalid {}: {}",
                self.ingredient_name, field, value
            )));
        }
        Ok(())
    }
}

/// Grams per unit for a (unit, ingredient category) pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitConversion {
    pub unit_name: String,
    /// `None` or `"any"` means the row applies to every category
    pub ingredient_category: Option<String>,
    pub grams_per_unit: f64,
    pub notes: Option<String>,
}

impl UnitConversion {
    pub fn new(unit_name: &str, ingredient_category: Option<&str>, grams_per_unit: f64) -> Self {
        Self {
            unit_name: unit_name.to_string(),
            ingredient_category: ingredient_category.map(str::to_string),
            grams_per_unit,
            notes: None,
        }
    }

    /// Whether this row applies regardless of ingredient category
    pub fn is_universal(&self) -> bool {
        match self.ingredient_category.as_deref() {
            None => true,
            Some(category) => category == ANY_CATEGORY,
        }
    }
}

/// A free-text amount turned into a structured quantity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedAmount {
    pub quantity: f64,
    pub unit: String,
    /// Already-resolved mass, `None` while a unit conversion is still pending
    pub grams: Option<f64>,
}

impl ParsedAmount {
    pub fn new(quantity: f64, unit: &str, grams: Option<f64>) -> Self {
        Self {
            quantity,
            unit: unit.to_string(),
            grams,
        }
    }

    /// "al gusto" and friends: skip the ingredient, it is not missing
    pub fn variable() -> Self {
        Self::new(0.0, crate::amount_parser::UNIT_VARIABLE, Some(0.0))
    }

    /// The text could not be understood: the ingredient counts as missing
    pub fn unknown() -> Self {
        Self::new(0.0, crate::amount_parser::UNIT_UNKNOWN, Some(0.0))
    }

    pub fn is_variable(&self) -> bool {
        self.unit == crate::amount_parser::UNIT_VARIABLE
    }

    pub fn is_unknown(&self) -> bool {
        self.unit == crate::amount_parser::UNIT_UNKNOWN
    }
}

/// One line of a recipe's ingredient list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeIngredient {
    /// Display name, e.g. "pechuga de pollo"
    pub item: String,
    /// Free-text amount, e.g. "2 tazas", "al gusto", "1 (150g)"
    pub amount: String,
    #[serde(default)]
    pub notes: Option<String>,
}

impl RecipeIngredient {
    pub fn new(item: &str, amount: &str) -> Self {
        Self {
            item: item.to_string(),
            amount: amount.to_string(),
            notes: None,
        }
    }
}

/// The slice of a recipe the nutrition engine needs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub title: String,
    /// Number of servings the ingredient amounts yield; 0 is treated as 1
    #[serde(default)]
    pub servings: u32,
    pub ingredients: Vec<RecipeIngredient>,
}

impl Recipe {
    pub fn new(title: &str, servings: u32) -> Self {
        Self {
            id: None,
            title: title.to_string(),
            servings,
            ingredients: Vec::new(),
        }
    }

    pub fn with_ingredient(mut self, ingredient: RecipeIngredient) -> Self {
        self.ingredients.push(ingredient);
        self
    }

    /// Serving count used for the per-serving division
    pub fn effective_servings(&self) -> u32 {
        self.servings.max(1)
    }

    /// Copy of the recipe adjusted to `servings`, with every amount rescaled to match.
    ///
    /// A recipe with no declared servings cannot be rescaled, only relabelled.
    pub fn with_servings(&self, servings: u32) -> Recipe {
        let mut adjusted = self.clone();
        adjusted.servings = servings;
        if self.servings == 0 || servings == self.servings {
            return adjusted;
        }

        let multiplier = f64::from(servings) / f64::from(self.servings);
        for ingredient in &mut adjusted.ingredients {
            ingredient.amount = scale_amount(&ingredient.amount, multiplier);
        }
        adjusted
    }
}

/// Running or per-serving nutrient sums; same fields as a record minus identity
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct NutrientTotals {
    pub calories: f64,
    pub protein_g: f64,
    pub carbs_g: f64,
    pub fat_g: f64,
    pub fiber_g: f64,
    pub sugar_g: f64,
    pub sodium_mg: f64,
    pub vitamin_a_dv: f64,
    pub vitamin_c_dv: f64,
    pub calcium_dv: f64,
    pub iron_dv: f64,
}

impl NutrientTotals {
    /// Add `record` scaled by `factor` (grams used / 100)
    pub fn accumulate(&mut self, record: &NutrientRecord, factor: f64) {
        self.calories += record.calories * factor;
        self.protein_g += record.protein_g * factor;
        self.carbs_g += record.carbs_g * factor;
        self.fat_g += record.fat_g * factor;
        self.fiber_g += record.fiber_g * factor;
        self.sugar_g += record.sugar_g * factor;
        self.sodium_mg += record.sodium_mg * factor;
        self.vitamin_a_dv += record.vitamin_a_dv * factor;
        self.vitamin_c_dv += record.vitamin_c_dv * factor;
        self.calcium_dv += record.calcium_dv * factor;
        self.iron_dv += record.iron_dv * factor;
    }

    pub fn divided_by(&self, divisor: f64) -> NutrientTotals {
        NutrientTotals {
            calories: self.calories / divisor,
            protein_g: self.protein_g / divisor,
            carbs_g: self.carbs_g / divisor,
            fat_g: self.fat_g / divisor,
            fiber_g: self.fiber_g / divisor,
            sugar_g: self.sugar_g / divisor,
            sodium_mg: self.sodium_mg / divisor,
            vitamin_a_dv: self.vitamin_a_dv / divisor,
            vitamin_c_dv: self.vitamin_c_dv / divisor,
            calcium_dv: self.calcium_dv / divisor,
            iron_dv: self.iron_dv / divisor,
        }
    }

    /// (field name, value) pairs in declaration order
    pub fn fields(&self) -> [(&'static str, f64); 11] {
        [
            ("calories", self.calories),
            ("protein_g", self.protein_g),
            ("carbs_g", self.carbs_g),
            ("fat_g", self.fat_g),
            ("fiber_g", self.fiber_g),
            ("sugar_g", self.sugar_g),
            ("sodium_mg", self.sodium_mg),
            ("vitamin_a_dv", self.vitamin_a_dv),
            ("vitamin_c_dv", self.vitamin_c_dv),
            ("calcium_dv", self.calcium_dv),
            ("iron_dv", self.iron_dv),
        ]
    }
}

impl From<&NutrientRecord> for NutrientTotals {
    fn from(record: &NutrientRecord) -> Self {
        let mut totals = NutrientTotals::default();
        totals.accumulate(record, 1.0);
        totals
    }
}

/// Per-serving nutrition report for a recipe
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeNutrition {
    pub calories_per_serving: f64,
    pub protein_g: f64,
    pub carbs_g: f64,
    pub fat_g: f64,
    pub fiber_g: f64,
    pub sugar_g: f64,
    pub sodium_mg: f64,
    pub vitamin_a_dv: f64,
    pub vitamin_c_dv: f64,
    pub calcium_dv: f64,
    pub iron_dv: f64,
    pub servings: u32,
    /// Ingredients that could not be resolved to a mass or a nutrient record
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub missing_ingredients: Option<Vec<String>>,
}

impl RecipeNutrition {
    /// Build the display report from per-serving totals.
    ///
    /// Calories, sodium and the %DV fields are rounded to whole numbers; the five gram
    /// fields to one decimal.
    pub fn from_per_serving(per_serving: &NutrientTotals, servings: u32, missing: Vec<String>) -> Self {
        Self {
            calories_per_serving: per_serving.calories.round(),
            protein_g: round_one_decimal(per_serving.protein_g),
            carbs_g: round_one_decimal(per_serving.carbs_g),
            fat_g: round_one_decimal(per_serving.fat_g),
            fiber_g: round_one_decimal(per_serving.fiber_g),
            sugar_g: round_one_decimal(per_serving.sugar_g),
            sodium_mg: per_serving.sodium_mg.round(),
            vitamin_a_dv: per_serving.vitamin_a_dv.round(),
            vitamin_c_dv: per_serving.vitamin_c_dv.round(),
            calcium_dv: per_serving.calcium_dv.round(),
            iron_dv: per_serving.iron_dv.round(),
            servings,
            missing_ingredients: if missing.is_empty() { None } else { Some(missing) },
        }
    }

    /// True when some ingredients were left out and the numbers are an approximation
    pub fn is_approximate(&self) -> bool {
        self.missing_ingredients
            .as_ref()
            .is_some_and(|missing| !missing.is_empty())
    }
}

pub(crate) fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

impl fmt::Display for RecipeNutrition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} kcal | P {} g | C {} g | F {} g (per serving, {} servings)",
            self.calories_per_serving, self.protein_g, self.carbs_g, self.fat_g, self.servings
        )?;
        if let Some(missing) = &self.missing_ingredients {
            write!(f, " [approximate, missing: {}]", missing.join(", "))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_validation() {
        let record = NutrientRecord::new("chicken", 239.0, 27.0, 0.0, 14.0);
        assert!(record.validate().is_ok());

        let mut negative = record.clone();
        negative.fat_g = -1.0;
        assert!(negative.validate().is_err());

        let mut wrong_basis = record.clone();
        wrong_basis.serving_size_g = 50.0;
        assert!(wrong_basis.validate().is_err());

        let unnamed = NutrientRecord::new("  ", 1.0, 0.0, 0.0, 0.0);
        assert!(unnamed.validate().is_err());
    }

    #[test]
    fn test_universal_conversion() {
        assert!(UnitConversion::new("g", None, 1.0).is_universal());
        assert!(UnitConversion::new("g", Some("any"), 1.0).is_universal());
        assert!(!UnitConversion::new("taza", Some("flour"), 120.0).is_universal());
    }

    #[test]
    fn test_accumulate_and_divide() {
        let record = NutrientRecord::new("rice", 130.0, 2.7, 28.0, 0.3);
        let mut totals = NutrientTotals::default();
        totals.accumulate(&record, 2.0);
        assert_eq!(totals.calories, 260.0);
        assert_eq!(totals.carbs_g, 56.0);

        let halved = totals.divided_by(2.0);
        assert_eq!(halved.calories, 130.0);
    }

    #[test]
    fn test_report_rounding() {
        let per_serving = NutrientTotals {
            calories: 238.6,
            protein_g: 26.96,
            sodium_mg: 81.5,
            iron_dv: 4.4,
            ..Default::default()
        };
        let report = RecipeNutrition::from_per_serving(&per_serving, 2, Vec::new());
        assert_eq!(report.calories_per_serving, 239.0);
        assert_eq!(report.protein_g, 27.0);
        assert_eq!(report.sodium_mg, 82.0);
        assert_eq!(report.iron_dv, 4.0);
        assert_eq!(report.missing_ingredients, None);
        assert!(!report.is_approximate());
    }

    #[test]
    fn test_report_missing_is_omitted_from_json_when_empty() {
        let report = RecipeNutrition::from_per_serving(&NutrientTotals::default(), 1, Vec::new());
        let json = serde_json::to_string(&report).unwrap();
        assert!(!json.contains("missing_ingredients"));

        let approximate =
            RecipeNutrition::from_per_serving(&NutrientTotals::default(), 1, vec!["azafran".to_string()]);
        assert!(approximate.is_approximate());
        assert!(approximate.to_string().contains("azafran"));
    }

    #[test]
    fn test_effective_servings() {
        assert_eq!(Recipe::new("x", 0).effective_servings(), 1);
        assert_eq!(Recipe::new("x", 4).effective_servings(), 4);
    }

    #[test]
    fn test_with_servings_scales_amounts() {
        let recipe = Recipe::new("Arroz", 2)
            .with_ingredient(RecipeIngredient::new("arroz", "1 taza"))
            .with_ingredient(RecipeIngredient::new("sal", "al gusto"));

        let doubled = recipe.with_servings(4);
        assert_eq!(doubled.servings, 4);
        assert_eq!(doubled.ingredients[0].amount, "2 taza");
        assert_eq!(doubled.ingredients[1].amount, "al gusto");

        let same = recipe.with_servings(2);
        assert_eq!(same, recipe);
    }

    #[test]
    fn test_recipe_deserializes_with_defaults() {
        let json = r#"{"ingredients": [{"item": "pollo", "amount": "200g"}]}"#;
        let recipe: Recipe = serde_json::from_str(json).unwrap();
        assert_eq!(recipe.servings, 0);
        assert_eq!(recipe.ingredients[0].notes, None);
    }
}
