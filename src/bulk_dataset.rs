//! # Bulk Reference Dataset
//!
//! Loading, searching and converting the FoodData Central "Foundation Foods" JSON export.
//! Nutrient amounts in the export are per 100 g and keyed by numeric nutrient id.

use log::{debug, info, trace, warn};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

use crate::nutrition_config::MatchConfig;
use crate::nutrition_errors::NutritionError;
use crate::nutrition_model::{round_one_decimal, NutrientRecord, BULK_CATEGORY};
use crate::text_processing::{normalize_name, significant_tokens, tokens};

// Nutrient ids
const ENERGY_KCAL: u32 = 1008;
const ENERGY_ATWATER_GENERAL: u32 = 2047;
const ENERGY_ATWATER_SPECIFIC: u32 = 2048;
const PROTEIN: u32 = 1003;
const FAT: u32 = 1004;
const CARBOHYDRATE: u32 = 1005;
const FIBER: u32 = 1079;
const SUGARS_TOTAL: u32 = 2000;
const SUGARS_NLEA: u32 = 1063;
const CALCIUM: u32 = 1087;
const IRON: u32 = 1089;
const SODIUM: u32 = 1093;
const VITAMIN_A_RAE: u32 = 1106;
const VITAMIN_C: u32 = 1162;

// Daily reference intakes used for the %DV fields
const VITAMIN_A_DAILY_UG: f64 = 900.0;
const VITAMIN_C_DAILY_MG: f64 = 90.0;
const CALCIUM_DAILY_MG: f64 = 1300.0;
const IRON_DAILY_MG: f64 = 18.0;

/// The whole export
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BulkDataset {
    #[serde(rename = "FoundationFoods", default)]
    pub foods: Vec<FoundationFood>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FoundationFood {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub food_class: Option<String>,
    #[serde(default)]
    pub food_nutrients: Vec<FoodNutrient>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FoodNutrient {
    pub nutrient: Option<NutrientInfo>,
    pub amount: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NutrientInfo {
    pub id: u32,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub unit_name: Option<String>,
}

/// Search tier over food descriptions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BulkTier {
    Exact,
    DescriptionContainsQuery,
    QueryContainsDescription,
    WordOverlap,
}

type BulkStrategy = fn(&str, &str, &MatchConfig) -> bool;

/// Tried in order, first food matching a tier wins.
const BULK_TIERS: &[(BulkTier, BulkStrategy)] = &[
    (BulkTier::Exact, exact),
    (BulkTier::DescriptionContainsQuery, description_contains_query),
    (BulkTier::QueryContainsDescription, query_contains_description),
    (BulkTier::WordOverlap, word_overlap),
];

fn exact(query: &str, description: &str, _config: &MatchConfig) -> bool {
    description == query
}

fn description_contains_query(query: &str, description: &str, _config: &MatchConfig) -> bool {
    description.contains(query)
}

fn query_contains_description(query: &str, description: &str, config: &MatchConfig) -> bool {
    description.chars().count() >= config.min_reverse_description_len && query.contains(description)
}

fn word_overlap(query: &str, description: &str, config: &MatchConfig) -> bool {
    let query_words = significant_tokens(query, config.min_token_len_exclusive);
    let description_words = significant_tokens(description, config.min_token_len_exclusive);
    query_words.iter().any(|q| {
        description_words
            .iter()
            .any(|d| d.contains(q) || q.contains(d))
    })
}

impl BulkDataset {
    /// Read and decode the export from disk.
    pub fn load_from_path(path: &Path) -> Result<Self, NutritionError> {
        let raw = std::fs::read_to_string(path)
            .inspect_err(|e| warn!("Cannot read bulk dataset {}: {}", path.display(), e))?;
        let dataset = Self::from_json_str(&raw)?;
        info!("Loaded {} foods from {}", dataset.len(), path.display());
        Ok(dataset)
    }

    pub fn from_json_str(raw: &str) -> Result<Self, NutritionError> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn len(&self) -> usize {
        self.foods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.foods.is_empty()
    }

    /// Find the food whose description best matches an English query.
    pub fn search(&self, english_query: &str, config: &MatchConfig) -> Option<(BulkTier, &FoundationFood)> {
        let query = normalize_name(english_query);
        if query.is_empty() {
            return None;
        }
        let descriptions: Vec<String> = self
            .foods
            .iter()
            .map(|food| normalize_name(&food.description))
            .collect();

        for &(tier, matches) in BULK_TIERS {
            trace!("Bulk search '{}' tier {:?}", query, tier);
            let hit = descriptions
                .iter()
                .position(|description| !description.is_empty() && matches(&query, description.as_str(), config));
            if let Some(index) = hit {
                debug!(
                    "Bulk match for '{}' ({:?}): '{}'",
                    query, tier, self.foods[index].description
                );
                return Some((tier, &self.foods[index]));
            }
        }
        debug!("No bulk match for '{}'", query);
        None
    }
}

impl FoundationFood {
    /// nutrient id → amount per 100 g; later duplicates overwrite earlier ones
    fn amounts(&self) -> HashMap<u32, f64> {
        self.food_nutrients
            .iter()
            .filter_map(|entry| Some((entry.nutrient.as_ref()?.id, entry.amount?)))
            .collect()
    }

    /// Build a nutrient record for this food under the given ingredient name.
    pub fn to_nutrient_record(&self, ingredient_name: &str) -> NutrientRecord {
        let amounts = self.amounts();
        let first = |ids: &[u32]| ids.iter().find_map(|id| amounts.get(id).copied()).unwrap_or(0.0);
        let daily_value = |id: u32, reference: f64| (first(&[id]) / reference * 100.0).round();

        let mut record = NutrientRecord::new(
            &normalize_name(ingredient_name),
            first(&[ENERGY_KCAL, ENERGY_ATWATER_GENERAL, ENERGY_ATWATER_SPECIFIC]).round(),
            round_one_decimal(first(&[PROTEIN])),
            round_one_decimal(first(&[CARBOHYDRATE])),
            round_one_decimal(first(&[FAT])),
        )
        .with_category(BULK_CATEGORY);
        record.fiber_g = round_one_decimal(first(&[FIBER]));
        record.sugar_g = round_one_decimal(first(&[SUGARS_TOTAL, SUGARS_NLEA]));
        record.sodium_mg = first(&[SODIUM]).round();
        record.vitamin_a_dv = daily_value(VITAMIN_A_RAE, VITAMIN_A_DAILY_UG);
        record.vitamin_c_dv = daily_value(VITAMIN_C, VITAMIN_C_DAILY_MG);
        record.calcium_dv = daily_value(CALCIUM, CALCIUM_DAILY_MG);
        record.iron_dv = daily_value(IRON, IRON_DAILY_MG);
        record
    }

    /// Whether the description has any token at all (empty descriptions never match)
    pub fn has_description(&self) -> bool {
        tokens(&self.description).next().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = include_str!("../data/foundation_foods_sample.json");

    fn dataset() -> BulkDataset {
        BulkDataset::from_json_str(SAMPLE).unwrap()
    }

    #[test]
    fn test_loads_sample() {
        let dataset = dataset();
        assert!(dataset.len() >= 10);
        assert!(dataset.foods.iter().all(FoundationFood::has_description));
    }

    #[test]
    fn test_search_tiers() {
        let dataset = dataset();
        let config = MatchConfig::default();

        let (tier, food) = dataset.search("Broccoli, raw", &config).unwrap();
        assert_eq!(tier, BulkTier::Exact);
        assert_eq!(food.description, "Broccoli, raw");

        let (tier, food) = dataset.search("salmon", &config).unwrap();
        assert_eq!(tier, BulkTier::DescriptionContainsQuery);
        assert!(food.description.starts_with("Salmon"));

        let (tier, food) = dataset.search("broccoli, raw florets chopped", &config).unwrap();
        assert_eq!(tier, BulkTier::QueryContainsDescription);
        assert_eq!(food.description, "Broccoli, raw");

        let (tier, food) = dataset.search("red peppers", &config).unwrap();
        assert_eq!(tier, BulkTier::WordOverlap);
        assert!(food.description.starts_with("Peppers"));

        assert!(dataset.search("dragonfruit", &config).is_none());
        assert!(dataset.search("  ", &config).is_none());
    }

    #[test]
    fn test_energy_falls_back_to_atwater() {
        let dataset = dataset();
        let (_, lentils) = dataset.search("lentils", &MatchConfig::default()).unwrap();
        let record = lentils.to_nutrient_record("Lentejas");
        assert_eq!(record.ingredient_name, "lentejas");
        assert_eq!(record.calories, 352.0);
        assert_eq!(record.protein_g, 23.6);
        assert_eq!(record.category, BULK_CATEGORY);
        assert_eq!(record.serving_size_g, 100.0);
        // 6.5 mg iron / 18 mg
        assert_eq!(record.iron_dv, 36.0);
        assert!(record.validate().is_ok());
    }

    #[test]
    fn test_sugar_falls_back_to_nlea_id() {
        let dataset = dataset();
        let (_, banana) = dataset.search("banana", &MatchConfig::default()).unwrap();
        let record = banana.to_nutrient_record("banana");
        assert_eq!(record.sugar_g, 15.8);
    }

    #[test]
    fn test_missing_nutrients_default_to_zero() {
        let raw = r#"{"FoundationFoods":[{"description":"Water, tap","foodNutrients":[{"nutrient":{"id":1093},"amount":4.0},{"nutrient":null},{"amount":3.0}]}]}"#;
        let dataset = BulkDataset::from_json_str(raw).unwrap();
        let record = dataset.foods[0].to_nutrient_record("agua");
        assert_eq!(record.calories, 0.0);
        assert_eq!(record.sodium_mg, 4.0);
        assert_eq!(record.vitamin_c_dv, 0.0);
    }

    #[test]
    fn test_malformed_json_is_a_dataset_error() {
        let result = BulkDataset::from_json_str("{not json");
        assert!(matches!(result, Err(NutritionError::Dataset(_))));
    }

    #[test]
    fn test_missing_file_is_a_dataset_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = BulkDataset::load_from_path(&dir.path().join("absent.json"));
        assert!(matches!(result, Err(NutritionError::Dataset(_))));
    }
}
