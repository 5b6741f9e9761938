//! # Unit Converter
//!
//! Resolves a parsed quantity + unit into grams for a given ingredient.
//!
//! The conversion table loaded from the store is consulted first. The seed rows defined
//! here are both what the store is seeded with and the last-resort fallback, so the two
//! can never drift apart.

use lazy_static::lazy_static;
use log::{debug, trace, warn};
use regex::Regex;

use crate::amount_parser::canonical_unit;
use crate::nutrition_model::{UnitConversion, ANY_CATEGORY};
use crate::text_processing::normalize_name;

/// Category used when no inference rule matches
pub const DEFAULT_CATEGORY: &str = "liquid";

/// Unit used for per-piece weights
pub const PIECE_UNIT: &str = "unidad";

/// Volume units that fall back to their liquid weight when no category row exists
const VOLUME_UNITS: &[&str] = &["taza", "cucharada", "cucharadita", "ml", "l"];

/// Base conversion rows: (unit, category, grams per unit).
pub const BASE_CONVERSIONS: &[(&str, &str, f64)] = &[
    ("g", ANY_CATEGORY, 1.0),
    ("kg", ANY_CATEGORY, 1000.0),
    ("ml", DEFAULT_CATEGORY, 1.0),
    ("l", DEFAULT_CATEGORY, 1000.0),
    ("taza", DEFAULT_CATEGORY, 240.0),
    ("cucharada", DEFAULT_CATEGORY, 15.0),
    ("cucharadita", DEFAULT_CATEGORY, 5.0),
    ("taza", "flour", 120.0),
    ("cucharada", "flour", 8.0),
    ("taza", "sugar", 200.0),
    ("cucharada", "sugar", 12.0),
    ("taza", "grain", 185.0),
    ("unidad", "egg", 50.0),
    ("diente", "garlic", 3.0),
    ("cucharada", "fat", 14.0),
    ("cucharadita", "fat", 5.0),
];

/// Per-piece weights for produce, added by the conversion update pass.
pub const PER_UNIT_CONVERSIONS: &[(&str, &str, f64)] = &[
    ("unidad", "avocado", 150.0),
    ("unidad", "lemon", 58.0),
    ("unidad", "lime", 67.0),
    ("unidad", "onion", 150.0),
    ("unidad", "tomato", 123.0),
    ("unidad", "potato", 173.0),
    ("unidad", "apple", 182.0),
    ("unidad", "banana", 118.0),
    ("unidad", "orange", 131.0),
    ("unidad", "carrot", 61.0),
    ("unidad", "bell_pepper", 119.0),
];

lazy_static! {
    // First match wins; specific ingredients come before the liquid default.
    static ref CATEGORY_RULES: Vec<(Regex, &'static str)> = [
        (r"\b(harinas?|flour|pan rallado|fecula|maicena)\b", "flour"),
        (r"\b(azucar|sugar|miel|honey)\b", "sugar"),
        (r"\b(arroz|rice|quinoa|quinua)\b", "grain"),
        (r"\b(aceites?|oil|manteca|mantequilla|butter|grasa)\b", "fat"),
        (r"\b(huevos?|eggs?)\b", "egg"),
        (r"\b(ajos?|garlic)\b", "garlic"),
        (r"\b(paltas?|aguacates?|avocados?)\b", "avocado"),
        (r"\b(limon(es)?|lemons?)\b", "lemon"),
        (r"\b(limas?|limes?)\b", "lime"),
        (r"\b(cebollas?|onions?)\b", "onion"),
        (r"\b(tomates?|tomato(es)?)\b", "tomato"),
        (r"\b(papas?|patatas?|potato(es)?)\b", "potato"),
        (r"\b(manzanas?|apples?)\b", "apple"),
        (r"\b(bananas?|platanos?)\b", "banana"),
        (r"\b(naranjas?|oranges?)\b", "orange"),
        (r"\b(zanahorias?|carrots?)\b", "carrot"),
        (r"\b(morron(es)?|pimientos?|bell peppers?)\b", "bell_pepper"),
    ]
    .iter()
    .map(|(pattern, category)| {
        (
            Regex::new(pattern).expect("Category pattern should be valid"),
            *category,
        )
    })
    .collect();
}

/// Infer the conversion category of an ingredient from its name.
///
/// # Examples
///
/// ```rust
/// use recipe_nutrition::unit_converter::infer_category;
///
/// assert_eq!(infer_category("Harina 0000"), "flour");
/// assert_eq!(infer_category("aceite de oliva"), "fat");
/// assert_eq!(infer_category("leche"), "liquid");
/// ```
pub fn infer_category(ingredient_name: &str) -> &'static str {
    let normalized = normalize_name(ingredient_name);
    CATEGORY_RULES
        .iter()
        .find(|(pattern, _)| pattern.is_match(&normalized))
        .map(|(_, category)| *category)
        .unwrap_or(DEFAULT_CATEGORY)
}

/// Categories with a seeded weight per "unidad"
fn is_piece_category(category: &str) -> bool {
    BASE_CONVERSIONS
        .iter()
        .chain(PER_UNIT_CONVERSIONS.iter())
        .any(|(unit, row_category, _)| *unit == PIECE_UNIT && *row_category == category)
}

/// Snapshot of conversion rows with category-aware lookup
#[derive(Debug, Clone, Default)]
pub struct UnitConversionTable {
    rows: Vec<UnitConversion>,
}

impl UnitConversionTable {
    pub fn new(rows: Vec<UnitConversion>) -> Self {
        Self { rows }
    }

    /// Table built from the base and per-unit seed rows.
    pub fn seed() -> Self {
        let rows = BASE_CONVERSIONS
            .iter()
            .chain(PER_UNIT_CONVERSIONS.iter())
            .map(|(unit, category, grams)| UnitConversion::new(unit, Some(*category), *grams))
            .collect();
        Self { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Grams per unit, preferring the category-specific row over a universal one.
    pub fn lookup(&self, unit: &str, category: &str) -> Option<f64> {
        let specific = self.rows.iter().find(|row| {
            row.unit_name == unit && row.ingredient_category.as_deref() == Some(category)
        });
        specific
            .or_else(|| {
                self.rows
                    .iter()
                    .find(|row| row.unit_name == unit && row.is_universal())
            })
            .map(|row| row.grams_per_unit)
    }
}

/// Converts parsed amounts into grams
#[derive(Debug, Clone)]
pub struct UnitConverter {
    table: UnitConversionTable,
    fallback: UnitConversionTable,
}

impl UnitConverter {
    /// Converter over a table loaded from the store.
    pub fn new(table: UnitConversionTable) -> Self {
        Self {
            table,
            fallback: UnitConversionTable::seed(),
        }
    }

    /// Converter for an empty or unavailable store.
    pub fn fallback_only() -> Self {
        Self::new(UnitConversionTable::default())
    }

    /// Convert `quantity` of `unit` of the named ingredient into grams.
    ///
    /// Returns `None` when no conversion path exists.
    pub fn convert_to_grams(
        &self,
        quantity: f64,
        unit: &str,
        ingredient_name: &str,
        category: Option<&str>,
    ) -> Option<f64> {
        match unit {
            "g" => return Some(quantity),
            "kg" => return Some(quantity * 1000.0),
            _ => {}
        }

        let category = category.unwrap_or_else(|| infer_category(ingredient_name));
        trace!(
            "Converting {} {} of '{}' (category {})",
            quantity,
            unit,
            ingredient_name,
            category
        );

        if let Some(grams) = self
            .table
            .lookup(unit, category)
            .or_else(|| self.fallback.lookup(unit, category))
        {
            return Some(quantity * grams);
        }

        if let Some(grams) = self.default_grams(unit, ingredient_name) {
            debug!("Default conversion for {} of '{}': {} g", unit, ingredient_name, grams);
            return Some(quantity * grams);
        }

        warn!(
            "No conversion from '{}' to grams for '{}' (category {})",
            unit, ingredient_name, category
        );
        None
    }

    fn default_grams(&self, unit: &str, ingredient_name: &str) -> Option<f64> {
        if VOLUME_UNITS.contains(&unit) {
            return self.fallback.lookup(unit, DEFAULT_CATEGORY);
        }

        // "unidad" weighs a piece of the ingredient; a count noun ("huevo" from "3 huevos")
        // only counts when it names a food with a per-piece weight, not a container
        let piece_category = if unit == PIECE_UNIT {
            infer_category(ingredient_name)
        } else if canonical_unit(unit).is_none() {
            infer_category(unit)
        } else {
            return None;
        };
        if !is_piece_category(piece_category) {
            return None;
        }
        self.table
            .lookup(PIECE_UNIT, piece_category)
            .or_else(|| self.fallback.lookup(PIECE_UNIT, piece_category))
    }
}

impl Default for UnitConverter {
    fn default() -> Self {
        Self::fallback_only()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_units() {
        let converter = UnitConverter::fallback_only();
        assert_eq!(converter.convert_to_grams(2.0, "kg", "arroz", None), Some(2000.0));
        assert_eq!(converter.convert_to_grams(150.0, "g", "anything", None), Some(150.0));
    }

    #[test]
    fn test_category_specific_conversions() {
        let converter = UnitConverter::fallback_only();
        assert_eq!(converter.convert_to_grams(1.0, "taza", "harina", None), Some(120.0));
        assert_eq!(converter.convert_to_grams(1.0, "unidad", "huevo", None), Some(50.0));
        assert_eq!(converter.convert_to_grams(2.0, "cucharada", "azúcar", None), Some(24.0));
        assert_eq!(converter.convert_to_grams(1.0, "taza", "arroz", None), Some(185.0));
        assert_eq!(converter.convert_to_grams(2.0, "diente", "ajo", None), Some(6.0));
    }

    #[test]
    fn test_volume_defaults_to_liquid() {
        let converter = UnitConverter::fallback_only();
        assert_eq!(converter.convert_to_grams(1.0, "taza", "leche", None), Some(240.0));
        assert_eq!(converter.convert_to_grams(0.5, "l", "caldo", None), Some(500.0));
        // no fat row for "taza": liquid weight
        assert_eq!(converter.convert_to_grams(1.0, "taza", "aceite", None), Some(240.0));
    }

    #[test]
    fn test_per_piece_weights() {
        let converter = UnitConverter::fallback_only();
        assert_eq!(converter.convert_to_grams(2.0, "unidad", "palta", None), Some(300.0));
        assert_eq!(converter.convert_to_grams(1.0, "unidad", "Limón", None), Some(58.0));
        assert_eq!(converter.convert_to_grams(1.0, "unidad", "morrón rojo", None), Some(119.0));
        assert_eq!(converter.convert_to_grams(3.0, "huevo", "huevos", None), Some(150.0));
        assert_eq!(converter.convert_to_grams(2.0, "tomate", "salsa", None), Some(246.0));
    }

    #[test]
    fn test_unconvertible() {
        let converter = UnitConverter::fallback_only();
        assert_eq!(converter.convert_to_grams(1.0, "unidad", "pollo", None), None);
        assert_eq!(converter.convert_to_grams(2.0, "lata", "atun", None), None);
        assert_eq!(converter.convert_to_grams(1.0, "diente", "pollo", None), None);
    }

    #[test]
    fn test_container_nouns_have_no_weight() {
        let converter = UnitConverter::fallback_only();
        for (amount, item) in [("1 docena", "huevos"), ("1 lata", "tomate"), ("1 bolsa", "cebolla")] {
            let parsed = crate::amount_parser::parse_amount(amount);
            assert_eq!(
                converter.convert_to_grams(parsed.quantity, &parsed.unit, item, None),
                None,
                "{amount} of {item}"
            );
        }
        // the noun is the food itself
        assert_eq!(converter.convert_to_grams(2.0, "limon", "jugo", None), Some(116.0));
    }

    #[test]
    fn test_explicit_category_overrides_inference() {
        let converter = UnitConverter::fallback_only();
        assert_eq!(converter.convert_to_grams(1.0, "taza", "mezcla", Some("flour")), Some(120.0));
    }

    #[test]
    fn test_store_table_takes_precedence() {
        let table = UnitConversionTable::new(vec![UnitConversion::new("taza", Some("flour"), 125.0)]);
        let converter = UnitConverter::new(table);
        assert_eq!(converter.convert_to_grams(1.0, "taza", "harina", None), Some(125.0));
        assert_eq!(converter.convert_to_grams(1.0, "cucharada", "harina", None), Some(8.0));
    }

    #[test]
    fn test_table_lookup_prefers_specific_row() {
        let table = UnitConversionTable::new(vec![
            UnitConversion::new("taza", None, 240.0),
            UnitConversion::new("taza", Some("sugar"), 200.0),
        ]);
        assert_eq!(table.lookup("taza", "sugar"), Some(200.0));
        assert_eq!(table.lookup("taza", "grain"), Some(240.0));
        assert_eq!(table.lookup("cucharada", "sugar"), None);
    }

    #[test]
    fn test_infer_category_order() {
        assert_eq!(infer_category("pan rallado"), "flour");
        assert_eq!(infer_category("miel"), "sugar");
        assert_eq!(infer_category("quinoa"), "grain");
        assert_eq!(infer_category("manteca"), "fat");
        assert_eq!(infer_category("huevos"), "egg");
        assert_eq!(infer_category("limas"), "lime");
        assert_eq!(infer_category("pimienta"), "liquid");
        assert_eq!(infer_category("agua"), "liquid");
    }

    #[test]
    fn test_seed_table_has_every_row() {
        let table = UnitConversionTable::seed();
        assert_eq!(table.len(), BASE_CONVERSIONS.len() + PER_UNIT_CONVERSIONS.len());
        assert!(BASE_CONVERSIONS.iter().all(|(_, _, grams)| *grams > 0.0));
    }
}
