//! # Amount Parser
//!
//! Turns the free-text amount of a recipe ingredient into a [`ParsedAmount`].
//!
//! ## Features
//!
//! - Non-quantifiable markers ("al gusto", "opcional", "c/n", ...) → skip sentinel
//! - Explicit gram values in parentheses ("1 pechuga (150g)")
//! - Ranges averaged ("2-3 tazas" → 2.5 taza)
//! - Known units with plural and abbreviated forms, grams resolved for g / kg
//! - Count nouns ("3 huevos" → 3 huevo)
//! - Bare numbers read as grams
//! - Fractions (1/2, 1 1/2, ½) and decimal commas
//!
//! ## Usage
//!
//! ```rust
//! use recipe_nutrition::amount_parser::parse_amount;
//!
//! let parsed = parse_amount("2 tazas");
//! assert_eq!(parsed.quantity, 2.0);
//! assert_eq!(parsed.unit, "taza");
//! assert_eq!(parsed.grams, None);
//! ```

use log::{debug, trace, warn};

use crate::measurement_patterns::{
    ANY_QUANTITY, BARE_QUANTITY, DECIMAL_COMMA, NON_QUANTIFIABLE, PARENTHETICAL_GRAMS,
    QUANTITY_WITH_NOUN, QUANTITY_WITH_UNIT, RANGE,
};
use crate::nutrition_model::ParsedAmount;
use crate::text_processing::fold_diacritics;

/// Unit of the "skip this ingredient" sentinel
pub const UNIT_VARIABLE: &str = "variable";
/// Unit of the "could not parse" sentinel
pub const UNIT_UNKNOWN: &str = "unknown";
/// Unit assumed for ranges without a unit word
pub const UNIT_PIECE: &str = "unidad";

/// Words that can follow a number without being a count noun
const CONNECTORS: &[&str] = &["de", "del", "con", "para", "por"];

/// Parse a free-text amount.
///
/// Rules are tried in priority order; the first one that applies wins:
///
/// 1. non-quantifiable marker → quantity 0, unit `variable`, grams 0
/// 2. parenthetical gram value → quantity = grams = that value, unit `g`
/// 3. numeric range → average of the bounds, grams pending
/// 4. number + known unit → grams resolved for `g` and `kg` only
/// 5. number + other word → count noun, singularised
/// 6. bare number → grams
/// 7. anything else → quantity 0, unit `unknown`, grams 0 (logged)
pub fn parse_amount(text: &str) -> ParsedAmount {
    let normalized = normalize_amount(text);
    trace!("Parsing amount '{}' (normalized '{}')", text, normalized);

    if NON_QUANTIFIABLE.is_match(&normalized) {
        debug!("Amount '{}' is not quantifiable, skipping", text);
        return ParsedAmount::variable();
    }

    if let Some(captures) = PARENTHETICAL_GRAMS.captures(&normalized) {
        if let Ok(grams) = captures[1].parse::<f64>() {
            return ParsedAmount::new(grams, "g", Some(grams));
        }
    }

    if let Some(captures) = RANGE.captures(&normalized) {
        let bounds = (parse_quantity(&captures[1]), parse_quantity(&captures[2]));
        if let (Some(min), Some(max)) = bounds {
            let unit = captures
                .get(3)
                .map(|word| unit_from_word(word.as_str()))
                .unwrap_or_else(|| UNIT_PIECE.to_string());
            debug!("Range amount '{}' -> {}..{} {}", text, min, max, unit);
            return ParsedAmount::new((min + max) / 2.0, &unit, None);
        }
    }

    if let Some(captures) = QUANTITY_WITH_UNIT.captures(&normalized) {
        if let Some(quantity) = parse_quantity(&captures[1]) {
            let unit = canonical_unit(&captures[2]).unwrap_or("unidad");
            let grams = match unit {
                "g" => Some(quantity),
                "kg" => Some(quantity * 1000.0),
                _ => None,
            };
            return ParsedAmount::new(quantity, unit, grams);
        }
    }

    if let Some(captures) = QUANTITY_WITH_NOUN.captures(&normalized) {
        let word = &captures[2];
        if !CONNECTORS.contains(&word) && word.len() > 2 {
            if let Some(quantity) = parse_quantity(&captures[1]) {
                return ParsedAmount::new(quantity, &singularize(word), None);
            }
        }
    }

    if let Some(captures) = BARE_QUANTITY.captures(&normalized) {
        if let Some(quantity) = parse_quantity(&captures[1]) {
            return ParsedAmount::new(quantity, "g", Some(quantity));
        }
    }

    warn!("Could not parse amount: '{}'", text);
    ParsedAmount::unknown()
}

/// Lowercase, fold accents, trim and turn decimal commas into points.
fn normalize_amount(text: &str) -> String {
    let folded = fold_diacritics(&text.to_lowercase());
    DECIMAL_COMMA.replace_all(folded.trim(), "$1.$2").into_owned()
}

/// Read one quantity token: "2", "1.5", "1/2", "1 1/2", "½".
pub fn parse_quantity(token: &str) -> Option<f64> {
    let token = token.trim();
    match token {
        "½" => return Some(0.5),
        "⅓" => return Some(1.0 / 3.0),
        "⅔" => return Some(2.0 / 3.0),
        "¼" => return Some(0.25),
        "¾" => return Some(0.75),
        "⅛" => return Some(0.125),
        _ => {}
    }

    if let Some((whole, fraction)) = token.split_once(char::is_whitespace) {
        let whole = whole.parse::<f64>().ok()?;
        return Some(whole + parse_quantity(fraction)?);
    }

    if let Some((numerator, denominator)) = token.split_once('/') {
        let numerator = numerator.parse::<f64>().ok()?;
        let denominator = denominator.parse::<f64>().ok()?;
        if denominator == 0.0 {
            return None;
        }
        return Some(numerator / denominator);
    }

    token.parse::<f64>().ok()
}

/// Map a unit spelling (plural, abbreviation) to its canonical singular form.
///
/// Returns `None` for words that are not measurement units.
pub fn canonical_unit(word: &str) -> Option<&'static str> {
    let unit = match word.trim() {
        "g" | "gr" | "gramo" | "gramos" => "g",
        "kg" | "kilo" | "kilos" | "kilogramo" | "kilogramos" => "kg",
        "ml" | "mililitro" | "mililitros" => "ml",
        "l" | "litro" | "litros" => "l",
        "taza" | "tazas" => "taza",
        "cucharada" | "cucharadas" | "cda" | "cdas" => "cucharada",
        "cucharadita" | "cucharaditas" | "cdta" | "cdtas" | "cdita" | "cditas" => "cucharadita",
        "unidad" | "unidades" => "unidad",
        "diente" | "dientes" => "diente",
        _ => return None,
    };
    Some(unit)
}

fn unit_from_word(word: &str) -> String {
    canonical_unit(word)
        .map(str::to_string)
        .unwrap_or_else(|| singularize(word))
}

/// Spanish plural → singular for count nouns ("huevos" → "huevo", "limones" → "limon").
pub fn singularize(word: &str) -> String {
    if let Some(stem) = word.strip_suffix("ces") {
        return format!("{stem}z");
    }
    if let Some(stem) = word.strip_suffix("es") {
        if stem.ends_with(['r', 'l', 'n', 'd', 'y']) && stem.len() > 1 {
            return stem.to_string();
        }
    }
    match word.strip_suffix('s') {
        Some(stem) if !stem.is_empty() => stem.to_string(),
        _ => word.to_string(),
    }
}

/// Multiply every quantity in an amount string by `multiplier`.
///
/// Non-quantifiable and unparseable amounts come back unchanged, as does everything
/// around the numbers.
///
/// # Examples
///
/// ```rust
/// use recipe_nutrition::amount_parser::scale_amount;
///
/// assert_eq!(scale_amount("2-3 tazas", 2.0), "4-6 tazas");
/// assert_eq!(scale_amount("1 unidad (150g)", 0.5), "0.5 unidad (75g)");
/// assert_eq!(scale_amount("sal a gusto", 3.0), "sal a gusto");
/// ```
pub fn scale_amount(amount: &str, multiplier: f64) -> String {
    if (multiplier - 1.0).abs() < f64::EPSILON {
        return amount.to_string();
    }
    let folded = fold_diacritics(&amount.to_lowercase());
    if NON_QUANTIFIABLE.is_match(&folded) || !ANY_QUANTITY.is_match(amount) {
        return amount.to_string();
    }

    let with_points = DECIMAL_COMMA.replace_all(amount.trim(), "$1.$2");
    ANY_QUANTITY
        .replace_all(&with_points, |captures: &regex::Captures| {
            match parse_quantity(&captures[1]) {
                Some(quantity) => format_quantity(quantity * multiplier),
                None => captures[0].to_string(),
            }
        })
        .into_owned()
}

/// Below 1: two decimals, below 10: one decimal, otherwise whole; trailing zeros dropped.
pub fn format_quantity(value: f64) -> String {
    let formatted = if value < 1.0 {
        format!("{value:.2}")
    } else if value < 10.0 {
        format!("{value:.1}")
    } else {
        format!("{}", value.round())
    };
    if formatted.contains('.') {
        formatted
            .trim_end_matches('0')
            .trim_end_matches('.')
            .to_string()
    } else {
        formatted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_quantifiable_markers() {
        for text in ["al gusto", "A gusto", "Opcional", "algunas hojas", "un poco", "C/N", "sal AL GUSTO"] {
            let parsed = parse_amount(text);
            assert_eq!(parsed.quantity, 0.0, "marker '{}'", text);
            assert!(parsed.is_variable(), "marker '{}'", text);
            assert_eq!(parsed.grams, Some(0.0));
        }
    }

    #[test]
    fn test_parenthetical_grams() {
        let parsed = parse_amount("1 pechuga (150g)");
        assert_eq!(parsed, ParsedAmount::new(150.0, "g", Some(150.0)));

        let spaced = parse_amount("2 filetes (200 gr)");
        assert_eq!(spaced.grams, Some(200.0));
    }

    #[test]
    fn test_ranges_are_averaged() {
        let parsed = parse_amount("2-3 cucharadas");
        assert_eq!(parsed.quantity, 2.5);
        assert_eq!(parsed.unit, "cucharada");
        assert_eq!(parsed.grams, None);

        let worded = parse_amount("2 a 3 tazas");
        assert_eq!(worded.quantity, 2.5);
        assert_eq!(worded.unit, "taza");

        let bare = parse_amount("1-2");
        assert_eq!(bare.quantity, 1.5);
        assert_eq!(bare.unit, "unidad");
    }

    #[test]
    fn test_units() {
        assert_eq!(parse_amount("2 tazas"), ParsedAmount::new(2.0, "taza", None));
        assert_eq!(parse_amount("150g"), ParsedAmount::new(150.0, "g", Some(150.0)));
        assert_eq!(parse_amount("1.5 kg"), ParsedAmount::new(1.5, "kg", Some(1500.0)));
        assert_eq!(parse_amount("250 ml"), ParsedAmount::new(250.0, "ml", None));
        assert_eq!(parse_amount("2 dientes"), ParsedAmount::new(2.0, "diente", None));
        assert_eq!(parse_amount("3 unidades"), ParsedAmount::new(3.0, "unidad", None));
        assert_eq!(parse_amount("1 cdita"), ParsedAmount::new(1.0, "cucharadita", None));
        assert_eq!(parse_amount("200 gramos"), ParsedAmount::new(200.0, "g", Some(200.0)));
    }

    #[test]
    fn test_unit_does_not_match_inside_words() {
        // "l" must not be read out of "latas"
        let parsed = parse_amount("2 latas");
        assert_eq!(parsed.unit, "lata");
        assert_eq!(parsed.grams, None);
    }

    #[test]
    fn test_decimal_comma_and_fractions() {
        assert_eq!(parse_amount("1,5 tazas").quantity, 1.5);
        assert_eq!(parse_amount("1/2 taza").quantity, 0.5);
        assert_eq!(parse_amount("1 1/2 tazas").quantity, 1.5);
        assert_eq!(parse_amount("½ taza").quantity, 0.5);
    }

    #[test]
    fn test_count_nouns_are_singularized() {
        assert_eq!(parse_amount("3 huevos"), ParsedAmount::new(3.0, "huevo", None));
        assert_eq!(parse_amount("2 limones"), ParsedAmount::new(2.0, "limon", None));
        assert_eq!(parse_amount("4 Tomates"), ParsedAmount::new(4.0, "tomate", None));
    }

    #[test]
    fn test_bare_number_is_grams() {
        assert_eq!(parse_amount("200"), ParsedAmount::new(200.0, "g", Some(200.0)));
    }

    #[test]
    fn test_unparseable() {
        for text in ["", "un chorrito", "2 de", "mucho"] {
            let parsed = parse_amount(text);
            assert!(parsed.is_unknown(), "text '{}'", text);
            assert_eq!(parsed.quantity, 0.0);
        }
    }

    #[test]
    fn test_singularize() {
        assert_eq!(singularize("huevos"), "huevo");
        assert_eq!(singularize("panes"), "pan");
        assert_eq!(singularize("nueces"), "nuez");
        assert_eq!(singularize("tomates"), "tomate");
        assert_eq!(singularize("papa"), "papa");
    }

    #[test]
    fn test_parse_quantity() {
        assert_eq!(parse_quantity("2"), Some(2.0));
        assert_eq!(parse_quantity("3/4"), Some(0.75));
        assert_eq!(parse_quantity("2 1/4"), Some(2.25));
        assert_eq!(parse_quantity("1/0"), None);
        assert_eq!(parse_quantity("abc"), None);
    }

    #[test]
    fn test_scale_amount() {
        assert_eq!(scale_amount("1 taza", 2.0), "2 taza");
        assert_eq!(scale_amount("200g", 1.5), "300g");
        assert_eq!(scale_amount("1,5 kg", 2.0), "3 kg");
        assert_eq!(scale_amount("1/2 taza", 0.5), "0.25 taza");
        assert_eq!(scale_amount("opcional", 2.0), "opcional");
        assert_eq!(scale_amount("3 huevos", 1.0), "3 huevos");
    }

    #[test]
    fn test_format_quantity() {
        assert_eq!(format_quantity(0.5), "0.5");
        assert_eq!(format_quantity(0.333), "0.33");
        assert_eq!(format_quantity(2.0), "2");
        assert_eq!(format_quantity(2.26), "2.3");
        assert_eq!(format_quantity(12.6), "13");
    }
}
