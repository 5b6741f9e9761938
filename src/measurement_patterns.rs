//! # Measurement Patterns Module
//!
//! This module contains regex patterns and constants used for amount parsing.
//! All patterns run against text that was lowercased and diacritic-folded first.

use lazy_static::lazy_static;
use regex::Regex;

/// A quantity token: mixed fraction, simple fraction, decimal or a vulgar fraction glyph.
pub const QUANTITY: &str = r"(\d+\s+\d+/\d+|\d+/\d+|\d+(?:\.\d+)?|[½⅓⅔¼¾⅛])";

// Longer alternatives come first so "kg" is not read as "k" + "g", "gramos" not as "g".
const UNIT_WORDS: &str = r"kilogramos?|kilos?|kg|gramos?|gr|g|mililitros?|ml|litros?|l|tazas?|cucharaditas?|cditas?|cdtas?|cucharadas?|cdas?|unidad(?:es)?|dientes?";

lazy_static! {
    /// "al gusto", "a gusto", "opcional", "algunas", "un poco", "c/n"
    pub static ref NON_QUANTIFIABLE: Regex =
        Regex::new(r"(al?\s*gusto|opcional|algun[oa]s?|un\s*poco|c/n)")
            .expect("Non-quantifiable pattern should be valid");

    /// Explicit gram value in parentheses: "1 pechuga (150g)"
    pub static ref PARENTHETICAL_GRAMS: Regex =
        Regex::new(r"\((\d+(?:\.\d+)?)\s*(?:g|gr|gramos?)\)")
            .expect("Parenthetical grams pattern should be valid");

    /// Numeric range with an optional trailing word: "2-3 tazas", "2 a 3 huevos"
    pub static ref RANGE: Regex = Regex::new(&format!(
        r"{QUANTITY}\s*(?:-|–|\s+a\s+)\s*{QUANTITY}(?:\s*([a-z]+))?"
    ))
    .expect("Range pattern should be valid");

    /// Number followed by a known unit: "2 tazas", "150g", "1 1/2 cdas"
    pub static ref QUANTITY_WITH_UNIT: Regex =
        Regex::new(&format!(r"{QUANTITY}\s*({UNIT_WORDS})\b"))
            .expect("Quantity with unit pattern should be valid");

    /// Number followed by a free word: "3 huevos"
    pub static ref QUANTITY_WITH_NOUN: Regex =
        Regex::new(&format!(r"^{QUANTITY}\s+([a-z]+)\b"))
            .expect("Quantity with noun pattern should be valid");

    /// A bare number and nothing else: "200"
    pub static ref BARE_QUANTITY: Regex = Regex::new(&format!(r"^{QUANTITY}$"))
        .expect("Bare quantity pattern should be valid");

    /// Any quantity occurrence, used when rescaling amount strings.
    pub static ref ANY_QUANTITY: Regex =
        Regex::new(QUANTITY).expect("Quantity pattern should be valid");

    /// Decimal comma between digits: "1,5" -> "1.5"
    pub static ref DECIMAL_COMMA: Regex =
        Regex::new(r"(\d),(\d)").expect("Decimal comma pattern should be valid");
}
