//! # Text Processing Module
//!
//! Normalisation helpers shared by the parser, the converter, the translator and the
//! matcher. Every comparison in the engine runs on strings produced here.
//!
//! ## Features
//!
//! - Diacritic folding for Spanish text (`"limón"` → `"limon"`, `"ñoqui"` → `"noqui"`)
//! - Name normalisation: lowercase, folded, trimmed, whitespace collapsed
//! - Tokenisation that ignores punctuation (`"Chicken, breast"` → `["chicken", "breast"]`)

use log::trace;

/// Replace accented latin characters with their base letter.
///
/// Only the characters that show up in Spanish, Portuguese and French ingredient lists are
/// mapped; everything else passes through untouched.
///
/// # Examples
///
/// ```rust
/// use recipe_nutrition::text_processing::fold_diacritics;
///
/// assert_eq!(fold_diacritics("azúcar morena"), "azucar morena");
/// assert_eq!(fold_diacritics("Pimentón"), "Pimenton");
/// ```
pub fn fold_diacritics(text: &str) -> String {
    text.chars().map(fold_char).collect()
}

fn fold_char(c: char) -> char {
    match c {
        'á' | 'à' | 'ä' | 'â' | 'ã' => 'a',
        'Á' | 'À' | 'Ä' | 'Â' | 'Ã' => 'A',
        'é' | 'è' | 'ë' | 'ê' => 'e',
        'É' | 'È' | 'Ë' | 'Ê' => 'E',
        'í' | 'ì' | 'ï' | 'î' => 'i',
        'Í' | 'Ì' | 'Ï' | 'Î' => 'I',
        'ó' | 'ò' | 'ö' | 'ô' | 'õ' => 'o',
        'Ó' | 'Ò' | 'Ö' | 'Ô' | 'Õ' => 'O',
        'ú' | 'ù' | 'ü' | 'û' => 'u',
        'Ú' | 'Ù' | 'Ü' | 'Û' => 'U',
        'ñ' => 'n',
        'Ñ' => 'N',
        'ç' => 'c',
        'Ç' => 'C',
        other => other,
    }
}

/// Normalise an ingredient or food name for comparison.
///
/// Lowercases, strips diacritics, trims and collapses internal whitespace.
///
/// # Examples
///
/// ```rust
/// use recipe_nutrition::text_processing::normalize_name;
///
/// assert_eq!(normalize_name("  Morrón   Rojo "), "morron rojo");
/// ```
pub fn normalize_name(raw: &str) -> String {
    let folded = fold_diacritics(&raw.to_lowercase());
    let normalized = folded.split_whitespace().collect::<Vec<&str>>().join(" ");
    trace!("Normalized name: '{}' -> '{}'", raw, normalized);
    normalized
}

/// Split already-normalised text into alphanumeric tokens.
///
/// Punctuation acts as a separator, so `"chicken, breast"` yields `chicken` and `breast`.
pub fn tokens(normalized: &str) -> impl Iterator<Item = &str> {
    normalized
        .split(|c: char| !c.is_alphanumeric())
        .filter(|token| !token.is_empty())
}

/// Tokens strictly longer than `min_exclusive` characters.
pub fn significant_tokens(normalized: &str, min_exclusive: usize) -> Vec<&str> {
    tokens(normalized)
        .filter(|token| token.chars().count() > min_exclusive)
        .collect()
}
