//! # Ingredient Name Translator
//!
//! Best-effort Spanish → English translation of ingredient names, used to query the bulk
//! reference dataset. Keys are stored without diacritics and matched against normalised
//! input, so "limón", "Limon" and "LIMÓN" all translate the same way.

use log::{debug, trace};

use crate::text_processing::normalize_name;

/// Shortest query that may match a dictionary key partially
const MIN_PARTIAL_QUERY_LEN: usize = 3;

/// Returned for blank input so the result is never empty
pub const UNKNOWN_TERM: &str = "unknown";

/// Spanish (unaccented) → English search term
const DICTIONARY: &[(&str, &str)] = &[
    // proteins
    ("carne", "beef"),
    ("carne picada", "ground beef"),
    ("carne molida", "ground beef"),
    ("carne de res", "beef"),
    ("pollo", "chicken"),
    ("pechuga", "chicken breast"),
    ("pechuga de pollo", "chicken breast"),
    ("muslo de pollo", "chicken thigh"),
    ("huevo", "egg"),
    ("huevos", "egg"),
    ("clara de huevo", "egg white"),
    ("yema de huevo", "egg yolk"),
    ("garbanzos", "chickpeas"),
    ("lentejas", "lentils"),
    ("porotos", "beans"),
    ("porotos negros", "black beans"),
    ("frijoles", "beans"),
    ("atun", "tuna"),
    ("salmon", "salmon"),
    ("cerdo", "pork"),
    ("tocino", "bacon"),
    ("panceta", "bacon"),
    ("chorizo", "sausage"),
    ("salchicha", "sausage"),
    // grains
    ("pasta", "pasta"),
    ("fideos", "pasta"),
    ("tallarines", "pasta"),
    ("spaguetti", "spaghetti"),
    ("arroz", "rice"),
    ("arroz blanco", "white rice"),
    ("arroz integral", "brown rice"),
    ("quinoa", "quinoa"),
    ("quinua", "quinoa"),
    ("harina", "wheat flour"),
    ("harina de trigo", "wheat flour"),
    ("harina integral", "whole wheat flour"),
    ("pan", "bread"),
    ("pan blanco", "white bread"),
    ("pan integral", "whole wheat bread"),
    ("pan rallado", "bread crumbs"),
    ("avena", "oats"),
    ("cebada", "barley"),
    ("maiz", "corn"),
    // dairy
    ("leche", "milk"),
    ("leche entera", "whole milk"),
    ("leche descremada", "skim milk"),
    ("queso", "cheese"),
    ("queso parmesano", "parmesan cheese"),
    ("parmesano", "parmesan"),
    ("queso rallado", "parmesan"),
    ("mozzarella", "mozzarella"),
    ("queso crema", "cream cheese"),
    ("manteca", "butter"),
    ("mantequilla", "butter"),
    ("crema", "cream"),
    ("crema de leche", "heavy cream"),
    ("nata", "cream"),
    ("yogur", "yogurt"),
    ("yogurt", "yogurt"),
    // vegetables
    ("tomate", "tomato"),
    ("tomates", "tomato"),
    ("tomate cherry", "cherry tomato"),
    ("cebolla", "onion"),
    ("cebollas", "onion"),
    ("cebolla morada", "red onion"),
    ("cebolla de verdeo", "green onion"),
    ("ajo", "garlic"),
    ("diente de ajo", "garlic"),
    ("espinaca", "spinach"),
    ("espinacas", "spinach"),
    ("lechuga", "lettuce"),
    ("zanahoria", "carrot"),
    ("zanahorias", "carrot"),
    ("pepino", "cucumber"),
    ("papa", "potato"),
    ("papas", "potato"),
    ("patata", "potato"),
    ("batata", "sweet potato"),
    ("boniato", "sweet potato"),
    ("brocoli", "broccoli"),
    ("coliflor", "cauliflower"),
    ("repollo", "cabbage"),
    ("col", "cabbage"),
    // regional names
    ("palta", "avocado"),
    ("aguacate", "avocado"),
    ("choclo", "corn"),
    ("zapallo", "pumpkin"),
    ("morron", "bell pepper"),
    ("pimiento", "bell pepper"),
    ("aji", "chili pepper"),
    ("ajies", "chili pepper"),
    ("arveja", "peas"),
    ("arvejas", "peas"),
    ("guisantes", "peas"),
    ("poroto", "beans"),
    ("chaucha", "green beans"),
    ("judias verdes", "green beans"),
    ("berenjena", "eggplant"),
    ("acelga", "chard"),
    ("remolacha", "beet"),
    ("betabel", "beet"),
    ("apio", "celery"),
    ("rabanito", "radish"),
    // fruit
    ("manzana", "apple"),
    ("manzanas", "apple"),
    ("banana", "banana"),
    ("bananas", "banana"),
    ("platano", "banana"),
    ("limon", "lemon"),
    ("naranja", "orange"),
    ("naranjas", "orange"),
    ("frutilla", "strawberry"),
    ("frutillas", "strawberry"),
    ("fresa", "strawberry"),
    ("durazno", "peach"),
    ("melocoton", "peach"),
    ("pera", "pear"),
    ("uva", "grape"),
    ("uvas", "grape"),
    ("sandia", "watermelon"),
    ("melon", "melon"),
    ("kiwi", "kiwi"),
    ("mango", "mango"),
    ("pina", "pineapple"),
    ("anana", "pineapple"),
    // oils and fats
    ("aceite", "oil"),
    ("aceite de oliva", "olive oil"),
    ("aceite de girasol", "sunflower oil"),
    ("aceite vegetal", "vegetable oil"),
    ("oliva", "olive"),
    ("aceitunas", "olive"),
    // spices
    ("sal", "salt"),
    ("pimienta", "black pepper"),
    ("pimienta negra", "black pepper"),
    ("oregano", "oregano"),
    ("perejil", "parsley"),
    ("albahaca", "basil"),
    ("cilantro", "cilantro"),
    ("comino", "cumin"),
    ("pimenton", "paprika"),
    ("curry", "curry"),
    ("jengibre", "ginger"),
    ("canela", "cinnamon"),
    ("nuez moscada", "nutmeg"),
    // nuts and seeds
    ("nuez", "walnut"),
    ("nueces", "walnut"),
    ("almendra", "almond"),
    ("almendras", "almond"),
    ("mani", "peanut"),
    ("cacahuate", "peanut"),
    ("semillas de chia", "chia seeds"),
    ("chia", "chia seeds"),
    ("semillas de sesamo", "sesame seeds"),
    ("ajonjoli", "sesame seeds"),
    // other
    ("azucar", "sugar"),
    ("azucar blanca", "white sugar"),
    ("azucar morena", "brown sugar"),
    ("miel", "honey"),
    ("chocolate", "chocolate"),
    ("cacao", "cocoa"),
    ("vino", "wine"),
    ("vino blanco", "white wine"),
    ("vino tinto", "red wine"),
    ("levadura", "yeast"),
    ("vinagre", "vinegar"),
    ("mostaza", "mustard"),
    ("mayonesa", "mayonnaise"),
    ("ketchup", "ketchup"),
    ("salsa de tomate", "tomato sauce"),
];

/// Translate a Spanish (or mixed) ingredient name into an English search term.
///
/// Tries an exact dictionary hit, then the longest key contained in the name, then the
/// shortest key that contains the name. Falls back to the normalised input, so the result
/// is never empty.
///
/// # Examples
///
/// ```rust
/// use recipe_nutrition::translator::translate_to_english;
///
/// assert_eq!(translate_to_english("Morrón"), "bell pepper");
/// assert_eq!(translate_to_english("lentejas rojas"), "lentils");
/// assert_eq!(translate_to_english("Kale"), "kale");
/// ```
pub fn translate_to_english(spanish_name: &str) -> String {
    let normalized = normalize_name(spanish_name);
    if normalized.is_empty() {
        return UNKNOWN_TERM.to_string();
    }

    if let Some((_, english)) = DICTIONARY.iter().find(|(key, _)| *key == normalized) {
        trace!("Translated '{}' -> '{}'", spanish_name, english);
        return english.to_string();
    }

    if normalized.chars().count() >= MIN_PARTIAL_QUERY_LEN {
        let forward = DICTIONARY
            .iter()
            .filter(|(key, _)| normalized.contains(key))
            .max_by_key(|(key, _)| key.len());
        let reverse = || {
            DICTIONARY
                .iter()
                .filter(|(key, _)| key.contains(normalized.as_str()))
                .min_by_key(|(key, _)| key.len())
        };
        if let Some((key, english)) = forward.or_else(reverse) {
            debug!(
                "Translated '{}' -> '{}' (partial match on '{}')",
                spanish_name, english, key
            );
            return english.to_string();
        }
    }

    debug!("No translation for '{}', using it as is", spanish_name);
    normalized
}

/// Spanish display name for an English term, when the dictionary has one.
///
/// The first key mapping to the term wins, so "egg" gives "huevo" rather than "huevos".
pub fn reverse_lookup(english: &str) -> Option<&'static str> {
    let normalized = normalize_name(english);
    DICTIONARY
        .iter()
        .find(|(_, term)| *term == normalized)
        .map(|(key, _)| *key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_translation_ignores_case_and_accents() {
        assert_eq!(translate_to_english("Limón"), "lemon");
        assert_eq!(translate_to_english("  PALTA "), "avocado");
        assert_eq!(translate_to_english("choclo"), "corn");
        assert_eq!(translate_to_english("morrón"), "bell pepper");
    }

    #[test]
    fn test_forward_partial_prefers_longest_key() {
        assert_eq!(translate_to_english("aceite de oliva extra virgen"), "olive oil");
        assert_eq!(translate_to_english("porotos negros cocidos"), "black beans");
    }

    #[test]
    fn test_reverse_partial() {
        assert_eq!(translate_to_english("zanahor"), "carrot");
    }

    #[test]
    fn test_short_queries_skip_partial_match() {
        assert_eq!(translate_to_english("xy"), "xy");
    }

    #[test]
    fn test_unknown_names_pass_through_normalized() {
        assert_eq!(translate_to_english("Tofu"), "tofu");
    }

    #[test]
    fn test_never_empty_and_deterministic() {
        for name in ["", "   ", "pollo", "xyz", "ñ"] {
            let first = translate_to_english(name);
            assert!(!first.is_empty(), "empty translation for '{}'", name);
            assert_eq!(first, translate_to_english(name));
        }
    }

    #[test]
    fn test_reverse_lookup() {
        assert_eq!(reverse_lookup("egg"), Some("huevo"));
        assert_eq!(reverse_lookup("Lentils"), Some("lentejas"));
        assert_eq!(reverse_lookup("dragon fruit"), None);
    }

    #[test]
    fn test_dictionary_keys_are_normalized() {
        for (key, english) in DICTIONARY {
            assert_eq!(*key, normalize_name(key));
            assert!(!english.is_empty());
        }
    }
}
