use anyhow::Result;
use std::io::Write;

use recipe_nutrition::amount_parser::{parse_amount, UNIT_UNKNOWN, UNIT_VARIABLE};
use recipe_nutrition::bulk_dataset::{BulkDataset, BulkTier};
use recipe_nutrition::nutrition_config::MatchConfig;
use recipe_nutrition::translator::translate_to_english;
use recipe_nutrition::unit_converter::UnitConverter;

#[test]
fn test_markers_ignore_case_and_accents() {
    for text in [
        "al gusto",
        "Al Gusto",
        "AL GÚSTO",
        "á gusto",
        "OPCIONAL",
        "opciónal",
        "Algunos",
        "algunas ramitas",
        "UN POCO",
        "unpoco",
        "C/N",
    ] {
        let parsed = parse_amount(text);
        assert_eq!(parsed.quantity, 0.0, "{text}");
        assert_eq!(parsed.unit, UNIT_VARIABLE, "{text}");
        assert!(parsed.is_variable(), "{text}");
    }
}

#[test]
fn test_documented_amounts() {
    let cups = parse_amount("2 tazas");
    assert_eq!((cups.quantity, cups.unit.as_str(), cups.grams), (2.0, "taza", None));

    let grams = parse_amount("150g");
    assert_eq!((grams.quantity, grams.unit.as_str(), grams.grams), (150.0, "g", Some(150.0)));

    let range = parse_amount("2-3 cucharadas");
    assert_eq!((range.quantity, range.unit.as_str()), (2.5, "cucharada"));

    let eggs = parse_amount("3 huevos");
    assert_eq!((eggs.quantity, eggs.unit.as_str(), eggs.grams), (3.0, "huevo", None));
}

#[test]
fn test_supplemented_amount_forms() {
    assert_eq!(parse_amount("1 pechuga (150g)").grams, Some(150.0));
    assert_eq!(parse_amount("1,5 kg").grams, Some(1500.0));
    assert_eq!(parse_amount("1 1/2 tazas").quantity, 1.5);
    assert_eq!(parse_amount("½ taza").quantity, 0.5);
    assert_eq!(parse_amount("200").grams, Some(200.0));

    let unparseable = parse_amount("un chorrito");
    assert_eq!(unparseable.unit, UNIT_UNKNOWN);
    assert!(unparseable.is_unknown());
}

#[test]
fn test_documented_conversions() {
    let converter = UnitConverter::default();
    assert_eq!(converter.convert_to_grams(1.0, "taza", "harina", None), Some(120.0));
    assert_eq!(converter.convert_to_grams(1.0, "unidad", "huevo", None), Some(50.0));
    assert_eq!(converter.convert_to_grams(2.0, "kg", "arroz", None), Some(2000.0));
}

#[test]
fn test_parse_then_convert() {
    let converter = UnitConverter::default();
    let cases = [
        ("harina", "2 tazas", 240.0),
        ("azúcar", "3 cucharadas", 36.0),
        ("aceite", "1 cda", 14.0),
        ("ajo", "2 dientes", 6.0),
        ("huevos", "2 a 4 huevos", 150.0),
        ("leche", "500 ml", 500.0),
    ];
    for (item, amount, expected) in cases {
        let parsed = parse_amount(amount);
        let grams = parsed
            .grams
            .or_else(|| converter.convert_to_grams(parsed.quantity, &parsed.unit, item, None));
        assert_eq!(grams, Some(expected), "{amount} of {item}");
    }
}

#[test]
fn test_translator_is_deterministic_and_never_empty() {
    for name in ["lentejas", "Zapallo", "pechuga de pollo", "", "   ", "xyz", "ñandú"] {
        let first = translate_to_english(name);
        assert!(!first.is_empty(), "{name:?}");
        assert_eq!(first, translate_to_english(name));
    }
    assert_eq!(translate_to_english("lentejas"), "lentils");
}

#[test]
fn test_dataset_loads_from_file() -> Result<()> {
    let mut file = tempfile::NamedTempFile::new()?;
    file.write_all(include_str!("../data/foundation_foods_sample.json").as_bytes())?;

    let dataset = BulkDataset::load_from_path(file.path())?;
    assert_eq!(dataset.len(), 13);

    let (tier, food) = dataset
        .search("pumpkin", &MatchConfig::default())
        .expect("pumpkin is in the sample");
    assert_eq!(tier, BulkTier::DescriptionContainsQuery);
    assert_eq!(food.to_nutrient_record("zapallo").calories, 26.0);
    Ok(())
}

#[test]
fn test_dataset_rejects_malformed_file() -> Result<()> {
    let mut file = tempfile::NamedTempFile::new()?;
    file.write_all(b"{\"FoundationFoods\": [")?;
    assert!(BulkDataset::load_from_path(file.path()).is_err());
    Ok(())
}
