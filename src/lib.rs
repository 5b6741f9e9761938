//! # Recipe Nutrition
//!
//! Estimates per-serving nutrition for recipes written in Spanish.
//!
//! Free-text amounts ("2 tazas", "1 pechuga (150g)", "sal a gusto") are parsed and
//! converted to grams, ingredient names are matched against a local SQLite nutrient store
//! with a fallback to the FoodData Central bulk dataset, and the per-100g profiles are
//! summed and divided by the serving count.

pub mod amount_parser;
pub mod bulk_dataset;
pub mod db;
pub mod measurement_patterns;
pub mod nutrient_cache;
pub mod nutrient_matcher;
pub mod nutrition_calculator;
pub mod nutrition_config;
pub mod nutrition_errors;
pub mod nutrition_model;
pub mod text_processing;
pub mod translator;
pub mod unit_converter;
