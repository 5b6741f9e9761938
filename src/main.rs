use anyhow::{bail, Context, Result};
use serde::Serialize;
use std::env;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use recipe_nutrition::bulk_dataset::BulkDataset;
use recipe_nutrition::db::SqliteNutrientStore;
use recipe_nutrition::nutrition_calculator::NutritionCalculator;
use recipe_nutrition::nutrition_config::NutritionConfig;
use recipe_nutrition::nutrition_model::{Recipe, RecipeNutrition};

const USAGE: &str = "usage: recipe-nutrition <recipe.json> [servings]";

#[derive(Serialize)]
struct Report<'a> {
    title: &'a str,
    #[serde(flatten)]
    nutrition: &'a RecipeNutrition,
    approximate: bool,
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json = env::var("LOG_FORMAT").is_ok_and(|format| format.eq_ignore_ascii_case("json"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();
    init_logging();

    let mut args = env::args().skip(1);
    let Some(recipe_path) = args.next().map(PathBuf::from) else {
        bail!(USAGE);
    };
    let servings_override = args
        .next()
        .map(|raw| raw.parse::<u32>())
        .transpose()
        .context("servings must be a positive integer")?;

    let config = NutritionConfig::from_env().context("Invalid configuration")?;
    info!("Using database at: {}", config.database_url);

    let store = SqliteNutrientStore::connect(&config)
        .await
        .context("Failed to open nutrient store")?;
    if config.seed_on_startup {
        store.seed_nutrient_records().await.context("Failed to seed nutrient records")?;
        store.seed_unit_conversions().await.context("Failed to seed unit conversions")?;
        store.update_unit_conversions().await.context("Failed to update unit conversions")?;
    }

    let dataset = match &config.bulk_dataset_path {
        Some(path) => {
            let dataset = BulkDataset::load_from_path(path)
                .with_context(|| format!("Failed to load bulk dataset from {}", path.display()))?;
            if config.seed_bulk_records {
                store.seed_bulk_records(&dataset).await.context("Failed to seed bulk records")?;
            }
            Some(Arc::new(dataset))
        }
        None => {
            info!("FOOD_DATA_PATH not set, bulk dataset fallback disabled");
            None
        }
    };

    let raw = std::fs::read_to_string(&recipe_path)
        .with_context(|| format!("Failed to read recipe {}", recipe_path.display()))?;
    let mut recipe: Recipe = serde_json::from_str(&raw).context("Recipe file is not valid JSON")?;
    if let Some(servings) = servings_override {
        if servings == 0 {
            bail!("servings must be at least 1");
        }
        recipe = recipe.with_servings(servings);
    }

    let calculator = NutritionCalculator::new(Arc::new(store), dataset, config.matching.clone());
    let nutrition = calculator
        .calculate_recipe_nutrition(&recipe)
        .await
        .context("Failed to calculate nutrition")?;

    if let Some(missing) = &nutrition.missing_ingredients {
        info!("Approximate result, missing: {}", missing.join(", "));
    }
    let report = Report {
        title: &recipe.title,
        nutrition: &nutrition,
        approximate: nutrition.is_approximate(),
    };
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}
