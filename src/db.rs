use async_trait::async_trait;
use log::{debug, info, warn};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Row, SqlitePool};
use std::str::FromStr;

use crate::bulk_dataset::BulkDataset;
use crate::nutrition_config::NutritionConfig;
use crate::nutrition_errors::NutritionError;
use crate::nutrition_model::{NutrientRecord, UnitConversion, ANY_CATEGORY, BULK_CATEGORY};
use crate::text_processing::normalize_name;
use crate::translator::reverse_lookup;
use crate::unit_converter::{BASE_CONVERSIONS, PER_UNIT_CONVERSIONS};

const CURATED_NUTRIENTS: &str = include_str!("../data/curated_nutrients.json");

const RECORD_COLUMNS: &str = "ingredient_name, spanish_name, serving_size_g, calories, protein_g, \
     carbs_g, fat_g, fiber_g, sugar_g, sodium_mg, vitamin_a_dv, vitamin_c_dv, calcium_dv, iron_dv, category";

/// Read/write access to the local nutrient store
#[async_trait]
pub trait NutrientStore: Send + Sync {
    /// Full snapshot of every nutrient record
    async fn all_nutrient_records(&self) -> Result<Vec<NutrientRecord>, NutritionError>;

    /// Conversion row for a unit, category-specific first, then universal
    async fn unit_conversion(
        &self,
        unit: &str,
        category: Option<&str>,
    ) -> Result<Option<UnitConversion>, NutritionError>;

    async fn all_unit_conversions(&self) -> Result<Vec<UnitConversion>, NutritionError>;

    /// Insert a record. Returns `false` without error when the name already exists.
    async fn add_nutrient_record(
        &self,
        record: &NutrientRecord,
        spanish_name: Option<&str>,
    ) -> Result<bool, NutritionError>;
}

/// Initialize the nutrition schema
pub async fn init_nutrition_schema(pool: &SqlitePool) -> Result<(), NutritionError> {
    info!("Initializing nutrition schema...");

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS nutrition_data (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            ingredient_name TEXT NOT NULL UNIQUE COLLATE NOCASE,
            spanish_name TEXT,
            serving_size_g REAL NOT NULL DEFAULT 100,
            calories REAL NOT NULL DEFAULT 0,
            protein_g REAL NOT NULL DEFAULT 0,
            carbs_g REAL NOT NULL DEFAULT 0,
            fat_g REAL NOT NULL DEFAULT 0,
            fiber_g REAL NOT NULL DEFAULT 0,
            sugar_g REAL NOT NULL DEFAULT 0,
            sodium_mg REAL NOT NULL DEFAULT 0,
            vitamin_a_dv REAL NOT NULL DEFAULT 0,
            vitamin_c_dv REAL NOT NULL DEFAULT 0,
            calcium_dv REAL NOT NULL DEFAULT 0,
            iron_dv REAL NOT NULL DEFAULT 0,
            category TEXT NOT NULL DEFAULT 'other',
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP
        )",
    )
    .execute(pool)
    .await
    .map_err(|e| NutritionError::Store(format!("Failed to create nutrition_data table: {e}")))?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_nutrition_ingredient ON nutrition_data(ingredient_name)",
    )
    .execute(pool)
    .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_nutrition_spanish ON nutrition_data(spanish_name)")
        .execute(pool)
        .await?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS unit_conversions (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            unit_name TEXT NOT NULL,
            ingredient_category TEXT NOT NULL DEFAULT 'any',
            grams_per_unit REAL NOT NULL CHECK (grams_per_unit > 0),
            notes TEXT,
            UNIQUE(unit_name, ingredient_category)
        )",
    )
    .execute(pool)
    .await
    .map_err(|e| NutritionError::Store(format!("Failed to create unit_conversions table: {e}")))?;

    info!("Nutrition schema initialized successfully");
    Ok(())
}

fn record_from_row(row: &SqliteRow) -> Result<NutrientRecord, sqlx::Error> {
    Ok(NutrientRecord {
        ingredient_name: row.try_get("ingredient_name")?,
        spanish_name: row.try_get("spanish_name")?,
        serving_size_g: row.try_get("serving_size_g")?,
        calories: row.try_get("calories")?,
        protein_g: row.try_get("protein_g")?,
        carbs_g: row.try_get("carbs_g")?,
        fat_g: row.try_get("fat_g")?,
        fiber_g: row.try_get("fiber_g")?,
        sugar_g: row.try_get("sugar_g")?,
        sodium_mg: row.try_get("sodium_mg")?,
        vitamin_a_dv: row.try_get("vitamin_a_dv")?,
        vitamin_c_dv: row.try_get("vitamin_c_dv")?,
        calcium_dv: row.try_get("calcium_dv")?,
        iron_dv: row.try_get("iron_dv")?,
        category: row.try_get("category")?,
    })
}

fn conversion_from_row(row: &SqliteRow) -> Result<UnitConversion, sqlx::Error> {
    Ok(UnitConversion {
        unit_name: row.try_get("unit_name")?,
        ingredient_category: row.try_get("ingredient_category")?,
        grams_per_unit: row.try_get("grams_per_unit")?,
        notes: row.try_get("notes")?,
    })
}

/// SQLite-backed nutrient store
#[derive(Debug, Clone)]
pub struct SqliteNutrientStore {
    pool: SqlitePool,
}

impl SqliteNutrientStore {
    /// Connect using the configured URL (the database file is created if missing)
    /// and make sure the schema exists.
    pub async fn connect(config: &NutritionConfig) -> Result<Self, NutritionError> {
        let options = SqliteConnectOptions::from_str(&config.database_url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .connect_with(options)
            .await?;
        info!(
            "Connected to {} with {} max connections",
            config.database_url, config.max_connections
        );
        Self::from_pool(pool).await
    }

    /// Private in-memory database with the schema applied.
    ///
    /// Uses a single connection: every sqlite in-memory connection is its own database.
    pub async fn in_memory() -> Result<Self, NutritionError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;
        Self::from_pool(pool).await
    }

    pub async fn from_pool(pool: SqlitePool) -> Result<Self, NutritionError> {
        init_nutrition_schema(&pool).await?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn count_nutrient_records(&self) -> Result<i64, NutritionError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM nutrition_data")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    pub async fn count_unit_conversions(&self) -> Result<i64, NutritionError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM unit_conversions")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Look up a record by canonical name, ignoring case
    pub async fn find_nutrient_record(&self, name: &str) -> Result<Option<NutrientRecord>, NutritionError> {
        let row = sqlx::query(&format!(
            "SELECT {RECORD_COLUMNS} FROM nutrition_data WHERE ingredient_name = ?1"
        ))
        .bind(name.trim())
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.as_ref().map(record_from_row).transpose()?)
    }

    /// Insert the curated record list into an empty store.
    ///
    /// Returns the number of records inserted (0 when the store already had data).
    pub async fn seed_nutrient_records(&self) -> Result<usize, NutritionError> {
        let existing = self.count_nutrient_records().await?;
        if existing > 0 {
            debug!("Nutrition data already present ({} rows), skipping seed", existing);
            return Ok(0);
        }

        let records: Vec<NutrientRecord> = serde_json::from_str(CURATED_NUTRIENTS)?;
        let mut tx = self.pool.begin().await?;
        let mut inserted = 0;
        for record in &records {
            record.validate()?;
            inserted += insert_record(&mut tx, record, record.spanish_name.as_deref()).await? as usize;
        }
        tx.commit().await?;

        info!("Seeded {} curated nutrient records", inserted);
        Ok(inserted)
    }

    /// Insert the base conversion rows into an empty table.
    pub async fn seed_unit_conversions(&self) -> Result<usize, NutritionError> {
        let existing = self.count_unit_conversions().await?;
        if existing > 0 {
            debug!("Unit conversions already present ({} rows), skipping seed", existing);
            return Ok(0);
        }

        let inserted = self.insert_conversions(BASE_CONVERSIONS).await?;
        info!("Seeded {} unit conversions", inserted);
        Ok(inserted)
    }

    /// Add the per-piece produce rows, keeping whatever is already there.
    ///
    /// Returns the number of rows actually inserted.
    pub async fn update_unit_conversions(&self) -> Result<usize, NutritionError> {
        let inserted = self.insert_conversions(PER_UNIT_CONVERSIONS).await?;
        info!("Unit conversion update added {} rows", inserted);
        Ok(inserted)
    }

    async fn insert_conversions(&self, rows: &[(&str, &str, f64)]) -> Result<usize, NutritionError> {
        let mut tx = self.pool.begin().await?;
        let mut inserted = 0;
        for (unit, category, grams) in rows {
            let result = sqlx::query(
                "INSERT OR IGNORE INTO unit_conversions (unit_name, ingredient_category, grams_per_unit)
                 VALUES (?1, ?2, ?3)",
            )
            .bind(*unit)
            .bind(*category)
            .bind(*grams)
            .execute(&mut *tx)
            .await?;
            inserted += result.rows_affected() as usize;
        }
        tx.commit().await?;
        Ok(inserted)
    }

    /// Copy every food of the bulk dataset into the store.
    ///
    /// Skipped when the store already holds at least as many bulk-derived rows as the
    /// dataset has foods; a smaller, partial earlier load is deleted and redone. Callers
    /// must invalidate their nutrient cache afterwards.
    pub async fn seed_bulk_records(&self, dataset: &BulkDataset) -> Result<usize, NutritionError> {
        let existing: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM nutrition_data WHERE category = ?1")
            .bind(BULK_CATEGORY)
            .fetch_one(&self.pool)
            .await?;
        if dataset.is_empty() || existing >= dataset.len() as i64 {
            info!(
                "Bulk records already loaded ({} rows for {} foods), skipping",
                existing,
                dataset.len()
            );
            return Ok(0);
        }

        let mut tx = self.pool.begin().await?;
        if existing > 0 {
            warn!("Partial bulk load found ({} rows), reloading", existing);
            sqlx::query("DELETE FROM nutrition_data WHERE category = ?1")
                .bind(BULK_CATEGORY)
                .execute(&mut *tx)
                .await?;
        }

        let mut inserted = 0;
        for food in &dataset.foods {
            let name = normalize_name(&food.description);
            if name.is_empty() {
                continue;
            }
            let record = food.to_nutrient_record(&name);
            if let Err(e) = record.validate() {
                warn!("Skipping bulk food '{}': {}", food.description, e);
                continue;
            }
            let spanish = reverse_lookup(&name);
            inserted += insert_record(&mut tx, &record, spanish).await? as usize;
        }
        tx.commit().await?;

        info!("Seeded {} bulk nutrient records", inserted);
        Ok(inserted)
    }
}

async fn insert_record(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    record: &NutrientRecord,
    spanish_name: Option<&str>,
) -> Result<bool, NutritionError> {
    let result = sqlx::query(&format!(
        "INSERT OR IGNORE INTO nutrition_data ({RECORD_COLUMNS})
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)"
    ))
    .bind(record.ingredient_name.trim())
    .bind(spanish_name)
    .bind(record.serving_size_g)
    .bind(record.calories)
    .bind(record.protein_g)
    .bind(record.carbs_g)
    .bind(record.fat_g)
    .bind(record.fiber_g)
    .bind(record.sugar_g)
    .bind(record.sodium_mg)
    .bind(record.vitamin_a_dv)
    .bind(record.vitamin_c_dv)
    .bind(record.calcium_dv)
    .bind(record.iron_dv)
    .bind(&record.category)
    .execute(&mut **tx)
    .await?;
    Ok(result.rows_affected() > 0)
}

#[async_trait]
impl NutrientStore for SqliteNutrientStore {
    async fn all_nutrient_records(&self) -> Result<Vec<NutrientRecord>, NutritionError> {
        let rows = sqlx::query(&format!("SELECT {RECORD_COLUMNS} FROM nutrition_data ORDER BY id"))
            .fetch_all(&self.pool)
            .await?;
        let records = rows
            .iter()
            .map(record_from_row)
            .collect::<Result<Vec<_>, _>>()?;
        debug!("Loaded {} nutrient records", records.len());
        Ok(records)
    }

    async fn unit_conversion(
        &self,
        unit: &str,
        category: Option<&str>,
    ) -> Result<Option<UnitConversion>, NutritionError> {
        let row = sqlx::query(
            "SELECT unit_name, ingredient_category, grams_per_unit, notes FROM unit_conversions
             WHERE unit_name = ?1 AND (ingredient_category = ?2 OR ingredient_category = ?3)
             ORDER BY CASE WHEN ingredient_category = ?2 THEN 0 ELSE 1 END
             LIMIT 1",
        )
        .bind(unit)
        .bind(category)
        .bind(ANY_CATEGORY)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.as_ref().map(conversion_from_row).transpose()?)
    }

    async fn all_unit_conversions(&self) -> Result<Vec<UnitConversion>, NutritionError> {
        let rows = sqlx::query("SELECT unit_name, ingredient_category, grams_per_unit, notes FROM unit_conversions ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows
            .iter()
            .map(conversion_from_row)
            .collect::<Result<Vec<_>, _>>()?)
    }

    async fn add_nutrient_record(
        &self,
        record: &NutrientRecord,
        spanish_name: Option<&str>,
    ) -> Result<bool, NutritionError> {
        record.validate()?;
        let spanish = spanish_name.or(record.spanish_name.as_deref());
        let mut tx = self.pool.begin().await?;
        let inserted = insert_record(&mut tx, record, spanish).await?;
        tx.commit().await?;
        if inserted {
            info!("Added nutrient record '{}'", record.ingredient_name);
        } else {
            debug!("Nutrient record '{}' already exists", record.ingredient_name);
        }
        Ok(inserted)
    }
}
