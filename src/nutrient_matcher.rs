//! # Nutrient Matcher
//!
//! Finds the nutrient record for an ingredient name.
//!
//! Local tiers run in order over the cached records, first hit wins:
//!
//! 1. exact Spanish name
//! 2. exact English name
//! 3. Spanish name contains the query
//! 4. English name contains the query
//! 5. query contains the Spanish name
//! 6. query contains the English name
//! 7. a query word is a word of the Spanish name
//! 8. a query word is a word of the English name
//! 9. alias table
//!
//! When they all fail the name is translated and looked up in the bulk dataset; a hit is
//! written back to the store and to the cache so the next lookup stays local.

use std::sync::Arc;
use tracing::{debug, info, trace, warn};

use crate::bulk_dataset::BulkDataset;
use crate::db::NutrientStore;
use crate::nutrient_cache::NutrientCache;
use crate::nutrition_config::MatchConfig;
use crate::nutrition_model::NutrientRecord;
use crate::text_processing::{normalize_name, significant_tokens, tokens};
use crate::translator::translate_to_english;

/// Which tier produced a match
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchTier {
    ExactSpanish,
    ExactEnglish,
    SpanishContainsQuery,
    EnglishContainsQuery,
    QueryContainsSpanish,
    QueryContainsEnglish,
    SpanishWordOverlap,
    EnglishWordOverlap,
    Alias,
    BulkDataset,
}

/// Synonyms the other tiers miss: query → Spanish or English name of a record
const ALIASES: &[(&str, &str)] = &[
    ("carne molida", "carne picada"),
    ("res", "carne de res"),
    ("parmesano", "queso parmesano"),
    ("queso rallado", "queso parmesano"),
    ("cherry", "tomate"),
    ("tomates cherry", "tomate"),
    ("tomates", "tomate"),
    ("cebollas", "cebolla"),
    ("huevos", "huevo"),
    ("palta", "aguacate"),
];

type LocalStrategy =
    for<'a> fn(&str, &'a [NutrientRecord], &MatchConfig) -> Option<&'a NutrientRecord>;

const LOCAL_STRATEGIES: &[(MatchTier, LocalStrategy)] = &[
    (MatchTier::ExactSpanish, exact_spanish),
    (MatchTier::ExactEnglish, exact_english),
    (MatchTier::SpanishContainsQuery, spanish_contains_query),
    (MatchTier::EnglishContainsQuery, english_contains_query),
    (MatchTier::QueryContainsSpanish, query_contains_spanish),
    (MatchTier::QueryContainsEnglish, query_contains_english),
    (MatchTier::SpanishWordOverlap, spanish_word_overlap),
    (MatchTier::EnglishWordOverlap, english_word_overlap),
    (MatchTier::Alias, alias),
];

/// Normalised Spanish name, `None` when absent or blank
fn spanish_of(record: &NutrientRecord) -> Option<String> {
    record
        .spanish_name
        .as_deref()
        .map(normalize_name)
        .filter(|name| !name.is_empty())
}

fn english_of(record: &NutrientRecord) -> Option<String> {
    Some(normalize_name(&record.ingredient_name)).filter(|name| !name.is_empty())
}

fn find_by<'a>(
    records: &'a [NutrientRecord],
    name_of: fn(&NutrientRecord) -> Option<String>,
    accept: impl Fn(&str) -> bool,
) -> Option<&'a NutrientRecord> {
    records
        .iter()
        .find(|record| name_of(record).is_some_and(|name| accept(&name)))
}

fn exact_spanish<'a>(query: &str, records: &'a [NutrientRecord], _: &MatchConfig) -> Option<&'a NutrientRecord> {
    find_by(records, spanish_of, |name| name == query)
}

fn exact_english<'a>(query: &str, records: &'a [NutrientRecord], _: &MatchConfig) -> Option<&'a NutrientRecord> {
    find_by(records, english_of, |name| name == query)
}

fn spanish_contains_query<'a>(
    query: &str,
    records: &'a [NutrientRecord],
    _: &MatchConfig,
) -> Option<&'a NutrientRecord> {
    find_by(records, spanish_of, |name| name.contains(query))
}

fn english_contains_query<'a>(
    query: &str,
    records: &'a [NutrientRecord],
    _: &MatchConfig,
) -> Option<&'a NutrientRecord> {
    find_by(records, english_of, |name| name.contains(query))
}

fn query_contains_spanish<'a>(
    query: &str,
    records: &'a [NutrientRecord],
    _: &MatchConfig,
) -> Option<&'a NutrientRecord> {
    find_by(records, spanish_of, |name| query.contains(name))
}

fn query_contains_english<'a>(
    query: &str,
    records: &'a [NutrientRecord],
    _: &MatchConfig,
) -> Option<&'a NutrientRecord> {
    find_by(records, english_of, |name| query.contains(name))
}

fn shares_word(query: &str, name: &str, config: &MatchConfig) -> bool {
    let name_words: Vec<&str> = tokens(name).collect();
    significant_tokens(query, config.min_token_len_exclusive)
        .iter()
        .any(|word| name_words.contains(word))
}

fn spanish_word_overlap<'a>(
    query: &str,
    records: &'a [NutrientRecord],
    config: &MatchConfig,
) -> Option<&'a NutrientRecord> {
    find_by(records, spanish_of, |name| shares_word(query, name, config))
}

fn english_word_overlap<'a>(
    query: &str,
    records: &'a [NutrientRecord],
    config: &MatchConfig,
) -> Option<&'a NutrientRecord> {
    find_by(records, english_of, |name| shares_word(query, name, config))
}

fn alias<'a>(query: &str, records: &'a [NutrientRecord], _: &MatchConfig) -> Option<&'a NutrientRecord> {
    let (_, target) = ALIASES.iter().find(|(from, _)| *from == query)?;
    records.iter().find(|record| {
        spanish_of(record).as_deref() == Some(*target) || english_of(record).as_deref() == Some(*target)
    })
}

/// Run the local tiers over `records` for an already-normalised query.
pub fn match_local<'a>(
    query: &str,
    records: &'a [NutrientRecord],
    config: &MatchConfig,
) -> Option<(MatchTier, &'a NutrientRecord)> {
    if query.is_empty() {
        return None;
    }
    LOCAL_STRATEGIES.iter().find_map(|&(tier, strategy)| {
        trace!(query, ?tier, "Trying match tier");
        strategy(query, records, config).map(|record| (tier, record))
    })
}

/// Resolves ingredient names against the cache, then the bulk dataset
pub struct NutrientMatcher {
    store: Arc<dyn NutrientStore>,
    dataset: Option<Arc<BulkDataset>>,
    config: MatchConfig,
}

impl NutrientMatcher {
    pub fn new(store: Arc<dyn NutrientStore>, dataset: Option<Arc<BulkDataset>>, config: MatchConfig) -> Self {
        Self { store, dataset, config }
    }

    /// Best record for an ingredient display name, or `None` when every tier fails.
    ///
    /// A bulk-dataset hit is persisted (failures are logged and ignored) and appended to
    /// `cache` if it is loaded.
    pub async fn find_best_match(&self, name: &str, cache: &NutrientCache) -> Option<NutrientRecord> {
        self.resolve(name, cache).await.map(|(_, record)| record)
    }

    /// Same as [`NutrientMatcher::find_best_match`], also reporting the tier that matched.
    pub async fn resolve(&self, name: &str, cache: &NutrientCache) -> Option<(MatchTier, NutrientRecord)> {
        let query = normalize_name(name);
        if query.is_empty() {
            return None;
        }

        {
            let records = cache.snapshot().await;
            if let Some((tier, record)) = match_local(&query, &records, &self.config) {
                debug!(name, ?tier, matched = %record.ingredient_name, "Local match");
                return Some((tier, record.clone()));
            }
        }

        // no snapshot may be held across the cache insert in match_bulk
        let record = self.match_bulk(name, query, cache).await?;
        Some((MatchTier::BulkDataset, record))
    }

    async fn match_bulk(&self, name: &str, query: String, cache: &NutrientCache) -> Option<NutrientRecord> {
        let dataset = Arc::clone(self.dataset.as_ref()?);
        let english = translate_to_english(name);
        let config = self.config.clone();
        let record_name = query.clone();

        let search = tokio::task::spawn_blocking(move || {
            dataset
                .search(&english, &config)
                .map(|(tier, food)| (tier, food.description.clone(), food.to_nutrient_record(&record_name)))
        })
        .await;

        let (tier, description, mut record) = match search {
            Ok(Some(found)) => found,
            Ok(None) => {
                debug!(name, "No bulk dataset match");
                return None;
            }
            Err(e) => {
                warn!(name, error = %e, "Bulk dataset search failed");
                return None;
            }
        };
        info!(name, ?tier, food = %description, "Resolved through bulk dataset");
        record.spanish_name = Some(query);

        if self.config.persist_bulk_matches {
            match self.store.add_nutrient_record(&record, None).await {
                Ok(true) => debug!(name = %record.ingredient_name, "Bulk record persisted"),
                Ok(false) => debug!(name = %record.ingredient_name, "Bulk record already stored"),
                Err(e) => warn!(name = %record.ingredient_name, error = %e, "Could not persist bulk record"),
            }
        }

        cache.insert_if_absent(record.clone()).await;
        Some(record)
    }
}
