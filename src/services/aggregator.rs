//! Aggregator service for per-user usage series

use std::collections::HashMap;
use std::hash::Hash;

use indexmap::IndexMap;

use crate::types::{
    ActivityCounts, CategoryCounts, DailyUsage, FeatureSummary, IdeSummary,
    LanguageFeatureSummary, LanguageModelSummary, ModelFeatureSummary, PerUserSeries,
    UsageRecord,
};

/// Key used when a breakdown item omits its category field
const UNKNOWN_CATEGORY: &str = "unknown";

fn category(value: &Option<String>) -> String {
    value.as_deref().unwrap_or(UNKNOWN_CATEGORY).to_string()
}

/// Counter map that remembers first-insertion order of its keys
type OrderedCounts<K> = IndexMap<K, CategoryCounts>;

fn add_counts<K: Hash + Eq>(map: &mut OrderedCounts<K>, key: K, counts: &ActivityCounts) {
    map.entry(key).or_default().add(counts);
}

/// Running state for one user while records are folded in
struct UserAccumulator {
    series: PerUserSeries,
    by_ide: OrderedCounts<String>,
    by_feature: OrderedCounts<String>,
    by_language_feature: OrderedCounts<(String, String)>,
    by_language_model: OrderedCounts<(String, String)>,
    by_model_feature: OrderedCounts<(String, String)>,
}

impl UserAccumulator {
    fn new(user_login: &str) -> Self {
        Self {
            series: PerUserSeries {
                user_login: user_login.to_string(),
                ..Default::default()
            },
            by_ide: OrderedCounts::new(),
            by_feature: OrderedCounts::new(),
            by_language_feature: OrderedCounts::new(),
            by_language_model: OrderedCounts::new(),
            by_model_feature: OrderedCounts::new(),
        }
    }

    fn add(&mut self, record: &UsageRecord) {
        let c = &record.counts;
        let s = &mut self.series;
        s.total_interactions = s
            .total_interactions
            .saturating_add(c.user_initiated_interaction_count);
        s.total_generations = s
            .total_generations
            .saturating_add(c.code_generation_activity_count);
        s.total_acceptances = s
            .total_acceptances
            .saturating_add(c.code_acceptance_activity_count);
        s.total_loc_suggested_to_add = s
            .total_loc_suggested_to_add
            .saturating_add(c.loc_suggested_to_add_sum);
        s.total_loc_suggested_to_delete = s
            .total_loc_suggested_to_delete
            .saturating_add(c.loc_suggested_to_delete_sum);
        s.total_loc_added = s.total_loc_added.saturating_add(c.loc_added_sum);
        s.total_loc_deleted = s.total_loc_deleted.saturating_add(c.loc_deleted_sum);

        // Same-day records are kept as separate entries
        s.daily.push(DailyUsage {
            day: record.day.clone(),
            user_login: record.user_login.clone(),
            user_initiated_interaction_count: c.user_initiated_interaction_count,
            code_generation_activity_count: c.code_generation_activity_count,
            code_acceptance_activity_count: c.code_acceptance_activity_count,
        });

        for item in record.totals_by_ide.iter().flatten() {
            add_counts(&mut self.by_ide, category(&item.ide), &item.counts);
        }
        for item in record.totals_by_feature.iter().flatten() {
            add_counts(&mut self.by_feature, category(&item.feature), &item.counts);
        }
        for item in record.totals_by_language_feature.iter().flatten() {
            let key = (category(&item.language), category(&item.feature));
            add_counts(&mut self.by_language_feature, key, &without_interactions(&item.counts));
        }
        for item in record.totals_by_language_model.iter().flatten() {
            let key = (category(&item.language), category(&item.model));
            add_counts(&mut self.by_language_model, key, &without_interactions(&item.counts));
        }
        for item in record.totals_by_model_feature.iter().flatten() {
            let key = (category(&item.model), category(&item.feature));
            add_counts(&mut self.by_model_feature, key, &item.counts);
        }
    }

    fn finish(self) -> PerUserSeries {
        let mut series = self.series;
        series.daily.sort_by(|a, b| a.day.cmp(&b.day));
        series.by_ide = self
            .by_ide
            .into_iter()
            .map(|(ide, counts)| IdeSummary { ide, counts })
            .collect();
        series.by_feature = self
            .by_feature
            .into_iter()
            .map(|(feature, counts)| FeatureSummary { feature, counts })
            .collect();
        series.by_language_feature = self
            .by_language_feature
            .into_iter()
            .map(|((language, feature), counts)| LanguageFeatureSummary {
                language,
                feature,
                counts,
            })
            .collect();
        series.by_language_model = self
            .by_language_model
            .into_iter()
            .map(|((language, model), counts)| LanguageModelSummary {
                language,
                model,
                counts,
            })
            .collect();
        series.by_model_feature = self
            .by_model_feature
            .into_iter()
            .map(|((model, feature), counts)| ModelFeatureSummary {
                model,
                feature,
                counts,
            })
            .collect();
        series
    }
}

/// Language breakdowns have no interaction counter
fn without_interactions(counts: &ActivityCounts) -> ActivityCounts {
    ActivityCounts {
        user_initiated_interaction_count: 0,
        ..*counts
    }
}

/// Generations and acceptances for one language across features and models
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageRollup {
    pub language: String,
    pub generations: u64,
    pub acceptances: u64,
}

/// Aggregator for per-user usage series
pub struct Aggregator;

impl Aggregator {
    /// Fold records into one series per user, busiest users first.
    /// Ties on interactions are ordered by user login ascending.
    pub fn per_user(records: &[UsageRecord]) -> Vec<PerUserSeries> {
        if records.is_empty() {
            return Vec::new();
        }

        let mut users: HashMap<&str, UserAccumulator> = HashMap::new();
        for record in records {
            users
                .entry(record.user_login.as_str())
                .or_insert_with(|| UserAccumulator::new(&record.user_login))
                .add(record);
        }

        let mut result: Vec<PerUserSeries> =
            users.into_values().map(UserAccumulator::finish).collect();
        result.sort_by(|a, b| {
            b.total_interactions
                .cmp(&a.total_interactions)
                .then_with(|| a.user_login.cmp(&b.user_login))
        });

        tracing::debug!(
            records = records.len(),
            users = result.len(),
            "aggregated per-user usage"
        );
        result
    }

    /// Merge the language×feature and language×model breakdowns of one user
    /// into a single row per language, in first-seen order
    pub fn language_rollup(series: &PerUserSeries) -> Vec<LanguageRollup> {
        let mut rows: IndexMap<&str, (u64, u64)> = IndexMap::new();

        let items = series
            .by_language_feature
            .iter()
            .map(|s| (s.language.as_str(), &s.counts))
            .chain(
                series
                    .by_language_model
                    .iter()
                    .map(|s| (s.language.as_str(), &s.counts)),
            );

        for (language, counts) in items {
            let (generations, acceptances) = rows.entry(language).or_default();
            *generations = generations.saturating_add(counts.generations);
            *acceptances = acceptances.saturating_add(counts.acceptances);
        }

        rows.into_iter()
            .map(|(language, (generations, acceptances))| LanguageRollup {
                language: language.to_string(),
                generations,
                acceptances,
            })
            .collect()
    }
}
