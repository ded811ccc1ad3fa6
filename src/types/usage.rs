//! Usage types for per-user metrics reports

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Counters accept any JSON number: fractions truncate, negatives and
/// non-numbers count as zero
fn lenient_count<'de, D>(deserializer: D) -> std::result::Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value.as_u64() {
        Some(n) => n,
        None => value
            .as_f64()
            .filter(|f| f.is_finite() && *f >= 0.0)
            .map(|f| f as u64)
            .unwrap_or(0),
    })
}

/// Category labels: strings as-is, other scalars in their JSON text
fn lenient_label<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
        other => Some(other.to_string()),
    })
}

/// Identity fields; anything that is not a string reads as empty
fn lenient_text<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        _ => String::new(),
    })
}

/// Breakdown lists keep the items that read as objects; a non-array is absent
fn lenient_list<'de, D, T>(deserializer: D) -> std::result::Result<Option<Vec<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(items) => Some(
            items
                .into_iter()
                .filter(Value::is_object)
                .filter_map(|item| serde_json::from_value(item).ok())
                .collect(),
        ),
        _ => None,
    })
}

/// Activity and lines-of-code counters shared by records and breakdown items
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct ActivityCounts {
    #[serde(default, deserialize_with = "lenient_count")]
    pub user_initiated_interaction_count: u64,
    #[serde(default, deserialize_with = "lenient_count")]
    pub code_generation_activity_count: u64,
    #[serde(default, deserialize_with = "lenient_count")]
    pub code_acceptance_activity_count: u64,
    #[serde(default, deserialize_with = "lenient_count")]
    pub loc_suggested_to_add_sum: u64,
    #[serde(default, deserialize_with = "lenient_count")]
    pub loc_suggested_to_delete_sum: u64,
    #[serde(default, deserialize_with = "lenient_count")]
    pub loc_added_sum: u64,
    #[serde(default, deserialize_with = "lenient_count")]
    pub loc_deleted_sum: u64,
}

/// Breakdown item keyed by IDE
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct IdeTotals {
    #[serde(default, deserialize_with = "lenient_label")]
    pub ide: Option<String>,
    #[serde(flatten)]
    pub counts: ActivityCounts,
}

/// Breakdown item keyed by feature (chat, completions, agent, ...)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct FeatureTotals {
    #[serde(default, deserialize_with = "lenient_label")]
    pub feature: Option<String>,
    #[serde(flatten)]
    pub counts: ActivityCounts,
}

/// Breakdown item keyed by language and feature
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct LanguageFeatureTotals {
    #[serde(default, deserialize_with = "lenient_label")]
    pub language: Option<String>,
    #[serde(default, deserialize_with = "lenient_label")]
    pub feature: Option<String>,
    #[serde(flatten)]
    pub counts: ActivityCounts,
}

/// Breakdown item keyed by language and model
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct LanguageModelTotals {
    #[serde(default, deserialize_with = "lenient_label")]
    pub language: Option<String>,
    #[serde(default, deserialize_with = "lenient_label")]
    pub model: Option<String>,
    #[serde(flatten)]
    pub counts: ActivityCounts,
}

/// Breakdown item keyed by model and feature
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct ModelFeatureTotals {
    #[serde(default, deserialize_with = "lenient_label")]
    pub model: Option<String>,
    #[serde(default, deserialize_with = "lenient_label")]
    pub feature: Option<String>,
    #[serde(flatten)]
    pub counts: ActivityCounts,
}

/// One line of the per-user report feed: a single user on a single day
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct UsageRecord {
    #[serde(default, deserialize_with = "lenient_text")]
    pub day: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub user_login: String,
    #[serde(default, deserialize_with = "lenient_label")]
    pub report_start_day: Option<String>,
    #[serde(default, deserialize_with = "lenient_label")]
    pub report_end_day: Option<String>,
    #[serde(flatten)]
    pub counts: ActivityCounts,
    #[serde(default, deserialize_with = "lenient_list")]
    pub totals_by_ide: Option<Vec<IdeTotals>>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub totals_by_feature: Option<Vec<FeatureTotals>>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub totals_by_language_feature: Option<Vec<LanguageFeatureTotals>>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub totals_by_language_model: Option<Vec<LanguageModelTotals>>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub totals_by_model_feature: Option<Vec<ModelFeatureTotals>>,
}

impl UsageRecord {
    /// A record is usable only when it names a user and a day
    pub fn is_complete(&self) -> bool {
        !self.user_login.is_empty() && !self.day.is_empty()
    }
}

/// Daily activity snapshot for one user
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DailyUsage {
    pub day: String,
    pub user_login: String,
    pub user_initiated_interaction_count: u64,
    pub code_generation_activity_count: u64,
    pub code_acceptance_activity_count: u64,
}

/// Summed counters for one category
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct CategoryCounts {
    pub interactions: u64,
    pub generations: u64,
    pub acceptances: u64,
    pub loc_suggested_to_add_sum: u64,
    pub loc_suggested_to_delete_sum: u64,
    pub loc_added_sum: u64,
    pub loc_deleted_sum: u64,
}

impl CategoryCounts {
    pub fn add(&mut self, counts: &ActivityCounts) {
        self.interactions = self
            .interactions
            .saturating_add(counts.user_initiated_interaction_count);
        self.generations = self
            .generations
            .saturating_add(counts.code_generation_activity_count);
        self.acceptances = self
            .acceptances
            .saturating_add(counts.code_acceptance_activity_count);
        self.loc_suggested_to_add_sum = self
            .loc_suggested_to_add_sum
            .saturating_add(counts.loc_suggested_to_add_sum);
        self.loc_suggested_to_delete_sum = self
            .loc_suggested_to_delete_sum
            .saturating_add(counts.loc_suggested_to_delete_sum);
        self.loc_added_sum = self.loc_added_sum.saturating_add(counts.loc_added_sum);
        self.loc_deleted_sum = self.loc_deleted_sum.saturating_add(counts.loc_deleted_sum);
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IdeSummary {
    pub ide: String,
    #[serde(flatten)]
    pub counts: CategoryCounts,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FeatureSummary {
    pub feature: String,
    #[serde(flatten)]
    pub counts: CategoryCounts,
}

/// Language breakdowns carry no interaction counter in the feed, so
/// `counts.interactions` stays zero for them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LanguageFeatureSummary {
    pub language: String,
    pub feature: String,
    #[serde(flatten)]
    pub counts: CategoryCounts,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LanguageModelSummary {
    pub language: String,
    pub model: String,
    #[serde(flatten)]
    pub counts: CategoryCounts,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ModelFeatureSummary {
    pub model: String,
    pub feature: String,
    #[serde(flatten)]
    pub counts: CategoryCounts,
}

/// Aggregated usage for one user over the report period
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct PerUserSeries {
    pub user_login: String,
    pub total_interactions: u64,
    pub total_generations: u64,
    pub total_acceptances: u64,
    pub total_loc_suggested_to_add: u64,
    pub total_loc_suggested_to_delete: u64,
    pub total_loc_added: u64,
    pub total_loc_deleted: u64,
    /// Sorted by day ascending
    pub daily: Vec<DailyUsage>,
    pub by_ide: Vec<IdeSummary>,
    pub by_feature: Vec<FeatureSummary>,
    pub by_language_feature: Vec<LanguageFeatureSummary>,
    pub by_language_model: Vec<LanguageModelSummary>,
    pub by_model_feature: Vec<ModelFeatureSummary>,
}

/// Payload of the per-user usage operation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct UsageSeries {
    pub series: Vec<PerUserSeries>,
}
