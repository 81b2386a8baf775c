//! Ranked projections of a dataset.

use serde::Serialize;

use crate::loader::Dataset;

/// Selector for the mean-across-all-benchmarks view.
pub const AGGREGATE_METRIC: &str = "agentic";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubsetScore {
    pub name: String,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedEntry {
    pub name: String,
    pub provider: String,
    pub score: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subsets: Option<Vec<SubsetScore>>,
}

/// Ranking by one benchmark, group or subset column. Group keys carry the
/// member breakdown.
pub fn benchmark_view(dataset: &Dataset, key: &str) -> Vec<RankedEntry> {
    let group = dataset.schema.group(key);
    let entries = dataset
        .models
        .iter()
        .map(|model| RankedEntry {
            name: model.name.clone(),
            provider: model.provider.clone(),
            score: model.score(key),
            subsets: group.map(|group| {
                group
                    .members
                    .iter()
                    .map(|member| SubsetScore {
                        name: member.clone(),
                        score: model.score(member),
                    })
                    .collect()
            }),
        })
        .collect();
    ranked(entries)
}

/// Ranking by the mean over the top-level benchmark list.
pub fn aggregate_view(dataset: &Dataset) -> Vec<RankedEntry> {
    let benchmarks = &dataset.schema.benchmarks;
    let entries = dataset
        .models
        .iter()
        .map(|model| {
            let score = if benchmarks.is_empty() {
                0.0
            } else {
                benchmarks.iter().map(|b| model.score(b)).sum::<f64>() / benchmarks.len() as f64
            };
            RankedEntry {
                name: model.name.clone(),
                provider: model.provider.clone(),
                score,
                subsets: None,
            }
        })
        .collect();
    ranked(entries)
}

/// Aggregate view for [`AGGREGATE_METRIC`], benchmark view otherwise.
pub fn metric_view(dataset: &Dataset, metric: &str) -> Vec<RankedEntry> {
    if metric == AGGREGATE_METRIC {
        aggregate_view(dataset)
    } else {
        benchmark_view(dataset, metric)
    }
}

fn ranked(mut entries: Vec<RankedEntry>) -> Vec<RankedEntry> {
    // stable: equal scores keep dataset order
    entries.sort_by(|a, b| b.score.total_cmp(&a.score));
    entries
}
