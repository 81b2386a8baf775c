//! Merges the scores table with the metadata table into model records.

use std::collections::HashMap;

use serde::Serialize;

use crate::schema::BenchmarkSchema;
use crate::score::normalize;
use crate::table::{Row, Table};

/// Fixed USD to RMB conversion used for chart prices.
pub const FX_RATE: f64 = 7.01;

/// Extended attributes only present when a metadata table is loaded.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ModelMeta {
    pub open_source: Option<bool>,
    pub tokens_per_sec: Option<f64>,
    pub context_window: Option<String>,
    pub nation: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelRecord {
    pub name: String,
    pub provider: String,
    pub cost_usd: f64,
    pub cost_rmb: f64,
    /// Raw member scores and group averages share this map.
    pub scores: HashMap<String, f64>,
    pub meta: Option<ModelMeta>,
}

impl ModelRecord {
    /// Score for a benchmark, group or subset column; `0.0` when absent.
    pub fn score(&self, key: &str) -> f64 {
        self.scores.get(key).copied().unwrap_or(0.0)
    }

    /// Price per million tokens in RMB.
    pub fn price(&self) -> f64 {
        self.cost_usd * FX_RATE + self.cost_rmb
    }

    fn from_row(name: &str, row: &Row, schema: &BenchmarkSchema) -> Self {
        let mut scores: HashMap<String, f64> = schema
            .score_columns()
            .into_iter()
            .map(|column| (column.to_owned(), normalize(row.get(column))))
            .collect();

        for group in &schema.groups {
            let average = if group.members.is_empty() {
                0.0
            } else {
                group
                    .members
                    .iter()
                    .map(|member| scores.get(member).copied().unwrap_or(0.0))
                    .sum::<f64>()
                    / group.members.len() as f64
            };
            scores.insert(group.name.clone(), average);
        }

        Self {
            name: name.to_owned(),
            provider: row.get("provider").unwrap_or_default().to_owned(),
            cost_usd: normalize(row.get("cost_usd")),
            cost_rmb: normalize(row.get("cost_rmb")),
            scores,
            meta: None,
        }
    }

    fn merge_meta(&mut self, row: &Row) {
        if let Some(provider) = row.non_empty("provider") {
            self.provider = provider.to_owned();
        }
        if row.get("cost_usd").is_some() {
            self.cost_usd = normalize(row.get("cost_usd"));
        }
        if row.get("cost_rmb").is_some() {
            self.cost_rmb = normalize(row.get("cost_rmb"));
        }

        self.meta = Some(ModelMeta {
            open_source: row.non_empty("open_source").and_then(parse_flag),
            tokens_per_sec: row
                .non_empty("tokens_per_sec")
                .map(|value| normalize(Some(value))),
            context_window: row.non_empty("context_window").map(str::to_owned),
            nation: row.non_empty("nation").map(str::to_owned),
        });
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "y" | "1" | "是" => Some(true),
        "false" | "no" | "n" | "0" | "否" => Some(false),
        _ => None,
    }
}

/// Builds one record per named scores row, then left-joins metadata by
/// exact name. Duplicate names keep their first position with the last
/// row's values; metadata-only names are ignored.
pub fn build(eval: &Table, meta: &Table, schema: &BenchmarkSchema) -> Vec<ModelRecord> {
    let mut records: Vec<ModelRecord> = Vec::with_capacity(eval.rows.len());
    let mut positions: HashMap<String, usize> = HashMap::new();

    for row in &eval.rows {
        let Some(name) = row.non_empty("name") else {
            tracing::debug!("skipping scores row without a name");
            continue;
        };
        let record = ModelRecord::from_row(name, row, schema);
        match positions.get(name) {
            Some(&index) => records[index] = record,
            None => {
                positions.insert(name.to_owned(), records.len());
                records.push(record);
            }
        }
    }

    for row in &meta.rows {
        let Some(name) = row.non_empty("name") else {
            continue;
        };
        match positions.get(name) {
            Some(&index) => records[index].merge_meta(row),
            None => tracing::debug!("metadata for unknown model `{name}` ignored"),
        }
    }

    records
}
