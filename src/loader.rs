//! One-shot, memoized loading of the merged model list.

use std::sync::Arc;

use futures_util::future::join;
use serde::Serialize;
use tokio::sync::OnceCell;

use crate::record::{self, ModelRecord};
use crate::schema::BenchmarkSchema;
use crate::source::TableSource;
use crate::table;

/// Everything one load cycle produces.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Dataset {
    pub schema: BenchmarkSchema,
    pub models: Vec<ModelRecord>,
}

impl Dataset {
    /// Parses both tables and merges them. The schema comes from the scores
    /// table header.
    pub fn from_text(scores: &str, meta: &str) -> Self {
        let eval = table::parse(scores);
        let meta = table::parse(meta);
        let schema = BenchmarkSchema::resolve(&eval.headers);
        let models = record::build(&eval, &meta, &schema);
        Self { schema, models }
    }

    pub fn model(&self, name: &str) -> Option<&ModelRecord> {
        self.models.iter().find(|model| model.name == name)
    }
}

/// Fetches the scores and metadata tables at most once and caches the
/// merged result. Concurrent callers share the in-flight load.
pub struct DatasetLoader {
    scores: Box<dyn TableSource>,
    meta: Box<dyn TableSource>,
    dataset: OnceCell<Arc<Dataset>>,
}

impl DatasetLoader {
    pub fn new(scores: Box<dyn TableSource>, meta: Box<dyn TableSource>) -> Self {
        Self {
            scores,
            meta,
            dataset: OnceCell::new(),
        }
    }

    pub async fn load(&self) -> Arc<Dataset> {
        self.dataset
            .get_or_init(|| self.fetch_and_build())
            .await
            .clone()
    }

    async fn fetch_and_build(&self) -> Arc<Dataset> {
        let (scores, meta) = join(
            fetch_or_empty(self.scores.as_ref(), "scores"),
            fetch_or_empty(self.meta.as_ref(), "metadata"),
        )
        .await;

        let dataset = Dataset::from_text(&scores, &meta);
        tracing::info!(
            "loaded {} models across {} benchmarks",
            dataset.models.len(),
            dataset.schema.benchmarks.len()
        );
        Arc::new(dataset)
    }
}

async fn fetch_or_empty(source: &dyn TableSource, role: &str) -> String {
    match source.fetch().await {
        Ok(text) => {
            tracing::debug!("fetched {role} table from {}", source.describe());
            text
        }
        Err(err) => {
            tracing::warn!("{role} table unavailable, continuing without it: {err}");
            String::new()
        }
    }
}
