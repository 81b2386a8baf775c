//! Entry points used by the page layer. Each one waits for the dataset.

use std::sync::Arc;

use crate::bars;
use crate::chart::scene::Patch;
use crate::chart::{ChartConfig, ChartContext, ChartEngine};
use crate::loader::{Dataset, DatasetLoader};

pub struct Board {
    loader: DatasetLoader,
    context: Arc<ChartContext>,
}

impl Board {
    pub fn new(loader: DatasetLoader) -> Self {
        Self {
            loader,
            context: ChartContext::new(),
        }
    }

    pub async fn dataset(&self) -> Arc<Dataset> {
        self.loader.load().await
    }

    pub async fn render_benchmark_bars(&self, container_id: &str, key: &str) -> String {
        let dataset = self.dataset().await;
        bars::render_benchmark_bars(&dataset, container_id, key)
    }

    pub async fn render_agentic_bars(&self, container_id: &str) -> String {
        let dataset = self.dataset().await;
        bars::render_agentic_bars(&dataset, container_id)
    }

    /// New chart bound to this board's shared color registry.
    pub fn chart(&self, config: ChartConfig) -> ChartEngine {
        ChartEngine::new(config, self.context.clone())
    }

    pub async fn render_price_chart(&self, chart: &mut ChartEngine, metric: &str) -> Vec<Patch> {
        let dataset = self.dataset().await;
        chart.render(&dataset, metric)
    }
}
