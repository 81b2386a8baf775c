use std::path::PathBuf;
use std::time::Duration;

use clap::{ArgAction, Parser};
use url::Url;

use crate::error::Result;
use crate::loader::DatasetLoader;
use crate::session::{HttpSession, SessionConfig};
use crate::source::{self, InlineSource, TableSource};
use crate::view::AGGREGATE_METRIC;

/// Command-line options for the leaderboard renderer.
#[derive(Debug, Clone, Parser)]
#[command(author, version, about = "Benchmark leaderboard renderer", long_about = None)]
pub struct CliArgs {
    /// Scores table: file path or URL. The embedded sample is used when omitted.
    #[arg(long = "scores", value_name = "SRC", env = "BENCH_BOARD_SCORES")]
    pub scores: Option<String>,

    /// Metadata table (cost, provenance, throughput, context size): file path or URL.
    #[arg(long = "meta", value_name = "SRC", env = "BENCH_BOARD_META")]
    pub meta: Option<String>,

    /// Base URL relative table locations are fetched from.
    #[arg(long = "base-url", value_name = "URL", env = "BENCH_BOARD_BASE_URL")]
    pub base_url: Option<Url>,

    /// Output directory for the static site.
    #[arg(long = "out", value_name = "DIR", default_value = "site")]
    pub out: PathBuf,

    /// Metric plotted in the price chart: `agentic` or a benchmark/group name.
    #[arg(long = "metric", default_value = AGGREGATE_METRIC)]
    pub metric: String,

    /// Chart surface width in pixels.
    #[arg(long = "width", default_value_t = 800.0)]
    pub width: f64,

    /// Chart surface height in pixels.
    #[arg(long = "height", default_value_t = 500.0)]
    pub height: f64,

    /// Serve an interactive preview instead of writing the static site.
    #[arg(long = "serve", action = ArgAction::SetTrue)]
    pub serve: bool,

    /// Listen address for the preview server (requires `--serve`).
    #[arg(long = "listen", value_name = "ADDR", requires = "serve")]
    pub listen: Option<String>,

    /// Network timeout (seconds) applied to HTTP table requests.
    #[arg(long = "timeout", default_value_t = 30, value_parser = clap::value_parser!(u64).range(1..=300))]
    timeout_secs: u64,
}

impl CliArgs {
    /// Returns the configured network timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Convert CLI arguments into a session configuration.
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig::new(self.base_url.clone(), self.timeout())
    }

    /// Builds the loader for the configured sources. Without `--scores` the
    /// embedded sample (scores and metadata) is used.
    pub fn dataset_loader(&self) -> Result<DatasetLoader> {
        let session = HttpSession::new(&self.session_config())?;

        let (scores, meta): (Box<dyn TableSource>, Box<dyn TableSource>) =
            match (&self.scores, &self.meta) {
                (None, None) => (
                    Box::new(InlineSource::sample_scores()),
                    Box::new(InlineSource::sample_meta()),
                ),
                (None, Some(meta)) => (
                    Box::new(InlineSource::sample_scores()),
                    source::resolve(meta, &session)?,
                ),
                (Some(scores), meta) => (
                    source::resolve(scores, &session)?,
                    match meta {
                        Some(meta) => source::resolve(meta, &session)?,
                        None => Box::new(InlineSource::empty()),
                    },
                ),
            };

        tracing::info!("scores: {}, metadata: {}", scores.describe(), meta.describe());
        Ok(DatasetLoader::new(scores, meta))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_aggregate_metric() {
        let args = CliArgs::parse_from(["bench-board"]);
        assert_eq!(args.metric, "agentic");
        assert_eq!(args.out, PathBuf::from("site"));
        assert_eq!(args.timeout(), Duration::from_secs(30));
        assert!(!args.serve);
    }

    #[test]
    fn listen_requires_serve() {
        assert!(CliArgs::try_parse_from(["bench-board", "--listen", "0.0.0.0:9000"]).is_err());
        let args =
            CliArgs::try_parse_from(["bench-board", "--serve", "--listen", "0.0.0.0:9000"]).unwrap();
        assert_eq!(args.listen.as_deref(), Some("0.0.0.0:9000"));
    }

    #[test]
    fn rejects_out_of_range_timeout() {
        assert!(CliArgs::try_parse_from(["bench-board", "--timeout", "0"]).is_err());
    }

    #[tokio::test]
    async fn embedded_sample_without_sources() {
        let args = CliArgs::parse_from(["bench-board"]);
        let dataset = args.dataset_loader().unwrap().load().await;
        assert_eq!(dataset.models.len(), 10);
    }
}
