use std::{net::SocketAddr, sync::Arc};

use anyhow::Context as AnyhowContext;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, signal, sync::Mutex};

use crate::{
    board::Board,
    chart::{resize::Debouncer, scene::Patch, ChartConfig, ChartEngine},
    cli::CliArgs,
    error::Result,
    loader::Dataset,
    page::{render_page, PageMode, PRICE_CHART_CONTAINER},
    view::{metric_view, AGGREGATE_METRIC},
};

const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:8080";

#[derive(Clone)]
struct ServerState {
    board: Arc<Board>,
    chart: Arc<Mutex<ChartEngine>>,
    resize: Arc<Debouncer>,
}

type SharedState = ServerState;

/// Serves the leaderboard page and drives its chart from browser events.
pub async fn run_preview_server(args: &CliArgs, board: Board) -> Result<()> {
    let listen = args
        .listen
        .clone()
        .unwrap_or_else(|| DEFAULT_LISTEN_ADDR.to_owned());
    let addr: SocketAddr = listen
        .parse()
        .with_context(|| format!("parsing listen address `{listen}`"))?;

    let mut chart = board.chart(ChartConfig::new(PRICE_CHART_CONTAINER, args.width, args.height));
    let dataset = board.dataset().await;
    let metric = if is_known_metric(&dataset, &args.metric) {
        args.metric.as_str()
    } else {
        tracing::warn!("unknown metric `{}`, showing {AGGREGATE_METRIC}", args.metric);
        AGGREGATE_METRIC
    };
    chart.render(&dataset, metric);

    let state = ServerState {
        board: Arc::new(board),
        chart: Arc::new(Mutex::new(chart)),
        resize: Arc::new(Debouncer::default()),
    };

    let router = Router::new()
        .route("/", get(index_page))
        .route("/api/events", post(chart_event))
        .route("/api/models", get(list_models))
        .route("/api/views/:key", get(ranked_view))
        .route("/api/bars/:key", get(bar_fragment))
        .with_state(state);

    let listener = TcpListener::bind(addr)
        .await
        .context("binding preview server address")?;
    println!(
        "Leaderboard preview listening on http://{}",
        listener.local_addr().unwrap_or(addr)
    );

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            if let Err(err) = signal::ctrl_c().await {
                tracing::warn!("failed to listen for shutdown signal: {err:?}");
            }
            println!("Shutdown signal received; stopping server…");
        })
        .await
        .context("running preview server")?;

    Ok(())
}

type ApiResult<T> = std::result::Result<T, ApiError>;

#[derive(Debug, Serialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Serialize)]
struct ApiErrorDetail {
    message: String,
    #[serde(rename = "type")]
    error_type: String,
}

#[derive(Debug)]
struct ApiError {
    status: StatusCode,
    body: ApiErrorBody,
}

impl ApiError {
    fn new(status: StatusCode, error_type: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            body: ApiErrorBody {
                error: ApiErrorDetail {
                    message: message.into(),
                    error_type: error_type.to_string(),
                },
            },
        }
    }

    fn invalid_event(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "invalid_event", message)
    }

    fn unknown_metric(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, "unknown_metric", message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

/// Browser-side chart interaction forwarded to the engine.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ChartEvent {
    Render { metric: String },
    Resize { width: f64, height: f64 },
    PointOver { name: String, x: f64, y: f64 },
    PointMove { x: f64, y: f64 },
    PointOut,
    LegendOver { name: String },
    LegendOut { name: String },
}

fn is_known_metric(dataset: &Dataset, metric: &str) -> bool {
    metric == AGGREGATE_METRIC || dataset.schema.contains(metric)
}

async fn index_page(State(state): State<SharedState>) -> Html<String> {
    let dataset = state.board.dataset().await;
    let chart = state.chart.lock().await;
    Html(render_page(&dataset, &chart, PageMode::Interactive))
}

async fn ranked_view(
    State(state): State<SharedState>,
    Path(key): Path<String>,
) -> Response {
    let dataset = state.board.dataset().await;
    if !is_known_metric(&dataset, &key) {
        return ApiError::unknown_metric(format!("Unknown metric `{key}`")).into_response();
    }
    Json(metric_view(&dataset, &key)).into_response()
}

async fn list_models(State(state): State<SharedState>) -> Response {
    let dataset = state.board.dataset().await;
    Json(dataset.as_ref().clone()).into_response()
}

/// Bar-list fragment for one tab, mounted in a container named after the key.
async fn bar_fragment(State(state): State<SharedState>, Path(key): Path<String>) -> Response {
    let dataset = state.board.dataset().await;
    if !is_known_metric(&dataset, &key) {
        return ApiError::unknown_metric(format!("Unknown metric `{key}`")).into_response();
    }
    let container = format!("bars-{key}");
    let html = if key == AGGREGATE_METRIC {
        state.board.render_agentic_bars(&container).await
    } else {
        state.board.render_benchmark_bars(&container, &key).await
    };
    Html(html).into_response()
}

async fn chart_event(
    State(state): State<SharedState>,
    Json(event): Json<ChartEvent>,
) -> Response {
    match apply_event(&state, event).await {
        Ok(patches) => Json(patches).into_response(),
        Err(err) => err.into_response(),
    }
}

async fn apply_event(state: &ServerState, event: ChartEvent) -> ApiResult<Vec<Patch>> {
    let dataset = state.board.dataset().await;

    if let ChartEvent::Resize { width, height } = event {
        if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
            return Err(ApiError::invalid_event("width and height must be positive"));
        }
        if !state.resize.settle().await {
            return Ok(Vec::new());
        }
        return Ok(state.chart.lock().await.resize(&dataset, width, height));
    }

    let mut chart = state.chart.lock().await;
    let patches = match event {
        ChartEvent::Render { metric } => {
            if !is_known_metric(&dataset, &metric) {
                return Err(ApiError::invalid_event(format!(
                    "metric `{metric}` is not available"
                )));
            }
            state.board.render_price_chart(&mut chart, &metric).await
        }
        ChartEvent::PointOver { name, x, y } => chart.pointer_over(&name, x, y),
        ChartEvent::PointMove { x, y } => chart.pointer_move(x, y),
        ChartEvent::PointOut => chart.pointer_out(),
        ChartEvent::LegendOver { name } => chart.legend_over(&name),
        ChartEvent::LegendOut { name } => chart.legend_out(&name),
        ChartEvent::Resize { .. } => Vec::new(),
    };
    Ok(patches)
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;
    use crate::loader::DatasetLoader;
    use crate::source::InlineSource;

    async fn state() -> ServerState {
        let board = Board::new(DatasetLoader::new(
            Box::new(InlineSource::sample_scores()),
            Box::new(InlineSource::sample_meta()),
        ));
        let mut chart = board.chart(ChartConfig::new(PRICE_CHART_CONTAINER, 800.0, 500.0));
        board.render_price_chart(&mut chart, AGGREGATE_METRIC).await;
        ServerState {
            board: Arc::new(board),
            chart: Arc::new(Mutex::new(chart)),
            resize: Arc::new(Debouncer::default()),
        }
    }

    #[test]
    fn parses_events() {
        let event: ChartEvent =
            serde_json::from_str(r#"{"type":"point_over","name":"GPT-5.2","x":1,"y":2.5}"#).unwrap();
        assert_eq!(
            event,
            ChartEvent::PointOver {
                name: "GPT-5.2".into(),
                x: 1.0,
                y: 2.5
            }
        );
        let event: ChartEvent = serde_json::from_str(r#"{"type":"point_out"}"#).unwrap();
        assert_eq!(event, ChartEvent::PointOut);
    }

    #[tokio::test]
    async fn render_event_switches_metric() {
        let state = state().await;
        let patches = apply_event(
            &state,
            ChartEvent::Render {
                metric: "Tau2Bench".into(),
            },
        )
        .await
        .unwrap();
        assert!(!patches.is_empty());
        assert_eq!(state.chart.lock().await.metric(), Some("Tau2Bench"));
    }

    #[tokio::test]
    async fn unknown_metric_is_rejected() {
        let state = state().await;
        let err = apply_event(
            &state,
            ChartEvent::Render {
                metric: "Nope".into(),
            },
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.body.error.error_type, "invalid_event");

        let err = ApiError::unknown_metric("Unknown metric `Nope`");
        assert_eq!(err.status, StatusCode::NOT_FOUND);
        assert_eq!(
            serde_json::to_value(&err.body).unwrap()["error"]["type"],
            "unknown_metric"
        );
    }

    #[tokio::test]
    async fn patches_serialize_with_op_tag() {
        let state = state().await;
        let patches = apply_event(
            &state,
            ChartEvent::LegendOver {
                name: "Kimi-k2".into(),
            },
        )
        .await
        .unwrap();
        assert_matches!(&patches[..], [Patch::Update { .. }, Patch::Update { .. }]);
        let json = serde_json::to_value(&patches).unwrap();
        assert_eq!(json[0]["op"], "update");
    }

    #[tokio::test]
    async fn bar_fragments_by_key() {
        let state = state().await;
        let response = bar_fragment(State(state.clone()), Path(AGGREGATE_METRIC.to_owned())).await;
        assert_eq!(response.status(), StatusCode::OK);

        let response = bar_fragment(State(state.clone()), Path("IFBench".to_owned())).await;
        assert_eq!(response.status(), StatusCode::OK);

        let response = bar_fragment(State(state), Path("Nope".to_owned())).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test(start_paused = true)]
    async fn resize_burst_redraws_once() {
        let state = state().await;
        let first = tokio::spawn({
            let state = state.clone();
            async move {
                apply_event(&state, ChartEvent::Resize { width: 700.0, height: 400.0 }).await
            }
        });
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        let second = apply_event(&state, ChartEvent::Resize { width: 600.0, height: 375.0 })
            .await
            .unwrap();

        assert!(first.await.unwrap().unwrap().is_empty());
        assert!(!second.is_empty());
        assert_eq!(state.chart.lock().await.config().width, 600.0);
    }
}
