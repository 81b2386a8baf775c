//! Ranked bar-list markup.

use std::fmt::Write;

use crate::loader::Dataset;
use crate::score::format_percent;
use crate::util::escape_html;
use crate::view::{aggregate_view, benchmark_view, RankedEntry};

/// Bar rows for one benchmark or group; group rows carry subset bars.
pub fn render_benchmark_bars(dataset: &Dataset, container_id: &str, key: &str) -> String {
    let rows = benchmark_view(dataset, key);
    render_rows(dataset, container_id, &rows, false)
}

/// Bar rows for the aggregate view, each with a per-benchmark detail grid.
pub fn render_agentic_bars(dataset: &Dataset, container_id: &str) -> String {
    let rows = aggregate_view(dataset);
    render_rows(dataset, container_id, &rows, true)
}

fn render_rows(dataset: &Dataset, container_id: &str, rows: &[RankedEntry], details: bool) -> String {
    let container = escape_html(container_id);
    let mut html = String::new();
    let _ = writeln!(html, r#"<div class="bar-list" id="{container}">"#);

    for (idx, row) in rows.iter().enumerate() {
        let _ = write!(
            html,
            r#"<div class="bar-row">
  <div class="bar-head">
    <div class="model-info">
      <span class="rank">{rank}</span>
      <span class="badge" data-details="details-{container}-{idx}">{name}</span>
      <span class="provider">{provider}</span>
    </div>
    <span class="score">{score}</span>
  </div>
  <div class="bar-track"><div class="bar-fill" style="width:{width:.1}%;"></div></div>
"#,
            rank = idx + 1,
            name = escape_html(&row.name),
            provider = escape_html(&row.provider),
            score = format_percent(row.score),
            width = bar_width(row.score),
        );

        if let Some(subsets) = &row.subsets {
            html.push_str("  <div class=\"subset-list\">\n");
            for subset in subsets {
                let _ = writeln!(
                    html,
                    r#"    <div class="subset-row"><span class="subset-name">{name}</span><div class="bar-track small"><div class="bar-fill" style="width:{width:.1}%;"></div></div><span class="subset-score">{score}</span></div>"#,
                    name = escape_html(subset_label(&subset.name)),
                    width = bar_width(subset.score),
                    score = format_percent(subset.score),
                );
            }
            html.push_str("  </div>\n");
        }

        if details {
            if let Some(model) = dataset.model(&row.name) {
                let _ = writeln!(
                    html,
                    r#"  <div class="model-details" id="details-{container}-{idx}"><div class="detail-grid">"#
                );
                for benchmark in &dataset.schema.benchmarks {
                    let _ = writeln!(
                        html,
                        r#"    <div class="detail-item"><span class="detail-name">{name}</span><span class="detail-val">{score}</span></div>"#,
                        name = escape_html(benchmark),
                        score = format_percent(model.score(benchmark)),
                    );
                }
                html.push_str("  </div></div>\n");
            }
        }

        html.push_str("</div>\n");
    }

    html.push_str("</div>\n");
    html
}

fn bar_width(score: f64) -> f64 {
    score.clamp(0.0, 100.0)
}

/// `Tau2Bench_airline` -> `airline`.
fn subset_label(column: &str) -> &str {
    column.split_once('_').map_or(column, |(_, rest)| rest)
}
