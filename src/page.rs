//! Leaderboard page template.

use std::fmt::Write;

use crate::bars::{render_agentic_bars, render_benchmark_bars};
use crate::chart::{metric_label, ChartEngine};
use crate::loader::Dataset;
use crate::util::escape_html;
use crate::view::AGGREGATE_METRIC;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageMode {
    /// Self-contained file, chart frozen at the rendered metric.
    Static,
    /// Served by the preview server; chart events round-trip to the engine.
    Interactive,
}

/// Page element the price chart is mounted in.
pub const PRICE_CHART_CONTAINER: &str = "price-chart";

const STYLE: &str = r#"
    body {
      font-family: "Segoe UI", -apple-system, BlinkMacSystemFont, "PingFang SC", sans-serif;
      background: #f5f5f5;
      margin: 0;
      padding: 1.5rem;
      color: #1f1f1f;
    }
    main {
      max-width: 960px;
      margin: 0 auto;
    }
    section {
      background: #ffffff;
      border-radius: 14px;
      box-shadow: 0 10px 30px rgba(15, 23, 42, 0.08);
      padding: 1.25rem 1.5rem;
      margin-bottom: 1.5rem;
    }
    .bar-row { margin-bottom: 0.9rem; }
    .bar-head { display: flex; justify-content: space-between; align-items: center; }
    .model-info { display: flex; gap: 0.6rem; align-items: center; }
    .rank { font-weight: 700; color: #6b7280; width: 1.5rem; }
    .badge { font-weight: 600; cursor: pointer; }
    .provider { color: #6b7280; font-size: 0.85rem; }
    .score { font-variant-numeric: tabular-nums; font-weight: 600; }
    .bar-track { background: #e5e7eb; border-radius: 999px; height: 10px; margin-top: 0.35rem; overflow: hidden; }
    .bar-track.small { height: 6px; flex: 1; margin: 0 0.6rem; }
    .bar-fill { background: linear-gradient(90deg, #22d3ee, #2563eb); height: 100%; }
    .subset-row { display: flex; align-items: center; font-size: 0.8rem; color: #4b5563; margin-top: 0.3rem; }
    .subset-name { width: 7rem; }
    .model-details { display: none; margin-top: 0.5rem; }
    .model-details.active { display: block; }
    .detail-grid { display: grid; grid-template-columns: repeat(auto-fit, minmax(140px, 1fr)); gap: 0.4rem; font-size: 0.8rem; }
    .detail-item { display: flex; justify-content: space-between; background: #f9fafb; padding: 0.3rem 0.5rem; border-radius: 6px; }
    #price-chart { position: relative; }
    .chart-legend { list-style: none; padding: 0; display: flex; flex-wrap: wrap; gap: 0.3rem 0.8rem; font-size: 0.8rem; }
    .legend-item { display: flex; align-items: center; gap: 0.35rem; padding: 0.15rem 0.4rem; border-radius: 6px; cursor: default; }
    .legend-swatch { width: 10px; height: 10px; border-radius: 50%; display: inline-block; }
    .chart-tooltip { position: absolute; pointer-events: none; white-space: pre-line; background: rgba(15, 23, 42, 0.9); color: #f8fafc; font-size: 0.75rem; padding: 0.4rem 0.6rem; border-radius: 6px; }
    .chart-point { transition: r 0.15s ease, cx 0.4s ease, cy 0.4s ease; }
"#;

const CLIENT_SCRIPT: &str = r#"
    const SVG_NS = "http://www.w3.org/2000/svg";
    const SVG_TAGS = new Set(["svg", "g", "line", "circle", "text", "rect"]);
    const chart = document.getElementById("price-chart");
    const metricSelect = document.getElementById("metric-select");

    function applyPatches(patches) {
      for (const patch of patches) {
        if (patch.op === "remove") {
          const node = document.getElementById(patch.id);
          if (node) node.remove();
        } else if (patch.op === "create") {
          const element = patch.element;
          const parent = document.getElementById(element.parent);
          if (!parent) continue;
          const node = SVG_TAGS.has(element.tag)
            ? document.createElementNS(SVG_NS, element.tag)
            : document.createElement(element.tag);
          node.id = element.id;
          for (const [name, value] of Object.entries(element.attrs)) node.setAttribute(name, value);
          if (element.text !== undefined) node.textContent = element.text;
          parent.insertBefore(node, parent.children[patch.index] || null);
        } else if (patch.op === "move") {
          const node = document.getElementById(patch.id);
          if (!node) continue;
          const parent = node.parentNode;
          node.remove();
          parent.insertBefore(node, parent.children[patch.index] || null);
        } else if (patch.op === "update") {
          const node = document.getElementById(patch.id);
          if (!node) continue;
          for (const [name, value] of Object.entries(patch.attrs)) node.setAttribute(name, value);
          if (patch.text !== undefined) node.textContent = patch.text;
        }
      }
    }

    async function send(event) {
      try {
        const response = await fetch("/api/events", {
          method: "POST",
          headers: { "Content-Type": "application/json" },
          body: JSON.stringify(event),
        });
        if (response.ok) applyPatches(await response.json());
      } catch (error) {
        console.warn("chart event failed", error);
      }
    }

    function pointer(event) {
      const rect = chart.getBoundingClientRect();
      return { x: event.clientX - rect.left, y: event.clientY - rect.top };
    }

    chart.addEventListener("mouseover", (event) => {
      const target = event.target.closest("[data-hover]");
      if (!target || target.contains(event.relatedTarget)) return;
      if (target.dataset.hover === "point") {
        send({ type: "point_over", name: target.dataset.name, ...pointer(event) });
      } else {
        send({ type: "legend_over", name: target.dataset.name });
      }
    });

    chart.addEventListener("mousemove", (event) => {
      const target = event.target.closest("[data-hover='point']");
      if (target) send({ type: "point_move", ...pointer(event) });
    });

    chart.addEventListener("mouseout", (event) => {
      const target = event.target.closest("[data-hover]");
      if (!target || target.contains(event.relatedTarget)) return;
      if (target.dataset.hover === "point") {
        send({ type: "point_out" });
      } else {
        send({ type: "legend_out", name: target.dataset.name });
      }
    });

    metricSelect.addEventListener("change", () => {
      send({ type: "render", metric: metricSelect.value });
    });

    window.addEventListener("resize", () => {
      if (!document.getElementById("price-chart")) return;
      const width = Math.max(320, Math.round(chart.clientWidth));
      send({ type: "resize", width, height: Math.round(width * 0.625) });
    });

    document.querySelectorAll(".badge[data-details]").forEach((badge) => {
      badge.addEventListener("click", () => {
        const details = document.getElementById(badge.dataset.details);
        if (details) details.classList.toggle("active");
      });
    });
"#;

pub fn render_page(dataset: &Dataset, chart: &ChartEngine, mode: PageMode) -> String {
    let mut html = String::new();
    let _ = write!(
        html,
        r#"<!DOCTYPE html>
<html lang="zh-CN">
<head>
  <meta charset="utf-8" />
  <title>Agentic Leaderboard</title>
  <meta name="viewport" content="width=device-width, initial-scale=1" />
  <style>{STYLE}  </style>
</head>
<body>
  <main>
    <h1>Agentic Leaderboard</h1>
    <section>
      <h2>{aggregate}</h2>
{agentic}    </section>
"#,
        aggregate = escape_html(&metric_label(AGGREGATE_METRIC)),
        agentic = render_agentic_bars(dataset, &format!("bars-{AGGREGATE_METRIC}")),
    );

    for benchmark in &dataset.schema.benchmarks {
        let _ = write!(
            html,
            r#"    <section>
      <h2>{title}</h2>
{bars}    </section>
"#,
            title = escape_html(benchmark),
            bars = render_benchmark_bars(dataset, &format!("bars-{benchmark}"), benchmark),
        );
    }

    let container = escape_html(&chart.config().container).into_owned();
    html.push_str("    <section>\n      <h2>Price vs. performance</h2>\n");
    if mode == PageMode::Interactive {
        html.push_str(r#"      <select id="metric-select">"#);
        let current = chart.metric().unwrap_or(AGGREGATE_METRIC);
        let options = std::iter::once(AGGREGATE_METRIC)
            .chain(dataset.schema.benchmarks.iter().map(String::as_str));
        for option in options {
            let _ = write!(
                html,
                r#"<option value="{value}"{selected}>{label}</option>"#,
                value = escape_html(option),
                selected = if option == current { " selected" } else { "" },
                label = escape_html(&metric_label(option)),
            );
        }
        html.push_str("</select>\n");
    }
    let _ = write!(
        html,
        r#"      <div id="{container}">{svg}{legend}{tooltip}</div>
    </section>
  </main>
"#,
        svg = chart.to_svg(),
        legend = chart.legend_html(),
        tooltip = chart.tooltip_html(),
    );

    if mode == PageMode::Interactive {
        let _ = writeln!(html, "  <script>{CLIENT_SCRIPT}  </script>");
    }
    html.push_str("</body>\n</html>\n");
    html
}
