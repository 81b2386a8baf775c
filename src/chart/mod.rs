//! Price-vs-performance scatter chart.
//!
//! The engine keeps a retained [`Scene`] per chart. Every operation builds
//! the next scene from the current plot and interaction state and returns
//! the keyed diff against what was last drawn.

pub mod palette;
pub mod resize;
pub mod scale;
pub mod scene;

use std::sync::{Arc, Mutex};

use crate::loader::Dataset;
use crate::score::format_percent;
use crate::util::trim_number;
use crate::view::{metric_view, AGGREGATE_METRIC};
use palette::ColorRegistry;
use scale::{price_domain, score_domain, LinearScale, X_TICKS, Y_TICKS};
use scene::{diff, Element, Patch, Scene};

const POINT_RADIUS: f64 = 6.0;
const POINT_RADIUS_ACTIVE: f64 = 9.0;
const POINT_STROKE: f64 = 1.5;
const POINT_STROKE_ACTIVE: f64 = 3.0;
const LEGEND_ACTIVE_BG: &str = "#eef2ff";
const TOOLTIP_OFFSET_X: f64 = 12.0;
const TOOLTIP_OFFSET_Y: f64 = -28.0;

pub const X_AXIS_LABEL: &str = "Price (RMB / 1M tokens)";

#[derive(Debug, Clone, Copy, PartialEq)]
struct Margin {
    top: f64,
    right: f64,
    bottom: f64,
    left: f64,
}

const MARGIN: Margin = Margin {
    top: 20.0,
    right: 30.0,
    bottom: 50.0,
    left: 60.0,
};

/// State shared by every chart on one page: the stable color assignment.
#[derive(Debug, Default)]
pub struct ChartContext {
    colors: Mutex<ColorRegistry>,
}

impl ChartContext {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn colors_for<'a>(&self, names: impl Iterator<Item = &'a str>) -> Vec<&'static str> {
        let mut colors = self
            .colors
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        names.map(|name| colors.color_for(name)).collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartConfig {
    /// Id of the page element the chart is mounted in.
    pub container: String,
    pub width: f64,
    pub height: f64,
}

impl ChartConfig {
    pub fn new(container: impl Into<String>, width: f64, height: f64) -> Self {
        Self {
            container: container.into(),
            width,
            height,
        }
    }
}

/// One plotted model.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartPoint {
    pub name: String,
    pub provider: String,
    pub price: f64,
    pub score: f64,
    pub color: &'static str,
}

#[derive(Debug, Clone, PartialEq)]
struct Plot {
    metric: String,
    points: Vec<ChartPoint>,
    x_domain: (f64, f64),
    y_domain: (f64, f64),
}

#[derive(Debug, Clone, Default, PartialEq)]
struct Tooltip {
    target: Option<String>,
    x: f64,
    y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartState {
    Uninitialized,
    Initialized,
}

pub struct ChartEngine {
    config: ChartConfig,
    context: Arc<ChartContext>,
    state: ChartState,
    scene: Scene,
    plot: Option<Plot>,
    tooltip: Tooltip,
    highlighted: Option<String>,
}

impl ChartEngine {
    pub fn new(config: ChartConfig, context: Arc<ChartContext>) -> Self {
        Self {
            config,
            context,
            state: ChartState::Uninitialized,
            scene: Scene::new(),
            plot: None,
            tooltip: Tooltip::default(),
            highlighted: None,
        }
    }

    pub fn config(&self) -> &ChartConfig {
        &self.config
    }

    /// Metric currently on screen, if anything has been rendered.
    pub fn metric(&self) -> Option<&str> {
        self.plot.as_ref().map(|plot| plot.metric.as_str())
    }

    pub fn points(&self) -> &[ChartPoint] {
        self.plot
            .as_ref()
            .map(|plot| plot.points.as_slice())
            .unwrap_or(&[])
    }

    /// Draws `metric` (the aggregate selector or a benchmark/group key).
    pub fn render(&mut self, dataset: &Dataset, metric: &str) -> Vec<Patch> {
        let entries = metric_view(dataset, metric);
        let colors = self
            .context
            .colors_for(entries.iter().map(|entry| entry.name.as_str()));

        let points: Vec<ChartPoint> = entries
            .into_iter()
            .zip(colors)
            .map(|(entry, color)| {
                let price = dataset.model(&entry.name).map_or(0.0, |model| model.price());
                ChartPoint {
                    name: entry.name,
                    provider: entry.provider,
                    price,
                    score: entry.score,
                    color,
                }
            })
            .collect();

        let x_domain = price_domain(points.iter().map(|p| p.price));
        let y_domain = score_domain(points.iter().map(|p| p.score));

        if let Some(target) = &self.tooltip.target {
            if !points.iter().any(|p| &p.name == target) {
                self.tooltip.target = None;
            }
        }
        if let Some(name) = &self.highlighted {
            if !points.iter().any(|p| &p.name == name) {
                self.highlighted = None;
            }
        }

        self.plot = Some(Plot {
            metric: metric.to_owned(),
            points,
            x_domain,
            y_domain,
        });

        if self.state == ChartState::Uninitialized {
            tracing::debug!("initializing chart surface in `{}`", self.config.container);
            self.state = ChartState::Initialized;
        }
        self.redraw()
    }

    /// Applies a new surface size and redraws the current metric. Nothing
    /// happens before the first render.
    pub fn resize(&mut self, dataset: &Dataset, width: f64, height: f64) -> Vec<Patch> {
        self.config.width = width;
        self.config.height = height;
        match (self.state, self.metric().map(str::to_owned)) {
            (ChartState::Initialized, Some(metric)) => self.render(dataset, &metric),
            _ => Vec::new(),
        }
    }

    /// Shows the tooltip for the point named `name` at pointer position.
    pub fn pointer_over(&mut self, name: &str, x: f64, y: f64) -> Vec<Patch> {
        if !self.points().iter().any(|p| p.name == name) {
            return Vec::new();
        }
        self.tooltip = Tooltip {
            target: Some(name.to_owned()),
            x,
            y,
        };
        self.redraw()
    }

    pub fn pointer_move(&mut self, x: f64, y: f64) -> Vec<Patch> {
        if self.tooltip.target.is_none() {
            return Vec::new();
        }
        self.tooltip.x = x;
        self.tooltip.y = y;
        self.redraw()
    }

    pub fn pointer_out(&mut self) -> Vec<Patch> {
        if self.tooltip.target.take().is_none() {
            return Vec::new();
        }
        self.redraw()
    }

    /// Enlarges the point and highlights the legend row of `name`.
    pub fn legend_over(&mut self, name: &str) -> Vec<Patch> {
        if !self.points().iter().any(|p| p.name == name) {
            return Vec::new();
        }
        self.highlighted = Some(name.to_owned());
        self.redraw()
    }

    pub fn legend_out(&mut self, name: &str) -> Vec<Patch> {
        if self.highlighted.as_deref() != Some(name) {
            return Vec::new();
        }
        self.highlighted = None;
        self.redraw()
    }

    /// SVG markup of the drawing surface.
    pub fn to_svg(&self) -> String {
        self.scene.markup(&self.id("surface"))
    }

    /// HTML markup of the legend list.
    pub fn legend_html(&self) -> String {
        self.scene.markup(&self.id("legend"))
    }

    /// HTML markup of the shared tooltip overlay.
    pub fn tooltip_html(&self) -> String {
        self.scene.markup(&self.id("tooltip"))
    }

    fn redraw(&mut self) -> Vec<Patch> {
        let next = self.build_scene();
        let patches = diff(&self.scene, &next);
        tracing::debug!(
            "chart `{}` redraw: {} patches over {} elements",
            self.config.container,
            patches.len(),
            next.len()
        );
        self.scene = next;
        patches
    }

    fn id(&self, key: &str) -> String {
        format!("{}:{key}", self.config.container)
    }

    fn build_scene(&self) -> Scene {
        let mut scene = Scene::new();
        let Some(plot) = &self.plot else {
            return scene;
        };

        let ChartConfig {
            container,
            width,
            height,
        } = &self.config;
        let (width, height) = (*width, *height);
        let left = MARGIN.left;
        let right = width - MARGIN.right;
        let top = MARGIN.top;
        let bottom = height - MARGIN.bottom;
        let x = LinearScale::new(plot.x_domain, (left, right));
        let y = LinearScale::new(plot.y_domain, (bottom, top));

        let surface = self.id("surface");
        let grid = self.id("grid");
        let points = self.id("points");
        let legend = self.id("legend");

        scene.push(
            Element::new(&surface, "svg", container)
                .attr("xmlns", "http://www.w3.org/2000/svg")
                .attr("class", "price-chart")
                .attr("width", trim_number(width, 2))
                .attr("height", trim_number(height, 2))
                .attr(
                    "viewBox",
                    format!("0 0 {} {}", trim_number(width, 2), trim_number(height, 2)),
                ),
        );
        scene.push(Element::new(&grid, "g", &surface).attr("class", "grid"));

        for (i, value) in x.ticks(X_TICKS).into_iter().enumerate() {
            let px = trim_number(x.map(value), 2);
            scene.push(
                Element::new(self.id(&format!("grid-x:{i}")), "line", &grid)
                    .attr("x1", &px)
                    .attr("x2", &px)
                    .attr("y1", trim_number(top, 2))
                    .attr("y2", trim_number(bottom, 2))
                    .attr("stroke", "#e5e7eb"),
            );
            scene.push(
                Element::new(self.id(&format!("tick-x:{i}")), "text", &grid)
                    .attr("x", &px)
                    .attr("y", trim_number(bottom + 18.0, 2))
                    .attr("text-anchor", "middle")
                    .attr("font-size", 11)
                    .text(trim_number(value, 1)),
            );
        }

        for (i, value) in y.ticks(Y_TICKS).into_iter().enumerate() {
            let py = trim_number(y.map(value), 2);
            scene.push(
                Element::new(self.id(&format!("grid-y:{i}")), "line", &grid)
                    .attr("x1", trim_number(left, 2))
                    .attr("x2", trim_number(right, 2))
                    .attr("y1", &py)
                    .attr("y2", &py)
                    .attr("stroke", "#e5e7eb"),
            );
            scene.push(
                Element::new(self.id(&format!("tick-y:{i}")), "text", &grid)
                    .attr("x", trim_number(left - 8.0, 2))
                    .attr("y", &py)
                    .attr("text-anchor", "end")
                    .attr("dominant-baseline", "middle")
                    .attr("font-size", 11)
                    .text(trim_number(value, 1)),
            );
        }

        scene.push(
            Element::new(self.id("axis-x"), "line", &surface)
                .attr("x1", trim_number(left, 2))
                .attr("x2", trim_number(right, 2))
                .attr("y1", trim_number(bottom, 2))
                .attr("y2", trim_number(bottom, 2))
                .attr("stroke", "#6b7280"),
        );
        scene.push(
            Element::new(self.id("axis-y"), "line", &surface)
                .attr("x1", trim_number(left, 2))
                .attr("x2", trim_number(left, 2))
                .attr("y1", trim_number(top, 2))
                .attr("y2", trim_number(bottom, 2))
                .attr("stroke", "#6b7280"),
        );
        scene.push(
            Element::new(self.id("label-x"), "text", &surface)
                .attr("x", trim_number((left + right) / 2.0, 2))
                .attr("y", trim_number(height - 8.0, 2))
                .attr("text-anchor", "middle")
                .attr("font-size", 12)
                .text(X_AXIS_LABEL),
        );
        scene.push(
            Element::new(self.id("label-y"), "text", &surface)
                .attr(
                    "transform",
                    format!("translate(16,{}) rotate(-90)", trim_number((top + bottom) / 2.0, 2)),
                )
                .attr("text-anchor", "middle")
                .attr("font-size", 12)
                .text(metric_label(&plot.metric)),
        );

        scene.push(Element::new(&points, "g", &surface).attr("class", "points"));
        for point in &plot.points {
            let active = self.highlighted.as_deref() == Some(point.name.as_str());
            scene.push(
                Element::new(self.id(&format!("point:{}", point.name)), "circle", &points)
                    .attr("class", "chart-point")
                    .attr("data-name", &point.name)
                    .attr("data-hover", "point")
                    .attr("cx", trim_number(x.map(point.price), 2))
                    .attr("cy", trim_number(y.map(point.score), 2))
                    .attr("r", if active { POINT_RADIUS_ACTIVE } else { POINT_RADIUS })
                    .attr("fill", point.color)
                    .attr("stroke", "#ffffff")
                    .attr(
                        "stroke-width",
                        if active { POINT_STROKE_ACTIVE } else { POINT_STROKE },
                    ),
            );
        }

        scene.push(Element::new(&legend, "ul", container).attr("class", "chart-legend"));
        let mut entries: Vec<&ChartPoint> = plot.points.iter().collect();
        entries.sort_by(|a, b| a.provider.cmp(&b.provider).then_with(|| a.name.cmp(&b.name)));
        for point in entries {
            let row = self.id(&format!("legend:{}", point.name));
            let active = self.highlighted.as_deref() == Some(point.name.as_str());
            scene.push(
                Element::new(&row, "li", &legend)
                    .attr("class", "legend-item")
                    .attr("data-name", &point.name)
                    .attr("data-hover", "legend")
                    .attr(
                        "style",
                        format!(
                            "background:{}",
                            if active { LEGEND_ACTIVE_BG } else { "transparent" }
                        ),
                    ),
            );
            scene.push(
                Element::new(self.id(&format!("legend-swatch:{}", point.name)), "span", &row)
                    .attr("class", "legend-swatch")
                    .attr("style", format!("background:{}", point.color)),
            );
            scene.push(
                Element::new(self.id(&format!("legend-label:{}", point.name)), "span", &row)
                    .attr("class", "legend-label")
                    .text(format!("{} · {}", point.name, point.provider)),
            );
        }

        let tooltip = self.tooltip_element(plot);
        scene.push(tooltip);

        scene
    }

    fn tooltip_element(&self, plot: &Plot) -> Element {
        let element = Element::new(self.id("tooltip"), "div", &self.config.container)
            .attr("class", "chart-tooltip");
        let target = self
            .tooltip
            .target
            .as_ref()
            .and_then(|name| plot.points.iter().find(|p| &p.name == name));

        match target {
            Some(point) => element
                .attr(
                    "style",
                    format!(
                        "display:block;left:{}px;top:{}px",
                        trim_number(self.tooltip.x + TOOLTIP_OFFSET_X, 1),
                        trim_number(self.tooltip.y + TOOLTIP_OFFSET_Y, 1)
                    ),
                )
                .text(tooltip_text(point)),
            None => element
                .attr("style", "display:none;left:0px;top:0px")
                .text(""),
        }
    }
}

/// Axis caption for a metric key.
pub fn metric_label(metric: &str) -> String {
    if metric == AGGREGATE_METRIC {
        "Agentic Index (%)".to_owned()
    } else {
        format!("{metric} (%)")
    }
}

fn tooltip_text(point: &ChartPoint) -> String {
    format!(
        "{}\nScore: {}\nPrice: ¥{:.2} / 1M tokens",
        point.name,
        format_percent(point.score),
        point.price
    )
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    const SCORES: &str = "name,cost_usd,cost_rmb,provider,MRCR,Tau2Bench_airline,Tau2Bench_retail\n\
        GPT-5.2,1.75,,OpenAI,99.74,58,81.14\n\
        GLM-4.7,,4,智谱,72.33,60,80\n\
        Kimi-k2,,4,Kimi,66.43,56,64\n";

    fn dataset() -> Dataset {
        Dataset::from_text(SCORES, "")
    }

    fn engine() -> ChartEngine {
        ChartEngine::new(ChartConfig::new("chart", 800.0, 500.0), ChartContext::new())
    }

    fn creates(patches: &[Patch]) -> Vec<&str> {
        patches
            .iter()
            .filter_map(|patch| match patch {
                Patch::Create { element, .. } => Some(element.id.as_str()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn first_render_initializes_surface() {
        let mut chart = engine();
        assert_eq!(chart.state, ChartState::Uninitialized);

        let patches = chart.render(&dataset(), AGGREGATE_METRIC);
        assert_eq!(chart.state, ChartState::Initialized);

        let created = creates(&patches);
        assert_eq!(created[0], "chart:surface");
        assert!(created.contains(&"chart:axis-x"));
        assert!(created.contains(&"chart:point:GPT-5.2"));
        assert!(created.contains(&"chart:tooltip"));
        assert_eq!(created.iter().filter(|id| id.starts_with("chart:grid-x:")).count(), 11);
        assert_eq!(created.iter().filter(|id| id.starts_with("chart:grid-y:")).count(), 6);
    }

    #[test]
    fn domains_follow_data() {
        let mut chart = engine();
        chart.render(&dataset(), "MRCR");
        let plot = chart.plot.as_ref().unwrap();
        let (x_domain, y_domain) = (plot.x_domain, plot.y_domain);
        // max price 12.2675 -> ceil(13.49425)
        assert_eq!(x_domain, (0.0, 14.0));
        // min score 66.43 -> floor(59.787)
        assert_eq!(y_domain, (59.0, 100.0));
    }

    #[test]
    fn switching_metric_updates_in_place() {
        let mut chart = engine();
        let data = dataset();
        chart.render(&data, "MRCR");
        let patches = chart.render(&data, "Tau2Bench");

        assert!(creates(&patches).is_empty());
        assert!(!patches.iter().any(|p| matches!(p, Patch::Remove { .. })));
        assert!(patches.iter().any(|p| matches!(
            p,
            Patch::Update { id, text: Some(text), .. } if id == "chart:label-y" && text == "Tau2Bench (%)"
        )));
    }

    #[test]
    fn reranked_points_are_moved_into_view_order() {
        let mut chart = engine();
        let data = dataset();
        chart.render(&data, "MRCR");
        let patches = chart.render(&data, "Tau2Bench");

        assert!(patches.iter().any(|p| matches!(
            p,
            Patch::Move { id, index: 0 } if id == "chart:point:GLM-4.7"
        )));
        let order: Vec<&str> = chart
            .scene
            .children("chart:points")
            .map(|e| e.attrs["data-name"].as_str())
            .collect();
        assert_eq!(order, vec!["GLM-4.7", "GPT-5.2", "Kimi-k2"]);
    }

    #[test]
    fn reconciles_added_and_removed_models() {
        let mut chart = engine();
        chart.render(&dataset(), "MRCR");

        let smaller = Dataset::from_text(
            "name,cost_usd,provider,MRCR\nGPT-5.2,1.75,OpenAI,99\nNew-1,1,Acme,70\n",
            "",
        );
        let patches = chart.render(&smaller, "MRCR");

        let removed: Vec<&str> = patches
            .iter()
            .filter_map(|p| match p {
                Patch::Remove { id } => Some(id.as_str()),
                _ => None,
            })
            .collect();
        assert!(removed.contains(&"chart:point:GLM-4.7"));
        assert!(removed.contains(&"chart:point:Kimi-k2"));
        assert!(creates(&patches).contains(&"chart:point:New-1"));
        assert!(patches.iter().any(|p| matches!(
            p,
            Patch::Update { id, .. } if id == "chart:point:GPT-5.2"
        )));
    }

    #[test]
    fn colors_are_stable_across_charts() {
        let context = ChartContext::new();
        let data = dataset();
        let mut first = ChartEngine::new(ChartConfig::new("a", 800.0, 500.0), context.clone());
        let mut second = ChartEngine::new(ChartConfig::new("b", 400.0, 300.0), context);

        first.render(&data, "MRCR");
        second.render(&data, "Tau2Bench");

        for point in first.points() {
            let other = second.points().iter().find(|p| p.name == point.name).unwrap();
            assert_eq!(point.color, other.color);
        }
    }

    #[test]
    fn tooltip_tracks_pointer() {
        let mut chart = engine();
        chart.render(&dataset(), "MRCR");

        let shown = chart.pointer_over("GPT-5.2", 100.0, 200.0);
        assert_matches!(&shown[..], [Patch::Update { id, attrs, text: Some(text) }] => {
            assert_eq!(id, "chart:tooltip");
            assert_eq!(attrs["style"], "display:block;left:112px;top:172px");
            assert!(text.starts_with("GPT-5.2\nScore: 99.74%\nPrice: ¥12.27"));
        });

        let moved = chart.pointer_move(150.0, 210.0);
        assert_matches!(&moved[..], [Patch::Update { attrs, text: None, .. }] => {
            assert_eq!(attrs["style"], "display:block;left:162px;top:182px");
        });

        let hidden = chart.pointer_out();
        assert_matches!(&hidden[..], [Patch::Update { attrs, .. }] => {
            assert_eq!(attrs["style"], "display:none;left:0px;top:0px");
        });
        assert!(chart.pointer_move(1.0, 1.0).is_empty());
        assert!(chart.pointer_over("Unknown", 1.0, 1.0).is_empty());
    }

    #[test]
    fn legend_hover_enlarges_point() {
        let mut chart = engine();
        chart.render(&dataset(), "MRCR");

        let patches = chart.legend_over("Kimi-k2");
        assert_eq!(patches.len(), 2);
        let point = chart.scene.get("chart:point:Kimi-k2").unwrap();
        assert_eq!(point.attrs["r"], "9");
        assert_eq!(point.attrs["stroke-width"], "3");
        let row = chart.scene.get("chart:legend:Kimi-k2").unwrap();
        assert_eq!(row.attrs["style"], "background:#eef2ff");

        chart.legend_out("Kimi-k2");
        let point = chart.scene.get("chart:point:Kimi-k2").unwrap();
        assert_eq!(point.attrs["r"], "6");
        assert_eq!(point.attrs["stroke-width"], "1.5");
    }

    #[test]
    fn legend_sorted_by_provider_then_name() {
        let mut chart = engine();
        chart.render(&dataset(), "MRCR");
        let order: Vec<&str> = chart
            .scene
            .children("chart:legend")
            .map(|e| e.attrs["data-name"].as_str())
            .collect();
        assert_eq!(order, vec!["Kimi-k2", "GPT-5.2", "GLM-4.7"]);
    }

    #[test]
    fn resize_before_render_is_ignored() {
        let mut chart = engine();
        assert!(chart.resize(&dataset(), 600.0, 400.0).is_empty());
        assert_eq!(chart.state, ChartState::Uninitialized);
    }

    #[test]
    fn resize_redraws_current_metric() {
        let mut chart = engine();
        let data = dataset();
        chart.render(&data, "Tau2Bench");
        let patches = chart.resize(&data, 600.0, 400.0);

        assert_eq!(chart.metric(), Some("Tau2Bench"));
        assert!(creates(&patches).is_empty());
        assert!(patches.iter().any(|p| matches!(
            p,
            Patch::Update { id, attrs, .. } if id == "chart:surface" && attrs["width"] == "600"
        )));
    }

    #[test]
    fn svg_markup_contains_points() {
        let mut chart = engine();
        chart.render(&dataset(), AGGREGATE_METRIC);
        let svg = chart.to_svg();
        assert!(svg.starts_with("<svg id=\"chart:surface\""));
        assert!(svg.contains("data-name=\"GLM-4.7\""));
        assert!(svg.contains("Agentic Index (%)"));
        assert!(chart.legend_html().contains("智谱"));
    }
}
