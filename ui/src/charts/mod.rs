//! Chart construction over a pluggable rendering backend.
//!
//! [`ChartSpec`] captures *what* to draw (kind, metric, points); a
//! [`RenderBackend`] turns a spec into a [`ChartSurface`] and encodes a
//! surface to PNG. The production backend renders SVG markup that both the
//! web and desktop shells display inline, so there is a single codepath per
//! chart kind instead of parallel per-platform renderers.

mod svg;
pub use svg::SvgBackend;

pub mod export;

use futures_util::future::LocalBoxFuture;
use time::OffsetDateTime;

/// Filtered row count at or above which the time axis carries a
/// range-slider overview strip. Usability heuristic, preserved exactly.
pub const RANGE_SLIDER_THRESHOLD: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    Bar,
    Scatter,
    Line,
}

impl ChartKind {
    pub fn slug(&self) -> &'static str {
        match self {
            ChartKind::Bar => "bar",
            ChartKind::Scatter => "scatter",
            ChartKind::Line => "line",
        }
    }
}

/// What to draw: one metric's filtered points plus the chart kind.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSpec {
    pub kind: ChartKind,
    pub metric: String,
    pub title: String,
    pub x_label: String,
    pub points: Vec<(OffsetDateTime, f64)>,
    /// True when the incoming points were not already in timestamp order.
    /// Line charts sort before drawing; the viewer surfaces this flag so a
    /// reordering is visible to the user rather than silent.
    pub reordered: bool,
}

impl ChartSpec {
    /// Build a spec. Line charts are sorted by timestamp here; bar and
    /// scatter keep upload order (per-mark placement is order-independent).
    pub fn new(
        kind: ChartKind,
        metric: impl Into<String>,
        mut points: Vec<(OffsetDateTime, f64)>,
    ) -> Self {
        let mut reordered = false;
        if kind == ChartKind::Line {
            let sorted = points.windows(2).all(|pair| pair[0].0 <= pair[1].0);
            if !sorted {
                points.sort_by_key(|point| point.0);
                reordered = true;
            }
        }
        let metric = metric.into();
        Self {
            kind,
            title: metric.clone(),
            x_label: "Time".to_string(),
            metric,
            points,
            reordered,
        }
    }

    /// Localized chart title supplied by the caller.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Localized time-axis label supplied by the caller.
    pub fn with_x_label(mut self, label: impl Into<String>) -> Self {
        self.x_label = label.into();
        self
    }

    pub fn wants_range_slider(&self) -> bool {
        self.points.len() >= RANGE_SLIDER_THRESHOLD
    }

    pub fn png_file_name(&self) -> String {
        format!("{}_plot.png", self.metric)
    }
}

/// A rendered chart: markup plus the pixel size it rasterizes to.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSurface {
    pub svg: String,
    pub width: u32,
    pub height: u32,
    pub has_range_slider: bool,
}

/// Rendering seam: three chart kinds plus PNG encoding.
///
/// `export_png` is async because the web pipeline goes through an
/// `HtmlCanvasElement` decode; the desktop pipeline resolves immediately.
pub trait RenderBackend {
    fn render_bar(&self, spec: &ChartSpec) -> ChartSurface;
    fn render_scatter(&self, spec: &ChartSpec) -> ChartSurface;
    fn render_line(&self, spec: &ChartSpec) -> ChartSurface;
    fn export_png<'a>(
        &'a self,
        surface: &'a ChartSurface,
    ) -> LocalBoxFuture<'a, Result<Vec<u8>, String>>;
}

/// Dispatch on the spec's kind.
pub fn render(backend: &dyn RenderBackend, spec: &ChartSpec) -> ChartSurface {
    match spec.kind {
        ChartKind::Bar => backend.render_bar(spec),
        ChartKind::Scatter => backend.render_scatter(spec),
        ChartKind::Line => backend.render_line(spec),
    }
}

/// Backend used by both shells; the seam stays so tests (or a future native
/// canvas backend) can substitute their own.
pub fn default_backend() -> SvgBackend {
    SvgBackend::default()
}

/// A spec rendered by a backend, kept together for display and export.
#[derive(Debug, Clone, PartialEq)]
pub struct Chart {
    pub spec: ChartSpec,
    pub surface: ChartSurface,
}

impl Chart {
    pub fn build(backend: &dyn RenderBackend, spec: ChartSpec) -> Self {
        let surface = render(backend, &spec);
        Self { spec, surface }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn day(day: u8) -> OffsetDateTime {
        datetime!(2024-01-01 00:00 UTC).replace_day(day).unwrap()
    }

    #[test]
    fn line_specs_sort_and_flag_unordered_points() {
        let points = vec![(day(3), 3.0), (day(1), 1.0), (day(2), 2.0)];
        let spec = ChartSpec::new(ChartKind::Line, "t1", points);
        assert!(spec.reordered);
        let times: Vec<_> = spec.points.iter().map(|p| p.0).collect();
        assert_eq!(times, vec![day(1), day(2), day(3)]);
    }

    #[test]
    fn ordered_line_specs_are_not_flagged() {
        let points = vec![(day(1), 1.0), (day(2), 2.0)];
        let spec = ChartSpec::new(ChartKind::Line, "t1", points);
        assert!(!spec.reordered);
    }

    #[test]
    fn bar_specs_keep_upload_order() {
        let points = vec![(day(3), 3.0), (day(1), 1.0)];
        let spec = ChartSpec::new(ChartKind::Bar, "t1", points);
        assert!(!spec.reordered);
        assert_eq!(spec.points[0].0, day(3));
    }

    #[test]
    fn range_slider_threshold_is_exact() {
        let just_below: Vec<_> = (0..99).map(|i| (day(1), i as f64)).collect();
        let at_threshold: Vec<_> = (0..100).map(|i| (day(1), i as f64)).collect();
        assert!(!ChartSpec::new(ChartKind::Bar, "t1", just_below).wants_range_slider());
        assert!(ChartSpec::new(ChartKind::Bar, "t1", at_threshold).wants_range_slider());
    }

    #[test]
    fn png_file_name_derives_from_metric() {
        let spec = ChartSpec::new(ChartKind::Scatter, "t2", Vec::new());
        assert_eq!(spec.png_file_name(), "t2_plot.png");
    }
}
