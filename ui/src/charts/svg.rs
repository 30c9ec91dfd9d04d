//! SVG rendering backend shared by the web and desktop shells.
//!
//! The markup is self-contained (inline styles, no external CSS) so the
//! same string can be injected into the DOM and rasterized to PNG.

use std::fmt::Write as _;

use futures_util::future::LocalBoxFuture;
use futures_util::FutureExt;
use time::OffsetDateTime;

use crate::core::format;

use super::{export, ChartSpec, ChartSurface, RenderBackend};

const WIDTH: u32 = 960;
const HEIGHT: u32 = 480;
const SLIDER_HEIGHT: u32 = 64;

const MARGIN_LEFT: f64 = 64.0;
const MARGIN_RIGHT: f64 = 24.0;
const MARGIN_TOP: f64 = 48.0;
const MARGIN_BOTTOM: f64 = 56.0;

// Mark colors follow the classic matplotlib palette the original tool used:
// default blue bars, red scatter markers, green line.
const BAR_FILL: &str = "#1f77b4";
const SCATTER_FILL: &str = "#d62728";
const LINE_STROKE: &str = "#2ca02c";

const AXIS_STROKE: &str = "#444444";
const GRID_STROKE: &str = "#dddddd";
const TEXT_FILL: &str = "#222222";

#[derive(Debug, Clone, Default)]
pub struct SvgBackend;

impl RenderBackend for SvgBackend {
    fn render_bar(&self, spec: &ChartSpec) -> ChartSurface {
        render_surface(spec, Marks::Bars)
    }

    fn render_scatter(&self, spec: &ChartSpec) -> ChartSurface {
        render_surface(spec, Marks::Dots)
    }

    fn render_line(&self, spec: &ChartSpec) -> ChartSurface {
        render_surface(spec, Marks::Line)
    }

    fn export_png<'a>(
        &'a self,
        surface: &'a ChartSurface,
    ) -> LocalBoxFuture<'a, Result<Vec<u8>, String>> {
        export::surface_to_png(surface).boxed_local()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Marks {
    Bars,
    Dots,
    Line,
}

/// Maps a data domain onto a pixel range; a degenerate domain is widened so
/// single-point datasets still land inside the plot area.
struct LinearScale {
    d0: f64,
    d1: f64,
    r0: f64,
    r1: f64,
}

impl LinearScale {
    fn new(mut d0: f64, mut d1: f64, r0: f64, r1: f64) -> Self {
        if !(d1 > d0) {
            d0 -= 0.5;
            d1 = d0 + 1.0;
        }
        Self { d0, d1, r0, r1 }
    }

    fn map(&self, value: f64) -> f64 {
        let unit = (value - self.d0) / (self.d1 - self.d0);
        self.r0 + unit * (self.r1 - self.r0)
    }
}

fn render_surface(spec: &ChartSpec, marks: Marks) -> ChartSurface {
    let has_range_slider = spec.wants_range_slider();
    let height = if has_range_slider {
        HEIGHT + SLIDER_HEIGHT
    } else {
        HEIGHT
    };

    let x0 = MARGIN_LEFT;
    let x1 = WIDTH as f64 - MARGIN_RIGHT;
    let y_top = MARGIN_TOP;
    let y_bottom = HEIGHT as f64 - MARGIN_BOTTOM;

    let stamps: Vec<f64> = spec
        .points
        .iter()
        .map(|(ts, _)| ts.unix_timestamp() as f64)
        .collect();
    let values: Vec<f64> = spec.points.iter().map(|(_, value)| *value).collect();

    let (t_min, t_max) = min_max(&stamps).unwrap_or((0.0, 1.0));
    // One day of padding keeps a single reading off the plot border.
    let (t_min, t_max) = if t_min == t_max {
        (t_min - 43_200.0, t_max + 43_200.0)
    } else {
        (t_min, t_max)
    };
    let (v_min, v_max) = min_max(&values).unwrap_or((0.0, 1.0));
    // Bars grow from a zero baseline, so the value domain always includes 0.
    let v_lo = v_min.min(0.0);
    let v_hi = v_max.max(0.0);

    let xs = LinearScale::new(t_min, t_max, x0, x1);
    let ys = LinearScale::new(v_lo, v_hi, y_bottom, y_top);

    let mut svg = String::with_capacity(4096 + spec.points.len() * 64);
    let _ = write!(
        svg,
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{WIDTH}\" height=\"{height}\" \
         viewBox=\"0 0 {WIDTH} {height}\" font-family=\"sans-serif\">\n"
    );
    let _ = write!(
        svg,
        "  <rect width=\"{WIDTH}\" height=\"{height}\" fill=\"#ffffff\"/>\n"
    );

    draw_title_and_labels(&mut svg, spec, x0, x1, y_bottom);
    draw_y_axis(&mut svg, &ys, v_lo, v_hi, x0, x1);
    draw_x_axis(&mut svg, spec, &xs, y_bottom);

    let _ = write!(
        svg,
        "  <line x1=\"{x0:.2}\" y1=\"{y_bottom:.2}\" x2=\"{x1:.2}\" y2=\"{y_bottom:.2}\" \
         stroke=\"{AXIS_STROKE}\"/>\n  <line x1=\"{x0:.2}\" y1=\"{y_top:.2}\" x2=\"{x0:.2}\" \
         y2=\"{y_bottom:.2}\" stroke=\"{AXIS_STROKE}\"/>\n"
    );

    match marks {
        Marks::Bars => draw_bars(&mut svg, spec, &xs, &ys, x1 - x0),
        Marks::Dots => draw_dots(&mut svg, spec, &xs, &ys),
        Marks::Line => draw_line(&mut svg, spec, &xs, &ys),
    }

    if has_range_slider {
        draw_range_slider(&mut svg, spec, x0, x1, HEIGHT as f64, SLIDER_HEIGHT as f64);
    }

    svg.push_str("</svg>\n");

    ChartSurface {
        svg,
        width: WIDTH,
        height,
        has_range_slider,
    }
}

fn draw_title_and_labels(svg: &mut String, spec: &ChartSpec, x0: f64, x1: f64, y_bottom: f64) {
    let title = xml_escape(&spec.title);
    let metric = xml_escape(&spec.metric);
    let x_label = xml_escape(&spec.x_label);
    let mid_x = (x0 + x1) / 2.0;
    let _ = write!(
        svg,
        "  <text x=\"{mid_x:.2}\" y=\"26\" text-anchor=\"middle\" font-size=\"18\" \
         font-weight=\"600\" fill=\"{TEXT_FILL}\">{title}</text>\n"
    );
    let label_y = y_bottom + 40.0;
    let _ = write!(
        svg,
        "  <text x=\"{mid_x:.2}\" y=\"{label_y:.2}\" text-anchor=\"middle\" font-size=\"13\" \
         fill=\"{TEXT_FILL}\">{x_label}</text>\n"
    );
    let mid_y = (MARGIN_TOP + y_bottom) / 2.0;
    let _ = write!(
        svg,
        "  <text x=\"18\" y=\"{mid_y:.2}\" text-anchor=\"middle\" font-size=\"13\" \
         fill=\"{TEXT_FILL}\" transform=\"rotate(-90 18 {mid_y:.2})\">{metric}</text>\n"
    );
}

fn draw_y_axis(svg: &mut String, ys: &LinearScale, v_lo: f64, v_hi: f64, x0: f64, x1: f64) {
    const TICKS: usize = 5;
    let (lo, hi) = if v_hi > v_lo {
        (v_lo, v_hi)
    } else {
        (v_lo, v_lo + 1.0)
    };
    for step in 0..TICKS {
        let value = lo + (hi - lo) * step as f64 / (TICKS - 1) as f64;
        let y = ys.map(value);
        let label = format::format_number(value, 1);
        let _ = write!(
            svg,
            "  <line x1=\"{x0:.2}\" y1=\"{y:.2}\" x2=\"{x1:.2}\" y2=\"{y:.2}\" \
             stroke=\"{GRID_STROKE}\"/>\n"
        );
        let label_x = x0 - 8.0;
        let label_y = y + 4.0;
        let _ = write!(
            svg,
            "  <text x=\"{label_x:.2}\" y=\"{label_y:.2}\" text-anchor=\"end\" font-size=\"12\" \
             fill=\"{TEXT_FILL}\">{label}</text>\n"
        );
    }
}

fn draw_x_axis(svg: &mut String, spec: &ChartSpec, xs: &LinearScale, y_bottom: f64) {
    if spec.points.is_empty() {
        return;
    }
    let tick_count = spec.points.len().min(6);
    for step in 0..tick_count {
        let unit = if tick_count == 1 {
            0.5
        } else {
            step as f64 / (tick_count - 1) as f64
        };
        let stamp = xs.d0 + (xs.d1 - xs.d0) * unit;
        let x = xs.map(stamp);
        let label = OffsetDateTime::from_unix_timestamp(stamp as i64)
            .map(format::axis_date_label)
            .unwrap_or_else(|_| "—".to_string());
        let tick_y = y_bottom + 5.0;
        let label_y = y_bottom + 20.0;
        let _ = write!(
            svg,
            "  <line x1=\"{x:.2}\" y1=\"{y_bottom:.2}\" x2=\"{x:.2}\" y2=\"{tick_y:.2}\" \
             stroke=\"{AXIS_STROKE}\"/>\n  <text x=\"{x:.2}\" y=\"{label_y:.2}\" \
             text-anchor=\"middle\" font-size=\"12\" fill=\"{TEXT_FILL}\">{label}</text>\n"
        );
    }
}

fn draw_bars(svg: &mut String, spec: &ChartSpec, xs: &LinearScale, ys: &LinearScale, plot_w: f64) {
    if spec.points.is_empty() {
        return;
    }
    let n = spec.points.len() as f64;
    let bar_w = (plot_w / n * 0.6).clamp(1.0, 40.0);
    let baseline = ys.map(0.0);
    for (ts, value) in &spec.points {
        let cx = xs.map(ts.unix_timestamp() as f64);
        let vy = ys.map(*value);
        let top = vy.min(baseline);
        let bar_h = (vy - baseline).abs().max(0.5);
        let x = cx - bar_w / 2.0;
        let _ = write!(
            svg,
            "  <rect class=\"mark mark--bar\" x=\"{x:.2}\" y=\"{top:.2}\" width=\"{bar_w:.2}\" \
             height=\"{bar_h:.2}\" fill=\"{BAR_FILL}\"/>\n"
        );
    }
}

fn draw_dots(svg: &mut String, spec: &ChartSpec, xs: &LinearScale, ys: &LinearScale) {
    for (ts, value) in &spec.points {
        let cx = xs.map(ts.unix_timestamp() as f64);
        let cy = ys.map(*value);
        let _ = write!(
            svg,
            "  <circle class=\"mark mark--scatter\" cx=\"{cx:.2}\" cy=\"{cy:.2}\" r=\"4.5\" \
             fill=\"{SCATTER_FILL}\" fill-opacity=\"0.75\"/>\n"
        );
    }
}

fn draw_line(svg: &mut String, spec: &ChartSpec, xs: &LinearScale, ys: &LinearScale) {
    if spec.points.is_empty() {
        return;
    }
    let mut path = String::new();
    for (ts, value) in &spec.points {
        let cx = xs.map(ts.unix_timestamp() as f64);
        let cy = ys.map(*value);
        let _ = write!(path, "{cx:.2},{cy:.2} ");
    }
    let _ = write!(
        svg,
        "  <polyline class=\"mark mark--line\" points=\"{}\" fill=\"none\" \
         stroke=\"{LINE_STROKE}\" stroke-width=\"2\"/>\n",
        path.trim_end()
    );
    for (ts, value) in &spec.points {
        let cx = xs.map(ts.unix_timestamp() as f64);
        let cy = ys.map(*value);
        let _ = write!(
            svg,
            "  <circle class=\"mark mark--dot\" cx=\"{cx:.2}\" cy=\"{cy:.2}\" r=\"3.5\" \
             fill=\"{LINE_STROKE}\"/>\n"
        );
    }
}

/// Overview strip under the time axis: a miniature of the whole series plus
/// end handles, shown only at or above [`super::RANGE_SLIDER_THRESHOLD`].
fn draw_range_slider(
    svg: &mut String,
    spec: &ChartSpec,
    x0: f64,
    x1: f64,
    strip_top: f64,
    strip_h: f64,
) {
    let inner_top = strip_top + 8.0;
    let inner_h = strip_h - 16.0;
    let inner_bottom = inner_top + inner_h;

    let mut points: Vec<(i64, f64)> = spec
        .points
        .iter()
        .map(|(ts, value)| (ts.unix_timestamp(), *value))
        .collect();
    points.sort_by_key(|(stamp, _)| *stamp);

    let stamps: Vec<f64> = points.iter().map(|(stamp, _)| *stamp as f64).collect();
    let values: Vec<f64> = points.iter().map(|(_, value)| *value).collect();
    let (t_min, t_max) = min_max(&stamps).unwrap_or((0.0, 1.0));
    let (v_min, v_max) = min_max(&values).unwrap_or((0.0, 1.0));

    let xs = LinearScale::new(t_min, t_max, x0, x1);
    let ys = LinearScale::new(v_min.min(0.0), v_max.max(0.0), inner_bottom, inner_top);

    let _ = write!(svg, "  <g class=\"range-slider\">\n");
    let frame_w = x1 - x0;
    let _ = write!(
        svg,
        "    <rect x=\"{x0:.2}\" y=\"{inner_top:.2}\" width=\"{frame_w:.2}\" \
         height=\"{inner_h:.2}\" fill=\"#f4f6f8\" stroke=\"{GRID_STROKE}\"/>\n"
    );

    let mut path = String::new();
    for (stamp, value) in &points {
        let cx = xs.map(*stamp as f64);
        let cy = ys.map(*value);
        let _ = write!(path, "{cx:.2},{cy:.2} ");
    }
    let _ = write!(
        svg,
        "    <polyline points=\"{}\" fill=\"none\" stroke=\"{AXIS_STROKE}\" \
         stroke-width=\"1\"/>\n",
        path.trim_end()
    );

    for handle_x in [x0, x1 - 6.0] {
        let _ = write!(
            svg,
            "    <rect class=\"range-slider__handle\" x=\"{handle_x:.2}\" y=\"{inner_top:.2}\" \
             width=\"6\" height=\"{inner_h:.2}\" fill=\"{AXIS_STROKE}\" fill-opacity=\"0.4\"/>\n"
        );
    }
    svg.push_str("  </g>\n");
}

fn min_max(values: &[f64]) -> Option<(f64, f64)> {
    let first = *values.first()?;
    let mut lo = first;
    let mut hi = first;
    for &value in values {
        if value < lo {
            lo = value;
        }
        if value > hi {
            hi = value;
        }
    }
    Some((lo, hi))
}

fn xml_escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charts::{ChartKind, ChartSpec};
    use time::macros::datetime;
    use time::Duration;

    fn spec_with(kind: ChartKind, count: usize) -> ChartSpec {
        let base = datetime!(2024-01-01 00:00 UTC);
        let points = (0..count)
            .map(|i| (base + Duration::days(i as i64), 10.0 + i as f64))
            .collect();
        ChartSpec::new(kind, "t1", points)
    }

    fn count_occurrences(haystack: &str, needle: &str) -> usize {
        haystack.matches(needle).count()
    }

    #[test]
    fn bar_chart_draws_one_bar_per_row_with_proportional_heights() {
        let spec = ChartSpec::new(
            ChartKind::Bar,
            "t1",
            vec![
                (datetime!(2024-01-01 00:00 UTC), 10.0),
                (datetime!(2024-01-02 00:00 UTC), 12.0),
            ],
        );
        let surface = SvgBackend.render_bar(&spec);
        assert_eq!(count_occurrences(&surface.svg, "mark--bar"), 2);

        let heights: Vec<f64> = surface
            .svg
            .split("mark--bar")
            .skip(1)
            .map(|chunk| {
                let rest = chunk.split("height=\"").nth(1).unwrap();
                rest.split('"').next().unwrap().parse().unwrap()
            })
            .collect();
        assert_eq!(heights.len(), 2);
        let ratio = heights[0] / heights[1];
        assert!((ratio - 10.0 / 12.0).abs() < 1e-3, "ratio was {ratio}");
    }

    #[test]
    fn scatter_chart_draws_one_marker_per_row() {
        let surface = SvgBackend.render_scatter(&spec_with(ChartKind::Scatter, 5));
        assert_eq!(count_occurrences(&surface.svg, "mark--scatter"), 5);
    }

    #[test]
    fn line_chart_connects_markers_in_order() {
        let surface = SvgBackend.render_line(&spec_with(ChartKind::Line, 4));
        assert_eq!(count_occurrences(&surface.svg, "<polyline class=\"mark mark--line\""), 1);
        assert_eq!(count_occurrences(&surface.svg, "mark--dot"), 4);
    }

    #[test]
    fn single_row_renders_for_every_kind() {
        assert_eq!(
            count_occurrences(&SvgBackend.render_bar(&spec_with(ChartKind::Bar, 1)).svg, "mark--bar"),
            1
        );
        assert_eq!(
            count_occurrences(
                &SvgBackend.render_scatter(&spec_with(ChartKind::Scatter, 1)).svg,
                "mark--scatter"
            ),
            1
        );
        let line = SvgBackend.render_line(&spec_with(ChartKind::Line, 1));
        assert_eq!(count_occurrences(&line.svg, "mark--dot"), 1);
    }

    #[test]
    fn empty_series_renders_an_empty_frame() {
        let surface = SvgBackend.render_bar(&ChartSpec::new(ChartKind::Bar, "t1", Vec::new()));
        assert!(surface.svg.starts_with("<svg"));
        assert_eq!(count_occurrences(&surface.svg, "mark--bar"), 0);
        assert!(!surface.has_range_slider);
    }

    #[test]
    fn range_slider_appears_at_exactly_one_hundred_rows() {
        let below = SvgBackend.render_line(&spec_with(ChartKind::Line, 99));
        assert!(!below.has_range_slider);
        assert_eq!(count_occurrences(&below.svg, "range-slider"), 0);
        assert_eq!(below.height, HEIGHT);

        let at = SvgBackend.render_line(&spec_with(ChartKind::Line, 100));
        assert!(at.has_range_slider);
        assert!(count_occurrences(&at.svg, "class=\"range-slider\"") == 1);
        assert_eq!(at.height, HEIGHT + SLIDER_HEIGHT);
    }

    #[test]
    fn metric_names_are_escaped_in_markup() {
        let spec = ChartSpec::new(ChartKind::Bar, "t<1>&\"x\"", Vec::new());
        let surface = SvgBackend.render_bar(&spec);
        assert!(surface.svg.contains("t&lt;1&gt;&amp;&quot;x&quot;"));
        assert!(!surface.svg.contains("t<1>"));
    }
}
