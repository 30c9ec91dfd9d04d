use dioxus::prelude::*;

use crate::charts::{self, export, Chart, ChartKind, ChartSpec, RenderBackend};
use crate::core::dataset::Dataset;
use crate::core::daterange::{self, DateRange};
use crate::core::format;
use crate::t;

#[derive(Clone, Debug, PartialEq)]
enum ExportStatus {
    Idle,
    Working(String),
    Done(String),
    Error(String),
}

/// Metric selector, date-range pickers, the three chart triggers, the
/// rendered chart, and the conditional PNG download.
///
/// The parent keys this component by upload generation so every new file
/// starts from freshly seeded widget state.
#[component]
pub fn ChartPanel(dataset: Dataset) -> Element {
    let columns = dataset.columns.clone();
    let (min_date, max_date) = dataset
        .time_bounds()
        .map(|(min, max)| (min.date(), max.date()))
        .unwrap_or_else(|| {
            let epoch = time::OffsetDateTime::UNIX_EPOCH.date();
            (epoch, epoch)
        });

    let mut metric = use_signal(|| columns.first().cloned().unwrap_or_default());
    let mut start_raw = use_signal(|| format::picker_value(min_date));
    let mut end_raw = use_signal(|| format::picker_value(max_date));
    let chart = use_signal(|| Option::<Chart>::None);
    let status = use_signal(|| ExportStatus::Idle);
    let busy = use_signal(|| false);

    // Widget state re-derived every render; unparseable picker values fall
    // back to the dataset's own bounds.
    let start = daterange::parse_picker_date(&start_raw()).unwrap_or(min_date);
    let end = daterange::parse_picker_date(&end_raw()).unwrap_or(max_date);
    let range = DateRange::new(start, end);
    let (filtered, range_inverted) = match &range {
        Ok(range) => (dataset.filter(range), false),
        Err(_) => (
            Dataset {
                columns: columns.clone(),
                rows: Vec::new(),
            },
            true,
        ),
    };
    let filtered_empty = !range_inverted && filtered.rows.is_empty();

    let build_chart = {
        let filtered = filtered.clone();
        let metric_now = metric();
        let mut chart_signal = chart;
        let mut status_signal = status;
        move |kind: ChartKind| {
            let points = filtered.series(&metric_now).unwrap_or_default();
            let spec = ChartSpec::new(kind, metric_now.clone(), points)
                .with_title(chart_title(kind, &metric_now))
                .with_x_label(t!("axis-time"));
            let backend = charts::default_backend();
            chart_signal.set(Some(Chart::build(&backend, spec)));
            status_signal.set(ExportStatus::Idle);
        }
    };
    let mut build_bar = build_chart.clone();
    let mut build_scatter = build_chart.clone();
    let mut build_line = build_chart;

    let png_handler = {
        let chart_signal = chart;
        let mut status_signal = status;
        let mut busy_signal = busy;
        move |_| {
            if busy_signal() {
                return;
            }
            let Some(built) = chart_signal() else {
                return;
            };
            busy_signal.set(true);
            status_signal.set(ExportStatus::Working(t!("export-working")));

            #[cfg(target_arch = "wasm32")]
            {
                let mut status_signal = status_signal;
                let mut busy_signal = busy_signal;
                crate::core::platform::spawn_future(async move {
                    let outcome = perform_png_export(built).await;
                    match outcome {
                        Ok(message) => status_signal.set(ExportStatus::Done(message)),
                        Err(err) => status_signal.set(ExportStatus::Error(err)),
                    }
                    busy_signal.set(false);
                });
            }

            #[cfg(not(target_arch = "wasm32"))]
            {
                let outcome = futures::executor::block_on(perform_png_export(built));
                match outcome {
                    Ok(message) => status_signal.set(ExportStatus::Done(message)),
                    Err(err) => status_signal.set(ExportStatus::Error(err)),
                }
                busy_signal.set(false);
            }
        }
    };

    let feedback = match &status() {
        ExportStatus::Idle => None,
        ExportStatus::Working(label) => Some(("viz-status".to_string(), format!("{label}…"))),
        ExportStatus::Done(message) => Some((
            "viz-status viz-status--success".to_string(),
            format!("✅ {message}"),
        )),
        ExportStatus::Error(err) => Some((
            "viz-status viz-status--error".to_string(),
            format!("⚠️ {}", t!("export-error", error = err.clone())),
        )),
    };

    let built_chart = chart();

    rsx! {
        section { class: "viz-card viz-controls",
            div { class: "viz-field",
                label { r#for: "metric-select", {t!("metric-label")} }
                select {
                    id: "metric-select",
                    value: "{metric()}",
                    oninput: move |evt| metric.set(evt.value()),
                    { columns.iter().map(|column| {
                        let c = column.clone();
                        rsx! {
                            option { key: "{c}", value: "{c}", "{c}" }
                        }
                    })}
                }
            }

            div { class: "viz-field",
                label { r#for: "start-date", {t!("start-date-label")} }
                input {
                    id: "start-date",
                    r#type: "date",
                    value: "{start_raw()}",
                    oninput: move |evt| start_raw.set(evt.value()),
                }
            }
            div { class: "viz-field",
                label { r#for: "end-date", {t!("end-date-label")} }
                input {
                    id: "end-date",
                    r#type: "date",
                    value: "{end_raw()}",
                    oninput: move |evt| end_raw.set(evt.value()),
                }
            }

            if range_inverted {
                p { class: "viz-warning", {t!("range-inverted")} }
            } else if filtered_empty {
                p { class: "viz-meta", {t!("range-empty")} }
            }

            h3 { {t!("plot-select-title")} }
            div { class: "viz-actions",
                button {
                    r#type: "button",
                    class: "button button--primary",
                    disabled: range_inverted || busy(),
                    onclick: move |_| build_bar(ChartKind::Bar),
                    {t!("plot-bar")}
                }
                button {
                    r#type: "button",
                    class: "button",
                    disabled: range_inverted || busy(),
                    onclick: move |_| build_scatter(ChartKind::Scatter),
                    {t!("plot-scatter")}
                }
                button {
                    r#type: "button",
                    class: "button",
                    disabled: range_inverted || busy(),
                    onclick: move |_| build_line(ChartKind::Line),
                    {t!("plot-line")}
                }
            }
        }

        if let Some(built) = built_chart {
            section { class: "viz-card viz-chart",
                if built.spec.reordered {
                    p { class: "viz-meta", {t!("chart-reordered-notice")} }
                }

                div { class: "chart-scroll", dangerous_inner_html: "{built.surface.svg}" }

                div { class: "viz-export",
                    button {
                        r#type: "button",
                        class: "button button--ghost",
                        disabled: busy(),
                        onclick: png_handler,
                        {t!("download-plot")}
                    }
                    if let Some((class_name, message)) = feedback {
                        p { class: "{class_name}", "{message}" }
                    }
                }
            }
        }
    }
}

fn chart_title(kind: ChartKind, metric: &str) -> String {
    match kind {
        ChartKind::Bar => t!("chart-title-bar", metric = metric),
        ChartKind::Scatter => t!("chart-title-scatter", metric = metric),
        ChartKind::Line => t!("chart-title-line", metric = metric),
    }
}

async fn perform_png_export(built: Chart) -> Result<String, String> {
    let backend = charts::default_backend();
    let bytes = backend.export_png(&built.surface).await?;
    let filename = built.spec.png_file_name();
    let delivery = export::download_bytes(&filename, "image/png", bytes).await?;
    Ok(match delivery {
        Some(path) => t!("export-saved", path = path),
        None => t!("export-started"),
    })
}
