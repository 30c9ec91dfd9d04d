use dioxus::prelude::*;

use crate::viewer::{ChartPanel, PreviewTable, UploadPanel, ViewerState};

#[component]
pub fn Visualizer() -> Element {
    // Subscribe to global language code (if provided) so we re-render on change.
    let _lang_code: Option<Signal<String>> = try_use_context::<Signal<String>>();
    let _lang_current = _lang_code
        .as_ref()
        .map(|s| s())
        .unwrap_or_else(|| "en-US".to_string());

    let state = use_signal(ViewerState::default);
    let snapshot = state();

    rsx! {
        section { class: "page page-visualizer",
            h1 { {crate::t!("viz-title")} }

            UploadPanel { state }

            if let Some(dataset) = snapshot.dataset {
                PreviewTable { dataset: dataset.clone() }
                // Keyed by upload generation: new file, fresh widget state.
                ChartPanel { key: "{snapshot.generation}", dataset }
            }
        }
    }
}
