use dioxus::prelude::*;

use crate::t;

use super::ViewerState;

#[component]
pub fn UploadPanel(state: Signal<ViewerState>) -> Element {
    let on_change = move |evt: FormEvent| {
        let mut state = state;
        async move {
            if let Some(file_engine) = evt.files() {
                for file_name in file_engine.files() {
                    if let Some(bytes) = file_engine.read_file(&file_name).await {
                        let generation = state.peek().generation + 1;
                        state.set(ViewerState::from_upload(&bytes, generation));
                    }
                }
            }
        }
    };

    let snapshot = state();

    rsx! {
        section { class: "viz-card viz-upload",
            label { class: "viz-upload__label", r#for: "upload-json", {t!("upload-label")} }
            input {
                id: "upload-json",
                r#type: "file",
                accept: ".json",
                onchange: on_change,
            }

            if let Some(err) = snapshot.error {
                p { class: "viz-status viz-status--error", {t!("upload-error", error = err)} }
            } else if snapshot.dataset.is_some() {
                p { class: "viz-status viz-status--success", {t!("upload-success")} }
            } else {
                p { class: "viz-status", {t!("upload-hint")} }
            }
        }
    }
}
