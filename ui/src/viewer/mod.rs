mod upload;
pub use upload::UploadPanel;

mod preview;
pub use preview::PreviewTable;

mod chart_panel;
pub use chart_panel::ChartPanel;

use crate::core::dataset::Dataset;

/// Per-upload state for the visualizer, passed down through props rather
/// than held in module-level globals. `generation` keys the chart panel so
/// its widget state resets whenever a new file lands.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewerState {
    pub dataset: Option<Dataset>,
    pub error: Option<String>,
    pub generation: u64,
}

impl ViewerState {
    /// Ingest an uploaded byte stream. All-or-nothing: on failure no
    /// partial dataset is kept, only the error detail for the status line.
    pub fn from_upload(bytes: &[u8], generation: u64) -> Self {
        match Dataset::from_json_bytes(bytes) {
            Ok(dataset) => Self {
                dataset: Some(dataset),
                error: None,
                generation,
            },
            Err(err) => Self {
                dataset: None,
                error: Some(err.to_string()),
                generation,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upload_failure_keeps_no_partial_dataset() {
        let state = ViewerState::from_upload(br#"{"rows":[]}"#, 1);
        assert!(state.dataset.is_none());
        assert!(state.error.is_some());
        assert_eq!(state.generation, 1);
    }

    #[test]
    fn successful_upload_clears_previous_error() {
        let state =
            ViewerState::from_upload(br#"{"data":[{"time":"2024-01-01","t1":10}]}"#, 2);
        assert!(state.error.is_none());
        assert_eq!(state.dataset.unwrap().rows.len(), 1);
    }
}
