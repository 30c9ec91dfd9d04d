use dioxus::prelude::*;

use crate::core::{dataset::Dataset, format};
use crate::t;

#[component]
pub fn PreviewTable(dataset: Dataset) -> Element {
    let row_count = dataset.rows.len() as i64;

    rsx! {
        section { class: "viz-card viz-preview",
            div { class: "viz-card__header",
                h2 { {t!("preview-title")} }
                span { class: "viz-card__meta", {t!("preview-row-count", count = row_count)} }
            }

            div { class: "table-scroll",
                table { class: "preview-table",
                    thead {
                        tr {
                            th { {t!("preview-col-time")} }
                            for column in dataset.columns.iter() {
                                th { key: "{column}", "{column}" }
                            }
                        }
                    }
                    tbody {
                        for (index, row) in dataset.rows.iter().enumerate() {
                            tr { key: "{index}",
                                td { {format::format_timestamp(row.time)} }
                                for (slot, value) in row.values.iter().enumerate() {
                                    td { key: "{slot}", {format::format_number(*value, 2)} }
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}
