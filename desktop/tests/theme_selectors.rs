#![cfg(test)]
/*!
Theme selector lint for the desktop build.

Purpose:
- Ensure that critical CSS selectors required by the desktop UI (especially the
  visualizer cards, preview table and chart/export surfaces) remain present in
  the unified shared theme: ui/assets/theme/main.css
- Fail fast if a refactor accidentally drops or renames core classes, preventing a
  silent styling regression in packaged (embedded) desktop builds.

How it works:
- We compile‑time embed the unified theme using `include_str!` pointing to the shared
  `ui/` location (mirrors the constant in `desktop/src/main.rs`).
- We assert presence of a curated set of selectors / tokens.
- If you intentionally rename or remove a selector:
    1. Update the component markup.
    2. Adjust this test's REQUIRED_SELECTORS accordingly.

Why not parse CSS properly?
- A lightweight substring presence check is sufficient as an early warning.
- Keeping zero extra dependencies avoids increasing compile times.

Extending:
- Add new selectors to REQUIRED_SELECTORS when introducing structural CSS relied
  upon by Rust components (especially for upload, preview, chart and export panels).
*/

const THEME_CSS: &str = include_str!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/../ui/assets/theme/main.css"
));

/// Core selectors / tokens that must exist in the shared theme for desktop.
const REQUIRED_SELECTORS: &[&str] = &[
    // Global / layout
    ":root",
    "body {",
    ".page {",
    // Buttons & shared UI
    ".button {",
    ".button--primary",
    ".button--ghost",
    // Visualizer cards
    ".viz-card {",
    ".viz-card__header",
    ".viz-card__meta",
    // Upload & status lines
    ".viz-upload",
    ".viz-hint",
    ".viz-success",
    ".viz-error",
    ".viz-warning",
    ".viz-meta",
    // Preview table
    ".table-scroll",
    ".preview-table",
    ".preview-table thead th",
    // Controls
    ".viz-field",
    ".viz-actions",
    // Chart & export
    ".chart-scroll",
    ".viz-export",
    ".viz-status",
    ".viz-status--success",
    ".viz-status--error",
    // Media query token (sanity check responsive block exists)
    "@media (max-width: 720px)",
];

#[test]
fn unified_theme_contains_required_selectors() {
    let mut missing = Vec::new();
    for sel in REQUIRED_SELECTORS {
        if !THEME_CSS.contains(sel) {
            missing.push(*sel);
        }
    }

    if !missing.is_empty() {
        panic!(
            "Missing {} required CSS selectors/tokens in unified theme:\n{}",
            missing.len(),
            missing.join("\n")
        );
    }
}

#[test]
fn unified_theme_not_trivially_empty() {
    let non_ws_len = THEME_CSS.chars().filter(|c| !c.is_whitespace()).count();
    assert!(
        non_ws_len > 4_000,
        "Embedded theme appears unexpectedly small ({} non-whitespace chars) – \
         did the file get truncated or path change?",
        non_ws_len
    );
}

#[test]
fn status_classes_consistency() {
    // Export feedback classes must keep their success/error pairing.
    let has_success = THEME_CSS.contains(".viz-status--success");
    let has_error = THEME_CSS.contains(".viz-status--error");
    assert!(
        has_success && has_error,
        "Export status sub‑selectors missing (success: {has_success}, error: {has_error})"
    );
}
