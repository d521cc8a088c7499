//! Text rendering for CLI output.

use crate::store::CollectionSummary;
use comfy_table::presets::UTF8_BORDERS_ONLY;
use comfy_table::Table;
use owo_colors::OwoColorize;
use std::path::Path;

/// Format a section heading with bold/underline.
pub fn format_section_heading(title: &str) -> String {
    format!("{}", title.bold().underline())
}

fn shape(summary: &CollectionSummary) -> String {
    summary
        .descriptor
        .as_ref()
        .map(|d| d.to_string())
        .unwrap_or_else(|| "(no descriptor)".to_string())
}

/// Table of collections under `root`.
pub fn format_collection_list_text(root: &Path, summaries: &[CollectionSummary]) -> String {
    let mut out = format!(
        "{}\n\n",
        format_section_heading(&format!("Collections in {}", root.display()))
    );
    if summaries.is_empty() {
        out.push_str("No collections found.\n");
        return out;
    }
    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["Collection", "Shape", "Records"]);
    for summary in summaries {
        table.add_row(vec![
            summary.name.clone(),
            shape(summary),
            summary.record_files.to_string(),
        ]);
    }
    out.push_str(&format!("{}\n", table));
    out
}

/// Details of one collection.
pub fn format_collection_info_text(dir: &Path, summary: &CollectionSummary) -> String {
    let mut out = format!(
        "{}\n\n",
        format_section_heading(&format!("Collection {}", summary.name))
    );
    out.push_str(&format!("  Path: {}\n", dir.display()));
    out.push_str(&format!("  Shape: {}\n", shape(summary)));
    out.push_str(&format!("  Record files: {}\n", summary.record_files));
    if summary.descriptor.is_none() {
        out.push_str(&format!(
            "  {}\n",
            "Descriptor missing; the next open will write one.".yellow()
        ));
    }
    out
}
