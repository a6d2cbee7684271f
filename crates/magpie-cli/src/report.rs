//! Plain-text report rendering for inspected pages and history listings.

use magpie_core::{HistoryEntry, Page};
use std::collections::BTreeMap;
use std::fmt::Write;

/// Render the inspection report: title, images grouped by file type with
/// per-type totals, the no-source count, and both link columns.
pub fn render_page(page: &Page) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", page.title);
    let _ = writeln!(out, "{}", page.url);
    let _ = writeln!(out);

    let _ = writeln!(out, "Images by File Type");
    if page.images.is_empty() && page.images_not_found == 0 {
        let _ = writeln!(out, "  (none)");
    }
    for (file_type, (count, total_size)) in group_by_file_type(page) {
        let _ = writeln!(
            out,
            "  {}: {} image(s), total size: {:.2} MB",
            file_type.to_uppercase(),
            count,
            total_size as f64 / (1024.0 * 1024.0)
        );
    }
    if page.images_not_found > 0 {
        let _ = writeln!(
            out,
            "  NOT FOUND: {} image(s) with no src",
            page.images_not_found
        );
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "Internal Links ({})", page.internal_links.len());
    for link in &page.internal_links {
        let _ = writeln!(out, "  {} -> {}", link.title, link.src);
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "External Links ({})", page.external_links.len());
    for link in &page.external_links {
        let _ = writeln!(out, "  {} -> {}", link.title, link.src);
    }

    out
}

/// Render the history listing, oldest entry first.
pub fn render_history(entries: &[HistoryEntry]) -> String {
    if entries.is_empty() {
        return "No history yet.\n".to_string();
    }
    let mut out = String::new();
    for entry in entries {
        let _ = writeln!(out, "{}", entry.date.format("%Y-%m-%d %H:%M:%S UTC"));
        for page in &entry.pages {
            let _ = writeln!(out, "  {} - {}", page.title, page.url);
        }
    }
    out
}

/// Per-type image count and byte total. Placeholder sizes (-1) count the
/// image but contribute nothing to the total.
fn group_by_file_type(page: &Page) -> BTreeMap<String, (usize, i64)> {
    let mut groups: BTreeMap<String, (usize, i64)> = BTreeMap::new();
    for image in &page.images {
        let entry = groups.entry(image.file_type.clone()).or_default();
        entry.0 += 1;
        entry.1 += image.size.max(0);
    }
    groups
}
