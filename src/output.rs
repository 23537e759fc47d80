//! CLI output formatting.
//!
//! Every command's output is built by a pure `format_*` function returning
//! display lines, and printed by a thin `print_*` wrapper. Tests assert on
//! the lines; only the wrappers touch stdout.
//!
//! Filters are shown by title first, with their stable id and file paths as
//! indented context.
//!
//! # Output Format
//!
//! ## Catalog
//!
//! ```text
//! 001 No Filter
//!     Id: none
//! 002 Sepia
//!     Id: sepia
//! ```
//!
//! ## Apply
//!
//! ```text
//! Zoom Blur → out.png (320x240)
//! ```
//!
//! ## Preview
//!
//! ```text
//! 001 No Filter → previews/shot-001-none.png (400x300)
//! 002 Sepia → previews/shot-002-sepia.png (400x300)
//! 005 Zoom Blur: failed
//!     Error: zoom-blur produced no image: ...
//! ```

use crate::catalog::FilterCatalog;
use crate::render::{PreviewResult, Rendered};

fn rendered_line(rendered: &Rendered) -> String {
    let (width, height) = rendered.size;
    format!(
        "{} → {} ({}x{})",
        rendered.filter.title(),
        rendered.path.display(),
        width,
        height
    )
}

// ============================================================================
// Catalog
// ============================================================================

/// One header line per filter, with its id as context.
pub fn format_catalog(catalog: &FilterCatalog) -> Vec<String> {
    let mut lines = Vec::new();
    for (i, filter) in catalog.iter().enumerate() {
        lines.push(format!("{:0>3} {}", i + 1, filter.title()));
        lines.push(format!("    Id: {}", filter.id()));
    }
    lines
}

/// Catalog entries as a pretty-printed JSON array.
pub fn format_catalog_json(catalog: &FilterCatalog) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&catalog.entries())
}

pub fn print_catalog(catalog: &FilterCatalog) {
    for line in format_catalog(catalog) {
        println!("{}", line);
    }
}

// ============================================================================
// Apply
// ============================================================================

pub fn format_apply_result(rendered: &Rendered) -> Vec<String> {
    vec![rendered_line(rendered)]
}

pub fn print_apply_result(rendered: &Rendered) {
    for line in format_apply_result(rendered) {
        println!("{}", line);
    }
}

// ============================================================================
// Preview
// ============================================================================

/// One line per catalog entry, in catalog order, plus an error line for failures.
pub fn format_preview_results(results: &[PreviewResult]) -> Vec<String> {
    let mut lines = Vec::new();
    for result in results {
        match &result.outcome {
            Ok(rendered) => {
                lines.push(format!("{:0>3} {}", result.index, rendered_line(rendered)));
            }
            Err(err) => {
                lines.push(format!(
                    "{:0>3} {}: failed",
                    result.index,
                    result.filter.title()
                ));
                lines.push(format!("    Error: {}", err));
            }
        }
    }
    lines
}

pub fn print_preview_results(results: &[PreviewResult]) {
    for line in format_preview_results(results) {
        println!("{}", line);
    }
}
