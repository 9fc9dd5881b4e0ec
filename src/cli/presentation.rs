//! CLI presentation: text and json formatters for lookup tables and resolved lines.

use crate::engine::Resolved;
use crate::error::PrologueError;
use crate::line::Source;
use comfy_table::presets::UTF8_BORDERS_ONLY;
use comfy_table::Table;
use owo_colors::OwoColorize;
use serde::Serialize;

/// One output line and the source line it came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LookupRow {
    pub output: usize,
    pub file: String,
    pub line: u32,
}

impl LookupRow {
    pub fn rows(lookup: &[Source]) -> Vec<LookupRow> {
        lookup
            .iter()
            .enumerate()
            .map(|(index, source)| LookupRow {
                output: index + 1,
                file: source
                    .file
                    .as_ref()
                    .map(|file| file.path().display().to_string())
                    .unwrap_or_else(|| "<memory>".to_string()),
                line: source.line,
            })
            .collect()
    }
}

fn format_section_heading(title: &str) -> String {
    format!("{}", title.bold().underline())
}

/// Format the lookup table as human-readable text (comfy-table + section heading).
pub fn format_lookup_text(lookup: &[Source]) -> String {
    let mut out = String::new();
    out.push_str(&format!("{}\n\n", format_section_heading("Lookup")));
    if lookup.is_empty() {
        out.push_str("No output lines.\n");
        return out;
    }
    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["Output", "File", "Line"]);
    for row in LookupRow::rows(lookup) {
        table.add_row(vec![row.output.to_string(), row.file, row.line.to_string()]);
    }
    out.push_str(&format!("{}\n", table));
    out
}

pub fn format_lookup_json(lookup: &[Source]) -> Result<String, PrologueError> {
    serde_json::to_string_pretty(&LookupRow::rows(lookup))
        .map_err(|e| PrologueError::Lookup(format!("Failed to serialize lookup: {}", e)))
}

/// Format a resolved line as a location heading followed by its snippet.
pub fn format_resolved_text(resolved: &Resolved) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{}\n",
        format_section_heading(&format!("{}:{}", resolved.file, resolved.line))
    ));
    for line in &resolved.snippet {
        out.push_str(line);
        out.push('\n');
    }
    out
}

pub fn format_resolved_json(resolved: &Resolved) -> Result<String, PrologueError> {
    serde_json::to_string_pretty(resolved)
        .map_err(|e| PrologueError::Lookup(format!("Failed to serialize resolved line: {}", e)))
}
