//! Table formatting utilities for CLI output.

use chirp::StringTable;
use comfy_table::{presets, ContentArrangement, Table};

/// Format the strings of a table, sorted by id.
pub fn format_strings_table(strings: &StringTable) -> Table {
    let mut table = Table::new();
    table.load_preset(presets::UTF8_BORDERS_ONLY);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Id", "Template", "Custom", "Description"]);

    for entry in strings.entries() {
        let custom = if strings.is_custom(&entry.id) { "yes" } else { "" };
        table.add_row(vec![
            entry.id.clone(),
            strings
                .template(&entry.id)
                .unwrap_or(&entry.template)
                .to_string(),
            custom.to_string(),
            entry.description.clone().unwrap_or_default(),
        ]);
    }

    table
}
