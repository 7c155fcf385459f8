//! Console summaries rendered with `comfy-table`.

use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use caregap_engine::{MergeSummary, SortSummary, SourceStatus};
use caregap_model::GapsTaxonomy;
use caregap_store::StoredMapping;

pub fn print_merge_summary(summary: &MergeSummary) {
    if summary.master_reused {
        println!("Master roster reused ({} rows)", summary.master_rows);
    } else {
        println!("Master roster rebuilt from scratch (columns did not match)");
    }

    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Source"),
        header_cell("Config"),
        header_cell("Status"),
        header_cell("Rows staged"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 3, CellAlignment::Right);
    for source in &summary.sources {
        table.add_row(vec![
            Cell::new(&source.filename),
            Cell::new(&source.config_id),
            status_cell(source.status),
            Cell::new(source.rows_staged),
        ]);
    }
    println!("{table}");

    println!(
        "Rows added: {}  Unmapped dropped: {}  Duplicates dropped: {}  Final: {}",
        summary.rows_added, summary.unmapped_dropped, summary.duplicates_dropped, summary.final_rows
    );
}

pub fn print_sort_summary(summary: &SortSummary) {
    let mut table = Table::new();
    table.set_header(vec![header_cell("Folder")]);
    apply_table_style(&mut table);
    for folder in &summary.folders {
        table.add_row(vec![Cell::new(folder)]);
    }
    println!("{table}");
    if summary.skipped > 0 {
        println!("Sorted: {}  Skipped: {}", summary.sorted, summary.skipped);
    } else {
        println!("Sorted: {}", summary.sorted);
    }
}

pub fn print_config_list(mappings: &[StoredMapping]) {
    if mappings.is_empty() {
        println!("No mapping configs stored.");
        return;
    }
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("ID"),
        header_cell("Name"),
        header_cell("Mapped fields"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 2, CellAlignment::Right);
    for mapping in mappings {
        table.add_row(vec![
            Cell::new(&mapping.id)
                .fg(Color::Blue)
                .add_attribute(Attribute::Bold),
            Cell::new(&mapping.config.name),
            Cell::new(mapping.config.fields.entries().len()),
        ]);
    }
    println!("{table}");
}

pub fn print_taxonomy(taxonomy: &GapsTaxonomy) {
    let mut table = Table::new();
    table.set_header(vec![header_cell("Care gap"), header_cell("Synonyms")]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    for column in &taxonomy.columns {
        let synonyms = taxonomy
            .rows
            .iter()
            .filter(|row| row.get(column).is_some_and(|v| !v.trim().is_empty()))
            .count();
        table.add_row(vec![Cell::new(column), Cell::new(synonyms)]);
    }
    println!("{table}");
}

fn status_cell(status: SourceStatus) -> Cell {
    match status {
        SourceStatus::Staged => Cell::new("staged").fg(Color::Green),
        SourceStatus::ConfigMissing => Cell::new("config missing").fg(Color::Yellow),
        SourceStatus::RequiredColumnsMissing => Cell::new("columns missing").fg(Color::Yellow),
    }
}

fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}
