//! Human-readable result tables.

use std::collections::BTreeSet;

use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use gridport_map::FieldSuggestion;

use crate::types::{ImportReport, ValidationReport};

pub fn print_import_report(report: &ImportReport) {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Source"),
        header_cell("Units"),
        header_cell("Sections"),
        header_cell("Imported"),
        header_cell("Duplicates"),
        header_cell("Skipped"),
    ]);
    apply_table_style(&mut table);
    for column in 1..=5 {
        align_column(&mut table, column, CellAlignment::Right);
    }
    for file in &report.files {
        let summary = &file.summary;
        table.add_row(vec![
            Cell::new(file.source.display()),
            Cell::new(summary.units.len()),
            Cell::new(summary.known_sections),
            Cell::new(summary.total_imported()),
            count_cell(summary.total_duplicates(), Color::Yellow),
            count_cell(summary.skipped_blank_identifiers, Color::Yellow),
        ]);
    }
    println!("{table}");

    let mut totals = Table::new();
    totals.set_header(vec![header_cell("Type"), header_cell("Records")]);
    apply_table_style(&mut totals);
    align_column(&mut totals, 1, CellAlignment::Right);
    for (name, count) in &report.store_counts {
        totals.add_row(vec![Cell::new(name), Cell::new(count)]);
    }
    totals.add_row(vec![
        Cell::new("TOTAL")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        Cell::new(report.total_records).add_attribute(Attribute::Bold),
    ]);
    println!("{totals}");

    let missing: BTreeSet<&String> = report
        .files
        .iter()
        .flat_map(|file| file.summary.missing_headers.iter())
        .collect();
    if !missing.is_empty() {
        println!("Declared headers never found:");
        for header in missing {
            println!("- {header}");
        }
    }
    if let Some(out) = &report.out {
        println!("Store: {}", out.display());
    }
}

pub fn print_validation_report(report: &ValidationReport) {
    println!("Mapping: {}", report.mapping.display());
    println!("Entries: {}", report.entry_count);
    if report.result.errors.is_empty() && report.result.warnings.is_empty() {
        println!("No problems found.");
        return;
    }
    let mut table = Table::new();
    table.set_header(vec![header_cell("Severity"), header_cell("Message")]);
    apply_table_style(&mut table);
    for error in &report.result.errors {
        table.add_row(vec![
            Cell::new("error").fg(Color::Red).add_attribute(Attribute::Bold),
            Cell::new(error),
        ]);
    }
    for warning in &report.result.warnings {
        table.add_row(vec![Cell::new("warning").fg(Color::Yellow), Cell::new(warning)]);
    }
    println!("{table}");
}

pub fn print_suggestions(type_name: &str, suggestions: &[FieldSuggestion]) {
    if suggestions.is_empty() {
        println!("No suggestions met the score threshold.");
        return;
    }
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Header"),
        header_cell("Field"),
        header_cell("Score"),
        header_cell("Rule"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 2, CellAlignment::Right);
    for suggestion in suggestions {
        table.add_row(vec![
            Cell::new(&suggestion.header),
            Cell::new(format!("{type_name}.{}", suggestion.property_name)),
            Cell::new(format!("{:.0}%", suggestion.result.score * 100.0)),
            Cell::new(suggestion.result.reason.label()),
        ]);
    }
    println!("{table}");
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn header_cell(text: &str) -> Cell {
    Cell::new(text).add_attribute(Attribute::Bold)
}

fn count_cell(value: usize, color: Color) -> Cell {
    if value > 0 {
        Cell::new(value).fg(color)
    } else {
        Cell::new(value)
    }
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}
