//! Table rendering for catalog, record and report output.

use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use medrec_model::{
    PatientMap, Status, TestDefinition, TestLookup, TestRecord, format_timestamp, format_value,
};
use medrec_report::Report;

pub fn catalog_table<'a>(definitions: impl IntoIterator<Item = &'a TestDefinition>) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Abbr"),
        header_cell("Name"),
        header_cell("Normal Range"),
        header_cell("Unit"),
        header_cell("Turnaround"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 4, CellAlignment::Right);
    for definition in definitions {
        table.add_row(vec![
            Cell::new(&definition.abbr)
                .fg(Color::Blue)
                .add_attribute(Attribute::Bold),
            Cell::new(&definition.name),
            Cell::new(range_text(definition)),
            Cell::new(&definition.unit),
            Cell::new(definition.turnaround),
        ]);
    }
    table
}

/// One row per record; `#` is the 1-based record number within the patient.
pub fn records_table(patients: &PatientMap, lookup: &impl TestLookup) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Patient"),
        header_cell("#"),
        header_cell("Test"),
        header_cell("Test Date"),
        header_cell("Value"),
        header_cell("Unit"),
        header_cell("Status"),
        header_cell("Result Date"),
        header_cell("Flag"),
    ]);
    apply_records_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    align_column(&mut table, 4, CellAlignment::Right);
    align_column(&mut table, 8, CellAlignment::Center);
    for patient in patients.values() {
        for (idx, record) in patient.records.iter().enumerate() {
            table.add_row(vec![
                Cell::new(patient.id).fg(Color::Blue),
                Cell::new(idx + 1),
                Cell::new(&record.test),
                Cell::new(format_timestamp(&record.test_date)),
                Cell::new(format_value(record.result_value)),
                Cell::new(&record.unit),
                status_cell(record.status),
                match &record.result_date {
                    Some(date) => Cell::new(format_timestamp(date)),
                    None => dim_cell("-"),
                },
                flag_cell(record, lookup),
            ]);
        }
    }
    table
}

pub fn report_table(report: &Report) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Statistic"),
        header_cell("Minimum"),
        header_cell("Maximum"),
        header_cell("Average"),
    ]);
    apply_table_style(&mut table);
    for column in 1..4 {
        align_column(&mut table, column, CellAlignment::Right);
    }
    table.add_row(vec![
        Cell::new("Test value").add_attribute(Attribute::Bold),
        Cell::new(format_value(report.values.min)),
        Cell::new(format_value(report.values.max)),
        Cell::new(format!("{:.2}", report.values.mean)),
    ]);
    match &report.turnaround {
        Some(stats) => table.add_row(vec![
            Cell::new("Turnaround").add_attribute(Attribute::Bold),
            Cell::new(stats.min),
            Cell::new(stats.max),
            Cell::new(stats.mean),
        ]),
        None => table.add_row(vec![
            Cell::new("Turnaround").add_attribute(Attribute::Bold),
            dim_cell("-"),
            dim_cell("-"),
            dim_cell("-"),
        ]),
    };
    table.add_row(vec![
        Cell::new("Records")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        dim_cell("-"),
        dim_cell("-"),
        Cell::new(report.records).add_attribute(Attribute::Bold),
    ]);
    table
}

fn range_text(definition: &TestDefinition) -> String {
    match (definition.lower_bound, definition.upper_bound) {
        (Some(lower), Some(upper)) => format!("{} - {}", format_value(lower), format_value(upper)),
        (Some(lower), None) => format!(">= {}", format_value(lower)),
        (None, Some(upper)) => format!("<= {}", format_value(upper)),
        (None, None) => "-".to_string(),
    }
}

fn flag_cell(record: &TestRecord, lookup: &impl TestLookup) -> Cell {
    match lookup.test(&record.test) {
        Some(definition) if definition.is_result_normal(record.result_value) => dim_cell("normal"),
        Some(_) => Cell::new("ABNORMAL")
            .fg(Color::Red)
            .add_attribute(Attribute::Bold),
        None => dim_cell("?"),
    }
}

fn status_cell(status: Status) -> Cell {
    match status {
        Status::Pending => Cell::new(status.label()).fg(Color::Yellow),
        Status::Completed => Cell::new(status.label()).fg(Color::Green),
        Status::Reviewed => Cell::new(status.label()).fg(Color::Cyan),
    }
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn apply_records_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(140);
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

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
