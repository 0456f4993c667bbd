//! Terminal tables. Everything here goes to stderr so stdout stays free for
//! the exported file.

use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use importmap_cli::session::{ImportSession, MessageReply, UploadSummary};
use importmap_map::SynonymDictionary;
use importmap_model::{CaptionSlot, ImportColumn, KNOWN_CAPTIONS, caption_key};
use importmap_validate::ValidationReport;

pub fn print_upload(session: &ImportSession, upload: &UploadSummary) {
    eprintln!(
        "Loaded {} columns, {} data rows",
        session.columns().len(),
        upload.rows
    );
    if let Some(error) = &upload.provider_error {
        eprintln!("{} Using local suggestions only.", error.user_message());
    }

    let mut table = Table::new();
    table.set_header(vec![
        header_cell("#"),
        header_cell("Column"),
        header_cell("Type"),
        header_cell("Samples"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 0, CellAlignment::Right);
    for column in session.columns() {
        table.add_row(vec![
            dim_cell(column.index + 1),
            Cell::new(&column.name),
            Cell::new(column.column_type.as_str()).fg(Color::Blue),
            samples_cell(column),
        ]);
    }
    eprintln!("{table}");

    let outcome = &upload.outcome;
    if !outcome.reset.is_empty() {
        eprintln!(
            "Cleared confirmed captions whose column is gone: {}",
            outcome.reset.join(", ")
        );
    }
    for candidate in &outcome.skipped {
        eprintln!("Skipped suggestion {}", candidate.describe());
    }
}

pub fn print_mapping(session: &ImportSession, explain: bool) {
    let state = session.state();
    let mut table = Table::new();
    let mut header = vec![
        header_cell("Caption"),
        header_cell("Column"),
        header_cell("Sample"),
        header_cell("Confidence"),
        header_cell("Status"),
        header_cell("Key"),
    ];
    if explain {
        header.push(header_cell("Score breakdown"));
    }
    table.set_header(header);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 3, CellAlignment::Right);
    align_column(&mut table, 5, CellAlignment::Center);

    for slot in state.slots().iter().filter(|s| !s.is_blank()) {
        let mut row = vec![
            Cell::new(&slot.caption).add_attribute(Attribute::Bold),
            column_cell(slot),
            slot.sample.as_deref().map_or_else(|| dim_cell("-"), Cell::new),
            confidence_cell(slot.confidence),
            status_cell(slot),
            key_cell(slot),
        ];
        if explain {
            row.push(explain_cell(session, slot));
        }
        table.add_row(row);
    }
    eprintln!("{table}");

    let summary = state.summary();
    eprintln!(
        "Confirmed {}/{} ({}%), {} awaiting confirmation, {} unassigned",
        summary.confirmed,
        summary.total,
        summary.coverage_percent(),
        summary.suggested,
        summary.unassigned
    );
}

pub fn print_reply(reply: &MessageReply) {
    if let Some(error) = &reply.provider_error {
        eprintln!("{} ({error}). Message ignored.", error.user_message());
        return;
    }
    if !reply.content.is_empty() {
        eprintln!("{}", reply.content);
    }
    for candidate in &reply.applied {
        eprintln!("Confirmed {}", candidate.describe());
    }
    for (candidate, reason) in &reply.rejected {
        eprintln!("Not applied {}: {reason}", candidate.describe());
    }
}

pub fn print_validation(report: &ValidationReport) {
    eprintln!("Validation: {}", report.summary());
    if report.is_clean() {
        return;
    }

    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Caption"),
        header_cell("Rule"),
        header_cell("Count"),
        header_cell("Rows"),
        header_cell("Examples"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 2, CellAlignment::Right);
    for issue in &report.issues {
        let rows = issue
            .sample_rows()
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        let examples = issue
            .samples
            .iter()
            .map(|s| format!("\"{}\"", s.value))
            .collect::<Vec<_>>()
            .join(", ");
        table.add_row(vec![
            Cell::new(&issue.caption).add_attribute(Attribute::Bold),
            Cell::new(&issue.rule),
            Cell::new(issue.count).fg(Color::Yellow),
            Cell::new(rows),
            Cell::new(examples),
        ]);
    }
    eprintln!("{table}");
}

/// Known captions and their phrasings, to stdout.
pub fn print_captions(dictionary: &SynonymDictionary, configured: &[String]) {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Caption"),
        header_cell("Default"),
        header_cell("Phrasings"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Center);

    let mut captions: Vec<&str> = KNOWN_CAPTIONS.to_vec();
    for caption in configured {
        if !captions.iter().any(|c| caption_key(c) == caption_key(caption)) {
            captions.push(caption.as_str());
        }
    }
    for caption in captions {
        let in_use = configured.iter().any(|c| caption_key(c) == caption_key(caption));
        let phrasings = dictionary.phrasings(caption).join(", ");
        table.add_row(vec![
            Cell::new(caption).add_attribute(Attribute::Bold),
            if in_use {
                Cell::new("✓").fg(Color::Green)
            } else {
                dim_cell("-")
            },
            if phrasings.is_empty() {
                dim_cell("-")
            } else {
                Cell::new(phrasings)
            },
        ]);
    }
    println!("{table}");
}

fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::DynamicFullWidth)
        .set_width(140);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn samples_cell(column: &ImportColumn) -> Cell {
    if column.sample.is_empty() {
        dim_cell("(no values)")
    } else {
        Cell::new(column.sample.join(", "))
    }
}

fn column_cell(slot: &CaptionSlot) -> Cell {
    if slot.is_assigned() {
        Cell::new(slot.column_label())
    } else {
        dim_cell(slot.column_label())
    }
}

fn confidence_cell(confidence: Option<f32>) -> Cell {
    match confidence {
        Some(value) => Cell::new(format!("{:.0}%", value * 100.0)),
        None => dim_cell("-"),
    }
}

fn status_cell(slot: &CaptionSlot) -> Cell {
    match (slot.is_assigned(), slot.confirmed, slot.suggested) {
        (true, true, _) => Cell::new("confirmed")
            .fg(Color::Green)
            .add_attribute(Attribute::Bold),
        (true, false, true) => Cell::new("suggested").fg(Color::Yellow),
        (true, false, false) => Cell::new("assigned").fg(Color::Yellow),
        (false, _, _) => Cell::new("unassigned").fg(Color::Red),
    }
}

fn key_cell(slot: &CaptionSlot) -> Cell {
    match (slot.key_field, slot.match_by_id) {
        (true, true) => Cell::new("key, id"),
        (true, false) => Cell::new("key"),
        (false, true) => Cell::new("id"),
        (false, false) => dim_cell("-"),
    }
}

fn explain_cell(session: &ImportSession, slot: &CaptionSlot) -> Cell {
    let Some(column) = slot
        .column
        .as_deref()
        .and_then(|name| session.columns().iter().find(|c| c.name == name))
    else {
        return dim_cell("-");
    };
    Cell::new(session.explain(column, &slot.caption).explain())
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
