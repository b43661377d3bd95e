//! Output formatting module for CLI display
//!
//! Keeps presentation (tables, JSON documents) apart from the library calls
//! made by the dispatcher.

use colored::Colorize;
use houston_tools::dates::DateRange;
use houston_tools::pnl::{PnlKey, PnlTable, PnlValue};
use serde::Serialize;
use tabled::{
    settings::{object::Columns, Alignment, Style},
    Table, Tabled,
};

/// Format segments for JSON output
pub fn format_segments_json(ranges: &[DateRange]) -> String {
    serde_json::to_string_pretty(ranges)
        .unwrap_or_else(|e| format!(r#"{{"error": "JSON serialization failed: {}"}}"#, e))
}

/// Format segments for terminal table output
pub fn format_segments_table(ranges: &[DateRange], period: &str) -> String {
    #[derive(Tabled)]
    struct SegmentRow {
        #[tabled(rename = "#")]
        index: usize,
        #[tabled(rename = "Start")]
        start: String,
        #[tabled(rename = "End")]
        end: String,
        #[tabled(rename = "Days")]
        days: i64,
    }

    let rows: Vec<SegmentRow> = ranges
        .iter()
        .enumerate()
        .map(|(i, r)| {
            let (start, end) = r.to_iso();
            SegmentRow {
                index: i + 1,
                start,
                end,
                days: r.days(),
            }
        })
        .collect();

    let mut output = format!(
        "\n{} {} segment(s), period {}\n\n",
        "📅".cyan().bold(),
        ranges.len(),
        period.bold()
    );

    let mut table = Table::new(&rows);
    table.with(Style::rounded());
    table.modify(Columns::new(3..), Alignment::right());
    output.push_str(&table.to_string());
    output.push('\n');
    output
}

#[derive(Serialize)]
struct JsonPnlRow<'a> {
    entity: Option<&'a str>,
    field: &'a str,
    date: String,
    time: String,
    value: Option<&'a PnlValue>,
}

#[derive(Serialize)]
struct JsonPnl<'a> {
    shape: &'static str,
    entities: Vec<&'a str>,
    rows: Vec<JsonPnlRow<'a>>,
}

fn shape_name(table: &PnlTable) -> &'static str {
    if table.is_aggregate() {
        "aggregate"
    } else {
        "detailed"
    }
}

fn long_rows(table: &PnlTable) -> Vec<(Option<&str>, &PnlKey, Option<&PnlValue>)> {
    table
        .series()
        .into_iter()
        .flat_map(|(entity, series)| {
            series
                .iter()
                .map(move |(key, value)| (entity, key, value.as_ref()))
        })
        .collect()
}

/// Format a reshaped Pnl table for JSON output (one object per cell)
pub fn format_pnl_json(table: &PnlTable) -> String {
    let rows = long_rows(table)
        .into_iter()
        .map(|(entity, key, value)| JsonPnlRow {
            entity,
            field: &key.field,
            date: key.date.format("%Y-%m-%d").to_string(),
            time: key.time.format("%H:%M:%S%.f").to_string(),
            value,
        })
        .collect();

    let doc = JsonPnl {
        shape: shape_name(table),
        entities: table.entities(),
        rows,
    };

    serde_json::to_string_pretty(&doc)
        .unwrap_or_else(|e| format!(r#"{{"error": "JSON serialization failed: {}"}}"#, e))
}

/// Format a reshaped Pnl table for terminal table output
pub fn format_pnl_table(table: &PnlTable) -> String {
    #[derive(Tabled)]
    struct PnlRow {
        #[tabled(rename = "Entity")]
        entity: String,
        #[tabled(rename = "Field")]
        field: String,
        #[tabled(rename = "Date")]
        date: String,
        #[tabled(rename = "Time")]
        time: String,
        #[tabled(rename = "Value")]
        value: String,
    }

    let rows: Vec<PnlRow> = long_rows(table)
        .into_iter()
        .map(|(entity, key, value)| PnlRow {
            entity: entity.unwrap_or("-").to_string(),
            field: key.field.clone(),
            date: key.date.format("%Y-%m-%d").to_string(),
            time: key.time.format("%H:%M:%S%.f").to_string(),
            value: match value {
                Some(PnlValue::Number(n)) if *n < 0.0 => n.to_string().red().to_string(),
                Some(v) => v.to_string(),
                None => "null".bright_black().to_string(),
            },
        })
        .collect();

    let mut output = format!(
        "\n{} Pnl table ({}): {} entities, {} fields, {} rows\n\n",
        "📊".cyan().bold(),
        shape_name(table),
        table.entities().len(),
        table.fields().len(),
        table.keys().len()
    );

    let mut table = Table::new(&rows);
    table.with(Style::modern());
    table.modify(Columns::new(4..), Alignment::right());
    output.push_str(&table.to_string());
    output.push('\n');
    output
}

/// Message for a filter that matched nothing
pub fn format_empty_pnl() -> String {
    format!("{} No matching Pnl rows\n", "ℹ".blue().bold())
}
