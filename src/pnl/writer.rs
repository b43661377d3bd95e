use std::io::Write;

use csv::WriterBuilder;
use tracing::debug;

use super::{PnlTable, PnlValue};
use crate::error::{HoustonError, Result};

/// Write a [`PnlTable`] back out in the pivoted `Field,Date,Time,...` layout.
///
/// Rows follow key order and entity columns are sorted by name. Null cells
/// are left empty and numbers use the shortest representation that parses
/// back to the same `f64`, so [`read_pnl_table`](super::read_pnl_table)
/// reproduces the table with these exceptions:
///
/// - a key present in some series but absent from another comes back as a
///   null cell in the latter
/// - a detailed table with a single entity comes back as
///   [`PnlTable::Aggregate`] labelled with that entity
/// - text cells that look numeric (an `OrderRef` of `123`) come back as
///   numbers, and text reading `nan` comes back null
///
/// A detailed table with no entities has no value column and is rejected
/// with [`HoustonError::MalformedInput`].
pub fn write_pnl_csv<W: Write>(table: &PnlTable, writer: W) -> Result<()> {
    let series = table.series();
    if series.is_empty() {
        return Err(HoustonError::malformed(
            "cannot write a detailed Pnl table with no entities",
        ));
    }

    let mut writer = WriterBuilder::new().from_writer(writer);

    let mut header = vec!["Field".to_string(), "Date".to_string(), "Time".to_string()];
    header.extend(
        series
            .iter()
            .map(|(entity, _)| entity.unwrap_or_default().to_string()),
    );
    writer.write_record(&header)?;

    let keys = table.keys();
    for key in &keys {
        let mut row = vec![
            key.field.clone(),
            key.date.format("%Y-%m-%d").to_string(),
            key.time.format("%H:%M:%S%.f").to_string(),
        ];
        row.extend(series.iter().map(|(_, values)| match values.get(*key) {
            Some(Some(value)) => format_cell(value),
            _ => String::new(),
        }));
        writer.write_record(&row)?;
    }

    writer.flush()?;
    debug!("Wrote {} Pnl rows for {} series", keys.len(), series.len());
    Ok(())
}

fn format_cell(value: &PnlValue) -> String {
    match value {
        PnlValue::Number(n) => n.to_string(),
        PnlValue::Text(s) => s.clone(),
    }
}
