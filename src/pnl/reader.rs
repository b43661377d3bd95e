use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::{NaiveDate, NaiveTime};
use csv::{ReaderBuilder, StringRecord};
use tracing::{debug, info};

use super::{PnlKey, PnlSeries, PnlTable, PnlValue};
use crate::dates::parse_date;
use crate::error::{HoustonError, Result};

const KEY_COLUMNS: [&str; 3] = ["Field", "Date", "Time"];

/// Read a Pnl CSV file from disk
pub fn read_pnl_csv<P: AsRef<Path>>(file_path: P) -> Result<PnlTable> {
    let path = file_path.as_ref();
    info!("Reading Pnl CSV file: {:?}", path);

    let file = File::open(path).map_err(|source| HoustonError::SourceNotFound {
        path: path.to_path_buf(),
        source,
    })?;

    read_pnl_table(file)
}

/// Parse a Pnl CSV stream into a [`PnlTable`].
///
/// The first three columns must be `Field`, `Date`, `Time`; a single
/// remaining column yields [`PnlTable::Aggregate`], several yield
/// [`PnlTable::Detailed`].
pub fn read_pnl_table<R: Read>(source: R) -> Result<PnlTable> {
    let mut reader = ReaderBuilder::new()
        .flexible(true) // column count is checked per row below
        .from_reader(source);

    let headers = reader.headers().map_err(csv_error)?.clone();
    debug!("Pnl CSV headers: {:?}", headers);

    let entities = check_headers(&headers)?;
    let mut columns: Vec<PnlSeries> = vec![PnlSeries::new(); entities.len()];
    let mut rows = 0usize;

    for result in reader.records() {
        let record = result.map_err(csv_error)?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);

        if record.len() != headers.len() {
            return Err(HoustonError::malformed_at(
                line,
                format!(
                    "expected {} columns, found {}",
                    headers.len(),
                    record.len()
                ),
            ));
        }

        let key = parse_key(&record, line)?;
        if columns[0].contains_key(&key) {
            return Err(HoustonError::malformed_at(
                line,
                format!(
                    "duplicate row for ({}, {}, {})",
                    key.field,
                    key.date,
                    key.time.format("%H:%M:%S")
                ),
            ));
        }

        for (column, cell) in columns.iter_mut().zip(record.iter().skip(KEY_COLUMNS.len())) {
            column.insert(key.clone(), coerce_cell(cell));
        }
        rows += 1;
    }

    let table = if entities.len() == 1 {
        let label = entities.into_iter().next().filter(|l| !l.is_empty());
        let values = columns.pop().unwrap_or_default();
        PnlTable::Aggregate { label, values }
    } else {
        PnlTable::Detailed(entities.into_iter().zip(columns).collect::<BTreeMap<_, _>>())
    };

    info!(
        "Parsed {} Pnl rows ({} shape, {} entities)",
        rows,
        if table.is_aggregate() { "aggregate" } else { "detailed" },
        table.entities().len()
    );
    Ok(table)
}

/// Bytes that are not UTF-8 are malformed input; anything else stays a CSV error
fn csv_error(err: csv::Error) -> HoustonError {
    if let csv::ErrorKind::Utf8 { pos, err: utf8 } = err.kind() {
        let message = format!("invalid UTF-8 in column {}: {}", utf8.field() + 1, utf8);
        return match pos {
            Some(pos) => HoustonError::malformed_at(pos.line(), message),
            None => HoustonError::malformed(message),
        };
    }
    HoustonError::Csv(err)
}

/// Validate the header row and return the entity column labels
fn check_headers(headers: &StringRecord) -> Result<Vec<String>> {
    if headers.is_empty() || headers.iter().all(|h| h.trim().is_empty()) {
        return Err(HoustonError::malformed("missing header row"));
    }

    if headers.len() < KEY_COLUMNS.len() + 1 {
        return Err(HoustonError::malformed(format!(
            "expected at least 4 columns (Field, Date, Time, ...), found {}",
            headers.len()
        )));
    }

    for (idx, expected) in KEY_COLUMNS.iter().enumerate() {
        let found = headers[idx].trim_start_matches('\u{feff}').trim();
        if !found.eq_ignore_ascii_case(expected) {
            return Err(HoustonError::malformed(format!(
                "column {} must be '{}', found '{}'",
                idx + 1,
                expected,
                found
            )));
        }
    }

    let entities: Vec<String> = headers
        .iter()
        .skip(KEY_COLUMNS.len())
        .map(|h| h.trim().to_string())
        .collect();

    if entities.len() > 1 {
        let mut seen = std::collections::BTreeSet::new();
        for entity in &entities {
            if entity.is_empty() {
                return Err(HoustonError::malformed("entity column with empty header"));
            }
            if !seen.insert(entity.as_str()) {
                return Err(HoustonError::malformed(format!(
                    "duplicate entity column '{}'",
                    entity
                )));
            }
        }
    }

    Ok(entities)
}

fn parse_key(record: &StringRecord, line: u64) -> Result<PnlKey> {
    let field = record[0].trim();
    if field.is_empty() {
        return Err(HoustonError::malformed_at(line, "empty Field"));
    }

    let date = parse_key_date(&record[1]).ok_or_else(|| {
        HoustonError::malformed_at(line, format!("could not parse Date '{}'", &record[1]))
    })?;
    let time = parse_key_time(&record[2]).ok_or_else(|| {
        HoustonError::malformed_at(line, format!("could not parse Time '{}'", &record[2]))
    })?;

    Ok(PnlKey::new(field, date, time))
}

fn parse_key_date(text: &str) -> Option<NaiveDate> {
    parse_date(text).ok()
}

fn parse_key_time(text: &str) -> Option<NaiveTime> {
    let text = text.trim();
    ["%H:%M:%S%.f", "%H:%M"]
        .iter()
        .find_map(|format| NaiveTime::parse_from_str(text, format).ok())
}

/// Numeric first, then text; blank and `nan` cells are null
fn coerce_cell(cell: &str) -> Option<PnlValue> {
    let text = cell.trim();
    if text.is_empty() || text.eq_ignore_ascii_case("nan") {
        return None;
    }

    match text.parse::<f64>() {
        Ok(n) if n.is_finite() => Some(PnlValue::Number(n)),
        _ => Some(PnlValue::Text(text.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(field: &str, date: &str, time: &str) -> PnlKey {
        PnlKey::new(
            field,
            NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            NaiveTime::parse_from_str(time, "%H:%M:%S").unwrap(),
        )
    }

    #[test]
    fn test_coerce_cell() {
        assert_eq!(coerce_cell("0.04696045"), Some(PnlValue::Number(0.04696045)));
        assert_eq!(
            coerce_cell("7.868416972425307e-06"),
            Some(PnlValue::Number(7.868416972425307e-06))
        );
        assert_eq!(coerce_cell("-16647"), Some(PnlValue::Number(-16647.0)));
        assert_eq!(coerce_cell("DU12345"), Some(PnlValue::Text("DU12345".to_string())));
        assert_eq!(coerce_cell(""), None);
        assert_eq!(coerce_cell("  "), None);
        assert_eq!(coerce_cell("NaN"), None);
        assert_eq!(coerce_cell("inf"), Some(PnlValue::Text("inf".to_string())));
    }

    #[test]
    fn test_parse_key_time_formats() {
        assert_eq!(parse_key_time("09:30:00"), NaiveTime::from_hms_opt(9, 30, 0));
        assert_eq!(parse_key_time("16:02"), NaiveTime::from_hms_opt(16, 2, 0));
        assert_eq!(
            parse_key_time("16:02:57.250"),
            NaiveTime::from_hms_milli_opt(16, 2, 57, 250)
        );
        assert_eq!(parse_key_time("4pm"), None);
    }

    #[test]
    fn test_read_aggregate_shape() {
        let csv = "Field,Date,Time,my-strategy\n\
                   Account,2019-06-24,09:30:00,DU12345\n\
                   Pnl,2019-06-24,09:30:00,-88.4739\n\
                   Pnl,2019-06-25 00:00:00,16:00:01,766.8886\n";

        let table = read_pnl_table(csv.as_bytes()).unwrap();
        match table {
            PnlTable::Aggregate { label, values } => {
                assert_eq!(label.as_deref(), Some("my-strategy"));
                assert_eq!(values.len(), 3);
                assert_eq!(
                    values[&key("Account", "2019-06-24", "09:30:00")],
                    Some(PnlValue::Text("DU12345".to_string()))
                );
                assert_eq!(
                    values[&key("Pnl", "2019-06-25", "16:00:01")],
                    Some(PnlValue::Number(766.8886))
                );
            }
            other => panic!("expected aggregate shape, got {:?}", other),
        }
    }

    #[test]
    fn test_read_aggregate_without_label() {
        let csv = "Field,Date,Time,\nPnl,2019-06-24,09:30:00,1.5\n";
        let table = read_pnl_table(csv.as_bytes()).unwrap();
        assert!(table.is_aggregate());
        assert!(table.entities().is_empty());
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_read_detailed_shape_with_blank_cell() {
        let csv = "Field,Date,Time,CBL(5474),KFY(6477845)\n\
                   Pnl,2019-06-24,09:30:00,-86.6315,\n\
                   Pnl,2019-06-24,16:02:57,-809.0687,12.25\n";

        let table = read_pnl_table(csv.as_bytes()).unwrap();
        assert_eq!(table.entities(), vec!["CBL(5474)", "KFY(6477845)"]);
        let k = key("Pnl", "2019-06-24", "09:30:00");
        assert_eq!(table.get(Some("KFY(6477845)"), &k), Some(&None));
        assert_eq!(
            table.get(Some("CBL(5474)"), &k),
            Some(&Some(PnlValue::Number(-86.6315)))
        );
    }

    #[test]
    fn test_header_checks() {
        let cases = [
            ("", "missing header row"),
            ("Field,Date,my-strategy\n", "at least 4 columns"),
            ("Field,Date,AAPL(265598),IBM(8314)\n", "column 3 must be 'Time'"),
            ("Date,Field,Time,x\n", "column 1 must be 'Field'"),
            ("Field,Date,Time,AAPL,AAPL\n", "duplicate entity column 'AAPL'"),
            ("Field,Date,Time,AAPL,\n", "empty header"),
        ];

        for (csv, expected) in cases {
            let err = read_pnl_table(csv.as_bytes()).unwrap_err();
            assert!(
                matches!(err, HoustonError::MalformedInput { .. }),
                "{:?} -> {:?}",
                csv,
                err
            );
            assert!(err.to_string().contains(expected), "{:?} -> {}", csv, err);
        }
    }

    #[test]
    fn test_header_names_are_case_insensitive() {
        let csv = "field, date ,TIME,s\nPnl,2019-06-24,09:30:00,1\n";
        assert!(read_pnl_table(csv.as_bytes()).is_ok());
    }

    #[test]
    fn test_row_errors_report_line() {
        let short_row = "Field,Date,Time,a,b\nPnl,2019-06-24,09:30:00,1\n";
        let err = read_pnl_table(short_row.as_bytes()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "malformed input at line 2: expected 5 columns, found 4"
        );

        let bad_date = "Field,Date,Time,a\nPnl,2019-06-24,09:30:00,1\nPnl,June 25,09:30:00,2\n";
        let err = read_pnl_table(bad_date.as_bytes()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "malformed input at line 3: could not parse Date 'June 25'"
        );

        let duplicate = "Field,Date,Time,a\nPnl,2019-06-24,09:30:00,1\nPnl,2019-06-24,09:30:00,2\n";
        let err = read_pnl_table(duplicate.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("duplicate row for (Pnl, 2019-06-24, 09:30:00)"));
    }

    #[test]
    fn test_invalid_utf8_is_malformed() {
        let cell = b"Field,Date,Time,a\nPnl,2019-06-24,09:30:00,\xff\xfe\n";
        let err = read_pnl_table(&cell[..]).unwrap_err();
        match err {
            HoustonError::MalformedInput { line, ref message } => {
                assert_eq!(line, Some(2));
                assert!(message.contains("invalid UTF-8 in column 4"), "{}", message);
            }
            other => panic!("expected MalformedInput, got {:?}", other),
        }

        let header = b"Field,Date,Time,\xffa\nPnl,2019-06-24,09:30:00,1\n";
        let err = read_pnl_table(&header[..]).unwrap_err();
        assert!(matches!(err, HoustonError::MalformedInput { .. }), "{:?}", err);
    }

    #[test]
    fn test_dates_in_other_formats_normalize_to_same_key() {
        let csv = "Field,Date,Time,a\nPnl,2019/06/24,09:30:00,1\nReturn,20190624,09:30:00,2\n";
        let table = read_pnl_table(csv.as_bytes()).unwrap();
        let dates: std::collections::BTreeSet<_> =
            table.keys().into_iter().map(|k| k.date).collect();
        assert_eq!(dates.len(), 1);
    }
}
