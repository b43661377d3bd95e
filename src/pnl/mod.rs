//! Pnl CSV reshaping
//!
//! Performance exports arrive as a pivoted CSV: one row per
//! `(Field, Date, Time)` and one column per strategy or security. This module
//! turns that into typed, entity-keyed tables and back.

mod reader;
mod writer;

pub use reader::{read_pnl_csv, read_pnl_table};
pub use writer::write_pnl_csv;

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use chrono::{NaiveDate, NaiveTime};
use serde::Serialize;

/// Composite row key of a Pnl CSV
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct PnlKey {
    pub field: String,
    pub date: NaiveDate,
    pub time: NaiveTime,
}

impl PnlKey {
    pub fn new(field: impl Into<String>, date: NaiveDate, time: NaiveTime) -> Self {
        Self {
            field: field.into(),
            date,
            time,
        }
    }
}

/// A non-null cell value
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PnlValue {
    Number(f64),
    Text(String),
}

impl PnlValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            PnlValue::Number(n) => Some(*n),
            PnlValue::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            PnlValue::Number(_) => None,
            PnlValue::Text(s) => Some(s),
        }
    }
}

impl fmt::Display for PnlValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PnlValue::Number(n) => write!(f, "{}", n),
            PnlValue::Text(s) => f.write_str(s),
        }
    }
}

/// Values of one entity; `None` is a null cell
pub type PnlSeries = BTreeMap<PnlKey, Option<PnlValue>>;

/// Reshaped Pnl CSV
#[derive(Debug, Clone, PartialEq)]
pub enum PnlTable {
    /// Single value column; `label` is its header (usually a strategy code)
    Aggregate {
        label: Option<String>,
        values: PnlSeries,
    },
    /// One series per entity identifier, e.g. `"CBL(5474)"`
    Detailed(BTreeMap<String, PnlSeries>),
}

impl PnlTable {
    pub fn is_aggregate(&self) -> bool {
        matches!(self, PnlTable::Aggregate { .. })
    }

    /// Every series with its entity label, sorted by entity
    pub fn series(&self) -> Vec<(Option<&str>, &PnlSeries)> {
        match self {
            PnlTable::Aggregate { label, values } => vec![(label.as_deref(), values)],
            PnlTable::Detailed(entities) => entities
                .iter()
                .map(|(entity, series)| (Some(entity.as_str()), series))
                .collect(),
        }
    }

    /// Entity identifiers (the aggregate label, if any)
    pub fn entities(&self) -> Vec<&str> {
        self.series()
            .into_iter()
            .filter_map(|(entity, _)| entity)
            .collect()
    }

    /// Look up a cell.
    ///
    /// For the aggregate shape `entity` may be `None` or the label. Returns
    /// `None` when the key is absent and `Some(None)` for a null cell.
    pub fn get(&self, entity: Option<&str>, key: &PnlKey) -> Option<&Option<PnlValue>> {
        match self {
            PnlTable::Aggregate { label, values } => match entity {
                Some(e) if label.as_deref() != Some(e) => None,
                _ => values.get(key),
            },
            PnlTable::Detailed(entities) => entities.get(entity?)?.get(key),
        }
    }

    /// Union of row keys across all series
    pub fn keys(&self) -> BTreeSet<&PnlKey> {
        self.series()
            .into_iter()
            .flat_map(|(_, series)| series.keys())
            .collect()
    }

    pub fn fields(&self) -> BTreeSet<&str> {
        self.keys().into_iter().map(|k| k.field.as_str()).collect()
    }

    /// Number of cells, nulls included
    pub fn len(&self) -> usize {
        self.series().iter().map(|(_, s)| s.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copy restricted to one field and/or one entity.
    ///
    /// Selecting a single entity of a detailed table yields the aggregate
    /// shape labelled with that entity, which is how a one-column Pnl CSV
    /// reads back.
    pub fn filter(&self, field: Option<&str>, entity: Option<&str>) -> PnlTable {
        let keep = |series: &PnlSeries| -> PnlSeries {
            series
                .iter()
                .filter(|(key, _)| field.map_or(true, |f| key.field == f))
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect()
        };

        match self {
            PnlTable::Aggregate { label, values } => {
                let values = match entity {
                    Some(e) if label.as_deref() != Some(e) => PnlSeries::new(),
                    _ => keep(values),
                };
                PnlTable::Aggregate {
                    label: label.clone(),
                    values,
                }
            }
            PnlTable::Detailed(entities) => match entity {
                Some(e) => match entities.get_key_value(e) {
                    Some((name, series)) => PnlTable::Aggregate {
                        label: Some(name.clone()),
                        values: keep(series),
                    },
                    None => PnlTable::Detailed(BTreeMap::new()),
                },
                None => PnlTable::Detailed(
                    entities
                        .iter()
                        .map(|(name, series)| (name.clone(), keep(series)))
                        .collect(),
                ),
            },
        }
    }
}
