//! Flattening a sheet into column-name-keyed records.
//!
//! This is the contract every downstream consumer (charting, reports,
//! persistence) reads. Records are keyed by column *name*, so two columns
//! sharing a name collapse into one key and the later column's value wins.

use crate::cell::CellValue;
use crate::row::Row;
use crate::sheet::Sheet;
use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

/// One exported row: column name to value, in column order.
pub type Record = IndexMap<String, CellValue>;

/// Which rows an export covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Selection {
    #[default]
    All,
    /// Only selected rows; all rows when nothing is selected.
    SelectedOnly,
}

/// A record plus the row's selection flag, for analytics consumers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlaggedRecord {
    #[serde(flatten)]
    pub values: Record,
    #[serde(rename = "_selected")]
    pub selected: bool,
}

impl Sheet {
    /// Rows covered by `selection`, in display order.
    ///
    /// `SelectedOnly` with no selected rows falls back to every row so that
    /// an empty selection never exports nothing.
    pub fn rows_for(&self, selection: Selection) -> impl Iterator<Item = &Row> {
        let only_selected = selection == Selection::SelectedOnly && self.selected_count() > 0;
        self.rows()
            .iter()
            .filter(move |row| !only_selected || row.selected)
    }

    /// Flatten rows into records keyed by column name.
    #[must_use]
    pub fn export(&self, selection: Selection) -> Vec<Record> {
        self.rows_for(selection)
            .map(|row| self.record_for(row))
            .collect()
    }

    /// Like [`Sheet::export`], carrying each row's `_selected` flag.
    #[must_use]
    pub fn export_with_flags(&self, selection: Selection) -> Vec<FlaggedRecord> {
        self.rows_for(selection)
            .map(|row| FlaggedRecord {
                values: self.record_for(row),
                selected: row.selected,
            })
            .collect()
    }

    /// Distinct column names in first-seen order; the keys every record has.
    #[must_use]
    pub fn export_names(&self) -> Vec<&str> {
        self.columns()
            .iter()
            .map(|c| c.name.as_str())
            .collect::<IndexSet<_>>()
            .into_iter()
            .collect()
    }

    fn record_for(&self, row: &Row) -> Record {
        let mut record = IndexMap::with_capacity(self.col_count());
        for column in self.columns() {
            record.insert(column.name.clone(), row.get(&column.id).clone());
        }
        record
    }
}
