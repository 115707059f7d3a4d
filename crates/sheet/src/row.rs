use crate::cell::CellValue;
use crate::column::Column;
use crate::id::{ColumnId, RowId};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A row of cells keyed by column id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Row {
    pub id: RowId,
    pub cells: IndexMap<ColumnId, CellValue>,
    #[serde(default)]
    pub selected: bool,
}

impl Row {
    /// Create an unselected row with an `Absent` cell for every column.
    #[must_use]
    pub fn blank(columns: &[Column]) -> Self {
        Row {
            id: RowId::fresh(),
            cells: columns
                .iter()
                .map(|c| (c.id.clone(), CellValue::Absent))
                .collect(),
            selected: false,
        }
    }

    /// Get the value stored for a column; missing keys read as `Absent`.
    #[must_use]
    pub fn get(&self, column_id: &ColumnId) -> &CellValue {
        static ABSENT: CellValue = CellValue::Absent;
        self.cells.get(column_id).unwrap_or(&ABSENT)
    }
}
