use crate::cell::CellValue;
use crate::id::ColumnId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Declared type of a column. Controls coercion on cell writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    #[default]
    Text,
    Number,
}

impl ColumnKind {
    /// The other kind (Text <-> Number).
    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            ColumnKind::Text => ColumnKind::Number,
            ColumnKind::Number => ColumnKind::Text,
        }
    }

    /// Convert raw user input to the value stored for this kind.
    ///
    /// Number columns never hold a non-numeric value: unparseable input
    /// becomes `Absent`. Text columns store the input verbatim.
    #[must_use]
    pub fn coerce(self, raw: &str) -> CellValue {
        match self {
            ColumnKind::Number => CellValue::number_from_input(raw),
            ColumnKind::Text => CellValue::Text(raw.to_string()),
        }
    }
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnKind::Text => write!(f, "text"),
            ColumnKind::Number => write!(f, "number"),
        }
    }
}

/// A column definition. `id` is permanent; `name` and `kind` are editable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub id: ColumnId,
    pub name: String,
    pub kind: ColumnKind,
}

impl Column {
    /// Create a column with a fresh id
    #[must_use]
    pub fn new(name: &str, kind: ColumnKind) -> Self {
        Column {
            id: ColumnId::fresh(),
            name: name.to_string(),
            kind,
        }
    }
}
