//! JSON support for the export contract.
//!
//! - Writing: array of objects `[{"Producto": "A", "Stock": 5}, ...]`, with
//!   `Absent` as `null`.
//! - Reading: the same shape back into a table, so an export can be
//!   re-imported without losing the absent/empty distinction.

use crate::cell::CellValue;
use crate::error::{Result, SheetError};
use crate::export::Selection;
use crate::import::{tables_to_sheets, RawTable};
use crate::sheet::Sheet;
use indexmap::IndexSet;
use serde_json::Value;
use std::io::Write;

impl Sheet {
    /// Write the export projection as a JSON array of objects
    pub fn write_json<W: Write>(&self, writer: W, selection: Selection, pretty: bool) -> Result<()> {
        let records = self.export(selection);
        if pretty {
            serde_json::to_writer_pretty(writer, &records)
                .map_err(|e| SheetError::Serialize(format!("JSON write error: {e}")))?;
        } else {
            serde_json::to_writer(writer, &records)
                .map_err(|e| SheetError::Serialize(format!("JSON write error: {e}")))?;
        }
        Ok(())
    }

    /// Convert the export projection to a JSON string
    pub fn to_json_string(&self, selection: Selection) -> Result<String> {
        let mut buffer = Vec::new();
        self.write_json(&mut buffer, selection, false)?;
        Ok(String::from_utf8_lossy(&buffer).to_string())
    }

    /// Convert the export projection to a pretty-printed JSON string
    pub fn to_json_string_pretty(&self, selection: Selection) -> Result<String> {
        let mut buffer = Vec::new();
        self.write_json(&mut buffer, selection, true)?;
        Ok(String::from_utf8_lossy(&buffer).to_string())
    }
}

/// Import a JSON array of objects as a single table named `name`.
///
/// Columns are the union of object keys in first-seen order. `null` and
/// missing keys are `Absent`.
pub fn import_json(bytes: &[u8], name: &str) -> Result<Vec<Sheet>> {
    let value: Value = serde_json::from_slice(bytes)
        .map_err(|e| SheetError::Parse(format!("Invalid JSON: {e}")))?;

    let array = value
        .as_array()
        .ok_or_else(|| SheetError::Parse("JSON must be an array of objects".to_string()))?;

    let mut objects = Vec::with_capacity(array.len());
    for (idx, item) in array.iter().enumerate() {
        let obj = item.as_object().ok_or_else(|| {
            SheetError::Parse(format!("Element at index {idx} must be an object"))
        })?;
        objects.push(obj);
    }

    let names: IndexSet<&String> = objects.iter().flat_map(|o| o.keys()).collect();
    if names.is_empty() {
        return tables_to_sheets(vec![RawTable::new(name, Vec::new())]);
    }

    let mut rows: Vec<Vec<CellValue>> = Vec::with_capacity(objects.len() + 1);
    rows.push(names.iter().map(|n| CellValue::Text((*n).clone())).collect());
    for obj in objects {
        rows.push(
            names
                .iter()
                .map(|n| obj.get(*n).map_or(CellValue::Absent, json_value_to_cell))
                .collect(),
        );
    }

    tables_to_sheets(vec![RawTable::new(name, rows)])
}

/// Convert a serde_json Value to a CellValue
fn json_value_to_cell(value: &Value) -> CellValue {
    match value {
        Value::Null => CellValue::Absent,
        Value::Number(n) => n
            .as_f64()
            .map_or_else(|| CellValue::Text(n.to_string()), CellValue::Number),
        Value::String(s) => CellValue::Text(s.clone()),
        Value::Bool(b) => CellValue::Text(b.to_string()),
        // For arrays and objects, convert to string representation
        Value::Array(_) | Value::Object(_) => CellValue::Text(value.to_string()),
    }
}
