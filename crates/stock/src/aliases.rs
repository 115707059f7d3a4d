//! Locating well-known fields in records with caller-defined column names.

use crate::error::{Result, StockError};
use serde::{Deserialize, Serialize};
use stockgrid_sheet::{CellValue, Record};

/// Column names accepted for each field, highest priority first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AliasTable {
    pub stock: Vec<String>,
    pub cost: Vec<String>,
    pub name: Vec<String>,
}

impl Default for AliasTable {
    fn default() -> Self {
        AliasTable {
            stock: strings(&["Stock Actual", "stock_actual", "Stock"]),
            cost: strings(&["Coste Unit.", "coste_unitario", "Coste", "Precio"]),
            name: strings(&["Producto", "Nombre", "producto", "nombre", "Name"]),
        }
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_string()).collect()
}

impl AliasTable {
    /// Reject alias lists that could never match anything
    pub fn validate(&self) -> Result<()> {
        for (field, list) in [("stock", &self.stock), ("cost", &self.cost), ("name", &self.name)] {
            if list.iter().all(|a| a.trim().is_empty()) {
                return Err(StockError::EmptyAliases { field });
            }
        }
        Ok(())
    }

    /// Get the stock value of a record
    #[must_use]
    pub fn stock<'r>(&self, record: &'r Record) -> Option<&'r CellValue> {
        find_field(record, &self.stock)
    }

    /// Get the unit cost of a record
    #[must_use]
    pub fn cost<'r>(&self, record: &'r Record) -> Option<&'r CellValue> {
        find_field(record, &self.cost)
    }

    /// Get the product name of a record
    #[must_use]
    pub fn name<'r>(&self, record: &'r Record) -> Option<&'r CellValue> {
        find_field(record, &self.name)
    }
}

/// Find the first alias present in `record` with a value.
///
/// All aliases are tried for an exact key match, in order, before a second
/// pass that compares trimmed keys case-insensitively. `Absent` values count
/// as missing so a later alias can still match.
#[must_use]
pub fn find_field<'r, S: AsRef<str>>(record: &'r Record, aliases: &[S]) -> Option<&'r CellValue> {
    let exact = aliases
        .iter()
        .filter_map(|alias| record.get(alias.as_ref()))
        .find(|value| !value.is_absent());
    if exact.is_some() {
        return exact;
    }

    aliases.iter().find_map(|alias| {
        let wanted = alias.as_ref().trim().to_lowercase();
        record
            .iter()
            .find(|(key, value)| key.trim().to_lowercase() == wanted && !value.is_absent())
            .map(|(_, value)| value)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(pairs: &[(&str, CellValue)]) -> Record {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_exact_match_in_priority_order() {
        let r = record(&[("Stock", 3.into()), ("Stock Actual", 7.into())]);
        let aliases = AliasTable::default();
        assert_eq!(aliases.stock(&r), Some(&CellValue::Number(7.0)));
    }

    #[test]
    fn test_case_insensitive_fallback() {
        let r = record(&[(" STOCK ACTUAL ", 4.into()), ("precio", 1.5.into())]);
        let aliases = AliasTable::default();
        assert_eq!(aliases.stock(&r), Some(&CellValue::Number(4.0)));
        assert_eq!(aliases.cost(&r), Some(&CellValue::Number(1.5)));
    }

    #[test]
    fn test_exact_match_beats_earlier_fuzzy_alias() {
        // "coste unit." only matches fuzzily; "Precio" matches exactly
        let r = record(&[("coste unit.", 9.into()), ("Precio", 2.into())]);
        assert_eq!(AliasTable::default().cost(&r), Some(&CellValue::Number(2.0)));
    }

    #[test]
    fn test_absent_value_falls_through() {
        let r = record(&[("Stock Actual", CellValue::Absent), ("Stock", 12.into())]);
        assert_eq!(
            AliasTable::default().stock(&r),
            Some(&CellValue::Number(12.0))
        );
    }

    #[test]
    fn test_no_match() {
        let r = record(&[("Cantidad", 1.into())]);
        assert_eq!(AliasTable::default().stock(&r), None);
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let aliases: AliasTable = serde_yaml::from_str("stock: [Existencias]").unwrap();
        assert_eq!(aliases.stock, vec!["Existencias"]);
        assert_eq!(aliases.cost, AliasTable::default().cost);
        aliases.validate().unwrap();
    }

    #[test]
    fn test_validate_rejects_empty_list() {
        let aliases = AliasTable {
            cost: Vec::new(),
            ..AliasTable::default()
        };
        assert_eq!(
            aliases.validate(),
            Err(StockError::EmptyAliases { field: "cost" })
        );
    }
}
