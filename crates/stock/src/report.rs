use crate::aliases::AliasTable;
use crate::status::{StockStatus, StockThresholds};
use serde::Serialize;
use stockgrid_sheet::{format_number, CellValue, Record};
use tracing::debug;

/// One classified product.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductLine {
    /// Product name, or `#N` (1-based record position) when the record has none
    pub name: String,
    pub stock: f64,
    pub cost: Option<f64>,
    pub status: StockStatus,
}

/// Stock summary over a set of exported records.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct StockReport {
    pub low: usize,
    pub correct: usize,
    pub high: usize,
    /// Records with no numeric stock value
    pub unclassified: usize,
    pub low_products: Vec<String>,
    pub high_products: Vec<String>,
    pub total_stock: f64,
    /// Mean over records that have a numeric cost
    pub mean_cost: Option<f64>,
    /// Sum of stock times cost over records that have both
    pub inventory_value: f64,
    pub lines: Vec<ProductLine>,
}

impl StockReport {
    /// Classify every record and aggregate the results.
    ///
    /// Numeric fields are read through [`CellValue::as_number`], so numeric
    /// text in a Text column still counts.
    #[must_use]
    pub fn build(records: &[Record], thresholds: &StockThresholds, aliases: &AliasTable) -> Self {
        let mut report = StockReport::default();
        let mut cost_sum = 0.0;
        let mut cost_count = 0usize;

        for (index, record) in records.iter().enumerate() {
            let cost = aliases.cost(record).and_then(CellValue::as_number);
            if let Some(c) = cost {
                cost_sum += c;
                cost_count += 1;
            }

            let Some(stock) = aliases.stock(record).and_then(CellValue::as_number) else {
                debug!(record = index, "no numeric stock, leaving unclassified");
                report.unclassified += 1;
                continue;
            };

            let name = product_name(record, aliases, index);
            let status = thresholds.classify(stock);
            match status {
                StockStatus::Low => {
                    report.low += 1;
                    report.low_products.push(name.clone());
                }
                StockStatus::Correct => report.correct += 1,
                StockStatus::High => {
                    report.high += 1;
                    report.high_products.push(name.clone());
                }
            }

            report.total_stock += stock;
            if let Some(c) = cost {
                report.inventory_value += stock * c;
            }
            report.lines.push(ProductLine {
                name,
                stock,
                cost,
                status,
            });
        }

        if cost_count > 0 {
            report.mean_cost = Some(cost_sum / cost_count as f64);
        }
        report
    }

    /// Number of classified products
    #[must_use]
    pub fn classified(&self) -> usize {
        self.low + self.correct + self.high
    }
}

fn product_name(record: &Record, aliases: &AliasTable, index: usize) -> String {
    match aliases.name(record) {
        Some(CellValue::Number(n)) => format_number(*n),
        Some(CellValue::Text(s)) if !s.trim().is_empty() => s.clone(),
        _ => format!("#{}", index + 1),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, stock: CellValue, cost: CellValue) -> Record {
        let mut r = Record::new();
        r.insert("Nombre".to_string(), CellValue::from(name));
        r.insert("Stock Actual".to_string(), stock);
        r.insert("Coste".to_string(), cost);
        r
    }

    #[test]
    fn test_report_counts_and_totals() {
        let records = vec![
            record("X", 5.into(), 2.into()),
            record("Y", 50.into(), 3.into()),
        ];
        let report = StockReport::build(
            &records,
            &StockThresholds::default(),
            &AliasTable::default(),
        );

        assert_eq!(report.low, 1);
        assert_eq!(report.correct, 1);
        assert_eq!(report.high, 0);
        assert_eq!(report.low_products, vec!["X"]);
        assert!((report.total_stock - 55.0).abs() < f64::EPSILON);
        assert_eq!(report.mean_cost, Some(2.5));
        assert!((report.inventory_value - 160.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_unclassified_and_text_numbers() {
        let records = vec![
            record("A", CellValue::Absent, 1.into()),
            record("B", "120".into(), CellValue::Absent),
            record("C", "n/a".into(), CellValue::Absent),
        ];
        let report = StockReport::build(
            &records,
            &StockThresholds::default(),
            &AliasTable::default(),
        );

        assert_eq!(report.unclassified, 2);
        assert_eq!(report.high_products, vec!["B"]);
        assert_eq!(report.classified(), 1);
        // A has a cost even though it has no stock
        assert_eq!(report.mean_cost, Some(1.0));
        assert!((report.inventory_value).abs() < f64::EPSILON);
    }

    #[test]
    fn test_missing_name_uses_position() {
        let mut r = Record::new();
        r.insert("Stock".to_string(), CellValue::Number(1.0));
        let report = StockReport::build(&[r], &StockThresholds::default(), &AliasTable::default());
        assert_eq!(report.low_products, vec!["#1"]);
    }

    #[test]
    fn test_empty_records() {
        let report = StockReport::build(&[], &StockThresholds::default(), &AliasTable::default());
        assert_eq!(report, StockReport::default());
        assert_eq!(report.mean_cost, None);
    }
}
