//! Stock analytics for stockgrid
//!
//! Reads the export projection of a sheet (records keyed by column name),
//! locates the stock, cost and name fields through alias lists, and
//! classifies each product against configurable thresholds.
//!
//! ```
//! use stockgrid_stock::{AliasTable, StockReport, StockThresholds};
//! use stockgrid_sheet::{CellValue, Record};
//!
//! let mut record = Record::new();
//! record.insert("Producto".to_string(), CellValue::from("Tornillo"));
//! record.insert("Stock".to_string(), CellValue::Number(4.0));
//!
//! let report = StockReport::build(&[record], &StockThresholds::default(), &AliasTable::default());
//! assert_eq!(report.low_products, vec!["Tornillo"]);
//! ```

mod aliases;
mod error;
mod report;
mod status;

pub use aliases::{find_field, AliasTable};
pub use error::{Result, StockError};
pub use report::{ProductLine, StockReport};
pub use status::{classify, StockStatus, StockThresholds};
