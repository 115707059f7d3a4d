use serde::{Deserialize, Serialize};
use std::fmt;

/// A single cell value.
///
/// `Absent` is a real "no value" and is distinct from `Number(0.0)` and from
/// `Text(String::new())`. It serializes as JSON `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Absent,
    Number(f64),
    Text(String),
}

impl CellValue {
    /// Check if the value is absent
    #[must_use]
    pub fn is_absent(&self) -> bool {
        matches!(self, CellValue::Absent)
    }

    /// Numeric view of the value.
    ///
    /// Text is re-parsed with [`parse_number`], so a column retyped to
    /// `Number` that still holds legacy text reads the same way everywhere.
    #[must_use]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            CellValue::Text(s) => parse_number(s),
            CellValue::Absent => None,
        }
    }

    /// Render the value for display; `Absent` renders as an empty string.
    #[must_use]
    pub fn as_str(&self) -> String {
        self.to_string()
    }

    /// Coerce raw user input for a `Number` column.
    ///
    /// Input that does not parse becomes `Absent`.
    #[must_use]
    pub fn number_from_input(raw: &str) -> CellValue {
        parse_number(raw).map_or(CellValue::Absent, CellValue::Number)
    }
}

/// Parse text as a finite number.
///
/// Surrounding whitespace is ignored. Empty input, `NaN` and infinities are
/// rejected.
#[must_use]
pub fn parse_number(s: &str) -> Option<f64> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|f| f.is_finite())
}

/// Render a number the way a user typed it: integral values have no `.0`.
#[must_use]
pub fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

impl Default for CellValue {
    fn default() -> Self {
        CellValue::Absent
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Absent => write!(f, ""),
            CellValue::Number(n) => write!(f, "{}", format_number(*n)),
            CellValue::Text(s) => write!(f, "{s}"),
        }
    }
}

impl From<f64> for CellValue {
    fn from(f: f64) -> Self {
        CellValue::Number(f)
    }
}

impl From<i32> for CellValue {
    fn from(i: i32) -> Self {
        CellValue::Number(f64::from(i))
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(s)
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(opt: Option<T>) -> Self {
        match opt {
            Some(v) => v.into(),
            None => CellValue::Absent,
        }
    }
}
