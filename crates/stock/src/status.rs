use crate::error::{Result, StockError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Where a product's stock sits relative to its thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockStatus {
    Low,
    Correct,
    High,
}

impl fmt::Display for StockStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StockStatus::Low => write!(f, "low"),
            StockStatus::Correct => write!(f, "correct"),
            StockStatus::High => write!(f, "high"),
        }
    }
}

/// Stock thresholds. `ideal` is informational and never affects
/// classification.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StockThresholds {
    pub minimum: f64,
    pub ideal: f64,
    pub maximum: f64,
}

impl Default for StockThresholds {
    fn default() -> Self {
        StockThresholds {
            minimum: 10.0,
            ideal: 50.0,
            maximum: 100.0,
        }
    }
}

impl StockThresholds {
    /// Create thresholds, checking that they are finite and ordered
    pub fn new(minimum: f64, ideal: f64, maximum: f64) -> Result<Self> {
        let thresholds = StockThresholds {
            minimum,
            ideal,
            maximum,
        };
        thresholds.validate()?;
        Ok(thresholds)
    }

    /// Check that every threshold is finite and `minimum <= maximum`
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("minimum", self.minimum),
            ("ideal", self.ideal),
            ("maximum", self.maximum),
        ] {
            if !value.is_finite() {
                return Err(StockError::NonFiniteThreshold { name });
            }
        }
        if self.minimum > self.maximum {
            return Err(StockError::InvalidThresholds {
                minimum: self.minimum,
                maximum: self.maximum,
            });
        }
        Ok(())
    }

    /// Classify a stock quantity
    #[must_use]
    pub fn classify(&self, stock: f64) -> StockStatus {
        classify(stock, self)
    }
}

/// `Low` below the minimum, `High` at or above the maximum, `Correct`
/// in between.
#[must_use]
pub fn classify(stock: f64, thresholds: &StockThresholds) -> StockStatus {
    if stock < thresholds.minimum {
        StockStatus::Low
    } else if stock >= thresholds.maximum {
        StockStatus::High
    } else {
        StockStatus::Correct
    }
}
