//! FILENAME: report-model/src/value.rs
//! Scalar values carried by report records.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A single attribute value on a report record.
///
/// Report datasets are homogeneous: every record maps the same attribute
/// names to scalars of these shapes. Untagged variant order doubles as
/// deserialization priority, so `Date` must precede `Text` or ISO date
/// strings would never parse as dates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ReportValue {
    Empty,
    Number(f64),
    Boolean(bool),
    Date(NaiveDate),
    Text(String),
}

impl ReportValue {
    pub fn text(s: impl Into<String>) -> Self {
        ReportValue::Text(s.into())
    }

    /// Numeric reading of this value, if it has one.
    ///
    /// Text that parses as a number counts (a dataset column may arrive
    /// stringly-typed); booleans read as 0/1; dates and empty do not read
    /// as numbers.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            ReportValue::Number(n) => Some(*n),
            ReportValue::Text(s) => s.trim().parse::<f64>().ok(),
            ReportValue::Boolean(b) => Some(if *b { 1.0 } else { 0.0 }),
            ReportValue::Empty | ReportValue::Date(_) => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, ReportValue::Empty)
    }
}

impl std::fmt::Display for ReportValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReportValue::Empty => Ok(()),
            ReportValue::Number(n) => write!(f, "{}", n),
            ReportValue::Text(s) => f.write_str(s),
            ReportValue::Boolean(b) => write!(f, "{}", b),
            ReportValue::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
        }
    }
}

impl From<f64> for ReportValue {
    fn from(value: f64) -> Self {
        ReportValue::Number(value)
    }
}

impl From<i64> for ReportValue {
    fn from(value: i64) -> Self {
        ReportValue::Number(value as f64)
    }
}

impl From<&str> for ReportValue {
    fn from(value: &str) -> Self {
        ReportValue::Text(value.to_string())
    }
}

impl From<String> for ReportValue {
    fn from(value: String) -> Self {
        ReportValue::Text(value)
    }
}

impl From<bool> for ReportValue {
    fn from(value: bool) -> Self {
        ReportValue::Boolean(value)
    }
}

impl From<NaiveDate> for ReportValue {
    fn from(value: NaiveDate) -> Self {
        ReportValue::Date(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_coercion() {
        assert_eq!(ReportValue::Number(12.5).as_number(), Some(12.5));
        assert_eq!(ReportValue::text("42").as_number(), Some(42.0));
        assert_eq!(ReportValue::text(" 3.5 ").as_number(), Some(3.5));
        assert_eq!(ReportValue::text("NSE").as_number(), None);
        assert_eq!(ReportValue::Boolean(true).as_number(), Some(1.0));
        assert_eq!(ReportValue::Empty.as_number(), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(ReportValue::text("CLI001").to_string(), "CLI001");
        assert_eq!(ReportValue::Number(100.0).to_string(), "100");
        assert_eq!(ReportValue::Number(0.25).to_string(), "0.25");
        assert_eq!(ReportValue::Empty.to_string(), "");
        let d = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        assert_eq!(ReportValue::Date(d).to_string(), "2024-03-15");
    }

    #[test]
    fn test_untagged_serialization() {
        let json = serde_json::to_string(&ReportValue::Number(10.0)).unwrap();
        assert_eq!(json, "10.0");
        let json = serde_json::to_string(&ReportValue::text("NSE")).unwrap();
        assert_eq!(json, "\"NSE\"");
    }
}
