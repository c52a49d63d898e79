//! FILENAME: report-model/src/record.rs
//! Report records - flat attribute/value rows of a dataset.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::value::ReportValue;

/// One row of a report dataset: a flat mapping from attribute name to
/// scalar value.
///
/// Datasets are ordered sequences of records (`&[ReportRecord]`); the
/// source order is significant to consumers that group in first-seen
/// order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReportRecord {
    values: HashMap<String, ReportValue>,
}

impl ReportRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style attribute insertion.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<ReportValue>) -> Self {
        self.values.insert(name.into(), value.into());
        self
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<ReportValue>) {
        self.values.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&ReportValue> {
        self.values.get(name)
    }

    /// Display string of an attribute; absent attributes render empty.
    pub fn display(&self, name: &str) -> String {
        self.values
            .get(name)
            .map(|v| v.to_string())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl FromIterator<(String, ReportValue)> for ReportRecord {
    fn from_iter<T: IntoIterator<Item = (String, ReportValue)>>(iter: T) -> Self {
        ReportRecord {
            values: iter.into_iter().collect(),
        }
    }
}
