//! FILENAME: pivot-engine/src/view.rs
//! Pivot Result - Cross-tabulated output for the frontend.
//!
//! The result is a plain immutable snapshot: a header row followed by a
//! matrix of cells, ready for the results table to render. It carries no
//! identity and is recomputed from scratch on every configuration or
//! dataset change.

use serde::{Deserialize, Serialize};

// ============================================================================
// RESULT CELLS
// ============================================================================

/// A single result cell: a row-key label or an aggregated number.
///
/// Untagged so the serialized matrix keeps the plain
/// `(string | number)[][]` shape the results table consumes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResultCell {
    Number(f64),
    Text(String),
}

impl ResultCell {
    pub fn text(s: impl Into<String>) -> Self {
        ResultCell::Text(s.into())
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            ResultCell::Number(n) => Some(*n),
            ResultCell::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            ResultCell::Text(s) => Some(s),
            ResultCell::Number(_) => None,
        }
    }
}

impl From<f64> for ResultCell {
    fn from(value: f64) -> Self {
        ResultCell::Number(value)
    }
}

impl From<&str> for ResultCell {
    fn from(value: &str) -> Self {
        ResultCell::Text(value.to_string())
    }
}

impl From<String> for ResultCell {
    fn from(value: String) -> Self {
        ResultCell::Text(value)
    }
}

// ============================================================================
// PIVOT RESULT
// ============================================================================

/// The cross-tabulated summary of one dataset under one configuration.
///
/// `headers` names every output column (row-field labels first, then one
/// aggregate column per fan-out value and value field); `rows` holds one
/// entry per group in first-seen order, cells aligned with `headers`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PivotResult {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<ResultCell>>,
}

impl PivotResult {
    /// The defined result for a degenerate configuration.
    pub fn empty() -> Self {
        PivotResult::default()
    }

    pub fn is_empty(&self) -> bool {
        self.headers.is_empty() && self.rows.is_empty()
    }
}
