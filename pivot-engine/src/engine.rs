//! FILENAME: pivot-engine/src/engine.rs
//! Aggregation Calculator - cross-tabulates a dataset under a configuration.
//!
//! This module takes a PivotConfig (the rows/columns/values assignment)
//! and a report dataset and produces a PivotResult (headers plus a
//! matrix of aggregated cells).
//!
//! Algorithm:
//! 1. Degenerate configurations (no row fields or no value fields) yield
//!    the empty result
//! 2. Collect the distinct fan-out values of the first column field, in
//!    first-seen order ("Total" sentinel when no column field is set)
//! 3. Build headers: row-field labels, then one aggregate header per
//!    fan-out value and value field
//! 4. Group records by the composite row key, preserving first-seen
//!    group order
//! 5. For each group x fan-out value x value field, aggregate the
//!    coerced measure samples
//!
//! The calculator is pure and total over its inputs: malformed or
//! missing measure values coerce to 0, never to an error.

use log::debug;
use rustc_hash::{FxHashMap, FxHashSet};
use smallvec::SmallVec;

use report_model::ReportRecord;

use crate::definition::{Field, PivotConfig};
use crate::view::{PivotResult, ResultCell};

/// Joins composite group keys. A control character cannot appear in
/// rendered field values, so key parts never collide.
const KEY_SEPARATOR: char = '\u{1F}';

/// Fan-out label standing in for "no column split".
const TOTAL_COLUMN: &str = "Total";

/// Composite key parts; pivots rarely group by more than a few fields.
type KeyParts = SmallVec<[String; 4]>;

// ============================================================================
// PUBLIC API
// ============================================================================

/// Calculates the cross-tabulated summary of `records` under `config`.
///
/// Pure function of its inputs; the `filters` zone is carried by the
/// configuration but not evaluated here. Output rows follow first-seen
/// group order and are never re-sorted.
pub fn calculate_pivot(config: &PivotConfig, records: &[ReportRecord]) -> PivotResult {
    if config.is_degenerate() {
        return PivotResult::empty();
    }

    let fan_out = column_fan_out(config.columns.first(), records);
    let headers = build_headers(config, &fan_out);
    let groups = group_by_row_key(&config.rows, records);

    let column_field = config.columns.first();
    let mut rows: Vec<Vec<ResultCell>> = Vec::with_capacity(groups.len());

    for group in &groups {
        let mut cells: Vec<ResultCell> = Vec::with_capacity(headers.len());
        cells.extend(group.key_parts.iter().cloned().map(ResultCell::Text));

        for fan_out_value in &fan_out {
            let subset: Vec<usize> = match column_field {
                Some(col) => group
                    .member_rows
                    .iter()
                    .copied()
                    .filter(|&i| records[i].display(&col.name) == *fan_out_value)
                    .collect(),
                None => group.member_rows.clone(),
            };

            for value_field in &config.values {
                let samples = measure_samples(records, &subset, value_field);
                let aggregated = value_field.effective_aggregation().apply(&samples);
                cells.push(ResultCell::Number(aggregated));
            }
        }

        rows.push(cells);
    }

    debug!(
        target: "pivot",
        "calculate_pivot: {} records -> {} groups x {} columns",
        records.len(),
        rows.len(),
        headers.len()
    );
    PivotResult { headers, rows }
}

// ============================================================================
// COLUMN FAN-OUT
// ============================================================================

/// Distinct display values of the first column field, in first-seen
/// order; a single "Total" sentinel when no column field is configured.
/// Column fields beyond the first do not fan out.
fn column_fan_out(column: Option<&Field>, records: &[ReportRecord]) -> Vec<String> {
    let column = match column {
        Some(column) => column,
        None => return vec![TOTAL_COLUMN.to_string()],
    };

    let mut seen: FxHashSet<String> = FxHashSet::default();
    let mut values = Vec::new();
    for record in records {
        let value = record.display(&column.name);
        if seen.insert(value.clone()) {
            values.push(value);
        }
    }
    values
}

/// Header row: one label per row field, then a composite header per
/// fan-out value and value field. The fan-out prefix is omitted when
/// there is no column split.
fn build_headers(config: &PivotConfig, fan_out: &[String]) -> Vec<String> {
    let split = !config.columns.is_empty();
    let mut headers: Vec<String> = config.rows.iter().map(|f| f.label.clone()).collect();

    for fan_out_value in fan_out {
        for value_field in &config.values {
            let aggregation = value_field.effective_aggregation();
            headers.push(if split {
                format!("{} - {}({})", fan_out_value, aggregation, value_field.label)
            } else {
                format!("{}({})", aggregation, value_field.label)
            });
        }
    }
    headers
}

// ============================================================================
// GROUPING
// ============================================================================

/// One output row in the making: the composite key's display parts and
/// the dataset indices of the records that share it.
struct RowGroup {
    key_parts: KeyParts,
    member_rows: Vec<usize>,
}

/// Groups the dataset by the composite key of the row fields' display
/// strings. Group order is first-seen, never sorted; it becomes the
/// output row order.
fn group_by_row_key(row_fields: &[Field], records: &[ReportRecord]) -> Vec<RowGroup> {
    let mut index: FxHashMap<String, usize> = FxHashMap::default();
    let mut groups: Vec<RowGroup> = Vec::new();

    for (row, record) in records.iter().enumerate() {
        let key_parts: KeyParts = row_fields.iter().map(|f| record.display(&f.name)).collect();
        let key = key_parts.join(&KEY_SEPARATOR.to_string());

        match index.get(&key) {
            Some(&at) => groups[at].member_rows.push(row),
            None => {
                index.insert(key, groups.len());
                groups.push(RowGroup {
                    key_parts,
                    member_rows: vec![row],
                });
            }
        }
    }
    groups
}

// ============================================================================
// AGGREGATION INPUT
// ============================================================================

/// The numeric samples a value field reads from a record subset.
/// Missing or non-numeric attributes coerce to 0.
fn measure_samples(records: &[ReportRecord], subset: &[usize], value_field: &Field) -> Vec<f64> {
    subset
        .iter()
        .map(|&i| {
            records[i]
                .get(&value_field.name)
                .and_then(|v| v.as_number())
                .unwrap_or(0.0)
        })
        .collect()
}
