//! FILENAME: pivot-engine/src/definition.rs
//! Pivot Configuration - The serializable description of analyst intent.
//!
//! This module contains all the types needed to DESCRIBE a pivot:
//! which fields exist, which role each one plays, and how value fields
//! aggregate. These structures are designed to be:
//! - Serializable (for saved configurations)
//! - Sent to the rendering layer as plain snapshots
//! - Immutable views of the zone assignment state

use serde::{Deserialize, Serialize};

// ============================================================================
// AGGREGATION
// ============================================================================

/// Supported aggregation functions for value fields.
///
/// Serialized as the lowercase tags (`sum`, `avg`, ...) the rendering
/// layer and saved configurations use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Aggregation {
    Sum,
    Avg,
    Count,
    Min,
    Max,
}

impl Default for Aggregation {
    fn default() -> Self {
        Aggregation::Sum
    }
}

impl Aggregation {
    pub fn as_str(self) -> &'static str {
        match self {
            Aggregation::Sum => "sum",
            Aggregation::Avg => "avg",
            Aggregation::Count => "count",
            Aggregation::Min => "min",
            Aggregation::Max => "max",
        }
    }

    /// Reduces a sample set to a single number.
    ///
    /// Total over every variant; an empty sample set is 0 for all of
    /// them (including `avg`, which would otherwise divide by zero, and
    /// `min`/`max`, which have no natural extremum to report).
    pub fn apply(self, samples: &[f64]) -> f64 {
        match self {
            Aggregation::Sum => samples.iter().sum(),
            Aggregation::Avg => {
                if samples.is_empty() {
                    0.0
                } else {
                    samples.iter().sum::<f64>() / samples.len() as f64
                }
            }
            Aggregation::Count => samples.len() as f64,
            Aggregation::Min => samples.iter().copied().reduce(f64::min).unwrap_or(0.0),
            Aggregation::Max => samples.iter().copied().reduce(f64::max).unwrap_or(0.0),
        }
    }
}

impl std::fmt::Display for Aggregation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// FIELD DEFINITIONS
// ============================================================================

/// How a field can participate in the pivot.
///
/// `Dimension`/`Measure` are the report schema's role tags; the generic
/// scalar kinds appear when a schema types attributes directly. The tag
/// is advisory for the field list UI - the transfer protocol does not
/// gate assignment on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Dimension,
    Measure,
    #[serde(rename = "string")]
    Text,
    Number,
    Date,
}

impl FieldKind {
    /// Whether the field is groupable (rows/columns material).
    pub fn is_dimension(self) -> bool {
        matches!(self, FieldKind::Dimension | FieldKind::Text | FieldKind::Date)
    }

    /// Whether the field is aggregatable (values material).
    pub fn is_measure(self) -> bool {
        matches!(self, FieldKind::Measure | FieldKind::Number)
    }
}

/// One candidate pivot field from the report schema.
///
/// Fields are value types copied between zones. `aggregation` is only
/// meaningful while the field sits in the values zone: the transfer
/// protocol defaults it to `Sum` on entry and clears it on exit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    /// Stable unique identifier, never reused after catalog removal.
    pub id: String,

    /// The dataset attribute this field reads.
    pub name: String,

    /// Human-readable display text.
    pub label: String,

    /// Role tag from the report schema.
    pub kind: FieldKind,

    /// Reduction applied while this field is in the values zone.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aggregation: Option<Aggregation>,
}

impl Field {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        label: impl Into<String>,
        kind: FieldKind,
    ) -> Self {
        Field {
            id: id.into(),
            name: name.into(),
            label: label.into(),
            kind,
            aggregation: None,
        }
    }

    /// Dimension field whose id doubles as the attribute name.
    pub fn dimension(id: impl Into<String>, label: impl Into<String>) -> Self {
        let id = id.into();
        Field::new(id.clone(), id, label, FieldKind::Dimension)
    }

    /// Measure field whose id doubles as the attribute name.
    pub fn measure(id: impl Into<String>, label: impl Into<String>) -> Self {
        let id = id.into();
        Field::new(id.clone(), id, label, FieldKind::Measure)
    }

    /// The aggregation in effect for a values-zone field (`Sum` when
    /// none was chosen yet).
    pub fn effective_aggregation(&self) -> Aggregation {
        self.aggregation.unwrap_or_default()
    }
}

// ============================================================================
// ZONES
// ============================================================================

/// The five roles a field can occupy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Zone {
    Available,
    Rows,
    Columns,
    Values,
    Filters,
}

impl Zone {
    pub const ALL: [Zone; 5] = [
        Zone::Available,
        Zone::Rows,
        Zone::Columns,
        Zone::Values,
        Zone::Filters,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Zone::Available => "available",
            Zone::Rows => "rows",
            Zone::Columns => "columns",
            Zone::Values => "values",
            Zone::Filters => "filters",
        }
    }

    /// Slot index inside the zone layout.
    pub(crate) fn slot(self) -> usize {
        match self {
            Zone::Available => 0,
            Zone::Rows => 1,
            Zone::Columns => 2,
            Zone::Values => 3,
            Zone::Filters => 4,
        }
    }
}

impl std::fmt::Display for Zone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// CONFIGURATION SNAPSHOT
// ============================================================================

/// Point-in-time snapshot of the zone assignment.
///
/// This is what change notifications carry, what the calculator
/// consumes (`filters` is tracked but not computed), and what the
/// persistence boundary round-trips.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PivotConfig {
    pub rows: Vec<Field>,
    pub columns: Vec<Field>,
    pub values: Vec<Field>,
    #[serde(default)]
    pub filters: Vec<Field>,
}

impl PivotConfig {
    /// True when the calculator would produce an empty result.
    pub fn is_degenerate(&self) -> bool {
        self.rows.is_empty() || self.values.is_empty()
    }

    /// All fields named by this configuration, in zone order.
    pub fn iter_fields(&self) -> impl Iterator<Item = (Zone, &Field)> {
        let rows = self.rows.iter().map(|f| (Zone::Rows, f));
        let columns = self.columns.iter().map(|f| (Zone::Columns, f));
        let values = self.values.iter().map(|f| (Zone::Values, f));
        let filters = self.filters.iter().map(|f| (Zone::Filters, f));
        rows.chain(columns).chain(values).chain(filters)
    }
}

// ============================================================================
// REPORT CATALOG
// ============================================================================

/// The canonical field catalog of the client-wise risk report.
///
/// Supplied to `ZoneLayout::new` once per session; other reports bring
/// their own catalogs.
pub fn client_risk_catalog() -> Vec<Field> {
    vec![
        Field::dimension("exchange", "Exchange"),
        Field::dimension("clientId", "Client ID"),
        Field::dimension("clientName", "Client Name"),
        Field::dimension("symbol", "Symbol"),
        Field::dimension("riskLevel", "Risk Level"),
        Field::measure("mtm", "MTM"),
        Field::measure("marginUtilized", "Margin Utilized"),
        Field::measure("collateralAvailable", "Collateral Available"),
        Field::measure("collateralMarginUtilPerc", "Utilization %"),
        Field::measure("delta", "Delta"),
        Field::measure("gamma", "Gamma"),
        Field::measure("theta", "Theta"),
        Field::measure("vega", "Vega"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aggregation_apply() {
        let samples = [10.0, 20.0, 30.0];
        assert_eq!(Aggregation::Sum.apply(&samples), 60.0);
        assert_eq!(Aggregation::Avg.apply(&samples), 20.0);
        assert_eq!(Aggregation::Count.apply(&samples), 3.0);
        assert_eq!(Aggregation::Min.apply(&samples), 10.0);
        assert_eq!(Aggregation::Max.apply(&samples), 30.0);
    }

    #[test]
    fn test_aggregation_apply_empty() {
        for agg in [
            Aggregation::Sum,
            Aggregation::Avg,
            Aggregation::Count,
            Aggregation::Min,
            Aggregation::Max,
        ] {
            assert_eq!(agg.apply(&[]), 0.0, "{} of empty subset", agg);
        }
    }

    #[test]
    fn test_aggregation_tags() {
        let json = serde_json::to_string(&Aggregation::Avg).unwrap();
        assert_eq!(json, "\"avg\"");
        let back: Aggregation = serde_json::from_str("\"max\"").unwrap();
        assert_eq!(back, Aggregation::Max);
    }

    #[test]
    fn test_field_kind_tags() {
        assert_eq!(
            serde_json::to_string(&FieldKind::Text).unwrap(),
            "\"string\""
        );
        assert_eq!(
            serde_json::to_string(&FieldKind::Dimension).unwrap(),
            "\"dimension\""
        );
    }

    #[test]
    fn test_catalog_ids_unique() {
        let catalog = client_risk_catalog();
        let mut ids: Vec<&str> = catalog.iter().map(|f| f.id.as_str()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), catalog.len());
    }

    #[test]
    fn test_config_serialization_shape() {
        let config = PivotConfig {
            rows: vec![Field::dimension("clientId", "Client ID")],
            columns: vec![],
            values: vec![Field {
                aggregation: Some(Aggregation::Sum),
                ..Field::measure("mtm", "MTM")
            }],
            filters: vec![],
        };

        let json = serde_json::to_value(&config).unwrap();
        assert_eq!(json["values"][0]["aggregation"], "sum");
        // Cleared aggregations are omitted entirely, not serialized as null.
        assert!(json["rows"][0].get("aggregation").is_none());
    }
}
