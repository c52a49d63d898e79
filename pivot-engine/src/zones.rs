//! FILENAME: pivot-engine/src/zones.rs
//! Zone Assignment State - which field plays which role.
//!
//! One `ZoneLayout` exists per open pivot view. It owns the five zone
//! sequences outright and funnels every mutation through the transfer
//! protocol below, which keeps the closed-world partition invariant:
//! every catalog field sits in exactly one zone at all times.
//!
//! Each applied mutation returns the new `PivotConfig` snapshot and,
//! strictly after the state change, hands the same snapshot to the
//! optional change listener. Contract violations leave the state
//! untouched and are reported as `TransferError` plus a warn-level
//! diagnostic.

use std::collections::HashSet;

use log::{debug, warn};
use thiserror::Error;

use crate::definition::{Aggregation, Field, PivotConfig, Zone};

// ============================================================================
// ERRORS
// ============================================================================

/// Caller contract violations reported by transfer operations.
///
/// State is never modified when one of these is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransferError {
    #[error("field '{0}' is not in the catalog")]
    UnknownField(String),

    #[error("field '{field_id}' is not in the {zone} zone")]
    FieldNotInZone { field_id: String, zone: Zone },

    #[error("field '{0}' is not in the values zone")]
    NotInValues(String),

    #[error("fields return to available via remove, not assign")]
    AssignIntoAvailable,

    #[error("field '{0}' appears in more than one zone of the configuration")]
    DuplicateField(String),
}

// ============================================================================
// ZONE LAYOUT
// ============================================================================

/// Change listener invoked with the snapshot after each applied mutation.
pub type ConfigListener = Box<dyn FnMut(&PivotConfig)>;

/// The zone assignment state machine.
pub struct ZoneLayout {
    /// The immutable session catalog, in schema order.
    catalog: Vec<Field>,

    /// One owned ordered sequence per zone, indexed by `Zone::slot`.
    slots: [Vec<Field>; 5],

    /// Optional observer for the rendering/recomputation layer.
    listener: Option<ConfigListener>,
}

impl std::fmt::Debug for ZoneLayout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut s = f.debug_struct("ZoneLayout");
        for zone in Zone::ALL {
            let ids: Vec<&str> = self.slots[zone.slot()].iter().map(|x| x.id.as_str()).collect();
            s.field(zone.as_str(), &ids);
        }
        s.finish_non_exhaustive()
    }
}

impl ZoneLayout {
    /// Creates the session layout with every catalog field in `available`.
    ///
    /// Catalog field ids must be unique; the catalog itself is immutable
    /// for the lifetime of the layout.
    pub fn new(catalog: Vec<Field>) -> Self {
        let available = initial_available(&catalog);
        ZoneLayout {
            catalog,
            slots: [available, Vec::new(), Vec::new(), Vec::new(), Vec::new()],
            listener: None,
        }
    }

    /// Registers the change listener, replacing any previous one.
    pub fn set_listener(&mut self, listener: ConfigListener) {
        self.listener = Some(listener);
    }

    /// The session catalog, in schema order.
    pub fn catalog(&self) -> &[Field] {
        &self.catalog
    }

    /// The ordered fields currently in `zone`.
    pub fn fields(&self, zone: Zone) -> &[Field] {
        &self.slots[zone.slot()]
    }

    /// Snapshot of the current configuration.
    pub fn config(&self) -> PivotConfig {
        PivotConfig {
            rows: self.slots[Zone::Rows.slot()].clone(),
            columns: self.slots[Zone::Columns.slot()].clone(),
            values: self.slots[Zone::Values.slot()].clone(),
            filters: self.slots[Zone::Filters.slot()].clone(),
        }
    }

    // ========================================================================
    // TRANSFER PROTOCOL
    // ========================================================================

    /// Moves a field from whichever zone currently holds it into
    /// `target` at `index` (clamped to append when omitted or past the
    /// end).
    ///
    /// Entering `values` without an aggregation defaults it to `Sum`;
    /// leaving `values` clears it. Assigning to the position the field
    /// already occupies is a valid no-op that fires no notification.
    /// `available` is not a valid target: fields return there via
    /// [`ZoneLayout::remove`].
    pub fn assign(
        &mut self,
        field_id: &str,
        target: Zone,
        index: Option<usize>,
    ) -> Result<PivotConfig, TransferError> {
        if target == Zone::Available {
            warn!(target: "pivot", "assign: '{}' into available rejected, use remove", field_id);
            return Err(TransferError::AssignIntoAvailable);
        }

        let (source, at) = self.locate(field_id).ok_or_else(|| {
            warn!(target: "pivot", "assign: unknown field '{}'", field_id);
            TransferError::UnknownField(field_id.to_string())
        })?;

        let mut field = self.slots[source.slot()].remove(at);
        let target_len = self.slots[target.slot()].len();
        let insert_at = index.unwrap_or(target_len).min(target_len);

        if source == target && insert_at == at {
            self.slots[source.slot()].insert(at, field);
            return Ok(self.config());
        }

        if target == Zone::Values {
            field.aggregation.get_or_insert(Aggregation::Sum);
        } else if source == Zone::Values {
            field.aggregation = None;
        }

        self.slots[target.slot()].insert(insert_at, field);
        debug!(
            target: "pivot",
            "assign '{}': {} -> {} at {}",
            field_id, source, target, insert_at
        );
        Ok(self.commit())
    }

    /// Moves the element at `from` to `to` within one zone, shifting the
    /// elements between them.
    ///
    /// Silent no-op when `from` is out of bounds, when the clamped
    /// indices are equal, or for `available` (reordering there carries
    /// no semantic weight).
    pub fn reorder(&mut self, zone: Zone, from: usize, to: usize) -> PivotConfig {
        if zone == Zone::Available {
            return self.config();
        }

        let len = self.slots[zone.slot()].len();
        if from >= len {
            return self.config();
        }
        let to = to.min(len - 1);
        if from == to {
            return self.config();
        }

        let field = self.slots[zone.slot()].remove(from);
        self.slots[zone.slot()].insert(to, field);
        debug!(target: "pivot", "reorder {}: {} -> {}", zone, from, to);
        self.commit()
    }

    /// Removes the field from `zone` and appends it to `available` with
    /// its aggregation cleared.
    ///
    /// Errors if the field is not currently in `zone`. Removing from
    /// `available` itself is a valid no-op: the field is already where
    /// remove would put it.
    pub fn remove(&mut self, zone: Zone, field_id: &str) -> Result<PivotConfig, TransferError> {
        let at = self.slots[zone.slot()]
            .iter()
            .position(|f| f.id == field_id)
            .ok_or_else(|| {
                warn!(target: "pivot", "remove: '{}' not in {}", field_id, zone);
                TransferError::FieldNotInZone {
                    field_id: field_id.to_string(),
                    zone,
                }
            })?;

        if zone == Zone::Available {
            return Ok(self.config());
        }

        let mut field = self.slots[zone.slot()].remove(at);
        field.aggregation = None;
        self.slots[Zone::Available.slot()].push(field);
        debug!(target: "pivot", "remove '{}' from {}", field_id, zone);
        Ok(self.commit())
    }

    /// Replaces the aggregation of a field currently in `values`.
    pub fn set_aggregation(
        &mut self,
        field_id: &str,
        aggregation: Aggregation,
    ) -> Result<PivotConfig, TransferError> {
        let values = Zone::Values.slot();
        let at = self.slots[values]
            .iter()
            .position(|f| f.id == field_id)
            .ok_or_else(|| {
                warn!(target: "pivot", "set_aggregation: '{}' not in values", field_id);
                TransferError::NotInValues(field_id.to_string())
            })?;

        if self.slots[values][at].aggregation == Some(aggregation) {
            return Ok(self.config());
        }

        self.slots[values][at].aggregation = Some(aggregation);
        debug!(target: "pivot", "set_aggregation '{}' = {}", field_id, aggregation);
        Ok(self.commit())
    }

    /// Returns every field to `available` in catalog order, clearing
    /// aggregations. Restores the initial partition.
    pub fn reset_all(&mut self) -> PivotConfig {
        for zone in [Zone::Rows, Zone::Columns, Zone::Values, Zone::Filters] {
            self.slots[zone.slot()].clear();
        }
        self.slots[Zone::Available.slot()] = initial_available(&self.catalog);
        debug!(target: "pivot", "reset_all");
        self.commit()
    }

    /// Replaces the whole zone assignment with `config` - the
    /// persistence boundary's re-seed path, equivalent to a reset
    /// followed by re-assigning every field the configuration names.
    ///
    /// Validates up front: a config naming an unknown field id, or the
    /// same field in two zones, is rejected whole with the state left
    /// untouched. Catalog fields the config does not name land in
    /// `available` in catalog order.
    pub fn replace_config(&mut self, config: &PivotConfig) -> Result<PivotConfig, TransferError> {
        let mut assigned: HashSet<&str> = HashSet::new();
        for (_, field) in config.iter_fields() {
            if !self.catalog.iter().any(|c| c.id == field.id) {
                warn!(target: "pivot", "replace_config: unknown field '{}'", field.id);
                return Err(TransferError::UnknownField(field.id.clone()));
            }
            if !assigned.insert(field.id.as_str()) {
                warn!(target: "pivot", "replace_config: duplicate field '{}'", field.id);
                return Err(TransferError::DuplicateField(field.id.clone()));
            }
        }

        self.slots[Zone::Rows.slot()] = self.seeded(&config.rows, Zone::Rows);
        self.slots[Zone::Columns.slot()] = self.seeded(&config.columns, Zone::Columns);
        self.slots[Zone::Values.slot()] = self.seeded(&config.values, Zone::Values);
        self.slots[Zone::Filters.slot()] = self.seeded(&config.filters, Zone::Filters);
        self.slots[Zone::Available.slot()] = self
            .catalog
            .iter()
            .filter(|f| !assigned.contains(f.id.as_str()))
            .map(|f| Field {
                aggregation: None,
                ..f.clone()
            })
            .collect();

        debug!(
            target: "pivot",
            "replace_config: {} rows, {} columns, {} values, {} filters",
            config.rows.len(),
            config.columns.len(),
            config.values.len(),
            config.filters.len()
        );
        Ok(self.commit())
    }

    // ========================================================================
    // INTERNALS
    // ========================================================================

    /// Finds the zone and position currently holding `field_id`.
    fn locate(&self, field_id: &str) -> Option<(Zone, usize)> {
        for zone in Zone::ALL {
            if let Some(at) = self.slots[zone.slot()].iter().position(|f| f.id == field_id) {
                return Some((zone, at));
            }
        }
        None
    }

    /// Builds one zone's sequence from configuration entries, taking
    /// identity attributes from the catalog master and normalizing the
    /// aggregation for the destination zone.
    fn seeded(&self, entries: &[Field], zone: Zone) -> Vec<Field> {
        entries
            .iter()
            .map(|entry| {
                // Validated by replace_config before this runs.
                let master = self
                    .catalog
                    .iter()
                    .find(|c| c.id == entry.id)
                    .expect("config entry validated against catalog");
                Field {
                    aggregation: if zone == Zone::Values {
                        Some(entry.aggregation.unwrap_or_default())
                    } else {
                        None
                    },
                    ..master.clone()
                }
            })
            .collect()
    }

    /// Applies the post-mutation protocol: snapshot, then notify.
    fn commit(&mut self) -> PivotConfig {
        debug_assert!(self.partition_intact(), "zone partition invariant violated");
        let snapshot = self.config();
        if let Some(listener) = self.listener.as_mut() {
            listener(&snapshot);
        }
        snapshot
    }

    /// Whether the five zones still partition the catalog's id set.
    fn partition_intact(&self) -> bool {
        let mut ids: Vec<&str> = self
            .slots
            .iter()
            .flatten()
            .map(|f| f.id.as_str())
            .collect();
        ids.sort_unstable();
        let mut expected: Vec<&str> = self.catalog.iter().map(|f| f.id.as_str()).collect();
        expected.sort_unstable();
        ids == expected
    }
}

/// Initial `available` sequence: the catalog in schema order, with no
/// aggregation carried outside the values zone.
fn initial_available(catalog: &[Field]) -> Vec<Field> {
    catalog
        .iter()
        .map(|f| Field {
            aggregation: None,
            ..f.clone()
        })
        .collect()
}
