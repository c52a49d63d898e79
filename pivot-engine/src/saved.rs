//! FILENAME: pivot-engine/src/saved.rs
//! Saved Configurations - named snapshots an analyst keeps for reuse.
//!
//! The registry is an in-memory, insertion-ordered collection. How and
//! where it is persisted is the host application's concern; entries are
//! plain serializable values that round-trip verbatim, and loading one
//! is `get` followed by `ZoneLayout::replace_config`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::definition::PivotConfig;

/// A named pivot configuration with bookkeeping metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedPivotConfig {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub config: PivotConfig,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// In-memory store of saved configurations, in save order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SavedConfigRegistry {
    configs: Vec<SavedPivotConfig>,
}

impl SavedConfigRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `config` under a fresh id and returns the new entry.
    pub fn save(
        &mut self,
        name: impl Into<String>,
        description: Option<String>,
        config: PivotConfig,
    ) -> &SavedPivotConfig {
        let now = Utc::now();
        self.configs.push(SavedPivotConfig {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            description,
            config,
            created_at: now,
            updated_at: now,
        });
        self.configs.last().expect("entry just pushed")
    }

    pub fn get(&self, id: &str) -> Option<&SavedPivotConfig> {
        self.configs.iter().find(|c| c.id == id)
    }

    pub fn list(&self) -> &[SavedPivotConfig] {
        &self.configs
    }

    /// Deletes the entry with `id`; false when no such entry exists.
    pub fn delete(&mut self, id: &str) -> bool {
        let before = self.configs.len();
        self.configs.retain(|c| c.id != id);
        self.configs.len() < before
    }

    pub fn len(&self) -> usize {
        self.configs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.configs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::{Aggregation, Field};

    fn sample_config() -> PivotConfig {
        PivotConfig {
            rows: vec![Field::dimension("client", "Client")],
            columns: vec![],
            values: vec![Field {
                aggregation: Some(Aggregation::Avg),
                ..Field::measure("mtm", "MTM")
            }],
            filters: vec![],
        }
    }

    #[test]
    fn test_save_assigns_unique_ids() {
        let mut registry = SavedConfigRegistry::new();
        let a = registry.save("eod risk", None, sample_config()).id.clone();
        let b = registry.save("eod risk", None, sample_config()).id.clone();
        assert_ne!(a, b);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_get_and_delete() {
        let mut registry = SavedConfigRegistry::new();
        let id = registry
            .save("by exchange", Some("fan out per venue".to_string()), sample_config())
            .id
            .clone();

        assert_eq!(registry.get(&id).unwrap().name, "by exchange");
        assert!(registry.delete(&id));
        assert!(registry.get(&id).is_none());
        assert!(!registry.delete(&id));
    }

    #[test]
    fn test_entry_round_trips_through_json() {
        let mut registry = SavedConfigRegistry::new();
        registry.save("eod risk", None, sample_config());

        let json = serde_json::to_string(&registry).unwrap();
        let back: SavedConfigRegistry = serde_json::from_str(&json).unwrap();
        assert_eq!(back, registry);
        assert_eq!(back.list()[0].config, sample_config());
    }
}
