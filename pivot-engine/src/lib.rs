//! FILENAME: pivot-engine/src/lib.rs
//! Pivot configuration subsystem for the risk dashboard.
//!
//! This crate provides the pivot configuration engine as a standalone
//! module, separate from the dashboard shell. It depends on
//! `report-model` only for shared types (ReportValue, ReportRecord).
//!
//! Layers:
//! - `definition`: Serializable configuration (what the pivot IS)
//! - `zones`: Zone assignment state and transfer protocol (HOW fields move)
//! - `engine`: Aggregation calculator (HOW we calculate)
//! - `view`: Cross-tabulated output for the frontend (WHAT we display)
//! - `saved`: Named configurations kept for reuse

pub mod definition;
pub mod engine;
pub mod saved;
pub mod view;
pub mod zones;

pub use definition::*;
pub use engine::calculate_pivot;
pub use saved::{SavedConfigRegistry, SavedPivotConfig};
pub use view::*;
pub use zones::{ConfigListener, TransferError, ZoneLayout};
