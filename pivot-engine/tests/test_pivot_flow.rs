//! FILENAME: tests/test_pivot_flow.rs
//! Integration tests for the full configure-then-calculate flow.

use std::cell::RefCell;
use std::rc::Rc;

use pivot_engine::{
    calculate_pivot, client_risk_catalog, Aggregation, PivotConfig, ResultCell,
    SavedConfigRegistry, Zone, ZoneLayout,
};
use report_model::ReportRecord;

// ============================================================================
// FIXTURES
// ============================================================================

/// A small client-wise risk dataset in the shape the report layer feeds
/// the pivot view.
fn risk_dataset() -> Vec<ReportRecord> {
    let row = |client: &str, exchange: &str, symbol: &str, mtm: f64, delta: f64| {
        ReportRecord::new()
            .with("clientId", client)
            .with("exchange", exchange)
            .with("symbol", symbol)
            .with("mtm", mtm)
            .with("delta", delta)
    };

    vec![
        row("CLI001", "NSE", "RELIANCE", 125_000.0, 0.45),
        row("CLI001", "BSE", "TCS", -15_000.0, -0.10),
        row("CLI002", "NSE", "INFY", 48_000.0, 0.22),
        row("CLI002", "NSE", "RELIANCE", 12_000.0, 0.05),
        row("CLI003", "MCX", "GOLD", 310_000.0, 0.80),
    ]
}

fn create_session() -> ZoneLayout {
    ZoneLayout::new(client_risk_catalog())
}

// ============================================================================
// CONFIGURE-THEN-CALCULATE
// ============================================================================

#[test]
fn test_drag_configure_and_calculate() {
    let mut layout = create_session();

    layout.assign("clientId", Zone::Rows, None).unwrap();
    layout.assign("exchange", Zone::Columns, None).unwrap();
    let config = layout.assign("mtm", Zone::Values, None).unwrap();

    let result = calculate_pivot(&config, &risk_dataset());
    assert_eq!(
        result.headers,
        [
            "Client ID",
            "NSE - sum(MTM)",
            "BSE - sum(MTM)",
            "MCX - sum(MTM)",
        ]
    );
    assert_eq!(result.rows.len(), 3);

    // CLI002 trades NSE only; the other venue crossings are zero-filled.
    let cli002 = &result.rows[1];
    assert_eq!(cli002[0], ResultCell::text("CLI002"));
    assert_eq!(cli002[1], ResultCell::Number(60_000.0));
    assert_eq!(cli002[2], ResultCell::Number(0.0));
    assert_eq!(cli002[3], ResultCell::Number(0.0));
}

#[test]
fn test_listener_drives_recalculation() {
    let results: Rc<RefCell<Vec<usize>>> = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&results);
    let dataset = risk_dataset();

    let mut layout = create_session();
    layout.set_listener(Box::new(move |config: &PivotConfig| {
        // The owning view recomputes on every notification.
        let result = calculate_pivot(config, &dataset);
        sink.borrow_mut().push(result.rows.len());
    }));

    layout.assign("clientId", Zone::Rows, None).unwrap();
    layout.assign("mtm", Zone::Values, None).unwrap();
    layout.assign("exchange", Zone::Rows, None).unwrap();

    // Degenerate until values is populated, then 3 client groups, then
    // client x exchange groups.
    assert_eq!(*results.borrow(), [0, 3, 4]);
}

#[test]
fn test_reconfiguration_changes_result() {
    let mut layout = create_session();
    let dataset = risk_dataset();

    layout.assign("clientId", Zone::Rows, None).unwrap();
    let config = layout.assign("mtm", Zone::Values, None).unwrap();
    let by_client = calculate_pivot(&config, &dataset);
    assert_eq!(by_client.headers, ["Client ID", "sum(MTM)"]);

    // Re-point the grouping at exchanges; nothing stale survives the
    // recomputation because results are rebuilt from scratch.
    layout.remove(Zone::Rows, "clientId").unwrap();
    let config = layout.assign("exchange", Zone::Rows, None).unwrap();
    let by_exchange = calculate_pivot(&config, &dataset);

    assert_eq!(by_exchange.headers, ["Exchange", "sum(MTM)"]);
    let keys: Vec<&str> = by_exchange
        .rows
        .iter()
        .map(|r| r[0].as_text().unwrap())
        .collect();
    assert_eq!(keys, ["NSE", "BSE", "MCX"]);
}

#[test]
fn test_average_delta_per_symbol() {
    let mut layout = create_session();

    layout.assign("symbol", Zone::Rows, None).unwrap();
    layout.assign("delta", Zone::Values, None).unwrap();
    let config = layout.set_aggregation("delta", Aggregation::Avg).unwrap();

    let result = calculate_pivot(&config, &risk_dataset());
    assert_eq!(result.headers, ["Symbol", "avg(Delta)"]);

    let reliance = result
        .rows
        .iter()
        .find(|r| r[0] == ResultCell::text("RELIANCE"))
        .unwrap();
    assert_eq!(reliance[1], ResultCell::Number(0.25));
}

// ============================================================================
// SAVE / LOAD ROUND TRIP
// ============================================================================

#[test]
fn test_saved_config_round_trip_reseeds_layout() {
    let mut layout = create_session();
    let mut registry = SavedConfigRegistry::new();

    layout.assign("clientId", Zone::Rows, None).unwrap();
    layout.assign("exchange", Zone::Columns, None).unwrap();
    layout.assign("riskLevel", Zone::Filters, None).unwrap();
    layout.assign("mtm", Zone::Values, None).unwrap();
    layout.set_aggregation("mtm", Aggregation::Max).unwrap();

    let id = registry
        .save("worst case by venue", None, layout.config())
        .id
        .clone();

    // The store hands the config back verbatim, possibly after a
    // serialization round trip.
    let json = serde_json::to_string(registry.get(&id).unwrap()).unwrap();
    let reloaded: pivot_engine::SavedPivotConfig = serde_json::from_str(&json).unwrap();

    let mut fresh = create_session();
    fresh.replace_config(&reloaded.config).unwrap();

    assert_eq!(fresh.config(), layout.config());
    let mtm = &fresh.fields(Zone::Values)[0];
    assert_eq!(mtm.aggregation, Some(Aggregation::Max));
}

#[test]
fn test_reset_then_reload_any_reachable_config() {
    let mut layout = create_session();

    layout.assign("exchange", Zone::Rows, Some(0)).unwrap();
    layout.assign("clientId", Zone::Rows, Some(0)).unwrap();
    layout.assign("delta", Zone::Values, None).unwrap();
    layout.assign("vega", Zone::Values, Some(0)).unwrap();
    layout.reorder(Zone::Rows, 0, 1);
    let saved = layout.config();

    layout.reset_all();
    assert!(layout.config().is_degenerate());

    layout.replace_config(&saved).unwrap();
    assert_eq!(layout.config(), saved);
}
