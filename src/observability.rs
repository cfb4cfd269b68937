use std::net::SocketAddr;

// ── Resolution passes ───────────────────────────────────────────

/// Counter: resolution passes. Labels: status.
pub const RESOLVE_PASSES_TOTAL: &str = "weekgrid_resolve_passes_total";

/// Histogram: resolution pass latency in seconds.
pub const RESOLVE_DURATION_SECONDS: &str = "weekgrid_resolve_duration_seconds";

/// Counter: teacher-assignment lookups issued (one per attempt).
pub const ASSIGNMENT_LOOKUPS_TOTAL: &str = "weekgrid_assignment_lookups_total";

/// Counter: lookups that fell back to the sentinel. Labels: reason.
pub const ASSIGNMENT_FALLBACKS_TOTAL: &str = "weekgrid_assignment_fallbacks_total";

/// Counter: slots with a missing or out-of-range field. Labels: field.
pub const MALFORMED_SLOTS_TOTAL: &str = "weekgrid_malformed_slots_total";

// ── View state ──────────────────────────────────────────────────

/// Counter: finished passes dropped because the selection moved on.
pub const STALE_RESULTS_DISCARDED_TOTAL: &str = "weekgrid_stale_results_discarded_total";

/// Counter: events left out of a layout pass because of a bad day column.
pub const LAYOUT_EXCLUDED_EVENTS_TOTAL: &str = "weekgrid_layout_excluded_events_total";

/// Install Prometheus metrics exporter on the given port. No-op if port is None.
pub fn init(port: Option<u16>) -> Result<(), metrics_exporter_prometheus::BuildError> {
    let Some(port) = port else { return Ok(()) };
    let addr: SocketAddr = ([0, 0, 0, 0], port).into();
    metrics_exporter_prometheus::PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()?;
    tracing::info!("metrics endpoint: http://0.0.0.0:{port}/metrics");
    Ok(())
}
