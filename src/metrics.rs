//! Prometheus exposition for the service counters.
//!
//! Counters are emitted through the `metrics` facade. [`install_recorder`]
//! registers the Prometheus recorder globally and returns the handle that
//! `GET /metrics` renders.

use anyhow::{Context, Result};
use metrics::{Unit, describe_counter};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

/// Short codes assigned to new records.
pub const CODES_ALLOCATED: &str = "codes_allocated_total";
/// Generated codes that were already taken.
pub const CODE_COLLISIONS: &str = "code_collisions_total";
/// Placeholder records removed by a sweep.
pub const ORPHANS_SWEPT: &str = "orphans_swept_total";
/// Requests rejected by admission control.
pub const RATE_LIMITED: &str = "rate_limited_total";

/// Installs the global Prometheus recorder.
///
/// # Errors
///
/// Fails if a global recorder is already installed.
pub fn install_recorder() -> Result<PrometheusHandle> {
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .context("Failed to install Prometheus recorder")?;

    describe_counters();
    Ok(handle)
}

/// Registers help text for every counter with the active recorder.
pub fn describe_counters() {
    describe_counter!(CODES_ALLOCATED, Unit::Count, "Short codes assigned");
    describe_counter!(CODE_COLLISIONS, Unit::Count, "Generated codes already in use");
    describe_counter!(ORPHANS_SWEPT, Unit::Count, "Placeholder records deleted");
    describe_counter!(RATE_LIMITED, Unit::Count, "Requests rejected with 429");
}
