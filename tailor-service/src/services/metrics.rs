//! Prometheus metrics bootstrap.
//!
//! The recorder is process-global. Tests that spawn the application skip
//! [`init_metrics`]; the `metrics` macros degrade to no-ops without a
//! recorder and [`get_metrics`] renders an empty exposition.

use std::sync::OnceLock;

use metrics::describe_counter;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

pub fn init_metrics() {
    METRICS_HANDLE.get_or_init(|| {
        let handle = PrometheusBuilder::new()
            .install_recorder()
            .expect("Failed to install Prometheus metrics recorder");

        describe_counter!("bills_created_total", "Bills created");
        describe_counter!("bills_deleted_total", "Bills deleted (with job cascade)");
        describe_counter!(
            "workflow_jobs_spawned_total",
            "Workflow jobs spawned automatically for new bills"
        );
        describe_counter!(
            "workflow_stage_transitions_total",
            "Stage moves, labelled by direction"
        );
        describe_counter!("http_requests_total", "HTTP requests by method, path and status");

        handle
    });
}

pub fn get_metrics() -> String {
    METRICS_HANDLE
        .get()
        .map(|handle| handle.render())
        .unwrap_or_default()
}
