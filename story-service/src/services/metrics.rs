//! Metrics collection and Prometheus export.
//!
//! Initializes the metrics exporter and provides the /metrics endpoint handler
//! plus the story-specific recording helpers.

use super::providers::ProviderError;
use anyhow::Context;
use metrics::{counter, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;
use std::time::Duration;

/// Global handle to the Prometheus recorder.
pub static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Initialize the metrics recorder.
///
/// Must be called once at startup, before any metrics are recorded. Until
/// then the recording helpers below are no-ops.
pub fn init_metrics() -> anyhow::Result<()> {
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .context("failed to install Prometheus recorder")?;

    METRICS_HANDLE
        .set(handle)
        .map_err(|_| anyhow::anyhow!("failed to set metrics handle: already initialized"))
}

/// Get the current metrics in Prometheus text format.
pub fn get_metrics() -> String {
    METRICS_HANDLE
        .get()
        .map(|handle| handle.render())
        .unwrap_or_else(|| "# Metrics recorder not initialized".to_string())
}

/// Record one outbound provider call.
pub fn record_provider_call(
    provider: &'static str,
    operation: &'static str,
    elapsed: Duration,
    error: Option<&ProviderError>,
) {
    let outcome = error.map(ProviderError::kind).unwrap_or("ok");

    counter!(
        "story_provider_requests_total",
        "provider" => provider,
        "operation" => operation,
        "outcome" => outcome
    )
    .increment(1);
    histogram!(
        "story_provider_latency_seconds",
        "provider" => provider,
        "operation" => operation
    )
    .record(elapsed.as_secs_f64());
}

pub fn record_story_generated(paragraphs: usize) {
    counter!("story_stories_generated_total").increment(1);
    histogram!("story_paragraphs_per_story").record(paragraphs as f64);
}

/// `outcome` is `generated` or `fallback`.
pub fn record_illustration(outcome: &'static str) {
    counter!("story_illustrations_total", "outcome" => outcome).increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recorder_installs_once() {
        init_metrics().unwrap();
        record_illustration("generated");
        assert!(get_metrics().contains("story_illustrations_total"));

        let err = init_metrics().unwrap_err();
        assert!(format!("{:#}", err).starts_with("failed to install Prometheus recorder"));
    }
}
