//! Prometheus metrics for the relay worker.

use prometheus::{
    register_int_counter_with_registry, register_int_gauge_with_registry, IntCounter, IntGauge,
    Opts, Registry,
};

/// Central collection of relay-service metrics, owned by one [`Registry`]
/// so the RPC `/metrics` endpoint can encode them.
pub struct RelayerMetrics {
    pub registry: Registry,

    /// Jobs accepted at intake (fresh rows only; duplicates excluded).
    pub jobs_registered: IntCounter,
    /// Jobs successfully submitted on-chain.
    pub jobs_processed: IntCounter,
    /// Jobs terminated as failed (permanent rejection or staleness sweep).
    pub jobs_failed: IntCounter,
    /// Jobs force-failed by the staleness sweep specifically.
    pub jobs_swept: IntCounter,
    /// Current number of pending jobs, sampled each poll cycle.
    pub pending_jobs: IntGauge,
}

impl RelayerMetrics {
    pub fn new() -> Self {
        let registry = Registry::new();

        let jobs_registered = register_int_counter_with_registry!(
            Opts::new("agora_relay_jobs_registered_total", "Jobs accepted at intake"),
            registry
        )
        .expect("failed to register jobs_registered counter");

        let jobs_processed = register_int_counter_with_registry!(
            Opts::new(
                "agora_relay_jobs_processed_total",
                "Jobs successfully submitted on-chain"
            ),
            registry
        )
        .expect("failed to register jobs_processed counter");

        let jobs_failed = register_int_counter_with_registry!(
            Opts::new("agora_relay_jobs_failed_total", "Jobs terminated as failed"),
            registry
        )
        .expect("failed to register jobs_failed counter");

        let jobs_swept = register_int_counter_with_registry!(
            Opts::new(
                "agora_relay_jobs_swept_total",
                "Jobs force-failed by the staleness sweep"
            ),
            registry
        )
        .expect("failed to register jobs_swept counter");

        let pending_jobs = register_int_gauge_with_registry!(
            Opts::new("agora_relay_pending_jobs", "Pending jobs at last poll"),
            registry
        )
        .expect("failed to register pending_jobs gauge");

        Self {
            registry,
            jobs_registered,
            jobs_processed,
            jobs_failed,
            jobs_swept,
            pending_jobs,
        }
    }
}

impl Default for RelayerMetrics {
    fn default() -> Self {
        Self::new()
    }
}
