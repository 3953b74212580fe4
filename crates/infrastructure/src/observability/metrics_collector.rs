//! Metrics collector for the parser scheduler
//!
//! 使用 `metrics` crate 的全局记录器；未安装记录器时所有操作均为空操作。

use anyhow::Result;
use metrics::{counter, gauge, histogram, Counter, Gauge, Histogram};
use tracing::debug;

pub struct MetricsCollector {
    registered_jobs: Gauge,
    jobs_due_total: Counter,
    launches_total: Counter,
    launch_failures_total: Counter,
    skipped_running_total: Counter,
    tick_duration: Histogram,
    launch_duration: Histogram,
}

impl MetricsCollector {
    pub fn new() -> Result<Self> {
        Ok(Self {
            registered_jobs: gauge!("parsers_registered_jobs"),
            jobs_due_total: counter!("parsers_jobs_due_total"),
            launches_total: counter!("parsers_launches_total"),
            launch_failures_total: counter!("parsers_launch_failures_total"),
            skipped_running_total: counter!("parsers_skipped_running_total"),
            tick_duration: histogram!("parsers_tick_duration_seconds"),
            launch_duration: histogram!("parsers_launch_duration_seconds"),
        })
    }

    /// Record the size of the registry seen by a scheduling pass
    pub fn update_registered_jobs(&self, count: usize) {
        self.registered_jobs.set(count as f64);
    }

    pub fn record_jobs_due(&self, count: usize) {
        self.jobs_due_total.increment(count as u64);
    }

    /// Record a per-job diagnostic, labelled by kind
    pub fn record_diagnostic(&self, kind: &str) {
        counter!("parsers_job_diagnostics_total", "kind" => kind.to_string()).increment(1);
    }

    pub fn record_launch(&self, duration_seconds: f64) {
        self.launches_total.increment(1);
        self.launch_duration.record(duration_seconds);
    }

    pub fn record_launch_failure(&self) {
        self.launch_failures_total.increment(1);
    }

    pub fn record_skipped_running(&self) {
        self.skipped_running_total.increment(1);
    }

    /// Record the duration of a full tick (scan + launches)
    pub fn record_tick_duration(&self, duration_seconds: f64) {
        self.tick_duration.record(duration_seconds);

        debug!(duration_seconds = duration_seconds, "Tick completed");
    }
}
