//! Structured logging utilities
//!
//! 调度过程中的关键事件统一在这里输出，字段名保持稳定，便于在JSON日志中检索。

use chrono::{DateTime, Utc};
use tracing::{debug, error, info, warn};

use parsers_domain::{JobDiagnostic, JobName};

pub struct StructuredLogger;

impl StructuredLogger {
    /// Log a job that crossed its schedule threshold
    pub fn log_job_due(job_name: &JobName, next_run: DateTime<Utc>, base_time: DateTime<Utc>) {
        info!(
            event = "job_due",
            job.name = %job_name,
            job.next_run = %next_run,
            job.base_time = %base_time,
            "Job is due"
        );
    }

    /// Log a due job that was skipped because its container is still running
    pub fn log_job_skipped_running(job_name: &JobName) {
        info!(
            event = "job_skipped_running",
            job.name = %job_name,
            "Job container already running, skipping"
        );
    }

    pub fn log_job_launched(job_name: &JobName, launched_at: DateTime<Utc>, duration_ms: u64) {
        info!(
            event = "job_launched",
            job.name = %job_name,
            job.launched_at = %launched_at,
            job.duration_ms = duration_ms,
            "Job launched"
        );
    }

    pub fn log_job_launch_failed(job_name: &JobName, error: &dyn std::error::Error) {
        error!(
            event = "job_launch_failed",
            job.name = %job_name,
            error = %error,
            "Job launch failed"
        );
    }

    /// Log a per-job diagnostic (unschedulable recurrence, unreadable history, ...)
    pub fn log_job_diagnostic(diagnostic: &JobDiagnostic) {
        warn!(
            event = "job_diagnostic",
            job.name = %diagnostic.job_name,
            diagnostic.kind = %diagnostic.kind,
            diagnostic.message = %diagnostic.message,
            "Job could not be processed"
        );
    }

    pub fn log_tick_complete(
        registered: usize,
        due: usize,
        launched: usize,
        skipped: usize,
        diagnostics: usize,
        duration_ms: u64,
    ) {
        info!(
            event = "tick_complete",
            tick.registered = registered,
            tick.due = due,
            tick.launched = launched,
            tick.skipped = skipped,
            tick.diagnostics = diagnostics,
            tick.duration_ms = duration_ms,
            "Scheduling tick completed"
        );
    }

    pub fn log_system_error(component: &str, operation: &str, error: &dyn std::error::Error) {
        error!(
            event = "system_error",
            component = component,
            operation = operation,
            error = %error,
            "System error occurred"
        );
    }

    pub fn log_database_operation(operation: &str, table: &str, duration_ms: u64) {
        debug!(
            event = "database_operation",
            db.operation = operation,
            db.table = table,
            db.duration_ms = duration_ms,
            "Database operation completed"
        );
    }
}
