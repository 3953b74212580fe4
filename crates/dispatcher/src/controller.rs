use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use parsers_domain::{
    Clock, ContainerStatusOracle, DiagnosticKind, JobDiagnostic, JobName, ProcessLauncher,
    RunHistoryEntry, RunHistoryRepository,
};
use parsers_errors::SchedulerResult;
use parsers_infrastructure::{MetricsCollector, StructuredLogger};

use crate::planner::DuePlan;
use crate::scheduler::ParserScheduler;

/// 一次启动流程的结果
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LaunchReport {
    pub launched: Vec<JobName>,
    pub skipped_running: Vec<JobName>,
    pub failed: Vec<JobName>,
    pub diagnostics: Vec<JobDiagnostic>,
}

impl LaunchReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty() && self.diagnostics.is_empty()
    }
}

/// 按顺序逐个处理到期任务：状态检查 → 启动 → 写入运行历史
pub struct LaunchController {
    oracle: Arc<dyn ContainerStatusOracle>,
    launcher: Arc<dyn ProcessLauncher>,
    history: Arc<dyn RunHistoryRepository>,
    clock: Arc<dyn Clock>,
    metrics: Arc<MetricsCollector>,
}

impl LaunchController {
    pub fn new(
        oracle: Arc<dyn ContainerStatusOracle>,
        launcher: Arc<dyn ProcessLauncher>,
        history: Arc<dyn RunHistoryRepository>,
        clock: Arc<dyn Clock>,
        metrics: Arc<MetricsCollector>,
    ) -> Self {
        Self {
            oracle,
            launcher,
            history,
            clock,
            metrics,
        }
    }

    pub async fn launch_due(&self, due: &[JobName]) -> LaunchReport {
        let mut report = LaunchReport::default();

        for job_name in due {
            match self.oracle.is_running(job_name).await {
                Ok(true) => {
                    StructuredLogger::log_job_skipped_running(job_name);
                    self.metrics.record_skipped_running();
                    report.skipped_running.push(job_name.clone());
                    continue;
                }
                Ok(false) => {}
                Err(e) => {
                    // 状态未知时不启动，避免重复运行
                    self.push_diagnostic(
                        &mut report,
                        job_name,
                        DiagnosticKind::StatusCheckFailed,
                        e.to_string(),
                    );
                    continue;
                }
            }

            let launched_at = self.clock.now();
            let start = Instant::now();
            if let Err(e) = self.launcher.launch(job_name).await {
                StructuredLogger::log_job_launch_failed(job_name, &e);
                self.metrics.record_launch_failure();
                report.failed.push(job_name.clone());
                self.push_diagnostic(
                    &mut report,
                    job_name,
                    DiagnosticKind::LaunchFailed,
                    e.to_string(),
                );
                continue;
            }

            let elapsed = start.elapsed();
            StructuredLogger::log_job_launched(job_name, launched_at, elapsed.as_millis() as u64);
            self.metrics.record_launch(elapsed.as_secs_f64());
            report.launched.push(job_name.clone());

            let entry = RunHistoryEntry::new(job_name.clone(), launched_at);
            if let Err(e) = self.history.record_run(&entry).await {
                warn!("解析器 {} 已启动，但写入运行历史失败: {}", job_name, e);
                self.push_diagnostic(
                    &mut report,
                    job_name,
                    DiagnosticKind::HistoryWriteFailed,
                    e.to_string(),
                );
            }
        }

        report
    }

    fn push_diagnostic(
        &self,
        report: &mut LaunchReport,
        job_name: &JobName,
        kind: DiagnosticKind,
        message: String,
    ) {
        let diagnostic = JobDiagnostic::new(job_name.clone(), kind, message);
        StructuredLogger::log_job_diagnostic(&diagnostic);
        self.metrics.record_diagnostic(&kind.to_string());
        report.diagnostics.push(diagnostic);
    }
}

/// 一个调度周期的完整结果
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TickReport {
    pub started_at: DateTime<Utc>,
    pub plan: DuePlan,
    pub launch: LaunchReport,
    #[serde(skip)]
    pub duration: Duration,
}

impl TickReport {
    pub fn diagnostics(&self) -> impl Iterator<Item = &JobDiagnostic> {
        self.plan
            .diagnostics
            .iter()
            .chain(self.launch.diagnostics.iter())
    }
}

/// 组合扫描与启动，对外提供单次调度和只读计划
pub struct ParserDispatcher {
    scheduler: ParserScheduler,
    controller: LaunchController,
    clock: Arc<dyn Clock>,
    metrics: Arc<MetricsCollector>,
}

impl ParserDispatcher {
    pub fn new(
        scheduler: ParserScheduler,
        controller: LaunchController,
        clock: Arc<dyn Clock>,
        metrics: Arc<MetricsCollector>,
    ) -> Self {
        Self {
            scheduler,
            controller,
            clock,
            metrics,
        }
    }

    /// 只计算到期任务，不启动任何进程
    pub async fn plan_at(&self, now: DateTime<Utc>) -> SchedulerResult<DuePlan> {
        self.scheduler.scan(now).await
    }

    /// 执行一次调度：扫描、逐个启动、记录历史
    pub async fn run_tick(&self) -> SchedulerResult<TickReport> {
        let start = Instant::now();
        let started_at = self.clock.now();

        let plan = self.scheduler.scan(started_at).await?;
        let launch = if plan.due.is_empty() {
            debug!("本周期没有到期的解析器");
            LaunchReport::default()
        } else {
            info!("本周期有 {} 个解析器到期", plan.due.len());
            self.controller.launch_due(&plan.due).await
        };

        let duration = start.elapsed();
        self.metrics.record_tick_duration(duration.as_secs_f64());

        let report = TickReport {
            started_at,
            plan,
            launch,
            duration,
        };
        StructuredLogger::log_tick_complete(
            report.plan.decisions.len() + report.plan.diagnostics.len(),
            report.plan.due.len(),
            report.launch.launched.len(),
            report.launch.skipped_running.len(),
            report.diagnostics().count(),
            duration.as_millis() as u64,
        );
        Ok(report)
    }
}
