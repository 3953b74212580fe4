use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info, instrument};

use parsers_domain::{
    DiagnosticKind, JobDiagnostic, JobName, JobRecord, JobRegistry, RunHistoryRepository,
};
use parsers_errors::SchedulerResult;
use parsers_infrastructure::{MetricsCollector, StructuredLogger};

use crate::planner::{DuePlan, DuePlanner};

/// 扫描注册表与运行历史，交给 `DuePlanner` 计算到期任务
pub struct ParserScheduler {
    registry: Arc<dyn JobRegistry>,
    history: Arc<dyn RunHistoryRepository>,
    planner: DuePlanner,
    metrics: Arc<MetricsCollector>,
}

impl ParserScheduler {
    pub fn new(
        registry: Arc<dyn JobRegistry>,
        history: Arc<dyn RunHistoryRepository>,
        planner: DuePlanner,
        metrics: Arc<MetricsCollector>,
    ) -> Self {
        Self {
            registry,
            history,
            planner,
            metrics,
        }
    }

    /// 读取注册表失败时整个扫描失败；单个任务的历史读取失败只产生诊断
    #[instrument(skip(self), fields(now = %now))]
    pub async fn scan(&self, now: DateTime<Utc>) -> SchedulerResult<DuePlan> {
        info!("开始扫描需要调度的解析器");
        let jobs = self.registry.list_jobs().await?;
        let registered = jobs.len();
        self.metrics.update_registered_jobs(registered);

        let (history, history_diagnostics) = self.load_history(&jobs).await;
        let schedulable: Vec<JobRecord> = jobs
            .into_iter()
            .filter(|job| !history_diagnostics.iter().any(|d| d.job_name == job.name))
            .collect();

        let mut plan = self
            .planner
            .plan(&schedulable, |name| history.get(name).copied().flatten(), now);
        plan.diagnostics.extend(history_diagnostics);

        for diagnostic in &plan.diagnostics {
            StructuredLogger::log_job_diagnostic(diagnostic);
            self.metrics.record_diagnostic(&diagnostic.kind.to_string());
        }
        for name in &plan.due {
            if let Some(decision) = plan.decision(name) {
                StructuredLogger::log_job_due(name, decision.next_run, decision.base_time);
            }
        }
        self.metrics.record_jobs_due(plan.due.len());

        info!(
            "扫描完成: 注册 {} 个, 到期 {} 个, 诊断 {} 条",
            registered,
            plan.due.len(),
            plan.diagnostics.len()
        );
        Ok(plan)
    }

    async fn load_history(
        &self,
        jobs: &[JobRecord],
    ) -> (HashMap<JobName, Option<DateTime<Utc>>>, Vec<JobDiagnostic>) {
        let mut history = HashMap::with_capacity(jobs.len());
        let mut diagnostics = Vec::new();

        for job in jobs {
            match self.history.last_run(&job.name).await {
                Ok(last_run) => {
                    debug!("解析器 {} 上次运行: {:?}", job.name, last_run);
                    history.insert(job.name.clone(), last_run);
                }
                Err(e) => diagnostics.push(JobDiagnostic::new(
                    job.name.clone(),
                    DiagnosticKind::HistoryUnavailable,
                    e.to_string(),
                )),
            }
        }

        (history, diagnostics)
    }
}
