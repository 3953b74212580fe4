use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;

use parsers_domain::{DiagnosticKind, DueDecision, JobDiagnostic, JobName, JobRecord};
use parsers_errors::SchedulerResult;

use crate::cron_utils::DueEvaluator;
use crate::recurrence::RecurrenceCompiler;

/// 一次调度计算的结果
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DuePlan {
    /// 到期的解析器，保持注册表顺序
    pub due: Vec<JobName>,
    /// 每个可调度任务的判定，供诊断输出
    pub decisions: Vec<(JobName, DueDecision)>,
    pub diagnostics: Vec<JobDiagnostic>,
}

impl DuePlan {
    pub fn is_due(&self, job_name: &JobName) -> bool {
        self.due.contains(job_name)
    }

    pub fn decision(&self, job_name: &JobName) -> Option<&DueDecision> {
        self.decisions
            .iter()
            .find(|(name, _)| name == job_name)
            .map(|(_, decision)| decision)
    }
}

/// 纯计算：不做任何I/O，可在多个线程中并行调用
#[derive(Debug, Clone, Copy)]
pub struct DuePlanner {
    compiler: RecurrenceCompiler,
    evaluator: DueEvaluator,
}

impl DuePlanner {
    pub fn new(compiler: RecurrenceCompiler, evaluator: DueEvaluator) -> Self {
        Self {
            compiler,
            evaluator,
        }
    }

    pub fn evaluate_job(
        &self,
        job: &JobRecord,
        last_run: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> SchedulerResult<DueDecision> {
        let expression = self.compiler.compile(&job.recurrence)?;
        self.evaluator.evaluate(&expression, last_run, now)
    }

    pub fn plan<F>(&self, jobs: &[JobRecord], history: F, now: DateTime<Utc>) -> DuePlan
    where
        F: Fn(&JobName) -> Option<DateTime<Utc>>,
    {
        let mut plan = DuePlan::default();

        for job in jobs {
            let expression = match self.compiler.compile(&job.recurrence) {
                Ok(expression) => expression,
                Err(e) => {
                    plan.diagnostics.push(JobDiagnostic::new(
                        job.name.clone(),
                        DiagnosticKind::Unschedulable,
                        format!("{} ({:?})", e, job.recurrence),
                    ));
                    continue;
                }
            };

            match self.evaluator.evaluate(&expression, history(&job.name), now) {
                Ok(decision) => {
                    debug!(
                        "解析器 {} 判定: 表达式={}, 下次执行={}, 到期={}",
                        job.name,
                        expression,
                        decision.next_run.format("%Y-%m-%d %H:%M:%S UTC"),
                        decision.due
                    );
                    if decision.due {
                        plan.due.push(job.name.clone());
                    }
                    plan.decisions.push((job.name.clone(), decision));
                }
                Err(e) => {
                    plan.diagnostics.push(JobDiagnostic::new(
                        job.name.clone(),
                        DiagnosticKind::EvaluationFailed,
                        e.to_string(),
                    ));
                }
            }
        }

        plan
    }
}
