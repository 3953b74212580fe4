//! Mock implementations for repository and port traits
//!
//! 内存实现，不需要数据库或docker即可测试调度流程。

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use parsers_domain::{
    Clock, ContainerStatusOracle, JobName, JobRecord, JobRegistry, ProcessLauncher,
    RunHistoryEntry, RunHistoryRepository,
};
use parsers_errors::{SchedulerError, SchedulerResult};

/// Mock implementation of JobRegistry for testing
#[derive(Debug, Clone, Default)]
pub struct MockJobRegistry {
    jobs: Arc<Mutex<Vec<JobRecord>>>,
    failure: Arc<Mutex<Option<String>>>,
}

impl MockJobRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_jobs(jobs: Vec<JobRecord>) -> Self {
        let registry = Self::new();
        *registry.jobs.lock().unwrap() = jobs;
        registry
    }

    pub fn add_job(&self, job: JobRecord) {
        self.jobs.lock().unwrap().push(job);
    }

    /// 之后的 `list_jobs` 调用都返回数据库错误
    pub fn fail_with(&self, message: &str) {
        *self.failure.lock().unwrap() = Some(message.to_string());
    }

    pub fn count(&self) -> usize {
        self.jobs.lock().unwrap().len()
    }
}

#[async_trait]
impl JobRegistry for MockJobRegistry {
    async fn list_jobs(&self) -> SchedulerResult<Vec<JobRecord>> {
        if let Some(message) = self.failure.lock().unwrap().clone() {
            return Err(SchedulerError::database_error(message));
        }
        let mut jobs = self.jobs.lock().unwrap().clone();
        jobs.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(jobs)
    }
}

/// Mock implementation of RunHistoryRepository for testing
#[derive(Debug, Clone, Default)]
pub struct MockRunHistoryRepository {
    entries: Arc<Mutex<Vec<RunHistoryEntry>>>,
    failing_reads: Arc<Mutex<HashSet<JobName>>>,
    fail_writes: Arc<Mutex<bool>>,
}

impl MockRunHistoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_last_run(self, job_name: &str, completed_at: DateTime<Utc>) -> Self {
        self.entries
            .lock()
            .unwrap()
            .push(RunHistoryEntry::new(JobName::from(job_name), completed_at));
        self
    }

    pub fn fail_reads_for(&self, job_name: &str) {
        self.failing_reads
            .lock()
            .unwrap()
            .insert(JobName::from(job_name));
    }

    pub fn fail_writes(&self) {
        *self.fail_writes.lock().unwrap() = true;
    }

    pub fn entries(&self) -> Vec<RunHistoryEntry> {
        self.entries.lock().unwrap().clone()
    }

    pub fn entries_for(&self, job_name: &str) -> Vec<RunHistoryEntry> {
        self.entries
            .lock()
            .unwrap()
            .iter()
            .filter(|entry| entry.job_name.as_str() == job_name)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl RunHistoryRepository for MockRunHistoryRepository {
    async fn last_run(&self, job_name: &JobName) -> SchedulerResult<Option<DateTime<Utc>>> {
        if self.failing_reads.lock().unwrap().contains(job_name) {
            return Err(SchedulerError::database_error(format!(
                "无法读取 {job_name} 的运行历史"
            )));
        }
        Ok(self
            .entries
            .lock()
            .unwrap()
            .iter()
            .filter(|entry| &entry.job_name == job_name)
            .map(|entry| entry.completed_at)
            .max())
    }

    async fn record_run(&self, entry: &RunHistoryEntry) -> SchedulerResult<()> {
        if *self.fail_writes.lock().unwrap() {
            return Err(SchedulerError::database_error("运行历史写入失败"));
        }
        self.entries.lock().unwrap().push(entry.clone());
        Ok(())
    }
}

/// Mock implementation of ContainerStatusOracle for testing
#[derive(Debug, Clone, Default)]
pub struct MockContainerStatusOracle {
    running: Arc<Mutex<HashSet<JobName>>>,
    failing: Arc<Mutex<HashSet<JobName>>>,
    calls: Arc<Mutex<Vec<JobName>>>,
}

impl MockContainerStatusOracle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_running(&self, job_name: &str) {
        self.running.lock().unwrap().insert(JobName::from(job_name));
    }

    pub fn set_failing(&self, job_name: &str) {
        self.failing.lock().unwrap().insert(JobName::from(job_name));
    }

    pub fn calls(&self) -> Vec<JobName> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ContainerStatusOracle for MockContainerStatusOracle {
    async fn is_running(&self, job_name: &JobName) -> SchedulerResult<bool> {
        self.calls.lock().unwrap().push(job_name.clone());
        if self.failing.lock().unwrap().contains(job_name) {
            return Err(SchedulerError::status_check_error(
                job_name.as_str(),
                "docker daemon unavailable",
            ));
        }
        Ok(self.running.lock().unwrap().contains(job_name))
    }
}

/// Mock implementation of ProcessLauncher for testing
#[derive(Debug, Clone, Default)]
pub struct MockProcessLauncher {
    launched: Arc<Mutex<Vec<JobName>>>,
    failing: Arc<Mutex<HashSet<JobName>>>,
}

impl MockProcessLauncher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_for(&self, job_name: &str) {
        self.failing.lock().unwrap().insert(JobName::from(job_name));
    }

    /// 按调用顺序返回成功启动的任务
    pub fn launched(&self) -> Vec<JobName> {
        self.launched.lock().unwrap().clone()
    }

    pub fn launch_count(&self) -> usize {
        self.launched.lock().unwrap().len()
    }
}

#[async_trait]
impl ProcessLauncher for MockProcessLauncher {
    async fn launch(&self, job_name: &JobName) -> SchedulerResult<()> {
        if self.failing.lock().unwrap().contains(job_name) {
            return Err(SchedulerError::launch_error(
                job_name.as_str(),
                "exit status 1",
            ));
        }
        self.launched.lock().unwrap().push(job_name.clone());
        Ok(())
    }
}

/// 可手动推进的时钟
#[derive(Debug, Clone)]
pub struct FixedClock {
    now: Arc<Mutex<DateTime<Utc>>>,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: Arc::new(Mutex::new(now)),
        }
    }

    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.lock().unwrap() = now;
    }

    pub fn advance(&self, duration: Duration) {
        *self.now.lock().unwrap() += duration;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}
