use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::entities::{JobName, JobRecord, RunHistoryEntry};
use parsers_errors::SchedulerResult;

/// 解析器注册表抽象
#[async_trait]
pub trait JobRegistry: Send + Sync {
    /// 按注册表顺序返回全部解析器
    async fn list_jobs(&self) -> SchedulerResult<Vec<JobRecord>>;
}

/// 运行历史仓储抽象
#[async_trait]
pub trait RunHistoryRepository: Send + Sync {
    /// 最近一次运行时间，没有历史时返回 None
    async fn last_run(&self, job_name: &JobName) -> SchedulerResult<Option<DateTime<Utc>>>;
    /// 追加一条运行记录
    async fn record_run(&self, entry: &RunHistoryEntry) -> SchedulerResult<()>;
}
