//! 调度核心之外的协作者：容器状态查询、进程启动和时钟

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::entities::JobName;
use parsers_errors::SchedulerResult;

/// 查询同名容器是否正在运行
#[async_trait]
pub trait ContainerStatusOracle: Send + Sync {
    async fn is_running(&self, job_name: &JobName) -> SchedulerResult<bool>;
}

/// 启动解析器对应的外部进程
#[async_trait]
pub trait ProcessLauncher: Send + Sync {
    async fn launch(&self, job_name: &JobName) -> SchedulerResult<()>;
}

/// 当前时间来源，统一使用UTC
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
