use std::time::Instant;

use async_trait::async_trait;
use parsers_domain::{JobRecord, JobRegistry};
use parsers_errors::SchedulerResult;
use sqlx::{PgPool, Row};
use tracing::{debug, instrument};

use crate::observability::StructuredLogger;

/// 读取旧版 `parsers` 表：`database_name` 为解析器名，`update_period` 为调度周期
pub struct PostgresJobRegistry {
    pool: PgPool,
    table: String,
}

impl PostgresJobRegistry {
    /// `table` 须已通过 `DatabaseConfig::validate` 校验
    pub fn new(pool: PgPool, table: String) -> Self {
        Self { pool, table }
    }

    fn list_query(&self) -> String {
        format!(
            "SELECT database_name, update_period FROM {} ORDER BY database_name",
            self.table
        )
    }

    fn row_to_job(row: &sqlx::postgres::PgRow) -> SchedulerResult<JobRecord> {
        let name: String = row.try_get("database_name")?;
        let recurrence: Option<String> = row.try_get("update_period")?;
        Ok(JobRecord::new(name, recurrence.unwrap_or_default()))
    }
}

#[async_trait]
impl JobRegistry for PostgresJobRegistry {
    #[instrument(skip(self), fields(table = %self.table))]
    async fn list_jobs(&self) -> SchedulerResult<Vec<JobRecord>> {
        let start = Instant::now();
        let rows = sqlx::query(&self.list_query())
            .fetch_all(&self.pool)
            .await?;

        let jobs = rows
            .iter()
            .map(Self::row_to_job)
            .collect::<SchedulerResult<Vec<_>>>()?;

        StructuredLogger::log_database_operation(
            "list_jobs",
            &self.table,
            start.elapsed().as_millis() as u64,
        );
        debug!("从注册表读取到 {} 个解析器", jobs.len());
        Ok(jobs)
    }
}
