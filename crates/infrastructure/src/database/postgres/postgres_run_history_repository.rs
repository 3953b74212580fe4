use std::time::Instant;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parsers_domain::{JobName, RunHistoryEntry, RunHistoryRepository};
use parsers_errors::SchedulerResult;
use sqlx::PgPool;
use tracing::{debug, instrument};

use crate::observability::StructuredLogger;

pub struct PostgresRunHistoryRepository {
    pool: PgPool,
    table: String,
}

impl PostgresRunHistoryRepository {
    /// `table` 须已通过 `DatabaseConfig::validate` 校验
    pub fn new(pool: PgPool, table: String) -> Self {
        Self { pool, table }
    }

    fn schema_statements(&self) -> [String; 2] {
        let index_name = format!("{}_job_completed_idx", self.table.replace('.', "_"));
        [
            format!(
                "CREATE TABLE IF NOT EXISTS {} (
                    id BIGSERIAL PRIMARY KEY,
                    job_name TEXT NOT NULL,
                    completed_at TIMESTAMPTZ NOT NULL
                )",
                self.table
            ),
            format!(
                "CREATE INDEX IF NOT EXISTS {index_name} ON {} (job_name, completed_at DESC)",
                self.table
            ),
        ]
    }

    fn last_run_query(&self) -> String {
        format!(
            "SELECT MAX(completed_at) FROM {} WHERE job_name = $1",
            self.table
        )
    }

    fn insert_query(&self) -> String {
        format!(
            "INSERT INTO {} (job_name, completed_at) VALUES ($1, $2)",
            self.table
        )
    }

    pub async fn ensure_schema(&self) -> SchedulerResult<()> {
        for statement in self.schema_statements() {
            sqlx::query(&statement).execute(&self.pool).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl RunHistoryRepository for PostgresRunHistoryRepository {
    #[instrument(skip(self), fields(job_name = %job_name))]
    async fn last_run(&self, job_name: &JobName) -> SchedulerResult<Option<DateTime<Utc>>> {
        let start = Instant::now();
        let last: Option<DateTime<Utc>> = sqlx::query_scalar(&self.last_run_query())
            .bind(job_name.as_str())
            .fetch_one(&self.pool)
            .await?;

        StructuredLogger::log_database_operation(
            "last_run",
            &self.table,
            start.elapsed().as_millis() as u64,
        );
        Ok(last)
    }

    #[instrument(skip(self, entry), fields(
        job_name = %entry.job_name,
        completed_at = %entry.completed_at,
    ))]
    async fn record_run(&self, entry: &RunHistoryEntry) -> SchedulerResult<()> {
        sqlx::query(&self.insert_query())
            .bind(entry.job_name.as_str())
            .bind(entry.completed_at)
            .execute(&self.pool)
            .await?;

        debug!("记录解析器运行: {} @ {}", entry.job_name, entry.completed_at);
        Ok(())
    }
}
