use std::sync::Arc;
use std::time::Duration;

use parsers_config::DatabaseConfig;
use parsers_domain::{JobRegistry, RunHistoryRepository};
use parsers_errors::SchedulerResult;
use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::info;

use super::postgres::{PostgresJobRegistry, PostgresRunHistoryRepository};

/// 数据库连接池管理器
pub struct DatabaseManager {
    pool: PgPool,
    registry_table: String,
    history_table: String,
}

impl DatabaseManager {
    /// 创建新的数据库管理器
    pub async fn new(config: &DatabaseConfig) -> SchedulerResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout_seconds))
            .idle_timeout(Duration::from_secs(config.idle_timeout_seconds))
            .connect(&config.url)
            .await?;

        Ok(Self {
            pool,
            registry_table: config.registry_table.clone(),
            history_table: config.history_table.clone(),
        })
    }

    /// 创建运行历史表（注册表由外部维护，不在这里创建）
    pub async fn migrate(&self) -> SchedulerResult<()> {
        PostgresRunHistoryRepository::new(self.pool.clone(), self.history_table.clone())
            .ensure_schema()
            .await?;
        info!("运行历史表已就绪: {}", self.history_table);
        Ok(())
    }

    /// 检查数据库连接健康状态
    pub async fn health_check(&self) -> SchedulerResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    /// 关闭数据库连接池
    pub async fn close(&self) {
        self.pool.close().await;
    }

    pub fn job_registry(&self) -> Arc<dyn JobRegistry> {
        Arc::new(PostgresJobRegistry::new(
            self.pool.clone(),
            self.registry_table.clone(),
        ))
    }

    pub fn run_history(&self) -> Arc<dyn RunHistoryRepository> {
        Arc::new(PostgresRunHistoryRepository::new(
            self.pool.clone(),
            self.history_table.clone(),
        ))
    }
}
