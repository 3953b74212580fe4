use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use tokio::sync::broadcast;
use tokio::time::MissedTickBehavior;
use tracing::{error, info};

use parsers_config::{AppConfig, DispatcherConfig};
use parsers_dispatcher::{
    DueEvaluator, DuePlan, DuePlanner, LaunchController, ParserDispatcher, ParserScheduler,
    RecurrenceCompiler, TickReport,
};
use parsers_domain::{
    Clock, ContainerStatusOracle, JobRegistry, ProcessLauncher, RunHistoryRepository,
    SystemClock,
};
use parsers_infrastructure::{DatabaseManager, MetricsCollector};
use parsers_worker::{DockerComposeLauncher, DockerStatusOracle};

/// 调度器依赖的外部协作者
pub struct Collaborators {
    pub registry: Arc<dyn JobRegistry>,
    pub history: Arc<dyn RunHistoryRepository>,
    pub oracle: Arc<dyn ContainerStatusOracle>,
    pub launcher: Arc<dyn ProcessLauncher>,
    pub clock: Arc<dyn Clock>,
}

/// 主应用程序
pub struct Application {
    config: AppConfig,
    database: DatabaseManager,
    dispatcher: Arc<ParserDispatcher>,
}

impl Application {
    /// 连接数据库、创建运行历史表并组装调度器
    pub async fn new(config: AppConfig) -> Result<Self> {
        info!("初始化应用程序，数据库: {}", config.masked_database_url());

        let database = DatabaseManager::new(&config.database)
            .await
            .context("连接数据库失败")?;
        database.migrate().await.context("创建运行历史表失败")?;

        let collaborators = Collaborators {
            registry: database.job_registry(),
            history: database.run_history(),
            oracle: Arc::new(DockerStatusOracle::new(config.launcher.docker_binary.clone())),
            launcher: Arc::new(DockerComposeLauncher::new(config.launcher.clone())),
            clock: Arc::new(SystemClock),
        };
        let metrics = Arc::new(MetricsCollector::new().context("创建指标收集器失败")?);
        let dispatcher = Arc::new(build_dispatcher(&config.dispatcher, collaborators, metrics)?);

        Ok(Self {
            config,
            database,
            dispatcher,
        })
    }

    /// 执行一次调度
    pub async fn run_once(&self) -> Result<TickReport> {
        self.dispatcher.run_tick().await.context("调度执行失败")
    }

    /// 计算指定时间点的到期任务，不启动进程
    pub async fn plan(&self, at: DateTime<Utc>) -> Result<DuePlan> {
        self.dispatcher.plan_at(at).await.context("计算调度计划失败")
    }

    /// 按配置的间隔持续调度，直到收到关闭信号
    pub async fn run_daemon(&self, shutdown_rx: broadcast::Receiver<()>) -> Result<()> {
        let interval = self.config.dispatcher.schedule_interval_seconds;
        info!("启动调度循环，间隔 {} 秒", interval);

        run_scheduler_loop(Arc::clone(&self.dispatcher), interval, shutdown_rx).await;

        info!("调度循环已停止");
        Ok(())
    }

    pub async fn close(&self) {
        self.database.close().await;
    }
}

pub fn build_planner(config: &DispatcherConfig) -> Result<DuePlanner> {
    let debounce = config.debounce().context("无效的防抖配置")?;
    Ok(DuePlanner::new(
        RecurrenceCompiler::new(config.unknown_weekday),
        DueEvaluator::new(config.history_horizon, debounce),
    ))
}

pub fn build_dispatcher(
    config: &DispatcherConfig,
    collaborators: Collaborators,
    metrics: Arc<MetricsCollector>,
) -> Result<ParserDispatcher> {
    let scheduler = ParserScheduler::new(
        collaborators.registry,
        Arc::clone(&collaborators.history),
        build_planner(config)?,
        Arc::clone(&metrics),
    );
    let controller = LaunchController::new(
        collaborators.oracle,
        collaborators.launcher,
        collaborators.history,
        Arc::clone(&collaborators.clock),
        Arc::clone(&metrics),
    );
    Ok(ParserDispatcher::new(
        scheduler,
        controller,
        collaborators.clock,
        metrics,
    ))
}

/// 运行调度器循环；单次调度在循环内等待完成，不会与下一次重叠
pub async fn run_scheduler_loop(
    dispatcher: Arc<ParserDispatcher>,
    interval_seconds: u64,
    mut shutdown_rx: broadcast::Receiver<()>,
) {
    let mut interval = tokio::time::interval(Duration::from_secs(interval_seconds));
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = interval.tick() => {
                if let Err(e) = dispatcher.run_tick().await {
                    error!("解析器调度失败: {}", e);
                    if e.is_fatal() {
                        break;
                    }
                }
            }
            _ = shutdown_rx.recv() => {
                info!("调度器循环收到关闭信号");
                break;
            }
        }
    }
}
