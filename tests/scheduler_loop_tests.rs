//! 端到端调度流程：注册表 → 到期判定 → 状态检查 → 启动 → 运行历史

use std::sync::Arc;
use std::time::Duration;

use parser_scheduler::app::{build_dispatcher, build_planner, run_scheduler_loop, Collaborators};
use parser_scheduler::shutdown::ShutdownManager;
use parsers_config::{AppConfig, DispatcherConfig};
use parsers_domain::{JobName, JobRecord, WeekdayPolicy};
use parsers_infrastructure::MetricsCollector;
use parsers_testing_utils::{
    rfc3339, utc, FixedClock, MockContainerStatusOracle, MockJobRegistry, MockProcessLauncher,
    MockRunHistoryRepository,
};

struct Harness {
    registry: MockJobRegistry,
    history: MockRunHistoryRepository,
    oracle: MockContainerStatusOracle,
    launcher: MockProcessLauncher,
    clock: FixedClock,
}

impl Harness {
    fn new(jobs: Vec<JobRecord>) -> Self {
        Self {
            registry: MockJobRegistry::with_jobs(jobs),
            history: MockRunHistoryRepository::new(),
            oracle: MockContainerStatusOracle::new(),
            launcher: MockProcessLauncher::new(),
            clock: FixedClock::new(utc(2024, 1, 2, 9, 5, 0)),
        }
    }

    fn collaborators(&self) -> Collaborators {
        Collaborators {
            registry: Arc::new(self.registry.clone()),
            history: Arc::new(self.history.clone()),
            oracle: Arc::new(self.oracle.clone()),
            launcher: Arc::new(self.launcher.clone()),
            clock: Arc::new(self.clock.clone()),
        }
    }
}

fn metrics() -> Arc<MetricsCollector> {
    Arc::new(MetricsCollector::new().unwrap())
}

#[tokio::test]
async fn test_tick_with_default_configuration() {
    let harness = Harness::new(vec![
        JobRecord::new("news", "daily 9"),
        JobRecord::new("prices", "hourly 0.5"),
        JobRecord::new("weather", "weekly mo 6"),
        JobRecord::new("archive", "monthly 1"),
    ]);
    harness.oracle.set_running("prices");

    let dispatcher = build_dispatcher(
        &AppConfig::default().dispatcher,
        harness.collaborators(),
        metrics(),
    )
    .unwrap();
    let report = dispatcher.run_tick().await.unwrap();

    assert_eq!(
        report.plan.due,
        vec![
            JobName::from("news"),
            JobName::from("prices"),
            JobName::from("weather"),
        ]
    );
    assert_eq!(
        harness.launcher.launched(),
        vec![JobName::from("news"), JobName::from("weather")]
    );
    assert_eq!(report.launch.skipped_running, vec![JobName::from("prices")]);
    assert_eq!(report.diagnostics().count(), 1);
    assert_eq!(harness.history.entries().len(), 2);
}

#[tokio::test]
async fn test_configured_horizon_and_weekday_policy() {
    let config = DispatcherConfig {
        history_horizon: rfc3339("2024-01-02T09:00:00Z"),
        unknown_weekday: WeekdayPolicy::DefaultMonday,
        ..DispatcherConfig::default()
    };
    let planner = build_planner(&config).unwrap();

    // 2024-01-01 是周一，早于历史起点；下一次周一是 01-08
    let job = JobRecord::new("legacy", "weekly xx 6");
    let decision = planner
        .evaluate_job(&job, None, utc(2024, 1, 2, 9, 5, 0))
        .unwrap();
    assert!(!decision.due);
    assert_eq!(decision.next_run, utc(2024, 1, 8, 6, 0, 0));
}

#[test]
fn test_out_of_range_debounce_is_rejected() {
    let config = DispatcherConfig {
        debounce_seconds: i64::MAX,
        ..DispatcherConfig::default()
    };
    assert!(build_planner(&config).is_err());

    let harness = Harness::new(vec![JobRecord::new("news", "daily 9")]);
    assert!(build_dispatcher(&config, harness.collaborators(), metrics()).is_err());
}

#[tokio::test]
async fn test_scheduler_loop_stops_on_shutdown() {
    let harness = Harness::new(vec![JobRecord::new("news", "daily 9")]);
    let dispatcher = Arc::new(build_dispatcher(
        &AppConfig::default().dispatcher,
        harness.collaborators(),
        metrics(),
    )
    .unwrap());

    let shutdown_manager = ShutdownManager::new();
    let shutdown_rx = shutdown_manager.subscribe().await;
    let handle = tokio::spawn(run_scheduler_loop(dispatcher, 3600, shutdown_rx));

    // 第一次tick立即执行
    tokio::time::sleep(Duration::from_millis(100)).await;
    shutdown_manager.shutdown().await;

    let result = tokio::time::timeout(Duration::from_secs(1), handle).await;
    assert!(result.is_ok());
    assert_eq!(harness.launcher.launched(), vec![JobName::from("news")]);
}
