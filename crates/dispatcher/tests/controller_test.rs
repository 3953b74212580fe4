#[cfg(test)]
mod controller_tests {
    use std::sync::Arc;

    use chrono::Duration;
    use parsers_dispatcher::{
        DueEvaluator, DuePlanner, LaunchController, ParserDispatcher, ParserScheduler,
        RecurrenceCompiler,
    };
    use parsers_domain::{DiagnosticKind, JobName, JobRecord};
    use parsers_infrastructure::MetricsCollector;
    use parsers_testing_utils::{
        utc, FixedClock, MockContainerStatusOracle, MockJobRegistry, MockProcessLauncher,
        MockRunHistoryRepository,
    };

    struct Fixture {
        oracle: MockContainerStatusOracle,
        launcher: MockProcessLauncher,
        history: MockRunHistoryRepository,
        clock: FixedClock,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                oracle: MockContainerStatusOracle::new(),
                launcher: MockProcessLauncher::new(),
                history: MockRunHistoryRepository::new(),
                clock: FixedClock::new(utc(2024, 1, 2, 9, 5, 0)),
            }
        }

        fn metrics() -> Arc<MetricsCollector> {
            Arc::new(MetricsCollector::new().unwrap())
        }

        fn controller(&self) -> LaunchController {
            LaunchController::new(
                Arc::new(self.oracle.clone()),
                Arc::new(self.launcher.clone()),
                Arc::new(self.history.clone()),
                Arc::new(self.clock.clone()),
                Self::metrics(),
            )
        }

        fn dispatcher(&self, registry: MockJobRegistry) -> ParserDispatcher {
            let scheduler = ParserScheduler::new(
                Arc::new(registry),
                Arc::new(self.history.clone()),
                DuePlanner::new(
                    RecurrenceCompiler::default(),
                    DueEvaluator::new(utc(2024, 1, 1, 0, 0, 0), Duration::seconds(60)),
                ),
                Self::metrics(),
            );
            ParserDispatcher::new(
                scheduler,
                self.controller(),
                Arc::new(self.clock.clone()),
                Self::metrics(),
            )
        }
    }

    fn names(values: &[&str]) -> Vec<JobName> {
        values.iter().map(|v| JobName::from(*v)).collect()
    }

    #[tokio::test]
    async fn test_launches_in_order_and_records_history() {
        let fixture = Fixture::new();
        let report = fixture
            .controller()
            .launch_due(&names(&["alpha", "beta"]))
            .await;

        assert_eq!(report.launched, names(&["alpha", "beta"]));
        assert!(report.is_clean());
        assert_eq!(fixture.launcher.launched(), names(&["alpha", "beta"]));

        let entries = fixture.history.entries();
        assert_eq!(entries.len(), 2);
        assert!(entries
            .iter()
            .all(|entry| entry.completed_at == utc(2024, 1, 2, 9, 5, 0)));
    }

    #[tokio::test]
    async fn test_running_container_is_skipped() {
        let fixture = Fixture::new();
        fixture.oracle.set_running("alpha");

        let report = fixture
            .controller()
            .launch_due(&names(&["alpha", "beta"]))
            .await;

        assert_eq!(report.skipped_running, names(&["alpha"]));
        assert_eq!(report.launched, names(&["beta"]));
        assert_eq!(fixture.launcher.launched(), names(&["beta"]));
        assert!(fixture.history.entries_for("alpha").is_empty());
    }

    #[tokio::test]
    async fn test_status_check_failure_prevents_launch() {
        let fixture = Fixture::new();
        fixture.oracle.set_failing("alpha");

        let report = fixture
            .controller()
            .launch_due(&names(&["alpha", "beta"]))
            .await;

        assert_eq!(report.launched, names(&["beta"]));
        assert_eq!(report.diagnostics.len(), 1);
        assert_eq!(report.diagnostics[0].kind, DiagnosticKind::StatusCheckFailed);
        assert_eq!(fixture.launcher.launched(), names(&["beta"]));
    }

    #[tokio::test]
    async fn test_failed_launch_records_no_history_and_continues() {
        let fixture = Fixture::new();
        fixture.launcher.fail_for("alpha");

        let report = fixture
            .controller()
            .launch_due(&names(&["alpha", "beta"]))
            .await;

        assert_eq!(report.failed, names(&["alpha"]));
        assert_eq!(report.launched, names(&["beta"]));
        assert_eq!(report.diagnostics[0].kind, DiagnosticKind::LaunchFailed);
        assert!(fixture.history.entries_for("alpha").is_empty());
        assert_eq!(fixture.history.entries_for("beta").len(), 1);
    }

    #[tokio::test]
    async fn test_history_write_failure_keeps_launch() {
        let fixture = Fixture::new();
        fixture.history.fail_writes();

        let report = fixture.controller().launch_due(&names(&["alpha"])).await;

        assert_eq!(report.launched, names(&["alpha"]));
        assert_eq!(report.diagnostics.len(), 1);
        assert_eq!(report.diagnostics[0].kind, DiagnosticKind::HistoryWriteFailed);
    }

    #[tokio::test]
    async fn test_tick_launches_due_jobs_then_debounces() {
        let fixture = Fixture::new();
        let registry = MockJobRegistry::with_jobs(vec![
            JobRecord::new("news", "daily 9"),
            JobRecord::new("monthly_report", "monthly 1"),
        ]);
        let dispatcher = fixture.dispatcher(registry);

        let first = dispatcher.run_tick().await.unwrap();
        assert_eq!(first.started_at, utc(2024, 1, 2, 9, 5, 0));
        assert_eq!(first.launch.launched, names(&["news"]));
        assert_eq!(first.diagnostics().count(), 1);

        fixture.clock.advance(Duration::seconds(30));
        let second = dispatcher.run_tick().await.unwrap();
        assert!(second.plan.due.is_empty());
        assert!(second.launch.launched.is_empty());
        assert_eq!(fixture.launcher.launch_count(), 1);

        fixture.clock.set(utc(2024, 1, 3, 9, 0, 30));
        let third = dispatcher.run_tick().await.unwrap();
        assert_eq!(third.launch.launched, names(&["news"]));
    }

    #[tokio::test]
    async fn test_plan_at_launches_nothing() {
        let fixture = Fixture::new();
        let registry = MockJobRegistry::with_jobs(vec![JobRecord::new("news", "daily 9")]);
        let dispatcher = fixture.dispatcher(registry);

        let plan = dispatcher.plan_at(utc(2024, 1, 2, 9, 5, 0)).await.unwrap();

        assert_eq!(plan.due, names(&["news"]));
        assert_eq!(fixture.launcher.launch_count(), 0);
        assert!(fixture.oracle.calls().is_empty());
        assert!(fixture.history.entries().is_empty());
    }

    #[tokio::test]
    async fn test_tick_fails_when_registry_unavailable() {
        let fixture = Fixture::new();
        let registry = MockJobRegistry::new();
        registry.fail_with("connection refused");
        let dispatcher = fixture.dispatcher(registry);

        assert!(dispatcher.run_tick().await.is_err());
        assert_eq!(fixture.launcher.launch_count(), 0);
    }
}
