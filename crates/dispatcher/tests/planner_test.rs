#[cfg(test)]
mod planner_tests {
    use chrono::{DateTime, Duration, Utc};
    use parsers_dispatcher::{DueEvaluator, DuePlanner, RecurrenceCompiler};
    use parsers_domain::{DiagnosticKind, JobName, JobRecord, WeekdayPolicy};
    use parsers_testing_utils::{utc, JobRecordBuilder};

    fn planner() -> DuePlanner {
        DuePlanner::new(
            RecurrenceCompiler::new(WeekdayPolicy::Reject),
            DueEvaluator::new(utc(2024, 1, 1, 0, 0, 0), Duration::seconds(60)),
        )
    }

    fn no_history(_: &JobName) -> Option<DateTime<Utc>> {
        None
    }

    #[test]
    fn test_plan_keeps_registry_order() {
        let jobs = vec![
            JobRecordBuilder::new().with_name("alpha").daily(9).build(),
            JobRecordBuilder::new().with_name("beta").hourly("2").build(),
            JobRecordBuilder::new().with_name("gamma").weekly("mo", 6).build(),
        ];
        let plan = planner().plan(&jobs, no_history, utc(2024, 2, 1, 12, 0, 0));

        let names: Vec<&str> = plan.due.iter().map(|n| n.as_str()).collect();
        assert_eq!(names, vec!["alpha", "beta", "gamma"]);
        assert!(plan.diagnostics.is_empty());
        assert_eq!(plan.decisions.len(), 3);
    }

    #[test]
    fn test_unsupported_recurrence_becomes_diagnostic() {
        let jobs = vec![
            JobRecord::new("monthly_report", "monthly 1"),
            JobRecord::new("news", "daily 9"),
        ];
        let plan = planner().plan(&jobs, no_history, utc(2024, 1, 2, 9, 5, 0));

        assert_eq!(plan.due, vec![JobName::from("news")]);
        assert!(!plan.is_due(&JobName::from("monthly_report")));
        assert_eq!(plan.diagnostics.len(), 1);
        let diagnostic = &plan.diagnostics[0];
        assert_eq!(diagnostic.job_name.as_str(), "monthly_report");
        assert_eq!(diagnostic.kind, DiagnosticKind::Unschedulable);
        assert!(diagnostic.message.contains("monthly 1"));
        assert!(plan.decision(&JobName::from("monthly_report")).is_none());
    }

    #[test]
    fn test_history_lookup_drives_decision() {
        let jobs = vec![
            JobRecord::new("fresh", "daily 9"),
            JobRecord::new("stale", "daily 9"),
        ];
        let now = utc(2024, 1, 5, 9, 30, 0);
        let plan = planner().plan(
            &jobs,
            |name| match name.as_str() {
                "fresh" => Some(utc(2024, 1, 5, 9, 0, 0)),
                _ => Some(utc(2024, 1, 4, 9, 0, 0)),
            },
            now,
        );

        assert_eq!(plan.due, vec![JobName::from("stale")]);
        let fresh = plan.decision(&JobName::from("fresh")).unwrap();
        assert!(!fresh.due);
        assert_eq!(fresh.next_run, utc(2024, 1, 6, 9, 0, 0));
    }

    #[test]
    fn test_duplicate_names_are_not_deduplicated() {
        let jobs = vec![
            JobRecord::new("news", "daily 9"),
            JobRecord::new("news", "hourly 1"),
        ];
        let plan = planner().plan(&jobs, no_history, utc(2024, 1, 2, 9, 5, 0));
        assert_eq!(plan.due.len(), 2);
    }

    #[test]
    fn test_evaluate_job_propagates_compile_error() {
        let job = JobRecord::new("broken", "weekly xx 14");
        let result = planner().evaluate_job(&job, None, utc(2024, 1, 2, 0, 0, 0));
        assert!(result.is_err());
    }

    #[test]
    fn test_empty_registry_gives_empty_plan() {
        let plan = planner().plan(&[], no_history, utc(2024, 1, 2, 0, 0, 0));
        assert!(plan.due.is_empty());
        assert!(plan.diagnostics.is_empty());
    }
}
