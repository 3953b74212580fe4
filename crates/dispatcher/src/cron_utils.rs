use chrono::{DateTime, Duration, Utc};
use cron::Schedule;
use std::str::FromStr;
use tracing::debug;

use parsers_domain::{CronExpression, CronField, DueDecision};
use parsers_errors::{SchedulerError, SchedulerResult};

const DAY_NAMES: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

/// CRON表达式解析和调度工具
pub struct CronScheduler {
    schedule: Schedule,
}

impl CronScheduler {
    /// 由五段式表达式创建调度器
    pub fn from_expression(expression: &CronExpression) -> SchedulerResult<Self> {
        let expr = to_schedule_expression(expression);
        let schedule = Schedule::from_str(&expr).map_err(|e| SchedulerError::InvalidCron {
            expr: expression.to_string(),
            message: e.to_string(),
        })?;

        Ok(Self { schedule })
    }

    /// 严格晚于 `from` 的第一个匹配时间
    pub fn next_after(&self, from: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.schedule.after(&from).next()
    }

    /// 不早于 `from` 的第一个匹配时间
    pub fn next_at_or_after(&self, from: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.schedule
            .after(&(from - Duration::seconds(1)))
            .find(|next| *next >= from)
    }
}

/// `cron` crate 使用带秒字段的六段式，星期用名称表示以避开编号差异
fn to_schedule_expression(expression: &CronExpression) -> String {
    let day_of_week = match expression.day_of_week {
        CronField::At(day) => DAY_NAMES
            .get(day as usize)
            .map(|name| name.to_string())
            .unwrap_or_else(|| day.to_string()),
        other => other.to_string(),
    };
    format!(
        "0 {} {} {} {} {}",
        expression.minute, expression.hour, expression.day_of_month, expression.month, day_of_week
    )
}

/// 到期判定
#[derive(Debug, Clone, Copy)]
pub struct DueEvaluator {
    history_horizon: DateTime<Utc>,
    debounce: Duration,
}

impl DueEvaluator {
    pub fn new(history_horizon: DateTime<Utc>, debounce: Duration) -> Self {
        Self {
            history_horizon,
            debounce,
        }
    }

    /// 没有运行历史时从历史起点（含）开始找第一个匹配时间，
    /// 有历史时取严格晚于上次运行的第一个匹配时间。
    /// 到期条件：`next_run <= now` 且距 base_time 超过防抖时间。
    pub fn evaluate(
        &self,
        expression: &CronExpression,
        last_run: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> SchedulerResult<DueDecision> {
        let scheduler = CronScheduler::from_expression(expression)?;

        let (base_time, next_run) = match last_run {
            Some(last) => (last, scheduler.next_after(last)),
            None => (
                self.history_horizon,
                scheduler.next_at_or_after(self.history_horizon),
            ),
        };
        let next_run = next_run.ok_or_else(|| SchedulerError::ScheduleExhausted {
            expr: expression.to_string(),
        })?;

        let reached = next_run <= now;
        let elapsed = now - base_time;
        let due = reached && elapsed > self.debounce;

        if reached && !due {
            debug!(
                "距上次运行仅 {} 秒，未超过防抖时间 {} 秒: 表达式={}, 下次执行={}",
                elapsed.num_seconds(),
                self.debounce.num_seconds(),
                expression,
                next_run.format("%Y-%m-%d %H:%M:%S UTC")
            );
        }

        Ok(DueDecision {
            due,
            next_run,
            base_time,
        })
    }
}
