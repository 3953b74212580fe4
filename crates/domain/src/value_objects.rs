use std::fmt;

use chrono::Weekday;
use serde::{Deserialize, Serialize};

/// 标准五段式 CRON 表达式中的一个字段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CronField {
    /// `*`
    Any,
    /// 固定值，例如 `9`
    At(u32),
    /// 步长，例如 `*/30`
    Every(u32),
}

impl fmt::Display for CronField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CronField::Any => f.write_str("*"),
            CronField::At(value) => write!(f, "{value}"),
            CronField::Every(step) => write!(f, "*/{step}"),
        }
    }
}

/// 编译后的五段式 CRON 表达式（分 时 日 月 周），星期字段 0=周日..6=周六
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CronExpression {
    pub minute: CronField,
    pub hour: CronField,
    pub day_of_month: CronField,
    pub month: CronField,
    pub day_of_week: CronField,
}

impl CronExpression {
    /// `0 H * * *`
    pub fn daily(hour: u32) -> Self {
        Self {
            minute: CronField::At(0),
            hour: CronField::At(hour),
            day_of_month: CronField::Any,
            month: CronField::Any,
            day_of_week: CronField::Any,
        }
    }

    /// `0 H * * D`
    pub fn weekly(weekday: Weekday, hour: u32) -> Self {
        Self {
            day_of_week: CronField::At(cron_day_number(weekday)),
            ..Self::daily(hour)
        }
    }

    /// `0 */N * * *`
    pub fn every_hours(hours: u32) -> Self {
        Self {
            minute: CronField::At(0),
            hour: CronField::Every(hours),
            day_of_month: CronField::Any,
            month: CronField::Any,
            day_of_week: CronField::Any,
        }
    }

    /// `*/M * * * *`
    pub fn every_minutes(minutes: u32) -> Self {
        Self {
            minute: CronField::Every(minutes),
            hour: CronField::Any,
            day_of_month: CronField::Any,
            month: CronField::Any,
            day_of_week: CronField::Any,
        }
    }
}

impl fmt::Display for CronExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {} {}",
            self.minute, self.hour, self.day_of_month, self.month, self.day_of_week
        )
    }
}

/// 未知星期缩写的处理策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeekdayPolicy {
    /// 拒绝并报告 InvalidWeekday
    #[default]
    Reject,
    /// 兼容旧行为：按周一处理
    DefaultMonday,
}

/// 两字母小写星期缩写
pub fn weekday_from_abbrev(abbrev: &str) -> Option<Weekday> {
    match abbrev {
        "mo" => Some(Weekday::Mon),
        "tu" => Some(Weekday::Tue),
        "we" => Some(Weekday::Wed),
        "th" => Some(Weekday::Thu),
        "fr" => Some(Weekday::Fri),
        "sa" => Some(Weekday::Sat),
        "su" => Some(Weekday::Sun),
        _ => None,
    }
}

/// CRON 星期编号，0=周日
pub fn cron_day_number(weekday: Weekday) -> u32 {
    weekday.num_days_from_sunday()
}
