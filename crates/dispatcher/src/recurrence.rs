//! 调度周期编译器
//!
//! 支持三种写法，转换为标准五段式 CRON 表达式：
//!
//! | 调度周期        | CRON            |
//! |-----------------|-----------------|
//! | `daily 9`       | `0 9 * * *`     |
//! | `weekly we 14`  | `0 14 * * 3`    |
//! | `hourly 2`      | `0 */2 * * *`   |
//! | `hourly 0.5`    | `*/30 * * * *`  |

use chrono::Weekday;
use tracing::warn;

use parsers_domain::{weekday_from_abbrev, CronExpression, WeekdayPolicy};
use parsers_errors::RecurrenceError;

/// `hourly N` 的两种形式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HourlyInterval {
    /// 整数小时，整点触发
    EveryHours(u32),
    /// 小数小时换算成分钟
    EveryMinutes(u32),
}

/// 解析后的调度周期
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecurrenceSpec {
    Daily { hour: u32 },
    Weekly { weekday: Weekday, hour: u32 },
    Hourly(HourlyInterval),
}

impl RecurrenceSpec {
    pub fn to_cron(&self) -> CronExpression {
        match *self {
            RecurrenceSpec::Daily { hour } => CronExpression::daily(hour),
            RecurrenceSpec::Weekly { weekday, hour } => CronExpression::weekly(weekday, hour),
            RecurrenceSpec::Hourly(HourlyInterval::EveryHours(hours)) => {
                CronExpression::every_hours(hours)
            }
            RecurrenceSpec::Hourly(HourlyInterval::EveryMinutes(minutes)) => {
                CronExpression::every_minutes(minutes)
            }
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RecurrenceCompiler {
    weekday_policy: WeekdayPolicy,
}

impl RecurrenceCompiler {
    pub fn new(weekday_policy: WeekdayPolicy) -> Self {
        Self { weekday_policy }
    }

    pub fn parse(&self, raw: &str) -> Result<RecurrenceSpec, RecurrenceError> {
        let mut parts = raw.split_whitespace();
        let keyword = parts.next().ok_or(RecurrenceError::Empty)?;
        let args: Vec<&str> = parts.collect();

        match keyword {
            "daily" => {
                expect_arity("daily", &args, 1)?;
                Ok(RecurrenceSpec::Daily {
                    hour: parse_hour(args[0])?,
                })
            }
            "weekly" => {
                expect_arity("weekly", &args, 2)?;
                let weekday = self.parse_weekday(args[0])?;
                let hour = parse_hour(args[1])?;
                Ok(RecurrenceSpec::Weekly { weekday, hour })
            }
            "hourly" => {
                expect_arity("hourly", &args, 1)?;
                Ok(RecurrenceSpec::Hourly(parse_interval(args[0])?))
            }
            other => Err(RecurrenceError::UnsupportedKind {
                keyword: other.to_string(),
            }),
        }
    }

    pub fn compile(&self, raw: &str) -> Result<CronExpression, RecurrenceError> {
        self.parse(raw).map(|spec| spec.to_cron())
    }

    fn parse_weekday(&self, value: &str) -> Result<Weekday, RecurrenceError> {
        match (weekday_from_abbrev(value), self.weekday_policy) {
            (Some(weekday), _) => Ok(weekday),
            (None, WeekdayPolicy::DefaultMonday) => {
                warn!("未知的星期缩写 {}，按周一处理", value);
                Ok(Weekday::Mon)
            }
            (None, WeekdayPolicy::Reject) => Err(RecurrenceError::InvalidWeekday {
                value: value.to_string(),
            }),
        }
    }
}

/// 使用默认策略（拒绝未知星期）编译
pub fn compile(raw: &str) -> Result<CronExpression, RecurrenceError> {
    RecurrenceCompiler::default().compile(raw)
}

fn expect_arity(kind: &'static str, args: &[&str], expected: usize) -> Result<(), RecurrenceError> {
    if args.len() != expected {
        return Err(RecurrenceError::WrongArity {
            kind,
            expected,
            found: args.len(),
        });
    }
    Ok(())
}

fn parse_hour(value: &str) -> Result<u32, RecurrenceError> {
    value
        .parse::<u32>()
        .ok()
        .filter(|hour| *hour <= 23)
        .ok_or_else(|| RecurrenceError::InvalidHour {
            value: value.to_string(),
        })
}

fn parse_interval(value: &str) -> Result<HourlyInterval, RecurrenceError> {
    let invalid = |reason: String| RecurrenceError::InvalidInterval {
        value: value.to_string(),
        reason,
    };

    let hours: f64 = value
        .parse()
        .map_err(|_| invalid("不是有效的数字".to_string()))?;
    if !hours.is_finite() || hours <= 0.0 {
        return Err(invalid("必须是正数".to_string()));
    }

    if hours.fract() == 0.0 {
        if hours > 23.0 {
            return Err(RecurrenceError::HourStepOutOfRange {
                hours: hours as u64,
            });
        }
        return Ok(HourlyInterval::EveryHours(hours as u32));
    }

    let minutes = (hours * 60.0).round();
    if !(1.0..60.0).contains(&minutes) {
        return Err(invalid(format!("换算后的分钟间隔 {minutes} 必须在 1-59 之间")));
    }
    Ok(HourlyInterval::EveryMinutes(minutes as u32))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_daily() {
        let compiler = RecurrenceCompiler::default();
        assert_eq!(
            compiler.parse("daily 9").unwrap(),
            RecurrenceSpec::Daily { hour: 9 }
        );
        assert_eq!(
            compiler.parse("  daily   23 ").unwrap(),
            RecurrenceSpec::Daily { hour: 23 }
        );
    }

    #[test]
    fn test_parse_interval_forms() {
        assert_eq!(parse_interval("3").unwrap(), HourlyInterval::EveryHours(3));
        assert_eq!(parse_interval("1.0").unwrap(), HourlyInterval::EveryHours(1));
        assert_eq!(parse_interval("0.25").unwrap(), HourlyInterval::EveryMinutes(15));
        assert_eq!(parse_interval("0.1").unwrap(), HourlyInterval::EveryMinutes(6));
    }

    #[test]
    fn test_parse_interval_rejects_out_of_range() {
        for value in ["0", "-1", "1.5", "0.001", "abc", "inf", "NaN"] {
            assert!(
                matches!(
                    parse_interval(value),
                    Err(RecurrenceError::InvalidInterval { .. })
                ),
                "value {value} should be rejected"
            );
        }
        assert_eq!(
            parse_interval("24"),
            Err(RecurrenceError::HourStepOutOfRange { hours: 24 })
        );
    }

    #[test]
    fn test_keyword_must_match_exactly() {
        let compiler = RecurrenceCompiler::default();
        assert_eq!(
            compiler.parse("dailyx 9"),
            Err(RecurrenceError::UnsupportedKind {
                keyword: "dailyx".to_string()
            })
        );
        assert_eq!(
            compiler.parse("Daily 9"),
            Err(RecurrenceError::UnsupportedKind {
                keyword: "Daily".to_string()
            })
        );
    }
}
