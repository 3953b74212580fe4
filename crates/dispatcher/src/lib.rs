//! 解析器调度核心
//!
//! - `recurrence`: 调度周期字符串 → 五段式CRON表达式
//! - `cron_utils`: 到期判定
//! - `planner`: 纯计算的调度计划
//! - `scheduler` / `controller`: 读取注册表和历史，按顺序启动到期任务

pub mod controller;
pub mod cron_utils;
pub mod planner;
pub mod recurrence;
pub mod scheduler;

pub use controller::{LaunchController, LaunchReport, ParserDispatcher, TickReport};
pub use cron_utils::{CronScheduler, DueEvaluator};
pub use planner::{DuePlan, DuePlanner};
pub use recurrence::{compile, HourlyInterval, RecurrenceCompiler, RecurrenceSpec};
pub use scheduler::ParserScheduler;
