use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 解析器名称，同时也是 docker compose 服务名和容器名
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobName(String);

impl JobName {
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

impl AsRef<str> for JobName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for JobName {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for JobName {
    fn from(name: String) -> Self {
        Self(name)
    }
}

/// 注册表中的解析器记录
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobRecord {
    pub name: JobName,
    /// 原始调度周期，例如 "daily 9"、"weekly we 14"、"hourly 0.5"
    pub recurrence: String,
}

impl JobRecord {
    pub fn new<N: Into<JobName>, R: Into<String>>(name: N, recurrence: R) -> Self {
        Self {
            name: name.into(),
            recurrence: recurrence.into(),
        }
    }
}

/// 一次成功启动的记录
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunHistoryEntry {
    pub job_name: JobName,
    pub completed_at: DateTime<Utc>,
}

impl RunHistoryEntry {
    pub fn new(job_name: JobName, completed_at: DateTime<Utc>) -> Self {
        Self {
            job_name,
            completed_at,
        }
    }
}

/// 单个任务的到期判定结果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DueDecision {
    pub due: bool,
    pub next_run: DateTime<Utc>,
    /// 计算 next_run 的起点：上次运行时间或历史起点
    pub base_time: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// 调度周期无法编译
    Unschedulable,
    /// 运行历史读取失败
    HistoryUnavailable,
    /// 计算下次执行时间失败
    EvaluationFailed,
    /// 容器状态检查失败
    StatusCheckFailed,
    /// 启动失败
    LaunchFailed,
    /// 启动成功但写入运行历史失败
    HistoryWriteFailed,
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DiagnosticKind::Unschedulable => "unschedulable",
            DiagnosticKind::HistoryUnavailable => "history_unavailable",
            DiagnosticKind::EvaluationFailed => "evaluation_failed",
            DiagnosticKind::StatusCheckFailed => "status_check_failed",
            DiagnosticKind::LaunchFailed => "launch_failed",
            DiagnosticKind::HistoryWriteFailed => "history_write_failed",
        };
        f.write_str(s)
    }
}

/// 单个任务的诊断信息，不会中断整个调度周期
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobDiagnostic {
    pub job_name: JobName,
    pub kind: DiagnosticKind,
    pub message: String,
}

impl JobDiagnostic {
    pub fn new<M: Into<String>>(job_name: JobName, kind: DiagnosticKind, message: M) -> Self {
        Self {
            job_name,
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for JobDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.kind, self.job_name, self.message)
    }
}
