use thiserror::Error;


/// 调度周期字符串（update_period）的解析错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecurrenceError {
    #[error("调度周期为空")]
    Empty,
    #[error("不支持的调度周期类型: {keyword}")]
    UnsupportedKind { keyword: String },
    #[error("调度周期 {kind} 需要 {expected} 个参数，实际为 {found} 个")]
    WrongArity {
        kind: &'static str,
        expected: usize,
        found: usize,
    },
    #[error("无效的小时: {value} (允许范围 0-23)")]
    InvalidHour { value: String },
    #[error("无效的星期缩写: {value} (允许 mo/tu/we/th/fr/sa/su)")]
    InvalidWeekday { value: String },
    /// 非正数、非数字，或换算后的分钟不在 1-59 之间
    #[error("无效的执行间隔: {value} - {reason}")]
    InvalidInterval { value: String, reason: String },
    /// 整数小时间隔只允许 1-23，`hourly 24` 及以上不被接受
    #[error("整数小时间隔超出范围: {hours} (允许范围 1-23)")]
    HourStepOutOfRange { hours: u64 },
}

#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("数据库错误: {0}")]
    Database(#[from] sqlx::Error),
    #[error("数据库操作错误: {0}")]
    DatabaseOperation(String),
    #[error("无法调度的任务: {0}")]
    Recurrence(#[from] RecurrenceError),
    #[error("无效的CRON表达式: {expr} - {message}")]
    InvalidCron { expr: String, message: String },
    #[error("CRON表达式没有后续执行时间: {expr}")]
    ScheduleExhausted { expr: String },
    #[error("容器状态检查失败: {job} - {message}")]
    StatusCheck { job: String, message: String },
    #[error("解析器启动失败: {job} - {message}")]
    Launch { job: String, message: String },
    #[error("解析器启动超时: {job} ({seconds}秒)")]
    LaunchTimeout { job: String, seconds: u64 },
    #[error("配置错误: {0}")]
    Configuration(String),
    #[error("内部错误: {0}")]
    Internal(String),
}

pub type SchedulerResult<T> = Result<T, SchedulerError>;

impl SchedulerError {
    pub fn database_error<S: Into<String>>(msg: S) -> Self {
        Self::DatabaseOperation(msg.into())
    }
    pub fn config_error<S: Into<String>>(msg: S) -> Self {
        Self::Configuration(msg.into())
    }
    pub fn launch_error<J: Into<String>, S: Into<String>>(job: J, msg: S) -> Self {
        Self::Launch {
            job: job.into(),
            message: msg.into(),
        }
    }
    pub fn status_check_error<J: Into<String>, S: Into<String>>(job: J, msg: S) -> Self {
        Self::StatusCheck {
            job: job.into(),
            message: msg.into(),
        }
    }
    /// 重试也无法恢复的错误，守护进程应停止
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            SchedulerError::Internal(_) | SchedulerError::Configuration(_)
        )
    }
}

impl From<anyhow::Error> for SchedulerError {
    fn from(err: anyhow::Error) -> Self {
        SchedulerError::Internal(err.to_string())
    }
}
