use std::path::PathBuf;

use chrono::{DateTime, Duration, TimeZone, Utc};
use parsers_domain::WeekdayPolicy;
use serde::{Deserialize, Serialize};

pub const DEFAULT_HISTORY_HORIZON: &str = "2024-01-01T00:00:00Z";

/// 防抖时间上限：一周
pub const MAX_DEBOUNCE_SECONDS: i64 = 7 * 24 * 60 * 60;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatcherConfig {
    /// daemon 模式下两次调度之间的间隔
    pub schedule_interval_seconds: u64,
    /// 没有运行历史的任务以此时间作为计算起点
    pub history_horizon: DateTime<Utc>,
    /// 距上次运行不足该秒数时不再触发
    pub debounce_seconds: i64,
    pub unknown_weekday: WeekdayPolicy,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            schedule_interval_seconds: 60,
            history_horizon: Utc
                .with_ymd_and_hms(2024, 1, 1, 0, 0, 0)
                .single()
                .unwrap_or_default(),
            debounce_seconds: 60,
            unknown_weekday: WeekdayPolicy::Reject,
        }
    }
}

impl DispatcherConfig {
    pub fn debounce(&self) -> anyhow::Result<Duration> {
        if self.debounce_seconds < 0 {
            return Err(anyhow::anyhow!("防抖时间不能为负数"));
        }

        if self.debounce_seconds > MAX_DEBOUNCE_SECONDS {
            return Err(anyhow::anyhow!(
                "防抖时间不能超过 {} 秒: {}",
                MAX_DEBOUNCE_SECONDS,
                self.debounce_seconds
            ));
        }

        Duration::try_seconds(self.debounce_seconds)
            .ok_or_else(|| anyhow::anyhow!("防抖时间超出范围: {}", self.debounce_seconds))
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.schedule_interval_seconds == 0 {
            return Err(anyhow::anyhow!("调度间隔必须大于0"));
        }

        self.debounce()?;

        if self.history_horizon > Utc::now() {
            return Err(anyhow::anyhow!(
                "历史起点不能晚于当前时间: {}",
                self.history_horizon
            ));
        }

        Ok(())
    }
}

/// docker compose 启动配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LauncherConfig {
    pub docker_binary: String,
    /// docker-compose.yml 和 .env 所在目录
    pub compose_dir: PathBuf,
    pub compose_file: String,
    pub env_file: String,
    /// 使用 `up -d` 后台启动；为 false 时等待 compose 前台进程结束
    pub detach: bool,
    #[serde(default)]
    pub launch_timeout_seconds: Option<u64>,
}

impl Default for LauncherConfig {
    fn default() -> Self {
        Self {
            docker_binary: "docker".to_string(),
            compose_dir: PathBuf::from("."),
            compose_file: "docker-compose.yml".to_string(),
            env_file: ".env".to_string(),
            detach: false,
            launch_timeout_seconds: None,
        }
    }
}

impl LauncherConfig {
    pub fn compose_file_path(&self) -> PathBuf {
        self.compose_dir.join(&self.compose_file)
    }

    pub fn env_file_path(&self) -> PathBuf {
        self.compose_dir.join(&self.env_file)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.docker_binary.is_empty() {
            return Err(anyhow::anyhow!("docker可执行文件不能为空"));
        }

        if self.compose_file.is_empty() {
            return Err(anyhow::anyhow!("compose文件名不能为空"));
        }

        if self.launch_timeout_seconds == Some(0) {
            return Err(anyhow::anyhow!("启动超时时间必须大于0"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_horizon_matches_constant() {
        let parsed: DateTime<Utc> = DEFAULT_HISTORY_HORIZON.parse().unwrap();
        assert_eq!(DispatcherConfig::default().history_horizon, parsed);
    }

    #[test]
    fn test_dispatcher_validation() {
        assert!(DispatcherConfig::default().validate().is_ok());

        let config = DispatcherConfig {
            schedule_interval_seconds: 0,
            ..DispatcherConfig::default()
        };
        assert!(config.validate().is_err());

        let config = DispatcherConfig {
            debounce_seconds: -1,
            ..DispatcherConfig::default()
        };
        assert!(config.validate().is_err());

        let config = DispatcherConfig {
            history_horizon: Utc::now() + chrono::Duration::days(1),
            ..DispatcherConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_debounce_bounds() {
        let config = DispatcherConfig::default();
        assert_eq!(config.debounce().unwrap(), Duration::seconds(60));

        let config = DispatcherConfig {
            debounce_seconds: MAX_DEBOUNCE_SECONDS,
            ..DispatcherConfig::default()
        };
        assert_eq!(config.debounce().unwrap(), Duration::days(7));

        let config = DispatcherConfig {
            debounce_seconds: i64::MAX,
            ..DispatcherConfig::default()
        };
        assert!(config.debounce().is_err());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_launcher_paths() {
        let config = LauncherConfig {
            compose_dir: PathBuf::from("/srv/parsers"),
            ..LauncherConfig::default()
        };
        assert_eq!(
            config.compose_file_path(),
            PathBuf::from("/srv/parsers/docker-compose.yml")
        );
        assert_eq!(config.env_file_path(), PathBuf::from("/srv/parsers/.env"));
    }

    #[test]
    fn test_launcher_validation() {
        assert!(LauncherConfig::default().validate().is_ok());

        let config = LauncherConfig {
            launch_timeout_seconds: Some(0),
            ..LauncherConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
