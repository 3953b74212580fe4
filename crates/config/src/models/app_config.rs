use anyhow::{Context, Result};
use config::{Config as ConfigBuilder, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::Path;

use super::{
    database::DatabaseConfig,
    dispatcher_worker::{DispatcherConfig, LauncherConfig, DEFAULT_HISTORY_HORIZON},
    observability::ObservabilityConfig,
};
use crate::legacy_env::LegacyEnv;

/// System configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub dispatcher: DispatcherConfig,
    pub launcher: LauncherConfig,
    pub observability: ObservabilityConfig,
}

impl AppConfig {
    /// Load configuration from config file and environment variables
    ///
    /// Load order:
    /// 1. Default configuration
    /// 2. Config file (TOML format)
    /// 3. Legacy variables (DB_HOST, DB_TABLE, DOCKER_COMPOSE_PATH, ...)
    /// 4. Environment variable overrides (prefix: PARSERS_, nested keys separated by `__`)
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        Self::load_with(config_path, &LegacyEnv::from_env())
    }

    /// 与 [`AppConfig::load`] 相同，但旧版环境变量由调用方提供
    pub fn load_with(config_path: Option<&str>, legacy: &LegacyEnv) -> Result<Self> {
        Self::load_from(config_path, legacy, Self::environment())
    }

    /// `PARSERS_` 前缀的环境变量源，嵌套键以 `__` 分隔
    pub(crate) fn environment() -> Environment {
        Environment::with_prefix("PARSERS")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true)
    }

    pub(crate) fn load_from(
        config_path: Option<&str>,
        legacy: &LegacyEnv,
        environment: Environment,
    ) -> Result<Self> {
        let mut builder = Self::defaults(ConfigBuilder::builder())?;

        // 1. Load config file if provided
        if let Some(path) = config_path {
            if Path::new(path).exists() {
                builder = builder.add_source(File::new(path, FileFormat::Toml));
            } else {
                return Err(anyhow::anyhow!("配置文件不存在: {}", path));
            }
        } else {
            let default_paths = [
                "config/parsers.toml",
                "parsers.toml",
                "/etc/parser-scheduler/config.toml",
            ];

            if let Some(path) = default_paths.iter().find(|p| Path::new(p).exists()) {
                builder = builder.add_source(File::new(path, FileFormat::Toml));
            }
        }

        // 2. Legacy deployment variables, above the file but below PARSERS_*
        if let Some(legacy_toml) = legacy.to_toml()? {
            builder = builder.add_source(File::from_str(&legacy_toml, FileFormat::Toml));
        }

        // 3. Environment variable overrides - highest priority
        builder = builder.add_source(environment);

        let config: AppConfig = builder
            .build()
            .context("构建配置失败")?
            .try_deserialize()
            .context("反序列化配置失败")?;

        config.validate()?;

        Ok(config)
    }

    fn defaults(
        builder: config::builder::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<config::builder::ConfigBuilder<config::builder::DefaultState>> {
        let database = DatabaseConfig::default();
        let launcher = LauncherConfig::default();
        let builder = builder
            .set_default("database.url", database.url)?
            .set_default("database.max_connections", database.max_connections)?
            .set_default("database.min_connections", database.min_connections)?
            .set_default(
                "database.connection_timeout_seconds",
                database.connection_timeout_seconds,
            )?
            .set_default("database.idle_timeout_seconds", database.idle_timeout_seconds)?
            .set_default("database.registry_table", database.registry_table)?
            .set_default("database.history_table", database.history_table)?
            .set_default("dispatcher.schedule_interval_seconds", 60)?
            .set_default("dispatcher.history_horizon", DEFAULT_HISTORY_HORIZON)?
            .set_default("dispatcher.debounce_seconds", 60)?
            .set_default("dispatcher.unknown_weekday", "reject")?
            .set_default("launcher.docker_binary", launcher.docker_binary)?
            .set_default(
                "launcher.compose_dir",
                launcher.compose_dir.to_string_lossy().to_string(),
            )?
            .set_default("launcher.compose_file", launcher.compose_file)?
            .set_default("launcher.env_file", launcher.env_file)?
            .set_default("launcher.detach", launcher.detach)?
            .set_default("observability.log_level", "info")?
            .set_default("observability.log_format", "pretty")?;
        Ok(builder)
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(toml_str).context("解析TOML配置失败")?;

        config.validate()?;
        Ok(config)
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("序列化配置为TOML失败")
    }

    /// Validate configuration effectiveness
    pub fn validate(&self) -> Result<()> {
        self.database.validate().context("数据库配置验证失败")?;

        self.dispatcher
            .validate()
            .context("Dispatcher配置验证失败")?;

        self.launcher.validate().context("Launcher配置验证失败")?;

        self.observability
            .validate()
            .context("可观测性配置验证失败")?;

        Ok(())
    }

    /// 日志输出用，隐藏数据库密码
    pub fn masked_database_url(&self) -> String {
        match url::Url::parse(&self.database.url) {
            Ok(mut url) if url.password().is_some() => {
                let _ = url.set_password(Some("***"));
                url.to_string()
            }
            Ok(url) => url.to_string(),
            Err(_) => "<invalid url>".to_string(),
        }
    }
}
