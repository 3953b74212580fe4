//! 解析器调度系统配置
//!
//! 加载顺序（后者覆盖前者）：
//! 1. 内置默认值
//! 2. TOML 配置文件
//! 3. 旧版环境变量（`DB_HOST`、`DB_NAME`、`DB_USER`、`DB_PASSWORD`、`DB_TABLE`、`DOCKER_COMPOSE_PATH`）
//! 4. `PARSERS_<SECTION>__<KEY>` 环境变量

pub mod legacy_env;
pub mod models;


pub use legacy_env::LegacyEnv;
pub use models::{
    AppConfig, DatabaseConfig, DispatcherConfig, LauncherConfig, LogFormat, ObservabilityConfig,
};
