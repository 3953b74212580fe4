use std::ffi::OsString;
use std::process::{Output, Stdio};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, info, warn};

use parsers_config::LauncherConfig;
use parsers_domain::{ContainerStatusOracle, JobName, ProcessLauncher};
use parsers_errors::{SchedulerError, SchedulerResult};

/// 通过 `docker compose up` 启动与解析器同名的服务
pub struct DockerComposeLauncher {
    config: LauncherConfig,
}

impl DockerComposeLauncher {
    pub fn new(config: LauncherConfig) -> Self {
        Self { config }
    }

    /// `compose -f <dir>/docker-compose.yml --env-file <dir>/.env up [-d] <job>`
    pub fn command_args(&self, job_name: &JobName) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![
            "compose".into(),
            "-f".into(),
            self.config.compose_file_path().into_os_string(),
            "--env-file".into(),
            self.config.env_file_path().into_os_string(),
            "up".into(),
        ];
        if self.config.detach {
            args.push("-d".into());
        }
        args.push(job_name.as_str().into());
        args
    }

    async fn run(&self, job_name: &JobName) -> SchedulerResult<Output> {
        let mut cmd = Command::new(&self.config.docker_binary);
        cmd.args(self.command_args(job_name))
            .current_dir(&self.config.compose_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let output = cmd.output();
        let result = match self.config.launch_timeout_seconds {
            Some(seconds) => tokio::time::timeout(Duration::from_secs(seconds), output)
                .await
                .map_err(|_| SchedulerError::LaunchTimeout {
                    job: job_name.to_string(),
                    seconds,
                })?,
            None => output.await,
        };

        result.map_err(|e| {
            SchedulerError::launch_error(
                job_name.as_str(),
                format!("无法执行 {}: {e}", self.config.docker_binary),
            )
        })
    }
}

#[async_trait]
impl ProcessLauncher for DockerComposeLauncher {
    async fn launch(&self, job_name: &JobName) -> SchedulerResult<()> {
        let start = Instant::now();
        info!(
            "启动解析器: {} (compose文件: {}, detach={})",
            job_name,
            self.config.compose_file_path().display(),
            self.config.detach
        );

        let output = self.run(job_name).await?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            let message = if stderr.is_empty() {
                format!("{}", output.status)
            } else {
                format!("{}: {stderr}", output.status)
            };
            return Err(SchedulerError::launch_error(job_name.as_str(), message));
        }

        debug!(
            "解析器 {} 的compose命令结束，耗时 {}ms",
            job_name,
            start.elapsed().as_millis()
        );
        Ok(())
    }
}

/// 通过 `docker ps` 判断同名容器是否在运行
pub struct DockerStatusOracle {
    docker_binary: String,
}

impl DockerStatusOracle {
    pub fn new<S: Into<String>>(docker_binary: S) -> Self {
        Self {
            docker_binary: docker_binary.into(),
        }
    }

    pub fn command_args(job_name: &JobName) -> Vec<String> {
        vec![
            "ps".to_string(),
            "--filter".to_string(),
            format!("name={job_name}"),
            "--format".to_string(),
            "{{.Names}}".to_string(),
        ]
    }

    /// `name=` 过滤是子串匹配，这里要求整行完全相同
    pub fn output_lists(stdout: &str, job_name: &JobName) -> bool {
        stdout
            .lines()
            .map(str::trim)
            .any(|line| line == job_name.as_str())
    }
}

#[async_trait]
impl ContainerStatusOracle for DockerStatusOracle {
    async fn is_running(&self, job_name: &JobName) -> SchedulerResult<bool> {
        let output = Command::new(&self.docker_binary)
            .args(Self::command_args(job_name))
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| {
                SchedulerError::status_check_error(
                    job_name.as_str(),
                    format!("无法执行 {}: {e}", self.docker_binary),
                )
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            warn!("docker ps 执行失败: {} - {}", output.status, stderr.trim());
            return Err(SchedulerError::status_check_error(
                job_name.as_str(),
                format!("{}: {}", output.status, stderr.trim()),
            ));
        }

        let running = Self::output_lists(&String::from_utf8_lossy(&output.stdout), job_name);
        debug!("解析器 {} 容器运行状态: {}", job_name, running);
        Ok(running)
    }
}
