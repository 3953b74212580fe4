use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use parser_scheduler::app::Application;
use parser_scheduler::shutdown::{wait_for_shutdown_signal, ShutdownManager};
use parsers_config::{AppConfig, LogFormat};
use parsers_dispatcher::{DuePlan, RecurrenceCompiler, TickReport};
use parsers_infrastructure::DatabaseManager;

#[derive(Parser, Debug)]
#[command(name = "parser-scheduler")]
#[command(version = "1.0.0")]
#[command(about = "定时解析器调度系统")]
#[command(long_about = "按注册表中的调度周期，通过 docker compose 启动到期的解析器")]
struct Cli {
    /// 配置文件路径
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// 日志级别，覆盖配置文件
    #[arg(short = 'l', long, global = true, value_parser = ["trace", "debug", "info", "warn", "error"])]
    log_level: Option<String>,

    /// 日志格式，覆盖配置文件
    #[arg(long, global = true, value_parser = ["json", "pretty"])]
    log_format: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// 执行一次调度
    Run {
        /// 以JSON输出调度结果
        #[arg(long)]
        json: bool,
    },
    /// 按固定间隔持续调度，直到收到 Ctrl+C 或 SIGTERM
    Daemon,
    /// 计算到期任务，不启动任何进程
    Plan {
        /// 计算时间点（RFC3339），默认当前时间
        #[arg(long)]
        at: Option<String>,
        /// 以JSON输出
        #[arg(long)]
        json: bool,
    },
    /// 把调度周期编译成CRON表达式，例如 `compile weekly we 14`
    Compile {
        #[arg(required = true, num_args = 1.., trailing_var_arg = true, allow_hyphen_values = true)]
        recurrence: Vec<String>,
    },
    /// 加载并校验配置，输出生效的配置
    CheckConfig {
        /// 同时检查数据库连接
        #[arg(long)]
        connect: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // 旧版部署通过 .env 提供数据库和compose路径
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let config = AppConfig::load(cli.config.as_deref()).with_context(|| match &cli.config {
        Some(path) => format!("加载配置文件失败: {path}"),
        None => "加载配置失败".to_string(),
    })?;

    let log_level = cli
        .log_level
        .clone()
        .unwrap_or_else(|| config.observability.log_level.clone());
    let log_format = match &cli.log_format {
        Some(format) => format.parse::<LogFormat>().map_err(anyhow::Error::msg)?,
        None => config.observability.log_format,
    };
    init_logging(&log_level, log_format)?;

    match cli.command {
        Commands::Run { json } => run_once(config, json).await,
        Commands::Daemon => run_daemon(config).await,
        Commands::Plan { at, json } => plan(config, at.as_deref(), json).await,
        Commands::Compile { recurrence } => compile(&config, &recurrence.join(" ")),
        Commands::CheckConfig { connect } => check_config(&config, connect).await,
    }
}

/// 初始化日志系统
fn init_logging(log_level: &str, log_format: LogFormat) -> Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    let registry = tracing_subscriber::registry().with(env_filter);

    match log_format {
        LogFormat::Json => {
            registry
                .with(tracing_subscriber::fmt::layer().json())
                .try_init()
                .context("初始化JSON日志格式失败")?;
        }
        LogFormat::Pretty => {
            registry
                .with(tracing_subscriber::fmt::layer().pretty())
                .try_init()
                .context("初始化Pretty日志格式失败")?;
        }
    }

    Ok(())
}

async fn run_once(config: AppConfig, json: bool) -> Result<()> {
    let app = Application::new(config).await?;
    let result = app.run_once().await;
    app.close().await;

    let report = result?;
    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_tick_report(&report);
    }
    Ok(())
}

async fn run_daemon(config: AppConfig) -> Result<()> {
    info!("启动解析器调度守护进程");
    let app = Application::new(config).await?;
    let shutdown_manager = ShutdownManager::new();
    let shutdown_rx = shutdown_manager.subscribe().await;

    let daemon = app.run_daemon(shutdown_rx);
    tokio::pin!(daemon);

    tokio::select! {
        result = &mut daemon => {
            app.close().await;
            return result;
        }
        _ = wait_for_shutdown_signal() => {
            info!("收到关闭信号，开始优雅关闭...");
        }
    }

    shutdown_manager.shutdown().await;

    // 正在进行的调度会先完成
    match tokio::time::timeout(Duration::from_secs(30), &mut daemon).await {
        Ok(Ok(())) => info!("调度器已优雅关闭"),
        Ok(Err(e)) => error!("调度器关闭时发生错误: {e}"),
        Err(_) => warn!("调度器关闭超时，强制退出"),
    }

    app.close().await;
    info!("解析器调度守护进程已退出");
    Ok(())
}

async fn plan(config: AppConfig, at: Option<&str>, json: bool) -> Result<()> {
    let now = match at {
        Some(value) => DateTime::parse_from_rfc3339(value)
            .with_context(|| format!("无效的时间: {value}"))?
            .with_timezone(&Utc),
        None => Utc::now(),
    };

    let app = Application::new(config).await?;
    let result = app.plan(now).await;
    app.close().await;

    let plan = result?;
    if json {
        println!("{}", serde_json::to_string_pretty(&plan)?);
    } else {
        print_plan(&plan, now);
    }
    Ok(())
}

fn compile(config: &AppConfig, recurrence: &str) -> Result<()> {
    let compiler = RecurrenceCompiler::new(config.dispatcher.unknown_weekday);
    let expression = compiler
        .compile(recurrence)
        .with_context(|| format!("无法编译调度周期: {recurrence:?}"))?;
    println!("{expression}");
    Ok(())
}

async fn check_config(config: &AppConfig, connect: bool) -> Result<()> {
    config.validate()?;

    let mut effective = config.clone();
    effective.database.url = config.masked_database_url();
    println!("{}", effective.to_toml()?);
    info!("配置校验通过");

    if connect {
        let database = DatabaseManager::new(&config.database)
            .await
            .with_context(|| format!("连接数据库失败: {}", config.masked_database_url()))?;
        let result = database.health_check().await;
        database.close().await;
        result.context("数据库健康检查失败")?;
        info!("数据库连接正常");
    }
    Ok(())
}

fn print_plan(plan: &DuePlan, now: DateTime<Utc>) {
    println!("计算时间: {}", now.to_rfc3339());
    for (name, decision) in &plan.decisions {
        let marker = if decision.due { "*" } else { " " };
        println!(
            "{marker} {name:<32} 下次执行 {}",
            decision.next_run.format("%Y-%m-%d %H:%M:%S UTC")
        );
    }
    println!("到期: {}", plan.due.len());
    for diagnostic in &plan.diagnostics {
        println!("! {diagnostic}");
    }
}

fn print_tick_report(report: &TickReport) {
    println!(
        "到期 {} 个, 启动 {} 个, 运行中跳过 {} 个, 失败 {} 个 ({}ms)",
        report.plan.due.len(),
        report.launch.launched.len(),
        report.launch.skipped_running.len(),
        report.launch.failed.len(),
        report.duration.as_millis()
    );
    for name in &report.launch.launched {
        println!("+ {name}");
    }
    for name in &report.launch.skipped_running {
        println!("= {name}");
    }
    for diagnostic in report.diagnostics() {
        println!("! {diagnostic}");
    }
}
