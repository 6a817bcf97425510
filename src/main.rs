//! Daily Chapter Fetcher：每次运行按进度抓取配置书目的下一章并保存到本地。
//!
//! 代码结构（读代码入口）：
//! - `base_system`：配置/日志/JSON 存取等基础设施
//! - `book_source`：书目与章节地址解析
//! - `network`：HTTP 抓取
//! - `download`：校验、保存与单次运行编排

use std::path::Path;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;

mod base_system;
mod book_source;
mod download;
mod network;

use base_system::config;
use base_system::logging::{LogOptions, LogSystem};
use download::runner::run_once;
use network::HttpFetcher;
use tracing::debug;

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Parser)]
#[command(name = "daily-chapter-fetcher")]
#[command(about = "Fetch the next chapter of the active book and record progress")]
struct Cli {
    /// 启用调试日志输出
    #[arg(long, default_value_t = false)]
    debug: bool,

    /// 控制台日志不使用颜色（非终端输出时自动关闭）
    #[arg(long, default_value_t = false)]
    no_color: bool,

    /// 显示版本信息后退出
    #[arg(long, default_value_t = false)]
    version: bool,

    /// 数据目录路径（存放 config.yml、logs 以及相对路径的书目/进度/章节）
    #[arg(long)]
    data_dir: Option<String>,
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    if cli.version {
        println!("Daily Chapter Fetcher v{}", VERSION);
        return Ok(ExitCode::SUCCESS);
    }

    let data_dir = cli.data_dir.as_deref().map(Path::new);
    // 日志是否归档由 config.yml 决定，所以先读配置
    let config = config::load_or_create(data_dir).context("load config.yml")?;

    let options = LogOptions::new(cli.debug, cli.no_color, config.archive_logs_on_exit);
    let _log = LogSystem::init(options, data_dir).context("init logging")?;
    debug!("config: {:?}", config);

    let fetcher = HttpFetcher::new(&config.user_agent, config.timeout())?;
    let outcome = run_once(&config, &fetcher)?;
    debug!("outcome: {:?}", outcome);

    Ok(outcome.exit_code())
}
