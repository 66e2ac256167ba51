use std::path::PathBuf;

use clap::Parser;

use crate::config::Config;

/// UI Testing Playground 自动化
#[derive(Parser, Debug, Default)]
#[command(name = "playground-automation", version, about)]
pub struct Cli {
    /// 无头模式运行
    #[arg(long)]
    pub headless: bool,

    /// 每个任务的最大尝试次数（默认 3）
    #[arg(long)]
    pub retry: Option<u32>,

    /// 等待超时秒数（默认 10）
    #[arg(long)]
    pub timeout: Option<u64>,

    /// 失败时截图（默认开启）
    #[arg(long, overrides_with = "no_screenshots")]
    pub screenshots: bool,

    /// 关闭失败截图
    #[arg(long = "no-screenshots", overrides_with = "screenshots")]
    pub no_screenshots: bool,

    /// 并行执行任务
    #[arg(long)]
    pub parallel: bool,

    /// 并行模式下的最大并发数
    #[arg(long)]
    pub workers: Option<usize>,

    /// 只运行该 URL 对应的任务，无法识别时运行全部任务
    #[arg(long = "auto-run", value_name = "URL")]
    pub auto_run: Option<String>,

    /// 配置文件路径（默认读取当前目录下的 automation.toml）
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// JSON 报告输出路径
    #[arg(long, value_name = "PATH")]
    pub report: Option<String>,
}

impl Cli {
    /// 命令行参数覆盖配置；未给出的参数保留配置中的值
    pub fn apply(&self, config: &mut Config) {
        if self.headless {
            config.headless = true;
        }
        if let Some(retry) = self.retry {
            config.retry_count = retry;
        }
        if let Some(timeout) = self.timeout {
            config.timeout_secs = timeout;
        }
        if self.no_screenshots {
            config.screenshots_enabled = false;
        } else if self.screenshots {
            config.screenshots_enabled = true;
        }
        if self.parallel {
            config.parallel_enabled = true;
        }
        if let Some(workers) = self.workers {
            config.max_workers = workers;
        }
        if let Some(url) = &self.auto_run {
            config.auto_run_url = Some(url.clone());
        }
        if let Some(report) = &self.report {
            config.report_file = report.clone();
        }
    }
}
