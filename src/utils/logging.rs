/// 日志工具模块
///
/// 提供日志格式化和输出的辅助函数
use tracing::info;

use crate::config::Config;
use crate::models::RunReport;

/// 记录程序启动信息
pub fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 UI Testing Playground 自动化启动");
    info!(
        "📊 重试次数: {} | 等待超时: {}s | 截图: {} | 并行: {}",
        config.retry_count,
        config.timeout_secs,
        if config.screenshots_enabled { "开启" } else { "关闭" },
        if config.parallel_enabled { "开启" } else { "关闭" }
    );
    info!("{}", "=".repeat(60));
}

/// 记录运行开始信息
pub fn log_run_start(total: usize, parallel: bool, max_workers: usize) {
    if parallel {
        info!("📋 共 {} 个任务，并行执行（最大并发数: {}）", total, max_workers);
    } else {
        info!("📋 共 {} 个任务，顺序执行", total);
    }
    info!("{}", "-".repeat(60));
}

/// 任务之间的分隔线
pub fn log_task_separator() {
    info!("{}", "-".repeat(60));
}

/// 打印最终统计信息
pub fn print_final_stats(report: &RunReport) {
    for line in report.render_summary().lines() {
        info!("{}", line);
    }
    info!(
        "完成时间: {}",
        report.timestamp.format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
}
