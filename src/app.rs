//! 应用入口
//!
//! 1. **初始化**：校验配置、启动或连接浏览器
//! 2. **选择任务**：自动运行 URL 对应的任务，或者全部任务
//! 3. **调度执行**：交给 `RunScheduler`
//! 4. **输出报告**：打印汇总并尽力写入 JSON
//! 5. **清理**：关闭浏览器

use std::sync::Arc;

use tracing::{info, warn};

use crate::browser::ChromeSessions;
use crate::config::Config;
use crate::error::AppResult;
use crate::models::{RunReport, TaskKind};
use crate::orchestrator::RunScheduler;
use crate::services::ReportWriter;
use crate::utils::logging;

/// 应用主结构
pub struct App {
    config: Config,
    sessions: Arc<ChromeSessions>,
}

impl App {
    /// 初始化应用
    ///
    /// 拿不到浏览器是唯一的致命错误
    pub async fn initialize(config: Config) -> AppResult<Self> {
        config.validate()?;
        logging::log_startup(&config);

        let sessions = ChromeSessions::start(&config).await?;
        Ok(Self {
            config,
            sessions: Arc::new(sessions),
        })
    }

    /// 运行全部流程，结束后关闭浏览器
    pub async fn run(self) -> AppResult<RunReport> {
        let result = self.execute().await;
        self.shutdown().await;

        let report = result?;
        logging::print_final_stats(&report);
        Ok(report)
    }

    async fn execute(&self) -> AppResult<RunReport> {
        let tasks = TaskKind::selection(self.config.auto_run_url.as_deref());

        // 会话由调度器按模式打开：顺序模式一个，并行模式每个任务一个
        let mut scheduler = RunScheduler::new(self.config.clone(), Arc::clone(&self.sessions));
        let report = scheduler.run(&tasks).await?;
        ReportWriter::new(&self.config.report_file)
            .persist(&report)
            .await;
        Ok(report)
    }

    async fn shutdown(self) {
        match Arc::try_unwrap(self.sessions) {
            Ok(sessions) => sessions.shutdown().await,
            Err(_) => warn!("⚠️ 浏览器仍被占用，跳过关闭"),
        }
        info!("程序结束");
    }
}
