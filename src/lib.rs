//! # Playground Automation
//!
//! 自动完成 UI Testing Playground 上的六个交互挑战，并输出通过 / 失败报告
//!
//! ## 架构设计
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有浏览器页面，只暴露页面控制能力
//! - `PageController` - 导航、等待、点击、输入、截图
//! - `browser/` - 启动或连接 Chromium，按需创建独立会话
//!
//! ### ② 业务能力层（Services）
//! - `RetryPolicy` - 瞬时错误的有限次重试
//! - `ScreenshotRecorder` - 每次失败尝试的诊断截图
//! - `ReportWriter` - 写 JSON 报告
//!
//! ### ③ 流程层（Workflow）
//! - `TaskFlow` - 六个任务各自的交互步骤和成功判定
//! - `RetryContext` - 当前任务的第几次尝试
//!
//! ### ④ 编排层（Orchestration）
//! - `RunScheduler` - 顺序 / 并行调度
//! - `ResultAggregator` - 汇总结果、生成报告

pub mod app;
pub mod browser;
pub mod cli;
pub mod config;
pub mod error;
pub mod infrastructure;
pub mod logger;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use app::App;
pub use cli::Cli;
pub use config::Config;
pub use error::{AppError, AppResult, InteractionError};
pub use infrastructure::{Locator, PageController, SessionFactory};
pub use models::{RunReport, TaskKind, TaskOutcome, TaskStatus, TaskValue};
pub use orchestrator::{ResultAggregator, RunScheduler, RunState};
pub use services::RetryPolicy;
pub use workflow::{RetryContext, TaskFlow};
