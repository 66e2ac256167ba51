//! 编排层（Orchestration Layer）
//!
//! ## 模块划分
//!
//! ### `scheduler` - 运行调度器
//! - 顺序 / 并行两种模式
//! - 控制并发数量（Semaphore）
//! - 管理会话（共享会话 / 每任务独立会话）
//!
//! ### `aggregator` - 结果汇总器
//! - 收集每个任务的结果
//! - 按任务声明顺序生成报告
//!
//! ## 层次关系
//!
//! ```text
//! app (配置、浏览器、报告落盘)
//!     ↓
//! orchestrator::scheduler (处理 Vec<TaskKind>)
//!     ↓
//! workflow::TaskFlow (处理单个任务)
//!     ↓
//! services (能力层：retry / screenshot / report)
//!     ↓
//! infrastructure (基础设施：PageController)
//! ```

pub mod aggregator;
pub mod scheduler;

pub use aggregator::ResultAggregator;
pub use scheduler::{RunScheduler, RunState};
