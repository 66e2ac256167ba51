//! 运行调度器 - 编排层
//!
//! ## 职责
//!
//! 1. **状态机**：`Idle → Running → Complete`，每个调度器只运行一次
//! 2. **顺序模式**：打开一个会话，按声明顺序逐个执行
//! 3. **并行模式**：Semaphore 限制并发，每个任务使用独立会话
//! 4. **结果汇总**：任务结果经 channel 送到唯一的汇总器
//!
//! 单个任务的失败（包括 panic）只影响它自己的结果，不会中断整次运行

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::FutureExt;
use tokio::sync::{mpsc, Semaphore};
use tracing::{error, info};

use crate::config::Config;
use crate::error::{AppResult, SchedulerError};
use crate::infrastructure::{PageController, SessionFactory};
use crate::models::{ConfigSnapshot, RunReport, TaskKind, TaskOutcome};
use crate::orchestrator::aggregator::ResultAggregator;
use crate::utils::logging;
use crate::workflow::TaskFlow;

/// 调度器状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Running,
    Complete,
}

/// 运行调度器
pub struct RunScheduler<F: SessionFactory> {
    config: Config,
    flow: Arc<TaskFlow>,
    factory: Arc<F>,
    state: RunState,
}

impl<F: SessionFactory> RunScheduler<F> {
    pub fn new(config: Config, factory: Arc<F>) -> Self {
        let flow = Arc::new(TaskFlow::new(&config));
        Self::with_flow(config, flow, factory)
    }

    pub fn with_flow(config: Config, flow: Arc<TaskFlow>, factory: Arc<F>) -> Self {
        Self {
            config,
            flow,
            factory,
            state: RunState::Idle,
        }
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    /// 并行模式的并发数，0 按 1 处理
    fn workers(&self) -> usize {
        self.config.max_workers.max(1)
    }

    /// 执行给定的任务列表并生成报告
    pub async fn run(&mut self, tasks: &[TaskKind]) -> AppResult<RunReport> {
        if self.state != RunState::Idle {
            return Err(SchedulerError::AlreadyStarted.into());
        }
        self.state = RunState::Running;

        logging::log_run_start(tasks.len(), self.config.parallel_enabled, self.workers());
        let started = Instant::now();

        let collected = if self.config.parallel_enabled {
            self.run_parallel(tasks).await
        } else {
            Ok(self.run_sequential(tasks).await)
        };
        self.state = RunState::Complete;

        let aggregator = collected?;
        Ok(aggregator.finish(
            tasks,
            started.elapsed(),
            ConfigSnapshot::from(&self.config),
        ))
    }

    /// 所有任务共用一个会话，跑完后关闭
    async fn run_sequential(&self, tasks: &[TaskKind]) -> ResultAggregator {
        let mut aggregator = ResultAggregator::new();
        let started = Instant::now();

        let session = match self.factory.open_session().await {
            Ok(session) => session,
            Err(e) => {
                error!("❌ 无法创建会话: {}", e);
                for &kind in tasks {
                    aggregator.record(
                        TaskOutcome::failed(kind, started.elapsed())
                            .with_detail(format!("无法创建会话: {}", e)),
                    );
                }
                return aggregator;
            }
        };

        for &kind in tasks {
            let outcome = execute_guarded(&self.flow, kind, &session).await;
            aggregator.record(outcome);
            logging::log_task_separator();
        }
        self.factory.close_session(session).await;
        aggregator
    }

    async fn run_parallel(&self, tasks: &[TaskKind]) -> AppResult<ResultAggregator> {
        let semaphore = Arc::new(Semaphore::new(self.workers()));
        let (tx, mut rx) = mpsc::unbounded_channel::<TaskOutcome>();
        let mut handles = Vec::with_capacity(tasks.len());

        for &kind in tasks {
            let permit = semaphore
                .clone()
                .acquire_owned()
                .await
                .map_err(|_| SchedulerError::PoolClosed)?;
            let factory = Arc::clone(&self.factory);
            let flow = Arc::clone(&self.flow);
            let tx = tx.clone();

            let handle = tokio::spawn(async move {
                let _permit = permit;
                let started = Instant::now();
                let outcome = match factory.open_session().await {
                    Ok(session) => {
                        let outcome = execute_guarded(&flow, kind, &session).await;
                        factory.close_session(session).await;
                        outcome
                    }
                    Err(e) => {
                        error!("[{}] ❌ 无法创建独立会话: {}", kind, e);
                        TaskOutcome::failed(kind, started.elapsed())
                            .with_detail(format!("无法创建独立会话: {}", e))
                    }
                };
                // 接收端在所有任务结束前不会关闭
                let _ = tx.send(outcome);
            });
            handles.push((kind, handle));
        }
        drop(tx);

        let mut aggregator = ResultAggregator::new();
        while let Some(outcome) = rx.recv().await {
            info!("[{}] 完成: {}", outcome.task_name, outcome.status);
            aggregator.record(outcome);
        }

        for (kind, handle) in handles {
            if let Err(e) = handle.await {
                error!("[{}] 任务执行失败: {}", kind, e);
                if aggregator.get(kind.name()).is_none() {
                    aggregator.record(
                        TaskOutcome::failed(kind, Duration::ZERO).with_detail(e.to_string()),
                    );
                }
            }
        }

        Ok(aggregator)
    }
}

/// 执行单个任务，panic 也转换成失败结果
async fn execute_guarded<P: PageController>(flow: &TaskFlow, kind: TaskKind, page: &P) -> TaskOutcome {
    let started = Instant::now();
    match AssertUnwindSafe(flow.execute(kind, page)).catch_unwind().await {
        Ok(outcome) => outcome,
        Err(_) => {
            error!("[{}] ❌ 任务异常终止", kind);
            TaskOutcome::failed(kind, started.elapsed()).with_detail("任务异常终止")
        }
    }
}
