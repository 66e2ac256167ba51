//! 重试策略 - 业务能力层
//!
//! 只负责"有限次重试"能力：瞬时错误重试，其余错误立即返回

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::sleep;
use tracing::{debug, error, warn};

use crate::error::{InteractionError, InteractionResult};
use crate::workflow::RetryContext;

/// 失败尝试观察者
///
/// 每次瞬时失败后被调用（包括最后一次），用于截图等诊断动作
#[async_trait]
pub trait AttemptObserver: Send + Sync {
    async fn on_failed_attempt(&self, ctx: &RetryContext, error: &InteractionError);
}

/// 不做任何事的观察者
pub struct NoopObserver;

#[async_trait]
impl AttemptObserver for NoopObserver {
    async fn on_failed_attempt(&self, _ctx: &RetryContext, _error: &InteractionError) {}
}

/// 重试策略
///
/// 固定间隔，无退避增长
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    delay: Duration,
}

impl RetryPolicy {
    /// `max_attempts` 为 0 时按 1 处理
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub async fn run<T, F, Fut>(&self, task_name: &str, action: F) -> InteractionResult<T>
    where
        F: FnMut() -> Fut + Send,
        Fut: Future<Output = InteractionResult<T>> + Send,
        T: Send,
    {
        self.run_observed(task_name, &NoopObserver, action).await
    }

    /// 执行 `action`，瞬时错误时重试
    ///
    /// 重试耗尽后返回最后一次的瞬时错误；非瞬时错误立即返回，不调用观察者
    pub async fn run_observed<T, F, Fut, O>(
        &self,
        task_name: &str,
        observer: &O,
        mut action: F,
    ) -> InteractionResult<T>
    where
        F: FnMut() -> Fut + Send,
        Fut: Future<Output = InteractionResult<T>> + Send,
        T: Send,
        O: AttemptObserver + ?Sized,
    {
        let mut attempt = 1;
        loop {
            let ctx = RetryContext::new(task_name, attempt, self.max_attempts);
            if attempt > 1 {
                warn!(
                    task = task_name,
                    attempt,
                    max_attempts = self.max_attempts,
                    "RETRY 第 {}/{} 次尝试 {}",
                    attempt,
                    self.max_attempts,
                    task_name
                );
            }

            match action().await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_transient() => {
                    debug!("{} 第 {} 次尝试失败 ({}): {}", task_name, attempt, e.kind(), e);
                    observer.on_failed_attempt(&ctx, &e).await;

                    if ctx.is_last() {
                        error!(
                            task = task_name,
                            attempts = self.max_attempts,
                            "{} 在 {} 次尝试后失败: {}",
                            task_name,
                            self.max_attempts,
                            e
                        );
                        return Err(e);
                    }
                    sleep(self.delay).await;
                }
                Err(e) => return Err(e),
            }
            attempt += 1;
        }
    }
}
