//! 重试上下文
//!
//! 封装"我正在执行哪个任务的第几次尝试"这一信息

use std::fmt::Display;

/// 重试上下文
///
/// 只在一次重试循环内有效
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryContext {
    /// 任务名称
    pub task_name: String,

    /// 当前尝试次数（从1开始）
    pub attempt: u32,

    /// 最大尝试次数
    pub max_attempts: u32,
}

impl RetryContext {
    pub fn new(task_name: impl Into<String>, attempt: u32, max_attempts: u32) -> Self {
        Self {
            task_name: task_name.into(),
            attempt,
            max_attempts,
        }
    }

    /// 是否已经是最后一次尝试
    pub fn is_last(&self) -> bool {
        self.attempt >= self.max_attempts
    }
}

impl Display for RetryContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[任务 {} 尝试#{}/{}]",
            self.task_name, self.attempt, self.max_attempts
        )
    }
}
