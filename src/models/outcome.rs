use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::models::task_kind::TaskKind;

/// 任务最终状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskStatus {
    Success,
    Failed,
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskStatus::Success => f.pad("Success"),
            TaskStatus::Failed => f.pad("Failed"),
        }
    }
}

/// 点击后的确认对话框
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogState {
    /// 弹出并已接受
    Accepted,
    /// 没有弹出（不算错误）
    Absent,
}

/// 遮挡层任务第二次点击的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecondClick {
    /// 被覆盖层拦截，符合预期
    Blocked,
    /// 意外点击成功，只记录日志
    UnexpectedlySucceeded,
}

/// 任务流程正常结束时返回的值
///
/// 业务判定（文本是否一致、内容是否为空）在这里表达，不走错误通道
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskValue {
    Clicked,
    ClickedWithDialog(DialogState),
    Extracted(String),
    LayeredClicks { second: SecondClick },
    TextVerified { expected: String, actual: String },
}

impl TaskValue {
    pub fn is_success(&self) -> bool {
        match self {
            TaskValue::Extracted(text) => !text.trim().is_empty(),
            TaskValue::TextVerified { expected, actual } => expected == actual,
            TaskValue::Clicked
            | TaskValue::ClickedWithDialog(_)
            | TaskValue::LayeredClicks { .. } => true,
        }
    }

    /// 用于日志和报告的简短描述
    pub fn describe(&self) -> String {
        match self {
            TaskValue::Clicked => "按钮已点击".to_string(),
            TaskValue::ClickedWithDialog(DialogState::Accepted) => "按钮已点击，对话框已处理".to_string(),
            TaskValue::ClickedWithDialog(DialogState::Absent) => "按钮已点击，未出现对话框".to_string(),
            TaskValue::Extracted(text) if text.trim().is_empty() => "AJAX 内容为空".to_string(),
            TaskValue::Extracted(text) => format!("提取到内容: {}", text),
            TaskValue::LayeredClicks { second: SecondClick::Blocked } => {
                "第二次点击被覆盖层拦截（符合预期）".to_string()
            }
            TaskValue::LayeredClicks { second: SecondClick::UnexpectedlySucceeded } => {
                "第二次点击意外成功".to_string()
            }
            TaskValue::TextVerified { expected, actual } if expected == actual => {
                format!("按钮文本已更新为: {}", actual)
            }
            TaskValue::TextVerified { expected, actual } => {
                format!("按钮文本不一致: 期望 '{}'，实际 '{}'", expected, actual)
            }
        }
    }
}

/// 单个任务的执行结果
///
/// 任务结束（成功或重试耗尽）时创建，之后不再修改
#[derive(Debug, Clone, PartialEq)]
pub struct TaskOutcome {
    pub task_name: String,
    pub kind: TaskKind,
    pub status: TaskStatus,
    pub duration: Duration,
    /// 最后一次失败尝试的截图
    pub diagnostic_artifact: Option<PathBuf>,
    pub detail: Option<String>,
}

impl TaskOutcome {
    pub fn new(kind: TaskKind, status: TaskStatus, duration: Duration) -> Self {
        Self {
            task_name: kind.name().to_string(),
            kind,
            status,
            duration,
            diagnostic_artifact: None,
            detail: None,
        }
    }

    pub fn success(kind: TaskKind, duration: Duration) -> Self {
        Self::new(kind, TaskStatus::Success, duration)
    }

    pub fn failed(kind: TaskKind, duration: Duration) -> Self {
        Self::new(kind, TaskStatus::Failed, duration)
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn with_artifact(mut self, artifact: Option<PathBuf>) -> Self {
        self.diagnostic_artifact = artifact;
        self
    }

    pub fn is_success(&self) -> bool {
        self.status == TaskStatus::Success
    }
}
