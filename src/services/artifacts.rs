//! 诊断截图服务 - 业务能力层
//!
//! 只负责"失败时截图"能力，不关心重试流程

use std::path::PathBuf;
use std::sync::Mutex;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::error::InteractionError;
use crate::infrastructure::PageController;
use crate::models::TaskKind;
use crate::services::retry::AttemptObserver;
use crate::workflow::RetryContext;

/// 截图记录器
///
/// 职责：
/// - 每次瞬时失败后保存一张截图
/// - 文件名带任务名、尝试次数和时间戳
/// - 记住最后一张截图，供任务结果引用
pub struct ScreenshotRecorder<'a, P: PageController> {
    page: &'a P,
    kind: TaskKind,
    enabled: bool,
    last: Mutex<Option<PathBuf>>,
}

impl<'a, P: PageController> ScreenshotRecorder<'a, P> {
    pub fn new(page: &'a P, kind: TaskKind, enabled: bool) -> Self {
        Self {
            page,
            kind,
            enabled,
            last: Mutex::new(None),
        }
    }

    /// 截图标签：`<任务名>_attempt<N>_<时间戳>`
    pub fn label(kind: TaskKind, attempt: u32) -> String {
        format!(
            "{}_attempt{}_{}",
            kind.artifact_stem(),
            attempt,
            chrono::Local::now().format("%Y%m%d_%H%M%S")
        )
    }

    /// 最后一次成功保存的截图
    pub fn last_artifact(&self) -> Option<PathBuf> {
        self.last.lock().ok().and_then(|guard| guard.clone())
    }
}

#[async_trait]
impl<P: PageController> AttemptObserver for ScreenshotRecorder<'_, P> {
    async fn on_failed_attempt(&self, ctx: &RetryContext, _error: &InteractionError) {
        if !self.enabled {
            return;
        }

        let label = Self::label(self.kind, ctx.attempt);
        match self.page.capture_diagnostic_artifact(&label).await {
            Ok(path) => {
                info!("📸 截图已保存: {}", path.display());
                if let Ok(mut last) = self.last.lock() {
                    *last = Some(path);
                }
            }
            Err(e) => warn!("⚠️ {} 截图失败: {}", ctx, e),
        }
    }
}
