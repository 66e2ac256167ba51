//! 任务处理流程 - 流程层
//!
//! 核心职责：定义六个页面任务各自的交互步骤和成功判定
//!
//! 每个任务的一次尝试：
//! 1. 导航到任务页面
//! 2. 等待元素 → 点击 / 输入
//! 3. 返回 `TaskValue`（业务判定写在值里，不走错误通道）
//!
//! `execute` 在外层套上重试策略，并把任何错误转换成 `Failed` 结果

use std::time::{Duration, Instant};

use tokio::time::sleep;
use tracing::{error, info};

use crate::config::Config;
use crate::error::{InteractionError, InteractionResult};
use crate::infrastructure::{Locator, PageController};
use crate::models::{DialogState, SecondClick, TaskKind, TaskOutcome, TaskValue};
use crate::services::{RetryPolicy, ScreenshotRecorder};

/// 动态 ID 按钮的文本
const DYNAMIC_ID_BUTTON_TEXT: &str = "Button with Dynamic ID";

/// 任务执行参数
#[derive(Debug, Clone)]
pub struct TaskSettings {
    pub base_url: String,
    pub default_timeout: Duration,
    /// AJAX 内容的等待上限，独立于默认超时
    pub ajax_timeout: Duration,
    /// 延迟按钮的等待上限
    pub load_delay_timeout: Duration,
    /// 遮挡层出现前的等待
    pub second_click_pause: Duration,
    pub text_input_value: String,
    pub screenshots_enabled: bool,
}

impl From<&Config> for TaskSettings {
    fn from(config: &Config) -> Self {
        Self {
            base_url: config.base_url.clone(),
            default_timeout: config.timeout(),
            ajax_timeout: config.ajax_timeout(),
            load_delay_timeout: config.load_delay_timeout(),
            second_click_pause: Duration::from_millis(500),
            text_input_value: config.text_input_value.clone(),
            screenshots_enabled: config.screenshots_enabled,
        }
    }
}

/// 任务处理流程
///
/// - 不持有任何资源（page 由调用方传入）
/// - 同一个实例可以被多个并行任务共享
#[derive(Debug, Clone)]
pub struct TaskFlow {
    settings: TaskSettings,
    retry: RetryPolicy,
}

impl TaskFlow {
    pub fn new(config: &Config) -> Self {
        Self {
            settings: TaskSettings::from(config),
            retry: RetryPolicy::new(config.retry_count, config.retry_delay()),
        }
    }

    pub fn with_parts(settings: TaskSettings, retry: RetryPolicy) -> Self {
        Self { settings, retry }
    }

    pub fn settings(&self) -> &TaskSettings {
        &self.settings
    }

    /// 执行一个任务，总是返回结果，不向外抛错
    pub async fn execute<P: PageController>(&self, kind: TaskKind, page: &P) -> TaskOutcome {
        info!("▶️ 开始任务: {}...", kind);
        let started = Instant::now();
        let recorder = ScreenshotRecorder::new(page, kind, self.settings.screenshots_enabled);

        let result = self
            .retry
            .run_observed(kind.name(), &recorder, move || self.attempt(kind, page))
            .await;
        let duration = started.elapsed();

        match result {
            Ok(value) if value.is_success() => {
                info!("✅ {} - {} ({:.2}s)", kind, value.describe(), duration.as_secs_f64());
                TaskOutcome::success(kind, duration).with_detail(value.describe())
            }
            Ok(value) => {
                error!("❌ {} - {}", kind, value.describe());
                TaskOutcome::failed(kind, duration)
                    .with_detail(value.describe())
                    .with_artifact(recorder.last_artifact())
            }
            Err(e) => {
                error!("❌ {} 执行失败 ({}): {}", kind, e.kind(), e);
                TaskOutcome::failed(kind, duration)
                    .with_detail(e.to_string())
                    .with_artifact(recorder.last_artifact())
            }
        }
    }

    /// 单次尝试
    pub async fn attempt<P: PageController>(
        &self,
        kind: TaskKind,
        page: &P,
    ) -> InteractionResult<TaskValue> {
        page.navigate(&kind.url(&self.settings.base_url)).await?;
        match kind {
            TaskKind::DynamicId => self.dynamic_id(page).await,
            TaskKind::ClassAttr => self.class_attr(page).await,
            TaskKind::AjaxLoad => self.ajax_load(page).await,
            TaskKind::HiddenLayers => self.hidden_layers(page).await,
            TaskKind::LoadDelay => self.load_delay(page).await,
            TaskKind::TextInput => self.text_input(page).await,
        }
    }

    /// 按文本定位，不依赖每次刷新都会变化的 id
    async fn dynamic_id<P: PageController>(&self, page: &P) -> InteractionResult<TaskValue> {
        let button = page
            .wait_until_clickable(
                &Locator::button_with_text(DYNAMIC_ID_BUTTON_TEXT),
                self.settings.default_timeout,
            )
            .await?;
        page.click(&button).await?;
        info!("✓ {} 按钮已点击", TaskKind::DynamicId);
        Ok(TaskValue::Clicked)
    }

    /// class 顺序和空白会变化，只匹配 `btn-primary`
    ///
    /// 点击会弹出 alert，对话框关闭前点击不会返回，所以两者并发进行
    async fn class_attr<P: PageController>(&self, page: &P) -> InteractionResult<TaskValue> {
        let button = page
            .wait_until_clickable(
                &Locator::button_with_class("btn-primary"),
                self.settings.default_timeout,
            )
            .await?;

        let dialog = page.accept_dialog(self.settings.default_timeout);
        let click = page.click(&button);
        tokio::pin!(dialog, click);

        let state = tokio::select! {
            biased;
            accepted = &mut dialog => {
                let accepted = accepted?;
                click.await?;
                if accepted {
                    DialogState::Accepted
                } else {
                    DialogState::Absent
                }
            }
            clicked = &mut click => {
                clicked?;
                DialogState::Absent
            }
        };

        match state {
            DialogState::Accepted => info!("✓ {} 按钮已点击，确认框已处理", TaskKind::ClassAttr),
            DialogState::Absent => info!("✓ {} 按钮已点击", TaskKind::ClassAttr),
        }
        Ok(TaskValue::ClickedWithDialog(state))
    }

    async fn ajax_load<P: PageController>(&self, page: &P) -> InteractionResult<TaskValue> {
        let trigger = page
            .wait_until_clickable(&Locator::id("ajaxButton"), self.settings.default_timeout)
            .await?;
        page.click(&trigger).await?;
        info!("AJAX 按钮已点击，等待内容加载...");

        let content = page
            .wait_until_present(
                &Locator::css("#content p.bg-success"),
                self.settings.ajax_timeout,
            )
            .await?;
        let text = page.get_text(&content).await?;
        info!("✓ AJAX 数据: {}", text);
        Ok(TaskValue::Extracted(text))
    }

    /// 第一次点击必须成功；第二次点击被覆盖层拦截是预期结果，不触发重试
    async fn hidden_layers<P: PageController>(&self, page: &P) -> InteractionResult<TaskValue> {
        let button = page
            .wait_until_clickable(&Locator::id("greenButton"), self.settings.default_timeout)
            .await?;
        page.click(&button).await?;
        info!("✓ {} - 第一次点击成功", TaskKind::HiddenLayers);

        sleep(self.settings.second_click_pause).await;

        let second = match page.click(&button).await {
            Ok(()) => {
                info!("⚠️ {} - 第二次点击意外成功", TaskKind::HiddenLayers);
                SecondClick::UnexpectedlySucceeded
            }
            Err(InteractionError::Intercepted { detail }) => {
                info!(
                    "{} - 第二次点击被覆盖层拦截（符合预期）: {}",
                    TaskKind::HiddenLayers,
                    detail
                );
                SecondClick::Blocked
            }
            Err(e) => return Err(e),
        };
        Ok(TaskValue::LayeredClicks { second })
    }

    async fn load_delay<P: PageController>(&self, page: &P) -> InteractionResult<TaskValue> {
        let button = page
            .wait_until_clickable(
                &Locator::css("button.btn.btn-primary"),
                self.settings.load_delay_timeout,
            )
            .await?;
        page.click(&button).await?;
        info!("✓ {} 按钮出现并已点击", TaskKind::LoadDelay);
        Ok(TaskValue::Clicked)
    }

    /// 文本不一致是业务失败，返回值而不是错误
    async fn text_input<P: PageController>(&self, page: &P) -> InteractionResult<TaskValue> {
        let expected = self.settings.text_input_value.clone();

        let input = page
            .wait_until_present(&Locator::id("newButtonName"), self.settings.default_timeout)
            .await?;
        page.set_text(&input, &expected).await?;
        info!("已输入文本: {}", expected);

        let button = page
            .wait_until_clickable(&Locator::id("updatingButton"), self.settings.default_timeout)
            .await?;
        page.click(&button).await?;

        let actual = page.get_text(&button).await?;
        Ok(TaskValue::TextVerified { expected, actual })
    }
}
