//! Chromium 页面控制器 - 基础设施层
//!
//! 基于 chromiumoxide 实现 `PageController`，并把 CDP 错误归类成交互错误

use std::path::PathBuf;
use std::sync::OnceLock;
use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::cdp::browser_protocol::page::{
    CaptureScreenshotFormat, EventJavascriptDialogOpening, HandleJavaScriptDialogParams,
};
use chromiumoxide::error::CdpError;
use chromiumoxide::page::ScreenshotParams;
use chromiumoxide::{Element, Page};
use futures::StreamExt;
use regex::Regex;
use serde_json::Value as JsonValue;
use tokio::time::{sleep, timeout, Instant};
use tracing::{debug, warn};

use crate::error::{InteractionError, InteractionResult};
use crate::infrastructure::page_controller::{Locator, PageController};

/// 等待元素时的轮询间隔
const POLL_INTERVAL: Duration = Duration::from_millis(200);

/// 判断元素是否可点击
const CLICKABLE_JS: &str = r#"function() {
    if (!this.isConnected) { return false; }
    const rect = this.getBoundingClientRect();
    const style = window.getComputedStyle(this);
    return rect.width > 0 && rect.height > 0
        && style.visibility !== 'hidden'
        && style.display !== 'none'
        && !this.disabled;
}"#;

/// 点击前的命中测试：元素中心点是否被其他元素覆盖
const HIT_TEST_JS: &str = r#"function() {
    if (!this.isConnected) { return 'stale'; }
    this.scrollIntoView({ block: 'center', inline: 'center' });
    const rect = this.getBoundingClientRect();
    const hit = document.elementFromPoint(rect.left + rect.width / 2, rect.top + rect.height / 2);
    if (!hit) { return 'offscreen'; }
    if (hit === this || this.contains(hit)) { return 'ok'; }
    return hit.tagName.toLowerCase() + (hit.id ? '#' + hit.id : '');
}"#;

const CLEAR_INPUT_JS: &str = r#"function() {
    this.value = '';
    this.dispatchEvent(new Event('input', { bubbles: true }));
}"#;

/// Chromium 页面控制器
///
/// 持有唯一的 Page 资源，只暴露页面控制能力
pub struct ChromePage {
    page: Page,
    screenshot_dir: PathBuf,
}

impl ChromePage {
    pub fn new(page: Page, screenshot_dir: impl Into<PathBuf>) -> Self {
        Self {
            page,
            screenshot_dir: screenshot_dir.into(),
        }
    }

    pub fn into_page(self) -> Page {
        self.page
    }

    async fn find(&self, locator: &Locator) -> InteractionResult<Element> {
        let found = match locator {
            Locator::Id(id) => self.page.find_element(format!("#{}", id)).await,
            Locator::Css(selector) => self.page.find_element(selector.as_str()).await,
            Locator::XPath(expr) => self.page.find_xpath(expr.as_str()).await,
        };
        found.map_err(|e| lookup_error(e, locator))
    }

    async fn is_clickable(&self, element: &Element) -> bool {
        match element.call_js_fn(CLICKABLE_JS, false).await {
            Ok(ret) => ret.result.value.and_then(|v| v.as_bool()).unwrap_or(false),
            Err(e) => {
                debug!("可点击检查失败: {}", e);
                false
            }
        }
    }

    /// 轮询直到找到满足条件的元素或超时
    async fn poll_for(
        &self,
        locator: &Locator,
        timeout: Duration,
        require_clickable: bool,
    ) -> InteractionResult<Element> {
        let deadline = Instant::now() + timeout;
        loop {
            match self.find(locator).await {
                Ok(element) => {
                    if !require_clickable || self.is_clickable(&element).await {
                        return Ok(element);
                    }
                }
                Err(e) if e.is_transient() => {}
                Err(e) => return Err(e),
            }

            if Instant::now() >= deadline {
                return Err(InteractionError::WaitTimeout {
                    locator: locator.to_string(),
                    timeout_ms: timeout.as_millis() as u64,
                });
            }
            sleep(POLL_INTERVAL).await;
        }
    }
}

#[async_trait]
impl PageController for ChromePage {
    type Element = Element;

    async fn navigate(&self, url: &str) -> InteractionResult<()> {
        debug!("导航到: {}", url);
        match self.page.goto(url).await {
            Ok(_) => Ok(()),
            Err(CdpError::Timeout) => Err(InteractionError::WaitTimeout {
                locator: url.to_string(),
                timeout_ms: 0,
            }),
            Err(e) => Err(InteractionError::Navigation {
                url: url.to_string(),
                message: e.to_string(),
            }),
        }
    }

    async fn wait_until_clickable(
        &self,
        locator: &Locator,
        timeout: Duration,
    ) -> InteractionResult<Element> {
        self.poll_for(locator, timeout, true).await
    }

    async fn wait_until_present(
        &self,
        locator: &Locator,
        timeout: Duration,
    ) -> InteractionResult<Element> {
        self.poll_for(locator, timeout, false).await
    }

    async fn click(&self, element: &Element) -> InteractionResult<()> {
        let hit = element
            .call_js_fn(HIT_TEST_JS, false)
            .await
            .map_err(element_error)?
            .result
            .value;

        match hit.as_ref().and_then(JsonValue::as_str) {
            Some("ok") => {
                element.click().await.map_err(element_error)?;
                Ok(())
            }
            Some("stale") => Err(InteractionError::StaleReference {
                detail: "节点已从文档中移除".to_string(),
            }),
            Some(other) => Err(InteractionError::Intercepted {
                detail: format!("元素被 <{}> 遮挡", other),
            }),
            None => Err(InteractionError::Protocol(format!(
                "命中测试返回了意外结果: {:?}",
                hit
            ))),
        }
    }

    async fn get_text(&self, element: &Element) -> InteractionResult<String> {
        let text = element.inner_text().await.map_err(element_error)?;
        Ok(text.unwrap_or_default().trim().to_string())
    }

    async fn set_text(&self, element: &Element, text: &str) -> InteractionResult<()> {
        element
            .call_js_fn(CLEAR_INPUT_JS, false)
            .await
            .map_err(element_error)?;
        element.focus().await.map_err(element_error)?;
        element.type_str(text).await.map_err(element_error)?;
        Ok(())
    }

    async fn accept_dialog(&self, window: Duration) -> InteractionResult<bool> {
        // 先订阅事件，再让点击继续，避免错过对话框
        let mut dialogs = self
            .page
            .event_listener::<EventJavascriptDialogOpening>()
            .await
            .map_err(|e| InteractionError::Protocol(e.to_string()))?;

        match timeout(window, dialogs.next()).await {
            Ok(Some(event)) => {
                debug!("检测到对话框: {}", event.message);
                self.page
                    .execute(HandleJavaScriptDialogParams::new(true))
                    .await
                    .map_err(|e| InteractionError::Protocol(e.to_string()))?;
                Ok(true)
            }
            Ok(None) | Err(_) => {
                debug!("{}ms 内没有对话框弹出", window.as_millis());
                Ok(false)
            }
        }
    }

    async fn capture_diagnostic_artifact(&self, label: &str) -> InteractionResult<PathBuf> {
        let path = self.screenshot_dir.join(format!("{}.png", label));
        tokio::fs::create_dir_all(&self.screenshot_dir)
            .await
            .map_err(|e| InteractionError::Screenshot {
                path: path.clone(),
                message: e.to_string(),
            })?;

        let params = ScreenshotParams::builder()
            .format(CaptureScreenshotFormat::Png)
            .full_page(true)
            .build();

        self.page
            .save_screenshot(params, &path)
            .await
            .map_err(|e| {
                warn!("保存截图失败: {}", e);
                InteractionError::Screenshot {
                    path: path.clone(),
                    message: e.to_string(),
                }
            })?;
        Ok(path)
    }
}

// ========== CDP 错误归类 ==========

fn stale_node_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(
            r"(?i)(no node with given id|could not find node|does not belong to the document|cannot find context with specified id|detached)",
        )
        .expect("静态正则表达式")
    })
}

/// 查找元素时的错误：节点类错误视为“未找到”
fn lookup_error(err: CdpError, locator: &Locator) -> InteractionError {
    match err {
        CdpError::NotFound => InteractionError::NotFound {
            locator: locator.to_string(),
        },
        CdpError::Timeout => InteractionError::WaitTimeout {
            locator: locator.to_string(),
            timeout_ms: 0,
        },
        other => {
            let message = other.to_string();
            if stale_node_pattern().is_match(&message) {
                InteractionError::NotFound {
                    locator: locator.to_string(),
                }
            } else {
                InteractionError::Protocol(message)
            }
        }
    }
}

/// 对已拿到的元素操作时的错误：节点类错误视为“引用失效”
fn element_error(err: CdpError) -> InteractionError {
    match err {
        CdpError::NotFound => InteractionError::StaleReference {
            detail: "元素已不存在".to_string(),
        },
        CdpError::Timeout => InteractionError::WaitTimeout {
            locator: String::new(),
            timeout_ms: 0,
        },
        other => {
            let message = other.to_string();
            if stale_node_pattern().is_match(&message) {
                InteractionError::StaleReference { detail: message }
            } else {
                InteractionError::Protocol(message)
            }
        }
    }
}
