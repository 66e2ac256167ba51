//! 页面控制能力 - 基础设施层
//!
//! 核心流程只依赖这里的 trait，不直接接触浏览器驱动

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::{AppResult, InteractionResult};

/// 元素定位方式
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Locator {
    /// 按 id 属性
    Id(String),
    /// CSS 选择器
    Css(String),
    /// XPath 表达式
    XPath(String),
}

impl Locator {
    pub fn id(id: impl Into<String>) -> Self {
        Locator::Id(id.into())
    }

    pub fn css(selector: impl Into<String>) -> Self {
        Locator::Css(selector.into())
    }

    /// 按按钮文本定位（不依赖会变化的 id）
    pub fn button_with_text(text: &str) -> Self {
        Locator::XPath(format!("//button[contains(text(), '{}')]", text))
    }

    /// 按单个 class 定位，容忍 class 顺序和多余空白的变化
    pub fn button_with_class(class: &str) -> Self {
        Locator::XPath(format!(
            "//button[contains(concat(' ', normalize-space(@class), ' '), ' {} ')]",
            class
        ))
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Locator::Id(id) => write!(f, "id={}", id),
            Locator::Css(selector) => write!(f, "css={}", selector),
            Locator::XPath(expr) => write!(f, "xpath={}", expr),
        }
    }
}

/// 页面控制器
///
/// 职责：
/// - 持有一个浏览器会话
/// - 提供导航、等待、点击、输入、截图能力
/// - 等待超时统一转换为 `WaitTimeout`，交给重试策略处理
#[async_trait]
pub trait PageController: Send + Sync {
    /// 元素句柄
    type Element: Send + Sync;

    /// 导航到指定 URL
    async fn navigate(&self, url: &str) -> InteractionResult<()>;

    /// 等待元素可点击（已挂载、可见、未禁用）
    async fn wait_until_clickable(
        &self,
        locator: &Locator,
        timeout: Duration,
    ) -> InteractionResult<Self::Element>;

    /// 等待元素出现在 DOM 中
    async fn wait_until_present(
        &self,
        locator: &Locator,
        timeout: Duration,
    ) -> InteractionResult<Self::Element>;

    /// 点击元素
    async fn click(&self, element: &Self::Element) -> InteractionResult<()>;

    /// 读取元素文本
    async fn get_text(&self, element: &Self::Element) -> InteractionResult<String>;

    /// 清空并输入文本
    async fn set_text(&self, element: &Self::Element, text: &str) -> InteractionResult<()>;

    /// 在 `window` 内等待对话框弹出并接受它，没有弹出时返回 `Ok(false)`
    ///
    /// 对话框打开期间浏览器不会完成触发它的点击，所以必须与点击并发等待
    async fn accept_dialog(&self, window: Duration) -> InteractionResult<bool>;

    /// 保存诊断截图，返回文件路径
    async fn capture_diagnostic_artifact(&self, label: &str) -> InteractionResult<PathBuf>;
}

/// 会话工厂
///
/// 并行模式下每个任务通过它拿到独立的会话，用完后归还
#[async_trait]
pub trait SessionFactory: Send + Sync + 'static {
    type Session: PageController + 'static;

    /// 打开一个新的隔离会话
    async fn open_session(&self) -> AppResult<Self::Session>;

    /// 关闭会话，失败只记录日志
    async fn close_session(&self, session: Self::Session);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locator_display() {
        assert_eq!(Locator::id("greenButton").to_string(), "id=greenButton");
        assert_eq!(
            Locator::css("#content p.bg-success").to_string(),
            "css=#content p.bg-success"
        );
    }

    #[test]
    fn test_class_locator_normalizes_whitespace() {
        let Locator::XPath(expr) = Locator::button_with_class("btn-primary") else {
            panic!("应该是 XPath");
        };
        assert!(expr.contains("normalize-space(@class)"));
        assert!(expr.contains("' btn-primary '"));
    }
}
