use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// 六个固定任务
///
/// 声明顺序就是顺序执行和报告输出的顺序
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskKind {
    /// 动态 ID 按钮
    DynamicId,
    /// class 属性不稳定的按钮
    ClassAttr,
    /// AJAX 延迟加载的内容
    AjaxLoad,
    /// 被遮挡的按钮
    HiddenLayers,
    /// 延迟出现的按钮
    LoadDelay,
    /// 文本输入与校验
    TextInput,
}

impl TaskKind {
    pub const ALL: [TaskKind; 6] = [
        TaskKind::DynamicId,
        TaskKind::ClassAttr,
        TaskKind::AjaxLoad,
        TaskKind::HiddenLayers,
        TaskKind::LoadDelay,
        TaskKind::TextInput,
    ];

    /// 报告中使用的任务名称
    pub fn name(self) -> &'static str {
        match self {
            TaskKind::DynamicId => "Dynamic ID",
            TaskKind::ClassAttr => "Class Attr",
            TaskKind::AjaxLoad => "AJAX Load",
            TaskKind::HiddenLayers => "Hidden Layer",
            TaskKind::LoadDelay => "Load Delay",
            TaskKind::TextInput => "Text Input",
        }
    }

    /// 页面标识（URL 路径）
    pub fn page_identity(self) -> &'static str {
        match self {
            TaskKind::DynamicId => "dynamicid",
            TaskKind::ClassAttr => "classattr",
            TaskKind::AjaxLoad => "ajax",
            TaskKind::HiddenLayers => "hiddenlayers",
            TaskKind::LoadDelay => "loaddelay",
            TaskKind::TextInput => "textinput",
        }
    }

    /// 拼接任务页面的完整 URL
    pub fn url(self, base_url: &str) -> String {
        format!("{}/{}", base_url.trim_end_matches('/'), self.page_identity())
    }

    /// 截图文件名前缀（空格替换为下划线）
    pub fn artifact_stem(self) -> String {
        self.name().replace(' ', "_")
    }

    pub fn from_page_identity(identity: &str) -> Option<Self> {
        let identity = identity.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|kind| kind.page_identity() == identity)
    }

    /// 根据 URL 的最后一段路径识别任务
    pub fn from_url(url: &str) -> Option<Self> {
        static PATH: OnceLock<Regex> = OnceLock::new();
        let pattern = PATH.get_or_init(|| {
            Regex::new(r"^(?:[a-zA-Z][a-zA-Z0-9+.-]*://[^/?#]*)?/?([^?#]*)").expect("静态正则表达式")
        });

        let path = pattern
            .captures(url.trim())
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str())
            .unwrap_or_default();
        let last_segment = path.rsplit('/').find(|segment| !segment.is_empty())?;
        Self::from_page_identity(last_segment)
    }

    /// 自动运行模式的任务选择
    ///
    /// 能识别的 URL 只运行对应任务，无法识别时退回运行全部任务
    pub fn selection(auto_run_url: Option<&str>) -> Vec<TaskKind> {
        match auto_run_url.map(|url| (url, Self::from_url(url))) {
            Some((_, Some(kind))) => vec![kind],
            Some((url, None)) => {
                tracing::warn!("⚠️ 无法识别的自动运行 URL: {}，将运行全部任务", url);
                Self::ALL.to_vec()
            }
            None => Self::ALL.to_vec(),
        }
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
