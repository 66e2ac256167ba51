#![allow(dead_code)]

use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Notify;
use tokio::time::timeout;
use playground_automation::error::{AppError, AppResult, InteractionResult};
use playground_automation::services::RetryPolicy;
use playground_automation::workflow::TaskSettings;
use playground_automation::{Config, InteractionError, Locator, PageController, SessionFactory, TaskFlow};

pub const AJAX_TEXT: &str = "Data loaded with AJAX get request.";

/// 对话框没人处理时点击挂起的时长，超时后和浏览器一样报 `WaitTimeout`
const DIALOG_BLOCK: Duration = Duration::from_secs(1);

/// 测试用元素句柄，只记录定位方式
#[derive(Debug, Clone)]
pub struct MockElement {
    pub locator: String,
}

/// 按脚本回放结果的页面控制器
///
/// 脚本以定位字符串的片段为键：`"greenButton"` 能匹配 `id=greenButton`
#[derive(Default)]
pub struct MockPage {
    clicks: Mutex<Vec<(String, VecDeque<InteractionResult<()>>)>>,
    waits: Mutex<Vec<(String, VecDeque<InteractionError>)>>,
    texts: Mutex<Vec<(String, String)>>,
    typed: Mutex<Option<String>>,
    /// 点击后弹出对话框的元素，对话框被接受前点击不会返回
    dialog_on: Option<String>,
    dialog_opened: Notify,
    dialog_closed: Notify,
    navigation_error: Option<InteractionError>,
    panic_on: Option<String>,
    calls: Mutex<Vec<String>>,
}

impl MockPage {
    /// 六个任务都能一次通过的页面
    pub fn happy() -> Self {
        Self::default()
            .with_clicks("greenButton", vec![Ok(()), Err(intercepted())])
            .with_text("bg-success", AJAX_TEXT)
            .with_dialog()
    }

    pub fn with_clicks(self, key: &str, results: Vec<InteractionResult<()>>) -> Self {
        {
            let mut clicks = self.clicks.lock().unwrap();
            match clicks.iter_mut().find(|(k, _)| k == key) {
                Some((_, queue)) => queue.extend(results),
                None => clicks.push((key.to_string(), results.into())),
            }
        }
        self
    }

    /// 在现有点击脚本之前插入失败
    pub fn failing_clicks(self, key: &str, errors: Vec<InteractionError>) -> Self {
        {
            let mut clicks = self.clicks.lock().unwrap();
            let mut queue: VecDeque<InteractionResult<()>> = errors.into_iter().map(Err).collect();
            match clicks.iter_mut().position(|(k, _)| k == key) {
                Some(index) => {
                    let (_, existing) = clicks.remove(index);
                    queue.extend(existing);
                    clicks.insert(index, (key.to_string(), queue));
                }
                None => clicks.push((key.to_string(), queue)),
            }
        }
        self
    }

    pub fn failing_waits(self, key: &str, errors: Vec<InteractionError>) -> Self {
        self.waits
            .lock()
            .unwrap()
            .push((key.to_string(), errors.into()));
        self
    }

    pub fn with_text(self, key: &str, text: &str) -> Self {
        self.texts
            .lock()
            .unwrap()
            .insert(0, (key.to_string(), text.to_string()));
        self
    }

    /// Class Attr 按钮点击后弹出 alert
    pub fn with_dialog(self) -> Self {
        self.with_dialog_on("' btn-primary '")
    }

    pub fn with_dialog_on(mut self, key: &str) -> Self {
        self.dialog_on = Some(key.to_string());
        self
    }

    pub fn failing_navigation(mut self, error: InteractionError) -> Self {
        self.navigation_error = Some(error);
        self
    }

    pub fn panicking_on(mut self, url_fragment: &str) -> Self {
        self.panic_on = Some(url_fragment.to_string());
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count_calls(&self, prefix: &str) -> usize {
        self.calls().iter().filter(|c| c.starts_with(prefix)).count()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    fn next_wait_failure(&self, locator: &str) -> Option<InteractionError> {
        let mut waits = self.waits.lock().unwrap();
        waits
            .iter_mut()
            .find(|(key, _)| locator.contains(key.as_str()))
            .and_then(|(_, queue)| queue.pop_front())
    }

    fn wait(&self, kind: &str, locator: &Locator, timeout: Duration) -> InteractionResult<MockElement> {
        let locator = locator.to_string();
        self.record(format!("{}:{}:{}", kind, locator, timeout.as_millis()));
        match self.next_wait_failure(&locator) {
            Some(err) => Err(err),
            None => Ok(MockElement { locator }),
        }
    }
}

#[async_trait]
impl PageController for MockPage {
    type Element = MockElement;

    async fn navigate(&self, url: &str) -> InteractionResult<()> {
        self.record(format!("navigate:{}", url));
        if let Some(fragment) = &self.panic_on {
            if url.contains(fragment.as_str()) {
                panic!("脚本要求在 {} 上 panic", url);
            }
        }
        match &self.navigation_error {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    async fn wait_until_clickable(
        &self,
        locator: &Locator,
        timeout: Duration,
    ) -> InteractionResult<MockElement> {
        self.wait("clickable", locator, timeout)
    }

    async fn wait_until_present(
        &self,
        locator: &Locator,
        timeout: Duration,
    ) -> InteractionResult<MockElement> {
        self.wait("present", locator, timeout)
    }

    async fn click(&self, element: &MockElement) -> InteractionResult<()> {
        self.record(format!("click:{}", element.locator));
        let opens_dialog = self
            .dialog_on
            .as_deref()
            .is_some_and(|key| element.locator.contains(key));
        if opens_dialog {
            self.dialog_opened.notify_one();
            if timeout(DIALOG_BLOCK, self.dialog_closed.notified()).await.is_err() {
                return Err(InteractionError::WaitTimeout {
                    locator: element.locator.clone(),
                    timeout_ms: DIALOG_BLOCK.as_millis() as u64,
                });
            }
        }
        let mut clicks = self.clicks.lock().unwrap();
        clicks
            .iter_mut()
            .find(|(key, _)| element.locator.contains(key.as_str()))
            .and_then(|(_, queue)| queue.pop_front())
            .unwrap_or(Ok(()))
    }

    async fn get_text(&self, element: &MockElement) -> InteractionResult<String> {
        let scripted = self
            .texts
            .lock()
            .unwrap()
            .iter()
            .find(|(key, _)| element.locator.contains(key.as_str()))
            .map(|(_, text)| text.clone());
        if let Some(text) = scripted {
            return Ok(text);
        }
        // 没有脚本时按钮显示最后输入的文本
        Ok(self.typed.lock().unwrap().clone().unwrap_or_default())
    }

    async fn set_text(&self, element: &MockElement, text: &str) -> InteractionResult<()> {
        self.record(format!("type:{}:{}", element.locator, text));
        *self.typed.lock().unwrap() = Some(text.to_string());
        Ok(())
    }

    async fn accept_dialog(&self, window: Duration) -> InteractionResult<bool> {
        match timeout(window, self.dialog_opened.notified()).await {
            Ok(()) => {
                self.record("dialog:accepted".to_string());
                self.dialog_closed.notify_one();
                Ok(true)
            }
            Err(_) => Ok(false),
        }
    }

    async fn capture_diagnostic_artifact(&self, label: &str) -> InteractionResult<PathBuf> {
        self.record(format!("artifact:{}", label));
        Ok(PathBuf::from(format!("screenshots/{}.png", label)))
    }
}

/// 测试用会话工厂，统计打开 / 关闭次数和最大同时打开数
pub struct MockSessions {
    make: Box<dyn Fn() -> MockPage + Send + Sync>,
    fail_open: bool,
    pub opened: AtomicUsize,
    pub closed: AtomicUsize,
    open_now: AtomicUsize,
    pub max_open: AtomicUsize,
    /// 已关闭会话各自的调用记录
    finished: Mutex<Vec<Vec<String>>>,
}

impl MockSessions {
    pub fn new(make: impl Fn() -> MockPage + Send + Sync + 'static) -> Self {
        Self {
            make: Box::new(make),
            fail_open: false,
            opened: AtomicUsize::new(0),
            closed: AtomicUsize::new(0),
            open_now: AtomicUsize::new(0),
            max_open: AtomicUsize::new(0),
            finished: Mutex::new(Vec::new()),
        }
    }

    /// 所有已关闭会话里以 `prefix` 开头的调用次数
    pub fn count_calls(&self, prefix: &str) -> usize {
        self.finished
            .lock()
            .unwrap()
            .iter()
            .flatten()
            .filter(|c| c.starts_with(prefix))
            .count()
    }

    pub fn happy() -> Arc<Self> {
        Arc::new(Self::new(MockPage::happy))
    }

    pub fn failing() -> Arc<Self> {
        let mut sessions = Self::new(MockPage::happy);
        sessions.fail_open = true;
        Arc::new(sessions)
    }
}

#[async_trait]
impl SessionFactory for MockSessions {
    type Session = MockPage;

    async fn open_session(&self) -> AppResult<MockPage> {
        if self.fail_open {
            return Err(AppError::page_creation_failed(std::io::Error::other(
                "浏览器标签页已耗尽",
            )));
        }
        self.opened.fetch_add(1, Ordering::SeqCst);
        let now = self.open_now.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_open.fetch_max(now, Ordering::SeqCst);
        // 让出执行权，给其他任务并发的机会
        tokio::time::sleep(Duration::from_millis(5)).await;
        Ok((self.make)())
    }

    async fn close_session(&self, session: MockPage) {
        self.finished.lock().unwrap().push(session.calls());
        self.open_now.fetch_sub(1, Ordering::SeqCst);
        self.closed.fetch_add(1, Ordering::SeqCst);
    }
}

pub fn intercepted() -> InteractionError {
    InteractionError::Intercepted {
        detail: "元素被 <button#blueButton> 遮挡".to_string(),
    }
}

pub fn stale() -> InteractionError {
    InteractionError::StaleReference {
        detail: "节点已从文档中移除".to_string(),
    }
}

/// 不等待的测试配置
pub fn fast_config() -> Config {
    Config {
        retry_delay_ms: 1,
        ..Config::default()
    }
}

pub fn fast_flow(max_attempts: u32, screenshots_enabled: bool) -> TaskFlow {
    let mut settings = TaskSettings::from(&fast_config());
    settings.second_click_pause = Duration::from_millis(1);
    settings.screenshots_enabled = screenshots_enabled;
    TaskFlow::with_parts(settings, RetryPolicy::new(max_attempts, Duration::from_millis(1)))
}
