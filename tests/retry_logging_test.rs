//! 重试日志：每次重试一行 RETRY，耗尽时一行 ERROR

use std::io;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use playground_automation::{InteractionError, RetryPolicy};
use tracing_subscriber::fmt::MakeWriter;

/// 把日志写进内存的 writer
#[derive(Clone, Default)]
struct CapturedLogs {
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl CapturedLogs {
    fn lines(&self) -> Vec<String> {
        let bytes = self.buffer.lock().unwrap().clone();
        String::from_utf8_lossy(&bytes)
            .lines()
            .map(str::to_string)
            .collect()
    }

    fn count_containing(&self, needle: &str) -> usize {
        self.lines().iter().filter(|l| l.contains(needle)).count()
    }

    fn count_level(&self, level: &str) -> usize {
        self.lines()
            .iter()
            .filter(|l| l.trim_start().starts_with(level))
            .count()
    }
}

impl io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for CapturedLogs {
    type Writer = CapturedLogs;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

fn capture() -> (CapturedLogs, tracing::subscriber::DefaultGuard) {
    let logs = CapturedLogs::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(logs.clone())
        .with_ansi(false)
        .without_time()
        .with_target(false)
        .with_max_level(tracing::Level::TRACE)
        .finish();
    let guard = tracing::subscriber::set_default(subscriber);
    (logs, guard)
}

/// 前 `failures` 次点击被拦截，之后成功
async fn run_with_failures(max_attempts: u32, failures: u32) -> Result<u32, InteractionError> {
    let calls = AtomicU32::new(0);
    RetryPolicy::new(max_attempts, Duration::from_millis(1))
        .run("Hidden Layer", || {
            let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
            async move {
                if n <= failures {
                    Err(InteractionError::Intercepted {
                        detail: "div#overlay".to_string(),
                    })
                } else {
                    Ok(n)
                }
            }
        })
        .await
}

#[tokio::test]
async fn test_k_failures_then_success_logs_k_retries() {
    let (logs, _guard) = capture();

    let result = run_with_failures(3, 2).await;

    assert_eq!(result.ok(), Some(3));
    assert_eq!(logs.count_containing("RETRY"), 2, "{:#?}", logs.lines());
    assert_eq!(logs.count_level("ERROR"), 0, "{:#?}", logs.lines());
}

#[tokio::test]
async fn test_exhaustion_logs_exactly_one_error() {
    let (logs, _guard) = capture();

    let result = run_with_failures(2, 2).await;

    assert!(matches!(result, Err(InteractionError::Intercepted { .. })));
    assert_eq!(logs.count_containing("RETRY"), 1, "{:#?}", logs.lines());
    assert_eq!(logs.count_level("ERROR"), 1, "{:#?}", logs.lines());
}

#[tokio::test]
async fn test_first_try_success_logs_no_retry() {
    let (logs, _guard) = capture();

    let result = run_with_failures(3, 0).await;

    assert_eq!(result.ok(), Some(1));
    assert_eq!(logs.count_containing("RETRY"), 0);
}
