pub mod artifacts;
pub mod report_writer;
pub mod retry;

pub use artifacts::ScreenshotRecorder;
pub use report_writer::ReportWriter;
pub use retry::{AttemptObserver, NoopObserver, RetryPolicy};
