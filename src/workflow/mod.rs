pub mod retry_ctx;
pub mod task_flow;

pub use retry_ctx::RetryContext;
pub use task_flow::{TaskFlow, TaskSettings};
