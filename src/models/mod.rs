pub mod outcome;
pub mod report;
pub mod task_kind;

pub use outcome::{DialogState, SecondClick, TaskOutcome, TaskStatus, TaskValue};
pub use report::{success_rate, ConfigSnapshot, RunReport, RunSummary};
pub use task_kind::TaskKind;
