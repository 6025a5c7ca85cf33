pub mod driver;
pub mod event;
pub mod metrics;
pub mod observer;
pub mod state;

pub use driver::SchedCore;
pub use event::SchedCoreEvent;
pub use metrics::{Metrics, Report};
pub use state::{Burst, BurstKind, JobId, Route, SchedCtx, Task, TaskId, TaskState, Ticks};
