pub mod driver;
pub mod error;
pub mod job;
pub mod workload;

pub use driver::Sim;
pub use error::WorkloadError;
pub use job::{Job, JobId, JobInstance};
pub use workload::{DEFAULT_QUANTUM, Workload};
