pub mod core;
pub mod sim;

pub use crate::core::{Burst, BurstKind, Report, SchedCoreEvent};
pub use crate::sim::{Job, Sim, Workload, WorkloadError};
