use crate::core::state::{Burst, BurstKind, Ticks};
use serde::{Deserialize, Serialize};

pub use crate::core::state::JobId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    pub arrival_time: Ticks,
    pub bursts: Vec<Burst>,
}

impl Job {
    pub fn total_service(&self) -> Ticks {
        self.bursts.iter().map(|burst| burst.duration).sum()
    }

    pub fn cpu_time(&self) -> Ticks {
        self.bursts
            .iter()
            .filter(|burst| burst.kind == BurstKind::Cpu)
            .map(|burst| burst.duration)
            .sum()
    }
}

#[derive(Debug, Clone)]
pub struct JobInstance {
    pub job: Job,
    pub completion_time: Option<Ticks>,
}

impl JobInstance {
    pub fn turnaround(&self) -> Option<Ticks> {
        self.completion_time
            .map(|completion| completion - self.job.arrival_time)
    }

    pub fn waiting(&self) -> Option<Ticks> {
        self.turnaround()
            .map(|turnaround| turnaround.saturating_sub(self.job.total_service()))
    }
}
