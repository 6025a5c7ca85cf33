use super::{
    error::WorkloadError,
    job::{Job, JobId},
};
use crate::core::state::{Burst, BurstKind, Ticks};
use rand::prelude::*;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

pub const DEFAULT_QUANTUM: Ticks = 11;

/// Everything needed to start a run: the quantum and the batch of jobs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workload {
    pub quantum: Ticks,
    pub jobs: Vec<Job>,
}

impl Workload {
    /// Six jobs arriving over the first eight ticks, the last one long enough to be preempted.
    pub fn builtin() -> Self {
        let table: [(Ticks, &[(Ticks, bool)]); 6] = [
            (0, &[(2, true), (3, false), (1, true)]),
            (3, &[(1, true), (4, false), (2, true)]),
            (4, &[(1, true), (4, false), (2, true)]),
            (5, &[(1, true), (4, false), (2, true)]),
            (6, &[(1, true), (4, false), (21, true)]),
            (7, &[(11, true), (41, false), (21, true)]),
        ];

        let jobs = table
            .iter()
            .zip(1..)
            .map(|(&(arrival_time, bursts), id)| Job {
                id,
                arrival_time,
                bursts: bursts
                    .iter()
                    .map(|&(duration, is_cpu)| burst(duration, is_cpu))
                    .collect(),
            })
            .collect();

        Self {
            quantum: DEFAULT_QUANTUM,
            jobs,
        }
    }

    /// Build from a per-job burst table and a parallel arrival table. Jobs are numbered from 1
    /// in table order.
    pub fn from_tables(
        quantum: Ticks,
        num_jobs: usize,
        burst_table: &[Vec<(i64, bool)>],
        arrival_times: &[i64],
    ) -> Result<Self, WorkloadError> {
        if burst_table.len() != num_jobs || arrival_times.len() != num_jobs {
            return Err(WorkloadError::JobCountMismatch {
                expected: num_jobs,
                burst_lists: burst_table.len(),
                arrivals: arrival_times.len(),
            });
        }

        let mut jobs = Vec::with_capacity(num_jobs);
        for (id, (details, &arrival)) in (1..).zip(burst_table.iter().zip(arrival_times)) {
            let arrival_time = Ticks::try_from(arrival)
                .map_err(|_| WorkloadError::NegativeArrival { job: id, arrival })?;

            let bursts = details
                .iter()
                .enumerate()
                .map(|(index, &(duration, is_cpu))| {
                    Ticks::try_from(duration)
                        .map(|duration| burst(duration, is_cpu))
                        .map_err(|_| WorkloadError::NegativeDuration {
                            job: id,
                            burst: index,
                            duration,
                        })
                })
                .collect::<Result<Vec<_>, _>>()?;

            jobs.push(Job {
                id,
                arrival_time,
                bursts,
            });
        }

        let workload = Self { quantum, jobs };
        workload.validate()?;
        Ok(workload)
    }

    pub fn from_toml_str(source: &str) -> Result<Self, WorkloadError> {
        let workload: Self = toml::from_str(source)?;
        workload.validate()?;
        Ok(workload)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, WorkloadError> {
        let source = fs::read_to_string(path)?;
        Self::from_toml_str(&source)
    }

    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string(self)
    }

    /// Seeded batch of alternating CPU/I-O jobs. A fraction of the CPU bursts are short so that
    /// some jobs finish inside one quantum and others get preempted.
    pub fn random(seed: u64, num_jobs: usize, quantum: Ticks) -> Self {
        const P_SHORT: f64 = 0.4;

        let mut rng = StdRng::seed_from_u64(seed);
        let mut jobs = Vec::with_capacity(num_jobs);
        let mut arrival_time = 0;

        for id in (1..).take(num_jobs) {
            if id > 1 {
                arrival_time += rng.random_range(0..=4);
            }

            let cpu_bursts = rng.random_range(1..=3);
            let mut bursts = Vec::with_capacity(2 * cpu_bursts - 1);
            for i in 0..cpu_bursts {
                if i > 0 {
                    bursts.push(Burst::io(rng.random_range(1..=8)));
                }
                let duration = if rng.random::<f64>() < P_SHORT {
                    rng.random_range(1..=3)
                } else {
                    rng.random_range(4..=20)
                };
                bursts.push(Burst::cpu(duration));
            }

            jobs.push(Job {
                id,
                arrival_time,
                bursts,
            });
        }

        Self { quantum, jobs }
    }

    pub fn validate(&self) -> Result<(), WorkloadError> {
        if self.quantum == 0 {
            return Err(WorkloadError::ZeroQuantum);
        }
        if self.jobs.is_empty() {
            return Err(WorkloadError::NoJobs);
        }

        let mut seen: FxHashSet<JobId> = FxHashSet::default();
        for job in &self.jobs {
            if job.id == 0 {
                return Err(WorkloadError::ZeroJobId);
            }
            if !seen.insert(job.id) {
                return Err(WorkloadError::DuplicateJobId { job: job.id });
            }

            let Some(first) = job.bursts.first() else {
                return Err(WorkloadError::EmptyBursts { job: job.id });
            };
            if first.kind != BurstKind::Cpu {
                return Err(WorkloadError::FirstBurstNotCpu { job: job.id });
            }
            if let Some(index) = job.bursts.iter().position(|b| b.duration == 0) {
                return Err(WorkloadError::ZeroDuration {
                    job: job.id,
                    burst: index,
                });
            }
        }

        Ok(())
    }
}

fn burst(duration: Ticks, is_cpu: bool) -> Burst {
    if is_cpu {
        Burst::cpu(duration)
    } else {
        Burst::io(duration)
    }
}
