use super::job::JobId;
use std::{error::Error, fmt, io};

/// Reasons a workload is rejected before the simulation starts.
#[derive(Debug)]
pub enum WorkloadError {
    ZeroQuantum,
    NoJobs,
    JobCountMismatch {
        expected: usize,
        burst_lists: usize,
        arrivals: usize,
    },
    NegativeArrival {
        job: JobId,
        arrival: i64,
    },
    NegativeDuration {
        job: JobId,
        burst: usize,
        duration: i64,
    },
    ZeroDuration {
        job: JobId,
        burst: usize,
    },
    EmptyBursts {
        job: JobId,
    },
    FirstBurstNotCpu {
        job: JobId,
    },
    ZeroJobId,
    DuplicateJobId {
        job: JobId,
    },
    Parse(toml::de::Error),
    Io(io::Error),
}

impl fmt::Display for WorkloadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroQuantum => write!(f, "quantum must be positive"),
            Self::NoJobs => write!(f, "workload has no jobs"),
            Self::JobCountMismatch {
                expected,
                burst_lists,
                arrivals,
            } => write!(
                f,
                "expected {expected} jobs, got {burst_lists} burst lists and {arrivals} arrival times"
            ),
            Self::NegativeArrival { job, arrival } => {
                write!(f, "job {job} has negative arrival time {arrival}")
            }
            Self::NegativeDuration {
                job,
                burst,
                duration,
            } => write!(f, "job {job} burst {burst} has negative duration {duration}"),
            Self::ZeroDuration { job, burst } => {
                write!(f, "job {job} burst {burst} has zero duration")
            }
            Self::EmptyBursts { job } => write!(f, "job {job} has no bursts"),
            Self::FirstBurstNotCpu { job } => {
                write!(f, "job {job} must start with a CPU burst")
            }
            Self::ZeroJobId => write!(f, "job ids must be positive"),
            Self::DuplicateJobId { job } => write!(f, "job id {job} is used more than once"),
            Self::Parse(err) => write!(f, "malformed workload file: {err}"),
            Self::Io(err) => write!(f, "cannot read workload file: {err}"),
        }
    }
}

impl Error for WorkloadError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Parse(err) => Some(err),
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<toml::de::Error> for WorkloadError {
    fn from(err: toml::de::Error) -> Self {
        Self::Parse(err)
    }
}

impl From<io::Error> for WorkloadError {
    fn from(err: io::Error) -> Self {
        Self::Io(err)
    }
}
