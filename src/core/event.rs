use crate::core::{TaskId, Ticks};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedCoreEvent {
    Arrived {
        task: TaskId,
    },
    Dispatched {
        task: TaskId,
        ran: Ticks,
    },
    // Quantum expired with CPU work left on the burst
    Preempted {
        task: TaskId,
        remaining: Ticks,
    },
    IoStarted {
        task: TaskId,
    },
    IoCompleted {
        task: TaskId,
    },
    // Back-to-back CPU bursts; the task rejoins the ready queue tail
    Requeued {
        task: TaskId,
    },
    Completed {
        task: TaskId,
        turnaround: Ticks,
        waiting: Ticks,
    },
    // Both queues empty
    Idle,
}

impl SchedCoreEvent {
    /// Events counted as interrupts (context switches) in the final report.
    pub fn is_interrupt(&self) -> bool {
        matches!(
            self,
            Self::Arrived { .. }
                | Self::Preempted { .. }
                | Self::IoStarted { .. }
                | Self::IoCompleted { .. }
                | Self::Completed { .. }
        )
    }

    pub fn task(&self) -> Option<TaskId> {
        match *self {
            Self::Arrived { task }
            | Self::Dispatched { task, .. }
            | Self::Preempted { task, .. }
            | Self::IoStarted { task }
            | Self::IoCompleted { task }
            | Self::Requeued { task }
            | Self::Completed { task, .. } => Some(task),
            Self::Idle => None,
        }
    }
}
