use super::state::{BurstKind, SchedCtx, TaskState, Ticks};
use rustc_hash::FxHashSet;

#[derive(Debug, Default)]
pub struct Observer {
    step: u64,
    last_now: Ticks,
}

impl Observer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn steps(&self) -> u64 {
        self.step
    }

    pub fn observe(&mut self, ctx: &SchedCtx) {
        self.step += 1;
        if !cfg!(debug_assertions) {
            return;
        }

        debug_assert!(
            ctx.now >= self.last_now,
            "Clock went backwards: {} -> {}",
            self.last_now,
            ctx.now
        );
        self.last_now = ctx.now;

        let mut queued = FxHashSet::default();
        for &task_id in &ctx.ready_queue {
            let task = ctx.task(task_id);
            let fresh = queued.insert(task_id);
            debug_assert!(fresh, "Task {task_id} appears twice in the ready queue");
            debug_assert_eq!(
                task.state,
                TaskState::Ready,
                "Ready queue holds task {task_id} that is not Ready"
            );
            debug_assert_eq!(
                task.current_burst().map(|b| b.kind),
                Some(BurstKind::Cpu),
                "Ready task {task_id} is not at a CPU burst"
            );
        }

        for &task_id in &ctx.device_queue {
            let task = ctx.task(task_id);
            let fresh = queued.insert(task_id);
            debug_assert!(
                fresh,
                "Task {task_id} queued twice across ready and device queues"
            );
            debug_assert_eq!(
                task.state,
                TaskState::Blocked,
                "Device queue holds task {task_id} that is not Blocked"
            );
            debug_assert_eq!(
                task.current_burst().map(|b| b.kind),
                Some(BurstKind::Io),
                "Blocked task {task_id} is not at an I/O burst"
            );
        }

        let mut completed = 0;
        for task in &ctx.tasks {
            match task.state {
                TaskState::Completed => {
                    completed += 1;
                    debug_assert!(
                        task.bursts.is_empty() && task.completion_time.is_some(),
                        "Completed task {} still has work or no completion time",
                        task.id
                    );
                }
                // Running only exists inside a dispatch step
                TaskState::Running => {
                    debug_assert!(false, "Task {} left Running between steps", task.id)
                }
                // An I/O tick leaves arrivals on the new tick for the next admission pass
                TaskState::Pending => debug_assert!(
                    task.arrival_time >= ctx.now || task.bursts.is_empty(),
                    "Task {} arrived at {} but was never admitted",
                    task.id,
                    task.arrival_time
                ),
                TaskState::Ready | TaskState::Blocked => debug_assert!(
                    queued.contains(&task.id),
                    "Task {} is {:?} but sits in no queue",
                    task.id,
                    task.state
                ),
            }
        }
        debug_assert_eq!(completed, ctx.completed, "Completed count drifted");
    }
}
