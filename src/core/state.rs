use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

// Index into Task Vec
pub type TaskId = usize;
pub type JobId = u64;
pub type Ticks = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BurstKind {
    Cpu,
    Io,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Burst {
    pub duration: Ticks,
    pub kind: BurstKind,
}

impl Burst {
    pub fn cpu(duration: Ticks) -> Self {
        Self {
            duration,
            kind: BurstKind::Cpu,
        }
    }

    pub fn io(duration: Ticks) -> Self {
        Self {
            duration,
            kind: BurstKind::Io,
        }
    }
}

/// Lifecycle of a task. Anything past `Pending` means the task has been admitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    Pending,
    Ready,
    Running,
    Blocked,
    Completed,
}

/// Where a task goes after its current burst drains.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Ready,
    Device,
    Complete,
}

#[derive(Debug)]
pub struct Task {
    pub id: TaskId,
    pub job_id: JobId,
    pub state: TaskState,
    pub arrival_time: Ticks,
    pub bursts: VecDeque<Burst>,
    // Sum of every original burst, CPU and I/O
    pub total_service: Ticks,
    pub completion_time: Option<Ticks>,
}

impl Task {
    pub fn is_admitted(&self) -> bool {
        self.state != TaskState::Pending
    }

    pub fn current_burst(&self) -> Option<&Burst> {
        self.bursts.front()
    }

    pub fn route(&self) -> Route {
        match self.bursts.front().map(|burst| burst.kind) {
            None => Route::Complete,
            Some(BurstKind::Cpu) => Route::Ready,
            Some(BurstKind::Io) => Route::Device,
        }
    }
}

#[derive(Debug)]
pub struct SchedCtx {
    pub now: Ticks,
    pub quantum: Ticks,
    pub tasks: Vec<Task>,
    pub ready_queue: VecDeque<TaskId>,
    // Iterated in insertion order so runs stay reproducible
    pub device_queue: Vec<TaskId>,
    pub completed: usize,
}

impl SchedCtx {
    pub fn new(quantum: Ticks) -> Self {
        debug_assert!(quantum > 0, "Quantum must be positive");
        Self {
            now: 0,
            quantum,
            tasks: Vec::new(),
            ready_queue: VecDeque::new(),
            device_queue: Vec::new(),
            completed: 0,
        }
    }

    pub fn create_task(
        &mut self,
        job_id: JobId,
        arrival_time: Ticks,
        bursts: impl IntoIterator<Item = Burst>,
    ) -> TaskId {
        let id = self.tasks.len();
        let bursts: VecDeque<Burst> = bursts.into_iter().collect();
        debug_assert!(!bursts.is_empty(), "Job {job_id} has no bursts");
        debug_assert!(
            bursts.iter().all(|burst| burst.duration > 0),
            "Job {job_id} has a zero-length burst"
        );

        let total_service = bursts.iter().map(|burst| burst.duration).sum();
        self.tasks.push(Task {
            id,
            job_id,
            state: TaskState::Pending,
            arrival_time,
            bursts,
            total_service,
            completion_time: None,
        });

        id
    }

    pub fn advance_time(&mut self, delta: Ticks) {
        self.now = self.now.saturating_add(delta);
    }

    pub fn task(&self, task_id: TaskId) -> &Task {
        &self.tasks[task_id]
    }

    pub fn task_mut(&mut self, task_id: TaskId) -> &mut Task {
        &mut self.tasks[task_id]
    }

    pub fn ready_push(&mut self, task_id: TaskId) {
        debug_assert!(
            !self.ready_queue.contains(&task_id),
            "Task {task_id} already present in the ready queue"
        );

        let task = self.task_mut(task_id);
        debug_assert!(
            matches!(task.current_burst(), Some(b) if b.kind == BurstKind::Cpu),
            "Task {task_id} must be at a CPU burst when made ready"
        );
        task.state = TaskState::Ready;
        self.ready_queue.push_back(task_id);
    }

    pub fn ready_pop(&mut self) -> Option<TaskId> {
        let task_id = self.ready_queue.pop_front()?;
        self.task_mut(task_id).state = TaskState::Running;
        Some(task_id)
    }

    pub fn device_push(&mut self, task_id: TaskId) {
        debug_assert!(
            !self.device_queue.contains(&task_id),
            "Task {task_id} already present in the device queue"
        );

        let task = self.task_mut(task_id);
        debug_assert!(
            matches!(task.current_burst(), Some(b) if b.kind == BurstKind::Io),
            "Task {task_id} must be at an I/O burst when blocked"
        );
        task.state = TaskState::Blocked;
        self.device_queue.push(task_id);
    }

    /// Take `amount` off the task's current burst. Returns true when the burst drained and was
    /// removed.
    pub fn consume(&mut self, task_id: TaskId, amount: Ticks) -> bool {
        let task = self.task_mut(task_id);
        let Some(burst) = task.bursts.front_mut() else {
            debug_assert!(false, "Task {task_id} consumed with no bursts left");
            return false;
        };

        debug_assert!(
            amount <= burst.duration,
            "Task {task_id} overran its burst ({amount} > {})",
            burst.duration
        );
        burst.duration = burst.duration.saturating_sub(amount);

        if burst.duration == 0 {
            task.bursts.pop_front();
            true
        } else {
            false
        }
    }

    pub fn mark_completed(&mut self, task_id: TaskId, completion_time: Ticks) {
        debug_assert!(
            !self.ready_queue.contains(&task_id) && !self.device_queue.contains(&task_id),
            "Completing task {task_id} that is still enqueued"
        );

        let task = &mut self.tasks[task_id];
        debug_assert!(
            task.bursts.is_empty(),
            "Task {task_id} completed with bursts remaining"
        );

        task.state = TaskState::Completed;
        task.completion_time = Some(completion_time);
        self.completed += 1;
    }

    pub fn all_completed(&self) -> bool {
        self.completed == self.tasks.len()
    }
}
