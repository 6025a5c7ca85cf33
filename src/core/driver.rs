use super::{
    event::SchedCoreEvent,
    metrics::{Metrics, Report},
    observer::Observer,
    state::{Burst, JobId, Route, SchedCtx, TaskId, TaskState, Ticks},
};

pub struct SchedCore {
    pub ctx: SchedCtx,
    pub metrics: Metrics,
    observer: Observer,
}

impl SchedCore {
    pub fn new(quantum: Ticks) -> Self {
        Self {
            ctx: SchedCtx::new(quantum),
            metrics: Metrics::new(),
            observer: Observer::new(),
        }
    }

    pub fn add_task(
        &mut self,
        job_id: JobId,
        arrival_time: Ticks,
        bursts: impl IntoIterator<Item = Burst>,
    ) -> TaskId {
        self.ctx.create_task(job_id, arrival_time, bursts)
    }

    /// One iteration of the loop: admit arrivals, then exactly one of dispatch, I/O service or
    /// idle, with the ready queue taking priority over the device queue.
    pub fn tick(&mut self) -> Vec<SchedCoreEvent> {
        let mut events = Vec::new();
        self.admit_arrivals(&mut events);

        if !self.ctx.ready_queue.is_empty() {
            self.dispatch(&mut events);
        } else if !self.ctx.device_queue.is_empty() {
            self.service_io(&mut events);
        } else {
            self.idle(&mut events);
        }

        self.observer.observe(&self.ctx);
        events
    }

    /// Move every task that has arrived by `now` and was never admitted onto the ready queue.
    pub fn admit_arrivals(&mut self, events: &mut Vec<SchedCoreEvent>) {
        let now = self.ctx.now;
        for task_id in 0..self.ctx.tasks.len() {
            let task = self.ctx.task(task_id);
            if task.is_admitted() || task.arrival_time > now || task.bursts.is_empty() {
                continue;
            }

            self.ctx.ready_push(task_id);
            self.emit(events, SchedCoreEvent::Arrived { task: task_id });
        }
    }

    /// Run the ready queue head for up to one quantum.
    pub fn dispatch(&mut self, events: &mut Vec<SchedCoreEvent>) {
        let Some(task_id) = self.ctx.ready_pop() else {
            return;
        };

        let remaining = self
            .ctx
            .task(task_id)
            .current_burst()
            .expect("Dispatched task has no pending burst")
            .duration;
        let ran = remaining.min(self.ctx.quantum);

        self.ctx.advance_time(ran);
        self.emit(events, SchedCoreEvent::Dispatched { task: task_id, ran });

        // Tasks that arrived during the slice queue ahead of this one
        self.admit_arrivals(events);

        if !self.ctx.consume(task_id, ran) {
            self.emit(
                events,
                SchedCoreEvent::Preempted {
                    task: task_id,
                    remaining: remaining - ran,
                },
            );
            self.ctx.ready_push(task_id);
            return;
        }

        match self.ctx.task(task_id).route() {
            Route::Device => {
                self.ctx.device_push(task_id);
                self.emit(events, SchedCoreEvent::IoStarted { task: task_id });
            }
            Route::Complete => self.complete(task_id, events),
            Route::Ready => {
                self.ctx.ready_push(task_id);
                self.emit(events, SchedCoreEvent::Requeued { task: task_id });
            }
        }
    }

    /// Advance every blocked task by one unit of I/O as a single tick. Tasks leaving the device
    /// join the ready queue ahead of anything arriving on the new tick.
    pub fn service_io(&mut self, events: &mut Vec<SchedCoreEvent>) {
        self.ctx.advance_time(1);

        let blocked = std::mem::take(&mut self.ctx.device_queue);
        let mut still_blocked = Vec::with_capacity(blocked.len());

        for task_id in blocked {
            if !self.ctx.consume(task_id, 1) {
                still_blocked.push(task_id);
                continue;
            }

            match self.ctx.task(task_id).route() {
                Route::Ready => {
                    self.ctx.ready_push(task_id);
                    self.emit(events, SchedCoreEvent::IoCompleted { task: task_id });
                }
                Route::Complete => self.complete(task_id, events),
                // Back-to-back I/O bursts stay on the device
                Route::Device => still_blocked.push(task_id),
            }
        }

        self.ctx.device_queue = still_blocked;
    }

    pub fn idle(&mut self, events: &mut Vec<SchedCoreEvent>) {
        self.ctx.advance_time(1);
        self.emit(events, SchedCoreEvent::Idle);
        self.admit_arrivals(events);
    }

    fn complete(&mut self, task_id: TaskId, events: &mut Vec<SchedCoreEvent>) {
        let now = self.ctx.now;
        self.ctx.mark_completed(task_id, now);

        let task = self.ctx.task(task_id);
        let turnaround = now - task.arrival_time;
        let waiting = turnaround.saturating_sub(task.total_service);
        self.metrics.record_completion(turnaround, waiting);

        self.emit(
            events,
            SchedCoreEvent::Completed {
                task: task_id,
                turnaround,
                waiting,
            },
        );
    }

    fn emit(&mut self, events: &mut Vec<SchedCoreEvent>, event: SchedCoreEvent) {
        if event.is_interrupt() {
            self.metrics.record_interrupt();
        }
        match event.task() {
            Some(task_id) => log::debug!(
                "[t={}] job {}: {:?}",
                self.ctx.now,
                self.ctx.task(task_id).job_id,
                event
            ),
            None => log::trace!("[t={}] {:?}", self.ctx.now, event),
        }
        events.push(event);
    }

    pub fn all_completed(&self) -> bool {
        self.ctx.all_completed()
    }

    pub fn task_state(&self, task_id: TaskId) -> TaskState {
        self.ctx.task(task_id).state
    }

    pub fn report(&self) -> Report {
        self.metrics.report(self.ctx.quantum)
    }

    pub fn now(&self) -> Ticks {
        self.ctx.now
    }

    pub fn observer(&self) -> &Observer {
        &self.observer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::state::BurstKind;

    fn interrupts(events: &[SchedCoreEvent]) -> usize {
        events.iter().filter(|e| e.is_interrupt()).count()
    }

    #[test]
    fn admission_happens_once_per_task() {
        let mut core = SchedCore::new(2);
        let task = core.add_task(1, 0, [Burst::cpu(6)]);

        let mut events = Vec::new();
        core.admit_arrivals(&mut events);
        core.admit_arrivals(&mut events);

        assert_eq!(events, vec![SchedCoreEvent::Arrived { task }]);
        assert_eq!(core.ctx.ready_queue.len(), 1);
        assert_eq!(core.metrics.total_interrupts, 1);
    }

    #[test]
    fn admission_skips_future_arrivals() {
        let mut core = SchedCore::new(2);
        core.add_task(1, 0, [Burst::cpu(1)]);
        let late = core.add_task(2, 5, [Burst::cpu(1)]);

        let mut events = Vec::new();
        core.admit_arrivals(&mut events);

        assert_eq!(events.len(), 1);
        assert_eq!(core.task_state(late), TaskState::Pending);
    }

    #[test]
    fn dispatch_preempts_and_requeues_after_arrivals() {
        let mut core = SchedCore::new(3);
        let first = core.add_task(1, 0, [Burst::cpu(5)]);
        let second = core.add_task(2, 2, [Burst::cpu(1)]);

        let mut events = Vec::new();
        core.admit_arrivals(&mut events);
        events.clear();
        core.dispatch(&mut events);

        assert_eq!(core.now(), 3);
        assert_eq!(
            events,
            vec![
                SchedCoreEvent::Dispatched {
                    task: first,
                    ran: 3
                },
                SchedCoreEvent::Arrived { task: second },
                SchedCoreEvent::Preempted {
                    task: first,
                    remaining: 2
                },
            ]
        );
        assert_eq!(
            core.ctx.ready_queue.iter().copied().collect::<Vec<_>>(),
            vec![second, first]
        );
    }

    #[test]
    fn finished_cpu_burst_moves_to_device_queue() {
        let mut core = SchedCore::new(4);
        let task = core.add_task(1, 0, [Burst::cpu(2), Burst::io(3), Burst::cpu(1)]);

        let mut events = Vec::new();
        core.admit_arrivals(&mut events);
        core.dispatch(&mut events);

        assert_eq!(core.now(), 2);
        assert_eq!(core.ctx.device_queue, vec![task]);
        assert_eq!(core.task_state(task), TaskState::Blocked);
        assert_eq!(
            core.ctx.task(task).current_burst().map(|b| b.kind),
            Some(BurstKind::Io)
        );
        assert_eq!(interrupts(&events), 2);
    }

    #[test]
    fn io_service_advances_all_blocked_tasks_together() {
        let mut core = SchedCore::new(10);
        let short = core.add_task(1, 0, [Burst::cpu(1), Burst::io(1), Burst::cpu(1)]);
        let long = core.add_task(2, 0, [Burst::cpu(1), Burst::io(3), Burst::cpu(1)]);

        let mut events = Vec::new();
        core.admit_arrivals(&mut events);
        core.dispatch(&mut events);
        core.dispatch(&mut events);
        assert_eq!(core.ctx.device_queue, vec![short, long]);

        events.clear();
        core.service_io(&mut events);

        assert_eq!(core.now(), 3);
        assert_eq!(events, vec![SchedCoreEvent::IoCompleted { task: short }]);
        assert_eq!(core.ctx.device_queue, vec![long]);
        assert_eq!(core.ctx.task(long).current_burst(), Some(&Burst::io(2)));
        assert_eq!(core.ctx.ready_queue.front(), Some(&short));
    }

    #[test]
    fn io_return_queues_ahead_of_same_tick_arrival() {
        let mut core = SchedCore::new(10);
        let io_bound = core.add_task(1, 0, [Burst::cpu(1), Burst::io(1), Burst::cpu(1)]);
        let late = core.add_task(2, 2, [Burst::cpu(1)]);

        core.tick();
        let events = core.tick();
        assert_eq!(core.now(), 2);
        assert_eq!(events, vec![SchedCoreEvent::IoCompleted { task: io_bound }]);
        assert_eq!(core.task_state(late), TaskState::Pending);

        let events = core.tick();
        assert_eq!(
            events,
            vec![
                SchedCoreEvent::Arrived { task: late },
                SchedCoreEvent::Dispatched {
                    task: io_bound,
                    ran: 1
                },
                SchedCoreEvent::Completed {
                    task: io_bound,
                    turnaround: 3,
                    waiting: 0
                },
            ]
        );

        core.tick();
        assert!(core.all_completed());
        assert_eq!(core.ctx.task(io_bound).completion_time, Some(3));
        assert_eq!(core.ctx.task(late).completion_time, Some(4));
    }

    #[test]
    fn trailing_io_burst_completes_task() {
        let mut core = SchedCore::new(10);
        let task = core.add_task(1, 0, [Burst::cpu(1), Burst::io(1)]);

        let mut events = Vec::new();
        core.admit_arrivals(&mut events);
        core.dispatch(&mut events);
        core.service_io(&mut events);

        assert!(core.all_completed());
        assert_eq!(core.ctx.task(task).completion_time, Some(2));
        assert_eq!(core.metrics.total_turnaround, 2);
        assert_eq!(core.metrics.total_waiting, 0);
    }

    #[test]
    fn consecutive_cpu_bursts_requeue_without_interrupt() {
        let mut core = SchedCore::new(10);
        let task = core.add_task(1, 0, [Burst::cpu(1), Burst::cpu(2)]);

        let mut events = Vec::new();
        core.admit_arrivals(&mut events);
        events.clear();
        core.dispatch(&mut events);

        assert_eq!(
            events,
            vec![
                SchedCoreEvent::Dispatched { task, ran: 1 },
                SchedCoreEvent::Requeued { task }
            ]
        );
        assert_eq!(interrupts(&events), 0);
        assert_eq!(core.ctx.ready_queue.front(), Some(&task));
    }

    #[test]
    fn idle_tick_only_moves_the_clock() {
        let mut core = SchedCore::new(2);
        let task = core.add_task(1, 3, [Burst::cpu(1)]);

        let events = core.tick();
        assert_eq!(events, vec![SchedCoreEvent::Idle]);
        assert_eq!(core.now(), 1);
        assert_eq!(core.task_state(task), TaskState::Pending);
        assert_eq!(core.metrics.total_interrupts, 0);
    }

    #[test]
    fn idle_tick_admits_the_task_arriving_next() {
        let mut core = SchedCore::new(2);
        let task = core.add_task(1, 1, [Burst::cpu(1)]);

        let events = core.tick();
        assert_eq!(
            events,
            vec![SchedCoreEvent::Idle, SchedCoreEvent::Arrived { task }]
        );
        assert_eq!(core.task_state(task), TaskState::Ready);
    }

    #[test]
    fn ready_queue_has_priority_over_device_queue() {
        let mut core = SchedCore::new(1);
        let io_bound = core.add_task(1, 0, [Burst::cpu(1), Burst::io(5), Burst::cpu(1)]);
        let cpu_bound = core.add_task(2, 0, [Burst::cpu(3)]);

        core.tick();
        assert_eq!(core.ctx.device_queue, vec![io_bound]);

        // While cpu_bound is runnable the device queue does not progress
        core.tick();
        core.tick();
        assert_eq!(core.ctx.task(io_bound).current_burst(), Some(&Burst::io(5)));
        assert_eq!(core.task_state(cpu_bound), TaskState::Ready);
        assert_eq!(core.observer().steps(), 3);
    }
}
