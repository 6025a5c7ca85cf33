use super::{
    error::WorkloadError,
    job::{Job, JobInstance},
    workload::Workload,
};
use crate::core::{
    driver::SchedCore,
    event::SchedCoreEvent,
    metrics::Report,
    state::{TaskId, Ticks},
};

pub struct Sim {
    pub core: SchedCore,
    pub jobs: Vec<JobInstance>,
}

impl Sim {
    pub fn new(workload: &Workload) -> Result<Self, WorkloadError> {
        workload.validate()?;

        let mut core = SchedCore::new(workload.quantum);
        let jobs = workload
            .jobs
            .iter()
            .enumerate()
            .map(|(index, job)| {
                let task_id = core.add_task(job.id, job.arrival_time, job.bursts.iter().copied());
                debug_assert_eq!(task_id, index, "TaskId must match job index");
                JobInstance {
                    job: job.clone(),
                    completion_time: None,
                }
            })
            .collect();

        Ok(Self { core, jobs })
    }

    pub fn step(&mut self) -> Vec<SchedCoreEvent> {
        let events = self.core.tick();

        let completion_time = self.core.now();
        for event in &events {
            if let SchedCoreEvent::Completed { task, .. } = *event {
                self.jobs[task].completion_time = Some(completion_time);
            }
        }

        events
    }

    /// Step until every job has completed and return the final report.
    pub fn run(&mut self) -> Report {
        log::info!(
            "Simulating {} jobs with quantum {}",
            self.jobs.len(),
            self.core.ctx.quantum
        );

        while !self.all_jobs_completed() {
            self.step();
        }

        let report = self.report();
        log::info!(
            "Finished at t={} after {} steps, {} interrupts",
            self.now(),
            self.core.observer().steps(),
            report.total_interrupts
        );
        report
    }

    pub fn all_jobs_completed(&self) -> bool {
        self.core.all_completed()
    }

    pub fn report(&self) -> Report {
        self.core.report()
    }

    pub fn now(&self) -> Ticks {
        self.core.now()
    }

    pub fn job(&self, task: TaskId) -> &Job {
        &self.jobs[task].job
    }

    pub fn jobs_map<'a, T>(
        &'a self,
        f: impl Fn(&JobInstance) -> T + 'a,
    ) -> impl Iterator<Item = T> + 'a {
        self.jobs.iter().map(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::state::Burst;

    fn single_job(quantum: Ticks, bursts: Vec<Burst>) -> Workload {
        Workload {
            quantum,
            jobs: vec![Job {
                id: 1,
                arrival_time: 0,
                bursts,
            }],
        }
    }

    #[test]
    fn rejects_invalid_workload() {
        let workload = single_job(0, vec![Burst::cpu(1)]);
        assert!(matches!(Sim::new(&workload), Err(WorkloadError::ZeroQuantum)));
    }

    #[test]
    fn completion_time_is_copied_to_job_instance() {
        let mut sim = Sim::new(&single_job(11, vec![Burst::cpu(5)])).unwrap();
        let report = sim.run();

        assert_eq!(sim.jobs[0].completion_time, Some(5));
        assert_eq!(sim.jobs[0].turnaround(), Some(5));
        assert_eq!(sim.jobs[0].waiting(), Some(0));
        assert_eq!(report.total_turnaround, 5);
        assert_eq!(report.total_interrupts, 2);
    }

    #[test]
    fn step_reports_events_in_order() {
        let mut sim = Sim::new(&single_job(2, vec![Burst::cpu(3)])).unwrap();

        assert_eq!(
            sim.step(),
            vec![
                SchedCoreEvent::Arrived { task: 0 },
                SchedCoreEvent::Dispatched { task: 0, ran: 2 },
                SchedCoreEvent::Preempted {
                    task: 0,
                    remaining: 1
                },
            ]
        );
        assert_eq!(
            sim.step(),
            vec![
                SchedCoreEvent::Dispatched { task: 0, ran: 1 },
                SchedCoreEvent::Completed {
                    task: 0,
                    turnaround: 3,
                    waiting: 0
                },
            ]
        );
        assert!(sim.all_jobs_completed());
        assert_eq!(sim.job(0).id, 1);
    }
}
