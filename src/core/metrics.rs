use super::state::Ticks;
use average::{Estimate, Mean};
use std::fmt;

/// Running totals collected while the simulation advances.
#[derive(Debug, Clone)]
pub struct Metrics {
    pub total_waiting: Ticks,
    pub total_turnaround: Ticks,
    pub total_interrupts: u64,
    waiting: Mean,
    turnaround: Mean,
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            total_waiting: 0,
            total_turnaround: 0,
            total_interrupts: 0,
            waiting: Mean::new(),
            turnaround: Mean::new(),
        }
    }

    pub fn record_interrupt(&mut self) {
        self.total_interrupts += 1;
    }

    pub fn record_completion(&mut self, turnaround: Ticks, waiting: Ticks) {
        self.total_turnaround += turnaround;
        self.total_waiting += waiting;
        self.turnaround.add(turnaround as f64);
        self.waiting.add(waiting as f64);
    }

    pub fn jobs_recorded(&self) -> u64 {
        self.turnaround.len()
    }

    pub fn report(&self, quantum: Ticks) -> Report {
        Report {
            quantum,
            total_waiting: self.total_waiting,
            total_turnaround: self.total_turnaround,
            total_interrupts: self.total_interrupts,
            average_waiting: self.waiting.mean(),
            average_turnaround: self.turnaround.mean(),
        }
    }
}

/// Final figures of a finished run.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub quantum: Ticks,
    pub total_waiting: Ticks,
    pub total_turnaround: Ticks,
    pub total_interrupts: u64,
    pub average_waiting: f64,
    pub average_turnaround: f64,
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Quantum: {}", self.quantum)?;
        writeln!(f, "Overall Waiting Time: {}", self.total_waiting)?;
        writeln!(f, "Overall Turnaround Time: {}", self.total_turnaround)?;
        writeln!(
            f,
            "Total Number of Interrupts (Context Switches): {}",
            self.total_interrupts
        )?;
        writeln!(f, "Average Waiting Time: {:.2}", self.average_waiting)?;
        write!(f, "Average Turnaround Time: {:.2}", self.average_turnaround)
    }
}
