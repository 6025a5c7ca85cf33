use anyhow::{Context, Result, bail};
use average::Estimate;
use env_logger::Builder;
use rr_model::{SchedCoreEvent, Sim, Workload, sim::DEFAULT_QUANTUM};
use std::io::Write;

const USAGE: &str = "usage: rr_model [WORKLOAD.toml | --random SEED [JOBS]]";
const DEFAULT_RANDOM_JOBS: usize = 8;

fn main() -> Result<()> {
    Builder::from_default_env()
        .format(|buf, record| writeln!(buf, "{}", record.args()))
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let workload = load_workload(&args)?;
    let mut sim = Sim::new(&workload).context("Invalid workload")?;

    let mut current_idle = 0;
    let mut max_idle = 0;
    while !sim.all_jobs_completed() {
        let events = sim.step();

        if events.contains(&SchedCoreEvent::Idle) {
            current_idle += 1;
            max_idle = max_idle.max(current_idle);
        } else {
            current_idle = 0;
        }
    }

    println!(
        "{:>4} {:>8} {:>11} {:>11} {:>8}",
        "Job", "Arrival", "Completion", "Turnaround", "Waiting"
    );
    for instance in &sim.jobs {
        println!(
            "{:>4} {:>8} {:>11} {:>11} {:>8}",
            instance.job.id,
            instance.job.arrival_time,
            instance.completion_time.unwrap_or_default(),
            instance.turnaround().unwrap_or_default(),
            instance.waiting().unwrap_or_default(),
        );
    }
    println!();

    println!("{}", sim.report());
    let longest_wait = sim
        .jobs_map(|j| j.waiting().unwrap_or_default())
        .max()
        .unwrap_or_default();
    let cpu_times = sim.jobs_map(|j| j.job.cpu_time() as f64);
    println!("Average CPU demand: {:.2} ticks", avg(cpu_times));
    println!("Longest single-job wait: {longest_wait} ticks");
    println!("Longest idle period: {max_idle} ticks");

    Ok(())
}

fn load_workload(args: &[String]) -> Result<Workload> {
    match args {
        [] => Ok(Workload::builtin()),
        [flag, rest @ ..] if flag == "--random" => {
            let (seed, jobs) = match rest {
                [seed] => (seed, None),
                [seed, jobs] => (seed, Some(jobs)),
                _ => bail!(USAGE),
            };
            let seed: u64 = seed.parse().context("Seed must be an unsigned integer")?;
            let jobs = match jobs {
                Some(jobs) => jobs.parse().context("Job count must be an unsigned integer")?,
                None => DEFAULT_RANDOM_JOBS,
            };

            let workload = Workload::random(seed, jobs, DEFAULT_QUANTUM);
            log::info!(
                "Generated workload (seed {seed}):\n{}",
                workload.to_toml().context("Failed to serialise workload")?
            );
            Ok(workload)
        }
        [path] if !path.starts_with('-') => Workload::from_path(path)
            .with_context(|| format!("Failed to load workload from {path}")),
        _ => bail!(USAGE),
    }
}

fn avg(iter: impl Iterator<Item = f64>) -> f64 {
    iter.collect::<average::Mean>().estimate()
}
