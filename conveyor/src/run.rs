//! Run controller: owns a simulation from spawn to last join.
//!
//! One belt is shared by every task. The controller is the only writer
//! of the stop flags, and the belt outlives all tasks because each
//! holds its own `Arc` handle.

use crate::config::RunConfig;
use crate::error::{ConveyorError, Result};
use crate::ring::Item;
use crate::sync::Belt;
use crate::task::{consumer_loop, producer_loop, random_items};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::info;

/// Outcome of one simulation run.
#[derive(Debug, Clone)]
pub struct RunResult {
    /// Wall time from first spawn to last join.
    pub elapsed: Duration,
    /// Total items inserted by all producers.
    pub produced: u64,
    /// Total items removed by all consumers.
    pub consumed: u64,
}

/// Run a simulation, discarding consumed items.
pub fn run(config: &RunConfig) -> Result<RunResult> {
    run_with_sink(config, |_| {})
}

/// Run a simulation, handing every consumed item to `sink`.
///
/// Spawns the configured producer and consumer tasks, lets them race
/// on the shared belt for `config.duration`, raises both stop flags,
/// and joins every task before returning. A thread-spawn failure stops
/// and joins the tasks created so far, then propagates as a resource
/// error.
pub fn run_with_sink<F>(config: &RunConfig, sink: F) -> Result<RunResult>
where
    F: Fn(Item) + Send + Sync + 'static,
{
    let belt = Arc::new(Belt::new(config.capacity)?);
    let sink = Arc::new(sink);
    info!(
        producers = config.producers,
        consumers = config.consumers,
        capacity = config.capacity,
        duration_secs = config.duration.as_secs_f64(),
        "starting run"
    );

    let start = Instant::now();
    let mut producers: Vec<JoinHandle<u64>> = Vec::with_capacity(config.producers);
    let mut consumers: Vec<JoinHandle<u64>> = Vec::with_capacity(config.consumers);

    let spawned = (|| -> std::io::Result<()> {
        for i in 0..config.producers {
            let belt = belt.clone();
            let pacing = config.pacing.clone();
            producers.push(
                thread::Builder::new()
                    .name(format!("producer-{}", i))
                    .spawn(move || producer_loop(&belt, &pacing, random_items()))?,
            );
        }
        for i in 0..config.consumers {
            let belt = belt.clone();
            let pacing = config.pacing.clone();
            let sink = sink.clone();
            consumers.push(
                thread::Builder::new()
                    .name(format!("consumer-{}", i))
                    .spawn(move || consumer_loop(&belt, &pacing, move |item| sink(item)))?,
            );
        }
        Ok(())
    })();

    if let Err(e) = spawned {
        belt.stop_producers();
        belt.stop_consumers();
        for handle in producers.drain(..).chain(consumers.drain(..)) {
            let _ = handle.join();
        }
        return Err(e.into());
    }

    thread::sleep(config.duration);
    belt.stop_producers();
    belt.stop_consumers();

    let produced = join_tallies(producers)?;
    let consumed = join_tallies(consumers)?;
    let elapsed = start.elapsed();
    info!(
        elapsed_secs = elapsed.as_secs_f64(),
        produced, consumed, "run complete"
    );

    Ok(RunResult {
        elapsed,
        produced,
        consumed,
    })
}

fn join_tallies(handles: Vec<JoinHandle<u64>>) -> Result<u64> {
    let mut total = 0u64;
    for handle in handles {
        let name = handle.thread().name().unwrap_or("worker").to_string();
        total += handle.join().map_err(|_| ConveyorError::Worker(name))?;
    }
    Ok(total)
}
