//! Run configuration and the on-disk config format.
//!
//! The input file carries three whitespace-separated integers, in
//! order: simulation duration in seconds, producer count, consumer
//! count. Fields are parsed as signed integers so a negative value is
//! rejected as a config error rather than wrapping.

use crate::error::{ConveyorError, Result};
use crate::ring::DEFAULT_CAPACITY;
use crate::task::Pacing;
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Immutable configuration for one simulation run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// How long producers and consumers run before shutdown.
    pub duration: Duration,
    /// Producer task count.
    pub producers: usize,
    /// Consumer task count.
    pub consumers: usize,
    /// Ring storage slots (`capacity - 1` usable).
    pub capacity: usize,
    /// Per-iteration delay policy for every task.
    pub pacing: Pacing,
}

impl RunConfig {
    pub fn new(duration: Duration, producers: usize, consumers: usize) -> Self {
        Self {
            duration,
            producers,
            consumers,
            capacity: DEFAULT_CAPACITY,
            pacing: Pacing::default(),
        }
    }

    /// Override the ring capacity (storage slots, minimum 2).
    pub fn with_capacity(mut self, capacity: usize) -> Result<Self> {
        if capacity < 2 {
            return Err(ConveyorError::config(
                "ring capacity must be at least 2 (one slot is reserved)",
            ));
        }
        self.capacity = capacity;
        Ok(self)
    }

    pub fn with_pacing(mut self, pacing: Pacing) -> Self {
        self.pacing = pacing;
        self
    }

    /// Parse the three-field config format.
    pub fn parse(text: &str) -> Result<Self> {
        let mut fields = text.split_whitespace();
        let duration_secs = next_field(&mut fields, "duration")?;
        let producers = next_field(&mut fields, "producer count")?;
        let consumers = next_field(&mut fields, "consumer count")?;

        Ok(Self::new(
            Duration::from_secs(duration_secs as u64),
            producers as usize,
            consumers as usize,
        ))
    }

    /// Read and parse a config file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::parse(&text)
    }
}

fn next_field<'a>(fields: &mut impl Iterator<Item = &'a str>, name: &str) -> Result<i64> {
    let raw = fields
        .next()
        .ok_or_else(|| ConveyorError::config(format!("missing field: {}", name)))?;
    let value: i64 = raw
        .parse()
        .map_err(|_| ConveyorError::config(format!("{} is not an integer: '{}'", name, raw)))?;
    if value < 0 {
        return Err(ConveyorError::config(format!(
            "{} must be non-negative, got {}",
            name, value
        )));
    }
    Ok(value)
}
