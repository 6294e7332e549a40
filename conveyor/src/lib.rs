//! Conveyor - bounded-buffer producer/consumer simulator.
//!
//! A fixed-capacity ring shared by N producers and M consumers,
//! coordinated with two counting semaphores and a mutex. The run
//! controller times a simulation window, raises cooperative stop
//! flags, and joins every task.

pub mod config;
pub mod error;
pub mod report;
pub mod ring;
pub mod run;
pub mod sync;
pub mod task;

// Re-export main components
pub use config::RunConfig;
pub use error::{ConveyorError, Result};
pub use ring::{Item, RingBuffer, DEFAULT_CAPACITY};
pub use run::{run, run_with_sink, RunResult};
pub use sync::{Belt, Semaphore};
pub use task::Pacing;
