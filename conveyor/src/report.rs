//! Report file writer.

use crate::error::Result;
use crate::run::RunResult;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default report filename for a run of the given duration.
pub fn default_report_path(duration: Duration) -> PathBuf {
    PathBuf::from(format!("output-{}sec-wait.txt", duration.as_secs()))
}

/// Write the run summary: elapsed wall time in seconds plus tallies.
pub fn write_report<P: AsRef<Path>>(path: P, result: &RunResult) -> Result<()> {
    let mut file = File::create(path)?;
    writeln!(
        file,
        "turnaround time: {:.3} seconds",
        result.elapsed.as_secs_f64()
    )?;
    writeln!(file, "items produced: {}", result.produced)?;
    writeln!(file, "items consumed: {}", result.consumed)?;
    Ok(())
}
