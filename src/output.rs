use std::io::{self, Write};

use serde::Serialize;

use crate::harvest::{HarvestReport, ProgressEvent, ProgressSink};

#[derive(Debug, Clone, Copy)]
pub enum OutputMode {
    Console,
    Json,
}

/// Mirrors the reference behavior: progress lines on stdout as recordings
/// are committed.
pub struct ConsoleSink;

impl ProgressSink for ConsoleSink {
    fn event(&self, event: ProgressEvent) {
        println!("{}", event.message);
    }
}

/// Silent during the run; the final report is printed as pretty JSON.
pub struct JsonOutput;

impl JsonOutput {
    pub fn print_report(report: &HarvestReport) -> io::Result<()> {
        Self::print_json(report)
    }

    fn print_json<T: Serialize>(value: &T) -> io::Result<()> {
        let json = serde_json::to_string_pretty(value).map_err(io::Error::other)?;
        let mut stdout = io::stdout();
        stdout.write_all(json.as_bytes())?;
        stdout.write_all(b"\n")?;
        Ok(())
    }
}

impl ProgressSink for JsonOutput {
    fn event(&self, _event: ProgressEvent) {}
}
