//! Replaying recorded build logs.
//!
//! A recorded log is a JSON-lines file with one [`BuildEvent`] per line.
//! Lines are decoded in parallel, then fed to a [`ModelBuilder`] in file
//! order.

use std::path::Path;

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use tracing::{debug, info};

use crate::builder::{ModelBuilder, ModelFailure};
use crate::core::Log;
use crate::events::{BuildEvent, EventSink};

/// Options for [`replay`].
#[derive(Debug, Clone, Default)]
pub struct ReplayOptions {
    /// Show a progress bar while feeding events
    pub progress: bool,
}

/// Read every event of a JSON-lines log.
pub fn read_events(path: &Path) -> Result<Vec<BuildEvent>> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read build log: {}", path.display()))?;

    let events = parse_events(&contents)
        .with_context(|| format!("failed to parse build log: {}", path.display()))?;
    debug!(count = events.len(), path = %path.display(), "read build log");
    Ok(events)
}

/// Decode a JSON-lines log. Blank lines are ignored.
pub fn parse_events(contents: &str) -> Result<Vec<BuildEvent>> {
    let lines: Vec<(usize, &str)> = contents
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .collect();

    lines
        .par_iter()
        .map(|(index, line)| {
            serde_json::from_str::<BuildEvent>(line)
                .with_context(|| format!("line {}: invalid build event", index + 1))
        })
        .collect()
}

/// Feed `events` to `sink` in order.
pub fn feed(sink: &dyn EventSink, events: Vec<BuildEvent>, progress: Option<&ProgressBar>) {
    for event in events {
        sink.on_event(event);
        if let Some(pb) = progress {
            pb.inc(1);
        }
    }
}

/// Build a model from recorded events.
pub fn replay(events: Vec<BuildEvent>, options: &ReplayOptions) -> Result<Log, ModelFailure> {
    let total = events.len();
    info!(events = total, "replaying build log");

    let pb = if options.progress && total > 1 {
        let pb = ProgressBar::new(total as u64);
        if let Ok(style) =
            ProgressStyle::default_bar().template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        {
            pb.set_style(style.progress_chars("#>-"));
        }
        Some(pb)
    } else {
        None
    };

    let builder = ModelBuilder::new();
    feed(&builder, events, pb.as_ref());

    if let Some(pb) = pb {
        pb.finish_and_clear();
    }

    builder.finish()
}

/// Read and replay the log at `path`.
///
/// The outer error is an I/O or decoding failure; the inner one carries the
/// model errors together with the recovered snapshot.
pub fn replay_file(path: &Path, options: &ReplayOptions) -> Result<Result<Log, ModelFailure>> {
    let events = read_events(path)?;
    Ok(replay(events, options))
}
