//! Test utilities for logmodel unit tests.
//!
//! Only compiled for tests. Provides scripted event streams, a recording
//! event sink and helpers for writing logs to disk.
//!
//! # Example
//!
//! ```rust,ignore
//! use logmodel::test_support::{simple_build, RecordingSink};
//!
//! #[test]
//! fn test_example() {
//!     let sink = RecordingSink::new();
//!     for event in simple_build().into_events() {
//!         sink.on_event(event);
//!     }
//!     assert_eq!(sink.kinds()[0], "build-started");
//! }
//! ```

pub mod fixtures;

use std::io::Write;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::Result;

use crate::builder::ModelBuilder;
use crate::core::Log;
use crate::events::{BuildEvent, EventSink};

pub use fixtures::*;

/// Event sink that only records what it receives.
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: Mutex<Vec<BuildEvent>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<BuildEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn kinds(&self) -> Vec<&'static str> {
        self.events.lock().unwrap().iter().map(BuildEvent::kind).collect()
    }
}

impl EventSink for RecordingSink {
    fn on_event(&self, event: BuildEvent) {
        self.events.lock().unwrap().push(event);
    }
}

/// Feed `events` into a fresh builder, in order.
pub fn builder_with(events: impl IntoIterator<Item = BuildEvent>) -> ModelBuilder {
    let builder = ModelBuilder::new();
    for event in events {
        builder.handle(event);
    }
    builder
}

/// Build a model from `script`, panicking on any model error.
pub fn model_of(script: EventScript) -> Log {
    match builder_with(script.into_events()).finish() {
        Ok(log) => log,
        Err(failure) => panic!("unexpected model errors: {:?}", failure.errors),
    }
}

/// A JSON-lines log written to a temporary directory.
pub struct TempLog {
    _dir: tempfile::TempDir,
    pub path: PathBuf,
}

/// Write `contents` to `build.jsonl` in a fresh temporary directory.
pub fn write_log(contents: &str) -> Result<TempLog> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("build.jsonl");
    let mut file = std::fs::File::create(&path)?;
    file.write_all(contents.as_bytes())?;
    Ok(TempLog { _dir: dir, path })
}
