//! logmodel - Structured models of MSBuild logs
//!
//! This crate turns the event stream of an MSBuild build into an immutable
//! tree of build, projects, targets, tasks and evaluations, and provides
//! the operations behind the `logmodel` command line tool.

pub mod builder;
pub mod core;
pub mod events;
pub mod ops;
pub mod util;

/// Test utilities for logmodel unit tests.
///
/// This module is only available when compiling with `--cfg test` or
/// running tests. It provides scripted event streams and fixtures.
#[cfg(test)]
pub mod test_support;

pub use builder::{ModelBuilder, ModelError, ModelFailure};
pub use core::Log;
pub use events::{BuildEvent, BuildEventContext, EventSink};
