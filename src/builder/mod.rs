//! Log model builder.
//!
//! Turns the flat, possibly concurrent stream of MSBuild logger events into
//! a hierarchical [`Log`](crate::core::Log): the build, its project tree,
//! targets, tasks and evaluations.
//!
//! Events are fed to [`ModelBuilder::handle`] as they arrive. Problems are
//! collected instead of stopping the stream, and [`ModelBuilder::finish`]
//! links child projects to the tasks that built them, sorts everything into
//! a deterministic order and returns either the snapshot or every error
//! together with whatever could still be built.

pub mod errors;
pub mod info;
pub mod message_parser;

mod finalize;
mod router;

pub use errors::{ErrorCategory, ModelError, ModelFailure, ParseError};
pub use router::ModelBuilder;
