//! Immutable snapshot of a build.
//!
//! These types are produced once, when a [`ModelBuilder`] is finalized, and
//! never change afterwards. Every list is sorted by a fixed key so the
//! snapshot does not depend on the order events arrived in:
//! - items and item groups by name
//! - targets, tasks, child projects and evaluated projects by start time
//! - messages, item actions and property sets by timestamp
//!
//! [`ModelBuilder`]: crate::builder::ModelBuilder

pub mod build;
pub mod evaluation;
pub mod item;
pub mod message;
pub mod project;
pub mod target;
pub mod task;

pub use build::{Build, Log, Outcome};
pub use evaluation::{EvaluatedProject, Evaluation};
pub use item::{Item, ItemAction, ItemGroup, PropertySet};
pub use message::{Diagnostic, Message, Severity};
pub use project::Project;
pub use target::Target;
pub use task::Task;
