//! Mutable, build-phase-only records.
//!
//! One record per build entity, created on its start event (or synthesized
//! from a "skipped" message) and completed on its finished event. Records
//! only ever grow; the finalizer turns them into the immutable snapshot
//! types in [`crate::core`]. None of these types leave the builder.

pub mod build;
pub mod evaluation;
pub mod item;
pub mod message;
pub mod project;
pub mod target;
pub mod task;

pub use build::BuildInfo;
pub use evaluation::{EvaluatedProjectInfo, EvaluationInfo};
pub use item::{ItemActionInfo, ItemGroupInfo, ItemInfo, PropertySetInfo};
pub use message::{DiagnosticInfo, MessageInfo};
pub use project::ProjectInfo;
pub use target::TargetInfo;
pub use task::TaskInfo;
