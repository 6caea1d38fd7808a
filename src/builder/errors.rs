//! Model builder error types and diagnostics.

use std::fmt;

use miette::Diagnostic as MietteDiagnostic;
use thiserror::Error;

use crate::core::Log;
use crate::util::diagnostic::Diagnostic;

/// Broad class of a [`ModelError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Event arrived with an unexpected context shape or out of order
    Protocol,
    /// An id was registered twice
    Identity,
    /// An event referenced an id that was never registered
    Lookup,
    /// Malformed message payload or inconsistent data
    DataShape,
    /// Event or finalization after the builder reached a terminal state
    Terminal,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorCategory::Protocol => write!(f, "protocol"),
            ErrorCategory::Identity => write!(f, "identity"),
            ErrorCategory::Lookup => write!(f, "lookup"),
            ErrorCategory::DataShape => write!(f, "data-shape"),
            ErrorCategory::Terminal => write!(f, "terminal"),
        }
    }
}

/// Malformed item-group text block.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("item group line does not end with `=`: `{line}`")]
    InvalidGroupLine { line: String },

    #[error("item found outside of an item group: `{line}`")]
    ItemOutsideGroup { line: String },

    #[error("metadata found outside of an item: `{line}`")]
    MetadataOutsideItem { line: String },

    #[error("unexpected indentation of {indent} spaces: `{line}`")]
    UnexpectedIndentation { indent: usize, line: String },

    #[error("expected `name=value`, found `{text}`")]
    MissingAssignment { text: String },
}

/// A single structural problem found while building the model.
#[derive(Debug, Clone, PartialEq, Eq, Error, MietteDiagnostic)]
pub enum ModelError {
    #[error("unexpected context on {event}: {reason}")]
    #[diagnostic(code(logmodel::builder::protocol))]
    UnexpectedContext { event: &'static str, reason: String },

    #[error("build started twice")]
    #[diagnostic(code(logmodel::builder::protocol))]
    BuildAlreadyStarted,

    #[error("{event} received before the build started")]
    #[diagnostic(code(logmodel::builder::protocol))]
    BuildNotStarted { event: &'static str },

    #[error("project {id} was already started")]
    #[diagnostic(code(logmodel::builder::identity))]
    DuplicateProject { id: i32 },

    #[error("target {target_id} is already running in project {project_id}")]
    #[diagnostic(code(logmodel::builder::identity))]
    DuplicateTarget { project_id: i32, target_id: i32 },

    #[error("task {task_id} is already running in target {target_id} of project {project_id}")]
    #[diagnostic(code(logmodel::builder::identity))]
    DuplicateTask {
        project_id: i32,
        target_id: i32,
        task_id: i32,
    },

    #[error("project {id} was never started")]
    #[diagnostic(code(logmodel::builder::lookup))]
    ProjectNotFound { id: i32 },

    #[error("no running target {target_id} in project {project_id}")]
    #[diagnostic(code(logmodel::builder::lookup))]
    TargetNotFound { project_id: i32, target_id: i32 },

    #[error("no running task {task_id} in target {target_id} of project {project_id}")]
    #[diagnostic(code(logmodel::builder::lookup))]
    TaskNotFound {
        project_id: i32,
        target_id: i32,
        task_id: i32,
    },

    #[error("evaluation {evaluation_id} has no evaluation of `{name}` in progress")]
    #[diagnostic(code(logmodel::builder::lookup))]
    EvaluatedProjectNotFound { evaluation_id: i32, name: String },

    #[error("parent project {parent_id} of project {project_id} was never started")]
    #[diagnostic(code(logmodel::builder::lookup))]
    ParentProjectNotFound { project_id: i32, parent_id: i32 },

    #[error("malformed item group: {0}")]
    #[diagnostic(code(logmodel::builder::data))]
    MalformedItemGroup(#[from] ParseError),

    #[error("item `{item}` already has metadata `{key}`")]
    #[diagnostic(code(logmodel::builder::data))]
    DuplicateMetadata { item: String, key: String },

    #[error("task `{task}` already has {kind} property `{name}`")]
    #[diagnostic(code(logmodel::builder::data))]
    DuplicateProperty {
        task: String,
        kind: &'static str,
        name: String,
    },

    #[error("project `{project}` requested targets that never ran: {}", .targets.join(", "))]
    #[diagnostic(code(logmodel::builder::data))]
    RequestedTargetsNotRun {
        project: String,
        targets: Vec<String>,
    },

    #[error("no task in project {parent_id} built project `{project}`")]
    #[diagnostic(code(logmodel::builder::data))]
    ParentTaskNotFound { project: String, parent_id: i32 },

    #[error("{count} tasks in project {parent_id} could have built project `{project}`")]
    #[diagnostic(code(logmodel::builder::data))]
    AmbiguousParentTask {
        project: String,
        parent_id: i32,
        count: usize,
    },

    #[error("more than one root project: {}", .ids.iter().map(|i| i.to_string()).collect::<Vec<_>>().join(", "))]
    #[diagnostic(code(logmodel::builder::data))]
    MultipleRootProjects { ids: Vec<i32> },

    #[error("{event} received after the build finished")]
    #[diagnostic(code(logmodel::builder::terminal))]
    BuildAlreadyFinished { event: &'static str },

    #[error("{event} received after the model was finalized")]
    #[diagnostic(code(logmodel::builder::terminal))]
    EventAfterFinalize { event: &'static str },

    #[error("the model was already finalized")]
    #[diagnostic(code(logmodel::builder::terminal))]
    AlreadyFinalized,
}

impl ModelError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ModelError::UnexpectedContext { .. }
            | ModelError::BuildAlreadyStarted
            | ModelError::BuildNotStarted { .. } => ErrorCategory::Protocol,

            ModelError::DuplicateProject { .. }
            | ModelError::DuplicateTarget { .. }
            | ModelError::DuplicateTask { .. } => ErrorCategory::Identity,

            ModelError::ProjectNotFound { .. }
            | ModelError::TargetNotFound { .. }
            | ModelError::TaskNotFound { .. }
            | ModelError::EvaluatedProjectNotFound { .. }
            | ModelError::ParentProjectNotFound { .. } => ErrorCategory::Lookup,

            ModelError::MalformedItemGroup(_)
            | ModelError::DuplicateMetadata { .. }
            | ModelError::DuplicateProperty { .. }
            | ModelError::RequestedTargetsNotRun { .. }
            | ModelError::ParentTaskNotFound { .. }
            | ModelError::AmbiguousParentTask { .. }
            | ModelError::MultipleRootProjects { .. } => ErrorCategory::DataShape,

            ModelError::BuildAlreadyFinished { .. }
            | ModelError::EventAfterFinalize { .. }
            | ModelError::AlreadyFinalized => ErrorCategory::Terminal,
        }
    }

    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        let diag = Diagnostic::error(self.to_string()).with_kind(self.category().to_string());

        match self {
            ModelError::UnexpectedContext { .. }
            | ModelError::BuildAlreadyStarted
            | ModelError::BuildNotStarted { .. } => diag
                .with_context("events arrived out of order or with the wrong context ids")
                .with_suggestion("Check that the log was recorded by a single logger instance"),

            ModelError::DuplicateProject { .. }
            | ModelError::DuplicateTarget { .. }
            | ModelError::DuplicateTask { .. } => diag
                .with_context("the log registers the same context id twice")
                .with_suggestion("Check whether two builds were recorded into one log"),

            ModelError::ProjectNotFound { .. }
            | ModelError::TargetNotFound { .. }
            | ModelError::TaskNotFound { .. }
            | ModelError::ParentProjectNotFound { .. } => diag
                .with_context("a finished or scoped event refers to an entity that never started")
                .with_suggestion("Check whether the log is truncated at the start"),

            ModelError::EvaluatedProjectNotFound { name, .. } => diag
                .with_context(format!("no evaluation-started event for `{}` is pending", name)),

            ModelError::MalformedItemGroup(_) | ModelError::DuplicateMetadata { .. } => diag
                .with_context("item lists are indented 4 spaces per group, 8 per item, 12 or more per metadata line")
                .with_suggestion("Record the log with a logger that keeps message text intact"),

            ModelError::DuplicateProperty { .. } => diag,

            ModelError::RequestedTargetsNotRun { targets, .. } => diag
                .with_context(format!("requested: {}", targets.join(", ")))
                .with_suggestion("Check whether target-started events are missing from the log"),

            ModelError::ParentTaskNotFound { .. } | ModelError::AmbiguousParentTask { .. } => diag
                .with_context(
                    "child projects are matched to `MSBuild` tasks by their Projects and Targets parameters",
                )
                .with_suggestion("Record the log with task parameter logging enabled"),

            ModelError::MultipleRootProjects { .. } => diag
                .with_suggestion("Check whether two builds were recorded into one log"),

            ModelError::BuildAlreadyFinished { .. }
            | ModelError::EventAfterFinalize { .. }
            | ModelError::AlreadyFinalized => diag,
        }
    }
}

/// Every error accumulated while streaming and finalizing.
///
/// Carries the snapshot that could still be built so hosts can show partial
/// data next to the errors.
#[derive(Debug, Error, MietteDiagnostic)]
#[error("{} error(s) while building the log model", .errors.len())]
#[diagnostic(
    code(logmodel::builder::failed),
    help("Run `logmodel check <log>` to list every problem")
)]
pub struct ModelFailure {
    #[related]
    pub errors: Vec<ModelError>,
    pub recovered: Option<Box<Log>>,
}

impl ModelFailure {
    pub fn new(errors: Vec<ModelError>, recovered: Option<Log>) -> Self {
        ModelFailure {
            errors,
            recovered: recovered.map(Box::new),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categories() {
        assert_eq!(
            ModelError::DuplicateProject { id: 1 }.category(),
            ErrorCategory::Identity
        );
        assert_eq!(
            ModelError::TaskNotFound {
                project_id: 1,
                target_id: 2,
                task_id: 3
            }
            .category(),
            ErrorCategory::Lookup
        );
        assert_eq!(
            ModelError::from(ParseError::MissingAssignment {
                text: "x".to_string()
            })
            .category(),
            ErrorCategory::DataShape
        );
        assert_eq!(ModelError::AlreadyFinalized.category(), ErrorCategory::Terminal);
    }

    #[test]
    fn test_requested_targets_diagnostic() {
        let err = ModelError::RequestedTargetsNotRun {
            project: "App.csproj".to_string(),
            targets: vec!["Build".to_string(), "Pack".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "project `App.csproj` requested targets that never ran: Build, Pack"
        );

        let output = err.to_diagnostic().format(false);
        assert!(output.contains("error[data-shape]: project `App.csproj`"));
        assert!(output.contains("requested: Build, Pack"));
        assert!(output.contains("help: consider:"));
    }

    #[test]
    fn test_failure_message_counts_errors() {
        let failure = ModelFailure::new(
            vec![ModelError::AlreadyFinalized, ModelError::BuildAlreadyStarted],
            None,
        );
        assert_eq!(failure.to_string(), "2 error(s) while building the log model");
        assert!(failure.recovered.is_none());
    }
}
