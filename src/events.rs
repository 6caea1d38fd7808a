//! Build event types consumed by the model builder.
//!
//! These mirror the events an MSBuild logger receives. Each event is one
//! variant of [`BuildEvent`]; a recorded build is stored as one JSON object
//! per line, tagged by `kind`.
//!
//! # Event Types
//!
//! - `build-started` / `build-finished`: the whole build (no context)
//! - `project-started` / `project-finished`: one project instance
//! - `target-started` / `target-finished`: one target inside a project
//! - `task-started` / `task-finished` / `task-command-line`: one task
//! - `message`, `project-imported`, `custom`: free-text messages
//! - `error` / `warning`: diagnostics
//! - `project-evaluation-started` / `project-evaluation-finished`

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Reserved id meaning "not applicable to this event".
pub const INVALID_ID: i32 = -1;

/// Correlation ids attached to every scoped build event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildEventContext {
    pub node_id: i32,
    pub project_context_id: i32,
    pub target_id: i32,
    pub task_id: i32,
    pub evaluation_id: i32,
}

impl Default for BuildEventContext {
    fn default() -> Self {
        BuildEventContext {
            node_id: INVALID_ID,
            project_context_id: INVALID_ID,
            target_id: INVALID_ID,
            task_id: INVALID_ID,
            evaluation_id: INVALID_ID,
        }
    }
}

impl BuildEventContext {
    /// Context of a project running on `node_id`.
    pub fn project(node_id: i32, project_context_id: i32) -> Self {
        BuildEventContext {
            node_id,
            project_context_id,
            ..Default::default()
        }
    }

    /// Context of an evaluation.
    pub fn evaluation(evaluation_id: i32) -> Self {
        BuildEventContext {
            evaluation_id,
            ..Default::default()
        }
    }

    /// The context MSBuild uses for its end-of-build summary.
    pub fn build_summary() -> Self {
        BuildEventContext {
            node_id: 0,
            project_context_id: 0,
            target_id: 0,
            task_id: 0,
            evaluation_id: INVALID_ID,
        }
    }

    /// Narrow this context to a target.
    pub fn with_target(mut self, target_id: i32) -> Self {
        self.target_id = target_id;
        self
    }

    /// Narrow this context to a task.
    pub fn with_task(mut self, task_id: i32) -> Self {
        self.task_id = task_id;
        self
    }

    pub fn has_project(&self) -> bool {
        self.project_context_id != INVALID_ID
    }

    pub fn has_target(&self) -> bool {
        self.target_id != INVALID_ID
    }

    pub fn has_task(&self) -> bool {
        self.task_id != INVALID_ID
    }

    pub fn has_evaluation(&self) -> bool {
        self.evaluation_id != INVALID_ID
    }

    /// All scoping ids are zero.
    pub fn is_build_summary(&self) -> bool {
        self.node_id == 0
            && self.project_context_id == 0
            && self.target_id == 0
            && self.task_id == 0
    }
}

/// Receives build events, from a live logger or a recorded log.
///
/// Implementations must accept events from several threads at once.
pub trait EventSink: Send + Sync {
    fn on_event(&self, event: BuildEvent);
}

/// Message importance as reported by the logger.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Importance {
    High,
    #[default]
    Normal,
    Low,
}

/// An evaluated item attached to a project-started event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventItem {
    /// Item type, e.g. `Compile`
    pub item_type: String,
    /// Evaluated include
    pub include: String,
    #[serde(default)]
    pub metadata: Vec<(String, String)>,
}

/// An item produced by a target.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetOutput {
    pub item_spec: String,
    #[serde(default)]
    pub metadata: Vec<(String, String)>,
}

/// Location and classification fields shared by errors and warnings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiagnosticFields {
    pub code: Option<String>,
    pub subcategory: Option<String>,
    pub file: Option<String>,
    pub project_file: Option<String>,
    pub line: u32,
    pub column: u32,
    pub end_line: u32,
    pub end_column: u32,
}

/// A single event from the build logger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum BuildEvent {
    BuildStarted {
        timestamp: DateTime<Utc>,
        #[serde(default)]
        context: Option<BuildEventContext>,
        #[serde(default)]
        message: String,
        #[serde(default)]
        environment: BTreeMap<String, String>,
    },

    BuildFinished {
        timestamp: DateTime<Utc>,
        #[serde(default)]
        context: Option<BuildEventContext>,
        #[serde(default)]
        message: String,
        succeeded: bool,
    },

    ProjectStarted {
        timestamp: DateTime<Utc>,
        context: BuildEventContext,
        /// Context of the project that requested this one, if any
        #[serde(default)]
        parent_context: Option<BuildEventContext>,
        project_file: String,
        /// Semicolon separated list of requested targets
        #[serde(default)]
        target_names: String,
        #[serde(default)]
        tools_version: Option<String>,
        #[serde(default)]
        global_properties: BTreeMap<String, String>,
        #[serde(default)]
        properties: BTreeMap<String, String>,
        #[serde(default)]
        items: Vec<EventItem>,
    },

    ProjectFinished {
        timestamp: DateTime<Utc>,
        context: BuildEventContext,
        project_file: String,
        succeeded: bool,
    },

    TargetStarted {
        timestamp: DateTime<Utc>,
        context: BuildEventContext,
        target_name: String,
        #[serde(default)]
        project_file: Option<String>,
        #[serde(default)]
        target_file: Option<String>,
        #[serde(default)]
        parent_target: Option<String>,
    },

    TargetFinished {
        timestamp: DateTime<Utc>,
        context: BuildEventContext,
        target_name: String,
        succeeded: bool,
        #[serde(default)]
        target_outputs: Vec<TargetOutput>,
    },

    TaskStarted {
        timestamp: DateTime<Utc>,
        context: BuildEventContext,
        task_name: String,
        #[serde(default)]
        project_file: Option<String>,
        #[serde(default)]
        task_file: Option<String>,
    },

    TaskFinished {
        timestamp: DateTime<Utc>,
        context: BuildEventContext,
        task_name: String,
        succeeded: bool,
    },

    TaskCommandLine {
        timestamp: DateTime<Utc>,
        context: BuildEventContext,
        task_name: String,
        command_line: String,
    },

    Message {
        timestamp: DateTime<Utc>,
        #[serde(default)]
        context: Option<BuildEventContext>,
        text: String,
        #[serde(default)]
        importance: Importance,
        #[serde(default)]
        project_file: Option<String>,
    },

    ProjectImported {
        timestamp: DateTime<Utc>,
        #[serde(default)]
        context: Option<BuildEventContext>,
        text: String,
        #[serde(default)]
        project_file: Option<String>,
        #[serde(default)]
        imported_project_file: Option<String>,
    },

    Custom {
        timestamp: DateTime<Utc>,
        #[serde(default)]
        context: Option<BuildEventContext>,
        text: String,
    },

    ProjectEvaluationStarted {
        timestamp: DateTime<Utc>,
        context: BuildEventContext,
        project_file: String,
    },

    ProjectEvaluationFinished {
        timestamp: DateTime<Utc>,
        context: BuildEventContext,
        project_file: String,
    },

    Error {
        timestamp: DateTime<Utc>,
        #[serde(default)]
        context: Option<BuildEventContext>,
        text: String,
        #[serde(default)]
        diagnostic: DiagnosticFields,
    },

    Warning {
        timestamp: DateTime<Utc>,
        #[serde(default)]
        context: Option<BuildEventContext>,
        text: String,
        #[serde(default)]
        diagnostic: DiagnosticFields,
    },
}

impl BuildEvent {
    /// Short name of the event kind, for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            BuildEvent::BuildStarted { .. } => "build-started",
            BuildEvent::BuildFinished { .. } => "build-finished",
            BuildEvent::ProjectStarted { .. } => "project-started",
            BuildEvent::ProjectFinished { .. } => "project-finished",
            BuildEvent::TargetStarted { .. } => "target-started",
            BuildEvent::TargetFinished { .. } => "target-finished",
            BuildEvent::TaskStarted { .. } => "task-started",
            BuildEvent::TaskFinished { .. } => "task-finished",
            BuildEvent::TaskCommandLine { .. } => "task-command-line",
            BuildEvent::Message { .. } => "message",
            BuildEvent::ProjectImported { .. } => "project-imported",
            BuildEvent::Custom { .. } => "custom",
            BuildEvent::ProjectEvaluationStarted { .. } => "project-evaluation-started",
            BuildEvent::ProjectEvaluationFinished { .. } => "project-evaluation-finished",
            BuildEvent::Error { .. } => "error",
            BuildEvent::Warning { .. } => "warning",
        }
    }

    /// When the event was raised.
    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            BuildEvent::BuildStarted { timestamp, .. }
            | BuildEvent::BuildFinished { timestamp, .. }
            | BuildEvent::ProjectStarted { timestamp, .. }
            | BuildEvent::ProjectFinished { timestamp, .. }
            | BuildEvent::TargetStarted { timestamp, .. }
            | BuildEvent::TargetFinished { timestamp, .. }
            | BuildEvent::TaskStarted { timestamp, .. }
            | BuildEvent::TaskFinished { timestamp, .. }
            | BuildEvent::TaskCommandLine { timestamp, .. }
            | BuildEvent::Message { timestamp, .. }
            | BuildEvent::ProjectImported { timestamp, .. }
            | BuildEvent::Custom { timestamp, .. }
            | BuildEvent::ProjectEvaluationStarted { timestamp, .. }
            | BuildEvent::ProjectEvaluationFinished { timestamp, .. }
            | BuildEvent::Error { timestamp, .. }
            | BuildEvent::Warning { timestamp, .. } => *timestamp,
        }
    }

    /// Serialize this event to a JSON line.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2024-03-01T10:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn test_context_defaults_to_invalid() {
        let ctx = BuildEventContext::default();
        assert!(!ctx.has_project());
        assert!(!ctx.has_target());
        assert!(!ctx.has_task());
        assert!(!ctx.has_evaluation());
        assert!(!ctx.is_build_summary());
    }

    #[test]
    fn test_context_narrowing() {
        let ctx = BuildEventContext::project(1, 7).with_target(3).with_task(9);
        assert_eq!(ctx.node_id, 1);
        assert_eq!(ctx.project_context_id, 7);
        assert!(ctx.has_target());
        assert!(ctx.has_task());
        assert!(!ctx.has_evaluation());
        assert!(BuildEventContext::build_summary().is_build_summary());
    }

    #[test]
    fn test_message_serialization() {
        let event = BuildEvent::Message {
            timestamp: ts(),
            context: Some(BuildEventContext::project(0, 2)),
            text: "hello".to_string(),
            importance: Importance::High,
            project_file: None,
        };
        let json = event.to_json();
        assert!(json.contains("\"kind\":\"message\""));
        assert!(json.contains("\"importance\":\"high\""));
        assert!(json.contains("\"project_context_id\":2"));
    }

    #[test]
    fn test_partial_context_deserializes_with_invalid_ids() {
        let line = r#"{"kind":"task-finished","timestamp":"2024-03-01T10:00:00Z",
            "context":{"node_id":1,"project_context_id":2,"target_id":3,"task_id":4},
            "task_name":"Csc","succeeded":true}"#;
        let event: BuildEvent = serde_json::from_str(line).unwrap();
        match event {
            BuildEvent::TaskFinished { context, .. } => {
                assert_eq!(context.task_id, 4);
                assert_eq!(context.evaluation_id, INVALID_ID);
            }
            other => panic!("unexpected event {:?}", other),
        }
    }
}
