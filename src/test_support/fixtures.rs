//! Test fixtures for common build scenarios.
//!
//! [`EventScript`] records a build event stream the way a logger would
//! raise it, with a clock that advances one second per event.

use std::collections::BTreeMap;

use chrono::{DateTime, TimeZone, Utc};

use crate::events::{BuildEvent, BuildEventContext, DiagnosticFields, Importance, INVALID_ID};

/// Fixed point all fixture timestamps are relative to.
pub const EPOCH_SECS: i64 = 1_700_000_000;

/// Timestamp `secs` seconds after the fixture epoch.
pub fn timestamp(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(EPOCH_SECS + secs, 0).unwrap()
}

/// Context of project `project` on node 0.
pub fn project_ctx(project: i32) -> BuildEventContext {
    BuildEventContext::project(0, project)
}

pub fn target_ctx(project: i32, target: i32) -> BuildEventContext {
    project_ctx(project).with_target(target)
}

pub fn task_ctx(project: i32, target: i32, task: i32) -> BuildEventContext {
    target_ctx(project, target).with_task(task)
}

/// Builder for a scripted event stream.
#[derive(Debug, Clone, Default)]
pub struct EventScript {
    events: Vec<BuildEvent>,
    clock: i64,
}

impl EventScript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script whose first event is stamped `secs` after the epoch.
    pub fn starting_at(secs: i64) -> Self {
        EventScript {
            events: Vec::new(),
            clock: secs,
        }
    }

    fn tick(&mut self) -> DateTime<Utc> {
        let now = timestamp(self.clock);
        self.clock += 1;
        now
    }

    /// Append a raw event.
    pub fn event(mut self, event: BuildEvent) -> Self {
        self.events.push(event);
        self
    }

    /// Append every event of `other`, keeping its timestamps.
    pub fn then(mut self, other: EventScript) -> Self {
        self.clock = self.clock.max(other.clock);
        self.events.extend(other.events);
        self
    }

    pub fn build_started(mut self) -> Self {
        let timestamp = self.tick();
        let mut environment = BTreeMap::new();
        environment.insert("PATH".to_string(), r"C:\Windows".to_string());
        self.event(BuildEvent::BuildStarted {
            timestamp,
            context: None,
            message: "Build started.".to_string(),
            environment,
        })
    }

    pub fn build_finished(mut self, succeeded: bool) -> Self {
        let timestamp = self.tick();
        self.event(BuildEvent::BuildFinished {
            timestamp,
            context: None,
            message: String::new(),
            succeeded,
        })
    }

    /// Start a root project requesting `targets` (`;` separated).
    pub fn project_started(self, id: i32, file: &str, targets: &str) -> Self {
        self.project_started_with_parent(id, None, file, targets)
    }

    /// Start a project requested by project `parent`.
    pub fn child_project_started(self, id: i32, parent: i32, file: &str, targets: &str) -> Self {
        self.project_started_with_parent(id, Some(parent), file, targets)
    }

    fn project_started_with_parent(
        mut self,
        id: i32,
        parent: Option<i32>,
        file: &str,
        targets: &str,
    ) -> Self {
        let timestamp = self.tick();
        self.event(BuildEvent::ProjectStarted {
            timestamp,
            context: project_ctx(id),
            parent_context: parent.map(project_ctx),
            project_file: file.to_string(),
            target_names: targets.to_string(),
            tools_version: Some("Current".to_string()),
            global_properties: BTreeMap::new(),
            properties: BTreeMap::new(),
            items: Vec::new(),
        })
    }

    pub fn project_finished(mut self, id: i32, file: &str, succeeded: bool) -> Self {
        let timestamp = self.tick();
        self.event(BuildEvent::ProjectFinished {
            timestamp,
            context: project_ctx(id),
            project_file: file.to_string(),
            succeeded,
        })
    }

    pub fn target_started(mut self, project: i32, target: i32, name: &str) -> Self {
        let timestamp = self.tick();
        self.event(BuildEvent::TargetStarted {
            timestamp,
            context: target_ctx(project, target),
            target_name: name.to_string(),
            project_file: None,
            target_file: None,
            parent_target: None,
        })
    }

    pub fn target_finished(mut self, project: i32, target: i32, name: &str, succeeded: bool) -> Self {
        let timestamp = self.tick();
        self.event(BuildEvent::TargetFinished {
            timestamp,
            context: target_ctx(project, target),
            target_name: name.to_string(),
            succeeded,
            target_outputs: Vec::new(),
        })
    }

    pub fn task_started(mut self, project: i32, target: i32, task: i32, name: &str) -> Self {
        let timestamp = self.tick();
        self.event(BuildEvent::TaskStarted {
            timestamp,
            context: task_ctx(project, target, task),
            task_name: name.to_string(),
            project_file: None,
            task_file: None,
        })
    }

    pub fn task_finished(mut self, project: i32, target: i32, task: i32, name: &str, succeeded: bool) -> Self {
        let timestamp = self.tick();
        self.event(BuildEvent::TaskFinished {
            timestamp,
            context: task_ctx(project, target, task),
            task_name: name.to_string(),
            succeeded,
        })
    }

    /// Log a low-importance message in `context` (`None` for build scope).
    pub fn message(mut self, context: Option<BuildEventContext>, text: &str) -> Self {
        let timestamp = self.tick();
        self.event(BuildEvent::Message {
            timestamp,
            context,
            text: text.to_string(),
            importance: Importance::Low,
            project_file: None,
        })
    }

    pub fn error(mut self, context: Option<BuildEventContext>, code: &str, text: &str) -> Self {
        let timestamp = self.tick();
        self.event(BuildEvent::Error {
            timestamp,
            context,
            text: text.to_string(),
            diagnostic: DiagnosticFields {
                code: Some(code.to_string()),
                file: Some("Program.cs".to_string()),
                line: 3,
                column: 7,
                ..Default::default()
            },
        })
    }

    pub fn evaluation_started(mut self, evaluation: i32, file: &str) -> Self {
        let timestamp = self.tick();
        self.event(BuildEvent::ProjectEvaluationStarted {
            timestamp,
            context: BuildEventContext::evaluation(evaluation),
            project_file: file.to_string(),
        })
    }

    pub fn evaluation_finished(mut self, evaluation: i32, file: &str) -> Self {
        let timestamp = self.tick();
        self.event(BuildEvent::ProjectEvaluationFinished {
            timestamp,
            context: BuildEventContext::evaluation(evaluation),
            project_file: file.to_string(),
        })
    }

    pub fn events(&self) -> &[BuildEvent] {
        &self.events
    }

    pub fn into_events(self) -> Vec<BuildEvent> {
        self.events
    }

    /// Render the script as a JSON-lines log.
    pub fn to_json_lines(&self) -> String {
        self.events
            .iter()
            .map(|event| event.to_json() + "\n")
            .collect()
    }
}

/// One project building one target with one task, successfully.
pub fn simple_build() -> EventScript {
    EventScript::new()
        .build_started()
        .project_started(1, r"C:\src\App\App.csproj", "Build")
        .target_started(1, 1, "Build")
        .task_started(1, 1, 1, "Csc")
        .message(Some(task_ctx(1, 1, 1)), "Compiling 3 files")
        .task_finished(1, 1, 1, "Csc", true)
        .target_finished(1, 1, "Build", true)
        .project_finished(1, r"C:\src\App\App.csproj", true)
        .build_finished(true)
}

/// Context that belongs to no project, for negative tests.
pub fn orphan_ctx() -> BuildEventContext {
    BuildEventContext {
        node_id: 0,
        project_context_id: 42,
        target_id: INVALID_ID,
        task_id: INVALID_ID,
        evaluation_id: INVALID_ID,
    }
}
