//! Event routing.
//!
//! [`ModelBuilder::handle`] is the only place the in-progress model is
//! mutated. Every event is processed under one lock, so cross-entity checks
//! ("a target needs a started project") see a single total order even when
//! the logger raises events from many threads. A failing event is recorded
//! and skipped; it never stops later events from being processed.

use std::collections::hash_map::Entry;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use dashmap::DashMap;
use tracing::{debug, trace, warn};

use super::errors::ModelError;
use super::info::{
    BuildInfo, DiagnosticInfo, EvaluatedProjectInfo, EvaluationInfo, ItemActionInfo,
    ItemGroupInfo, ItemInfo, MessageInfo, ProjectInfo, PropertySetInfo, TargetInfo, TaskInfo,
};
use super::message_parser::{
    classify_project_message, classify_target_message, classify_task_message,
    parse_item_groups, parse_using_task, ProjectMessage, TargetMessage, TaskMessage,
};
use crate::core::Severity;
use crate::events::{BuildEvent, BuildEventContext, EventItem, EventSink, Importance, TargetOutput};
use crate::util::StringInterner;

/// Everything guarded by the builder lock.
#[derive(Debug, Default)]
pub(crate) struct BuilderState {
    pub(crate) build: Option<BuildInfo>,
    /// Set once the build-finished event was processed
    pub(crate) done: bool,
    pub(crate) finalized: bool,
    pub(crate) projects: HashMap<i32, ProjectInfo>,
    pub(crate) evaluations: HashMap<i32, EvaluationInfo>,
    pub(crate) errors: Vec<ModelError>,
}

/// Builds a [`Log`](crate::core::Log) from a stream of build events.
///
/// One builder models one build: feed it every event with
/// [`handle`](Self::handle) (from any thread), then call
/// [`finish`](Self::finish) once.
#[derive(Debug, Default)]
pub struct ModelBuilder {
    pub(crate) state: Mutex<BuilderState>,
    pub(crate) strings: StringInterner,
    /// Lowercased task name -> assembly it was loaded from
    assemblies: DashMap<String, Arc<str>>,
}

impl ModelBuilder {
    /// Create a builder for a new build.
    pub fn new() -> Self {
        Self::default()
    }

    /// Process one event. Errors are recorded and reported by `finish`.
    pub fn handle(&self, event: BuildEvent) {
        let kind = event.kind();
        trace!(kind, "handling build event");

        let mut state = self.lock();
        let result = if state.finalized {
            Err(ModelError::EventAfterFinalize { event: kind })
        } else if state.done {
            Err(ModelError::BuildAlreadyFinished { event: kind })
        } else {
            self.dispatch(&mut state, event)
        };

        if let Err(err) = result {
            warn!(kind, error = %err, "build event rejected");
            state.errors.push(err);
        }
    }

    /// Number of errors recorded so far.
    pub fn error_count(&self) -> usize {
        self.lock().errors.len()
    }

    pub(crate) fn lock(&self) -> MutexGuard<'_, BuilderState> {
        // A panic while holding the lock must not stop the rest of the log
        // from being processed.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn dispatch(&self, state: &mut BuilderState, event: BuildEvent) -> Result<(), ModelError> {
        match event {
            BuildEvent::BuildStarted {
                timestamp,
                context,
                environment,
                ..
            } => {
                if context.is_some() {
                    return Err(unexpected("build-started", "build events carry no context"));
                }
                if state.build.is_some() {
                    return Err(ModelError::BuildAlreadyStarted);
                }
                debug!("build started");
                state.build = Some(BuildInfo::new(timestamp, self.intern_map(&environment)));
                Ok(())
            }

            BuildEvent::BuildFinished {
                timestamp,
                context,
                succeeded,
                ..
            } => {
                if context.is_some() {
                    return Err(unexpected("build-finished", "build events carry no context"));
                }
                let build = state
                    .build
                    .as_mut()
                    .ok_or(ModelError::BuildNotStarted {
                        event: "build-finished",
                    })?;
                build.finish(timestamp, succeeded);
                state.done = true;
                debug!(succeeded, "build finished");
                Ok(())
            }

            BuildEvent::ProjectStarted {
                timestamp,
                context,
                parent_context,
                project_file,
                target_names,
                tools_version,
                global_properties,
                properties,
                items,
            } => {
                if !context.has_project() {
                    return Err(unexpected("project-started", "missing project context id"));
                }
                if context.has_target() || context.has_task() {
                    return Err(unexpected(
                        "project-started",
                        "project events carry no target or task id",
                    ));
                }
                let parent_id = match parent_context {
                    Some(parent) => {
                        if parent.has_target() || parent.has_task() || parent.has_evaluation() {
                            return Err(unexpected(
                                "project-started",
                                "parent context must only identify a project",
                            ));
                        }
                        parent.has_project().then_some(parent.project_context_id)
                    }
                    None => None,
                };
                if state.projects.contains_key(&context.project_context_id) {
                    return Err(ModelError::DuplicateProject {
                        id: context.project_context_id,
                    });
                }

                let mut project = ProjectInfo::new(
                    context.project_context_id,
                    context.node_id,
                    parent_id,
                    self.strings.intern(&project_file),
                    timestamp,
                );
                project.tools_version = self.strings.intern_opt(tools_version.as_deref());
                project.global_properties = self.intern_map(&global_properties);
                project.properties = self.intern_map(&properties);
                project.item_groups = self.evaluated_item_groups(&items)?;
                project.requested_targets = target_names
                    .split(';')
                    .map(str::trim)
                    .filter(|name| !name.is_empty())
                    .map(|name| self.strings.intern(name))
                    .collect();

                debug!(id = project.id, file = %project.file, "project started");
                state.projects.insert(project.id, project);
                Ok(())
            }

            BuildEvent::ProjectFinished {
                timestamp,
                context,
                succeeded,
                ..
            } => {
                if context.has_target() || context.has_task() {
                    return Err(unexpected(
                        "project-finished",
                        "project events carry no target or task id",
                    ));
                }
                let project = project_mut(state, &context)?;
                debug!(id = project.id, succeeded, "project finished");
                project.finish(timestamp, succeeded)
            }

            BuildEvent::TargetStarted {
                timestamp,
                context,
                target_name,
                target_file,
                parent_target,
                ..
            } => {
                if !context.has_target() {
                    return Err(unexpected("target-started", "missing target id"));
                }
                if context.has_task() || context.has_evaluation() {
                    return Err(unexpected(
                        "target-started",
                        "target events carry no task or evaluation id",
                    ));
                }
                let project = project_mut(state, &context)?;
                let target = TargetInfo::new(
                    context.target_id,
                    project.id,
                    self.strings.intern(&target_name),
                    self.strings
                        .intern_opt(parent_target.as_deref().filter(|p| !p.is_empty())),
                    self.strings.intern_opt(target_file.as_deref()),
                    timestamp,
                );
                project.start_target(target)
            }

            BuildEvent::TargetFinished {
                timestamp,
                context,
                succeeded,
                target_outputs,
                ..
            } => {
                if context.has_task() || context.has_evaluation() {
                    return Err(unexpected(
                        "target-finished",
                        "target events carry no task or evaluation id",
                    ));
                }
                let outputs = self.target_outputs(&target_outputs)?;
                let project = project_mut(state, &context)?;
                project
                    .finish_target(context.target_id)?
                    .finish(timestamp, succeeded, outputs);
                Ok(())
            }

            BuildEvent::TaskStarted {
                timestamp,
                context,
                task_name,
                task_file,
                ..
            } => {
                if !context.has_task() {
                    return Err(unexpected("task-started", "missing task id"));
                }
                if context.has_evaluation() {
                    return Err(unexpected("task-started", "task events carry no evaluation id"));
                }
                let assembly = self
                    .assemblies
                    .get(&task_name.to_ascii_lowercase())
                    .map(|entry| Arc::clone(entry.value()));
                let task = TaskInfo::new(
                    context.task_id,
                    self.strings.intern(&task_name),
                    assembly,
                    self.strings.intern_opt(task_file.as_deref()),
                    timestamp,
                );
                target_mut(state, &context)?.start_task(task)
            }

            BuildEvent::TaskFinished {
                timestamp,
                context,
                succeeded,
                ..
            } => {
                if context.has_evaluation() {
                    return Err(unexpected("task-finished", "task events carry no evaluation id"));
                }
                target_mut(state, &context)?
                    .finish_task(context.task_id)?
                    .finish(timestamp, succeeded);
                Ok(())
            }

            BuildEvent::TaskCommandLine {
                context,
                command_line,
                ..
            } => {
                let command_line = self.strings.intern(&command_line);
                target_mut(state, &context)?
                    .running_task_mut(context.task_id)?
                    .set_command_line(command_line);
                Ok(())
            }

            // ProjectImported is a kind of message and is matched first.
            BuildEvent::ProjectImported {
                timestamp,
                context,
                text,
                project_file,
                ..
            } => {
                let message = MessageInfo::new(timestamp, self.strings.intern(&text), Importance::Low);
                self.route_message(state, context, message, project_file.as_deref(), true)
            }

            BuildEvent::Message {
                timestamp,
                context,
                text,
                importance,
                project_file,
            } => {
                let message = MessageInfo::new(timestamp, self.strings.intern(&text), importance);
                self.route_message(state, context, message, project_file.as_deref(), true)
            }

            BuildEvent::Custom {
                timestamp,
                context,
                text,
            } => {
                let message =
                    MessageInfo::new(timestamp, self.strings.intern(&text), Importance::Normal);
                self.route_message(state, context, message, None, true)
            }

            BuildEvent::Error {
                timestamp,
                context,
                text,
                diagnostic,
            } => {
                let info = DiagnosticInfo::new(Severity::Error, &diagnostic, &self.strings);
                let message = MessageInfo::diagnostic(timestamp, self.strings.intern(&text), info);
                self.route_message(state, context, message, diagnostic.project_file.as_deref(), false)
            }

            BuildEvent::Warning {
                timestamp,
                context,
                text,
                diagnostic,
            } => {
                let info = DiagnosticInfo::new(Severity::Warning, &diagnostic, &self.strings);
                let message = MessageInfo::diagnostic(timestamp, self.strings.intern(&text), info);
                self.route_message(state, context, message, diagnostic.project_file.as_deref(), false)
            }

            BuildEvent::ProjectEvaluationStarted {
                timestamp,
                context,
                project_file,
            } => {
                if !context.has_evaluation() {
                    return Err(unexpected(
                        "project-evaluation-started",
                        "missing evaluation id",
                    ));
                }
                let project = EvaluatedProjectInfo::new(self.strings.intern(&project_file), timestamp);
                evaluation_mut(state, context.evaluation_id).start_project(project);
                Ok(())
            }

            BuildEvent::ProjectEvaluationFinished {
                timestamp,
                context,
                project_file,
            } => {
                if !context.has_evaluation() {
                    return Err(unexpected(
                        "project-evaluation-finished",
                        "missing evaluation id",
                    ));
                }
                evaluation_mut(state, context.evaluation_id).finish_project(&project_file, timestamp)
            }
        }
    }

    /// Attach a message to the narrowest entity its context names.
    ///
    /// Checked in order: evaluation id, build summary, task, target,
    /// project, and finally the build itself.
    fn route_message(
        &self,
        state: &mut BuilderState,
        context: Option<BuildEventContext>,
        message: MessageInfo,
        project_file: Option<&str>,
        decode: bool,
    ) -> Result<(), ModelError> {
        if decode {
            if let Some((task, assembly)) = parse_using_task(&message.text) {
                self.assemblies
                    .insert(task.to_ascii_lowercase(), self.strings.intern(assembly));
            }
        }

        let Some(context) = context else {
            return build_message(state, message);
        };

        if context.has_evaluation() {
            evaluation_mut(state, context.evaluation_id).add_message(message, project_file);
            return Ok(());
        }
        if context.is_build_summary() {
            return build_message(state, message);
        }
        if context.has_task() {
            let task = target_mut(state, &context)?.running_task_mut(context.task_id)?;
            return if decode {
                self.task_message(task, message)
            } else {
                task.messages.push(message);
                Ok(())
            };
        }
        if context.has_target() {
            let project = project_mut(state, &context)?;
            return if decode {
                self.target_message(project, context.target_id, message)
            } else {
                project.running_target_mut(context.target_id)?.messages.push(message);
                Ok(())
            };
        }
        if context.has_project() {
            let project = project_mut(state, &context)?;
            if decode {
                let text = Arc::clone(&message.text);
                if let ProjectMessage::TargetSkipped { name } = classify_project_message(&text) {
                    let skipped = TargetInfo::skipped(
                        project.id,
                        self.strings.intern(name),
                        None,
                        message.timestamp,
                    );
                    project.add_skipped_target(skipped);
                    return Ok(());
                }
            }
            project.messages.push(message);
            return Ok(());
        }

        build_message(state, message)
    }

    fn target_message(
        &self,
        project: &mut ProjectInfo,
        target_id: i32,
        message: MessageInfo,
    ) -> Result<(), ModelError> {
        let project_id = project.id;
        let text = Arc::clone(&message.text);
        let timestamp = message.timestamp;
        let target = project.running_target_mut(target_id)?;

        match classify_target_message(&text)? {
            TargetMessage::ItemsAdded { block } => {
                self.item_actions(target, block, timestamp, true)?;
            }
            TargetMessage::ItemsRemoved { block } => {
                self.item_actions(target, block, timestamp, false)?;
            }
            TargetMessage::PropertySet { name, value } => {
                target.property_sets.push(PropertySetInfo {
                    timestamp,
                    name: self.strings.intern(name),
                    value: self.strings.intern(value),
                });
            }
            TargetMessage::TaskSkipped { name } => {
                target.add_skipped_task(TaskInfo::skipped(self.strings.intern(name), timestamp));
            }
            TargetMessage::TargetSkipped { name } => {
                let parent = Arc::clone(&target.name);
                let skipped =
                    TargetInfo::skipped(project_id, self.strings.intern(name), Some(parent), timestamp);
                project.add_skipped_target(skipped);
            }
            TargetMessage::Text => target.messages.push(message),
        }
        Ok(())
    }

    fn task_message(&self, task: &mut TaskInfo, message: MessageInfo) -> Result<(), ModelError> {
        let text = Arc::clone(&message.text);

        match classify_task_message(&text)? {
            TaskMessage::OutputItems { block } => {
                let groups = parse_item_groups(block, &self.strings)?;
                task.output_items.extend(groups);
                Ok(())
            }
            TaskMessage::OutputProperty { name, value } => {
                task.add_output_property(self.strings.intern(name), self.strings.intern(value))
            }
            TaskMessage::ParameterProperty { name, value } => {
                task.add_parameter_property(self.strings.intern(name), self.strings.intern(value))
            }
            TaskMessage::ParameterItems { block } => {
                let groups = parse_item_groups(block, &self.strings)?;
                task.parameter_items.extend(groups);
                Ok(())
            }
            TaskMessage::Text => {
                task.messages.push(message);
                Ok(())
            }
        }
    }

    fn item_actions(
        &self,
        target: &mut TargetInfo,
        block: &str,
        timestamp: chrono::DateTime<chrono::Utc>,
        is_addition: bool,
    ) -> Result<(), ModelError> {
        let groups = parse_item_groups(block, &self.strings)?;
        target
            .item_actions
            .extend(groups.into_iter().map(|item_group| ItemActionInfo {
                timestamp,
                is_addition,
                item_group,
            }));
        Ok(())
    }

    fn intern_map(&self, map: &BTreeMap<String, String>) -> BTreeMap<Arc<str>, Arc<str>> {
        map.iter()
            .map(|(k, v)| (self.strings.intern(k), self.strings.intern(v)))
            .collect()
    }

    /// Group evaluated items by item type, keeping first-seen order.
    fn evaluated_item_groups(&self, items: &[EventItem]) -> Result<Vec<ItemGroupInfo>, ModelError> {
        let mut groups: Vec<ItemGroupInfo> = Vec::new();
        for event_item in items {
            let mut item = ItemInfo::new(self.strings.intern(&event_item.include));
            for (key, value) in &event_item.metadata {
                item.add_metadata(self.strings.intern(key), self.strings.intern(value))?;
            }

            match groups
                .iter_mut()
                .find(|g| *g.name == *event_item.item_type)
            {
                Some(group) => group.items.push(item),
                None => {
                    let mut group = ItemGroupInfo::new(self.strings.intern(&event_item.item_type));
                    group.items.push(item);
                    groups.push(group);
                }
            }
        }
        Ok(groups)
    }

    fn target_outputs(&self, outputs: &[TargetOutput]) -> Result<Vec<ItemInfo>, ModelError> {
        outputs
            .iter()
            .map(|output| {
                let mut item = ItemInfo::new(self.strings.intern(&output.item_spec));
                for (key, value) in &output.metadata {
                    item.add_metadata(self.strings.intern(key), self.strings.intern(value))?;
                }
                Ok(item)
            })
            .collect()
    }
}

impl EventSink for ModelBuilder {
    fn on_event(&self, event: BuildEvent) {
        self.handle(event);
    }
}

fn unexpected(event: &'static str, reason: &str) -> ModelError {
    ModelError::UnexpectedContext {
        event,
        reason: reason.to_string(),
    }
}

fn build_message(state: &mut BuilderState, message: MessageInfo) -> Result<(), ModelError> {
    let build = state
        .build
        .as_mut()
        .ok_or(ModelError::BuildNotStarted { event: "message" })?;
    build.messages.push(message);
    Ok(())
}

fn project_mut<'a>(
    state: &'a mut BuilderState,
    context: &BuildEventContext,
) -> Result<&'a mut ProjectInfo, ModelError> {
    state
        .projects
        .get_mut(&context.project_context_id)
        .ok_or(ModelError::ProjectNotFound {
            id: context.project_context_id,
        })
}

fn target_mut<'a>(
    state: &'a mut BuilderState,
    context: &BuildEventContext,
) -> Result<&'a mut TargetInfo, ModelError> {
    project_mut(state, context)?.running_target_mut(context.target_id)
}

/// Evaluation ids are reusable containers: look up or create.
fn evaluation_mut(state: &mut BuilderState, evaluation_id: i32) -> &mut EvaluationInfo {
    match state.evaluations.entry(evaluation_id) {
        Entry::Occupied(entry) => entry.into_mut(),
        Entry::Vacant(entry) => {
            debug!(evaluation_id, "evaluation started");
            entry.insert(EvaluationInfo::new(evaluation_id))
        }
    }
}
