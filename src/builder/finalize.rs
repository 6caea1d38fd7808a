//! Finalization: linking child projects to the tasks that built them and
//! projecting the mutable records into the immutable snapshot.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use tracing::{debug, warn};

use super::errors::{ModelError, ModelFailure};
use super::info::{
    BuildInfo, EvaluatedProjectInfo, EvaluationInfo, ItemActionInfo, ItemGroupInfo, ItemInfo,
    MessageInfo, ProjectInfo, PropertySetInfo, TargetInfo, TaskInfo,
};
use super::router::{BuilderState, ModelBuilder};
use crate::core::{
    Build, EvaluatedProject, Evaluation, Item, ItemAction, ItemGroup, Log, Message, Project,
    PropertySet, Target, Task,
};
use crate::util::paths::{self, TEMPORARY_PROJECT_EXTENSION};

const MSBUILD_TASK: &str = "MSBuild";
const TEMPORARY_ASSEMBLY_TASK: &str = "GenerateTemporaryTargetAssembly";

impl ModelBuilder {
    /// Finalize the model.
    ///
    /// May only be called once. Every finalization step runs even if an
    /// earlier one failed; if any error was recorded while streaming or
    /// finalizing, all of them are returned together.
    pub fn finish(&self) -> Result<Log, ModelFailure> {
        let mut guard = self.lock();
        if guard.finalized {
            return Err(ModelFailure::new(vec![ModelError::AlreadyFinalized], None));
        }
        let BuilderState {
            build,
            projects,
            evaluations,
            mut errors,
            ..
        } = std::mem::take(&mut *guard);
        guard.finalized = true;
        drop(guard);

        let evaluations = project_evaluations(evaluations);
        let build = match build {
            Some(build) => {
                let mut projects = projects;
                errors.extend(connect_build_tasks(&mut projects));
                Some(project_build(build, projects, &mut errors))
            }
            None => {
                // Projects can only be shown under a build
                if !projects.is_empty() {
                    errors.push(ModelError::BuildNotStarted {
                        event: "project-started",
                    });
                }
                None
            }
        };

        let log = Log { build, evaluations };
        if errors.is_empty() {
            debug!("log model finalized");
            Ok(log)
        } else {
            warn!(count = errors.len(), "log model finalized with errors");
            Err(ModelFailure::new(errors, Some(log)))
        }
    }
}

/// Record, on each task, the child projects it built.
///
/// MSBuild's events do not say which task started a project, so the call
/// graph is rebuilt here. A generated `.tmp_proj` project belongs to the
/// parent's `GenerateTemporaryTargetAssembly` task; any other child belongs
/// to the one `MSBuild` task whose `Projects` parameter names the child's
/// file and whose `Targets` parameter equals the child's requested targets.
pub(crate) fn connect_build_tasks(projects: &mut HashMap<i32, ProjectInfo>) -> Vec<ModelError> {
    let mut errors = Vec::new();
    let mut links: Vec<(i32, usize, usize, i32)> = Vec::new();

    let mut ids: Vec<i32> = projects.keys().copied().collect();
    ids.sort_unstable();

    for id in ids {
        let child = &projects[&id];
        let Some(parent_id) = child.parent_id else {
            continue;
        };
        let Some(parent) = projects.get(&parent_id) else {
            errors.push(ModelError::ParentProjectNotFound {
                project_id: id,
                parent_id,
            });
            continue;
        };

        match find_parent_task(parent, child) {
            Ok((target, task)) => links.push((parent_id, target, task, id)),
            Err(err) => errors.push(err),
        }
    }

    for (parent_id, target, task, child_id) in links {
        if let Some(parent) = projects.get_mut(&parent_id) {
            parent.targets[target].tasks[task].child_projects.push(child_id);
        }
    }
    errors
}

fn find_parent_task(parent: &ProjectInfo, child: &ProjectInfo) -> Result<(usize, usize), ModelError> {
    let tasks = parent.targets.iter().enumerate().flat_map(|(ti, target)| {
        target
            .tasks
            .iter()
            .enumerate()
            .map(move |(ki, task)| (ti, ki, task))
    });

    let not_found = || ModelError::ParentTaskNotFound {
        project: child.file.to_string(),
        parent_id: parent.id,
    };

    if paths::has_extension(&child.file, TEMPORARY_PROJECT_EXTENSION) {
        // First match wins: one generator task may produce the temporary project
        return tasks
            .filter(|(_, _, task)| task.name.eq_ignore_ascii_case(TEMPORARY_ASSEMBLY_TASK))
            .map(|(ti, ki, _)| (ti, ki))
            .next()
            .ok_or_else(not_found);
    }

    let parent_dir = paths::directory_name(&parent.file);
    let matches: Vec<(usize, usize)> = tasks
        .filter(|(_, _, task)| {
            task.name.eq_ignore_ascii_case(MSBUILD_TASK) && task_builds(task, parent_dir, child)
        })
        .map(|(ti, ki, _)| (ti, ki))
        .collect();

    match matches.as_slice() {
        [single] => Ok(*single),
        [] => Err(not_found()),
        many => Err(ModelError::AmbiguousParentTask {
            project: child.file.to_string(),
            parent_id: parent.id,
            count: many.len(),
        }),
    }
}

fn task_builds(task: &TaskInfo, parent_dir: &str, child: &ProjectInfo) -> bool {
    let builds_file = parameter_values(task, "Projects")
        .iter()
        .any(|project| paths::paths_equal(&paths::resolve(parent_dir, project), &child.file));
    if !builds_file {
        return false;
    }

    let targets: HashSet<String> = parameter_values(task, "Targets")
        .iter()
        .map(|t| t.to_ascii_lowercase())
        .collect();
    let requested: HashSet<String> = child
        .requested_targets
        .iter()
        .map(|t| t.to_ascii_lowercase())
        .collect();
    targets == requested
}

/// Values of a task parameter logged either as a `;`-separated property or
/// as an item list.
fn parameter_values<'a>(task: &'a TaskInfo, name: &str) -> Vec<&'a str> {
    if let Some((_, value)) = task
        .parameter_properties
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(name))
    {
        return value
            .split(';')
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .collect();
    }

    task.parameter_items
        .iter()
        .filter(|group| group.name.eq_ignore_ascii_case(name))
        .flat_map(|group| group.items.iter().map(|item| item.name.trim()))
        .collect()
}

fn project_evaluations(evaluations: HashMap<i32, EvaluationInfo>) -> Vec<Evaluation> {
    let mut out: Vec<Evaluation> = evaluations
        .into_values()
        .map(|evaluation| {
            let EvaluationInfo {
                id,
                messages,
                in_progress,
                completed,
            } = evaluation;
            let mut evaluated_projects: Vec<EvaluatedProject> = completed
                .into_iter()
                .chain(in_progress)
                .map(project_evaluated)
                .collect();
            evaluated_projects.sort_by(|a, b| {
                a.start
                    .cmp(&b.start)
                    .then_with(|| a.name.cmp(&b.name))
                    .then_with(|| a.end.cmp(&b.end))
                    .then_with(|| a.messages.cmp(&b.messages))
            });

            Evaluation {
                id,
                messages: project_messages(messages),
                evaluated_projects,
            }
        })
        .collect();
    out.sort_by_key(|e| e.id);
    out
}

fn project_evaluated(project: EvaluatedProjectInfo) -> EvaluatedProject {
    EvaluatedProject {
        name: project.name,
        start: project.start,
        end: project.end,
        messages: project_messages(project.messages),
    }
}

fn project_build(
    build: BuildInfo,
    mut projects: HashMap<i32, ProjectInfo>,
    errors: &mut Vec<ModelError>,
) -> Build {
    let mut roots: Vec<(chrono::DateTime<chrono::Utc>, i32)> = projects
        .values()
        .filter(|p| p.parent_id.is_none())
        .map(|p| (p.start, p.id))
        .collect();
    roots.sort();

    if roots.len() > 1 {
        errors.push(ModelError::MultipleRootProjects {
            ids: roots.iter().map(|(_, id)| *id).collect(),
        });
    }

    // Keep the earliest root so the snapshot still shows something useful
    let project = roots
        .first()
        .and_then(|(_, id)| projects.remove(id))
        .map(|root| project_project(root, &mut projects));

    Build {
        start: build.start,
        end: build.end,
        result: build.result,
        environment: build.environment,
        messages: project_messages(build.messages),
        project,
    }
}

fn project_project(info: ProjectInfo, projects: &mut HashMap<i32, ProjectInfo>) -> Project {
    let mut targets: Vec<Target> = info
        .targets
        .into_iter()
        .map(|t| project_target(t, projects))
        .collect();
    targets.sort_by(compare_targets);

    Project {
        id: info.id,
        node_id: info.node_id,
        file: info.file,
        tools_version: info.tools_version,
        global_properties: info.global_properties,
        properties: info.properties,
        item_groups: project_item_groups(info.item_groups),
        requested_targets: info.requested_targets,
        targets,
        messages: project_messages(info.messages),
        start: info.start,
        end: info.end,
        result: info.result,
    }
}

fn project_target(info: TargetInfo, projects: &mut HashMap<i32, ProjectInfo>) -> Target {
    let mut tasks: Vec<Task> = info
        .tasks
        .into_iter()
        .map(|t| project_task(t, projects))
        .collect();
    tasks.sort_by(compare_tasks);

    Target {
        id: info.id,
        name: info.name,
        parent_target: info.parent_target,
        source_file: info.source_file,
        is_requested_target: info.is_requested_target,
        tasks,
        item_actions: project_item_actions(info.item_actions),
        property_sets: project_property_sets(info.property_sets),
        output_items: project_items(info.output_items),
        messages: project_messages(info.messages),
        start: info.start,
        end: info.end,
        result: info.result,
    }
}

fn project_task(info: TaskInfo, projects: &mut HashMap<i32, ProjectInfo>) -> Task {
    let mut child_projects: Vec<Project> = info
        .child_projects
        .iter()
        .filter_map(|id| {
            let child = projects.remove(id)?;
            Some(project_project(child, projects))
        })
        .collect();
    child_projects.sort_by(|a, b| a.start.cmp(&b.start).then_with(|| a.id.cmp(&b.id)));

    Task {
        id: info.id,
        name: info.name,
        assembly: info.assembly,
        source_file: info.source_file,
        command_line: info.command_line,
        parameter_properties: info.parameter_properties,
        parameter_items: project_item_groups(info.parameter_items),
        output_properties: info.output_properties,
        output_items: project_item_groups(info.output_items),
        messages: project_messages(info.messages),
        child_projects,
        start: info.start,
        end: info.end,
        result: info.result,
    }
}

fn project_messages(messages: Vec<MessageInfo>) -> Vec<Message> {
    let mut out: Vec<Message> = messages.into_iter().map(MessageInfo::into_message).collect();
    out.sort();
    out
}

/// Skipped targets share `INVALID_ID`, so every header field takes part.
/// Their bodies are always empty, and running targets have unique ids.
fn compare_targets(a: &Target, b: &Target) -> Ordering {
    a.start
        .cmp(&b.start)
        .then_with(|| a.id.cmp(&b.id))
        .then_with(|| a.name.cmp(&b.name))
        .then_with(|| a.parent_target.cmp(&b.parent_target))
        .then_with(|| a.source_file.cmp(&b.source_file))
        .then_with(|| a.is_requested_target.cmp(&b.is_requested_target))
        .then_with(|| a.end.cmp(&b.end))
        .then_with(|| a.result.cmp(&b.result))
}

fn compare_tasks(a: &Task, b: &Task) -> Ordering {
    a.start
        .cmp(&b.start)
        .then_with(|| a.id.cmp(&b.id))
        .then_with(|| a.name.cmp(&b.name))
        .then_with(|| a.assembly.cmp(&b.assembly))
        .then_with(|| a.source_file.cmp(&b.source_file))
        .then_with(|| a.command_line.cmp(&b.command_line))
        .then_with(|| a.end.cmp(&b.end))
        .then_with(|| a.result.cmp(&b.result))
}

fn project_items(items: Vec<ItemInfo>) -> Vec<Item> {
    let mut out: Vec<Item> = items
        .into_iter()
        .map(|item| Item {
            name: item.name,
            metadata: item.metadata,
        })
        .collect();
    out.sort();
    out
}

fn project_item_group(group: ItemGroupInfo) -> ItemGroup {
    ItemGroup {
        name: group.name,
        items: project_items(group.items),
    }
}

fn project_item_groups(groups: Vec<ItemGroupInfo>) -> Vec<ItemGroup> {
    let mut out: Vec<ItemGroup> = groups.into_iter().map(project_item_group).collect();
    out.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.items.cmp(&b.items)));
    out
}

fn project_item_actions(actions: Vec<ItemActionInfo>) -> Vec<ItemAction> {
    let mut out: Vec<ItemAction> = actions
        .into_iter()
        .map(|action| ItemAction {
            timestamp: action.timestamp,
            is_addition: action.is_addition,
            item_group: project_item_group(action.item_group),
        })
        .collect();
    out.sort_by(|a, b| {
        a.timestamp
            .cmp(&b.timestamp)
            .then_with(|| b.is_addition.cmp(&a.is_addition))
            .then_with(|| a.item_group.name.cmp(&b.item_group.name))
            .then_with(|| a.item_group.items.cmp(&b.item_group.items))
    });
    out
}

fn project_property_sets(sets: Vec<PropertySetInfo>) -> Vec<PropertySet> {
    let mut out: Vec<PropertySet> = sets
        .into_iter()
        .map(|set| PropertySet {
            timestamp: set.timestamp,
            name: set.name,
            value: set.value,
        })
        .collect();
    out.sort_by(|a, b| {
        a.timestamp
            .cmp(&b.timestamp)
            .then_with(|| a.name.cmp(&b.name))
            .then_with(|| a.value.cmp(&b.value))
    });
    out
}
