//! Human-readable views of a log model.

use chrono::Duration;
use serde::Serialize;

use crate::core::{Build, Log, Message, Outcome, Project, Target, Task};

/// Options for [`render_tree`].
#[derive(Debug, Clone, Default)]
pub struct RenderOptions {
    /// Print messages under the entity they belong to
    pub show_messages: bool,
}

/// Counts shown by `logmodel summary`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub result: Option<Outcome>,
    pub duration_ms: Option<i64>,
    pub projects: usize,
    pub targets: usize,
    pub skipped_targets: usize,
    pub tasks: usize,
    pub skipped_tasks: usize,
    pub errors: usize,
    pub warnings: usize,
    pub evaluations: usize,
}

/// Render the project tree as indented text.
pub fn render_tree(log: &Log, options: &RenderOptions) -> String {
    let mut out = String::new();
    match &log.build {
        Some(build) => {
            out.push_str(&format!("Build {}{}\n", outcome(build.result), duration(build.duration())));
            if options.show_messages {
                push_messages(&mut out, &build.messages, 1);
            }
            if let Some(project) = &build.project {
                push_project(&mut out, project, 1, options);
            }
        }
        None => out.push_str("No build recorded\n"),
    }

    for evaluation in &log.evaluations {
        out.push_str(&format!("Evaluation {}\n", evaluation.id));
        for project in &evaluation.evaluated_projects {
            let state = if project.is_finished() {
                "evaluated"
            } else {
                "in progress"
            };
            out.push_str(&format!("  {} ({})\n", project.name, state));
            if options.show_messages {
                push_messages(&mut out, &project.messages, 2);
            }
        }
        if options.show_messages {
            push_messages(&mut out, &evaluation.messages, 1);
        }
    }
    out
}

fn push_project(out: &mut String, project: &Project, depth: usize, options: &RenderOptions) {
    let indent = "  ".repeat(depth);
    out.push_str(&format!(
        "{}Project {} [{}] {}\n",
        indent,
        project.name(),
        project.id,
        outcome(project.result)
    ));
    if options.show_messages {
        push_messages(out, &project.messages, depth + 1);
    }
    for target in &project.targets {
        push_target(out, target, depth + 1, options);
    }
}

fn push_target(out: &mut String, target: &Target, depth: usize, options: &RenderOptions) {
    let indent = "  ".repeat(depth);
    let requested = if target.is_requested_target { " *" } else { "" };
    out.push_str(&format!(
        "{}Target {}{} {}\n",
        indent,
        target.name,
        requested,
        outcome(target.result)
    ));
    if options.show_messages {
        push_messages(out, &target.messages, depth + 1);
    }
    for task in &target.tasks {
        push_task(out, task, depth + 1, options);
    }
}

fn push_task(out: &mut String, task: &Task, depth: usize, options: &RenderOptions) {
    let indent = "  ".repeat(depth);
    out.push_str(&format!("{}Task {} {}", indent, task.name, outcome(task.result)));
    if let Some(assembly) = &task.assembly {
        out.push_str(&format!(" (from {})", assembly));
    }
    out.push('\n');
    if options.show_messages {
        push_messages(out, &task.messages, depth + 1);
    }
    for child in &task.child_projects {
        push_project(out, child, depth + 1, options);
    }
}

fn push_messages(out: &mut String, messages: &[Message], depth: usize) {
    let indent = "  ".repeat(depth);
    for message in messages {
        let first_line = message.text.lines().next().unwrap_or_default();
        match &message.diagnostic {
            Some(diagnostic) => {
                let kind = if message.is_error() { "error" } else { "warning" };
                let code = diagnostic.code.as_deref().unwrap_or_default();
                out.push_str(&format!("{}{} {}: {}", indent, kind, code, first_line));
                if let Some(location) = diagnostic.location() {
                    out.push_str(&format!(" ({})", location));
                }
                out.push('\n');
            }
            None => out.push_str(&format!("{}- {}\n", indent, first_line)),
        }
    }
}

fn outcome(result: Option<Outcome>) -> String {
    match result {
        Some(result) => result.to_string(),
        None => "unfinished".to_string(),
    }
}

fn duration(duration: Option<Duration>) -> String {
    match duration {
        Some(duration) => format!(" in {:.2}s", duration.num_milliseconds() as f64 / 1000.0),
        None => String::new(),
    }
}

/// Count the entities and diagnostics of a model.
pub fn summarize(log: &Log) -> Summary {
    let mut summary = Summary {
        evaluations: log.evaluations.len(),
        ..Default::default()
    };

    for evaluation in &log.evaluations {
        count_diagnostics(&mut summary, &evaluation.messages);
        for project in &evaluation.evaluated_projects {
            count_diagnostics(&mut summary, &project.messages);
        }
    }

    if let Some(build) = &log.build {
        summarize_build(&mut summary, build);
    }
    summary
}

fn summarize_build(summary: &mut Summary, build: &Build) {
    summary.result = build.result;
    summary.duration_ms = build.duration().map(|d| d.num_milliseconds());
    count_diagnostics(summary, &build.messages);

    for project in build.projects() {
        summary.projects += 1;
        count_diagnostics(summary, &project.messages);
        for target in &project.targets {
            summary.targets += 1;
            if target.is_skipped() {
                summary.skipped_targets += 1;
            }
            count_diagnostics(summary, &target.messages);
            for task in &target.tasks {
                summary.tasks += 1;
                if task.is_skipped() {
                    summary.skipped_tasks += 1;
                }
                count_diagnostics(summary, &task.messages);
            }
        }
    }
}

fn count_diagnostics(summary: &mut Summary, messages: &[Message]) {
    summary.errors += messages.iter().filter(|m| m.is_error()).count();
    summary.warnings += messages.iter().filter(|m| m.is_warning()).count();
}

/// Render [`summarize`] as aligned text.
pub fn render_summary(log: &Log) -> String {
    let summary = summarize(log);
    let mut out = format!("Result:      {}\n", outcome(summary.result));
    if let Some(ms) = summary.duration_ms {
        out.push_str(&format!("Duration:    {:.2}s\n", ms as f64 / 1000.0));
    }
    out.push_str(&format!("Projects:    {}\n", summary.projects));
    out.push_str(&format!(
        "Targets:     {} ({} skipped)\n",
        summary.targets, summary.skipped_targets
    ));
    out.push_str(&format!(
        "Tasks:       {} ({} skipped)\n",
        summary.tasks, summary.skipped_tasks
    ));
    out.push_str(&format!("Errors:      {}\n", summary.errors));
    out.push_str(&format!("Warnings:    {}\n", summary.warnings));
    out.push_str(&format!("Evaluations: {}\n", summary.evaluations));
    out
}
