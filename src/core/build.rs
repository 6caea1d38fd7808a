//! Build and log snapshots.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::{Evaluation, Message, Project};

/// How a build entity ended.
///
/// Entities that never received their finished event have no outcome at all
/// (`Option<Outcome>` is `None`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Succeeded,
    Failed,
    /// Never executed; synthesized from a "skipped" log message
    Skipped,
}

impl Outcome {
    pub fn from_succeeded(succeeded: bool) -> Self {
        if succeeded {
            Outcome::Succeeded
        } else {
            Outcome::Failed
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Succeeded => write!(f, "succeeded"),
            Outcome::Failed => write!(f, "failed"),
            Outcome::Skipped => write!(f, "skipped"),
        }
    }
}

/// The finalized result of feeding one build's events to a model builder.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Log {
    /// `None` if no build-started event was seen
    pub build: Option<Build>,
    pub evaluations: Vec<Evaluation>,
}

/// Root of the build tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Build {
    pub start: DateTime<Utc>,
    pub end: Option<DateTime<Utc>>,
    pub result: Option<Outcome>,
    pub environment: BTreeMap<Arc<str>, Arc<str>>,
    pub messages: Vec<Message>,
    /// The project with no parent
    pub project: Option<Project>,
}

impl Build {
    /// Wall-clock duration, if the build finished.
    pub fn duration(&self) -> Option<Duration> {
        self.end.map(|end| end - self.start)
    }

    /// Every project in the tree, root first, depth-first.
    pub fn projects(&self) -> Vec<&Project> {
        let mut out = Vec::new();
        let mut stack: Vec<&Project> = self.project.iter().collect();
        while let Some(project) = stack.pop() {
            out.push(project);
            // Reverse so children come out in their sorted order
            let children: Vec<&Project> = project
                .targets
                .iter()
                .flat_map(|t| t.tasks.iter())
                .flat_map(|t| t.child_projects.iter())
                .collect();
            stack.extend(children.into_iter().rev());
        }
        out
    }
}
