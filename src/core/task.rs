//! Task snapshots.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{ItemGroup, Message, Outcome, Project};
use crate::events::INVALID_ID;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Task id, or `INVALID_ID` for a skipped task
    pub id: i32,
    pub name: Arc<str>,
    /// Assembly the task was loaded from, when the log said so
    pub assembly: Option<Arc<str>>,
    pub source_file: Option<Arc<str>>,
    pub command_line: Option<Arc<str>>,
    pub parameter_properties: BTreeMap<Arc<str>, Arc<str>>,
    pub parameter_items: Vec<ItemGroup>,
    pub output_properties: BTreeMap<Arc<str>, Arc<str>>,
    pub output_items: Vec<ItemGroup>,
    pub messages: Vec<Message>,
    /// Projects this task built, e.g. through the `MSBuild` task
    pub child_projects: Vec<Project>,
    pub start: DateTime<Utc>,
    pub end: Option<DateTime<Utc>>,
    pub result: Option<Outcome>,
}

impl Task {
    pub fn is_skipped(&self) -> bool {
        self.id == INVALID_ID
    }

    pub fn parameter(&self, name: &str) -> Option<&str> {
        self.parameter_properties.get(name).map(|v| &**v)
    }

    pub fn parameter_items(&self, name: &str) -> Option<&ItemGroup> {
        self.parameter_items.iter().find(|g| &*g.name == name)
    }
}
