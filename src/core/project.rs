//! Project snapshots.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{ItemGroup, Message, Outcome, Target};

/// One project instance as built by one MSBuild node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    /// Project context id
    pub id: i32,
    pub node_id: i32,
    pub file: Arc<str>,
    pub tools_version: Option<Arc<str>>,
    pub global_properties: BTreeMap<Arc<str>, Arc<str>>,
    pub properties: BTreeMap<Arc<str>, Arc<str>>,
    pub item_groups: Vec<ItemGroup>,
    /// Targets the project was asked to build, in request order
    pub requested_targets: Vec<Arc<str>>,
    /// Targets that actually ran (or were reported skipped)
    pub targets: Vec<Target>,
    pub messages: Vec<Message>,
    pub start: DateTime<Utc>,
    pub end: Option<DateTime<Utc>>,
    pub result: Option<Outcome>,
}

impl Project {
    /// File name without directory.
    pub fn name(&self) -> &str {
        crate::util::paths::file_name(&self.file)
    }

    pub fn target(&self, name: &str) -> Option<&Target> {
        self.targets
            .iter()
            .find(|t| t.name.eq_ignore_ascii_case(name))
    }

    pub fn item_group(&self, name: &str) -> Option<&ItemGroup> {
        self.item_groups.iter().find(|g| &*g.name == name)
    }
}
