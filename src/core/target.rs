//! Target snapshots.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Item, ItemAction, Message, Outcome, PropertySet, Task};
use crate::events::INVALID_ID;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target {
    /// Target id, or `INVALID_ID` for a skipped target
    pub id: i32,
    pub name: Arc<str>,
    /// Target that caused this one to run, if any
    pub parent_target: Option<Arc<str>>,
    pub source_file: Option<Arc<str>>,
    /// Whether this target was one of the project's requested targets
    pub is_requested_target: bool,
    pub tasks: Vec<Task>,
    pub item_actions: Vec<ItemAction>,
    pub property_sets: Vec<PropertySet>,
    pub output_items: Vec<Item>,
    pub messages: Vec<Message>,
    pub start: DateTime<Utc>,
    pub end: Option<DateTime<Utc>>,
    pub result: Option<Outcome>,
}

impl Target {
    pub fn is_skipped(&self) -> bool {
        self.id == INVALID_ID
    }

    pub fn task(&self, name: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.name.eq_ignore_ascii_case(name))
    }
}
