//! Target record.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use super::{ItemActionInfo, ItemInfo, MessageInfo, PropertySetInfo, TaskInfo};
use crate::builder::errors::ModelError;
use crate::core::Outcome;
use crate::events::INVALID_ID;

#[derive(Debug)]
pub struct TargetInfo {
    pub id: i32,
    pub project_id: i32,
    pub name: Arc<str>,
    pub parent_target: Option<Arc<str>>,
    pub source_file: Option<Arc<str>>,
    pub is_requested_target: bool,
    pub tasks: Vec<TaskInfo>,
    /// Task id -> index into `tasks`, while the task runs
    running_tasks: HashMap<i32, usize>,
    pub item_actions: Vec<ItemActionInfo>,
    pub property_sets: Vec<PropertySetInfo>,
    pub output_items: Vec<ItemInfo>,
    pub messages: Vec<MessageInfo>,
    pub start: DateTime<Utc>,
    pub end: Option<DateTime<Utc>>,
    pub result: Option<Outcome>,
}

impl TargetInfo {
    pub fn new(
        id: i32,
        project_id: i32,
        name: Arc<str>,
        parent_target: Option<Arc<str>>,
        source_file: Option<Arc<str>>,
        start: DateTime<Utc>,
    ) -> Self {
        TargetInfo {
            id,
            project_id,
            name,
            parent_target,
            source_file,
            is_requested_target: false,
            tasks: Vec::new(),
            running_tasks: HashMap::new(),
            item_actions: Vec::new(),
            property_sets: Vec::new(),
            output_items: Vec::new(),
            messages: Vec::new(),
            start,
            end: None,
            result: None,
        }
    }

    /// A target that never ran, reported only by a "skipped" message.
    pub fn skipped(
        project_id: i32,
        name: Arc<str>,
        parent_target: Option<Arc<str>>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        let mut target = TargetInfo::new(INVALID_ID, project_id, name, parent_target, None, timestamp);
        target.end = Some(timestamp);
        target.result = Some(Outcome::Skipped);
        target
    }

    pub fn start_task(&mut self, task: TaskInfo) -> Result<(), ModelError> {
        if self.running_tasks.contains_key(&task.id) {
            return Err(ModelError::DuplicateTask {
                project_id: self.project_id,
                target_id: self.id,
                task_id: task.id,
            });
        }
        self.running_tasks.insert(task.id, self.tasks.len());
        self.tasks.push(task);
        Ok(())
    }

    pub fn add_skipped_task(&mut self, task: TaskInfo) {
        self.tasks.push(task);
    }

    pub fn running_task_mut(&mut self, task_id: i32) -> Result<&mut TaskInfo, ModelError> {
        match self.running_tasks.get(&task_id) {
            Some(&index) => Ok(&mut self.tasks[index]),
            None => Err(self.task_not_found(task_id)),
        }
    }

    /// Stop tracking a running task and return it for finishing.
    pub fn finish_task(&mut self, task_id: i32) -> Result<&mut TaskInfo, ModelError> {
        match self.running_tasks.remove(&task_id) {
            Some(index) => Ok(&mut self.tasks[index]),
            None => Err(self.task_not_found(task_id)),
        }
    }

    pub fn finish(&mut self, end: DateTime<Utc>, succeeded: bool, output_items: Vec<ItemInfo>) {
        self.end = Some(end);
        self.result = Some(Outcome::from_succeeded(succeeded));
        self.output_items = output_items;
    }

    fn task_not_found(&self, task_id: i32) -> ModelError {
        ModelError::TaskNotFound {
            project_id: self.project_id,
            target_id: self.id,
            task_id,
        }
    }
}
