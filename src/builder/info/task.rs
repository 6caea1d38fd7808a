//! Task record.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use super::{ItemGroupInfo, MessageInfo};
use crate::builder::errors::ModelError;
use crate::core::Outcome;
use crate::events::INVALID_ID;

#[derive(Debug)]
pub struct TaskInfo {
    pub id: i32,
    pub name: Arc<str>,
    pub assembly: Option<Arc<str>>,
    pub source_file: Option<Arc<str>>,
    pub command_line: Option<Arc<str>>,
    pub parameter_properties: BTreeMap<Arc<str>, Arc<str>>,
    pub parameter_items: Vec<ItemGroupInfo>,
    pub output_properties: BTreeMap<Arc<str>, Arc<str>>,
    pub output_items: Vec<ItemGroupInfo>,
    pub messages: Vec<MessageInfo>,
    /// Context ids of projects this task built; filled in at finalization
    pub child_projects: Vec<i32>,
    pub start: DateTime<Utc>,
    pub end: Option<DateTime<Utc>>,
    pub result: Option<Outcome>,
}

impl TaskInfo {
    pub fn new(
        id: i32,
        name: Arc<str>,
        assembly: Option<Arc<str>>,
        source_file: Option<Arc<str>>,
        start: DateTime<Utc>,
    ) -> Self {
        TaskInfo {
            id,
            name,
            assembly,
            source_file,
            command_line: None,
            parameter_properties: BTreeMap::new(),
            parameter_items: Vec::new(),
            output_properties: BTreeMap::new(),
            output_items: Vec::new(),
            messages: Vec::new(),
            child_projects: Vec::new(),
            start,
            end: None,
            result: None,
        }
    }

    /// A task that never ran, reported only by a "skipped" message.
    pub fn skipped(name: Arc<str>, timestamp: DateTime<Utc>) -> Self {
        let mut task = TaskInfo::new(INVALID_ID, name, None, None, timestamp);
        task.end = Some(timestamp);
        task.result = Some(Outcome::Skipped);
        task
    }

    pub fn add_parameter_property(&mut self, name: Arc<str>, value: Arc<str>) -> Result<(), ModelError> {
        insert_unique(&mut self.parameter_properties, &self.name, "parameter", name, value)
    }

    pub fn add_output_property(&mut self, name: Arc<str>, value: Arc<str>) -> Result<(), ModelError> {
        insert_unique(&mut self.output_properties, &self.name, "output", name, value)
    }

    pub fn set_command_line(&mut self, command_line: Arc<str>) {
        self.command_line = Some(command_line);
    }

    pub fn finish(&mut self, end: DateTime<Utc>, succeeded: bool) {
        self.end = Some(end);
        self.result = Some(Outcome::from_succeeded(succeeded));
    }
}

fn insert_unique(
    properties: &mut BTreeMap<Arc<str>, Arc<str>>,
    task: &str,
    kind: &'static str,
    name: Arc<str>,
    value: Arc<str>,
) -> Result<(), ModelError> {
    if properties.contains_key(&name) {
        return Err(ModelError::DuplicateProperty {
            task: task.to_string(),
            kind,
            name: name.to_string(),
        });
    }
    properties.insert(name, value);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_duplicate_output_property() {
        let ts = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        let mut task = TaskInfo::new(1, Arc::from("Csc"), None, None, ts);
        task.add_output_property(Arc::from("Out"), Arc::from("a.dll"))
            .unwrap();
        // Same name as a parameter is fine
        task.add_parameter_property(Arc::from("Out"), Arc::from("b"))
            .unwrap();

        let err = task
            .add_output_property(Arc::from("Out"), Arc::from("c.dll"))
            .unwrap_err();
        assert!(matches!(err, ModelError::DuplicateProperty { kind: "output", .. }));
        assert_eq!(task.output_properties.get("Out").map(|v| &**v), Some("a.dll"));
    }

    #[test]
    fn test_skipped_task() {
        let ts = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        let task = TaskInfo::skipped(Arc::from("Copy"), ts);
        assert_eq!(task.id, INVALID_ID);
        assert_eq!(task.result, Some(Outcome::Skipped));
        assert_eq!(task.end, Some(ts));
    }
}
