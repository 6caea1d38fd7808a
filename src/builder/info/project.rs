//! Project record.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use chrono::{DateTime, Utc};

use super::{ItemGroupInfo, MessageInfo, TargetInfo};
use crate::builder::errors::ModelError;
use crate::core::Outcome;

#[derive(Debug)]
pub struct ProjectInfo {
    pub id: i32,
    pub node_id: i32,
    /// `None` for the root project
    pub parent_id: Option<i32>,
    pub file: Arc<str>,
    pub tools_version: Option<Arc<str>>,
    pub global_properties: BTreeMap<Arc<str>, Arc<str>>,
    pub properties: BTreeMap<Arc<str>, Arc<str>>,
    pub item_groups: Vec<ItemGroupInfo>,
    pub requested_targets: Vec<Arc<str>>,
    pub targets: Vec<TargetInfo>,
    /// Target id -> index into `targets`, while the target runs
    running_targets: HashMap<i32, usize>,
    pub messages: Vec<MessageInfo>,
    pub start: DateTime<Utc>,
    pub end: Option<DateTime<Utc>>,
    pub result: Option<Outcome>,
}

impl ProjectInfo {
    pub fn new(id: i32, node_id: i32, parent_id: Option<i32>, file: Arc<str>, start: DateTime<Utc>) -> Self {
        ProjectInfo {
            id,
            node_id,
            parent_id,
            file,
            tools_version: None,
            global_properties: BTreeMap::new(),
            properties: BTreeMap::new(),
            item_groups: Vec::new(),
            requested_targets: Vec::new(),
            targets: Vec::new(),
            running_targets: HashMap::new(),
            messages: Vec::new(),
            start,
            end: None,
            result: None,
        }
    }

    pub fn start_target(&mut self, target: TargetInfo) -> Result<(), ModelError> {
        if self.running_targets.contains_key(&target.id) {
            return Err(ModelError::DuplicateTarget {
                project_id: self.id,
                target_id: target.id,
            });
        }
        self.running_targets.insert(target.id, self.targets.len());
        self.targets.push(target);
        Ok(())
    }

    pub fn add_skipped_target(&mut self, target: TargetInfo) {
        self.targets.push(target);
    }

    pub fn running_target_mut(&mut self, target_id: i32) -> Result<&mut TargetInfo, ModelError> {
        match self.running_targets.get(&target_id) {
            Some(&index) => Ok(&mut self.targets[index]),
            None => Err(ModelError::TargetNotFound {
                project_id: self.id,
                target_id,
            }),
        }
    }

    /// Stop tracking a running target and return it for finishing.
    pub fn finish_target(&mut self, target_id: i32) -> Result<&mut TargetInfo, ModelError> {
        match self.running_targets.remove(&target_id) {
            Some(index) => Ok(&mut self.targets[index]),
            None => Err(ModelError::TargetNotFound {
                project_id: self.id,
                target_id,
            }),
        }
    }

    /// Finish the project and flag the targets it was asked to build.
    ///
    /// A target counts as requested when its name matches a requested name
    /// (ASCII case-insensitive) and no other target caused it to run. Every
    /// requested name must match at least one such target.
    pub fn finish(&mut self, end: DateTime<Utc>, succeeded: bool) -> Result<(), ModelError> {
        self.end = Some(end);
        self.result = Some(Outcome::from_succeeded(succeeded));

        let mut missing = Vec::new();
        for requested in &self.requested_targets {
            let mut found = false;
            for target in self
                .targets
                .iter_mut()
                .filter(|t| t.parent_target.is_none() && t.name.eq_ignore_ascii_case(requested))
            {
                target.is_requested_target = true;
                found = true;
            }
            if !found {
                missing.push(requested.to_string());
            }
        }

        if missing.is_empty() {
            Ok(())
        } else {
            Err(ModelError::RequestedTargetsNotRun {
                project: self.file.to_string(),
                targets: missing,
            })
        }
    }
}
